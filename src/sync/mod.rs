pub mod schedule;
pub mod session;
pub mod state;

pub use schedule::{CueSchedule, ScheduledCue};
pub use session::{
    AudioOutput, DuckingObserver, NoopObserver, PlaybackSession, StoppedSession, VolumeLevel,
};
pub use state::{evaluate, DuckingState, Evaluation, SideEffect};
