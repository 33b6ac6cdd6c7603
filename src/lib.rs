pub mod audio;
pub mod config;
pub mod cue;
pub mod parser;
pub mod simulate;
pub mod sync;

pub use audio::{AudioDecoder, DecodedAudio, DuckingRenderer};
pub use config::{AppConfig, DuckingConfig, PlaybackConfig};
pub use cue::{parse_timestamp, CueRecord};
pub use parser::CueParser;
pub use simulate::{PlaybackSimulator, SimulationReport};
pub use sync::{evaluate, CueSchedule, DuckingState, PlaybackSession, SideEffect};
