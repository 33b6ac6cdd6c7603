use crate::config::{ConfigError, DuckingConfig, FULL_VOLUME};
use crate::sync::schedule::CueSchedule;
use crate::sync::state::{evaluate, DuckingState, SideEffect};
use tracing::{debug, info};

/// Sink for volume commands (the media element / audio graph)
pub trait AudioOutput {
    fn set_volume(&mut self, volume: f32);
}

/// Receives the ducking state whenever it changes (e.g. a UI badge)
pub trait DuckingObserver {
    fn on_change(&mut self, state: &DuckingState);
}

/// Observer that ignores every update
#[derive(Debug, Default)]
pub struct NoopObserver;

impl DuckingObserver for NoopObserver {
    fn on_change(&mut self, _state: &DuckingState) {}
}

/// Output that just remembers the last requested level
#[derive(Debug, Clone)]
pub struct VolumeLevel {
    pub volume: f32,
    pub writes: usize,
}

impl Default for VolumeLevel {
    fn default() -> Self {
        Self {
            volume: FULL_VOLUME,
            writes: 0,
        }
    }
}

impl AudioOutput for VolumeLevel {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.writes += 1;
    }
}

/// One playback session: from the moment the host starts delivering clock
/// ticks until the media ends. Stopping consumes the session, so a stopped
/// session cannot receive ticks.
pub struct PlaybackSession<O: AudioOutput, V: DuckingObserver> {
    schedule: CueSchedule,
    config: DuckingConfig,
    state: DuckingState,
    output: O,
    observer: V,
    ticks: u64,
}

/// What remains after [`PlaybackSession::stop`]
pub struct StoppedSession<O, V> {
    pub final_state: DuckingState,
    pub ticks: u64,
    pub output: O,
    pub observer: V,
}

impl<O: AudioOutput, V: DuckingObserver> PlaybackSession<O, V> {
    /// Begin observing the clock. Fails if `config` would push the output
    /// outside `[0, 1]` or disable the window.
    pub fn start(
        schedule: CueSchedule,
        config: DuckingConfig,
        output: O,
        observer: V,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            cues = schedule.len(),
            window_secs = config.window_secs,
            ducked_volume = config.ducked_volume,
            "cue sync session started"
        );
        Ok(Self {
            schedule,
            config,
            state: DuckingState::inactive(),
            output,
            observer,
            ticks: 0,
        })
    }

    /// Feed one playback-time update. Returns the side effects that were
    /// applied (empty when the state did not change).
    pub fn tick(&mut self, time: f64) -> Vec<SideEffect> {
        self.ticks += 1;
        let evaluation = evaluate(time, &self.schedule, &self.state, &self.config);
        if !evaluation.changed() {
            return evaluation.effects;
        }

        debug!(
            time,
            active = evaluation.state.active,
            effect = evaluation.state.active_effect.as_deref().unwrap_or("-"),
            "ducking transition"
        );

        for effect in &evaluation.effects {
            if let SideEffect::SetVolume(volume) = effect {
                self.output.set_volume(*volume);
            }
        }
        self.state = evaluation.state;
        self.observer.on_change(&self.state);
        evaluation.effects
    }

    /// Install a new cue list; the next tick evaluates against it
    pub fn replace_cues(&mut self, schedule: CueSchedule) {
        debug!(
            old = self.schedule.len(),
            new = schedule.len(),
            "cue list replaced"
        );
        self.schedule = schedule;
    }

    pub fn state(&self) -> &DuckingState {
        &self.state
    }

    pub fn schedule(&self) -> &CueSchedule {
        &self.schedule
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Stop observing the clock. A session that ends mid-duck hands full
    /// volume back to the output.
    pub fn stop(mut self) -> StoppedSession<O, V> {
        if self.state.active {
            self.output.set_volume(FULL_VOLUME);
            self.state = DuckingState::inactive();
            self.observer.on_change(&self.state);
        }
        info!(ticks = self.ticks, "cue sync session stopped");
        StoppedSession {
            final_state: self.state,
            ticks: self.ticks,
            output: self.output,
            observer: self.observer,
        }
    }
}
