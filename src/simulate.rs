use crate::config::{DuckingConfig, PlaybackConfig};
use crate::sync::{CueSchedule, DuckingObserver, DuckingState, PlaybackSession, VolumeLevel};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A state change observed during simulated playback
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    /// Seconds since playback started, across loops
    pub wall_time: f64,
    /// Position within the media when the change happened
    pub media_time: f64,
    pub loop_index: u32,
    pub state: DuckingState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub media_duration: f64,
    pub tick_rate_hz: f64,
    pub loops: u32,
    pub ticks: u64,
    pub transitions: Vec<TransitionEvent>,
    pub ducks_per_effect: BTreeMap<String, u32>,
    pub ducked_secs: f64,
}

impl SimulationReport {
    pub fn duck_count(&self) -> usize {
        self.transitions.iter().filter(|t| t.state.active).count()
    }

    pub fn to_markdown(&self) -> String {
        let mut md = format!(
            "# Ducking Simulation Report\n\n**Media**: {:.2}s x {} loop(s) at {} Hz ({} ticks)\n\n**Time ducked**: {:.2}s\n\n## Transitions\n",
            self.media_duration, self.loops, self.tick_rate_hz, self.ticks, self.ducked_secs
        );
        for event in &self.transitions {
            match &event.state.active_effect {
                Some(effect) => md.push_str(&format!(
                    "- {:.3}s (loop {}, media {:.3}s): duck for **{}** -> volume {}\n",
                    event.wall_time, event.loop_index + 1, event.media_time, effect, event.state.applied_volume
                )),
                None => md.push_str(&format!(
                    "- {:.3}s (loop {}, media {:.3}s): release -> volume {}\n",
                    event.wall_time, event.loop_index + 1, event.media_time, event.state.applied_volume
                )),
            }
        }
        md.push_str("\n## Ducks per effect\n");
        for (effect, count) in &self.ducks_per_effect {
            md.push_str(&format!("- {}: {}\n", effect, count));
        }
        md
    }

    /// Write as JSON when the path ends in `.json`, Markdown otherwise
    pub fn export(&self, path: &Path) -> Result<()> {
        let content = if path.extension().map_or(false, |ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_markdown()
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Default)]
struct TransitionLog {
    pending: Vec<DuckingState>,
}

impl DuckingObserver for TransitionLog {
    fn on_change(&mut self, state: &DuckingState) {
        self.pending.push(state.clone());
    }
}

/// Drives a [`PlaybackSession`] with a synthetic clock, the way a media
/// element would deliver `timeupdate` events.
pub struct PlaybackSimulator {
    ducking: DuckingConfig,
    playback: PlaybackConfig,
}

impl PlaybackSimulator {
    pub fn new(ducking: DuckingConfig, playback: PlaybackConfig) -> Self {
        Self { ducking, playback }
    }

    /// Media positions at which ticks land for each loop
    pub fn tick_times(&self, media_duration: f64) -> impl Iterator<Item = (u32, f64, f64)> {
        let step = 1.0 / self.playback.tick_rate_hz;
        let ticks_per_loop = (media_duration * self.playback.tick_rate_hz).ceil() as u64;
        let loops = self.playback.loop_count;

        (0..loops).flat_map(move |loop_index| {
            (0..ticks_per_loop).map(move |k| {
                let media_time = k as f64 * step;
                let wall_time = loop_index as f64 * media_duration + media_time;
                (loop_index, wall_time, media_time)
            })
        })
    }

    pub fn run(&self, schedule: CueSchedule, media_duration: f64) -> Result<SimulationReport> {
        self.playback.validate()?;
        if !(media_duration > 0.0) || !media_duration.is_finite() {
            anyhow::bail!("Media duration must be positive, got {}", media_duration);
        }

        let mut session = PlaybackSession::start(
            schedule,
            self.ducking,
            VolumeLevel::default(),
            TransitionLog::default(),
        )?;

        let mut transitions = Vec::new();
        let mut ducks_per_effect: BTreeMap<String, u32> = BTreeMap::new();
        let mut ducked_ticks: u64 = 0;

        for (loop_index, wall_time, media_time) in self.tick_times(media_duration) {
            let effects = session.tick(media_time);
            if session.state().active {
                ducked_ticks += 1;
            }
            if effects.is_empty() {
                continue;
            }

            let state = session.state().clone();
            if let Some(effect) = &state.active_effect {
                *ducks_per_effect.entry(effect.clone()).or_default() += 1;
            }
            transitions.push(TransitionEvent {
                wall_time,
                media_time,
                loop_index,
                state,
            });
        }

        let stopped = session.stop();
        if stopped.observer.pending.len() > transitions.len() {
            // stop() released a duck that was still held at the end of media
            let wall_time = self.playback.loop_count as f64 * media_duration;
            transitions.push(TransitionEvent {
                wall_time,
                media_time: media_duration,
                loop_index: self.playback.loop_count - 1,
                state: stopped.final_state.clone(),
            });
        }

        Ok(SimulationReport {
            media_duration,
            tick_rate_hz: self.playback.tick_rate_hz,
            loops: self.playback.loop_count,
            ticks: stopped.ticks,
            transitions,
            ducks_per_effect,
            ducked_secs: ducked_ticks as f64 / self.playback.tick_rate_hz,
        })
    }
}
