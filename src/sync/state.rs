use crate::config::{DuckingConfig, FULL_VOLUME};
use crate::sync::schedule::CueSchedule;
use serde::Serialize;

/// Observable ducking state. `applied_volume` always follows `active`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuckingState {
    pub active: bool,
    pub active_effect: Option<String>,
    pub applied_volume: f32,
}

impl DuckingState {
    pub fn inactive() -> Self {
        Self {
            active: false,
            active_effect: None,
            applied_volume: FULL_VOLUME,
        }
    }

    pub fn ducking(effect: impl Into<String>, config: &DuckingConfig) -> Self {
        Self {
            active: true,
            active_effect: Some(effect.into()),
            applied_volume: config.ducked_volume,
        }
    }
}

impl Default for DuckingState {
    fn default() -> Self {
        Self::inactive()
    }
}

/// Commands the host must carry out after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SideEffect {
    SetVolume(f32),
    ShowEffect(String),
    ClearEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub state: DuckingState,
    pub effects: Vec<SideEffect>,
}

impl Evaluation {
    pub fn changed(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// One synchronizer step.
///
/// Transitions are edge-triggered: effects are only produced when the
/// active flag flips. Passing from one cue's window straight into another's
/// keeps the original label.
///
/// `config` is trusted as given; [`PlaybackSession::start`] is where it gets
/// validated.
///
/// [`PlaybackSession::start`]: crate::sync::PlaybackSession::start
pub fn evaluate(
    time: f64,
    schedule: &CueSchedule,
    previous: &DuckingState,
    config: &DuckingConfig,
) -> Evaluation {
    let matched = schedule.active_cue(time, config.window_secs);

    match (matched, previous.active) {
        (Some(cue), false) => {
            let state = DuckingState::ducking(cue.effect(), config);
            let effects = vec![
                SideEffect::SetVolume(state.applied_volume),
                SideEffect::ShowEffect(cue.effect().to_string()),
            ];
            Evaluation { state, effects }
        }
        (None, true) => Evaluation {
            state: DuckingState::inactive(),
            effects: vec![SideEffect::SetVolume(FULL_VOLUME), SideEffect::ClearEffect],
        },
        _ => Evaluation {
            state: previous.clone(),
            effects: Vec::new(),
        },
    }
}
