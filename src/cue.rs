use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A timestamped sound-effect suggestion returned by the analysis provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueRecord {
    pub timestamp: String,
    pub effect: String,
    #[serde(default)]
    pub visual_cue: String,
    #[serde(default)]
    pub reason: String,
}

impl CueRecord {
    pub fn new(timestamp: impl Into<String>, effect: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            effect: effect.into(),
            visual_cue: String::new(),
            reason: String::new(),
        }
    }

    /// Start of this cue in seconds (see [`parse_timestamp`])
    pub fn start_secs(&self) -> f64 {
        parse_timestamp(&self.timestamp)
    }
}

/// Full analysis response. Only the cue list is read; hooks, hashtags and
/// edit suggestions are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub sfx_suggestions: Vec<CueRecord>,
}

/// Cue payloads accepted from disk: either the bare list or the whole
/// analysis envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CuePayload {
    List(Vec<CueRecord>),
    Analysis(AnalysisResult),
}

impl CuePayload {
    pub fn into_cues(self) -> Vec<CueRecord> {
        match self {
            CuePayload::List(cues) => cues,
            CuePayload::Analysis(result) => result.sfx_suggestions,
        }
    }
}

/// Convert an `"SS"` or `"MM:SS"` timestamp into seconds.
///
/// Anything else (three components, empty parts, non-numeric or negative
/// values) yields `0.0` so one bad cue never stops playback.
pub fn parse_timestamp(text: &str) -> f64 {
    try_parse_timestamp(text).unwrap_or(0.0)
}

/// Strict form of [`parse_timestamp`]: `None` where that would fall back.
/// Digits are ASCII only and minutes must fit in a `u32`.
pub fn try_parse_timestamp(text: &str) -> Option<f64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?:([0-9]+)\s*:\s*)?([0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*$")
            .expect("timestamp pattern is valid")
    });
    let caps = re.captures(text)?;
    let secs = caps[2].parse::<f64>().ok().filter(|s| s.is_finite())?;
    match caps.get(1) {
        Some(minutes) => {
            let minutes = minutes.as_str().parse::<u32>().ok()?;
            Some(minutes as f64 * 60.0 + secs)
        }
        None => Some(secs),
    }
}

/// Whether a timestamp parses without falling back to `0.0`
pub fn is_well_formed(text: &str) -> bool {
    try_parse_timestamp(text).is_some()
}

/// Render seconds back into `M:SS` (tenths when fractional) for display
pub fn format_timestamp(secs: f64) -> String {
    // Round first so 59.96 carries into the minute instead of printing 0:60.0
    let tenths = (secs.max(0.0) * 10.0).round() as u64;
    let minutes = tenths / 600;
    let rest = tenths % 600;
    if rest % 10 == 0 {
        format!("{}:{:02}", minutes, rest / 10)
    } else {
        format!("{}:{:02}.{}", minutes, rest / 10, rest % 10)
    }
}
