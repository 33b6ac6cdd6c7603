use crate::cue::{format_timestamp, is_well_formed, CuePayload, CueRecord};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

/// Loads cue lists produced by the analysis provider
pub struct CueParser;

impl CueParser {
    /// Parse a JSON cue file (bare list or full analysis response)
    pub fn parse_json(path: &Path) -> Result<Vec<CueRecord>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cue file: {}", path.display()))?;

        Self::parse_str(&content)
            .with_context(|| format!("Failed to parse cue file: {}", path.display()))
    }

    pub fn parse_str(content: &str) -> Result<Vec<CueRecord>> {
        let payload: CuePayload =
            serde_json::from_str(content).context("Expected a cue array or an analysis object")?;
        let cues = payload.into_cues();

        for (idx, cue) in Self::malformed(&cues) {
            warn!(
                index = idx,
                timestamp = %cue.timestamp,
                effect = %cue.effect,
                "malformed cue timestamp, scheduling at 0s"
            );
        }

        Ok(cues)
    }

    /// Cues whose timestamp falls back to 0s, with their list index
    pub fn malformed(cues: &[CueRecord]) -> impl Iterator<Item = (usize, &CueRecord)> {
        cues.iter()
            .enumerate()
            .filter(|(_, cue)| !is_well_formed(&cue.timestamp))
    }

    /// Get a summary of the cue list
    pub fn summarize(cues: &[CueRecord]) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Cues: {}\n", cues.len()));

        for (idx, cue) in cues.iter().enumerate() {
            summary.push_str(&format!(
                "  {}. [{} -> {}] {}",
                idx + 1,
                cue.timestamp,
                format_timestamp(cue.start_secs()),
                cue.effect
            ));
            if !cue.visual_cue.is_empty() {
                summary.push_str(&format!(" (cue: {})", cue.visual_cue));
            }
            summary.push('\n');
        }

        let malformed = Self::malformed(cues).count();
        if malformed > 0 {
            summary.push_str(&format!("Malformed timestamps: {}\n", malformed));
        }

        summary
    }
}
