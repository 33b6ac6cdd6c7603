use crate::cue::CueRecord;

/// A cue with its start time resolved to seconds
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCue {
    pub start_secs: f64,
    pub record: CueRecord,
}

impl ScheduledCue {
    /// Half-open window `[start, start + window)`
    pub fn contains(&self, time: f64, window_secs: f64) -> bool {
        time >= self.start_secs && time < self.start_secs + window_secs
    }

    pub fn effect(&self) -> &str {
        &self.record.effect
    }
}

/// Cue list in the order the analysis provider delivered it.
///
/// Timestamps are parsed once on construction so the per-tick scan stays a
/// plain comparison loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueSchedule {
    cues: Vec<ScheduledCue>,
}

impl CueSchedule {
    pub fn new(records: Vec<CueRecord>) -> Self {
        let cues = records
            .into_iter()
            .map(|record| ScheduledCue {
                start_secs: record.start_secs(),
                record,
            })
            .collect();
        Self { cues }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First cue (in list order) whose window contains `time`
    pub fn active_cue(&self, time: f64, window_secs: f64) -> Option<&ScheduledCue> {
        self.cues.iter().find(|cue| cue.contains(time, window_secs))
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledCue> {
        self.cues.iter()
    }

    /// Relative position of each cue on a timeline of `duration` seconds, as
    /// a percentage in `[0, 100]`.
    pub fn marker_positions(&self, duration: f64) -> Vec<f64> {
        if !(duration > 0.0) {
            return vec![0.0; self.cues.len()];
        }
        self.cues
            .iter()
            .map(|cue| (cue.start_secs / duration * 100.0).clamp(0.0, 100.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(cues: &[(&str, &str)]) -> CueSchedule {
        CueSchedule::new(
            cues.iter()
                .map(|(ts, effect)| CueRecord::new(*ts, *effect))
                .collect(),
        )
    }

    #[test]
    fn test_window_is_half_open() {
        let schedule = schedule(&[("0:05", "Whoosh")]);
        assert!(schedule.active_cue(4.9, 1.0).is_none());
        assert_eq!(schedule.active_cue(5.0, 1.0).unwrap().effect(), "Whoosh");
        assert_eq!(schedule.active_cue(5.9, 1.0).unwrap().effect(), "Whoosh");
        assert!(schedule.active_cue(6.0, 1.0).is_none());
    }

    #[test]
    fn test_list_order_wins_on_overlap() {
        // Later cue listed first: it still wins where both windows overlap
        let schedule = schedule(&[("0:03", "Late"), ("0:02", "Early")]);
        assert_eq!(schedule.active_cue(3.2, 1.5).unwrap().effect(), "Late");
        assert_eq!(schedule.active_cue(2.5, 1.5).unwrap().effect(), "Early");
    }

    #[test]
    fn test_empty_schedule_never_active() {
        let schedule = CueSchedule::empty();
        for t in [0.0, 1.0, 100.0] {
            assert!(schedule.active_cue(t, 1.0).is_none());
        }
    }

    #[test]
    fn test_malformed_timestamp_scheduled_at_zero() {
        let schedule = schedule(&[("abc", "Glitch")]);
        assert_eq!(schedule.iter().next().unwrap().start_secs, 0.0);
        assert_eq!(schedule.active_cue(0.5, 1.0).unwrap().effect(), "Glitch");
    }

    #[test]
    fn test_marker_positions() {
        let schedule = schedule(&[("0:05", "A"), ("0:30", "B"), ("1:00", "C")]);
        let markers = schedule.marker_positions(20.0);
        assert_eq!(markers, vec![25.0, 100.0, 100.0]);

        assert_eq!(schedule.marker_positions(0.0), vec![0.0, 0.0, 0.0]);
    }
}
