use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_DEADLINE_MINUTES: i64 = 5;

/// Prediction window for a single fixture.
#[derive(Debug, Clone, Copy)]
pub struct PredictionWindow {
    pub kickoff: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl PredictionWindow {
    pub fn new(kickoff: DateTime<Utc>, lead_minutes: i64) -> Self {
        Self {
            kickoff,
            deadline: kickoff - Duration::minutes(lead_minutes),
        }
    }

    /// Predictions can be made or changed strictly before the deadline.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now < self.deadline
    }

    /// Predictions of other users become public once the window locks.
    pub fn predictions_visible_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_open_at(now)
    }

    pub fn seconds_until_deadline(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 9, 15, 0, 0).unwrap()
    }

    #[test]
    fn deadline_is_five_minutes_before_kickoff() {
        let window = PredictionWindow::new(kickoff(), DEFAULT_DEADLINE_MINUTES);
        assert_eq!(window.deadline, Utc.with_ymd_and_hms(2025, 8, 9, 14, 55, 0).unwrap());
    }

    #[test]
    fn six_minutes_before_kickoff_is_open() {
        let window = PredictionWindow::new(kickoff(), DEFAULT_DEADLINE_MINUTES);
        assert!(window.is_open_at(kickoff() - Duration::minutes(6)));
        assert!(!window.predictions_visible_at(kickoff() - Duration::minutes(6)));
    }

    #[test]
    fn four_minutes_before_kickoff_is_locked() {
        let window = PredictionWindow::new(kickoff(), DEFAULT_DEADLINE_MINUTES);
        assert!(!window.is_open_at(kickoff() - Duration::minutes(4)));
        assert!(window.predictions_visible_at(kickoff() - Duration::minutes(4)));
    }

    #[test]
    fn exact_deadline_instant_is_locked() {
        let window = PredictionWindow::new(kickoff(), DEFAULT_DEADLINE_MINUTES);
        assert!(!window.is_open_at(window.deadline));
        assert!(window.is_open_at(window.deadline - Duration::milliseconds(1)));
    }

    #[test]
    fn countdown_never_goes_negative() {
        let window = PredictionWindow::new(kickoff(), DEFAULT_DEADLINE_MINUTES);
        assert_eq!(window.seconds_until_deadline(kickoff()), 0);
        assert_eq!(window.seconds_until_deadline(kickoff() - Duration::minutes(6)), 60);
    }
}
