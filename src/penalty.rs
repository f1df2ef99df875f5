//! Lateness evaluation for returned borrows.
//!
//! Pure computation: given a deadline and the current time, decides whether a
//! return is late and what the penalty amounts to. Any started day past the
//! deadline counts as a full overdue day.

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Outcome of evaluating a return against its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyOutcome {
    OnTime,
    Late { overdue_days: i64, amount: i64 },
}

/// Computes overdue penalties from the configured per-day rate
#[derive(Debug, Clone, Copy)]
pub struct PenaltyCalculator {
    rate_per_day: i64,
}

impl PenaltyCalculator {
    pub fn new(rate_per_day: i64) -> Self {
        Self { rate_per_day }
    }

    /// Evaluate a return happening at `now` against `deadline`.
    ///
    /// Returning exactly at the deadline is on time. Past it, overdue days are
    /// rounded up, so a return 2.5 days late is charged for 3 days.
    pub fn evaluate(&self, deadline: DateTime<Utc>, now: DateTime<Utc>) -> PenaltyOutcome {
        if now <= deadline {
            return PenaltyOutcome::OnTime;
        }

        let late_seconds = (now - deadline).num_seconds();
        let overdue_days = (late_seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;

        PenaltyOutcome::Late {
            overdue_days,
            amount: overdue_days * self.rate_per_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn on_time_before_deadline() {
        let calculator = PenaltyCalculator::new(5000);
        let now = deadline() - Duration::hours(1);
        assert_eq!(calculator.evaluate(deadline(), now), PenaltyOutcome::OnTime);
    }

    #[test]
    fn exactly_at_deadline_is_on_time() {
        let calculator = PenaltyCalculator::new(5000);
        assert_eq!(
            calculator.evaluate(deadline(), deadline()),
            PenaltyOutcome::OnTime
        );
    }

    #[test]
    fn one_second_late_counts_as_a_full_day() {
        let calculator = PenaltyCalculator::new(5000);
        let now = deadline() + Duration::seconds(1);
        assert_eq!(
            calculator.evaluate(deadline(), now),
            PenaltyOutcome::Late {
                overdue_days: 1,
                amount: 5000
            }
        );
    }

    #[test]
    fn partial_days_round_up() {
        let calculator = PenaltyCalculator::new(5000);
        let now = deadline() + Duration::hours(60); // 2.5 days
        assert_eq!(
            calculator.evaluate(deadline(), now),
            PenaltyOutcome::Late {
                overdue_days: 3,
                amount: 15000
            }
        );
    }

    #[test]
    fn whole_days_do_not_round_up() {
        let calculator = PenaltyCalculator::new(2500);
        let now = deadline() + Duration::days(2);
        assert_eq!(
            calculator.evaluate(deadline(), now),
            PenaltyOutcome::Late {
                overdue_days: 2,
                amount: 5000
            }
        );
    }
}
