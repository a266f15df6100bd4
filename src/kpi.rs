use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::types::AgeBucket;

/// overdue exposure grouped by how long the oldest missed installment
/// has been outstanding
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgeBreakdown {
    /// overdue for at most 7 days
    pub up_to_week: Money,
    /// overdue for 8 to 30 days
    pub up_to_month: Money,
    /// overdue for more than 30 days
    pub over_month: Money,
}

impl AgeBreakdown {
    fn add(&mut self, days_overdue: u32, amount: Money) {
        match AgeBucket::for_days(days_overdue) {
            AgeBucket::UpToWeek => self.up_to_week += amount,
            AgeBucket::UpToMonth => self.up_to_month += amount,
            AgeBucket::OverMonth => self.over_month += amount,
        }
    }

    pub fn total(&self) -> Money {
        self.up_to_week + self.up_to_month + self.over_month
    }
}

/// how many overdue loans sit on each rung of the escalation ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReminderDistribution {
    pub never_reminded: usize,
    pub first: usize,
    pub second: usize,
    pub third: usize,
    pub final_notice: usize,
}

impl ReminderDistribution {
    fn record(&mut self, reminder_level: u8) {
        match reminder_level {
            0 => self.never_reminded += 1,
            1 => self.first += 1,
            2 => self.second += 1,
            3 => self.third += 1,
            _ => self.final_notice += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.never_reminded + self.first + self.second + self.third + self.final_notice
    }
}

/// weekly collections snapshot over the active portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpaidKpis {
    pub as_of: NaiveDate,
    pub active_loans: usize,
    /// active loans carrying any overdue amount
    pub unpaid_driver_count: usize,
    /// unpaid drivers over active loans, 0.0 for an empty portfolio
    pub unpaid_rate: f64,
    pub total_unpaid: Money,
    pub total_outstanding: Money,
    pub total_collected: Money,
    /// collected over originated principal, 0.0 for an empty portfolio
    pub collection_rate: f64,
    pub age_buckets: AgeBreakdown,
    pub reminder_distribution: ReminderDistribution,
}

impl UnpaidKpis {
    /// roll up the active snapshot; non-active loans in the slice are ignored
    pub fn compute(as_of: NaiveDate, loans: &[Loan]) -> Self {
        let mut active = 0usize;
        let mut unpaid = 0usize;
        let mut total_unpaid = Money::ZERO;
        let mut total_outstanding = Money::ZERO;
        let mut total_collected = Money::ZERO;
        let mut total_principal = Money::ZERO;
        let mut age_buckets = AgeBreakdown::default();
        let mut reminder_distribution = ReminderDistribution::default();

        for loan in loans.iter().filter(|l| l.is_active()) {
            active += 1;
            total_outstanding += loan.outstanding;
            total_collected += loan.total_paid;
            total_principal += loan.principal;

            if loan.is_overdue() {
                unpaid += 1;
                total_unpaid += loan.overdue_amount;
                age_buckets.add(loan.days_overdue, loan.overdue_amount);
                reminder_distribution.record(loan.reminder_level);
            }
        }

        let unpaid_rate = if active == 0 {
            0.0
        } else {
            unpaid as f64 / active as f64
        };
        let collection_rate = Rate::ratio(total_collected, total_principal).as_f64();

        Self {
            as_of,
            active_loans: active,
            unpaid_driver_count: unpaid,
            unpaid_rate,
            total_unpaid,
            total_outstanding,
            total_collected,
            collection_rate,
            age_buckets,
            reminder_distribution,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::schedule;
    use crate::types::ReminderLevel;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_loan(principal: i64) -> Loan {
        Loan::originate(
            "driver-1".to_string(),
            "vehicle-1".to_string(),
            "+22570000001".to_string(),
            Money::from_major(principal),
            date(2024, 1, 1),
            &EngineConfig::standard(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_portfolio_is_all_zero() {
        let kpis = UnpaidKpis::compute(date(2024, 6, 1), &[]);

        assert_eq!(kpis.active_loans, 0);
        assert_eq!(kpis.unpaid_driver_count, 0);
        assert_eq!(kpis.unpaid_rate, 0.0);
        assert_eq!(kpis.collection_rate, 0.0);
        assert_eq!(kpis.total_unpaid, Money::ZERO);
        assert_eq!(kpis.age_buckets.total(), Money::ZERO);
        assert_eq!(kpis.reminder_distribution.total(), 0);
    }

    #[test]
    fn test_rollup_over_mixed_portfolio() {
        // on time
        let mut paid_up = make_loan(14_400_000);
        paid_up.record_payment(Money::from_major(100_000), date(2024, 1, 8));
        schedule::recompute_overdue(&mut paid_up, date(2024, 1, 9));

        // 12 days overdue, one missed week plus the current one
        let mut overdue = make_loan(14_400_000);
        schedule::recompute_overdue(&mut overdue, date(2024, 1, 20));

        // closed loan, must not count at all
        let mut closed = make_loan(14_400_000);
        closed.record_payment(Money::from_major(14_400_000), date(2024, 1, 8));
        closed.mark_completed();

        let kpis = UnpaidKpis::compute(
            date(2024, 1, 20),
            &[paid_up.clone(), overdue.clone(), closed],
        );

        assert_eq!(kpis.active_loans, 2);
        assert_eq!(kpis.unpaid_driver_count, 1);
        assert_eq!(kpis.unpaid_rate, 0.5);
        assert_eq!(kpis.total_unpaid, Money::from_major(200_000));
        assert_eq!(
            kpis.total_outstanding,
            Money::from_major(14_300_000) + Money::from_major(14_400_000)
        );
        assert_eq!(kpis.total_collected, Money::from_major(100_000));
        assert_eq!(kpis.reminder_distribution.never_reminded, 1);
    }

    #[test]
    fn test_age_buckets_split_on_day_boundaries() {
        // next due 2024-01-08 throughout
        let mut fresh = make_loan(14_400_000); // 7 days late on jan 15
        schedule::recompute_overdue(&mut fresh, date(2024, 1, 15));
        assert_eq!(fresh.days_overdue, 7);

        let mut aging = make_loan(14_400_000); // 8 days late on jan 16
        schedule::recompute_overdue(&mut aging, date(2024, 1, 16));
        assert_eq!(aging.days_overdue, 8);

        let mut stale = make_loan(14_400_000); // 31 days late on feb 8
        schedule::recompute_overdue(&mut stale, date(2024, 2, 8));
        assert_eq!(stale.days_overdue, 31);

        let kpis = UnpaidKpis::compute(date(2024, 2, 8), &[fresh, aging, stale]);

        assert_eq!(kpis.age_buckets.up_to_week, Money::from_major(200_000));
        assert_eq!(kpis.age_buckets.up_to_month, Money::from_major(200_000));
        // 31 days is 4 full weeks plus the current one
        assert_eq!(kpis.age_buckets.over_month, Money::from_major(500_000));
        assert_eq!(kpis.age_buckets.total(), kpis.total_unpaid);
    }

    #[test]
    fn test_reminder_distribution_counts_ladder_rungs() {
        let mut first = make_loan(14_400_000);
        schedule::recompute_overdue(&mut first, date(2024, 1, 20));
        first.record_reminder(ReminderLevel::First, date(2024, 1, 20), 3);

        let mut final_notice = make_loan(14_400_000);
        schedule::recompute_overdue(&mut final_notice, date(2024, 1, 20));
        final_notice.record_reminder(ReminderLevel::Final, date(2024, 1, 20), 14);

        let mut untouched = make_loan(14_400_000);
        schedule::recompute_overdue(&mut untouched, date(2024, 1, 20));

        let kpis = UnpaidKpis::compute(date(2024, 1, 20), &[first, final_notice, untouched]);

        assert_eq!(kpis.reminder_distribution.never_reminded, 1);
        assert_eq!(kpis.reminder_distribution.first, 1);
        assert_eq!(kpis.reminder_distribution.final_notice, 1);
        assert_eq!(kpis.reminder_distribution.second, 0);
        assert_eq!(kpis.reminder_distribution.total(), 3);
    }

    #[test]
    fn test_collection_rate_tracks_paid_share() {
        let mut halfway = make_loan(1_000_000);
        halfway.record_payment(Money::from_major(250_000), date(2024, 1, 8));
        schedule::recompute_overdue(&mut halfway, date(2024, 1, 9));

        let kpis = UnpaidKpis::compute(date(2024, 1, 9), &[halfway]);
        assert!((kpis.collection_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_serialize_to_pretty_json() {
        let mut overdue = make_loan(14_400_000);
        schedule::recompute_overdue(&mut overdue, date(2024, 1, 20));

        let kpis = UnpaidKpis::compute(date(2024, 1, 20), &[overdue]);
        let json = kpis.to_json_pretty().unwrap();

        assert!(json.contains("\"unpaid_driver_count\": 1"));
        assert!(json.contains("\"total_unpaid\""));
    }
}
