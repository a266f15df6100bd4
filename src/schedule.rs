use chrono::{Duration, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::TermPolicy;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::Loan;
use crate::types::DelinquencyStatus;

/// weekly installment from principal spread over the contract's total weeks,
/// rounded half-up to currency scale
pub fn weekly_installment(principal: Money, term: &TermPolicy) -> Money {
    principal / Decimal::from(term.total_weeks())
}

/// first due date for a newly created loan
pub fn first_due_date(start_date: NaiveDate) -> NaiveDate {
    start_date + Duration::weeks(1)
}

/// contract end date
pub fn end_date(start_date: NaiveDate, term_months: u32) -> Result<NaiveDate> {
    start_date
        .checked_add_months(Months::new(term_months))
        .ok_or_else(|| LedgerError::InvalidDate {
            message: format!("contract end overflows calendar from {start_date}"),
        })
}

/// fully paid weekly units implied by cumulative payment
pub fn completed_weekly_units(total_paid: Money, weekly_installment: Money) -> u32 {
    if weekly_installment.is_zero() {
        return 0;
    }
    (total_paid.as_decimal() / weekly_installment.as_decimal())
        .floor()
        .to_u32()
        .unwrap_or(0)
}

/// due date implied by cumulative payment progress: the schedule is a
/// function of total paid, not of a payment counter, so partial payments
/// do not advance it and overpayments advance it by whole weeks
pub fn next_due_date(start_date: NaiveDate, total_paid: Money, weekly_installment: Money) -> NaiveDate {
    let units = completed_weekly_units(total_paid, weekly_installment);
    start_date + Duration::weeks(i64::from(units) + 1)
}

/// result of an overdue recomputation
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueChange {
    pub old_status: DelinquencyStatus,
    pub new_status: DelinquencyStatus,
    pub days_overdue: u32,
    pub overdue_amount: Money,
}

impl OverdueChange {
    pub fn status_changed(&self) -> bool {
        self.old_status != self.new_status
    }
}

/// recompute delinquency counters from the calendar.
///
/// idempotent: a pure function of loan state and `today`. resets to on-time
/// when nothing is due; otherwise charges every started week, capped at the
/// outstanding balance. escalated reminder states are left untouched here,
/// only the escalation machine advances them.
pub fn recompute_overdue(loan: &mut Loan, today: NaiveDate) -> OverdueChange {
    let old_status = loan.delinquency_status;

    if loan.next_due_date >= today || loan.outstanding.is_zero() {
        loan.clear_delinquency();
    } else {
        let days_overdue = (today - loan.next_due_date).num_days() as u32;
        let weeks_overdue = days_overdue / 7;
        let charged = loan.weekly_installment * Decimal::from(weeks_overdue + 1);

        loan.days_overdue = days_overdue;
        loan.weeks_overdue = weeks_overdue;
        loan.overdue_amount = charged.min(loan.outstanding);
        if loan.delinquency_status == DelinquencyStatus::OnTime {
            loan.delinquency_status = DelinquencyStatus::Late;
        }
    }

    OverdueChange {
        old_status,
        new_status: loan.delinquency_status,
        days_overdue: loan.days_overdue,
        overdue_amount: loan.overdue_amount,
    }
}
