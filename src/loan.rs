use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::schedule;
use crate::types::{DelinquencyStatus, DriverRef, LoanId, LoanStatus, ReminderLevel, VehicleRef};

/// one ledger entity per financed vehicle assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    // identification
    pub id: LoanId,
    pub driver_id: DriverRef,
    pub vehicle_id: VehicleRef,
    /// contact the escalation machine addresses reminders to
    pub driver_contact: String,

    // contract terms, fixed at creation
    pub principal: Money,
    pub weekly_installment: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // repayment progress
    pub status: LoanStatus,
    pub total_paid: Money,
    pub outstanding: Money,
    pub last_payment_date: Option<NaiveDate>,
    pub next_due_date: NaiveDate,

    // delinquency counters
    pub days_overdue: u32,
    pub weeks_overdue: u32,
    pub overdue_amount: Money,
    pub delinquency_status: DelinquencyStatus,

    // escalation ladder position
    pub reminder_level: u8,
    pub last_reminder_date: Option<NaiveDate>,
    pub next_reminder_due: Option<NaiveDate>,

    // audit
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// create a new loan from a vehicle price, deriving the weekly schedule
    pub fn originate(
        driver_id: DriverRef,
        vehicle_id: VehicleRef,
        driver_contact: String,
        principal: Money,
        start_date: NaiveDate,
        config: &EngineConfig,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: principal });
        }

        let weekly_installment = schedule::weekly_installment(principal, &config.term);
        let end_date = schedule::end_date(start_date, config.term.term_months)?;

        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            vehicle_id,
            driver_contact,
            principal,
            weekly_installment,
            start_date,
            end_date,
            status: LoanStatus::Active,
            total_paid: Money::ZERO,
            outstanding: principal,
            last_payment_date: None,
            next_due_date: schedule::first_due_date(start_date),
            days_overdue: 0,
            weeks_overdue: 0,
            overdue_amount: Money::ZERO,
            delinquency_status: DelinquencyStatus::OnTime,
            reminder_level: 0,
            last_reminder_date: None,
            next_reminder_due: None,
            created_at,
        })
    }

    /// check if the loan still accepts payments and reminders
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    pub fn is_overdue(&self) -> bool {
        self.overdue_amount.is_positive()
    }

    /// ladder rung of the last reminder sent, none if never reminded
    pub fn current_reminder_level(&self) -> Option<ReminderLevel> {
        ReminderLevel::from_index(self.reminder_level)
    }

    /// apply a settlement to the running totals, outstanding floors at zero
    pub fn record_payment(&mut self, amount: Money, payment_date: NaiveDate) {
        self.total_paid += amount;
        self.outstanding = (self.outstanding - amount).max(Money::ZERO);
        self.last_payment_date = Some(payment_date);
    }

    /// advance the escalation ladder after a reminder went out
    pub fn record_reminder(&mut self, level: ReminderLevel, today: NaiveDate, cooldown_days: u32) {
        self.reminder_level = level.as_index();
        self.last_reminder_date = Some(today);
        self.next_reminder_due = Some(today + chrono::Duration::days(i64::from(cooldown_days)));
        self.delinquency_status = DelinquencyStatus::for_level(level);
    }

    /// wipe all delinquency and escalation state back to on-time
    pub fn clear_delinquency(&mut self) {
        self.delinquency_status = DelinquencyStatus::OnTime;
        self.days_overdue = 0;
        self.weeks_overdue = 0;
        self.overdue_amount = Money::ZERO;
        self.reminder_level = 0;
        self.last_reminder_date = None;
        self.next_reminder_due = None;
    }

    /// terminal transition once outstanding reaches zero
    pub fn mark_completed(&mut self) {
        self.status = LoanStatus::Completed;
        self.clear_delinquency();
    }

    /// terminal transition for written-off contracts
    pub fn mark_defaulted(&mut self) {
        self.status = LoanStatus::Defaulted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn originate_standard(principal: Money) -> Result<Loan> {
        Loan::originate(
            "driver-1".to_string(),
            "vehicle-1".to_string(),
            "+22570000001".to_string(),
            principal,
            date(2024, 1, 1),
            &EngineConfig::standard(),
            Utc::now(),
        )
    }

    #[test]
    fn test_originate_derives_schedule() {
        let loan = originate_standard(Money::from_major(14_400_000)).unwrap();

        assert_eq!(loan.weekly_installment, Money::from_major(100_000));
        assert_eq!(loan.next_due_date, date(2024, 1, 8));
        assert_eq!(loan.end_date, date(2027, 1, 1));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.outstanding, Money::from_major(14_400_000));
        assert_eq!(loan.delinquency_status, DelinquencyStatus::OnTime);
        assert_eq!(loan.reminder_level, 0);
    }

    #[test]
    fn test_originate_rejects_non_positive_principal() {
        assert!(matches!(
            originate_standard(Money::ZERO),
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(matches!(
            originate_standard(Money::from_major(-500)),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_record_payment_floors_outstanding() {
        let mut loan = originate_standard(Money::from_major(300)).unwrap();
        loan.record_payment(Money::from_major(500), date(2024, 1, 5));

        assert_eq!(loan.total_paid, Money::from_major(500));
        assert_eq!(loan.outstanding, Money::ZERO);
        assert_eq!(loan.last_payment_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_record_reminder_advances_ladder() {
        let mut loan = originate_standard(Money::from_major(14_400_000)).unwrap();
        loan.record_reminder(ReminderLevel::Second, date(2024, 2, 1), 5);

        assert_eq!(loan.reminder_level, 2);
        assert_eq!(loan.current_reminder_level(), Some(ReminderLevel::Second));
        assert_eq!(loan.delinquency_status, DelinquencyStatus::Reminded2);
        assert_eq!(loan.last_reminder_date, Some(date(2024, 2, 1)));
        assert_eq!(loan.next_reminder_due, Some(date(2024, 2, 6)));
    }

    #[test]
    fn test_mark_completed_resets_delinquency() {
        let mut loan = originate_standard(Money::from_major(14_400_000)).unwrap();
        loan.record_reminder(ReminderLevel::Final, date(2024, 3, 1), 14);
        loan.days_overdue = 40;
        loan.weeks_overdue = 5;
        loan.overdue_amount = Money::from_major(600_000);

        loan.mark_completed();

        assert_eq!(loan.status, LoanStatus::Completed);
        assert!(!loan.is_active());
        assert_eq!(loan.delinquency_status, DelinquencyStatus::OnTime);
        assert_eq!(loan.reminder_level, 0);
        assert_eq!(loan.overdue_amount, Money::ZERO);
        assert_eq!(loan.next_reminder_due, None);
    }

    #[test]
    fn test_loan_serialization_round_trip() {
        let loan = originate_standard(Money::from_major(14_400_000)).unwrap();
        let json = serde_json::to_string(&loan).unwrap();
        let back: Loan = serde_json::from_str(&json).unwrap();
        assert_eq!(loan, back);
    }
}
