use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EscalationPolicy;
use crate::decimal::Money;
use crate::loan::Loan;
use crate::types::{LoanId, ReminderChannel, ReminderId, ReminderLevel, ReminderStatus};

/// one escalation event sent for a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub loan_id: LoanId,
    pub channel: ReminderChannel,
    pub level: ReminderLevel,
    pub status: ReminderStatus,
    pub message: String,
    pub recipient: String,
    /// delinquency snapshot at send time
    pub overdue_amount: Money,
    pub days_overdue: u32,
    pub sent_at: DateTime<Utc>,
    /// earliest follow-up instant implied by this level's cooldown
    pub next_reminder_due: DateTime<Utc>,
    pub acknowledged: bool,
}

impl Reminder {
    pub fn acknowledge(&mut self) {
        self.status = ReminderStatus::Acknowledged;
        self.acknowledged = true;
    }

    pub fn mark_expired(&mut self) {
        self.status = ReminderStatus::Expired;
    }

    /// sent and still waiting on the borrower
    pub fn is_awaiting_ack(&self) -> bool {
        self.status == ReminderStatus::Sent && !self.acknowledged
    }
}

/// decides when a delinquent loan gets its next reminder and builds the
/// outgoing record; the ladder only ever moves forward
pub struct EscalationEngine {
    pub policy: EscalationPolicy,
}

impl EscalationEngine {
    pub fn new(policy: EscalationPolicy) -> Self {
        Self { policy }
    }

    /// whether a new reminder may go out for this loan today.
    ///
    /// nothing goes out without an overdue balance on an active loan. once
    /// a reminder exists, the current level's cooldown must have elapsed;
    /// an overdue loan that was never reminded is eligible immediately.
    pub fn should_send(&self, loan: &Loan, today: NaiveDate) -> bool {
        if !loan.is_overdue() {
            return false;
        }
        if !loan.is_active() {
            return false;
        }
        match (loan.current_reminder_level(), loan.last_reminder_date) {
            (Some(level), Some(last)) => {
                (today - last).num_days() >= i64::from(self.policy.cooldown_for(level))
            }
            _ => true,
        }
    }

    /// next rung up from the loan's position, capped at final
    pub fn next_level(&self, loan: &Loan) -> ReminderLevel {
        match loan.current_reminder_level() {
            Some(level) => level.next(),
            None => ReminderLevel::First,
        }
    }

    /// render the level's template with the loan's current numbers
    pub fn build_message(&self, loan: &Loan, level: ReminderLevel) -> String {
        self.policy
            .templates
            .for_level(level)
            .replace("{weekly_amount}", &loan.weekly_installment.to_string())
            .replace("{overdue_amount}", &loan.overdue_amount.to_string())
            .replace("{days_overdue}", &loan.days_overdue.to_string())
    }

    /// assemble the record for a send attempt, snapshotting the loan's
    /// delinquency numbers
    pub fn build_reminder(&self, loan: &Loan, level: ReminderLevel, sent_at: DateTime<Utc>) -> Reminder {
        let cooldown_days = self.policy.cooldown_for(level);
        Reminder {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            channel: level.channel(),
            level,
            status: ReminderStatus::Sent,
            message: self.build_message(loan, level),
            recipient: loan.driver_contact.clone(),
            overdue_amount: loan.overdue_amount,
            days_overdue: loan.days_overdue,
            sent_at,
            next_reminder_due: sent_at + Duration::days(i64::from(cooldown_days)),
            acknowledged: false,
        }
    }

    /// informational check: a sent, unacknowledged reminder counts as
    /// expired once its level window has fully passed. expiry never drives
    /// escalation, that stays cooldown-based.
    pub fn is_expired(&self, reminder: &Reminder, now: DateTime<Utc>) -> bool {
        if !reminder.is_awaiting_ack() {
            return false;
        }
        (now - reminder.sent_at).num_hours() > i64::from(self.policy.expiry_for(reminder.level))
    }
}
