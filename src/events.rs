use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    DelinquencyStatus, LoanId, PaymentId, PaymentOutcome, ReminderChannel, ReminderId,
    ReminderLevel,
};

/// all events that can be emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanCreated {
        loan_id: LoanId,
        driver_id: String,
        vehicle_id: String,
        principal: Money,
        weekly_installment: Money,
        first_due_date: NaiveDate,
    },
    LoanCompleted {
        loan_id: LoanId,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDefaulted {
        loan_id: LoanId,
        outstanding: Money,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentReceived {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        outcome: PaymentOutcome,
        outstanding_after: Money,
        next_due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // delinquency events
    DelinquencyChanged {
        loan_id: LoanId,
        old_status: DelinquencyStatus,
        new_status: DelinquencyStatus,
        days_overdue: u32,
        overdue_amount: Money,
    },

    // reminder events
    ReminderSent {
        loan_id: LoanId,
        reminder_id: ReminderId,
        level: ReminderLevel,
        channel: ReminderChannel,
        timestamp: DateTime<Utc>,
    },
    ReminderFailed {
        loan_id: LoanId,
        level: ReminderLevel,
        channel: ReminderChannel,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    ReminderExpired {
        loan_id: LoanId,
        reminder_id: ReminderId,
        level: ReminderLevel,
        timestamp: DateTime<Utc>,
    },
    RemindersArchived {
        removed: usize,
        cutoff: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
