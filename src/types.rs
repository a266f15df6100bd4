use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// unique identifier for a reminder
pub type ReminderId = Uuid;

/// opaque reference to a borrower in the driver registry
pub type DriverRef = String;

/// opaque reference to a financed vehicle
pub type VehicleRef = String;

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// repaying on the weekly schedule
    Active,
    /// outstanding reached zero, terminal
    Completed,
    /// written off after collection failed, terminal
    Defaulted,
}

/// coarse delinquency tag summarizing how far escalation has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelinquencyStatus {
    /// nothing currently past due
    OnTime,
    /// overdue but no reminder sent yet
    Late,
    /// first chat reminder sent
    Reminded1,
    /// second chat reminder sent
    Reminded2,
    /// phone call escalation logged
    RemindedPhone,
    /// formal final notice sent
    RemindedFinal,
}

impl DelinquencyStatus {
    /// delinquency tag matching a reminder level that was just sent
    pub fn for_level(level: ReminderLevel) -> Self {
        match level {
            ReminderLevel::First => DelinquencyStatus::Reminded1,
            ReminderLevel::Second => DelinquencyStatus::Reminded2,
            ReminderLevel::Third => DelinquencyStatus::RemindedPhone,
            ReminderLevel::Final => DelinquencyStatus::RemindedFinal,
        }
    }

    pub fn is_on_time(&self) -> bool {
        matches!(self, DelinquencyStatus::OnTime)
    }
}

/// ordinal position in the escalation ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReminderLevel {
    First,
    Second,
    Third,
    Final,
}

impl ReminderLevel {
    /// 1-indexed ladder position as stored on the loan
    pub fn as_index(&self) -> u8 {
        match self {
            ReminderLevel::First => 1,
            ReminderLevel::Second => 2,
            ReminderLevel::Third => 3,
            ReminderLevel::Final => 4,
        }
    }

    /// level for a stored index, none for 0 (never reminded)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(ReminderLevel::First),
            2 => Some(ReminderLevel::Second),
            3 => Some(ReminderLevel::Third),
            4 => Some(ReminderLevel::Final),
            _ => None,
        }
    }

    /// next rung up the ladder, final has no successor
    pub fn next(&self) -> Self {
        match self {
            ReminderLevel::First => ReminderLevel::Second,
            ReminderLevel::Second => ReminderLevel::Third,
            ReminderLevel::Third => ReminderLevel::Final,
            ReminderLevel::Final => ReminderLevel::Final,
        }
    }

    /// delivery channel for this rung
    pub fn channel(&self) -> ReminderChannel {
        match self {
            ReminderLevel::First | ReminderLevel::Second => ReminderChannel::Chat,
            ReminderLevel::Third => ReminderChannel::PhoneCall,
            ReminderLevel::Final => ReminderChannel::Sms,
        }
    }
}

/// delivery channel for a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderChannel {
    /// primary in-app chat channel
    Chat,
    /// manual phone call, logged without automatic delivery
    PhoneCall,
    /// formal sms notice
    Sms,
}

/// reminder delivery status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderStatus {
    Sent,
    Acknowledged,
    Failed,
    Expired,
}

/// how a payment was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    BankTransfer,
    MobileMoney,
    Cash,
    Card,
}

/// timeliness of a payment against the due date it settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// settled before the due date
    PaidInAdvance,
    /// settled exactly on the due date
    PaidOnTime,
    /// settled within the minor-lateness window after the due date
    PaidLateMinor,
    /// settled past the minor-lateness window
    PaidLateMajor,
}

impl PaymentOutcome {
    /// classify by signed days between payment date and due date
    pub fn from_days_late(days_late: i64, minor_cutoff_days: u32) -> Self {
        if days_late < 0 {
            PaymentOutcome::PaidInAdvance
        } else if days_late == 0 {
            PaymentOutcome::PaidOnTime
        } else if days_late <= i64::from(minor_cutoff_days) {
            PaymentOutcome::PaidLateMinor
        } else {
            PaymentOutcome::PaidLateMajor
        }
    }
}

/// ageing bucket for overdue balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    /// overdue up to 7 days
    UpToWeek,
    /// overdue 8 to 30 days
    UpToMonth,
    /// overdue beyond 30 days
    OverMonth,
}

impl AgeBucket {
    pub fn for_days(days_overdue: u32) -> Self {
        match days_overdue {
            0..=7 => AgeBucket::UpToWeek,
            8..=30 => AgeBucket::UpToMonth,
            _ => AgeBucket::OverMonth,
        }
    }
}
