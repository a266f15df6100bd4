pub mod batch;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod kpi;
pub mod loan;
pub mod notify;
pub mod payment;
pub mod pricing;
pub mod reminder;
pub mod schedule;
pub mod store;
pub mod types;

// re-export key types
pub use batch::DispatchSummary;
pub use config::{
    ClassificationPolicy, EngineConfig, EscalationPolicy, MessageTemplates, RetentionPolicy,
    TermPolicy,
};
pub use decimal::{Money, Rate};
pub use engine::LoanEngine;
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use kpi::{AgeBreakdown, ReminderDistribution, UnpaidKpis};
pub use loan::Loan;
pub use notify::{Delivery, MemorySender, NotificationSender};
pub use payment::{Payment, PaymentProcessor, PaymentReceipt, PaymentRequest};
pub use pricing::{StaticPricing, VehiclePricing};
pub use reminder::{EscalationEngine, Reminder};
pub use store::{LoanStore, LoanWrites, MemoryStore};
pub use types::{
    AgeBucket, DelinquencyStatus, LoanId, LoanStatus, PaymentId, PaymentMethod, PaymentOutcome,
    ReminderChannel, ReminderId, ReminderLevel, ReminderStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
