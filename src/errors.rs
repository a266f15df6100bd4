use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, ReminderId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("reminder not found: {id}")]
    ReminderNotFound {
        id: ReminderId,
    },

    #[error("vehicle not found in pricing source: {vehicle}")]
    VehicleNotFound {
        vehicle: String,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        id: LoanId,
        status: LoanStatus,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("storage failure: {message}")]
    Storage {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
