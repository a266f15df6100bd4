use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClassificationPolicy;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::Loan;
use crate::schedule::{self, OverdueChange};
use crate::types::{LoanId, PaymentId, PaymentMethod, PaymentOutcome};

/// incoming settlement event, from a gateway webhook or manual entry
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub loan_id: LoanId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub external_reference: Option<String>,
    pub recorded_by: String,
}

impl PaymentRequest {
    /// input validation, runs before any loan state is read
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: self.amount });
        }
        Ok(())
    }
}

/// append-only settlement record, never edited after persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    /// the due date this payment was measured against
    pub due_date_settled: NaiveDate,
    pub method: PaymentMethod,
    pub outcome: PaymentOutcome,
    pub external_reference: Option<String>,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

/// what a payment did to the loan
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub outstanding_after: Money,
    pub next_due_date: NaiveDate,
    pub completed: bool,
    pub delinquency: OverdueChange,
}

/// applies settlements to a loan and recomputes its schedule
pub struct PaymentProcessor {
    policy: ClassificationPolicy,
}

impl PaymentProcessor {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self { policy }
    }

    /// apply a payment against the loan's working copy.
    ///
    /// the outcome is classified against the due date in effect when the
    /// payment lands, then the due date is recomputed from cumulative paid
    /// so partial payments never advance it and overpayments advance it by
    /// whole weeks.
    pub fn apply(
        &self,
        loan: &mut Loan,
        request: &PaymentRequest,
        today: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> Result<PaymentReceipt> {
        request.validate()?;

        if !loan.is_active() {
            return Err(LedgerError::LoanNotActive {
                id: loan.id,
                status: loan.status,
            });
        }

        let due_date_settled = loan.next_due_date;
        let days_late = (today - due_date_settled).num_days();
        let outcome =
            PaymentOutcome::from_days_late(days_late, self.policy.late_minor_cutoff_days);

        let payment = Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            amount: request.amount,
            payment_date: today,
            due_date_settled,
            method: request.method,
            outcome,
            external_reference: request.external_reference.clone(),
            recorded_by: request.recorded_by.clone(),
            recorded_at,
        };

        loan.record_payment(request.amount, today);
        loan.next_due_date =
            schedule::next_due_date(loan.start_date, loan.total_paid, loan.weekly_installment);

        let delinquency = schedule::recompute_overdue(loan, today);

        let completed = loan.outstanding.is_zero();
        if completed {
            loan.mark_completed();
        }

        Ok(PaymentReceipt {
            payment,
            outstanding_after: loan.outstanding,
            next_due_date: loan.next_due_date,
            completed,
            delinquency,
        })
    }
}
