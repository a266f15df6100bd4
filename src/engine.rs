use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::notify::NotificationSender;
use crate::payment::{Payment, PaymentProcessor, PaymentReceipt, PaymentRequest};
use crate::pricing::VehiclePricing;
use crate::reminder::{EscalationEngine, Reminder};
use crate::store::LoanStore;
use crate::types::{DriverRef, LoanId, ReminderId, VehicleRef};

/// central coordinator for the loan ledger.
///
/// owns the portfolio store, the notification channel and the policy
/// engines, and emits events for everything that changes state. all time
/// flows in through the injected provider so batch runs are replayable.
pub struct LoanEngine<S: LoanStore, N: NotificationSender> {
    pub config: EngineConfig,
    pub store: S,
    pub notifier: N,
    pub payments: PaymentProcessor,
    pub escalation: EscalationEngine,
    pub events: EventStore,
}

impl<S: LoanStore, N: NotificationSender> LoanEngine<S, N> {
    pub fn new(config: EngineConfig, store: S, notifier: N) -> Result<Self> {
        config.validate()?;
        let payments = PaymentProcessor::new(config.classification.clone());
        let escalation = EscalationEngine::new(config.escalation.clone());

        Ok(Self {
            config,
            store,
            notifier,
            payments,
            escalation,
            events: EventStore::new(),
        })
    }

    /// originate a loan for a driver taking over a vehicle. the principal
    /// is the vehicle price and the weekly schedule starts today.
    pub fn create_loan(
        &mut self,
        driver_id: DriverRef,
        vehicle_id: VehicleRef,
        driver_contact: String,
        pricing: &dyn VehiclePricing,
        time: &SafeTimeProvider,
    ) -> Result<Loan> {
        let price = pricing.vehicle_price(&vehicle_id)?;
        let now = time.now();

        let loan = Loan::originate(
            driver_id,
            vehicle_id,
            driver_contact,
            price,
            now.date_naive(),
            &self.config,
            now,
        )?;
        self.store.insert_loan(loan.clone())?;

        self.events.emit(Event::LoanCreated {
            loan_id: loan.id,
            driver_id: loan.driver_id.clone(),
            vehicle_id: loan.vehicle_id.clone(),
            principal: loan.principal,
            weekly_installment: loan.weekly_installment,
            first_due_date: loan.next_due_date,
        });
        info!(
            loan_id = %loan.id,
            vehicle_id = %loan.vehicle_id,
            weekly_installment = %loan.weekly_installment,
            "loan originated"
        );

        Ok(loan)
    }

    /// record a settlement against a loan. the request is validated before
    /// any loan state is read; ledger append and loan update commit
    /// together or not at all.
    pub fn record_payment(
        &mut self,
        request: PaymentRequest,
        time: &SafeTimeProvider,
    ) -> Result<PaymentReceipt> {
        request.validate()?;

        let now = time.now();
        let today = now.date_naive();

        let processor = &self.payments;
        let receipt = self.store.with_loan(request.loan_id, |loan, writes| {
            let receipt = processor.apply(loan, &request, today, now)?;
            writes.append_payment(receipt.payment.clone());
            Ok(receipt)
        })?;

        self.events.emit(Event::PaymentReceived {
            loan_id: receipt.payment.loan_id,
            payment_id: receipt.payment.id,
            amount: receipt.payment.amount,
            outcome: receipt.payment.outcome,
            outstanding_after: receipt.outstanding_after,
            next_due_date: receipt.next_due_date,
            timestamp: now,
        });
        if receipt.delinquency.status_changed() {
            self.events.emit(Event::DelinquencyChanged {
                loan_id: receipt.payment.loan_id,
                old_status: receipt.delinquency.old_status,
                new_status: receipt.delinquency.new_status,
                days_overdue: receipt.delinquency.days_overdue,
                overdue_amount: receipt.delinquency.overdue_amount,
            });
        }
        if receipt.completed {
            let loan = self.store.loan(receipt.payment.loan_id)?;
            self.events.emit(Event::LoanCompleted {
                loan_id: loan.id,
                total_paid: loan.total_paid,
                timestamp: now,
            });
            info!(loan_id = %loan.id, total_paid = %loan.total_paid, "loan fully repaid");
        }

        info!(
            loan_id = %receipt.payment.loan_id,
            amount = %receipt.payment.amount,
            outcome = ?receipt.payment.outcome,
            outstanding = %receipt.outstanding_after,
            "payment recorded"
        );

        Ok(receipt)
    }

    /// mark a dispatched reminder as acknowledged by the driver
    pub fn acknowledge_reminder(&mut self, reminder_id: ReminderId) -> Result<Reminder> {
        let reminder = self.store.with_reminder(reminder_id, |r| {
            r.acknowledge();
            Ok(r.clone())
        })?;

        info!(
            reminder_id = %reminder.id,
            loan_id = %reminder.loan_id,
            "reminder acknowledged"
        );
        Ok(reminder)
    }

    /// write off an active loan after collection has been abandoned
    pub fn mark_defaulted(&mut self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<Loan> {
        let now = time.now();

        let loan = self.store.with_loan(loan_id, |loan, _| {
            if !loan.is_active() {
                return Err(LedgerError::LoanNotActive {
                    id: loan.id,
                    status: loan.status,
                });
            }
            loan.mark_defaulted();
            Ok(loan.clone())
        })?;

        self.events.emit(Event::LoanDefaulted {
            loan_id,
            outstanding: loan.outstanding,
            timestamp: now,
        });
        warn!(loan_id = %loan.id, outstanding = %loan.outstanding, "loan written off");

        Ok(loan)
    }

    pub fn loan(&self, id: LoanId) -> Result<Loan> {
        self.store.loan(id)
    }

    pub fn payments_for(&self, loan_id: LoanId) -> Vec<Payment> {
        self.store.payments_for(loan_id)
    }

    pub fn reminders_for(&self, loan_id: LoanId) -> Vec<Reminder> {
        self.store.reminders_for(loan_id)
    }

    /// active loans currently carrying an overdue amount
    pub fn overdue_loans(&self) -> Vec<Loan> {
        self.store.overdue_active_loans()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
