use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::errors::{LedgerError, Result};
use crate::loan::Loan;
use crate::payment::Payment;
use crate::reminder::Reminder;
use crate::types::{LoanId, ReminderId};

/// appends staged while a loan entry is held exclusively; committed with
/// the loan mutation or discarded with it
#[derive(Debug, Default)]
pub struct LoanWrites {
    payments: Vec<Payment>,
    reminders: Vec<Reminder>,
}

impl LoanWrites {
    pub fn append_payment(&mut self, payment: Payment) {
        self.payments.push(payment);
    }

    pub fn append_reminder(&mut self, reminder: Reminder) {
        self.reminders.push(reminder);
    }
}

/// persistence seam for loans, their payment ledger and their reminders.
///
/// `with_loan` is the unit of atomicity: every mutation of one loan runs
/// serialized against that loan, and staged ledger appends land together
/// with the loan update or not at all.
pub trait LoanStore {
    fn insert_loan(&self, loan: Loan) -> Result<()>;

    fn loan(&self, id: LoanId) -> Result<Loan>;

    /// run `f` with exclusive access to one loan record. commits the
    /// working copy and staged appends iff `f` returns Ok.
    fn with_loan<R, F>(&self, id: LoanId, f: F) -> Result<R>
    where
        F: FnOnce(&mut Loan, &mut LoanWrites) -> Result<R>;

    fn active_loan_ids(&self) -> Vec<LoanId>;

    fn active_loans(&self) -> Vec<Loan>;

    fn overdue_active_loans(&self) -> Vec<Loan>;

    /// active, non-on-time loans whose follow-up date is unset or reached
    fn reminder_candidates(&self, today: NaiveDate) -> Vec<LoanId>;

    fn payments_for(&self, loan_id: LoanId) -> Vec<Payment>;

    fn reminders_for(&self, loan_id: LoanId) -> Vec<Reminder>;

    fn reminders_awaiting_ack(&self) -> Vec<Reminder>;

    /// run `f` against one reminder in place, status flips only
    fn with_reminder<R, F>(&self, id: ReminderId, f: F) -> Result<R>
    where
        F: FnOnce(&mut Reminder) -> Result<R>;

    /// bulk-delete reminders sent before the cutoff, returns how many
    fn purge_reminders_before(&self, cutoff: DateTime<Utc>) -> usize;
}

/// everything belonging to one loan behind a single map entry
#[derive(Debug)]
struct LoanSlot {
    loan: Loan,
    payments: Vec<Payment>,
    reminders: Vec<Reminder>,
}

/// in-memory store backed by a concurrent map with one entry per loan.
///
/// holding an entry's exclusive ref serializes all mutation for that loan
/// while leaving other loans free to proceed in parallel.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<LoanId, LoanSlot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_count(&self) -> usize {
        self.slots.len()
    }
}

impl LoanStore for MemoryStore {
    fn insert_loan(&self, loan: Loan) -> Result<()> {
        self.slots.insert(
            loan.id,
            LoanSlot {
                loan,
                payments: Vec::new(),
                reminders: Vec::new(),
            },
        );
        Ok(())
    }

    fn loan(&self, id: LoanId) -> Result<Loan> {
        self.slots
            .get(&id)
            .map(|slot| slot.loan.clone())
            .ok_or(LedgerError::LoanNotFound { id })
    }

    fn with_loan<R, F>(&self, id: LoanId, f: F) -> Result<R>
    where
        F: FnOnce(&mut Loan, &mut LoanWrites) -> Result<R>,
    {
        let mut slot = self
            .slots
            .get_mut(&id)
            .ok_or(LedgerError::LoanNotFound { id })?;

        let mut working = slot.loan.clone();
        let mut writes = LoanWrites::default();
        let result = f(&mut working, &mut writes)?;

        slot.loan = working;
        slot.payments.extend(writes.payments);
        slot.reminders.extend(writes.reminders);
        Ok(result)
    }

    fn active_loan_ids(&self) -> Vec<LoanId> {
        self.slots
            .iter()
            .filter(|slot| slot.loan.is_active())
            .map(|slot| slot.loan.id)
            .collect()
    }

    fn active_loans(&self) -> Vec<Loan> {
        self.slots
            .iter()
            .filter(|slot| slot.loan.is_active())
            .map(|slot| slot.loan.clone())
            .collect()
    }

    fn overdue_active_loans(&self) -> Vec<Loan> {
        self.slots
            .iter()
            .filter(|slot| slot.loan.is_active() && slot.loan.is_overdue())
            .map(|slot| slot.loan.clone())
            .collect()
    }

    fn reminder_candidates(&self, today: NaiveDate) -> Vec<LoanId> {
        self.slots
            .iter()
            .filter(|slot| {
                let loan = &slot.loan;
                loan.is_active()
                    && !loan.delinquency_status.is_on_time()
                    && loan.next_reminder_due.map_or(true, |due| due <= today)
            })
            .map(|slot| slot.loan.id)
            .collect()
    }

    fn payments_for(&self, loan_id: LoanId) -> Vec<Payment> {
        self.slots
            .get(&loan_id)
            .map(|slot| slot.payments.clone())
            .unwrap_or_default()
    }

    fn reminders_for(&self, loan_id: LoanId) -> Vec<Reminder> {
        self.slots
            .get(&loan_id)
            .map(|slot| slot.reminders.clone())
            .unwrap_or_default()
    }

    fn reminders_awaiting_ack(&self) -> Vec<Reminder> {
        self.slots
            .iter()
            .flat_map(|slot| {
                slot.reminders
                    .iter()
                    .filter(|r| r.is_awaiting_ack())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn with_reminder<R, F>(&self, id: ReminderId, f: F) -> Result<R>
    where
        F: FnOnce(&mut Reminder) -> Result<R>,
    {
        for mut slot in self.slots.iter_mut() {
            if let Some(reminder) = slot.reminders.iter_mut().find(|r| r.id == id) {
                return f(reminder);
            }
        }
        Err(LedgerError::ReminderNotFound { id })
    }

    fn purge_reminders_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for mut slot in self.slots.iter_mut() {
            let before = slot.reminders.len();
            slot.reminders.retain(|r| r.sent_at >= cutoff);
            removed += before - slot.reminders.len();
        }
        removed
    }
}
