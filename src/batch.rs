use chrono::Months;
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};

use crate::engine::LoanEngine;
use crate::errors::{LedgerError, Result};
use crate::events::Event;
use crate::kpi::UnpaidKpis;
use crate::notify::{Delivery, NotificationSender};
use crate::reminder::Reminder;
use crate::schedule;
use crate::store::LoanStore;
use crate::types::{ReminderChannel, ReminderStatus};

/// tally of one reminder dispatch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    /// loans picked up by the candidate query
    pub eligible: usize,
    pub sent: usize,
    pub failed: usize,
    /// candidates turned away by the in-lock eligibility re-check
    pub skipped: usize,
}

enum DispatchAction {
    Skipped,
    Sent(Reminder),
    Failed(Reminder, String),
}

/// scheduled batch entry points. the daily order is overdue recompute,
/// then reminder dispatch, then the expiry sweep; kpis run weekly and
/// the archive job monthly.
impl<S: LoanStore, N: NotificationSender> LoanEngine<S, N> {
    /// recompute delinquency for every active loan as of today.
    ///
    /// aborts on the first storage error; loans already recomputed in
    /// this run stay updated. returns how many loans were processed.
    pub fn recompute_all_overdue(&mut self, time: &SafeTimeProvider) -> Result<usize> {
        let today = time.now().date_naive();
        let mut processed = 0usize;

        for loan_id in self.store.active_loan_ids() {
            let change = self
                .store
                .with_loan(loan_id, |loan, _| Ok(schedule::recompute_overdue(loan, today)))?;
            processed += 1;
            debug!(
                loan_id = %loan_id,
                status = ?change.new_status,
                days_overdue = change.days_overdue,
                "loan recomputed"
            );

            if change.status_changed() {
                self.events.emit(Event::DelinquencyChanged {
                    loan_id,
                    old_status: change.old_status,
                    new_status: change.new_status,
                    days_overdue: change.days_overdue,
                    overdue_amount: change.overdue_amount,
                });
            }
        }

        info!(processed, "overdue recompute finished");
        Ok(processed)
    }

    /// send the next reminder on the ladder for every eligible loan.
    ///
    /// one loan failing, whether at the provider or in storage, never
    /// stops the run. a provider failure persists a FAILED reminder and
    /// leaves the loan's ladder untouched so the next run retries it.
    pub fn dispatch_eligible_reminders(&mut self, time: &SafeTimeProvider) -> DispatchSummary {
        let now = time.now();
        let today = now.date_naive();

        let LoanEngine {
            store,
            notifier,
            escalation,
            events,
            ..
        } = self;

        let candidates = store.reminder_candidates(today);
        let mut summary = DispatchSummary {
            eligible: candidates.len(),
            ..Default::default()
        };

        for loan_id in candidates {
            let outcome = store.with_loan(loan_id, |loan, writes| {
                // the candidate query ran outside the lock, re-check here
                if !escalation.should_send(loan, today) {
                    return Ok(DispatchAction::Skipped);
                }

                let level = escalation.next_level(loan);
                let mut reminder = escalation.build_reminder(loan, level, now);

                // third-level reminders are call tasks for office staff,
                // recorded as sent without going through a push channel
                let delivery = if reminder.channel == ReminderChannel::PhoneCall {
                    None
                } else {
                    Some(notifier.send(reminder.channel, &loan.driver_contact, &reminder.message))
                };

                match delivery {
                    Some(Delivery::Failed { reason }) => {
                        reminder.status = ReminderStatus::Failed;
                        writes.append_reminder(reminder.clone());
                        Ok(DispatchAction::Failed(reminder, reason))
                    }
                    _ => {
                        let cooldown = escalation.policy.cooldown_for(level);
                        loan.record_reminder(level, today, cooldown);
                        writes.append_reminder(reminder.clone());
                        Ok(DispatchAction::Sent(reminder))
                    }
                }
            });

            match outcome {
                Ok(DispatchAction::Skipped) => {
                    summary.skipped += 1;
                    debug!(loan_id = %loan_id, "candidate no longer eligible");
                }
                Ok(DispatchAction::Sent(reminder)) => {
                    summary.sent += 1;
                    events.emit(Event::ReminderSent {
                        loan_id,
                        reminder_id: reminder.id,
                        level: reminder.level,
                        channel: reminder.channel,
                        timestamp: now,
                    });
                    info!(
                        loan_id = %loan_id,
                        level = ?reminder.level,
                        channel = ?reminder.channel,
                        "reminder sent"
                    );
                }
                Ok(DispatchAction::Failed(reminder, reason)) => {
                    summary.failed += 1;
                    events.emit(Event::ReminderFailed {
                        loan_id,
                        level: reminder.level,
                        channel: reminder.channel,
                        reason: reason.clone(),
                        timestamp: now,
                    });
                    warn!(loan_id = %loan_id, reason = %reason, "reminder delivery failed");
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(loan_id = %loan_id, error = %err, "reminder dispatch skipped loan");
                }
            }
        }

        info!(
            eligible = summary.eligible,
            sent = summary.sent,
            failed = summary.failed,
            skipped = summary.skipped,
            "reminder dispatch finished"
        );
        summary
    }

    /// flag sent reminders whose acknowledgement window has passed.
    ///
    /// expiry is informational, it never advances or resets the loan's
    /// escalation ladder. returns how many reminders were flagged.
    pub fn expire_stale_reminders(&mut self, time: &SafeTimeProvider) -> usize {
        let now = time.now();
        let mut expired = 0usize;

        for reminder in self.store.reminders_awaiting_ack() {
            if !self.escalation.is_expired(&reminder, now) {
                continue;
            }

            let marked = self.store.with_reminder(reminder.id, |r| {
                // an acknowledgement may have landed since the query
                if r.is_awaiting_ack() {
                    r.mark_expired();
                    Ok(true)
                } else {
                    Ok(false)
                }
            });

            match marked {
                Ok(true) => {
                    expired += 1;
                    self.events.emit(Event::ReminderExpired {
                        loan_id: reminder.loan_id,
                        reminder_id: reminder.id,
                        level: reminder.level,
                        timestamp: now,
                    });
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(reminder_id = %reminder.id, error = %err, "expiry sweep skipped reminder");
                }
            }
        }

        if expired > 0 {
            info!(expired, "stale reminders marked expired");
        }
        expired
    }

    /// bulk-delete reminders older than the retention window
    pub fn archive_old_reminders(&mut self, time: &SafeTimeProvider) -> Result<usize> {
        let now = time.now();
        let months = self.config.retention.reminder_retention_months;
        let cutoff = now
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("retention cutoff {months} months before {now} is out of range"),
            })?;

        let removed = self.store.purge_reminders_before(cutoff);
        if removed > 0 {
            self.events.emit(Event::RemindersArchived { removed, cutoff });
            info!(removed, %cutoff, "old reminders archived");
        }
        Ok(removed)
    }

    /// weekly collections snapshot over the active portfolio
    pub fn compute_weekly_kpis(&self, time: &SafeTimeProvider) -> UnpaidKpis {
        let today = time.now().date_naive();
        let kpis = UnpaidKpis::compute(today, &self.store.active_loans());

        info!(
            active = kpis.active_loans,
            unpaid = kpis.unpaid_driver_count,
            total_unpaid = %kpis.total_unpaid,
            "weekly kpis computed"
        );
        kpis
    }
}
