use std::collections::HashSet;

use crate::types::ReminderChannel;

/// outcome reported by a notification provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered { provider_reference: String },
    Failed { reason: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered { .. })
    }
}

/// external notification collaborator.
///
/// one attempt per escalation cycle; any non-success outcome is treated as
/// failed and retried on the next eligible cycle, never within the same one.
pub trait NotificationSender {
    fn send(&mut self, channel: ReminderChannel, recipient: &str, message: &str) -> Delivery;
}

/// outgoing notice captured by the in-memory sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub channel: ReminderChannel,
    pub recipient: String,
    pub message: String,
}

/// mock sender for testing, records notices and fails on demand
#[derive(Debug, Default)]
pub struct MemorySender {
    sent: Vec<SentNotice>,
    rejected_recipients: HashSet<String>,
}

impl MemorySender {
    pub fn new() -> Self {
        Self::default()
    }

    /// make every send to this recipient fail
    pub fn reject_recipient(&mut self, recipient: &str) {
        self.rejected_recipients.insert(recipient.to_string());
    }

    pub fn sent(&self) -> &[SentNotice] {
        &self.sent
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }
}

impl NotificationSender for MemorySender {
    fn send(&mut self, channel: ReminderChannel, recipient: &str, message: &str) -> Delivery {
        if self.rejected_recipients.contains(recipient) {
            return Delivery::Failed {
                reason: "provider rejected recipient".to_string(),
            };
        }

        self.sent.push(SentNotice {
            channel,
            recipient: recipient.to_string(),
            message: message.to_string(),
        });
        Delivery::Delivered {
            provider_reference: format!("mem-{}", self.sent.len()),
        }
    }
}
