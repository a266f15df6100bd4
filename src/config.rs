use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::types::ReminderLevel;

/// engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub term: TermPolicy,
    pub classification: ClassificationPolicy,
    pub escalation: EscalationPolicy,
    pub retention: RetentionPolicy,
}

/// contract term shape for weekly amortization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermPolicy {
    pub term_months: u32,
    /// weeks charged per contract month, a deliberate approximation
    /// (calendar weeks are not tracked exactly against months)
    pub weeks_per_month: u32,
}

impl TermPolicy {
    /// total installments over the contract
    pub fn total_weeks(&self) -> u32 {
        self.term_months * self.weeks_per_month
    }
}

/// payment timeliness classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationPolicy {
    /// days late up to which a payment counts as minor lateness
    pub late_minor_cutoff_days: u32,
}

/// reminder ladder timing and wording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// minimum days between reminders, indexed by ladder position
    pub cooldown_days: [u32; 4],
    /// acknowledgement window in hours before a sent reminder counts as expired
    pub expiry_hours: [u32; 4],
    pub templates: MessageTemplates,
}

impl EscalationPolicy {
    pub fn cooldown_for(&self, level: ReminderLevel) -> u32 {
        self.cooldown_days[usize::from(level.as_index() - 1)]
    }

    pub fn expiry_for(&self, level: ReminderLevel) -> u32 {
        self.expiry_hours[usize::from(level.as_index() - 1)]
    }
}

/// reminder message templates, parameterized by {weekly_amount},
/// {overdue_amount} and {days_overdue}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplates {
    pub first: String,
    pub second: String,
    pub third: String,
    pub final_notice: String,
}

impl MessageTemplates {
    pub fn for_level(&self, level: ReminderLevel) -> &str {
        match level {
            ReminderLevel::First => &self.first,
            ReminderLevel::Second => &self.second,
            ReminderLevel::Third => &self.third,
            ReminderLevel::Final => &self.final_notice,
        }
    }
}

/// housekeeping windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// months a reminder is kept before the archive job deletes it
    pub reminder_retention_months: u32,
}

impl EngineConfig {
    /// standard vehicle-financing configuration: 36-month contract repaid
    /// over 144 weekly installments
    pub fn standard() -> Self {
        Self {
            term: TermPolicy {
                term_months: 36,
                weeks_per_month: 4,
            },
            classification: ClassificationPolicy {
                late_minor_cutoff_days: 7,
            },
            escalation: EscalationPolicy {
                cooldown_days: [3, 5, 7, 14],
                expiry_hours: [72, 120, 168, 336],
                templates: MessageTemplates {
                    first: "Friendly reminder: your weekly installment of {weekly_amount} is overdue. Outstanding overdue amount: {overdue_amount}.".to_string(),
                    second: "Second reminder: {overdue_amount} is overdue by {days_overdue} days. Please settle your weekly installment of {weekly_amount}.".to_string(),
                    third: "Call scheduled regarding overdue balance of {overdue_amount} ({days_overdue} days overdue).".to_string(),
                    final_notice: "FINAL NOTICE: {overdue_amount} overdue by {days_overdue} days. Immediate settlement required to avoid contract termination.".to_string(),
                },
            },
            retention: RetentionPolicy {
                reminder_retention_months: 6,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.term.term_months == 0 || self.term.weeks_per_month == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "contract term must cover at least one week".to_string(),
            });
        }
        if self.escalation.cooldown_days.iter().any(|&d| d == 0) {
            return Err(LedgerError::InvalidConfiguration {
                message: "reminder cooldowns must be at least one day".to_string(),
            });
        }
        if self.escalation.expiry_hours.iter().any(|&h| h == 0) {
            return Err(LedgerError::InvalidConfiguration {
                message: "reminder expiry windows must be at least one hour".to_string(),
            });
        }
        let templates = &self.escalation.templates;
        if [&templates.first, &templates.second, &templates.third, &templates.final_notice]
            .iter()
            .any(|t| t.trim().is_empty())
        {
            return Err(LedgerError::InvalidConfiguration {
                message: "reminder templates must not be empty".to_string(),
            });
        }
        if self.retention.reminder_retention_months == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "reminder retention must be at least one month".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_config() {
        let config = EngineConfig::standard();
        assert_eq!(config.term.total_weeks(), 144);
        assert_eq!(config.classification.late_minor_cutoff_days, 7);
        assert_eq!(config.retention.reminder_retention_months, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cooldown_and_expiry_by_level() {
        let config = EngineConfig::standard();
        assert_eq!(config.escalation.cooldown_for(ReminderLevel::First), 3);
        assert_eq!(config.escalation.cooldown_for(ReminderLevel::Second), 5);
        assert_eq!(config.escalation.cooldown_for(ReminderLevel::Third), 7);
        assert_eq!(config.escalation.cooldown_for(ReminderLevel::Final), 14);

        assert_eq!(config.escalation.expiry_for(ReminderLevel::First), 72);
        assert_eq!(config.escalation.expiry_for(ReminderLevel::Final), 336);
    }

    #[test]
    fn test_validate_rejects_zero_term() {
        let mut config = EngineConfig::standard();
        config.term.term_months = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_template() {
        let mut config = EngineConfig::standard();
        config.escalation.templates.second = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cooldown() {
        let mut config = EngineConfig::standard();
        config.escalation.cooldown_days[2] = 0;
        assert!(config.validate().is_err());
    }
}
