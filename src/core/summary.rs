//! Warning/error totals of an annotated index and the combined notification
//! shown when they change.

use std::fmt;

use crate::{
    config::NotificationConfig,
    core::record::AnnotatedIndex,
    issues::Severity,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub warnings: usize,
    pub errors: usize,
}

impl ValidationSummary {
    pub fn from_index(index: &AnnotatedIndex) -> Self {
        index
            .values()
            .flatten()
            .fold(Self::default(), |mut summary, entry| {
                match entry.record.state.severity() {
                    Some(Severity::Warning) => summary.warnings += 1,
                    Some(Severity::Error) => summary.errors += 1,
                    None => {}
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.warnings + self.errors
    }

    /// Counts below `minimum` are zeroed.
    pub fn at_least(self, minimum: Severity) -> Self {
        match minimum {
            Severity::Warning => self,
            Severity::Error => Self {
                warnings: 0,
                errors: self.errors,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Problems(ValidationSummary),
    AllResolved,
}

impl Notification {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Notification::Problems(summary) if summary.errors > 0 => Some(Severity::Error),
            Notification::Problems(_) => Some(Severity::Warning),
            Notification::AllResolved => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Problems(ValidationSummary { warnings, errors }) => {
                match (*warnings, *errors) {
                    (w, e) if w > 0 && e > 0 => {
                        write!(f, "There are {} errors and {} warnings", e, w)
                    }
                    (w, 0) => write!(f, "There are {} warnings", w),
                    (_, e) => write!(f, "There are {} errors", e),
                }
            }
            Notification::AllResolved => write!(f, "You resolved all warnings/errors."),
        }
    }
}

/// Turns a stream of summaries into notifications.
///
/// Emits only when the counts differ from the previous summary, stays quiet
/// while counts are zero from the start, and reports "all resolved" when they
/// drop back to zero.
#[derive(Debug, Default)]
pub struct Notifier {
    last: Option<ValidationSummary>,
    armed: bool,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        summary: ValidationSummary,
        config: &NotificationConfig,
    ) -> Option<Notification> {
        let summary = summary.at_least(config.minimum_level);
        if self.last == Some(summary) {
            return None;
        }
        self.last = Some(summary);

        if !self.armed {
            if summary.total() == 0 {
                return None;
            }
            self.armed = true;
        }
        if !config.enabled {
            return None;
        }

        Some(if summary.total() == 0 {
            Notification::AllResolved
        } else {
            Notification::Problems(summary)
        })
    }
}
