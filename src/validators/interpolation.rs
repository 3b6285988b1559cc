use crate::{
    core::record::ByIdRecord,
    issues::{Rule, Severity},
    validators::{EntryValidator, ValidatorContext},
};

const INTERPOLATION_START: &str = "{{";

/// Flags values containing `{{ }}` interpolations.
#[derive(Debug)]
pub struct InterpolationValidator {
    level: Severity,
}

impl InterpolationValidator {
    pub fn new(level: Severity) -> Self {
        Self { level }
    }
}

impl EntryValidator for InterpolationValidator {
    fn validate(&mut self, entry: ByIdRecord, _ctx: &ValidatorContext<'_>) -> ByIdRecord {
        if !entry.is_success() {
            return entry;
        }
        if !entry.value().is_some_and(|v| v.contains(INTERPOLATION_START)) {
            return entry;
        }
        entry.flagged(
            self.level,
            Rule::Interpolation,
            "This translation contains interpolations. This is not recommended!",
        )
    }
}
