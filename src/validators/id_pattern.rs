use regex::Regex;

use crate::{
    config::ACCEPT_ANY_PATTERN,
    core::record::ByIdRecord,
    issues::{Rule, Severity},
    validators::{EntryValidator, ValidatorContext},
};

/// Flags identifiers not matching the configured pattern.
#[derive(Debug)]
pub struct IdPatternValidator {
    level: Severity,
    /// `None` accepts any id.
    pattern: Option<Regex>,
}

impl IdPatternValidator {
    /// An invalid `pattern` is logged and replaced by one accepting any id.
    pub fn new(level: Severity, pattern: &str) -> Self {
        let pattern = match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::error!(pattern, error = %e, "invalid id pattern, accepting any id");
                None
            }
        };
        Self { level, pattern }
    }

    pub fn pattern(&self) -> &str {
        self.pattern
            .as_ref()
            .map_or(ACCEPT_ANY_PATTERN, Regex::as_str)
    }
}

impl EntryValidator for IdPatternValidator {
    fn validate(&mut self, entry: ByIdRecord, _ctx: &ValidatorContext<'_>) -> ByIdRecord {
        if !entry.is_success() {
            return entry;
        }
        let Some(pattern) = &self.pattern else {
            return entry;
        };
        if pattern.is_match(entry.id()) {
            return entry;
        }
        let message = format!(
            "The id {} does not match required pattern: {}",
            entry.id(),
            pattern.as_str()
        );
        entry.flagged(self.level, Rule::IdPattern, message)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::validators::test_support::{entry, index_of};

    #[test]
    fn test_non_matching_id_is_flagged() {
        let index = index_of(&[("a.html", r#"<p i18n="home.title">x</p><p i18n="@@ok">y</p>"#)]);
        let ctx = ValidatorContext {
            id: "home.title",
            index: &index,
        };
        let mut validator = IdPatternValidator::new(Severity::Error, "^@@");

        let flagged = validator.validate(entry(&index, "home.title", 0), &ctx);
        let passed = validator.validate(entry(&index, "@@ok", 0), &ctx);

        assert_eq!(
            flagged.record.finding().unwrap().message,
            "The id home.title does not match required pattern: ^@@"
        );
        assert_eq!(flagged.record.state.severity(), Some(Severity::Error));
        assert!(passed.is_success());
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_accept_any() {
        let index = index_of(&[("a.html", r#"<p i18n="anything">x</p>"#)]);
        let ctx = ValidatorContext {
            id: "anything",
            index: &index,
        };
        let mut validator = IdPatternValidator::new(Severity::Warning, "(unclosed");

        assert_eq!(validator.pattern(), ACCEPT_ANY_PATTERN);
        assert!(validator.validate(entry(&index, "anything", 0), &ctx).is_success());
    }
}
