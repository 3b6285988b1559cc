use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::{
    actions::Fixer,
    core::record::ByIdRecord,
    issues::{Rule, Severity},
    validators::{GroupValidator, ValidatorContext},
};

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n\r]").unwrap());
static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^}]+\}\}").unwrap());
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());

/// Comparison form of a value: no line breaks, every interpolation reduced
/// to `{}`, runs of spaces collapsed.
pub fn normalize_value(value: &str) -> String {
    let value = LINE_BREAKS.replace_all(value, "");
    let value = INTERPOLATION.replace_all(&value, "{}");
    SPACE_RUNS.replace_all(&value, " ").into_owned()
}

/// Flags every record of an identifier whose values disagree.
#[derive(Debug)]
pub struct ValueMismatchValidator {
    level: Severity,
}

impl ValueMismatchValidator {
    pub fn new(level: Severity) -> Self {
        Self { level }
    }
}

impl GroupValidator for ValueMismatchValidator {
    fn validate_group(&mut self, entries: &mut Vec<ByIdRecord>, ctx: &ValidatorContext<'_>) {
        let normalized: Vec<String> = entries
            .iter()
            .filter_map(|entry| entry.value())
            .map(normalize_value)
            .collect();
        let Some(first) = normalized.first() else {
            return;
        };
        if normalized.len() < 2 || normalized.iter().all(|value| value == first) {
            return;
        }

        let mut values: Vec<String> = Vec::new();
        for value in entries.iter().filter_map(|entry| entry.value()) {
            if !values.iter().any(|known| known == value) {
                values.push(value.to_string());
            }
        }
        let files: BTreeSet<String> = entries.iter().map(|entry| entry.file.clone()).collect();
        let fixer = Fixer::UnifyValue {
            id: ctx.id.to_string(),
            values,
            files,
        };

        *entries = std::mem::take(entries)
            .into_iter()
            .map(|entry| {
                if entry.value().is_none() || !entry.is_success() {
                    return entry;
                }
                entry
                    .flagged(
                        self.level,
                        Rule::ValueMismatch,
                        "There are other items registered with this ID whose value do not match!",
                    )
                    .with_fixer(fixer.clone())
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::validators::test_support::index_of;

    fn run(index: &crate::core::record::IdIndex, id: &str) -> Vec<ByIdRecord> {
        let mut entries = index[id].clone();
        ValueMismatchValidator::new(Severity::Error).validate_group(
            &mut entries,
            &ValidatorContext { id, index },
        );
        entries
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("Hi {{name}}"), "Hi {}");
        assert_eq!(normalize_value("Hi\n   {{ other.x }}  there"), "Hi {} there");
    }

    #[test]
    fn test_interpolations_differing_only_by_expression_match() {
        let index = index_of(&[
            ("a.html", r#"<p i18n="@@x">Hi {{name}}</p>"#),
            ("b.html", r#"<p i18n="@@x">Hi {{other}}</p>"#),
        ]);

        assert!(run(&index, "@@x").iter().all(ByIdRecord::is_success));
    }

    #[test]
    fn test_different_text_flags_whole_group() {
        let index = index_of(&[
            ("a.html", r#"<p i18n="@@y">Hi</p>"#),
            ("b.html", r#"<p i18n="@@y">Hello</p><p i18n="@@y">Hi</p>"#),
        ]);

        let entries = run(&index, "@@y");

        assert_eq!(entries.len(), 3);
        for entry in &entries {
            let finding = entry.record.finding().unwrap();
            assert_eq!(finding.rule, Rule::ValueMismatch);
            assert_eq!(finding.severity, Severity::Error);
        }
        let actions: Vec<String> = entries[0]
            .record
            .fixer
            .as_ref()
            .unwrap()
            .actions()
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert_eq!(actions, vec!["Use \"Hi\"", "Use \"Hello\""]);
    }

    #[test]
    fn test_single_record_and_error_records_untouched() {
        let index = index_of(&[(
            "a.html",
            r#"<p i18n="@@z">Hi</p><img i18n-alt="@@z">"#,
        )]);

        let entries = run(&index, "@@z");

        assert!(entries[0].is_success());
        assert_eq!(
            entries[1].record.finding().unwrap().rule,
            Rule::Extraction
        );
    }
}
