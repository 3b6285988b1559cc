use crate::{
    actions::Fixer,
    core::record::{ByIdRecord, ExtractionMode},
    issues::{Rule, Severity},
    validators::{EntryValidator, ValidatorContext},
};

/// Flags content-mode values that contain nested elements.
#[derive(Debug)]
pub struct HtmlContentValidator {
    level: Severity,
}

impl HtmlContentValidator {
    pub fn new(level: Severity) -> Self {
        Self { level }
    }
}

impl EntryValidator for HtmlContentValidator {
    fn validate(&mut self, entry: ByIdRecord, ctx: &ValidatorContext<'_>) -> ByIdRecord {
        if !entry.is_success() {
            return entry;
        }
        let nested = entry.record.mode == ExtractionMode::Content
            && entry.record.element.has_child_elements;
        if !nested {
            return entry;
        }
        let fixer = Fixer::FlattenContent {
            id: entry.id().to_string(),
            files: ctx.files_using(entry.id()),
        };
        entry
            .flagged(
                self.level,
                Rule::HtmlContent,
                "This translation contains HTML tag. This is not recommended!",
            )
            .with_fixer(fixer)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::validators::test_support::{entry, index_of};

    #[test]
    fn test_nested_markup_is_flagged_with_flatten_fix() {
        let index = index_of(&[
            ("a.html", r#"<div i18n="@@t">Hello <b>World</b></div>"#),
            ("b.html", r#"<div i18n="@@t">Hello <b>World</b></div>"#),
        ]);
        let ctx = ValidatorContext {
            id: "@@t",
            index: &index,
        };

        let flagged = HtmlContentValidator::new(Severity::Warning).validate(entry(&index, "@@t", 0), &ctx);

        assert_eq!(flagged.record.finding().unwrap().rule, Rule::HtmlContent);
        match flagged.record.fixer.unwrap() {
            Fixer::FlattenContent { id, files } => {
                assert_eq!(id, "@@t");
                assert_eq!(files.len(), 2);
            }
            other => panic!("unexpected fixer {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_and_attribute_values_pass() {
        let index = index_of(&[(
            "a.html",
            r#"<p i18n="@@plain">a &lt; b</p><img i18n-alt="@@alt" alt="<b>x</b>">"#,
        )]);
        let ctx = ValidatorContext {
            id: "@@plain",
            index: &index,
        };
        let mut validator = HtmlContentValidator::new(Severity::Warning);

        assert!(validator.validate(entry(&index, "@@plain", 0), &ctx).is_success());
        assert!(validator.validate(entry(&index, "@@alt", 0), &ctx).is_success());
    }
}
