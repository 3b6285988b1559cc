use std::collections::{BTreeMap, HashMap};

use crate::{
    actions::Fixer,
    core::record::ByIdRecord,
    issues::{Rule, Severity},
    validators::{EntryValidator, ValidatorContext},
};

/// Flags a value already used under a different identifier in this run.
#[derive(Debug)]
pub struct DuplicateValueValidator {
    level: Severity,
    /// Value to the first identifier seen with it.
    seen: HashMap<String, String>,
}

impl DuplicateValueValidator {
    pub fn new(level: Severity) -> Self {
        Self {
            level,
            seen: HashMap::new(),
        }
    }
}

impl EntryValidator for DuplicateValueValidator {
    fn validate(&mut self, entry: ByIdRecord, ctx: &ValidatorContext<'_>) -> ByIdRecord {
        if !entry.is_success() {
            return entry;
        }
        let Some(value) = entry.value() else {
            return entry;
        };

        match self.seen.get(value) {
            Some(existing) if existing != entry.id() => {
                let existing = existing.clone();
                let usages = BTreeMap::from([
                    (existing.clone(), ctx.files_using(&existing)),
                    (entry.id().to_string(), ctx.files_using(entry.id())),
                ]);
                entry
                    .flagged(
                        self.level,
                        Rule::DuplicateValue,
                        format!("The translation has the same value as {}", existing),
                    )
                    .with_fixer(Fixer::ReplaceId { usages })
            }
            Some(_) => entry,
            None => {
                self.seen.insert(value.to_string(), entry.id().to_string());
                entry
            }
        }
    }

    fn cleanup(&mut self) {
        self.seen.clear();
    }
}
