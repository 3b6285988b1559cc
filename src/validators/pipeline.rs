use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    config::ValidatorConfig,
    core::record::{AnnotatedIndex, IdIndex, IndexSnapshot},
    validators::{
        AnyEntryValidator, AnyGroupValidator, DuplicateValueValidator, EntryValidator,
        GroupValidator, HtmlContentValidator, IdPatternValidator, InterpolationValidator,
        ValidatorContext, ValueMismatchValidator,
    },
};

/// Validators built from one configuration snapshot.
#[derive(Debug)]
pub struct ValidationPipeline {
    group_validators: Vec<AnyGroupValidator>,
    entry_validators: Vec<AnyEntryValidator>,
}

impl ValidationPipeline {
    pub fn from_config(config: &ValidatorConfig) -> Self {
        let mut group_validators: Vec<AnyGroupValidator> = Vec::new();
        if config.mismatching_values.enabled {
            group_validators.push(ValueMismatchValidator::new(config.mismatching_values.level).into());
        }

        let mut entry_validators: Vec<AnyEntryValidator> = Vec::new();
        if config.duplicate_values.enabled {
            entry_validators.push(DuplicateValueValidator::new(config.duplicate_values.level).into());
        }
        let id_pattern = &config.id_must_match_regex;
        if id_pattern.enabled {
            entry_validators.push(IdPatternValidator::new(id_pattern.level, &id_pattern.pattern).into());
        }
        if config.warn_for_html_tags.enabled {
            entry_validators.push(HtmlContentValidator::new(config.warn_for_html_tags.level).into());
        }
        if config.warn_for_interpolations.enabled {
            entry_validators.push(InterpolationValidator::new(config.warn_for_interpolations.level).into());
        }

        Self {
            group_validators,
            entry_validators,
        }
    }

    pub fn len(&self) -> usize {
        self.group_validators.len() + self.entry_validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every identifier group. `cleanup` runs on every validator
    /// once the groups are done, whether or not anything was flagged.
    pub fn run(&mut self, index: &IdIndex) -> AnnotatedIndex {
        self.group_validators.iter_mut().for_each(GroupValidator::initialize);
        self.entry_validators.iter_mut().for_each(EntryValidator::initialize);

        let mut annotated = AnnotatedIndex::new();
        for (id, entries) in index {
            let ctx = ValidatorContext { id, index };

            let mut group = entries.clone();
            for validator in &mut self.group_validators {
                validator.validate_group(&mut group, &ctx);
            }

            let group = group
                .into_iter()
                .map(|mut entry| {
                    for validator in &mut self.entry_validators {
                        if !entry.is_success() {
                            break;
                        }
                        entry = validator.validate(entry, &ctx);
                    }
                    entry
                })
                .collect();
            annotated.insert(id.clone(), group);
        }

        self.group_validators.iter_mut().for_each(GroupValidator::cleanup);
        self.entry_validators.iter_mut().for_each(EntryValidator::cleanup);
        annotated
    }
}

/// Run a fresh pipeline for `config` over `index`.
pub fn validate_index(index: &IdIndex, config: &ValidatorConfig) -> AnnotatedIndex {
    ValidationPipeline::from_config(config).run(index)
}

/// Keep an annotated index up to date with the raw index and configuration.
///
/// Recomputes whenever either input changes; bursts of changes within
/// `debounce` produce a single recomputation. The task ends when both input
/// channels are closed or every output receiver is dropped.
pub fn spawn_validation_service(
    mut index_rx: watch::Receiver<Arc<IndexSnapshot>>,
    mut config_rx: watch::Receiver<Arc<ValidatorConfig>>,
    debounce: Duration,
) -> (watch::Receiver<Arc<AnnotatedIndex>>, JoinHandle<()>) {
    let initial = validate_index(&index_rx.borrow_and_update().by_id, &config_rx.borrow_and_update());
    let (annotated_tx, annotated_rx) = watch::channel(Arc::new(initial));

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = index_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = config_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = annotated_tx.closed() => break,
            }
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }

            let snapshot = index_rx.borrow_and_update().clone();
            let config = config_rx.borrow_and_update().clone();
            let annotated = validate_index(&snapshot.by_id, &config);
            tracing::debug!(ids = annotated.len(), "validation pass finished");
            if annotated_tx.send(Arc::new(annotated)).is_err() {
                break;
            }
        }
    });

    (annotated_rx, handle)
}
