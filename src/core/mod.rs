//! Indexing engine: template parsing, marker extraction, the live indices and
//! span queries over parsed templates.

pub mod aggregator;
pub mod context;
pub mod parsers;
pub mod query;
pub mod record;
pub mod scanner;
pub mod summary;
pub mod walker;

pub use aggregator::{FileChange, ResultAggregator, ScanFailure, ScanReport, ScanState};
pub use context::ProjectContext;
pub use record::{AnnotatedIndex, ByIdRecord, FileIndex, IdIndex, IndexSnapshot, OccurrenceRecord};
pub use summary::{Notification, Notifier, ValidationSummary};
