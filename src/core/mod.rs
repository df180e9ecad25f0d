//! Comment extraction engine.
//!
//! Per file the data flows one way:
//!
//! ```text
//! source ─▶ scanner (spans) ─▶ aggregate (comment units) ─▶ associate (context) ─▶ record
//! ```
//!
//! Language rules come from the static [`language`] table. Nothing here keeps state
//! between files, so files can be processed in parallel.

pub mod aggregate;
pub mod associate;
pub mod docstring;
pub mod error;
pub mod file_scanner;
pub mod language;
pub mod pipeline;
pub mod record;
pub mod scanner;
pub mod scope;
pub mod span;

pub use aggregate::{Aggregator, CommentKind, CommentUnit};
pub use associate::{Associator, ContextSnippet, DEFAULT_CONTEXT_LINES};
pub use docstring::{Owner, OwnerKind};
pub use error::{ExtractError, LexWarning, ScanError, WarningKind};
pub use language::{ExtensionMap, Language, LanguageProfile, resolve};
pub use pipeline::{ExtractOptions, extract, extract_file};
pub use record::{FileRecords, Record, emit};
pub use scanner::{Scanner, scan};
pub use scope::{Scope, ScopeIndex, ScopeKind};
pub use span::{Anomaly, LineIndex, Span, SpanKind};
