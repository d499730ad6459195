use thiserror::Error;

/// A search data source that violates the record shape or the entry invariants.
///
/// Returned by the source decoders and by [`SearchIndex::load`](super::SearchIndex::load).
/// Nothing is partially loaded when one of these is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedDataError {
    #[error("record {record} has no key")]
    MissingKey { record: usize },

    #[error("record {record}: entry '{key}' has no targets")]
    EmptyTargets { record: usize, key: String },

    #[error("record {record}: entry '{key}' is duplicated with identical targets")]
    DuplicateEntry { record: usize, key: String },

    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("record {record} is malformed: {message}")]
    Shape { record: usize, message: String },
}

impl MalformedDataError {
    /// Position of the offending record, when the error concerns one
    pub fn record(&self) -> Option<usize> {
        match self {
            Self::MissingKey { record }
            | Self::EmptyTargets { record, .. }
            | Self::DuplicateEntry { record, .. }
            | Self::Shape { record, .. } => Some(*record),
            Self::Syntax { .. } => None,
        }
    }

    /// The same error with its record position replaced
    pub fn with_record(mut self, position: usize) -> Self {
        match &mut self {
            Self::MissingKey { record }
            | Self::EmptyTargets { record, .. }
            | Self::DuplicateEntry { record, .. }
            | Self::Shape { record, .. } => *record = position,
            Self::Syntax { .. } => {}
        }
        self
    }

    pub(crate) fn shape(record: usize, message: impl Into<String>) -> Self {
        Self::Shape {
            record,
            message: message.into(),
        }
    }

    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}
