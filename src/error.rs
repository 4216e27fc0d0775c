/*!
Errors returned by the matching, agreement and gold annotation functions. Degenerate agreement
statistics are *not* errors unless the strict mode is requested: they are reported as
`Coefficient::Undefined`.
*/
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConcordError>;

/// Error type boxed by the `GoldWriter` implementors.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ConcordError {
    #[error("The annotation collection `{collection}` is empty. Both collections must contain at least one annotation")]
    EmptyCollection { collection: String },

    #[error("The annotations of the collection `{collection}` are not sorted by start offset (first out of order annotation at index {index})")]
    UnsortedCollection { collection: String, index: usize },

    #[error("The property `{property}` is not used by any annotation of the compared collections")]
    UnknownProperty { property: String },

    #[error("Invalid span [{start}, {end}): the start must be strictly smaller than the end")]
    InvalidSpan { start: usize, end: usize },

    #[error("A span needs at least one segment")]
    NoSegment,

    #[error("Agreement is undefined: {reason}")]
    DegenerateAgreement { reason: String },

    #[error("The label `{label}` is not numeric and cannot be used with the interval distance")]
    NonNumericLabel { label: String },

    #[error("The minimal overlap must be in [0, 1], got {0}")]
    InvalidOverlap(f64),

    #[error("Could not write the gold annotation for the span [{source_start}, {source_end}) tagged `{tag}` ({written} gold annotation(s) were written before the failure): {cause}")]
    WriteBack {
        written: usize,
        source_start: usize,
        source_end: usize,
        tag: String,
        #[source]
        cause: BoxedError,
    },

    #[error("Could not parse `{0}` into a comparison level. Use `tag` or `prop:<name>`")]
    ParseLevel(String),

    #[error("Could not parse `{0}` into a label distance. Use `binary` or `interval`")]
    ParseDistance(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
