/*!
This library compares annotation collections: two annotators annotate the same document and their
annotations are matched, measured for agreement and merged into gold annotations. It follows the
data model of CATMA-style annotation projects, where an annotation is a tagged range of characters
carrying property values.

# Matching
Two spans *overlap* if they share at least one character offset; spans that only touch each other
do not overlap. For every span of the source collection, the overlapping spans of the target
collection are the candidates, and the best match is the candidate whose boundaries are the closest
to the source span (`|Δstart| + |Δend|`). Ties are broken by the order of the target collection. A
source span without candidate is paired with `Match::Unmatched`.

Before matching, both collections are restricted to their common region: source spans starting
after the start of the last target span are dropped, and target spans starting after the end of the
last source span are dropped. This requires the spans to be sorted by start offset.

# Agreement
The pairs are converted into `(coder, item, label)` rows, where the label is the tag name or the
first value of a property. Three coefficients are computed on these rows:
* Scott's Pi
* Cohen's Kappa
* Krippendorff's Alpha

A coefficient whose computation divides by zero is `Coefficient::Undefined`, unless the agreement
is perfect. In strict mode, it is an error.

# Gold annotations
A source span becomes a gold annotation if its best match overlaps it by at least `min_overlap`, has
the same number of segments and (optionally) the same tag. Property values are copied only when
both annotators gave the same values. The gold annotations are persisted by a `GoldWriter`.

# Terminology
* A span is an annotation: one or more segments of a document, a tag and some properties.
* A collection is the list of the spans one annotator made on one document.
* The source collection is compared against the target collection. The comparison is not
    symmetric.
* A level is what is compared between two matched spans: their tag, or one of their properties.
*/

mod agreement;
mod collection;
mod config;
mod confusion;
mod error;
mod gold;
mod matcher;
mod pairing;
mod reporter;
mod span;
mod writer;

// The public api starts here
pub use span::{distance, overlap_fraction, overlaps, PropertyMap, Segment, Span, TagRef};

pub use collection::AnnotationCollection;

pub use matcher::{best_match, overlapping_candidates};

pub use pairing::{build_pairs, build_pairs_inner, Match, Pair, Pairing, PairingSummary};

pub use agreement::{
    compute_agreement, compute_agreement_inner, interpretation, to_task_rows, AgreementResult,
    AnnotationTask, Coefficient, CoefficientKind, Label, LabelDistance, Level, TaskRow,
};

pub use confusion::{confusion_matrix, ConfusionMatrix};

pub use gold::{
    create_gold_annotations, reconcile, reconcile_with, write_gold, GoldCandidate, GoldOptions,
    GoldSummary, GoldWriter, GOLD_AUTHOR,
};

pub use writer::{load_gold_records, GoldRecord, JsonLinesGoldWriter, MemoryGoldWriter};

pub use reporter::AgreementReport;

pub use config::{ConcordConfig, ConcordConfigBuilder};

pub use error::{BoxedError, ConcordError, Result};

use ndarray::parallel::prelude::*;

/// Main entrypoint of the Concord library. This function pairs the spans of `source` with the
/// spans of `target`, then computes the agreement coefficients and the confusion matrix of the
/// pairs. Instead of taking in the raw parameters, this function takes a `ConcordConfig` struct
/// and uses sensible defaults.
///
/// * `source`: Collection whose spans are matched.
/// * `target`: Collection the matches are searched in.
/// * `config`: Filters and options of the comparison.
///
/// # Example
/// ```rust
/// use concord::{compare_collections, AnnotationCollection, ConcordConfigBuilder, Span, TagRef};
///
/// let event = TagRef::new("t-1", "event");
/// let state = TagRef::new("t-2", "state");
/// let first = AnnotationCollection::new(
///     "first",
///     "doc",
///     vec![
///         Span::new("a", 0, 10, event.clone()).unwrap(),
///         Span::new("b", 20, 30, state.clone()).unwrap(),
///     ],
/// );
/// let second = AnnotationCollection::new(
///     "second",
///     "doc",
///     vec![
///         Span::new("c", 0, 9, event).unwrap(),
///         Span::new("d", 21, 30, state).unwrap(),
///     ],
/// );
///
/// let config = ConcordConfigBuilder::default().tag_filter(["event"]).build();
/// let report = compare_collections(&first, &second, &config).unwrap();
/// assert_eq!(report.summary.pairs, 1);
/// assert_eq!(report.summary.unmatched, 0);
/// ```
pub fn compare_collections(
    source: &AnnotationCollection,
    target: &AnnotationCollection,
    config: &ConcordConfig,
) -> Result<AgreementReport> {
    let pairing = build_pairs_inner(
        source,
        target,
        config.tag_filter(),
        config.filter_both(),
        config.level().property(),
        config.sort_unsorted(),
    )?;
    let result = compute_agreement_inner(
        &pairing.pairs,
        config.level(),
        config.include_empty(),
        config.distance(),
        config.strict(),
    )?;
    Ok(AgreementReport {
        summary: pairing.summary,
        result,
    })
}

/// Runs `compare_collections` on every `(source, target)` couple, in parallel. The reports are
/// returned in the order of `comparisons`.
pub fn compare_many(
    comparisons: &[(&AnnotationCollection, &AnnotationCollection)],
    config: &ConcordConfig,
) -> Vec<Result<AgreementReport>> {
    comparisons
        .par_iter()
        .map(|(source, target)| compare_collections(source, target, config))
        .collect()
}
