/*!
Pairing of two annotation collections of the same document. Every source span (after filtering)
gives exactly one `Pair`: either with its best matching target span, or with `Match::Unmatched`
when no target span overlaps it.
*/
use crate::collection::{
    check_sorted, filter_by_property, filter_by_tag, restrict_to_common_region,
    AnnotationCollection,
};
use crate::error::{ConcordError, Result};
use crate::matcher::{best_match, overlapping_candidates};
use crate::span::{overlap_fraction, Span};
use ahash::AHashSet;
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt::Display;

/// Target side of a pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Match<'a> {
    Matched(&'a Span),
    /// No target span overlaps the source span.
    Unmatched,
}

impl<'a> Match<'a> {
    pub fn span(&self) -> Option<&'a Span> {
        match self {
            Match::Matched(s) => Some(s),
            Match::Unmatched => None,
        }
    }
    pub fn is_matched(&self) -> bool {
        matches!(self, Match::Matched(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair<'a> {
    pub source: &'a Span,
    pub target: Match<'a>,
}

impl<'a> Pair<'a> {
    pub fn new(source: &'a Span, target: Match<'a>) -> Self {
        Self { source, target }
    }
    /// Overlap fraction of the source and target spans. `None` for an unmatched pair.
    pub fn overlap_fraction(&self) -> Option<f64> {
        self.target.span().map(|t| overlap_fraction(self.source, t))
    }
    pub fn is_matched(&self) -> bool {
        self.target.is_matched()
    }
}

/// Counts describing a pairing. This is what gets logged once the pairing is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairingSummary {
    pub source: String,
    pub target: String,
    /// Number of pairs, matched or not.
    pub pairs: usize,
    pub unmatched: usize,
    /// Mean overlap fraction of the matched pairs. `None` when no pair is matched.
    pub mean_overlap: Option<f64>,
}

impl PairingSummary {
    pub fn matched(&self) -> usize {
        self.pairs - self.unmatched
    }
}

impl Display for PairingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Finished search for overlapping annotations in:")?;
        writeln!(f, "- {}", self.source)?;
        writeln!(f, "- {}", self.target)?;
        writeln!(f, "Could match {} annotations.", self.pairs)?;
        match self.mean_overlap {
            Some(mean) => writeln!(f, "Average overlap is {:.2} %.", mean * 100.)?,
            None => writeln!(f, "Average overlap is undefined (no matched annotation).")?,
        }
        write!(
            f,
            "Couldn't match {} annotation(s) in first annotation collection.",
            self.unmatched
        )
    }
}

/// Result of `build_pairs`. The pairs borrow the spans of the compared collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing<'a> {
    pub pairs: Vec<Pair<'a>>,
    pub summary: PairingSummary,
}

impl<'a> Pairing<'a> {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Pairs every span of `source` with its best match in `target`.
///
/// * `tag_filter`: if given, only the source spans with one of these tag names are kept.
/// * `filter_both`: apply the `tag_filter` to the target spans too.
/// * `property_filter`: if given, only the spans holding a value for this property are kept, on
///   both sides.
///
/// The spans of both collections must be sorted by ascending start. Unsorted collections are
/// rejected; use `build_pairs_inner` to sort them instead.
pub fn build_pairs<'a>(
    source: &'a AnnotationCollection,
    target: &'a AnnotationCollection,
    tag_filter: Option<&AHashSet<String>>,
    filter_both: bool,
    property_filter: Option<&str>,
) -> Result<Pairing<'a>> {
    build_pairs_inner(
        source,
        target,
        tag_filter,
        filter_both,
        property_filter,
        false,
    )
}

/// Same as `build_pairs`. If `sort_unsorted` is true, unsorted collections are sorted by start
/// (stable sort) with a warning instead of being rejected.
pub fn build_pairs_inner<'a>(
    source: &'a AnnotationCollection,
    target: &'a AnnotationCollection,
    tag_filter: Option<&AHashSet<String>>,
    filter_both: bool,
    property_filter: Option<&str>,
    sort_unsorted: bool,
) -> Result<Pairing<'a>> {
    let source_spans = filter_by_tag(source.spans(), tag_filter);
    let target_spans = if filter_both {
        filter_by_tag(target.spans(), tag_filter)
    } else {
        filter_by_tag(target.spans(), None)
    };
    let source_spans = ensure_sorted(source_spans, source.name(), sort_unsorted)?;
    let target_spans = ensure_sorted(target_spans, target.name(), sort_unsorted)?;
    if let Some(property) = property_filter {
        if !source.uses_property(property) && !target.uses_property(property) {
            return Err(ConcordError::UnknownProperty {
                property: String::from(property),
            });
        }
    }
    let (mut source_spans, mut target_spans) =
        restrict_to_common_region(source_spans, target_spans, source.name(), target.name())?;
    if let Some(property) = property_filter {
        source_spans = filter_by_property(source_spans, property);
        target_spans = filter_by_property(target_spans, property);
    }
    let pairs = pair_spans(&source_spans, &target_spans);
    let summary = summarize(&pairs, source.name(), target.name());
    info!(
        "Paired `{}` with `{}`: {} pairs, {} unmatched, mean overlap {}",
        summary.source,
        summary.target,
        summary.pairs,
        summary.unmatched,
        summary
            .mean_overlap
            .map_or_else(|| String::from("undefined"), |m| format!("{:.2} %", m * 100.))
    );
    Ok(Pairing { pairs, summary })
}

fn ensure_sorted<'a>(
    mut spans: Vec<&'a Span>,
    collection: &str,
    sort_unsorted: bool,
) -> Result<Vec<&'a Span>> {
    match check_sorted(&spans, collection) {
        Ok(()) => Ok(spans),
        Err(e) if sort_unsorted => {
            warn!("{}. Sorting the annotations by start offset", e);
            spans.sort_by_key(|s| s.start());
            Ok(spans)
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn pair_spans<'a>(source: &[&'a Span], target: &[&'a Span]) -> Vec<Pair<'a>> {
    source
        .iter()
        .map(|&s| {
            let candidates = overlapping_candidates(s, target);
            match best_match(s, &candidates) {
                Some(t) => Pair::new(s, Match::Matched(t)),
                None => {
                    debug!("No match found for the annotation {} ({})", s, s.id());
                    Pair::new(s, Match::Unmatched)
                }
            }
        })
        .collect()
}

fn summarize(pairs: &[Pair], source: &str, target: &str) -> PairingSummary {
    let fractions: Vec<f64> = pairs.iter().filter_map(Pair::overlap_fraction).collect();
    let mean_overlap = if fractions.is_empty() {
        None
    } else {
        Some(fractions.iter().sum::<f64>() / fractions.len() as f64)
    };
    PairingSummary {
        source: String::from(source),
        target: String::from(target),
        pairs: pairs.len(),
        unmatched: pairs.len() - fractions.len(),
        mean_overlap,
    }
}
