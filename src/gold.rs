/*!
Synthesis of gold annotations out of two annotation collections. A source span becomes a gold
annotation when its best match in the target collection overlaps it enough, has the same number of
segments and, optionally, the same tag. The gold annotations are then handed to a `GoldWriter`,
which persists them.
*/
use crate::collection::AnnotationCollection;
use crate::error::{ConcordError, Result};
use crate::matcher::{best_match, overlapping_candidates};
use crate::span::{overlap_fraction, PropertyMap, Segment, Span, TagRef};
use ahash::AHashSet;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Author of every gold annotation.
pub const GOLD_AUTHOR: &str = "auto_gold";

/// A gold annotation waiting to be written. It copies the segments and the tag of the source
/// span it comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldCandidate {
    pub source_id: String,
    pub segments: Vec<Segment>,
    pub tag: TagRef,
    pub properties: PropertyMap,
    pub author: String,
}

impl GoldCandidate {
    pub fn start(&self) -> usize {
        self.segments.first().map_or(0, |s| s.start)
    }

    pub fn end(&self) -> usize {
        self.segments.last().map_or(0, |s| s.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoldOptions {
    /// Spans with one of these tag names are ignored, in both collections.
    pub excluded_tags: AHashSet<String>,
    /// Minimal overlap fraction between a source span and its best match.
    pub min_overlap: f64,
    /// The source span and its best match must have the same tag id.
    pub require_same_tag: bool,
    /// Copy the values of a property only if both spans have the same values. If false, every
    /// property of the gold annotation is empty.
    pub copy_properties_if_equal: bool,
}

impl Default for GoldOptions {
    fn default() -> Self {
        Self {
            excluded_tags: AHashSet::new(),
            min_overlap: 1.0,
            require_same_tag: true,
            copy_properties_if_equal: true,
        }
    }
}

/// Returns the gold candidates of `source` against `target`. See `reconcile_with`.
pub fn reconcile(
    source: &AnnotationCollection,
    target: &AnnotationCollection,
    excluded_tags: &AHashSet<String>,
    min_overlap: f64,
    require_same_tag: bool,
    copy_properties_if_equal: bool,
) -> Result<Vec<GoldCandidate>> {
    let options = GoldOptions {
        excluded_tags: excluded_tags.clone(),
        min_overlap,
        require_same_tag,
        copy_properties_if_equal,
    };
    reconcile_with(source, target, &options)
}

/// Returns the gold candidates of `source` against `target`, in the order of the source spans.
/// A source span without any overlapping target span is skipped.
pub fn reconcile_with(
    source: &AnnotationCollection,
    target: &AnnotationCollection,
    options: &GoldOptions,
) -> Result<Vec<GoldCandidate>> {
    if !(0.0..=1.0).contains(&options.min_overlap) {
        return Err(ConcordError::InvalidOverlap(options.min_overlap));
    }
    let (sources, targets) = considered_spans(source, target, &options.excluded_tags);
    let candidates = sources
        .into_iter()
        .filter_map(|s| {
            let overlapping = overlapping_candidates(s, &targets);
            let matched = best_match(s, &overlapping)?;
            if accepts(s, matched, options) {
                Some(gold_candidate(s, matched, options.copy_properties_if_equal))
            } else {
                debug!("The annotation {} is rejected by its best match {}", s, matched);
                None
            }
        })
        .collect();
    Ok(candidates)
}

fn considered_spans<'a>(
    source: &'a AnnotationCollection,
    target: &'a AnnotationCollection,
    excluded_tags: &AHashSet<String>,
) -> (Vec<&'a Span>, Vec<&'a Span>) {
    let keep = |s: &&Span| !excluded_tags.contains(&s.tag().name);
    (
        source.iter().filter(keep).collect(),
        target.iter().filter(keep).collect(),
    )
}

fn accepts(source: &Span, matched: &Span, options: &GoldOptions) -> bool {
    overlap_fraction(source, matched) >= options.min_overlap
        && source.segment_count() == matched.segment_count()
        && (!options.require_same_tag || source.tag().id == matched.tag().id)
}

fn gold_candidate(source: &Span, matched: &Span, copy_properties_if_equal: bool) -> GoldCandidate {
    let properties = source
        .properties()
        .iter()
        .map(|(name, values)| {
            let equal = values.as_slice() == matched.property(name).unwrap_or(&[]);
            let values = if copy_properties_if_equal && equal {
                values.clone()
            } else {
                vec![]
            };
            (name.clone(), values)
        })
        .collect();
    GoldCandidate {
        source_id: String::from(source.id()),
        segments: source.segments().to_vec(),
        tag: source.tag().clone(),
        properties,
        author: String::from(GOLD_AUTHOR),
    }
}

/// Persistence of the gold annotations.
pub trait GoldWriter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persists the candidate and returns the identity it was given.
    fn write(&mut self, candidate: &GoldCandidate) -> std::result::Result<String, Self::Error>;
}

/// Writes the candidates in order and returns their new identities. On failure, the error names
/// the source span of the failing candidate. The candidates written before it stay written.
pub fn write_gold<W: GoldWriter>(candidates: &[GoldCandidate], writer: &mut W) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match writer.write(candidate) {
            Ok(id) => ids.push(id),
            Err(e) => {
                return Err(ConcordError::WriteBack {
                    written: ids.len(),
                    source_start: candidate.start(),
                    source_end: candidate.end(),
                    tag: candidate.tag.name.clone(),
                    cause: Box::new(e),
                })
            }
        }
    }
    Ok(ids)
}

/// Outcome of `create_gold_annotations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoldSummary {
    pub source: String,
    pub target: String,
    pub gold: String,
    /// Number of source spans considered, excluded tags left out.
    pub source_spans: usize,
    /// Number of target spans considered, excluded tags left out.
    pub target_spans: usize,
    pub written: usize,
}

impl Display for GoldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Found {} annotations in annotation collection: '{}'.",
            self.source_spans, self.source
        )?;
        writeln!(
            f,
            "Found {} annotations in annotation collection: '{}'.",
            self.target_spans, self.target
        )?;
        writeln!(f, "-------------")?;
        write!(
            f,
            "Wrote {} gold annotations into annotation collection '{}'.",
            self.written, self.gold
        )
    }
}

/// Reconciles `source` with `target` and writes the gold candidates with `writer`.
/// `gold` is the name of the collection the writer writes into.
pub fn create_gold_annotations<W: GoldWriter>(
    source: &AnnotationCollection,
    target: &AnnotationCollection,
    gold: &str,
    options: &GoldOptions,
    writer: &mut W,
) -> Result<GoldSummary> {
    let candidates = reconcile_with(source, target, options)?;
    let ids = write_gold(&candidates, writer)?;
    let (sources, targets) = considered_spans(source, target, &options.excluded_tags);
    let summary = GoldSummary {
        source: String::from(source.name()),
        target: String::from(target.name()),
        gold: String::from(gold),
        source_spans: sources.len(),
        target_spans: targets.len(),
        written: ids.len(),
    };
    info!(
        "Wrote {} gold annotations into `{}` ({} annotations in `{}`, {} in `{}`)",
        summary.written,
        summary.gold,
        summary.source_spans,
        summary.source,
        summary.target_spans,
        summary.target
    );
    Ok(summary)
}
