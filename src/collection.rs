/*!
An annotation collection is the list of annotations one annotator made on one document. The
collection loader must give the spans sorted by ascending `start`; this module only checks it.
*/
use crate::error::{ConcordError, Result};
use crate::span::Span;
use ahash::AHashSet;
use serde::Serialize;
use std::slice::Iter;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationCollection {
    name: String,
    document: String,
    spans: Vec<Span>,
}

impl AnnotationCollection {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, document: D, spans: Vec<Span>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
            spans,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the annotated document.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Span> {
        self.spans.iter()
    }

    /// Checks that the spans are sorted by ascending start.
    pub fn check_sorted(&self) -> Result<()> {
        check_sorted(&self.spans.iter().collect::<Vec<_>>(), &self.name)
    }

    /// Returns a copy of this collection with its spans sorted by start. The sort is stable.
    pub fn into_sorted(mut self) -> Self {
        self.spans.sort_by_key(Span::start);
        self
    }

    /// Returns `true` if at least one span has the property `name`.
    pub fn uses_property(&self, name: &str) -> bool {
        self.spans.iter().any(|s| s.property(name).is_some())
    }
}

impl<'a> IntoIterator for &'a AnnotationCollection {
    type Item = &'a Span;
    type IntoIter = Iter<'a, Span>;
    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

pub(crate) fn check_sorted(spans: &[&Span], collection: &str) -> Result<()> {
    match spans
        .windows(2)
        .position(|w| w[1].start() < w[0].start())
    {
        Some(i) => Err(ConcordError::UnsortedCollection {
            collection: String::from(collection),
            index: i + 1,
        }),
        None => Ok(()),
    }
}

/// Keeps the spans whose tag name is in `tag_filter`. Keeps everything when there is no filter.
pub(crate) fn filter_by_tag<'a>(
    spans: &'a [Span],
    tag_filter: Option<&AHashSet<String>>,
) -> Vec<&'a Span> {
    match tag_filter {
        Some(filter) => spans
            .iter()
            .filter(|s| filter.contains(&s.tag().name))
            .collect(),
        None => spans.iter().collect(),
    }
}

/// Drops the parts of the document annotated by only one of the annotators at the end of the
/// document. Source spans starting after the start of the last target span are dropped, and target
/// spans starting after the end of the last source span are dropped.
pub(crate) fn restrict_to_common_region<'a>(
    source: Vec<&'a Span>,
    target: Vec<&'a Span>,
    source_name: &str,
    target_name: &str,
) -> Result<(Vec<&'a Span>, Vec<&'a Span>)> {
    let source_last_end = source
        .last()
        .map(|s| s.end())
        .ok_or_else(|| ConcordError::EmptyCollection {
            collection: String::from(source_name),
        })?;
    let target_last_start = target
        .last()
        .map(|s| s.start())
        .ok_or_else(|| ConcordError::EmptyCollection {
            collection: String::from(target_name),
        })?;
    let source = source
        .into_iter()
        .filter(|s| s.start() <= target_last_start)
        .collect();
    let target = target
        .into_iter()
        .filter(|s| s.start() <= source_last_end)
        .collect();
    Ok((source, target))
}

/// Keeps the spans holding at least one value for `property`.
pub(crate) fn filter_by_property<'a>(spans: Vec<&'a Span>, property: &str) -> Vec<&'a Span> {
    spans
        .into_iter()
        .filter(|s| s.has_property_value(property))
        .collect()
}
