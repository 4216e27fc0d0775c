/*!
Spans are the annotations compared by this crate. A span covers a half-open range of character
offsets `[start, end)` in the plain text of a document, carries a tag and a map of property values.

A span can be *discontinuous*: it is then made of several segments (one per selector of the
annotation). The `start` of a span is the start of its first segment and its `end` is the end of
its last segment.
*/
use crate::error::{ConcordError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Property values of a span, keyed by property name. A property can hold zero, one or many
/// values.
pub type PropertyMap = BTreeMap<String, Vec<String>>;

/// Reference to the tag of an annotation. Two tags are the same tag if they share the same `id`;
/// the name is what the agreement is computed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
}

impl TagRef {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        TagRef {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Display for TagRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One contiguous range of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(ConcordError::InvalidSpan { start, end });
        }
        Ok(Segment { start, end })
    }
}

impl From<Segment> for (usize, usize) {
    fn from(value: Segment) -> Self {
        (value.start, value.end)
    }
}

/// An annotation of a document. Spans are never mutated by the matching functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    id: String,
    segments: Vec<Segment>,
    tag: TagRef,
    properties: PropertyMap,
    author: String,
}

impl Span {
    /// Builds a continuous span covering `[start, end)`.
    pub fn new<I: Into<String>>(id: I, start: usize, end: usize, tag: TagRef) -> Result<Self> {
        Self::discontinuous(id, [(start, end)], tag)
    }

    /// Builds a span out of its segments. The segments are sorted by start.
    pub fn discontinuous<I, S>(id: I, segments: S, tag: TagRef) -> Result<Self>
    where
        I: Into<String>,
        S: IntoIterator<Item = (usize, usize)>,
    {
        let mut segments = segments
            .into_iter()
            .map(|(start, end)| Segment::new(start, end))
            .collect::<Result<Vec<_>>>()?;
        segments.sort();
        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ConcordError::NoSegment),
        };
        if first.start >= last.end {
            return Err(ConcordError::InvalidSpan {
                start: first.start,
                end: last.end,
            });
        }
        Ok(Span {
            id: id.into(),
            segments,
            tag,
            properties: PropertyMap::new(),
            author: String::new(),
        })
    }

    pub fn with_property<N, V, S>(mut self, name: N, values: V) -> Self
    where
        N: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_author<A: Into<String>>(mut self, author: A) -> Self {
        self.author = author.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> usize {
        // A span always has at least one segment.
        self.segments[0].start
    }

    pub fn end(&self) -> usize {
        self.segments[self.segments.len() - 1].end
    }

    /// Length of the outer extent of the span.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Always `false`: a span covers at least one character.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tag(&self) -> &TagRef {
        &self.tag
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Values of the property `name`, if the span has this property.
    pub fn property(&self, name: &str) -> Option<&[String]> {
        self.properties.get(name).map(Vec::as_slice)
    }

    /// Returns `true` if the property exists and holds at least one value.
    pub fn has_property_value(&self, name: &str) -> bool {
        self.property(name).is_some_and(|v| !v.is_empty())
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Number of logically distinct ranges of the span. Segments touching each other (the end of
    /// one is the start of another) count as a single range.
    pub fn segment_count(&self) -> usize {
        self.merged_segments().len()
    }

    /// The logical ranges of the span, where adjacent segments are merged:
    /// `[(0, 17), (17, 35)]` becomes `[(0, 35)]`.
    pub fn merged_segments(&self) -> Vec<Segment> {
        let starts = self
            .segments
            .iter()
            .map(|s| s.start)
            .filter(|start| !self.segments.iter().any(|o| o.end == *start));
        let ends = self
            .segments
            .iter()
            .map(|s| s.end)
            .filter(|end| !self.segments.iter().any(|o| o.start == *end));
        starts
            .zip(ends)
            .map(|(start, end)| Segment { start, end })
            .collect()
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.tag, self.start(), self.end())
    }
}

/// Returns `true` if the two spans share at least one offset. Spans that only touch each other
/// (`a.end == b.start`) do not overlap.
///
/// The test is written from the point of view of `a`: `b` starts inside `a`, ends inside `a` or
/// contains `a`. Its truth value is symmetric.
pub fn overlaps(a: &Span, b: &Span) -> bool {
    let (a_start, a_end, b_start, b_end) = (a.start(), a.end(), b.start(), b.end());
    let starts_inside = a_start <= b_start && b_start < a_end;
    let ends_inside = a_start < b_end && b_end <= a_end;
    let contains = b_start < a_start && b_end > a_end;
    starts_inside || ends_inside || contains
}

/// Length of the intersection divided by the length of the outer extent of both spans. Equal to
/// `1.0` when the spans coincide. The result is only meaningful for overlapping spans; it is
/// negative or null otherwise.
pub fn overlap_fraction(a: &Span, b: &Span) -> f64 {
    let intersection =
        a.end().min(b.end()) as f64 - a.start().max(b.start()) as f64;
    let extent = a.end().max(b.end()) as f64 - a.start().min(b.start()) as f64;
    intersection / extent
}

/// Distance between the boundaries of two spans. Lower is better.
pub fn distance(a: &Span, b: &Span) -> usize {
    a.start().abs_diff(b.start()) + a.end().abs_diff(b.end())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
    use rstest::rstest;

    pub(crate) fn span(start: usize, end: usize, tag: &str) -> Span {
        Span::new(format!("{tag}-{start}-{end}"), start, end, TagRef::new(tag, tag)).unwrap()
    }

    /// Small continuous span, used by the property tests.
    #[derive(Debug, Clone)]
    pub(crate) struct ArbitrarySpan(pub(crate) Span);

    impl Arbitrary for ArbitrarySpan {
        fn arbitrary(g: &mut Gen) -> Self {
            let start = usize::arbitrary(g) % 200;
            let len = usize::arbitrary(g) % 30 + 1;
            let tag = *g.choose(&["PER", "LOC", "ORG"]).unwrap();
            ArbitrarySpan(span(start, start + len, tag))
        }
    }

    #[rstest]
    #[case((0, 10), (0, 10), true)]
    #[case((0, 10), (5, 15), true)]
    #[case((5, 15), (0, 10), true)]
    #[case((0, 10), (2, 4), true)]
    #[case((2, 4), (0, 10), true)]
    #[case((0, 10), (10, 20), false)]
    #[case((10, 20), (0, 10), false)]
    #[case((0, 5), (100, 105), false)]
    fn test_overlaps(#[case] a: (usize, usize), #[case] b: (usize, usize), #[case] expected: bool) {
        let a = span(a.0, a.1, "A");
        let b = span(b.0, b.1, "B");
        assert_eq!(overlaps(&a, &b), expected);
    }

    #[rstest]
    #[case((0, 10), (0, 10), 1.0)]
    #[case((0, 10), (0, 9), 0.9)]
    #[case((0, 10), (5, 15), 5.0 / 15.0)]
    #[case((0, 10), (2, 4), 0.2)]
    fn test_overlap_fraction(
        #[case] a: (usize, usize),
        #[case] b: (usize, usize),
        #[case] expected: f64,
    ) {
        let a = span(a.0, a.1, "A");
        let b = span(b.0, b.1, "B");
        assert!((overlap_fraction(&a, &b) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(&span(0, 10, "A"), &span(2, 7, "B")), 5);
        assert_eq!(distance(&span(2, 7, "A"), &span(0, 10, "B")), 5);
        assert_eq!(distance(&span(0, 10, "A"), &span(0, 10, "B")), 0);
    }

    #[test]
    fn test_invalid_span() {
        let tag = TagRef::new("t", "T");
        assert!(matches!(
            Span::new("x", 5, 5, tag.clone()),
            Err(ConcordError::InvalidSpan { start: 5, end: 5 })
        ));
        assert!(matches!(
            Span::discontinuous("x", Vec::<(usize, usize)>::new(), tag),
            Err(ConcordError::NoSegment)
        ));
    }

    #[test]
    fn test_discontinuous_bounds() {
        let s = Span::discontinuous("x", [(3, 8), (20, 25)], TagRef::new("t", "T")).unwrap();
        assert_eq!((s.start(), s.end(), s.len()), (3, 25, 22));
    }

    #[rstest]
    #[case(vec![(0, 10)], 1)]
    #[case(vec![(0, 17), (17, 35)], 1)]
    #[case(vec![(0, 5), (10, 15)], 2)]
    #[case(vec![(0, 5), (5, 8), (10, 15)], 2)]
    fn test_segment_count(#[case] segments: Vec<(usize, usize)>, #[case] expected: usize) {
        let s = Span::discontinuous("x", segments, TagRef::new("t", "T")).unwrap();
        assert_eq!(s.segment_count(), expected);
    }

    #[test]
    fn test_unordered_segments() {
        let s = Span::discontinuous("x", [(20, 25), (3, 8)], TagRef::new("t", "T")).unwrap();
        assert_eq!((s.start(), s.end()), (3, 25));
        let actual: Vec<(usize, usize)> = s.merged_segments().into_iter().map(Into::into).collect();
        assert_eq!(actual, vec![(3, 8), (20, 25)]);

        let s = Span::discontinuous("x", [(17, 35), (0, 17)], TagRef::new("t", "T")).unwrap();
        let actual: Vec<(usize, usize)> = s.merged_segments().into_iter().map(Into::into).collect();
        assert_eq!(actual, vec![(0, 35)]);
        assert_eq!(s.segment_count(), 1);
    }

    #[test]
    fn test_merged_segments() {
        let s = Span::discontinuous("x", [(0, 17), (17, 35), (40, 45)], TagRef::new("t", "T"))
            .unwrap();
        let actual: Vec<(usize, usize)> = s.merged_segments().into_iter().map(Into::into).collect();
        assert_eq!(actual, vec![(0, 35), (40, 45)]);
    }

    #[test]
    fn test_property_access() {
        let s = span(0, 4, "A")
            .with_property("mood", ["happy", "sad"])
            .with_property("empty", Vec::<String>::new());
        assert_eq!(s.property("mood").unwrap(), &["happy", "sad"]);
        assert!(s.has_property_value("mood"));
        assert!(!s.has_property_value("empty"));
        assert!(!s.has_property_value("missing"));
    }

    #[test]
    fn test_propertie_overlap_is_symmetric() {
        fn symmetric(a: ArbitrarySpan, b: ArbitrarySpan) -> bool {
            overlaps(&a.0, &b.0) == overlaps(&b.0, &a.0)
        }
        QuickCheck::new()
            .tests(2000)
            .quickcheck(symmetric as fn(ArbitrarySpan, ArbitrarySpan) -> bool)
    }

    #[test]
    fn test_propertie_disjoint_spans_do_not_overlap() {
        fn disjoint(a: ArbitrarySpan, b: ArbitrarySpan) -> TestResult {
            let (a, b) = (a.0, b.0);
            if a.end() <= b.start() || b.end() <= a.start() {
                TestResult::from_bool(!overlaps(&a, &b))
            } else {
                TestResult::discard()
            }
        }
        QuickCheck::new()
            .tests(2000)
            .quickcheck(disjoint as fn(ArbitrarySpan, ArbitrarySpan) -> TestResult)
    }

    #[test]
    fn test_propertie_overlap_fraction_bounds() {
        fn bounded(a: ArbitrarySpan, b: ArbitrarySpan) -> TestResult {
            let (a, b) = (a.0, b.0);
            if !overlaps(&a, &b) {
                return TestResult::discard();
            }
            let fraction = overlap_fraction(&a, &b);
            TestResult::from_bool(fraction > 0.0 && fraction <= 1.0)
        }
        QuickCheck::new()
            .tests(2000)
            .quickcheck(bounded as fn(ArbitrarySpan, ArbitrarySpan) -> TestResult)
    }
}
