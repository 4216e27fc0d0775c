/*!
Selection of the best match of a source span among target spans. The candidates are first
filtered with `overlaps`, then ranked by `distance`.
*/
use crate::span::{distance, overlaps, Span};
use itertools::Itertools;

/// Returns the targets overlapping `source`, in the order of `targets`.
pub fn overlapping_candidates<'a>(source: &Span, targets: &[&'a Span]) -> Vec<&'a Span> {
    targets
        .iter()
        .copied()
        .filter(|t| overlaps(source, t))
        .collect()
}

/// Returns the candidate closest to `source`, according to `distance`. When multiple candidates
/// are equally close, the first one is returned. Returns `None` if `candidates` is empty.
///
/// This function does not check the overlap of the candidates: they should come from
/// `overlapping_candidates`.
pub fn best_match<'a>(source: &Span, candidates: &[&'a Span]) -> Option<&'a Span> {
    candidates
        .iter()
        .position_min_by_key(|c| distance(c, source))
        .map(|i| candidates[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::tests::{span, ArbitrarySpan};
    use quickcheck::{QuickCheck, TestResult};

    #[test]
    fn test_overlapping_candidates() {
        let source = span(10, 20, "A");
        let targets = [
            span(0, 10, "B"),
            span(5, 12, "B"),
            span(12, 15, "B"),
            span(20, 30, "B"),
            span(0, 40, "B"),
        ];
        let refs: Vec<&Span> = targets.iter().collect();
        let actual: Vec<(usize, usize)> = overlapping_candidates(&source, &refs)
            .into_iter()
            .map(|s| (s.start(), s.end()))
            .collect();
        assert_eq!(actual, vec![(5, 12), (12, 15), (0, 40)]);
    }

    #[test]
    fn test_best_match() {
        let source = span(10, 20, "A");
        let targets = [span(5, 12, "B"), span(11, 19, "C"), span(0, 40, "D")];
        let refs: Vec<&Span> = targets.iter().collect();
        assert_eq!(best_match(&source, &refs).unwrap().tag().name, "C");
        assert!(best_match(&source, &[]).is_none());
    }

    #[test]
    fn test_best_match_first_of_ties() {
        let source = span(10, 20, "A");
        // Both are at distance 2.
        let targets = [span(9, 21, "B"), span(11, 19, "C")];
        let refs: Vec<&Span> = targets.iter().collect();
        assert_eq!(best_match(&source, &refs).unwrap().tag().name, "B");
        let reversed: Vec<&Span> = targets.iter().rev().collect();
        assert_eq!(best_match(&source, &reversed).unwrap().tag().name, "C");
    }

    #[test]
    fn test_propertie_best_match_is_minimal_and_first() {
        fn minimal(source: ArbitrarySpan, candidates: Vec<ArbitrarySpan>) -> TestResult {
            if candidates.is_empty() {
                return TestResult::discard();
            }
            let source = source.0;
            let refs: Vec<&Span> = candidates.iter().map(|c| &c.0).collect();
            let best = best_match(&source, &refs).unwrap();
            let best_distance = distance(best, &source);
            let first = refs
                .iter()
                .position(|c| distance(c, &source) == best_distance)
                .unwrap();
            TestResult::from_bool(
                refs.iter().all(|c| distance(c, &source) >= best_distance)
                    && std::ptr::eq(refs[first], best),
            )
        }
        QuickCheck::new()
            .tests(1000)
            .quickcheck(minimal as fn(ArbitrarySpan, Vec<ArbitrarySpan>) -> TestResult)
    }
}
