/**
This module gives a few tools to prettyprint the outcome of a full comparison of two annotation
collections.
*/
use crate::agreement::{AgreementResult, Coefficient, CoefficientKind};
use crate::pairing::PairingSummary;
use serde::Serialize;
use std::fmt::Display;

/// The report holds the summary of the pairing and the agreement computed on the pairs. It can be
/// displayed (i.e. prettyprinted) or serialized. The report is built with the
/// `compare_collections` function.
///
/// # Example
///
/// ```rust
/// use concord::{compare_collections, AnnotationCollection, ConcordConfig, Span, TagRef};
///
/// let tag = TagRef::new("t-1", "event");
/// let first = AnnotationCollection::new(
///     "first",
///     "doc",
///     vec![Span::new("a", 0, 10, tag.clone()).unwrap()],
/// );
/// let second = AnnotationCollection::new(
///     "second",
///     "doc",
///     vec![Span::new("b", 0, 10, tag).unwrap()],
/// );
///
/// let report = compare_collections(&first, &second, &ConcordConfig::default()).unwrap();
/// assert_eq!(report.summary.pairs, 1);
/// assert_eq!(report.cohens_kappa().value(), Some(1.0));
/// println!("{}", report);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementReport {
    pub summary: PairingSummary,
    pub result: AgreementResult,
}

impl AgreementReport {
    pub fn get(&self, kind: CoefficientKind) -> Coefficient {
        self.result.get(kind)
    }
    pub fn scotts_pi(&self) -> Coefficient {
        self.result.scotts_pi
    }
    pub fn cohens_kappa(&self) -> Coefficient {
        self.result.cohens_kappa
    }
    pub fn krippendorffs_alpha(&self) -> Coefficient {
        self.result.krippendorffs_alpha
    }
}

/// The report is displayed as the pairing summary followed by the coefficients and the confusion
/// matrix.
impl Display for AgreementReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(46);
        writeln!(f, "{}", rule)?;
        writeln!(f, "{}", self.summary)?;
        writeln!(f, "{}", rule)?;
        write!(f, "{}", self.result)
    }
}
