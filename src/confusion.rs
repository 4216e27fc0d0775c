/*!
Confusion matrix of a pairing: the rows are the labels of the source spans and the columns are the
labels of their matches.
*/
use crate::agreement::{Label, Level};
use crate::pairing::Pair;
use itertools::Itertools;
use ndarray::Array2;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;

/// Square table of co-occurrence counts, keyed by every label observed on either side of the
/// pairs. An unmatched pair is counted in the column of `Label::Unmatched`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    labels: Vec<Label<'static>>,
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    /// Labels of the rows and of the columns, sorted.
    pub fn labels(&self) -> &[Label<'static>] {
        &self.labels
    }

    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    fn index(&self, label: &Label) -> Option<usize> {
        self.labels.binary_search_by(|l| l.cmp(label)).ok()
    }

    /// Number of pairs where the source has the label `source` and the match has the label
    /// `target`. Labels absent from the matrix have a count of `0`.
    pub fn get(&self, source: &Label, target: &Label) -> usize {
        match (self.index(source), self.index(target)) {
            (Some(i), Some(j)) => self.counts[[i, j]],
            _ => 0,
        }
    }

    /// Same as `get`, for two label values.
    pub fn get_by_name(&self, source: &str, target: &str) -> usize {
        self.get(
            &Label::Value(Cow::Borrowed(source)),
            &Label::Value(Cow::Borrowed(target)),
        )
    }

    /// Sum of every cell, which is the number of pairs.
    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Sum of the diagonal, the number of pairs where both labels are the same.
    pub fn agreements(&self) -> usize {
        self.counts.diag().sum()
    }
}

/// Builds the confusion matrix of `pairs` at the given `level`.
pub fn confusion_matrix(pairs: &[Pair], level: &Level) -> ConfusionMatrix {
    let labelled: Vec<(Label, Label)> = pairs
        .iter()
        .map(|p| (level.label(p.source), level.match_label(&p.target)))
        .collect();
    let labels: Vec<Label<'static>> = labelled
        .iter()
        .flat_map(|(s, t)| [s, t])
        .sorted()
        .dedup()
        .map(|l| l.clone().into_owned())
        .collect();
    let mut matrix = ConfusionMatrix {
        counts: Array2::zeros((labels.len(), labels.len())),
        labels,
    };
    for (source, target) in labelled.iter() {
        if let (Some(i), Some(j)) = (matrix.index(source), matrix.index(target)) {
            matrix.counts[[i, j]] += 1;
        }
    }
    matrix
}

/// CSV-like table. The first column holds the source labels and the first row the target labels.
impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Source \\ Target")?;
        for label in self.labels.iter() {
            write!(f, ", {}", label)?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(self.counts.rows()) {
            write!(f, "{}", label)?;
            for count in row.iter() {
                write!(f, ", {}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::Match;
    use crate::span::tests::{span, ArbitrarySpan};
    use crate::span::Span;
    use quickcheck::{QuickCheck, TestResult};

    #[test]
    fn test_confusion_matrix_tags() {
        let sources = [span(0, 5, "X"), span(10, 15, "X"), span(20, 25, "Y"), span(30, 35, "Y")];
        let targets = [span(0, 5, "X"), span(10, 15, "Y"), span(20, 25, "Y")];
        let pairs = vec![
            Pair::new(&sources[0], Match::Matched(&targets[0])),
            Pair::new(&sources[1], Match::Matched(&targets[1])),
            Pair::new(&sources[2], Match::Matched(&targets[2])),
            Pair::new(&sources[3], Match::Unmatched),
        ];
        let matrix = confusion_matrix(&pairs, &Level::Tag);
        assert_eq!(
            matrix.labels(),
            &[
                Label::Value(Cow::Borrowed("X")),
                Label::Value(Cow::Borrowed("Y")),
                Label::Unmatched
            ]
        );
        assert_eq!(matrix.get_by_name("X", "X"), 1);
        assert_eq!(matrix.get_by_name("X", "Y"), 1);
        assert_eq!(matrix.get_by_name("Y", "Y"), 1);
        assert_eq!(matrix.get_by_name("Y", "X"), 0);
        assert_eq!(matrix.get_by_name("Z", "X"), 0);
        assert_eq!(
            matrix.get(&Label::Value(Cow::Borrowed("Y")), &Label::Unmatched),
            1
        );
        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.agreements(), 2);
        let expected = "Source \\ Target, X, Y, <unmatched>\nX, 1, 1, 0\nY, 0, 1, 1\n<unmatched>, 0, 0, 0\n";
        assert_eq!(matrix.to_string(), expected);
    }

    #[test]
    fn test_confusion_matrix_property() {
        let sources = [
            span(0, 5, "X").with_property("mood", ["happy", "sad"]),
            span(10, 15, "X"),
        ];
        let targets = [
            span(0, 5, "X").with_property("mood", ["happy"]),
            span(10, 15, "X").with_property("mood", ["sad"]),
        ];
        let pairs = vec![
            Pair::new(&sources[0], Match::Matched(&targets[0])),
            Pair::new(&sources[1], Match::Matched(&targets[1])),
        ];
        let matrix = confusion_matrix(&pairs, &Level::Property(String::from("mood")));
        // Only the first value of a property is used.
        assert_eq!(matrix.get_by_name("happy", "happy"), 1);
        assert_eq!(
            matrix.get(&Label::NoValue, &Label::Value(Cow::Borrowed("sad"))),
            1
        );
        assert_eq!(matrix.labels().len(), 3);
    }

    #[test]
    fn test_propertie_cells_sum_to_pairs() {
        fn cells_sum(spans: Vec<(ArbitrarySpan, ArbitrarySpan, bool)>) -> TestResult {
            let owned: Vec<(Span, Span, bool)> =
                spans.into_iter().map(|(a, b, m)| (a.0, b.0, m)).collect();
            let pairs: Vec<Pair> = owned
                .iter()
                .map(|(a, b, matched)| {
                    Pair::new(a, if *matched { Match::Matched(b) } else { Match::Unmatched })
                })
                .collect();
            let matrix = confusion_matrix(&pairs, &Level::Tag);
            TestResult::from_bool(
                matrix.total() == pairs.len()
                    && matrix.counts().nrows() == matrix.counts().ncols(),
            )
        }
        QuickCheck::new()
            .tests(500)
            .quickcheck(cells_sum as fn(Vec<(ArbitrarySpan, ArbitrarySpan, bool)>) -> TestResult)
    }
}
