/*!
Agreement coefficients over `(coder, item, label)` rows: Scott's Pi, Cohen's Kappa and
Krippendorff's Alpha.

The observed agreement between two coders is the mean over all items of `1 - d(a, b)`, where `a`
and `b` are the labels of the coders and `d` is the label distance. The expected agreement is
derived from the label frequencies: pooled over every coder for Pi, per coder for Kappa. Kappa
is averaged over every pair of coders. Alpha is `1 - Do / De`, where the disagreements are
computed on the items labelled by at least two coders.
*/
use super::{Label, TaskRow};
use crate::error::{ConcordError, Result};
use ahash::AHashMap;
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Denominators smaller than this are considered to be zero.
const TOLERANCE: f64 = 1e-12;

/// Distance between two labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LabelDistance {
    /// `0` for equal labels, `1` otherwise.
    #[default]
    Binary,
    /// `(a - b)^2`. Only defined for numeric labels.
    Interval,
}

impl LabelDistance {
    fn distance(&self, a: &Label, b: &Label) -> Result<f64> {
        match self {
            LabelDistance::Binary => Ok(if a == b { 0. } else { 1. }),
            LabelDistance::Interval => Ok((numeric(a)? - numeric(b)?).powi(2)),
        }
    }
}

fn numeric(label: &Label) -> Result<f64> {
    let non_numeric = || ConcordError::NonNumericLabel {
        label: label.to_string(),
    };
    match label {
        Label::Value(v) => v.trim().parse::<f64>().map_err(|_| non_numeric()),
        _ => Err(non_numeric()),
    }
}

impl FromStr for LabelDistance {
    type Err = ConcordError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_ref() {
            "binary" | "nominal" => Ok(LabelDistance::Binary),
            "interval" => Ok(LabelDistance::Interval),
            _ => Err(ConcordError::ParseDistance(String::from(s))),
        }
    }
}

impl Display for LabelDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelDistance::Binary => write!(f, "binary"),
            LabelDistance::Interval => write!(f, "interval"),
        }
    }
}

/// Raw value of a coefficient: `None` when a denominator is null and the agreement is not
/// perfect.
pub(crate) type RawCoefficient = Option<f64>;

/// Labelling task of a set of coders over a set of items.
#[derive(Debug, Clone)]
pub struct AnnotationTask<'a> {
    /// Distinct labels, sorted.
    labels: Vec<Label<'a>>,
    n_coders: usize,
    n_items: usize,
    /// Label index given by each coder (columns) to each item (rows).
    assignments: Array2<Option<usize>>,
    /// Pairwise label distances.
    distances: Array2<f64>,
}

impl<'a> AnnotationTask<'a> {
    /// Builds the task from its rows. If a coder labels the same item more than once, the last
    /// label is kept.
    pub fn new(rows: &[TaskRow<'a>], distance: LabelDistance) -> Result<Self> {
        let labels: Vec<Label<'a>> = rows
            .iter()
            .map(|r| r.label.clone())
            .sorted()
            .dedup()
            .collect();
        let coders: Vec<usize> = rows.iter().map(|r| r.coder).sorted().dedup().collect();
        let items: Vec<usize> = rows.iter().map(|r| r.item).sorted().dedup().collect();
        let label_index: AHashMap<&Label<'a>, usize> =
            labels.iter().enumerate().map(|(i, l)| (l, i)).collect();
        let coder_index: AHashMap<usize, usize> =
            coders.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        let item_index: AHashMap<usize, usize> =
            items.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        let mut assignments = Array2::from_elem((items.len(), coders.len()), None);
        for row in rows {
            assignments[[item_index[&row.item], coder_index[&row.coder]]] =
                Some(label_index[&row.label]);
        }
        let mut distances = Array2::zeros((labels.len(), labels.len()));
        for ((i, a), (j, b)) in labels
            .iter()
            .enumerate()
            .cartesian_product(labels.iter().enumerate())
        {
            distances[[i, j]] = distance.distance(a, b)?;
        }
        Ok(Self {
            labels,
            n_coders: coders.len(),
            n_items: items.len(),
            assignments,
            distances,
        })
    }

    pub fn labels(&self) -> &[Label<'a>] {
        &self.labels
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    pub fn n_coders(&self) -> usize {
        self.n_coders
    }

    /// Observed agreement between the coders `a` and `b` (column indices).
    fn observed_agreement(&self, a: usize, b: usize) -> f64 {
        let total: f64 = self
            .assignments
            .column(a)
            .iter()
            .zip(self.assignments.column(b).iter())
            .filter_map(|(la, lb)| Some(1. - self.distances[[(*la)?, (*lb)?]]))
            .sum();
        total / self.n_items as f64
    }

    fn coder_pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.n_coders).tuple_combinations()
    }

    fn average_observed_agreement(&self) -> Option<f64> {
        mean(self.coder_pairs().map(|(a, b)| Some(self.observed_agreement(a, b))))
    }

    /// Number of times each coder (columns) used each label (rows).
    fn label_counts_per_coder(&self) -> Array2<f64> {
        let mut counts = Array2::zeros((self.labels.len(), self.n_coders));
        for ((_, coder), label) in self.assignments.indexed_iter() {
            if let Some(label) = label {
                counts[[*label, coder]] += 1.;
            }
        }
        counts
    }

    /// Number of times each label (columns) was given to each item (rows).
    fn label_counts_per_item(&self) -> Array2<f64> {
        let mut counts = Array2::zeros((self.n_items, self.labels.len()));
        for ((item, _), label) in self.assignments.indexed_iter() {
            if let Some(label) = label {
                counts[[item, *label]] += 1.;
            }
        }
        counts
    }

    /// Scott's Pi.
    pub fn pi(&self) -> RawCoefficient {
        if self.n_items == 0 {
            return None;
        }
        let observed = self.average_observed_agreement()?;
        let frequencies = self.label_counts_per_coder().sum_axis(Axis(1));
        let total = (self.n_items * self.n_coders) as f64;
        let expected = frequencies.dot(&frequencies) / (total * total);
        chance_corrected(observed, expected)
    }

    fn pairwise_kappa(&self, counts: &Array2<f64>, a: usize, b: usize) -> RawCoefficient {
        let n = self.n_items as f64;
        let expected = counts.column(a).dot(&counts.column(b)) / (n * n);
        chance_corrected(self.observed_agreement(a, b), expected)
    }

    /// Cohen's Kappa, averaged over every pair of coders.
    pub fn kappa(&self) -> RawCoefficient {
        if self.n_items == 0 {
            return None;
        }
        let counts = self.label_counts_per_coder();
        mean(
            self.coder_pairs()
                .map(|(a, b)| self.pairwise_kappa(&counts, a, b)),
        )
    }

    fn disagreement(&self, frequencies: ArrayView1<f64>) -> Option<f64> {
        let total = frequencies.sum();
        let denominator = total * (total - 1.);
        if denominator < TOLERANCE {
            return None;
        }
        Some(frequencies.dot(&self.distances.dot(&frequencies)) / denominator)
    }

    /// Krippendorff's Alpha.
    pub fn alpha(&self) -> RawCoefficient {
        match self.labels.len() {
            0 => return None,
            1 => return Some(1.),
            _ => (),
        }
        let per_item = self.label_counts_per_item();
        let mut valid: Array1<f64> = Array1::zeros(self.labels.len());
        let mut total_disagreement = 0.;
        for row in per_item.rows() {
            let count = row.sum();
            if count < 2. {
                continue;
            }
            valid += &row;
            total_disagreement += self.disagreement(row)? * count;
        }
        let n_valid = valid.sum();
        if n_valid < TOLERANCE {
            return None;
        }
        let observed = total_disagreement / n_valid;
        let expected = self.disagreement(valid.view())?;
        if expected.abs() < TOLERANCE {
            return if observed.abs() < TOLERANCE {
                Some(1.)
            } else {
                None
            };
        }
        Some(1. - observed / expected)
    }
}

/// `(observed - expected) / (1 - expected)`. A null denominator means that every label is the
/// same: it is a perfect agreement if the observed agreement is `1`, undefined otherwise.
fn chance_corrected(observed: f64, expected: f64) -> RawCoefficient {
    let denominator = 1. - expected;
    if denominator.abs() < TOLERANCE {
        if (1. - observed).abs() < TOLERANCE {
            Some(1.)
        } else {
            None
        }
    } else {
        Some((observed - expected) / denominator)
    }
}

/// Mean of the values. `None` if there is no value or if one of them is `None`.
fn mean<I: Iterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let values: Vec<f64> = values.collect::<Option<Vec<f64>>>()?;
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
