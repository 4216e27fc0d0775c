/*!
Inter-annotator agreement of a pairing. Each pair is an item labelled by two coders: the source
collection (coder `0`) and the target collection (coder `1`). The label of a span is either its tag
name or the first value of one of its properties, depending on the `Level` of the comparison.
*/
use crate::confusion::{confusion_matrix, ConfusionMatrix};
use crate::error::{ConcordError, Result};
use crate::pairing::{Match, Pair};
use crate::span::Span;
use enum_iterator::{all, Sequence};
use log::warn;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

pub mod task;

pub use task::{AnnotationTask, LabelDistance};

/// What is compared between two matched spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Level {
    /// The tag names.
    #[default]
    Tag,
    /// The first value of the named property.
    Property(String),
}

impl Level {
    /// Label of a span at this level. A span without a value for the property has the label
    /// `Label::NoValue`.
    pub fn label<'a>(&self, span: &'a Span) -> Label<'a> {
        match self {
            Level::Tag => Label::Value(Cow::Borrowed(&span.tag().name)),
            Level::Property(name) => span
                .property(name)
                .and_then(|values| values.first())
                .map_or(Label::NoValue, |v| Label::Value(Cow::Borrowed(v))),
        }
    }

    /// Label of the target side of a pair. Unmatched targets have the label `Label::Unmatched`.
    pub fn match_label<'a>(&self, target: &Match<'a>) -> Label<'a> {
        target.span().map_or(Label::Unmatched, |s| self.label(s))
    }

    /// Name of the property compared, if any.
    pub fn property(&self) -> Option<&str> {
        match self {
            Level::Tag => None,
            Level::Property(name) => Some(name.as_str()),
        }
    }
}

/// Accepts `tag`, `prop:<name>` or a bare property name. `tag` is matched case-insensitively, so
/// a property named `Tag` (or `TAG`) must be given as `prop:Tag`.
impl FromStr for Level {
    type Err = ConcordError;
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("tag") {
            return Ok(Level::Tag);
        }
        let name = trimmed.strip_prefix("prop:").unwrap_or(trimmed).trim();
        if name.is_empty() {
            Err(ConcordError::ParseLevel(String::from(s)))
        } else {
            Ok(Level::Property(String::from(name)))
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Tag => write!(f, "tag"),
            Level::Property(name) => write!(f, "prop:{}", name),
        }
    }
}

/// Label given by a coder to an item. `NoValue` and `Unmatched` can never be confused with a real
/// tag name or property value. Labels are ordered: values first, then `NoValue`, then
/// `Unmatched`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label<'a> {
    Value(Cow<'a, str>),
    /// The span has no value for the compared property.
    NoValue,
    /// The source span has no match.
    Unmatched,
}

impl<'a> Label<'a> {
    pub fn into_owned(self) -> Label<'static> {
        match self {
            Label::Value(v) => Label::Value(Cow::Owned(v.into_owned())),
            Label::NoValue => Label::NoValue,
            Label::Unmatched => Label::Unmatched,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Label::Value(v) => Some(&**v),
            _ => None,
        }
    }
}

impl<'a> Display for Label<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Value(v) => write!(f, "{}", v),
            Label::NoValue => write!(f, "<no value>"),
            Label::Unmatched => write!(f, "<unmatched>"),
        }
    }
}

/// One `(coder, item, label)` row of an annotation task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskRow<'a> {
    pub coder: usize,
    pub item: usize,
    pub label: Label<'a>,
}

/// Keeps every pair, or only the matched pairs if `include_empty` is false.
fn retained_pairs<'p, 'a>(
    pairs: &'p [Pair<'a>],
    include_empty: bool,
) -> impl Iterator<Item = &'p Pair<'a>> {
    pairs.iter().filter(move |p| include_empty || p.is_matched())
}

/// Converts the pairs into annotation task rows: two rows per pair, one for the source (coder
/// `0`) and one for the target (coder `1`). The item index is the index of the pair among the
/// retained pairs. Unmatched pairs are dropped if `include_empty` is false, which changes the
/// number of items.
pub fn to_task_rows<'a>(pairs: &[Pair<'a>], level: &Level, include_empty: bool) -> Vec<TaskRow<'a>> {
    retained_pairs(pairs, include_empty)
        .enumerate()
        .flat_map(|(item, pair)| {
            [
                TaskRow {
                    coder: 0,
                    item,
                    label: level.label(pair.source),
                },
                TaskRow {
                    coder: 1,
                    item,
                    label: level.match_label(&pair.target),
                },
            ]
        })
        .collect()
}

/// Value of an agreement coefficient. A coefficient is undefined when its computation divides by
/// zero, for example when there is nothing to compare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Coefficient {
    Defined(f64),
    Undefined,
}

impl Coefficient {
    pub fn value(&self) -> Option<f64> {
        match self {
            Coefficient::Defined(v) => Some(*v),
            Coefficient::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Coefficient::Defined(_))
    }

    /// Landis & Koch interpretation of the coefficient.
    pub fn interpretation(&self) -> Option<&'static str> {
        self.value().map(interpretation)
    }
}

impl From<Option<f64>> for Coefficient {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Coefficient::Undefined, Coefficient::Defined)
    }
}

impl Display for Coefficient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coefficient::Defined(v) => write!(f, "{}", v),
            Coefficient::Undefined => write!(f, "undefined"),
        }
    }
}

/// Landis & Koch bands.
pub fn interpretation(coefficient: f64) -> &'static str {
    if coefficient < 0.0 {
        "Less than chance agreement"
    } else if coefficient < 0.20 {
        "Slight agreement"
    } else if coefficient < 0.40 {
        "Fair agreement"
    } else if coefficient < 0.60 {
        "Moderate agreement"
    } else if coefficient < 0.80 {
        "Substantial agreement"
    } else {
        "Almost perfect agreement"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize)]
pub enum CoefficientKind {
    ScottsPi,
    CohensKappa,
    KrippendorffsAlpha,
}

impl Display for CoefficientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoefficientKind::ScottsPi => write!(f, "Scott's Pi"),
            CoefficientKind::CohensKappa => write!(f, "Cohen's Kappa"),
            CoefficientKind::KrippendorffsAlpha => write!(f, "Krippendorff's Alpha"),
        }
    }
}

/// Agreement coefficients and confusion matrix of a pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementResult {
    pub level: Level,
    pub distance: LabelDistance,
    /// Number of items (pairs) the coefficients are computed on.
    pub items: usize,
    pub scotts_pi: Coefficient,
    pub cohens_kappa: Coefficient,
    pub krippendorffs_alpha: Coefficient,
    /// Built over the same pairs as the coefficients.
    pub confusion: ConfusionMatrix,
}

impl AgreementResult {
    pub fn get(&self, kind: CoefficientKind) -> Coefficient {
        match kind {
            CoefficientKind::ScottsPi => self.scotts_pi,
            CoefficientKind::CohensKappa => self.cohens_kappa,
            CoefficientKind::KrippendorffsAlpha => self.krippendorffs_alpha,
        }
    }
}

impl Display for AgreementResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = format!("Results for \"{}\"", self.level);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        for kind in all::<CoefficientKind>() {
            let coefficient = self.get(kind);
            match coefficient.interpretation() {
                Some(i) => writeln!(f, "{}: {} ({})", kind, coefficient, i)?,
                None => writeln!(f, "{}: {}", kind, coefficient)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Confusion Matrix")?;
        write!(f, "{}", self.confusion)
    }
}

/// Computes Scott's Pi, Cohen's Kappa and Krippendorff's Alpha over the pairs, with the binary
/// label distance. Degenerate coefficients are reported as `Coefficient::Undefined`.
///
/// * `level`: what is compared between the source and the target.
/// * `include_empty`: keep the unmatched pairs. They are then labelled `Label::Unmatched` on the
///   target side.
///
/// At a property level, the property must be used by at least one span of the pairs, otherwise
/// `ConcordError::UnknownProperty` is returned.
pub fn compute_agreement(
    pairs: &[Pair],
    level: &Level,
    include_empty: bool,
) -> Result<AgreementResult> {
    compute_agreement_inner(pairs, level, include_empty, LabelDistance::Binary, false)
}

/// Returns `true` if a span of either side of the pairs has the property `name`.
fn pairs_use_property(pairs: &[Pair], name: &str) -> bool {
    pairs.iter().any(|p| {
        p.source.property(name).is_some()
            || p.target.span().is_some_and(|t| t.property(name).is_some())
    })
}

/// Same as `compute_agreement`, with a custom label distance. In `strict` mode, a degenerate
/// coefficient is an error instead of `Coefficient::Undefined`.
pub fn compute_agreement_inner(
    pairs: &[Pair],
    level: &Level,
    include_empty: bool,
    distance: LabelDistance,
    strict: bool,
) -> Result<AgreementResult> {
    if let Some(property) = level.property() {
        if !pairs.is_empty() && !pairs_use_property(pairs, property) {
            return Err(ConcordError::UnknownProperty {
                property: String::from(property),
            });
        }
    }
    let rows = to_task_rows(pairs, level, include_empty);
    let task = AnnotationTask::new(&rows, distance)?;
    let check = |kind: CoefficientKind, raw: Option<f64>| -> Result<Coefficient> {
        match raw {
            Some(v) => Ok(Coefficient::Defined(v)),
            None if strict => Err(ConcordError::DegenerateAgreement {
                reason: format!(
                    "{} has a null denominator over {} item(s)",
                    kind,
                    task.n_items()
                ),
            }),
            None => {
                warn!(
                    "{} is undefined at level `{}` over {} item(s)",
                    kind,
                    level,
                    task.n_items()
                );
                Ok(Coefficient::Undefined)
            }
        }
    };
    let scotts_pi = check(CoefficientKind::ScottsPi, task.pi())?;
    let cohens_kappa = check(CoefficientKind::CohensKappa, task.kappa())?;
    let krippendorffs_alpha = check(CoefficientKind::KrippendorffsAlpha, task.alpha())?;
    let retained: Vec<Pair> = retained_pairs(pairs, include_empty).copied().collect();
    Ok(AgreementResult {
        level: level.clone(),
        distance,
        items: task.n_items(),
        scotts_pi,
        cohens_kappa,
        krippendorffs_alpha,
        confusion: confusion_matrix(&retained, level),
    })
}
