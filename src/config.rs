/*
 * This module contains the `ConcordConfig` struct, which implements the default trait. This config
 * can be passed to the `compare_collections` and `compare_many` functions to simplify their
 * arguments. It can be built and customized with the `ConcordConfigBuilder`.
*/
use crate::agreement::{LabelDistance, Level};
use ahash::AHashSet;
use either::Either as LeftOrRight;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Config struct used to simplify the inputs of parameters to the main functions of `Concord`. It
/// implements the default trait.
pub struct ConcordConfig {
    /// Only the source spans with one of these tag names are compared. `None` compares every span.
    tag_filter: Option<AHashSet<String>>,
    /// Should the `tag_filter` be applied to the target spans too?
    filter_both: bool,
    /// Compare the tags or the values of a property.
    level: Level,
    /// Should the source spans without match be counted in the agreement? They are labelled as
    /// unmatched on the target side.
    include_empty: bool,
    /// Distance between two labels. Use `LabelDistance::Interval` for numeric property values.
    distance: LabelDistance,
    /// If true, an undefined agreement coefficient is an error.
    strict: bool,
    /// If true, collections whose spans are not sorted by start offset are sorted instead of
    /// rejected.
    sort_unsorted: bool,
}

impl Default for ConcordConfig {
    fn default() -> Self {
        Self {
            tag_filter: None,
            filter_both: false,
            level: Level::Tag,
            include_empty: true,
            distance: LabelDistance::Binary,
            strict: false,
            sort_unsorted: false,
        }
    }
}

impl ConcordConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn tag_filter(&self) -> Option<&AHashSet<String>> {
        self.tag_filter.as_ref()
    }
    pub fn filter_both(&self) -> bool {
        self.filter_both
    }
    pub fn level(&self) -> &Level {
        &self.level
    }
    pub fn include_empty(&self) -> bool {
        self.include_empty
    }
    pub fn distance(&self) -> LabelDistance {
        self.distance
    }
    pub fn strict(&self) -> bool {
        self.strict
    }
    pub fn sort_unsorted(&self) -> bool {
        self.sort_unsorted
    }
}

impl<Lvl, Dist> From<ConcordConfigBuilder<Lvl, Dist>> for ConcordConfig
where
    Lvl: Into<Level>,
    Dist: Into<LabelDistance>,
{
    fn from(value: ConcordConfigBuilder<Lvl, Dist>) -> Self {
        Self {
            tag_filter: value.tag_filter,
            filter_both: value.filter_both,
            level: value.level.either_into(),
            include_empty: value.include_empty,
            distance: value.distance.either_into(),
            strict: value.strict,
            sort_unsorted: value.sort_unsorted,
        }
    }
}

impl Display for ConcordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!("Tag filter: {:?}\n Tag filter applied to both collections: {}\n Level: {}\n Unmatched annotations included: {}\n Label distance: {}\n Strict mode: {}\n Sorting unsorted collections: {}", self.tag_filter, self.filter_both, self.level, self.include_empty, self.distance, self.strict, self.sort_unsorted);
        write!(f, "{}", string)
    }
}

/// This builder can be used to build and customize a `ConcordConfig` structure.
pub struct ConcordConfigBuilder<Lvl, Dist>
where
    Lvl: Into<Level>,
    Dist: Into<LabelDistance>,
{
    tag_filter: Option<AHashSet<String>>,
    filter_both: bool,
    level: LeftOrRight<Lvl, Level>,
    include_empty: bool,
    distance: LeftOrRight<Dist, LabelDistance>,
    strict: bool,
    sort_unsorted: bool,
}

impl Default for ConcordConfigBuilder<Level, LabelDistance> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Lvl, Dist> ConcordConfigBuilder<Lvl, Dist>
where
    Lvl: Into<Level>,
    Dist: Into<LabelDistance>,
{
    pub fn tag_filter<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_filter = Some(tags.into_iter().map(Into::into).collect());
        self
    }
    pub fn filter_both(mut self, filter_both: bool) -> Self {
        self.filter_both = filter_both;
        self
    }
    pub fn level(mut self, level: Lvl) -> Self {
        self.level = LeftOrRight::Left(level);
        self
    }
    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }
    pub fn distance(mut self, distance: Dist) -> Self {
        self.distance = LeftOrRight::Left(distance);
        self
    }
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
    pub fn sort_unsorted(mut self, sort_unsorted: bool) -> Self {
        self.sort_unsorted = sort_unsorted;
        self
    }
    pub fn new() -> Self {
        Self {
            tag_filter: None,
            filter_both: false,
            level: LeftOrRight::Right(Level::Tag),
            include_empty: true,
            distance: LeftOrRight::Right(LabelDistance::Binary),
            strict: false,
            sort_unsorted: false,
        }
    }
    pub fn build(self) -> ConcordConfig {
        ConcordConfig::from(self)
    }
}
