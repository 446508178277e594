use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Post ordering requested from the remote listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Active,
    Hot,
    Scaled,
    Controversial,
    New,
    Old,
    MostComments,
    NewComments,
}

impl SortOrder {
    pub const ALL: [SortOrder; 8] = [
        SortOrder::Active,
        SortOrder::Hot,
        SortOrder::Scaled,
        SortOrder::Controversial,
        SortOrder::New,
        SortOrder::Old,
        SortOrder::MostComments,
        SortOrder::NewComments,
    ];

    /// Name used by the remote API (`sort=` query value).
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Active => "Active",
            SortOrder::Hot => "Hot",
            SortOrder::Scaled => "Scaled",
            SortOrder::Controversial => "Controversial",
            SortOrder::New => "New",
            SortOrder::Old => "Old",
            SortOrder::MostComments => "MostComments",
            SortOrder::NewComments => "NewComments",
        }
    }
}

/// Which communities a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ListingFilter {
    #[default]
    Subscribed,
    Local,
    All,
}

impl ListingFilter {
    pub const ALL: [ListingFilter; 3] = [
        ListingFilter::Subscribed,
        ListingFilter::Local,
        ListingFilter::All,
    ];

    /// Name used by the remote API (`type_=` query value).
    pub fn as_str(self) -> &'static str {
        match self {
            ListingFilter::Subscribed => "Subscribed",
            ListingFilter::Local => "Local",
            ListingFilter::All => "All",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ListingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} '{value}'")]
pub struct ParseConfigError {
    what: &'static str,
    value: String,
}

impl FromStr for SortOrder {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseConfigError {
                what: "sort order",
                value: s.to_string(),
            })
    }
}

impl FromStr for ListingFilter {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListingFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseConfigError {
                what: "listing filter",
                value: s.to_string(),
            })
    }
}

/// Sort and filter the feed is currently listed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub sort: SortOrder,
    pub filter: ListingFilter,
}

/// One listing request: which page, under which ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingQuery {
    pub sort: SortOrder,
    pub filter: ListingFilter,
    /// Zero-based page index.
    pub page: u64,
}
