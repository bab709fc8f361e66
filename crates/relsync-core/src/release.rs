//! Release dates and release markers.
//!
//! A [`ReleaseDate`] is the date of an upstream base-image release, written
//! compactly (`20230612`) in image tags and as ISO (`2023-06-12`) in comments
//! and git tag names. A [`ReleaseMarker`] is a named point in a repository's
//! history; its commit timestamp only orders markers, it is not part of
//! their identity.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// Upstream release date, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseDate(NaiveDate);

impl ReleaseDate {
    /// Parse a compact `YYYYMMDD` date.
    ///
    /// ```
    /// use relsync_core::ReleaseDate;
    ///
    /// let date = ReleaseDate::parse("20230612").unwrap();
    /// assert_eq!(date.compact(), "20230612");
    /// assert_eq!(date.iso(), "2023-06-12");
    /// ```
    pub fn parse(value: &str) -> crate::Result<Self> {
        let invalid = |reason| crate::Error::InvalidReleaseDate {
            value: value.to_owned(),
            reason,
        };
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected exactly eight digits (YYYYMMDD)"));
        }
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .map(Self)
            .map_err(|_| invalid("not a calendar date"))
    }

    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

impl std::str::FromStr for ReleaseDate {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

/// A tag in a repository together with the time its commit was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMarker {
    pub name: String,
    pub committed_at: DateTime<Utc>,
}

impl ReleaseMarker {
    pub fn new(name: impl Into<String>, committed_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            committed_at,
        }
    }
}

impl fmt::Display for ReleaseMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Pick the marker with the newest commit.
///
/// Markers with equal timestamps keep enumeration order: the first one seen
/// wins. Returns `None` for an empty input.
pub fn latest_marker<I>(markers: I) -> Option<ReleaseMarker>
where
    I: IntoIterator<Item = ReleaseMarker>,
{
    markers.into_iter().fold(None, |best, marker| match best {
        Some(current) if current.committed_at >= marker.committed_at => Some(current),
        _ => Some(marker),
    })
}
