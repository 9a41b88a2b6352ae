//! Road classification vocabulary.
//!
//! Map data carries free-form classification text (`"primary"`,
//! `"motorway_link"`, or list-valued `"['trunk', 'primary']"` after way
//! merging).  [`RoadClass::normalize`] maps any such text onto the fixed
//! vocabulary below.
//!
//! # Matching rule
//!
//! The input is lowercased and each tag in [`RoadClass::ALL`] is tested as a
//! **substring**, in declared order.  The first hit wins, so a value naming
//! both `trunk` and `primary` normalizes to `Trunk`.  This is a tie-break by
//! table order, not a specificity ranking.  Empty text or text matching no tag
//! normalizes to `Unclassified`.

use std::fmt;

/// Normalized road classification, ordered from highest to lowest capacity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    #[default]
    Unclassified,
}

impl RoadClass {
    /// Every class in declared (matching) order.
    pub const ALL: [RoadClass; 7] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::Unclassified,
    ];

    /// The tag text this class matches.
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway     => "motorway",
            RoadClass::Trunk        => "trunk",
            RoadClass::Primary      => "primary",
            RoadClass::Secondary    => "secondary",
            RoadClass::Tertiary     => "tertiary",
            RoadClass::Residential  => "residential",
            RoadClass::Unclassified => "unclassified",
        }
    }

    /// Position in [`ALL`](Self::ALL); usable as a table index.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map arbitrary classification text onto the vocabulary.  Total.
    pub fn normalize(text: &str) -> RoadClass {
        if text.is_empty() {
            return RoadClass::Unclassified;
        }
        let lowered = text.to_lowercase();
        RoadClass::ALL
            .into_iter()
            .find(|class| lowered.contains(class.as_str()))
            .unwrap_or(RoadClass::Unclassified)
    }

    /// [`normalize`](Self::normalize) for an optional tag; absent means
    /// `Unclassified`.
    pub fn normalize_opt(text: Option<&str>) -> RoadClass {
        text.map_or(RoadClass::Unclassified, RoadClass::normalize)
    }
}

impl From<&str> for RoadClass {
    fn from(text: &str) -> Self {
        RoadClass::normalize(text)
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
