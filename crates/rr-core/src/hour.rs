//! Hour-of-day model.
//!
//! Routing costs depend on the hour at which a request is made.  The hour is
//! sampled **once per request** and then held fixed for the whole search, so
//! every edge is costed against the same time snapshot.

use std::fmt;

use crate::{CoreError, CoreResult};

/// An hour of the day in `0..=23`.
///
/// The range is enforced at construction, which makes every function that
/// takes an `Hour` total over its input.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct Hour(u8);

impl Hour {
    pub const MIDNIGHT: Hour = Hour(0);
    pub const NOON: Hour = Hour(12);

    pub fn new(hour: u8) -> CoreResult<Hour> {
        if hour < 24 {
            Ok(Hour(hour))
        } else {
            Err(CoreError::InvalidHour(hour))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Local hour for a Unix timestamp in a zone `utc_offset_secs` east of UTC.
    ///
    /// Works for timestamps before the epoch too (Euclidean remainder).
    pub fn from_unix_secs(unix_secs: i64, utc_offset_secs: i32) -> Hour {
        let local = unix_secs + utc_offset_secs as i64;
        Hour((local.rem_euclid(86_400) / 3_600) as u8)
    }

    /// Iterate all 24 hours in order.
    pub fn all() -> impl Iterator<Item = Hour> {
        (0..24u8).map(Hour)
    }
}

impl TryFrom<u8> for Hour {
    type Error = CoreError;
    fn try_from(hour: u8) -> CoreResult<Hour> {
        Hour::new(hour)
    }
}

impl From<Hour> for u8 {
    fn from(hour: Hour) -> u8 {
        hour.0
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}
