//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` is always **latitude first**.  Map-data providers and GeoJSON
//! store `(lon, lat)`; the only places that accept or produce that order are
//! the explicitly named `*_lon_lat` helpers.

use crate::{CoreError, CoreResult};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a provider-ordered `(lon, lat)` pair.
    #[inline]
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// Like [`new`](Self::new) but rejects non-finite or out-of-range values.
    pub fn checked(lat: f64, lon: f64) -> CoreResult<Self> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(CoreError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// `[lat, lon]`, the renderer-facing order.
    #[inline]
    pub fn to_lat_lon(self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    /// `[lon, lat]`, GeoJSON order.
    #[inline]
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Squared planar distance in degrees with longitude scaled by
    /// `cos(ref_lat)`.  Monotonic with true distance within a city, and much
    /// cheaper than `distance_m` for nearest-point comparisons.
    #[inline]
    pub fn planar_distance_2(self, other: GeoPoint, lon_scale: f64) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = (self.lon - other.lon) * lon_scale;
        dlat * dlat + dlon * dlon
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
