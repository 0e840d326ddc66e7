use crate::models::{GeoPoint, Ngo};
use thiserror::Error;

/// Radius used when a nearby search does not name one
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Problems with the raw nearby-search parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NearbyParamError {
    #[error("Latitude and longitude are required")]
    MissingCoordinates,
}

/// A circle on the globe: everything within `radius_km` of `center`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearch {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl NearbySearch {
    pub fn new(center: GeoPoint, radius_km: f64) -> Self {
        Self { center, radius_km }
    }

    /// Build a search from query-string values
    ///
    /// Latitude and longitude must both be present and non-empty. Values are
    /// coerced loosely: text that is not a number becomes NaN, which matches
    /// nothing, and a blank radius is 0. An absent radius falls back to
    /// `default_radius_km`. The radius is not bounds-checked.
    pub fn from_params(
        lat: Option<&str>,
        lng: Option<&str>,
        radius: Option<&str>,
        default_radius_km: f64,
    ) -> Result<Self, NearbyParamError> {
        let lat = present(lat).ok_or(NearbyParamError::MissingCoordinates)?;
        let lng = present(lng).ok_or(NearbyParamError::MissingCoordinates)?;

        let center = GeoPoint::new(coerce_number(lat), coerce_number(lng));
        let radius_km = radius.map_or(default_radius_km, coerce_number);

        Ok(Self::new(center, radius_km))
    }

    /// Whether a point lies within the radius (boundary included)
    ///
    /// Always `false` when the center or radius is NaN.
    #[inline]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_to(point) <= self.radius_km
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn coerce_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

/// Keep the NGOs whose location falls inside the search circle
///
/// Input order is preserved.
pub fn filter_nearby(ngos: Vec<Ngo>, search: &NearbySearch) -> Vec<Ngo> {
    ngos.into_iter()
        .filter(|ngo| search.contains(&ngo.location))
        .collect()
}
