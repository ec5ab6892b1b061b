//! # Geospatial Matching
//!
//! Sphere-cap containment for `$geoWithin` / `$centerSphere` filters.
//! Radii are angles in radians: a ground distance divided by the Earth's
//! radius in the same unit.

use std::str::FromStr;

use serde_json::Value;

/// Mean Earth radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3963.2;

/// Equatorial Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Unit of a ground distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn earth_radius(&self) -> f64 {
        match self {
            DistanceUnit::Miles => EARTH_RADIUS_MILES,
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(DistanceUnit::Kilometers)
            }
            other => Err(format!("unknown distance unit: {}", other)),
        }
    }
}

/// Circle on the sphere around a `[lng, lat]` centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoSphere {
    pub lng: f64,
    pub lat: f64,
    /// Angular radius in radians
    pub radius: f64,
}

impl GeoSphere {
    pub fn new(lng: f64, lat: f64, radius: f64) -> Self {
        Self { lng, lat, radius }
    }

    /// Sphere covering `distance` ground units around the centre
    pub fn from_distance(lng: f64, lat: f64, distance: f64, unit: DistanceUnit) -> Self {
        Self::new(lng, lat, distance / unit.earth_radius())
    }

    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        angular_distance(self.lng, self.lat, lng, lat) <= self.radius
    }

    /// Containment test for a stored location.
    ///
    /// Accepts a GeoJSON point (`{"type": "Point", "coordinates": [lng, lat]}`)
    /// or a bare `[lng, lat]` pair. Anything else is outside.
    pub fn contains_value(&self, value: &Value) -> bool {
        match point(value) {
            Some((lng, lat)) => self.contains(lng, lat),
            None => false,
        }
    }
}

fn point(value: &Value) -> Option<(f64, f64)> {
    let coordinates = match value {
        Value::Object(obj) => obj.get("coordinates")?,
        other => other,
    };

    match coordinates.as_array()?.as_slice() {
        [lng, lat] => Some((lng.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}

/// Great-circle angle between two points (haversine)
fn angular_distance(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}
