//! Great-circle distance and distance formatting.

use nearby_data::Coordinate;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance between two coordinates, in miles.
///
/// Non-finite inputs propagate as `NaN`; coordinates are validated when the
/// dataset is loaded, not here.
///
/// # Examples
///
/// ```rust
/// use nearby::{Coordinate, geo::distance_miles};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 0.01);
/// assert!((distance_miles(a, b) - 0.69).abs() < 0.01);
/// ```
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Human-readable distance: `"Less than 0.1 miles"` below 0.1, otherwise one
/// decimal place followed by `" miles"`.
pub fn format_distance(miles: f64) -> String {
    if miles < 0.1 {
        "Less than 0.1 miles".to_string()
    } else {
        format!("{miles:.1} miles")
    }
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
