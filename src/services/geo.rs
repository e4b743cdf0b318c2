use crate::models::dto::UnitDetail;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (latitude, longitude) points, in km.
pub fn haversine_distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Annotate units with their distance to the user, sort ascending by
/// distance and mark the nearest one as the default selection. Without
/// user coordinates nothing is marked and the list is left untouched.
pub fn mark_closest_unit(units: &mut [UnitDetail], user_coords: Option<(f64, f64)>) {
    let Some(user) = user_coords else {
        return;
    };

    for unit in units.iter_mut() {
        unit.active = false;
        unit.distance_km = match (unit.latitude, unit.longitude) {
            (Some(lat), Some(lon)) => Some(haversine_distance_km(user, (lat, lon))),
            _ => None,
        };
    }

    // Units without coordinates sort last.
    units.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });

    if let Some(first) = units.first_mut() {
        if first.distance_km.is_some() {
            first.active = true;
        }
    }
}

/// Keep only units whose distance to `center` is within `radius_km`.
/// Units without coordinates are dropped when a radius is asked for.
pub fn units_within_radius(
    units: Vec<UnitDetail>,
    center: (f64, f64),
    radius_km: f64,
) -> Vec<UnitDetail> {
    units
        .into_iter()
        .filter(|unit| match (unit.latitude, unit.longitude) {
            (Some(lat), Some(lon)) => haversine_distance_km(center, (lat, lon)) <= radius_km,
            _ => false,
        })
        .collect()
}

/// Point-level radius check used by the filter engine.
pub fn within_radius(point: (f64, f64), center: (f64, f64), radius_km: f64) -> bool {
    haversine_distance_km(point, center) <= radius_km
}
