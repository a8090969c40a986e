// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Geodesy

use crate::types::Node;

/// Mean Earth radius in meters (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine surface distance in meters between two lat/lon points (degrees).
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Earth-centered Cartesian coordinates for a point at `alt_m` above the sphere.
pub fn to_ecef(lat: f64, lon: f64, alt_m: f64) -> [f64; 3] {
    let lat_r = lat.to_radians();
    let lon_r = lon.to_radians();
    let r = EARTH_RADIUS_M + alt_m;
    [
        r * lat_r.cos() * lon_r.cos(),
        r * lat_r.cos() * lon_r.sin(),
        r * lat_r.sin(),
    ]
}

fn ecef_distance(p0: &[f64; 3], p1: &[f64; 3]) -> f64 {
    let dx = p0[0] - p1[0];
    let dy = p0[1] - p1[1];
    let dz = p0[2] - p1[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Straight-line 3D distance in meters. Missing altitudes count as 0.
pub fn slant_range(
    lat1: f64,
    lon1: f64,
    alt1_m: Option<f64>,
    lat2: f64,
    lon2: f64,
    alt2_m: Option<f64>,
) -> f64 {
    let a = to_ecef(lat1, lon1, alt1_m.unwrap_or(0.0));
    let b = to_ecef(lat2, lon2, alt2_m.unwrap_or(0.0));
    ecef_distance(&a, &b)
}

/// Slant range between two nodes, using each node's kind-default altitude
/// when the snapshot carries none.
pub fn node_distance(a: &Node, b: &Node) -> f64 {
    slant_range(
        a.lat,
        a.lon,
        Some(a.altitude_m()),
        b.lat,
        b.lon,
        Some(b.altitude_m()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    #[test]
    fn great_circle_zero_for_same_point() {
        for &(lat, lon) in &[(0.0, 0.0), (45.5, -122.6), (-89.9, 179.9)] {
            assert_eq!(great_circle_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn great_circle_is_symmetric() {
        let ab = great_circle_distance(10.0, 20.0, -33.0, 151.0);
        let ba = great_circle_distance(-33.0, 151.0, 10.0, 20.0);
        assert!((ab - ba).abs() < 1e-6, "ab={ab} ba={ba}");
    }

    #[test]
    fn great_circle_one_degree_on_equator() {
        let d = great_circle_distance(0.0, 0.0, 0.0, 1.0);
        // 2 * pi * R / 360
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn great_circle_wraps_longitude() {
        let d = great_circle_distance(12.0, 180.0, 12.0, -180.0);
        assert!(d < 1e-6, "got {d}");
    }

    #[test]
    fn great_circle_monotonic_in_separation() {
        let mut last = 0.0;
        for deg in 1..=180 {
            let d = great_circle_distance(0.0, 0.0, 0.0, deg as f64);
            assert!(d > last, "not increasing at {deg} degrees");
            last = d;
        }
    }

    #[test]
    fn slant_range_zero_for_identical_points() {
        assert_eq!(slant_range(5.0, 6.0, Some(1200.0), 5.0, 6.0, Some(1200.0)), 0.0);
        assert_eq!(slant_range(5.0, 6.0, None, 5.0, 6.0, None), 0.0);
    }

    #[test]
    fn slant_range_is_vertical_altitude_difference() {
        let d = slant_range(30.0, 40.0, None, 30.0, 40.0, Some(550_000.0));
        assert!((d - 550_000.0).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn slant_range_shorter_than_arc_on_surface() {
        let chord = slant_range(0.0, 0.0, None, 0.0, 10.0, None);
        let arc = great_circle_distance(0.0, 0.0, 0.0, 10.0);
        assert!(chord < arc);
        assert!(arc - chord < 2_000.0);
    }

    #[test]
    fn node_distance_uses_kind_default_altitude() {
        let ground = Node::new(1, NodeKind::Ground, 0.0, 0.0);
        let sat = Node::new(2, NodeKind::Satellite, 0.0, 0.0);
        let d = node_distance(&ground, &sat);
        assert!((d - 550_000.0).abs() < 1e-3, "got {d}");
    }
}
