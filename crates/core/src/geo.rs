//! City catalog and great-circle distance lookups.

use serde::Serialize;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default search radius for [`nearby_cities`].
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const CITIES: [City; 10] = [
    City { name: "Mumbai", lat: 19.076, lon: 72.8777 },
    City { name: "Pune", lat: 18.5204, lon: 73.8567 },
    City { name: "Bengaluru", lat: 12.9716, lon: 77.5946 },
    City { name: "Hyderabad", lat: 17.385, lon: 78.4867 },
    City { name: "Noida", lat: 28.5355, lon: 77.3910 },
    City { name: "Delhi", lat: 28.7041, lon: 77.1025 },
    City { name: "Gurugram", lat: 28.4595, lon: 77.0266 },
    City { name: "Chennai", lat: 13.0827, lon: 80.2707 },
    City { name: "Kolkata", lat: 22.5726, lon: 88.3639 },
    City { name: "Ahmedabad", lat: 23.0225, lon: 72.5714 },
];

/// A catalog city with its distance from a query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyCity {
    #[serde(flatten)]
    pub city: City,
    pub distance_km: f64,
}

/// Great-circle distance between two points given in decimal degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Catalog cities within `max_distance_km` of the point, closest first.
pub fn nearby_cities(lat: f64, lon: f64, max_distance_km: f64) -> Vec<NearbyCity> {
    let mut cities: Vec<NearbyCity> = CITIES
        .iter()
        .map(|&city| NearbyCity {
            city,
            distance_km: haversine_km(lat, lon, city.lat, city.lon),
        })
        .filter(|c| c.distance_km <= max_distance_km)
        .collect();
    cities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    cities
}

/// The closest catalog city, regardless of distance.
pub fn nearest_city(lat: f64, lon: f64) -> Option<NearbyCity> {
    nearby_cities(lat, lon, f64::INFINITY).into_iter().next()
}

/// Whether `(lat, lon)` is a valid coordinate pair.
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
