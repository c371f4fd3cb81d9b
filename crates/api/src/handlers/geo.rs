//! Handlers for the `/cities` resource.

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::Json;
use propgo_core::error::CoreError;
use propgo_core::geo::{is_valid_coordinate, nearby_cities, nearest_city, NearbyCity, DEFAULT_NEARBY_RADIUS_KM};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;

/// Query parameters for the city lookups.
#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub lat: f64,
    pub lon: f64,
    /// Search radius for `/nearby` (default 200 km).
    pub max_distance_km: Option<f64>,
}

impl LocationParams {
    fn checked(self) -> AppResult<Self> {
        if !is_valid_coordinate(self.lat, self.lon) {
            return Err(AppError::BadRequest(format!(
                "Coordinates out of range: lat={}, lon={}",
                self.lat, self.lon
            )));
        }
        if self.max_distance_km.is_some_and(|d| d.is_nan() || d < 0.0) {
            return Err(AppError::BadRequest(
                "max_distance_km must be a non-negative number".into(),
            ));
        }
        Ok(self)
    }
}

/// GET /api/cities/nearby?lat=&lon=&max_distance_km=
///
/// Catalog cities within the radius, closest first.
pub async fn nearby(
    params: Result<Query<LocationParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<NearbyCity>>>> {
    let Query(params) = params?;
    let params = params.checked()?;
    let radius = params.max_distance_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);

    Ok(Json(DataResponse {
        data: nearby_cities(params.lat, params.lon, radius),
    }))
}

/// GET /api/cities/nearest?lat=&lon=
///
/// The single closest catalog city.
pub async fn nearest(
    params: Result<Query<LocationParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<NearbyCity>>> {
    let Query(params) = params?;
    let params = params.checked()?;

    let city = nearest_city(params.lat, params.lon)
        .ok_or_else(|| AppError::Core(CoreError::Internal("City catalog is empty".into())))?;

    Ok(Json(DataResponse { data: city }))
}
