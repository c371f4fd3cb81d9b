//! Handlers for the `/listings` resource.
//!
//! Create and update run the submission through the listing rule set for
//! its property type; rule violations come back as a 400 with a per-field
//! `fields` map.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use propgo_core::error::CoreError;
use propgo_core::listing::parse_listing;
use propgo_core::search::{ListingQuery, Pagination};
use propgo_core::types::DbId;
use propgo_core::units::{AreaDisplay, AreaUnit};
use propgo_core::validation::ValidationContext;
use propgo_db::models::listing::{Listing, ListingFields};
use propgo_db::repositories::listing_repo::ListingFilter;
use propgo_db::repositories::ListingRepo;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{ensure_owner_or_admin, RequireAdmin};
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

/// Query parameters for `GET /listings/{id}/display`.
#[derive(Debug, Deserialize)]
pub struct DisplayParams {
    /// Target unit; defaults to the unit the listing was entered in.
    pub unit: Option<AreaUnit>,
}

/// Request body for `PATCH /listings/{id}/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub verified: bool,
}

/// GET /api/listings
///
/// Public browse with filters and pagination.
pub async fn list_listings(
    State(state): State<AppState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> AppResult<Json<PagedResponse<Listing>>> {
    let Query(query) = query?;
    let filter = ListingFilter::from(&query);
    let (page, limit) = (query.page(), query.limit());

    let (listings, total) = ListingRepo::list(&state.pool, &filter, limit, query.offset()).await?;

    Ok(Json(PagedResponse {
        data: listings,
        pagination: Pagination::new(total, page, limit),
    }))
}

/// GET /api/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Listing>>> {
    let listing = find_listing(&state, id).await?;
    Ok(Json(DataResponse { data: listing }))
}

/// GET /api/listings/{id}/display?unit=
///
/// Area and price of a listing expressed in one unit.
pub async fn display_listing(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    params: Result<Query<DisplayParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<AreaDisplay>>> {
    let Query(params) = params?;
    let listing = find_listing(&state, id).await?;

    let unit = match params.unit {
        Some(unit) => unit,
        None => listing.area_unit.parse::<AreaUnit>()?,
    };

    Ok(Json(DataResponse {
        data: listing.display_in(unit),
    }))
}

/// POST /api/listings
///
/// Validate and create a listing owned by the caller. Returns 201.
pub async fn create_listing(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<Listing>>)> {
    let Json(values) = payload?;

    let draft = parse_listing(&values, &ValidationContext::now())?;
    let fields = ListingFields::from_draft(&draft)?;
    let listing = ListingRepo::create(&state.pool, user.user_id, &fields).await?;

    tracing::info!(
        listing_id = listing.id,
        owner_id = user.user_id,
        type_of_property = %listing.type_of_property,
        "Listing created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: listing })))
}

/// PUT /api/listings/{id}
///
/// Merge the submitted fields over the stored listing and validate the
/// result as a whole. Owner or admin only.
pub async fn update_listing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> AppResult<Json<DataResponse<Listing>>> {
    let Json(patch) = payload?;
    let existing = find_listing(&state, id).await?;
    ensure_owner_or_admin(&user, existing.owner_id)?;

    let mut values = existing.form_values();
    values.extend(patch);

    let draft = parse_listing(&values, &ValidationContext::now())?;
    let fields = ListingFields::from_draft(&draft)?;
    let listing = ListingRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }))?;

    tracing::info!(listing_id = id, user_id = user.user_id, "Listing updated");

    Ok(Json(DataResponse { data: listing }))
}

/// DELETE /api/listings/{id}
///
/// Owner or admin only. Returns 204 No Content.
pub async fn delete_listing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_listing(&state, id).await?;
    ensure_owner_or_admin(&user, existing.owner_id)?;

    if !ListingRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }));
    }

    tracing::info!(listing_id = id, user_id = user.user_id, "Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/listings/user/my-listings
pub async fn my_listings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Listing>>>> {
    let listings = ListingRepo::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: listings }))
}

/// PATCH /api/listings/{id}/verify
///
/// Set or clear the verified badge. Admin only.
pub async fn verify_listing(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<DataResponse<Listing>>> {
    let listing = ListingRepo::set_verified(&state.pool, id, input.verified)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }))?;

    tracing::info!(
        listing_id = id,
        admin_id = admin.user_id,
        verified = input.verified,
        "Listing verification changed"
    );

    Ok(Json(DataResponse { data: listing }))
}

async fn find_listing(state: &AppState, id: DbId) -> AppResult<Listing> {
    ListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }))
}
