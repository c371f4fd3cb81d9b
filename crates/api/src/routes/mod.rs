pub mod auth;
pub mod geo;
pub mod health;
pub mod listing;
pub mod user;
pub mod validation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                      register (public)
/// /auth/login                       login (public)
/// /auth/refresh                     rotate refresh token (public)
/// /auth/logout                      revoke refresh token (public)
///
/// /listings                         browse (public), create (auth)
/// /listings/user/my-listings        caller's listings (auth)
/// /listings/{id}                    get (public), update, delete (owner or admin)
/// /listings/{id}/display            area and price in a chosen unit (public)
/// /listings/{id}/verify             set verified badge (admin)
///
/// /users/profile                    get, update own profile (auth)
/// /users/{id}/role                  change role (admin)
///
/// /cities/nearby                    catalog cities within a radius
/// /cities/nearest                   closest catalog city
///
/// /validate/listing                 dry-run listing validation
/// /validate/listing/rules           rule set for a property type
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/listings", listing::router())
        .nest("/users", user::router())
        .nest("/cities", geo::router())
        .nest("/validate", validation::router())
}
