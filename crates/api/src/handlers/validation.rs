//! Handlers for `/validate`: dry-run listing validation and the rule sets
//! the listing form is checked against.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use propgo_core::listing::{validate_listing, FormLayout, PropertyType, AMENITIES};
use propgo_core::units::AreaUnit;
use propgo_core::validation::{RuleSet, ValidationContext, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppResult;
use crate::response::DataResponse;

/// Outcome of a dry-run validation.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: ValidationErrors,
}

/// Query parameters for `GET /validate/listing/rules`.
#[derive(Debug, Deserialize)]
pub struct RulesParams {
    pub type_of_property: PropertyType,
}

/// Everything a client needs to render and pre-validate one form layout.
#[derive(Debug, Serialize)]
pub struct LayoutRules {
    pub layout: FormLayout,
    pub property_types: &'static [PropertyType],
    pub current_year: i32,
    pub rules: &'static RuleSet,
    pub amenities: &'static [&'static str],
    pub area_units: Vec<AreaUnit>,
}

/// POST /api/validate/listing
///
/// Run the listing rules without persisting anything. Always 200; the
/// report says whether the payload would be accepted.
pub async fn validate_listing_payload(
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    let Json(values) = payload?;
    let errors = validate_listing(&values, &ValidationContext::now());

    Ok(Json(DataResponse {
        data: ValidationReport {
            valid: errors.is_empty(),
            errors,
        },
    }))
}

/// GET /api/validate/listing/rules?type_of_property=
///
/// The serialized rule set for the layout a property type renders.
pub async fn listing_rules(
    params: Result<Query<RulesParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<LayoutRules>>> {
    let Query(params) = params?;
    let layout = params.type_of_property.layout();

    Ok(Json(DataResponse {
        data: LayoutRules {
            layout,
            property_types: layout.property_types(),
            current_year: ValidationContext::now().current_year,
            rules: layout.rules(),
            amenities: &AMENITIES,
            area_units: AreaUnit::ALL.to_vec(),
        },
    }))
}
