//! Listing entity model and DTOs.

use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::FromRow;
use propgo_core::error::CoreError;
use propgo_core::listing::{ListingDraft, Pricing};
use propgo_core::types::{DbId, Timestamp};
use propgo_core::units::{self, AreaDisplay, AreaUnit, PRICE_UNDEFINED};

/// A row from the `listings` table.
///
/// Enum-valued columns (`type_of_property`, `area_unit`, ...) hold the same
/// labels the form submits.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: DbId,
    pub owner_id: DbId,
    pub type_of_property: String,
    pub authority: String,
    pub listing_for: String,
    pub category: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub society: Option<String>,
    pub area_locality: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area: f64,
    pub area_unit: String,
    pub area_sqft: f64,
    pub pricing_mode: String,
    pub price_per_unit: Option<f64>,
    pub total_price: Option<f64>,
    pub computed_total: f64,
    pub price_per_sqft: Option<f64>,
    pub floor: Option<i32>,
    pub number_of_floors: Option<i32>,
    pub rooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub balconies: Option<i32>,
    pub year_of_construction: Option<i32>,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub documents: Vec<String>,
    pub verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// The user-editable fields as form values, keyed like a submission.
    ///
    /// Used to merge a partial update over the stored listing before the
    /// merged payload is validated again.
    pub fn form_values(&self) -> Map<String, Value> {
        let value = json!({
            "type_of_property": self.type_of_property,
            "authority": self.authority,
            "listing_for": self.listing_for,
            "category": self.category,
            "title": self.title,
            "description": self.description,
            "address": self.address,
            "society": self.society,
            "area_locality": self.area_locality,
            "city": self.city,
            "district": self.district,
            "state": self.state,
            "pincode": self.pincode,
            "latitude": self.latitude,
            "longitude": self.longitude,
            "area": self.area,
            "area_unit": self.area_unit,
            "pricing_mode": self.pricing_mode,
            "price_per_unit": self.price_per_unit,
            "total_price": self.total_price,
            "floor": self.floor,
            "number_of_floors": self.number_of_floors,
            "rooms": self.rooms,
            "bathrooms": self.bathrooms,
            "balconies": self.balconies,
            "year_of_construction": self.year_of_construction,
            "amenities": self.amenities,
            "photos": self.photos,
            "documents": self.documents,
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Area and price expressed in `unit`.
    pub fn display_in(&self, unit: AreaUnit) -> AreaDisplay {
        units::display_in(self.area_sqft, self.computed_total, unit)
    }
}

/// Column values written on insert and full update.
///
/// Built from a validated [`ListingDraft`]; derived columns (`area_sqft`,
/// `computed_total`, `price_per_sqft`) are computed here so every write
/// path stores the same normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub type_of_property: String,
    pub authority: String,
    pub listing_for: String,
    pub category: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub society: Option<String>,
    pub area_locality: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area: f64,
    pub area_unit: String,
    pub area_sqft: f64,
    pub pricing_mode: String,
    pub price_per_unit: Option<f64>,
    pub total_price: Option<f64>,
    pub computed_total: f64,
    pub price_per_sqft: Option<f64>,
    pub floor: Option<i32>,
    pub number_of_floors: Option<i32>,
    pub rooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub balconies: Option<i32>,
    pub year_of_construction: Option<i32>,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub documents: Vec<String>,
}

impl ListingFields {
    pub fn from_draft(draft: &ListingDraft) -> Result<Self, CoreError> {
        let unit = draft.area_unit();
        let pricing = draft.pricing()?;
        let area_sqft = units::to_square_feet(draft.area, unit);
        let computed_total = pricing.total();
        let per_sqft = units::price_per_sqft(computed_total, area_sqft);

        let (price_per_unit, total_price) = match pricing {
            Pricing::PerUnit { price_per_unit, .. } => (Some(price_per_unit), None),
            Pricing::Total { total_price } => (None, Some(total_price)),
        };

        Ok(Self {
            type_of_property: draft.type_of_property.as_str().to_string(),
            authority: draft.authority.as_str().to_string(),
            listing_for: draft.listing_for.as_str().to_string(),
            category: draft.category.map(|c| c.as_str().to_string()),
            title: draft.title.clone(),
            description: draft.description.clone(),
            address: draft.address.clone(),
            society: draft.society.clone(),
            area_locality: draft.area_locality.clone(),
            city: draft.city.clone(),
            district: draft.district.clone(),
            state: draft.state.clone(),
            pincode: draft.pincode.clone(),
            latitude: draft.latitude,
            longitude: draft.longitude,
            area: draft.area,
            area_unit: unit.as_str().to_string(),
            area_sqft,
            pricing_mode: draft.effective_pricing_mode().as_str().to_string(),
            price_per_unit,
            total_price,
            computed_total,
            price_per_sqft: (per_sqft != PRICE_UNDEFINED).then_some(per_sqft),
            floor: draft.floor,
            number_of_floors: draft.number_of_floors,
            rooms: draft.rooms,
            bathrooms: draft.bathrooms,
            balconies: draft.balconies,
            year_of_construction: draft.year_of_construction,
            amenities: draft.amenities.clone(),
            photos: draft.photos.clone(),
            documents: draft.documents.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propgo_core::listing::parse_listing;
    use propgo_core::validation::ValidationContext;

    fn plot_draft(mode: &str) -> ListingDraft {
        let values = json!({
            "type_of_property": "Land",
            "authority": "Private",
            "listing_for": "Sale",
            "category": "Commercial",
            "title": "Corner land parcel",
            "address": "Survey 12",
            "area_locality": "Hinjewadi",
            "city": "Pune",
            "district": "Pune",
            "state": "Maharashtra",
            "pincode": "411057",
            "area": 2,
            "area_unit": "Acres",
            "pricing_mode": mode,
            "price_per_unit": 1000000,
            "total_price": 3000000
        });
        let Value::Object(map) = values else { unreachable!() };
        parse_listing(&map, &ValidationContext::new(2025)).unwrap()
    }

    #[test]
    fn per_unit_fields_are_normalized_to_sqft() {
        let fields = ListingFields::from_draft(&plot_draft("Per Unit")).unwrap();
        assert_eq!(fields.area_sqft, 87120.0);
        assert_eq!(fields.computed_total, 2_000_000.0);
        assert_eq!(fields.price_per_unit, Some(1_000_000.0));
        assert_eq!(fields.total_price, None);
        assert_eq!(fields.pricing_mode, "Per Unit");
        assert_eq!(fields.category.as_deref(), Some("Commercial"));
    }

    #[test]
    fn total_mode_keeps_only_total_price() {
        let fields = ListingFields::from_draft(&plot_draft("Total")).unwrap();
        assert_eq!(fields.computed_total, 3_000_000.0);
        assert_eq!(fields.price_per_unit, None);
        assert_eq!(fields.total_price, Some(3_000_000.0));
        assert!(fields.price_per_sqft.is_some());
    }
}
