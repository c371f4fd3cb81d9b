//! Listing form vocabulary, per-layout rule sets, and typed drafts.
//!
//! The listing form shows a different field set for residential
//! (Apartment/House), land (Land/Plot), and Shop listings. Each layout has
//! its own [`RuleSet`]; conditional fields are expressed with
//! `required_when` rather than separate code paths. A layout's rule set is
//! also its field list: keys it has no rule for are dropped before a
//! submission is turned into a [`ListingDraft`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::CoreError;
use crate::units::{derived_total, AreaUnit};
use crate::validation::{
    is_empty, validate, Bound, Pattern, Rule, RuleSet, ValidationContext, ValidationErrors,
};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_PHOTOS: usize = 12;
pub const MAX_DOCUMENTS: usize = 5;
pub const TITLE_MIN_LEN: usize = 5;
pub const TITLE_MAX_LEN: usize = 80;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const MAX_ROOMS: i32 = 20;
pub const MAX_BALCONIES: i32 = 10;
pub const MAX_FLOORS: i32 = 200;
pub const MAX_AREA: f64 = 1e9;
pub const MAX_PRICE: f64 = 1e13;
pub const EARLIEST_CONSTRUCTION_YEAR: i32 = 1900;
pub const PINCODE_PATTERN: &str = r"\d{6}";

/// Amenity options offered by the form.
pub const AMENITIES: [&str; 11] = [
    "Parking",
    "Lift",
    "Power Backup",
    "Security",
    "Gym",
    "Park",
    "Swimming Pool",
    "24x7 Water",
    "Gas Pipeline",
    "Air Conditioning",
    "Club House",
];

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

pub const FIELD_TYPE_OF_PROPERTY: &str = "type_of_property";
pub const FIELD_PRICING_MODE: &str = "pricing_mode";

// ---------------------------------------------------------------------------
// Vocabulary enums
// ---------------------------------------------------------------------------

/// Implements `as_str`, `ALL`, `Display`, and `FromStr` over the serde names.
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            concat!("Unknown ", stringify!($name), ": {}"),
                            s
                        ))
                    })
            }
        }
    };
}

labelled_enum!(PropertyType {
    Apartment => "Apartment",
    House => "House",
    Land => "Land",
    Plot => "Plot",
    Shop => "Shop",
});

labelled_enum!(Authority {
    Government => "Government",
    Private => "Private",
    Builder => "Builder",
});

labelled_enum!(ListingFor {
    Sale => "Sale",
    Rent => "Rent",
});

labelled_enum!(Category {
    Residential => "Residential",
    Commercial => "Commercial",
});

labelled_enum!(PricingMode {
    PerUnit => "Per Unit",
    Total => "Total",
});

impl PropertyType {
    pub fn layout(self) -> FormLayout {
        match self {
            PropertyType::Apartment | PropertyType::House => FormLayout::ApartmentHouse,
            PropertyType::Land | PropertyType::Plot => FormLayout::LandPlot,
            PropertyType::Shop => FormLayout::Shop,
        }
    }
}

// ---------------------------------------------------------------------------
// Form layouts and their rule sets
// ---------------------------------------------------------------------------

/// The field group the form renders for a property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormLayout {
    ApartmentHouse,
    LandPlot,
    Shop,
}

static APARTMENT_HOUSE_RULES: LazyLock<RuleSet> = LazyLock::new(apartment_house_rules);
static LAND_PLOT_RULES: LazyLock<RuleSet> = LazyLock::new(land_plot_rules);
static SHOP_RULES: LazyLock<RuleSet> = LazyLock::new(shop_rules);

impl FormLayout {
    pub fn rules(self) -> &'static RuleSet {
        match self {
            FormLayout::ApartmentHouse => &APARTMENT_HOUSE_RULES,
            FormLayout::LandPlot => &LAND_PLOT_RULES,
            FormLayout::Shop => &SHOP_RULES,
        }
    }

    /// Property types rendered with this layout.
    pub fn property_types(self) -> &'static [PropertyType] {
        match self {
            FormLayout::ApartmentHouse => &[PropertyType::Apartment, PropertyType::House],
            FormLayout::LandPlot => &[PropertyType::Land, PropertyType::Plot],
            FormLayout::Shop => &[PropertyType::Shop],
        }
    }

    /// Apartment and House listings are always priced per unit.
    pub fn has_pricing_mode(self) -> bool {
        !matches!(self, FormLayout::ApartmentHouse)
    }
}

fn pattern(source: &str) -> Pattern {
    Pattern::new(source).expect("listing form patterns are valid")
}

/// A pattern accepting exactly one of `options`.
fn one_of<I, S>(options: I) -> Pattern
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let alternatives: Vec<String> = options
        .into_iter()
        .map(|o| regex::escape(o.as_ref()))
        .collect();
    pattern(&alternatives.join("|"))
}

fn labels<T: Copy>(items: &[T], as_str: fn(T) -> &'static str) -> Vec<&'static str> {
    items.iter().copied().map(as_str).collect()
}

/// Fields shared by every layout.
fn common_rules(layout: FormLayout) -> RuleSet {
    let types = labels(layout.property_types(), PropertyType::as_str);
    RuleSet::new()
        .with(
            FIELD_TYPE_OF_PROPERTY,
            Rule::new().required().pattern(one_of(types)),
        )
        .with(
            "authority",
            Rule::new()
                .required()
                .pattern(one_of(labels(Authority::ALL, Authority::as_str))),
        )
        .with(
            "listing_for",
            Rule::new()
                .required()
                .pattern(one_of(labels(ListingFor::ALL, ListingFor::as_str))),
        )
        .with(
            "title",
            Rule::new()
                .required()
                .min_length(TITLE_MIN_LEN)
                .max_length(TITLE_MAX_LEN),
        )
        .with("photos", Rule::new().max_items(MAX_PHOTOS))
        .with("address", Rule::new().required())
        .with("society", Rule::new())
        .with("area_locality", Rule::new().required())
        .with("city", Rule::new().required())
        .with("district", Rule::new().required())
        .with("state", Rule::new().required())
        .with(
            "pincode",
            Rule::new().required().pattern(pattern(PINCODE_PATTERN)),
        )
        .with("description", Rule::new().max_length(DESCRIPTION_MAX_LEN))
        .with("latitude", Rule::new().min(-90).max(90))
        .with("longitude", Rule::new().min(-180).max(180))
        .with("area", Rule::new().required().min(1).max(MAX_AREA))
        .with("documents", Rule::new().max_items(MAX_DOCUMENTS))
}

fn unit_pattern() -> Pattern {
    one_of(labels(&AreaUnit::ALL, AreaUnit::as_str))
}

fn apartment_house_rules() -> RuleSet {
    common_rules(FormLayout::ApartmentHouse)
        .with(
            "floor",
            Rule::new()
                .integer()
                .min(0)
                .max(MAX_FLOORS)
                .required_when(FIELD_TYPE_OF_PROPERTY, [PropertyType::Apartment.as_str()]),
        )
        .with(
            "number_of_floors",
            Rule::new()
                .integer()
                .min(1)
                .max(MAX_FLOORS)
                .required_when(FIELD_TYPE_OF_PROPERTY, [PropertyType::House.as_str()]),
        )
        .with(
            "rooms",
            Rule::new().required().integer().min(1).max(MAX_ROOMS),
        )
        .with(
            "bathrooms",
            Rule::new().required().integer().min(1).max(MAX_ROOMS),
        )
        .with(
            "balconies",
            Rule::new().integer().min(0).max(MAX_BALCONIES),
        )
        .with("amenities", Rule::new().max_items(AMENITIES.len()))
        .with(
            "year_of_construction",
            Rule::new()
                .integer()
                .min(EARLIEST_CONSTRUCTION_YEAR)
                .max(Bound::CurrentYear),
        )
        .with("area_unit", Rule::new().required().pattern(unit_pattern()))
        .with(
            "price_per_unit",
            Rule::new().required().min(0).max(MAX_PRICE),
        )
}

/// Pricing fields for layouts that let the user pick per-unit or total pricing.
fn with_pricing_mode(rules: RuleSet) -> RuleSet {
    let per_unit = [PricingMode::PerUnit.as_str()];
    rules
        .with(
            FIELD_PRICING_MODE,
            Rule::new()
                .required()
                .pattern(one_of(labels(PricingMode::ALL, PricingMode::as_str))),
        )
        .with(
            "price_per_unit",
            Rule::new()
                .min(0)
                .max(MAX_PRICE)
                .required_when(FIELD_PRICING_MODE, per_unit),
        )
        .with(
            "area_unit",
            Rule::new()
                .pattern(unit_pattern())
                .required_when(FIELD_PRICING_MODE, per_unit),
        )
        .with(
            "total_price",
            Rule::new()
                .min(0)
                .max(MAX_PRICE)
                .required_when(FIELD_PRICING_MODE, [PricingMode::Total.as_str()]),
        )
}

fn land_plot_rules() -> RuleSet {
    let category = Rule::new()
        .pattern(one_of(labels(Category::ALL, Category::as_str)))
        .required_when(
            FIELD_TYPE_OF_PROPERTY,
            [PropertyType::Land.as_str(), PropertyType::Plot.as_str()],
        );
    with_pricing_mode(common_rules(FormLayout::LandPlot)).with("category", category)
}

fn shop_rules() -> RuleSet {
    with_pricing_mode(common_rules(FormLayout::Shop))
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// How a listing is priced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pricing {
    PerUnit {
        price_per_unit: f64,
        unit: AreaUnit,
        computed_total: f64,
    },
    Total {
        total_price: f64,
    },
}

impl Pricing {
    /// Per-unit pricing; `area` is measured in `unit`.
    pub fn per_unit(price_per_unit: f64, unit: AreaUnit, area: f64) -> Self {
        Pricing::PerUnit {
            price_per_unit,
            unit,
            computed_total: derived_total(price_per_unit, area),
        }
    }

    /// Total price regardless of pricing mode.
    pub fn total(&self) -> f64 {
        match *self {
            Pricing::PerUnit { computed_total, .. } => computed_total,
            Pricing::Total { total_price } => total_price,
        }
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// A validated listing form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub type_of_property: PropertyType,
    pub authority: Authority,
    pub listing_for: ListingFor,
    #[serde(default)]
    pub category: Option<Category>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub address: String,
    #[serde(default)]
    pub society: Option<String>,
    pub area_locality: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub area: f64,
    #[serde(default)]
    pub area_unit: Option<AreaUnit>,
    #[serde(default)]
    pub pricing_mode: Option<PricingMode>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub number_of_floors: Option<i32>,
    #[serde(default)]
    pub rooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub balconies: Option<i32>,
    #[serde(default)]
    pub year_of_construction: Option<i32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl ListingDraft {
    pub fn layout(&self) -> FormLayout {
        self.type_of_property.layout()
    }

    /// Pricing mode in effect (Apartment/House is always per unit).
    pub fn effective_pricing_mode(&self) -> PricingMode {
        if self.layout().has_pricing_mode() {
            self.pricing_mode.unwrap_or(PricingMode::PerUnit)
        } else {
            PricingMode::PerUnit
        }
    }

    /// Unit the area was entered in; total-priced listings default to square feet.
    pub fn area_unit(&self) -> AreaUnit {
        self.area_unit.unwrap_or(AreaUnit::Sqft)
    }

    pub fn pricing(&self) -> Result<Pricing, CoreError> {
        match self.effective_pricing_mode() {
            PricingMode::PerUnit => {
                let price = self.price_per_unit.ok_or_else(|| {
                    CoreError::Validation("price_per_unit is required for per-unit pricing".into())
                })?;
                Ok(Pricing::per_unit(price, self.area_unit(), self.area))
            }
            PricingMode::Total => {
                let total_price = self.total_price.ok_or_else(|| {
                    CoreError::Validation("total_price is required for total pricing".into())
                })?;
                Ok(Pricing::Total { total_price })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Resolve the form layout from the submitted `type_of_property`.
pub fn layout_for(values: &Map<String, Value>) -> Result<FormLayout, CoreError> {
    match values.get(FIELD_TYPE_OF_PROPERTY).and_then(Value::as_str) {
        Some(s) => Ok(s.parse::<PropertyType>()?.layout()),
        None => Err(CoreError::Validation(format!(
            "{FIELD_TYPE_OF_PROPERTY} is required"
        ))),
    }
}

/// Validate a listing submission against the rule set of its layout.
///
/// A missing or unknown `type_of_property` is reported on that field, since
/// no layout can be chosen without it. Fields the layout does not show are
/// ignored. Fields that pass their rules but could not be stored as their
/// typed column (a string where a number belongs, a foreign amenity) are
/// reported too, so an empty result means [`parse_listing`] succeeds.
pub fn validate_listing(values: &Map<String, Value>, ctx: &ValidationContext) -> ValidationErrors {
    let type_value = values.get(FIELD_TYPE_OF_PROPERTY);
    if is_empty(type_value) {
        return ValidationErrors::from([(
            FIELD_TYPE_OF_PROPERTY.to_string(),
            ctx.messages.required.clone(),
        )]);
    }

    match layout_for(values) {
        Ok(layout) => {
            let rules = layout.rules();
            let mut errors = validate(values, rules, ctx);
            for (field, value) in values {
                if rules.get(field).is_none() || errors.contains_key(field) {
                    continue;
                }
                if let Some(message) = shape_error(field, value, ctx) {
                    errors.insert(field.clone(), message);
                }
            }
            errors
        }
        Err(_) => ValidationErrors::from([(
            FIELD_TYPE_OF_PROPERTY.to_string(),
            ctx.messages.pattern.clone(),
        )]),
    }
}

/// Validate and then deserialize a submission into a [`ListingDraft`].
pub fn parse_listing(
    values: &Map<String, Value>,
    ctx: &ValidationContext,
) -> Result<ListingDraft, CoreError> {
    let errors = validate_listing(values, ctx);
    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors));
    }

    let layout = layout_for(values)?;
    serde_json::from_value(Value::Object(compact(values, layout.rules())))
        .map_err(|e| CoreError::Validation(format!("Malformed listing: {e}")))
}

/// JSON shape a field needs to deserialize into its [`ListingDraft`] slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Number,
    Integer,
    TextList,
}

fn field_kind(field: &str) -> FieldKind {
    match field {
        "latitude" | "longitude" | "area" | "price_per_unit" | "total_price" => FieldKind::Number,
        "floor" | "number_of_floors" | "rooms" | "bathrooms" | "balconies"
        | "year_of_construction" => FieldKind::Integer,
        "amenities" | "photos" | "documents" => FieldKind::TextList,
        _ => FieldKind::Text,
    }
}

/// The message for a non-empty value the draft could not hold, if any.
fn shape_error(field: &str, value: &Value, ctx: &ValidationContext) -> Option<String> {
    if is_empty(Some(value)) {
        return None;
    }

    let kind = field_kind(field);
    let fits = match kind {
        FieldKind::Text => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Integer => value.as_f64().is_some_and(|n| {
            n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX)
        }),
        FieldKind::TextList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
    };

    if !fits {
        let message = match kind {
            FieldKind::Integer => &ctx.messages.integer,
            _ => &ctx.messages.pattern,
        };
        return Some(message.clone());
    }

    if field == "amenities" {
        let known = value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .all(|item| AMENITIES.contains(&item));
        if !known {
            return Some(ctx.messages.pattern.clone());
        }
    }

    None
}

/// Keep the non-empty values of fields `rules` covers, and turn whole floats
/// (`3.0`) into integers so the typed draft sees the same thing the rules saw.
fn compact(values: &Map<String, Value>, rules: &RuleSet) -> Map<String, Value> {
    values
        .iter()
        .filter(|(k, v)| rules.get(k).is_some() && !is_empty(Some(v)))
        .map(|(k, v)| (k.clone(), normalize_number(v)))
        .collect()
}

fn normalize_number(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Value::Number(Number::from(f as i64))
            }
            _ => value.clone(),
        },
        Value::String(s) => Value::String(s.trim().to_string()),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const YEAR: i32 = 2025;

    fn ctx() -> ValidationContext {
        ValidationContext::new(YEAR)
    }

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn apartment() -> Map<String, Value> {
        obj(json!({
            "type_of_property": "Apartment",
            "authority": "Builder",
            "listing_for": "Sale",
            "title": "2BHK in Sector 62",
            "floor": 3,
            "rooms": 2,
            "bathrooms": 2,
            "balconies": 1,
            "amenities": ["Parking", "Lift"],
            "year_of_construction": 2015,
            "address": "Flat 301, Tower B",
            "area_locality": "Sector 62",
            "city": "Noida",
            "district": "Gautam Buddh Nagar",
            "state": "Uttar Pradesh",
            "pincode": "201301",
            "area": 1200,
            "area_unit": "Sqft",
            "price_per_unit": 4000
        }))
    }

    fn plot() -> Map<String, Value> {
        obj(json!({
            "type_of_property": "Plot",
            "authority": "Government",
            "listing_for": "Sale",
            "category": "Residential",
            "title": "Residential plot near highway",
            "address": "Plot 17",
            "area_locality": "Block C",
            "city": "Hyderabad",
            "district": "Rangareddy",
            "state": "Telangana",
            "pincode": "500032",
            "area": 2,
            "pricing_mode": "Per Unit",
            "area_unit": "Acres",
            "price_per_unit": 2500000
        }))
    }

    #[test]
    fn every_layout_rule_set_is_self_contained() {
        for layout in [FormLayout::ApartmentHouse, FormLayout::LandPlot, FormLayout::Shop] {
            assert!(
                layout.rules().dangling_dependencies().is_empty(),
                "{layout:?} has dangling required_when references"
            );
        }
    }

    #[test]
    fn valid_apartment_passes() {
        assert!(validate_listing(&apartment(), &ctx()).is_empty());
    }

    #[test]
    fn apartment_requires_floor_house_requires_number_of_floors() {
        let mut values = apartment();
        values.remove("floor");
        let errors = validate_listing(&values, &ctx());
        assert!(errors.contains_key("floor"));

        values.insert("type_of_property".into(), json!("House"));
        let errors = validate_listing(&values, &ctx());
        assert!(!errors.contains_key("floor"));
        assert!(errors.contains_key("number_of_floors"));
    }

    #[test]
    fn land_requires_category() {
        let mut values = plot();
        values.insert("category".into(), json!(""));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors.get("category").map(String::as_str), Some("This field is required."));
    }

    #[test]
    fn pricing_mode_switches_required_price_field() {
        let mut values = plot();
        values.remove("price_per_unit");
        values.remove("area_unit");
        let errors = validate_listing(&values, &ctx());
        assert!(errors.contains_key("price_per_unit"));
        assert!(errors.contains_key("area_unit"));
        assert!(!errors.contains_key("total_price"));

        values.insert("pricing_mode".into(), json!("Total"));
        let errors = validate_listing(&values, &ctx());
        assert!(errors.contains_key("total_price"));
        assert!(!errors.contains_key("price_per_unit"));

        values.insert("total_price".into(), json!(5_000_000));
        assert!(validate_listing(&values, &ctx()).is_empty());
    }

    #[test]
    fn out_of_range_values_report_first_violation() {
        let mut values = apartment();
        values.insert("rooms".into(), json!(2.5));
        values.insert("bathrooms".into(), json!(25));
        values.insert("year_of_construction".into(), json!(YEAR + 1));
        values.insert("pincode".into(), json!("2013"));
        values.insert("title".into(), json!("Flat"));
        let errors = validate_listing(&values, &ctx());

        assert_eq!(errors["rooms"], "Must be a whole number.");
        assert_eq!(errors["bathrooms"], "Value too high.");
        assert_eq!(errors["year_of_construction"], "Value too high.");
        assert_eq!(errors["pincode"], "Invalid format.");
        assert_eq!(errors["title"], "Too short.");
    }

    #[test]
    fn too_many_photos_is_rejected() {
        let mut values = apartment();
        let photos: Vec<String> = (0..=MAX_PHOTOS).map(|i| format!("https://img/{i}.jpg")).collect();
        values.insert("photos".into(), json!(photos));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors["photos"], "Too many items.");
    }

    #[test]
    fn unknown_select_values_fail_pattern() {
        let mut values = apartment();
        values.insert("authority".into(), json!("Cooperative"));
        values.insert("area_unit".into(), json!("Bighas"));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors["authority"], "Invalid format.");
        assert_eq!(errors["area_unit"], "Invalid format.");
    }

    #[test]
    fn missing_or_unknown_property_type() {
        let mut values = apartment();
        values.remove("type_of_property");
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["type_of_property"], "This field is required.");

        values.insert("type_of_property".into(), json!("Castle"));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors["type_of_property"], "Invalid format.");
    }

    #[test]
    fn parse_apartment_computes_total() {
        let draft = parse_listing(&apartment(), &ctx()).unwrap();
        assert_eq!(draft.type_of_property, PropertyType::Apartment);
        assert_eq!(draft.rooms, Some(2));
        let pricing = draft.pricing().unwrap();
        assert_matches!(
            pricing,
            Pricing::PerUnit { unit: AreaUnit::Sqft, computed_total, .. } if computed_total == 4_800_000.0
        );
    }

    #[test]
    fn apartment_ignores_total_pricing_mode() {
        let mut values = apartment();
        values.insert("pricing_mode".into(), json!("Total"));
        let draft = parse_listing(&values, &ctx()).unwrap();
        assert_eq!(draft.effective_pricing_mode(), PricingMode::PerUnit);
    }

    #[test]
    fn parse_plot_in_acres() {
        let draft = parse_listing(&plot(), &ctx()).unwrap();
        assert_eq!(draft.area_unit(), AreaUnit::Acres);
        assert_eq!(draft.pricing().unwrap().total(), 5_000_000.0);
    }

    #[test]
    fn parse_rejects_invalid_fields() {
        let mut values = apartment();
        values.insert("rooms".into(), json!(0));
        assert_matches!(
            parse_listing(&values, &ctx()),
            Err(CoreError::InvalidFields(errors)) if errors.contains_key("rooms")
        );
    }

    #[test]
    fn whole_floats_and_blank_optionals_deserialize() {
        let mut values = apartment();
        values.insert("rooms".into(), json!(3.0));
        values.insert("society".into(), json!("  "));
        values.insert("city".into(), json!("  Noida "));
        let draft = parse_listing(&values, &ctx()).unwrap();
        assert_eq!(draft.rooms, Some(3));
        assert_eq!(draft.society, None);
        assert_eq!(draft.city, "Noida");
    }

    #[test]
    fn total_priced_shop_defaults_to_sqft() {
        let values = shop();
        let draft = parse_listing(&values, &ctx()).unwrap();
        assert_eq!(draft.area_unit(), AreaUnit::Sqft);
        assert_eq!(draft.pricing().unwrap(), Pricing::Total { total_price: 25000.0 });
    }

    fn shop() -> Map<String, Value> {
        obj(json!({
            "type_of_property": "Shop",
            "authority": "Private",
            "listing_for": "Rent",
            "title": "Commercial shop near market",
            "address": "Shop 4",
            "area_locality": "Main Bazaar",
            "city": "Pune",
            "district": "Pune",
            "state": "Maharashtra",
            "pincode": "411001",
            "area": 300,
            "pricing_mode": "Total",
            "total_price": 25000
        }))
    }

    #[test]
    fn shop_drops_fields_its_layout_does_not_show() {
        let mut values = shop();
        values.insert("rooms".into(), json!(-5));
        values.insert("floor".into(), json!(-100));
        values.insert("year_of_construction".into(), json!(3000));
        values.insert("balconies".into(), json!(99));
        values.insert("amenities".into(), json!(["Helipad"]));

        assert!(validate_listing(&values, &ctx()).is_empty());
        let draft = parse_listing(&values, &ctx()).unwrap();
        assert_eq!(draft.rooms, None);
        assert_eq!(draft.floor, None);
        assert_eq!(draft.year_of_construction, None);
        assert_eq!(draft.balconies, None);
        assert!(draft.amenities.is_empty());
    }

    #[test]
    fn switching_apartment_to_plot_sheds_apartment_fields() {
        let mut values = apartment();
        values.extend(obj(json!({
            "type_of_property": "Plot",
            "category": "Residential",
            "pricing_mode": "Per Unit",
            "area_unit": "Acres",
            "area": 2,
            "price_per_unit": 2500000
        })));

        let draft = parse_listing(&values, &ctx()).unwrap();
        assert_eq!(draft.layout(), FormLayout::LandPlot);
        assert_eq!(draft.category, Some(Category::Residential));
        assert_eq!(draft.rooms, None);
        assert_eq!(draft.bathrooms, None);
        assert_eq!(draft.floor, None);
        assert!(draft.amenities.is_empty());
    }

    #[test]
    fn apartment_requires_unit_price_even_with_total_price() {
        let mut values = shop();
        values.insert("type_of_property".into(), json!("Apartment"));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors["price_per_unit"], "This field is required.");
        assert!(!errors.contains_key("total_price"));
    }

    #[test]
    fn amenities_must_come_from_the_offered_list() {
        let mut values = apartment();
        values.insert("amenities".into(), json!(["Parking", "Helipad"]));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors["amenities"], "Invalid format.");
    }

    #[test]
    fn values_of_the_wrong_type_are_reported_per_field() {
        let cases = [
            (shop(), "area", json!("lots"), "Invalid format."),
            (apartment(), "rooms", json!("2"), "Must be a whole number."),
            (apartment(), "floor", json!(1e12), "Value too high."),
            (apartment(), "title", json!(12345), "Invalid format."),
            (apartment(), "photos", json!([1, 2]), "Invalid format."),
        ];
        for (mut values, field, value, message) in cases {
            values.insert(field.into(), value);
            let errors = validate_listing(&values, &ctx());
            assert_eq!(errors.get(field).map(String::as_str), Some(message), "{field}");
        }
    }

    #[test]
    fn dry_run_and_parse_agree() {
        let mut bad_area = shop();
        bad_area.insert("area".into(), json!("lots"));
        let mut huge_floor = apartment();
        huge_floor.insert("floor".into(), json!(1e12));
        let mut stray_rooms = shop();
        stray_rooms.insert("rooms".into(), json!("many"));

        for values in [apartment(), plot(), shop(), bad_area, huge_floor, stray_rooms] {
            let errors = validate_listing(&values, &ctx());
            match parse_listing(&values, &ctx()) {
                Ok(_) => assert!(errors.is_empty(), "parsed despite {errors:?}"),
                Err(CoreError::InvalidFields(reported)) => assert_eq!(reported, errors),
                Err(other) => panic!("dry run said {errors:?} but parse failed with {other}"),
            }
        }
    }

    #[test]
    fn prices_and_areas_are_capped() {
        let mut values = apartment();
        values.insert("price_per_unit".into(), json!(1e300));
        values.insert("area".into(), json!(1e12));
        let errors = validate_listing(&values, &ctx());
        assert_eq!(errors["price_per_unit"], "Value too high.");
        assert_eq!(errors["area"], "Value too high.");
    }

    #[test]
    fn labelled_enums_parse_their_labels() {
        assert_eq!("Per Unit".parse::<PricingMode>().unwrap(), PricingMode::PerUnit);
        assert_eq!("Land".parse::<PropertyType>().unwrap().layout(), FormLayout::LandPlot);
        assert_matches!("Villa".parse::<PropertyType>(), Err(CoreError::Validation(_)));
    }
}
