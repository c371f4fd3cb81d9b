//! Repository for the `listings` table.

use sqlx::PgPool;
use propgo_core::search::ListingQuery;
use propgo_core::types::DbId;

use crate::models::listing::{Listing, ListingFields};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, type_of_property, authority, listing_for, category, \
                        title, description, address, society, area_locality, city, district, \
                        state, pincode, latitude, longitude, area, area_unit, area_sqft, \
                        pricing_mode, price_per_unit, total_price, computed_total, \
                        price_per_sqft, floor, number_of_floors, rooms, bathrooms, balconies, \
                        year_of_construction, amenities, photos, documents, verified, \
                        created_at, updated_at";

/// Writable columns, in bind order `$1..$32` after any leading parameters.
const FIELD_COLUMNS: &str = "type_of_property, authority, listing_for, category, title, \
                              description, address, society, area_locality, city, district, \
                              state, pincode, latitude, longitude, area, area_unit, area_sqft, \
                              pricing_mode, price_per_unit, total_price, computed_total, \
                              price_per_sqft, floor, number_of_floors, rooms, bathrooms, \
                              balconies, year_of_construction, amenities, photos, documents";

/// Shared `WHERE` clause for browse queries. Every filter is optional.
///
/// A price bound matches when either the per-unit or the total price falls
/// inside it.
const FILTER_WHERE: &str = "\
    WHERE ($1::TEXT IS NULL OR city ILIKE $1) \
      AND ($2::TEXT IS NULL OR type_of_property = $2) \
      AND ($3::TEXT IS NULL OR listing_for = $3) \
      AND ($4::BOOL IS NULL OR verified = $4) \
      AND (($5::FLOAT8 IS NULL AND $6::FLOAT8 IS NULL) \
           OR price_per_unit BETWEEN COALESCE($5, '-Infinity'::FLOAT8) AND COALESCE($6, 'Infinity'::FLOAT8) \
           OR total_price BETWEEN COALESCE($5, '-Infinity'::FLOAT8) AND COALESCE($6, 'Infinity'::FLOAT8)) \
      AND ($7::FLOAT8 IS NULL OR area_sqft >= $7) \
      AND ($8::FLOAT8 IS NULL OR area_sqft <= $8) \
      AND ($9::FLOAT8 IS NULL OR price_per_sqft >= $9) \
      AND ($10::FLOAT8 IS NULL OR price_per_sqft <= $10) \
      AND ($11::INT IS NULL OR rooms >= $11) \
      AND ($12::INT IS NULL OR rooms <= $12) \
      AND ($13::INT IS NULL OR bathrooms >= $13) \
      AND ($14::INT IS NULL OR bathrooms <= $14) \
      AND ($15::INT IS NULL OR balconies >= $15) \
      AND ($16::INT IS NULL OR balconies <= $16) \
      AND ($17::INT IS NULL OR year_of_construction >= $17) \
      AND ($18::INT IS NULL OR year_of_construction <= $18)";

/// Resolved bind values for [`FILTER_WHERE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// `ILIKE` pattern, already wrapped in `%` with wildcards escaped.
    pub city_pattern: Option<String>,
    pub type_of_property: Option<String>,
    pub listing_for: Option<String>,
    pub verified: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area_sqft: Option<f64>,
    pub max_area_sqft: Option<f64>,
    pub min_price_per_sqft: Option<f64>,
    pub max_price_per_sqft: Option<f64>,
    pub rooms: (Option<i32>, Option<i32>),
    pub bathrooms: (Option<i32>, Option<i32>),
    pub balconies: (Option<i32>, Option<i32>),
    pub year: (Option<i32>, Option<i32>),
}

impl From<&ListingQuery> for ListingFilter {
    fn from(q: &ListingQuery) -> Self {
        let price = q.price_range();
        let area = q.area_range_sqft();
        let unit_price = q.unit_price_range_sqft();
        Self {
            city_pattern: q.city().map(contains_pattern),
            type_of_property: q.type_of_property.map(|t| t.as_str().to_string()),
            listing_for: q.listing_for.map(|l| l.as_str().to_string()),
            verified: q.verified,
            min_price: price.min,
            max_price: price.max,
            min_area_sqft: area.min,
            max_area_sqft: area.max,
            min_price_per_sqft: unit_price.min,
            max_price_per_sqft: unit_price.max,
            rooms: q.rooms_range(),
            bathrooms: q.bathrooms_range(),
            balconies: q.balconies_range(),
            year: q.year_range(),
        }
    }
}

/// `%needle%` with `ILIKE` wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Bind the [`FILTER_WHERE`] parameters `$1..$18` in order.
macro_rules! bind_filter {
    ($query:expr, $f:expr) => {
        $query
            .bind(&$f.city_pattern)
            .bind(&$f.type_of_property)
            .bind(&$f.listing_for)
            .bind($f.verified)
            .bind($f.min_price)
            .bind($f.max_price)
            .bind($f.min_area_sqft)
            .bind($f.max_area_sqft)
            .bind($f.min_price_per_sqft)
            .bind($f.max_price_per_sqft)
            .bind($f.rooms.0)
            .bind($f.rooms.1)
            .bind($f.bathrooms.0)
            .bind($f.bathrooms.1)
            .bind($f.balconies.0)
            .bind($f.balconies.1)
            .bind($f.year.0)
            .bind($f.year.1)
    };
}

/// Bind the 32 [`FIELD_COLUMNS`] values in order.
macro_rules! bind_fields {
    ($query:expr, $f:expr) => {
        $query
            .bind(&$f.type_of_property)
            .bind(&$f.authority)
            .bind(&$f.listing_for)
            .bind(&$f.category)
            .bind(&$f.title)
            .bind(&$f.description)
            .bind(&$f.address)
            .bind(&$f.society)
            .bind(&$f.area_locality)
            .bind(&$f.city)
            .bind(&$f.district)
            .bind(&$f.state)
            .bind(&$f.pincode)
            .bind($f.latitude)
            .bind($f.longitude)
            .bind($f.area)
            .bind(&$f.area_unit)
            .bind($f.area_sqft)
            .bind(&$f.pricing_mode)
            .bind($f.price_per_unit)
            .bind($f.total_price)
            .bind($f.computed_total)
            .bind($f.price_per_sqft)
            .bind($f.floor)
            .bind($f.number_of_floors)
            .bind($f.rooms)
            .bind($f.bathrooms)
            .bind($f.balconies)
            .bind($f.year_of_construction)
            .bind(&$f.amenities)
            .bind(&$f.photos)
            .bind(&$f.documents)
    };
}

/// `$start, $start+1, ..., $start+n-1`.
fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

const FIELD_COUNT: usize = 32;

/// Provides CRUD and browse operations for listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Insert a listing owned by `owner_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        fields: &ListingFields,
    ) -> Result<Listing, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings (owner_id, {FIELD_COLUMNS})
             VALUES ($1, {})
             RETURNING {COLUMNS}",
            placeholders(2, FIELD_COUNT)
        );
        let q = sqlx::query_as::<_, Listing>(&query).bind(owner_id);
        bind_fields!(q, fields).fetch_one(pool).await
    }

    /// Find a listing by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of listings matching `filter`, newest first, plus the total
    /// number of matches.
    pub async fn list(
        pool: &PgPool,
        filter: &ListingFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Listing>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings {FILTER_WHERE}
             ORDER BY created_at DESC, id DESC
             LIMIT $19 OFFSET $20"
        );
        let q = sqlx::query_as::<_, Listing>(&query);
        let rows = bind_filter!(q, filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM listings {FILTER_WHERE}");
        let q = sqlx::query_scalar::<_, i64>(&count_query);
        let total = bind_filter!(q, filter).fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// All listings owned by a user, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings
             WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Replace every writable column of a listing.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &ListingFields,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let assignments = FIELD_COLUMNS
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(i, col)| format!("{col} = ${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE listings SET {assignments}, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let q = sqlx::query_as::<_, Listing>(&query).bind(id);
        bind_fields!(q, fields).fetch_optional(pool).await
    }

    /// Set the admin verification flag. Returns `None` if the listing is missing.
    pub async fn set_verified(
        pool: &PgPool,
        id: DbId,
        verified: bool,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET verified = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .bind(verified)
            .fetch_optional(pool)
            .await
    }

    /// Delete a listing. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propgo_core::search::{CountBucket, RoomsBucket};
    use propgo_core::units::AreaUnit;

    #[test]
    fn field_columns_match_bind_count() {
        assert_eq!(FIELD_COLUMNS.split(',').count(), FIELD_COUNT);
    }

    #[test]
    fn placeholders_are_sequential() {
        assert_eq!(placeholders(2, 3), "$2, $3, $4");
    }

    #[test]
    fn city_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Noi"), "%Noi%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn filter_resolves_query_units_and_buckets() {
        let q = ListingQuery {
            city: Some(" pune ".into()),
            min_area: Some(100.0),
            area_unit: Some(AreaUnit::SqYards),
            rooms_bucket: Some(RoomsBucket::FourPlus),
            balconies_bucket: Some(CountBucket { count: 1, or_more: false }),
            ..Default::default()
        };
        let f = ListingFilter::from(&q);
        assert_eq!(f.city_pattern.as_deref(), Some("%pune%"));
        assert_eq!(f.min_area_sqft, Some(900.0));
        assert_eq!(f.max_area_sqft, None);
        assert_eq!(f.rooms, (Some(4), None));
        assert_eq!(f.balconies, (Some(1), Some(1)));
        assert_eq!(f.year, (None, None));
    }
}
