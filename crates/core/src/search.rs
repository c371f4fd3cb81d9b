//! Listing search filters and pagination helpers.
//!
//! The browse screen sends free-form range strings ("4000-6000") and
//! bucket labels ("3 BHK", "4+", "2011-2020"). This module turns those into
//! numeric bounds the repository layer can bind directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::listing::{ListingFor, PropertyType};
use crate::units::{price_per_sqft_from_unit, to_square_feet, AreaUnit};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE: i64 = 1;

/// Default number of listings per page.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum number of listings per page.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided page number to 1 or more.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(DEFAULT_PAGE).max(1)
}

/// Page metadata returned alongside a page of listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric ranges
// ---------------------------------------------------------------------------

/// Inclusive numeric range; a missing side is unbounded.
///
/// Deserializes from the range strings accepted by [`Range::parse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Parse `"4000-6000"`, `"4000-"`, `"-6000"`, or `"4000+"`.
    ///
    /// Returns `None` when a side is present but not a number.
    pub fn parse(s: &str) -> Option<Range> {
        let s = s.trim();
        if let Some(min) = s.strip_suffix('+') {
            return Some(Range::new(Some(parse_side(min)??), None));
        }
        let (min, max) = s.split_once('-')?;
        Some(Range::new(parse_side(min)?, parse_side(max)?))
    }

    /// Explicit bounds win; sides left open fall back to `range`.
    fn with_fallback(min: Option<f64>, max: Option<f64>, range: Option<Range>) -> Range {
        let range = range.unwrap_or_default();
        Range::new(min.or(range.min), max.or(range.max))
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Range {
        Range::new(self.min.map(&f), self.max.map(&f))
    }

    /// A range of areas in `unit` as a range of square feet.
    pub fn area_to_sqft(self, unit: AreaUnit) -> Range {
        self.map(|v| to_square_feet(v, unit))
    }

    /// A range of prices per `unit` as a range of prices per square foot.
    pub fn per_unit_to_per_sqft(self, unit: AreaUnit) -> Range {
        self.map(|v| price_per_sqft_from_unit(v, unit))
    }
}

impl TryFrom<String> for Range {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Range::parse(&s).ok_or_else(|| CoreError::Validation(format!("Invalid range: {s}")))
    }
}

/// `Some(None)` for an empty side, `None` for garbage.
fn parse_side(s: &str) -> Option<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Some(None);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
}

/// Inclusive integer bounds produced by a bucket.
pub type IntRange = (Option<i32>, Option<i32>);

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Bedroom filter chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomsBucket {
    #[serde(rename = "1 BHK")]
    One,
    #[serde(rename = "2 BHK")]
    Two,
    #[serde(rename = "3 BHK")]
    Three,
    #[serde(rename = "4+ BHK")]
    FourPlus,
}

impl RoomsBucket {
    pub const ALL: [RoomsBucket; 4] = [
        RoomsBucket::One,
        RoomsBucket::Two,
        RoomsBucket::Three,
        RoomsBucket::FourPlus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomsBucket::One => "1 BHK",
            RoomsBucket::Two => "2 BHK",
            RoomsBucket::Three => "3 BHK",
            RoomsBucket::FourPlus => "4+ BHK",
        }
    }

    pub fn range(self) -> IntRange {
        match self {
            RoomsBucket::One => (Some(1), Some(1)),
            RoomsBucket::Two => (Some(2), Some(2)),
            RoomsBucket::Three => (Some(3), Some(3)),
            RoomsBucket::FourPlus => (Some(4), None),
        }
    }
}

impl FromStr for RoomsBucket {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomsBucket::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown rooms filter: {s}")))
    }
}

pub const BATHROOM_BUCKETS: [&str; 4] = ["1", "2", "3", "4+"];
pub const BALCONY_BUCKETS: [&str; 4] = ["0", "1", "2", "3+"];

/// A count chip such as `"2"` (exactly two) or `"4+"` (four or more).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountBucket {
    pub count: i32,
    pub or_more: bool,
}

impl CountBucket {
    pub fn range(self) -> IntRange {
        if self.or_more {
            (Some(self.count), None)
        } else {
            (Some(self.count), Some(self.count))
        }
    }
}

impl FromStr for CountBucket {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, or_more) = match s.strip_suffix('+') {
            Some(d) => (d, true),
            None => (s, false),
        };
        digits
            .parse::<i32>()
            .ok()
            .filter(|c| *c >= 0)
            .map(|count| CountBucket { count, or_more })
            .ok_or_else(|| CoreError::Validation(format!("Unknown count filter: {s}")))
    }
}

impl TryFrom<String> for CountBucket {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for CountBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, if self.or_more { "+" } else { "" })
    }
}

impl From<CountBucket> for String {
    fn from(bucket: CountBucket) -> Self {
        bucket.to_string()
    }
}

/// Construction-year chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearBucket {
    #[serde(rename = "<2000")]
    Before2000,
    #[serde(rename = "2000-2010")]
    From2000To2010,
    #[serde(rename = "2011-2020")]
    From2011To2020,
    #[serde(rename = "2021+")]
    From2021,
}

impl YearBucket {
    pub fn range(self) -> IntRange {
        match self {
            YearBucket::Before2000 => (None, Some(1999)),
            YearBucket::From2000To2010 => (Some(2000), Some(2010)),
            YearBucket::From2011To2020 => (Some(2011), Some(2020)),
            YearBucket::From2021 => (Some(2021), None),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing query
// ---------------------------------------------------------------------------

/// Query-string filters for browsing listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    /// Case-insensitive substring of the city name.
    pub city: Option<String>,
    pub type_of_property: Option<PropertyType>,
    pub listing_for: Option<ListingFor>,
    pub verified: Option<bool>,
    /// Matches a listing when either its per-unit or its total price is in range.
    /// `price` takes a range string ("4000-6000"); `min_price`/`max_price`
    /// override its sides.
    pub price: Option<Range>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Area bounds, measured in `area_unit`.
    pub area: Option<Range>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    /// Price-per-`area_unit` bounds, compared on a per-sqft basis.
    pub unit_price: Option<Range>,
    pub min_unit_price: Option<f64>,
    pub max_unit_price: Option<f64>,
    /// Unit for the area and unit-price bounds (default square feet).
    pub area_unit: Option<AreaUnit>,
    /// Exact number of rooms; overrides `rooms_bucket`.
    pub rooms: Option<i32>,
    pub rooms_bucket: Option<RoomsBucket>,
    pub bathrooms_bucket: Option<CountBucket>,
    pub balconies_bucket: Option<CountBucket>,
    pub year_bucket: Option<YearBucket>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListingQuery {
    pub fn page(&self) -> i64 {
        clamp_page(self.page)
    }

    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT)
    }

    /// Rows to skip; saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// City filter with surrounding whitespace removed; blank means no filter.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn price_range(&self) -> Range {
        Range::with_fallback(self.min_price, self.max_price, self.price)
    }

    pub fn area_range_sqft(&self) -> Range {
        Range::with_fallback(self.min_area, self.max_area, self.area).area_to_sqft(self.area_unit())
    }

    pub fn unit_price_range_sqft(&self) -> Range {
        Range::with_fallback(self.min_unit_price, self.max_unit_price, self.unit_price)
            .per_unit_to_per_sqft(self.area_unit())
    }

    pub fn rooms_range(&self) -> IntRange {
        match (self.rooms, self.rooms_bucket) {
            (Some(rooms), _) => (Some(rooms), Some(rooms)),
            (None, Some(bucket)) => bucket.range(),
            (None, None) => (None, None),
        }
    }

    pub fn bathrooms_range(&self) -> IntRange {
        self.bathrooms_bucket.map(CountBucket::range).unwrap_or_default()
    }

    pub fn balconies_range(&self) -> IntRange {
        self.balconies_bucket.map(CountBucket::range).unwrap_or_default()
    }

    pub fn year_range(&self) -> IntRange {
        self.year_bucket.map(YearBucket::range).unwrap_or_default()
    }

    fn area_unit(&self) -> AreaUnit {
        self.area_unit.unwrap_or(AreaUnit::Sqft)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
