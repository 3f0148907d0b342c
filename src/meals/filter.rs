//! Meal search: turns listing query parameters into SQL predicates, ordering
//! and pagination, and folds review rows into rating summaries.
//!
//! Everything here is pure; the repository feeds the builders into
//! `sqlx::QueryBuilder` and runs them.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::ApiError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 12;
pub const MAX_LIMIT: i64 = 100;
/// Highest page whose offset still fits an `i64` at the largest limit.
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// Raw `GET /meals` query string. Every field arrives as text so that empty
/// values (`?search=&minPrice=`) mean "not set" instead of a parse failure.
#[derive(Debug, Default)]
pub struct MealListParams {
    pub search: Option<String>,
    /// Every `categoryId` value, in order; each may itself be a comma list.
    pub category_id: Vec<String>,
    pub provider_id: Option<String>,
    pub is_vegetarian: Option<String>,
    pub is_spicy: Option<String>,
    pub is_popular: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl MealListParams {
    /// Collects decoded query pairs. Repeated `categoryId` keys accumulate;
    /// for any other key the last value wins. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut p = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "categoryId" | "categoryId[]" => {
                    p.category_id.push(value);
                    continue;
                }
                "search" => &mut p.search,
                "providerId" => &mut p.provider_id,
                "isVegetarian" => &mut p.is_vegetarian,
                "isSpicy" => &mut p.is_spicy,
                "isPopular" => &mut p.is_popular,
                "minPrice" => &mut p.min_price,
                "maxPrice" => &mut p.max_price,
                "sort" => &mut p.sort,
                "page" => &mut p.page,
                "limit" => &mut p.limit,
                _ => continue,
            };
            *slot = Some(value);
        }
        p
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Popular,
    PriceLow,
    PriceHigh,
    Rating,
    #[default]
    Newest,
}

impl SortKey {
    /// Unknown keys fall back to newest first.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "popular" => SortKey::Popular,
            "price-low" => SortKey::PriceLow,
            "price-high" => SortKey::PriceHigh,
            "rating" => SortKey::Rating,
            _ => SortKey::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            SortKey::Popular => "m.is_popular DESC, m.created_at DESC, m.id",
            SortKey::PriceLow => "m.price ASC, m.created_at DESC, m.id",
            SortKey::PriceHigh => "m.price DESC, m.created_at DESC, m.id",
            SortKey::Rating => {
                "(SELECT AVG(r.rating) FROM reviews r WHERE r.meal_id = m.id) DESC NULLS LAST, \
                 m.created_at DESC, m.id"
            }
            SortKey::Newest => "m.created_at DESC, m.id",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFilter {
    One(Uuid),
    Any(Vec<Uuid>),
}

/// Validated meal search.
#[derive(Debug, Clone, PartialEq)]
pub struct MealFilter {
    pub search: Option<String>,
    pub category: Option<CategoryFilter>,
    pub provider_id: Option<Uuid>,
    pub is_vegetarian: Option<bool>,
    pub is_spicy: Option<bool>,
    pub is_popular: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: SortKey,
    pub page: i64,
    pub limit: i64,
}

impl Default for MealFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            provider_id: None,
            is_vegetarian: None,
            is_spicy: None,
            is_popular: None,
            min_price: None,
            max_price: None,
            sort: SortKey::Newest,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_flag(name: &str, raw: Option<String>) -> Result<Option<bool>, ApiError> {
    match non_empty(raw).as_deref() {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(ApiError::bad_request(format!("{name} must be true or false"))),
    }
}

fn parse_price(name: &str, raw: Option<String>) -> Result<Option<f64>, ApiError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
            _ => Err(ApiError::bad_request(format!(
                "{name} must be a non-negative number"
            ))),
        },
    }
}

fn parse_int(name: &str, raw: Option<String>, default: i64) -> Result<i64, ApiError> {
    match non_empty(raw) {
        None => Ok(default),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request(format!("{name} must be an integer"))),
    }
}

fn parse_category(raw: &[String]) -> Result<Option<CategoryFilter>, ApiError> {
    let ids = raw
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| ApiError::bad_request("categoryId must be a UUID"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match ids.len() {
        0 => None,
        1 => Some(CategoryFilter::One(ids[0])),
        _ => Some(CategoryFilter::Any(ids)),
    })
}

impl TryFrom<MealListParams> for MealFilter {
    type Error = ApiError;

    fn try_from(p: MealListParams) -> Result<Self, Self::Error> {
        let min_price = parse_price("minPrice", p.min_price)?;
        let max_price = parse_price("maxPrice", p.max_price)?;
        if let (Some(lo), Some(hi)) = (min_price, max_price) {
            if lo > hi {
                return Err(ApiError::bad_request(
                    "minPrice must not be greater than maxPrice",
                ));
            }
        }
        Ok(Self {
            search: non_empty(p.search),
            category: parse_category(&p.category_id)?,
            provider_id: non_empty(p.provider_id)
                .map(|s| {
                    Uuid::parse_str(&s)
                        .map_err(|_| ApiError::bad_request("providerId must be a UUID"))
                })
                .transpose()?,
            is_vegetarian: parse_flag("isVegetarian", p.is_vegetarian)?,
            is_spicy: parse_flag("isSpicy", p.is_spicy)?,
            is_popular: parse_flag("isPopular", p.is_popular)?,
            min_price,
            max_price,
            sort: p.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            page: parse_int("page", p.page, DEFAULT_PAGE)?.clamp(1, MAX_PAGE),
            limit: parse_int("limit", p.limit, DEFAULT_LIMIT)?.clamp(1, MAX_LIMIT),
        })
    }
}

/// Escapes `%`, `_` and `\` so user text matches literally inside ILIKE.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl MealFilter {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Appends ` WHERE ...` for this filter. Columns are addressed through
    /// the `m` alias for `meals`. Only available meals ever match.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE m.available = TRUE");

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (m.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR m.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(" OR EXISTS (SELECT 1 FROM unnest(m.ingredients) AS ing WHERE lower(ing) = lower(");
            qb.push_bind(search.clone());
            qb.push(")))");
        }

        match &self.category {
            Some(CategoryFilter::One(id)) => {
                qb.push(" AND m.category_id = ");
                qb.push_bind(*id);
            }
            Some(CategoryFilter::Any(ids)) => {
                qb.push(" AND m.category_id = ANY(");
                qb.push_bind(ids.clone());
                qb.push(")");
            }
            None => {}
        }

        if let Some(provider_id) = self.provider_id {
            qb.push(" AND m.provider_id = ");
            qb.push_bind(provider_id);
        }

        for (column, value) in [
            ("m.is_vegetarian", self.is_vegetarian),
            ("m.is_spicy", self.is_spicy),
            ("m.is_popular", self.is_popular),
        ] {
            if let Some(v) = value {
                qb.push(format!(" AND {column} = "));
                qb.push_bind(v);
            }
        }

        if let Some(min) = self.min_price {
            qb.push(" AND m.price >= ");
            qb.push_bind(min);
        }
        if let Some(max) = self.max_price {
            qb.push(" AND m.price <= ");
            qb.push_bind(max);
        }
    }

    /// Appends ordering and the page window.
    pub fn push_order_and_page(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" ORDER BY ");
        qb.push(self.sort.order_by());
        qb.push(" LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.offset());
    }
}

/// Average rating and number of reviews of one meal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    pub rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    /// Mean rounded to one decimal; 0 when there are no reviews.
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
        let avg = sum as f64 / ratings.len() as f64;
        Self {
            rating: (avg * 10.0).round() / 10.0,
            review_count: ratings.len() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_sql(filter: &MealFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT m.id FROM meals m");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn empty_filter_still_requires_availability() {
        let sql = where_sql(&MealFilter::default());
        assert_eq!(sql, "SELECT m.id FROM meals m WHERE m.available = TRUE");
    }

    #[test]
    fn every_filter_keeps_availability_predicate() {
        let filter = MealFilter {
            search: Some("chicken".into()),
            category: Some(CategoryFilter::Any(vec![Uuid::new_v4(), Uuid::new_v4()])),
            is_vegetarian: Some(true),
            is_spicy: Some(false),
            min_price: Some(10.0),
            max_price: Some(20.0),
            ..MealFilter::default()
        };
        let sql = where_sql(&filter);
        assert!(sql.contains("WHERE m.available = TRUE AND"));
        assert!(sql.contains("m.name ILIKE $1"));
        assert!(sql.contains("m.description ILIKE $2"));
        assert!(sql.contains("lower(ing) = lower($3)"));
        assert!(sql.contains("m.category_id = ANY($4)"));
        assert!(sql.contains("m.is_vegetarian = $5"));
        assert!(sql.contains("m.is_spicy = $6"));
        assert!(sql.contains("m.price >= $7"));
        assert!(sql.contains("m.price <= $8"));
    }

    #[test]
    fn single_category_uses_equality() {
        let filter = MealFilter {
            category: Some(CategoryFilter::One(Uuid::new_v4())),
            ..MealFilter::default()
        };
        let sql = where_sql(&filter);
        assert!(sql.contains("m.category_id = $1"));
        assert!(!sql.contains("ANY"));
    }

    #[test]
    fn params_parse_empty_values_as_unset() {
        let params = MealListParams {
            search: Some("".into()),
            category_id: vec!["".into()],
            is_vegetarian: Some("".into()),
            min_price: Some(" ".into()),
            sort: Some("".into()),
            page: Some("".into()),
            limit: Some("".into()),
            ..MealListParams::default()
        };
        let filter = MealFilter::try_from(params).unwrap();
        assert_eq!(filter, MealFilter::default());
    }

    #[test]
    fn params_parse_categories_and_bounds() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let params = MealListParams {
            category_id: vec![format!("{a}, {b}")],
            is_vegetarian: Some("true".into()),
            min_price: Some("10".into()),
            max_price: Some("20.5".into()),
            sort: Some("price-high".into()),
            page: Some("3".into()),
            limit: Some("500".into()),
            ..MealListParams::default()
        };
        let filter = MealFilter::try_from(params).unwrap();
        assert_eq!(filter.category, Some(CategoryFilter::Any(vec![a, b])));
        assert_eq!(filter.is_vegetarian, Some(true));
        assert_eq!(filter.min_price, Some(10.0));
        assert_eq!(filter.max_price, Some(20.5));
        assert_eq!(filter.sort, SortKey::PriceHigh);
        assert_eq!(filter.page, 3);
        assert_eq!(filter.limit, MAX_LIMIT);
        assert_eq!(filter.offset(), 200);
    }

    #[test]
    fn params_reject_garbage() {
        let bad_price = MealListParams {
            min_price: Some("cheap".into()),
            ..MealListParams::default()
        };
        assert!(matches!(
            MealFilter::try_from(bad_price),
            Err(ApiError::BadRequest(_))
        ));

        let inverted = MealListParams {
            min_price: Some("30".into()),
            max_price: Some("20".into()),
            ..MealListParams::default()
        };
        assert!(MealFilter::try_from(inverted).is_err());

        let bad_flag = MealListParams {
            is_spicy: Some("yes".into()),
            ..MealListParams::default()
        };
        assert!(MealFilter::try_from(bad_flag).is_err());

        let bad_category = MealListParams {
            category_id: vec!["pizza".into()],
            ..MealListParams::default()
        };
        assert!(MealFilter::try_from(bad_category).is_err());
    }

    #[test]
    fn provider_param_narrows_to_one_restaurant() {
        let id = Uuid::new_v4();
        let filter = MealFilter::try_from(MealListParams {
            provider_id: Some(id.to_string()),
            ..MealListParams::default()
        })
        .unwrap();
        assert_eq!(filter.provider_id, Some(id));
        assert!(where_sql(&filter).contains("m.provider_id = $1"));

        let bad = MealListParams {
            provider_id: Some("siam".into()),
            ..MealListParams::default()
        };
        assert!(MealFilter::try_from(bad).is_err());
    }

    #[test]
    fn repeated_category_keys_are_merged() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let params = MealListParams::from_pairs(vec![
            ("categoryId".to_string(), a.to_string()),
            ("sort".to_string(), "rating".to_string()),
            ("categoryId".to_string(), format!("{b},{c}")),
            ("utm_source".to_string(), "mail".to_string()),
        ]);
        assert_eq!(params.category_id.len(), 2);
        assert_eq!(params.sort.as_deref(), Some("rating"));

        let filter = MealFilter::try_from(params).unwrap();
        assert_eq!(filter.category, Some(CategoryFilter::Any(vec![a, b, c])));
        assert_eq!(filter.sort, SortKey::Rating);
    }

    #[test]
    fn huge_page_is_capped_and_offset_does_not_overflow() {
        let params = MealListParams {
            page: Some(i64::MAX.to_string()),
            limit: Some(MAX_LIMIT.to_string()),
            ..MealListParams::default()
        };
        let filter = MealFilter::try_from(params).unwrap();
        assert_eq!(filter.page, MAX_PAGE);
        assert!(filter.offset() >= 0);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT m.id FROM meals m");
        filter.push_where(&mut qb);
        filter.push_order_and_page(&mut qb);
        assert!(qb.sql().ends_with("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn page_below_one_is_clamped() {
        let params = MealListParams {
            page: Some("0".into()),
            limit: Some("0".into()),
            ..MealListParams::default()
        };
        let filter = MealFilter::try_from(params).unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 1);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn sort_keys_map_to_ordering() {
        assert_eq!(SortKey::parse("popular"), SortKey::Popular);
        assert_eq!(SortKey::parse("price-low"), SortKey::PriceLow);
        assert_eq!(SortKey::parse("rating"), SortKey::Rating);
        assert_eq!(SortKey::parse("bogus"), SortKey::Newest);

        let filter = MealFilter {
            sort: SortKey::PriceLow,
            page: 2,
            ..MealFilter::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT m.id FROM meals m");
        filter.push_where(&mut qb);
        filter.push_order_and_page(&mut qb);
        assert!(qb
            .sql()
            .ends_with("ORDER BY m.price ASC, m.created_at DESC, m.id LIMIT $1 OFFSET $2"));

        assert!(SortKey::Rating.order_by().contains("AVG(r.rating)"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("naan"), "naan");
    }

    #[test]
    fn rating_summary_rounds_to_one_decimal() {
        assert_eq!(RatingSummary::from_ratings(&[]), RatingSummary::default());
        assert_eq!(RatingSummary::from_ratings(&[]).rating, 0.0);

        let summary = RatingSummary::from_ratings(&[5, 5, 4]);
        assert_eq!(summary.rating, 4.7);
        assert_eq!(summary.review_count, 3);

        assert_eq!(RatingSummary::from_ratings(&[1, 2]).rating, 1.5);
    }
}
