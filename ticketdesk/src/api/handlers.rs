//! Catalog endpoints.
//!
//! - `GET /` - newest tickets, `?page=&limit=`
//! - `GET /category/:category` - tickets in a category, `?page=`, eight per page
//! - `GET /trending` - up to five trending tickets
//!
//! Query values are read leniently: a missing, non-numeric or zero value falls back to
//! the default, and a numeric prefix such as `"3abc"` reads as 3. A repeated key
//! counts once, with its first value. What remains is checked before the store is
//! touched.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    Json,
};

use crate::catalog::{
    CatalogError, PaginatedEventTickets, TicketCatalog, TrendingEventTickets, DEFAULT_LIMIT, MAX_LIMIT,
};

use super::error::ApiError;

const DEFAULT_PAGE: i64 = 1;

/// Raw pagination query parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    /// Picks `page` and `limit` out of decoded query pairs, first occurrence wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut params, (key, value)| {
                match key.as_str() {
                    "page" if params.page.is_none() => params.page = Some(value),
                    "limit" if params.limit.is_none() => params.limit = Some(value),
                    _ => {}
                }
                params
            })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PageParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request("Invalid query string", rejection.body_text()))?;

        Ok(Self::from_pairs(pairs))
    }
}

/// Reads the leading integer of `raw`, or `default` when there is none or it is zero.
pub(crate) fn parse_lenient(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };

    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    let value = unsigned[..end]
        .bytes()
        .fold(0_i64, |acc, digit| acc.saturating_mul(10).saturating_add(i64::from(digit - b'0')));

    match (end, value) {
        (0, _) | (_, 0) => default,
        (_, value) if negative => -value,
        (_, value) => value,
    }
}

fn check_page(page: i64) -> Result<i64, CatalogError> {
    if page < 1 {
        return Err(CatalogError::invalid_page());
    }

    Ok(page)
}

fn check_limit(limit: i64) -> Result<i64, CatalogError> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(CatalogError::invalid_limit());
    }

    Ok(limit)
}

/// `GET /`
pub async fn list_tickets(
    State(catalog): State<TicketCatalog>,
    params: PageParams,
) -> Result<Json<PaginatedEventTickets>, ApiError> {
    let page = check_page(parse_lenient(params.page.as_deref(), DEFAULT_PAGE))?;
    let limit = check_limit(parse_lenient(params.limit.as_deref(), DEFAULT_LIMIT))?;

    Ok(Json(catalog.list(page, limit).await?))
}

/// `GET /category/:category`
///
/// Also mounted at `/category/` so an empty segment gets the same 400 as a blank one.
pub async fn list_by_category(
    State(catalog): State<TicketCatalog>,
    category: Option<Path<String>>,
    params: PageParams,
) -> Result<Json<PaginatedEventTickets>, ApiError> {
    let category = match category {
        Some(Path(category)) if !category.trim().is_empty() => category,
        _ => return Err(CatalogError::invalid_category().into()),
    };
    let page = check_page(parse_lenient(params.page.as_deref(), DEFAULT_PAGE))?;

    Ok(Json(catalog.list_by_category(&category, page, DEFAULT_LIMIT).await?))
}

/// `GET /trending`
pub async fn list_trending(
    State(catalog): State<TicketCatalog>,
) -> Result<Json<TrendingEventTickets>, ApiError> {
    Ok(Json(catalog.trending().await?))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
