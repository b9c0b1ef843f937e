//! Listing queries: untrusted request parameters in, a bounded and ordered page out.

use crate::error::{AppError, QueryError};
use crate::model::{Entry, EntryColumn};
use crate::search::SearchTerms;
use crate::store::{EntryFilter, EntryStore};
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            d if d.eq_ignore_ascii_case("asc") => Some(SortDirection::Asc),
            d if d.eq_ignore_ascii_case("desc") => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Page size bounds applied to every listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

/// Query-string parameters as received. Everything is optional text.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub order_by: Option<String>,
    pub direction: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryOrder {
    pub column: EntryColumn,
    pub direction: SortDirection,
}

/// LIMIT/OFFSET pair for one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u64,
}

/// Validated listing request.
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub order: EntryOrder,
    pub page: u32,
    pub per_page: u32,
    pub search: Option<SearchTerms>,
}

impl ListQuery {
    pub fn from_params(params: &ListParams, limits: &PageLimits) -> Result<Self, QueryError> {
        let column = match params.order_by.as_deref().map(str::trim) {
            None | Some("") => EntryColumn::Id,
            Some(s) => EntryColumn::parse(s).ok_or_else(|| QueryError::UnknownColumn(s.to_string()))?,
        };
        let direction = match params.direction.as_deref().map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(s) => SortDirection::parse(s).ok_or_else(|| QueryError::InvalidDirection(s.to_string()))?,
        };
        let page = match coerce_int(params.page.as_deref()) {
            Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => 1,
        };
        let per_page = match coerce_int(params.per_page.as_deref()) {
            None => limits.default_per_page,
            Some(n) if n < 0 => 0,
            Some(n) if n > i64::from(limits.max_per_page) => {
                return Err(QueryError::PerPageTooLarge {
                    requested: n,
                    max: limits.max_per_page,
                })
            }
            Some(n) => n as u32,
        };
        let search = params.search.as_deref().and_then(SearchTerms::parse);
        Ok(ListQuery {
            order: EntryOrder { column, direction },
            page,
            per_page,
            search,
        })
    }

    /// `None` when the page cannot hold any rows (`per_page == 0`).
    pub fn window(&self) -> Option<Window> {
        if self.per_page == 0 {
            return None;
        }
        Some(Window {
            limit: self.per_page,
            offset: u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page),
        })
    }

    pub fn filter(&self) -> EntryFilter {
        EntryFilter {
            search: self.search.clone(),
        }
    }
}

/// Integer-looking input that does not fit `i64` saturates; anything else non-numeric is `None`.
fn coerce_int(raw: Option<&str>) -> Option<i64> {
    let s = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match s.parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// `ceil(total / per_page)`, or 0 when `per_page` is 0.
pub fn last_page(total: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page))
}

/// Listing envelope returned by `GET /entries`.
#[derive(Clone, Debug, Serialize)]
pub struct Listing {
    pub result: Vec<Entry>,
    pub direction: SortDirection,
    pub order_by: EntryColumn,
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub total: u64,
    pub last_page: u64,
}

/// Filter, order, count and slice. Pages past the end come back empty.
pub async fn compose(store: &dyn EntryStore, query: &ListQuery) -> Result<Listing, AppError> {
    let filter = query.filter();
    let total = store.count(&filter).await?;
    let result = match query.window() {
        Some(window) if window.offset < total => store.fetch(&filter, query.order, Some(window)).await?,
        _ => Vec::new(),
    };
    Ok(Listing {
        result,
        direction: query.order.direction,
        order_by: query.order.column,
        page: query.page,
        per_page: query.per_page,
        search: query.search.as_ref().map(|s| s.raw().to_string()),
        total,
        last_page: last_page(total, query.per_page),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut p = ListParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "order_by" => p.order_by = v,
                "direction" => p.direction = v,
                "page" => p.page = v,
                "per_page" => p.per_page = v,
                "search" => p.search = v,
                _ => unreachable!(),
            }
        }
        p
    }

    fn parse(pairs: &[(&str, &str)]) -> Result<ListQuery, QueryError> {
        ListQuery::from_params(&params(pairs), &PageLimits::default())
    }

    #[test]
    fn defaults() {
        let q = parse(&[]).unwrap();
        assert_eq!(q.order, EntryOrder { column: EntryColumn::Id, direction: SortDirection::Asc });
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, 25);
        assert!(q.search.is_none());
        assert_eq!(q.window(), Some(Window { limit: 25, offset: 0 }));
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(parse(&[("direction", "desc")]).unwrap().order.direction, SortDirection::Desc);
        assert_eq!(parse(&[("direction", "Asc")]).unwrap().order.direction, SortDirection::Asc);
        assert_eq!(
            parse(&[("direction", "sideways")]),
            Err(QueryError::InvalidDirection("sideways".into()))
        );
    }

    #[test]
    fn order_by_outside_allow_list_is_rejected() {
        assert_eq!(parse(&[("order_by", "date")]).unwrap().order.column, EntryColumn::Date);
        assert_eq!(
            parse(&[("order_by", "id; DELETE FROM entries")]),
            Err(QueryError::UnknownColumn("id; DELETE FROM entries".into()))
        );
    }

    #[test]
    fn page_clamps_to_one() {
        assert_eq!(parse(&[("page", "0")]).unwrap().page, 1);
        assert_eq!(parse(&[("page", "-4")]).unwrap().page, 1);
        assert_eq!(parse(&[("page", "abc")]).unwrap().page, 1);
        assert_eq!(parse(&[("page", "3")]).unwrap().page, 3);
    }

    #[test]
    fn overflowing_integers_saturate() {
        assert_eq!(parse(&[("page", "99999999999999999999")]).unwrap().page, u32::MAX);
        assert_eq!(parse(&[("page", "-99999999999999999999")]).unwrap().page, 1);
        assert_eq!(parse(&[("per_page", "-99999999999999999999")]).unwrap().per_page, 0);
        assert_eq!(
            parse(&[("per_page", "99999999999999999999")]),
            Err(QueryError::PerPageTooLarge { requested: i64::MAX, max: 100 })
        );
    }

    #[test]
    fn per_page_is_bounded() {
        assert_eq!(parse(&[("per_page", "10")]).unwrap().per_page, 10);
        assert_eq!(parse(&[("per_page", "junk")]).unwrap().per_page, 25);
        assert_eq!(parse(&[("per_page", "-1")]).unwrap().per_page, 0);
        assert_eq!(
            parse(&[("per_page", "101")]),
            Err(QueryError::PerPageTooLarge { requested: 101, max: 100 })
        );
    }

    #[test]
    fn zero_per_page_has_no_window() {
        let q = parse(&[("per_page", "0")]).unwrap();
        assert_eq!(q.window(), None);
    }

    #[test]
    fn window_offset_follows_page() {
        let q = parse(&[("page", "3"), ("per_page", "10")]).unwrap();
        assert_eq!(q.window(), Some(Window { limit: 10, offset: 20 }));
    }

    #[test]
    fn blank_search_is_absent() {
        assert!(parse(&[("search", "  ")]).unwrap().search.is_none());
        assert_eq!(parse(&[("search", "rent")]).unwrap().search.unwrap().raw(), "rent");
    }

    #[test]
    fn last_page_rounds_up_and_survives_zero() {
        assert_eq!(last_page(3, 2), 2);
        assert_eq!(last_page(4, 2), 2);
        assert_eq!(last_page(0, 25), 0);
        assert_eq!(last_page(10, 0), 0);
    }
}
