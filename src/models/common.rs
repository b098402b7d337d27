use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationQuery {
    /// 1-based page, clamped to at least 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Saturates so a huge `page` yields an empty page instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// `?limit=` for short lists such as upcoming fixtures or the form table.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn limit_or(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, query: &PaginationQuery, total: i64) -> Self {
        let limit = query.limit();
        Self {
            items,
            page: query.page(),
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    /// Slice an already materialized list into the requested page.
    pub fn from_vec(all: Vec<T>, query: &PaginationQuery) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Self::new(items, query, total)
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let query = PaginationQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);

        let query = PaginationQuery { page: Some(0), limit: Some(1000) };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);

        let query = PaginationQuery { page: Some(3), limit: Some(10) };
        assert_eq!(query.offset(), 20);

        let query = PaginationQuery { page: Some(i64::MAX), limit: Some(20) };
        assert_eq!(query.offset(), i64::MAX);

        let query = PaginationQuery { page: Some(i64::MIN), limit: Some(20) };
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }

    #[test]
    fn from_vec_slices_requested_page() {
        let query = PaginationQuery { page: Some(2), limit: Some(3) };
        let page = Paginated::from_vec((1..=8).collect::<Vec<i32>>(), &query);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 8);
        assert_eq!(page.total_pages, 3);

        let query = PaginationQuery { page: Some(5), limit: Some(3) };
        let page = Paginated::from_vec((1..=8).collect::<Vec<i32>>(), &query);
        assert!(page.items.is_empty());

        let query = PaginationQuery { page: Some(i64::MAX), limit: Some(3) };
        let page = Paginated::from_vec((1..=8).collect::<Vec<i32>>(), &query);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 8);
    }
}
