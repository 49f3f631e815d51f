//! Cursor pagination parameters shared by every paginated query scope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Page request parameters as exchanged with the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Opaque server cursor. Empty means "first page".
    #[serde(default)]
    pub cursor: String,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            cursor: String::new(),
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    pub fn has_cursor(&self) -> bool {
        !self.cursor.is_empty()
    }

    /// Query pairs for a list request. The cursor is omitted on the first page.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("pageSize".to_string(), self.page_size.to_string())];
        if self.has_cursor() {
            pairs.push(("cursor".to_string(), self.cursor.clone()));
        }
        pairs
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let page = Pagination::default();
        assert_eq!(page.page_size, 100);
        assert!(!page.has_cursor());
    }

    #[test]
    fn test_query_pairs_without_cursor() {
        let pairs = Pagination::new(25).query_pairs();
        assert_eq!(pairs, vec![("pageSize".to_string(), "25".to_string())]);
    }

    #[test]
    fn test_query_pairs_with_cursor() {
        let pairs = Pagination::default().with_cursor("abc").query_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("cursor".to_string(), "abc".to_string()));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page, Pagination::default());

        let page: Pagination =
            serde_json::from_str(r#"{"pageSize":10,"cursor":"5eaed"}"#).unwrap();
        assert_eq!(page.page_size, 10);
        assert_eq!(page.cursor, "5eaed");
    }
}
