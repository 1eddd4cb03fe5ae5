//! List query parameters
//!
//! Pure value types describing which page of a collection to fetch:
//! pagination, an ordered list of sort columns and per-column filters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort direction of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order: {}. Use asc or desc", other)),
        }
    }
}

/// One column of the sort order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortSpec {
    pub column: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Desc,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.order)
    }
}

/// Parses `column`, `column:asc`, `column:desc` or `-column`
impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (column, order) = match s.split_once(':') {
            Some((column, order)) => (column, order.parse()?),
            None => match s.strip_prefix('-') {
                Some(column) => (column, SortOrder::Desc),
                None => (s, SortOrder::Asc),
            },
        };

        if column.is_empty() {
            return Err(format!("Invalid sort spec: {:?}", s));
        }
        Ok(Self {
            column: column.to_string(),
            order,
        })
    }
}

impl TryFrom<String> for SortSpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortSpec> for String {
    fn from(spec: SortSpec) -> Self {
        spec.to_string()
    }
}

/// Page number (1-based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything needed to request one page of a collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub pagination: Pagination,
    pub sort: Vec<SortSpec>,
    /// Column -> filter text; never holds empty values
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }

    /// Builder method: set the sort order
    pub fn sorted_by(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// Builder method: add a filter
    pub fn filter(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_filter(column, text);
        self
    }

    /// Upsert a filter, or remove it when `text` is empty
    pub fn set_filter(&mut self, column: impl Into<String>, text: impl Into<String>) {
        let column = column.into();
        let text = text.into();
        if text.is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters.insert(column, text);
        }
    }

    /// Encode as URL query pairs
    ///
    /// `page` and `limit` first, then one `sort=column:ORDER` per sort spec
    /// in order, then one `filter[column]=text` per filter.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.pagination.page.to_string()),
            ("limit".to_string(), self.pagination.limit.to_string()),
        ];
        pairs.extend(self.sort.iter().map(|s| ("sort".to_string(), s.to_string())));
        pairs.extend(
            self.filters
                .iter()
                .filter(|(_, text)| !text.is_empty())
                .map(|(column, text)| (format!("filter[{}]", column), text.clone())),
        );
        pairs
    }
}
