use serde::{Deserialize, Serialize};

/// Server-side page position. `page_index` is 0-based and `page_size` is
/// never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: u32,
    pub page_size: u32,
}

impl PaginationState {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    pub fn first(page_size: u32) -> Self {
        Self::new(0, page_size)
    }

    pub fn with_page(self, page_index: u32) -> Self {
        Self { page_index, ..self }
    }

    /// Number of pages needed for `total` rows
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }

    /// 0-based offset of the first row on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub sort_by: String,
    pub sort_dir: SortDirection,
}

impl SortSpec {
    pub fn new(sort_by: impl Into<String>, sort_dir: SortDirection) -> Self {
        Self { sort_by: sort_by.into(), sort_dir }
    }

    /// Parse `"name"`, `"name desc"` or `"name asc"`
    pub fn parse(spec: &str) -> Option<Self> {
        let mut it = spec.split_whitespace();
        let column = it.next()?;
        let sort_dir = match it.next() {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(_) => return None,
            None => SortDirection::Asc,
        };
        Some(Self::new(column, sort_dir))
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new("id", SortDirection::Asc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(PaginationState::new(3, 0).page_size, 1);
    }

    #[test]
    fn page_count_rounds_up() {
        let p = PaginationState::first(5);
        assert_eq!(p.page_count(0), 0);
        assert_eq!(p.page_count(5), 1);
        assert_eq!(p.page_count(11), 3);
        assert_eq!(p.with_page(2).offset(), 10);
    }

    #[test]
    fn sort_spec_parsing() {
        assert_eq!(SortSpec::parse("name desc"), Some(SortSpec::new("name", SortDirection::Desc)));
        assert_eq!(SortSpec::parse("rollno"), Some(SortSpec::new("rollno", SortDirection::Asc)));
        assert_eq!(SortSpec::parse("rollno sideways"), None);
        assert_eq!(SortSpec::parse("  "), None);
    }
}
