use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::grid::{FilterSet, PaginationState, SortSpec};

/// How a list endpoint expects its paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListMethod {
    /// Query string on a GET
    Get,
    /// JSON body on a POST
    #[default]
    Post,
}

/// One list call, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub endpoint: String,
    pub method: ListMethod,
    pub pagination: PaginationState,
    pub sort: SortSpec,
    pub search: String,
    pub filters: FilterSet,
}

impl ListRequest {
    pub fn new(endpoint: impl Into<String>, method: ListMethod, pagination: PaginationState) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            pagination,
            sort: SortSpec::default(),
            search: String::new(),
            filters: FilterSet::new(),
        }
    }

    /// POST body: `{ page, size, sortBy, sortDir, search, ...filters }`
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("page".into(), Value::from(self.pagination.page_index));
        body.insert("size".into(), Value::from(self.pagination.page_size));
        body.insert("sortBy".into(), Value::from(self.sort.sort_by.clone()));
        body.insert("sortDir".into(), Value::from(self.sort.sort_dir.as_str()));
        body.insert("search".into(), Value::from(self.search.clone()));
        for (key, value) in self.filters.active() {
            // Paging keys are owned by the grid
            if body.contains_key(key) {
                continue;
            }
            body.insert(key.to_string(), serde_json::to_value(value).unwrap_or(Value::Null));
        }
        Value::Object(body)
    }

    /// GET query pairs; `search` is sent only when set
    pub fn query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.pagination.page_index.to_string()),
            ("size".to_string(), self.pagination.page_size.to_string()),
            ("sortBy".to_string(), self.sort.sort_by.clone()),
            ("sortDir".to_string(), self.sort.sort_dir.as_str().to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        for (key, value) in self.filters.active() {
            if pairs.iter().any(|(k, _)| k == key) {
                continue;
            }
            pairs.push((key.to_string(), value.to_string()));
        }
        pairs
    }
}

/// What a list endpoint returns. Both fields may be absent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagedResult {
    #[serde(rename = "content", default, deserialize_with = "null_as_empty")]
    pub items: Vec<Value>,
    #[serde(rename = "totalElements", default, deserialize_with = "null_as_zero")]
    pub total_count: u64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Create goes to the save endpoint with POST, update to the update endpoint
/// with PUT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    Create,
    Update,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SortDirection;
    use serde_json::json;

    fn request() -> ListRequest {
        let mut req = ListRequest::new("/api/users/getAll/12?type=STUDENT", ListMethod::Post, PaginationState::new(2, 5));
        req.filters = FilterSet::new().with("classId", 3).with("divisionId", "").with("page", 99);
        req
    }

    #[test]
    fn post_body_merges_active_filters() {
        assert_eq!(
            request().body(),
            json!({
                "page": 2,
                "size": 5,
                "sortBy": "id",
                "sortDir": "asc",
                "search": "",
                "classId": 3
            })
        );
    }

    #[test]
    fn get_query_lists_paging_then_filters() {
        let mut req = request();
        req.sort = SortSpec::new("name", SortDirection::Desc);
        req.search = "ram".into();
        assert_eq!(
            req.query(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("size".to_string(), "5".to_string()),
                ("sortBy".to_string(), "name".to_string()),
                ("sortDir".to_string(), "desc".to_string()),
                ("search".to_string(), "ram".to_string()),
                ("classId".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn paged_result_tolerates_missing_and_null_fields() {
        let empty: PagedResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, PagedResult::default());

        let nulls: PagedResult = serde_json::from_value(json!({"content": null, "totalElements": null})).unwrap();
        assert!(nulls.items.is_empty());
        assert_eq!(nulls.total_count, 0);

        let page: PagedResult = serde_json::from_value(json!({
            "content": [{"id": 1}, {"id": 2}],
            "totalElements": 12,
            "pageable": {"pageNumber": 0}
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 12);
    }
}
