use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Meta {
    pub total: Option<i64>,
    pub per_page: Option<i64>,
    pub current_page: Option<i64>,
    pub last_page: Option<i64>,
    pub next_page_url: Option<String>,
    pub prev_page_url: Option<String>,
}

impl Meta {
    /// Pagination metadata for `path`; page links carry only the page number.
    pub fn paginate(path: &str, page: i64, per_page: i64, total: i64) -> Self {
        let last_page = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        let next_page_url = (page < last_page).then(|| format!("{path}?page={}", page + 1));
        let prev_page_url = (page > 1).then(|| format!("{path}?page={}", page - 1));
        Self {
            total: Some(total),
            per_page: Some(per_page),
            current_page: Some(page),
            last_page: Some(last_page),
            next_page_url,
            prev_page_url,
        }
    }

    pub fn empty() -> Self {
        Self {
            total: None,
            per_page: None,
            current_page: None,
            last_page: None,
            next_page_url: None,
            prev_page_url: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
