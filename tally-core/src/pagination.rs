use serde::{Deserialize, Serialize};
use crate::{OrderError, OrderResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 { DEFAULT_PAGE }
fn default_limit() -> u32 { DEFAULT_LIMIT }

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl PaginationParams {
    pub fn new(page: u32, limit: u32) -> OrderResult<Self> {
        let params = Self { page, limit };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> OrderResult<()> {
        if self.page < 1 {
            return Err(OrderError::InvalidInput("page must be at least 1".to_string()));
        }
        if self.limit < 1 {
            return Err(OrderError::InvalidInput("limit must be at least 1".to_string()));
        }
        if self.limit > MAX_LIMIT {
            return Err(OrderError::InvalidInput(format!("limit must be at most {}", MAX_LIMIT)));
        }
        Ok(())
    }

    /// Rows to skip before the window starts. Validated params always fit in an `i64`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub last_page: u64,
}

impl PageMeta {
    pub fn new(total: u64, params: &PaginationParams) -> Self {
        Self {
            total,
            page: params.page,
            last_page: total.div_ceil(params.limit as u64),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
