use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{PageParams, Pagination, validate_title};
use crate::entity::category;
use crate::error::AppError;
use crate::utils::slug::slugify;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Web Development")]
    pub title: String,
}

pub fn validate_create_category(payload: &CreateCategoryRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if slugify(&payload.title).is_empty() {
        return Err(AppError::field(
            "title",
            "Title must contain at least one letter or digit",
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
}

impl CategoryListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    #[schema(example = "Web Development")]
    pub title: String,
    #[schema(example = "web-development")]
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            slug: m.slug,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryListResponse {
    pub data: Vec<CategoryResponse>,
    pub pagination: Pagination,
}
