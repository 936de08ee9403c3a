//! Category endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::Category, AppState};

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.services.categories.list().await?;
    Ok(Json(categories))
}
