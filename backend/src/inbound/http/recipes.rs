//! Recipe HTTP handlers.
//!
//! ```text
//! GET  /?q=choc&sort=most_upvotes&page=2
//! GET  /recipe/{id}
//! POST /recipe/create        {"title":"...","description":"...",...}
//! POST /recipe/{id}/update   {"title":"...","description":"...",...}
//! POST /recipe/{id}/delete
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateRecipeRequest, DeleteRecipeRequest, UpdateRecipeRequest};
use crate::domain::{
    Error, RecipeDetail, RecipeInput, RecipeListQuery, RecipePage, RecipeSummary, VotePolarity,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_recipe_id;

/// Query parameters accepted by the list page.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive phrase matched against title or description.
    pub q: Option<String>,
    /// `newest` (default), `oldest`, `most_upvotes` or `most_downvotes`.
    pub sort: Option<String>,
    /// One-based page number; invalid values select page one.
    pub page: Option<String>,
}

/// Create and update body.
///
/// Missing fields deserialise as blank and are reported by validation, so a
/// client sees every failing field at once.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields, default)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<String>,
}

impl From<RecipeForm> for RecipeInput {
    fn from(form: RecipeForm) -> Self {
        Self {
            title: form.title,
            description: form.description,
            ingredients: form.ingredients,
            instructions: form.instructions,
            image: form.image,
        }
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// One recipe on a list page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub author_id: String,
    pub created_at: String,
    pub upvotes: u64,
    pub downvotes: u64,
}

impl From<&RecipeSummary> for RecipeSummaryResponse {
    fn from(value: &RecipeSummary) -> Self {
        let recipe = &value.recipe;
        let content = recipe.content();
        Self {
            id: recipe.id().to_string(),
            title: content.title().to_owned(),
            description: content.description().to_owned(),
            image: content.image().map(str::to_owned),
            author_id: recipe.author().to_string(),
            created_at: recipe.created_at().to_rfc3339(),
            upvotes: value.tally.upvotes,
            downvotes: value.tally.downvotes,
        }
    }
}

/// List page payload echoing the query that produced it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeSummaryResponse>,
    pub q: Option<String>,
    pub sort: String,
    pub pagination: PaginationResponse,
}

impl From<RecipePage> for RecipeListResponse {
    fn from(page: RecipePage) -> Self {
        let window = page.window();
        let pagination = PaginationResponse {
            page: window.page(),
            total_pages: window.total_pages(),
            total_items: window.total_items(),
            page_size: window.page_size(),
            has_next: window.has_next(),
            has_previous: window.has_previous(),
        };
        Self {
            recipes: page.items().iter().map(RecipeSummaryResponse::from).collect(),
            q: page.search().map(str::to_owned),
            sort: page.sort().as_str().to_owned(),
            pagination,
        }
    }
}

/// Full recipe as seen by a particular caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<String>,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub upvotes: u64,
    pub downvotes: u64,
    /// The caller's vote, `null` when they have not voted or are anonymous.
    pub my_vote: Option<VotePolarity>,
    pub is_author: bool,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(value: RecipeDetail) -> Self {
        let RecipeDetail {
            summary: RecipeSummary { recipe, tally },
            my_vote,
            is_author,
        } = value;
        let content = recipe.content();
        Self {
            id: recipe.id().to_string(),
            title: content.title().to_owned(),
            description: content.description().to_owned(),
            ingredients: content.ingredients().to_owned(),
            instructions: content.instructions().to_owned(),
            image: content.image().map(str::to_owned),
            author_id: recipe.author().to_string(),
            created_at: recipe.created_at().to_rfc3339(),
            updated_at: recipe.updated_at().to_rfc3339(),
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            my_vote: my_vote.polarity(),
            is_author,
        }
    }
}

/// List recipes with optional search, sorting and pagination.
#[utoipa::path(
    get,
    path = "/",
    params(ListParams),
    responses(
        (status = 200, description = "One page of recipes", body = RecipeListResponse),
        (status = 400, description = "Unknown sort key", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    params: web::Query<ListParams>,
) -> ApiResult<web::Json<RecipeListResponse>> {
    let ListParams { q, sort, page } = params.into_inner();
    let query = RecipeListQuery::from_raw(q.as_deref(), sort.as_deref(), page.as_deref())?;
    let page = state.recipes_query.list(query).await?;
    Ok(web::Json(page.into()))
}

/// Show one recipe, including the caller's vote when signed in.
#[utoipa::path(
    get,
    path = "/recipe/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetailResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "No such recipe", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipe/{id}")]
pub async fn recipe_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecipeDetailResponse>> {
    let recipe_id = parse_recipe_id(&path)?;
    let viewer = session.user_id()?;
    let detail = state.recipes_query.detail(recipe_id, viewer).await?;
    Ok(web::Json(detail.into()))
}

/// Create a recipe authored by the caller.
#[utoipa::path(
    post,
    path = "/recipe/create",
    request_body = RecipeForm,
    responses(
        (
            status = 201,
            description = "Recipe created",
            body = RecipeDetailResponse,
            headers(("Location" = String, description = "Path of the new recipe"))
        ),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipe/create")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeForm>,
) -> ApiResult<HttpResponse> {
    let detail = state
        .recipes
        .create(CreateRecipeRequest {
            user: session.user_id()?,
            input: payload.into_inner().into(),
        })
        .await?;
    let body = RecipeDetailResponse::from(detail);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/recipe/{}", body.id)))
        .json(body))
}

/// Replace a recipe's content. Only the author may do this.
#[utoipa::path(
    post,
    path = "/recipe/{id}/update",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipeForm,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetailResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such recipe", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[post("/recipe/{id}/update")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RecipeForm>,
) -> ApiResult<web::Json<RecipeDetailResponse>> {
    let recipe_id = parse_recipe_id(&path)?;
    let detail = state
        .recipes
        .update(UpdateRecipeRequest {
            recipe_id,
            user: session.user_id()?,
            input: payload.into_inner().into(),
        })
        .await?;
    Ok(web::Json(detail.into()))
}

/// Delete a recipe and its votes, then send the caller back to the list.
#[utoipa::path(
    post,
    path = "/recipe/{id}/delete",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (
            status = 303,
            description = "Recipe deleted",
            headers(("Location" = String, description = "Always `/`"))
        ),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such recipe", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[post("/recipe/{id}/delete")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let recipe_id = parse_recipe_id(&path)?;
    state
        .recipes
        .delete(DeleteRecipeRequest {
            recipe_id,
            user: session.user_id()?,
        })
        .await?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish())
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
