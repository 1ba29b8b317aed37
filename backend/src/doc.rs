//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every handler and response schema. Swagger UI serves it
//! in debug builds and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, VotePolarity, VoteTally};
use crate::inbound::http::recipes::{
    PaginationResponse, RecipeDetailResponse, RecipeForm, RecipeListResponse,
    RecipeSummaryResponse,
};
use crate::inbound::http::users::{LoginRequest, LoginResponse};

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the recipe site.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipes backend API",
        description = "Share recipes, search them and vote on them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::recipe_detail,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::votes::upvote,
        crate::inbound::http::votes::downvote,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        VoteTally,
        VotePolarity,
        RecipeForm,
        RecipeListResponse,
        RecipeSummaryResponse,
        RecipeDetailResponse,
        PaginationResponse,
        LoginRequest,
        LoginResponse,
    )),
    tags(
        (name = "recipes", description = "Create, browse and edit recipes"),
        (name = "votes", description = "Up- and downvotes"),
        (name = "users", description = "Session login and logout"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
