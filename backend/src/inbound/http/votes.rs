//! Vote toggle endpoints.
//!
//! Pressing the same button twice withdraws the vote; pressing the other one
//! switches it. Both endpoints answer with the recipe's counts after the
//! change: `{"upvotes": 1, "downvotes": 0}`.

use actix_web::{post, web};
use tracing::debug;

use crate::domain::ports::CastVoteRequest;
use crate::domain::{Error, VotePolarity, VoteTally};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_recipe_id;

async fn cast(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    polarity: VotePolarity,
) -> ApiResult<web::Json<VoteTally>> {
    let recipe_id = parse_recipe_id(raw_id)?;
    let tally = state
        .recipes
        .cast_vote(CastVoteRequest {
            recipe_id,
            user: session.user_id()?,
            polarity,
        })
        .await?;
    debug!(%recipe_id, %polarity, upvotes = tally.upvotes, downvotes = tally.downvotes, "vote cast");
    Ok(web::Json(tally))
}

/// Toggle the caller's upvote.
#[utoipa::path(
    post,
    path = "/recipe/{id}/upvote/",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Counts after the toggle", body = VoteTally),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such recipe", body = Error),
        (status = 503, description = "Concurrent votes kept conflicting; retry", body = Error)
    ),
    tags = ["votes"],
    operation_id = "upvoteRecipe"
)]
#[post("/recipe/{id}/upvote/")]
pub async fn upvote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<VoteTally>> {
    cast(&state, &session, &path, VotePolarity::Up).await
}

/// Toggle the caller's downvote.
#[utoipa::path(
    post,
    path = "/recipe/{id}/downvote/",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Counts after the toggle", body = VoteTally),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such recipe", body = Error),
        (status = 503, description = "Concurrent votes kept conflicting; retry", body = Error)
    ),
    tags = ["votes"],
    operation_id = "downvoteRecipe"
)]
#[post("/recipe/{id}/downvote/")]
pub async fn downvote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<VoteTally>> {
    cast(&state, &session, &path, VotePolarity::Down).await
}
