//! Tests for the recipe service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use uuid::Uuid;

use super::service::RecipeService;
use super::{
    Recipe, RecipeContent, RecipeId, RecipeInput, RecipeListQuery, RecipePage, RecipeSummary,
    VotePolarity, VoteState, VoteTally,
};
use crate::domain::ports::{
    CastVoteRequest, CreateRecipeRequest, DeleteRecipeRequest, MockRecipeRepository,
    RecipeCommand, RecipeQuery, RecipeRepositoryError, UpdateRecipeRequest,
};
use crate::domain::{ErrorCode, UserId};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn make_service(repo: MockRecipeRepository) -> RecipeService<MockRecipeRepository> {
    RecipeService::new(
        Arc::new(repo),
        Arc::new(FixtureClock {
            utc_now: fixture_timestamp(),
        }),
    )
}

#[fixture]
fn author() -> UserId {
    UserId::from_uuid(Uuid::from_u128(0xa))
}

#[fixture]
fn stranger() -> UserId {
    UserId::from_uuid(Uuid::from_u128(0xb))
}

#[fixture]
fn input() -> RecipeInput {
    RecipeInput {
        title: "Shakshuka".to_owned(),
        description: "Eggs poached in spiced tomato".to_owned(),
        ingredients: "Eggs, tomatoes, cumin".to_owned(),
        instructions: "Simmer the sauce, crack in the eggs".to_owned(),
        image: None,
    }
}

fn stored_summary(author: UserId, tally: VoteTally) -> RecipeSummary {
    let content = RecipeContent::try_from_input(input()).expect("valid content");
    let created = fixture_timestamp() - chrono::Duration::days(1);
    let recipe = Recipe::new(
        RecipeId::from_uuid(Uuid::from_u128(7)),
        author,
        content,
        created,
        created,
    );
    RecipeSummary::new(recipe, tally)
}

fn repo_with_recipe(summary: RecipeSummary) -> MockRecipeRepository {
    let mut repo = MockRecipeRepository::new();
    repo.expect_find()
        .returning(move |_| Ok(Some(summary.clone())));
    repo
}

#[rstest]
#[tokio::test]
async fn create_requires_login(input: RecipeInput) {
    let mut repo = MockRecipeRepository::new();
    repo.expect_create().never();
    let service = make_service(repo);

    let error = service
        .create(CreateRecipeRequest { user: None, input })
        .await
        .expect_err("anonymous create rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn create_stamps_author_and_time(author: UserId, input: RecipeInput) {
    let mut repo = MockRecipeRepository::new();
    repo.expect_create()
        .times(1)
        .withf(move |who, _, now| *who == author && *now == fixture_timestamp())
        .returning(|who, content, now| {
            Ok(Recipe::new(RecipeId::random(), *who, content.clone(), now, now))
        });
    let service = make_service(repo);

    let detail = service
        .create(CreateRecipeRequest {
            user: Some(author),
            input,
        })
        .await
        .expect("create succeeds");

    assert_eq!(detail.summary.recipe.author(), &author);
    assert_eq!(detail.summary.recipe.created_at(), fixture_timestamp());
    assert_eq!(detail.summary.tally, VoteTally::default());
    assert!(detail.is_author);
    assert_eq!(detail.my_vote, VoteState::None);
}

#[rstest]
#[tokio::test]
async fn create_reports_field_errors(author: UserId) {
    let mut repo = MockRecipeRepository::new();
    repo.expect_create().never();
    let service = make_service(repo);

    let error = service
        .create(CreateRecipeRequest {
            user: Some(author),
            input: RecipeInput {
                title: "x".repeat(101),
                ..input()
            },
        })
        .await
        .expect_err("invalid title");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("field errors");
    assert!(details["fieldErrors"].get("title").is_some());
}

#[given("a recipe written by its author")]
fn a_recipe_written_by_its_author() -> RecipeSummary {
    stored_summary(author(), VoteTally::default())
}

#[when("another user submits an edit")]
fn another_user_submits_an_edit(summary: RecipeSummary) -> UpdateRecipeRequest {
    UpdateRecipeRequest {
        recipe_id: summary.recipe.id(),
        user: Some(stranger()),
        input: input(),
    }
}

#[then("the edit is forbidden")]
fn the_edit_is_forbidden(code: ErrorCode) {
    assert_eq!(code, ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn non_author_cannot_update() {
    let summary = a_recipe_written_by_its_author();
    let request = another_user_submits_an_edit(summary.clone());
    let mut repo = repo_with_recipe(summary);
    repo.expect_update().never();
    let service = make_service(repo);

    let error = service
        .update(request)
        .await
        .expect_err("non-author update rejected");

    the_edit_is_forbidden(error.code());
}

#[rstest]
#[tokio::test]
async fn author_update_keeps_votes_visible(author: UserId) {
    let summary = stored_summary(author, VoteTally::new(2, 1));
    let mut repo = repo_with_recipe(summary.clone());
    repo.expect_update()
        .times(1)
        .returning(move |_, content, now| {
            let mut recipe = summary.recipe.clone();
            recipe.revise(content.clone(), now);
            Ok(RecipeSummary::new(recipe, summary.tally))
        });
    repo.expect_vote_state()
        .returning(|_, _| Ok(VoteState::Up));
    let service = make_service(repo);

    let detail = service
        .update(UpdateRecipeRequest {
            recipe_id: RecipeId::from_uuid(Uuid::from_u128(7)),
            user: Some(author),
            input: RecipeInput {
                title: "Green Shakshuka".to_owned(),
                ..input()
            },
        })
        .await
        .expect("author update succeeds");

    assert_eq!(detail.summary.recipe.content().title(), "Green Shakshuka");
    assert_eq!(detail.summary.recipe.updated_at(), fixture_timestamp());
    assert_eq!(detail.summary.tally, VoteTally::new(2, 1));
    assert_eq!(detail.my_vote, VoteState::Up);
}

#[rstest]
#[tokio::test]
async fn update_of_missing_recipe_is_not_found(author: UserId) {
    let mut repo = MockRecipeRepository::new();
    repo.expect_find().returning(|_| Ok(None));
    let service = make_service(repo);

    let error = service
        .update(UpdateRecipeRequest {
            recipe_id: RecipeId::random(),
            user: Some(author),
            input: input(),
        })
        .await
        .expect_err("missing recipe");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(None, ErrorCode::Unauthorized)]
#[case(Some(stranger()), ErrorCode::Forbidden)]
#[tokio::test]
async fn delete_is_guarded(
    author: UserId,
    #[case] caller: Option<UserId>,
    #[case] expected: ErrorCode,
) {
    let mut repo = repo_with_recipe(stored_summary(author, VoteTally::default()));
    repo.expect_delete().never();
    let service = make_service(repo);

    let error = service
        .delete(DeleteRecipeRequest {
            recipe_id: RecipeId::from_uuid(Uuid::from_u128(7)),
            user: caller,
        })
        .await
        .expect_err("guarded delete");

    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn author_can_delete(author: UserId) {
    let mut repo = repo_with_recipe(stored_summary(author, VoteTally::default()));
    repo.expect_delete().times(1).returning(|_| Ok(true));
    let service = make_service(repo);

    service
        .delete(DeleteRecipeRequest {
            recipe_id: RecipeId::from_uuid(Uuid::from_u128(7)),
            user: Some(author),
        })
        .await
        .expect("author delete succeeds");
}

#[rstest]
#[tokio::test]
async fn delete_race_reports_not_found(author: UserId) {
    let mut repo = repo_with_recipe(stored_summary(author, VoteTally::default()));
    repo.expect_delete().times(1).returning(|_| Ok(false));
    let service = make_service(repo);

    let error = service
        .delete(DeleteRecipeRequest {
            recipe_id: RecipeId::from_uuid(Uuid::from_u128(7)),
            user: Some(author),
        })
        .await
        .expect_err("already gone");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn anonymous_votes_are_rejected() {
    let mut repo = MockRecipeRepository::new();
    repo.expect_toggle_vote().never();
    let service = make_service(repo);

    let error = service
        .cast_vote(CastVoteRequest {
            recipe_id: RecipeId::random(),
            user: None,
            polarity: VotePolarity::Up,
        })
        .await
        .expect_err("login required");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn conflicting_votes_are_retried(stranger: UserId) {
    let mut repo = MockRecipeRepository::new();
    let mut sequence = mockall::Sequence::new();
    repo.expect_toggle_vote()
        .times(2)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Err(RecipeRepositoryError::conflict("serialization failure")));
    repo.expect_toggle_vote()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Ok(VoteTally::new(1, 0)));
    let service = make_service(repo);

    let tally = service
        .cast_vote(CastVoteRequest {
            recipe_id: RecipeId::random(),
            user: Some(stranger),
            polarity: VotePolarity::Up,
        })
        .await
        .expect("third attempt succeeds");

    assert_eq!(tally, VoteTally::new(1, 0));
}

#[rstest]
#[tokio::test]
async fn exhausted_retries_report_service_unavailable(stranger: UserId) {
    let mut repo = MockRecipeRepository::new();
    repo.expect_toggle_vote()
        .times(2)
        .returning(|_, _, _| Err(RecipeRepositoryError::conflict("deadlock detected")));
    let service = make_service(repo).with_vote_retry_attempts(2);

    let error = service
        .cast_vote(CastVoteRequest {
            recipe_id: RecipeId::random(),
            user: Some(stranger),
            polarity: VotePolarity::Down,
        })
        .await
        .expect_err("retries exhausted");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(error.message(), "vote could not be recorded; please retry");
}

#[rstest]
#[case(RecipeRepositoryError::not_found("7"), ErrorCode::NotFound)]
#[case(RecipeRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(RecipeRepositoryError::query("syntax error"), ErrorCode::InternalError)]
#[tokio::test]
async fn vote_failures_map_to_error_codes(
    stranger: UserId,
    #[case] failure: RecipeRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockRecipeRepository::new();
    repo.expect_toggle_vote()
        .times(1)
        .return_once(move |_, _, _| Err(failure));
    let service = make_service(repo);

    let error = service
        .cast_vote(CastVoteRequest {
            recipe_id: RecipeId::random(),
            user: Some(stranger),
            polarity: VotePolarity::Up,
        })
        .await
        .expect_err("failure surfaces");

    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn detail_shows_viewer_vote(author: UserId, stranger: UserId) {
    let mut repo = repo_with_recipe(stored_summary(author, VoteTally::new(0, 1)));
    repo.expect_vote_state()
        .withf(move |_, user| *user == stranger)
        .returning(|_, _| Ok(VoteState::Down));
    let service = make_service(repo);

    let detail = service
        .detail(RecipeId::from_uuid(Uuid::from_u128(7)), Some(stranger))
        .await
        .expect("detail loads");

    assert_eq!(detail.my_vote, VoteState::Down);
    assert!(!detail.is_author);
}

#[rstest]
#[tokio::test]
async fn anonymous_detail_skips_vote_lookup(author: UserId) {
    let mut repo = repo_with_recipe(stored_summary(author, VoteTally::default()));
    repo.expect_vote_state().never();
    let service = make_service(repo);

    let detail = service
        .detail(RecipeId::from_uuid(Uuid::from_u128(7)), None)
        .await
        .expect("detail loads");

    assert_eq!(detail.my_vote, VoteState::None);
    assert!(!detail.is_author);
}

#[rstest]
#[tokio::test]
async fn list_delegates_to_repository(author: UserId) {
    let summary = stored_summary(author, VoteTally::default());
    let mut repo = MockRecipeRepository::new();
    repo.expect_list().times(1).returning(move |query| {
        Ok(RecipePage::from_summaries(vec![summary.clone()], query))
    });
    let service = make_service(repo);

    let query = RecipeListQuery::from_raw(Some("shak"), None, None).expect("valid query");
    let page = service.list(query).await.expect("list succeeds");

    assert_eq!(page.items().len(), 1);
    assert_eq!(page.search(), Some("shak"));
}
