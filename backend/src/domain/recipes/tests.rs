//! Tests for recipe content validation and the recipe aggregate.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

#[fixture]
fn valid_input() -> RecipeInput {
    RecipeInput {
        title: "  Chocolate Cake  ".to_owned(),
        description: "Rich and dark".to_owned(),
        ingredients: "Cocoa\nFlour\nSugar".to_owned(),
        instructions: "Mix.\nBake for 30 minutes.".to_owned(),
        image: Some("  https://img.example/cake.png ".to_owned()),
    }
}

#[rstest]
fn valid_input_is_normalised(valid_input: RecipeInput) {
    let content = RecipeContent::try_from_input(valid_input).expect("valid input");
    assert_eq!(content.title(), "Chocolate Cake");
    assert_eq!(content.image(), Some("https://img.example/cake.png"));
    assert_eq!(content.ingredients(), "Cocoa\nFlour\nSugar");
}

#[rstest]
#[case(Some(String::new()))]
#[case(Some("   ".to_owned()))]
#[case(None)]
fn blank_image_is_absent(valid_input: RecipeInput, #[case] image: Option<String>) {
    let input = RecipeInput { image, ..valid_input };
    let content = RecipeContent::try_from_input(input).expect("valid input");
    assert_eq!(content.image(), None);
}

#[rstest]
fn title_at_limit_is_accepted(valid_input: RecipeInput) {
    let input = RecipeInput {
        title: "é".repeat(TITLE_MAX_CHARS),
        ..valid_input
    };
    assert!(RecipeContent::try_from_input(input).is_ok());
}

#[rstest]
#[case(RecipeField::Title, TITLE_MAX_CHARS)]
#[case(RecipeField::Description, TEXT_MAX_CHARS)]
#[case(RecipeField::Ingredients, TEXT_MAX_CHARS)]
#[case(RecipeField::Instructions, TEXT_MAX_CHARS)]
#[case(RecipeField::Image, IMAGE_MAX_CHARS)]
fn overlong_fields_are_rejected(
    valid_input: RecipeInput,
    #[case] field: RecipeField,
    #[case] max: usize,
) {
    let long = "x".repeat(max + 1);
    let mut input = valid_input;
    match field {
        RecipeField::Title => input.title = long,
        RecipeField::Description => input.description = long,
        RecipeField::Ingredients => input.ingredients = long,
        RecipeField::Instructions => input.instructions = long,
        RecipeField::Image => input.image = Some(long),
    }
    let err = RecipeContent::try_from_input(input).expect_err("overlong field");
    assert_eq!(err.problem(field), Some(FieldProblem::TooLong { max }));
    assert_eq!(err.problems().len(), 1);
}

#[given("an empty recipe form")]
fn an_empty_recipe_form() -> RecipeInput {
    RecipeInput::default()
}

#[when("the form is submitted")]
fn the_form_is_submitted(input: RecipeInput) -> Error {
    RecipeContent::try_from_input(input)
        .expect_err("empty form fails")
        .into()
}

#[then("every required field is reported")]
fn every_required_field_is_reported(error: Error) {
    assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    let details = error.details().expect("field errors attached");
    let fields = details
        .get("fieldErrors")
        .and_then(Value::as_object)
        .expect("fieldErrors object");
    let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec!["description", "ingredients", "instructions", "title"]
    );
    assert_eq!(
        fields.get("title").and_then(Value::as_str),
        Some("this field is required")
    );
}

#[rstest]
fn empty_form_reports_all_fields() {
    let input = an_empty_recipe_form();
    let error = the_form_is_submitted(input);
    every_required_field_is_reported(error);
}

#[rstest]
fn revise_keeps_author_and_stamps_update(valid_input: RecipeInput) {
    let created = Utc
        .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    let author = UserId::random();
    let content = RecipeContent::try_from_input(valid_input.clone()).expect("valid");
    let mut recipe = Recipe::new(RecipeId::random(), author, content, created, created);

    let revised = RecipeContent::try_from_input(RecipeInput {
        title: "Vanilla Cake".to_owned(),
        ..valid_input
    })
    .expect("valid");
    recipe.revise(revised, created + Duration::hours(1));

    assert_eq!(recipe.author(), &author);
    assert_eq!(recipe.content().title(), "Vanilla Cake");
    assert_eq!(recipe.updated_at(), created + Duration::hours(1));
}

#[rstest]
fn update_never_precedes_creation(valid_input: RecipeInput) {
    let created = Utc
        .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    let content = RecipeContent::try_from_input(valid_input).expect("valid");
    let recipe = Recipe::new(
        RecipeId::random(),
        UserId::random(),
        content,
        created,
        created - Duration::days(1),
    );
    assert_eq!(recipe.updated_at(), created);
}

#[rstest]
fn recipe_ids_parse_and_display() {
    let raw = "6f1b2c0e-4a53-4a4e-9d8e-0d3a8c0b1f2a";
    let id: RecipeId = raw.parse().expect("valid uuid");
    assert_eq!(id.to_string(), raw);
    assert!("cake".parse::<RecipeId>().is_err());
}
