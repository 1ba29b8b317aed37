//! Diesel table definitions.
//!
//! Keep these in step with `backend/migrations`; the column types here are
//! what Diesel checks queries against at compile time.

diesel::table! {
    /// Recipes and their authored content.
    recipes (id) {
        id -> Uuid,
        /// Immutable after insert.
        author_id -> Uuid,
        /// At most 100 characters.
        title -> Varchar,
        description -> Text,
        ingredients -> Text,
        instructions -> Text,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per user holding a vote on a recipe.
    ///
    /// Absence of a row means the user has not voted.
    recipe_votes (recipe_id, user_id) {
        recipe_id -> Uuid,
        user_id -> Uuid,
        /// `up` or `down`.
        polarity -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(recipe_votes -> recipes (recipe_id));
diesel::allow_tables_to_appear_in_same_query!(recipes, recipe_votes);
