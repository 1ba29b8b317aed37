//! Recipe list queries: free-text search, sorting and pagination.
//!
//! The pipeline always runs in the same order: filter, then sort, then cut
//! one page. Storage adapters may push the work into SQL, but results must
//! match [`RecipePage::from_summaries`], which is the in-memory reference.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pagination::{Page, PageRequest, PageWindow, PaginationError};

use super::RecipeSummary;
use crate::domain::Error;

/// Number of recipes shown per list page.
pub const RECIPES_PAGE_SIZE: u32 = 5;

/// Errors raised while interpreting list query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeQueryError {
    /// The sort key is not one of the supported keys.
    #[error("unknown sort key: {0}")]
    UnknownSort(String),
    /// Pagination parameters could not be built.
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl From<RecipeQueryError> for Error {
    fn from(value: RecipeQueryError) -> Self {
        match value {
            RecipeQueryError::UnknownSort(key) => Error::invalid_request(format!(
                "sort must be one of newest, oldest, most_upvotes, most_downvotes (got {key})"
            )),
            RecipeQueryError::Pagination(err) => Error::internal(err.to_string()),
        }
    }
}

/// Ordering applied to a recipe list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecipeSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Highest upvote count first.
    MostUpvotes,
    /// Highest downvote count first.
    MostDownvotes,
}

impl RecipeSort {
    /// Query-string key for this ordering.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::MostUpvotes => "most_upvotes",
            Self::MostDownvotes => "most_downvotes",
        }
    }

    /// Parse an optional query value; absent or blank selects the default.
    pub fn from_query(raw: Option<&str>) -> Result<Self, RecipeQueryError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(key) => key.parse(),
        }
    }
}

impl fmt::Display for RecipeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeSort {
    type Err = RecipeQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "most_upvotes" => Ok(Self::MostUpvotes),
            "most_downvotes" => Ok(Self::MostDownvotes),
            other => Err(RecipeQueryError::UnknownSort(other.to_owned())),
        }
    }
}

/// A non-blank search phrase.
///
/// Matching uses the trimmed phrase; the value exactly as the caller sent it
/// is kept for echoing back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    phrase: String,
    folded: String,
}

impl SearchTerm {
    /// Build a term from an optional query value; blank input yields `None`.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::SearchTerm;
    ///
    /// assert!(SearchTerm::parse(Some("   ")).is_none());
    /// let term = SearchTerm::parse(Some(" Choc ")).expect("non-blank");
    /// assert_eq!(term.as_str(), "Choc");
    /// assert_eq!(term.echo(), " Choc ");
    /// ```
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let value = raw?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            raw: value.to_owned(),
            phrase: trimmed.to_owned(),
            folded: trimmed.to_lowercase(),
        })
    }

    /// The trimmed phrase used for matching.
    pub fn as_str(&self) -> &str {
        self.phrase.as_str()
    }

    /// The query value exactly as received.
    pub fn echo(&self) -> &str {
        self.raw.as_str()
    }

/// Whether `text` contains the phrase, ignoring case.
    pub fn found_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.folded)
    }
}

/// Parameters for one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeListQuery {
    search: Option<SearchTerm>,
    sort: RecipeSort,
    page: PageRequest,
}

impl RecipeListQuery {
    /// Build a query from typed parts.
    pub fn new(search: Option<SearchTerm>, sort: RecipeSort, page: PageRequest) -> Self {
        Self { search, sort, page }
    }

    /// Interpret raw query-string values.
    ///
    /// Blank searches are ignored, unknown sort keys are rejected, and page
    /// numbers that are missing, non-numeric or below one select page one.
    pub fn from_raw(
        q: Option<&str>,
        sort: Option<&str>,
        page: Option<&str>,
    ) -> Result<Self, RecipeQueryError> {
        Ok(Self {
            search: SearchTerm::parse(q),
            sort: RecipeSort::from_query(sort)?,
            page: PageRequest::from_query(page, RECIPES_PAGE_SIZE)?,
        })
    }

    /// Active search phrase.
    pub fn search(&self) -> Option<&SearchTerm> {
        self.search.as_ref()
    }

    /// Requested ordering.
    pub fn sort(&self) -> RecipeSort {
        self.sort
    }

    /// Requested page.
    pub fn page(&self) -> PageRequest {
        self.page
    }
}

/// Whether a recipe passes the search filter.
///
/// The phrase is matched case-insensitively against the title or the
/// description. No filter matches everything.
pub fn matches_search(summary: &RecipeSummary, search: Option<&SearchTerm>) -> bool {
    search.is_none_or(|term| {
        let content = summary.recipe.content();
        term.found_in(content.title()) || term.found_in(content.description())
    })
}

/// Order two summaries under `sort`, breaking ties by recipe id.
pub fn compare_for_sort(a: &RecipeSummary, b: &RecipeSummary, sort: RecipeSort) -> Ordering {
    let primary = match sort {
        RecipeSort::Newest => b.recipe.created_at().cmp(&a.recipe.created_at()),
        RecipeSort::Oldest => a.recipe.created_at().cmp(&b.recipe.created_at()),
        RecipeSort::MostUpvotes => b.tally.upvotes.cmp(&a.tally.upvotes),
        RecipeSort::MostDownvotes => b.tally.downvotes.cmp(&a.tally.downvotes),
    };
    primary.then_with(|| a.recipe.id().cmp(&b.recipe.id()))
}

/// One page of list results with the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipePage {
    page: Page<RecipeSummary>,
    search: Option<String>,
    sort: RecipeSort,
}

impl RecipePage {
    /// Wrap an already cut page of results.
    pub fn new(items: Vec<RecipeSummary>, window: PageWindow, query: &RecipeListQuery) -> Self {
        Self {
            page: Page::new(items, window),
            search: query.search().map(|term| term.echo().to_owned()),
            sort: query.sort(),
        }
    }

    /// Run the whole pipeline over an unfiltered collection.
    pub fn from_summaries(all: Vec<RecipeSummary>, query: &RecipeListQuery) -> Self {
        let mut matching: Vec<RecipeSummary> = all
            .into_iter()
            .filter(|summary| matches_search(summary, query.search()))
            .collect();
        matching.sort_by(|a, b| compare_for_sort(a, b, query.sort()));
        let page = Page::from_items(matching, query.page());
        Self {
            page,
            search: query.search().map(|term| term.echo().to_owned()),
            sort: query.sort(),
        }
    }

    /// Recipes on this page.
    pub fn items(&self) -> &[RecipeSummary] {
        self.page.items()
    }

    /// Resolved pagination window.
    pub fn window(&self) -> &PageWindow {
        self.page.window()
    }

    /// Echoed search phrase.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Echoed ordering.
    pub fn sort(&self) -> RecipeSort {
        self.sort
    }
}

#[cfg(test)]
mod tests {
    //! List pipeline coverage.

    use super::*;
    use crate::domain::{Recipe, RecipeContent, RecipeId, RecipeInput, UserId, VoteTally};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use rstest_bdd_macros::{given, then, when};
    use uuid::Uuid;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn summary(n: u128, title: &str, description: &str, tally: VoteTally) -> RecipeSummary {
        let content = RecipeContent::try_from_input(RecipeInput {
            title: title.to_owned(),
            description: description.to_owned(),
            ingredients: "flour".to_owned(),
            instructions: "bake".to_owned(),
            image: None,
        })
        .expect("valid content");
        let created = epoch() + Duration::minutes(i64::try_from(n).expect("small n"));
        let recipe = Recipe::new(
            RecipeId::from_uuid(Uuid::from_u128(n)),
            UserId::from_uuid(Uuid::from_u128(1_000)),
            content,
            created,
            created,
        );
        RecipeSummary::new(recipe, tally)
    }

    fn titles(page: &RecipePage) -> Vec<String> {
        page.items()
            .iter()
            .map(|item| item.recipe.content().title().to_owned())
            .collect()
    }

    #[fixture]
    fn twelve_recipes() -> Vec<RecipeSummary> {
        (1..=12)
            .map(|n| summary(n, &format!("Recipe {n}"), "plain", VoteTally::default()))
            .collect()
    }

    #[rstest]
    #[case(None, Ok(RecipeSort::Newest))]
    #[case(Some(""), Ok(RecipeSort::Newest))]
    #[case(Some("oldest"), Ok(RecipeSort::Oldest))]
    #[case(Some("most_upvotes"), Ok(RecipeSort::MostUpvotes))]
    #[case(Some("most_downvotes"), Ok(RecipeSort::MostDownvotes))]
    #[case(Some("popular"), Err(RecipeQueryError::UnknownSort("popular".to_owned())))]
    fn sort_keys_parse(
        #[case] raw: Option<&str>,
        #[case] expected: Result<RecipeSort, RecipeQueryError>,
    ) {
        assert_eq!(RecipeSort::from_query(raw), expected);
    }

    #[rstest]
    fn unknown_sort_maps_to_invalid_request() {
        let err = RecipeListQuery::from_raw(None, Some("random"), None).expect_err("rejected");
        let domain: Error = err.into();
        assert_eq!(domain.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[given("recipes about chocolate and bread")]
    fn recipes_about_chocolate_and_bread() -> Vec<RecipeSummary> {
        vec![
            summary(1, "Chocolate Cake", "a party classic", VoteTally::default()),
            summary(2, "Sponge", "rich chocolate flavor", VoteTally::default()),
            summary(3, "Sourdough", "crusty bread", VoteTally::default()),
        ]
    }

    #[when("the list is searched for choc")]
    fn the_list_is_searched_for_choc(all: Vec<RecipeSummary>) -> RecipePage {
        let query = RecipeListQuery::from_raw(Some("choc"), Some("oldest"), None)
            .expect("valid query");
        RecipePage::from_summaries(all, &query)
    }

    #[then("title and description matches are both returned")]
    fn title_and_description_matches_are_returned(page: RecipePage) {
        assert_eq!(titles(&page), vec!["Chocolate Cake", "Sponge"]);
        assert_eq!(page.search(), Some("choc"));
    }

    #[rstest]
    fn search_echoes_the_query_as_sent() {
        let query = RecipeListQuery::from_raw(Some("  Choc "), None, None).expect("valid query");
        let page = RecipePage::from_summaries(recipes_about_chocolate_and_bread(), &query);

        assert_eq!(page.search(), Some("  Choc "));
        assert_eq!(titles(&page), vec!["Sponge", "Chocolate Cake"]);
    }

    #[rstest]
    fn search_matches_title_or_description() {
        let all = recipes_about_chocolate_and_bread();
        let page = the_list_is_searched_for_choc(all);
        title_and_description_matches_are_returned(page);
    }

    #[rstest]
    fn search_ignores_case() {
        let term = SearchTerm::parse(Some("CHOC")).expect("non-blank");
        let item = summary(1, "chocolate mousse", "dessert", VoteTally::default());
        assert!(matches_search(&item, Some(&term)));
    }

    #[rstest]
    fn most_upvotes_orders_by_count() {
        let all = vec![
            summary(1, "five", "x", VoteTally::new(5, 0)),
            summary(2, "one", "x", VoteTally::new(1, 0)),
            summary(3, "three", "x", VoteTally::new(3, 0)),
        ];
        let query = RecipeListQuery::from_raw(None, Some("most_upvotes"), None).expect("valid");
        let page = RecipePage::from_summaries(all, &query);
        assert_eq!(titles(&page), vec!["five", "three", "one"]);
    }

    #[rstest]
    fn most_downvotes_breaks_ties_by_id() {
        let all = vec![
            summary(3, "c", "x", VoteTally::new(0, 2)),
            summary(1, "a", "x", VoteTally::new(0, 2)),
            summary(2, "b", "x", VoteTally::new(0, 7)),
        ];
        let query =
            RecipeListQuery::from_raw(None, Some("most_downvotes"), None).expect("valid");
        let page = RecipePage::from_summaries(all, &query);
        assert_eq!(titles(&page), vec!["b", "a", "c"]);
    }

    #[rstest]
    #[case(Some("1"), vec![1, 2, 3, 4, 5], 1)]
    #[case(Some("3"), vec![11, 12], 3)]
    #[case(Some("4"), vec![11, 12], 3)]
    #[case(Some("zero"), vec![1, 2, 3, 4, 5], 1)]
    fn oldest_pages_are_clamped(
        twelve_recipes: Vec<RecipeSummary>,
        #[case] raw_page: Option<&str>,
        #[case] expected: Vec<u128>,
        #[case] expected_page: u64,
    ) {
        let query = RecipeListQuery::from_raw(None, Some("oldest"), raw_page).expect("valid");
        let page = RecipePage::from_summaries(twelve_recipes, &query);
        let ids: Vec<u128> = page
            .items()
            .iter()
            .map(|item| item.recipe.id().as_uuid().as_u128())
            .collect();
        assert_eq!(ids, expected);
        assert_eq!(page.window().page(), expected_page);
        assert_eq!(page.window().total_pages(), 3);
    }

    #[rstest]
    fn newest_is_the_default_order(twelve_recipes: Vec<RecipeSummary>) {
        let query = RecipeListQuery::from_raw(None, None, None).expect("valid");
        let page = RecipePage::from_summaries(twelve_recipes, &query);
        assert_eq!(page.sort(), RecipeSort::Newest);
        assert_eq!(
            page.items().first().map(|item| item.recipe.id().as_uuid().as_u128()),
            Some(12)
        );
    }

    #[rstest]
    fn no_matches_yield_single_empty_page(twelve_recipes: Vec<RecipeSummary>) {
        let query = RecipeListQuery::from_raw(Some("zzz"), None, Some("2")).expect("valid");
        let page = RecipePage::from_summaries(twelve_recipes, &query);
        assert!(page.items().is_empty());
        assert_eq!(page.window().page(), 1);
        assert_eq!(page.window().total_pages(), 1);
    }
}
