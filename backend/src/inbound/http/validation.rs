//! Shared validation helpers for inbound HTTP adapters.
//!
//! Extractor failures and malformed path segments become `invalid_request`
//! errors whose `details` carry a machine-readable `code`.

use actix_web::web;
use serde_json::json;

use crate::domain::{Error, RecipeId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidBody,
    InvalidQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::InvalidQuery => "invalid_query",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const RECIPE_ID: FieldName = FieldName::new("id");

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse a recipe id taken from the request path.
pub(crate) fn parse_recipe_id(raw: &str) -> Result<RecipeId, Error> {
    raw.parse()
        .map_err(|_| invalid_uuid_error(RECIPE_ID, raw))
}

fn extractor_error(code: ErrorCode, reason: String) -> Error {
    Error::invalid_request(reason).with_details(json!({ "code": code.as_str() }))
}

/// JSON extractor configuration reporting bad bodies in the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        extractor_error(ErrorCode::InvalidBody, format!("invalid request body: {err}")).into()
    })
}

/// Query extractor configuration reporting bad query strings in the error
/// envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        extractor_error(ErrorCode::InvalidQuery, format!("invalid query string: {err}")).into()
    })
}
