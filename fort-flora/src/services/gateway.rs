//! Trait abstracting the hosted relational store and its auth endpoints.
//!
//! Implemented by:
//! - `SupabaseGateway` - PostgREST/GoTrue over HTTP
//! - `MemoryGateway` - in-memory rows with failure injection, for tests

use crate::model::Identity;
use async_trait::async_trait;
use serde_json::Value;
use snafu::Snafu;
use std::fmt;

/// Tables the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Forts,
    Flora,
    Bookmarks,
    UserRoles,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Forts => "forts",
            Collection::Flora => "flora",
            Collection::Bookmarks => "bookmarks",
            Collection::UserRoles => "user_roles",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// An equality filter, `column = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    pub fn id(id: i64) -> Self {
        Self::eq("id", id)
    }

    /// True when `row[column]` renders to the same text as `value`.
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(self.column) {
            Some(Value::String(text)) => *text == self.value,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GatewayError {
    #[snafu(display("gateway is not configured"))]
    NotConfigured,

    #[snafu(display("gateway request failed"))]
    Transport { source: reqwest::Error },

    #[snafu(display("gateway answered {status}: {body}"))]
    Status { status: u16, body: String },

    #[snafu(display("gateway returned malformed rows"))]
    Decode { source: serde_json::Error },

    #[snafu(display("{message}"))]
    Auth { message: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Rows of `collection` matching every filter.
    async fn select(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<Vec<Value>>;

    async fn insert(&self, collection: Collection, row: Value) -> GatewayResult<()>;

    /// Patch every row matching the filters with the fields of `row`.
    async fn update(&self, collection: Collection, filters: &[Filter], row: Value) -> GatewayResult<()>;

    async fn delete(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<()>;

    /// The signed-in user, if the session has one.
    async fn current_user(&self) -> GatewayResult<Option<Identity>>;

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Identity>;

    /// Create an account. Some deployments confirm by email first, in which
    /// case no identity is returned yet.
    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Option<Identity>>;

    async fn sign_out(&self) -> GatewayResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_numbers_and_strings() {
        let row = json!({"id": 3, "user_id": "u-1", "fort_id": null});
        assert!(Filter::id(3).matches(&row));
        assert!(!Filter::id(4).matches(&row));
        assert!(Filter::eq("user_id", "u-1").matches(&row));
        assert!(!Filter::eq("fort_id", "null").matches(&row));
        assert!(!Filter::eq("missing", "x").matches(&row));
    }
}
