//! In-memory gateway for tests.
//!
//! Stores rows locally instead of making HTTP requests, so pages and the
//! store run the same code path they run against the hosted gateway.

use super::gateway::{Collection, Filter, Gateway, GatewayError, GatewayResult};
use crate::model::Identity;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// A failure to inject into every call touching a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    NotConfigured,
    Status(u16),
}

impl Failure {
    fn to_error(&self) -> GatewayError {
        match self {
            Failure::NotConfigured => GatewayError::NotConfigured,
            Failure::Status(status) => GatewayError::Status {
                status: *status,
                body: "injected failure".to_string(),
            },
        }
    }
}

struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct State {
    rows: HashMap<Collection, Vec<Value>>,
    failures: HashMap<Collection, Failure>,
    accounts: HashMap<String, Account>,
    session: Option<Identity>,
    calls: HashMap<Collection, usize>,
}

pub struct MemoryGateway {
    state: RwLock<State>,
    next_id: AtomicI64,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            next_id: AtomicI64::new(1000),
        }
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Seed `collection` with serializable rows.
    pub async fn with_rows<T: serde::Serialize>(self, collection: Collection, rows: &[T]) -> Self {
        {
            let mut state = self.state.write().await;
            let rows = rows.iter().filter_map(|row| serde_json::to_value(row).ok()).collect();
            state.rows.insert(collection, rows);
        }
        self
    }

    /// Make every call on `collection` fail.
    pub async fn fail(&self, collection: Collection, failure: Failure) {
        self.state.write().await.failures.insert(collection, failure);
    }

    pub async fn recover(&self, collection: Collection) {
        self.state.write().await.failures.remove(&collection);
    }

    /// Register an account without signing in.
    pub async fn add_account(&self, email: &str, password: &str, user_id: &str) {
        let identity = Identity {
            id: user_id.to_string(),
            email: Some(email.to_string()),
        };
        self.state.write().await.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity,
            },
        );
    }

    /// Make `user_id` an admin.
    pub async fn grant_admin(&self, user_id: &str) {
        let mut state = self.state.write().await;
        state
            .rows
            .entry(Collection::UserRoles)
            .or_default()
            .push(serde_json::json!({"user_id": user_id, "role": "admin"}));
    }

    /// Start with `identity` signed in.
    pub async fn sign_in_as(&self, identity: Identity) {
        self.state.write().await.session = Some(identity);
    }

    pub async fn rows(&self, collection: Collection) -> Vec<Value> {
        self.state.read().await.rows.get(&collection).cloned().unwrap_or_default()
    }

    /// How many calls reached `collection`, failed ones included.
    pub async fn calls(&self, collection: Collection) -> usize {
        self.state.read().await.calls.get(&collection).copied().unwrap_or(0)
    }

    async fn enter(&self, collection: Collection) -> GatewayResult<()> {
        let mut state = self.state.write().await;
        *state.calls.entry(collection).or_default() += 1;
        match state.failures.get(&collection) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<Vec<Value>> {
        self.enter(collection).await?;
        let state = self.state.read().await;
        let rows: Vec<Value> = state
            .rows
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| filter.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(%collection, count = rows.len(), "memory select");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, mut row: Value) -> GatewayResult<()> {
        self.enter(collection).await?;
        if let Value::Object(fields) = &mut row {
            fields
                .entry("id")
                .or_insert_with(|| Value::from(self.next_id.fetch_add(1, Ordering::SeqCst)));
        }
        self.state.write().await.rows.entry(collection).or_default().push(row);
        Ok(())
    }

    async fn update(&self, collection: Collection, filters: &[Filter], patch: Value) -> GatewayResult<()> {
        self.enter(collection).await?;
        let mut state = self.state.write().await;
        let Some(rows) = state.rows.get_mut(&collection) else {
            return Ok(());
        };
        for row in rows.iter_mut().filter(|row| filters.iter().all(|f| f.matches(row))) {
            if let (Value::Object(target), Value::Object(fields)) = (&mut *row, &patch) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<()> {
        self.enter(collection).await?;
        let mut state = self.state.write().await;
        if let Some(rows) = state.rows.get_mut(&collection) {
            rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        }
        Ok(())
    }

    async fn current_user(&self) -> GatewayResult<Option<Identity>> {
        Ok(self.state.read().await.session.clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Identity> {
        let mut state = self.state.write().await;
        let identity = match state.accounts.get(email) {
            Some(account) if account.password == password => account.identity.clone(),
            _ => {
                return Err(GatewayError::Auth {
                    message: "Invalid login credentials".to_string(),
                })
            }
        };
        state.session = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Option<Identity>> {
        let mut state = self.state.write().await;
        if state.accounts.contains_key(email) {
            return Err(GatewayError::Auth {
                message: "User already registered".to_string(),
            });
        }
        let identity = Identity {
            id: format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            email: Some(email.to_string()),
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        Ok(Some(identity))
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.state.write().await.session = None;
        Ok(())
    }
}
