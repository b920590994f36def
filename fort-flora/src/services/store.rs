//! Typed access to the gateway with the seed fallback applied.
//!
//! Reads never fail: when the gateway is absent, errors, returns rows that
//! do not decode, or returns nothing at all, the seed dataset is used
//! instead. Writes report how far they got as a [`WriteOutcome`].

use super::gateway::{Collection, DecodeSnafu, Filter, Gateway, GatewayError, GatewayResult};
use super::Service;
use crate::model::{Bookmark, Flora, Fort, Identity, NewFlora, NewFort};
use crate::seed;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a write as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The gateway accepted the write.
    Saved,
    /// No gateway; the write was acknowledged locally only.
    SavedLocally,
    Failed(String),
}

impl WriteOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, WriteOutcome::Saved)
    }
}

/// Message shown when a delete is attempted without a gateway.
pub const DELETE_NEEDS_GATEWAY: &str = "Cannot delete without a gateway connection";

#[derive(Clone)]
pub struct Store {
    gateway: Service<dyn Gateway>,
}

impl Store {
    pub fn new(gateway: Service<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn offline() -> Self {
        Self::new(Service::Absent)
    }

    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Self {
        Self::new(Service::Configured(gateway))
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    pub async fn forts(&self) -> Vec<Fort> {
        self.rows_or_seed(Collection::Forts, seed::forts()).await
    }

    pub async fn flora(&self) -> Vec<Flora> {
        self.rows_or_seed(Collection::Flora, seed::flora()).await
    }

    async fn rows_or_seed<T>(&self, collection: Collection, seed: &[T]) -> Vec<T>
    where
        T: DeserializeOwned + Clone,
    {
        let Some(gateway) = self.gateway.get() else {
            info!(%collection, "gateway not configured, using seed data");
            return seed.to_vec();
        };
        match select::<T>(gateway, collection, &[]).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                info!(%collection, "gateway returned no rows, using seed data");
                seed.to_vec()
            }
            Err(err) => {
                warn!(%collection, error = %err, "gateway unavailable, using seed data");
                seed.to_vec()
            }
        }
    }

    /// The signed-in user. Lookup failures count as signed out.
    pub async fn current_user(&self) -> Option<Identity> {
        let gateway = self.gateway.get()?;
        match gateway.current_user().await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "could not resolve the current user");
                None
            }
        }
    }

    /// Whether `user` holds the admin role. Lookup failures deny.
    pub async fn is_admin(&self, user: &Identity) -> bool {
        let Some(gateway) = self.gateway.get() else {
            return false;
        };
        let filters = [Filter::eq("user_id", &user.id), Filter::eq("role", "admin")];
        match gateway.select(Collection::UserRoles, &filters).await {
            Ok(rows) => !rows.is_empty(),
            Err(err) => {
                warn!(user = %user.id, error = %err, "role lookup failed");
                false
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Identity> {
        self.require()?.sign_in(email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Option<Identity>> {
        self.require()?.sign_up(email, password).await
    }

    pub async fn sign_out(&self) {
        if let Some(gateway) = self.gateway.get() {
            if let Err(err) = gateway.sign_out().await {
                warn!(error = %err, "sign out failed");
            }
        }
    }

    fn require(&self) -> GatewayResult<&Arc<dyn Gateway>> {
        self.gateway.get().ok_or_else(|| GatewayError::Auth {
            message: "The gateway is not configured.".to_string(),
        })
    }

    /// Bookmarks of `user_id`. Without a gateway there are none.
    pub async fn bookmarks(&self, user_id: &str) -> GatewayResult<Vec<Bookmark>> {
        match self.gateway.get() {
            Some(gateway) => select(gateway, Collection::Bookmarks, &[Filter::eq("user_id", user_id)]).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn add_bookmark(&self, user_id: &str, fort_id: i64) -> WriteOutcome {
        let row = serde_json::json!({ "user_id": user_id, "fort_id": fort_id });
        self.write(Collection::Bookmarks, |gateway| async move {
            gateway.insert(Collection::Bookmarks, row).await
        })
        .await
    }

    pub async fn remove_bookmark(&self, user_id: &str, fort_id: i64) -> WriteOutcome {
        let filters = vec![Filter::eq("user_id", user_id), Filter::eq("fort_id", fort_id)];
        self.delete_where(Collection::Bookmarks, filters).await
    }

    pub async fn insert_fort(&self, fort: &NewFort) -> WriteOutcome {
        self.insert(Collection::Forts, fort).await
    }

    pub async fn update_fort(&self, id: i64, fort: &NewFort) -> WriteOutcome {
        self.update(Collection::Forts, id, fort).await
    }

    pub async fn delete_fort(&self, id: i64) -> WriteOutcome {
        self.delete_where(Collection::Forts, vec![Filter::id(id)]).await
    }

    pub async fn insert_flora(&self, plant: &NewFlora) -> WriteOutcome {
        self.insert(Collection::Flora, plant).await
    }

    pub async fn update_flora(&self, id: i64, plant: &NewFlora) -> WriteOutcome {
        self.update(Collection::Flora, id, plant).await
    }

    pub async fn delete_flora(&self, id: i64) -> WriteOutcome {
        self.delete_where(Collection::Flora, vec![Filter::id(id)]).await
    }

    async fn insert<T: Serialize>(&self, collection: Collection, record: &T) -> WriteOutcome {
        let row = match serde_json::to_value(record) {
            Ok(row) => row,
            Err(err) => return WriteOutcome::Failed(err.to_string()),
        };
        self.write(collection, |gateway| async move { gateway.insert(collection, row).await })
            .await
    }

    async fn update<T: Serialize>(&self, collection: Collection, id: i64, record: &T) -> WriteOutcome {
        let row = match serde_json::to_value(record) {
            Ok(row) => row,
            Err(err) => return WriteOutcome::Failed(err.to_string()),
        };
        self.write(collection, |gateway| async move {
            gateway.update(collection, &[Filter::id(id)], row).await
        })
        .await
    }

    async fn delete_where(&self, collection: Collection, filters: Vec<Filter>) -> WriteOutcome {
        if !self.is_configured() {
            return WriteOutcome::Failed(DELETE_NEEDS_GATEWAY.to_string());
        }
        self.write(collection, |gateway| async move {
            gateway.delete(collection, &filters).await
        })
        .await
    }

    async fn write<F, Fut>(&self, collection: Collection, op: F) -> WriteOutcome
    where
        F: FnOnce(Arc<dyn Gateway>) -> Fut,
        Fut: std::future::Future<Output = GatewayResult<()>>,
    {
        let Some(gateway) = self.gateway.get() else {
            info!(%collection, "gateway not configured, write kept locally");
            return WriteOutcome::SavedLocally;
        };
        match op(Arc::clone(gateway)).await {
            Ok(()) => {
                info!(%collection, "write saved");
                WriteOutcome::Saved
            }
            Err(err) => {
                warn!(%collection, error = %err, "write failed");
                WriteOutcome::Failed(describe(&err))
            }
        }
    }
}

async fn select<T: DeserializeOwned>(
    gateway: &Arc<dyn Gateway>,
    collection: Collection,
    filters: &[Filter],
) -> GatewayResult<Vec<T>> {
    let rows = gateway.select(collection, filters).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).context(DecodeSnafu))
        .collect()
}

/// User-facing text for a failed write.
fn describe(err: &GatewayError) -> String {
    match err {
        GatewayError::Status { body, .. } if !body.is_empty() => body.clone(),
        other => other.to_string(),
    }
}
