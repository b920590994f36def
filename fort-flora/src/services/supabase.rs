//! Hosted gateway: PostgREST rows under `/rest/v1`, GoTrue auth under
//! `/auth/v1`.

use super::gateway::{
    Collection, DecodeSnafu, Filter, Gateway, GatewayError, GatewayResult, TransportSnafu,
};
use crate::config::SupabaseConfig;
use crate::model::Identity;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use snafu::ResultExt;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    user: Identity,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: Identity,
}

/// GoTrue reports errors under one of these keys depending on the endpoint.
#[derive(Deserialize, Default)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

pub struct SupabaseGateway {
    http: Client,
    url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl SupabaseGateway {
    pub fn new(config: &SupabaseConfig) -> Self {
        info!(url = %config.url, "using hosted gateway");
        Self {
            http: Client::new(),
            url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
        }
    }

    fn rest_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.url, collection.table())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn session(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// The anon key, or the user's access token once signed in.
    fn bearer(&self) -> String {
        self.session()
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.anon_key).bearer_auth(self.bearer())
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = self.authorized(request).send().await.context(TransportSnafu)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_auth(&self, request: RequestBuilder) -> GatewayResult<Value> {
        let response = self.authorized(request).send().await.context(TransportSnafu)?;
        let status = response.status();
        let bytes = response.bytes().await.context(TransportSnafu)?;
        if !status.is_success() {
            let body: AuthErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = body
                .error_description
                .or(body.msg)
                .or(body.message)
                .unwrap_or_else(|| format!("authentication failed ({status})"));
            return Err(GatewayError::Auth { message });
        }
        serde_json::from_slice(&bytes).context(DecodeSnafu)
    }
}

/// PostgREST query pairs: `column=eq.value` per filter.
fn filter_query(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| (filter.column.to_string(), format!("eq.{}", filter.value)))
        .collect()
}

#[async_trait]
impl Gateway for SupabaseGateway {
    async fn select(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<Vec<Value>> {
        let request = self
            .http
            .get(self.rest_url(collection))
            .query(&[("select", "*")])
            .query(&filter_query(filters));
        let response = self.send(request).await?;
        let bytes = response.bytes().await.context(TransportSnafu)?;
        let rows: Vec<Value> = serde_json::from_slice(&bytes).context(DecodeSnafu)?;
        debug!(%collection, count = rows.len(), "rows fetched");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Value) -> GatewayResult<()> {
        let request = self
            .http
            .post(self.rest_url(collection))
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(request).await?;
        Ok(())
    }

    async fn update(&self, collection: Collection, filters: &[Filter], row: Value) -> GatewayResult<()> {
        let request = self
            .http
            .patch(self.rest_url(collection))
            .query(&filter_query(filters))
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<()> {
        let request = self
            .http
            .delete(self.rest_url(collection))
            .query(&filter_query(filters));
        self.send(request).await?;
        Ok(())
    }

    async fn current_user(&self) -> GatewayResult<Option<Identity>> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        match self.send_auth(self.http.get(self.auth_url("user"))).await {
            Ok(user) => Ok(Some(serde_json::from_value(user).context(DecodeSnafu)?)),
            Err(GatewayError::Auth { message }) => {
                warn!(user = %session.user.id, %message, "session rejected, signing out locally");
                self.set_session(None);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Identity> {
        let request = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body = self.send_auth(request).await?;
        let token: TokenResponse = serde_json::from_value(body).context(DecodeSnafu)?;
        info!(user = %token.user.id, "signed in");
        let user = token.user.clone();
        self.set_session(Some(Session {
            access_token: token.access_token,
            user: token.user,
        }));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Option<Identity>> {
        let request = self
            .http
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let body = self.send_auth(request).await?;

        // With email confirmation on, the user comes back bare and without a
        // token; with it off, a full session is returned.
        if let Ok(token) = serde_json::from_value::<TokenResponse>(body.clone()) {
            let user = token.user.clone();
            self.set_session(Some(Session {
                access_token: token.access_token,
                user: token.user,
            }));
            return Ok(Some(user));
        }
        Ok(serde_json::from_value::<Identity>(body).ok())
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        if self.session().is_none() {
            return Ok(());
        }
        let result = self.send(self.http.post(self.auth_url("logout"))).await;
        self.set_session(None);
        result.map(|_| ())
    }
}
