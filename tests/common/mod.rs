#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use phonebook_api::config::{AppConfig, PasswordHashConfig};
use phonebook_api::database::MemoryStore;
use phonebook_api::{app, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";

/// One in-process server per test, each with its own empty in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.security.jwt_secret = JWT_SECRET.to_string();
        config.security.password_hash = PasswordHashConfig::minimal();

        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .context("failed to bind test listener")?;
        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post_json("/api/auth/signup", None, json!({ "email": email, "password": password }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post_json("/api/auth/login", None, json!({ "email": email, "password": password }))
            .await
    }

    /// Sign up and return the bearer token
    pub async fn token_for(&self, email: &str, password: &str) -> Result<String> {
        let (status, body) = self.signup(email, password).await?;
        anyhow::ensure!(status == StatusCode::OK, "signup failed: {} {}", status, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("signup response had no token")
    }

    pub async fn add_contact(&self, token: &str, name: &str, phone: &str) -> Result<Value> {
        let (status, body) = self
            .post_json("/api/contacts", Some(token), json!({ "name": name, "phone": phone }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "add contact failed: {} {}", status, body);
        Ok(body["data"].clone())
    }

    pub async fn list_contacts(&self, token: &str, search: Option<&str>) -> Result<Vec<Value>> {
        let mut request = self.client.get(self.url("/api/contacts")).bearer_auth(token);
        if let Some(term) = search {
            request = request.query(&[("search", term)]);
        }
        let resp = request.send().await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "list failed: {}", resp.status());
        let body: Value = resp.json().await?;
        body["data"].as_array().cloned().context("list data was not an array")
    }

    pub async fn update_contact(&self, token: &str, id: &str, patch: Value) -> Result<(StatusCode, Value)> {
        let resp = self
            .client
            .put(self.url(&format!("/api/contacts/{}", id)))
            .bearer_auth(token)
            .json(&patch)
            .send()
            .await?;
        Ok((resp.status(), resp.json().await?))
    }

    pub async fn delete_contact(&self, token: &str, id: &str) -> Result<(StatusCode, Value)> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/contacts/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;
        Ok((resp.status(), resp.json().await?))
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;
        Ok((resp.status(), resp.json().await?))
    }
}
