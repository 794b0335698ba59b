use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use super::credentials::Credentials;

/// Longest server error body shown to the user verbatim.
pub const MAX_ERROR_LEN: usize = 255;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(creds: &Credentials) -> anyhow::Result<Self> {
        let mut client = Self::anonymous(&creds.server_url)?;
        client.token = Some(creds.token.clone());
        Ok(client)
    }

    /// A client without a bearer token, for login.
    pub fn anonymous(server_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> anyhow::Result<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let resp = request.send()?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        Err(anyhow::anyhow!(error_message(status, &body)))
    }

    pub fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = self.send(self.client.post(self.url(path)).json(body))?;
        Ok(resp.json()?)
    }

    /// POST without a body, returning the plain-text response.
    pub fn post_text(&self, path: &str) -> anyhow::Result<String> {
        let resp = self.send(self.client.post(self.url(path)))?;
        Ok(resp.text()?)
    }

    pub fn patch_text(&self, path: &str) -> anyhow::Result<String> {
        let resp = self.send(self.client.patch(self.url(path)))?;
        Ok(resp.text()?)
    }

    pub fn delete_text(&self, path: &str) -> anyhow::Result<String> {
        let resp = self.send(self.client.delete(self.url(path)))?;
        Ok(resp.text()?)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Message shown for a failed request: the server's body when it is short and
/// non-empty, otherwise a generic line naming the status.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.chars().count() > MAX_ERROR_LEN {
        return format!("Request failed with status {status}");
    }
    body.to_string()
}
