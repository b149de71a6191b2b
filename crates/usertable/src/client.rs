//! Typed client for the `/api/users` endpoints.
//!
//! Non-success responses are turned into [`Error::Api`] carrying the
//! server's `message` verbatim. Nothing is retried.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::user::{User, UserInput};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for a running API service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`
    /// (for example `http://localhost:4004`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// The base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/api/users", self.base_url)
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/api/users/{id}", self.base_url)
    }

    /// Fetch every user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for error responses and [`Error::Http`] for
    /// transport failures.
    pub async fn list(&self) -> Result<Vec<User>> {
        debug!("GET {}", self.users_url());
        let response = self.http.get(self.users_url()).send().await?;
        decode(response).await
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] (404 for unknown ids) or [`Error::Http`].
    pub async fn get(&self, id: &str) -> Result<User> {
        debug!("GET {}", self.user_url(id));
        let response = self.http.get(self.user_url(id)).send().await?;
        decode(response).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] (400 for invalid bodies) or [`Error::Http`].
    pub async fn create(&self, input: &UserInput) -> Result<User> {
        debug!("POST {}", self.users_url());
        let response = self.http.post(self.users_url()).json(input).send().await?;
        decode(response).await
    }

    /// Replace a user's name, age and mobile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] (404 or 400) or [`Error::Http`].
    pub async fn update(&self, id: &str, input: &UserInput) -> Result<User> {
        debug!("PUT {}", self.user_url(id));
        let response = self.http.put(self.user_url(id)).json(input).send().await?;
        decode(response).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] (404 for unknown ids) or [`Error::Http`].
    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!("DELETE {}", self.user_url(id));
        let response = self.http.delete(self.user_url(id)).send().await?;
        check(response).await.map(drop)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check(response).await?.json().await?)
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        },
        |b| b.message,
    );
    Error::Api {
        status: status.as_u16(),
        message,
    }
}
