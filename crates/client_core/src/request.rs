//! Shared HTTP plumbing held by every REST service.

use std::sync::Arc;

use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ApiError;
use tracing::{debug, error};
use url::Url;

use crate::{
    error::{ClientError, Result},
    notice::{Notifier, ERROR_NOTICE},
    session::SessionStore,
};

/// Whether a failure also becomes a user notice or only a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reporting {
    Notify,
    LogOnly,
}

pub struct ApiRequester {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
    notifier: Notifier,
}

impl ApiRequester {
    pub fn new(api_url: &str, session: Arc<SessionStore>, notifier: Notifier) -> Result<Self> {
        let base_url =
            Url::parse(api_url).map_err(|_| ClientError::InvalidBaseUrl(api_url.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(api_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            session,
            notifier,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.request_json(Method::GET, segments).await
    }

    /// `GET` whose failures are logged but never published as notices.
    pub async fn get_json_unreported<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self
            .execute::<()>(Method::GET, segments, None, Reporting::LogOnly)
            .await?;
        self.decode(response, Reporting::LogOnly).await
    }

    /// Bodiless request with a JSON answer.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<T> {
        let response = self
            .execute::<()>(method, segments, None, Reporting::Notify)
            .await?;
        self.decode(response, Reporting::Notify).await
    }

    pub async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(method, segments, Some(body), Reporting::Notify)
            .await?;
        self.decode(response, Reporting::Notify).await
    }

    /// For endpoints answering with a plain-text confirmation.
    pub async fn send_for_text(&self, method: Method, segments: &[&str]) -> Result<String> {
        let response = self
            .execute::<()>(method, segments, None, Reporting::Notify)
            .await?;
        response
            .text()
            .await
            .map_err(|err| self.fail_decode(err, Reporting::Notify))
    }

    async fn execute<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        reporting: Reporting,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if !is_public_endpoint(&method, segments) {
            if let Some(token) = self.session.token().await? {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("api: transport failure method={method} url={url} error={err}");
                return Err(self.fail(ClientError::Network(err), reporting));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("api: ok method={method} url={url} status={}", status.as_u16());
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            "api: request failed method={method} url={url} status={} body={body}",
            status.as_u16()
        );
        let api_error = ApiError::from_response(status.as_u16(), &body);
        Err(self.fail(
            ClientError::Http {
                status: status.as_u16(),
                code: api_error.code,
                message: api_error.message,
            },
            reporting,
        ))
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
        reporting: Reporting,
    ) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|err| self.fail_decode(err, reporting))
    }

    fn fail_decode(&self, err: reqwest::Error, reporting: Reporting) -> ClientError {
        error!("api: undecodable response error={err}");
        self.fail(ClientError::Decode(err.to_string()), reporting)
    }

    fn fail(&self, err: ClientError, reporting: Reporting) -> ClientError {
        if reporting == Reporting::Notify {
            self.notifier.error(err.user_message(), ERROR_NOTICE);
        }
        err
    }
}

/// Login and registration go out without credentials.
pub fn is_public_endpoint(method: &Method, segments: &[&str]) -> bool {
    match segments {
        ["login"] => true,
        ["users"] => *method == Method::POST,
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/request_tests.rs"]
mod tests;
