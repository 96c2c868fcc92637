use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error};
use url::Url;

use crate::error::{AppError, AppResult, HttpError, ValidationError};
use crate::metrics::{RequestOutcome, is_success_status};

use super::target::Target;

const USER_AGENT: &str = concat!("concprobe/", env!("CARGO_PKG_VERSION"));
/// Raw body characters kept when a failed response carries no structured detail.
const BODY_EXCERPT_CHARS: usize = 100;

/// Issues one request against a fixed target and classifies the result.
///
/// Implementations never retry and never return an error: every failure is
/// folded into the returned [`RequestOutcome`].
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self) -> RequestOutcome;
}

#[derive(Debug, Clone, Copy)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub pre_lookup: bool,
}

/// [`RequestExecutor`] backed by a pooled `reqwest` client issuing GETs.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    url: Url,
}

impl HttpExecutor {
    /// Builds the shared client for `target`.
    ///
    /// # Errors
    ///
    /// Returns an error when the credential is not a valid header value, the
    /// target host cannot be resolved, or the client cannot be built.
    pub async fn connect(target: &Target, settings: ClientSettings) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(credential) = target.credential.as_ref() {
            let mut value = HeaderValue::from_str(&credential.header_value()).map_err(|err| {
                AppError::validation(ValidationError::InvalidAuthorizationHeader { source: err })
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut client_builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if settings.pre_lookup
            && let Some((host, addrs)) = target.pre_resolve().await?
        {
            debug!("Resolved {} to {} address(es)", host, addrs.len());
            client_builder = client_builder.resolve_to_addrs(&host, &addrs);
        }

        let client = match client_builder.build() {
            Ok(client) => client,
            Err(err) => {
                error!("Failed to build HTTP client: {}", err);
                return Err(AppError::http(HttpError::BuildClientFailed { source: err }));
            }
        };

        Ok(Self {
            client,
            url: target.url.clone(),
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self) -> RequestOutcome {
        let start = Instant::now();
        match self.client.get(self.url.clone()).send().await {
            Ok(response) => classify_response(response, start).await,
            Err(err) => RequestOutcome::transport_failure(
                start.elapsed(),
                describe_transport_error(&err),
            ),
        }
    }
}

async fn classify_response(response: Response, start: Instant) -> RequestOutcome {
    let status = response.status().as_u16();
    if is_success_status(status) {
        // Drain so the pooled connection can be reused.
        return match response.bytes().await {
            Ok(_) => RequestOutcome::from_status(status, start.elapsed(), None),
            Err(err) => RequestOutcome::transport_failure(
                start.elapsed(),
                describe_transport_error(&err),
            ),
        };
    }

    let detail = match response.text().await {
        Ok(body) => extract_error_detail(status, &body),
        Err(err) => {
            debug!("Failed to read error body for HTTP {}: {}", status, err);
            format!("HTTP {}", status)
        }
    };
    RequestOutcome::from_status(status, start.elapsed(), Some(detail))
}

/// Picks a human-readable message out of a failed response body.
///
/// JSON `detail`, then JSON `message`, then the start of the JSON body.
/// Empty or non-JSON bodies give `HTTP <status>`.
pub(super) fn extract_error_detail(status: u16, body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return format!("HTTP {}", status);
    };
    if let Value::Object(fields) = &parsed
        && let Some(value) = fields.get("detail").or_else(|| fields.get("message"))
    {
        return match value {
            Value::String(text) => text.clone(),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
                value.to_string()
            }
        };
    }
    body.trim().chars().take(BODY_EXCERPT_CHARS).collect()
}

/// `Timeout`, or `<kind>: <innermost cause>`.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "Timeout".to_owned();
    }
    let kind = if err.is_connect() {
        "ConnectError"
    } else if err.is_redirect() {
        "RedirectError"
    } else if err.is_body() {
        "BodyError"
    } else if err.is_decode() {
        "DecodeError"
    } else if err.is_request() {
        "RequestError"
    } else {
        "ClientError"
    };
    format!("{}: {}", kind, root_cause(err))
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
