use std::fmt;
use std::net::SocketAddr;

use tokio::net::lookup_host;
use url::{Host, Url};

use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Authorization material sent as `Authorization: <scheme> <token>`.
#[derive(Clone)]
pub struct Credential {
    scheme: String,
    token: String,
}

impl Credential {
    #[must_use]
    pub fn new(scheme: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn header_value(&self) -> String {
        if self.scheme.is_empty() {
            return self.token.clone();
        }
        format!("{} {}", self.scheme, self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Fully resolved request target: endpoint URL plus authentication.
#[derive(Debug, Clone)]
pub struct Target {
    pub url: Url,
    pub credential: Option<Credential>,
}

impl Target {
    /// Joins `endpoint` onto `base_url` with exactly one `/` between them.
    ///
    /// # Errors
    ///
    /// Returns an error when the joined URL is invalid or has no host.
    pub fn from_parts(
        base_url: &str,
        endpoint: &str,
        credential: Option<Credential>,
    ) -> AppResult<Self> {
        let joined = join_endpoint(base_url, endpoint);
        let url = Url::parse(&joined).map_err(|err| {
            AppError::validation(ValidationError::InvalidUrl {
                url: joined.clone(),
                source: err,
            })
        })?;
        if url.host().is_none() {
            return Err(AppError::validation(ValidationError::UrlMissingHost {
                url: joined,
            }));
        }
        Ok(Self { url, credential })
    }

    /// Resolves the target host once so an unresolvable target fails the run
    /// before any batch starts. IP literals need no lookup and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot be resolved.
    pub async fn pre_resolve(&self) -> AppResult<Option<(String, Vec<SocketAddr>)>> {
        let Some(Host::Domain(host)) = self.url.host() else {
            return Ok(None);
        };
        let port = self.url.port_or_known_default().unwrap_or(80);
        let addrs: Vec<SocketAddr> = lookup_host((host, port))
            .await
            .map_err(|err| {
                AppError::http(HttpError::ResolveHost {
                    host: host.to_owned(),
                    port,
                    source: err,
                })
            })?
            .collect();
        if addrs.is_empty() {
            return Err(AppError::http(HttpError::NoAddressesResolved {
                host: host.to_owned(),
            }));
        }
        Ok(Some((host.to_owned(), addrs)))
    }
}

pub(super) fn join_endpoint(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = endpoint.trim().trim_start_matches('/');
    if path.is_empty() {
        return format!("{}/", base);
    }
    format!("{}/{}", base, path)
}
