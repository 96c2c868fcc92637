pub const DEFAULT_BASE_URL: &str = "https://www.courtlistener.com/api/rest/v4";
pub const DEFAULT_ENDPOINT: &str = "search/";
pub const DEFAULT_API_KEY_ENV: &str = "COURTLISTENER_API_KEY";
pub const DEFAULT_AUTH_SCHEME: &str = "Token";

pub(crate) const DEFAULT_REQUESTS: u64 = 100;
pub(crate) const DEFAULT_THRESHOLD: f64 = 95.0;
