use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid rate '{value}': {source}")]
    InvalidRate {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Rate must be a finite value >= 0, got {value}.")]
    NegativeRate { value: f64 },
    #[error("Invalid success threshold '{value}': {source}")]
    InvalidThreshold {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Success threshold must be within 0..=100, got {value}.")]
    ThresholdOutOfRange { value: f64 },
    #[error("Maximum concurrency ({max}) must be >= start concurrency ({start}).")]
    MaxBelowStart { start: u64, max: u64 },
    #[error("Concurrency must be >= 1.")]
    ConcurrencyZero,
    #[error("Step size must be >= 1.")]
    StepZero,
    #[error("At least one concurrency level is required.")]
    EmptyConcurrencyList,
    #[error("At least one rate value is required.")]
    EmptyRateList,
    #[error(
        "{var} not found in environment variables. Export it or create a .env file with {var}=your_key."
    )]
    MissingCredential { var: String },
    #[error("Credential is not a valid Authorization header value: {source}")]
    InvalidAuthorizationHeader {
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' has no host.")]
    UrlMissingHost { url: String },
}
