use crate::region::{Region, UnknownRegion};
use std::{env, time::Duration};
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A set of AWS credentials to authenticate requests with
#[derive(Clone)]
pub struct Credentials {
    aws_access_key_id: String,
    aws_secret_access_key: String,
    aws_session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        aws_access_key_id: impl AsRef<str>,
        aws_secret_access_key: impl AsRef<str>,
    ) -> Self {
        Self {
            aws_access_key_id: aws_access_key_id.as_ref().to_owned(),
            aws_secret_access_key: aws_secret_access_key.as_ref().to_owned(),
            aws_session_token: None,
        }
    }

    /// Attaches a session token, as issued with temporary STS credentials
    pub fn with_session_token(
        mut self,
        token: impl AsRef<str>,
    ) -> Self {
        self.aws_session_token = Some(token.as_ref().to_owned());
        self
    }

    pub fn access_key_id(&self) -> &str {
        &self.aws_access_key_id
    }

    pub(crate) fn secret_access_key(&self) -> &str {
        &self.aws_secret_access_key
    }

    pub(crate) fn session_token(&self) -> Option<&str> {
        self.aws_session_token.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"***")
            .field("aws_session_token", &self.aws_session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error(transparent)]
    Region(#[from] UnknownRegion),
    #[error("invalid timeout `{0}`, expected a whole number of seconds")]
    InvalidTimeout(String),
    #[error("failed to build transport: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Everything needed to open a [`Connection`](crate::Connection)
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Used for signing, and for addressing when no `endpoint` is set
    pub region: Region,
    /// An optional uri to address the DynamoDB api, often times just for dynamodb local
    pub endpoint: Option<String>,
    /// Upper bound on a single request round trip
    pub timeout: Duration,
}

impl Config {
    pub fn new(
        credentials: Credentials,
        region: Region,
    ) -> Self {
        Self {
            credentials,
            region,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(
        mut self,
        endpoint: impl AsRef<str>,
    ) -> Self {
        self.endpoint = Some(endpoint.as_ref().into());
        self
    }

    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`,
    /// `AWS_REGION` (or `AWS_DEFAULT_REGION`), `AWS_ENDPOINT_URL` and
    /// `DYNAMO_ITEMS_TIMEOUT_SECS` from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>
    ) -> Result<Self, ConfigError> {
        let var = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let mut credentials =
            Credentials::new(var("AWS_ACCESS_KEY_ID")?, var("AWS_SECRET_ACCESS_KEY")?);
        if let Ok(token) = var("AWS_SESSION_TOKEN") {
            credentials = credentials.with_session_token(token);
        }
        let region = match var("AWS_REGION").or_else(|_| var("AWS_DEFAULT_REGION")) {
            Ok(region) => region.parse()?,
            Err(_) => Region::default(),
        };
        let timeout = match var("DYNAMO_ITEMS_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(secs.clone()))?,
            ),
            Err(_) => DEFAULT_TIMEOUT,
        };
        Ok(Config {
            credentials,
            region,
            endpoint: var("AWS_ENDPOINT_URL").ok(),
            timeout,
        })
    }
}
