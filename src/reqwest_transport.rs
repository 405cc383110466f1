use crate::{Request, Transport};
use reqwest::blocking::Client;
use std::{error::Error, time::Duration};

/// A blocking [`Transport`] backed by reqwest
///
/// The configured timeout bounds each round trip; it is the only way an
/// in-flight operation gets cancelled.
pub struct Reqwest {
    client: Client,
}

impl Default for Reqwest {
    fn default() -> Self {
        Self::new()
    }
}

impl Reqwest {
    /// A client with reqwest's default 30 second timeout
    pub fn new() -> Self {
        Reqwest {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Reqwest {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

impl Transport for Reqwest {
    fn send(
        &self,
        signed: Request,
    ) -> Result<(u16, String), Box<dyn Error + Send + Sync>> {
        let (parts, body) = signed.into_parts();
        let resp = self
            .client
            .post(parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()?;
        Ok((resp.status().as_u16(), resp.text()?))
    }
}
