//! AWS Signature Version 4 for DynamoDB requests
//!
//! DynamoDB requests are always `POST /` with no query string, so the canonical
//! request only varies in its headers and payload.

use crate::{config::Credentials, error::ServiceError, Request};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac, NewMac};
use http::{
    header::{HeaderName, AUTHORIZATION, CONTENT_LENGTH},
    HeaderMap, HeaderValue,
};
use sha2::{Digest, Sha256};

const SHORT_DATE: &str = "%Y%m%d";
const LONG_DATETIME: &str = "%Y%m%dT%H%M%SZ";
const SERVICE: &str = "dynamodb";
const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

type HmacSha256 = Hmac<Sha256>;

fn hmac(
    key: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, ServiceError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| ServiceError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    let mut sha = Sha256::default();
    sha.update(data);
    hex::encode(sha.finalize().as_slice())
}

fn scope(
    datetime: &DateTime<Utc>,
    region: &str,
    service: &str,
) -> String {
    format!(
        "{date}/{region}/{service}/aws4_request",
        date = datetime.format(SHORT_DATE),
        region = region,
        service = service
    )
}

/// Derives the key for a single day, region and service
pub(crate) fn signing_key(
    datetime: &DateTime<Utc>,
    secret_key: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, ServiceError> {
    [region.as_bytes(), service.as_bytes(), b"aws4_request"]
        .iter()
        .try_fold(
            hmac(
                &[b"AWS4", secret_key.as_bytes()].concat(),
                datetime.format(SHORT_DATE).to_string().as_bytes(),
            )?,
            |key, next| hmac(&key, next),
        )
}

/// Only headers whose values make it into the canonical header string are named here
fn signed_header_string(headers: &HeaderMap) -> String {
    let mut keys = headers
        .iter()
        .filter(|(_, value)| value.to_str().is_ok())
        .map(|(key, _)| key.as_str().to_lowercase())
        .collect::<Vec<_>>();
    keys.sort();
    keys.dedup();
    keys.join(";")
}

fn canonical_header_string(headers: &HeaderMap) -> String {
    let mut lines = headers
        .iter()
        .filter_map(|(key, value)| {
            // non-visible-ascii values can't be signed, AWS would reject them anyway
            value
                .to_str()
                .ok()
                .map(|value| format!("{}:{}", key.as_str().to_lowercase(), value.trim()))
        })
        .collect::<Vec<_>>();
    lines.sort();
    lines.join("\n")
}

fn canonical_request(
    method: &str,
    headers: &HeaderMap,
    body_digest: &str,
) -> String {
    format!(
        "{method}\n/\n\n{headers}\n\n{signed_headers}\n{body_digest}",
        method = method,
        headers = canonical_header_string(headers),
        signed_headers = signed_header_string(headers),
        body_digest = body_digest
    )
}

fn string_to_sign(
    datetime: &DateTime<Utc>,
    region: &str,
    canonical_request: &str,
) -> String {
    format!(
        "AWS4-HMAC-SHA256\n{timestamp}\n{scope}\n{hash}",
        timestamp = datetime.format(LONG_DATETIME),
        scope = scope(datetime, region, SERVICE),
        hash = sha256_hex(canonical_request.as_bytes())
    )
}

/// Signs `unsigned` as of `now`, adding the date, token, payload hash,
/// content length and authorization headers
pub(crate) fn sign(
    credentials: &Credentials,
    region: &str,
    now: DateTime<Utc>,
    mut unsigned: Request,
) -> Result<Request, ServiceError> {
    let body_digest = sha256_hex(unsigned.body());
    let headers = unsigned.headers_mut();
    headers.insert(
        HeaderName::from_static(X_AMZ_DATE),
        now.format(LONG_DATETIME).to_string().parse()?,
    );
    if let Some(token) = credentials.session_token() {
        headers.insert(
            HeaderName::from_static(X_AMZ_SECURITY_TOKEN),
            HeaderValue::from_str(token)?,
        );
    }

    let canonical_request = canonical_request(
        unsigned.method().as_str(),
        unsigned.headers(),
        &body_digest,
    );
    let signature = hex::encode(hmac(
        &signing_key(&now, credentials.secret_access_key(), region, SERVICE)?,
        string_to_sign(&now, region, &canonical_request).as_bytes(),
    )?);
    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={access_key}/{scope}, \
         SignedHeaders={signed_headers}, Signature={signature}",
        access_key = credentials.access_key_id(),
        scope = scope(&now, region, SERVICE),
        signed_headers = signed_header_string(unsigned.headers()),
        signature = signature
    );
    let content_length = unsigned.body().len();

    let headers = unsigned.headers_mut();
    headers.insert(AUTHORIZATION, authorization.parse()?);
    headers.insert(CONTENT_LENGTH, content_length.into());
    headers.insert(
        HeaderName::from_static(X_AMZ_CONTENT_SHA256),
        body_digest.parse()?,
    );

    Ok(unsigned)
}
