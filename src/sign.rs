//! AWS Signature Version 4 (`AWS4-HMAC-SHA256`), the scheme KLS uses to
//! authenticate requests.
//!
//! Signing proceeds in four steps:
//!
//! 1. Create a canonical request
//! 2. Create the string to sign
//! 3. Derive the signing key from the secret, date, region and service
//! 4. Add the signature to the request headers

use crate::auth::Credentials;
use crate::compose::RequestDescriptor;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Hash of an empty payload.
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub const DATE_HEADER: &str = "X-Amz-Date";
pub const CONTENT_HASH_HEADER: &str = "X-Amz-Content-Sha256";

/// SigV4 signer bound to one set of credentials
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
}

impl SigV4Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign `descriptor` as of `timestamp`.
    ///
    /// Adds `Host`, `X-Amz-Date`, `X-Amz-Content-Sha256` and `Authorization`.
    /// Method, host, path and body are left untouched.
    pub fn sign(&self, mut descriptor: RequestDescriptor, timestamp: DateTime<Utc>) -> RequestDescriptor {
        let date_stamp = timestamp.format("%Y%m%d").to_string();
        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sha256_hex(&descriptor.body);

        descriptor.headers.retain(|k, _| !k.eq_ignore_ascii_case("authorization"));
        let host = descriptor.host.clone();
        descriptor.set_header("Host", host);
        descriptor.set_header(DATE_HEADER, amz_date.clone());
        descriptor.set_header(CONTENT_HASH_HEADER, payload_hash.clone());

        let headers = lowercase_headers(&descriptor.headers);
        let canonical = canonical_request(
            descriptor.method.as_str(),
            &canonical_uri(descriptor.pathname()),
            &canonical_query(descriptor.query()),
            &headers,
            &payload_hash,
        );

        let scope = credential_scope(&date_stamp, &descriptor.region, &descriptor.service);
        let to_sign = string_to_sign(&amz_date, &scope, &canonical);
        let key = signing_key(
            &self.credentials.secret_access_key,
            &date_stamp,
            &descriptor.region,
            &descriptor.service,
        );
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes()));

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key_id,
            scope,
            signed_header_names(&headers),
            signature
        );
        descriptor.set_header("Authorization", authorization);
        descriptor
    }
}

/// CanonicalRequest =
///   Method '\n' CanonicalURI '\n' CanonicalQuery '\n'
///   CanonicalHeaders '\n' SignedHeaders '\n' HexEncode(Hash(Payload))
pub fn canonical_request(
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        canonical_uri,
        canonical_query,
        canonical_headers(headers),
        signed_header_names(headers),
        payload_hash
    )
}

pub fn credential_scope(date_stamp: &str, region: &str, service: &str) -> String {
    format!("{}/{}/{}/aws4_request", date_stamp, region, service)
}

/// StringToSign = Algorithm '\n' RequestDateTime '\n' Scope '\n' Hash(CanonicalRequest)
pub fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request)
    )
}

/// kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")
pub fn signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_secret = format!("AWS4{}", secret);
    let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Path with every segment URI-encoded, slashes kept.
pub fn canonical_uri(pathname: &str) -> String {
    if pathname.is_empty() {
        return "/".to_string();
    }
    pathname
        .split('/')
        .map(|segment| {
            let decoded = urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string());
            urlencoding::encode(&decoded).into_owned()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Query pairs re-encoded per RFC 3986, then sorted by encoded key and value.
pub fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| {
            (
                urlencoding::encode(&k).into_owned(),
                urlencoding::encode(&v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn lowercase_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect()
}

fn canonical_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v))
        .collect()
}

fn signed_header_names(headers: &BTreeMap<String, String>) -> String {
    headers.keys().cloned().collect::<Vec<_>>().join(";")
}

pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
