//! Per-venue request signing. Each venue has its own auth scheme entirely;
//! there's no shared abstraction worth forcing here beyond the function
//! signature shape.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use uuid::Uuid;

use crate::errors::{Error, Result};

/// Build the `Authorization: Bearer <jwt>` header value for EX-A.
///
/// Payload is `{access_key, nonce}`, plus `query_hash`/`query_hash_alg` when
/// `params` is non-empty. The token is assembled by hand (header.payload.sig,
/// base64url without padding) rather than via a JWT crate, matching the
/// minimal claim set the venue actually accepts.
pub fn ex_a_bearer(
    access_key: &str,
    secret_key: &str,
    params: Option<&BTreeMap<String, String>>,
) -> Result<String> {
    let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
    let mut payload = serde_json::json!({
        "access_key": access_key,
        "nonce": Uuid::new_v4().to_string(),
    });
    if let Some(params) = params {
        if !params.is_empty() {
            let query = urlencode_sorted(params);
            let digest = Sha512::digest(query.as_bytes());
            payload["query_hash"] = serde_json::json!(hex::encode(digest));
            payload["query_hash_alg"] = serde_json::json!("SHA512");
        }
    }
    let signing_input = format!(
        "{}.{}",
        b64url_no_pad(header.to_string().as_bytes()),
        b64url_no_pad(payload.to_string().as_bytes())
    );
    let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
        .map_err(|e| Error::gateway("ex-a", format!("bad secret key: {e}")))?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    Ok(format!(
        "Bearer {}.{}",
        signing_input,
        b64url_no_pad(&signature)
    ))
}

/// Build the `Api-Key`/`Api-Sign`/`Api-Nonce` header triple for EX-B.
///
/// `signing_str` is `endpoint\0query\0nonce`; the digest is hex-encoded
/// HMAC-SHA512, then that hex *string* is base64-encoded again — an
/// idiosyncrasy of the venue, not a mistake, and load-bearing to keep.
pub fn ex_b_headers(
    access_key: &str,
    secret_key: &str,
    endpoint: &str,
    params: &BTreeMap<String, String>,
) -> Result<Vec<(String, String)>> {
    let nonce = chrono::Utc::now().timestamp_millis().to_string();
    let query = urlencode_sorted(params);
    let signing_str = format!("{endpoint}\0{query}\0{nonce}");
    let mut mac = Hmac::<Sha512>::new_from_slice(secret_key.as_bytes())
        .map_err(|e| Error::gateway("ex-b", format!("bad secret key: {e}")))?;
    mac.update(signing_str.as_bytes());
    let digest_hex = hex::encode(mac.finalize().into_bytes());
    let signature = BASE64.encode(digest_hex.as_bytes());
    Ok(vec![
        ("Api-Key".to_string(), access_key.to_string()),
        ("Api-Sign".to_string(), signature),
        ("Api-Nonce".to_string(), nonce),
        (
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ),
    ])
}

fn urlencode_sorted(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn b64url_no_pad(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ex_a_bearer_has_three_dot_separated_segments() {
        let token = ex_a_bearer("access", "secret", None).unwrap();
        let raw = token.strip_prefix("Bearer ").unwrap();
        assert_eq!(raw.split('.').count(), 3);
    }

    #[test]
    fn ex_a_bearer_with_params_adds_query_hash() {
        let mut params = BTreeMap::new();
        params.insert("market".to_string(), "KRW-BTC".to_string());
        let token = ex_a_bearer("access", "secret", Some(&params)).unwrap();
        let raw = token.strip_prefix("Bearer ").unwrap();
        let payload_b64 = raw.split('.').nth(1).unwrap();
        let payload_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload_b64)
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).unwrap();
        assert_eq!(payload["query_hash_alg"], "SHA512");
        assert!(payload["query_hash"].is_string());
    }

    #[test]
    fn ex_b_headers_include_all_four_fields() {
        let params = BTreeMap::new();
        let headers = ex_b_headers("access", "secret", "/info/balance", &params).unwrap();
        let keys: Vec<_> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"Api-Key"));
        assert!(keys.contains(&"Api-Sign"));
        assert!(keys.contains(&"Api-Nonce"));
        assert!(keys.contains(&"Content-Type"));
    }

    #[test]
    fn ex_b_signature_is_deterministic_for_fixed_nonce() {
        let mut params = BTreeMap::new();
        params.insert("currency".to_string(), "BTC".to_string());
        let query = urlencode_sorted(&params);
        let signing_str = format!("/info/balance\0{query}\0123");
        let mut mac1 = Hmac::<Sha512>::new_from_slice(b"secret").unwrap();
        mac1.update(signing_str.as_bytes());
        let mut mac2 = Hmac::<Sha512>::new_from_slice(b"secret").unwrap();
        mac2.update(signing_str.as_bytes());
        assert_eq!(mac1.finalize().into_bytes(), mac2.finalize().into_bytes());
    }
}
