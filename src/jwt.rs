//! Client-side JWT claim decoding
//!
//! Signatures are not verified here; the backend is the authority. The client
//! only reads the payload to know who is signed in and when the token lapses.

use crate::error::{ClientError, Result};
use crate::types::UserPayload;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// The only claim the expiry check needs. NumericDate may be fractional.
#[derive(Deserialize)]
struct Expiry {
    exp: f64,
}

/// Decode the claims segment of a compact JWT
pub fn decode_claims(token: &str) -> Result<UserPayload> {
    decode_payload(token)
}

fn decode_payload<T: DeserializeOwned>(token: &str) -> Result<T> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => {
            return Err(ClientError::InvalidToken(
                "JWT must have three dot-separated segments".to_string(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::InvalidToken(format!("payload is not valid claims: {e}")))
}

/// Expiry check against `now_secs`
///
/// Missing or undecodable tokens count as expired.
pub fn is_token_expired(token: Option<&str>, now_secs: i64) -> bool {
    let Some(token) = token else {
        return true;
    };

    match decode_payload::<Expiry>(token) {
        Ok(claims) if claims.exp.is_finite() => claims.exp <= now_secs as f64,
        _ => true,
    }
}

/// Expiry check against the wall clock
pub fn is_expired_now(token: Option<&str>) -> bool {
    is_token_expired(token, now_secs())
}

pub(crate) fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use super::*;

    /// Unsigned-looking compact JWT carrying the given claims
    pub fn make_token(id: i64, name: &str, iat: i64, exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = serde_json::json!({ "id": id, "name": name, "iat": iat, "exp": exp });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }
}
