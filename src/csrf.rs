//! Anti-forgery tokens for the submission form.
//!
//! Every browser gets a random client id in the [`CLIENT_COOKIE`] cookie. A
//! token is `<issued_at>.<nonce>.<signature>` where the signature is the hex
//! HMAC-SHA256 of `<client_id>.<issued_at>.<nonce>` under the configured
//! secret key, so a token only verifies alongside the cookie it was issued
//! for. Tokens expire after [`TOKEN_TTL_SECS`].

use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_TTL_SECS: u64 = 3600;
pub const CLIENT_COOKIE: &str = "cafe_csrf";

#[derive(Debug, Error, PartialEq)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF session token is missing.")]
    SessionMissing,
    #[error("The CSRF token is invalid.")]
    Invalid,
    #[error("The CSRF token has expired.")]
    Expired,
}

fn random_hex() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The client id sent with the request, if any.
pub fn client_id(req: &HttpRequest) -> Option<String> {
    req.cookie(CLIENT_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}

/// The request's client id, or a fresh one for a browser that has none yet.
pub fn client_id_or_new(req: &HttpRequest) -> String {
    client_id(req).unwrap_or_else(random_hex)
}

pub fn client_cookie(client_id: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(CLIENT_COOKIE, client_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[derive(Clone)]
pub struct CsrfSigner {
    key: Vec<u8>,
}

impl CsrfSigner {
    pub fn new(secret_key: &str) -> Self {
        Self {
            key: secret_key.as_bytes().to_vec(),
        }
    }

    pub fn issue(&self, client_id: &str) -> String {
        self.issue_at(client_id, unix_now())
    }

    pub fn verify(&self, token: &str, client_id: Option<&str>) -> Result<(), CsrfError> {
        self.verify_at(token, client_id, unix_now())
    }

    fn issue_at(&self, client_id: &str, issued_at: u64) -> String {
        let payload = format!("{issued_at}.{}", random_hex());
        let signature = hex::encode(self.mac(client_id, &payload).finalize().into_bytes());
        format!("{payload}.{signature}")
    }

    fn verify_at(&self, token: &str, client_id: Option<&str>, now: u64) -> Result<(), CsrfError> {
        if token.is_empty() {
            return Err(CsrfError::Missing);
        }
        let client_id = client_id.ok_or(CsrfError::SessionMissing)?;

        let (payload, signature) = token.rsplit_once('.').ok_or(CsrfError::Invalid)?;
        let (issued_at, _nonce) = payload.split_once('.').ok_or(CsrfError::Invalid)?;
        let signature = hex::decode(signature).map_err(|_| CsrfError::Invalid)?;

        self.mac(client_id, payload)
            .verify_slice(&signature)
            .map_err(|_| CsrfError::Invalid)?;

        let issued_at: u64 = issued_at.parse().map_err(|_| CsrfError::Invalid)?;
        if now.saturating_sub(issued_at) > TOKEN_TTL_SECS {
            return Err(CsrfError::Expired);
        }

        Ok(())
    }

    fn mac(&self, client_id: &str, payload: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(client_id.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn issued_token_verifies_for_its_client() {
        let signer = CsrfSigner::new("secret");
        let token = signer.issue("client-a");
        assert_eq!(signer.verify(&token, Some("client-a")), Ok(()));
    }

    #[test]
    fn token_is_bound_to_the_client() {
        let signer = CsrfSigner::new("secret");
        let token = signer.issue("client-a");

        assert_eq!(signer.verify(&token, Some("client-b")), Err(CsrfError::Invalid));
        assert_eq!(signer.verify(&token, None), Err(CsrfError::SessionMissing));
    }

    #[test]
    fn tokens_are_unique() {
        let signer = CsrfSigner::new("secret");
        assert_ne!(signer.issue("c"), signer.issue("c"));
    }

    #[test]
    fn empty_token_is_missing() {
        let signer = CsrfSigner::new("secret");
        assert_eq!(signer.verify("", Some("c")), Err(CsrfError::Missing));
    }

    #[test]
    fn token_from_another_key_is_invalid() {
        let token = CsrfSigner::new("other").issue("c");
        assert_eq!(
            CsrfSigner::new("secret").verify(&token, Some("c")),
            Err(CsrfError::Invalid)
        );
    }

    #[test]
    fn tampered_token_is_invalid() {
        let signer = CsrfSigner::new("secret");
        let token = signer.issue_at("c", 1_000);
        let forged = token.replacen("1000", "9000", 1);

        assert_eq!(signer.verify_at(&forged, Some("c"), 1_000), Err(CsrfError::Invalid));
        assert_eq!(signer.verify_at("garbage", Some("c"), 1_000), Err(CsrfError::Invalid));
    }

    #[test]
    fn old_token_expires() {
        let signer = CsrfSigner::new("secret");
        let token = signer.issue_at("c", 1_000);

        assert_eq!(signer.verify_at(&token, Some("c"), 1_000 + TOKEN_TTL_SECS), Ok(()));
        assert_eq!(
            signer.verify_at(&token, Some("c"), 1_001 + TOKEN_TTL_SECS),
            Err(CsrfError::Expired)
        );
    }

    #[test]
    fn client_id_comes_from_the_cookie() {
        let req = TestRequest::default()
            .cookie(client_cookie("abc123"))
            .to_http_request();
        assert_eq!(client_id(&req).as_deref(), Some("abc123"));
        assert_eq!(client_id_or_new(&req), "abc123");

        let bare = TestRequest::default().to_http_request();
        assert_eq!(client_id(&bare), None);
        assert_eq!(client_id_or_new(&bare).len(), 32);
    }
}
