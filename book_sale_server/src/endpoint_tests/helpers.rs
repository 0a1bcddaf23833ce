use std::sync::Arc;

use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
pub use book_sale_engine::test_utils::doc;
use book_sale_engine::{
    test_utils::prepare_env::{prepare_test_db, random_db_url},
    ResourceStore,
    SqliteDatabase,
};
use chrono::{DateTime, Days, Utc};
use log::debug;
use serde_json::Value;
use tari_jwt::{
    jwt_compact::{AlgorithmExt, Claims, Header},
    tari_crypto::{
        ristretto::{RistrettoPublicKey, RistrettoSecretKey},
        tari_utilities::hex::Hex,
    },
    Ristretto256,
    Ristretto256SigningKey,
    Ristretto256VerifyingKey,
};

use crate::{
    auth::{IdentityClaims, IdentityVerifier, JwtIdentityVerifier},
    config::AuthConfig,
    server::configure_app,
};

const TEST_SIGNING_KEY: &str = "925842e11914fdd0c9a2ab8a38dac9de57b3e392372cde1661b1a84b1d8e430e";
const TEST_VERIFICATION_KEY: &str = "b4db54f75421a02b0d0056fb7203df23c742b25e41283976bdaa7fe63de1ad23";

// Creates a test `AuthConfig` for verifying tokens. DO NOT re-use these keys anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        verification_key: Ristretto256VerifyingKey(RistrettoPublicKey::from_hex(TEST_VERIFICATION_KEY).unwrap()),
    }
}

fn signing_key() -> Ristretto256SigningKey {
    Ristretto256SigningKey(RistrettoSecretKey::from_hex(TEST_SIGNING_KEY).unwrap())
}

pub fn issue_token(claims: IdentityClaims, expiry: DateTime<Utc>) -> String {
    let header = Header::empty().with_token_type("JWT");
    let mut claims = Claims::new(claims);
    claims.expiration = Some(expiry);
    Ristretto256.token(&header, &claims, &signing_key()).expect("Failed to sign token")
}

pub fn issue_token_without_expiry(claims: IdentityClaims) -> String {
    let header = Header::empty().with_token_type("JWT");
    let claims = Claims::new(claims);
    Ristretto256.token(&header, &claims, &signing_key()).expect("Failed to sign token")
}

/// A valid token for `email` that expires tomorrow.
pub fn token_for(email: &str) -> String {
    issue_token(IdentityClaims::new(email), Utc::now() + Days::new(1))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub async fn test_db() -> SqliteDatabase {
    prepare_test_db(&random_db_url()).await
}

/// Sends `req` to an app configured exactly like the live server, backed by `db`.
pub async fn send<B>(db: B, req: TestRequest) -> (StatusCode, String)
where B: ResourceStore + Clone + 'static {
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(&get_auth_config()));
    let verifier = web::Data::from(verifier);
    let app = App::new().configure(|cfg| configure_app(cfg, db, verifier));
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Like [`send`], but parses the response body as JSON.
pub async fn send_json<B>(db: B, req: TestRequest) -> (StatusCode, Value)
where B: ResourceStore + Clone + 'static {
    let (status, body) = send(db, req).await;
    let value = serde_json::from_str(&body).unwrap_or_else(|e| panic!("Response was not JSON ({e}): {body}"));
    (status, value)
}
