use std::{env, fmt::Display, io::Write, str::FromStr};

use log::*;
use rand::thread_rng;
use serde_json::json;
use tari_jwt::{
    tari_crypto::{keys::PublicKey, ristretto::RistrettoPublicKey, tari_utilities::hex::Hex},
    Ristretto256VerifyingKey,
};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_BSS_HOST: &str = "127.0.0.1";
const DEFAULT_BSS_PORT: u16 = 7000;
const DEFAULT_DATABASE_URL: &str = "sqlite://book_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The size of the database connection pool.
    pub max_connections: u32,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BSS_HOST.to_string(),
            port: DEFAULT_BSS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BSS_HOST").ok().unwrap_or_else(|| DEFAULT_BSS_HOST.into());
        let port = parse_or_default("BSS_PORT", DEFAULT_BSS_PORT);
        let database_url = env::var("BSS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ BSS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = parse_or_default("BSS_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the identity verification key from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        Self { host, port, database_url, max_connections, auth }
    }
}

fn parse_or_default<T>(var: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    env::var(var)
        .map(|s| {
            s.parse::<T>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
                default
            })
        })
        .ok()
        .unwrap_or(default)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The public key used to verify identity tokens. It must be in hex format and be a valid Ristretto public key.
    pub verification_key: Ristretto256VerifyingKey,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The identity verification key has not been set. I'm using a random value for this session. DO \
             NOT operate on production like this since no real identity provider can sign tokens for it. 🚨️🚨️🚨️"
        );
        let mut rng = thread_rng();
        let (sk, pk) = RistrettoPublicKey::random_keypair(&mut rng);
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({
                    "id_signing_key": sk.to_hex(),
                    "id_verification_key": pk.to_hex(),
                })
                .to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The identity signing key for this session was written to {}. If this is a \
                         production instance, you are doing it wrong! Set the BSS_ID_VERIFICATION_KEY environment \
                         variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the identity signing key to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the identity signing key. ");
            },
        }
        Self { verification_key: Ristretto256VerifyingKey(pk) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let pk_hex = env::var("BSS_ID_VERIFICATION_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [BSS_ID_VERIFICATION_KEY]")))?;
        Self::from_hex(&pk_hex)
    }

    pub fn from_hex(pk_hex: &str) -> Result<Self, ServerError> {
        let pk = RistrettoPublicKey::from_hex(pk_hex.trim()).map_err(|e| {
            ServerError::ConfigurationError(format!("Invalid verification key in BSS_ID_VERIFICATION_KEY: {e}"))
        })?;
        Ok(Self { verification_key: Ristretto256VerifyingKey(pk) })
    }
}
