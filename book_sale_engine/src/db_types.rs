use std::{
    fmt::Display,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tari_crypto::tari_utilities::hex::{from_hex, to_hex};
use thiserror::Error;

/// The key under which a document's identifier is exposed to clients.
pub const ID_FIELD: &str = "_id";

/// A schemaless document. Every collection stores these, and handlers pass them through untouched.
pub type Document = Map<String, Value>;

//--------------------------------------     DocumentId       ---------------------------------------------------------
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentIdError {
    #[error("Document id must be {expected} hex characters long, but was {0}", expected = DocumentId::HEX_LEN)]
    InvalidLength(usize),
    #[error("Document id contains a non-hex character: {0}")]
    InvalidCharacter(char),
    #[error("Document id is not valid hex. {0}")]
    Malformed(String),
}

/// Store-assigned identifier for a document.
///
/// The 12 bytes are laid out as a 4-byte big-endian unix timestamp, 5 random bytes and a 3-byte counter, so ids
/// generated by one process sort roughly by creation time. The external form is 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; 12]);

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

impl DocumentId {
    pub const HEX_LEN: usize = 24;

    pub fn new() -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let timestamp = Utc::now().timestamp() as u32;
        let noise = rand::random::<[u8; 5]>();
        let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&noise);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(DocumentIdError::InvalidLength(s.chars().count()));
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(DocumentIdError::InvalidCharacter(c));
        }
        let decoded = from_hex(s).map_err(|e| DocumentIdError::Malformed(e.to_string()))?;
        let bytes = <[u8; 12]>::try_from(decoded.as_slice()).map_err(|_| DocumentIdError::InvalidLength(s.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//--------------------------------------     Collection       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Books,
    Orders,
    Reviews,
}

impl Collection {
    /// The name the collection is stored under. Reviews have always lived in the singular `review` collection.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Books => "books",
            Collection::Orders => "orders",
            Collection::Reviews => "review",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//--------------------------------------        Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Regular,
    Admin,
}

#[derive(Debug, Clone, Error)]
#[error("Invalid role: {0}")]
pub struct RoleParseError(String);

impl Role {
    /// The field on a user document that holds the role.
    pub const FIELD: &'static str = "role";

    /// Reads the role off a user document. A missing or unrecognised role is [`Role::Regular`].
    pub fn of(user: &Document) -> Self {
        user.get(Self::FIELD).and_then(Value::as_str).and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "admin" => Ok(Self::Admin),
            s => Err(RoleParseError(s.to_string())),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Regular => f.write_str("regular"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

//--------------------------------------      Principal       ---------------------------------------------------------
/// A verified identity, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub email: String,
}

impl Principal {
    pub fn new<S: Into<String>>(email: S) -> Self {
        Self { email: email.into() }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.email)
    }
}

//--------------------------------------      Receipts        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertReceipt {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

impl InsertReceipt {
    pub fn new(inserted_id: DocumentId) -> Self {
        Self { acknowledged: true, inserted_id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReceipt {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<DocumentId>,
}

impl UpdateReceipt {
    pub fn no_match() -> Self {
        Self { acknowledged: true, ..Default::default() }
    }

    pub fn matched(modified: bool) -> Self {
        Self { acknowledged: true, matched_count: 1, modified_count: u64::from(modified), ..Default::default() }
    }

    pub fn upserted(id: DocumentId) -> Self {
        Self { acknowledged: true, upserted_count: 1, upserted_id: Some(id), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReceipt {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteReceipt {
    pub fn new(deleted_count: u64) -> Self {
        Self { acknowledged: true, deleted_count }
    }
}
