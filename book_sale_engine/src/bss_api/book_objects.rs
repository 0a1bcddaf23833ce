use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::Patch;

/// The fields of a book that a replace request overwrites.
///
/// Fields left out of the request are written as `null`, so a replace always touches all five. Values are stored as
/// sent, whatever their JSON type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: Option<Value>,
    pub author: Option<Value>,
    pub publisher: Option<Value>,
    pub price: Option<Value>,
    pub description: Option<Value>,
}

impl BookDetails {
    pub fn to_patch(&self) -> Patch {
        let or_null = |v: &Option<Value>| v.clone().unwrap_or(Value::Null);
        Patch::default()
            .with("title", or_null(&self.title))
            .with("author", or_null(&self.author))
            .with("publisher", or_null(&self.publisher))
            .with("price", or_null(&self.price))
            .with("description", or_null(&self.description))
    }
}
