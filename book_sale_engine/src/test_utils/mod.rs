use serde_json::Value;

use crate::db_types::Document;

pub mod prepare_env;

pub fn doc(v: Value) -> Document {
    v.as_object().cloned().expect("test documents must be JSON objects")
}
