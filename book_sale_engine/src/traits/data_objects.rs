use std::fmt::Display;

use serde_json::Value;

use crate::db_types::{Document, DocumentId, ID_FIELD};

/// Selects documents by equality on top-level fields, and optionally by identifier.
///
/// All conditions must hold. An empty filter matches every document in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub id: Option<DocumentId>,
    pub fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self { id: Some(id), fields: vec![] }
    }

    pub fn field_eq<S: Into<String>, V: Into<Value>>(field: S, value: V) -> Self {
        Self::default().and(field, value)
    }

    pub fn and<S: Into<String>, V: Into<Value>>(mut self, field: S, value: V) -> Self {
        let field = field.into();
        let value = value.into();
        if field == ID_FIELD {
            if let Some(id) = value.as_str().and_then(|s| s.parse().ok()) {
                self.id = Some(id);
                return self;
            }
        }
        self.fields.push((field, value));
        self
    }

    /// Checks a single document against the filter.
    ///
    /// A `null` condition matches both an explicit `null` and a missing field.
    pub fn matches(&self, id: &DocumentId, doc: &Document) -> bool {
        if self.id.as_ref().is_some_and(|wanted| wanted != id) {
            return false;
        }
        self.fields.iter().all(|(field, value)| match (doc.get(field), value) {
            (None, Value::Null) => true,
            (Some(actual), expected) => json_eq(actual, expected),
            (None, _) => false,
        })
    }

    /// The document an upsert starts from when nothing matched: the filter's equality conditions.
    pub fn seed_document(&self) -> Document {
        self.fields.iter().cloned().collect()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut terms = Vec::with_capacity(self.fields.len() + 1);
        if let Some(id) = &self.id {
            terms.push(format!("{ID_FIELD}={id}"));
        }
        terms.extend(self.fields.iter().map(|(k, v)| format!("{k}={v}")));
        if terms.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", terms.join(", "))
        }
    }
}

// Numbers compare by value, so 10 and 10.0 are equal, but "10" and 10 are not.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// A set of top-level field assignments applied to a matching document.
///
/// The identifier is immutable, so `_id` is never part of a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: Document,
}

impl Patch {
    pub fn set(mut fields: Document) -> Self {
        fields.remove(ID_FIELD);
        Self { fields }
    }

    pub fn with<S: Into<String>, V: Into<Value>>(mut self, field: S, value: V) -> Self {
        let field = field.into();
        if field != ID_FIELD {
            self.fields.insert(field, value.into());
        }
        self
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    /// Applies the patch to `doc`, returning true if anything actually changed.
    pub fn apply_to(&self, doc: &mut Document) -> bool {
        let mut modified = false;
        for (k, v) in &self.fields {
            if doc.get(k) != Some(v) {
                doc.insert(k.clone(), v.clone());
                modified = true;
            }
        }
        modified
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert a new document when the filter matches nothing.
    pub upsert: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}
