//! Sqlite database operations for schemaless documents.
//!
//! Generally clients should never call these methods directly, and prefer to use the [`ResourceStore`] trait methods
//! that are implemented on the [`SqliteDatabase`] struct instead.
//!
//! [`ResourceStore`]: crate::traits::ResourceStore
//! [`SqliteDatabase`]: crate::SqliteDatabase
use log::{error, trace};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::{
    db_types::{Collection, Document, DocumentId, ID_FIELD},
    traits::{Filter, StoreError},
};

/// Inserts `doc` under the given id. The `_id` key, if present, is not stored in the body.
pub async fn insert_document(
    collection: Collection,
    id: &DocumentId,
    doc: &Document,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    let body = body_json(doc)?;
    sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
        .bind(collection.name())
        .bind(id.to_hex())
        .bind(body)
        .execute(conn)
        .await?;
    trace!("🗃️ Inserted document {id} into {collection}");
    Ok(())
}

/// Returns the earliest inserted document matching the filter, along with its id.
pub async fn fetch_first(
    collection: Collection,
    filter: &Filter,
    conn: &mut SqliteConnection,
) -> Result<Option<(DocumentId, Document)>, StoreError> {
    let mut qb = QueryBuilder::new("SELECT id, body FROM documents");
    push_filter(&mut qb, collection, filter);
    qb.push(" ORDER BY seq LIMIT 1");
    let row = qb.build().fetch_optional(conn).await?;
    row.map(|r| decode_row(&r)).transpose()
}

/// Returns every document matching the filter, with `_id` injected.
pub async fn fetch_all(
    collection: Collection,
    filter: &Filter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Document>, StoreError> {
    let mut qb = QueryBuilder::new("SELECT id, body FROM documents");
    push_filter(&mut qb, collection, filter);
    qb.push(" ORDER BY seq");
    let rows = qb.build().fetch_all(conn).await?;
    rows.iter().map(|r| decode_row(r).map(|(id, doc)| with_id(id, doc))).collect()
}

/// Overwrites the body of an existing document.
pub async fn replace_body(
    collection: Collection,
    id: &DocumentId,
    doc: &Document,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let body = body_json(doc)?;
    let result = sqlx::query("UPDATE documents SET body = $1 WHERE collection = $2 AND id = $3")
        .bind(body)
        .bind(collection.name())
        .bind(id.to_hex())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes the earliest inserted document matching the filter, returning the number of rows removed (0 or 1).
pub async fn delete_first(
    collection: Collection,
    filter: &Filter,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let mut qb = QueryBuilder::new("DELETE FROM documents WHERE seq IN (SELECT seq FROM documents");
    push_filter(&mut qb, collection, filter);
    qb.push(" ORDER BY seq LIMIT 1)");
    let result = qb.build().execute(conn).await?;
    Ok(result.rows_affected())
}

pub fn with_id(id: DocumentId, mut doc: Document) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
    doc
}

fn body_json(doc: &Document) -> Result<String, StoreError> {
    if doc.contains_key(ID_FIELD) {
        let mut body = doc.clone();
        body.remove(ID_FIELD);
        Ok(serde_json::to_string(&body)?)
    } else {
        Ok(serde_json::to_string(doc)?)
    }
}

fn decode_row(row: &SqliteRow) -> Result<(DocumentId, Document), StoreError> {
    let id: String = row.try_get("id")?;
    let body: String = row.try_get("body")?;
    let id = id.parse::<DocumentId>().map_err(|e| {
        error!("🗃️ Document with id '{id}' has an invalid identifier. {e}");
        StoreError::CorruptDocument(e.to_string())
    })?;
    let doc = serde_json::from_str::<Document>(&body).map_err(|e| {
        error!("🗃️ Document {id} does not hold a JSON object. {e}");
        StoreError::CorruptDocument(e.to_string())
    })?;
    Ok((id, doc))
}

// Each equality condition checks the JSON type as well as the value, so that "10" never matches 10. A null condition
// also matches documents where the field is missing, since json_type returns NULL for absent paths.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, collection: Collection, filter: &Filter) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.name());
    if let Some(id) = &filter.id {
        qb.push(" AND id = ");
        qb.push_bind(id.to_hex());
    }
    for (field, value) in &filter.fields {
        qb.push(" AND (");
        match value {
            Value::Null => {
                qb.push("coalesce(json_type(body, ");
                push_path(qb, field);
                qb.push("), 'null') = 'null'");
            },
            Value::Bool(b) => {
                qb.push("json_type(body, ");
                push_path(qb, field);
                qb.push(if *b { ") = 'true'" } else { ") = 'false'" });
            },
            Value::Number(n) => {
                qb.push("json_type(body, ");
                push_path(qb, field);
                qb.push(") IN ('integer', 'real') AND json_extract(body, ");
                push_path(qb, field);
                qb.push(") = ");
                match n.as_i64() {
                    Some(i) => qb.push_bind(i),
                    None => qb.push_bind(n.as_f64().unwrap_or(f64::NAN)),
                };
            },
            Value::String(s) => {
                qb.push("json_type(body, ");
                push_path(qb, field);
                qb.push(") = 'text' AND json_extract(body, ");
                push_path(qb, field);
                qb.push(") = ");
                qb.push_bind(s.clone());
            },
            Value::Array(_) | Value::Object(_) => {
                let json_type = if value.is_array() { "array" } else { "object" };
                qb.push("json_type(body, ");
                push_path(qb, field);
                qb.push(format!(") = '{json_type}' AND json_extract(body, "));
                push_path(qb, field);
                qb.push(") = json(");
                qb.push_bind(value.to_string());
                qb.push(")");
            },
        }
        qb.push(")");
    }
}

// Plain field names are written into the SQL as literals so that the expression indexes on `email` and `userEmail`
// can be used. Anything else is bound as a parameter.
fn push_path(qb: &mut QueryBuilder<'_, Sqlite>, field: &str) {
    let is_plain = !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_plain {
        qb.push(format!("'$.\"{field}\"'"));
    } else {
        qb.push_bind(format!("$.\"{}\"", field.replace('"', "\\\"")));
    }
}
