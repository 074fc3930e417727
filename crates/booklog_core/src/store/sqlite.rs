//! SQLite-backed document collection.
//!
//! # Responsibility
//! - Persist JSON documents for one named collection in `documents`.
//! - Evaluate [`Filter`] predicates over decoded documents.
//!
//! # Invariants
//! - Every stored body is a JSON object carrying its `_id`.
//! - Scans are ordered by `seq`, so store order is insertion order.

use super::{
    Document, DocumentCollection, DocumentId, Filter, StoreError, StoreResult, DOCUMENT_ID_FIELD,
};
use log::debug;
use rusqlite::{params, Connection};
use serde_json::Value;
use uuid::Uuid;

/// One named collection stored in a SQLite connection.
pub struct SqliteCollection<'conn> {
    conn: &'conn Connection,
    name: String,
}

struct StoredDocument {
    seq: i64,
    document: Document,
}

impl<'conn> SqliteCollection<'conn> {
    pub fn new(conn: &'conn Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn insert_with(
        conn: &Connection,
        collection: &str,
        document: &Document,
    ) -> StoreResult<DocumentId> {
        let mut stored = document.clone();
        let id = match stored.get(DOCUMENT_ID_FIELD) {
            Some(Value::String(existing)) => existing.clone(),
            _ => {
                let generated = Uuid::new_v4().to_string();
                stored.insert(
                    DOCUMENT_ID_FIELD.to_string(),
                    Value::String(generated.clone()),
                );
                generated
            }
        };
        let body = serde_json::to_string(&stored)?;

        conn.execute(
            "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3);",
            params![id, collection, body],
        )?;
        Ok(id)
    }

    fn scan(&self) -> StoreResult<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, body
             FROM documents
             WHERE collection = ?1
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([self.name.as_str()])?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            let seq: i64 = row.get("seq")?;
            let body: String = row.get("body")?;
            documents.push(StoredDocument {
                seq,
                document: parse_body(seq, &body)?,
            });
        }

        Ok(documents)
    }
}

impl DocumentCollection for SqliteCollection<'_> {
    fn insert_one(&self, document: &Document) -> StoreResult<DocumentId> {
        let id = Self::insert_with(self.conn, &self.name, document)?;
        debug!(
            "event=doc_insert module=store status=ok collection={} count=1",
            self.name
        );
        Ok(id)
    }

    fn insert_many(&self, documents: &[Document]) -> StoreResult<Vec<DocumentId>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(Self::insert_with(&tx, &self.name, document)?);
        }
        tx.commit()?;

        debug!(
            "event=doc_insert module=store status=ok collection={} count={}",
            self.name,
            ids.len()
        );
        Ok(ids)
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<usize> {
        let Some(target) = self
            .scan()?
            .into_iter()
            .find(|stored| filter.matches(&stored.document))
        else {
            debug!(
                "event=doc_delete module=store status=ok collection={} deleted=0",
                self.name
            );
            return Ok(0);
        };

        let deleted = self
            .conn
            .execute("DELETE FROM documents WHERE seq = ?1;", [target.seq])?;
        debug!(
            "event=doc_delete module=store status=ok collection={} deleted={}",
            self.name, deleted
        );
        Ok(deleted)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|stored| filter.matches(&stored.document))
            .map(|stored| stored.document)
            .collect())
    }

    fn count_documents(&self, filter: &Filter) -> StoreResult<u64> {
        if matches!(filter, Filter::All) {
            let count = self.conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
                [self.name.as_str()],
                |row| row.get::<_, i64>(0),
            )?;
            return u64::try_from(count).map_err(|_| {
                StoreError::InvalidData(format!("negative document count `{count}`"))
            });
        }

        let count = self
            .scan()?
            .iter()
            .filter(|stored| filter.matches(&stored.document))
            .count();
        Ok(count as u64)
    }
}

fn parse_body(seq: i64, body: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(StoreError::InvalidData(format!(
            "document seq={seq} is not an object (found {})",
            json_kind(&other)
        ))),
        Err(err) => Err(StoreError::InvalidData(format!(
            "document seq={seq} is not valid JSON: {err}"
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
