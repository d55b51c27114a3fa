//! Typed document wrapper for Diesel JSONB columns.
//!
//! Collections keep their records as schemaless JSONB documents. `Document<T>`
//! gives those columns a Rust type at the database boundary while leaving the
//! stored shape free-form.

use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Jsonb;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::ops::{Deref, DerefMut};

/// JSONB binary format version written before the document text.
const JSONB_VERSION: u8 = 1;

/// A value stored as a JSONB document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(transparent)]
#[diesel(sql_type = Jsonb)]
pub struct Document<T>(pub T);

impl<T> Document<T> {
    pub fn new(value: T) -> Self {
        Document(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Document<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Document<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<T> for Document<T> {
    fn from(value: T) -> Self {
        Document(value)
    }
}

impl<T> FromSql<Jsonb, Pg> for Document<T>
where
    T: DeserializeOwned,
{
    fn from_sql(bytes: PgValue<'_>) -> diesel::deserialize::Result<Self> {
        let value = <serde_json::Value as FromSql<Jsonb, Pg>>::from_sql(bytes)?;
        let inner: T = serde_json::from_value(value)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
        Ok(Document(inner))
    }
}

impl<T> ToSql<Jsonb, Pg> for Document<T>
where
    T: Serialize + fmt::Debug,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        out.write_all(&[JSONB_VERSION])?;
        serde_json::to_writer(out, &self.0)?;
        Ok(IsNull::No)
    }
}
