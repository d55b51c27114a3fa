//! PostgreSQL-backed document store.
//!
//! Each collection is a table of JSONB documents keyed by an opaque text id.
//! Connections come from a deadpool pool over rustls-secured tokio-postgres
//! clients.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{
        deadpool::{Object, Pool},
        AsyncDieselConnectionManager, ManagerConfig,
    },
    AsyncPgConnection, RunQueryDsl,
};
use shared_types::{
    CreateApplicationRequest, CreateJobRequest, Document, InsertAck, Job, JobApplication,
};

use crate::models::{ApplicationRow, JobRow, NewApplication, NewJob};

use super::{new_document_id, DocumentStore, StoreError, StoreResult};

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    // Set up rustls TLS configuration
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

/// Document store over a PostgreSQL connection pool.
///
/// The pool is cheap to clone and safe to share between requests.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn connect(database_url: &str) -> StoreResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup =
            Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

        let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            database_url,
            manager_config,
        );
        let pool = Pool::builder(config)
            .max_size(10)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn conn(&self) -> StoreResult<Object<AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }

    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        use crate::schema::jobs::dsl::*;

        let mut conn = self.conn().await?;
        let rows = jobs
            .order_by((created_at.asc(), id.asc()))
            .select(JobRow::as_select())
            .load::<JobRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_job(&self, job_id: &str) -> StoreResult<Option<Job>> {
        use crate::schema::jobs::dsl::*;

        let mut conn = self.conn().await?;
        let row = jobs
            .filter(id.eq(job_id))
            .select(JobRow::as_select())
            .first::<JobRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Into::into))
    }

    async fn get_jobs_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Job>> {
        use crate::schema::jobs::dsl::*;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;
        let rows = jobs
            .filter(id.eq_any(ids))
            .select(JobRow::as_select())
            .load::<JobRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_job(&self, job: CreateJobRequest) -> StoreResult<InsertAck> {
        use crate::schema::jobs::dsl::*;

        let new_job = NewJob {
            id: new_document_id(),
            document: Document::new(job.strip_reserved()),
        };

        let mut conn = self.conn().await?;
        let inserted: String = diesel::insert_into(jobs)
            .values(&new_job)
            .returning(id)
            .get_result(&mut conn)
            .await?;

        Ok(InsertAck::new(inserted))
    }

    async fn list_applications(&self) -> StoreResult<Vec<JobApplication>> {
        use crate::schema::job_applications::dsl::*;

        let mut conn = self.conn().await?;
        let rows = job_applications
            .order_by((created_at.asc(), id.asc()))
            .select(ApplicationRow::as_select())
            .load::<ApplicationRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_applications_by_email(
        &self,
        applicant: &str,
    ) -> StoreResult<Vec<JobApplication>> {
        use crate::schema::job_applications::dsl::*;

        let mut conn = self.conn().await?;
        let rows = job_applications
            .filter(email.eq(applicant))
            .order_by((created_at.asc(), id.asc()))
            .select(ApplicationRow::as_select())
            .load::<ApplicationRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_application(
        &self,
        application: CreateApplicationRequest,
    ) -> StoreResult<InsertAck> {
        use crate::schema::job_applications::dsl::*;

        let new_application =
            NewApplication::new(new_document_id(), application.strip_reserved());

        let mut conn = self.conn().await?;
        let inserted: String = diesel::insert_into(job_applications)
            .values(&new_application)
            .returning(id)
            .get_result(&mut conn)
            .await?;

        Ok(InsertAck::new(inserted))
    }

    async fn delete_application_by_job_id(&self, referenced_job: &str) -> StoreResult<u64> {
        use crate::schema::job_applications::dsl::*;

        let mut conn = self.conn().await?;

        // Only the oldest match goes; no transaction, a concurrent delete of
        // the same row just yields 0 here.
        let target: Option<String> = job_applications
            .filter(job_id.eq(referenced_job))
            .order_by((created_at.asc(), id.asc()))
            .select(id)
            .first::<String>(&mut conn)
            .await
            .optional()?;

        let Some(target) = target else {
            return Ok(0);
        };

        let deleted = diesel::delete(job_applications.filter(id.eq(target)))
            .execute(&mut conn)
            .await?;

        Ok(deleted as u64)
    }
}
