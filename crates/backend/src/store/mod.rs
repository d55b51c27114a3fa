//! Document store abstraction over the `jobs` and `job_applications`
//! collections.
//!
//! Handlers only ever see `Arc<dyn DocumentStore>`. Implementations must be
//! safe to share across every in-flight request.

use async_trait::async_trait;
use shared_types::{
    CreateApplicationRequest, CreateJobRequest, InsertAck, Job, JobApplication,
};
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, connection refused...)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query failed after a connection was obtained
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// A stored document did not match its expected shape
    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the API needs from its document store.
///
/// Listing operations return documents in storage order (oldest first).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap round trip proving the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    async fn list_jobs(&self) -> StoreResult<Vec<Job>>;

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>>;

    /// Fetch every job whose id is in `ids`. Unknown ids are skipped and the
    /// result order is unspecified.
    async fn get_jobs_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Job>>;

    async fn insert_job(&self, job: CreateJobRequest) -> StoreResult<InsertAck>;

    async fn list_applications(&self) -> StoreResult<Vec<JobApplication>>;

    async fn list_applications_by_email(&self, email: &str)
        -> StoreResult<Vec<JobApplication>>;

    async fn insert_application(
        &self,
        application: CreateApplicationRequest,
    ) -> StoreResult<InsertAck>;

    /// Delete the oldest application referencing `job_id`.
    ///
    /// Returns the number of applications removed (0 or 1).
    async fn delete_application_by_job_id(&self, job_id: &str) -> StoreResult<u64>;
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
