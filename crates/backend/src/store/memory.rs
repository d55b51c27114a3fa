//! In-process document store.

use async_trait::async_trait;
use shared_types::{
    CreateApplicationRequest, CreateJobRequest, InsertAck, Job, JobApplication,
};
use tokio::sync::RwLock;

use super::{new_document_id, DocumentStore, StoreResult};

/// Vec-backed collections behind async read/write locks.
///
/// Nothing is persisted; used for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    jobs: RwLock<Vec<Job>>,
    applications: RwLock<Vec<JobApplication>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a job with a caller-chosen id.
    pub async fn put_job(&self, job: Job) {
        self.jobs.write().await.push(job);
    }

    /// Seed an application with a caller-chosen id.
    pub async fn put_application(&self, application: JobApplication) {
        self.applications.write().await.push(application);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.read().await.clone())
    }

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn get_jobs_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Job>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .filter(|job| ids.contains(&job.id))
            .cloned()
            .collect())
    }

    async fn insert_job(&self, job: CreateJobRequest) -> StoreResult<InsertAck> {
        let id = new_document_id();
        self.jobs.write().await.push(Job {
            id: id.clone(),
            details: job.strip_reserved(),
        });
        Ok(InsertAck::new(id))
    }

    async fn list_applications(&self) -> StoreResult<Vec<JobApplication>> {
        Ok(self.applications.read().await.clone())
    }

    async fn list_applications_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Vec<JobApplication>> {
        let applications = self.applications.read().await;
        Ok(applications
            .iter()
            .filter(|application| application.details.applicant_email() == Some(email))
            .cloned()
            .collect())
    }

    async fn insert_application(
        &self,
        application: CreateApplicationRequest,
    ) -> StoreResult<InsertAck> {
        let id = new_document_id();
        self.applications.write().await.push(JobApplication {
            id: id.clone(),
            details: application.strip_reserved(),
        });
        Ok(InsertAck::new(id))
    }

    async fn delete_application_by_job_id(&self, job_id: &str) -> StoreResult<u64> {
        let mut applications = self.applications.write().await;
        match applications
            .iter()
            .position(|application| application.details.job_ref() == Some(job_id))
        {
            Some(index) => {
                applications.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn application_request(job_id: &str, email: &str) -> CreateApplicationRequest {
        serde_json::from_value(json!({"job_id": job_id, "email": email})).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_job() {
        let store = MemoryStore::new();
        let request: CreateJobRequest =
            serde_json::from_value(json!({"id": "client-chosen", "title": "Engineer"})).unwrap();

        let ack = assert_ok!(store.insert_job(request).await);
        assert!(ack.acknowledged);
        assert_ne!(ack.inserted_id, "client-chosen");

        let job = assert_ok!(store.get_job(&ack.inserted_id).await).expect("job exists");
        assert_eq!(job.details.title, Some(json!("Engineer")));
        assert!(job.details.extra.is_empty());

        assert!(assert_ok!(store.get_job("client-chosen").await).is_none());
    }

    #[tokio::test]
    async fn test_applications_filtered_by_email_in_order() {
        let store = MemoryStore::new();
        for (job_id, email) in [("J1", "a@x.com"), ("J2", "b@x.com"), ("J3", "a@x.com")] {
            assert_ok!(store.insert_application(application_request(job_id, email)).await);
        }

        let mine = assert_ok!(store.list_applications_by_email("a@x.com").await);
        let job_ids: Vec<_> = mine.iter().filter_map(|a| a.details.job_ref()).collect();
        assert_eq!(job_ids, ["J1", "J3"]);
    }

    #[tokio::test]
    async fn test_delete_removes_one_matching_application() {
        let store = MemoryStore::new();
        assert_ok!(store.insert_application(application_request("J1", "a@x.com")).await);
        assert_ok!(store.insert_application(application_request("J1", "b@x.com")).await);

        assert_eq!(assert_ok!(store.delete_application_by_job_id("J1").await), 1);

        let remaining = assert_ok!(store.list_applications().await);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].details.applicant_email(), Some("b@x.com"));

        assert_eq!(assert_ok!(store.delete_application_by_job_id("J404").await), 0);
    }
}
