//! Read-time join of applications with the jobs they reference.
//!
//! Each application is overlaid with `title`, `company`, `category` and
//! `jobType` from its job. Applications whose job cannot be found come back
//! untouched; a missing job is never an error. Output order always matches
//! input order.

use std::collections::HashMap;

use shared_types::{EnrichedApplication, Job, JobApplication};

use crate::store::DocumentStore;

/// How referenced jobs are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnrichStrategy {
    /// One multi-get for every distinct referenced job.
    #[default]
    Batched,
    /// One lookup per application.
    Sequential,
}

pub async fn enrich_applications(
    store: &dyn DocumentStore,
    applications: Vec<JobApplication>,
    strategy: EnrichStrategy,
) -> Vec<EnrichedApplication> {
    match strategy {
        EnrichStrategy::Batched => enrich_batched(store, applications).await,
        EnrichStrategy::Sequential => enrich_sequential(store, applications).await,
    }
}

/// Fetch all referenced jobs in a single round trip, then merge.
///
/// If the multi-get fails the sequential path takes over, so one bad lookup
/// still only costs the records it affects.
pub async fn enrich_batched(
    store: &dyn DocumentStore,
    applications: Vec<JobApplication>,
) -> Vec<EnrichedApplication> {
    let mut ids: Vec<String> = applications
        .iter()
        .filter_map(|application| application.details.job_ref())
        .map(str::to_string)
        .collect();
    ids.sort();
    ids.dedup();

    match store.get_jobs_by_ids(&ids).await {
        Ok(jobs) => {
            let jobs: HashMap<String, Job> =
                jobs.into_iter().map(|job| (job.id.clone(), job)).collect();
            applications
                .into_iter()
                .map(|application| {
                    let job = application
                        .details
                        .job_ref()
                        .and_then(|job_id| jobs.get(job_id));
                    merge(application, job)
                })
                .collect()
        }
        Err(e) => {
            tracing::warn!(
                "batched job lookup for {} ids failed, falling back to per-item: {}",
                ids.len(),
                e
            );
            enrich_sequential(store, applications).await
        }
    }
}

/// Look up each application's job individually.
///
/// Costs one store round trip per application. A failed lookup leaves that
/// application unenriched and moves on to the next.
pub async fn enrich_sequential(
    store: &dyn DocumentStore,
    applications: Vec<JobApplication>,
) -> Vec<EnrichedApplication> {
    let mut enriched = Vec::with_capacity(applications.len());

    for application in applications {
        let job = match application.details.job_ref() {
            None => None,
            Some(job_id) => match store.get_job(job_id).await {
                Ok(job) => job,
                Err(e) => {
                    tracing::warn!(
                        "job lookup for application {} failed: {}",
                        application.id,
                        e
                    );
                    None
                }
            },
        };
        enriched.push(merge(application, job.as_ref()));
    }

    enriched
}

fn merge(application: JobApplication, job: Option<&Job>) -> EnrichedApplication {
    match job {
        Some(job) => EnrichedApplication::with_job(application, job),
        None => EnrichedApplication::unmatched(application),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use shared_types::{CreateApplicationRequest, CreateJobRequest, InsertAck};

    use crate::store::{MemoryStore, StoreError, StoreResult};

    fn job(id: &str, title: &str, company: &str) -> Job {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "company": company,
            "category": "Engineering",
            "jobType": "Full-time",
        }))
        .unwrap()
    }

    fn application(id: &str, job_id: &str) -> JobApplication {
        serde_json::from_value(json!({"id": id, "job_id": job_id, "email": "a@x.com"})).unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_job(job("J1", "Engineer", "Acme")).await;
        store.put_job(job("J2", "Designer", "Globex")).await;
        store
    }

    #[tokio::test]
    async fn test_matching_job_is_merged() {
        let store = seeded().await;
        for strategy in [EnrichStrategy::Batched, EnrichStrategy::Sequential] {
            let views =
                enrich_applications(&store, vec![application("A1", "J1")], strategy).await;

            let view = serde_json::to_value(&views[0]).unwrap();
            assert_eq!(view["title"], "Engineer");
            assert_eq!(view["company"], "Acme");
            assert_eq!(view["category"], "Engineering");
            assert_eq!(view["jobType"], "Full-time");
            assert_eq!(view["job_id"], "J1");
        }
    }

    #[tokio::test]
    async fn test_missing_job_leaves_application_untouched() {
        let store = seeded().await;
        for strategy in [EnrichStrategy::Batched, EnrichStrategy::Sequential] {
            let original = application("A1", "J404");
            let views = enrich_applications(&store, vec![original.clone()], strategy).await;

            assert!(!views[0].is_enriched());
            assert_eq!(views[0].application, original);
            assert!(serde_json::to_value(&views[0]).unwrap().get("title").is_none());
        }
    }

    #[tokio::test]
    async fn test_non_string_job_reference_is_left_alone() {
        let store = seeded().await;
        let odd: JobApplication =
            serde_json::from_value(json!({"id": "A1", "job_id": ["J1"], "email": "a@x.com"}))
                .unwrap();
        let missing: JobApplication =
            serde_json::from_value(json!({"id": "A2", "email": "a@x.com"})).unwrap();

        for strategy in [EnrichStrategy::Batched, EnrichStrategy::Sequential] {
            let views =
                enrich_applications(&store, vec![odd.clone(), missing.clone()], strategy).await;
            assert!(views.iter().all(|view| !view.is_enriched()));
            assert_eq!(serde_json::to_value(&views[0]).unwrap()["job_id"], json!(["J1"]));
        }
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let store = seeded().await;
        let applications = vec![
            application("A1", "J2"),
            application("A2", "J404"),
            application("A3", "J1"),
            application("A4", "J2"),
        ];

        let batched = enrich_batched(&store, applications.clone()).await;
        let sequential = enrich_sequential(&store, applications).await;

        let ids: Vec<_> = batched.iter().map(|v| v.application.id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2", "A3", "A4"]);
        assert_eq!(batched, sequential);
    }

    /// Store whose multi-get always fails and whose single gets fail for one id.
    struct FlakyStore {
        inner: MemoryStore,
        single_lookups: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
            self.inner.list_jobs().await
        }
        async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
            self.single_lookups.fetch_add(1, Ordering::SeqCst);
            if id == "J2" {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.get_job(id).await
        }
        async fn get_jobs_by_ids(&self, _ids: &[String]) -> StoreResult<Vec<Job>> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
        async fn insert_job(&self, job: CreateJobRequest) -> StoreResult<InsertAck> {
            self.inner.insert_job(job).await
        }
        async fn list_applications(&self) -> StoreResult<Vec<JobApplication>> {
            self.inner.list_applications().await
        }
        async fn list_applications_by_email(
            &self,
            email: &str,
        ) -> StoreResult<Vec<JobApplication>> {
            self.inner.list_applications_by_email(email).await
        }
        async fn insert_application(
            &self,
            application: CreateApplicationRequest,
        ) -> StoreResult<InsertAck> {
            self.inner.insert_application(application).await
        }
        async fn delete_application_by_job_id(&self, job_id: &str) -> StoreResult<u64> {
            self.inner.delete_application_by_job_id(job_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_skips_only_that_record() {
        let store = FlakyStore {
            inner: seeded().await,
            single_lookups: AtomicUsize::new(0),
        };

        let views = enrich_batched(
            &store,
            vec![application("A1", "J1"), application("A2", "J2")],
        )
        .await;

        assert_eq!(store.single_lookups.load(Ordering::SeqCst), 2);
        assert!(views[0].is_enriched());
        assert!(!views[1].is_enriched());
        assert_eq!(views[1].application.id, "A2");
    }
}
