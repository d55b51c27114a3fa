// Database models for Diesel
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use shared_types::{ApplicationDetails, Document, Job, JobApplication, JobDetails};

/// Database representation of a job document
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    pub id: String,
    pub document: Document<JobDetails>,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            details: row.document.into_inner(),
        }
    }
}

/// Insertable struct for new jobs
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::jobs)]
pub struct NewJob {
    pub id: String,
    pub document: Document<JobDetails>,
}

/// Database representation of an application document.
///
/// The whole body lives in `document`. String-valued `job_id` and `email` are
/// also copied into their own columns so they can be filtered on.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::job_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    pub id: String,
    #[allow(dead_code)]
    pub job_id: Option<String>,
    #[allow(dead_code)]
    pub email: Option<String>,
    pub document: Document<ApplicationDetails>,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for JobApplication {
    fn from(row: ApplicationRow) -> Self {
        JobApplication {
            id: row.id,
            details: row.document.into_inner(),
        }
    }
}

/// Insertable struct for new applications
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::job_applications)]
pub struct NewApplication {
    pub id: String,
    pub job_id: Option<String>,
    pub email: Option<String>,
    pub document: Document<ApplicationDetails>,
}

impl NewApplication {
    pub fn new(id: String, details: ApplicationDetails) -> Self {
        Self {
            id,
            job_id: details.job_ref().map(str::to_string),
            email: details.applicant_email().map(str::to_string),
            document: Document::new(details),
        }
    }
}
