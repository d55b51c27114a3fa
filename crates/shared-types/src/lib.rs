use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "diesel")]
mod document;

#[cfg(feature = "diesel")]
pub use document::Document;

/// Free-form document fields that are not modelled explicitly.
pub type Fields = Map<String, Value>;

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Keys owned by the store. Client documents never get to set them.
const RESERVED_KEYS: [&str; 2] = ["id", "_id"];

/// Job fields copied onto an application when it is enriched.
pub const ENRICHMENT_KEYS: [&str; 4] = ["title", "company", "category", "jobType"];

/// Body of a job document, everything except the store-assigned id.
///
/// The named fields are the ones the enrichment join copies. They hold
/// whatever JSON value the client sent, `null` included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub company: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(
        rename = "jobType",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_type: Option<Value>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl JobDetails {
    /// Drop any client-supplied identifier keys.
    pub fn strip_reserved(mut self) -> Self {
        for key in RESERVED_KEYS {
            self.extra.remove(key);
        }
        self
    }
}

/// Job posting as stored in the `jobs` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(flatten)]
    pub details: JobDetails,
}

impl Job {
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            title: self.details.title.clone(),
            company: self.details.company.clone(),
            category: self.details.category.clone(),
            job_type: self.details.job_type.clone(),
        }
    }
}

pub type CreateJobRequest = JobDetails;

/// Body of an application document.
///
/// `job_id` references `Job::id` but nothing enforces that the job exists,
/// or even that either field is present or a string. Only string values take
/// part in lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ApplicationDetails {
    /// The referenced job id, when it is a string.
    pub fn job_ref(&self) -> Option<&str> {
        self.job_id.as_ref().and_then(Value::as_str)
    }

    /// The applicant email, when it is a string.
    pub fn applicant_email(&self) -> Option<&str> {
        self.email.as_ref().and_then(Value::as_str)
    }

    /// Drop any client-supplied identifier keys.
    pub fn strip_reserved(mut self) -> Self {
        for key in RESERVED_KEYS {
            self.extra.remove(key);
        }
        self
    }
}

/// Job application as stored in the `job_applications` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    #[serde(flatten)]
    pub details: ApplicationDetails,
}

pub type CreateApplicationRequest = ApplicationDetails;

/// The subset of a job merged into an application view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub company: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(
        rename = "jobType",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_type: Option<Value>,
}

/// Read-time view of an application, overlaid with its job when one exists.
///
/// Never persisted. `job` is `None` when the referenced job could not be found,
/// in which case the view serializes exactly like the bare application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedApplication {
    #[serde(flatten)]
    pub application: JobApplication,
    #[serde(flatten)]
    pub job: Option<JobSummary>,
}

impl EnrichedApplication {
    pub fn unmatched(application: JobApplication) -> Self {
        Self {
            application,
            job: None,
        }
    }

    /// Overlay `job` onto `application`.
    ///
    /// Job fields win over same-named application fields, including when the
    /// job lacks the field altogether.
    pub fn with_job(mut application: JobApplication, job: &Job) -> Self {
        for key in ENRICHMENT_KEYS {
            application.details.extra.remove(key);
        }
        Self {
            application,
            job: Some(job.summary()),
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.job.is_some()
    }
}

/// Acknowledgment returned by insert endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertAck {
    pub acknowledged: bool,
    #[serde(rename = "insertedId")]
    pub inserted_id: String,
}

impl InsertAck {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}
