//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flowhook_core::types::JobId;

/// A running job.
///
/// The ancestry is kept as a parent id back-reference; the full chain is
/// resolved through a [`JobTable`](super::JobTable). On input, an embedded
/// `parentJob` is accepted and reduced to its id; feed the raw value to
/// [`JobTable::ingest_nested`](super::JobTable::ingest_nested) to keep the
/// rest of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JobWire")]
pub struct Job {
    /// The id of the job.
    #[serde(rename = "_id")]
    pub id: JobId,
    /// The type of the job (e.g. `"flow"`, `"export"`, `"import"`).
    #[serde(rename = "type")]
    pub job_type: String,
    /// The time the job started.
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    /// The id of the parent job, if any.
    #[serde(
        rename = "_parentJobId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_job_id: Option<JobId>,
}

/// Job as received: flat `_parentJobId`, embedded `parentJob`, or neither.
#[derive(Deserialize)]
struct JobWire {
    #[serde(rename = "_id")]
    id: JobId,
    #[serde(rename = "type")]
    job_type: String,
    #[serde(rename = "startedAt")]
    started_at: DateTime<Utc>,
    #[serde(rename = "_parentJobId", default)]
    parent_job_id: Option<JobId>,
    #[serde(rename = "parentJob", default)]
    parent_job: Option<ParentRef>,
}

#[derive(Deserialize)]
struct ParentRef {
    #[serde(rename = "_id")]
    id: JobId,
}

impl TryFrom<JobWire> for Job {
    type Error = String;

    fn try_from(wire: JobWire) -> Result<Self, Self::Error> {
        let parent_job_id = match (wire.parent_job_id, wire.parent_job) {
            (Some(flat), Some(embedded)) if flat != embedded.id => {
                return Err(format!(
                    "job '{}' names parent '{}' but embeds parent '{}'",
                    wire.id, flat, embedded.id
                ));
            }
            (flat, embedded) => flat.or(embedded.map(|parent| parent.id)),
        };

        if parent_job_id.as_ref() == Some(&wire.id) {
            return Err(format!("job '{}' is its own parent", wire.id));
        }

        Ok(Self {
            id: wire.id,
            job_type: wire.job_type,
            started_at: wire.started_at,
            parent_job_id,
        })
    }
}

impl Job {
    /// Create a root job with a generated id, started now.
    pub fn root(job_type: impl Into<String>) -> Self {
        Self {
            id: JobId::generate(),
            job_type: job_type.into(),
            started_at: Utc::now(),
            parent_job_id: None,
        }
    }

    /// Create a child of `parent` with a generated id, started now.
    pub fn child_of(parent: &Job, job_type: impl Into<String>) -> Self {
        Self {
            id: JobId::generate(),
            job_type: job_type.into(),
            started_at: Utc::now(),
            parent_job_id: Some(parent.id.clone()),
        }
    }

    /// Whether this job has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_job_id.is_none()
    }
}
