//! Out-of-band lookup table resolving job ancestry.
//!
//! A job may only be inserted once its parent is present, so every chain
//! ends at a root and can never loop back on itself. Chain length is capped
//! at `max_depth` links.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use flowhook_core::error::AppError;
use flowhook_core::types::JobId;

use super::model::Job;

/// Lookup table of jobs keyed by id.
#[derive(Debug, Clone)]
pub struct JobTable {
    /// Jobs by id.
    jobs: HashMap<JobId, Job>,
    /// Maximum chain length, counting the job itself.
    max_depth: usize,
}

/// One level of the embedded wire form scripts see.
#[derive(Debug, Deserialize)]
struct NestedJob {
    #[serde(rename = "_id")]
    id: JobId,
    #[serde(rename = "type")]
    job_type: String,
    #[serde(rename = "startedAt")]
    started_at: DateTime<Utc>,
    #[serde(rename = "parentJob", default)]
    parent_job: Option<Value>,
}

impl JobTable {
    /// Creates an empty table bounding chains to `max_depth` links.
    pub fn new(max_depth: usize) -> Self {
        Self {
            jobs: HashMap::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Inserts a job. Its parent must already be present.
    pub fn insert(&mut self, job: Job) -> Result<(), AppError> {
        if self.jobs.contains_key(&job.id) {
            return Err(AppError::validation(format!(
                "Job '{}' is already registered",
                job.id
            )));
        }

        let depth = match &job.parent_job_id {
            None => 1,
            Some(parent_id) => {
                if !self.jobs.contains_key(parent_id) {
                    return Err(AppError::validation(format!(
                        "Parent job '{}' of job '{}' is not registered",
                        parent_id, job.id
                    )));
                }
                self.depth(parent_id)? + 1
            }
        };

        if depth > self.max_depth {
            return Err(AppError::validation(format!(
                "Job '{}' would extend the ancestry chain to {} links (max {})",
                job.id, depth, self.max_depth
            )));
        }

        self.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    /// Returns a job by id.
    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Returns the chain from `id` up to its root, starting with the job itself.
    pub fn ancestry(&self, id: &JobId) -> Result<Vec<&Job>, AppError> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);

        while let Some(current) = cursor {
            if chain.len() >= self.max_depth {
                return Err(AppError::validation(format!(
                    "Ancestry of job '{}' exceeds {} links",
                    id, self.max_depth
                )));
            }
            let job = self
                .jobs
                .get(current)
                .ok_or_else(|| AppError::not_found(format!("Job '{}' not found", current)))?;
            chain.push(job);
            cursor = job.parent_job_id.as_ref();
        }

        Ok(chain)
    }

    /// Number of links in the chain ending at `id` (a root has depth 1).
    pub fn depth(&self, id: &JobId) -> Result<usize, AppError> {
        self.ancestry(id).map(|chain| chain.len())
    }

    /// Returns the root job of the chain containing `id`.
    pub fn root_of(&self, id: &JobId) -> Result<&Job, AppError> {
        self.ancestry(id)?
            .pop()
            .ok_or_else(|| AppError::not_found(format!("Job '{}' not found", id)))
    }

    /// Renders the embedded `parentJob` form handed to user scripts.
    pub fn to_nested(&self, id: &JobId) -> Result<Value, AppError> {
        let chain = self.ancestry(id)?;
        let mut nested: Option<Value> = None;

        for job in chain.into_iter().rev() {
            let mut object = Map::new();
            object.insert("_id".to_string(), Value::String(job.id.to_string()));
            object.insert("type".to_string(), Value::String(job.job_type.clone()));
            object.insert("startedAt".to_string(), serde_json::to_value(job.started_at)?);
            if let Some(parent) = nested.take() {
                object.insert("parentJob".to_string(), parent);
            }
            nested = Some(Value::Object(object));
        }

        nested.ok_or_else(|| AppError::not_found(format!("Job '{}' not found", id)))
    }

    /// Flattens an embedded `parentJob` chain into the table.
    ///
    /// Jobs already present are accepted when their parent matches. Returns
    /// the id of the outermost (leaf) job.
    pub fn ingest_nested(&mut self, value: &Value) -> Result<JobId, AppError> {
        let mut levels = Vec::new();
        let mut cursor = Some(value.clone());

        while let Some(current) = cursor.take() {
            if levels.len() >= self.max_depth {
                return Err(AppError::validation(format!(
                    "Embedded job chain exceeds {} links",
                    self.max_depth
                )));
            }
            let mut level = NestedJob::deserialize(&current)?;
            cursor = level.parent_job.take().filter(|v| !v.is_null());
            levels.push(level);
        }

        let leaf_id = levels
            .first()
            .map(|l| l.id.clone())
            .ok_or_else(|| AppError::validation("Embedded job chain is empty"))?;

        // Insert root first so every parent exists before its child.
        let mut parent_id: Option<JobId> = None;
        for level in levels.into_iter().rev() {
            let job = Job {
                id: level.id,
                job_type: level.job_type,
                started_at: level.started_at,
                parent_job_id: parent_id.clone(),
            };

            match self.jobs.get(&job.id) {
                Some(existing) if existing.parent_job_id == job.parent_job_id => {
                    debug!(job_id = %job.id, "Job already registered, skipping");
                }
                Some(_) => {
                    return Err(AppError::validation(format!(
                        "Job '{}' is registered with a different parent",
                        job.id
                    )));
                }
                None => self.insert(job.clone())?,
            }

            parent_id = Some(job.id);
        }

        Ok(leaf_id)
    }

    /// Number of jobs in the table.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Maximum chain length accepted by this table.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new(32)
    }
}
