//! Context handed to a hook handler alongside its request.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use flowhook_core::error::AppError;
use flowhook_core::types::JobId;
use flowhook_entity::{Job, JobTable};

use crate::hooks::definitions::HookPoint;

/// Per-invocation context. Nothing in it outlives the call.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Unique id of this invocation, for log correlation.
    pub invocation_id: Uuid,
    /// The hook being invoked.
    pub hook: HookPoint,
    /// Job ancestry lookup table.
    jobs: Arc<RwLock<JobTable>>,
}

impl HookContext {
    /// Creates a context for one invocation.
    pub fn new(hook: HookPoint, jobs: Arc<RwLock<JobTable>>) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            hook,
            jobs,
        }
    }

    /// Resolves the ancestry of `id`, starting with the job itself.
    pub async fn job_chain(&self, id: &JobId) -> Result<Vec<Job>, AppError> {
        let jobs = self.jobs.read().await;
        jobs.ancestry(id)
            .map(|chain| chain.into_iter().cloned().collect())
    }

    /// Renders the embedded `parentJob` form of `id` for script runtimes.
    pub async fn nested_job(&self, id: &JobId) -> Result<Value, AppError> {
        self.jobs.read().await.to_nested(id)
    }
}
