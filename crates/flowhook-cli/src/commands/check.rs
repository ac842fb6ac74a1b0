//! Replays a recorded hook call through the host-side contract checks.
//!
//! The input file holds the hook's options as the host would send them.
//! The response file holds what the script returned, or
//! `{"thrown": {"code": ..., "message": ...}}` for a script that threw.
//! Without a response file, the hook runs unbound and its default applies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::Args;
use serde::Serialize;
use serde_json::{Value, json};

use flowhook_core::config::AppConfig;
use flowhook_core::error::AppError;
use flowhook_hooks::{
    HookContext, HookDispatcher, HookFailure, HookHandler, HookOutcome, HookPoint, HookRegistry,
    HookReply, HookRequest, ScriptFailure,
};

use crate::output::{self, OutputFormat};

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Hook name, e.g. preMap
    pub hook: String,
    /// JSON file with the hook's options
    #[arg(short, long)]
    pub input: PathBuf,
    /// JSON file with the recorded response
    #[arg(short, long)]
    pub response: Option<PathBuf>,
    /// Number of configured branches, for branching
    #[arg(long, default_value_t = 1)]
    pub branches: usize,
}

/// Result of a replayed call.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// The hook replayed.
    pub hook: HookPoint,
    /// `success`, `recoverable`, or `fatal`.
    pub status: &'static str,
    /// What the host proceeds with, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// What failed, otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<HookFailure>,
}

/// A handler that answers with a recorded reply.
#[derive(Debug)]
enum Recorded {
    Reply(HookReply),
    Thrown(ScriptFailure),
}

#[async_trait]
impl HookHandler for Recorded {
    async fn handle(
        &self,
        _ctx: &HookContext,
        _request: &HookRequest,
    ) -> Result<HookReply, ScriptFailure> {
        match self {
            Self::Reply(reply) => Ok(reply.clone()),
            Self::Thrown(failure) => Err(failure.clone()),
        }
    }

    fn script_id(&self) -> &str {
        "recorded"
    }
}

/// Execute the check command
pub async fn execute(
    args: &CheckArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let hook: HookPoint = args.hook.parse()?;
    let input = read_json(&args.input).await?;

    let registry = Arc::new(HookRegistry::new());
    if let Some(path) = &args.response {
        let recorded = parse_recording(hook, read_json(path).await?)?;
        registry.register(hook, Arc::new(recorded)).await;
    }

    let dispatcher = HookDispatcher::new(registry, config.host.clone());
    let request = prepare(&dispatcher, hook, input).await?;
    let report = replay(&dispatcher, request, args.branches).await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => print_report(&report),
    }

    match report.failure {
        Some(failure) => Err(failure.into()),
        None => Ok(()),
    }
}

async fn read_json(path: &Path) -> Result<Value, AppError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Registers the input's job chain with the dispatcher, then reads the
/// input as the hook's options.
async fn prepare(
    dispatcher: &HookDispatcher,
    hook: HookPoint,
    input: Value,
) -> Result<HookRequest, AppError> {
    // A flat `_parentJobId` names an ancestor the recording does not carry.
    if let Some(job) = input
        .get("job")
        .filter(|job| job.is_object() && job.get("_parentJobId").is_none())
    {
        dispatcher.ingest_job(job).await?;
    }

    serde_json::from_value(json!({"hook": hook.as_str(), "options": input}))
        .map_err(|e| AppError::validation(format!("invalid {hook} input: {e}")))
}

fn parse_recording(hook: HookPoint, response: Value) -> Result<Recorded, AppError> {
    if let Some(thrown) = response.get("thrown") {
        return Ok(Recorded::Thrown(serde_json::from_value(thrown.clone())?));
    }
    if hook == HookPoint::PostAggregate {
        return Ok(Recorded::Reply(HookReply::PostAggregate));
    }
    let reply = serde_json::from_value(json!({"hook": hook.as_str(), "response": response}))?;
    Ok(Recorded::Reply(reply))
}

async fn replay(
    dispatcher: &HookDispatcher,
    request: HookRequest,
    branches: usize,
) -> Result<CheckReport, AppError> {
    let hook = request.point();
    match request {
        HookRequest::PreSavePage(o) => report(hook, dispatcher.pre_save_page(o).await),
        HookRequest::Filter(o) => report(hook, dispatcher.filter(o).await),
        HookRequest::Transform(o) => report(hook, dispatcher.transform(o).await),
        HookRequest::Branching(o) => report(hook, dispatcher.branching(o, branches).await),
        HookRequest::PreMap(o) => report(hook, dispatcher.pre_map(o).await),
        HookRequest::PostMap(o) => report(hook, dispatcher.post_map(o).await),
        HookRequest::PostSubmit(o) => report(hook, dispatcher.post_submit(o).await),
        HookRequest::PostResponseMap(o) => report(hook, dispatcher.post_response_map(o).await),
        HookRequest::PostAggregate(o) => report(hook, dispatcher.post_aggregate(o).await),
        HookRequest::ContentBasedFlowRouter(o) => {
            report(hook, dispatcher.route_message(o).await)
        }
        HookRequest::FormInit(o) => report(hook, dispatcher.form_init(o).await),
        HookRequest::HandleRequest(o) => report(hook, dispatcher.handle_request(o).await),
    }
}

fn report<T: Serialize>(hook: HookPoint, outcome: HookOutcome<T>) -> Result<CheckReport, AppError> {
    let status = match &outcome {
        HookOutcome::Success(_) => "success",
        HookOutcome::Recoverable(_) => "recoverable",
        HookOutcome::Fatal(_) => "fatal",
    };

    let (result, failure) = match outcome.into_result() {
        Ok(value) => (Some(serde_json::to_value(value)?), None),
        Err(failure) => (None, Some(failure)),
    };

    Ok(CheckReport {
        hook,
        status,
        result,
        failure,
    })
}

fn print_report(report: &CheckReport) {
    match &report.failure {
        None => output::print_success(&format!("{} reply honours its contract", report.hook)),
        Some(failure) if report.status == "fatal" => {
            output::print_error(&format!("{} failed, aborting the {}", report.hook, failure.scope))
        }
        Some(failure) => output::print_warning(&format!(
            "{} failed for one {}",
            report.hook, failure.scope
        )),
    }

    output::print_kv("Status", report.status);
    if let Some(failure) = &report.failure {
        output::print_kv("Code", &failure.code);
        output::print_kv("Message", &failure.message);
    }
    if let Some(result) = &report.result {
        output::print_json(result);
    }
}
