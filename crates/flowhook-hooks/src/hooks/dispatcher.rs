//! Hook dispatcher: invokes the bound handler for one hook and enforces its
//! contract on the way in and on the way out.
//!
//! Every typed entry point follows the same sequence:
//! - page size and input checks,
//! - invocation under the configured time budget,
//! - reply variant and response checks,
//! - mapping of any failure onto the hook's failure scope.
//!
//! When nothing is bound, the hook's pass-through default applies. Hooks
//! without a sensible default (branching, routing, forms, request handling)
//! report a `no_handler` failure instead.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use flowhook_core::config::HostConfig;
use flowhook_core::error::AppError;
use flowhook_core::types::JobId;
use flowhook_entity::{ImportResponse, Job, JobTable, Settings};

use crate::api::context::HookContext;

use super::contracts::branching::{BranchingOptions, normalize_branches};
use super::contracts::filter::{FilterOptions, FilterScope};
use super::contracts::flow_router::{FlowRoute, FlowRouterOptions};
use super::contracts::form_init::{FormDefinition, FormInitOptions};
use super::contracts::handle_request::{HandleRequestOptions, HandleRequestResponse};
use super::contracts::post_aggregate::{AggregateDelivery, PostAggregateOptions};
use super::contracts::post_map::{self, PostMapOptions};
use super::contracts::post_response_map::{self, PostResponseMapOptions};
use super::contracts::post_submit::{self, PostSubmitOptions};
use super::contracts::pre_map::{self, PreMapOptions};
use super::contracts::pre_save_page::{self, PreSavePageOptions, PreSavePageResponse};
use super::contracts::transform::TransformOptions;
use super::definitions::{HookPoint, HookReply, HookRequest};
use super::outcome::{HookFailure, HookOutcome, RecordResponse};
use super::reconcile::{
    FilterReport, KeptRecord, PageReconciliation, RecordFailure, TransformReport,
    reconcile_records,
};
use super::registry::HookRegistry;
use super::violation::ContractViolation;

/// Dispatches hook invocations to the registry's handlers.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Job ancestry shared with every invocation context.
    jobs: Arc<RwLock<JobTable>>,
    /// Host settings.
    config: HostConfig,
}

impl HookDispatcher {
    /// Creates a dispatcher with an empty job table.
    pub fn new(registry: Arc<HookRegistry>, config: HostConfig) -> Self {
        let jobs = Arc::new(RwLock::new(JobTable::new(config.max_job_depth)));
        Self::with_jobs(registry, config, jobs)
    }

    /// Creates a dispatcher over an existing job table.
    pub fn with_jobs(
        registry: Arc<HookRegistry>,
        config: HostConfig,
        jobs: Arc<RwLock<JobTable>>,
    ) -> Self {
        Self {
            registry,
            jobs,
            config,
        }
    }

    /// Records a job so handlers can resolve its ancestry.
    pub async fn register_job(&self, job: Job) -> Result<(), AppError> {
        self.jobs.write().await.insert(job)
    }

    /// Records a job received in the embedded `parentJob` form, ancestors
    /// included. Returns the id of the job itself.
    pub async fn ingest_job(&self, job: &Value) -> Result<JobId, AppError> {
        let id = self.jobs.write().await.ingest_nested(job)?;
        debug!(job_id = %id, "Ingested embedded job chain");
        Ok(id)
    }

    /// Returns the chain from `id` up to its root, starting with the job itself.
    pub async fn job_chain(&self, id: &JobId) -> Result<Vec<Job>, AppError> {
        let jobs = self.jobs.read().await;
        jobs.ancestry(id)
            .map(|chain| chain.into_iter().cloned().collect())
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the host settings.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    // ── Export hooks ─────────────────────────────────────────────

    /// Runs preSavePage on an exported page.
    pub async fn pre_save_page(
        &self,
        options: PreSavePageOptions,
    ) -> HookOutcome<PreSavePageResponse> {
        let hook = HookPoint::PreSavePage;
        if let Err(failure) = self.check_page(hook, options.data.len()).and_then(|()| {
            options
                .validate()
                .map_err(|e| HookFailure::invalid_input(hook, &e))
        }) {
            return self.fail(failure);
        }

        let request = HookRequest::PreSavePage(options);
        let reply = match self.invoke(&request).await {
            Ok(reply) => reply,
            Err(failure) => return self.fail(failure),
        };

        match (request, reply) {
            (HookRequest::PreSavePage(options), None) => {
                HookOutcome::Success(PreSavePageResponse::pass_through(&options))
            }
            (HookRequest::PreSavePage(options), Some(HookReply::PreSavePage(response))) => {
                if let Err(violation) = pre_save_page::validate_response(&options, &response) {
                    return self.violated(hook, &violation);
                }
                if response.abort {
                    warn!(hook = %hook, page = options.page_index, "Hook requested flow abort");
                }
                HookOutcome::Success(response)
            }
            (_, reply) => self.unexpected(hook, reply.as_ref()),
        }
    }

    /// Runs filter on a single record.
    pub async fn filter(&self, options: FilterOptions) -> HookOutcome<bool> {
        let hook = HookPoint::Filter;
        if let Some(delta) = &options.delta {
            if let Err(e) = delta.validate() {
                return self.fail(HookFailure::invalid_input(hook, &e));
            }
        }

        match self.invoke(&HookRequest::Filter(options)).await {
            Ok(None) => HookOutcome::Success(true),
            Ok(Some(HookReply::Filter(keep))) => HookOutcome::Success(keep),
            Ok(reply) => self.unexpected(hook, reply.as_ref()),
            Err(failure) => self.fail(failure),
        }
    }

    /// Runs filter over every record of a page. A failing record is reported
    /// and excluded; its siblings are unaffected.
    pub async fn filter_page(
        &self,
        records: Vec<Value>,
        scope: &FilterScope,
    ) -> HookOutcome<FilterReport> {
        let hook = HookPoint::Filter;
        if let Err(failure) = self.check_page(hook, records.len()) {
            return self.fail(failure);
        }

        let mut report = FilterReport::default();
        for (index, record) in records.into_iter().enumerate() {
            match self.filter(scope.options_for(record.clone())).await {
                HookOutcome::Success(true) => report.kept.push(KeptRecord {
                    index,
                    data: record,
                }),
                HookOutcome::Success(false) => report.excluded.push(index),
                HookOutcome::Recoverable(failure) => {
                    report.failed.push(RecordFailure { index, failure })
                }
                HookOutcome::Fatal(failure) => return HookOutcome::Fatal(failure),
            }
        }

        debug!(
            hook = %hook,
            kept = report.kept.len(),
            excluded = report.excluded.len(),
            failed = report.failed.len(),
            "Filtered page"
        );
        HookOutcome::Success(report)
    }

    /// Runs transform on a single record.
    pub async fn transform(&self, options: TransformOptions) -> HookOutcome<Value> {
        let hook = HookPoint::Transform;
        let request = HookRequest::Transform(options);
        let reply = match self.invoke(&request).await {
            Ok(reply) => reply,
            Err(failure) => return self.fail(failure),
        };

        match (request, reply) {
            (HookRequest::Transform(options), None) => HookOutcome::Success(options.record),
            (_, Some(HookReply::Transform(record))) => HookOutcome::Success(record),
            (_, reply) => self.unexpected(hook, reply.as_ref()),
        }
    }

    /// Runs transform over every record of a page.
    pub async fn transform_page(
        &self,
        records: Vec<Value>,
        settings: &Settings,
        test_mode: bool,
        job: &Job,
    ) -> HookOutcome<TransformReport> {
        let hook = HookPoint::Transform;
        if let Err(failure) = self.check_page(hook, records.len()) {
            return self.fail(failure);
        }

        let mut report = TransformReport::default();
        for (index, record) in records.into_iter().enumerate() {
            let options = TransformOptions {
                record,
                settings: settings.clone(),
                test_mode,
                job: job.clone(),
            };
            match self.transform(options).await {
                HookOutcome::Success(data) => report.records.push(KeptRecord { index, data }),
                HookOutcome::Recoverable(failure) => {
                    report.failed.push(RecordFailure { index, failure })
                }
                HookOutcome::Fatal(failure) => return HookOutcome::Fatal(failure),
            }
        }
        HookOutcome::Success(report)
    }

    /// Runs branching on a single record. The reply is checked against
    /// `branch_count` and deduplicated.
    pub async fn branching(
        &self,
        options: BranchingOptions,
        branch_count: usize,
    ) -> HookOutcome<Vec<usize>> {
        let hook = HookPoint::Branching;
        match self.invoke(&HookRequest::Branching(options)).await {
            Ok(None) => self.fail(HookFailure::no_handler(hook)),
            Ok(Some(HookReply::Branching(indices))) => {
                match normalize_branches(indices, branch_count) {
                    Ok(branches) => HookOutcome::Success(branches),
                    Err(violation) => self.violated(hook, &violation),
                }
            }
            Ok(reply) => self.unexpected(hook, reply.as_ref()),
            Err(failure) => self.fail(failure),
        }
    }

    // ── Import hooks ─────────────────────────────────────────────

    /// Runs preMap on a page and reconciles the reply against it.
    pub async fn pre_map(&self, options: PreMapOptions) -> HookOutcome<PageReconciliation> {
        let hook = HookPoint::PreMap;
        let input_len = options.data.len();
        if let Err(failure) = self.check_page(hook, input_len) {
            return self.fail(failure);
        }

        let request = HookRequest::PreMap(options);
        let reply = match self.invoke(&request).await {
            Ok(reply) => reply,
            Err(failure) => return self.fail(failure),
        };

        match (request, reply) {
            (HookRequest::PreMap(options), None) => {
                HookOutcome::Success(PageReconciliation::pass_through(options.data))
            }
            (HookRequest::PreMap(options), Some(HookReply::PreMap(responses))) => {
                if let Err(violation) = pre_map::validate_response(&options, &responses) {
                    return self.violated(hook, &violation);
                }
                self.reconcile(hook, input_len, responses)
            }
            (_, reply) => self.unexpected(hook, reply.as_ref()),
        }
    }

    /// Runs postMap on a page and reconciles the reply against the mapped
    /// records.
    pub async fn post_map(&self, options: PostMapOptions) -> HookOutcome<PageReconciliation> {
        let hook = HookPoint::PostMap;
        let input_len = options.post_map_data.len();
        if let Err(failure) = self.check_page(hook, input_len).and_then(|()| {
            options
                .validate()
                .map_err(|e| HookFailure::invalid_input(hook, &e))
        }) {
            return self.fail(failure);
        }

        let request = HookRequest::PostMap(options);
        let reply = match self.invoke(&request).await {
            Ok(reply) => reply,
            Err(failure) => return self.fail(failure),
        };

        match (request, reply) {
            (HookRequest::PostMap(options), None) => {
                HookOutcome::Success(PageReconciliation::pass_through(options.post_map_data))
            }
            (HookRequest::PostMap(options), Some(HookReply::PostMap(responses))) => {
                if let Err(violation) = post_map::validate_response(&options, &responses) {
                    return self.violated(hook, &violation);
                }
                self.reconcile(hook, input_len, responses)
            }
            (_, reply) => self.unexpected(hook, reply.as_ref()),
        }
    }

    /// Runs postSubmit on a page of submit responses.
    pub async fn post_submit(&self, options: PostSubmitOptions) -> HookOutcome<Vec<ImportResponse>> {
        let hook = HookPoint::PostSubmit;
        if let Err(failure) = self.check_page(hook, options.response_data.len()).and_then(|()| {
            options
                .validate()
                .map_err(|e| HookFailure::invalid_input(hook, &e))
        }) {
            return self.fail(failure);
        }

        let request = HookRequest::PostSubmit(options);
        let reply = match self.invoke(&request).await {
            Ok(reply) => reply,
            Err(failure) => return self.fail(failure),
        };

        match (request, reply) {
            (HookRequest::PostSubmit(options), None) => {
                HookOutcome::Success(options.response_data)
            }
            (HookRequest::PostSubmit(options), Some(HookReply::PostSubmit(responses))) => {
                match post_submit::validate_response(&options, &responses) {
                    Ok(()) => HookOutcome::Success(responses),
                    Err(violation) => self.violated(hook, &violation),
                }
            }
            (_, reply) => self.unexpected(hook, reply.as_ref()),
        }
    }

    /// Runs postResponseMap on the records about to be merged back into the
    /// flow.
    pub async fn post_response_map(
        &self,
        options: PostResponseMapOptions,
    ) -> HookOutcome<Vec<Value>> {
        let hook = HookPoint::PostResponseMap;
        if let Err(failure) = self.check_page(hook, options.post_response_map_data.len()) {
            return self.fail(failure);
        }

        let request = HookRequest::PostResponseMap(options);
        let reply = match self.invoke(&request).await {
            Ok(reply) => reply,
            Err(failure) => return self.fail(failure),
        };

        match (request, reply) {
            (HookRequest::PostResponseMap(options), None) => {
                HookOutcome::Success(options.post_response_map_data)
            }
            (HookRequest::PostResponseMap(options), Some(HookReply::PostResponseMap(records))) => {
                match post_response_map::validate_response(&options, &records) {
                    Ok(()) => HookOutcome::Success(records),
                    Err(violation) => self.violated(hook, &violation),
                }
            }
            (_, reply) => self.unexpected(hook, reply.as_ref()),
        }
    }

    /// Runs postAggregate once per aggregated file. Never invokes the
    /// handler when aggregation is skipped.
    pub async fn post_aggregate(
        &self,
        options: PostAggregateOptions,
    ) -> HookOutcome<AggregateDelivery> {
        let hook = HookPoint::PostAggregate;
        if self.config.skip_aggregation {
            info!(hook = %hook, "Aggregation skipped, hook not invoked");
            return HookOutcome::Success(AggregateDelivery::Skipped);
        }

        if let Some(error) = options.post_aggregate_data.error() {
            warn!(
                hook = %hook,
                code = %error.code,
                message = %error.message,
                "Aggregation reported failure"
            );
        }

        match self.invoke(&HookRequest::PostAggregate(options)).await {
            Ok(None) => HookOutcome::Success(AggregateDelivery::NoHandler),
            Ok(Some(HookReply::PostAggregate)) => HookOutcome::Success(AggregateDelivery::Invoked),
            Ok(reply) => self.unexpected(hook, reply.as_ref()),
            Err(failure) => self.fail(failure),
        }
    }

    // ── Platform hooks ───────────────────────────────────────────

    /// Runs the content-based flow router on an inbound message.
    pub async fn route_message(&self, options: FlowRouterOptions) -> HookOutcome<FlowRoute> {
        let hook = HookPoint::ContentBasedFlowRouter;
        match self.invoke(&HookRequest::ContentBasedFlowRouter(options)).await {
            Ok(None) => self.fail(HookFailure::no_handler(hook)),
            Ok(Some(HookReply::ContentBasedFlowRouter(route))) => match route.validate() {
                Ok(()) => HookOutcome::Success(route),
                Err(violation) => self.violated(hook, &violation),
            },
            Ok(reply) => self.unexpected(hook, reply.as_ref()),
            Err(failure) => self.fail(failure),
        }
    }

    /// Runs formInit for one form render.
    pub async fn form_init(&self, options: FormInitOptions) -> HookOutcome<FormDefinition> {
        let hook = HookPoint::FormInit;
        if let Err(e) = options.validate() {
            return self.fail(HookFailure::invalid_input(hook, &e));
        }

        match self.invoke(&HookRequest::FormInit(options)).await {
            Ok(None) => self.fail(HookFailure::no_handler(hook)),
            Ok(Some(HookReply::FormInit(form))) => HookOutcome::Success(form),
            Ok(reply) => self.unexpected(hook, reply.as_ref()),
            Err(failure) => self.fail(failure),
        }
    }

    /// Runs handleRequest for one inbound HTTP request.
    pub async fn handle_request(
        &self,
        options: HandleRequestOptions,
    ) -> HookOutcome<HandleRequestResponse> {
        let hook = HookPoint::HandleRequest;
        let mut options = options;
        if let Err(e) = options.normalize() {
            return self.fail(HookFailure::invalid_input(hook, &e));
        }

        match self.invoke(&HookRequest::HandleRequest(options)).await {
            Ok(None) => self.fail(HookFailure::no_handler(hook)),
            Ok(Some(HookReply::HandleRequest(response))) => match response.validate() {
                Ok(()) => HookOutcome::Success(response),
                Err(violation) => self.violated(hook, &violation),
            },
            Ok(reply) => self.unexpected(hook, reply.as_ref()),
            Err(failure) => self.fail(failure),
        }
    }

    // ── Internals ────────────────────────────────────────────────

    /// Invokes the bound handler. `Ok(None)` means nothing is bound.
    async fn invoke(&self, request: &HookRequest) -> Result<Option<HookReply>, HookFailure> {
        let hook = request.point();
        let Some(handler) = self.registry.get(hook).await else {
            debug!(hook = %hook, "No handler bound, using default");
            return Ok(None);
        };

        let ctx = HookContext::new(hook, Arc::clone(&self.jobs));
        debug!(
            hook = %hook,
            script_id = %handler.script_id(),
            invocation_id = %ctx.invocation_id,
            "Invoking hook"
        );

        let timeout = self.config.hook_timeout();
        let reply = match tokio::time::timeout(timeout, handler.handle(&ctx, request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(failure)) => {
                return Err(HookFailure::from_script(hook, failure));
            }
            Err(_) => {
                error!(
                    hook = %hook,
                    script_id = %handler.script_id(),
                    timeout_secs = self.config.hook_timeout_seconds,
                    "Hook timed out"
                );
                return Err(HookFailure::timeout(hook, self.config.hook_timeout_seconds));
            }
        };

        if reply.point() != hook {
            return Err(HookFailure::from_violation(
                hook,
                &ContractViolation::UnexpectedReply {
                    expected: hook,
                    actual: reply.point(),
                },
            ));
        }
        Ok(Some(reply))
    }

    fn check_page(&self, hook: HookPoint, len: usize) -> Result<(), HookFailure> {
        if len > self.config.max_page_size {
            let e = AppError::validation(format!(
                "page of {len} records exceeds the limit of {}",
                self.config.max_page_size
            ));
            return Err(HookFailure::invalid_input(hook, &e));
        }
        Ok(())
    }

    fn reconcile(
        &self,
        hook: HookPoint,
        input_len: usize,
        responses: Vec<RecordResponse>,
    ) -> HookOutcome<PageReconciliation> {
        match reconcile_records(hook, input_len, responses) {
            Ok(page) => {
                debug!(
                    hook = %hook,
                    kept = page.kept.len(),
                    dropped = page.dropped.len(),
                    errors = page.errors.len(),
                    "Reconciled page"
                );
                HookOutcome::Success(page)
            }
            Err(violation) => self.violated(hook, &violation),
        }
    }

    fn unexpected<T>(&self, hook: HookPoint, reply: Option<&HookReply>) -> HookOutcome<T> {
        let violation = ContractViolation::UnexpectedReply {
            expected: hook,
            actual: reply.map_or(hook, HookReply::point),
        };
        self.violated(hook, &violation)
    }

    fn violated<T>(&self, hook: HookPoint, violation: &ContractViolation) -> HookOutcome<T> {
        self.fail(HookFailure::from_violation(hook, violation))
    }

    fn fail<T>(&self, failure: HookFailure) -> HookOutcome<T> {
        let outcome = HookOutcome::from_failure(failure);
        match &outcome {
            HookOutcome::Fatal(f) => error!(
                hook = %f.hook,
                scope = %f.scope,
                code = %f.code,
                message = %f.message,
                "Hook failed"
            ),
            HookOutcome::Recoverable(f) => warn!(
                hook = %f.hook,
                scope = %f.scope,
                code = %f.code,
                message = %f.message,
                "Hook failed for one unit"
            ),
            HookOutcome::Success(_) => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use flowhook_entity::Options;

    use crate::hooks::definitions::FailureScope;
    use crate::hooks::outcome::ScriptFailure;
    use crate::hooks::registry::HookHandler;

    type Reply = fn(&HookRequest) -> Result<HookReply, ScriptFailure>;

    #[derive(Debug)]
    struct Scripted(Reply);

    #[async_trait]
    impl HookHandler for Scripted {
        async fn handle(
            &self,
            _ctx: &HookContext,
            request: &HookRequest,
        ) -> Result<HookReply, ScriptFailure> {
            (self.0)(request)
        }

        fn script_id(&self) -> &str {
            "scripted"
        }
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl HookHandler for Stalled {
        async fn handle(
            &self,
            _ctx: &HookContext,
            _request: &HookRequest,
        ) -> Result<HookReply, ScriptFailure> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(HookReply::PostAggregate)
        }

        fn script_id(&self) -> &str {
            "stalled"
        }
    }

    async fn dispatcher_with(hook: HookPoint, reply: Reply) -> HookDispatcher {
        let registry = Arc::new(HookRegistry::new());
        registry.register(hook, Arc::new(Scripted(reply))).await;
        HookDispatcher::new(registry, HostConfig::default())
    }

    fn pre_map_options(data: Vec<Value>) -> PreMapOptions {
        PreMapOptions {
            import: Options::new("c1", "f1", "i1", Job::root("import")).for_import("imp1"),
            data,
        }
    }

    fn scope() -> FilterScope {
        FilterScope {
            page_index: 0,
            settings: Settings::new(),
            test_mode: false,
            job: Job::root("export"),
            delta: None,
        }
    }

    #[tokio::test]
    async fn test_pre_map_reconciles_reply() {
        let dispatcher = dispatcher_with(HookPoint::PreMap, |_| {
            Ok(HookReply::PreMap(vec![
                RecordResponse::keep(json!({"id": 1, "tag": "x"})),
                RecordResponse::drop_record(),
            ]))
        })
        .await;

        let page = dispatcher
            .pre_map(pre_map_options(vec![json!({"id": 1}), json!({"id": 2})]))
            .await
            .into_result()
            .expect("success");
        assert_eq!(page.dropped, vec![1]);
        assert_eq!(page.into_records(), vec![json!({"id": 1, "tag": "x"})]);
    }

    #[tokio::test]
    async fn test_unbound_pre_map_keeps_every_record() {
        let dispatcher = HookDispatcher::new(Arc::new(HookRegistry::new()), HostConfig::default());
        let page = dispatcher
            .pre_map(pre_map_options(vec![json!(1), json!(2)]))
            .await
            .into_result()
            .expect("success");
        assert_eq!(page.into_records(), vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn test_length_mismatch_is_fatal() {
        let dispatcher =
            dispatcher_with(HookPoint::PreMap, |_| Ok(HookReply::PreMap(Vec::new()))).await;
        let outcome = dispatcher.pre_map(pre_map_options(vec![json!(1)])).await;
        assert!(outcome.is_fatal());
        assert_eq!(outcome.failure().map(|f| f.code.as_str()), Some("length_mismatch"));
    }

    #[tokio::test]
    async fn test_wrong_reply_variant_rejected() {
        let dispatcher = dispatcher_with(HookPoint::PreMap, |_| Ok(HookReply::Filter(true))).await;
        let outcome = dispatcher.pre_map(pre_map_options(vec![json!(1)])).await;
        assert_eq!(
            outcome.failure().map(|f| f.code.as_str()),
            Some("unexpected_reply")
        );
    }

    #[tokio::test]
    async fn test_filter_failure_isolated_to_record() {
        let dispatcher = dispatcher_with(HookPoint::Filter, |request| match request {
            HookRequest::Filter(options) => match options.record["id"].as_i64() {
                Some(1) => Ok(HookReply::Filter(true)),
                Some(2) => Ok(HookReply::Filter(false)),
                _ => Err(ScriptFailure::new("boom")),
            },
            _ => Err(ScriptFailure::new("wrong hook")),
        })
        .await;

        let report = dispatcher
            .filter_page(
                vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})],
                &scope(),
            )
            .await
            .into_result()
            .expect("page survives");

        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].index, 0);
        assert_eq!(report.excluded, vec![1]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].index, 2);
        assert_eq!(report.failed[0].failure.scope, FailureScope::Record);
    }

    #[tokio::test]
    async fn test_unbound_branching_reports_no_handler() {
        let dispatcher = HookDispatcher::new(Arc::new(HookRegistry::new()), HostConfig::default());
        let outcome = dispatcher
            .branching(
                BranchingOptions {
                    record: json!({}),
                    settings: Settings::new(),
                    test_mode: false,
                },
                2,
            )
            .await;
        assert!(!outcome.is_fatal());
        assert_eq!(outcome.failure().map(|f| f.code.as_str()), Some("no_handler"));
    }

    #[tokio::test]
    async fn test_branch_index_checked_against_count() {
        let dispatcher =
            dispatcher_with(HookPoint::Branching, |_| Ok(HookReply::Branching(vec![0, 0, 1]))).await;
        let options = BranchingOptions {
            record: json!({}),
            settings: Settings::new(),
            test_mode: false,
        };
        let routed = dispatcher.branching(options.clone(), 2).await;
        assert_eq!(routed.into_result().ok(), Some(vec![0, 1]));
        assert!(dispatcher.branching(options, 1).await.failure().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_abnormal_termination() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register(HookPoint::PostAggregate, Arc::new(Stalled))
            .await;
        let dispatcher = HookDispatcher::new(registry, HostConfig::default());

        let options: PostAggregateOptions = serde_json::from_value(json!({
            "_connectionId": "c1",
            "_flowId": "f1",
            "_integrationId": "i1",
            "_importId": "imp1",
            "settings": {},
            "job": {"_id": "j1", "type": "import", "startedAt": "2024-03-01T10:00:00Z"},
            "sandbox": false,
            "testMode": false,
            "postAggregateData": {"success": true, "_json": {}}
        }))
        .expect("parse");

        let outcome = dispatcher.post_aggregate(options).await;
        assert!(outcome.is_fatal());
        assert_eq!(outcome.failure().map(|f| f.code.as_str()), Some("timeout"));
    }

    #[tokio::test]
    async fn test_oversized_page_rejected_before_invocation() {
        let registry = Arc::new(HookRegistry::new());
        let config = HostConfig {
            max_page_size: 1,
            ..HostConfig::default()
        };
        let dispatcher = HookDispatcher::new(registry, config);
        let outcome = dispatcher
            .pre_map(pre_map_options(vec![json!(1), json!(2)]))
            .await;
        assert_eq!(outcome.failure().map(|f| f.code.as_str()), Some("invalid_input"));
    }

    #[tokio::test]
    async fn test_long_pre_map_reply_is_fatal() {
        let dispatcher = dispatcher_with(HookPoint::PreMap, |_| {
            Ok(HookReply::PreMap(vec![
                RecordResponse::drop_record(),
                RecordResponse::drop_record(),
            ]))
        })
        .await;
        let outcome = dispatcher.pre_map(pre_map_options(vec![json!(1)])).await;
        assert!(outcome.is_fatal());
        assert_eq!(outcome.failure().map(|f| f.code.as_str()), Some("length_mismatch"));
    }

    #[tokio::test]
    async fn test_handle_request_sees_normalized_method() {
        let dispatcher = dispatcher_with(HookPoint::HandleRequest, |request| match request {
            HookRequest::HandleRequest(options) => Ok(HookReply::HandleRequest(
                HandleRequestResponse::new(
                    200,
                    json!({"method": options.method, "body": options.body}),
                ),
            )),
            _ => Err(ScriptFailure::new("wrong hook")),
        })
        .await;

        let options = HandleRequestOptions {
            method: "post".to_string(),
            headers: Default::default(),
            query_string: Default::default(),
            body: Some(json!(42)),
            raw_body: "42".to_string(),
            sandbox: false,
        };
        let response = dispatcher
            .handle_request(options)
            .await
            .into_result()
            .expect("success");
        assert_eq!(response.body, json!({"method": "POST", "body": null}));
    }
}
