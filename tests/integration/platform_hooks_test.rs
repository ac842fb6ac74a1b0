//! Integration tests for platform hooks and job ancestry.

mod helpers;

use std::collections::BTreeMap;

use flowhook::prelude::*;

use helpers::TestHost;

#[tokio::test]
async fn test_router_selects_flow_from_header() {
    let host = TestHost::new();
    host.bind(typed::flow_router("router", |options| async move {
        let flow = match options.header("X-Order-Type") {
            Some("refund") => "flow-refunds",
            _ => "flow-orders",
        };
        Ok(FlowRoute {
            flow_id: FlowId::from(flow),
            export_id: ExportId::from("listener-1"),
        })
    }))
    .await;

    let options: FlowRouterOptions = serde_json::from_value(json!({
        "httpHeaders": {"x-order-type": "refund"},
        "mimeHeaders": {},
        "rawMessageBody": "{}"
    }))
    .expect("router options");

    let route = host
        .dispatcher
        .route_message(options)
        .await
        .into_result()
        .expect("routed");
    assert_eq!(route.flow_id.as_str(), "flow-refunds");
}

#[tokio::test]
async fn test_router_failure_only_fails_the_message() {
    let host = TestHost::new();
    host.bind(typed::flow_router("router", |_| async {
        Err(ScriptFailure::new("unroutable"))
    }))
    .await;

    let options: FlowRouterOptions =
        serde_json::from_value(json!({"rawMessageBody": ""})).expect("router options");
    let outcome = host.dispatcher.route_message(options).await;
    assert!(!outcome.is_fatal());
    assert_eq!(
        outcome.failure().map(|f| f.scope),
        Some(FailureScope::Request)
    );
}

#[tokio::test]
async fn test_form_init_returns_definition() {
    let host = TestHost::new();
    host.bind(typed::form_init("forms", |options| async move {
        let mut form = FormDefinition::new();
        form.insert("title".into(), options.resource["name"].clone());
        Ok(form)
    }))
    .await;

    let options: FormInitOptions =
        serde_json::from_value(json!({"resource": {"name": "Orders"}})).expect("form options");
    let form = host
        .dispatcher
        .form_init(options)
        .await
        .into_result()
        .expect("form");
    assert_eq!(form["title"], json!("Orders"));
}

#[tokio::test]
async fn test_handle_request_sees_raw_and_parsed_body() {
    let host = TestHost::new();
    host.bind(typed::handle_request("api", |options| async move {
        Ok(HandleRequestResponse::new(
            202,
            json!({"parsed": options.body.is_some(), "raw": options.raw_body}),
        ))
    }))
    .await;

    let request = HandleRequestOptions::from_raw(
        "post",
        BTreeMap::new(),
        BTreeMap::new(),
        "a=1&b=2",
        false,
    )
    .expect("request");

    let response = host
        .dispatcher
        .handle_request(request)
        .await
        .into_result()
        .expect("response");
    assert_eq!(response.status_code, 202);
    assert_eq!(response.body, json!({"parsed": false, "raw": "a=1&b=2"}));
}

#[tokio::test]
async fn test_handle_request_bad_status_rejected() {
    let host = TestHost::new();
    host.bind(typed::handle_request("api", |_| async {
        Ok(HandleRequestResponse::new(42, Value::Null))
    }))
    .await;

    let request =
        HandleRequestOptions::from_raw("GET", BTreeMap::new(), BTreeMap::new(), "", false)
            .expect("request");
    let outcome = host.dispatcher.handle_request(request).await;
    assert_eq!(
        outcome.failure().map(|f| f.code.as_str()),
        Some("invalid_status_code")
    );
}

/// Answers transform with the types of the job's ancestry, nearest first.
#[derive(Debug)]
struct Lineage;

#[async_trait]
impl HookHandler for Lineage {
    async fn handle(
        &self,
        ctx: &HookContext,
        request: &HookRequest,
    ) -> Result<HookReply, ScriptFailure> {
        let HookRequest::Transform(options) = request else {
            return Err(ScriptFailure::new("transform only"));
        };
        let chain = ctx
            .job_chain(&options.job.id)
            .await
            .map_err(|e| ScriptFailure::new(e.message))?;
        let types: Vec<&str> = chain.iter().map(|job| job.job_type.as_str()).collect();
        Ok(HookReply::Transform(json!(types)))
    }

    fn script_id(&self) -> &str {
        "lineage"
    }
}

#[tokio::test]
async fn test_job_chain_walks_to_root() {
    let host = TestHost::new();
    host.registry
        .register(HookPoint::Transform, Arc::new(Lineage))
        .await;

    let flow = Job::root("flow");
    let export = Job::child_of(&flow, "export");
    let retry = Job::child_of(&export, "retry");
    for job in [flow, export, retry.clone()] {
        host.dispatcher.register_job(job).await.expect("register");
    }

    let types = host
        .dispatcher
        .transform(TransformOptions {
            record: json!({}),
            settings: Settings::new(),
            test_mode: false,
            job: retry,
        })
        .await
        .into_result()
        .expect("success");
    assert_eq!(types, json!(["retry", "export", "flow"]));
}

#[tokio::test]
async fn test_unknown_parent_rejected() {
    let host = TestHost::new();
    let orphan = Job::child_of(&Job::root("flow"), "export");
    assert!(host.dispatcher.register_job(orphan).await.is_err());
}

#[tokio::test]
async fn test_embedded_parent_job_chain_reaches_handler() {
    let host = TestHost::new();
    host.registry
        .register(HookPoint::Transform, Arc::new(Lineage))
        .await;

    let job = json!({
        "_id": "retry-1",
        "type": "retry",
        "startedAt": "2024-03-01T10:02:00Z",
        "parentJob": {
            "_id": "export-1",
            "type": "export",
            "startedAt": "2024-03-01T10:01:00Z",
            "parentJob": {"_id": "flow-1", "type": "flow", "startedAt": "2024-03-01T10:00:00Z"}
        }
    });
    let leaf = host.dispatcher.ingest_job(&job).await.expect("ingest");
    assert_eq!(leaf.as_str(), "retry-1");

    let options: TransformOptions =
        serde_json::from_value(json!({"record": {}, "job": job})).expect("transform options");
    assert_eq!(
        options.job.parent_job_id.as_ref().map(|id| id.as_str()),
        Some("export-1")
    );

    let types = host
        .dispatcher
        .transform(options)
        .await
        .into_result()
        .expect("success");
    assert_eq!(types, json!(["retry", "export", "flow"]));
}
