//! Integration tests for import-side hooks.

mod helpers;

use flowhook::entity::ImportResponse;
use flowhook::hooks::hooks::contracts::post_map::PostMapOptions;
use flowhook::hooks::hooks::contracts::post_response_map::PostResponseMapOptions;
use flowhook::hooks::hooks::contracts::post_submit::PostSubmitOptions;
use flowhook::prelude::*;

use helpers::{Counting, TestHost, calls, import_options};

#[tokio::test]
async fn test_pre_map_tags_first_and_drops_second() {
    let host = TestHost::new();
    host.bind(typed::pre_map("tagger", |options| async move {
        Ok(options
            .data
            .into_iter()
            .map(|mut record| {
                if record["id"] == 1 {
                    record["tag"] = json!("x");
                    RecordResponse::keep(record)
                } else {
                    RecordResponse::drop_record()
                }
            })
            .collect())
    }))
    .await;

    let page = host
        .dispatcher
        .pre_map(PreMapOptions {
            import: import_options(),
            data: vec![json!({"id": 1}), json!({"id": 2})],
        })
        .await
        .into_result()
        .expect("page proceeds");

    assert_eq!(page.dropped, vec![1]);
    assert!(!page.has_errors());
    assert_eq!(page.into_records(), vec![json!({"id": 1, "tag": "x"})]);
}

#[tokio::test]
async fn test_post_map_keeps_record_and_logs_its_error() {
    let host = TestHost::new();
    host.bind(typed::post_map("normalizer", |options| async move {
        Ok(options
            .post_map_data
            .into_iter()
            .map(|record| {
                RecordResponse::keep(record)
                    .with_error(ErrorRecord::new("NORMALIZED", "phone reformatted", "postMap"))
            })
            .collect())
    }))
    .await;

    let page = host
        .dispatcher
        .post_map(PostMapOptions {
            import: import_options(),
            pre_map_data: vec![json!({"phone": "555 0100"})],
            post_map_data: vec![json!({"Phone": "5550100"})],
        })
        .await
        .into_result()
        .expect("page proceeds");

    assert_eq!(page.kept.len(), 1);
    assert_eq!(page.errors.len(), 1);
    assert_eq!(page.errors[0].index, 0);
    assert_eq!(page.errors[0].error.code, "NORMALIZED");
}

#[tokio::test]
async fn test_post_map_short_reply_fails_whole_page() {
    let host = TestHost::new();
    host.bind(typed::post_map("lossy", |_| async {
        Ok(vec![RecordResponse::keep(json!({}))])
    }))
    .await;

    let outcome = host
        .dispatcher
        .post_map(PostMapOptions {
            import: import_options(),
            pre_map_data: vec![json!(1), json!(2)],
            post_map_data: vec![json!(1), json!(2)],
        })
        .await;

    assert!(outcome.is_fatal());
    let failure = outcome.failure().expect("failure");
    assert_eq!(failure.scope, FailureScope::Page);
    assert_eq!(failure.code, "length_mismatch");
}

#[tokio::test]
async fn test_post_submit_throw_fails_page() {
    let host = TestHost::new();
    host.bind(typed::post_submit("auditor", |_| async {
        Err(ScriptFailure::new("audit endpoint unreachable"))
    }))
    .await;

    let outcome = host
        .dispatcher
        .post_submit(PostSubmitOptions {
            import: import_options(),
            pre_map_data: vec![json!({"id": 1})],
            post_map_data: vec![json!({"Id": 1})],
            response_data: vec![ImportResponse::ok(201, "dest-1", json!({"ok": true}))],
        })
        .await;

    assert!(outcome.is_fatal());
    assert_eq!(
        outcome.failure().map(|f| f.message.as_str()),
        Some("audit endpoint unreachable")
    );
}

#[tokio::test]
async fn test_post_submit_may_rewrite_responses() {
    let host = TestHost::new();
    host.bind(typed::post_submit("ignorer", |options| async move {
        Ok(options
            .response_data
            .into_iter()
            .map(|mut response| {
                response.ignored = true;
                response
            })
            .collect())
    }))
    .await;

    let responses = host
        .dispatcher
        .post_submit(PostSubmitOptions {
            import: import_options(),
            pre_map_data: vec![json!({"id": 1})],
            post_map_data: vec![json!({"Id": 1})],
            response_data: vec![ImportResponse::ok(200, "dest-1", json!({}))],
        })
        .await
        .into_result()
        .expect("success");
    assert!(responses[0].ignored);
    assert!(!responses[0].is_success());
}

#[tokio::test]
async fn test_unbound_post_response_map_passes_through() {
    let host = TestHost::new();
    let import = import_options();
    let records = vec![json!({"id": 1, "status": "created"})];

    let result = host
        .dispatcher
        .post_response_map(PostResponseMapOptions {
            options: import.base.clone(),
            export_id: "export-1".into(),
            import_id: import.import_id.clone(),
            post_response_map_data: records.clone(),
            response_data: ImportResponse::ok(200, "dest-1", json!({})),
            one_to_many: false,
            path_to_many: String::new(),
        })
        .await
        .into_result()
        .expect("success");
    assert_eq!(result, records);
}

#[tokio::test]
async fn test_skipped_aggregation_never_invokes_hook() {
    let host = TestHost::with_config(HostConfig {
        skip_aggregation: true,
        ..HostConfig::default()
    });
    let (handler, counter) = Counting::new(HookReply::PostAggregate);
    host.registry
        .register(HookPoint::PostAggregate, handler)
        .await;

    let delivery = host
        .dispatcher
        .post_aggregate(aggregate_options())
        .await
        .into_result()
        .expect("success");

    assert_eq!(delivery, AggregateDelivery::Skipped);
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_aggregation_invokes_hook_once() {
    let host = TestHost::new();
    let (handler, counter) = Counting::new(HookReply::PostAggregate);
    host.registry
        .register(HookPoint::PostAggregate, handler)
        .await;

    let delivery = host
        .dispatcher
        .post_aggregate(aggregate_options())
        .await
        .into_result()
        .expect("success");

    assert_eq!(delivery, AggregateDelivery::Invoked);
    assert_eq!(calls(&counter), 1);
}

fn aggregate_options() -> PostAggregateOptions {
    serde_json::from_value(json!({
        "_connectionId": "conn-1",
        "_flowId": "flow-1",
        "_integrationId": "integ-1",
        "_importId": "import-1",
        "settings": {},
        "job": {"_id": "job-1", "type": "import", "startedAt": "2024-03-01T10:00:00Z"},
        "sandbox": false,
        "testMode": false,
        "postAggregateData": {"success": true, "_json": {"file": "out.csv"}}
    }))
    .expect("aggregate options")
}

fn submitted_page() -> PostSubmitOptions {
    PostSubmitOptions {
        import: import_options(),
        pre_map_data: vec![json!({"id": 1}), json!({"id": 2})],
        post_map_data: vec![json!({"Id": 1}), json!({"Id": 2})],
        response_data: vec![
            ImportResponse::ok(201, "dest-1", json!({})),
            ImportResponse::ok(201, "dest-2", json!({})),
        ],
    }
}

#[tokio::test]
async fn test_post_submit_short_reply_fails_whole_page() {
    let host = TestHost::new();
    host.bind(typed::post_submit("dropper", |mut options| async move {
        options.response_data.pop();
        Ok(options.response_data)
    }))
    .await;

    let outcome = host.dispatcher.post_submit(submitted_page()).await;
    assert!(outcome.is_fatal());
    let failure = outcome.failure().expect("failure");
    assert_eq!(failure.scope, FailureScope::Page);
    assert_eq!(failure.code, "length_mismatch");
}

#[tokio::test]
async fn test_post_submit_disagreeing_inputs_rejected() {
    let (handler, counter) = Counting::new(HookReply::PostSubmit(Vec::new()));
    let host = TestHost::new();
    host.registry.register(HookPoint::PostSubmit, handler).await;

    let mut options = submitted_page();
    options.pre_map_data.pop();

    let outcome = host.dispatcher.post_submit(options).await;
    assert!(outcome.is_fatal());
    assert_eq!(
        outcome.failure().map(|f| f.code.as_str()),
        Some("invalid_input")
    );
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_post_response_map_long_reply_fails_whole_page() {
    let host = TestHost::new();
    host.bind(typed::post_response_map("duplicator", |options| async move {
        let mut records = options.post_response_map_data.clone();
        records.extend(options.post_response_map_data);
        Ok(records)
    }))
    .await;

    let import = import_options();
    let outcome = host
        .dispatcher
        .post_response_map(PostResponseMapOptions {
            options: import.base.clone(),
            export_id: "export-1".into(),
            import_id: import.import_id.clone(),
            post_response_map_data: vec![json!({"id": 1})],
            response_data: ImportResponse::ok(200, "dest-1", json!({})),
            one_to_many: false,
            path_to_many: String::new(),
        })
        .await;

    assert!(outcome.is_fatal());
    let failure = outcome.failure().expect("failure");
    assert_eq!(failure.scope, FailureScope::Page);
    assert_eq!(failure.code, "length_mismatch");
}
