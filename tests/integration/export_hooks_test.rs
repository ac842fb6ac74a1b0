//! Integration tests for export-side hooks.

mod helpers;

use serde_json::Value;

use flowhook::hooks::hooks::contracts::pre_save_page::PageVariant;
use flowhook::prelude::*;

use helpers::{TestHost, export_options, filter_scope};

fn page(extra: Value) -> PreSavePageOptions {
    let mut value = serde_json::to_value(export_options()).expect("export options");
    let base = value.as_object_mut().expect("object");
    base.insert("data".into(), json!([{"id": 1}, {"id": 2}]));
    base.insert(
        "errors".into(),
        json!([{"code": "RATE", "message": "throttled", "source": "http", "retryDataKey": "k1"}]),
    );
    base.insert(
        "retryData".into(),
        json!({"k1": {"data": {"id": 0}, "stage": "export", "traceKey": "t0"}}),
    );
    base.insert("pageIndex".into(), json!(2));
    if let Value::Object(extra) = extra {
        base.extend(extra);
    }
    serde_json::from_value(value).expect("page options")
}

#[tokio::test]
async fn test_unbound_pre_save_page_passes_page_through() {
    let host = TestHost::new();
    let options = page(json!({}));
    let expected_errors = options.errors.clone();

    let response = host
        .dispatcher
        .pre_save_page(options)
        .await
        .into_result()
        .expect("success");
    assert_eq!(response.data, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(response.errors, expected_errors);
    assert!(!response.abort);
}

#[tokio::test]
async fn test_pre_save_page_cannot_inject_errors() {
    let host = TestHost::new();
    host.bind(typed::pre_save_page("injector", |options| async move {
        let mut response = PreSavePageResponse::pass_through(&options);
        response.errors.push(PageError {
            error: ErrorRecord::new("NEW", "made up", "preSavePage"),
            retry_data_key: "unknown".into(),
        });
        Ok(response)
    }))
    .await;

    let outcome = host.dispatcher.pre_save_page(page(json!({}))).await;
    assert!(outcome.is_fatal());
    let failure = outcome.failure().expect("failure");
    assert_eq!(failure.scope, FailureScope::Flow);
    assert_eq!(failure.code, "injected_error");
}

#[tokio::test]
async fn test_pre_save_page_new_errors_and_abort() {
    let host = TestHost::new();
    host.bind(typed::pre_save_page("stopper", |options| async move {
        let mut response = PreSavePageResponse::pass_through(&options);
        response.data.truncate(1);
        response.abort = true;
        response.new_errors_and_retry_data.push(NewErrorsAndRetryData {
            retry_data: json!({"id": 2}),
            errors: vec![PageError {
                error: ErrorRecord::new("MISSING", "no sku", "preSavePage"),
                retry_data_key: String::new(),
            }],
        });
        Ok(response)
    }))
    .await;

    let response = host
        .dispatcher
        .pre_save_page(page(json!({})))
        .await
        .into_result()
        .expect("success");
    assert!(response.abort);
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.new_errors_and_retry_data.len(), 1);
}

#[test]
fn test_delta_page_exposes_window() {
    let options = page(json!({
        "lastExportDateTime": "2024-03-01T00:00:00Z",
        "currentExportDateTime": "2024-03-02T00:00:00Z"
    }));
    let window = options.delta().expect("delta page");
    assert!(window.last_export_date_time < window.current_export_date_time);
}

#[tokio::test]
async fn test_file_page_with_wrong_file_count_rejected() {
    let host = TestHost::new();
    let options = page(json!({"files": [{"fileMeta": {"filename": "a.csv"}}]}));
    assert!(matches!(options.variant, PageVariant::File { .. }));

    let outcome = host.dispatcher.pre_save_page(options).await;
    assert!(outcome.is_fatal());
    assert_eq!(
        outcome.failure().map(|f| f.code.as_str()),
        Some("invalid_input")
    );
}

#[tokio::test]
async fn test_filter_failure_isolated_to_its_record() {
    let host = TestHost::new();
    host.bind(typed::filter("picky", |options| async move {
        match options.record["id"].as_i64() {
            Some(1) => Ok(true),
            Some(2) => Ok(false),
            _ => Err(ScriptFailure::new("cannot decide")),
        }
    }))
    .await;

    let report = host
        .dispatcher
        .filter_page(
            vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})],
            &filter_scope(),
        )
        .await
        .into_result()
        .expect("page survives a record failure");

    assert_eq!(report.kept.len(), 1);
    assert_eq!(report.kept[0].data, json!({"id": 1}));
    assert_eq!(report.excluded, vec![1]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 2);
    assert_eq!(report.failed[0].failure.scope, FailureScope::Record);
}

#[tokio::test]
async fn test_transform_page_reshapes_and_isolates_failures() {
    let host = TestHost::new();
    host.bind(typed::transform("flatten", |options| async move {
        match options.record.get("name") {
            Some(name) => Ok(json!({"customerName": name})),
            None => Err(ScriptFailure::with_code("MISSING_NAME", "record has no name")),
        }
    }))
    .await;

    let report = host
        .dispatcher
        .transform_page(
            vec![json!({"name": "Ada"}), json!({})],
            &Settings::new(),
            false,
            &Job::root("export"),
        )
        .await
        .into_result()
        .expect("success");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].data, json!({"customerName": "Ada"}));
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].failure.code, "MISSING_NAME");
}

#[tokio::test]
async fn test_branching_routes_to_distinct_branches() {
    let host = TestHost::new();
    host.bind(typed::branching("splitter", |_| async { Ok(vec![2, 0, 2]) }))
        .await;

    let options = BranchingOptions {
        record: json!({"region": "eu"}),
        settings: Settings::new(),
        test_mode: false,
    };
    let routed = host
        .dispatcher
        .branching(options.clone(), 3)
        .await
        .into_result()
        .expect("success");
    assert_eq!(routed, vec![2, 0]);

    let outcome = host.dispatcher.branching(options, 2).await;
    assert!(!outcome.is_fatal());
    assert_eq!(
        outcome.failure().map(|f| f.code.as_str()),
        Some("branch_out_of_range")
    );
}
