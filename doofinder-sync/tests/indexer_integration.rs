//! Integration tests for the Doofinder indexing wrapper and job.
//!
//! These tests drive the real `DoofinderApi` and `IndexingJob` against the
//! recording mock management API, so no network access is needed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use doofinder_sync::{
    ApiSettings, ApiStatus, DoofinderApi, Feed, InMemoryLastModifiedStore, IndexingJob, ItemType,
    JobConfig, LastModifiedStore, Stage, SyncConfig, TempIndexRegistry, TypeOutcome,
};
use doofinder_sync_repository::{
    CreateIndexRequest, ManagementCall, ManagementError, MockManagementApi, Operation, Throttle,
};

struct Harness {
    mock: Arc<MockManagementApi>,
    store: Arc<InMemoryLastModifiedStore>,
    api: DoofinderApi,
}

async fn harness_with(mock: MockManagementApi, settings: ApiSettings) -> Harness {
    let mock = Arc::new(mock);
    let store = Arc::new(InMemoryLastModifiedStore::new());
    let api = DoofinderApi::with_client(Box::new(mock.clone()), settings, store.clone()).await;
    // Engine lookup is not part of the scenarios below.
    mock.clear_calls();

    Harness { mock, store, api }
}

async fn harness(mock: MockManagementApi) -> Harness {
    harness_with(mock, ApiSettings::new(Some("en".to_string()))).await
}

fn products() -> Vec<Value> {
    vec![
        json!({ "id": "1", "title": "Blue shirt", "price": 19.9 }),
        json!({ "id": "2", "title": "Red shirt", "price": 21.5 }),
    ]
}

#[tokio::test]
async fn test_first_batch_creates_temp_index_then_uploads() {
    let h = harness(MockManagementApi::new()).await;
    let mut registry = TempIndexRegistry::new();
    let product = ItemType::new("product");

    let status = h.api.send_batch(&mut registry, &product, &products()).await;

    assert_eq!(status, ApiStatus::Success);
    assert!(registry.has(&product));
    assert_eq!(
        h.mock.calls(),
        vec![
            ManagementCall::CreateTemporaryIndex("product".to_string()),
            ManagementCall::CreateTempBulk {
                index_name: "product".to_string(),
                items: products(),
            },
        ]
    );
}

#[tokio::test]
async fn test_second_batch_skips_temp_index_creation() {
    let h = harness(MockManagementApi::new()).await;
    let mut registry = TempIndexRegistry::new();
    let product = ItemType::new("products");

    h.api.send_batch(&mut registry, &product, &products()).await;
    let status = h.api.send_batch(&mut registry, &product, &products()).await;

    assert_eq!(status, ApiStatus::Success);
    assert_eq!(h.mock.count(Operation::CreateTemporaryIndex), 1);
    assert_eq!(h.mock.count(Operation::CreateTempBulk), 2);
}

#[tokio::test]
async fn test_missing_index_is_created_before_temp_index() {
    let mock = MockManagementApi::new();
    mock.fail_next(
        Operation::CreateTemporaryIndex,
        ManagementError::not_found("Index 'new_type' not found"),
    );
    let h = harness(mock).await;
    let mut registry = TempIndexRegistry::new();
    let new_type = ItemType::new("new_type");
    let items = vec![json!({ "id": "a" })];

    let status = h.api.send_batch(&mut registry, &new_type, &items).await;

    assert_eq!(status, ApiStatus::Success);
    assert!(registry.has(&new_type));
    assert_eq!(
        h.mock.calls(),
        vec![
            ManagementCall::CreateTemporaryIndex("new_type".to_string()),
            ManagementCall::CreateIndex(CreateIndexRequest::generic("new_type")),
            ManagementCall::CreateTemporaryIndex("new_type".to_string()),
            ManagementCall::CreateTempBulk {
                index_name: "new_type".to_string(),
                items,
            },
        ]
    );
}

#[tokio::test]
async fn test_fallback_creates_at_most_one_index_and_retries_once() {
    let mock = MockManagementApi::new();
    mock.fail_next(Operation::CreateTemporaryIndex, ManagementError::not_found("missing"));
    mock.fail_next(Operation::CreateTemporaryIndex, ManagementError::not_found("still missing"));
    let h = harness(mock).await;
    let mut registry = TempIndexRegistry::new();

    let status = h
        .api
        .send_batch(&mut registry, &ItemType::new("post"), &[json!({ "id": 1 })])
        .await;

    assert_eq!(status, ApiStatus::UnknownError);
    assert_eq!(h.mock.count(Operation::CreateIndex), 1);
    assert_eq!(h.mock.count(Operation::CreateTemporaryIndex), 2);
    assert_eq!(h.mock.count(Operation::CreateTempBulk), 0);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_replace_clears_registry_and_commits() {
    let h = harness(MockManagementApi::new()).await;
    let mut registry = TempIndexRegistry::new();
    registry.mark(ItemType::new("product"));
    registry.mark(ItemType::new("post"));

    let status = h.api.replace_index(&mut registry, "product").await;

    assert_eq!(status, ApiStatus::Success);
    assert!(registry.is_empty());
    assert_eq!(
        h.mock.calls(),
        vec![ManagementCall::ReplaceIndex("product".to_string())]
    );
    assert!(h.store.last_modified(Some("en")).is_some());
}

#[tokio::test]
async fn test_replace_clears_registry_even_on_failure() {
    let mock = MockManagementApi::new();
    mock.fail_next(Operation::ReplaceIndex, ManagementError::remote(503, "unavailable"));
    let h = harness(mock).await;
    let mut registry = TempIndexRegistry::new();
    registry.mark(ItemType::new("product"));

    let status = h.api.replace_index(&mut registry, "product").await;

    assert_eq!(status, ApiStatus::UnknownError);
    assert!(registry.is_empty());
    assert!(h.store.last_modified(Some("en")).is_none());
}

#[tokio::test]
async fn test_update_of_missing_item_creates_it() {
    let mock = MockManagementApi::new();
    mock.fail_next(Operation::UpdateItem, ManagementError::bad_request("Item not found"));
    let h = harness(mock).await;
    let data = json!({ "id": "42", "title": "Hello" });
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let status = h
        .api
        .update_item(&ItemType::new("post"), "42", &data, Some(at))
        .await;

    assert_eq!(status, ApiStatus::Success);
    assert_eq!(h.mock.count(Operation::CreateItem), 1);
    assert_eq!(
        h.mock.operations(),
        vec![
            Operation::UpdateItem,
            Operation::ListIndices,
            Operation::CreateIndex,
            Operation::CreateItem,
        ]
    );
    assert_eq!(h.store.last_modified(Some("en")), Some(at));
}

#[tokio::test]
async fn test_update_fallback_creation_failure_is_bad_request() {
    let mock = MockManagementApi::new();
    mock.fail_next(Operation::UpdateItem, ManagementError::bad_request("Item not found"));
    mock.fail_next(Operation::CreateIndex, ManagementError::remote(500, "boom"));
    mock.fail_next(Operation::CreateItem, ManagementError::bad_request("Invalid item"));
    let h = harness(mock).await;

    let status = h
        .api
        .update_item(&ItemType::new("post"), "42", &json!({ "id": "42" }), None)
        .await;

    assert_eq!(status, ApiStatus::BadRequest);
    assert_eq!(h.mock.count(Operation::CreateItem), 1);
    assert!(h.store.last_modified(Some("en")).is_none());
}

#[tokio::test]
async fn test_remove_item_records_last_modified() {
    let h = harness(MockManagementApi::new()).await;

    let status = h.api.remove_item(&ItemType::new("product"), "7", None).await;

    assert_eq!(status, ApiStatus::Success);
    assert_eq!(
        h.mock.calls(),
        vec![ManagementCall::DeleteItem {
            index_name: "product".to_string(),
            item_id: "7".to_string(),
        }]
    );
    assert!(h.store.last_modified(Some("en")).is_some());
}

#[tokio::test]
async fn test_without_engine_no_remote_calls_are_made() {
    let mock = MockManagementApi::new();
    mock.fail_next(Operation::GetSearchEngine, ManagementError::not_allowed("Invalid token"));
    let h = harness(mock).await;
    let mut registry = TempIndexRegistry::new();
    let post = ItemType::new("post");

    assert_eq!(h.api.search_engine_status(), ApiStatus::NotAuthenticated);
    assert_eq!(
        h.api.send_batch(&mut registry, &post, &[json!({})]).await,
        ApiStatus::NotAuthenticated
    );
    assert_eq!(
        h.api.update_item(&post, "1", &json!({}), None).await,
        ApiStatus::NotAuthenticated
    );
    assert_eq!(
        h.api.remove_item(&post, "1", None).await,
        ApiStatus::NotAuthenticated
    );
    assert_eq!(
        h.api.replace_index(&mut registry, "post").await,
        ApiStatus::NotAuthenticated
    );
    assert!(h.mock.calls().is_empty());
}

#[tokio::test]
async fn test_disabled_api_reports_success_without_calls() {
    let h = harness_with(
        MockManagementApi::new(),
        ApiSettings::new(None).disabled(),
    )
    .await;
    let mut registry = TempIndexRegistry::new();
    let page = ItemType::new("page");

    assert!(h.api.is_api_disabled());
    assert_eq!(
        h.api.send_batch(&mut registry, &page, &[json!({})]).await,
        ApiStatus::Success
    );
    assert_eq!(
        h.api.replace_index(&mut registry, "page").await,
        ApiStatus::Success
    );
    assert!(h.mock.calls().is_empty());
    assert_eq!(h.api.api_calls(), 0);
    assert!(h.store.last_modified(None).is_some());
}

#[tokio::test]
async fn test_disabled_api_single_item_operations() {
    let h = harness_with(
        MockManagementApi::new(),
        ApiSettings::new(Some("es".to_string())).disabled(),
    )
    .await;
    let post = ItemType::new("post");
    let updated_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let removed_at = Utc.timestamp_opt(1_700_000_500, 0).unwrap();

    assert_eq!(
        h.api
            .update_item(&post, "42", &json!({ "id": "42" }), Some(updated_at))
            .await,
        ApiStatus::Success
    );
    assert_eq!(h.store.last_modified(Some("es")), Some(updated_at));

    assert_eq!(
        h.api.remove_item(&post, "42", Some(removed_at)).await,
        ApiStatus::Success
    );
    assert_eq!(h.store.last_modified(Some("es")), Some(removed_at));

    assert!(h.mock.calls().is_empty());
    assert_eq!(h.api.api_calls(), 0);
}

#[tokio::test]
async fn test_connect_without_credentials_is_unknown_error() {
    let config = SyncConfig::from_vars(vec![(
        "DOOFINDER_API_HOST".to_string(),
        "eu1-api.doofinder.com".to_string(),
    )])
    .unwrap();
    let store: Arc<dyn LastModifiedStore> = Arc::new(InMemoryLastModifiedStore::new());

    let api = DoofinderApi::connect(&config, None, store).await;

    assert_eq!(api.search_engine_status(), ApiStatus::UnknownError);
    assert_eq!(api.api_calls(), 0);
}

#[tokio::test]
async fn test_job_does_not_replace_failed_type() {
    let mock = MockManagementApi::new();
    mock.fail_next(
        Operation::CreateTempBulk,
        ManagementError::from_response(400, r#"{"error":{"message":"Validation error: title"}}"#),
    );
    let h = harness(mock).await;
    let job = IndexingJob::with_config(h.api, JobConfig { batch_size: 1 });

    // "page" sorts first and takes the scripted bulk failure.
    let mut feed = Feed::new();
    feed.insert(ItemType::new("page"), vec![json!({ "id": "p1" }), json!({ "id": "p2" })]);
    feed.insert(ItemType::new("product"), products());

    let report = job.run(&feed).await;

    assert!(!report.is_success());
    assert_eq!(
        report.outcome(&ItemType::new("page")),
        Some(&TypeOutcome::Failed {
            status: ApiStatus::BadRequest,
            stage: Stage::Upload,
            batches_sent: 0,
        })
    );
    assert_eq!(
        report.outcome(&ItemType::new("product")),
        Some(&TypeOutcome::Replaced {
            batches: 2,
            items: 2
        })
    );

    let replaced: Vec<ManagementCall> = h
        .mock
        .calls()
        .into_iter()
        .filter(|call| call.operation() == Operation::ReplaceIndex)
        .collect();
    assert_eq!(
        replaced,
        vec![ManagementCall::ReplaceIndex("product".to_string())]
    );
    assert_eq!(report.api_calls, job.api().api_calls());
}

#[tokio::test(start_paused = true)]
async fn test_throttled_client_spaces_a_run() {
    let mock = Arc::new(MockManagementApi::new());
    let throttled = Throttle::new(mock.clone(), Duration::from_millis(500));
    let api = DoofinderApi::with_client(
        Box::new(throttled),
        ApiSettings::default(),
        Arc::new(InMemoryLastModifiedStore::new()),
    )
    .await;
    let job = IndexingJob::new(api);

    let mut feed = Feed::new();
    feed.insert(ItemType::new("product"), products());

    let start = tokio::time::Instant::now();
    let report = job.run(&feed).await;

    assert!(report.is_success());
    // Engine lookup, temp index, bulk upload, replace.
    assert_eq!(mock.calls().len(), 4);
    assert!(start.elapsed() >= Duration::from_millis(1500));
}
