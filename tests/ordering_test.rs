//! Timing-sensitive behavior, driven by the scripted mock API: the test decides when and
//! in which order each request is answered.

use backoffice_store::api::{ApiError, Method, RetryPolicy};
use backoffice_store::framework::mock::{
    create_mock_api, expect_call, list_envelope, spawn_slice, MockApi,
};
use backoffice_store::framework::{
    DependencyGraph, ListQuery, MutationKind, NotificationLevel, Notifier, RefreshParams,
    SliceClient, SliceContext, SliceError, SliceStatus,
};
use backoffice_store::model::{
    Brand, BrandCreate, Discount, DiscountUpdate, Post, PostCreate, PostStatus, ProductDiscount,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn brands(names: &[(u64, &str)]) -> Value {
    let items: Vec<Value> = names
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    Value::Array(items)
}

#[tokio::test]
async fn test_late_response_does_not_overwrite_newer_list() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new().page(0, 2)).await }
    });
    let page1 = expect_call(&mut calls).await.expect("Expected page 1 request");
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new().page(1, 2)).await }
    });
    let page2 = expect_call(&mut calls).await.expect("Expected page 2 request");
    assert_eq!(page1.request.query_param("page"), Some("1"));
    assert_eq!(page2.request.query_param("page"), Some("2"));

    // Page 2 answers first, page 1 last.
    page2.ok(list_envelope("brands", brands(&[(3, "C"), (4, "D")]), Some(4)));
    let newer = second.await.unwrap().unwrap();
    assert_eq!(newer.len(), 2);
    assert!(client.state().is_loading());

    page1.ok(list_envelope("brands", brands(&[(1, "A"), (2, "B")]), Some(4)));
    let stale = first.await.unwrap().unwrap();
    assert_eq!(stale[0].name, "A");

    let state = client.settled().await.unwrap();
    let shown: Vec<&str> = state.items.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(shown, ["C", "D"]);
    assert_eq!(state.last_query.and_then(|q| q.page), Some(1));
    assert_eq!(state.status, SliceStatus::Succeeded);
}

#[tokio::test]
async fn test_error_is_deferred_until_the_last_request_settles() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    let call1 = expect_call(&mut calls).await.unwrap();
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new().filter("status", 1)).await }
    });
    let call2 = expect_call(&mut calls).await.unwrap();

    call2.err(ApiError::server(400, "Bad filter"));
    assert!(second.await.unwrap().is_err());
    let state = client.state();
    assert_eq!(state.status, SliceStatus::Loading);
    assert!(state.error.is_none());

    call1.ok(list_envelope("brands", brands(&[(1, "A")]), None));
    first.await.unwrap().unwrap();

    // The stale success does not hide the latest failure.
    let state = client.settled().await.unwrap();
    assert_eq!(state.status, SliceStatus::Failed);
    assert_eq!(state.error, Some(ApiError::server(400, "Bad filter")));
    assert!(state.items.is_empty());
}

#[tokio::test]
async fn test_write_resolves_after_its_refetch() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.create(BrandCreate::new("Acme")).await }
    });

    let write = expect_call(&mut calls).await.unwrap();
    assert_eq!(write.request.method, Method::Post);
    assert_eq!(write.request.path, "brands/create");
    write.ok(json!({ "brand": { "id": 1, "name": "Acme" } }));

    let refetch = expect_call(&mut calls).await.unwrap();
    assert_eq!(refetch.request.method, Method::Get);
    assert_eq!(refetch.request.path, "brands/shows");
    assert!(!create.is_finished());
    assert!(client.state().is_loading());

    refetch.ok(list_envelope("brands", brands(&[(1, "Acme")]), Some(1)));
    create.await.unwrap().unwrap();

    let state = client.state();
    assert_eq!(state.status, SliceStatus::Succeeded);
    assert_eq!(state.items.len(), 1);
}

#[tokio::test]
async fn test_failed_refetch_after_accepted_write() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let delete = tokio::spawn({
        let client = client.clone();
        async move { client.delete(4).await }
    });
    expect_call(&mut calls).await.unwrap().ok(Value::Null);
    expect_call(&mut calls)
        .await
        .unwrap()
        .err(ApiError::network("connection reset"));

    let err = delete.await.unwrap().unwrap_err();
    assert_eq!(
        err,
        SliceError::RefetchFailed(ApiError::network("connection reset"))
    );
    assert_eq!(client.state().status, SliceStatus::Failed);
}

#[tokio::test]
async fn test_dependents_refresh_after_the_trigger_refetch() {
    let (api, mut calls) = create_mock_api(8);
    let api = Arc::new(api);
    let ctx = SliceContext::new(api).with_retry(RetryPolicy::none());

    let assignments = spawn_slice::<ProductDiscount>(ctx.clone());
    let graph = DependencyGraph::new().on(
        "discount",
        &[MutationKind::Update],
        Arc::new(assignments.clone()),
        |event| {
            RefreshParams::Query(
                ListQuery::new().filter("discountId", event.id.clone().unwrap_or_default()),
            )
        },
    );
    let discounts = spawn_slice::<Discount>(ctx.with_dependents(graph.edges_for("discount")));

    let update = tokio::spawn({
        let discounts = discounts.clone();
        async move {
            discounts
                .update(
                    7,
                    DiscountUpdate {
                        percent: Some(15.0),
                        ..DiscountUpdate::default()
                    },
                )
                .await
        }
    });

    let write = expect_call(&mut calls).await.unwrap();
    assert_eq!(write.request.path, "discounts/update/7");
    assert_eq!(write.request.body, Some(json!({ "percent": 15.0 })));
    write.ok(Value::Null);

    let refetch = expect_call(&mut calls).await.unwrap();
    assert_eq!(refetch.request.path, "discounts/shows");
    // Nothing else goes out until the trigger's own list has landed.
    assert!(calls.try_recv().is_err());
    refetch.ok(list_envelope(
        "discounts",
        json!([{ "id": 7, "name": "Summer", "percent": 15.0 }]),
        Some(1),
    ));

    let dependent = expect_call(&mut calls).await.unwrap();
    assert_eq!(dependent.request.path, "product-discounts/shows");
    assert_eq!(dependent.request.query_param("discountId"), Some("7"));
    assert!(!update.is_finished());
    dependent.ok(list_envelope(
        "productDiscounts",
        json!([{ "id": 1, "productId": 3, "discountId": 7 }]),
        Some(1),
    ));

    update.await.unwrap().unwrap();
    let state = assignments.state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].product_id, 3);
    assert_eq!(discounts.state().items[0].percent, 15.0);
}

#[tokio::test]
async fn test_dependent_failure_does_not_fail_the_write() {
    let (api, mut calls) = create_mock_api(8);
    let ctx = SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none());

    let assignments = spawn_slice::<ProductDiscount>(ctx.clone());
    let graph = DependencyGraph::new().on(
        "discount",
        MutationKind::ALL,
        Arc::new(assignments.clone()),
        |_| RefreshParams::LastQuery,
    );
    let discounts = spawn_slice::<Discount>(ctx.with_dependents(graph.edges_for("discount")));

    let delete = tokio::spawn({
        let discounts = discounts.clone();
        async move { discounts.delete(7).await }
    });
    expect_call(&mut calls).await.unwrap().ok(Value::Null);
    expect_call(&mut calls)
        .await
        .unwrap()
        .ok(list_envelope("discounts", json!([]), Some(0)));
    expect_call(&mut calls)
        .await
        .unwrap()
        .err(ApiError::server(500, "Server Error"));

    delete.await.unwrap().unwrap();
    assert_eq!(assignments.state().status, SliceStatus::Failed);
    assert_eq!(discounts.state().status, SliceStatus::Succeeded);
}

#[tokio::test]
async fn test_abandon_drops_in_flight_lists() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    let call = expect_call(&mut calls).await.unwrap();

    assert_eq!(client.abandon().await.unwrap(), 1);
    assert_eq!(pending.await.unwrap().unwrap_err(), SliceError::Abandoned);

    // Answering afterwards changes nothing.
    call.ok(list_envelope("brands", brands(&[(1, "A")]), Some(1)));
    let state = client.state();
    assert_eq!(state.status, SliceStatus::Idle);
    assert!(state.items.is_empty());
    assert_eq!(client.abandon().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reads_are_retried_and_writes_are_not() {
    let (api, mut calls) = create_mock_api(8);
    let retry = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5));
    let client = spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(retry));

    let list = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    expect_call(&mut calls)
        .await
        .unwrap()
        .err(ApiError::server(503, "Service Unavailable"));
    expect_call(&mut calls)
        .await
        .unwrap()
        .ok(list_envelope("brands", brands(&[(1, "A")]), Some(1)));
    assert_eq!(list.await.unwrap().unwrap().len(), 1);

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.create(BrandCreate::new("B")).await }
    });
    expect_call(&mut calls)
        .await
        .unwrap()
        .err(ApiError::network("timeout"));
    let err = create.await.unwrap().unwrap_err();
    assert_eq!(err, SliceError::Api(ApiError::network("timeout")));
    assert!(calls.try_recv().is_err());
}

#[tokio::test]
async fn test_validation_errors_stay_on_the_form() {
    let (api, mut calls) = create_mock_api(8);
    let notifier = Notifier::new(8);
    let mut notifications = notifier.subscribe();
    let client = spawn_slice::<Brand>(
        SliceContext::new(Arc::new(api))
            .with_retry(RetryPolicy::none())
            .with_notifier(notifier),
    );

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.create(BrandCreate::new("")).await }
    });
    expect_call(&mut calls)
        .await
        .unwrap()
        .err(ApiError::validation([("name", "The name field is required.")]));
    let err = create.await.unwrap().unwrap_err();

    assert_eq!(
        err.field_errors().unwrap()["name"],
        "The name field is required."
    );
    assert_eq!(err.toast_message(), None);
    assert!(notifications.try_recv().is_err());

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.create(BrandCreate::new("Acme")).await }
    });
    expect_call(&mut calls)
        .await
        .unwrap()
        .err(ApiError::server(400, "Brand already exists"));
    let err = create.await.unwrap().unwrap_err();

    assert!(err.field_errors().is_none());
    assert_eq!(err.toast_message().as_deref(), Some("Brand already exists"));
    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.resource, "brand");
    assert_eq!(notification.message, "Brand already exists");
}

#[tokio::test]
async fn test_optimistic_status_is_visible_before_the_server_answers() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Post>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let list = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    expect_call(&mut calls).await.unwrap().ok(list_envelope(
        "posts",
        json!([{ "id": 1, "title": "Hello", "status": "draft" }]),
        Some(1),
    ));
    list.await.unwrap().unwrap();

    let publish = tokio::spawn({
        let client = client.clone();
        async move { client.update_status(1, PostStatus::Published).await }
    });
    let call = expect_call(&mut calls).await.unwrap();
    assert_eq!(call.request.path, "posts/update-status/1");
    assert_eq!(call.request.body, Some(json!({ "status": "published" })));
    assert_eq!(client.state().items[0].status, PostStatus::Published);

    call.err(ApiError::network("timeout"));
    assert!(publish.await.unwrap().is_err());
    let state = client.state();
    assert_eq!(state.items[0].status, PostStatus::Draft);
    assert_eq!(state.error, Some(ApiError::network("timeout")));
}

fn post_slice(api: MockApi) -> SliceClient<Post> {
    spawn_slice::<Post>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()))
}

fn post_ids(client: &SliceClient<Post>) -> Vec<u64> {
    client.state().items.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_created_post_already_listed_is_not_duplicated() {
    let (api, mut calls) = create_mock_api(8);
    let client = post_slice(api);

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.create(PostCreate::new("Hello", "First post")).await }
    });
    let write = expect_call(&mut calls).await.unwrap();
    assert_eq!(write.request.path, "posts/create");

    // A list lands while the create is still in flight and already holds the new post.
    let list = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    expect_call(&mut calls).await.unwrap().ok(list_envelope(
        "posts",
        json!([{ "id": 1, "title": "Hello", "status": "draft" }]),
        Some(1),
    ));
    list.await.unwrap().unwrap();

    write.ok(json!({ "post": { "id": 1, "title": "Hello", "status": "draft" } }));
    create.await.unwrap().unwrap();

    let state = client.settled().await.unwrap();
    assert_eq!(post_ids(&client), [1]);
    assert_eq!(state.total, Some(1));
    assert_eq!(state.status, SliceStatus::Succeeded);
}

#[tokio::test]
async fn test_failed_delete_does_not_duplicate_a_relisted_post() {
    let (api, mut calls) = create_mock_api(8);
    let client = post_slice(api);
    let listed = json!([{ "id": 1, "title": "Hello", "status": "draft" }]);

    let list = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    expect_call(&mut calls)
        .await
        .unwrap()
        .ok(list_envelope("posts", listed.clone(), Some(1)));
    list.await.unwrap().unwrap();

    let delete = tokio::spawn({
        let client = client.clone();
        async move { client.delete(1).await }
    });
    let write = expect_call(&mut calls).await.unwrap();
    assert!(post_ids(&client).is_empty());

    let list = tokio::spawn({
        let client = client.clone();
        async move { client.list(ListQuery::new()).await }
    });
    expect_call(&mut calls)
        .await
        .unwrap()
        .ok(list_envelope("posts", listed, Some(1)));
    list.await.unwrap().unwrap();
    assert_eq!(post_ids(&client), [1]);

    write.err(ApiError::server(400, "Post is pinned"));
    assert!(delete.await.unwrap().is_err());

    let state = client.settled().await.unwrap();
    assert_eq!(post_ids(&client), [1]);
    assert_eq!(state.total, Some(1));
    assert_eq!(state.status, SliceStatus::Failed);
}

#[tokio::test]
async fn test_late_fetch_does_not_replace_the_newer_selection() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.fetch(1).await }
    });
    let call1 = expect_call(&mut calls).await.unwrap();
    assert_eq!(call1.request.path, "brands/show/1");
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.fetch(2).await }
    });
    let call2 = expect_call(&mut calls).await.unwrap();
    assert_eq!(call2.request.path, "brands/show/2");

    call2.ok(json!({ "brand": { "id": 2, "name": "B" } }));
    assert_eq!(second.await.unwrap().unwrap().id, 2);

    // The older fetch still answers its own caller.
    call1.ok(json!({ "brand": { "id": 1, "name": "A" } }));
    assert_eq!(first.await.unwrap().unwrap().id, 1);

    let state = client.settled().await.unwrap();
    assert_eq!(state.selected.map(|b| b.id), Some(2));
    assert_eq!(state.status, SliceStatus::Succeeded);
}

#[tokio::test]
async fn test_late_lookup_does_not_replace_the_newer_result() {
    let (api, mut calls) = create_mock_api(8);
    let client =
        spawn_slice::<Brand>(SliceContext::new(Arc::new(api)).with_retry(RetryPolicy::none()));

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.lookup("active", ListQuery::new().filter("status", 1)).await }
    });
    let call1 = expect_call(&mut calls).await.unwrap();
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.lookup("active", ListQuery::new().filter("status", 1)).await }
    });
    let call2 = expect_call(&mut calls).await.unwrap();

    call2.ok(list_envelope("brands", brands(&[(2, "B")]), Some(1)));
    second.await.unwrap().unwrap();
    call1.ok(list_envelope("brands", brands(&[(1, "A")]), Some(1)));
    assert_eq!(first.await.unwrap().unwrap()[0].id, 1);

    let state = client.settled().await.unwrap();
    assert_eq!(state.lookups["active"][0].id, 2);
    assert!(state.items.is_empty());
}
