use backoffice_store::api::{ApiError, RetryPolicy};
use backoffice_store::clients::{
    BrandClient, InvoiceClient, MediaClient, PostClient, ProductClient, ResourceClient,
};
use backoffice_store::framework::mock::{spawn_slice, InMemoryBackend};
use backoffice_store::framework::{ListQuery, SliceContext, SliceError, SliceStatus};
use backoffice_store::model::{
    Brand, BrandCreate, BrandUpdate, Invoice, InvoiceStatus, Media, Post, PostCreate, PostStatus,
    Product, ProductCreate,
};
use std::sync::Arc;

fn context(backend: &InMemoryBackend) -> SliceContext {
    SliceContext::new(Arc::new(backend.clone())).with_retry(RetryPolicy::none())
}

fn names(brands: &[Brand]) -> Vec<&str> {
    brands.iter().map(|b| b.name.as_str()).collect()
}

fn posts(count: u64) -> Vec<Post> {
    (1..=count)
        .map(|id| Post {
            id,
            title: format!("Post {id}"),
            slug: None,
            content: String::new(),
            status: PostStatus::Draft,
        })
        .collect()
}

fn media(count: u64) -> Vec<Media> {
    (1..=count)
        .map(|id| Media {
            id,
            name: format!("image-{id}.png"),
            path: format!("uploads/image-{id}.png"),
            size: 1024,
            mime_type: Some("image/png".to_string()),
            status: true,
        })
        .collect()
}

/// create -> list -> update -> list -> delete -> list, end to end.
#[tokio::test]
async fn test_brand_lifecycle() {
    let backend = InMemoryBackend::new().register::<Brand>();
    let brands = BrandClient::new(spawn_slice(context(&backend)));

    brands
        .create(BrandCreate::new("Acme"))
        .await
        .expect("Failed to create brand");
    let listed = brands.list(ListQuery::new()).await.expect("Failed to list");
    assert_eq!(names(&listed), ["Acme"]);
    let id = listed[0].id;

    brands
        .update(id, BrandUpdate::name("Acme2"))
        .await
        .expect("Failed to update brand");
    let listed = brands.list(ListQuery::new()).await.expect("Failed to list");
    assert_eq!(names(&listed), ["Acme2"]);

    brands.delete(id).await.expect("Failed to delete brand");
    let listed = brands.list(ListQuery::new()).await.expect("Failed to list");
    assert!(listed.is_empty());

    let state = brands.state();
    assert_eq!(state.status, SliceStatus::Succeeded);
    assert!(state.items.is_empty());
    assert_eq!(state.total, Some(0));
}

#[tokio::test]
async fn test_write_resolves_with_the_refetched_list_in_state() {
    let backend = InMemoryBackend::new().register::<Product>();
    let products = ProductClient::new(spawn_slice(context(&backend)));

    products
        .create(ProductCreate {
            name: "Widget".to_string(),
            price: 9.5,
            stock: 3,
            brand_id: Some(1),
            category_id: None,
        })
        .await
        .unwrap();

    // No explicit list: the write itself reloaded the slice.
    let state = products.state();
    assert_eq!(state.status, SliceStatus::Succeeded);
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "Widget");
    assert_eq!(state.items[0].price, 9.5);
    assert_eq!(state.items[0].brand_id, Some(1));
}

#[tokio::test]
async fn test_deleted_record_is_gone_from_the_list() {
    let backend = InMemoryBackend::new().register::<Brand>();
    let brands = BrandClient::new(spawn_slice(context(&backend)));
    for name in ["A", "B", "C"] {
        brands.create(BrandCreate::new(name)).await.unwrap();
    }

    brands.delete(2).await.unwrap();

    let listed = brands.list(ListQuery::new()).await.unwrap();
    assert!(listed.iter().all(|b| b.id != 2));
    assert_eq!(names(&listed), ["A", "C"]);
}

#[tokio::test]
async fn test_repeated_update_matches_a_single_update() {
    let backend = InMemoryBackend::new().register::<Brand>();
    let brands = BrandClient::new(spawn_slice(context(&backend)));
    brands.create(BrandCreate::new("Acme")).await.unwrap();

    brands.update(1, BrandUpdate::name("Acme2")).await.unwrap();
    let once = brands.state().items;

    brands.update(1, BrandUpdate::name("Acme2")).await.unwrap();
    let twice = brands.state().items;

    assert_eq!(once, twice);
    assert_eq!(backend.records::<Brand>(), twice);
}

#[tokio::test]
async fn test_rejected_create_leaves_items_untouched() {
    let backend = InMemoryBackend::new().register::<Brand>();
    let brands = BrandClient::new(spawn_slice(context(&backend)));
    brands.create(BrandCreate::new("Acme")).await.unwrap();

    let err = brands.create(BrandCreate::new("")).await.unwrap_err();

    assert!(err.field_errors().unwrap().contains_key("name"));
    let state = brands.state();
    assert_eq!(state.status, SliceStatus::Failed);
    assert_eq!(names(&state.items), ["Acme"]);
    assert_eq!(state.error.as_ref(), err.api_error());
}

#[tokio::test]
async fn test_paginated_post_list() {
    let backend = InMemoryBackend::new();
    backend.seed(posts(25));
    let client = PostClient::new(spawn_slice(context(&backend)));

    let first = client.page(0, 10).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].id, 1);
    let state = client.state();
    assert_eq!(state.total, Some(25));
    assert!(state.has_more);

    let second = client.page(1, 10).await.unwrap();
    let ids: Vec<u64> = second.iter().map(|p| p.id).collect();
    assert_eq!(ids, (11..=20).collect::<Vec<_>>());
    assert_eq!(client.state().items, second);

    let last = client.page(2, 10).await.unwrap();
    assert_eq!(last.len(), 5);
    assert!(!client.state().has_more);

    // The client-side page is 0-based, the backend's 1-based.
    let pages: Vec<String> = backend
        .requests()
        .iter()
        .filter_map(|r| r.query_param("page").map(str::to_string))
        .collect();
    assert_eq!(pages, ["1", "2", "3"]);
}

#[tokio::test]
async fn test_infinite_media_scroll() {
    let backend = InMemoryBackend::new();
    backend.seed(media(62));
    let client = MediaClient::new(spawn_slice(context(&backend)));

    let first = client.first_page(&[]).await.unwrap();
    assert_eq!(first.len(), 50);
    assert!(client.state().has_more);

    let more = client.load_more().await.unwrap();
    assert_eq!(more.len(), 12);
    let state = client.state();
    assert_eq!(state.items.len(), 62);
    assert!(!state.has_more);
    assert_eq!(state.last_query.as_ref().and_then(|q| q.page), Some(2));

    // Exhausted: no further request.
    let requests = backend.requests().len();
    assert!(client.load_more().await.unwrap().is_empty());
    assert_eq!(backend.requests().len(), requests);
}

#[tokio::test]
async fn test_media_prefix_filter_restarts_the_library() {
    let backend = InMemoryBackend::new();
    let mut library = media(3);
    library[1].path = "avatars/me.png".to_string();
    backend.seed(library);
    let client = MediaClient::new(spawn_slice(context(&backend)));

    client.first_page(&[]).await.unwrap();
    let avatars = client.first_page(&["avatars/"]).await.unwrap();

    assert_eq!(avatars.len(), 1);
    assert_eq!(client.state().items, avatars);
    assert_eq!(
        backend.requests()[1].query_param("prefix[0]"),
        Some("avatars/")
    );
}

#[tokio::test]
async fn test_media_delete_is_patched_locally() {
    let backend = InMemoryBackend::new();
    backend.seed(media(3));
    let client = MediaClient::new(spawn_slice(context(&backend)));
    client.first_page(&[]).await.unwrap();

    client.delete(2).await.unwrap();

    let ids: Vec<u64> = client.state().items.iter().map(|m| m.id).collect();
    assert_eq!(ids, [1, 3]);
    assert_eq!(backend.records::<Media>().len(), 2);
    // Delete plus the initial list; no refetch.
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_post_publish_and_rollback() {
    let backend = InMemoryBackend::new();
    backend.seed(posts(2));
    let client = PostClient::new(spawn_slice(context(&backend)));
    client.page(0, 10).await.unwrap();

    client.publish(1).await.expect("Failed to publish");
    assert_eq!(client.state().items[0].status, PostStatus::Published);
    assert_eq!(backend.records::<Post>()[0].status, PostStatus::Published);

    backend.fail_next(ApiError::server(500, "Publishing is disabled"));
    let err = client.publish(2).await.unwrap_err();
    assert_eq!(
        err,
        SliceError::Api(ApiError::server(500, "Publishing is disabled"))
    );

    let state = client.state();
    assert_eq!(state.items[1].status, PostStatus::Draft);
    assert_eq!(state.status, SliceStatus::Failed);
    assert_eq!(backend.records::<Post>()[1].status, PostStatus::Draft);
}

#[tokio::test]
async fn test_post_create_inserts_the_server_record() {
    let backend = InMemoryBackend::new().register::<Post>();
    let client = PostClient::new(spawn_slice(context(&backend)));

    client
        .create(PostCreate::new("Hello", "First post"))
        .await
        .unwrap();

    let state = client.state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, 1);
    assert_eq!(state.items[0].title, "Hello");
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_fetch_selects_one_record() {
    let backend = InMemoryBackend::new();
    backend.seed(posts(3));
    let client = PostClient::new(spawn_slice(context(&backend)));

    let post = client.fetch(2).await.unwrap();
    assert_eq!(post.title, "Post 2");
    assert_eq!(client.state().selected, Some(post));

    let err = client.fetch(9).await.unwrap_err();
    assert_eq!(err, SliceError::Api(ApiError::server(404, "Not found")));
}

#[tokio::test]
async fn test_slice_closes_when_clients_drop() {
    let backend = InMemoryBackend::new().register::<Brand>();
    let client = spawn_slice::<Brand>(context(&backend));
    let mut observer = client.subscribe();

    drop(client);

    // The sender side of the state channel goes away with the slice.
    assert!(observer.changed().await.is_err());
}

#[tokio::test]
async fn test_invoice_history_lookup_keeps_the_main_list() {
    let backend = InMemoryBackend::new();
    backend.seed([(1, 5), (2, 6), (3, 5)].map(|(id, customer_id)| Invoice {
        id,
        number: format!("INV-{id:04}"),
        customer_id,
        total: 100.0,
        status: InvoiceStatus::Pending,
    }));
    let invoices = InvoiceClient::new(spawn_slice(context(&backend)));
    invoices.list(ListQuery::new()).await.unwrap();

    let history = invoices.history_for(5).await.unwrap();
    assert_eq!(history.len(), 2);

    let state = invoices.state();
    assert_eq!(state.items.len(), 3);
    assert_eq!(state.lookups[&InvoiceClient::history_key(5)], history);
    assert_eq!(state.last_query, Some(ListQuery::new()));

    invoices.mark_paid(1).await.unwrap();
    let state = invoices.state();
    assert_eq!(state.items.len(), 3);
    assert_eq!(state.items[0].status, InvoiceStatus::Paid);
}
