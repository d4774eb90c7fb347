use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::api::{ApiClient, HttpApi, RetryPolicy};
use crate::clients::{
    AuthClient, BrandClient, CategoryClient, ContactClient, DiscountClient, InvoiceClient,
    MediaClient, PageClient, PostClient, ProductClient, ProductDiscountClient, ResourceClient,
    RoleClient, UserClient,
};
use crate::config::{ConfigError, StoreConfig};
use crate::framework::{
    DependencyGraph, ListQuery, MutationKind, Notification, Notifier, OrchestratorError,
    RefreshParams, Resource, SliceActor, SliceContext,
};
use crate::model::{
    Brand, Category, Contact, Discount, Invoice, Media, Page, Post, Product, ProductDiscount,
    Role, User,
};
use crate::session::{FileStorage, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Dependencies(#[from] OrchestratorError),
    #[error("Failed to encode snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("Slice task failed: {0}")]
    Task(#[from] JoinError),
}

/// The composition root of the back office.
///
/// `BackofficeStore` is responsible for:
/// - **Lifecycle Management**: Starting one slice task per resource and stopping them all
/// - **Dependency Wiring**: Declaring which writes refresh which other slices
/// - **Persistence**: Restoring the session subtree before any request is made
///
/// # Dependency Edges
///
/// | Trigger | Writes | Dependent | Reloaded with |
/// |---------|--------|-----------|---------------|
/// | `discount` | update, status, delete | `product_discount` | `discountId` filter |
/// | `product` | delete | `product_discount` | its last query |
/// | `brand`, `category` | update, status, delete | `product` | its last query |
/// | `role` | update, delete | `user` | its last query |
///
/// # Example
///
/// ```ignore
/// let store = BackofficeStore::connect(&StoreConfig::default())?;
/// store.brands.list(ListQuery::new().page(0, 20)).await?;
/// println!("{}", store.snapshot()?["brand"]["status"]);
/// store.shutdown().await?;
/// ```
pub struct BackofficeStore {
    pub brands: BrandClient,
    pub categories: CategoryClient,
    pub products: ProductClient,
    pub discounts: DiscountClient,
    pub product_discounts: ProductDiscountClient,
    pub invoices: InvoiceClient,
    pub contacts: ContactClient,
    pub pages: PageClient,
    pub posts: PostClient,
    pub media: MediaClient,
    pub roles: RoleClient,
    pub users: UserClient,
    pub auth: AuthClient,

    session: SessionStore,
    notifier: Notifier,
    handles: Vec<JoinHandle<()>>,
}

/// Names of every slice in the tree, in snapshot order.
pub const RESOURCE_NAMES: [&str; 12] = [
    Brand::NAME,
    Category::NAME,
    Product::NAME,
    Discount::NAME,
    ProductDiscount::NAME,
    Invoice::NAME,
    Contact::NAME,
    Page::NAME,
    Post::NAME,
    Media::NAME,
    Role::NAME,
    User::NAME,
];

impl BackofficeStore {
    /// Restores the session from disk and starts every slice against the HTTP backend.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let storage = Arc::new(FileStorage::new(&config.storage.dir));
        let session = SessionStore::restore(storage, &config.app_id);
        let api = HttpApi::new(&config.api, session.clone())?;
        Self::assemble(config, Arc::new(api), session)
    }

    /// Starts every slice against `api`.
    ///
    /// Fails without spawning anything if the dependency edges form a cycle.
    pub fn assemble(
        config: &StoreConfig,
        api: Arc<dyn ApiClient>,
        session: SessionStore,
    ) -> Result<Self, StoreError> {
        let buffer = config.runtime.channel_buffer;

        // 1. Create actors (clients exist before anything runs)
        let (brand_actor, brands) = SliceActor::<Brand>::new(buffer);
        let (category_actor, categories) = SliceActor::<Category>::new(buffer);
        let (product_actor, products) = SliceActor::<Product>::new(buffer);
        let (discount_actor, discounts) = SliceActor::<Discount>::new(buffer);
        let (product_discount_actor, product_discounts) =
            SliceActor::<ProductDiscount>::new(buffer);
        let (invoice_actor, invoices) = SliceActor::<Invoice>::new(buffer);
        let (contact_actor, contacts) = SliceActor::<Contact>::new(buffer);
        let (page_actor, pages) = SliceActor::<Page>::new(buffer);
        let (post_actor, posts) = SliceActor::<Post>::new(buffer);
        let (media_actor, media) = SliceActor::<Media>::new(buffer);
        let (role_actor, roles) = SliceActor::<Role>::new(buffer);
        let (user_actor, users) = SliceActor::<User>::new(buffer);

        // 2. Declare and check the dependency edges
        let writes = [
            MutationKind::Update,
            MutationKind::UpdateStatus,
            MutationKind::Delete,
        ];
        let graph = DependencyGraph::new()
            .on(
                Discount::NAME,
                &writes,
                Arc::new(product_discounts.clone()),
                |event| match &event.id {
                    Some(id) => RefreshParams::Query(ListQuery::new().filter("discountId", id)),
                    None => RefreshParams::LastQuery,
                },
            )
            .on(
                Product::NAME,
                &[MutationKind::Delete],
                Arc::new(product_discounts.clone()),
                |_| RefreshParams::LastQuery,
            )
            .on(
                Brand::NAME,
                &writes,
                Arc::new(products.clone()),
                |_| RefreshParams::LastQuery,
            )
            .on(
                Category::NAME,
                &writes,
                Arc::new(products.clone()),
                |_| RefreshParams::LastQuery,
            )
            .on(
                Role::NAME,
                &[MutationKind::Update, MutationKind::Delete],
                Arc::new(users.clone()),
                |_| RefreshParams::LastQuery,
            );
        graph.validate()?;

        // 3. Start actors with injected context
        let notifier = Notifier::new(config.runtime.notification_buffer);
        let base = SliceContext::new(api.clone())
            .with_retry(RetryPolicy::from(&config.retry))
            .with_notifier(notifier.clone());
        let handles = vec![
            start(brand_actor, &base, &graph),
            start(category_actor, &base, &graph),
            start(product_actor, &base, &graph),
            start(discount_actor, &base, &graph),
            start(product_discount_actor, &base, &graph),
            start(invoice_actor, &base, &graph),
            start(contact_actor, &base, &graph),
            start(page_actor, &base, &graph),
            start(post_actor, &base, &graph),
            start(media_actor, &base, &graph),
            start(role_actor, &base, &graph),
            start(user_actor, &base, &graph),
        ];

        info!(
            slices = handles.len(),
            edges = graph.edges().len(),
            authenticated = session.current().is_authenticated(),
            "Store assembled"
        );

        Ok(Self {
            brands: BrandClient::new(brands),
            categories: CategoryClient::new(categories),
            products: ProductClient::new(products),
            discounts: DiscountClient::new(discounts),
            product_discounts: ProductDiscountClient::new(product_discounts),
            invoices: InvoiceClient::new(invoices),
            contacts: ContactClient::new(contacts),
            pages: PageClient::new(pages),
            posts: PostClient::new(posts),
            media: MediaClient::new(media),
            roles: RoleClient::new(roles),
            users: UserClient::new(users),
            auth: AuthClient::new(api, session.clone()),
            session,
            notifier,
            handles,
        })
    }

    pub fn resource_names(&self) -> &'static [&'static str] {
        &RESOURCE_NAMES
    }

    /// The whole tree as JSON: one entry per resource name plus `session`.
    pub fn snapshot(&self) -> Result<Value, StoreError> {
        let mut tree = Map::new();
        tree.insert(Brand::NAME.into(), serde_json::to_value(self.brands.state())?);
        tree.insert(Category::NAME.into(), serde_json::to_value(self.categories.state())?);
        tree.insert(Product::NAME.into(), serde_json::to_value(self.products.state())?);
        tree.insert(Discount::NAME.into(), serde_json::to_value(self.discounts.state())?);
        tree.insert(
            ProductDiscount::NAME.into(),
            serde_json::to_value(self.product_discounts.state())?,
        );
        tree.insert(Invoice::NAME.into(), serde_json::to_value(self.invoices.state())?);
        tree.insert(Contact::NAME.into(), serde_json::to_value(self.contacts.state())?);
        tree.insert(Page::NAME.into(), serde_json::to_value(self.pages.state())?);
        tree.insert(Post::NAME.into(), serde_json::to_value(self.posts.state())?);
        tree.insert(Media::NAME.into(), serde_json::to_value(self.media.state())?);
        tree.insert(Role::NAME.into(), serde_json::to_value(self.roles.state())?);
        tree.insert(User::NAME.into(), serde_json::to_value(self.users.state())?);
        tree.insert("session".into(), serde_json::to_value(self.session.current())?);
        Ok(Value::Object(tree))
    }

    /// Transient success and error notifications from every slice.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn can(&self, permission: &str) -> bool {
        self.session.can(permission)
    }

    /// Gracefully shuts down every slice.
    ///
    /// Dropping the clients closes the request channels. A slice that other slices
    /// depend on stays up until its triggers have exited and released their handles to it.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!("Shutting down store...");

        let Self {
            brands,
            categories,
            products,
            discounts,
            product_discounts,
            invoices,
            contacts,
            pages,
            posts,
            media,
            roles,
            users,
            auth,
            session,
            notifier,
            handles,
        } = self;

        // Step 1: Close all channels by dropping clients
        drop((brands, categories, products, discounts, product_discounts, invoices));
        drop((contacts, pages, posts, media, roles, users, auth));
        drop((session, notifier));

        // Step 2: Wait for all slice tasks to complete, reporting the first failure
        let mut first_error = None;
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Slice task failed: {:?}", e);
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }

        info!("Store shutdown complete.");
        Ok(())
    }
}

fn start<T: Resource>(
    actor: SliceActor<T>,
    base: &SliceContext,
    graph: &DependencyGraph,
) -> JoinHandle<()> {
    let ctx = base.clone().with_dependents(graph.edges_for(T::NAME));
    tokio::spawn(actor.run(ctx))
}
