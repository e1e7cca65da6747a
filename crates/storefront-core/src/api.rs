// ── Product data-access facade ──
//
// Reads go through the query cache (deduplicated, tagged); writes go
// through `Command` and invalidate their tags once the server accepts
// them. Fetches run on spawned tasks so every subscriber observes the
// same result.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use storefront_api::transport::{TlsMode, TransportConfig};
use storefront_api::types::{ProductForm, ProductPatch};
use storefront_api::ProductsClient;

use crate::cache::{FetchTicket, QueryCache, QueryData, QueryHandle, QueryKey, QueryValue, Tag};
use crate::command::{Command, CommandResult, CreateProductRequest, UpdateProductRequest};
use crate::config::{StoreConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Product, ProductId};

/// Entry point for reading and writing products.
///
/// Cheaply cloneable; clones share the client and the cache. Queries spawn
/// their fetches with `tokio::spawn`, so they must be issued from inside a
/// Tokio runtime.
#[derive(Clone)]
pub struct ProductApi {
    inner: Arc<ProductApiInner>,
}

struct ProductApiInner {
    client: ProductsClient,
    cache: Arc<QueryCache>,
}

impl ProductApi {
    /// Build a client for `config.api_url` with a fresh cache.
    pub fn new(config: &StoreConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = ProductsClient::new(config.api_url.as_str(), &transport)?;
        Ok(Self::with_client(
            client,
            Arc::new(QueryCache::new(config.cache_grace)),
        ))
    }

    /// Compose from an existing client and cache.
    pub fn with_client(client: ProductsClient, cache: Arc<QueryCache>) -> Self {
        Self {
            inner: Arc::new(ProductApiInner { client, cache }),
        }
    }

    pub fn client(&self) -> &ProductsClient {
        &self.inner.client
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.inner.cache
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Subscribe to the full product collection.
    pub fn list_products(&self) -> QueryHandle<Vec<Product>> {
        self.subscribe(QueryKey::ListProducts)
    }

    /// Subscribe to one product.
    pub fn get_product(&self, id: &ProductId) -> QueryHandle<Product> {
        self.subscribe(QueryKey::GetProduct(id.clone()))
    }

    /// One-shot list: subscribe, wait for the result, unsubscribe.
    pub async fn fetch_products(&self) -> Result<Arc<Vec<Product>>, CoreError> {
        let mut handle = self.list_products();
        handle.settled().await
    }

    /// One-shot get.
    pub async fn fetch_product(&self, id: &ProductId) -> Result<Arc<Product>, CoreError> {
        let mut handle = self.get_product(id);
        handle.settled().await
    }

    fn subscribe<T: QueryData>(&self, key: QueryKey) -> QueryHandle<T> {
        let subscription = self.inner.cache.acquire(&key);
        if let Some(ticket) = subscription.ticket {
            self.spawn_fetch(ticket);
        }
        QueryHandle::new(
            self.clone(),
            key,
            subscription.entry_id,
            subscription.receiver,
        )
    }

    pub(crate) fn spawn_fetch(&self, ticket: FetchTicket) {
        let api = self.clone();
        tokio::spawn(async move { api.run_fetch(ticket).await });
    }

    async fn run_fetch(&self, mut ticket: FetchTicket) {
        loop {
            let key = ticket.key().clone();
            let result = self.load(&key).await;
            if let Err(ref e) = result {
                debug!(query = %key, error = %e, "query failed");
            }
            match self.inner.cache.complete(ticket, result) {
                Some(next) => ticket = next,
                None => break,
            }
        }
    }

    async fn load(&self, key: &QueryKey) -> Result<QueryValue, CoreError> {
        let client = &self.inner.client;
        match key {
            QueryKey::ListProducts => {
                let raw = client.list_products().await?;
                let products: Vec<Product> = raw
                    .into_iter()
                    .filter_map(|record| match Product::try_from(record) {
                        Ok(product) => Some(product),
                        Err(e) => {
                            warn!(error = %e, "dropping invalid product record");
                            None
                        }
                    })
                    .collect();
                trace!(count = products.len(), "products loaded");
                Ok(QueryValue::Products(Arc::new(products)))
            }
            QueryKey::GetProduct(id) => {
                let raw = client.get_product(id.as_str()).await?;
                Ok(QueryValue::Product(Arc::new(Product::try_from(raw)?)))
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Execute a mutation. Its tags are invalidated only if the server
    /// accepted it.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let tags = cmd.invalidates();
        route_command(self, cmd, &tags).await
    }

    pub async fn create_product(&self, req: CreateProductRequest) -> Result<Product, CoreError> {
        expect_product(self.execute(Command::CreateProduct(req)).await?)
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        update: UpdateProductRequest,
    ) -> Result<Product, CoreError> {
        expect_product(
            self.execute(Command::UpdateProduct {
                id: id.clone(),
                update,
            })
            .await?,
        )
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CoreError> {
        self.execute(Command::DeleteProduct { id: id.clone() })
            .await
            .map(|_| ())
    }

    /// Invalidate `tags` and start refetches for subscribed entries.
    pub fn invalidate(&self, tags: &[Tag]) {
        let tickets = self.inner.cache.invalidate(tags);
        debug!(?tags, refetching = tickets.len(), "cache invalidated");
        for ticket in tickets {
            self.spawn_fetch(ticket);
        }
    }

    // ── Background collection ────────────────────────────────────────

    /// Periodically evict idle cache entries until `cancel` fires.
    pub fn spawn_gc(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = Arc::clone(&self.inner.cache);
        let period = cache.grace().max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let evicted = cache.sweep();
                        if evicted > 0 {
                            debug!(evicted, "idle cache entries collected");
                        }
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for ProductApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductApi")
            .field("base_url", &self.inner.client.base_url().as_str())
            .field("cached_queries", &self.inner.cache.len())
            .finish()
    }
}

// ── Command routing ──────────────────────────────────────────────────

async fn route_command(
    api: &ProductApi,
    cmd: Command,
    tags: &[Tag],
) -> Result<CommandResult, CoreError> {
    let client = &api.inner.client;

    match cmd {
        Command::CreateProduct(req) => {
            let form = ProductForm::from(req);
            let raw = client.create_product(&form).await?;
            api.invalidate(tags);
            let product = Product::try_from(raw)?;
            info!(id = %product.id, name = %product.name, "product created");
            Ok(CommandResult::Product(product))
        }

        Command::UpdateProduct { id, update } => {
            let patch = ProductPatch::from(update);
            let raw = client.update_product(id.as_str(), &patch).await?;
            api.invalidate(tags);
            let product = Product::try_from(raw)?;
            info!(id = %product.id, "product updated");
            Ok(CommandResult::Product(product))
        }

        Command::DeleteProduct { id } => {
            client.delete_product(id.as_str()).await?;
            api.invalidate(tags);
            info!(%id, "product deleted");
            Ok(CommandResult::Ok)
        }
    }
}

fn expect_product(result: CommandResult) -> Result<Product, CoreError> {
    match result {
        CommandResult::Product(product) => Ok(product),
        CommandResult::Ok => Err(CoreError::Internal(
            "expected a product in the command result".into(),
        )),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &StoreConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
