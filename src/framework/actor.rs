//! # Slice Engine
//!
//! [`SliceActor`] owns one resource's [`SliceState`] and is the only writer to it.
//! Callers talk to it through a [`SliceClient`]; views observe it through a `watch` channel.
//!
//! ## Concurrency Model
//!
//! The loop never awaits the network itself. Each request is spawned as its own task and
//! its result comes back as a completion message, so a slow read never blocks a write and
//! every state change still happens on the loop, one at a time.
//!
//! ```text
//! SliceClient --request--> [ loop ] --spawn--> api.execute(..)
//!                            ^                      |
//!                            +----- completion -----+
//! ```
//!
//! ## Ordering
//!
//! - Every list gets a generation number. Only the most recently dispatched list may
//!   write `items`; an older response that arrives late is dropped.
//! - Detail fetches and each lookup key are numbered the same way. A late answer still
//!   reaches its own caller but never overwrites `selected` or `lookups[key]`.
//! - A write using [`MutationStrategy::Refetch`] resolves only after the list it
//!   triggered (or a newer one) has been applied, and after the write's dependents have
//!   been refreshed.
//! - `Abandon` aborts every in-flight list and answers its callers with
//!   [`SliceError::Abandoned`].

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::client::SliceClient;
use super::error::SliceError;
use super::message::{Completion, MutationOp, PendingWrite, Response, Rollback, SliceRequest};
use super::notify::Notifier;
use super::orchestrator::{refresh_dependents, DependencyEdge, MutationEvent};
use super::query::ListQuery;
use super::resource::{ListPage, MutationStrategy, Resource};
use super::state::SliceState;
use crate::api::{ApiClient, ApiError, ApiRequest, RetryPolicy};

/// Collaborators injected into a slice when it starts.
#[derive(Clone)]
pub struct SliceContext {
    pub api: Arc<dyn ApiClient>,
    pub retry: RetryPolicy,
    pub notifier: Notifier,
    /// Edges triggered by this slice's writes.
    pub dependents: Arc<[DependencyEdge]>,
}

impl SliceContext {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            notifier: Notifier::default(),
            dependents: Vec::new().into(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_dependents(mut self, dependents: Arc<[DependencyEdge]>) -> Self {
        self.dependents = dependents;
        self
    }
}

struct InFlightList<T> {
    abort: AbortHandle,
    respond_to: Option<Response<Vec<T>>>,
}

/// A write waiting for its refetch to land.
struct RefetchWaiter {
    event: MutationEvent,
    respond_to: Response<()>,
}

type Done<T> = mpsc::UnboundedSender<Completion<T>>;

/// The task that owns a resource slice.
pub struct SliceActor<T: Resource> {
    receiver: mpsc::Receiver<SliceRequest<T>>,
    state: SliceState<T>,
    publisher: watch::Sender<SliceState<T>>,
    generation: u64,
    lists: HashMap<u64, InFlightList<T>>,
    waiters: Vec<RefetchWaiter>,
    fetch_generation: u64,
    lookup_generations: HashMap<String, u64>,
}

impl<T: Resource> SliceActor<T> {
    pub fn new(buffer_size: usize) -> (Self, SliceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let state = SliceState::new(T::NAME);
        let (publisher, observer) = watch::channel(state.clone());
        let actor = Self {
            receiver,
            state,
            publisher,
            generation: 0,
            lists: HashMap::new(),
            waiters: Vec::new(),
            fetch_generation: 0,
            lookup_generations: HashMap::new(),
        };
        (actor, SliceClient::new(sender, observer))
    }

    /// Runs the slice until every client has been dropped.
    pub async fn run(mut self, ctx: SliceContext) {
        let resource = T::NAME;
        info!(resource, strategy = ?T::STRATEGY, mode = ?T::LIST_MODE, "Slice started");

        let (done, mut completions) = mpsc::unbounded_channel();
        loop {
            tokio::select! {
                biased;
                Some(completion) = completions.recv() => self.complete(completion, &ctx, &done),
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle(request, &ctx, &done),
                    None => break,
                },
            }
        }

        for (_, list) in self.lists.drain() {
            list.abort.abort();
        }
        info!(resource, items = self.state.items.len(), "Shutdown");
    }

    fn handle(&mut self, request: SliceRequest<T>, ctx: &SliceContext, done: &Done<T>) {
        match request {
            SliceRequest::List { query, respond_to } => {
                let query = query.unwrap_or_else(|| self.refetch_query());
                self.dispatch_list(query, Some(respond_to), ctx, done);
            }
            SliceRequest::Fetch { id, respond_to } => {
                self.fetch_generation += 1;
                let generation = self.fetch_generation;
                debug!(resource = T::NAME, %id, generation, "Fetch");
                self.state.begin();
                self.publish();
                let request = ApiRequest::get(T::show_path(&id));
                let (api, retry, done) = (ctx.api.clone(), ctx.retry, done.clone());
                tokio::spawn(async move {
                    let result = retry
                        .run(|| api.execute(request.clone()))
                        .await
                        .and_then(T::map_record);
                    let _ = done.send(Completion::Fetch {
                        generation,
                        result,
                        respond_to,
                    });
                });
            }
            SliceRequest::Lookup {
                key,
                query,
                respond_to,
            } => {
                let generation = self.lookup_generations.entry(key.clone()).or_default();
                *generation += 1;
                let generation = *generation;
                debug!(resource = T::NAME, %key, generation, ?query, "Lookup");
                self.state.begin();
                self.publish();
                let request =
                    ApiRequest::get(T::list_path()).with_query(query.to_pairs(T::LIST_MODE));
                let (api, retry, done) = (ctx.api.clone(), ctx.retry, done.clone());
                tokio::spawn(async move {
                    let result = retry
                        .run(|| api.execute(request.clone()))
                        .await
                        .and_then(T::map_list);
                    let _ = done.send(Completion::Lookup {
                        key,
                        generation,
                        result,
                        respond_to,
                    });
                });
            }
            SliceRequest::Mutate { op, respond_to } => self.start_write(op, respond_to, ctx, done),
            SliceRequest::Abandon { respond_to } => {
                let count = self.abandon(ctx);
                let _ = respond_to.send(Ok(count));
            }
        }
    }

    fn refetch_query(&self) -> ListQuery {
        self.state
            .last_query
            .as_ref()
            .map(|query| query.for_refetch(T::LIST_MODE))
            .unwrap_or_default()
    }

    fn dispatch_list(
        &mut self,
        query: ListQuery,
        respond_to: Option<Response<Vec<T>>>,
        ctx: &SliceContext,
        done: &Done<T>,
    ) {
        self.generation += 1;
        let generation = self.generation;
        debug!(resource = T::NAME, generation, ?query, "List");
        self.state.begin();
        self.publish();

        let request = ApiRequest::get(T::list_path()).with_query(query.to_pairs(T::LIST_MODE));
        let (api, retry, done) = (ctx.api.clone(), ctx.retry, done.clone());
        let task = tokio::spawn(async move {
            let result = retry
                .run(|| api.execute(request.clone()))
                .await
                .and_then(T::map_list);
            let _ = done.send(Completion::List {
                generation,
                query,
                result,
            });
        });
        self.lists.insert(
            generation,
            InFlightList {
                abort: task.abort_handle(),
                respond_to,
            },
        );
    }

    fn start_write(
        &mut self,
        op: MutationOp<T>,
        respond_to: Response<()>,
        ctx: &SliceContext,
        done: &Done<T>,
    ) {
        let (request, event) = match op.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(resource = T::NAME, error = %e, "Write rejected before sending");
                let _ = respond_to.send(Err(e));
                return;
            }
        };
        debug!(resource = T::NAME, kind = ?event.kind, id = ?event.id, payload = %event.payload, "Write");

        self.state.begin();
        let rollback = match T::STRATEGY {
            MutationStrategy::LocalPatch => self.apply_optimistic(&op),
            MutationStrategy::Refetch => None,
        };
        self.publish();

        let write = PendingWrite {
            op,
            event,
            rollback,
            respond_to,
        };
        let (api, done) = (ctx.api.clone(), done.clone());
        tokio::spawn(async move {
            let result = api.execute(request).await;
            let _ = done.send(Completion::Write { write, result });
        });
    }

    fn apply_optimistic(&mut self, op: &MutationOp<T>) -> Option<Rollback<T>> {
        match op {
            MutationOp::Create(_) => None,
            MutationOp::Update { id, payload } => self
                .state
                .patch(id, |item| item.apply_update(payload))
                .map(Rollback::Restore),
            MutationOp::UpdateStatus { id, status } => self
                .state
                .patch(id, |item| item.apply_status(status))
                .map(Rollback::Restore),
            MutationOp::Delete { id } => self
                .state
                .remove(id)
                .map(|(index, item)| Rollback::Reinsert { index, item }),
        }
    }

    fn complete(&mut self, completion: Completion<T>, ctx: &SliceContext, done: &Done<T>) {
        match completion {
            Completion::List {
                generation,
                query,
                result,
            } => self.complete_list(generation, query, result, ctx),
            Completion::Fetch {
                generation,
                result,
                respond_to,
            } => {
                if generation != self.fetch_generation {
                    debug!(resource = T::NAME, generation, latest = self.fetch_generation, "Dropping stale fetch");
                    self.state.discard();
                    self.publish();
                    let _ = respond_to.send(result.map_err(SliceError::Api));
                    return;
                }
                let result = match result {
                    Ok(record) => {
                        debug!(resource = T::NAME, id = %record.id(), "Fetched");
                        self.state.selected = Some(record.clone());
                        self.state.succeed();
                        Ok(record)
                    }
                    Err(e) => {
                        warn!(resource = T::NAME, error = %e, "Fetch failed");
                        self.state.fail(e.clone());
                        Err(SliceError::Api(e))
                    }
                };
                self.publish();
                let _ = respond_to.send(result);
            }
            Completion::Lookup {
                key,
                generation,
                result,
                respond_to,
            } => {
                if self.lookup_generations.get(&key) != Some(&generation) {
                    debug!(resource = T::NAME, %key, generation, "Dropping stale lookup");
                    self.state.discard();
                    self.publish();
                    let _ = respond_to.send(result.map(|page| page.items).map_err(SliceError::Api));
                    return;
                }
                let result = match result {
                    Ok(page) => {
                        debug!(resource = T::NAME, %key, items = page.items.len(), "Lookup applied");
                        self.state.lookups.insert(key, page.items.clone());
                        self.state.succeed();
                        Ok(page.items)
                    }
                    Err(e) => {
                        warn!(resource = T::NAME, %key, error = %e, "Lookup failed");
                        self.state.fail(e.clone());
                        Err(SliceError::Api(e))
                    }
                };
                self.publish();
                let _ = respond_to.send(result);
            }
            Completion::Write { write, result } => self.complete_write(write, result, ctx, done),
        }
    }

    fn complete_list(
        &mut self,
        generation: u64,
        query: ListQuery,
        result: Result<ListPage<T>, ApiError>,
        ctx: &SliceContext,
    ) {
        let Some(list) = self.lists.remove(&generation) else {
            debug!(resource = T::NAME, generation, "Ignoring abandoned list");
            return;
        };

        if generation != self.generation {
            debug!(resource = T::NAME, generation, latest = self.generation, "Dropping stale list");
            self.state.discard();
            self.publish();
            if let Some(respond_to) = list.respond_to {
                let _ = respond_to.send(result.map(|page| page.items).map_err(SliceError::Api));
            }
            return;
        }

        match result {
            Ok(page) => {
                let items = list.respond_to.as_ref().map(|_| page.items.clone());
                self.state.apply_list(page, query, T::LIST_MODE);
                self.state.succeed();
                info!(
                    resource = T::NAME,
                    generation,
                    items = self.state.items.len(),
                    total = ?self.state.total,
                    has_more = self.state.has_more,
                    "List applied"
                );
                self.publish();
                if let (Some(respond_to), Some(items)) = (list.respond_to, items) {
                    let _ = respond_to.send(Ok(items));
                }
                self.release_waiters(Ok(()), ctx);
            }
            Err(e) => {
                warn!(resource = T::NAME, generation, error = %e, "List failed");
                self.state.fail(e.clone());
                self.publish();
                if let Some(respond_to) = list.respond_to {
                    let _ = respond_to.send(Err(SliceError::Api(e.clone())));
                }
                self.release_waiters(Err(SliceError::RefetchFailed(e)), ctx);
            }
        }
    }

    fn complete_write(
        &mut self,
        write: PendingWrite<T>,
        result: Result<serde_json::Value, ApiError>,
        ctx: &SliceContext,
        done: &Done<T>,
    ) {
        let PendingWrite {
            op,
            event,
            rollback,
            respond_to,
        } = write;

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                warn!(resource = T::NAME, kind = ?event.kind, id = ?event.id, error = %e, "Write failed");
                if let Some(rollback) = rollback {
                    self.rollback(rollback);
                }
                self.state.fail(e.clone());
                self.publish();
                ctx.notifier.failure(T::NAME, &e);
                let _ = respond_to.send(Err(SliceError::Api(e)));
                return;
            }
        };

        info!(resource = T::NAME, kind = ?event.kind, id = ?event.id, "Write accepted");
        ctx.notifier
            .success(T::NAME, format!("{} {}", T::NAME, event.kind.past_tense()));

        match T::STRATEGY {
            MutationStrategy::Refetch => {
                let query = self.refetch_query();
                self.dispatch_list(query, None, ctx, done);
                self.state.succeed();
                self.publish();
                self.waiters.push(RefetchWaiter { event, respond_to });
            }
            MutationStrategy::LocalPatch => match self.reconcile(&op, data) {
                Ok(()) => {
                    self.state.succeed();
                    self.publish();
                    finish_write(ctx.dependents.clone(), event, Ok(()), respond_to);
                }
                Err(e) => {
                    warn!(resource = T::NAME, error = %e, "Write response unusable");
                    self.state.fail(e.clone());
                    self.publish();
                    let _ = respond_to.send(Err(SliceError::Api(e)));
                }
            },
        }
    }

    /// Brings a locally patched slice in line with the server's answer.
    fn reconcile(&mut self, op: &MutationOp<T>, data: serde_json::Value) -> Result<(), ApiError> {
        match op {
            MutationOp::Create(_) => {
                let record = T::map_record(data)?;
                self.state.insert_created(record);
            }
            MutationOp::Update { .. } | MutationOp::UpdateStatus { .. } => {
                // Some endpoints answer with an empty body; the optimistic patch stands.
                if let Ok(record) = T::map_record(data) {
                    self.state.replace(record);
                }
            }
            MutationOp::Delete { .. } => {}
        }
        Ok(())
    }

    fn rollback(&mut self, rollback: Rollback<T>) {
        match rollback {
            Rollback::Restore(item) => {
                // No-op when a newer list no longer holds the record.
                debug!(resource = T::NAME, id = %item.id(), "Rolling back patch");
                self.state.replace(item);
            }
            Rollback::Reinsert { index, item } => {
                debug!(resource = T::NAME, id = %item.id(), index, "Rolling back delete");
                self.state.reinsert(index, item);
            }
        }
    }

    fn abandon(&mut self, ctx: &SliceContext) -> usize {
        let count = self.lists.len();
        for (_, list) in self.lists.drain() {
            list.abort.abort();
            if let Some(respond_to) = list.respond_to {
                let _ = respond_to.send(Err(SliceError::Abandoned));
            }
        }
        self.state.abandon(count);
        self.release_waiters(Err(SliceError::Abandoned), ctx);
        info!(resource = T::NAME, count, status = ?self.state.status, "Abandoned lists");
        self.publish();
        count
    }

    fn release_waiters(&mut self, result: Result<(), SliceError>, ctx: &SliceContext) {
        for waiter in self.waiters.drain(..) {
            finish_write(
                ctx.dependents.clone(),
                waiter.event,
                result.clone(),
                waiter.respond_to,
            );
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

/// Refreshes dependents of a successful write, then answers its caller.
fn finish_write(
    dependents: Arc<[DependencyEdge]>,
    event: MutationEvent,
    result: Result<(), SliceError>,
    respond_to: Response<()>,
) {
    tokio::spawn(async move {
        refresh_dependents(&dependents, &event).await;
        let _ = respond_to.send(result);
    });
}
