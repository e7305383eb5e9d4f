use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::sync::Notify;

use crate::CacheEntry;
use crate::EventHandler;
use crate::HandlerToken;
use crate::ObjectKey;
use crate::ObjectStore;
use crate::ObjectWatcher;
use crate::RegistrationError;
use crate::ResourceEvent;
use crate::Result;
use crate::WatcherFactory;

/// In-memory watch source driven directly by tests.
///
/// `run` publishes the seeded object (waiting on the sync gate first,
/// when one was requested), flips the synced flag, then parks until the
/// shutdown signal fires. The `deliver_*` methods mutate the store and
/// fan events out to registered handlers synchronously, standing in for
/// the remote stream.
pub struct FakeWatcher<T> {
    key: ObjectKey,
    store: Arc<ObjectStore>,
    handlers: DashMap<HandlerToken, Arc<dyn EventHandler<T>>>,
    next_token: AtomicU64,
    synced: AtomicBool,
    run_count: AtomicU64,
    sync_gate: Option<Arc<Notify>>,
    seed: Option<Arc<T>>,
}

impl<T> FakeWatcher<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(key: ObjectKey) -> Arc<Self> {
        Arc::new(Self::build(key, None, None))
    }

    /// Watcher whose initial listing already contains `object`.
    pub fn seeded(
        key: ObjectKey,
        object: T,
    ) -> Arc<Self> {
        Arc::new(Self::build(key, Some(Arc::new(object)), None))
    }

    /// Watcher whose initial listing blocks until the returned gate is
    /// notified, so tests can observe the not-yet-synced window.
    pub fn gated(
        key: ObjectKey,
        object: T,
    ) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let watcher = Arc::new(Self::build(key, Some(Arc::new(object)), Some(gate.clone())));
        (watcher, gate)
    }

    fn build(
        key: ObjectKey,
        seed: Option<Arc<T>>,
        sync_gate: Option<Arc<Notify>>,
    ) -> Self {
        Self {
            key,
            store: Arc::new(ObjectStore::new()),
            handlers: DashMap::new(),
            next_token: AtomicU64::new(0),
            synced: AtomicBool::new(false),
            run_count: AtomicU64::new(0),
            sync_gate,
            seed,
        }
    }

    /// How many times the list+watch loop has been started. A fresh
    /// watch instance shows a fresh sync cycle here.
    pub fn run_count(&self) -> u64 {
        self.run_count.load(Ordering::SeqCst)
    }

    pub fn num_handlers(&self) -> usize {
        self.handlers.len()
    }

    pub fn deliver_add(
        &self,
        object: T,
    ) {
        let object = Arc::new(object);
        let entry: CacheEntry = object.clone();
        self.store.insert(self.key.cache_key(), entry);
        self.fan_out(ResourceEvent::Added(object));
    }

    pub fn deliver_update(
        &self,
        old: T,
        new: T,
    ) {
        let new = Arc::new(new);
        let entry: CacheEntry = new.clone();
        self.store.insert(self.key.cache_key(), entry);
        self.fan_out(ResourceEvent::Updated {
            old: Arc::new(old),
            new,
        });
    }

    pub fn deliver_delete(&self) {
        if let Some(entry) = self.store.remove(&self.key.cache_key()) {
            if let Ok(object) = entry.downcast::<T>() {
                self.fan_out(ResourceEvent::Deleted(object));
            }
        }
    }

    /// Plants a wrong-typed store entry, simulating a collaborator
    /// violating the cache contract.
    pub fn poison_cache(&self) {
        let entry: CacheEntry = Arc::new("not the watched object type");
        self.store.insert(self.key.cache_key(), entry);
    }

    fn fan_out(
        &self,
        event: ResourceEvent<T>,
    ) {
        for handler in self.handlers.iter() {
            handler.value().handle(event.clone());
        }
    }
}

#[async_trait]
impl<T> ObjectWatcher<T> for FakeWatcher<T>
where
    T: Send + Sync + 'static,
{
    async fn run(
        &self,
        mut shutdown: watch::Receiver<()>,
    ) {
        self.run_count.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.sync_gate {
            tokio::select! {
                _ = gate.notified() => {}
                _ = shutdown.changed() => {
                    return;
                }
            }
        }

        if let Some(seed) = &self.seed {
            let entry: CacheEntry = seed.clone();
            self.store.insert(self.key.cache_key(), entry);
        }
        self.synced.store(true, Ordering::SeqCst);

        let _ = shutdown.changed().await;
    }

    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }

    fn add_handler(
        &self,
        handler: Arc<dyn EventHandler<T>>,
    ) -> Result<HandlerToken> {
        let token = HandlerToken::new(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.handlers.insert(token, handler);
        Ok(token)
    }

    fn remove_handler(
        &self,
        token: HandlerToken,
    ) -> Result<()> {
        match self.handlers.remove(&token) {
            Some(_) => Ok(()),
            None => Err(RegistrationError::UnknownToken { token }.into()),
        }
    }

    fn store(&self) -> Arc<ObjectStore> {
        self.store.clone()
    }
}

/// Factory handing out [`FakeWatcher`]s, tracking every creation so
/// tests can assert how many watch instances a key consumed.
pub struct FakeWatcherFactory<T> {
    created: DashMap<ObjectKey, Arc<FakeWatcher<T>>>,
    prepared: DashMap<ObjectKey, Arc<FakeWatcher<T>>>,
    create_count: AtomicU64,
}

impl<T> FakeWatcherFactory<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: DashMap::new(),
            prepared: DashMap::new(),
            create_count: AtomicU64::new(0),
        })
    }

    /// The next creation for `key` hands out `watcher` instead of a
    /// fresh empty one.
    pub fn prepare(
        &self,
        key: ObjectKey,
        watcher: Arc<FakeWatcher<T>>,
    ) {
        self.prepared.insert(key, watcher);
    }

    /// The most recently created watcher for `key`.
    pub fn created_for(
        &self,
        key: &ObjectKey,
    ) -> Option<Arc<FakeWatcher<T>>> {
        self.created.get(key).map(|entry| entry.value().clone())
    }

    pub fn create_count(&self) -> u64 {
        self.create_count.load(Ordering::SeqCst)
    }
}

impl<T> WatcherFactory<T> for FakeWatcherFactory<T>
where
    T: Send + Sync + 'static,
{
    fn create(
        &self,
        key: &ObjectKey,
    ) -> Arc<dyn ObjectWatcher<T>> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        let watcher = match self.prepared.remove(key) {
            Some((_, prepared)) => prepared,
            None => FakeWatcher::new(key.clone()),
        };
        self.created.insert(key.clone(), watcher.clone());
        watcher
    }
}

/// Handler that forwards every event into an unbounded channel the test
/// drains.
pub struct EventProbe<T> {
    tx: mpsc::UnboundedSender<ResourceEvent<T>>,
}

impl<T> EventProbe<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ResourceEvent<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl<T> EventHandler<T> for EventProbe<T>
where
    T: Send + Sync + 'static,
{
    fn handle(
        &self,
        event: ResourceEvent<T>,
    ) {
        let _ = self.tx.send(event);
    }
}
