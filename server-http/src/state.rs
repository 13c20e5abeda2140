use purge::{EventDispatcher, Logger, RequestObserver};
use std::sync::Arc;
use storage_engine::MokaCache;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MokaCache>,
    pub dispatcher: Arc<EventDispatcher>,
    pub observer: RequestObserver,
}

impl AppState {
    pub fn new(store: Arc<MokaCache>, logger: Arc<dyn Logger>) -> Self {
        let dispatcher = EventDispatcher::with_defaults(store.clone(), logger.clone());
        Self::with_dispatcher(store, Arc::new(dispatcher), logger)
    }

    /// State around an already-built dispatcher, shared with other transports
    pub fn with_dispatcher(
        store: Arc<MokaCache>,
        dispatcher: Arc<EventDispatcher>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            observer: RequestObserver::new(logger),
        }
    }
}
