//! Shared test helpers for hook integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use flowhook::entity::{ExportOptions, ImportOptions, Options};
use flowhook::prelude::*;

/// A registry and a dispatcher over it.
pub struct TestHost {
    /// Handlers under test are bound here.
    pub registry: Arc<HookRegistry>,
    /// Dispatches through `registry`.
    pub dispatcher: HookDispatcher,
}

impl TestHost {
    /// Host with default settings.
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    /// Host with custom settings.
    pub fn with_config(config: HostConfig) -> Self {
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = HookDispatcher::new(Arc::clone(&registry), config);
        Self {
            registry,
            dispatcher,
        }
    }

    /// Bind a typed handler.
    pub async fn bind(&self, handler: ClosureHandler) {
        handler.bind(&self.registry).await;
    }
}

/// Import context for a running import.
pub fn import_options() -> ImportOptions {
    Options::new("conn-1", "flow-1", "integ-1", Job::root("import")).for_import("import-1")
}

/// Export context for a running export.
pub fn export_options() -> ExportOptions {
    Options::new("conn-1", "flow-1", "integ-1", Job::root("export")).for_export("export-1")
}

/// Page-level filter context.
pub fn filter_scope() -> FilterScope {
    FilterScope {
        page_index: 0,
        settings: Settings::new(),
        test_mode: false,
        job: Job::root("export"),
        delta: None,
    }
}

/// Answers every call with the same reply and counts the calls.
#[derive(Debug)]
pub struct Counting {
    calls: Arc<AtomicUsize>,
    reply: HookReply,
}

impl Counting {
    /// Returns the handler and a shared call counter.
    pub fn new(reply: HookReply) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            calls: Arc::clone(&calls),
            reply,
        });
        (handler, calls)
    }
}

#[async_trait]
impl HookHandler for Counting {
    async fn handle(
        &self,
        _ctx: &HookContext,
        _request: &HookRequest,
    ) -> Result<HookReply, ScriptFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    fn script_id(&self) -> &str {
        "counting"
    }
}

/// Reads the counter.
pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
