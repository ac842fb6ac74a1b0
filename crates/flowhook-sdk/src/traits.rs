//! Simplified handler traits for script development.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use flowhook_hooks::{
    HookContext, HookHandler, HookPoint, HookRegistry, HookReply, HookRequest, ScriptFailure,
};

/// Simplified hook handler that ignores the invocation context.
///
/// Scripts implement this instead of the raw trait when they do not need
/// job lookups.
#[async_trait]
pub trait SimpleHookHandler: Send + Sync + std::fmt::Debug {
    /// Returns the script ID.
    fn script_id(&self) -> &str;

    /// Returns the hook point this handler responds to.
    fn hook_point(&self) -> HookPoint;

    /// Handles the hook invocation.
    async fn handle(&self, request: &HookRequest) -> Result<HookReply, ScriptFailure>;
}

/// Wrapper that adapts `SimpleHookHandler` to the `HookHandler` trait.
#[derive(Debug)]
pub struct SimpleHandlerAdapter {
    inner: Arc<dyn SimpleHookHandler>,
}

impl SimpleHandlerAdapter {
    /// Wraps a simple handler into an `Arc<dyn HookHandler>`.
    pub fn wrap(handler: Arc<dyn SimpleHookHandler>) -> Arc<dyn HookHandler> {
        Arc::new(Self { inner: handler })
    }

    /// Binds a simple handler to the hook point it declares.
    pub async fn bind(
        handler: Arc<dyn SimpleHookHandler>,
        registry: &HookRegistry,
    ) -> Option<Arc<dyn HookHandler>> {
        let hook = handler.hook_point();
        registry.register(hook, Self::wrap(handler)).await
    }
}

#[async_trait]
impl HookHandler for SimpleHandlerAdapter {
    async fn handle(
        &self,
        _ctx: &HookContext,
        request: &HookRequest,
    ) -> Result<HookReply, ScriptFailure> {
        self.inner.handle(request).await
    }

    fn script_id(&self) -> &str {
        self.inner.script_id()
    }
}

type BoxedReply = Pin<Box<dyn Future<Output = Result<HookReply, ScriptFailure>> + Send>>;

/// A closure-based hook handler bound to one hook point.
///
/// The closure receives its own copy of the request, so the returned future
/// may outlive the call that produced it.
pub struct ClosureHandler {
    id: String,
    point: HookPoint,
    handler: Arc<dyn Fn(HookRequest) -> BoxedReply + Send + Sync>,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("id", &self.id)
            .field("point", &self.point)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F, Fut>(script_id: &str, point: HookPoint, handler: F) -> Self
    where
        F: Fn(HookRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HookReply, ScriptFailure>> + Send + 'static,
    {
        Self {
            id: script_id.to_string(),
            point,
            handler: Arc::new(move |request: HookRequest| -> BoxedReply {
                Box::pin(handler(request))
            }),
        }
    }

    /// The hook point this handler answers.
    pub fn point(&self) -> HookPoint {
        self.point
    }

    /// Binds the handler to its hook point, returning the one it replaced.
    pub async fn bind(self, registry: &HookRegistry) -> Option<Arc<dyn HookHandler>> {
        let hook = self.point;
        registry.register(hook, Arc::new(self)).await
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    async fn handle(
        &self,
        _ctx: &HookContext,
        request: &HookRequest,
    ) -> Result<HookReply, ScriptFailure> {
        (self.handler)(request.clone()).await
    }

    fn script_id(&self) -> &str {
        &self.id
    }
}
