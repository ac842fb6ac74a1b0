//! Hook registry. Scripts bind one handler per hook point.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::context::HookContext;

use super::definitions::{HookPoint, HookReply, HookRequest};
use super::outcome::ScriptFailure;

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles a hook invocation. `Err` is an abnormal termination.
    async fn handle(
        &self,
        ctx: &HookContext,
        request: &HookRequest,
    ) -> Result<HookReply, ScriptFailure>;

    /// Returns the id of the script owning this handler.
    fn script_id(&self) -> &str;
}

/// Registry of hook handlers keyed by hook point.
#[derive(Debug)]
pub struct HookRegistry {
    /// Hook point → bound handler.
    handlers: RwLock<HashMap<HookPoint, Arc<dyn HookHandler>>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Binds a handler to a hook point, returning the handler it replaced.
    pub async fn register(
        &self,
        hook: HookPoint,
        handler: Arc<dyn HookHandler>,
    ) -> Option<Arc<dyn HookHandler>> {
        let script_id = handler.script_id().to_string();
        let mut handlers = self.handlers.write().await;
        let previous = handlers.insert(hook, handler);

        match &previous {
            Some(old) => warn!(
                hook = %hook,
                script_id = %script_id,
                replaced = %old.script_id(),
                "Hook handler replaced"
            ),
            None => info!(hook = %hook, script_id = %script_id, "Hook handler registered"),
        }

        previous
    }

    /// Removes the handler bound to a hook point.
    pub async fn unregister(&self, hook: HookPoint) -> Option<Arc<dyn HookHandler>> {
        let removed = self.handlers.write().await.remove(&hook);
        if removed.is_some() {
            info!(hook = %hook, "Hook handler unregistered");
        }
        removed
    }

    /// Removes every handler owned by a script.
    pub async fn unregister_script(&self, script_id: &str) -> usize {
        let mut handlers = self.handlers.write().await;
        let before = handlers.len();
        handlers.retain(|_, handler| handler.script_id() != script_id);
        let removed = before - handlers.len();

        info!(script_id = %script_id, removed = removed, "Script hooks unregistered");
        removed
    }

    /// Returns the handler bound to a hook point.
    pub async fn get(&self, hook: HookPoint) -> Option<Arc<dyn HookHandler>> {
        self.handlers.read().await.get(&hook).cloned()
    }

    /// Returns whether a handler is bound to a hook point.
    pub async fn is_bound(&self, hook: HookPoint) -> bool {
        self.handlers.read().await.contains_key(&hook)
    }

    /// Returns all bound hook points in catalog order.
    pub async fn bound_hooks(&self) -> Vec<HookPoint> {
        let handlers = self.handlers.read().await;
        HookPoint::ALL
            .into_iter()
            .filter(|hook| handlers.contains_key(hook))
            .collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct KeepAll {
        id: String,
    }

    #[async_trait]
    impl HookHandler for KeepAll {
        async fn handle(
            &self,
            _ctx: &HookContext,
            _request: &HookRequest,
        ) -> Result<HookReply, ScriptFailure> {
            Ok(HookReply::Filter(true))
        }

        fn script_id(&self) -> &str {
            &self.id
        }
    }

    fn handler(id: &str) -> Arc<dyn HookHandler> {
        Arc::new(KeepAll { id: id.to_string() })
    }

    #[tokio::test]
    async fn test_register_replaces_previous_binding() {
        let registry = HookRegistry::new();
        assert!(registry.register(HookPoint::Filter, handler("a")).await.is_none());
        let previous = registry.register(HookPoint::Filter, handler("b")).await;
        assert_eq!(previous.map(|h| h.script_id().to_string()), Some("a".to_string()));
        let bound = registry.get(HookPoint::Filter).await.expect("bound");
        assert_eq!(bound.script_id(), "b");
    }

    #[tokio::test]
    async fn test_unregister_script_removes_only_its_hooks() {
        let registry = HookRegistry::new();
        registry.register(HookPoint::PreMap, handler("a")).await;
        registry.register(HookPoint::Filter, handler("a")).await;
        registry.register(HookPoint::Transform, handler("b")).await;

        assert_eq!(registry.unregister_script("a").await, 2);
        assert_eq!(registry.bound_hooks().await, vec![HookPoint::Transform]);
        assert!(!registry.is_bound(HookPoint::PreMap).await);
    }
}
