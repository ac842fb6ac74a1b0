//! Typed handler constructors, one per hook point.
//!
//! Each takes a closure over the hook's own options type and returns a
//! [`ClosureHandler`] bound to that hook, so scripts never match on
//! [`HookRequest`] or build a [`HookReply`] by hand.
//!
//! ```rust,ignore
//! use flowhook_sdk::prelude::*;
//!
//! let handler = typed::filter("only-active", |options| async move {
//!     Ok(options.record["active"] == true)
//! });
//! handler.bind(&registry).await;
//! ```

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use flowhook_entity::ImportResponse;
use flowhook_hooks::hooks::contracts::branching::BranchingOptions;
use flowhook_hooks::hooks::contracts::filter::FilterOptions;
use flowhook_hooks::hooks::contracts::flow_router::{FlowRoute, FlowRouterOptions};
use flowhook_hooks::hooks::contracts::form_init::{FormDefinition, FormInitOptions};
use flowhook_hooks::hooks::contracts::handle_request::{
    HandleRequestOptions, HandleRequestResponse,
};
use flowhook_hooks::hooks::contracts::post_aggregate::PostAggregateOptions;
use flowhook_hooks::hooks::contracts::post_map::PostMapOptions;
use flowhook_hooks::hooks::contracts::post_response_map::PostResponseMapOptions;
use flowhook_hooks::hooks::contracts::post_submit::PostSubmitOptions;
use flowhook_hooks::hooks::contracts::pre_map::PreMapOptions;
use flowhook_hooks::hooks::contracts::pre_save_page::{PreSavePageOptions, PreSavePageResponse};
use flowhook_hooks::hooks::contracts::transform::TransformOptions;
use flowhook_hooks::{HookPoint, HookReply, HookRequest, RecordResponse, ScriptFailure};

use crate::traits::ClosureHandler;

macro_rules! typed_hook {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $options:ty, $reply:ty, $wrap:expr) => {
        $(#[$doc])*
        pub fn $name<F, Fut>(script_id: &str, handler: F) -> ClosureHandler
        where
            F: Fn($options) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<$reply, ScriptFailure>> + Send + 'static,
        {
            let handler = Arc::new(handler);
            ClosureHandler::new(script_id, HookPoint::$variant, move |request| {
                let handler = Arc::clone(&handler);
                async move {
                    match request {
                        HookRequest::$variant(options) => handler(options).await.map($wrap),
                        other => Err(wrong_hook(HookPoint::$variant, other.point())),
                    }
                }
            })
        }
    };
}

fn wrong_hook(expected: HookPoint, actual: HookPoint) -> ScriptFailure {
    ScriptFailure::with_code(
        "wrong_hook",
        format!("handler for '{expected}' received a '{actual}' request"),
    )
}

typed_hook!(
    /// preSavePage: one response per exported page.
    pre_save_page, PreSavePage, PreSavePageOptions, PreSavePageResponse, HookReply::PreSavePage
);
typed_hook!(
    /// filter: `true` keeps the record.
    filter, Filter, FilterOptions, bool, HookReply::Filter
);
typed_hook!(
    /// transform: the record in its new shape.
    transform, Transform, TransformOptions, Value, HookReply::Transform
);
typed_hook!(
    /// branching: indices of the branches to route the record to.
    branching, Branching, BranchingOptions, Vec<usize>, HookReply::Branching
);
typed_hook!(
    /// preMap: one response per input record.
    pre_map, PreMap, PreMapOptions, Vec<RecordResponse>, HookReply::PreMap
);
typed_hook!(
    /// postMap: one response per mapped record.
    post_map, PostMap, PostMapOptions, Vec<RecordResponse>, HookReply::PostMap
);
typed_hook!(
    /// postSubmit: the response data, same length as the input.
    post_submit, PostSubmit, PostSubmitOptions, Vec<ImportResponse>, HookReply::PostSubmit
);
typed_hook!(
    /// postResponseMap: the response-mapped records.
    post_response_map, PostResponseMap, PostResponseMapOptions, Vec<Value>,
    HookReply::PostResponseMap
);
typed_hook!(
    /// postAggregate: returns nothing.
    post_aggregate, PostAggregate, PostAggregateOptions, (), |()| HookReply::PostAggregate
);
typed_hook!(
    /// contentBasedFlowRouter: the flow and export to route the message to.
    flow_router, ContentBasedFlowRouter, FlowRouterOptions, FlowRoute,
    HookReply::ContentBasedFlowRouter
);
typed_hook!(
    /// formInit: the form definition to render.
    form_init, FormInit, FormInitOptions, FormDefinition, HookReply::FormInit
);
typed_hook!(
    /// handleRequest: the HTTP response.
    handle_request, HandleRequest, HandleRequestOptions, HandleRequestResponse,
    HookReply::HandleRequest
);
