//! The hook catalog and the request/reply envelopes exchanged with handlers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_core::error::AppError;
use flowhook_entity::ImportResponse;

use super::contracts::branching::BranchingOptions;
use super::contracts::filter::FilterOptions;
use super::contracts::flow_router::{FlowRoute, FlowRouterOptions};
use super::contracts::form_init::{FormDefinition, FormInitOptions};
use super::contracts::handle_request::{HandleRequestOptions, HandleRequestResponse};
use super::contracts::post_aggregate::PostAggregateOptions;
use super::contracts::post_map::PostMapOptions;
use super::contracts::post_response_map::PostResponseMapOptions;
use super::contracts::post_submit::PostSubmitOptions;
use super::contracts::pre_map::PreMapOptions;
use super::contracts::pre_save_page::{PreSavePageOptions, PreSavePageResponse};
use super::contracts::transform::TransformOptions;
use super::outcome::RecordResponse;

/// Enumeration of all extension points a user script can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPoint {
    // ── Export ──
    /// Invoked on a page of exported records before it moves on in the flow.
    PreSavePage,
    /// Invoked per record to decide whether it is processed.
    Filter,
    /// Invoked per exported record to reshape it.
    Transform,
    /// Invoked per record to pick the branches it is routed to.
    Branching,

    // ── Import ──
    /// Invoked on a page of records before field mapping.
    PreMap,
    /// Invoked on a page of records after field mapping.
    PostMap,
    /// Invoked on a page after it was submitted to the destination.
    PostSubmit,
    /// Invoked on a page after response/results mapping.
    PostResponseMap,
    /// Invoked once after the final aggregated file is uploaded.
    PostAggregate,

    // ── Platform ──
    /// Invoked per inbound message to select the flow and export to run.
    ContentBasedFlowRouter,
    /// Invoked per form render to customize the form.
    FormInit,
    /// Invoked per inbound HTTP request.
    HandleRequest,
}

/// Which side of a flow a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookFamily {
    /// Export-side hooks.
    Export,
    /// Import-side hooks.
    Import,
    /// Hooks serving platform surfaces (routing, forms, HTTP).
    Platform,
}

/// The unit of work a hook is invoked once for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationUnit {
    /// A page of records.
    Page,
    /// A single record.
    Record,
    /// A single aggregated upload.
    Aggregate,
    /// A single inbound message.
    Message,
    /// A single form render.
    FormRender,
    /// A single HTTP request.
    Request,
}

impl HookFamily {
    /// Returns the string name of this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Import => "import",
            Self::Platform => "platform",
        }
    }
}

impl InvocationUnit {
    /// Returns the string name of this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Record => "record",
            Self::Aggregate => "aggregate",
            Self::Message => "message",
            Self::FormRender => "form_render",
            Self::Request => "request",
        }
    }
}

/// What an abnormal termination of a hook fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureScope {
    /// The entire flow stops.
    Flow,
    /// The whole page of records fails.
    Page,
    /// Only the record being processed is marked as errored.
    Record,
    /// Only the request (message, form render, HTTP call) fails.
    Request,
}

impl FailureScope {
    /// Whether a failure in this scope aborts more than the single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Flow | Self::Page)
    }

    /// Returns the string name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Page => "page",
            Self::Record => "record",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for FailureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HookPoint {
    /// Every hook point, in catalog order.
    pub const ALL: [HookPoint; 12] = [
        Self::PreSavePage,
        Self::Filter,
        Self::Transform,
        Self::Branching,
        Self::PreMap,
        Self::PostMap,
        Self::PostSubmit,
        Self::PostResponseMap,
        Self::PostAggregate,
        Self::ContentBasedFlowRouter,
        Self::FormInit,
        Self::HandleRequest,
    ];

    /// Returns the script-facing name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreSavePage => "preSavePage",
            Self::Filter => "filter",
            Self::Transform => "transform",
            Self::Branching => "branching",
            Self::PreMap => "preMap",
            Self::PostMap => "postMap",
            Self::PostSubmit => "postSubmit",
            Self::PostResponseMap => "postResponseMap",
            Self::PostAggregate => "postAggregate",
            Self::ContentBasedFlowRouter => "contentBasedFlowRouter",
            Self::FormInit => "formInit",
            Self::HandleRequest => "handleRequest",
        }
    }

    /// Returns the family this hook belongs to.
    pub fn family(&self) -> HookFamily {
        match self {
            Self::PreSavePage | Self::Filter | Self::Transform | Self::Branching => {
                HookFamily::Export
            }
            Self::PreMap
            | Self::PostMap
            | Self::PostSubmit
            | Self::PostResponseMap
            | Self::PostAggregate => HookFamily::Import,
            Self::ContentBasedFlowRouter | Self::FormInit | Self::HandleRequest => {
                HookFamily::Platform
            }
        }
    }

    /// Returns the unit of work this hook is invoked once for.
    pub fn unit(&self) -> InvocationUnit {
        match self {
            Self::PreSavePage
            | Self::PreMap
            | Self::PostMap
            | Self::PostSubmit
            | Self::PostResponseMap => InvocationUnit::Page,
            Self::Filter | Self::Transform | Self::Branching => InvocationUnit::Record,
            Self::PostAggregate => InvocationUnit::Aggregate,
            Self::ContentBasedFlowRouter => InvocationUnit::Message,
            Self::FormInit => InvocationUnit::FormRender,
            Self::HandleRequest => InvocationUnit::Request,
        }
    }

    /// Returns what an abnormal termination of this hook fails.
    pub fn failure_scope(&self) -> FailureScope {
        match self {
            Self::PreSavePage | Self::PostAggregate => FailureScope::Flow,
            Self::PreMap | Self::PostMap | Self::PostSubmit | Self::PostResponseMap => {
                FailureScope::Page
            }
            Self::Filter | Self::Transform | Self::Branching => FailureScope::Record,
            Self::ContentBasedFlowRouter | Self::FormInit | Self::HandleRequest => {
                FailureScope::Request
            }
        }
    }

    /// Whether the reply is a per-record array that must match the input length.
    pub fn is_record_indexed(&self) -> bool {
        matches!(
            self,
            Self::PreMap | Self::PostMap | Self::PostSubmit | Self::PostResponseMap
        )
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookPoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|point| point.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::not_found(format!("Unknown hook point '{s}'")))
    }
}

/// Input handed to a hook handler: one variant per hook point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "hook", content = "options", rename_all = "camelCase")]
pub enum HookRequest {
    /// preSavePage input.
    PreSavePage(PreSavePageOptions),
    /// filter input.
    Filter(FilterOptions),
    /// transform input.
    Transform(TransformOptions),
    /// branching input.
    Branching(BranchingOptions),
    /// preMap input.
    PreMap(PreMapOptions),
    /// postMap input.
    PostMap(PostMapOptions),
    /// postSubmit input.
    PostSubmit(PostSubmitOptions),
    /// postResponseMap input.
    PostResponseMap(PostResponseMapOptions),
    /// postAggregate input.
    PostAggregate(PostAggregateOptions),
    /// contentBasedFlowRouter input.
    ContentBasedFlowRouter(FlowRouterOptions),
    /// formInit input.
    FormInit(FormInitOptions),
    /// handleRequest input.
    HandleRequest(HandleRequestOptions),
}

impl HookRequest {
    /// Returns the hook point this request targets.
    pub fn point(&self) -> HookPoint {
        match self {
            Self::PreSavePage(_) => HookPoint::PreSavePage,
            Self::Filter(_) => HookPoint::Filter,
            Self::Transform(_) => HookPoint::Transform,
            Self::Branching(_) => HookPoint::Branching,
            Self::PreMap(_) => HookPoint::PreMap,
            Self::PostMap(_) => HookPoint::PostMap,
            Self::PostSubmit(_) => HookPoint::PostSubmit,
            Self::PostResponseMap(_) => HookPoint::PostResponseMap,
            Self::PostAggregate(_) => HookPoint::PostAggregate,
            Self::ContentBasedFlowRouter(_) => HookPoint::ContentBasedFlowRouter,
            Self::FormInit(_) => HookPoint::FormInit,
            Self::HandleRequest(_) => HookPoint::HandleRequest,
        }
    }
}

/// Value a hook handler returns: one variant per hook point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "hook", content = "response", rename_all = "camelCase")]
pub enum HookReply {
    /// preSavePage response.
    PreSavePage(PreSavePageResponse),
    /// filter verdict; `true` keeps the record.
    Filter(bool),
    /// The transformed record.
    Transform(Value),
    /// Indices of the branches the record is routed to.
    Branching(Vec<usize>),
    /// One entry per input record.
    PreMap(Vec<RecordResponse>),
    /// One entry per mapped record.
    PostMap(Vec<RecordResponse>),
    /// The response data array, same length as the input.
    PostSubmit(Vec<ImportResponse>),
    /// The response-mapped data, same length as the input.
    PostResponseMap(Vec<Value>),
    /// postAggregate returns nothing.
    PostAggregate,
    /// The selected flow and export.
    ContentBasedFlowRouter(FlowRoute),
    /// The form definition.
    FormInit(FormDefinition),
    /// The HTTP response.
    HandleRequest(HandleRequestResponse),
}

impl HookReply {
    /// Returns the hook point this reply answers.
    pub fn point(&self) -> HookPoint {
        match self {
            Self::PreSavePage(_) => HookPoint::PreSavePage,
            Self::Filter(_) => HookPoint::Filter,
            Self::Transform(_) => HookPoint::Transform,
            Self::Branching(_) => HookPoint::Branching,
            Self::PreMap(_) => HookPoint::PreMap,
            Self::PostMap(_) => HookPoint::PostMap,
            Self::PostSubmit(_) => HookPoint::PostSubmit,
            Self::PostResponseMap(_) => HookPoint::PostResponseMap,
            Self::PostAggregate => HookPoint::PostAggregate,
            Self::ContentBasedFlowRouter(_) => HookPoint::ContentBasedFlowRouter,
            Self::FormInit(_) => HookPoint::FormInit,
            Self::HandleRequest(_) => HookPoint::HandleRequest,
        }
    }
}
