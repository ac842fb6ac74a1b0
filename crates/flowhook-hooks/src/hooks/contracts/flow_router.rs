//! contentBasedFlowRouter: invoked per inbound message; selects the flow and
//! export that should process it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flowhook_core::types::{ExportId, FlowId};

use crate::hooks::violation::ContractViolation;

/// Input of contentBasedFlowRouter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRouterOptions {
    /// Transport-level headers of the inbound message.
    #[serde(default)]
    pub http_headers: BTreeMap<String, String>,
    /// MIME headers of the message payload.
    #[serde(default)]
    pub mime_headers: BTreeMap<String, String>,
    /// The unparsed message body.
    #[serde(default)]
    pub raw_message_body: String,
}

/// Output of contentBasedFlowRouter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRoute {
    /// The flow to run.
    #[serde(rename = "_flowId")]
    pub flow_id: FlowId,
    /// The export inside that flow that receives the message.
    #[serde(rename = "_exportId")]
    pub export_id: ExportId,
}

impl FlowRoute {
    /// Both ids must be set.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        if self.flow_id.is_empty() {
            return Err(ContractViolation::MissingRoute("_flowId"));
        }
        if self.export_id.is_empty() {
            return Err(ContractViolation::MissingRoute("_exportId"));
        }
        Ok(())
    }
}

impl FlowRouterOptions {
    /// Case-insensitive lookup across HTTP then MIME headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.http_headers
            .iter()
            .chain(self.mime_headers.iter())
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
