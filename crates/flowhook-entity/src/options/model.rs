//! Options envelope models.

use serde::{Deserialize, Serialize};

use flowhook_core::types::{ConnectionId, ExportId, FlowId, ImportId, IntegrationId};

use super::settings::Settings;
use crate::job::Job;

/// Context common to every import/export hook invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// The id of the currently running connection.
    #[serde(rename = "_connectionId")]
    pub connection_id: ConnectionId,
    /// The id of the currently running flow.
    #[serde(rename = "_flowId")]
    pub flow_id: FlowId,
    /// The id of the currently running integration.
    #[serde(rename = "_integrationId")]
    pub integration_id: IntegrationId,
    /// The parent of the currently running integration.
    #[serde(
        rename = "_parentIntegrationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_integration_id: Option<IntegrationId>,
    /// All custom settings in scope.
    #[serde(default)]
    pub settings: Settings,
    /// The job currently running.
    pub job: Job,
    /// Whether the script is invoked for sandbox.
    #[serde(default)]
    pub sandbox: bool,
    /// Test mode and preview flag.
    #[serde(rename = "testMode", default)]
    pub test_mode: bool,
}

impl Options {
    /// Creates options with empty settings and both flags off.
    pub fn new(
        connection_id: impl Into<ConnectionId>,
        flow_id: impl Into<FlowId>,
        integration_id: impl Into<IntegrationId>,
        job: Job,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            flow_id: flow_id.into(),
            integration_id: integration_id.into(),
            parent_integration_id: None,
            settings: Settings::new(),
            job,
            sandbox: false,
            test_mode: false,
        }
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the parent integration.
    pub fn with_parent_integration(mut self, id: impl Into<IntegrationId>) -> Self {
        self.parent_integration_id = Some(id.into());
        self
    }

    /// Sets the test-mode flag.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Sets the sandbox flag.
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Narrows to an export context.
    pub fn for_export(self, export_id: impl Into<ExportId>) -> ExportOptions {
        ExportOptions {
            base: self,
            export_id: export_id.into(),
        }
    }

    /// Narrows to an import context.
    pub fn for_import(self, import_id: impl Into<ImportId>) -> ImportOptions {
        ImportOptions {
            base: self,
            import_id: import_id.into(),
        }
    }
}

/// Options for hooks running on an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Shared context.
    #[serde(flatten)]
    pub base: Options,
    /// The id of the currently running export.
    #[serde(rename = "_exportId")]
    pub export_id: ExportId,
}

/// Options for hooks running on an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Shared context.
    #[serde(flatten)]
    pub base: Options,
    /// The id of the currently running import.
    #[serde(rename = "_importId")]
    pub import_id: ImportId,
}
