//! formInit: invoked per form render; returns the form definition to show.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use flowhook_core::error::AppError;

/// A string-keyed form-field mapping.
pub type FormDefinition = Map<String, Value>;

/// License chain supplied when the form belongs to an integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseChain {
    /// The integration's license.
    pub license: Value,
    /// The license of the parent integration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_license: Option<Value>,
}

/// Input of formInit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInitOptions {
    /// The resource the form edits.
    pub resource: Value,
    /// Its parent resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_resource: Option<Value>,
    /// Its grandparent resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grandparent_resource: Option<Value>,
    /// Sandbox flag.
    #[serde(default)]
    pub sandbox: bool,
    /// License chain, for integration forms only.
    #[serde(flatten)]
    pub license: Option<LicenseChain>,
}

impl FormInitOptions {
    /// Resources handed to the form must be objects.
    pub fn validate(&self) -> Result<(), AppError> {
        let resources = [
            ("resource", Some(&self.resource)),
            ("parentResource", self.parent_resource.as_ref()),
            ("grandparentResource", self.grandparent_resource.as_ref()),
        ];
        for (name, resource) in resources {
            if let Some(value) = resource {
                if !value.is_object() {
                    return Err(AppError::validation(format!("{name} must be an object")));
                }
            }
        }
        Ok(())
    }
}
