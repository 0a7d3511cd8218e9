//! Official OA workflow template definitions

use serde::{Deserialize, Serialize};

use crate::{DingBridgeError, Result};

/// Workflow template upsert request, keyed by `process_code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub process_code: String,
    pub name: String,
    pub form_components: Vec<serde_json::Value>,
    pub description: Option<String>,
    /// Template-wide settings, passed through as-is
    pub template_config: Option<serde_json::Value>,
}

impl TemplateSpec {
    pub fn validate(&self) -> Result<()> {
        if self.process_code.trim().is_empty() {
            return Err(DingBridgeError::Validation("process_code is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(DingBridgeError::Validation("template name is required".into()));
        }
        Ok(())
    }
}
