use serde::{Deserialize, Serialize};

use crate::error::{kind_name, FormError};

/// Presentation settings shared by all renderers of one render pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Label of remove buttons on repeated fields without their own.
    pub default_remove_label: String,
    pub show_section_titles: bool,
    /// Text rendered for input types with no registered renderer.
    pub not_supported_text: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_remove_label: "Remove".to_string(),
            show_section_titles: true,
            not_supported_text: "Not supported".to_string(),
        }
    }
}

impl RenderConfig {
    /// Load from a JSON object; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(FormError::InvalidConfig(format!(
                "expected an object, found {}",
                kind_name(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}
