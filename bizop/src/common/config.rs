/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::message::{EnvelopeJsonCodec, TagSeparator, TaggedJsonCodec, WireCodec};

/// Configuration for the Bizop dispatch core.
///
/// Loaded from TOML files in XDG-compliant directories. Every section and field is
/// optional; anything missing takes its default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BizopConfig {
    /// Dispatch table configuration
    pub dispatch: DispatchConfig,
    /// Wire codec configuration
    pub codec: CodecConfig,
    /// Default values configuration
    pub defaults: DefaultsConfig,
}

/// How the dispatch table treats two handlers registered for the same message type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Building the table fails with [`OperationError::DuplicateHandler`](crate::operation::OperationError::DuplicateHandler).
    #[default]
    Reject,
    /// The handler registered last shadows the earlier ones.
    LastWins,
}

/// Dispatch table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Policy applied when one message type has several handlers
    pub duplicate_policy: DuplicatePolicy,
    /// Name reported for the fallback handler in logs and introspection
    pub default_handler_name: String,
}

/// Wire format used by the serialization boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `<type.key><separator><json body>`
    #[default]
    Tagged,
    /// `{"type": "<type.key>", "payload": <json body>}`
    Envelope,
}

/// Wire codec configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Which wire format to speak
    pub format: WireFormat,
    /// Separator between type tag and body for [`WireFormat::Tagged`]
    pub tag_separator: TagSeparator,
}

/// Default values configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Root name of an operation's identifier when none is provided
    pub operation_name: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            default_handler_name: "on_message".to_string(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format: WireFormat::Tagged,
            tag_separator: TagSeparator::COLON,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            operation_name: "operation".to_string(),
        }
    }
}

impl CodecConfig {
    /// Builds the wire codec this configuration describes.
    #[must_use]
    pub fn codec(&self) -> Arc<dyn WireCodec> {
        match self.format {
            WireFormat::Tagged => Arc::new(TaggedJsonCodec::with_separator(self.tag_separator)),
            WireFormat::Envelope => Arc::new(EnvelopeJsonCodec),
        }
    }
}

impl BizopConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is not valid TOML or does not match the schema.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text)?)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `bizop/config.toml` under `$XDG_CONFIG_HOME` and the XDG config
    /// directories. A missing file yields the defaults; an unreadable or malformed one
    /// is logged and also yields the defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("bizop") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                match Self::load_from_path(&path) {
                    Ok(config) => config,
                    Err(e) => {
                        error!("Failed to load configuration file {}: {}", path.display(), e);
                        Self::default()
                    }
                }
            }
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: BizopConfig = BizopConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BizopConfig::default();
        assert_eq!(config.dispatch.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.dispatch.default_handler_name, "on_message");
        assert_eq!(config.codec.format, WireFormat::Tagged);
        assert_eq!(config.codec.tag_separator, ':');
        assert_eq!(config.defaults.operation_name, "operation");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BizopConfig::from_toml_str(
            r#"
            [dispatch]
            duplicate_policy = "last_wins"
            "#,
        )
        .unwrap();
        assert_eq!(config.dispatch.duplicate_policy, DuplicatePolicy::LastWins);
        assert_eq!(config.dispatch.default_handler_name, "on_message");
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[test]
    fn test_codec_section() {
        let config = BizopConfig::from_toml_str(
            r#"
            [codec]
            format = "envelope"
            tag_separator = "|"
            "#,
        )
        .unwrap();
        assert_eq!(config.codec.format, WireFormat::Envelope);
        assert_eq!(config.codec.tag_separator, '|');
    }

    #[test]
    fn test_separator_found_in_type_keys_is_rejected() {
        for separator in [".", "_", "<", "x", " "] {
            let text = format!("[codec]\ntag_separator = {separator:?}\n");
            assert!(
                BizopConfig::from_toml_str(&text).is_err(),
                "separator {separator:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = BizopConfig::from_toml_str(
            r#"
            [dispatch]
            duplicate_policy = "first_wins"
            "#,
        );
        assert!(result.is_err());
    }
}
