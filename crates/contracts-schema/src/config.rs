//! # Generator Configuration
//!
//! YAML configuration for one generation run. Every key is optional; unknown
//! keys are rejected so a typo never silently falls back to a default.
//!
//! ```yaml
//! root_namespace: Maliev.MessagingContracts.Contracts
//! schema_root: schemas
//! output_root: generated
//! backends: [csharp, rust]
//! parallel: false
//! allow_partial: false
//! governance:
//!   consumer_field: consumedBy
//!   identity_fields:
//!     - { name: messageId, kind: identifier }
//!     - { name: timestamp, kind: timestamp }
//!     - { name: correlationId, kind: identifier }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use contracts_core::{ContractsError, NamespacePath};

use crate::document::PrimitiveKind;

/// Target languages with a built-in backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// C# records for System.Text.Json.
    Csharp,
    /// Rust structs for serde.
    Rust,
}

impl std::str::FromStr for BackendKind {
    type Err = ContractsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Ok(Self::Csharp),
            "rust" | "rs" => Ok(Self::Rust),
            other => Err(ContractsError::Config(format!("unknown backend '{other}'"))),
        }
    }
}

/// An envelope field every message must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityField {
    /// Wire name.
    pub name: String,
    /// Required value kind.
    pub kind: PrimitiveKind,
}

impl IdentityField {
    fn new(name: &str, kind: PrimitiveKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Settings for the governance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GovernanceConfig {
    /// Field whose constant lists the consuming services.
    pub consumer_field: String,
    /// Envelope fields checked by the stable identity rule.
    pub identity_fields: Vec<IdentityField>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            consumer_field: "consumedBy".to_string(),
            identity_fields: vec![
                IdentityField::new("messageId", PrimitiveKind::Identifier),
                IdentityField::new("timestamp", PrimitiveKind::Timestamp),
                IdentityField::new("correlationId", PrimitiveKind::Identifier),
            ],
        }
    }
}

/// Configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Dotted namespace every generated type lives under.
    pub root_namespace: String,
    /// Directory scanned for `*.json` schemas.
    pub schema_root: PathBuf,
    /// Directory generated sources are written to.
    pub output_root: PathBuf,
    /// Backends to run, in order.
    pub backends: Vec<BackendKind>,
    /// Resolve and build independent schemas on worker threads.
    pub parallel: bool,
    /// Write the output of successful schemas even when others failed.
    pub allow_partial: bool,
    /// Governance rule settings.
    pub governance: GovernanceConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_namespace: "Contracts".to_string(),
            schema_root: PathBuf::from("schemas"),
            output_root: PathBuf::from("generated"),
            backends: vec![BackendKind::Csharp],
            parallel: false,
            allow_partial: false,
            governance: GovernanceConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ContractsError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| ContractsError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ContractsError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ContractsError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// The root namespace as a path.
    pub fn namespace_root(&self) -> NamespacePath {
        NamespacePath::parse_dotted(&self.root_namespace)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ContractsError> {
        if self.backends.is_empty() {
            return Err(ContractsError::Config("at least one backend is required".into()));
        }
        if self.governance.consumer_field.trim().is_empty() {
            return Err(ContractsError::Config("governance.consumer_field is empty".into()));
        }
        let bad_segment = self
            .root_namespace
            .split('.')
            .find(|s| s.is_empty() || !s.chars().all(|c| c.is_alphanumeric() || c == '_'));
        if let Some(segment) = bad_segment {
            return Err(ContractsError::Config(format!(
                "root_namespace '{}' has an invalid segment '{segment}'",
                self.root_namespace
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = GeneratorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.governance.identity_fields.len(), 3);
    }

    #[test]
    fn parses_full_document() {
        let config = GeneratorConfig::from_yaml_str(
            r#"
root_namespace: Maliev.MessagingContracts
backends: [csharp, rust]
parallel: true
governance:
  consumer_field: consumers
  identity_fields:
    - { name: id, kind: identifier }
"#,
        )
        .unwrap();
        assert_eq!(config.backends, vec![BackendKind::Csharp, BackendKind::Rust]);
        assert!(config.parallel);
        assert_eq!(config.governance.consumer_field, "consumers");
        assert_eq!(
            config.governance.identity_fields,
            vec![IdentityField::new("id", PrimitiveKind::Identifier)]
        );
        assert_eq!(config.namespace_root().segments().len(), 2);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_namespaces() {
        assert!(GeneratorConfig::from_yaml_str("backend: rust").is_err());
        assert!(GeneratorConfig::from_yaml_str("root_namespace: Bad..Name").is_err());
        assert!(GeneratorConfig::from_yaml_str("backends: []").is_err());
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("C#".parse::<BackendKind>().unwrap(), BackendKind::Csharp);
        assert_eq!("rust".parse::<BackendKind>().unwrap(), BackendKind::Rust);
        assert!("go".parse::<BackendKind>().is_err());
    }
}
