//! # Governance Validator
//!
//! Structural policy checks over effective schemas, independent of any
//! target language. Rules never fail fast: every rule runs on every schema
//! and reports what it finds.
//!
//! ## Reporting Order
//!
//! Within one schema, diagnostics come in rule-declaration order, and
//! within one rule in field-declaration order. Across schemas,
//! [`DiagnosticReport`] orders by schema identity, so the report is the
//! same however the schemas were scheduled.

use std::fmt;

use serde::Serialize;

use contracts_core::{Literal, SchemaId};

use crate::compose::EffectiveSchema;
use crate::config::{GovernanceConfig, IdentityField};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks generation for the schema.
    Error,
    /// Reported only.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// One governance finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    /// Schema the finding is about.
    pub schema_id: SchemaId,
    /// Rule that produced it.
    pub rule: String,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl ValidationDiagnostic {
    /// An `error` finding.
    pub fn error(schema_id: &SchemaId, rule: &str, message: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.clone(),
            rule: rule.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// A `warning` finding.
    pub fn warning(schema_id: &SchemaId, rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(schema_id, rule, message)
        }
    }

    /// Whether this finding blocks generation.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.severity, self.schema_id, self.rule, self.message
        )
    }
}

/// A structural policy over one effective schema.
pub trait GovernanceRule: Send + Sync {
    /// Stable rule name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Append this rule's findings for `schema` to `out`.
    fn check(&self, schema: &EffectiveSchema, out: &mut Vec<ValidationDiagnostic>);
}

/// A message that declares its consumers must name at least one.
#[derive(Debug, Clone)]
pub struct ConsumersDeclaredRule {
    field: String,
}

impl ConsumersDeclaredRule {
    /// Rule name.
    pub const NAME: &'static str = "ConsumersDeclaredRule";

    /// Check the constant on `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }
}

impl GovernanceRule for ConsumersDeclaredRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, schema: &EffectiveSchema, out: &mut Vec<ValidationDiagnostic>) {
        match schema.constants.get(&self.field).map(|c| &c.value) {
            Some(Literal::List(consumers)) if consumers.is_empty() => out.push(ValidationDiagnostic::error(
                &schema.id,
                Self::NAME,
                format!("'{}' is an empty list; a message must name at least one consumer", self.field),
            )),
            Some(Literal::List(_)) => {}
            Some(other) => out.push(ValidationDiagnostic::error(
                &schema.id,
                Self::NAME,
                format!("'{}' must be a list of service names, found {other}", self.field),
            )),
            None => out.push(ValidationDiagnostic::warning(
                &schema.id,
                Self::NAME,
                format!("no '{}' constant; consumers are undeclared", self.field),
            )),
        }
    }
}

/// Every required name must be a merged field.
#[derive(Debug, Clone, Default)]
pub struct RequiredFieldsResolvableRule;

impl RequiredFieldsResolvableRule {
    /// Rule name.
    pub const NAME: &'static str = "RequiredFieldsResolvableRule";
}

impl GovernanceRule for RequiredFieldsResolvableRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, schema: &EffectiveSchema, out: &mut Vec<ValidationDiagnostic>) {
        for name in &schema.required {
            if !schema.fields.contains_key(name) {
                out.push(ValidationDiagnostic::error(
                    &schema.id,
                    Self::NAME,
                    format!("required field '{name}' is not declared by the schema or its bases"),
                ));
            }
        }
    }
}

/// Envelope identity fields must exist with their expected kind.
#[derive(Debug, Clone)]
pub struct StableIdentityFieldsRule {
    fields: Vec<IdentityField>,
}

impl StableIdentityFieldsRule {
    /// Rule name.
    pub const NAME: &'static str = "StableIdentityFieldsRule";

    /// Check the given identity fields.
    pub fn new(fields: Vec<IdentityField>) -> Self {
        Self { fields }
    }
}

impl GovernanceRule for StableIdentityFieldsRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, schema: &EffectiveSchema, out: &mut Vec<ValidationDiagnostic>) {
        for expected in &self.fields {
            match schema.fields.get(&expected.name) {
                None => out.push(ValidationDiagnostic::error(
                    &schema.id,
                    Self::NAME,
                    format!("envelope field '{}' is missing", expected.name),
                )),
                Some(field) if field.spec.kind.primitive() != Some(expected.kind) => {
                    out.push(ValidationDiagnostic::error(
                        &schema.id,
                        Self::NAME,
                        format!(
                            "envelope field '{}' must be {} (declared in '{}')",
                            expected.name, expected.kind, field.source
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
    }
}

/// Runs an ordered list of rules.
pub struct GovernanceValidator {
    rules: Vec<Box<dyn GovernanceRule>>,
}

impl fmt::Debug for GovernanceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GovernanceValidator")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl GovernanceValidator {
    /// The standard rule set, in its fixed order.
    pub fn standard(config: &GovernanceConfig) -> Self {
        Self::with_rules(vec![
            Box::new(ConsumersDeclaredRule::new(config.consumer_field.clone())),
            Box::new(RequiredFieldsResolvableRule),
            Box::new(StableIdentityFieldsRule::new(config.identity_fields.clone())),
        ])
    }

    /// A validator running exactly `rules`, in order.
    pub fn with_rules(rules: Vec<Box<dyn GovernanceRule>>) -> Self {
        Self { rules }
    }

    /// Names of the configured rules, in order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule over one schema.
    pub fn validate(&self, schema: &EffectiveSchema) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        for rule in &self.rules {
            rule.check(schema, &mut out);
        }
        out
    }

    /// Run every rule over every schema and aggregate the findings.
    pub fn validate_all<'s, I>(&self, schemas: I) -> DiagnosticReport
    where
        I: IntoIterator<Item = &'s EffectiveSchema>,
    {
        let mut report = DiagnosticReport::default();
        for schema in schemas {
            report.extend(self.validate(schema));
        }
        report.sort();
        report
    }
}

/// Diagnostics of a run, ordered by schema identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    diagnostics: Vec<ValidationDiagnostic>,
}

impl DiagnosticReport {
    /// Add findings; call [`sort`](Self::sort) once everything is in.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = ValidationDiagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Order by schema identity, keeping each schema's rule order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| a.schema_id.cmp(&b.schema_id));
    }

    /// All findings.
    pub fn diagnostics(&self) -> &[ValidationDiagnostic] {
        &self.diagnostics
    }

    /// Number of `error` findings.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Whether any finding is an `error`.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Whether `id` has an `error` finding.
    pub fn blocks(&self, id: &SchemaId) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.is_error() && &d.schema_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::CompositionResolver;
    use crate::loader::{RawSchema, SchemaLoader, SchemaSet};

    fn id(s: &str) -> SchemaId {
        SchemaId::new(s).unwrap()
    }

    const ENVELOPE: &str = r#"{
        "type": "object",
        "properties": {
            "messageId": {"type": "string", "format": "uuid"},
            "timestamp": {"type": "string", "format": "date-time"},
            "correlationId": {"type": "string", "format": "uuid"},
            "consumedBy": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["messageId", "timestamp", "correlationId", "consumedBy"]
    }"#;

    fn message(consumers: &str) -> String {
        format!(
            r#"{{"allOf": [{{"$ref": "base.json"}}, {{"properties": {{"consumedBy": {{"const": {consumers}}}}}}}]}}"#
        )
    }

    fn load(sources: Vec<(&str, String)>) -> SchemaSet {
        SchemaLoader::new()
            .load(sources.into_iter().map(|(i, t)| RawSchema::new(id(i), t)))
            .unwrap()
    }

    fn validator() -> GovernanceValidator {
        GovernanceValidator::standard(&GovernanceConfig::default())
    }

    #[test]
    fn declared_consumers_pass() {
        let set = load(vec![("base", ENVELOPE.into()), ("ok", message(r#"["OrderService"]"#))]);
        let eff = CompositionResolver::new(&set).resolve(&id("ok")).unwrap();
        assert!(validator().validate(&eff).is_empty());
    }

    #[test]
    fn empty_consumers_produce_exactly_one_error() {
        let set = load(vec![("base", ENVELOPE.into()), ("empty", message("[]"))]);
        let eff = CompositionResolver::new(&set).resolve(&id("empty")).unwrap();
        let diags = validator().validate(&eff);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, ConsumersDeclaredRule::NAME);
        assert!(diags[0].is_error());
    }

    #[test]
    fn missing_consumers_only_warn() {
        let set = load(vec![("base", ENVELOPE.into())]);
        let eff = CompositionResolver::new(&set).resolve(&id("base")).unwrap();
        let diags = validator().validate(&eff);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn unresolvable_required_and_identity_mismatch() {
        let set = load(vec![(
            "bad",
            r#"{
                "type": "object",
                "properties": {
                    "consumedBy": {"const": ["A"]},
                    "messageId": {"type": "string"},
                    "timestamp": {"type": "string", "format": "date-time"}
                },
                "required": ["ghost", "phantom"]
            }"#
            .into(),
        )]);
        let eff = CompositionResolver::new(&set).resolve(&id("bad")).unwrap();
        let diags = validator().validate(&eff);
        let rules: Vec<&str> = diags.iter().map(|d| d.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec![
                RequiredFieldsResolvableRule::NAME,
                RequiredFieldsResolvableRule::NAME,
                StableIdentityFieldsRule::NAME,
                StableIdentityFieldsRule::NAME,
            ]
        );
        assert!(diags[0].message.contains("ghost"));
        assert!(diags[1].message.contains("phantom"));
        assert!(diags[2].message.contains("messageId"));
        assert!(diags[3].message.contains("correlationId"));
    }

    #[test]
    fn report_orders_by_schema_and_keeps_going() {
        let set = load(vec![
            ("base", ENVELOPE.into()),
            ("zeta", message("[]")),
            ("alpha", message("[]")),
            ("mid", message(r#"["X"]"#)),
        ]);
        let resolver = CompositionResolver::new(&set);
        let schemas: Vec<EffectiveSchema> = ["zeta", "alpha", "mid"]
            .iter()
            .map(|s| resolver.resolve(&id(s)).unwrap())
            .collect();
        let report = validator().validate_all(&schemas);
        let ids: Vec<&str> = report.diagnostics().iter().map(|d| d.schema_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(report.error_count(), 2);
        assert!(report.blocks(&id("zeta")));
        assert!(!report.blocks(&id("mid")));
    }
}
