//! # Generation Pipeline
//!
//! One run over a full schema set:
//!
//! ```text
//! RawSchema* → SchemaLoader → SchemaSet
//!            → CompositionResolver (every object schema)
//!            → GovernanceValidator (message schemas)
//!            → IrBuilder → LanguageBackend* → GeneratedArtifact*
//! ```
//!
//! Failures are scoped to one schema: a cycle or a governance error in one
//! message never stops independent messages from being processed. Only a
//! duplicate identity aborts the run, because the set itself is ambiguous.
//!
//! Independent schemas may be processed on worker threads. Every collection
//! in the [`GenerationReport`] is sorted by schema identity (artifacts by
//! path), so the report is identical with and without parallelism.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use contracts_core::{ContractsError, NamespacePath, SchemaError, SchemaId};

use crate::backend::{backend_for, GeneratedArtifact, LanguageBackend};
use crate::compose::CompositionResolver;
use crate::config::GeneratorConfig;
use crate::governance::{DiagnosticReport, GovernanceValidator, ValidationDiagnostic};
use crate::ir::{IrBuilder, IrGraph};
use crate::loader::{RawSchema, SchemaLoader, SchemaSet};
use crate::namespace::NamespaceMapper;

/// A schema that could not be processed.
#[derive(Debug)]
pub struct SchemaFailure {
    /// The schema that failed.
    pub schema_id: SchemaId,
    /// Why.
    pub error: ContractsError,
}

impl fmt::Display for SchemaFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.schema_id, self.error)
    }
}

/// Everything one run produced.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Message schemas of the set, sorted.
    pub messages: Vec<SchemaId>,
    /// Message schemas whose types were built, sorted.
    pub generated: Vec<SchemaId>,
    /// Governance findings, sorted by schema identity.
    pub diagnostics: DiagnosticReport,
    /// Load, resolution, IR and backend failures, sorted by schema identity.
    pub failures: Vec<SchemaFailure>,
    /// Generated files of the successful schemas, sorted by backend and path.
    pub artifacts: Vec<GeneratedArtifact>,
}

impl GenerationReport {
    /// No failure and no `error` finding.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.diagnostics.has_errors()
    }

    /// Number of failures plus `error` findings.
    pub fn error_count(&self) -> usize {
        self.failures.len() + self.diagnostics.error_count()
    }

    /// The artifacts that may be written.
    ///
    /// A failed run writes nothing unless `allow_partial` is set, in which
    /// case the files of the schemas that succeeded are returned.
    pub fn writable_artifacts(&self, allow_partial: bool) -> &[GeneratedArtifact] {
        if self.is_success() || allow_partial {
            &self.artifacts
        } else {
            &[]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Resolve, govern and build IR.
    Check,
    /// Also run the backends.
    Generate,
}

/// Per-schema result of the worker stage.
#[derive(Default)]
struct Outcome {
    diagnostics: Vec<ValidationDiagnostic>,
    failure: Option<SchemaFailure>,
    artifacts: Vec<GeneratedArtifact>,
    generated: bool,
}

/// Runs the pipeline with a fixed configuration.
pub struct Generator {
    loader: SchemaLoader,
    mapper: NamespaceMapper,
    validator: GovernanceValidator,
    backends: Vec<Box<dyn LanguageBackend>>,
    parallel: bool,
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("mapper", &self.mapper)
            .field("validator", &self.validator)
            .field("backends", &self.backends.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Generator {
    /// A generator with the backends, rules and root namespace of `config`.
    pub fn new(config: &GeneratorConfig) -> Self {
        let root = config.namespace_root();
        let backends = config.backends.iter().map(|kind| backend_for(*kind, &root)).collect();
        Self {
            loader: SchemaLoader::new(),
            mapper: NamespaceMapper::new(root),
            validator: GovernanceValidator::standard(&config.governance),
            backends,
            parallel: config.parallel,
        }
    }

    /// Replace the backends.
    pub fn with_backends(mut self, backends: Vec<Box<dyn LanguageBackend>>) -> Self {
        self.backends = backends;
        self
    }

    /// Replace the governance rules.
    pub fn with_validator(mut self, validator: GovernanceValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the loader.
    pub fn with_loader(mut self, loader: SchemaLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Process independent schemas on worker threads.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The configured root namespace.
    pub fn root_namespace(&self) -> &NamespacePath {
        self.mapper.root()
    }

    /// Load, resolve, govern and build IR without running any backend.
    ///
    /// # Errors
    ///
    /// `DuplicateSchemaId` only; everything else is reported per schema.
    pub fn check<I>(&self, sources: I) -> Result<GenerationReport, SchemaError>
    where
        I: IntoIterator<Item = RawSchema>,
    {
        self.execute(sources, Stage::Check)
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// `DuplicateSchemaId` only; everything else is reported per schema.
    pub fn run<I>(&self, sources: I) -> Result<GenerationReport, SchemaError>
    where
        I: IntoIterator<Item = RawSchema>,
    {
        self.execute(sources, Stage::Generate)
    }

    /// Build the IR graph of one message schema of a loaded set.
    pub fn build_graph(&self, set: &SchemaSet, id: &SchemaId) -> Result<IrGraph, SchemaError> {
        let resolver = CompositionResolver::new(set);
        let effective = resolver.resolve(id)?;
        IrBuilder::new(resolver, &self.mapper).build(&effective, &self.mapper.map(id))
    }

    fn execute<I>(&self, sources: I, stage: Stage) -> Result<GenerationReport, SchemaError>
    where
        I: IntoIterator<Item = RawSchema>,
    {
        let set = self.loader.load(sources)?;
        let messages: BTreeSet<&SchemaId> = set.message_ids().into_iter().collect();
        let work: Vec<(&SchemaId, bool)> = set
            .object_ids()
            .into_iter()
            .map(|id| (id, messages.contains(id)))
            .collect();

        tracing::info!(
            schemas = set.len(),
            rejected = set.rejected().count(),
            messages = messages.len(),
            parallel = self.parallel,
            "processing schema set"
        );

        let outcomes = self.process_all(&set, &work, stage);

        let mut report = GenerationReport {
            messages: messages.iter().map(|id| (*id).clone()).collect(),
            ..GenerationReport::default()
        };
        for error in set.rejected() {
            report.failures.push(SchemaFailure {
                schema_id: error.schema_id().clone(),
                error: error.clone().into(),
            });
        }

        let mut artifacts = Vec::new();
        for ((id, _), outcome) in work.iter().zip(outcomes) {
            report.diagnostics.extend(outcome.diagnostics);
            report.failures.extend(outcome.failure);
            if outcome.generated {
                report.generated.push((*id).clone());
            }
            artifacts.extend(outcome.artifacts);
        }
        report.artifacts = self.collate(artifacts, &mut report);

        report.diagnostics.sort();
        report.failures.sort_by(|a, b| a.schema_id.cmp(&b.schema_id));

        tracing::info!(
            generated = report.generated.len(),
            artifacts = report.artifacts.len(),
            errors = report.error_count(),
            "schema set processed"
        );
        Ok(report)
    }

    fn process_all(&self, set: &SchemaSet, work: &[(&SchemaId, bool)], stage: Stage) -> Vec<Outcome> {
        let workers = std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(work.len());
        if !self.parallel || workers < 2 {
            return work
                .iter()
                .map(|(id, message)| self.process(set, id, *message, stage))
                .collect();
        }

        let chunk = work.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = work
                .chunks(chunk)
                .map(|part| {
                    scope.spawn(move || {
                        part.iter()
                            .map(|(id, message)| self.process(set, id, *message, stage))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        })
    }

    fn process(&self, set: &SchemaSet, id: &SchemaId, message: bool, stage: Stage) -> Outcome {
        let fail = |error: ContractsError| {
            tracing::warn!(schema_id = %id, "{error}");
            Outcome {
                failure: Some(SchemaFailure {
                    schema_id: id.clone(),
                    error,
                }),
                ..Outcome::default()
            }
        };

        let resolver = CompositionResolver::new(set);
        let effective = match resolver.resolve(id) {
            Ok(effective) => effective,
            Err(e) => return fail(e.into()),
        };
        if !message {
            return Outcome::default();
        }

        let diagnostics = self.validator.validate(&effective);
        if diagnostics.iter().any(ValidationDiagnostic::is_error) {
            tracing::debug!(schema_id = %id, "governance blocked generation");
            return Outcome {
                diagnostics,
                ..Outcome::default()
            };
        }

        let graph = match IrBuilder::new(resolver, &self.mapper).build(&effective, &self.mapper.map(id)) {
            Ok(graph) => graph,
            Err(e) => {
                return Outcome {
                    diagnostics,
                    ..fail(e.into())
                }
            }
        };

        let mut artifacts = Vec::new();
        if stage == Stage::Generate {
            for backend in &self.backends {
                match backend.emit_graph(&graph) {
                    Ok(mut emitted) => artifacts.append(&mut emitted),
                    Err(e) => {
                        return Outcome {
                            diagnostics,
                            ..fail(e)
                        }
                    }
                }
            }
        }

        Outcome {
            diagnostics,
            failure: None,
            artifacts,
            generated: true,
        }
    }

    /// Merge per-schema artifacts into one sorted list and add module indexes.
    ///
    /// Schemas sharing a type emit the same file; identical copies collapse
    /// into one. Differing copies fail the later schema and drop its files.
    fn collate(&self, artifacts: Vec<GeneratedArtifact>, report: &mut GenerationReport) -> Vec<GeneratedArtifact> {
        let mut by_path: BTreeMap<(&'static str, PathBuf), GeneratedArtifact> = BTreeMap::new();
        let mut rejected: BTreeSet<SchemaId> = BTreeSet::new();

        for artifact in &artifacts {
            let key = (artifact.backend, artifact.relative_path.clone());
            match by_path.get(&key) {
                None => {
                    by_path.insert(key, artifact.clone());
                }
                Some(existing) if existing.contents == artifact.contents => {}
                Some(existing) => {
                    if let Some(source) = &artifact.source {
                        if rejected.insert(source.clone()) {
                            report.failures.push(SchemaFailure {
                                schema_id: source.clone(),
                                error: ContractsError::Backend(format!(
                                    "{}/{} differs from the copy generated for {}",
                                    artifact.backend,
                                    artifact.relative_path.display(),
                                    existing.source.as_ref().map_or("another schema", SchemaId::as_str),
                                )),
                            });
                        }
                    }
                }
            }
        }

        if !rejected.is_empty() {
            report.generated.retain(|id| !rejected.contains(id));
            by_path.clear();
            for artifact in artifacts {
                let keep = artifact.source.as_ref().map_or(true, |s| !rejected.contains(s));
                if keep {
                    by_path
                        .entry((artifact.backend, artifact.relative_path.clone()))
                        .or_insert(artifact);
                }
            }
        }

        let mut collated: Vec<GeneratedArtifact> = by_path.into_values().collect();
        for backend in &self.backends {
            let paths: Vec<&Path> = collated
                .iter()
                .filter(|a| a.backend == backend.name())
                .map(|a| a.relative_path.as_path())
                .collect();
            if paths.is_empty() {
                continue;
            }
            let index = backend.emit_index(&paths);
            collated.extend(index);
        }
        collated.sort_by(|a, b| (a.backend, &a.relative_path).cmp(&(b.backend, &b.relative_path)));
        collated
    }
}
