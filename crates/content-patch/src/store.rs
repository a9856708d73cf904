//! The module store boundary.
//!
//! Reads are synchronous snapshots; applying a patch is asynchronous.
//! [`commit_pending`] drives a whole pending queue through a store: it
//! merges first, then commits different modules concurrently while keeping
//! each module's patches in order.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use content_path::{split_source_path, ModuleId, ModuleRegistry, PathError};
use content_schema::{
    resolve_path, validate_source, ResolutionError, SerializedSchema, SourceIssue,
};
use futures_util::future::join_all;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::apply::{apply_patch_with, ApplyPatchOptions};
use crate::config::CoreConfig;
use crate::merge::{merge_patches_with, MergeOptions};
use crate::types::{Op, PatchError, PendingPatch, StagedFile};

/// Identifier a transport assigns to an accepted patch.
pub type PatchId = String;

/// A module's current source and, when known, its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub source: Value,
    pub schema: Option<SerializedSchema>,
}

impl Module {
    pub fn new(source: Value, schema: SerializedSchema) -> Self {
        Module { source, schema: Some(schema) }
    }

    pub fn untyped(source: Value) -> Self {
        Module { source, schema: None }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown module {0}")]
    UnknownModule(String),
    #[error("module {0} has no schema")]
    MissingSchema(ModuleId),
    #[error("patch rejected for {module_id}: {source}")]
    Patch { module_id: ModuleId, source: PatchError },
    #[error("patched source of {module_id} does not match its schema ({} issues, first: {})", .issues.len(), first_issue(.issues))]
    SchemaViolation { module_id: ModuleId, issues: Vec<SourceIssue> },
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("transport failed: {0}")]
    Transport(String),
}

fn first_issue(issues: &[SourceIssue]) -> String {
    issues.first().map(ToString::to_string).unwrap_or_default()
}

#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// A snapshot of the module's current state.
    fn get_module(&self, module_id: &ModuleId) -> Result<Module, StoreError>;

    /// Apply a patch to one module. Either every operation applies or the
    /// module is left unchanged.
    async fn apply_patch(&self, module_id: &ModuleId, patch: &[Op]) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PatchTransport: Send + Sync {
    /// Hand a patch to the remote side.
    async fn post_patches(&self, module_id: &ModuleId, patch: &[Op]) -> Result<PatchId, StoreError>;
}

// ── Source path resolution ────────────────────────────────────────────────

/// A value looked up by source path, detached from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub module_id: ModuleId,
    pub module_path: String,
    pub source: Value,
    pub schema: SerializedSchema,
}

/// Split `source_path` against the store's modules and resolve it.
pub fn resolve_source_path<S>(store: &S, source_path: &str) -> Result<ResolvedSource, StoreError>
where
    S: ModuleStore + ModuleRegistry + ?Sized,
{
    let (module_id, module_path) = split_source_path(source_path, store)?;
    let module = store.get_module(&module_id)?;
    let schema = module
        .schema
        .ok_or_else(|| StoreError::MissingSchema(module_id.clone()))?;
    let resolved = resolve_path(&module_path, &module.source, &schema)?;
    Ok(ResolvedSource {
        source: resolved.source.clone(),
        schema: resolved.schema.clone(),
        module_id,
        module_path,
    })
}

// ── Commit orchestration ──────────────────────────────────────────────────

/// Outcome of [`commit_pending`]. Modules that committed stay committed
/// when others fail.
#[derive(Debug, Default)]
pub struct CommitReport {
    pub committed: Vec<ModuleId>,
    pub failed: Vec<(ModuleId, StoreError)>,
}

impl CommitReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Merge the pending queues and apply them through `store`.
pub async fn commit_pending<'a, S, I>(store: &S, pending: I, options: &MergeOptions) -> CommitReport
where
    S: ModuleStore + ?Sized,
    I: IntoIterator<Item = (&'a ModuleId, &'a Vec<PendingPatch>)>,
{
    let mut by_module: IndexMap<ModuleId, Vec<Vec<Op>>> = IndexMap::new();
    for merged in merge_patches_with(pending, options) {
        by_module.entry(merged.module_id).or_default().push(merged.patch);
    }

    let commits = by_module.into_iter().map(|(module_id, patches)| async move {
        for patch in &patches {
            if let Err(err) = store.apply_patch(&module_id, patch).await {
                return (module_id, Err(err));
            }
        }
        (module_id, Ok(patches.len()))
    });

    let mut report = CommitReport::default();
    for (module_id, outcome) in join_all(commits).await {
        match outcome {
            Ok(count) => {
                debug!(target: "content_patch::store", module = %module_id, patches = count, "module committed");
                report.committed.push(module_id);
            }
            Err(err) => {
                warn!(target: "content_patch::store", module = %module_id, error = %err, "module commit failed");
                report.failed.push((module_id, err));
            }
        }
    }
    info!(
        target: "content_patch::store",
        committed = report.committed.len(),
        failed = report.failed.len(),
        "pending patches committed"
    );
    report
}

// ── In-memory store ───────────────────────────────────────────────────────

/// A store holding modules in memory. Staged file uploads are kept by
/// reference.
pub struct MemoryStore {
    modules: RwLock<IndexMap<ModuleId, Module>>,
    files: RwLock<IndexMap<String, StagedFile>>,
    apply_options: ApplyPatchOptions,
    validate_schema: bool,
    next_patch_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            modules: RwLock::new(IndexMap::new()),
            files: RwLock::new(IndexMap::new()),
            apply_options: ApplyPatchOptions::default(),
            validate_schema: true,
            next_patch_id: AtomicU64::new(1),
        }
    }

    pub fn with_options(apply_options: ApplyPatchOptions, validate_schema: bool) -> Self {
        MemoryStore { apply_options, validate_schema, ..Self::new() }
    }

    /// A store using the configured path limits and post-apply validation.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::with_options(config.apply_options(), config.validate_schema_on_apply)
    }

    pub fn insert(&self, module_id: ModuleId, module: Module) {
        self.modules.write().insert(module_id, module);
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.read().keys().cloned().collect()
    }

    /// A staged upload by file reference.
    pub fn staged_file(&self, reference: &str) -> Option<StagedFile> {
        self.files.read().get(reference).cloned()
    }
}

impl ModuleRegistry for MemoryStore {
    fn contains_module(&self, module_id: &str) -> bool {
        self.modules.read().contains_key(module_id)
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    fn get_module(&self, module_id: &ModuleId) -> Result<Module, StoreError> {
        self.modules
            .read()
            .get(module_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownModule(module_id.to_string()))
    }

    async fn apply_patch(&self, module_id: &ModuleId, patch: &[Op]) -> Result<(), StoreError> {
        let mut modules = self.modules.write();
        let module = modules
            .get_mut(module_id)
            .ok_or_else(|| StoreError::UnknownModule(module_id.to_string()))?;
        let result = apply_patch_with(&module.source, patch, &self.apply_options)
            .map_err(|source| StoreError::Patch { module_id: module_id.clone(), source })?;
        if let (true, Some(schema)) = (self.validate_schema, &module.schema) {
            let issues = validate_source(schema, &result.doc);
            if !issues.is_empty() {
                return Err(StoreError::SchemaViolation { module_id: module_id.clone(), issues });
            }
        }
        let mut files = self.files.write();
        for staged in result.staged_files() {
            files.insert(staged.reference.clone(), staged.clone());
        }
        module.source = result.doc;
        Ok(())
    }
}

#[async_trait]
impl PatchTransport for MemoryStore {
    async fn post_patches(&self, module_id: &ModuleId, patch: &[Op]) -> Result<PatchId, StoreError> {
        self.apply_patch(module_id, patch).await?;
        let id = self.next_patch_id.fetch_add(1, Ordering::Relaxed);
        Ok(format!("patch-{id}"))
    }
}
