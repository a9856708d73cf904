//! Core types for content patches.

use content_path::{encode_patch_path, ModuleId, Path};
use serde_json::Value;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

/// Why an operation could not be applied. Each variant carries the patch
/// path (RFC 6902 string form) of the offending location.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("TEST: {0}")]
    Test(String),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("INVALID_TARGET: {0}")]
    InvalidTarget(String),
    #[error("MOVE_ONTO_ITSELF: {0}")]
    MoveOntoItself(String),
    #[error("FILE_REFERENCE_MISSING: {0}")]
    FileReferenceMissing(String),
    #[error("INVALID_FILE_PAYLOAD: {0}")]
    InvalidFilePayload(String),
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl PatchError {
    pub(crate) fn not_found(path: &[String]) -> Self {
        PatchError::NotFound(encode_patch_path(path))
    }

    pub(crate) fn invalid_index(path: &[String]) -> Self {
        PatchError::InvalidIndex(encode_patch_path(path))
    }

    pub(crate) fn invalid_target(path: &[String]) -> Self {
        PatchError::InvalidTarget(encode_patch_path(path))
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A patch operation. `file` is the only extension to RFC 6902.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add {
        path: Path,
        value: Value,
    },
    Remove {
        path: Path,
    },
    Replace {
        path: Path,
        value: Value,
    },
    Move {
        from: Path,
        path: Path,
    },
    Copy {
        from: Path,
        path: Path,
    },
    Test {
        path: Path,
        value: Value,
    },
    /// Upload file content for the file reference at `path`. `value` is a
    /// `data:` URL; `nested_path` optionally names where the reference is
    /// mirrored inside the module.
    File {
        path: Path,
        value: String,
        nested_path: Option<Path>,
    },
}

impl Op {
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
            Op::File { .. } => "file",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. }
            | Op::Test { path, .. }
            | Op::File { path, .. } => path,
        }
    }

    pub fn from(&self) -> Option<&Path> {
        match self {
            Op::Move { from, .. } | Op::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Prepend `base` to every path this operation carries.
    pub fn prefixed(&self, base: &[String]) -> Op {
        let join = |path: &Path| -> Path { base.iter().chain(path.iter()).cloned().collect() };
        match self {
            Op::Add { path, value } => Op::Add { path: join(path), value: value.clone() },
            Op::Remove { path } => Op::Remove { path: join(path) },
            Op::Replace { path, value } => Op::Replace { path: join(path), value: value.clone() },
            Op::Move { from, path } => Op::Move { from: join(from), path: join(path) },
            Op::Copy { from, path } => Op::Copy { from: join(from), path: join(path) },
            Op::Test { path, value } => Op::Test { path: join(path), value: value.clone() },
            Op::File { path, value, nested_path } => Op::File {
                path: join(path),
                value: value.clone(),
                nested_path: nested_path.as_ref().map(join),
            },
        }
    }
}

/// An ordered list of operations.
pub type Patch = Vec<Op>;

// ── Queue types ───────────────────────────────────────────────────────────

/// A patch waiting to be committed. Within one module, patches apply in
/// non-decreasing `seq_number` order.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPatch {
    pub patch: Patch,
    pub seq_number: u64,
}

impl PendingPatch {
    pub fn new(patch: Patch, seq_number: u64) -> Self {
        PendingPatch { patch, seq_number }
    }
}

/// Merger output: one patch to send for one module.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPatch {
    pub module_id: ModuleId,
    pub patch: Patch,
}

// ── Result types ──────────────────────────────────────────────────────────

/// A file upload decoded from a `file` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// The file reference (`_ref`) the bytes belong to.
    pub reference: String,
    pub nested_path: Option<Path>,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Result of applying a single operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpResult {
    /// The value at the path before the operation, if any.
    pub old: Option<Value>,
    pub staged: Option<StagedFile>,
}

/// Result of applying a full patch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchResult {
    pub doc: Value,
    pub res: Vec<OpResult>,
}

impl PatchResult {
    /// Files staged by the patch, in operation order.
    pub fn staged_files(&self) -> impl Iterator<Item = &StagedFile> {
        self.res.iter().filter_map(|r| r.staged.as_ref())
    }
}
