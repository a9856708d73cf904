//! Content patch operations.
//!
//! A patch is an ordered list of RFC 6902 style operations (plus a `file`
//! extension for uploads) addressed by patch paths. This crate decodes and
//! validates patches from JSON, applies them to module sources, diffs two
//! sources into a patch, merges queued patches, and drives queues through
//! an async module store.
//!
//! ```
//! use content_patch::{apply_patch, from_json_patch, merge_patches, PendingPatch};
//! use content_path::ModuleId;
//! use serde_json::json;
//! use std::collections::BTreeMap;
//!
//! let ops = from_json_patch(&json!([{ "op": "replace", "path": "/title", "value": "B" }])).unwrap();
//! let doc = apply_patch(&json!({ "title": "A" }), &ops).unwrap().doc;
//! assert_eq!(doc, json!({ "title": "B" }));
//!
//! let mut pending = BTreeMap::new();
//! pending.insert(
//!     ModuleId::parse("/content/blog").unwrap(),
//!     vec![PendingPatch::new(ops.clone(), 1), PendingPatch::new(ops, 2)],
//! );
//! assert_eq!(merge_patches(&pending).len(), 1);
//! ```

pub mod apply;
pub mod cli;
pub mod codec;
pub mod config;
pub mod diff;
pub mod file;
pub mod merge;
pub mod store;
pub mod types;
pub mod validate;

pub use apply::{apply_op, apply_ops, apply_patch, apply_patch_with, get_at, ApplyPatchOptions};
pub use codec::json::{
    from_json, from_json_patch, from_json_patch_with, from_json_with, to_json, to_json_patch,
    to_json_with,
};
pub use config::{ConfigError, CoreConfig};
pub use diff::{generate_patch, prefix_ops, richtext_patch};
pub use file::{parse_data_url, to_data_url, DataUrl};
pub use merge::{merge_module, merge_patches, merge_patches_with, MergeOptions};
pub use store::{
    commit_pending, resolve_source_path, CommitReport, MemoryStore, Module, ModuleStore, PatchId,
    PatchTransport, ResolvedSource, StoreError,
};
pub use types::{
    MergedPatch, Op, OpResult, Patch, PatchError, PatchResult, PendingPatch, StagedFile,
};
pub use validate::{validate_operation, validate_operations, ValidationError};
