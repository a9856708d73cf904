//! Path codecs for content modules.
//!
//! Three path flavors address values inside content modules:
//!
//! - a **module path** (`"blogs".0."title"`) names a value inside one loaded
//!   module; each segment is JSON-encoded on its own and segments are joined
//!   with `.`,
//! - a **patch path** (`/blogs/0/title`) is the RFC 6902 flavored form used
//!   inside patch operations; segments are raw strings,
//! - a **source path** (`/content/blogs."blogs".0."title"`) is a module id
//!   followed by a module path, and is globally unique.
//!
//! The codecs are schema-agnostic: an unquoted integer segment in a module
//! path is always an array index, a quoted one is always an object key.
//!
//! # Example
//!
//! ```
//! use content_path::{decode_module_path, encode_module_path, module_to_patch_path, Segment};
//!
//! let segments = vec![Segment::key("blogs"), Segment::index(0), Segment::key("title")];
//! let module_path = encode_module_path(&segments);
//! assert_eq!(module_path, r#""blogs".0."title""#);
//! assert_eq!(decode_module_path(&module_path).unwrap(), segments);
//!
//! let pointer = module_to_patch_path(&module_path, &[]).unwrap();
//! assert_eq!(pointer, "/blogs/0/title");
//! ```

use thiserror::Error;

pub mod module_path;
pub mod patch_path;
pub mod segment;
pub mod source_path;
pub mod tree;
pub mod validate;

pub use module_path::{decode_module_path, encode_module_path, parent_module_path};
pub use patch_path::{
    decode_patch_path, decode_patch_path_with, encode_patch_path, encode_patch_path_with,
    escape_segment, is_child, is_path_equal, is_valid_index, module_path_to_steps,
    module_to_patch_path, patch_to_module_path, prefix_path, unescape_segment, Path, PathEscaping,
    PathStep,
};
pub use segment::Segment;
pub use source_path::{join_source_path, split_source_path, ModuleId, ModuleRegistry};
pub use tree::{find_upper_directory, path_tree, PathTree};
pub use validate::{validate_patch_pointer, validate_path, MAX_PATH_DEPTH, MAX_POINTER_LENGTH};

/// Errors raised while decoding or splitting paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("malformed module path {path:?}: {reason}")]
    MalformedModulePath { path: String, reason: &'static str },
    #[error("malformed patch path {path:?}: {reason}")]
    MalformedPatchPath { path: String, reason: &'static str },
    #[error("patch path too long: {len} characters (max {max})")]
    PointerTooLong { len: usize, max: usize },
    #[error("path too deep: {depth} steps (max {max})")]
    PathTooDeep { depth: usize, max: usize },
    #[error("invalid module id {0:?}")]
    InvalidModuleId(String),
    #[error("no module registered for source path {0:?}")]
    UnknownModule(String),
}

impl PathError {
    pub(crate) fn module(path: &str, reason: &'static str) -> Self {
        PathError::MalformedModulePath { path: path.to_string(), reason }
    }

    pub(crate) fn patch(path: &str, reason: &'static str) -> Self {
        PathError::MalformedPatchPath { path: path.to_string(), reason }
    }

    /// True for failures to decode a path string.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            PathError::MalformedModulePath { .. }
                | PathError::MalformedPatchPath { .. }
                | PathError::PointerTooLong { .. }
                | PathError::PathTooDeep { .. }
        )
    }
}
