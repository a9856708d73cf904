//! Command-line tools for patching and resolving module sources.
//!
//! Provides the core logic used by the binary entry points:
//! - `content-patch`: apply one or more patches to a module source
//! - `content-resolve`: resolve a module path against a source and schema

use std::io;

use content_path::ModuleId;
use content_schema::{resolve_path, ResolutionError, SerializedSchema};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::codec::json::from_json_patch_with;
use crate::config::{ConfigError, CoreConfig, LOG_ENV};
use crate::store::{commit_pending, MemoryStore, Module, ModuleStore, StoreError};
use crate::types::PendingPatch;
use crate::validate::{validate_operations, ValidationError};

/// Module id the CLI gives the source read from stdin.
pub const STDIN_MODULE: &str = "/stdin";

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Patch(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("{0}")]
    Usage(String),
}

// ── Logging ───────────────────────────────────────────────────────────────

/// Install a stderr `tracing` subscriber. `CONTENT_PATCH_LOG` overrides the
/// configured filter.
pub fn init_tracing(config: &CoreConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

// ── content-patch ─────────────────────────────────────────────────────────

/// Apply patches, in argument order, to a module source.
///
/// `source_json`: the module source as a JSON string.
/// `patches`: each a JSON array of operations.
///
/// Patches are queued and committed the way an editor commits its pending
/// queue, so consecutive single `replace` patches on one path collapse.
/// Returns the patched source as a pretty-printed JSON string.
pub async fn apply_patches(
    source_json: &str,
    patches: &[String],
    config: &CoreConfig,
) -> Result<String, CliError> {
    if patches.is_empty() {
        return Err(CliError::Usage("First argument must be a JSON patch array.".into()));
    }
    let source: Value = serde_json::from_str(source_json)?;
    let mut queue = Vec::with_capacity(patches.len());
    for (seq, patch) in patches.iter().enumerate() {
        let raw: Value = serde_json::from_str(patch)?;
        validate_operations(&raw)?;
        let ops = from_json_patch_with(&raw, config.path_escaping)
            .map_err(|e| CliError::Patch(e.to_string()))?;
        queue.push(PendingPatch::new(ops, seq as u64));
    }
    debug!(target: "content_patch::cli", patches = queue.len(), "applying patches");

    let module_id = ModuleId::parse(STDIN_MODULE).map_err(|e| CliError::Usage(e.to_string()))?;
    let store = MemoryStore::from_config(config);
    store.insert(module_id.clone(), Module::untyped(source));

    let pending = [(&module_id, &queue)];
    let mut report = commit_pending(&store, pending, &config.merge_options()).await;
    if let Some((_, err)) = report.failed.pop() {
        return Err(err.into());
    }
    let module = store.get_module(&module_id)?;
    Ok(serde_json::to_string_pretty(&module.source)?)
}

// ── content-resolve ───────────────────────────────────────────────────────

/// Resolve `module_path` against a source and its schema.
///
/// Returns `{ "source": ..., "schema": ... }` as a pretty-printed JSON string.
pub fn resolve(schema_json: &str, source_json: &str, module_path: &str) -> Result<String, CliError> {
    let schema: SerializedSchema = serde_json::from_str(schema_json)?;
    let source: Value = serde_json::from_str(source_json)?;
    let resolved = resolve_path(module_path, &source, &schema)?;
    let out = json!({ "source": resolved.source, "schema": resolved.schema });
    Ok(serde_json::to_string_pretty(&out)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, patches: &[&str]) -> Result<Value, CliError> {
        let patches: Vec<String> = patches.iter().map(|p| p.to_string()).collect();
        let rt = tokio::runtime::Builder::new_current_thread().build()?;
        let out = rt.block_on(apply_patches(source, &patches, &CoreConfig::default()))?;
        Ok(serde_json::from_str(&out)?)
    }

    #[test]
    fn patch_add_key() {
        let v = run(r#"{"a":1}"#, &[r#"[{"op":"add","path":"/b","value":2}]"#]).unwrap();
        assert_eq!(v["b"], 2);
    }

    #[test]
    fn patches_apply_in_order() {
        let v = run(
            r#"{"title":"A","tags":[]}"#,
            &[
                r#"[{"op":"replace","path":"/title","value":"B"}]"#,
                r#"[{"op":"add","path":"/tags/-","value":"x"}]"#,
                r#"[{"op":"replace","path":"/title","value":"C"}]"#,
            ],
        )
        .unwrap();
        assert_eq!(v, json!({"title": "C", "tags": ["x"]}));
    }

    #[test]
    fn invalid_patch_is_reported() {
        let err = run(r#"{"a":1}"#, &[r#"[{"op":"add","path":"/b"}]"#]).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        let err = run(r#"{"a":1}"#, &[r#"[{"op":"remove","path":"/b"}]"#]).unwrap_err();
        assert!(err.to_string().contains("NOT_FOUND: /b"));
    }

    #[test]
    fn missing_patch_argument() {
        assert!(matches!(run("{}", &[]), Err(CliError::Usage(_))));
    }

    #[test]
    fn resolve_prints_source_and_schema() {
        let schema = r#"{"type":"array","item":{"type":"object","items":{"title":{"type":"string"}}}}"#;
        let out = resolve(schema, r#"[{"title":"Hello"}]"#, r#"0."title""#).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["source"], json!("Hello"));
        assert_eq!(v["schema"]["type"], json!("string"));
    }

    #[test]
    fn resolve_reports_mismatch() {
        let schema = r#"{"type":"object","items":{"title":{"type":"string"}}}"#;
        let err = resolve(schema, r#"{"title":"x"}"#, r#""missing""#).unwrap_err();
        assert!(matches!(err, CliError::Resolution(ResolutionError::UnknownKey { .. })));
    }
}
