//! Patch merger.
//!
//! Pending patches are folded per module in sequence order. A run of
//! single-operation `replace` patches on the same path collapses to one
//! patch carrying the last value; every other patch passes through
//! verbatim, in order.

use content_path::{ModuleId, Path};
use serde_json::Value;
use tracing::debug;

use crate::types::{MergedPatch, Op, PendingPatch};

/// Options for [`merge_patches_with`].
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub coalesce_replaces: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { coalesce_replaces: true }
    }
}

/// Merge every module's pending queue. Modules are emitted in sorted id
/// order; entries of one module keep their relative order.
pub fn merge_patches<'a, I>(pending: I) -> Vec<MergedPatch>
where
    I: IntoIterator<Item = (&'a ModuleId, &'a Vec<PendingPatch>)>,
{
    merge_patches_with(pending, &MergeOptions::default())
}

pub fn merge_patches_with<'a, I>(pending: I, options: &MergeOptions) -> Vec<MergedPatch>
where
    I: IntoIterator<Item = (&'a ModuleId, &'a Vec<PendingPatch>)>,
{
    let mut modules: Vec<_> = pending.into_iter().collect();
    modules.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = Vec::new();
    for (module_id, patches) in modules {
        let merged = merge_module(patches, options);
        debug!(
            target: "content_patch::merge",
            module = %module_id,
            pending = patches.len(),
            merged = merged.len(),
            "merged pending patches"
        );
        out.extend(merged.into_iter().map(|patch| MergedPatch { module_id: module_id.clone(), patch }));
    }
    out
}

/// Fold one module's queue into the patches to send.
pub fn merge_module(patches: &[PendingPatch], options: &MergeOptions) -> Vec<Vec<Op>> {
    let mut ordered: Vec<&PendingPatch> = patches.iter().collect();
    ordered.sort_by_key(|p| p.seq_number);

    let (mut out, last) = ordered.into_iter().fold(
        (Vec::with_capacity(patches.len()), None),
        |(mut out, last_merge_op): (Vec<Vec<Op>>, Option<(Path, Value)>), pending| {
            match pending.patch.as_slice() {
                [Op::Replace { path, value }] if options.coalesce_replaces => match last_merge_op {
                    Some((last_path, _)) if last_path == *path => {
                        (out, Some((last_path, value.clone())))
                    }
                    last => {
                        flush(&mut out, last);
                        (out, Some((path.clone(), value.clone())))
                    }
                },
                _ => {
                    flush(&mut out, last_merge_op);
                    out.push(pending.patch.clone());
                    (out, None)
                }
            }
        },
    );
    flush(&mut out, last);
    out
}

fn flush(out: &mut Vec<Vec<Op>>, last: Option<(Path, Value)>) {
    if let Some((path, value)) = last {
        out.push(vec![Op::Replace { path, value }]);
    }
}
