//! Size limits for untrusted paths.

use crate::PathError;

/// Maximum allowed serialized patch path length.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_DEPTH: usize = 256;

/// Validate a serialized patch path.
///
/// ```
/// use content_path::validate_patch_pointer;
///
/// validate_patch_pointer("").unwrap();
/// validate_patch_pointer("/blogs/0").unwrap();
/// validate_patch_pointer("blogs").unwrap_err();
/// ```
pub fn validate_patch_pointer(pointer: &str) -> Result<(), PathError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(PathError::patch(pointer, "must start with '/'"));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PathError::PointerTooLong { len: pointer.len(), max: MAX_POINTER_LENGTH });
    }
    Ok(())
}

/// Validate the depth of a decoded path.
pub fn validate_path<T>(path: &[T], max_depth: usize) -> Result<(), PathError> {
    if path.len() > max_depth {
        return Err(PathError::PathTooDeep { depth: path.len(), max: max_depth });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_pointer_rejected() {
        let pointer = "/".to_string() + &"a".repeat(2000);
        assert!(matches!(validate_patch_pointer(&pointer), Err(PathError::PointerTooLong { .. })));
    }

    #[test]
    fn depth_limit() {
        let path: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        assert!(validate_path(&path, MAX_PATH_DEPTH).is_err());
        assert!(validate_path(&path[..MAX_PATH_DEPTH], MAX_PATH_DEPTH).is_ok());
    }
}
