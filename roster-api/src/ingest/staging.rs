//! Staging paths for uploaded files.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::constants::FALLBACK_UPLOAD_NAME;

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`. The extension survives, which matters because
/// the workbook reader picks its format from it.
pub fn sanitize_file_name(raw: Option<&str>) -> String {
    let base = raw
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_UPLOAD_NAME);

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<upload_dir>/<uuid>-<sanitized name>`.
pub fn staged_path(upload_dir: &Path, file_name: &str) -> PathBuf {
    upload_dir.join(format!("{}-{}", Uuid::new_v4(), file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("C:\\temp\\staff.xlsx")), "staff.xlsx");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_file_name(Some("staff list (v2).xlsx")), "staff_list__v2_.xlsx");
    }

    #[test]
    fn test_sanitize_falls_back_when_missing() {
        assert_eq!(sanitize_file_name(None), "upload.xlsx");
        assert_eq!(sanitize_file_name(Some("  ")), "upload.xlsx");
        assert_eq!(sanitize_file_name(Some("..")), "upload.xlsx");
    }

    #[test]
    fn test_staged_paths_are_unique() {
        let dir = Path::new("/tmp/uploads");
        let a = staged_path(dir, "staff.xlsx");
        let b = staged_path(dir, "staff.xlsx");
        assert_ne!(a, b);
        assert!(a.starts_with(dir));
        assert!(a.to_string_lossy().ends_with("-staff.xlsx"));
    }
}
