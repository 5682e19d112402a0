use std::fs;
use std::io;
use std::path::{Path, PathBuf};

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// True when `path_dst` equals `path_src` or lies somewhere beneath it.
///
/// Merging such a source into the destination would copy a directory into
/// itself.
pub(crate) fn is_destination_within(path_src: &Path, path_dst: &Path) -> bool {
    let src_resolved = _normalize_path(path_src);
    let dst_resolved = _normalize_path(path_dst);
    dst_resolved.starts_with(&src_resolved)
}

/// True when both paths resolve to the same location.
pub(crate) fn is_same_path(path_a: &Path, path_b: &Path) -> bool {
    _normalize_path(path_a) == _normalize_path(path_b)
}

/// Kind of entry already present at a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnumExistingEntry {
    Missing,
    Directory,
    Other,
}

/// Inspect `path` following symlinks, like a plain existence check would.
///
/// A dangling symlink still counts as an existing non-directory entry, so it
/// is never written through.
pub(crate) fn inspect_existing(path: &Path) -> io::Result<EnumExistingEntry> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(EnumExistingEntry::Directory),
        Ok(_) => Ok(EnumExistingEntry::Other),
        Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::symlink_metadata(path) {
            Ok(_) => Ok(EnumExistingEntry::Other),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EnumExistingEntry::Missing),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Metadata

/// Copy file bytes. Permission bits come along with `fs::copy`; times and
/// extended attributes are applied by [`apply_metadata`].
pub(crate) fn copy_file_bytes(path_file_src: &Path, path_file_dst: &Path) -> io::Result<u64> {
    fs::copy(path_file_src, path_file_dst)
}

/// Best-effort copy of permission bits, access/modification times and (on
/// Linux) extended attributes from `path_src` to `path_dst`.
pub(crate) fn apply_metadata(path_src: &Path, path_dst: &Path) -> io::Result<()> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_src)?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_src, path_dst);
    }

    // Last, so a read-only source mode does not block the steps above.
    fs::set_permissions(path_dst, stat_src.permissions())?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_src: &Path, path_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_dst, &name, &raw_value);
    }
}

/// Identity of a directory for loop detection while following symlinks.
#[cfg(unix)]
pub(crate) fn dir_identity(path_dir: &Path) -> io::Result<Option<(u64, u64)>> {
    use std::os::unix::fs::MetadataExt;

    let stat_dir = fs::metadata(path_dir)?;
    Ok(Some((stat_dir.dev(), stat_dir.ino())))
}

#[cfg(not(unix))]
pub(crate) fn dir_identity(_path_dir: &Path) -> io::Result<Option<(u64, u64)>> {
    Ok(None)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
