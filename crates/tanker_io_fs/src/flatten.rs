//! Flatten-copy traversal and orchestration.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::report::{ReportFlatten, ReportFlattenBuilder};
use crate::spec::{EnumSkipReason, FlattenCopyError, SpecFlattenOptions, SpecSkipNotice};
use crate::util::{
    EnumExistingEntry, apply_metadata, copy_file_bytes, dir_identity, inspect_existing,
    is_destination_within, is_same_path,
};

/// Receiver of skip notices, called as each notice is emitted.
pub trait SkipNoticeSink {
    /// Handle one skipped item.
    fn on_skip(&mut self, notice: &SpecSkipNotice);
}

impl<F> SkipNoticeSink for F
where
    F: FnMut(&SpecSkipNotice),
{
    fn on_skip(&mut self, notice: &SpecSkipNotice) {
        self(notice)
    }
}

struct SpecFlattenContext<'a, S: ?Sized> {
    path_dir_dst: PathBuf,
    spec_options: &'a SpecFlattenOptions,
    builder_report: ReportFlattenBuilder,
    sink: &'a mut S,
    set_active_dirs: HashSet<(u64, u64)>,
}

/// Flatten the immediate subfolders of `options.dir_source` into
/// `options.dir_destination`.
///
/// Skip notices are logged and collected in the returned report only. Use
/// [`flatten_copy_with_sink`] to observe them while the copy runs.
pub fn flatten_copy(options: &SpecFlattenOptions) -> Result<ReportFlatten, FlattenCopyError> {
    flatten_copy_with_sink(options, &mut |_: &SpecSkipNotice| {})
}

/// Flatten-copy with a caller-supplied skip notice sink.
///
/// For every immediate subfolder of the source, each direct child is copied
/// to `destination / child_name`:
/// - excluded names (when exclusion is enabled) are skipped,
/// - an existing non-directory destination entry is kept and the child skipped,
/// - directories are merge-copied into the destination (existing content kept,
///   same-named files overwritten),
/// - files are copied with permissions and times preserved where possible; a
///   file whose name is taken by an existing directory is copied into it,
/// - a directory child that equals or contains the destination, or a
///   subfolder that is the destination itself, is skipped as an overlap.
///
/// Enumeration follows the filesystem listing order. When two subfolders
/// hold the same file name, whichever is listed first is copied and the
/// other is reported as a conflict.
///
/// Returns [`FlattenCopyError::Validation`] before touching the filesystem if
/// either path is empty. The first filesystem failure aborts the run with
/// [`FlattenCopyError::Filesystem`]; anything already copied stays in place.
pub fn flatten_copy_with_sink<S>(
    options: &SpecFlattenOptions,
    sink: &mut S,
) -> Result<ReportFlatten, FlattenCopyError>
where
    S: SkipNoticeSink + ?Sized,
{
    validate_options(options)?;

    let path_dir_src = options.dir_source.clone();
    let path_dir_dst = options.dir_destination.clone();
    info!(
        source = %path_dir_src.display(),
        destination = %path_dir_dst.display(),
        omit_files = options.if_omit_files,
        dry_run = options.if_dry_run,
        "Starting flatten copy"
    );

    let l_subfolders = list_subfolders(&path_dir_src)?;

    if !options.if_dry_run {
        fs::create_dir_all(&path_dir_dst)
            .map_err(|e| FlattenCopyError::filesystem(&path_dir_dst, e))?;
    }

    let mut spec_ctx = SpecFlattenContext {
        path_dir_dst,
        spec_options: options,
        builder_report: ReportFlattenBuilder::new(options.if_dry_run),
        sink,
        set_active_dirs: HashSet::new(),
    };

    for path_subfolder in l_subfolders {
        flatten_subfolder(&path_subfolder, &mut spec_ctx)?;
    }

    let report = spec_ctx.builder_report.build();
    info!("Flatten copy finished: {report}");
    Ok(report)
}

fn validate_options(options: &SpecFlattenOptions) -> Result<(), FlattenCopyError> {
    let b_missing_src = options.dir_source.as_os_str().is_empty();
    let b_missing_dst = options.dir_destination.as_os_str().is_empty();
    match (b_missing_src, b_missing_dst) {
        (false, false) => Ok(()),
        (true, true) => Err(FlattenCopyError::Validation(
            "Both source and destination directories must be selected.".to_string(),
        )),
        (true, false) => Err(FlattenCopyError::Validation(
            "Source directory must be selected.".to_string(),
        )),
        (false, true) => Err(FlattenCopyError::Validation(
            "Destination directory must be selected.".to_string(),
        )),
    }
}

fn list_subfolders(path_dir_src: &Path) -> Result<Vec<PathBuf>, FlattenCopyError> {
    let iter_entries =
        fs::read_dir(path_dir_src).map_err(|e| FlattenCopyError::filesystem(path_dir_src, e))?;

    let mut l_subfolders = Vec::new();
    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| FlattenCopyError::filesystem(path_dir_src, e))?;
        let path_entry = entry.path();
        if path_entry.is_dir() {
            l_subfolders.push(path_entry);
        }
    }
    Ok(l_subfolders)
}

fn flatten_subfolder<S>(
    path_subfolder: &Path,
    spec_ctx: &mut SpecFlattenContext<'_, S>,
) -> Result<(), FlattenCopyError>
where
    S: SkipNoticeSink + ?Sized,
{
    spec_ctx.builder_report.add_subfolder();

    // A subfolder that contains the destination still has its files copied;
    // the directory child holding the destination is caught in `handle_item`.
    if is_same_path(path_subfolder, &spec_ctx.path_dir_dst) {
        let path_destination = spec_ctx.path_dir_dst.clone();
        emit_skip(
            spec_ctx,
            path_subfolder.to_path_buf(),
            path_destination,
            EnumSkipReason::Overlap,
        );
        return Ok(());
    }

    let iter_items = fs::read_dir(path_subfolder)
        .map_err(|e| FlattenCopyError::filesystem(path_subfolder, e))?;
    for item_res in iter_items {
        let item = item_res.map_err(|e| FlattenCopyError::filesystem(path_subfolder, e))?;
        handle_item(item.path(), &item.file_name(), spec_ctx)?;
    }
    Ok(())
}

fn handle_item<S>(
    path_item: PathBuf,
    name_item: &OsStr,
    spec_ctx: &mut SpecFlattenContext<'_, S>,
) -> Result<(), FlattenCopyError>
where
    S: SkipNoticeSink + ?Sized,
{
    spec_ctx.builder_report.add_scanned();

    let path_item_dst = spec_ctx.path_dir_dst.join(name_item);
    let b_excluded = name_item
        .to_str()
        .is_some_and(|name| spec_ctx.spec_options.is_excluded(name));
    if b_excluded {
        emit_skip(spec_ctx, path_item, path_item_dst, EnumSkipReason::Excluded);
        return Ok(());
    }

    let enum_existing = inspect_existing(&path_item_dst)
        .map_err(|e| FlattenCopyError::filesystem(&path_item_dst, e))?;
    if enum_existing == EnumExistingEntry::Other {
        emit_skip(spec_ctx, path_item, path_item_dst, EnumSkipReason::Conflict);
        return Ok(());
    }

    if path_item.is_dir() {
        if is_destination_within(&path_item, &spec_ctx.path_dir_dst) {
            emit_skip(spec_ctx, path_item, path_item_dst, EnumSkipReason::Overlap);
            return Ok(());
        }
        merge_directory(&path_item, &path_item_dst, spec_ctx)?;
        spec_ctx.builder_report.add_merged();
        return Ok(());
    }

    // A file landing on an existing directory goes inside it.
    let path_file_dst = match enum_existing {
        EnumExistingEntry::Directory => path_item_dst.join(name_item),
        _ => path_item_dst,
    };
    copy_file(&path_item, &path_file_dst, spec_ctx)
}

/// Overwrite-merge `path_dir_src` into `path_dir_dst`, recursively.
fn merge_directory<S>(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_ctx: &mut SpecFlattenContext<'_, S>,
) -> Result<(), FlattenCopyError>
where
    S: SkipNoticeSink + ?Sized,
{
    let identity =
        dir_identity(path_dir_src).map_err(|e| FlattenCopyError::filesystem(path_dir_src, e))?;
    if let Some(tuple_dir_id) = identity
        && !spec_ctx.set_active_dirs.insert(tuple_dir_id)
    {
        return Err(FlattenCopyError::filesystem(
            path_dir_src,
            io::Error::other("symlink loop detected"),
        ));
    }

    let if_dry_run = spec_ctx.spec_options.if_dry_run;
    if !if_dry_run {
        fs::create_dir_all(path_dir_dst)
            .map_err(|e| FlattenCopyError::filesystem(path_dir_dst, e))?;
    }

    let iter_entries =
        fs::read_dir(path_dir_src).map_err(|e| FlattenCopyError::filesystem(path_dir_src, e))?;
    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| FlattenCopyError::filesystem(path_dir_src, e))?;
        let path_child_src = entry.path();
        let path_child_dst = path_dir_dst.join(entry.file_name());
        if path_child_src.is_dir() {
            merge_directory(&path_child_src, &path_child_dst, spec_ctx)?;
        } else {
            copy_file(&path_child_src, &path_child_dst, spec_ctx)?;
        }
    }

    if !if_dry_run {
        preserve_metadata(path_dir_src, path_dir_dst, spec_ctx);
    }

    if let Some(tuple_dir_id) = identity {
        spec_ctx.set_active_dirs.remove(&tuple_dir_id);
    }
    Ok(())
}

fn copy_file<S>(
    path_file_src: &Path,
    path_file_dst: &Path,
    spec_ctx: &mut SpecFlattenContext<'_, S>,
) -> Result<(), FlattenCopyError>
where
    S: SkipNoticeSink + ?Sized,
{
    if spec_ctx.spec_options.if_dry_run {
        debug!(
            "Would copy {} -> {}",
            path_file_src.display(),
            path_file_dst.display()
        );
        spec_ctx.builder_report.add_copied();
        return Ok(());
    }

    copy_file_bytes(path_file_src, path_file_dst)
        .map_err(|e| FlattenCopyError::filesystem(path_file_dst, e))?;
    preserve_metadata(path_file_src, path_file_dst, spec_ctx);
    debug!(
        "Copied {} -> {}",
        path_file_src.display(),
        path_file_dst.display()
    );
    spec_ctx.builder_report.add_copied();
    Ok(())
}

fn preserve_metadata<S>(path_src: &Path, path_dst: &Path, spec_ctx: &mut SpecFlattenContext<'_, S>)
where
    S: SkipNoticeSink + ?Sized,
{
    if let Err(e) = apply_metadata(path_src, path_dst) {
        let message = format!(
            "Failed to preserve metadata for {} ({e})",
            path_dst.display()
        );
        warn!("{message}");
        spec_ctx.builder_report.add_warning(message);
    }
}

fn emit_skip<S>(
    spec_ctx: &mut SpecFlattenContext<'_, S>,
    path_item: PathBuf,
    path_destination: PathBuf,
    reason: EnumSkipReason,
) where
    S: SkipNoticeSink + ?Sized,
{
    let notice = SpecSkipNotice {
        path_item,
        path_destination,
        reason,
    };
    info!("{notice}");
    spec_ctx.sink.on_skip(&notice);
    spec_ctx.builder_report.add_notice(notice);
}
