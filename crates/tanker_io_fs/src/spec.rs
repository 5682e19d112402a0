//! Flatten-copy specification models and top-level error types.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Why an item was left out of the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSkipReason {
    /// Base name is in the exclusion set and exclusion is enabled.
    Excluded,
    /// Destination already holds a non-directory entry with the same name.
    Conflict,
    /// Source directory equals or contains the destination directory.
    Overlap,
}

impl fmt::Display for EnumSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded => write!(f, "excluded"),
            Self::Conflict => write!(f, "conflict"),
            Self::Overlap => write!(f, "overlap"),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `flatten_copy`.
#[derive(Debug, Clone, Default)]
pub struct SpecFlattenOptions {
    /// Directory whose immediate subfolders are flattened.
    pub dir_source: PathBuf,
    /// Flat destination directory.
    pub dir_destination: PathBuf,
    /// Base names to skip when `if_omit_files` is set.
    pub names_exclude: BTreeSet<String>,
    /// Gate for `names_exclude`; when false the set is ignored.
    pub if_omit_files: bool,
    /// Do not mutate filesystem; record what would happen.
    pub if_dry_run: bool,
}

impl SpecFlattenOptions {
    /// Options for `dir_source` -> `dir_destination` with exclusion disabled.
    pub fn new<P, Q>(dir_source: P, dir_destination: Q) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        Self {
            dir_source: dir_source.into(),
            dir_destination: dir_destination.into(),
            ..Self::default()
        }
    }

    /// Replace the exclusion set and turn exclusion on.
    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names_exclude = names.into_iter().map(Into::into).collect();
        self.if_omit_files = true;
        self
    }

    /// Whether `name` must be skipped under the current exclusion settings.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.if_omit_files && self.names_exclude.contains(name)
    }
}

/// One skipped item, emitted as it is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSkipNotice {
    /// Source item that was not copied.
    pub path_item: PathBuf,
    /// Destination path the item would have been written to.
    pub path_destination: PathBuf,
    /// Why it was skipped.
    pub reason: EnumSkipReason,
}

impl fmt::Display for SpecSkipNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            EnumSkipReason::Excluded => {
                write!(f, "Skipping excluded file: {}", self.path_item.display())
            }
            EnumSkipReason::Conflict => write!(
                f,
                "File already exists, skipping: {}",
                self.path_destination.display()
            ),
            EnumSkipReason::Overlap => write!(
                f,
                "Source overlaps destination, skipping: {}",
                self.path_item.display()
            ),
        }
    }
}

/// Failure of one `flatten_copy` call.
///
/// Skips are not errors; see [`SpecSkipNotice`].
#[derive(Debug, Error)]
pub enum FlattenCopyError {
    /// Required input missing or empty. Raised before any filesystem access.
    #[error("{0}")]
    Validation(String),
    /// Listing, reading or writing failed; remaining work was abandoned.
    ///
    /// Also returned by [`crate::FlattenCopyHandle::wait`] when the worker
    /// thread ends without a result; `path` is then the source directory.
    #[error("{}: {source}", .path.display())]
    Filesystem {
        /// Path whose operation failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl FlattenCopyError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for input validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Parsing

/// Split a comma-separated exclusion list into trimmed, non-empty names.
pub fn parse_exclusion_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exclusion_list_trims_and_drops_empty() {
        let names = parse_exclusion_list(" a.txt ,b.txt,, ,c d.txt ");
        let expected: BTreeSet<String> = ["a.txt", "b.txt", "c d.txt"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, expected);
        assert!(parse_exclusion_list("").is_empty());
    }

    #[test]
    fn is_excluded_is_gated_by_flag_and_exact() {
        let mut options = SpecFlattenOptions::new("src", "dst").with_excluded(["y.txt"]);
        assert!(options.is_excluded("y.txt"));
        assert!(!options.is_excluded("Y.txt"));
        assert!(!options.is_excluded("xy.txt"));

        options.if_omit_files = false;
        assert!(!options.is_excluded("y.txt"));
    }

    #[test]
    fn skip_notice_display_names_the_reason() {
        let notice = SpecSkipNotice {
            path_item: PathBuf::from("src/A/y.txt"),
            path_destination: PathBuf::from("dst/y.txt"),
            reason: EnumSkipReason::Conflict,
        };
        assert_eq!(notice.to_string(), "File already exists, skipping: dst/y.txt");
    }
}
