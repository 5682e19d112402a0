//! Flatten-copy report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::{EnumSkipReason, SpecSkipNotice};

/// Aggregate counters and diagnostics for one `flatten_copy` run.
#[derive(Debug, Default, Clone)]
pub struct ReportFlatten {
    /// Immediate subfolders of the source that were visited.
    pub cnt_subfolders: u64,
    /// Subfolder children examined (second level only).
    pub cnt_scanned: u64,
    /// Files written, including those inside merged directories.
    pub cnt_copied: u64,
    /// Top-level directories merged into the destination.
    pub cnt_merged: u64,
    /// Items skipped by exclusion, conflict or overlap.
    pub cnt_skipped: u64,
    /// Skip notices in the order they were emitted.
    pub notices: Vec<SpecSkipNotice>,
    /// Non-fatal warnings, such as metadata that could not be preserved.
    pub warnings: Vec<String>,
    /// Whether the run was a dry run.
    pub if_dry_run: bool,
}

impl ReportFlatten {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Skip notices with the given reason.
    pub fn notices_by_reason(&self, reason: EnumSkipReason) -> impl Iterator<Item = &SpecSkipNotice> {
        self.notices.iter().filter(move |n| n.reason == reason)
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_subfolders".to_string(), self.cnt_subfolders);
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_merged".to_string(), self.cnt_merged);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        let suffix = if self.if_dry_run { " (dry run)" } else { "" };
        format!(
            "{prefix} subfolders={} scanned={} copied={} merged={} skipped={} warnings={}{suffix}",
            dict_counts["cnt_subfolders"],
            dict_counts["cnt_scanned"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_merged"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportFlatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FLATTEN]"))
    }
}

/// Mutable accumulator for flatten statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportFlattenBuilder {
    /// See [`ReportFlatten::cnt_subfolders`].
    pub cnt_subfolders: u64,
    /// See [`ReportFlatten::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportFlatten::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportFlatten::cnt_merged`].
    pub cnt_merged: u64,
    /// See [`ReportFlatten::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportFlatten::notices`].
    pub notices: Vec<SpecSkipNotice>,
    /// See [`ReportFlatten::warnings`].
    pub warnings: Vec<String>,
    /// See [`ReportFlatten::if_dry_run`].
    pub if_dry_run: bool,
}

impl ReportFlattenBuilder {
    /// Builder for a run with the given dry-run setting.
    pub fn new(if_dry_run: bool) -> Self {
        Self {
            if_dry_run,
            ..Self::default()
        }
    }

    /// Increment visited subfolder count by one.
    pub fn add_subfolder(&mut self) {
        self.cnt_subfolders += 1;
    }

    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment copied count by one.
    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    /// Increment merged count by one.
    pub fn add_merged(&mut self) {
        self.cnt_merged += 1;
    }

    /// Record one skip notice; also bumps the skipped count.
    pub fn add_notice(&mut self, notice: SpecSkipNotice) {
        self.cnt_skipped += 1;
        self.notices.push(notice);
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportFlatten {
        ReportFlatten {
            cnt_subfolders: self.cnt_subfolders,
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.cnt_copied,
            cnt_merged: self.cnt_merged,
            cnt_skipped: self.cnt_skipped,
            notices: self.notices,
            warnings: self.warnings,
            if_dry_run: self.if_dry_run,
        }
    }
}
