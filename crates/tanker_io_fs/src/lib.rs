//! `tanker_io_fs` v1:
//! Flatten the immediate subfolders of a directory into one destination.
//!
//! Modules:
//! - `flatten` : traversal and copy orchestration
//! - `job`     : run a flatten-copy on a background thread
//! - `spec`    : options/notices/errors
//! - `report`  : run-time report model
//! - `util`    : shared helper functions

pub mod flatten;
pub mod job;
pub mod report;
pub mod spec;
mod util;

pub use flatten::{SkipNoticeSink, flatten_copy, flatten_copy_with_sink};
pub use job::{FlattenCopyHandle, FlattenEvent, start_flatten_copy};
pub use report::{ReportFlatten, ReportFlattenBuilder};
pub use spec::{
    EnumSkipReason, FlattenCopyError, SpecFlattenOptions, SpecSkipNotice, parse_exclusion_list,
};
