//! The execution pipeline: local execution, export binding, remote dispatch
//! and result merging. Classification lives in [`crate::spec`].

pub(crate) mod exports;
pub(crate) mod local;
pub(crate) mod merge;
pub(crate) mod remote;
