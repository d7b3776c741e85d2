//! Command implementations for the strata CLI
//!
//! Both commands build a configuration tree from the same source flags and
//! differ only in how they print the result.

pub mod get;
pub mod show;
pub mod sources;
