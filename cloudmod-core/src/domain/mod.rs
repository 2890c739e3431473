//! Core domain types
//!
//! The structures a pipeline declaration is made of: the configuration it is
//! built from, the source it fetches, the stages it runs and the executors
//! those stages invoke.

pub mod config;
pub mod pipeline;
pub mod project;
pub mod source;
