//! Cloudmod Core
//!
//! Declares the continuous-delivery pipeline of a cloudmod stack.
//!
//! This crate contains:
//! - Domain types: configuration, source binding, stages/actions, executors
//! - Resolver: applies defaults and enforces configuration invariants
//! - Topology builder: assembles the ordered stage list
//! - Policy composer: attaches the execution-role grants the stages need
//!
//! Construction is pure. Provisioning, source hosting and build execution are
//! left to external collaborators that consume the declaration.

pub mod construct;
pub mod domain;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod topology;

pub use construct::CodePipeline;
pub use domain::config::{PipelineConfig, ResolvedConfig, SourceType, StackContext};
pub use error::{PipelineError, Result};
pub use topology::{Executors, Topology};
