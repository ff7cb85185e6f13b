//! Trace Bundler Codegen
//!
//! Generates the source text that makes a bundled dependency patch itself at
//! load time.
//!
//! This crate provides:
//! - [`purity`]: static check that a configuration function closes over
//!   nothing beyond a fixed set of safe globals
//! - [`config`]: serialization of an instrumentation configuration to
//!   embeddable source, with pure functions inlined as code
//! - [`wrap`]: the module rewriter that surrounds a dependency's source with
//!   instrumentation construction and patching
//!
//! The purity check is a syntactic approximation used to keep embedded
//! configuration reproducible as standalone source; it is not a sandbox or a
//! security boundary.

pub mod config;
pub mod purity;
pub mod wrap;

pub use config::serialize_config;
pub use purity::{check_function_source, is_pure_function, Purity};
pub use wrap::{wrap_module, WrapParams};
