//! Trace Bundler Types
//!
//! Shared data model for the trace-bundler workspace.
//!
//! This crate provides:
//! - [`module`]: extracted-module identity, instrumentation module definitions,
//!   and the per-import plugin data handed between bundler hooks
//! - [`config`]: the instrumentation configuration value tree (plain data plus
//!   embeddable function source)
//! - [`instrumentation`]: the capability interface an instrumentation exposes
//!   to the bundler core

pub mod config;
pub mod instrumentation;
pub mod module;

pub use config::{ConfigValue, InstrumentationConfig, InstrumentationConfigMap};
pub use instrumentation::Instrumentation;
pub use module::{ExtractedModule, ModuleDefinition, ModuleFile, PluginData};
