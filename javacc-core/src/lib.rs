//! Build engine for JavaCC-family grammars.
//!
//! This crate turns a directory of grammar files into generated Java sources
//! by orchestrating the external JavaCC toolchain. The moving parts:
//!
//! - glob: Ant-style include/exclude matching for grammar discovery
//! - grammar: metadata extracted from a grammar file (package, parser name)
//! - scanner: walks a source directory and keeps the stale grammars
//! - tool: facades around the external tools (javacc, jjtree, jtb, jjdoc)
//!   plus the forked-JVM launcher and classpath helpers
//! - reconcile: copies generated files into output roots without
//!   clobbering files the user maintains by hand
//! - pipeline: one processing recipe per goal (plain javacc, the
//!   jjtree/jtb preprocessor chains, jjdoc, and the legacy
//!   preprocessor-only goals)
//! - engine: ties scanning, processing and source-root registration
//!   together
//!
//! The crate is shell agnostic: it logs through `log` and never prints or
//! exits on its own. The CLI layers argument parsing and configuration on
//! top.

pub mod engine;
pub mod glob;
pub mod grammar;
pub mod pipeline;
pub mod reconcile;
pub mod scanner;
pub mod tool;

pub use engine::{BuildEngine, BuildError, Project, SimpleProject};
pub use grammar::GrammarInfo;
pub use scanner::{GrammarScanner, ScanOutcome, TargetPolicy};
