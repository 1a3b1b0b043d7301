//! Utilities shared by the analyzer tests.
//!
//! - [`ClassFileBuilder`] writes real class files.
//! - [`minimal_jdk`] is a classpath with the handful of JDK classes the
//!   analyzer relies on.
//! - [`init_tracing`] and [`capture_logs`] route `tracing` output into tests.
//! - [`javac`] compiles Java fixtures with a local `javac` (ignored tests
//!   only).
//!
//! ## Running `javac` tests locally
//!
//! ```bash
//! cargo test -p nova-sema --test bytecode -- --ignored
//! ```

pub mod classfile;
pub mod jdk;
mod logging;

#[cfg(feature = "javac")]
pub mod javac;

pub use classfile::{access, AnnotationSpec, ClassFileBuilder, ConstantSpec, ElementSpec, MemberSpec};
pub use jdk::{classpath_of, minimal_jdk, minimal_jdk_classes, minimal_jdk_with};
pub use logging::{capture_logs, init_tracing, SharedLogBuffer};
