//! Common test utilities for media-acquire integration tests

#[allow(dead_code)]
pub mod assertions;
#[cfg(unix)]
#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[cfg(unix)]
#[allow(unused_imports)]
pub use fixtures::*;
