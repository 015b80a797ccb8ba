//! Cucumber step definitions for interface tests.

pub mod dispatch;
pub mod registry;
