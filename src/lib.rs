//! LWM2M Trigger - stimulus trigger for LWM2M server interop tests
//!
//! This library maps interop test case identifiers to requests on a
//! device-management server's REST API and executes them against the
//! first registered client.

pub mod cli;
pub mod commands;
pub mod common;
pub mod dispatch;
pub mod table;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use dispatch::{Dispatcher, HttpTransport};
pub use table::{RequestDescriptor, TestCaseTable};
