//! Request dispatch against the device-management server
//!
//! Resolves the connected client through `GET /clients` and sends the
//! test case's resource operation to it.

pub mod client;
pub mod transport;
pub mod url;

pub use client::{Discovery, DeviceRecord, Dispatcher, Exchange, Observer};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
