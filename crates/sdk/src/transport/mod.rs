//! Transport layer for the kintone SDK.

pub mod http;

pub use http::{HttpTransport, METHOD_OVERRIDE_HEADER};
