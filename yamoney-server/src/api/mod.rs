//! HTTP API handlers.
//!
//! - [`notice`]: the provider's `check/` and `aviso/` callbacks, answered in XML.

pub mod notice;
