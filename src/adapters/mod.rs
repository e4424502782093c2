//! Adapter layer modules for external system integration.
//!
//! Provides the REST transport to the identity service and the
//! [`rest::Connector`] trait the protocol engine is written against.

pub mod rest;
