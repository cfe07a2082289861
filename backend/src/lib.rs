//! Barangay traffic report portal.
//!
//! Hexagonal layout: [`domain`] holds the report lifecycle and its ports,
//! [`inbound`] the REST adapter, [`outbound`] the PostgreSQL adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
