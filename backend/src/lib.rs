//! Palaver backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds transport-agnostic
//! types, ports, and services; `inbound` adapts HTTP requests onto the
//! domain; `outbound` adapts the domain's driven ports onto PostgreSQL, the
//! mail API, and the credential hasher.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware re-exported for server wiring.
pub use middleware::trace::Trace;
