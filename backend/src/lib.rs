//! Clinic scheduling backend.
//!
//! The crate is laid out hexagonally: [`domain`] holds records, services and
//! ports; [`inbound`] adapts HTTP requests onto the driving ports; and
//! [`outbound`] implements the driven ports over PostgreSQL or memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
