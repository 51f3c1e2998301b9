//! Inbound adapters translating HTTP requests into domain service calls.
//!
//! Framework details stay here; handlers only see the driving ports.

pub mod http;
