//! Coverage resolution: is a client served by a company, and by which rule.
//!
//! Polygon containment wins over the radius fallback; the radius only
//! decides when no assigned polygon contains the client.

mod resolver;

pub use resolver::{resolve, resolve_all, AreasByCompany};
