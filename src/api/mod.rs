//! HTTP API for the portal.
//!
//! JSON endpoints nested under `/api/`, plus the static landing-page
//! assets when a static directory is configured. Every request passes
//! through the access-log middleware.

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{api_router, app};
pub use server::{ApiServer, ApiSession};
pub use types::ApiContext;
