//! HTTP adapter: axum routers, the session gate and error mapping.
//!
//! Each component has its own `dto`/`handlers`/`routes` triple; `router`
//! assembles them under `/api`.

pub mod billing;
pub mod directory;
pub mod error;
pub mod messaging;
pub mod middleware;
pub mod router;
pub mod state;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApiError, ErrorResponse};
pub use router::{app_router, with_http_layers};
pub use state::{AppState, SessionSettings};
