//! HTTP gateway exposing a Ghost Admin API compatible surface.
//!
//! Request flow on every Admin API route: tenant resolution from the
//! front-door query parameters, then Ghost token verification, then the
//! operation itself (content negotiation on writes, response shaping on
//! reads, chunk assembly on uploads).

pub mod auth;
pub mod chunks;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tenant;

pub use chunks::{spawn_sweeper, ChunkSessionMap};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
