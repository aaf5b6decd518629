//! HTTP surface of the memorial service: router, session handling, the
//! authorization gate wiring and the persistence helpers behind it.

pub mod error;
pub mod http;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

pub use error::{ApiError, ApiResult};
pub use http::{ServeConfig, build_router, serve};
pub use state::{ApiConfig, AppState};
