//! HTTP adapter for registration, login and logout.

mod dto;
mod handlers;
mod routes;

pub use dto::{LoginRequest, RegisterRequest, SessionResponse, UserResponse};
pub use handlers::{login, logout, register};
pub use routes::auth_routes;
