pub mod app_state;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod utils;

pub use app_state::AppState;
