pub mod handlers;
pub mod server;

pub use handlers::{ApiMessage, AppState};
pub use server::ApiServer;
