pub mod models;
pub use models::*;

mod broadcaster;
pub use broadcaster::*;

mod handler;
pub use handler::ws_handler;
