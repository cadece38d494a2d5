pub mod health;
pub mod search;

pub use health::{health_handler, ready_handler};
pub use search::search_handler;
