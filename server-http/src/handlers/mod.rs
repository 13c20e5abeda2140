pub mod cache_ops;
pub mod events;
pub mod health;

pub use cache_ops::{get_value, put_value};
pub use events::emit_event;
pub use health::{health_check, not_found};
