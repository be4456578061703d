pub use embedlink_core::core::events;
pub use embedlink_core::models::{media, settings};
pub use embedlink_core::providers;
