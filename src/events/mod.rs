pub mod bus;
pub mod types;

// Re-export key types for convenience
pub use bus::{BusEvent, EventBus, PublishError};
pub use types::{error_message_of, payload_of, progress_of, request_id_of, with_request_id};
