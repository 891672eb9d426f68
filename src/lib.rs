// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules at the crate root
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;

// Message assembly
pub mod message;

// Authentication and delivery
pub mod credentials;
pub mod delivery;

// Application adapter
pub mod notifiable;

// Supporting modules
pub mod telemetry;

pub use delivery::{create_dispatcher, BatchPolicy, DeliveryResult, PushDispatcher, Recipients};
pub use error::{PushError, Result};
pub use message::MessageDescriptor;
