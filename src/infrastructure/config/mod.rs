mod settings;

pub use settings::{DeliveryConfig, FirebaseConfig, OtelConfig, Settings, TokenCacheConfig};
