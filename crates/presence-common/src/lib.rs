pub mod errors;
pub mod id;

pub use errors::{ConfigError, PresenceError, RpcError};
pub use id::new_nonce;

pub type Result<T> = std::result::Result<T, PresenceError>;
