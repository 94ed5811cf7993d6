pub mod error;
pub mod types;
pub mod value;

pub use error::{EngineError, Result};
pub use types::{Entity, EntityId, Fields, PendingUpdate, LOCKED_FLAG_KEY, PENDING_FLAG_KEY};
pub use value::Value;
