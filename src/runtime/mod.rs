pub mod environment;
pub mod error;
pub mod value;

pub use environment::Environment;
pub use error::{RuntimeError, RuntimeResult};
pub use value::{Kind, Payload, Value};
