pub mod diagnostics;
pub mod inspect;
pub mod runtime;

pub use inspect::{children_of, decompose, display_type, type_of, Child, Decomposition};
pub use runtime::{Environment, Kind, Payload, RuntimeError, RuntimeResult, Value};
