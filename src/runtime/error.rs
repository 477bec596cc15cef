use miette::Diagnostic;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error, Diagnostic, Clone)]
pub enum RuntimeError {
    #[error("object `{name}` not found")]
    #[diagnostic(
        code(prybar::unknown_symbol),
        help("the name must be bound in the environment or one of its enclosing scopes")
    )]
    UnknownSymbol { name: String },
}
