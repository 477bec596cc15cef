pub mod children;
pub mod type_name;

pub use children::{decompose, Child, Decomposition};
pub use type_name::{display_type, kind_name};

use crate::runtime::environment::Environment;
use crate::runtime::error::RuntimeResult;

/// Resolve `name` in `env` and decompose the bound value into its direct
/// children. Lookup failures propagate unchanged.
pub fn children_of(name: &str, env: &Environment) -> RuntimeResult<Decomposition> {
    Ok(decompose(&env.lookup(name)?))
}

/// Resolve `name` in `env` and render the bound value's kind and class
/// annotation. Lookup failures propagate unchanged.
pub fn type_of(name: &str, env: &Environment) -> RuntimeResult<String> {
    Ok(display_type(&env.lookup(name)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::RuntimeError;
    use crate::runtime::value::Value;

    #[test]
    fn children_of_resolves_through_the_environment() {
        let env = Environment::new(None);
        let list = Value::list(vec![Value::integer(vec![1]), Value::integer(vec![2])]);
        env.define("xs", list);

        let result = children_of("xs", &env).expect("xs is bound");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn type_of_resolves_through_the_enclosing_chain() {
        let root = Environment::new(None);
        root.define("x", Value::double(vec![1.0]));
        let child = Environment::new(Some(root));

        assert_eq!(type_of("x", &child).expect("x is bound"), "double");
    }

    #[test]
    fn lookup_failure_propagates_unchanged() {
        let env = Environment::new(None);
        let err = children_of("missing", &env).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownSymbol { ref name } if name == "missing"));

        let err = type_of("missing", &env).unwrap_err();
        assert_eq!(err.to_string(), "object `missing` not found");
    }

    #[test]
    fn tombstoned_name_is_a_lookup_failure() {
        let env = Environment::new(None);
        env.define("a", Value::integer(vec![1]));
        env.remove("a");

        assert!(children_of("a", &env).is_err());
    }
}
