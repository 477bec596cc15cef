use crate::runtime::value::{Kind, Payload, Value};

/// Canonical display name for a kind. Downstream tooling parses these
/// strings, so the table is fixed.
pub fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Null => "NULL",
        Kind::Symbol => "symbol",
        Kind::Pairlist => "pairlist",
        Kind::Closure => "function",
        Kind::Environment => "environment",
        Kind::Promise => "promise",
        Kind::Call => "call",
        Kind::Special => "special",
        Kind::Builtin => "builtin",
        Kind::Char => "string",
        Kind::Logical => "logical",
        Kind::Int => "integer",
        Kind::Double => "double",
        Kind::Complex => "complex",
        Kind::Str => "character",
        Kind::Dots => "...",
        Kind::Any => "any",
        Kind::List => "list",
        Kind::Expr => "expression",
        Kind::Bytecode => "bytecode",
        Kind::ExternalPtr => "external pointer",
        Kind::WeakRef => "weak ref",
        Kind::Raw => "raw",
        Kind::S4 => "S4",
    }
}

/// Render a value's kind plus its class annotation, when a class attribute
/// is present:
///
/// - formal-class instances: `" (S4: pkg::Class)"`, dropping the `S4: `
///   marker when the kind already reads `S4`, and the `pkg::` qualifier
///   when the class carries no package attribute;
/// - classic class tagging: `" (S3: a, b)"` with every class name joined
///   by `", "`.
pub fn display_type(value: &Value) -> String {
    let mut rendered = String::from(kind_name(value.kind()));

    let Some(class) = value.attr("class") else {
        return rendered;
    };

    rendered.push_str(" (");
    if value.is_formal_instance() {
        if value.kind() != Kind::S4 {
            rendered.push_str("S4: ");
        }
        if let Some(package) = class.attr("package") {
            if let Some(qualifier) = package.first_string() {
                rendered.push_str(qualifier);
                rendered.push_str("::");
            }
        }
        if let Some(class_name) = class.first_string() {
            rendered.push_str(class_name);
        }
    } else {
        rendered.push_str("S3: ");
        match class.payload() {
            Payload::Str(classes) => {
                for (index, class_name) in classes.iter().enumerate() {
                    if index > 0 {
                        rendered.push_str(", ");
                    }
                    rendered.push_str(class_name);
                }
            }
            // A bare character unit counts as a one-element class vector.
            Payload::Char(class_name) => rendered.push_str(class_name),
            _ => {}
        }
    }
    rendered.push(')');

    rendered
}
