use crate::inspect::type_name::kind_name;
use crate::runtime::value::{Payload, Value};

/// One direct structural component of a value. Structural names synthesized
/// by the decomposition carry a `__` prefix so they never collide with user
/// binding names; a `None` name is distinct from an empty-string name.
#[derive(Clone, Debug)]
pub struct Child {
    pub name: Option<String>,
    pub value: Value,
}

/// Snapshot of a value's direct children, in a fixed per-kind order. The
/// dedicated type marks it as a children result for downstream consumers.
#[derive(Debug)]
pub struct Decomposition {
    children: Vec<Child>,
}

impl Decomposition {
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<'a> IntoIterator for &'a Decomposition {
    type Item = &'a Child;
    type IntoIter = std::slice::Iter<'a, Child>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// Append-only accumulator behind `decompose`. Duplicate names are legal
/// and preserved in call order.
pub(crate) struct ChildCollector {
    records: Vec<Child>,
}

impl ChildCollector {
    pub(crate) fn new() -> Self {
        ChildCollector {
            records: Vec::new(),
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.records.reserve(additional);
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.records.push(Child { name: None, value });
    }

    pub(crate) fn push_named(&mut self, name: impl Into<String>, value: Value) {
        self.records.push(Child {
            name: Some(name.into()),
            value,
        });
    }

    pub(crate) fn push_tagged(&mut self, tag: Option<&str>, value: Value) {
        self.records.push(Child {
            name: tag.map(str::to_string),
            value,
        });
    }

    pub(crate) fn into_decomposition(self) -> Decomposition {
        Decomposition {
            children: self.records,
        }
    }
}

/// Decompose a value into its direct children, one level deep.
///
/// The per-kind rules mirror the host runtime's storage layout; after them
/// a single trailing metadata record is appended: `__slots` for a
/// formal-class instance, else `__attributes` when the attribute table is
/// non-empty. Kinds with no structural decomposition rule yield zero
/// children and a warning, never a failure.
pub fn decompose(value: &Value) -> Decomposition {
    let mut out = ChildCollector::new();

    match value.payload() {
        // No children beyond metadata. For S4 objects the slots are the
        // attributes, picked up by the trailing metadata record.
        Payload::Null
        | Payload::Bytecode
        | Payload::Builtin(_)
        | Payload::Special(_)
        | Payload::Symbol(_)
        | Payload::Unbound
        | Payload::Char(_)
        | Payload::WeakRef
        | Payload::Logical(_)
        | Payload::Int(_)
        | Payload::Double(_)
        | Payload::Complex(_)
        | Payload::Raw(_)
        | Payload::Str(_)
        | Payload::S4 => {}

        Payload::Closure(closure) => {
            out.push_named("__body", closure.body.clone());
            out.push_named("__formals", closure.formals.clone());
            out.push_named("__enclosure", Value::environment(closure.enclosure.clone()));
        }

        Payload::Pairlist(slots) => {
            out.reserve(slots.len());
            for (tag, slot_value) in slots {
                out.push_tagged(tag.as_deref(), slot_value.clone());
            }
        }

        // Call elements may carry tags, but they are not surfaced here.
        Payload::Call(elements) => {
            out.reserve(elements.len());
            for (_, element) in elements {
                out.push(element.clone());
            }
        }

        Payload::List(elements) | Payload::Expr(elements) => {
            out.reserve(elements.len());
            let names = value.attr("names");
            match names.as_ref().map(Value::payload) {
                Some(Payload::Str(names)) => {
                    for (index, element) in elements.iter().enumerate() {
                        let name = names.get(index).cloned().unwrap_or_default();
                        out.push_named(name, element.clone());
                    }
                }
                _ => {
                    for element in elements {
                        out.push(element.clone());
                    }
                }
            }
        }

        Payload::Promise(promise) => {
            out.push_named("__value", promise.value.borrow().clone());
            out.push_named("__code", promise.code.clone());
            out.push_named("__env", Value::environment(promise.environment.clone()));
        }

        Payload::ExternalPtr(pointer) => {
            out.push_named("__prot", pointer.protected.clone());
            out.push_named("__tag", pointer.tag.clone());
        }

        Payload::Environment(env) => {
            for (name, bound) in env.live_bindings() {
                out.push_named(name, bound);
            }
            if let Some(enclosing) = env.enclosing() {
                out.push_named("__enclosure", Value::environment(enclosing));
            }
        }

        Payload::Dots | Payload::Any => {
            log::warn!("unimplemented type {}", kind_name(value.kind()));
        }
    }

    if value.is_formal_instance() {
        out.push_named("__slots", value.attributes_value());
    } else if value.has_attributes() {
        out.push_named("__attributes", value.attributes_value());
    }

    out.into_decomposition()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::environment::Environment;

    fn names_of(result: &Decomposition) -> Vec<Option<&str>> {
        result
            .children()
            .iter()
            .map(|child| child.name.as_deref())
            .collect()
    }

    #[test]
    fn leaf_kinds_without_attributes_have_no_children() {
        for value in [
            Value::null(),
            Value::symbol("x"),
            Value::builtin("sum"),
            Value::special("if"),
            Value::char_unit("a"),
            Value::logical(vec![true, false]),
            Value::integer(vec![1, 2]),
            Value::double(vec![1.5]),
            Value::character(vec!["hi".into()]),
            Value::raw(vec![0xff]),
            Value::bytecode(),
            Value::weak_ref(),
        ] {
            assert!(decompose(&value).is_empty());
        }
    }

    #[test]
    fn closure_yields_body_formals_enclosure_in_order() {
        let env = Environment::new(None);
        let formals = Value::pairlist(vec![(Some("x".into()), Value::unbound())]);
        let closure = Value::closure(Value::symbol("x"), formals, env);

        let result = decompose(&closure);
        assert_eq!(
            names_of(&result),
            vec![Some("__body"), Some("__formals"), Some("__enclosure")]
        );
    }

    #[test]
    fn closure_attributes_append_a_fourth_record() {
        let env = Environment::new(None);
        let closure = Value::closure(Value::null(), Value::null(), env);
        closure.set_attr("class", Value::string("my_fn"));

        let result = decompose(&closure);
        assert_eq!(result.len(), 4);
        assert_eq!(
            result.children()[3].name.as_deref(),
            Some("__attributes")
        );
    }

    #[test]
    fn pairlist_keeps_tags_order_and_duplicates() {
        let value = Value::pairlist(vec![
            (Some("a".into()), Value::integer(vec![1])),
            (None, Value::integer(vec![2])),
            (Some("a".into()), Value::integer(vec![3])),
        ]);

        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![Some("a"), None, Some("a")]);
    }

    #[test]
    fn call_elements_are_always_unnamed() {
        let value = Value::call(vec![
            (None, Value::symbol("mean")),
            (Some("x".into()), Value::double(vec![1.0, 2.0])),
            (Some("na.rm".into()), Value::logical(vec![true])),
        ]);

        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![None, None, None]);
    }

    #[test]
    fn list_without_names_yields_unnamed_children() {
        let value = Value::list(vec![
            Value::integer(vec![1]),
            Value::string("two"),
            Value::null(),
        ]);

        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![None, None, None]);
    }

    #[test]
    fn list_names_apply_per_index_including_empty_strings() {
        let value = Value::list(vec![
            Value::integer(vec![1]),
            Value::integer(vec![2]),
            Value::integer(vec![3]),
        ]);
        value.set_names(vec!["x".into(), String::new(), "z".into()]);

        let result = decompose(&value);
        // The names attribute itself also surfaces, as the trailing
        // attributes record.
        assert_eq!(
            names_of(&result),
            vec![Some("x"), Some(""), Some("z"), Some("__attributes")]
        );
    }

    #[test]
    fn expression_vector_follows_the_list_rule() {
        let value = Value::expression(vec![Value::symbol("a"), Value::symbol("b")]);
        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![None, None]);
    }

    #[test]
    fn promise_yields_value_code_env() {
        let env = Environment::new(None);
        let promise = Value::promise(Value::call(vec![(None, Value::symbol("f"))]), env);

        let result = decompose(&promise);
        assert_eq!(
            names_of(&result),
            vec![Some("__value"), Some("__code"), Some("__env")]
        );
        // Unforced promises surface the unbound sentinel as their value.
        assert!(result.children()[0].value.is_unbound());
    }

    #[test]
    fn external_pointer_yields_prot_and_tag() {
        let value = Value::external_ptr(Value::null(), Value::symbol("handle"));
        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![Some("__prot"), Some("__tag")]);
    }

    #[test]
    fn environment_children_are_live_bindings_in_storage_order() {
        let env = Environment::new(None);
        env.define("a", Value::integer(vec![1]));
        env.define("b", Value::integer(vec![2]));

        let result = decompose(&Value::environment(env));
        assert_eq!(names_of(&result), vec![Some("a"), Some("b")]);
    }

    #[test]
    fn environment_with_parent_appends_enclosure_record() {
        let root = Environment::new(None);
        let env = Environment::new(Some(root));
        env.define("a", Value::integer(vec![1]));

        let result = decompose(&Value::environment(env));
        assert_eq!(names_of(&result), vec![Some("a"), Some("__enclosure")]);
    }

    #[test]
    fn tombstoned_binding_never_surfaces_as_a_child() {
        let env = Environment::new(None);
        env.define("a", Value::integer(vec![1]));
        env.define("b", Value::integer(vec![2]));
        env.remove("a");

        let result = decompose(&Value::environment(env));
        assert_eq!(names_of(&result), vec![Some("b")]);
    }

    #[test]
    fn hashed_environment_flattens_buckets_with_tombstone_filter() {
        let env = Environment::hashed(4, None);
        env.define("a", Value::integer(vec![1]));
        env.define("b", Value::integer(vec![2]));
        env.remove("a");

        let result = decompose(&Value::environment(env));
        assert_eq!(names_of(&result), vec![Some("b")]);
    }

    #[test]
    fn formal_instance_appends_slots_record() {
        let value = Value::s4();
        value.set_attr("class", Value::string("Thing"));
        value.set_attr("count", Value::integer(vec![3]));

        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![Some("__slots")]);
        let Payload::Pairlist(slots) = result.children()[0].value.payload() else {
            panic!("expected slots pairlist");
        };
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn formal_instance_without_slots_references_null() {
        let result = decompose(&Value::s4());
        assert_eq!(names_of(&result), vec![Some("__slots")]);
        assert!(result.children()[0].value.is_null());
    }

    #[test]
    fn formal_instance_never_emits_attributes_record() {
        let value = Value::double(vec![1.0]);
        value.set_attr("class", Value::string("Thing"));
        value.set_formal_instance(true);

        let result = decompose(&value);
        assert_eq!(names_of(&result), vec![Some("__slots")]);
    }

    #[test]
    fn unimplemented_kind_yields_zero_children_without_failing() {
        let result = decompose(&Value::dots());
        assert!(result.is_empty());

        // Metadata still applies after the warning path.
        let any = Value::any();
        any.set_attr("note", Value::string("kept"));
        let result = decompose(&any);
        assert_eq!(names_of(&result), vec![Some("__attributes")]);
    }

    #[test]
    fn decomposition_supports_debug_formatting() {
        let value = Value::list(vec![Value::integer(vec![1])]);
        value.set_names(vec!["a".into()]);

        let rendered = format!("{:?}", decompose(&value));
        assert!(rendered.contains("a"));
        assert!(rendered.contains("__attributes"));
    }

    #[test]
    fn decompose_is_idempotent_on_unmutated_values() {
        let value = Value::list(vec![Value::integer(vec![1]), Value::string("two")]);
        value.set_names(vec!["a".into(), "b".into()]);

        let first = decompose(&value);
        let second = decompose(&value);
        assert_eq!(names_of(&first), names_of(&second));
        // Structural children are the same shared handles both times; the
        // trailing attributes record is a fresh snapshot each call.
        for (lhs, rhs) in first.children().iter().zip(second.children()).take(2) {
            assert!(lhs.value.same_object(&rhs.value));
        }
    }
}
