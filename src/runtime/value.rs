use crate::runtime::environment::Environment;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a runtime value. Values are owned by the host runtime;
/// the inspection side only ever reads them through this handle.
#[derive(Clone)]
pub struct Value(Rc<ValueData>);

pub struct ValueData {
    payload: Payload,
    attributes: RefCell<Vec<(String, Value)>>,
    formal_instance: Cell<bool>,
}

#[derive(Clone)]
pub enum Payload {
    Null,
    Symbol(String),
    // Reserved sentinel marking a deleted binding or an unforced promise.
    Unbound,
    Pairlist(Vec<(Option<String>, Value)>),
    Closure(ClosureValue),
    Environment(Environment),
    Promise(PromiseValue),
    Call(Vec<(Option<String>, Value)>),
    Special(String),
    Builtin(String),
    Char(String),
    Logical(Vec<bool>),
    Int(Vec<i32>),
    Double(Vec<f64>),
    Complex(Vec<Complex>),
    Str(Vec<String>),
    Dots,
    Any,
    List(Vec<Value>),
    Expr(Vec<Value>),
    Bytecode,
    ExternalPtr(ExternalPtrValue),
    WeakRef,
    Raw(Vec<u8>),
    S4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Symbol,
    Pairlist,
    Closure,
    Environment,
    Promise,
    Call,
    Special,
    Builtin,
    Char,
    Logical,
    Int,
    Double,
    Complex,
    Str,
    Dots,
    Any,
    List,
    Expr,
    Bytecode,
    ExternalPtr,
    WeakRef,
    Raw,
    S4,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

#[derive(Clone)]
pub struct ClosureValue {
    pub body: Value,
    pub formals: Value,
    pub enclosure: Environment,
}

#[derive(Clone)]
pub struct PromiseValue {
    // Unbound until the host forces the promise.
    pub value: Rc<RefCell<Value>>,
    pub code: Value,
    pub environment: Environment,
}

impl PromiseValue {
    pub fn force(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }

    pub fn is_forced(&self) -> bool {
        !self.value.borrow().is_unbound()
    }
}

#[derive(Clone)]
pub struct ExternalPtrValue {
    pub protected: Value,
    pub tag: Value,
}

impl Value {
    fn with_payload(payload: Payload) -> Self {
        Value(Rc::new(ValueData {
            payload,
            attributes: RefCell::new(Vec::new()),
            formal_instance: Cell::new(false),
        }))
    }

    pub fn null() -> Self {
        Value::with_payload(Payload::Null)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::with_payload(Payload::Symbol(name.into()))
    }

    pub fn unbound() -> Self {
        Value::with_payload(Payload::Unbound)
    }

    pub fn pairlist(slots: Vec<(Option<String>, Value)>) -> Self {
        Value::with_payload(Payload::Pairlist(slots))
    }

    pub fn closure(body: Value, formals: Value, enclosure: Environment) -> Self {
        Value::with_payload(Payload::Closure(ClosureValue {
            body,
            formals,
            enclosure,
        }))
    }

    pub fn environment(env: Environment) -> Self {
        Value::with_payload(Payload::Environment(env))
    }

    pub fn promise(code: Value, environment: Environment) -> Self {
        Value::with_payload(Payload::Promise(PromiseValue {
            value: Rc::new(RefCell::new(Value::unbound())),
            code,
            environment,
        }))
    }

    pub fn call(elements: Vec<(Option<String>, Value)>) -> Self {
        Value::with_payload(Payload::Call(elements))
    }

    pub fn special(name: impl Into<String>) -> Self {
        Value::with_payload(Payload::Special(name.into()))
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Value::with_payload(Payload::Builtin(name.into()))
    }

    pub fn char_unit(text: impl Into<String>) -> Self {
        Value::with_payload(Payload::Char(text.into()))
    }

    pub fn logical(items: Vec<bool>) -> Self {
        Value::with_payload(Payload::Logical(items))
    }

    pub fn integer(items: Vec<i32>) -> Self {
        Value::with_payload(Payload::Int(items))
    }

    pub fn double(items: Vec<f64>) -> Self {
        Value::with_payload(Payload::Double(items))
    }

    pub fn complex(items: Vec<Complex>) -> Self {
        Value::with_payload(Payload::Complex(items))
    }

    pub fn character(items: Vec<String>) -> Self {
        Value::with_payload(Payload::Str(items))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::character(vec![text.into()])
    }

    pub fn dots() -> Self {
        Value::with_payload(Payload::Dots)
    }

    pub fn any() -> Self {
        Value::with_payload(Payload::Any)
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Value::with_payload(Payload::List(elements))
    }

    pub fn expression(elements: Vec<Value>) -> Self {
        Value::with_payload(Payload::Expr(elements))
    }

    pub fn bytecode() -> Self {
        Value::with_payload(Payload::Bytecode)
    }

    pub fn external_ptr(protected: Value, tag: Value) -> Self {
        Value::with_payload(Payload::ExternalPtr(ExternalPtrValue { protected, tag }))
    }

    pub fn weak_ref() -> Self {
        Value::with_payload(Payload::WeakRef)
    }

    pub fn raw(bytes: Vec<u8>) -> Self {
        Value::with_payload(Payload::Raw(bytes))
    }

    pub fn s4() -> Self {
        let value = Value::with_payload(Payload::S4);
        value.set_formal_instance(true);
        value
    }

    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    pub fn kind(&self) -> Kind {
        match &self.0.payload {
            Payload::Null => Kind::Null,
            // The unbound sentinel is a reserved symbol in the host runtime.
            Payload::Symbol(_) | Payload::Unbound => Kind::Symbol,
            Payload::Pairlist(_) => Kind::Pairlist,
            Payload::Closure(_) => Kind::Closure,
            Payload::Environment(_) => Kind::Environment,
            Payload::Promise(_) => Kind::Promise,
            Payload::Call(_) => Kind::Call,
            Payload::Special(_) => Kind::Special,
            Payload::Builtin(_) => Kind::Builtin,
            Payload::Char(_) => Kind::Char,
            Payload::Logical(_) => Kind::Logical,
            Payload::Int(_) => Kind::Int,
            Payload::Double(_) => Kind::Double,
            Payload::Complex(_) => Kind::Complex,
            Payload::Str(_) => Kind::Str,
            Payload::Dots => Kind::Dots,
            Payload::Any => Kind::Any,
            Payload::List(_) => Kind::List,
            Payload::Expr(_) => Kind::Expr,
            Payload::Bytecode => Kind::Bytecode,
            Payload::ExternalPtr(_) => Kind::ExternalPtr,
            Payload::WeakRef => Kind::WeakRef,
            Payload::Raw(_) => Kind::Raw,
            Payload::S4 => Kind::S4,
        }
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self.0.payload, Payload::Unbound)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.0.payload, Payload::Null)
    }

    pub fn is_formal_instance(&self) -> bool {
        self.0.formal_instance.get()
    }

    pub fn set_formal_instance(&self, flag: bool) {
        self.0.formal_instance.set(flag);
    }

    pub fn same_object(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn attr(&self, name: &str) -> Option<Value> {
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn set_attr(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut attributes = self.0.attributes.borrow_mut();
        if let Some(entry) = attributes.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            attributes.push((name, value));
        }
    }

    pub fn has_attributes(&self) -> bool {
        !self.0.attributes.borrow().is_empty()
    }

    /// Convenience for naming the elements of a list or expression vector.
    pub fn set_names(&self, names: Vec<String>) {
        self.set_attr("names", Value::character(names));
    }

    /// Snapshot of the attribute table as a pairlist value, the shape the
    /// host runtime stores attributes in. An empty table yields NULL.
    pub fn attributes_value(&self) -> Value {
        let attributes = self.0.attributes.borrow();
        if attributes.is_empty() {
            return Value::null();
        }
        Value::pairlist(
            attributes
                .iter()
                .map(|(name, value)| (Some(name.clone()), value.clone()))
                .collect(),
        )
    }

    /// First element of a character vector, or the text of a single
    /// character unit.
    pub fn first_string(&self) -> Option<&str> {
        match self.payload() {
            Payload::Str(items) => items.first().map(String::as_str),
            Payload::Char(text) => Some(text),
            _ => None,
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}{}i", self.re, self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Payload::Null => write!(f, "NULL"),
            Payload::Symbol(name) => write!(f, "{name}"),
            Payload::Unbound => write!(f, "<unbound>"),
            Payload::Pairlist(slots) => {
                write!(f, "pairlist(")?;
                for (idx, (tag, value)) in slots.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    match tag {
                        Some(tag) => write!(f, "{tag} = {value}")?,
                        None => write!(f, "{value}")?,
                    }
                }
                write!(f, ")")
            }
            Payload::Closure(closure) => write!(f, "function({})", closure.formals),
            Payload::Environment(_) => write!(f, "<environment>"),
            Payload::Promise(promise) => {
                if promise.is_forced() {
                    write!(f, "<promise: {}>", promise.value.borrow())
                } else {
                    write!(f, "<promise>")
                }
            }
            Payload::Call(elements) => {
                write!(f, "call(")?;
                for (idx, (_, element)) in elements.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Payload::Special(name) => write!(f, "<special: {name}>"),
            Payload::Builtin(name) => write!(f, "<builtin: {name}>"),
            Payload::Char(text) => write!(f, "{text:?}"),
            Payload::Logical(items) => {
                let rendered: Vec<&str> = items
                    .iter()
                    .map(|flag| if *flag { "TRUE" } else { "FALSE" })
                    .collect();
                write_joined(f, &rendered)
            }
            Payload::Int(items) => write_joined(f, items),
            Payload::Double(items) => write_joined(f, items),
            Payload::Complex(items) => write_joined(f, items),
            Payload::Str(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                Ok(())
            }
            Payload::Dots => write!(f, "..."),
            Payload::Any => write!(f, "<any>"),
            Payload::List(elements) => {
                write!(f, "list(")?;
                write_joined(f, elements)?;
                write!(f, ")")
            }
            Payload::Expr(elements) => {
                write!(f, "expression(")?;
                write_joined(f, elements)?;
                write!(f, ")")
            }
            Payload::Bytecode => write!(f, "<bytecode>"),
            Payload::ExternalPtr(_) => write!(f, "<pointer>"),
            Payload::WeakRef => write!(f, "<weak reference>"),
            Payload::Raw(bytes) => {
                for (idx, byte) in bytes.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Payload::S4 => write!(f, "<S4 object>"),
        }
    }
}
