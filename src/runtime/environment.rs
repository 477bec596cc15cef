use crate::runtime::error::RuntimeError;
use crate::runtime::value::Value;
use rustc_hash::FxHasher;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Shared handle to a mutable name/value frame with an enclosing scope.
/// `None` for the enclosing scope is the terminator: the empty environment
/// at the top of every chain.
#[derive(Clone)]
pub struct Environment(Rc<EnvData>);

struct EnvData {
    store: RefCell<Store>,
    enclosing: Option<Environment>,
}

struct FrameSlot {
    name: String,
    value: Value,
}

enum Store {
    Frame(Vec<FrameSlot>),
    Hashed(Vec<Vec<FrameSlot>>),
}

impl Environment {
    pub fn new(enclosing: Option<Environment>) -> Self {
        Environment(Rc::new(EnvData {
            store: RefCell::new(Store::Frame(Vec::new())),
            enclosing,
        }))
    }

    pub fn hashed(buckets: usize, enclosing: Option<Environment>) -> Self {
        let buckets = buckets.max(1);
        let mut table = Vec::with_capacity(buckets);
        table.resize_with(buckets, Vec::new);
        Environment(Rc::new(EnvData {
            store: RefCell::new(Store::Hashed(table)),
            enclosing,
        }))
    }

    pub fn enclosing(&self) -> Option<Environment> {
        self.0.enclosing.clone()
    }

    pub fn same_environment(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Bind `name` in this frame, overwriting any existing slot for it.
    /// Redefining a tombstoned name revives its slot in place.
    pub fn define(&self, name: &str, value: Value) {
        let mut store = self.0.store.borrow_mut();
        let slots = match &mut *store {
            Store::Frame(slots) => slots,
            Store::Hashed(table) => {
                let index = bucket_index(name, table.len());
                &mut table[index]
            }
        };
        if let Some(slot) = slots.iter_mut().find(|slot| slot.name == name) {
            slot.value = value;
        } else {
            slots.push(FrameSlot {
                name: name.to_string(),
                value,
            });
        }
    }

    /// Delete a binding by tombstoning its slot with the unbound sentinel.
    /// Slots are never physically removed, so frame order stays stable.
    pub fn remove(&self, name: &str) {
        let mut store = self.0.store.borrow_mut();
        let slots = match &mut *store {
            Store::Frame(slots) => slots,
            Store::Hashed(table) => {
                let index = bucket_index(name, table.len());
                &mut table[index]
            }
        };
        if let Some(slot) = slots.iter_mut().find(|slot| slot.name == name) {
            slot.value = Value::unbound();
        }
    }

    /// Look up `name` in this frame only, ignoring tombstoned slots.
    pub fn lookup_local(&self, name: &str) -> Option<Value> {
        let store = self.0.store.borrow();
        let slots = match &*store {
            Store::Frame(slots) => slots.as_slice(),
            Store::Hashed(table) => table[bucket_index(name, table.len())].as_slice(),
        };
        slots
            .iter()
            .find(|slot| slot.name == name && !slot.value.is_unbound())
            .map(|slot| slot.value.clone())
    }

    /// Resolve `name` here or in any enclosing scope. A tombstoned binding
    /// falls through to an enclosing one with the same name.
    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            if let Some(value) = env.lookup_local(name) {
                return Ok(value);
            }
            current = env.enclosing();
        }
        Err(RuntimeError::UnknownSymbol {
            name: name.to_string(),
        })
    }

    /// Flatten the frame (or every bucket, in storage order) into live
    /// (name, value) bindings, skipping tombstoned slots.
    pub fn live_bindings(&self) -> Vec<(String, Value)> {
        let store = self.0.store.borrow();
        let mut out = Vec::new();
        match &*store {
            Store::Frame(slots) => collect_frame(slots, &mut out),
            Store::Hashed(table) => {
                for bucket in table {
                    collect_frame(bucket, &mut out);
                }
            }
        }
        out
    }
}

fn collect_frame(slots: &[FrameSlot], out: &mut Vec<(String, Value)>) {
    for slot in slots {
        if !slot.value.is_unbound() {
            out.push((slot.name.clone(), slot.value.clone()));
        }
    }
}

fn bucket_index(name: &str, buckets: usize) -> usize {
    let mut hasher = FxHasher::default();
    name.hash(&mut hasher);
    (hasher.finish() as usize) % buckets
}
