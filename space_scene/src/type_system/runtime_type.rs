/// RuntimeTypeId and TypeIdContext.
///
/// A `TypeIdContext` assigns local ids in first-request order, starting at
/// 1. Id 0 is `RuntimeTypeId::UNKNOWN`. Ids are never reused within the
/// lifetime of a context. Each `Scene` owns three independent contexts
/// (views, objects, operations), so one Rust type may carry different local
/// ids in each namespace.

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use rustc_hash::{FxHashMap, FxHasher};
use crate::space::{Error, Result};

/// Number of local ids one context can hand out.
pub const MAX_RUNTIME_TYPES: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RuntimeTypeId(u8);

impl RuntimeTypeId {
    pub const UNKNOWN: RuntimeTypeId = RuntimeTypeId(0);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Position in a dense dispatch table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RuntimeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-wide 64-bit identity of a Rust type.
pub fn global_type_id<T: ?Sized + 'static>() -> u64 {
    let mut hasher = FxHasher::default();
    TypeId::of::<T>().hash(&mut hasher);
    hasher.finish()
}

#[derive(Default)]
struct TypeIdTable {
    local_ids: FxHashMap<u64, RuntimeTypeId>,
    /// global_ids[local - 1]
    global_ids: Vec<u64>,
}

pub struct TypeIdContext {
    name: &'static str,
    table: RefCell<TypeIdTable>,
}

impl TypeIdContext {
    pub fn new(name: &'static str) -> Self {
        Self { name, table: RefCell::new(TypeIdTable::default()) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Existing id for `global_id`, or the next free one.
    ///
    /// Returns `RuntimeTypeId::UNKNOWN` (and logs an error) once all
    /// `MAX_RUNTIME_TYPES` ids are taken.
    pub fn local_id(&self, global_id: u64) -> RuntimeTypeId {
        match self.try_local_id(global_id) {
            Ok(id) => id,
            Err(err) => {
                crate::engine_error!("space::TypeIdContext", "'{}' context: {}", self.name, err);
                RuntimeTypeId::UNKNOWN
            }
        }
    }

    /// Like `local_id`, but reports a full context as an error.
    pub fn try_local_id(&self, global_id: u64) -> Result<RuntimeTypeId> {
        let mut table = self.table.borrow_mut();
        if let Some(&id) = table.local_ids.get(&global_id) {
            return Ok(id);
        }

        if table.global_ids.len() >= MAX_RUNTIME_TYPES {
            return Err(Error::TypeCapacityExceeded { capacity: MAX_RUNTIME_TYPES });
        }

        table.global_ids.push(global_id);
        let id = RuntimeTypeId(table.global_ids.len() as u8);
        table.local_ids.insert(global_id, id);
        Ok(id)
    }

    /// Local id of `T`, assigned on first request.
    pub fn type_id_of<T: ?Sized + 'static>(&self) -> RuntimeTypeId {
        self.local_id(global_type_id::<T>())
    }

    /// Lookup without assigning.
    pub fn find_local_id(&self, global_id: u64) -> Option<RuntimeTypeId> {
        self.table.borrow().local_ids.get(&global_id).copied()
    }

    /// Inverse of `local_id`. `None` for ids never assigned here.
    pub fn global_id(&self, local_id: RuntimeTypeId) -> Option<u64> {
        if !local_id.is_valid() {
            return None;
        }
        self.table.borrow().global_ids.get(local_id.index() - 1).copied()
    }

    /// Number of ids assigned so far.
    pub fn len(&self) -> usize {
        self.table.borrow().global_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TypeIdContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeIdContext")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "runtime_type_tests.rs"]
mod tests;
