use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::FunctionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IderError {
    #[error("Unknown function id {0}")]
    UnknownId(FunctionId),
}

#[derive(Debug, Default)]
struct Registry {
    next: i64,
    id_to_name: HashMap<FunctionId, String>,
    name_to_id: HashMap<String, FunctionId>,
}

/// Bijective registry between function names and dense ids.
///
/// Names are trimmed before lookup. Registration takes the write lock; name
/// lookups only take the read lock, so an `&Ider` can be shared between
/// threads that build graphs for the same configuration.
#[derive(Debug, Default)]
pub struct Ider {
    inner: RwLock<Registry>,
}

impl Ider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `name`, allocating the next free id on first sight.
    pub fn id(&self, name: &str) -> FunctionId {
        let name = name.trim();
        if let Some(id) = self.read().name_to_id.get(name) {
            return *id;
        }

        let mut reg = self.write();
        // Another writer may have registered the name between the two locks.
        if let Some(id) = reg.name_to_id.get(name) {
            return *id;
        }
        let id = FunctionId(reg.next);
        reg.next += 1;
        reg.id_to_name.insert(id, name.to_string());
        reg.name_to_id.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: FunctionId) -> Result<String, IderError> {
        self.read().id_to_name.get(&id).cloned().ok_or(IderError::UnknownId(id))
    }

    /// Lookup without registering.
    pub fn lookup(&self, name: &str) -> Option<FunctionId> {
        self.read().name_to_id.get(name.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.read().id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Nothing panics while the write guard is held, so a poisoned registry is
    // still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for Ider {
    /// Deep copy: the clone shares no state with the original.
    fn clone(&self) -> Self {
        let reg = self.read();
        Self {
            inner: RwLock::new(Registry {
                next: reg.next,
                id_to_name: reg.id_to_name.clone(),
                name_to_id: reg.name_to_id.clone(),
            }),
        }
    }
}
