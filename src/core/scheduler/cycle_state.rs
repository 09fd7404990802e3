//! Per scheduling cycle key-value storage shared by plugins of one cycle.
//! A new `CycleState` is created for every cycle and dropped when the cycle ends.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use downcast_rs::{impl_downcast, DowncastSync};
use dyn_clone::DynClone;

pub trait StateData: DynClone + DowncastSync {}

dyn_clone::clone_trait_object!(StateData);
impl_downcast!(sync StateData);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StateError {
    #[error("{key:?} not found in cycle state")]
    NotFound { key: String },
    #[error("{key:?} in cycle state is not of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

#[derive(Default)]
pub struct CycleState {
    storage: RwLock<HashMap<String, Arc<dyn StateData>>>,
}

impl CycleState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn write<T: StateData>(&self, key: &str, value: T) {
        self.storage
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), Arc::new(value));
    }

    pub fn read(&self, key: &str) -> Result<Arc<dyn StateData>, StateError> {
        self.storage
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| StateError::NotFound {
                key: key.to_string(),
            })
    }

    /// Reads a value and downcasts it to the concrete type it was written with.
    pub fn read_as<T: StateData>(&self, key: &str) -> Result<Arc<T>, StateError> {
        self.read(key)?
            .downcast_arc::<T>()
            .map_err(|_| StateError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn delete(&self, key: &str) {
        self.storage
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.storage
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(key)
    }

    /// Deep copy of every stored value.
    pub fn clone_state(&self) -> CycleState {
        let storage = self
            .storage
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(key, value)| (key.clone(), Arc::from(dyn_clone::clone_box(&**value))))
            .collect();
        CycleState {
            storage: RwLock::new(storage),
        }
    }
}
