// Handle Management System: Safe bridge between integer handles and Rust objects
//
// Callers across the C/JNI boundary hold contexts as plain 64-bit integers. Instead of
// casting raw pointers, a handle packs an arena slot index with the slot's generation:
//
//   handle = (generation << 32) | (slot_index + 1)
//
// Handle 0 is NULL. Removing an object bumps the slot generation, so a stale handle
// never resolves, even after its slot has been reused by a newer object.

use crate::core::error::{Result, SpoofError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Opaque integer handle as seen by callers
pub type Handle = u64;

/// The NULL handle
pub const NULL_HANDLE: Handle = 0;

struct Slot<T> {
    generation: u32,
    value: Option<Arc<T>>,
}

struct Slots<T> {
    entries: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

/// Generation-checked handle registry for a specific object type
pub struct HandleRegistry<T> {
    slots: Mutex<Slots<T>>,
}

fn pack(index: u32, generation: u32) -> Handle {
    ((generation as u64) << 32) | (index as u64 + 1)
}

fn unpack(handle: Handle) -> Option<(usize, u32)> {
    let low = (handle & 0xFFFF_FFFF) as u32;
    if low == 0 {
        return None;
    }
    Some(((low - 1) as usize, (handle >> 32) as u32))
}

impl<T> HandleRegistry<T> {
    /// Create a new handle registry
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: Vec::new(),
                free: Vec::new(),
                live: 0,
            }),
        }
    }

    /// Register a new object and return its handle
    ///
    /// The object is wrapped in Arc so callers can keep using it while the
    /// registry lock is released.
    pub fn insert(&self, object: T) -> Handle {
        let arc = Arc::new(object);
        let mut slots = self.slots.lock();
        slots.live += 1;

        if let Some(index) = slots.free.pop() {
            let slot = &mut slots.entries[index as usize];
            slot.value = Some(arc);
            return pack(index, slot.generation);
        }

        let index = slots.entries.len() as u32;
        slots.entries.push(Slot {
            generation: 0,
            value: Some(arc),
        });
        pack(index, 0)
    }

    /// Get an object by its handle
    ///
    /// Returns an Arc clone. Fails with NullHandle for 0 and InvalidHandle for
    /// anything not currently live.
    pub fn get(&self, handle: Handle) -> Result<Arc<T>> {
        let (index, generation) = unpack(handle).ok_or(SpoofError::NullHandle)?;
        let slots = self.slots.lock();
        slots
            .entries
            .get(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.clone())
            .ok_or(SpoofError::InvalidHandle)
    }

    /// Remove an object by its handle
    ///
    /// The object is dropped once all outstanding Arc references are released.
    pub fn remove(&self, handle: Handle) -> Result<Arc<T>> {
        let (index, generation) = unpack(handle).ok_or(SpoofError::NullHandle)?;
        let mut slots = self.slots.lock();

        let slot = match slots.entries.get_mut(index) {
            Some(slot) if slot.generation == generation && slot.value.is_some() => slot,
            _ => return Err(SpoofError::InvalidHandle),
        };
        let removed = slot.value.take().ok_or(SpoofError::InvalidHandle)?;
        slot.generation = slot.generation.wrapping_add(1);

        slots.free.push(index as u32);
        slots.live -= 1;
        Ok(removed)
    }

    /// Check if a handle is live
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_ok()
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.slots.lock().live
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro to create a global handle registry for a specific type
#[macro_export]
macro_rules! define_handle_registry {
    ($registry_name:ident, $type:ty) => {
        lazy_static::lazy_static! {
            static ref $registry_name: $crate::core::handles::HandleRegistry<$type> =
                $crate::core::handles::HandleRegistry::new();
        }
    };
}
