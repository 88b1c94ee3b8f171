//! Generational arena of wrapped native instances.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ConversionError;

/// Handle to a wrapped native instance.
///
/// This is the host-visible identity of the object. The generational index
/// makes a handle to a released instance detectable instead of aliasing
/// whatever reuses its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Index into the heap's slots
    pub index: u32,
    /// Generation for use-after-free detection
    pub generation: u32,
    /// Rust TypeId of the wrapped value
    pub type_id: TypeId,
}

impl ObjectHandle {
    pub fn new(index: u32, generation: u32, type_id: TypeId) -> Self {
        Self {
            index,
            generation,
            type_id,
        }
    }
}

/// Storage for wrapped instances.
///
/// Each slot owns an `Rc<RefCell<T>>` erased to `Rc<dyn Any>`, so a resolved
/// instance stays valid for as long as native code holds it, even if the
/// host releases its handle in the meantime.
pub(crate) struct ObjectHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
}

struct HeapSlot {
    generation: u32,
    value: Option<Rc<dyn Any>>,
    type_name: &'static str,
    ref_count: u32,
}

impl ObjectHeap {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Wrap a value, returning its handle with a reference count of one.
    pub(crate) fn allocate<T: Any>(&mut self, value: T) -> ObjectHandle {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();
        let cell: Rc<dyn Any> = Rc::new(RefCell::new(value));

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(cell);
            slot.type_name = type_name;
            slot.ref_count = 1;
            ObjectHandle::new(index, slot.generation, type_id)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HeapSlot {
                generation: 0,
                value: Some(cell),
                type_name,
                ref_count: 1,
            });
            ObjectHandle::new(index, 0, type_id)
        }
    }

    /// Resolve a handle to the instance it wraps.
    pub(crate) fn resolve<T: Any>(
        &self,
        handle: ObjectHandle,
    ) -> Result<Rc<RefCell<T>>, ConversionError> {
        let expected = std::any::type_name::<T>();
        let Some(slot) = self.live_slot(handle) else {
            return Err(ConversionError::StaleHandle { expected });
        };
        let Some(value) = &slot.value else {
            return Err(ConversionError::StaleHandle { expected });
        };

        match Rc::clone(value).downcast::<RefCell<T>>() {
            Ok(instance) => Ok(instance),
            Err(_) => Err(ConversionError::InstanceTypeMismatch {
                expected,
                actual: slot.type_name,
            }),
        }
    }

    /// Name of the native type behind a live handle.
    pub(crate) fn type_name(&self, handle: ObjectHandle) -> Option<&'static str> {
        self.live_slot(handle).map(|slot| slot.type_name)
    }

    pub(crate) fn add_ref(&mut self, handle: ObjectHandle) -> bool {
        if let Some(slot) = self.live_slot_mut(handle) {
            slot.ref_count = slot.ref_count.saturating_add(1);
            return true;
        }
        false
    }

    /// Decrement the reference count, freeing the slot at zero.
    ///
    /// Returns the freed instance so the caller decides where it is dropped.
    pub(crate) fn release(&mut self, handle: ObjectHandle) -> Option<Rc<dyn Any>> {
        let slot = self.live_slot_mut(handle)?;
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 {
            return None;
        }
        let freed = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        freed
    }

    pub(crate) fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.live_slot(handle).map(|slot| slot.ref_count)
    }

    pub(crate) fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    fn live_slot(&self, handle: ObjectHandle) -> Option<&HeapSlot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }

    fn live_slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut HeapSlot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}
