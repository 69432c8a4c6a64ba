//! Identifiers and simple allocators for engine entities.

use serde::{Deserialize, Serialize};

/// Identity of a visual object (view or render layer) the engine can drive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Handle a substrate returns for one in-flight transition or delay timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub u32);

/// Monotonic allocator for ObjectId and TransitionId.
/// IDs are opaque externally; substrates own one allocator each.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_object: u32,
    next_transition: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_object(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object = self.next_object.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_transition(&mut self) -> TransitionId {
        let id = TransitionId(self.next_transition);
        self.next_transition = self.next_transition.wrapping_add(1);
        id
    }
}
