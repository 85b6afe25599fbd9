/// Content-deduplicated descriptor storage.
///
/// Slot indices are stable for the lifetime of a slot. A freed slot keeps
/// its last descriptor value with a zero hash until it is reused.

use std::ops::Index;
use super::descriptor::InstanceDescriptor;

/// Outcome of a descriptor registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorRegistration {
    /// An equal descriptor was already registered at this index
    Existing(usize),
    /// A freed slot was overwritten
    Reused(usize),
    /// A new slot was appended
    Appended(usize),
}

impl DescriptorRegistration {
    /// Slot index the descriptor lives at
    pub fn index(&self) -> usize {
        match *self {
            DescriptorRegistration::Existing(index)
            | DescriptorRegistration::Reused(index)
            | DescriptorRegistration::Appended(index) => index,
        }
    }
}

/// Table of registered descriptors
#[derive(Debug, Default)]
pub struct DescriptorTable {
    descriptors: Vec<InstanceDescriptor>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots (live and free)
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptor stored at `index` (may be a freed slot)
    pub fn get(&self, index: usize) -> Option<&InstanceDescriptor> {
        self.descriptors.get(index)
    }

    /// Index of a live descriptor structurally equal to `descriptor`
    pub fn find(&self, descriptor: &InstanceDescriptor) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|existing| !existing.is_free() && existing == descriptor)
    }

    /// Register `descriptor`, deduplicating against live slots.
    ///
    /// `is_slot_empty` must report whether a freed slot has no instances
    /// left; reusing a slot that still holds instances is a contract
    /// violation.
    ///
    /// # Panics
    ///
    /// Panics if `descriptor.hash` is zero.
    pub fn register(
        &mut self,
        descriptor: InstanceDescriptor,
        is_slot_empty: impl Fn(usize) -> bool,
    ) -> DescriptorRegistration {
        assert!(descriptor.hash != 0, "descriptor must be registered with a computed hash");

        if let Some(index) = self.find(&descriptor) {
            return DescriptorRegistration::Existing(index);
        }

        if let Some(index) = self.descriptors.iter().position(InstanceDescriptor::is_free) {
            assert!(is_slot_empty(index), "free descriptor slot {} still holds instances", index);
            self.descriptors[index] = descriptor;
            return DescriptorRegistration::Reused(index);
        }

        self.descriptors.push(descriptor);
        DescriptorRegistration::Appended(self.descriptors.len() - 1)
    }

    /// Mark a slot free (zero hash)
    pub fn free(&mut self, index: usize) {
        self.descriptors[index].hash = 0;
    }

    /// Re-derive the hash of a freed slot so it becomes live again.
    ///
    /// Returns true if the slot was free.
    pub fn revive(&mut self, index: usize) -> bool {
        let descriptor = &mut self.descriptors[index];
        if descriptor.is_free() {
            descriptor.update_hash();
            true
        } else {
            false
        }
    }

    /// Number of live (non-free) slots
    pub fn live_count(&self) -> usize {
        self.descriptors.iter().filter(|d| !d.is_free()).count()
    }

    /// Number of freed slots awaiting reuse
    pub fn free_count(&self) -> usize {
        self.descriptors.len() - self.live_count()
    }

    /// Iterate over (index, descriptor) for every slot
    pub fn iter(&self) -> impl Iterator<Item = (usize, &InstanceDescriptor)> {
        self.descriptors.iter().enumerate()
    }
}

impl Index<usize> for DescriptorTable {
    type Output = InstanceDescriptor;

    fn index(&self, index: usize) -> &InstanceDescriptor {
        &self.descriptors[index]
    }
}

#[cfg(test)]
#[path = "descriptor_table_tests.rs"]
mod tests;
