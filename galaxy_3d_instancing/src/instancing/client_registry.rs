/// Client identities for the instance partition.
///
/// Each client (a foliage type, a procedural system, ...) registers once
/// with a GUID and receives a `ClientHandle`. A handle is only honored while
/// the GUID stored in its slot still matches, so a handle kept across an
/// unregister/re-register cycle of a recycled slot is rejected.

use uuid::Uuid;

/// Opaque handle identifying a registered client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle {
    index: usize,
    guid: Uuid,
}

impl ClientHandle {
    /// Slot index in the registry
    pub fn index(&self) -> usize {
        self.index
    }

    /// Generation GUID of the client
    pub fn guid(&self) -> Uuid {
        self.guid
    }
}

/// Slot table of registered client GUIDs.
///
/// Freed slots hold the nil GUID and are reused first-fit. The table only
/// shrinks when its last slot is freed.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    slots: Vec<Uuid>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `guid`, or return its existing handle if already registered.
    ///
    /// # Panics
    ///
    /// Panics if `guid` is nil.
    pub fn register(&mut self, guid: Uuid) -> ClientHandle {
        assert!(!guid.is_nil(), "client GUID must not be nil");

        if let Some(index) = self.slots.iter().position(|slot| *slot == guid) {
            return ClientHandle { index, guid };
        }

        let index = match self.slots.iter().position(Uuid::is_nil) {
            Some(free) => {
                self.slots[free] = guid;
                free
            }
            None => {
                self.slots.push(guid);
                self.slots.len() - 1
            }
        };

        ClientHandle { index, guid }
    }

    /// Release the slot held by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or unknown.
    pub fn unregister(&mut self, handle: ClientHandle) {
        assert!(self.is_valid(handle), "unregistering an invalid client handle {:?}", handle);

        self.slots[handle.index] = Uuid::nil();
        if handle.index + 1 == self.slots.len() {
            self.slots.pop();
        }
    }

    /// Whether `handle` still designates a live registration
    pub fn is_valid(&self, handle: ClientHandle) -> bool {
        !handle.guid.is_nil() && self.slots.get(handle.index) == Some(&handle.guid)
    }

    /// Number of slots (live and free)
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of registered clients
    pub fn client_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_nil()).count()
    }

    /// Handles of every registered client
    pub fn handles(&self) -> impl Iterator<Item = ClientHandle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, guid)| !guid.is_nil())
            .map(|(index, guid)| ClientHandle { index, guid: *guid })
    }
}

#[cfg(test)]
#[path = "client_registry_tests.rs"]
mod tests;
