/// Multi-client instance store.
///
/// `IsmPartition` multiplexes many independent clients onto a small set of
/// shared instanced batches, one batch per distinct descriptor. Each
/// descriptor entry keeps a flat array mirroring the batch's own instance
/// order, plus per-client tables mapping client-local ordinals back to
/// batch slots.
///
/// Invariants maintained after every public call:
///
/// - for every `ComponentInstance` at position `i` of entry `d`,
///   `client_data[ci.client_index].instances[ci.instance_index]
///   .component_indices[ci.sub_index] == i`
/// - a live batch reports exactly as many instances as its entry holds
/// - a batch exists only while its entry holds instances, or while an
///   update scope is open

use std::collections::BTreeMap;
use glam::Mat4;
use uuid::Uuid;
use crate::math::AABB;
use crate::{engine_debug, engine_trace};
use super::client_registry::{ClientHandle, ClientRegistry};
use super::descriptor::InstanceDescriptor;
use super::descriptor_table::{DescriptorRegistration, DescriptorTable};
use super::instance_batch::{BatchFactory, InstanceBatch, Transactor};
use super::stats::PartitionStats;
use super::update_scope::UpdateScope;

const LOG_SOURCE: &str = "galaxy3d::IsmPartition";

/// Local transforms of one logical instance, keyed by descriptor index.
///
/// A logical instance rendered through several descriptors (one per mesh
/// part, say) lists one or more local offsets per descriptor.
pub type InstanceDefinition = BTreeMap<usize, Vec<Mat4>>;

// ===== CONFIGURATION =====

/// Instance store settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionConfig {
    /// Forwarded to `build_tree_if_outdated` when an outermost update
    /// scope closes
    pub build_tree_async: bool,
}

// ===== BOOKKEEPING RECORDS =====

/// Owner of one physical batch slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInstance {
    /// Client registry slot of the owning client
    pub client_index: usize,
    /// Client-local ordinal of the owning logical instance
    pub instance_index: usize,
    /// Position within that instance's component indices
    pub sub_index: usize,
}

/// One client-local logical instance as seen by one descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInstance {
    /// Batch slots this instance occupies in the descriptor's batch
    pub component_indices: Vec<usize>,
}

/// All of one client's instances within one descriptor
#[derive(Debug, Clone, Default)]
pub struct ClientData {
    pub instances: Vec<ClientInstance>,
}

/// Per-descriptor storage
#[derive(Default)]
struct IsmComponentData {
    batch: Option<Box<dyn InstanceBatch>>,
    /// Mirrors the batch's instance array: entry `i` owns batch slot `i`
    instances: Vec<ComponentInstance>,
    /// Indexed by client registry slot
    client_data: Vec<ClientData>,
    /// Undo snapshot already taken in the current outermost scope
    was_modify_called: bool,
    /// Auto-rebuild flag to restore when the outermost scope closes
    auto_rebuild_snapshot: Option<bool>,
}

impl IsmComponentData {
    fn modify(&mut self, update_depth: u32) {
        if !self.was_modify_called {
            if let Some(batch) = self.batch.as_mut() {
                batch.modify();
            }
            self.was_modify_called = update_depth > 0;
        }
    }

    fn has_client_data(&self, client_index: usize) -> bool {
        self.client_data
            .get(client_index)
            .map_or(false, |data| !data.instances.is_empty())
    }
}

// ===== PARTITION =====

/// De-duplicated, multi-client instance store
pub struct IsmPartition {
    config: PartitionConfig,
    clients: ClientRegistry,
    descriptors: DescriptorTable,
    entries: Vec<IsmComponentData>,
    /// Logical instance count per client slot
    client_instance_counts: Vec<usize>,
    factory: Box<dyn BatchFactory>,
    transactor: Option<Box<dyn Transactor>>,
    update_depth: u32,
    was_modify_called: bool,
}

impl IsmPartition {
    /// Create an empty partition whose batches are built by `factory`
    pub fn new(factory: Box<dyn BatchFactory>, config: PartitionConfig) -> Self {
        Self {
            config,
            clients: ClientRegistry::new(),
            descriptors: DescriptorTable::new(),
            entries: Vec::new(),
            client_instance_counts: Vec::new(),
            factory,
            transactor: None,
            update_depth: 0,
            was_modify_called: false,
        }
    }

    /// Attach an undo recorder for the partition container
    pub fn with_transactor(mut self, transactor: Box<dyn Transactor>) -> Self {
        self.transactor = Some(transactor);
        self
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    // ===== CLIENTS =====

    /// Register a client, or return its handle if `guid` is already known
    pub fn register_client(&mut self, guid: Uuid) -> ClientHandle {
        let handle = self.clients.register(guid);
        let slot_count = self.clients.slot_count();
        if self.client_instance_counts.len() < slot_count {
            self.client_instance_counts.resize(slot_count, 0);
        }
        engine_debug!(LOG_SOURCE, "Registered client {} in slot {}", guid, handle.index());
        handle
    }

    /// Remove every instance of the client, then release its slot
    pub fn unregister_client(&mut self, handle: ClientHandle) {
        assert!(self.clients.is_valid(handle), "unregistering an invalid client handle {:?}", handle);

        self.remove_all_instances(handle);
        self.clients.unregister(handle);

        let slot_count = self.clients.slot_count();
        self.client_instance_counts.truncate(slot_count);
        for entry in &mut self.entries {
            if entry.client_data.len() > slot_count {
                entry.client_data.truncate(slot_count);
            }
        }
        engine_debug!(LOG_SOURCE, "Unregistered client {} from slot {}", handle.guid(), handle.index());
    }

    pub fn is_valid_handle(&self, handle: ClientHandle) -> bool {
        self.clients.is_valid(handle)
    }

    /// Number of logical instances the client currently owns
    pub fn client_instance_count(&self, handle: ClientHandle) -> usize {
        if !self.clients.is_valid(handle) {
            return 0;
        }
        self.client_instance_counts.get(handle.index()).copied().unwrap_or(0)
    }

    // ===== DESCRIPTORS =====

    /// Register a descriptor (with its hash computed) and return its index.
    ///
    /// Structurally equal descriptors share one index. Freed slots are
    /// reused before the table grows.
    pub fn register_descriptor(&mut self, descriptor: InstanceDescriptor) -> usize {
        let entries = &self.entries;
        let registration = self.descriptors.register(descriptor, |index| {
            entries.get(index).map_or(true, |entry| entry.instances.is_empty())
        });

        match registration {
            DescriptorRegistration::Existing(_) => {}
            DescriptorRegistration::Reused(index) => {
                debug_assert!(self.entries[index].batch.is_none());
                self.entries[index] = IsmComponentData::default();
                engine_debug!(LOG_SOURCE, "Reused free descriptor slot {}", index);
            }
            DescriptorRegistration::Appended(index) => {
                debug_assert_eq!(index, self.entries.len());
                self.entries.push(IsmComponentData::default());
            }
        }

        registration.index()
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    pub fn descriptor(&self, index: usize) -> Option<&InstanceDescriptor> {
        self.descriptors.get(index)
    }

    /// Batch currently backing a descriptor, if any
    pub fn batch(&self, descriptor_index: usize) -> Option<&dyn InstanceBatch> {
        self.entries.get(descriptor_index)?.batch.as_deref()
    }

    /// Number of instances stored for a descriptor, all clients combined
    pub fn instance_count(&self, descriptor_index: usize) -> usize {
        self.entries
            .get(descriptor_index)
            .map_or(0, |entry| entry.instances.len())
    }

    // ===== INSTANCES =====

    /// Pre-allocate room for `count` more instances of `definition`.
    ///
    /// Creates missing batches but adds no instances. Descriptors with no
    /// local transform are skipped.
    pub fn reserve_instances(&mut self, handle: ClientHandle, count: usize, definition: &InstanceDefinition) {
        assert!(self.clients.is_valid(handle), "invalid client handle {:?}", handle);
        let client_index = handle.index();

        for (&descriptor_index, local_transforms) in definition {
            if local_transforms.is_empty() {
                continue;
            }
            self.create_batch_if_needed(descriptor_index);

            let entry = &mut self.entries[descriptor_index];
            let per_instance = local_transforms.len();
            if let Some(batch) = entry.batch.as_mut() {
                batch.pre_allocate_instances_memory(count * per_instance);
            }
            entry.instances.reserve(count * per_instance);
            Self::client_data_mut(entry, client_index).instances.reserve(count);
        }
    }

    /// Add one logical instance placed at `world_transform`.
    ///
    /// Every local transform of `definition` is applied before the world
    /// transform. Descriptors listing no local transform get no batch.
    /// Returns the client-local index of the new instance.
    pub fn add_instance(
        &mut self,
        handle: ClientHandle,
        world_transform: Mat4,
        definition: &InstanceDefinition,
    ) -> usize {
        assert!(self.clients.is_valid(handle), "invalid client handle {:?}", handle);
        self.modify_container();

        let client_index = handle.index();
        let instance_index = self.client_instance_counts[client_index];

        for (&descriptor_index, local_transforms) in definition {
            if local_transforms.is_empty() {
                continue;
            }
            self.create_batch_if_needed(descriptor_index);

            let depth = self.update_depth;
            let entry = &mut self.entries[descriptor_index];
            entry.modify(depth);

            let client_data = Self::client_data_mut(entry, client_index);
            client_data.instances.resize_with(instance_index, ClientInstance::default);

            let IsmComponentData { batch, instances, client_data, .. } = entry;
            let batch = match batch.as_mut() {
                Some(batch) => batch,
                None => unreachable!("batch created above"),
            };

            let mut component_indices = Vec::with_capacity(local_transforms.len());
            for (sub_index, local) in local_transforms.iter().enumerate() {
                let batch_index = batch.add_instance_world_space(world_transform * *local);
                debug_assert_eq!(batch_index, instances.len(), "batch index out of sync with instance array");
                instances.push(ComponentInstance { client_index, instance_index, sub_index });
                component_indices.push(batch_index);
            }
            client_data[client_index].instances.push(ClientInstance { component_indices });
        }

        self.client_instance_counts[client_index] += 1;
        instance_index
    }

    /// Remove one logical instance from every descriptor it spans.
    ///
    /// The client's last instance takes the freed ordinal. Returns true when
    /// the client has no instances left.
    pub fn remove_instance(&mut self, handle: ClientHandle, instance_index: usize) -> bool {
        assert!(self.clients.is_valid(handle), "invalid client handle {:?}", handle);
        let client_index = handle.index();
        let instance_count = self.client_instance_counts[client_index];
        self.assert_instance_in_range(client_index, instance_index);

        self.modify_container();
        let depth = self.update_depth;

        for descriptor_index in 0..self.entries.len() {
            if !self.entries[descriptor_index].has_client_data(client_index) {
                continue;
            }

            let entry = &mut self.entries[descriptor_index];
            entry.modify(depth);
            entry.client_data[client_index]
                .instances
                .resize_with(instance_count, ClientInstance::default);

            let IsmComponentData { batch, instances, client_data, .. } = entry;

            while let Some(&batch_index) = client_data[client_index].instances[instance_index]
                .component_indices
                .last()
            {
                let batch = match batch.as_mut() {
                    Some(batch) => batch,
                    None => panic!("descriptor {} holds instances without a batch", descriptor_index),
                };
                batch.remove_instance(batch_index);

                if batch.supports_remove_swap() {
                    instances.swap_remove(batch_index);
                    if let Some(moved) = instances.get(batch_index).copied() {
                        client_data[moved.client_index].instances[moved.instance_index]
                            .component_indices[moved.sub_index] = batch_index;
                    }
                } else {
                    instances.remove(batch_index);
                    for (shifted_index, shifted) in instances.iter().enumerate().skip(batch_index) {
                        client_data[shifted.client_index].instances[shifted.instance_index]
                            .component_indices[shifted.sub_index] = shifted_index;
                    }
                }

                client_data[client_index].instances[instance_index]
                    .component_indices
                    .pop();
            }

            let client_instances = &mut client_data[client_index].instances;
            client_instances.swap_remove(instance_index);
            if let Some(moved) = client_instances.get(instance_index) {
                for &batch_index in &moved.component_indices {
                    instances[batch_index].instance_index = instance_index;
                }
            }

            if depth == 0 {
                self.destroy_component_if_empty(descriptor_index);
            }
        }

        self.client_instance_counts[client_index] -= 1;
        self.client_instance_counts[client_index] == 0
    }

    /// Remove every instance the client owns and release its storage
    pub fn remove_all_instances(&mut self, handle: ClientHandle) {
        assert!(self.clients.is_valid(handle), "invalid client handle {:?}", handle);
        let client_index = handle.index();

        while self.client_instance_counts[client_index] > 0 {
            let last = self.client_instance_counts[client_index] - 1;
            self.remove_instance(handle, last);
        }

        for entry in &mut self.entries {
            if let Some(data) = entry.client_data.get_mut(client_index) {
                *data = ClientData::default();
            }
        }
    }

    /// Move a logical instance to `world_transform`.
    ///
    /// `teleport` is forwarded to the batch untouched.
    pub fn set_instance_transform(
        &mut self,
        handle: ClientHandle,
        instance_index: usize,
        world_transform: Mat4,
        teleport: bool,
        definition: &InstanceDefinition,
    ) {
        assert!(self.clients.is_valid(handle), "invalid client handle {:?}", handle);
        let client_index = handle.index();
        self.assert_instance_in_range(client_index, instance_index);
        self.modify_container();

        let depth = self.update_depth;

        for (&descriptor_index, local_transforms) in definition {
            let entry = &mut self.entries[descriptor_index];
            entry.modify(depth);

            let IsmComponentData { batch, client_data, .. } = entry;
            let (Some(batch), Some(client_instance)) = (
                batch.as_mut(),
                client_data
                    .get(client_index)
                    .and_then(|data| data.instances.get(instance_index)),
            ) else {
                continue;
            };

            for (sub_index, local) in local_transforms.iter().enumerate() {
                if let Some(&batch_index) = client_instance.component_indices.get(sub_index) {
                    batch.update_instance_transform(batch_index, world_transform * *local, teleport);
                }
            }
        }
    }

    /// Forward a selection state to every batch slot of the given instances
    pub fn select_instances(&mut self, handle: ClientHandle, select: bool, instance_indices: &[usize]) {
        if !self.clients.is_valid(handle) {
            return;
        }
        let client_index = handle.index();
        for &instance_index in instance_indices {
            self.assert_instance_in_range(client_index, instance_index);
        }

        for entry in &mut self.entries {
            let IsmComponentData { batch, client_data, .. } = entry;
            let (Some(batch), Some(data)) = (batch.as_mut(), client_data.get(client_index)) else {
                continue;
            };
            for &instance_index in instance_indices {
                if let Some(client_instance) = data.instances.get(instance_index) {
                    for &batch_index in &client_instance.component_indices {
                        batch.select_instance(select, batch_index);
                    }
                }
            }
        }
    }

    /// Client-local index owning `batch_index` in a descriptor's batch.
    ///
    /// `None` if the handle is stale or the slot belongs to another client.
    pub fn get_instance_index(
        &self,
        handle: ClientHandle,
        descriptor_index: usize,
        batch_index: usize,
    ) -> Option<usize> {
        if !self.clients.is_valid(handle) {
            return None;
        }
        self.entries
            .get(descriptor_index)?
            .instances
            .get(batch_index)
            .filter(|owner| owner.client_index == handle.index())
            .map(|owner| owner.instance_index)
    }

    /// World bounds covering every batch slot of the given instances
    pub fn get_instance_bounds(&self, handle: ClientHandle, instance_indices: &[usize]) -> Option<AABB> {
        if !self.clients.is_valid(handle) {
            return None;
        }
        let client_index = handle.index();
        let mut bounds: Option<AABB> = None;

        for entry in &self.entries {
            let (Some(batch), Some(data)) = (entry.batch.as_deref(), entry.client_data.get(client_index)) else {
                continue;
            };
            let Some(mesh_bounds) = batch.static_mesh_bounds() else {
                continue;
            };
            for &instance_index in instance_indices {
                let Some(client_instance) = data.instances.get(instance_index) else {
                    continue;
                };
                for &batch_index in &client_instance.component_indices {
                    if let Some(transform) = batch.instance_transform(batch_index, true) {
                        let instance_bounds = mesh_bounds.transformed(&transform);
                        bounds = Some(match bounds {
                            Some(current) => current.union(&instance_bounds),
                            None => instance_bounds,
                        });
                    }
                }
            }
        }

        bounds
    }

    /// World transform of one batch slot of a logical instance
    pub fn instance_transform(
        &self,
        handle: ClientHandle,
        instance_index: usize,
        descriptor_index: usize,
        sub_index: usize,
    ) -> Option<Mat4> {
        if !self.clients.is_valid(handle) {
            return None;
        }
        let entry = self.entries.get(descriptor_index)?;
        let batch_index = *entry
            .client_data
            .get(handle.index())?
            .instances
            .get(instance_index)?
            .component_indices
            .get(sub_index)?;
        entry.batch.as_deref()?.instance_transform(batch_index, true)
    }

    /// Descriptor indices whose batches hold at least one of the client's instances
    pub fn client_batches(&self, handle: ClientHandle) -> Vec<usize> {
        let mut result = Vec::new();
        self.for_each_client_batch(handle, |descriptor_index, _| result.push(descriptor_index));
        result
    }

    /// Visit every batch holding at least one of the client's instances
    pub fn for_each_client_batch<F>(&self, handle: ClientHandle, mut f: F)
    where
        F: FnMut(usize, &dyn InstanceBatch),
    {
        if !self.clients.is_valid(handle) {
            return;
        }
        let client_index = handle.index();

        for (descriptor_index, entry) in self.entries.iter().enumerate() {
            let Some(batch) = entry.batch.as_deref() else {
                continue;
            };
            let owns_any = entry.client_data.get(client_index).map_or(false, |data| {
                data.instances
                    .iter()
                    .any(|instance| !instance.component_indices.is_empty())
            });
            if owns_any {
                f(descriptor_index, batch);
            }
        }
    }

    // ===== UPDATE SCOPES =====

    /// Open an update scope closed when the returned guard drops
    pub fn begin_update(&mut self) -> UpdateScope<'_> {
        UpdateScope::new(self)
    }

    /// Open an update scope. Must be balanced by `end_update_raw`.
    pub fn begin_update_raw(&mut self) {
        if self.update_depth == 0 {
            for entry in &mut self.entries {
                if let Some(batch) = entry.batch.as_mut() {
                    if batch.supports_incremental_rebuild() {
                        entry.auto_rebuild_snapshot = Some(batch.auto_rebuild_on_change());
                        batch.set_auto_rebuild_on_change(false);
                    }
                }
            }
        }
        self.update_depth += 1;
    }

    /// Close an update scope opened by `begin_update_raw`.
    ///
    /// Closing the outermost scope restores auto-rebuild, rebuilds every
    /// modified tree once and destroys batches left empty.
    pub fn end_update_raw(&mut self) {
        assert!(self.update_depth > 0, "end_update without a matching begin_update");
        self.update_depth -= 1;
        if self.update_depth > 0 {
            return;
        }

        let build_async = self.config.build_tree_async;
        for (descriptor_index, entry) in self.entries.iter_mut().enumerate() {
            if let Some(batch) = entry.batch.as_mut() {
                if let Some(auto_rebuild) = entry.auto_rebuild_snapshot.take() {
                    batch.set_auto_rebuild_on_change(auto_rebuild);
                    if entry.was_modify_called {
                        engine_trace!(LOG_SOURCE, "Rebuilding tree of descriptor {}", descriptor_index);
                        batch.build_tree_if_outdated(build_async, true);
                    }
                }
            }
            entry.auto_rebuild_snapshot = None;
            entry.was_modify_called = false;
        }
        self.was_modify_called = false;

        for descriptor_index in 0..self.entries.len() {
            self.destroy_component_if_empty(descriptor_index);
        }
    }

    /// Current update scope nesting depth
    pub fn update_depth(&self) -> u32 {
        self.update_depth
    }

    /// Rebuild the acceleration tree of every live batch
    pub fn update_trees(&mut self, build_async: bool, force: bool) {
        for batch in self.entries.iter_mut().filter_map(|entry| entry.batch.as_mut()) {
            batch.build_tree_if_outdated(build_async, force);
        }
    }

    // ===== DIAGNOSTICS =====

    pub fn stats(&self) -> PartitionStats {
        PartitionStats {
            descriptor_slots: self.descriptors.len(),
            live_descriptors: self.descriptors.live_count(),
            free_descriptor_slots: self.descriptors.free_count(),
            live_batches: self.entries.iter().filter(|entry| entry.batch.is_some()).count(),
            total_instances: self.entries.iter().map(|entry| entry.instances.len()).sum(),
            registered_clients: self.clients.client_count(),
            client_instance_counts: self
                .clients
                .handles()
                .map(|handle| (handle, self.client_instance_counts[handle.index()]))
                .collect(),
        }
    }

    /// Check the back-reference and count invariants.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (descriptor_index, entry) in self.entries.iter().enumerate() {
            match entry.batch.as_deref() {
                Some(batch) if batch.instance_count() != entry.instances.len() => {
                    return Err(format!(
                        "descriptor {}: batch holds {} instances, store holds {}",
                        descriptor_index,
                        batch.instance_count(),
                        entry.instances.len()
                    ));
                }
                None if !entry.instances.is_empty() => {
                    return Err(format!(
                        "descriptor {}: {} instances without a batch",
                        descriptor_index,
                        entry.instances.len()
                    ));
                }
                _ => {}
            }

            for (batch_index, owner) in entry.instances.iter().enumerate() {
                let back_reference = entry
                    .client_data
                    .get(owner.client_index)
                    .and_then(|data| data.instances.get(owner.instance_index))
                    .and_then(|instance| instance.component_indices.get(owner.sub_index));
                if back_reference != Some(&batch_index) {
                    return Err(format!(
                        "descriptor {}: slot {} owned by {:?} points back to {:?}",
                        descriptor_index, batch_index, owner, back_reference
                    ));
                }
            }

            for (client_index, data) in entry.client_data.iter().enumerate() {
                let instance_count = self.client_instance_counts.get(client_index).copied().unwrap_or(0);
                if data.instances.len() > instance_count {
                    return Err(format!(
                        "descriptor {}: client {} has {} instances but owns {}",
                        descriptor_index,
                        client_index,
                        data.instances.len(),
                        instance_count
                    ));
                }
            }
        }
        Ok(())
    }

    // ===== INTERNALS =====

    fn assert_instance_in_range(&self, client_index: usize, instance_index: usize) {
        let instance_count = self.client_instance_counts[client_index];
        assert!(
            instance_index < instance_count,
            "client instance {} out of range ({} instances)",
            instance_index,
            instance_count
        );
    }

    fn client_data_mut(entry: &mut IsmComponentData, client_index: usize) -> &mut ClientData {
        if entry.client_data.len() <= client_index {
            entry.client_data.resize_with(client_index + 1, ClientData::default);
        }
        &mut entry.client_data[client_index]
    }

    fn modify_container(&mut self) {
        if !self.was_modify_called {
            if let Some(transactor) = self.transactor.as_mut() {
                transactor.modify();
            }
            self.was_modify_called = self.update_depth > 0;
        }
    }

    fn create_batch_if_needed(&mut self, descriptor_index: usize) {
        assert!(
            descriptor_index < self.entries.len(),
            "descriptor index {} was never registered",
            descriptor_index
        );
        if self.entries[descriptor_index].batch.is_some() {
            return;
        }

        if self.descriptors.revive(descriptor_index) {
            engine_debug!(LOG_SOURCE, "Revived freed descriptor slot {}", descriptor_index);
        }

        let mut batch = self
            .factory
            .create_batch(descriptor_index, &self.descriptors[descriptor_index]);
        let entry = &mut self.entries[descriptor_index];
        if self.update_depth > 0 && batch.supports_incremental_rebuild() {
            entry.auto_rebuild_snapshot = Some(batch.auto_rebuild_on_change());
            batch.set_auto_rebuild_on_change(false);
        }
        entry.batch = Some(batch);
        engine_debug!(LOG_SOURCE, "Created batch for descriptor {}", descriptor_index);
    }

    fn destroy_component_if_empty(&mut self, descriptor_index: usize) {
        let entry = &mut self.entries[descriptor_index];
        if !entry.instances.is_empty() {
            return;
        }
        let Some(batch) = entry.batch.take() else {
            return;
        };

        entry.client_data.clear();
        entry.auto_rebuild_snapshot = None;
        entry.was_modify_called = false;
        self.factory.destroy_batch(descriptor_index, batch);
        self.descriptors.free(descriptor_index);
        engine_debug!(LOG_SOURCE, "Destroyed empty batch of descriptor {}", descriptor_index);
    }
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
