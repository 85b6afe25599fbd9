/// Foliage client of the instance partition.
///
/// A `FoliageIsmActor` renders one foliage type whose template is an actor
/// class. Every static-mesh part of the template becomes one descriptor,
/// and each foliage instance fans out to every part, offset by the part's
/// transform relative to the template root.

use std::collections::BTreeSet;
use glam::Mat4;
use uuid::Uuid;
use crate::error::Result;
use crate::instancing::{ClientHandle, InstanceDefinition, InstanceDescriptor, IsmPartition};
use crate::math::AABB;
use crate::{engine_debug, engine_err, engine_warn};
use super::template::{
    CompileSubscription, FoliageTemplateDesc, StaticMeshSubComponent, TemplateEnvironment,
};

const LOG_SOURCE: &str = "galaxy3d::FoliageIsmActor";

pub struct FoliageIsmActor {
    /// Client identity, stable across reapply
    guid: Uuid,
    template_desc: Option<FoliageTemplateDesc>,
    client_handle: Option<ClientHandle>,
    /// Local transforms of one foliage instance, per descriptor
    definition: InstanceDefinition,
    /// Descriptors as registered, in template part order
    registered_descriptors: Vec<(usize, InstanceDescriptor)>,
    /// Parts of the last spawned template, relative data already resolved
    template_components: Vec<StaticMeshSubComponent>,
    template_transform: Mat4,
    compile_subscription: Option<CompileSubscription>,
    /// World transform of every foliage instance; index is the client-local index
    instances: Vec<Mat4>,
    selected: BTreeSet<usize>,
}

impl FoliageIsmActor {
    pub fn new(guid: Uuid) -> Self {
        Self {
            guid,
            template_desc: None,
            client_handle: None,
            definition: InstanceDefinition::new(),
            registered_descriptors: Vec::new(),
            template_components: Vec::new(),
            template_transform: Mat4::IDENTITY,
            compile_subscription: None,
            instances: Vec::new(),
            selected: BTreeSet::new(),
        }
    }

    // ===== LIFECYCLE =====

    /// Spawn the template once, register its descriptors and the client.
    ///
    /// # Panics
    ///
    /// Panics if already initialized.
    pub fn initialize(
        &mut self,
        desc: &FoliageTemplateDesc,
        partition: &mut IsmPartition,
        env: &mut TemplateEnvironment<'_>,
    ) -> Result<()> {
        assert!(self.client_handle.is_none(), "foliage actor {} is already initialized", self.guid);

        let actor = env
            .host
            .spawn_transient(&desc.class)
            .ok_or_else(|| engine_err!(LOG_SOURCE, "Cannot spawn template {}", desc.class))?;
        self.template_transform = actor.transform;
        self.template_components = actor.components.clone();
        env.host.destroy_transient(actor);

        self.register_template(desc, partition);
        self.compile_subscription = Some(env.classes.subscribe(&desc.class));
        self.template_desc = Some(desc.clone());
        Ok(())
    }

    fn register_template(&mut self, desc: &FoliageTemplateDesc, partition: &mut IsmPartition) {
        let to_template = self.template_transform.inverse();

        for component in &self.template_components {
            let Some(descriptor) = InstanceDescriptor::from_sub_component(&desc.overrides, component) else {
                engine_warn!(
                    LOG_SOURCE,
                    "Sub-component '{}' of template {} has no static mesh, skipped",
                    component.name,
                    desc.class
                );
                continue;
            };

            let descriptor_index = partition.register_descriptor(descriptor.clone());
            let local_transforms = self.definition.entry(descriptor_index).or_default();
            if component.instance_transforms.is_empty() {
                local_transforms.push(to_template * component.world_transform);
            } else {
                local_transforms.extend(component.instance_transforms.iter().map(|t| to_template * *t));
            }
            self.registered_descriptors.push((descriptor_index, descriptor));
        }

        if self.definition.is_empty() {
            engine_warn!(LOG_SOURCE, "Template {} has no renderable static mesh components", desc.class);
        }

        let handle = partition.register_client(self.guid);
        engine_debug!(
            LOG_SOURCE,
            "Initialized template {} with {} descriptor(s)",
            desc.class,
            self.definition.len()
        );
        self.client_handle = Some(handle);
    }

    /// Remove every instance from the partition and drop the registration.
    ///
    /// The instance list is kept so a later reapply can restore it.
    pub fn uninitialize(&mut self, partition: &mut IsmPartition, env: &mut TemplateEnvironment<'_>) {
        if let Some(handle) = self.client_handle.take() {
            partition.unregister_client(handle);
        }
        if let Some(subscription) = self.compile_subscription.take() {
            env.classes.unsubscribe(subscription.key());
        }
        self.definition.clear();
        self.registered_descriptors.clear();
    }

    /// Re-initialize from `desc` and re-add every instance in one update scope
    pub fn reapply(
        &mut self,
        desc: &FoliageTemplateDesc,
        partition: &mut IsmPartition,
        env: &mut TemplateEnvironment<'_>,
    ) -> Result<()> {
        if self.is_initialized() {
            self.uninitialize(partition, env);
        }
        self.initialize(desc, partition, env)?;

        let handle = self.handle();
        let mut scope = partition.begin_update();
        scope.reserve_instances(handle, self.instances.len(), &self.definition);
        for transform in &self.instances {
            scope.add_instance(handle, *transform, &self.definition);
        }
        Ok(())
    }

    /// React to an edit of the foliage type.
    ///
    /// Without `source_definitely_changed`, descriptors are re-derived from
    /// the cached template parts and compared with the registered ones, so
    /// edits that touch no descriptor field are ignored.
    pub fn notify_template_changed(
        &mut self,
        desc: &FoliageTemplateDesc,
        source_definitely_changed: bool,
        partition: &mut IsmPartition,
        env: &mut TemplateEnvironment<'_>,
    ) -> Result<()> {
        if !self.is_initialized() {
            return Ok(());
        }

        let changed = source_definitely_changed
            || self.template_desc.as_ref().map_or(true, |current| current.class != desc.class)
            || self.descriptors_differ(desc);

        if changed {
            self.reapply(desc, partition, env)?;
            self.restore_selection(partition);
        } else {
            self.template_desc = Some(desc.clone());
        }
        Ok(())
    }

    fn descriptors_differ(&self, desc: &FoliageTemplateDesc) -> bool {
        let rederived: Vec<InstanceDescriptor> = self
            .template_components
            .iter()
            .filter_map(|component| InstanceDescriptor::from_sub_component(&desc.overrides, component))
            .collect();

        rederived.len() != self.registered_descriptors.len()
            || rederived
                .iter()
                .zip(&self.registered_descriptors)
                .any(|(fresh, (_, registered))| fresh != registered)
    }

    /// Reapply if the template class was recompiled since the last call.
    ///
    /// Returns true when a reapply happened.
    pub fn on_template_compiled(
        &mut self,
        partition: &mut IsmPartition,
        env: &mut TemplateEnvironment<'_>,
    ) -> Result<bool> {
        let pending = self
            .compile_subscription
            .as_ref()
            .map_or(false, CompileSubscription::take_pending);
        let Some(desc) = self.template_desc.clone().filter(|_| pending) else {
            return Ok(false);
        };

        self.reapply(&desc, partition, env)?;
        self.restore_selection(partition);
        Ok(true)
    }

    fn restore_selection(&self, partition: &mut IsmPartition) {
        if self.selected.is_empty() {
            return;
        }
        let selected: Vec<usize> = self.selected.iter().copied().collect();
        partition.select_instances(self.handle(), true, &selected);
    }

    /// Re-register descriptors whose partition slot was freed or reused.
    ///
    /// A slot is freed once its last instance goes, and any later
    /// registration may take it over. Only slots this actor has no
    /// instance in can be in that state, so remapping `definition` is
    /// enough.
    fn sync_descriptors(&mut self, partition: &mut IsmPartition) {
        let stale: Vec<usize> = self
            .registered_descriptors
            .iter()
            .enumerate()
            .filter(|(_, (index, descriptor))| {
                !matches!(partition.descriptor(*index), Some(live) if !live.is_free() && live == descriptor)
            })
            .map(|(position, _)| position)
            .collect();
        if stale.is_empty() {
            return;
        }

        let mut remap: Vec<(usize, usize)> = Vec::with_capacity(stale.len());
        for position in stale {
            let (old_index, descriptor) = &mut self.registered_descriptors[position];
            let new_index = partition.register_descriptor(descriptor.clone());
            engine_debug!(
                LOG_SOURCE,
                "Descriptor slot {} went stale, re-registered at {}",
                old_index,
                new_index
            );
            remap.push((*old_index, new_index));
            *old_index = new_index;
        }

        let mut definition = InstanceDefinition::new();
        for (old_index, local_transforms) in std::mem::take(&mut self.definition) {
            let index = remap
                .iter()
                .find(|(from, _)| *from == old_index)
                .map_or(old_index, |(_, to)| *to);
            definition.entry(index).or_default().extend(local_transforms);
        }
        self.definition = definition;
    }

    // ===== INSTANCES =====

    /// Add one foliage instance. Returns its index.
    pub fn add_instance(&mut self, partition: &mut IsmPartition, transform: Mat4) -> usize {
        self.sync_descriptors(partition);
        let index = partition.add_instance(self.handle(), transform, &self.definition);
        self.instances.push(transform);
        debug_assert_eq!(index + 1, self.instances.len());
        index
    }

    /// Add several foliage instances inside one update scope
    pub fn add_instances(&mut self, partition: &mut IsmPartition, transforms: &[Mat4]) {
        let handle = self.handle();
        self.sync_descriptors(partition);
        let mut scope = partition.begin_update();
        scope.reserve_instances(handle, transforms.len(), &self.definition);
        for transform in transforms {
            scope.add_instance(handle, *transform, &self.definition);
            self.instances.push(*transform);
        }
    }

    /// Remove one foliage instance; the last instance takes its index.
    ///
    /// Returns true when no instance is left.
    pub fn remove_instance(&mut self, partition: &mut IsmPartition, index: usize) -> bool {
        let is_empty = partition.remove_instance(self.handle(), index);
        self.instances.swap_remove(index);

        let last = self.instances.len();
        self.selected.remove(&index);
        if last != index && self.selected.remove(&last) {
            self.selected.insert(index);
        }
        is_empty
    }

    /// Remove several foliage instances inside one update scope
    pub fn remove_instances(&mut self, partition: &mut IsmPartition, indices: &[usize]) {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        partition.begin_update_raw();
        for index in sorted {
            self.remove_instance(partition, index);
        }
        partition.end_update_raw();
    }

    pub fn set_instance_world_transform(
        &mut self,
        partition: &mut IsmPartition,
        index: usize,
        transform: Mat4,
        teleport: bool,
    ) {
        self.instances[index] = transform;
        partition.set_instance_transform(self.handle(), index, transform, teleport, &self.definition);
    }

    pub fn select_instance(&mut self, partition: &mut IsmPartition, select: bool, index: usize) {
        self.select_instances(partition, select, &[index]);
    }

    pub fn select_instances(&mut self, partition: &mut IsmPartition, select: bool, indices: &[usize]) {
        for &index in indices {
            if select {
                self.selected.insert(index);
            } else {
                self.selected.remove(&index);
            }
        }
        partition.select_instances(self.handle(), select, indices);
    }

    /// Foliage instance owning slot `batch_index` of a descriptor's batch
    pub fn instance_index_from_batch(
        &self,
        partition: &IsmPartition,
        descriptor_index: usize,
        batch_index: usize,
    ) -> Option<usize> {
        partition.get_instance_index(self.client_handle?, descriptor_index, batch_index)
    }

    /// World bounds of the selected instances
    pub fn selection_bounds(&self, partition: &IsmPartition) -> Option<AABB> {
        let selected: Vec<usize> = self.selected.iter().copied().collect();
        partition.get_instance_bounds(self.client_handle?, &selected)
    }

    /// Capacity hint for `count` upcoming instances
    pub fn pre_add_instances(&mut self, partition: &mut IsmPartition, count: usize) {
        self.sync_descriptors(partition);
        partition.reserve_instances(self.handle(), count, &self.definition);
    }

    pub fn begin_update(&self, partition: &mut IsmPartition) {
        partition.begin_update_raw();
    }

    pub fn end_update(&self, partition: &mut IsmPartition) {
        partition.end_update_raw();
    }

    /// Descriptor indices of the batches currently rendering this foliage
    pub fn client_batches(&self, partition: &IsmPartition) -> Vec<usize> {
        match self.client_handle {
            Some(handle) => partition.client_batches(handle),
            None => Vec::new(),
        }
    }

    // ===== ACCESSORS =====

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    pub fn is_initialized(&self) -> bool {
        self.client_handle.is_some()
    }

    pub fn client_handle(&self) -> Option<ClientHandle> {
        self.client_handle
    }

    pub fn template_desc(&self) -> Option<&FoliageTemplateDesc> {
        self.template_desc.as_ref()
    }

    pub fn definition(&self) -> &InstanceDefinition {
        &self.definition
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    pub fn selected_instances(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    fn handle(&self) -> ClientHandle {
        match self.client_handle {
            Some(handle) => handle,
            None => panic!("foliage actor {} is not initialized", self.guid),
        }
    }
}

#[cfg(test)]
#[path = "foliage_ism_actor_tests.rs"]
mod tests;
