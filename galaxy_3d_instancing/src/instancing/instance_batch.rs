/// Rendering primitive seam.
///
/// An `InstanceBatch` is the GPU-instanced draw batch backing one
/// descriptor. The partition never looks at concrete batch types: it asks
/// for capabilities (`supports_remove_swap`, `supports_incremental_rebuild`)
/// and branches on the answers.

use glam::Mat4;
use crate::math::AABB;
use super::descriptor::InstanceDescriptor;

/// Instanced rendering primitive consumed by the partition.
///
/// Instance indices are dense: index `i` is the i-th instance in the
/// batch's own array, and the partition mirrors that order exactly.
pub trait InstanceBatch: Send {
    /// Append an instance given its world transform. Returns its index.
    fn add_instance_world_space(&mut self, transform: Mat4) -> usize;

    /// Remove the instance at `index`.
    ///
    /// With swap support the last instance moves into `index`;
    /// otherwise every following instance shifts down by one.
    fn remove_instance(&mut self, index: usize) -> bool;

    /// Move an instance. `teleport` suppresses velocity interpolation.
    fn update_instance_transform(&mut self, index: usize, transform: Mat4, teleport: bool) -> bool;

    /// Transform of an instance, in world space or relative to the batch
    fn instance_transform(&self, index: usize, world_space: bool) -> Option<Mat4>;

    /// Number of instances currently in the batch
    fn instance_count(&self) -> usize;

    /// Set the editor selection state of one instance
    fn select_instance(&mut self, selected: bool, index: usize);

    /// Whether `remove_instance` swaps the last instance into the hole
    fn supports_remove_swap(&self) -> bool;

    /// Capacity hint for `count` more instances
    fn pre_allocate_instances_memory(&mut self, count: usize);

    /// Local-space bounds of the batch's static mesh
    fn static_mesh_bounds(&self) -> Option<AABB>;

    /// Whether the batch maintains an incrementally rebuilt acceleration tree
    fn supports_incremental_rebuild(&self) -> bool {
        false
    }

    /// Whether the tree is rebuilt automatically after each change
    fn auto_rebuild_on_change(&self) -> bool {
        true
    }

    /// Enable or disable automatic tree rebuilds
    fn set_auto_rebuild_on_change(&mut self, _enabled: bool) {}

    /// Rebuild the acceleration tree if it is stale (or always, if `force`)
    fn build_tree_if_outdated(&mut self, _async_build: bool, _force: bool) {}

    /// Record the batch's current state with the undo system
    fn modify(&mut self) {}
}

/// Creates and destroys batches on behalf of the partition
pub trait BatchFactory: Send {
    /// Create an empty batch configured from `descriptor`
    fn create_batch(
        &mut self,
        descriptor_index: usize,
        descriptor: &InstanceDescriptor,
    ) -> Box<dyn InstanceBatch>;

    /// Tear down a batch that no longer holds instances
    fn destroy_batch(&mut self, _descriptor_index: usize, batch: Box<dyn InstanceBatch>) {
        drop(batch);
    }
}

/// Undo/redo recorder for the partition container itself
pub trait Transactor: Send {
    /// Snapshot the container before it is mutated
    fn modify(&mut self);
}
