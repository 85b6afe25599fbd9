use super::client_registry::ClientHandle;

/// Snapshot of partition occupancy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Descriptor table slots, live and free
    pub descriptor_slots: usize,
    pub live_descriptors: usize,
    pub free_descriptor_slots: usize,
    /// Descriptors currently backed by a batch
    pub live_batches: usize,
    /// Batch slots across every descriptor
    pub total_instances: usize,
    pub registered_clients: usize,
    /// Logical instance count per registered client
    pub client_instance_counts: Vec<(ClientHandle, usize)>,
}

impl PartitionStats {
    /// Average batch slots per live batch
    pub fn instances_per_batch(&self) -> f32 {
        if self.live_batches == 0 {
            0.0
        } else {
            self.total_instances as f32 / self.live_batches as f32
        }
    }
}
