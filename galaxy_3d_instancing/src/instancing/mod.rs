mod client_registry;
mod descriptor;
mod descriptor_table;
mod instance_batch;
mod partition;
mod stats;
mod update_scope;

#[cfg(test)]
pub(crate) mod mock_batch;

pub use client_registry::{ClientHandle, ClientRegistry};
pub use descriptor::{
    BatchKind, BodyInstanceSummary, CollisionEnabled, DescriptorFlags, InstanceDescriptor,
    LightingChannels, MaterialRef, Mobility, StaticMeshRef,
};
pub use descriptor_table::{DescriptorRegistration, DescriptorTable};
pub use instance_batch::{BatchFactory, InstanceBatch, Transactor};
pub use partition::{
    ClientData, ClientInstance, ComponentInstance, InstanceDefinition, IsmPartition, PartitionConfig,
};
pub use stats::PartitionStats;
pub use update_scope::UpdateScope;
