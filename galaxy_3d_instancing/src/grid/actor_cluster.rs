/// Actor clusters produced by the external clustering pass.

use uuid::Uuid;
use crate::math::{Box2D, AABB};

/// Named data layer an actor belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataLayerRef(pub String);

/// Container (level instance, world) the cluster was collected from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInstanceRef {
    pub id: Uuid,
    /// Package the actors are saved in, used in diagnostics
    pub package: String,
}

/// A group of actors that must be streamed together
#[derive(Debug, Clone)]
pub struct ActorClusterInstance {
    pub actors: Vec<Uuid>,
    /// World-space bounds of every actor in the cluster
    pub bounds: AABB,
    /// Clusters that are not spatially loaded always land in the
    /// always-loaded cell
    pub is_spatially_loaded: bool,
    /// Partition actors (foliage, landscape proxies...) are small tiles
    /// that may be placed by their center point
    pub is_partition_actor: bool,
    pub container: ContainerInstanceRef,
    pub data_layers: Vec<DataLayerRef>,
}

impl ActorClusterInstance {
    /// Spatially loaded cluster with no data layers
    pub fn new(actors: Vec<Uuid>, bounds: AABB, container: ContainerInstanceRef) -> Self {
        Self {
            actors,
            bounds,
            is_spatially_loaded: true,
            is_partition_actor: false,
            container,
            data_layers: Vec::new(),
        }
    }

    /// Footprint on the XY plane
    pub fn bounds_2d(&self) -> Box2D {
        Box2D::from_aabb_xy(&self.bounds)
    }

    /// Sorted, de-duplicated copy of the data layers
    pub fn data_layer_set(&self) -> Vec<DataLayerRef> {
        let mut layers = self.data_layers.clone();
        layers.sort();
        layers.dedup();
        layers
    }
}
