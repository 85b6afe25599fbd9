mod actor_cluster;
mod cell_coord;
mod grid_level;
mod partitioner;
mod square_grid_helper;

pub use actor_cluster::{ActorClusterInstance, ContainerInstanceRef, DataLayerRef};
pub use cell_coord::{GridCellCoord, GridCellCoord2};
pub use grid_level::{GridCell, GridCellDataChunk, GridLevel};
pub use partitioner::{get_partitioned_actors, should_actor_use_location_placement, GridConfig, RuntimeGridDesc};
pub use square_grid_helper::SquareGridHelper;
