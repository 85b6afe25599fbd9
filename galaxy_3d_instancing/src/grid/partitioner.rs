/// Assignment of actor clusters to grid cells.

use glam::DVec2;
use crate::engine_warn;
use crate::error::Result;
use crate::math::{Box2D, AABB};
use super::actor_cluster::ActorClusterInstance;
use super::square_grid_helper::SquareGridHelper;

const LOG_SOURCE: &str = "galaxy3d::GridPartitioner";

/// Grid partitioning settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// Keep cell edges of every level aligned. When off, each level below
    /// the top gets one extra cell per side.
    pub use_aligned_grid_levels: bool,
    /// Place spatially loaded clusters no larger than one level-0 cell by
    /// their center point
    pub place_small_actors_using_location: bool,
    /// Place partition actors by their center point
    pub place_partition_actors_using_location: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            use_aligned_grid_levels: true,
            place_small_actors_using_location: false,
            place_partition_actors_using_location: true,
        }
    }
}

/// A named runtime streaming grid
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeGridDesc {
    pub name: String,
    pub origin: DVec2,
    /// Level-0 cell size in world units
    pub cell_size: i64,
}

impl RuntimeGridDesc {
    pub fn new(name: impl Into<String>, cell_size: i64) -> Self {
        Self {
            name: name.into(),
            origin: DVec2::ZERO,
            cell_size,
        }
    }
}

/// Whether a cluster is placed by its center point rather than by its bounds
pub fn should_actor_use_location_placement(
    cluster: &ActorClusterInstance,
    bounds: &Box2D,
    cell_size: i64,
    config: &GridConfig,
) -> bool {
    if cluster.is_partition_actor {
        return config.place_partition_actors_using_location;
    }
    if config.place_small_actors_using_location {
        let cell_area = (cell_size as f64) * (cell_size as f64);
        return bounds.area() <= cell_area;
    }
    false
}

/// Build the grid hierarchy for `grid` and place every cluster in one cell.
///
/// Clusters that are not spatially loaded, or too large for every level,
/// go to the always-loaded cell. Oversized clusters are reported with a
/// warning.
pub fn get_partitioned_actors<'a>(
    world_bounds: &AABB,
    grid: &RuntimeGridDesc,
    clusters: &'a [ActorClusterInstance],
    config: &GridConfig,
) -> Result<SquareGridHelper<'a>> {
    let mut helper = SquareGridHelper::new(
        world_bounds,
        grid.origin,
        grid.cell_size,
        config.use_aligned_grid_levels,
    )?;

    for cluster in clusters {
        if !cluster.is_spatially_loaded {
            helper.always_loaded_cell_mut().add_actor_set_instance(cluster);
            continue;
        }

        let bounds = cluster.bounds_2d();
        let placed = if should_actor_use_location_placement(cluster, &bounds, grid.cell_size, config) {
            place_by_location(&mut helper, cluster, &bounds)
        } else {
            place_by_bounds(&mut helper, cluster, &bounds)
        };

        if !placed {
            let size = bounds.size();
            let actors: Vec<String> = cluster.actors.iter().map(|actor| actor.to_string()).collect();
            engine_warn!(
                LOG_SOURCE,
                "Actor(s) [{}] from {} placed in always loaded cell of grid '{}' because they are too big ({:.0} x {:.0})",
                actors.join(", "),
                cluster.container.package,
                grid.name,
                size.x,
                size.y
            );
            helper.always_loaded_cell_mut().add_actor_set_instance(cluster);
        }
    }

    Ok(helper)
}

fn place_by_location<'a>(
    helper: &mut SquareGridHelper<'a>,
    cluster: &'a ActorClusterInstance,
    bounds: &Box2D,
) -> bool {
    let level = helper.lowest_level_mut();
    match level.cell_coords(bounds.center()) {
        Some(coords) => {
            level.cell_mut(coords).add_actor_set_instance(cluster);
            true
        }
        None => false,
    }
}

/// Place in the first level, from the smallest that could hold the cluster,
/// where its bounds touch exactly one cell
fn place_by_bounds<'a>(
    helper: &mut SquareGridHelper<'a>,
    cluster: &'a ActorClusterInstance,
    bounds: &Box2D,
) -> bool {
    let size = bounds.size();
    let min_required_extent = size.x.max(size.y);
    let first_level = (min_required_extent / helper.cell_size() as f64)
        .log2()
        .ceil()
        .max(0.0) as usize;

    for level_index in first_level..helper.level_count() {
        let Some(level) = helper.level_mut(level_index) else {
            break;
        };
        if level.num_intersecting_cells(bounds) != 1 {
            continue;
        }
        if let Some((coords, _)) = level.cell_coords_range(bounds) {
            level.cell_mut(coords).add_actor_set_instance(cluster);
            return true;
        }
    }
    false
}

#[cfg(test)]
#[path = "partitioner_tests.rs"]
mod tests;
