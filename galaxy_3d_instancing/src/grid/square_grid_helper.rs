/// Power-of-two hierarchy of square grids.
///
/// Level 0 has the finest cells. Each level doubles the cell size and
/// halves the cell count, up to a top level made of a single cell which
/// doubles as the always-loaded cell.

use glam::DVec2;
use rustc_hash::FxHashMap;
use uuid::Uuid;
use crate::engine_error;
use crate::error::{Error, Result};
use crate::math::{Box2D, AABB};
use super::cell_coord::{GridCellCoord, GridCellCoord2};
use super::grid_level::{GridCell, GridLevel};

#[derive(Debug, Clone)]
pub struct SquareGridHelper<'a> {
    world_bounds: AABB,
    origin: DVec2,
    cell_size: i64,
    levels: Vec<GridLevel<'a>>,
}

impl<'a> SquareGridHelper<'a> {
    /// Build the level hierarchy covering `world_bounds` around `origin`.
    ///
    /// With `use_aligned_grid_levels` off, every level below the top gets
    /// one extra cell per side so cell edges of different levels do not
    /// line up.
    pub fn new(
        world_bounds: &AABB,
        origin: DVec2,
        cell_size: i64,
        use_aligned_grid_levels: bool,
    ) -> Result<Self> {
        if cell_size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid cell size must be positive, got {}",
                cell_size
            )));
        }

        let (grid_size, level_count) = Self::compute_grid_size(world_bounds, origin, cell_size);

        let mut levels = Vec::with_capacity(level_count);
        let mut level_cell_size = cell_size;
        let mut level_grid_size = grid_size;
        for level in 0..level_count {
            let padded_grid_size = if use_aligned_grid_levels || level + 1 == level_count {
                level_grid_size
            } else {
                level_grid_size + 1
            };
            levels.push(GridLevel::new(origin, level_cell_size, padded_grid_size, level));
            level_cell_size <<= 1;
            level_grid_size >>= 1;
        }

        let mut helper = Self {
            world_bounds: *world_bounds,
            origin,
            cell_size,
            levels,
        };
        helper.always_loaded_cell_mut();
        Ok(helper)
    }

    /// Level-0 cells per side and number of levels
    fn compute_grid_size(world_bounds: &AABB, origin: DVec2, cell_size: i64) -> (i64, usize) {
        if !world_bounds.is_valid() {
            return (1, 1);
        }
        let bounds = Box2D::from_aabb_xy(world_bounds);
        let distance_min = (bounds.min - origin).abs();
        let distance_max = (bounds.max - origin).abs();
        let max_extent = distance_min.max_element().max(distance_max.max_element());
        if max_extent <= 0.0 {
            return (1, 1);
        }

        let grid_size = (2.0 * (max_extent / cell_size as f64).ceil()) as u64;
        let grid_size = grid_size.max(1).next_power_of_two();
        (grid_size as i64, grid_size.trailing_zeros() as usize + 1)
    }

    pub fn world_bounds(&self) -> &AABB {
        &self.world_bounds
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    /// Level-0 cell size
    pub fn cell_size(&self) -> i64 {
        self.cell_size
    }

    pub fn levels(&self) -> &[GridLevel<'a>] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: usize) -> Option<&GridLevel<'a>> {
        self.levels.get(level)
    }

    pub fn level_mut(&mut self, level: usize) -> Option<&mut GridLevel<'a>> {
        self.levels.get_mut(level)
    }

    pub fn lowest_level(&self) -> &GridLevel<'a> {
        &self.levels[0]
    }

    pub fn lowest_level_mut(&mut self) -> &mut GridLevel<'a> {
        &mut self.levels[0]
    }

    /// The single cell of the top level
    pub fn always_loaded_cell(&self) -> Option<&GridCell<'a>> {
        self.levels.last()?.cell(GridCellCoord2::new(0, 0))
    }

    pub fn always_loaded_cell_mut(&mut self) -> &mut GridCell<'a> {
        let top = self.levels.len() - 1;
        self.levels[top].cell_mut(GridCellCoord2::new(0, 0))
    }

    /// Whether `coords` designates the always-loaded cell
    pub fn is_always_loaded_coords(&self, coords: GridCellCoord) -> bool {
        coords.level + 1 == self.levels.len() && coords.x == 0 && coords.y == 0
    }

    /// Call `f` for every cell touched by `area` on levels `min_level` and up
    pub fn for_each_intersecting_cells<F>(&self, area: &Box2D, mut f: F, min_level: usize)
    where
        F: FnMut(GridCellCoord),
    {
        for level in self.levels.iter().skip(min_level) {
            let level_index = level.level();
            level.for_each_intersecting_cells(area, |coords| {
                f(GridCellCoord::new(coords.x, coords.y, level_index));
            });
        }
    }

    /// Call `f` for every cell, on every level, within `radius` of `center`
    pub fn for_each_intersecting_cells_circle<F>(&self, center: DVec2, radius: f64, mut f: F)
    where
        F: FnMut(GridCellCoord),
    {
        let area = Box2D::new(center - DVec2::splat(radius), center + DVec2::splat(radius));
        let radius_squared = radius * radius;
        for level in &self.levels {
            level.for_each_intersecting_cells(&area, |coords| {
                let inside = level
                    .cell_bounds(coords)
                    .map_or(false, |bounds| bounds.distance_squared_to(center) <= radius_squared);
                if inside {
                    f(GridCellCoord::new(coords.x, coords.y, level.level()));
                }
            });
        }
    }

    /// Cell at global coordinates, if it was ever created
    pub fn cell(&self, coords: GridCellCoord) -> Option<&GridCell<'a>> {
        self.levels.get(coords.level)?.cell(coords.xy())
    }

    /// Number of clusters placed across every level
    pub fn cluster_count(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|level| level.cells())
            .map(|cell| cell.clusters().count())
            .sum()
    }

    /// Check that no actor is referenced by more than one cell below the
    /// top level. Each duplicate is logged.
    pub fn validate_single_actor_referer(&self) -> bool {
        let mut referers: FxHashMap<Uuid, GridCellCoord> = FxHashMap::default();
        let mut valid = true;

        let below_top = self.levels.len().saturating_sub(1);
        for level in &self.levels[..below_top] {
            for cell in level.cells() {
                let coords = GridCellCoord::new(cell.coords().x, cell.coords().y, level.level());
                for actor in cell.clusters().flat_map(|cluster| cluster.actors.iter()) {
                    if let Some(previous) = referers.insert(*actor, coords) {
                        engine_error!(
                            "galaxy3d::SquareGridHelper",
                            "Actor {} is referenced by cells {:?} and {:?}",
                            actor,
                            previous,
                            coords
                        );
                        valid = false;
                    }
                }
            }
        }

        valid
    }
}

#[cfg(test)]
#[path = "square_grid_helper_tests.rs"]
mod tests;
