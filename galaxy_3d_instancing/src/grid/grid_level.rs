/// One level of the square grid hierarchy and its cells.

use glam::DVec2;
use rustc_hash::FxHashMap;
use crate::math::Box2D;
use super::actor_cluster::{ActorClusterInstance, DataLayerRef};
use super::cell_coord::GridCellCoord2;

// ===== CELL CONTENT =====

/// Clusters of one cell sharing an identical data-layer set
#[derive(Debug, Clone)]
pub struct GridCellDataChunk<'a> {
    data_layers: Vec<DataLayerRef>,
    clusters: Vec<&'a ActorClusterInstance>,
}

impl<'a> GridCellDataChunk<'a> {
    /// Sorted data-layer set shared by every cluster of the chunk
    pub fn data_layers(&self) -> &[DataLayerRef] {
        &self.data_layers
    }

    pub fn has_data_layers(&self) -> bool {
        !self.data_layers.is_empty()
    }

    pub fn clusters(&self) -> &[&'a ActorClusterInstance] {
        &self.clusters
    }

    pub fn actor_count(&self) -> usize {
        self.clusters.iter().map(|cluster| cluster.actors.len()).sum()
    }
}

/// Square bucket of a grid level
#[derive(Debug, Clone)]
pub struct GridCell<'a> {
    coords: GridCellCoord2,
    data_chunks: Vec<GridCellDataChunk<'a>>,
}

impl<'a> GridCell<'a> {
    fn new(coords: GridCellCoord2) -> Self {
        Self { coords, data_chunks: Vec::new() }
    }

    pub fn coords(&self) -> GridCellCoord2 {
        self.coords
    }

    /// Add a cluster to the chunk matching its data-layer set
    pub fn add_actor_set_instance(&mut self, cluster: &'a ActorClusterInstance) {
        let data_layers = cluster.data_layer_set();
        match self.data_chunks.iter_mut().find(|chunk| chunk.data_layers == data_layers) {
            Some(chunk) => chunk.clusters.push(cluster),
            None => self.data_chunks.push(GridCellDataChunk {
                data_layers,
                clusters: vec![cluster],
            }),
        }
    }

    pub fn data_chunks(&self) -> &[GridCellDataChunk<'a>] {
        &self.data_chunks
    }

    pub fn is_empty(&self) -> bool {
        self.data_chunks.is_empty()
    }

    /// Every cluster of the cell, chunk by chunk
    pub fn clusters(&self) -> impl Iterator<Item = &'a ActorClusterInstance> + '_ {
        self.data_chunks.iter().flat_map(|chunk| chunk.clusters.iter().copied())
    }
}

// ===== GRID LEVEL =====

/// A square grid of `grid_size * grid_size` cells of `cell_size` units,
/// centered on the grid origin
#[derive(Debug, Clone)]
pub struct GridLevel<'a> {
    origin: DVec2,
    cell_size: i64,
    grid_size: i64,
    level: usize,
    bounds: Box2D,
    cells: Vec<GridCell<'a>>,
    /// `y * grid_size + x` -> index into `cells`
    cells_mapping: FxHashMap<i64, usize>,
}

impl<'a> GridLevel<'a> {
    pub fn new(origin: DVec2, cell_size: i64, grid_size: i64, level: usize) -> Self {
        let half_extent = DVec2::splat((cell_size * grid_size) as f64 / 2.0);
        Self {
            origin,
            cell_size,
            grid_size,
            level,
            bounds: Box2D::new(origin - half_extent, origin + half_extent),
            cells: Vec::new(),
            cells_mapping: FxHashMap::default(),
        }
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn cell_size(&self) -> i64 {
        self.cell_size
    }

    /// Cells per side
    pub fn grid_size(&self) -> i64 {
        self.grid_size
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn bounds(&self) -> Box2D {
        self.bounds
    }

    pub fn is_valid_coords(&self, coords: GridCellCoord2) -> bool {
        coords.x >= 0 && coords.x < self.grid_size && coords.y >= 0 && coords.y < self.grid_size
    }

    /// Cell containing `point`, or `None` outside the level bounds.
    ///
    /// Points on the max edge belong to the last cell.
    pub fn cell_coords(&self, point: DVec2) -> Option<GridCellCoord2> {
        if !self.bounds.contains_point(point) {
            return None;
        }
        let cell = ((point - self.bounds.min) / self.cell_size as f64).floor();
        let last = self.grid_size - 1;
        Some(GridCellCoord2::new(
            (cell.x as i64).clamp(0, last),
            (cell.y as i64).clamp(0, last),
        ))
    }

    /// Min and max cell coordinates touched by `area`, clipped to the level
    pub fn cell_coords_range(&self, area: &Box2D) -> Option<(GridCellCoord2, GridCellCoord2)> {
        if area.min.x >= self.bounds.max.x
            || area.min.y >= self.bounds.max.y
            || area.max.x <= self.bounds.min.x
            || area.max.y <= self.bounds.min.y
        {
            return None;
        }
        let clipped = area.overlap(&self.bounds)?;
        Some((self.cell_coords(clipped.min)?, self.cell_coords(clipped.max)?))
    }

    /// World bounds of a cell
    pub fn cell_bounds(&self, coords: GridCellCoord2) -> Option<Box2D> {
        if !self.is_valid_coords(coords) {
            return None;
        }
        let size = self.cell_size as f64;
        let min = self.bounds.min + DVec2::new(coords.x as f64, coords.y as f64) * size;
        Some(Box2D::new(min, min + DVec2::splat(size)))
    }

    /// Call `f` for every cell touched by `area`. Returns the cell count.
    pub fn for_each_intersecting_cells<F>(&self, area: &Box2D, mut f: F) -> usize
    where
        F: FnMut(GridCellCoord2),
    {
        let Some((min, max)) = self.cell_coords_range(area) else {
            return 0;
        };
        let mut count = 0;
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                f(GridCellCoord2::new(x, y));
                count += 1;
            }
        }
        count
    }

    /// Number of cells touched by `area`
    pub fn num_intersecting_cells(&self, area: &Box2D) -> usize {
        self.cell_coords_range(area)
            .map_or(0, |(min, max)| ((max.x - min.x + 1) * (max.y - min.y + 1)) as usize)
    }

    /// Cell at `coords`, created on first access.
    ///
    /// # Panics
    ///
    /// Panics if `coords` lies outside the level.
    pub fn cell_mut(&mut self, coords: GridCellCoord2) -> &mut GridCell<'a> {
        assert!(self.is_valid_coords(coords), "cell {:?} outside grid level {}", coords, self.level);
        let key = coords.y * self.grid_size + coords.x;
        let cells = &mut self.cells;
        let index = *self.cells_mapping.entry(key).or_insert_with(|| {
            cells.push(GridCell::new(coords));
            cells.len() - 1
        });
        &mut self.cells[index]
    }

    /// Cell at `coords` if it was ever created
    pub fn cell(&self, coords: GridCellCoord2) -> Option<&GridCell<'a>> {
        let key = coords.y * self.grid_size + coords.x;
        self.cells_mapping
            .get(&key)
            .filter(|_| self.is_valid_coords(coords))
            .map(|&index| &self.cells[index])
    }

    /// Every created cell, in creation order
    pub fn cells(&self) -> &[GridCell<'a>] {
        &self.cells
    }
}

#[cfg(test)]
#[path = "grid_level_tests.rs"]
mod tests;
