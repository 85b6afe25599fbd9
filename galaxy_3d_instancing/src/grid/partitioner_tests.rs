use super::*;
use glam::Vec3;
use serial_test::serial;
use uuid::Uuid;
use crate::galaxy3d::Engine;
use crate::galaxy3d::log::{LogSeverity, MemoryLogger};
use crate::grid::actor_cluster::{ContainerInstanceRef, DataLayerRef};
use crate::grid::cell_coord::GridCellCoord2;

fn world() -> AABB {
    AABB::new(Vec3::new(-1000.0, -1000.0, 0.0), Vec3::new(1000.0, 1000.0, 100.0))
}

fn grid() -> RuntimeGridDesc {
    RuntimeGridDesc::new("MainGrid", 100)
}

fn cluster(min: (f32, f32), max: (f32, f32)) -> ActorClusterInstance {
    ActorClusterInstance::new(
        vec![Uuid::new_v4()],
        AABB::new(Vec3::new(min.0, min.1, 0.0), Vec3::new(max.0, max.1, 10.0)),
        ContainerInstanceRef { id: Uuid::new_v4(), package: "/Game/Maps/Forest".to_string() },
    )
}

/// (level, x, y) of every cell holding a cluster, always-loaded cell included
fn occupied_cells(helper: &SquareGridHelper) -> Vec<(usize, i64, i64)> {
    let mut cells = Vec::new();
    for level in helper.levels() {
        for cell in level.cells() {
            if !cell.is_empty() {
                cells.push((level.level(), cell.coords().x, cell.coords().y));
            }
        }
    }
    cells
}

fn always_loaded_count(helper: &SquareGridHelper) -> usize {
    helper.always_loaded_cell().map_or(0, |cell| cell.clusters().count())
}

// ============================================================================
// Location placement predicate
// ============================================================================

#[test]
fn test_location_placement_rules() {
    let small = cluster((10.0, 10.0), (50.0, 50.0));
    let large = cluster((0.0, 0.0), (150.0, 150.0));
    let mut partition_actor = cluster((0.0, 0.0), (150.0, 150.0));
    partition_actor.is_partition_actor = true;

    let default_config = GridConfig::default();
    assert!(!should_actor_use_location_placement(&small, &small.bounds_2d(), 100, &default_config));
    assert!(should_actor_use_location_placement(&partition_actor, &partition_actor.bounds_2d(), 100, &default_config));

    let small_by_location = GridConfig { place_small_actors_using_location: true, ..GridConfig::default() };
    assert!(should_actor_use_location_placement(&small, &small.bounds_2d(), 100, &small_by_location));
    assert!(!should_actor_use_location_placement(&large, &large.bounds_2d(), 100, &small_by_location));

    let no_partition = GridConfig { place_partition_actors_using_location: false, ..GridConfig::default() };
    assert!(!should_actor_use_location_placement(&partition_actor, &partition_actor.bounds_2d(), 100, &no_partition));
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_small_cluster_lands_in_one_lowest_level_cell() {
    let clusters = vec![cluster((10.0, 10.0), (50.0, 50.0))];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    assert_eq!(occupied_cells(&helper), vec![(0, 16, 16)]);
    assert_eq!(helper.cluster_count(), 1);
    assert!(helper.validate_single_actor_referer());
}

#[test]
fn test_straddling_cluster_promoted_to_next_level() {
    let clusters = vec![cluster((90.0, 10.0), (130.0, 50.0))];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    assert_eq!(occupied_cells(&helper), vec![(1, 8, 8)]);
}

#[test]
fn test_location_placement_uses_center_cell() {
    let clusters = vec![cluster((90.0, 10.0), (130.0, 50.0))];
    let config = GridConfig { place_small_actors_using_location: true, ..GridConfig::default() };

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &config).unwrap();

    // Center (110, 30) sits in a single level-0 cell
    assert_eq!(occupied_cells(&helper), vec![(0, 17, 16)]);
}

#[test]
fn test_first_candidate_level_from_cluster_extent() {
    // 350 units wide: level 0 and 1 cells are too small
    let clusters = vec![cluster((10.0, 10.0), (360.0, 60.0))];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    assert_eq!(occupied_cells(&helper), vec![(2, 4, 4)]);
}

#[test]
fn test_partition_actor_placed_by_location() {
    let mut tile = cluster((-40.0, -40.0), (160.0, 160.0));
    tile.is_partition_actor = true;
    let clusters = vec![tile];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    assert_eq!(occupied_cells(&helper), vec![(0, 16, 16)]);
}

#[test]
fn test_non_spatially_loaded_goes_to_always_loaded() {
    let mut global = cluster((10.0, 10.0), (20.0, 20.0));
    global.is_spatially_loaded = false;
    let clusters = vec![global];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    assert_eq!(always_loaded_count(&helper), 1);
    assert_eq!(occupied_cells(&helper), vec![(5, 0, 0)]);
}

#[test]
fn test_data_layers_split_chunks() {
    let mut night = cluster((10.0, 10.0), (20.0, 20.0));
    night.data_layers = vec![DataLayerRef("Night".to_string())];
    let plain = cluster((30.0, 30.0), (40.0, 40.0));
    let clusters = vec![night, plain];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    let cell = helper.lowest_level().cell(GridCellCoord2::new(16, 16)).unwrap();
    assert_eq!(cell.data_chunks().len(), 2);
    assert!(cell.data_chunks()[0].has_data_layers());
}

#[test]
fn test_every_cluster_placed_exactly_once() {
    let clusters: Vec<ActorClusterInstance> = (0..40)
        .map(|i| {
            let x = -900.0 + (i as f32) * 45.0;
            let size = 5.0 + (i % 7) as f32 * 60.0;
            cluster((x, x * 0.5), (x + size, x * 0.5 + size))
        })
        .collect();

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    assert_eq!(helper.cluster_count(), clusters.len());
    assert!(helper.validate_single_actor_referer());
}

#[test]
fn test_invalid_cell_size_is_an_error() {
    let clusters = vec![cluster((10.0, 10.0), (20.0, 20.0))];
    let grid = RuntimeGridDesc::new("Broken", -5);

    let result = get_partitioned_actors(&world(), &grid, &clusters, &GridConfig::default());

    assert!(result.is_err());
}

// ============================================================================
// Oversized fallback
// ============================================================================

#[test]
#[serial]
fn test_oversized_cluster_falls_back_with_one_warning() {
    let logger = MemoryLogger::new();
    Engine::set_logger(logger.clone());

    let actors = vec![Uuid::new_v4(), Uuid::new_v4()];
    let mut giant = cluster((-2500.0, -2500.0), (2500.0, 2500.0));
    giant.actors = actors.clone();
    let clusters = vec![giant, cluster((10.0, 10.0), (50.0, 50.0))];

    let helper = get_partitioned_actors(&world(), &grid(), &clusters, &GridConfig::default()).unwrap();

    let warnings: Vec<_> = logger
        .entries_with_severity(LogSeverity::Warn)
        .into_iter()
        .filter(|entry| actors.iter().any(|actor| entry.message.contains(&actor.to_string())))
        .collect();
    Engine::reset_logger();

    assert_eq!(always_loaded_count(&helper), 1);
    assert_eq!(helper.cluster_count(), 2);
    assert_eq!(warnings.len(), 1);
    for actor in &actors {
        assert!(warnings[0].message.contains(&actor.to_string()));
    }
    assert!(warnings[0].message.contains("/Game/Maps/Forest"));
    assert!(warnings[0].message.contains("5000 x 5000"));
}
