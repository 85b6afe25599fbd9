/// Galaxy3D instancing demo
///
/// Paints a small foliage patch through an instance partition, edits it,
/// then buckets a few actor clusters into a streaming grid. Engine logs
/// are forwarded to the `log` facade (set RUST_LOG=debug for details).

use std::collections::HashMap;
use galaxy_3d_instancing::galaxy3d::foliage::{
    FoliageIsmActor, FoliageTemplateDesc, StaticMeshSubComponent, TemplateActor, TemplateClassId,
    TemplateClassRegistry, TemplateEnvironment, TemplateHost,
};
use galaxy_3d_instancing::galaxy3d::grid::{
    get_partitioned_actors, ActorClusterInstance, ContainerInstanceRef, GridConfig, RuntimeGridDesc,
};
use galaxy_3d_instancing::galaxy3d::instancing::{
    BatchFactory, InstanceBatch, InstanceDescriptor, IsmPartition, PartitionConfig, StaticMeshRef,
};
use galaxy_3d_instancing::galaxy3d::log::{LogEntry, LogSeverity, Logger};
use galaxy_3d_instancing::galaxy3d::math::AABB;
use galaxy_3d_instancing::galaxy3d::{Engine, Result};
use galaxy_3d_instancing::glam::{Mat4, Quat, Vec3};
use uuid::Uuid;

// ===== LOGGING =====

/// Forwards engine log entries to the `log` facade
struct LogFacadeLogger;

impl Logger for LogFacadeLogger {
    fn log(&self, entry: &LogEntry) {
        let level = match entry.severity {
            LogSeverity::Trace => log::Level::Trace,
            LogSeverity::Debug => log::Level::Debug,
            LogSeverity::Info => log::Level::Info,
            LogSeverity::Warn => log::Level::Warn,
            LogSeverity::Error => log::Level::Error,
        };
        match (entry.file, entry.line) {
            (Some(file), Some(line)) => {
                log::log!(target: entry.source.as_str(), level, "{} ({}:{})", entry.message, file, line)
            }
            _ => log::log!(target: entry.source.as_str(), level, "{}", entry.message),
        }
    }
}

// ===== HOST SIDE =====

/// Batch keeping its transforms in memory
#[derive(Default)]
struct DemoBatch {
    transforms: Vec<Mat4>,
    selected: Vec<bool>,
}

impl InstanceBatch for DemoBatch {
    fn add_instance_world_space(&mut self, transform: Mat4) -> usize {
        self.transforms.push(transform);
        self.selected.push(false);
        self.transforms.len() - 1
    }

    fn remove_instance(&mut self, index: usize) -> bool {
        if index >= self.transforms.len() {
            return false;
        }
        self.transforms.swap_remove(index);
        self.selected.swap_remove(index);
        true
    }

    fn update_instance_transform(&mut self, index: usize, transform: Mat4, _teleport: bool) -> bool {
        match self.transforms.get_mut(index) {
            Some(slot) => {
                *slot = transform;
                true
            }
            None => false,
        }
    }

    fn instance_transform(&self, index: usize, _world_space: bool) -> Option<Mat4> {
        self.transforms.get(index).copied()
    }

    fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    fn select_instance(&mut self, selected: bool, index: usize) {
        if let Some(slot) = self.selected.get_mut(index) {
            *slot = selected;
        }
    }

    fn supports_remove_swap(&self) -> bool {
        true
    }

    fn pre_allocate_instances_memory(&mut self, count: usize) {
        self.transforms.reserve(count);
        self.selected.reserve(count);
    }

    fn static_mesh_bounds(&self) -> Option<AABB> {
        Some(AABB::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, 0.5, 2.0)))
    }
}

struct DemoBatchFactory;

impl BatchFactory for DemoBatchFactory {
    fn create_batch(&mut self, descriptor_index: usize, descriptor: &InstanceDescriptor) -> Box<dyn InstanceBatch> {
        log::debug!("Creating batch {} for {:?}", descriptor_index, descriptor.mesh);
        Box::new(DemoBatch::default())
    }
}

/// Serves a single hard-coded tree template
struct DemoTemplateHost {
    templates: HashMap<TemplateClassId, TemplateActor>,
}

impl TemplateHost for DemoTemplateHost {
    fn spawn_transient(&mut self, class: &TemplateClassId) -> Option<TemplateActor> {
        self.templates.get(class).cloned()
    }

    fn destroy_transient(&mut self, _actor: TemplateActor) {}
}

fn tree_template(class: &TemplateClassId) -> TemplateActor {
    let trunk = InstanceDescriptor::for_mesh(StaticMeshRef("/Game/Foliage/SM_PineTrunk".to_string()));
    let crown = InstanceDescriptor::for_mesh(StaticMeshRef("/Game/Foliage/SM_PineCrown".to_string()));
    TemplateActor {
        class: class.clone(),
        transform: Mat4::IDENTITY,
        components: vec![
            StaticMeshSubComponent::new("Trunk", trunk, Mat4::IDENTITY),
            StaticMeshSubComponent::new("Crown", crown, Mat4::from_translation(Vec3::new(0.0, 0.0, 4.0))),
        ],
    }
}

// ===== DEMO =====

fn paint_foliage() -> Result<()> {
    let class = TemplateClassId("/Game/Foliage/BP_Pine.BP_Pine_C".to_string());
    let mut host = DemoTemplateHost {
        templates: HashMap::from([(class.clone(), tree_template(&class))]),
    };
    let mut classes = TemplateClassRegistry::new();
    let mut partition = IsmPartition::new(Box::new(DemoBatchFactory), PartitionConfig::default());

    let mut pines = FoliageIsmActor::new(Uuid::new_v4());
    let mut desc = FoliageTemplateDesc::new(class.clone());
    {
        let mut env = TemplateEnvironment { host: &mut host, classes: &mut classes };
        pines.initialize(&desc, &mut partition, &mut env)?;
    }

    let transforms: Vec<Mat4> = (0..64)
        .map(|i| {
            let position = Vec3::new((i % 8) as f32 * 6.0, (i / 8) as f32 * 6.0, 0.0);
            let rotation = Quat::from_rotation_z(i as f32 * 0.7);
            Mat4::from_rotation_translation(rotation, position)
        })
        .collect();
    pines.add_instances(&mut partition, &transforms);
    pines.select_instances(&mut partition, true, &[3, 4, 5]);
    pines.remove_instances(&mut partition, &[10, 11, 12, 13]);
    if let Some(bounds) = pines.selection_bounds(&partition) {
        println!("Selection bounds: {:?} .. {:?}", bounds.min, bounds.max);
    }

    // Pushing the cull distance out re-registers both descriptors
    desc.overrides.cull_distance = (0, 20000);
    {
        let mut env = TemplateEnvironment { host: &mut host, classes: &mut classes };
        pines.notify_template_changed(&desc, false, &mut partition, &mut env)?;
    }

    classes.notify_compiled(&class);
    {
        let mut env = TemplateEnvironment { host: &mut host, classes: &mut classes };
        pines.on_template_compiled(&mut partition, &mut env)?;
    }

    let stats = partition.stats();
    println!(
        "Partition: {} batches, {} instances, {:.1} per batch, {} client(s)",
        stats.live_batches,
        stats.total_instances,
        stats.instances_per_batch(),
        stats.registered_clients
    );
    if let Err(message) = partition.validate() {
        log::error!("Partition is inconsistent: {}", message);
    }
    Ok(())
}

fn partition_world() -> Result<()> {
    let world = AABB::new(Vec3::new(-12800.0, -12800.0, 0.0), Vec3::new(12800.0, 12800.0, 1000.0));
    let container = ContainerInstanceRef { id: Uuid::new_v4(), package: "/Game/Maps/Highlands".to_string() };

    let mut clusters: Vec<ActorClusterInstance> = (0..200)
        .map(|i| {
            let x = ((i * 7919) % 24000) as f32 - 12000.0;
            let y = ((i * 104729) % 24000) as f32 - 12000.0;
            let extent = 50.0 + (i % 9) as f32 * 400.0;
            ActorClusterInstance::new(
                vec![Uuid::new_v4()],
                AABB::new(Vec3::new(x, y, 0.0), Vec3::new(x + extent, y + extent, 300.0)),
                container.clone(),
            )
        })
        .collect();
    clusters[0].is_spatially_loaded = false;

    let grid = RuntimeGridDesc::new("MainGrid", 3200);
    let helper = get_partitioned_actors(&world, &grid, &clusters, &GridConfig::default())?;

    for level in helper.levels() {
        let used = level.cells().iter().filter(|cell| !cell.is_empty()).count();
        println!(
            "Level {}: {} x {} cells of {}, {} used",
            level.level(),
            level.grid_size(),
            level.grid_size(),
            level.cell_size(),
            used
        );
    }
    println!("Placed {} clusters, single referer: {}", helper.cluster_count(), helper.validate_single_actor_referer());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Engine::set_logger(LogFacadeLogger);

    if let Err(e) = paint_foliage().and_then(|_| partition_world()) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
