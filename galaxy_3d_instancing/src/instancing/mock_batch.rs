/// Mock instanced batch for unit tests (no renderer required)
///
/// Every call is recorded in a shared `MockBatchLog` so tests can inspect
/// a batch after handing it to the partition.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use glam::{Mat4, Vec3};
use crate::math::AABB;
use super::descriptor::InstanceDescriptor;
use super::instance_batch::{BatchFactory, InstanceBatch, Transactor};

// ============================================================================
// Mock Batch
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockBatchLog {
    pub transforms: Vec<Mat4>,
    pub selected: Vec<bool>,
    pub removed: Vec<usize>,
    pub updates: Vec<(usize, bool)>,
    pub capacity_growth_events: usize,
    pub pre_allocations: Vec<usize>,
    pub rebuild_calls: Vec<(bool, bool)>,
    pub auto_rebuild: bool,
    pub modify_calls: usize,
    pub destroyed: bool,
}

impl Default for MockBatchLog {
    fn default() -> Self {
        Self {
            transforms: Vec::new(),
            selected: Vec::new(),
            removed: Vec::new(),
            updates: Vec::new(),
            capacity_growth_events: 0,
            pre_allocations: Vec::new(),
            rebuild_calls: Vec::new(),
            auto_rebuild: true,
            modify_calls: 0,
            destroyed: false,
        }
    }
}

pub struct MockBatch {
    log: Arc<Mutex<MockBatchLog>>,
    supports_swap: bool,
    supports_incremental: bool,
    mesh_bounds: AABB,
}

impl InstanceBatch for MockBatch {
    fn add_instance_world_space(&mut self, transform: Mat4) -> usize {
        let mut log = self.log.lock().unwrap();
        if log.transforms.len() == log.transforms.capacity() {
            log.capacity_growth_events += 1;
        }
        log.transforms.push(transform);
        log.selected.push(false);
        log.transforms.len() - 1
    }

    fn remove_instance(&mut self, index: usize) -> bool {
        let mut log = self.log.lock().unwrap();
        if index >= log.transforms.len() {
            return false;
        }
        if self.supports_swap {
            log.transforms.swap_remove(index);
            log.selected.swap_remove(index);
        } else {
            log.transforms.remove(index);
            log.selected.remove(index);
        }
        log.removed.push(index);
        true
    }

    fn update_instance_transform(&mut self, index: usize, transform: Mat4, teleport: bool) -> bool {
        let mut log = self.log.lock().unwrap();
        match log.transforms.get_mut(index) {
            Some(slot) => {
                *slot = transform;
                log.updates.push((index, teleport));
                true
            }
            None => false,
        }
    }

    fn instance_transform(&self, index: usize, _world_space: bool) -> Option<Mat4> {
        self.log.lock().unwrap().transforms.get(index).copied()
    }

    fn instance_count(&self) -> usize {
        self.log.lock().unwrap().transforms.len()
    }

    fn select_instance(&mut self, selected: bool, index: usize) {
        if let Some(slot) = self.log.lock().unwrap().selected.get_mut(index) {
            *slot = selected;
        }
    }

    fn supports_remove_swap(&self) -> bool {
        self.supports_swap
    }

    fn pre_allocate_instances_memory(&mut self, count: usize) {
        let mut log = self.log.lock().unwrap();
        log.transforms.reserve(count);
        log.selected.reserve(count);
        log.pre_allocations.push(count);
    }

    fn static_mesh_bounds(&self) -> Option<AABB> {
        Some(self.mesh_bounds)
    }

    fn supports_incremental_rebuild(&self) -> bool {
        self.supports_incremental
    }

    fn auto_rebuild_on_change(&self) -> bool {
        self.log.lock().unwrap().auto_rebuild
    }

    fn set_auto_rebuild_on_change(&mut self, enabled: bool) {
        self.log.lock().unwrap().auto_rebuild = enabled;
    }

    fn build_tree_if_outdated(&mut self, async_build: bool, force: bool) {
        self.log.lock().unwrap().rebuild_calls.push((async_build, force));
    }

    fn modify(&mut self) {
        self.log.lock().unwrap().modify_calls += 1;
    }
}

// ============================================================================
// Mock Batch Factory
// ============================================================================

#[derive(Default)]
struct MockFactoryState {
    batches: Vec<(usize, Arc<Mutex<MockBatchLog>>)>,
    created: usize,
    destroyed: usize,
}

/// Test-side view of a `MockBatchFactory` that has been moved into a partition
#[derive(Clone)]
pub struct MockFactoryProbe {
    state: Arc<Mutex<MockFactoryState>>,
}

impl MockFactoryProbe {
    /// Log of the most recently created batch for `descriptor_index`
    pub fn batch_log(&self, descriptor_index: usize) -> Option<MockBatchLog> {
        self.state
            .lock()
            .unwrap()
            .batches
            .iter()
            .rev()
            .find(|(index, _)| *index == descriptor_index)
            .map(|(_, log)| log.lock().unwrap().clone())
    }

    pub fn created_count(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn destroyed_count(&self) -> usize {
        self.state.lock().unwrap().destroyed
    }
}

pub struct MockBatchFactory {
    pub supports_swap: bool,
    pub supports_incremental: bool,
    pub mesh_bounds: AABB,
    state: Arc<Mutex<MockFactoryState>>,
}

impl MockBatchFactory {
    /// Hierarchical-style batches: swap removal and incremental rebuild
    pub fn new() -> Self {
        Self {
            supports_swap: true,
            supports_incremental: true,
            mesh_bounds: AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
            state: Arc::new(Mutex::new(MockFactoryState::default())),
        }
    }

    /// Flat batches with ordered removal and no acceleration tree
    pub fn ordered() -> Self {
        Self {
            supports_swap: false,
            supports_incremental: false,
            ..Self::new()
        }
    }

    pub fn probe(&self) -> MockFactoryProbe {
        MockFactoryProbe { state: Arc::clone(&self.state) }
    }
}

impl BatchFactory for MockBatchFactory {
    fn create_batch(
        &mut self,
        descriptor_index: usize,
        _descriptor: &InstanceDescriptor,
    ) -> Box<dyn InstanceBatch> {
        let log = Arc::new(Mutex::new(MockBatchLog::default()));
        let mut state = self.state.lock().unwrap();
        state.batches.push((descriptor_index, Arc::clone(&log)));
        state.created += 1;
        Box::new(MockBatch {
            log,
            supports_swap: self.supports_swap,
            supports_incremental: self.supports_incremental,
            mesh_bounds: self.mesh_bounds,
        })
    }

    fn destroy_batch(&mut self, descriptor_index: usize, batch: Box<dyn InstanceBatch>) {
        let mut state = self.state.lock().unwrap();
        if let Some((_, log)) = state.batches.iter().rev().find(|(index, _)| *index == descriptor_index) {
            log.lock().unwrap().destroyed = true;
        }
        state.destroyed += 1;
        drop(batch);
    }
}

// ============================================================================
// Mock Transactor
// ============================================================================

#[derive(Clone, Default)]
pub struct MockTransactor {
    pub calls: Arc<AtomicUsize>,
}

impl MockTransactor {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transactor for MockTransactor {
    fn modify(&mut self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
