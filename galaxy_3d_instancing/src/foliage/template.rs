/// Template actors the foliage adapter renders through the partition,
/// and the host services that spawn them.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use glam::Mat4;
use slotmap::{new_key_type, SlotMap};
use crate::engine_debug;
use crate::instancing::{
    BatchKind, BodyInstanceSummary, DescriptorFlags, InstanceDescriptor, LightingChannels, Mobility,
};

// ===== TEMPLATE DATA =====

/// Class path of a template actor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateClassId(pub String);

impl fmt::Display for TemplateClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A static-mesh-bearing part of a template actor
#[derive(Debug, Clone)]
pub struct StaticMeshSubComponent {
    pub name: String,
    /// The part's own rendering settings (mesh may be missing)
    pub properties: InstanceDescriptor,
    pub world_transform: Mat4,
    /// World transforms of every instance when the part is itself
    /// instanced. Empty for a plain mesh part.
    pub instance_transforms: Vec<Mat4>,
}

impl StaticMeshSubComponent {
    pub fn new(name: impl Into<String>, properties: InstanceDescriptor, world_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            properties,
            world_transform,
            instance_transforms: Vec::new(),
        }
    }
}

/// A transient spawn of a template class
#[derive(Debug, Clone)]
pub struct TemplateActor {
    pub class: TemplateClassId,
    pub transform: Mat4,
    pub components: Vec<StaticMeshSubComponent>,
}

/// Foliage-type settings that win over the sub-components' own
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOverrides {
    /// Only the `DescriptorFlags::FOLIAGE_TYPE_OWNED` bits are applied
    pub flags: DescriptorFlags,
    pub batch_kind: BatchKind,
    pub mobility: Mobility,
    pub lighting_channels: LightingChannels,
    pub cull_distance: (i32, i32),
    /// Collision override; `None` keeps each sub-component's body instance
    pub body_instance: Option<BodyInstanceSummary>,
    pub custom_depth_stencil_value: i32,
    pub translucency_sort_priority: i32,
    pub virtual_texture_cull_mips: i8,
}

impl Default for TemplateOverrides {
    fn default() -> Self {
        Self {
            flags: DescriptorFlags::default(),
            batch_kind: BatchKind::Hierarchical,
            mobility: Mobility::Static,
            lighting_channels: LightingChannels::default(),
            cull_distance: (0, 0),
            body_instance: None,
            custom_depth_stencil_value: 0,
            translucency_sort_priority: 0,
            virtual_texture_cull_mips: 0,
        }
    }
}

/// Everything the foliage adapter is told about its template
#[derive(Debug, Clone, PartialEq)]
pub struct FoliageTemplateDesc {
    pub class: TemplateClassId,
    pub overrides: TemplateOverrides,
    /// Placement density, not part of any descriptor
    pub density: f32,
    /// Placement alignment, not part of any descriptor
    pub align_to_normal: bool,
}

impl FoliageTemplateDesc {
    pub fn new(class: TemplateClassId) -> Self {
        Self {
            class,
            overrides: TemplateOverrides::default(),
            density: 100.0,
            align_to_normal: true,
        }
    }
}

// ===== HOST SERVICES =====

/// Spawns transient template actors
pub trait TemplateHost {
    /// Spawn a never persisted, never ticking instance of `class`
    fn spawn_transient(&mut self, class: &TemplateClassId) -> Option<TemplateActor>;

    /// Destroy an actor returned by `spawn_transient`
    fn destroy_transient(&mut self, actor: TemplateActor);
}

new_key_type! {
    /// Key of one compile-notification subscription
    pub struct CompileListenerKey;
}

/// A live subscription to a template class's compile notifications
#[derive(Debug, Clone)]
pub struct CompileSubscription {
    key: CompileListenerKey,
    pending: Arc<AtomicBool>,
}

impl CompileSubscription {
    pub fn key(&self) -> CompileListenerKey {
        self.key
    }

    /// Consume a pending notification. Returns true if one was pending.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

struct CompileListener {
    class: TemplateClassId,
    pending: Arc<AtomicBool>,
}

/// Dispatches "template class recompiled" notifications
#[derive(Default)]
pub struct TemplateClassRegistry {
    listeners: SlotMap<CompileListenerKey, CompileListener>,
}

impl TemplateClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, class: &TemplateClassId) -> CompileSubscription {
        let pending = Arc::new(AtomicBool::new(false));
        let key = self.listeners.insert(CompileListener {
            class: class.clone(),
            pending: Arc::clone(&pending),
        });
        CompileSubscription { key, pending }
    }

    /// Returns false if the key was already removed
    pub fn unsubscribe(&mut self, key: CompileListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    /// Flag every subscriber of `class`. Returns how many were flagged.
    pub fn notify_compiled(&mut self, class: &TemplateClassId) -> usize {
        let mut notified = 0;
        for listener in self.listeners.values().filter(|listener| listener.class == *class) {
            listener.pending.store(true, Ordering::Release);
            notified += 1;
        }
        engine_debug!("galaxy3d::TemplateClassRegistry", "Template {} compiled, {} listener(s)", class, notified);
        notified
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Host services needed to (re)initialize a foliage adapter
pub struct TemplateEnvironment<'a> {
    pub host: &'a mut dyn TemplateHost,
    pub classes: &'a mut TemplateClassRegistry,
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
