/// Instance descriptors: the rendering/physics configuration shared by
/// every instance of one batch.
///
/// Two descriptors map to the same batch iff their content hashes match and
/// every field compares equal. The hash is a fast reject, never the
/// authority.

use bitflags::bitflags;
use crate::foliage::{StaticMeshSubComponent, TemplateOverrides};

// ===== ASSET REFERENCES =====

/// Reference to a static mesh asset by path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticMeshRef(pub String);

/// Reference to a material asset by path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialRef(pub String);

// ===== ENUMS =====

/// How a batch may move at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mobility {
    #[default]
    Static,
    Stationary,
    Movable,
}

/// Collision participation of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionEnabled {
    NoCollision,
    QueryOnly,
    PhysicsOnly,
    #[default]
    QueryAndPhysics,
}

/// Kind of instanced primitive the batch should be created as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BatchKind {
    /// Flat instanced primitive
    Instanced,
    /// Instanced primitive with an incrementally rebuilt culling tree
    #[default]
    Hierarchical,
}

// ===== FLAGS =====

bitflags! {
    /// Boolean rendering/physics switches of a descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorFlags: u32 {
        const CAST_SHADOW                      = 1 << 0;
        const CAST_DYNAMIC_SHADOW              = 1 << 1;
        const CAST_STATIC_SHADOW               = 1 << 2;
        const CAST_CONTACT_SHADOW              = 1 << 3;
        const CAST_SHADOW_AS_TWO_SIDED         = 1 << 4;
        const CAST_HIDDEN_SHADOW               = 1 << 5;
        const AFFECT_DYNAMIC_INDIRECT_LIGHTING = 1 << 6;
        const AFFECT_DISTANCE_FIELD_LIGHTING   = 1 << 7;
        const RECEIVES_DECALS                  = 1 << 8;
        const USE_AS_OCCLUDER                  = 1 << 9;
        const RENDER_CUSTOM_DEPTH              = 1 << 10;
        const SELECTABLE                       = 1 << 11;
        const HAS_PER_INSTANCE_HIT_PROXIES     = 1 << 12;
        const INCLUDE_IN_HLOD                  = 1 << 13;
        const EDITOR_ONLY                      = 1 << 14;
        const ENABLE_DENSITY_SCALING           = 1 << 15;
        const GENERATE_OVERLAP_EVENTS          = 1 << 16;
        const CAN_EVER_AFFECT_NAVIGATION       = 1 << 17;
        const VISIBLE_IN_RAY_TRACING           = 1 << 18;
        const EVALUATE_WORLD_POSITION_OFFSET   = 1 << 19;

        /// Switches a foliage type owns and overrides on every sub-component
        const FOLIAGE_TYPE_OWNED = Self::CAST_SHADOW.bits()
            | Self::CAST_DYNAMIC_SHADOW.bits()
            | Self::CAST_STATIC_SHADOW.bits()
            | Self::CAST_CONTACT_SHADOW.bits()
            | Self::CAST_SHADOW_AS_TWO_SIDED.bits()
            | Self::AFFECT_DYNAMIC_INDIRECT_LIGHTING.bits()
            | Self::AFFECT_DISTANCE_FIELD_LIGHTING.bits()
            | Self::RECEIVES_DECALS.bits()
            | Self::RENDER_CUSTOM_DEPTH.bits()
            | Self::INCLUDE_IN_HLOD.bits()
            | Self::ENABLE_DENSITY_SCALING.bits()
            | Self::GENERATE_OVERLAP_EVENTS.bits()
            | Self::CAN_EVER_AFFECT_NAVIGATION.bits()
            | Self::VISIBLE_IN_RAY_TRACING.bits();
    }
}

impl Default for DescriptorFlags {
    fn default() -> Self {
        Self::CAST_SHADOW
            | Self::CAST_DYNAMIC_SHADOW
            | Self::CAST_STATIC_SHADOW
            | Self::AFFECT_DYNAMIC_INDIRECT_LIGHTING
            | Self::AFFECT_DISTANCE_FIELD_LIGHTING
            | Self::RECEIVES_DECALS
            | Self::USE_AS_OCCLUDER
            | Self::SELECTABLE
            | Self::HAS_PER_INSTANCE_HIT_PROXIES
            | Self::INCLUDE_IN_HLOD
            | Self::VISIBLE_IN_RAY_TRACING
            | Self::EVALUATE_WORLD_POSITION_OFFSET
    }
}

bitflags! {
    /// Light channels a batch is lit by
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LightingChannels: u8 {
        const CHANNEL_0 = 1 << 0;
        const CHANNEL_1 = 1 << 1;
        const CHANNEL_2 = 1 << 2;
    }
}

impl Default for LightingChannels {
    fn default() -> Self {
        Self::CHANNEL_0
    }
}

// ===== BODY INSTANCE =====

/// Collision summary of the batch's body instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BodyInstanceSummary {
    pub collision_enabled: CollisionEnabled,
    pub collision_profile: String,
    pub object_type: u8,
}

impl Default for BodyInstanceSummary {
    fn default() -> Self {
        Self {
            collision_enabled: CollisionEnabled::QueryAndPhysics,
            collision_profile: "BlockAll".to_string(),
            object_type: 0,
        }
    }
}

// ===== DESCRIPTOR =====

/// Every rendering/physics-relevant property of a batch plus a cached hash.
///
/// The hash is computed with `compute_hash` before registration. A hash of 0
/// marks a freed descriptor slot.
#[derive(Debug, Clone)]
pub struct InstanceDescriptor {
    /// Cached content hash (0 = not computed / freed slot)
    pub hash: u32,
    pub batch_kind: BatchKind,
    pub mesh: Option<StaticMeshRef>,
    pub override_materials: Vec<MaterialRef>,
    pub mobility: Mobility,
    pub flags: DescriptorFlags,
    pub lighting_channels: LightingChannels,
    pub body_instance: BodyInstanceSummary,
    pub instance_start_cull_distance: i32,
    pub instance_end_cull_distance: i32,
    pub overridden_light_map_res: i32,
    pub translucency_sort_priority: i32,
    pub custom_depth_stencil_value: i32,
    pub virtual_texture_cull_mips: i8,
}

impl Default for InstanceDescriptor {
    fn default() -> Self {
        Self {
            hash: 0,
            batch_kind: BatchKind::default(),
            mesh: None,
            override_materials: Vec::new(),
            mobility: Mobility::default(),
            flags: DescriptorFlags::default(),
            lighting_channels: LightingChannels::default(),
            body_instance: BodyInstanceSummary::default(),
            instance_start_cull_distance: 0,
            instance_end_cull_distance: 0,
            overridden_light_map_res: 0,
            translucency_sort_priority: 0,
            custom_depth_stencil_value: 0,
            virtual_texture_cull_mips: 0,
        }
    }
}

impl InstanceDescriptor {
    /// Descriptor for `mesh` with default settings (hash not yet computed)
    pub fn for_mesh(mesh: StaticMeshRef) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::default()
        }
    }

    /// Merge a template sub-component's settings with the foliage-type
    /// overrides, which win. Returns `None` for a part without a mesh.
    ///
    /// The returned descriptor has its hash computed.
    pub fn from_sub_component(
        overrides: &TemplateOverrides,
        component: &StaticMeshSubComponent,
    ) -> Option<Self> {
        component.properties.mesh.as_ref()?;

        let mut descriptor = component.properties.clone();
        descriptor.flags = (descriptor.flags - DescriptorFlags::FOLIAGE_TYPE_OWNED)
            | (overrides.flags & DescriptorFlags::FOLIAGE_TYPE_OWNED);
        descriptor.batch_kind = overrides.batch_kind;
        descriptor.mobility = overrides.mobility;
        descriptor.lighting_channels = overrides.lighting_channels;
        descriptor.instance_start_cull_distance = overrides.cull_distance.0;
        descriptor.instance_end_cull_distance = overrides.cull_distance.1;
        if let Some(body_instance) = &overrides.body_instance {
            descriptor.body_instance = body_instance.clone();
        }
        descriptor.custom_depth_stencil_value = overrides.custom_depth_stencil_value;
        descriptor.translucency_sort_priority = overrides.translucency_sort_priority;
        descriptor.virtual_texture_cull_mips = overrides.virtual_texture_cull_mips;
        descriptor.update_hash();
        Some(descriptor)
    }

    /// Compute the content hash without storing it.
    ///
    /// CRC-32 over a fixed-width little-endian encoding of every field, so
    /// the value is the same on every target and across process runs.
    /// Arrays are hashed in order. 0 is remapped to 1.
    pub fn compute_hash(&self) -> u32 {
        let hash = crc32fast::hash(&self.canonical_bytes());
        if hash == 0 { 1 } else { hash }
    }

    /// Compute and cache the content hash. Returns `self` for chaining.
    pub fn with_hash(mut self) -> Self {
        self.hash = self.compute_hash();
        self
    }

    /// Compute and cache the content hash in place
    pub fn update_hash(&mut self) {
        self.hash = self.compute_hash();
    }

    /// Whether this descriptor slot is marked free
    pub fn is_free(&self) -> bool {
        self.hash == 0
    }

    /// Field encoding fed to the hash. Lengths are written as `u32`.
    fn canonical_bytes(&self) -> Vec<u8> {
        fn put_str(out: &mut Vec<u8>, value: &str) {
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value.as_bytes());
        }

        let mut out = Vec::with_capacity(64);
        out.push(self.batch_kind as u8);
        match &self.mesh {
            Some(mesh) => {
                out.push(1);
                put_str(&mut out, &mesh.0);
            }
            None => out.push(0),
        }
        out.extend_from_slice(&(self.override_materials.len() as u32).to_le_bytes());
        for material in &self.override_materials {
            put_str(&mut out, &material.0);
        }
        out.push(self.mobility as u8);
        out.extend_from_slice(&self.flags.bits().to_le_bytes());
        out.push(self.lighting_channels.bits());
        out.push(self.body_instance.collision_enabled as u8);
        put_str(&mut out, &self.body_instance.collision_profile);
        out.push(self.body_instance.object_type);
        for value in [
            self.instance_start_cull_distance,
            self.instance_end_cull_distance,
            self.overridden_light_map_res,
            self.translucency_sort_priority,
            self.custom_depth_stencil_value,
        ] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.push(self.virtual_texture_cull_mips as u8);
        out
    }

    /// Field-by-field equality, ignoring the cached hash
    pub fn fields_equal(&self, other: &Self) -> bool {
        self.batch_kind == other.batch_kind
            && self.mesh == other.mesh
            && self.override_materials == other.override_materials
            && self.mobility == other.mobility
            && self.flags == other.flags
            && self.lighting_channels == other.lighting_channels
            && self.body_instance == other.body_instance
            && self.instance_start_cull_distance == other.instance_start_cull_distance
            && self.instance_end_cull_distance == other.instance_end_cull_distance
            && self.overridden_light_map_res == other.overridden_light_map_res
            && self.translucency_sort_priority == other.translucency_sort_priority
            && self.custom_depth_stencil_value == other.custom_depth_stencil_value
            && self.virtual_texture_cull_mips == other.virtual_texture_cull_mips
    }
}

impl PartialEq for InstanceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        // Hash mismatch is a fast reject only when both hashes are computed
        if self.hash != 0 && other.hash != 0 && self.hash != other.hash {
            return false;
        }
        self.fields_equal(other)
    }
}

impl Eq for InstanceDescriptor {}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
