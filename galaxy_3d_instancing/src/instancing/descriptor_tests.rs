use super::*;

fn rock() -> InstanceDescriptor {
    InstanceDescriptor::for_mesh(StaticMeshRef("/Game/Rocks/SM_Rock".to_string()))
}

// ============================================================================
// Hash tests
// ============================================================================

#[test]
fn test_hash_is_never_zero() {
    assert_ne!(InstanceDescriptor::default().compute_hash(), 0);
    assert_ne!(rock().compute_hash(), 0);
}

#[test]
fn test_hash_is_deterministic() {
    // Independently built values hash identically
    assert_eq!(rock().compute_hash(), rock().compute_hash());
}

#[test]
fn test_hash_ignores_cached_hash_field() {
    let mut a = rock();
    a.hash = 12345;
    assert_eq!(a.compute_hash(), rock().compute_hash());
}

#[test]
fn test_with_hash_caches_value() {
    let d = rock().with_hash();
    assert_eq!(d.hash, rock().compute_hash());
    assert!(!d.is_free());
    assert!(rock().is_free());
}

#[test]
fn test_hash_depends_on_material_order() {
    let mut a = rock();
    a.override_materials = vec![MaterialRef("A".into()), MaterialRef("B".into())];
    let mut b = rock();
    b.override_materials = vec![MaterialRef("B".into()), MaterialRef("A".into())];
    assert_ne!(a.with_hash(), b.with_hash());
}

#[test]
fn test_hash_encoding_is_fixed_width() {
    let mut d = InstanceDescriptor::for_mesh(StaticMeshRef("M".to_string()));
    d.override_materials = vec![MaterialRef("AB".into())];

    let mut expected: Vec<u8> = Vec::new();
    expected.push(1); // Hierarchical
    expected.push(1); // mesh present
    expected.extend_from_slice(&1u32.to_le_bytes());
    expected.extend_from_slice(b"M");
    expected.extend_from_slice(&1u32.to_le_bytes());
    expected.extend_from_slice(&2u32.to_le_bytes());
    expected.extend_from_slice(b"AB");
    expected.push(0); // Static
    expected.extend_from_slice(&DescriptorFlags::default().bits().to_le_bytes());
    expected.push(LightingChannels::CHANNEL_0.bits());
    expected.push(3); // QueryAndPhysics
    expected.extend_from_slice(&8u32.to_le_bytes());
    expected.extend_from_slice(b"BlockAll");
    expected.push(0);
    expected.extend_from_slice(&[0u8; 20]);
    expected.push(0);

    assert_eq!(d.canonical_bytes(), expected);
    assert_eq!(d.compute_hash(), crc32fast::hash(&expected));
}

// ============================================================================
// Equality tests
// ============================================================================

#[test]
fn test_equal_descriptors_compare_equal() {
    assert_eq!(rock().with_hash(), rock().with_hash());
}

#[test]
fn test_single_field_difference() {
    let a = rock().with_hash();
    let mut b = rock();
    b.instance_end_cull_distance = 5000;
    let b = b.with_hash();
    assert_ne!(a, b);
}

#[test]
fn test_flag_difference() {
    let a = rock().with_hash();
    let mut b = rock();
    b.flags.remove(DescriptorFlags::CAST_SHADOW);
    assert_ne!(a, b.with_hash());
}

#[test]
fn test_forged_hash_collision_is_caught_by_fields() {
    // Same hash value, different content: must NOT compare equal
    let a = rock().with_hash();
    let mut b = InstanceDescriptor::for_mesh(StaticMeshRef("/Game/Trees/SM_Oak".into()));
    b.hash = a.hash;
    assert_ne!(a, b);
}

#[test]
fn test_unhashed_descriptor_compares_by_fields() {
    let a = rock().with_hash();
    let b = rock();
    assert_eq!(a, b);
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_default_flags() {
    let flags = DescriptorFlags::default();
    assert!(flags.contains(DescriptorFlags::CAST_SHADOW));
    assert!(flags.contains(DescriptorFlags::SELECTABLE));
    assert!(!flags.contains(DescriptorFlags::EDITOR_ONLY));
}

#[test]
fn test_foliage_owned_mask_excludes_selection() {
    assert!(DescriptorFlags::FOLIAGE_TYPE_OWNED.contains(DescriptorFlags::CAST_SHADOW));
    assert!(!DescriptorFlags::FOLIAGE_TYPE_OWNED.contains(DescriptorFlags::SELECTABLE));
}

// ============================================================================
// Template merge
// ============================================================================

fn part(properties: InstanceDescriptor) -> StaticMeshSubComponent {
    StaticMeshSubComponent::new("Trunk", properties, glam::Mat4::IDENTITY)
}

#[test]
fn test_from_sub_component_overrides_win() {
    let mut own = rock();
    own.flags.remove(DescriptorFlags::CAST_SHADOW);
    own.instance_end_cull_distance = 100;
    own.override_materials = vec![MaterialRef("/Game/M_Moss".to_string())];

    let overrides = TemplateOverrides {
        cull_distance: (500, 8000),
        mobility: Mobility::Movable,
        ..TemplateOverrides::default()
    };
    let merged = InstanceDescriptor::from_sub_component(&overrides, &part(own)).unwrap();

    assert!(merged.flags.contains(DescriptorFlags::CAST_SHADOW));
    assert_eq!(merged.instance_start_cull_distance, 500);
    assert_eq!(merged.instance_end_cull_distance, 8000);
    assert_eq!(merged.mobility, Mobility::Movable);
    // Sub-component materials are kept
    assert_eq!(merged.override_materials, vec![MaterialRef("/Game/M_Moss".to_string())]);
    assert_eq!(merged.hash, merged.compute_hash());
}

#[test]
fn test_from_sub_component_keeps_non_owned_flags() {
    let mut own = rock();
    own.flags.remove(DescriptorFlags::SELECTABLE);

    let merged = InstanceDescriptor::from_sub_component(&TemplateOverrides::default(), &part(own)).unwrap();

    assert!(!merged.flags.contains(DescriptorFlags::SELECTABLE));
}

#[test]
fn test_from_sub_component_body_override_optional() {
    let mut own = rock();
    own.body_instance.collision_profile = "OverlapAll".to_string();

    let kept = InstanceDescriptor::from_sub_component(&TemplateOverrides::default(), &part(own.clone())).unwrap();
    assert_eq!(kept.body_instance.collision_profile, "OverlapAll");

    let overrides = TemplateOverrides {
        body_instance: Some(BodyInstanceSummary {
            collision_enabled: CollisionEnabled::NoCollision,
            collision_profile: "NoCollision".to_string(),
            object_type: 0,
        }),
        ..TemplateOverrides::default()
    };
    let replaced = InstanceDescriptor::from_sub_component(&overrides, &part(own)).unwrap();
    assert_eq!(replaced.body_instance.collision_enabled, CollisionEnabled::NoCollision);
}

#[test]
fn test_from_sub_component_without_mesh() {
    let meshless = InstanceDescriptor::default();
    assert!(InstanceDescriptor::from_sub_component(&TemplateOverrides::default(), &part(meshless)).is_none());
}
