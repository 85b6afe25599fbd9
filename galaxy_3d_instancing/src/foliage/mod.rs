mod foliage_ism_actor;
mod template;

#[cfg(test)]
pub(crate) mod mock_template_host;

pub use foliage_ism_actor::FoliageIsmActor;
pub use template::{
    CompileListenerKey, CompileSubscription, FoliageTemplateDesc, StaticMeshSubComponent,
    TemplateActor, TemplateClassId, TemplateClassRegistry, TemplateEnvironment, TemplateHost,
    TemplateOverrides,
};
