/// Mock template host for unit tests (no world required)

use rustc_hash::FxHashMap;
use super::template::{TemplateActor, TemplateClassId, TemplateHost};

#[derive(Default)]
pub struct MockTemplateHost {
    pub templates: FxHashMap<TemplateClassId, TemplateActor>,
    pub spawned: usize,
    pub destroyed: usize,
}

impl MockTemplateHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, actor: TemplateActor) -> Self {
        self.templates.insert(actor.class.clone(), actor);
        self
    }

    /// Replace the template of `actor.class`, as a recompile would
    pub fn set_template(&mut self, actor: TemplateActor) {
        self.templates.insert(actor.class.clone(), actor);
    }
}

impl TemplateHost for MockTemplateHost {
    fn spawn_transient(&mut self, class: &TemplateClassId) -> Option<TemplateActor> {
        let actor = self.templates.get(class).cloned()?;
        self.spawned += 1;
        Some(actor)
    }

    fn destroy_transient(&mut self, _actor: TemplateActor) {
        self.destroyed += 1;
    }
}
