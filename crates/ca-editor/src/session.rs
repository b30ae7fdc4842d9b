//! Modifier session: one uploaded project being tuned live.
//!
//! The session is the single owner of everything derived from the two SVG
//! sources. Sources in, registry and table rebuilt; slider edits replace the
//! table; hover flips the interaction state. Every change that moves a
//! group's target pose is forwarded to the animation driver.

use crate::motion::{AnimationDriver, SpringDriver};
use ca_core::compositor::{Interaction, LayerPose, Scene, compose};
use ca_core::config::{ExportConfig, PreviewConfig, TransitionProfile};
use ca_core::export::{ExportBlock, export_variants};
use ca_core::extract::extract_groups;
use ca_core::id::GroupId;
use ca_core::model::{Extraction, GroupAnimationParams, Project, StateKind, TransformField};
use ca_core::params::ParamTable;
use ca_core::registry::GroupRegistry;

pub const EXPORT_LABEL: &str = "Group Animation Variants";
pub const EXPORT_BINDING: &str = "groupAnimationVariants";

pub struct ModifierSession<D: AnimationDriver = SpringDriver> {
    project: Project,
    collapsed: Extraction,
    expanded: Extraction,
    registry: GroupRegistry,
    params: ParamTable,
    interaction: Interaction,
    driver: D,
    profile: TransitionProfile,
    preview: PreviewConfig,
}

impl ModifierSession<SpringDriver> {
    /// Session with the default spring driver, transition and canvas.
    pub fn from_project(project: Project) -> Self {
        Self::with_driver(
            project,
            SpringDriver::new(),
            TransitionProfile::default(),
            PreviewConfig::default(),
        )
    }
}

impl<D: AnimationDriver> ModifierSession<D> {
    pub fn with_driver(
        project: Project,
        driver: D,
        profile: TransitionProfile,
        preview: PreviewConfig,
    ) -> Self {
        let mut session = Self {
            project,
            collapsed: Extraction::default(),
            expanded: Extraction::default(),
            registry: GroupRegistry::default(),
            params: ParamTable::default(),
            interaction: Interaction::default(),
            driver,
            profile,
            preview,
        };
        session.rebuild();
        session
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn extraction(&self, state: StateKind) -> &Extraction {
        match state {
            StateKind::Collapsed => &self.collapsed,
            StateKind::Expanded => &self.expanded,
        }
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.registry.ids().collect()
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Replace the parameter table with one cell changed.
    ///
    /// The group is retargeted only when the edited state is the one the
    /// preview is currently showing.
    pub fn set_field(&mut self, id: GroupId, state: StateKind, field: TransformField, value: f64) {
        let next = self.params.set_field(id, state, field, value);
        if next.ptr_eq(&self.params) {
            return;
        }
        self.params = next;
        if state == self.interaction.target_state() {
            self.retarget(id);
        }
    }

    pub fn set_interaction(&mut self, interaction: Interaction) {
        if interaction == self.interaction {
            return;
        }
        log::debug!("interaction {:?} -> {:?}", self.interaction, interaction);
        self.interaction = interaction;
        self.retarget_all();
    }

    pub fn hover_enter(&mut self) {
        self.set_interaction(Interaction::Hovered);
    }

    pub fn hover_leave(&mut self) {
        self.set_interaction(Interaction::Idle);
    }

    /// Swap in new sources. Registry, table and animation all start over.
    pub fn replace_sources(&mut self, collapsed_svg: &str, expanded_svg: &str) {
        self.project.collapsed_svg = collapsed_svg.to_string();
        self.project.expanded_svg = expanded_svg.to_string();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.collapsed = extract_groups(&self.project.collapsed_svg);
        self.expanded = extract_groups(&self.project.expanded_svg);
        self.registry = GroupRegistry::build(&self.collapsed, &self.expanded);
        self.params = ParamTable::initialize(self.registry.ids());
        self.driver.clear();
        self.retarget_all();
        log::debug!(
            "project `{}` loaded with {} groups",
            self.project.name,
            self.registry.len()
        );
    }

    fn target_pose(&self, id: GroupId) -> LayerPose {
        let params = self
            .params
            .get(id)
            .copied()
            .unwrap_or(GroupAnimationParams::IDENTITY);
        LayerPose::settled(&params, self.interaction.target_state())
    }

    fn retarget(&mut self, id: GroupId) {
        let pose = self.target_pose(id);
        self.driver.retarget(id, pose, &self.profile);
    }

    fn retarget_all(&mut self) {
        for id in self.group_ids() {
            self.retarget(id);
        }
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Advance the animation. Returns `true` while anything is still moving.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.driver.tick(dt_ms);
        !self.driver.is_settled()
    }

    pub fn is_animating(&self) -> bool {
        !self.driver.is_settled()
    }

    /// Scene at rest for the current interaction state.
    pub fn target_scene(&self) -> Scene {
        compose(&self.registry, &self.params, self.interaction, &self.preview)
    }

    /// Scene as it looks right now, mid-animation poses included.
    pub fn frame_scene(&self) -> Scene {
        self.target_scene().with_poses(|id| self.driver.sample(id))
    }

    pub fn render_svg(&self) -> String {
        self.frame_scene().to_svg()
    }

    // ─── Export ──────────────────────────────────────────────────────────

    pub fn export_blocks(&self) -> Vec<ExportBlock> {
        vec![ExportBlock::from_table(EXPORT_LABEL, EXPORT_BINDING, &self.params)]
    }

    pub fn export_text(&self) -> String {
        export_variants(&self.export_blocks(), &ExportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        Project {
            name: "Card".to_string(),
            collapsed_svg: r#"<svg viewBox="0 0 10 10"><g id="s-a"><rect/></g><g id="s-b"><circle/></g></svg>"#
                .to_string(),
            expanded_svg: r#"<svg><g id="s-b"><circle r="2"/></g><g id="s-c"><path/></g></svg>"#
                .to_string(),
        }
    }

    #[test]
    fn loads_registry_and_identity_table() {
        let session = ModifierSession::from_project(project());
        let names: Vec<_> = session.group_ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(names, vec!["s-a", "s-b", "s-c"]);
        assert_eq!(session.params().len(), 3);
        assert!(!session.is_animating());
        assert_eq!(session.frame_scene(), session.target_scene());
    }

    #[test]
    fn editing_inactive_state_does_not_move() {
        let mut session = ModifierSession::from_project(project());
        let b = GroupId::intern("s-b");
        session.set_field(b, StateKind::Expanded, TransformField::X, 30.0);
        assert!(!session.is_animating());
        assert_eq!(session.params().get(b).unwrap().expanded.x, 30.0);
    }

    #[test]
    fn editing_active_state_animates() {
        let mut session = ModifierSession::from_project(project());
        let b = GroupId::intern("s-b");
        session.set_field(b, StateKind::Collapsed, TransformField::Y, 12.0);
        assert!(session.is_animating());
        while session.tick(16.0) {}
        let layer = session.frame_scene().layer(b).cloned().unwrap();
        assert_eq!(layer.pose.transform.y, 12.0);
    }

    #[test]
    fn unknown_group_edit_is_ignored() {
        let mut session = ModifierSession::from_project(project());
        let before = session.params().clone();
        session.set_field(GroupId::intern("s-missing"), StateKind::Collapsed, TransformField::X, 1.0);
        assert!(session.params().ptr_eq(&before));
    }

    #[test]
    fn export_uses_group_binding() {
        let session = ModifierSession::from_project(project());
        let text = session.export_text();
        assert!(text.starts_with("// Group Animation Variants\nconst groupAnimationVariants = {\n  \"s-a\": {"));
    }
}
