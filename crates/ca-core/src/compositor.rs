//! Live compositor: registry + parameters + interaction → SVG scene.
//!
//! Each registry group becomes one layer. A layer wraps both states' inner
//! markup in a single transform group; the two fragments cross-fade so that
//! exactly one dominates once the motion settles.
//!
//! `compose` yields the *target* scene for an interaction state. Frames in
//! between come from an animation driver that supplies sampled poses via
//! `Scene::with_poses`; the compositor never steps time itself.

use crate::config::PreviewConfig;
use crate::export::format_num;
use crate::id::GroupId;
use crate::model::{GroupAnimationParams, Markup, StateKind, TransformState};
use crate::params::ParamTable;
use crate::registry::GroupRegistry;
use serde::Serialize;
use std::fmt::Write;

// ─── Interaction ─────────────────────────────────────────────────────────

/// Pointer state of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    #[default]
    Idle,
    Hovered,
}

impl Interaction {
    pub fn from_hovered(hovered: bool) -> Self {
        if hovered {
            Interaction::Hovered
        } else {
            Interaction::Idle
        }
    }

    /// Endpoint the preview animates toward.
    pub fn target_state(self) -> StateKind {
        match self {
            Interaction::Idle => StateKind::Collapsed,
            Interaction::Hovered => StateKind::Expanded,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Interaction::Idle => Interaction::Hovered,
            Interaction::Hovered => Interaction::Idle,
        }
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// Everything animatable about one layer at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerPose {
    pub transform: TransformState,
    pub collapsed_opacity: f64,
    pub expanded_opacity: f64,
}

impl LayerPose {
    /// Resting pose of a group at `state`: that state's transform, its
    /// fragment opaque and the other one transparent.
    pub fn settled(params: &GroupAnimationParams, state: StateKind) -> Self {
        let (collapsed_opacity, expanded_opacity) = match state {
            StateKind::Collapsed => (1.0, 0.0),
            StateKind::Expanded => (0.0, 1.0),
        };
        Self {
            transform: *params.state(state),
            collapsed_opacity,
            expanded_opacity,
        }
    }

    pub fn opacity(&self, state: StateKind) -> f64 {
        match state {
            StateKind::Collapsed => self.collapsed_opacity,
            StateKind::Expanded => self.expanded_opacity,
        }
    }
}

/// One composited group.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: GroupId,
    pub pose: LayerPose,
    /// Empty when the collapsed document has no such group.
    pub collapsed: Markup,
    /// Empty when the expanded document has no such group.
    pub expanded: Markup,
}

impl Layer {
    pub fn markup(&self, state: StateKind) -> &Markup {
        match state {
            StateKind::Collapsed => &self.collapsed,
            StateKind::Expanded => &self.expanded,
        }
    }
}

/// A renderable preview tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub view_box: String,
    pub width: f64,
    pub height: f64,
    pub layers: Vec<Layer>,
}

/// Build the target scene for `interaction`.
///
/// Layers follow registry order. A registry group missing from `params`
/// falls back to identity transforms.
#[must_use]
pub fn compose(
    registry: &GroupRegistry,
    params: &ParamTable,
    interaction: Interaction,
    preview: &PreviewConfig,
) -> Scene {
    let target = interaction.target_state();
    let layers = registry
        .ids()
        .map(|id| {
            let group_params = params
                .get(id)
                .copied()
                .unwrap_or(GroupAnimationParams::IDENTITY);
            Layer {
                id,
                pose: LayerPose::settled(&group_params, target),
                collapsed: registry
                    .markup(id, StateKind::Collapsed)
                    .cloned()
                    .unwrap_or_default(),
                expanded: registry
                    .markup(id, StateKind::Expanded)
                    .cloned()
                    .unwrap_or_default(),
            }
        })
        .collect();

    Scene {
        view_box: choose_view_box(registry, preview),
        width: preview.width,
        height: preview.height,
        layers,
    }
}

/// Collapsed viewBox, then expanded, then the configured default.
fn choose_view_box(registry: &GroupRegistry, preview: &PreviewConfig) -> String {
    StateKind::ALL
        .iter()
        .find_map(|state| registry.envelope(*state).view_box.clone())
        .unwrap_or_else(|| preview.default_view_box.clone())
}

impl Scene {
    /// Replace target poses with sampled ones where the sampler has them.
    #[must_use]
    pub fn with_poses(mut self, mut sample: impl FnMut(GroupId) -> Option<LayerPose>) -> Self {
        for layer in &mut self.layers {
            if let Some(pose) = sample(layer.id) {
                layer.pose = pose;
            }
        }
        self
    }

    pub fn layer(&self, id: GroupId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Render as a standalone SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(256 + self.layers.len() * 256);
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" viewBox=\"{}\" width=\"{}\" height=\"{}\">",
            escape_attr(&self.view_box),
            format_num(self.width),
            format_num(self.height)
        );
        for layer in &self.layers {
            render_layer(&mut out, layer);
        }
        out.push_str("</svg>");
        out
    }
}

fn render_layer(out: &mut String, layer: &Layer) {
    let t = &layer.pose.transform;
    let _ = writeln!(out, "<g data-group=\"{}\">", escape_attr(layer.id.as_str()));
    let _ = writeln!(
        out,
        "<g transform=\"{}\">",
        transform_attr(t)
    );
    for state in StateKind::ALL {
        let markup = layer.markup(state);
        let _ = write!(
            out,
            "<g data-state=\"{}\" opacity=\"{}\"",
            state,
            format_num(layer.pose.opacity(state))
        );
        for (prefix, uri) in markup.namespaces() {
            let _ = write!(out, " xmlns:{prefix}=\"{}\"", escape_attr(uri));
        }
        let _ = writeln!(out, ">{}</g>", markup.as_str());
    }
    out.push_str("</g>\n</g>\n");
}

/// SVG transform list: translate, then rotate in degrees, then uniform scale.
///
/// Non-finite components render as their identity value so the attribute
/// always parses.
pub fn transform_attr(t: &TransformState) -> String {
    let or = |v: f64, identity: f64| format_num(if v.is_finite() { v } else { identity });
    format!(
        "translate({} {}) rotate({}) scale({})",
        or(t.x, 0.0),
        or(t.y, 0.0),
        or(t.rotate, 0.0),
        or(t.scale, 1.0)
    )
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_groups;
    use crate::model::{Extraction, TransformField};
    use pretty_assertions::assert_eq;

    fn registry(collapsed: &str, expanded: &str) -> GroupRegistry {
        GroupRegistry::build(&extract_groups(collapsed), &extract_groups(expanded))
    }

    #[test]
    fn idle_targets_collapsed_params() {
        let reg = registry(
            r#"<svg viewBox="0 0 50 50"><g id="a"><rect/></g></svg>"#,
            r#"<svg><g id="a"><circle/></g></svg>"#,
        );
        let a = GroupId::intern("a");
        let table = ParamTable::initialize(reg.ids())
            .set_field(a, StateKind::Collapsed, TransformField::X, 12.0)
            .set_field(a, StateKind::Expanded, TransformField::X, -4.0);

        let idle = compose(&reg, &table, Interaction::Idle, &PreviewConfig::default());
        let layer = idle.layer(a).unwrap();
        assert_eq!(layer.pose.transform.x, 12.0);
        assert_eq!(layer.pose.collapsed_opacity, 1.0);
        assert_eq!(layer.pose.expanded_opacity, 0.0);

        let hovered = compose(&reg, &table, Interaction::Hovered, &PreviewConfig::default());
        let layer = hovered.layer(a).unwrap();
        assert_eq!(layer.pose.transform.x, -4.0);
        assert_eq!(layer.pose.collapsed_opacity, 0.0);
        assert_eq!(layer.pose.expanded_opacity, 1.0);
        assert_eq!(hovered.view_box, "0 0 50 50");
    }

    #[test]
    fn view_box_falls_back_to_expanded_then_default() {
        let reg = registry("<svg/>", r#"<svg viewBox="1 2 3 4"/>"#);
        let scene = compose(&reg, &ParamTable::default(), Interaction::Idle, &PreviewConfig::default());
        assert_eq!(scene.view_box, "1 2 3 4");

        let reg = GroupRegistry::build(&Extraction::default(), &Extraction::default());
        let scene = compose(&reg, &ParamTable::default(), Interaction::Idle, &PreviewConfig::default());
        assert_eq!(scene.view_box, "0 0 236 123");
        assert!(scene.layers.is_empty());
        assert!(scene.to_svg().ends_with("</svg>"));
    }

    #[test]
    fn renders_both_fragments_inside_one_transform() {
        let reg = registry(
            r#"<svg><g id="x"><rect/></g></svg>"#,
            r#"<svg><g id="x"><circle/></g></svg>"#,
        );
        let x = GroupId::intern("x");
        let table = ParamTable::initialize(reg.ids()).set_field(
            x,
            StateKind::Collapsed,
            TransformField::Rotate,
            -12.5,
        );
        let svg = compose(&reg, &table, Interaction::Idle, &PreviewConfig::default()).to_svg();
        let expected_body = "<g data-group=\"x\">\n\
<g transform=\"translate(0 0) rotate(-12.5) scale(1)\">\n\
<g data-state=\"collapsed\" opacity=\"1\"><rect/></g>\n\
<g data-state=\"expanded\" opacity=\"0\"><circle/></g>\n\
</g>\n</g>\n</svg>";
        assert!(svg.ends_with(expected_body), "unexpected svg:\n{svg}");
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    }

    #[test]
    fn non_finite_transform_renders_identity_components() {
        let t = TransformState::new(f64::NAN, 3.0, f64::INFINITY, f64::NEG_INFINITY);
        assert_eq!(transform_attr(&t), "translate(0 3) rotate(0) scale(1)");
    }

    #[test]
    fn source_namespaces_are_redeclared_per_fragment() {
        let reg = registry(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"><g id="n"><sodipodi:namedview pagecolor="&#34;x&#34;"/></g></svg>"#,
            r#"<svg xmlns:i="urn:&amp;ai"><g id="n"><rect i:knockout="Off"/></g></svg>"#,
        );
        let svg = compose(&reg, &ParamTable::initialize(reg.ids()), Interaction::Idle, &PreviewConfig::default()).to_svg();
        assert!(svg.contains(
            "<g data-state=\"collapsed\" opacity=\"1\" xmlns:sodipodi=\"http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd\">"
        ));
        assert!(svg.contains("<g data-state=\"expanded\" opacity=\"0\" xmlns:i=\"urn:&amp;ai\">"));
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let rect = doc.descendants().find(|n| n.has_tag_name("rect")).unwrap();
        assert_eq!(rect.attribute(("urn:&ai", "knockout")), Some("Off"));
    }

    #[test]
    fn with_poses_overrides_only_sampled_layers() {
        let reg = registry(r#"<svg><g id="p"/><g id="q"/></svg>"#, "<svg/>");
        let p = GroupId::intern("p");
        let scene = compose(&reg, &ParamTable::initialize(reg.ids()), Interaction::Idle, &PreviewConfig::default());
        let mid = LayerPose {
            transform: TransformState::new(5.0, 0.0, 0.0, 1.0),
            collapsed_opacity: 0.5,
            expanded_opacity: 0.5,
        };
        let framed = scene.with_poses(|id| (id == p).then_some(mid));
        assert_eq!(framed.layers[0].pose, mid);
        assert_eq!(framed.layers[1].pose.collapsed_opacity, 1.0);
    }

    #[test]
    fn identifiers_are_attribute_escaped() {
        assert_eq!(escape_attr(r#"a"b<c>&"#), "a&quot;b&lt;c&gt;&amp;");
    }

    #[test]
    fn interaction_state_machine() {
        assert_eq!(Interaction::default(), Interaction::Idle);
        assert_eq!(Interaction::Idle.toggle(), Interaction::Hovered);
        assert_eq!(Interaction::from_hovered(true).target_state(), StateKind::Expanded);
    }
}
