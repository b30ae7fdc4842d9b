//! Core data model for two-state group animations.
//!
//! Every named SVG group participates in a collapsed/expanded pair of
//! endpoints. Each endpoint is an affine `TransformState` (translate, rotate,
//! uniform scale). Groups are discovered from two uploaded SVG documents,
//! one per state; their inner markup is kept verbatim as an opaque `Markup`.

use crate::id::GroupId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ─── States & Fields ─────────────────────────────────────────────────────

/// One endpoint of the two-state animation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Collapsed,
    Expanded,
}

impl StateKind {
    /// Both states, collapsed first (scan and export order).
    pub const ALL: [StateKind; 2] = [StateKind::Collapsed, StateKind::Expanded];

    pub fn name(self) -> &'static str {
        match self {
            StateKind::Collapsed => "collapsed",
            StateKind::Expanded => "expanded",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "collapsed" => Some(StateKind::Collapsed),
            "expanded" => Some(StateKind::Expanded),
            _ => None,
        }
    }

    /// The opposite endpoint.
    pub fn other(self) -> Self {
        match self {
            StateKind::Collapsed => StateKind::Expanded,
            StateKind::Expanded => StateKind::Collapsed,
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single editable component of a `TransformState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformField {
    X,
    Y,
    Rotate,
    Scale,
}

impl TransformField {
    /// All fields in export order.
    pub const ALL: [TransformField; 4] = [
        TransformField::X,
        TransformField::Y,
        TransformField::Rotate,
        TransformField::Scale,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransformField::X => "x",
            TransformField::Y => "y",
            TransformField::Rotate => "rotate",
            TransformField::Scale => "scale",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(TransformField::X),
            "y" => Some(TransformField::Y),
            "rotate" => Some(TransformField::Rotate),
            "scale" => Some(TransformField::Scale),
            _ => None,
        }
    }
}

impl fmt::Display for TransformField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Transforms ──────────────────────────────────────────────────────────

/// Affine parameters of one endpoint: translate by (x, y), rotate by
/// `rotate` degrees about the group's local origin, uniform `scale`.
///
/// `scale > 0` is expected but not enforced; slider ranges are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub x: f64,
    pub y: f64,
    pub rotate: f64,
    pub scale: f64,
}

impl TransformState {
    /// Zero offsets, zero rotation, unit scale.
    pub const IDENTITY: TransformState = TransformState {
        x: 0.0,
        y: 0.0,
        rotate: 0.0,
        scale: 1.0,
    };

    pub const fn new(x: f64, y: f64, rotate: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            rotate,
            scale,
        }
    }

    pub fn get(&self, field: TransformField) -> f64 {
        match field {
            TransformField::X => self.x,
            TransformField::Y => self.y,
            TransformField::Rotate => self.rotate,
            TransformField::Scale => self.scale,
        }
    }

    pub fn set(&mut self, field: TransformField, value: f64) {
        match field {
            TransformField::X => self.x = value,
            TransformField::Y => self.y = value,
            TransformField::Rotate => self.rotate = value,
            TransformField::Scale => self.scale = value,
        }
    }

    /// Copy with a single field replaced.
    #[must_use]
    pub fn with(mut self, field: TransformField, value: f64) -> Self {
        self.set(field, value);
        self
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The collapsed/expanded endpoint pair for one group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupAnimationParams {
    pub collapsed: TransformState,
    pub expanded: TransformState,
}

impl GroupAnimationParams {
    pub const IDENTITY: GroupAnimationParams = GroupAnimationParams {
        collapsed: TransformState::IDENTITY,
        expanded: TransformState::IDENTITY,
    };

    pub const fn new(collapsed: TransformState, expanded: TransformState) -> Self {
        Self {
            collapsed,
            expanded,
        }
    }

    pub fn state(&self, kind: StateKind) -> &TransformState {
        match kind {
            StateKind::Collapsed => &self.collapsed,
            StateKind::Expanded => &self.expanded,
        }
    }

    pub fn state_mut(&mut self, kind: StateKind) -> &mut TransformState {
        match kind {
            StateKind::Collapsed => &mut self.collapsed,
            StateKind::Expanded => &mut self.expanded,
        }
    }

    /// Copy with exactly one (state, field) cell replaced.
    #[must_use]
    pub fn with_field(mut self, state: StateKind, field: TransformField, value: f64) -> Self {
        self.state_mut(state).set(field, value);
        self
    }
}

// ─── Parsed SVG ──────────────────────────────────────────────────────────

/// Document-level metadata of one state's root `<svg>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgEnvelope {
    pub view_box: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Raw inner markup of a group, embedded verbatim by the compositor.
///
/// Not validated or sanitized; cloning shares the underlying buffer. The
/// prefixed namespace declarations that were in scope at the group travel
/// with the text, so the fragment stays well-formed once it is moved out of
/// its source document.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Markup {
    text: Arc<str>,
    namespaces: Arc<[(String, String)]>,
}

impl Markup {
    pub fn new(raw: &str) -> Self {
        Markup {
            text: Arc::from(raw),
            namespaces: Arc::default(),
        }
    }

    /// Markup plus the `(prefix, uri)` pairs it may reference.
    pub fn with_namespaces(raw: &str, namespaces: Vec<(String, String)>) -> Self {
        Markup {
            text: Arc::from(raw),
            namespaces: Arc::from(namespaces),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Debug for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespaces.is_empty() {
            write!(f, "Markup({:?})", self.as_str())
        } else {
            write!(f, "Markup({:?}, {:?})", self.as_str(), self.namespaces)
        }
    }
}

impl Serialize for Markup {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One extracted group: its identifier and serialized child content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFragment {
    pub id: GroupId,
    pub inner: Markup,
}

/// Result of extracting one state's SVG document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub envelope: SvgEnvelope,
    /// Fragments in document order. Identifiers may repeat.
    pub groups: Vec<GroupFragment>,
}

// ─── Projects ────────────────────────────────────────────────────────────

/// A pair of uploaded SVG payloads plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub collapsed_svg: String,
    pub expanded_svg: String,
}

impl Project {
    pub fn source(&self, state: StateKind) -> &str {
        match state {
            StateKind::Collapsed => &self.collapsed_svg,
            StateKind::Expanded => &self.expanded_svg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_zero_offset_unit_scale() {
        let t = TransformState::default();
        assert_eq!(t, TransformState::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(GroupAnimationParams::default(), GroupAnimationParams::IDENTITY);
    }

    #[test]
    fn with_field_touches_one_cell() {
        let p = GroupAnimationParams::IDENTITY.with_field(
            StateKind::Expanded,
            TransformField::Rotate,
            45.0,
        );
        assert_eq!(p.expanded.rotate, 45.0);
        assert_eq!(p.collapsed, TransformState::IDENTITY);
        assert_eq!(p.expanded.with(TransformField::Rotate, 0.0), TransformState::IDENTITY);
    }

    #[test]
    fn names_roundtrip() {
        for state in StateKind::ALL {
            assert_eq!(StateKind::from_name(state.name()), Some(state));
        }
        for field in TransformField::ALL {
            assert_eq!(TransformField::from_name(field.name()), Some(field));
        }
        assert_eq!(TransformField::from_name("skew"), None);
        assert_eq!(StateKind::Collapsed.other(), StateKind::Expanded);
    }
}
