//! Fixed card/icon tables for the cloud-selector tuner.
//!
//! Unlike the uploaded-SVG modifier, the tuner animates a pre-authored
//! three-card illustration. Its tables are keyed by a closed set of targets
//! and start from hand-tuned values.

use crate::config::{ExportConfig, TransitionProfile};
use crate::export::{ExportBlock, export_variants};
use crate::model::{GroupAnimationParams, StateKind, TransformField, TransformState};
use serde::Serialize;

/// One of the three cloud cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TunerTarget {
    Gcp,
    Aws,
    Azure,
}

impl TunerTarget {
    /// Targets in table and export order.
    pub const ALL: [TunerTarget; 3] = [TunerTarget::Gcp, TunerTarget::Aws, TunerTarget::Azure];

    pub fn key(self) -> &'static str {
        match self {
            TunerTarget::Gcp => "gcp",
            TunerTarget::Aws => "aws",
            TunerTarget::Azure => "azure",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    fn index(self) -> usize {
        match self {
            TunerTarget::Gcp => 0,
            TunerTarget::Aws => 1,
            TunerTarget::Azure => 2,
        }
    }

    /// Stagger applied to a card's transform spring.
    pub fn card_delay_ms(self) -> u32 {
        match self {
            TunerTarget::Gcp => 0,
            TunerTarget::Aws => 50,
            TunerTarget::Azure => 100,
        }
    }
}

/// Which part of a card a table drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TunerLayer {
    Card,
    Icon,
}

impl TunerLayer {
    pub const ALL: [TunerLayer; 2] = [TunerLayer::Card, TunerLayer::Icon];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "card" => Some(TunerLayer::Card),
            "icon" => Some(TunerLayer::Icon),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            TunerLayer::Card => "Final Card Animation Variants",
            TunerLayer::Icon => "Final Icon Animation Variants",
        }
    }

    fn binding(self) -> &'static str {
        match self {
            TunerLayer::Card => "cardAnimationVariants",
            TunerLayer::Icon => "iconAnimationVariants",
        }
    }

    /// Transition for `target` on this layer. Cards stagger; icons don't.
    pub fn profile(self, target: TunerTarget) -> TransitionProfile {
        match self {
            TunerLayer::Card => TransitionProfile::tuner().with_delay(target.card_delay_ms()),
            TunerLayer::Icon => TransitionProfile::tuner(),
        }
    }
}

/// Parameters for the three targets of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TunerTable {
    pub gcp: GroupAnimationParams,
    pub aws: GroupAnimationParams,
    pub azure: GroupAnimationParams,
}

const fn t(x: f64, y: f64, rotate: f64, scale: f64) -> TransformState {
    TransformState::new(x, y, rotate, scale)
}

impl TunerTable {
    pub const DEFAULT_CARDS: TunerTable = TunerTable {
        gcp: GroupAnimationParams::new(t(44.0, 2.0, -12.5, 0.95), t(5.0, 1.0, -2.0, 1.0)),
        aws: GroupAnimationParams::new(t(2.0, -7.0, 0.4, 0.95), t(8.0, 0.0, 0.0, 1.0)),
        azure: GroupAnimationParams::new(t(-40.0, 1.0, 11.4, 0.95), t(1.0, 2.0, -0.4, 1.0)),
    };

    pub const DEFAULT_ICONS: TunerTable = TunerTable {
        gcp: GroupAnimationParams::new(t(-6.0, 2.0, 7.3, 1.0), TransformState::IDENTITY),
        aws: GroupAnimationParams::new(t(3.0, -4.0, 0.2, 0.95), TransformState::IDENTITY),
        azure: GroupAnimationParams::new(t(14.0, 0.0, -7.5, 1.05), TransformState::IDENTITY),
    };

    pub fn defaults(layer: TunerLayer) -> Self {
        match layer {
            TunerLayer::Card => Self::DEFAULT_CARDS,
            TunerLayer::Icon => Self::DEFAULT_ICONS,
        }
    }

    pub fn get(&self, target: TunerTarget) -> &GroupAnimationParams {
        match target {
            TunerTarget::Gcp => &self.gcp,
            TunerTarget::Aws => &self.aws,
            TunerTarget::Azure => &self.azure,
        }
    }

    /// New table with exactly one cell changed.
    #[must_use]
    pub fn set_field(
        &self,
        target: TunerTarget,
        state: StateKind,
        field: TransformField,
        value: f64,
    ) -> Self {
        let mut next = *self;
        let slot = match target {
            TunerTarget::Gcp => &mut next.gcp,
            TunerTarget::Aws => &mut next.aws,
            TunerTarget::Azure => &mut next.azure,
        };
        *slot = slot.with_field(state, field, value);
        next
    }

    pub fn entries(&self) -> [(TunerTarget, GroupAnimationParams); 3] {
        let mut out = [(TunerTarget::Gcp, GroupAnimationParams::IDENTITY); 3];
        for target in TunerTarget::ALL {
            out[target.index()] = (target, *self.get(target));
        }
        out
    }

    fn export_block(&self, layer: TunerLayer) -> ExportBlock {
        let entries = self
            .entries()
            .into_iter()
            .map(|(target, params)| (target.key().to_string(), params))
            .collect();
        ExportBlock::new(layer.label(), layer.binding(), entries)
    }
}

/// Both layers' tables together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TunerParams {
    pub cards: TunerTable,
    pub icons: TunerTable,
}

impl Default for TunerParams {
    fn default() -> Self {
        Self {
            cards: TunerTable::DEFAULT_CARDS,
            icons: TunerTable::DEFAULT_ICONS,
        }
    }
}

impl TunerParams {
    pub fn table(&self, layer: TunerLayer) -> &TunerTable {
        match layer {
            TunerLayer::Card => &self.cards,
            TunerLayer::Icon => &self.icons,
        }
    }

    #[must_use]
    pub fn set_field(
        &self,
        layer: TunerLayer,
        target: TunerTarget,
        state: StateKind,
        field: TransformField,
        value: f64,
    ) -> Self {
        let mut next = *self;
        match layer {
            TunerLayer::Card => next.cards = self.cards.set_field(target, state, field, value),
            TunerLayer::Icon => next.icons = self.icons.set_field(target, state, field, value),
        }
        next
    }

    /// Card block then icon block.
    pub fn export_blocks(&self) -> Vec<ExportBlock> {
        TunerLayer::ALL
            .iter()
            .map(|layer| self.table(*layer).export_block(*layer))
            .collect()
    }

    #[must_use]
    pub fn export_text(&self) -> String {
        export_variants(&self.export_blocks(), &ExportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::parse_export;

    #[test]
    fn target_keys_roundtrip() {
        for target in TunerTarget::ALL {
            assert_eq!(TunerTarget::from_key(target.key()), Some(target));
        }
        assert_eq!(TunerTarget::from_key("oracle"), None);
    }

    #[test]
    fn set_field_leaves_other_targets() {
        let params = TunerParams::default();
        let next = params.set_field(
            TunerLayer::Icon,
            TunerTarget::Aws,
            StateKind::Expanded,
            TransformField::Y,
            -3.0,
        );
        assert_eq!(next.icons.aws.expanded.y, -3.0);
        assert_eq!(next.icons.gcp, params.icons.gcp);
        assert_eq!(next.cards, params.cards);
        assert_eq!(params.icons.aws.expanded.y, 0.0);
    }

    #[test]
    fn export_starts_with_card_block() {
        let text = TunerParams::default().export_text();
        assert!(text.starts_with(
            "// Final Card Animation Variants\nconst cardAnimationVariants = {\n  \"gcp\": {\n    \"collapsed\": {\n      \"x\": 44,"
        ));
        assert!(text.contains("};\n\n// Final Icon Animation Variants\nconst iconAnimationVariants = {"));
        assert!(text.ends_with("}\n};"));
    }

    #[test]
    fn export_roundtrips_defaults() {
        let params = TunerParams::default();
        let blocks = parse_export(&params.export_text()).unwrap();
        assert_eq!(blocks, params.export_blocks());
        assert_eq!(blocks[1].entries[2].1.collapsed.scale, 1.05);
    }

    #[test]
    fn card_profiles_stagger() {
        assert_eq!(TunerLayer::Card.profile(TunerTarget::Azure).delay_ms, 100);
        assert_eq!(TunerLayer::Icon.profile(TunerTarget::Azure).delay_ms, 0);
    }
}
