//! Card tuner session: the fixed three-card preview and its two tables.

use crate::motion::{AnimationDriver, SpringDriver};
use ca_core::compositor::{Interaction, LayerPose};
use ca_core::id::GroupId;
use ca_core::model::{StateKind, TransformField};
use ca_core::tuner::{TunerLayer, TunerParams, TunerTarget};
use serde::Serialize;

/// Sampled pose of one card or icon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TunerFrame {
    pub layer: TunerLayer,
    pub target: TunerTarget,
    pub pose: LayerPose,
}

pub struct TunerSession<D: AnimationDriver = SpringDriver> {
    params: TunerParams,
    interaction: Interaction,
    driver: D,
}

impl Default for TunerSession<SpringDriver> {
    fn default() -> Self {
        Self::with_driver(SpringDriver::new())
    }
}

/// Driver key for one animated element.
fn track_id(layer: TunerLayer, target: TunerTarget) -> GroupId {
    let layer = match layer {
        TunerLayer::Card => "card",
        TunerLayer::Icon => "icon",
    };
    GroupId::intern(&format!("tuner:{layer}:{}", target.key()))
}

impl<D: AnimationDriver> TunerSession<D> {
    pub fn with_driver(driver: D) -> Self {
        let mut session = Self {
            params: TunerParams::default(),
            interaction: Interaction::default(),
            driver,
        };
        session.retarget_all();
        session
    }

    pub fn params(&self) -> &TunerParams {
        &self.params
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn set_field(
        &mut self,
        layer: TunerLayer,
        target: TunerTarget,
        state: StateKind,
        field: TransformField,
        value: f64,
    ) {
        self.params = self.params.set_field(layer, target, state, field, value);
        if state == self.interaction.target_state() {
            self.retarget(layer, target);
        }
    }

    pub fn set_interaction(&mut self, interaction: Interaction) {
        if interaction == self.interaction {
            return;
        }
        self.interaction = interaction;
        self.retarget_all();
    }

    /// Back to the hand-tuned tables.
    pub fn reset(&mut self) {
        self.params = TunerParams::default();
        self.retarget_all();
    }

    fn retarget(&mut self, layer: TunerLayer, target: TunerTarget) {
        let params = self.params.table(layer).get(target);
        let pose = LayerPose::settled(params, self.interaction.target_state());
        self.driver
            .retarget(track_id(layer, target), pose, &layer.profile(target));
    }

    fn retarget_all(&mut self) {
        for layer in TunerLayer::ALL {
            for target in TunerTarget::ALL {
                self.retarget(layer, target);
            }
        }
    }

    /// Advance the animation. Returns `true` while anything is still moving.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.driver.tick(dt_ms);
        !self.driver.is_settled()
    }

    /// Current poses, cards first, each layer in target order.
    pub fn frame(&self) -> Vec<TunerFrame> {
        let state = self.interaction.target_state();
        TunerLayer::ALL
            .into_iter()
            .flat_map(|layer| TunerTarget::ALL.into_iter().map(move |target| (layer, target)))
            .map(|(layer, target)| {
                let pose = self.driver.sample(track_id(layer, target)).unwrap_or_else(|| {
                    LayerPose::settled(self.params.table(layer).get(target), state)
                });
                TunerFrame {
                    layer,
                    target,
                    pose,
                }
            })
            .collect()
    }

    pub fn export_text(&self) -> String {
        self.params.export_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_at_collapsed_defaults() {
        let session = TunerSession::default();
        let frame = session.frame();
        assert_eq!(frame.len(), 6);
        assert_eq!(frame[0].layer, TunerLayer::Card);
        assert_eq!(frame[0].target, TunerTarget::Gcp);
        assert_eq!(frame[0].pose.transform.x, 44.0);
        assert_eq!(frame[5].pose.transform.scale, 1.05);
    }

    #[test]
    fn cards_stagger_on_hover() {
        let mut session = TunerSession::default();
        session.set_interaction(Interaction::Hovered);
        session.tick(40.0);
        let frame = session.frame();
        // gcp has no delay, azure waits 100 ms.
        assert!(frame[0].pose.transform.x < 44.0);
        assert_eq!(frame[2].pose.transform.x, -40.0);

        while session.tick(16.0) {}
        let frame = session.frame();
        assert_eq!(frame[2].pose.transform.x, 1.0);
        assert_eq!(frame[2].pose.expanded_opacity, 1.0);
    }

    #[test]
    fn reset_restores_tables() {
        let mut session = TunerSession::default();
        session.set_field(
            TunerLayer::Card,
            TunerTarget::Gcp,
            StateKind::Collapsed,
            TransformField::X,
            0.0,
        );
        assert_eq!(session.params().cards.gcp.collapsed.x, 0.0);
        session.reset();
        assert_eq!(session.params(), &TunerParams::default());
    }
}
