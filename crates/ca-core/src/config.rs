//! Editor configuration: slider ranges, transition profiles, preview canvas.
//!
//! Everything here is advisory input for the UI and the animation driver.
//! The parameter store itself never clamps or validates values.

use crate::model::TransformField;
use serde::{Deserialize, Serialize};

// ─── Sliders ─────────────────────────────────────────────────────────────

/// UI range for one transform field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp a value into the range. Offered to callers; never applied
    /// implicitly.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Slider ranges for all four fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub x: SliderRange,
    pub y: SliderRange,
    pub rotate: SliderRange,
    pub scale: SliderRange,
}

impl SliderConfig {
    /// Ranges used by the card tuner, whose y travel is narrower.
    pub const TUNER: SliderConfig = SliderConfig {
        y: SliderRange::new(-100.0, 100.0, 1.0),
        ..SliderConfig::MODIFIER
    };

    /// Ranges used by the uploaded-SVG modifier.
    pub const MODIFIER: SliderConfig = SliderConfig {
        x: SliderRange::new(-200.0, 200.0, 1.0),
        y: SliderRange::new(-200.0, 200.0, 1.0),
        rotate: SliderRange::new(-180.0, 180.0, 0.1),
        scale: SliderRange::new(0.1, 2.0, 0.01),
    };

    pub fn range(&self, field: TransformField) -> SliderRange {
        match field {
            TransformField::X => self.x,
            TransformField::Y => self.y,
            TransformField::Rotate => self.rotate,
            TransformField::Scale => self.scale,
        }
    }
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self::MODIFIER
    }
}

// ─── Transitions ─────────────────────────────────────────────────────────

/// Damped spring used for transform interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            stiffness: 400.0,
            damping: 35.0,
            mass: 1.0,
        }
    }
}

/// Fixed-duration linear opacity fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fade {
    pub duration_ms: u32,
    pub delay_ms: u32,
}

impl Fade {
    pub const fn new(duration_ms: u32, delay_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms,
        }
    }
}

/// How a layer moves between its endpoints.
///
/// `fade_in` applies to the fragment becoming visible, `fade_out` to the one
/// being hidden. `delay_ms` staggers the transform spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionProfile {
    pub spring: Spring,
    pub delay_ms: u32,
    pub fade_in: Fade,
    pub fade_out: Fade,
}

impl TransitionProfile {
    /// Card tuner preview: slower, delayed fade-in and a quick fade-out.
    pub fn tuner() -> Self {
        Self {
            fade_in: Fade::new(400, 100),
            fade_out: Fade::new(100, 0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

impl Default for TransitionProfile {
    fn default() -> Self {
        Self {
            spring: Spring::default(),
            delay_ms: 0,
            fade_in: Fade::new(200, 0),
            fade_out: Fade::new(150, 0),
        }
    }
}

// ─── Preview ─────────────────────────────────────────────────────────────

/// Output canvas for the live preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub width: f64,
    pub height: f64,
    /// Used when neither uploaded document declares a `viewBox`.
    pub default_view_box: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 460.0,
            height: 240.0,
            default_view_box: "0 0 236 123".to_string(),
        }
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

/// Layout of the exported variant literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportConfig {
    /// Spaces per nesting level. Default: **2**.
    pub indent: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}
