pub mod compositor;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod id;
pub mod model;
pub mod params;
pub mod registry;
pub mod tuner;

pub use compositor::{Interaction, Layer, LayerPose, Scene, compose};
pub use config::{ExportConfig, Fade, PreviewConfig, SliderConfig, SliderRange, Spring, TransitionProfile};
pub use error::{AnimatorError, AnimatorResult};
pub use export::{ExportBlock, export_variants, parse_export};
pub use extract::extract_groups;
pub use id::GroupId;
pub use model::*;
pub use params::ParamTable;
pub use registry::GroupRegistry;
pub use tuner::{TunerLayer, TunerParams, TunerTable, TunerTarget};
