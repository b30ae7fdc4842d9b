pub mod app;
pub mod motion;
pub mod session;
pub mod tuner;

pub use app::{Action, AppState, Notice, ProjectUpload, Route, SvgFile, View, slugify};
pub use motion::{AnimationDriver, SpringDriver};
pub use session::ModifierSession;
pub use tuner::TunerSession;
