//! Application state: routes, uploaded projects, and the upload flow.
//!
//! State changes go through `AppState::reduce`, which returns the next state
//! plus an optional blocking notice for the user.

use ca_core::error::{AnimatorError, AnimatorResult};
use ca_core::model::{Project, StateKind};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

// ─── Routes ──────────────────────────────────────────────────────────────

const MODIFIER_SUFFIX: &str = "-modifier";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Route {
    Home,
    CardTuner,
    Upload,
    /// Project editor; holds the project slug.
    Modifier(String),
    Unknown(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        match path {
            "/" => Route::Home,
            "/card-animator" => Route::CardTuner,
            "/upload-svg" => Route::Upload,
            _ if path.ends_with(MODIFIER_SUFFIX) => {
                Route::Modifier(slug_from_path(path))
            }
            _ => Route::Unknown(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::CardTuner => "/card-animator".to_string(),
            Route::Upload => "/upload-svg".to_string(),
            Route::Modifier(slug) => modifier_path(slug),
            Route::Unknown(path) => path.clone(),
        }
    }
}

fn slug_from_path(path: &str) -> String {
    let rest = path
        .strip_prefix("-/")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(path);
    rest.replacen(MODIFIER_SUFFIX, "", 1)
}

pub fn modifier_path(slug: &str) -> String {
    format!("/{slug}{MODIFIER_SUFFIX}")
}

/// Lowercase, collapse every run of characters outside `[a-z0-9]` into a
/// single `-`, and trim dashes from both ends.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

// ─── Upload ──────────────────────────────────────────────────────────────

/// A user-selected file and its text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgFile {
    pub file_name: String,
    pub text: String,
}

impl SvgFile {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

/// Upload form contents. Either file may not have been chosen yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpload {
    pub collapsed: Option<SvgFile>,
    pub expanded: Option<SvgFile>,
}

impl ProjectUpload {
    /// Project named after the collapsed file, minus a `.svg` extension.
    pub fn into_project(self) -> AnimatorResult<Project> {
        let Some(collapsed) = self.collapsed else {
            return Err(AnimatorError::MissingUpload {
                state: StateKind::Collapsed,
            });
        };
        let Some(expanded) = self.expanded else {
            return Err(AnimatorError::MissingUpload {
                state: StateKind::Expanded,
            });
        };
        Ok(Project {
            name: strip_svg_extension(&collapsed.file_name).to_string(),
            collapsed_svg: collapsed.text,
            expanded_svg: expanded.text,
        })
    }
}

fn strip_svg_extension(file_name: &str) -> &str {
    let cut = file_name.len().saturating_sub(4);
    match file_name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(".svg") => &file_name[..cut],
        _ => file_name,
    }
}

// ─── Reducer ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    CreateProject(ProjectUpload),
}

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<AnimatorError> for Notice {
    fn from(err: AnimatorError) -> Self {
        Notice {
            message: err.to_string(),
        }
    }
}

/// What the page should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "slug", rename_all = "camelCase")]
pub enum View {
    Home,
    CardTuner,
    Upload,
    Modifier(String),
    ProjectNotFound(String),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    route: Route,
    /// Keyed by slug, in creation order.
    projects: IndexMap<String, Project>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::Home,
            projects: IndexMap::new(),
        }
    }
}

impl AppState {
    pub fn at(path: &str) -> Self {
        Self {
            route: Route::parse(path),
            ..Self::default()
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn project(&self, slug: &str) -> Option<&Project> {
        self.projects.get(slug)
    }

    pub fn projects(&self) -> impl Iterator<Item = (&str, &Project)> {
        self.projects.iter().map(|(slug, p)| (slug.as_str(), p))
    }

    /// Project behind the current modifier route.
    pub fn current_project(&self) -> AnimatorResult<&Project> {
        match &self.route {
            Route::Modifier(slug) => self
                .projects
                .get(slug)
                .ok_or_else(|| AnimatorError::UnknownProject { slug: slug.clone() }),
            _ => Err(AnimatorError::UnknownProject {
                slug: String::new(),
            }),
        }
    }

    #[must_use]
    pub fn reduce(mut self, action: Action) -> (Self, Option<Notice>) {
        match action {
            Action::Navigate(path) => {
                self.route = Route::parse(&path);
                (self, None)
            }
            Action::CreateProject(upload) => match upload.into_project() {
                Ok(project) => {
                    let slug = slugify(&project.name);
                    log::debug!("project `{}` stored as `{slug}`", project.name);
                    self.route = Route::parse(&modifier_path(&slug));
                    self.projects.insert(slug, project);
                    (self, None)
                }
                Err(err) => {
                    log::debug!("upload rejected: {err}");
                    (self, Some(err.into()))
                }
            },
        }
    }

    /// An empty slug is an ordinary key: a project saved under `""` opens as `View::Modifier("")`.
    pub fn view(&self) -> View {
        match &self.route {
            Route::Home => View::Home,
            Route::CardTuner => View::CardTuner,
            Route::Upload => View::Upload,
            Route::Modifier(slug) if self.projects.contains_key(slug) => View::Modifier(slug.clone()),
            Route::Modifier(slug) => View::ProjectNotFound(slug.clone()),
            Route::Unknown(_) => View::Blank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_fixed_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/card-animator"), Route::CardTuner);
        assert_eq!(Route::parse("/upload-svg"), Route::Upload);
        assert_eq!(Route::parse("/nope"), Route::Unknown("/nope".to_string()));
    }

    #[test]
    fn modifier_slug_drops_first_suffix_only() {
        assert_eq!(Route::parse("/logo-modifier"), Route::Modifier("logo".to_string()));
        assert_eq!(
            Route::parse("/a-modifier-b-modifier"),
            Route::Modifier("a-b-modifier".to_string())
        );
        assert_eq!(Route::Modifier("logo".to_string()).path(), "/logo-modifier");
    }

    #[test]
    fn modifier_routes_tolerate_missing_or_dashed_slash() {
        assert_eq!(Route::parse("-/logo-modifier"), Route::Modifier("logo".to_string()));
        assert_eq!(Route::parse("logo-modifier"), Route::Modifier("logo".to_string()));
        assert_eq!(Route::parse("/-modifier"), Route::Modifier(String::new()));
    }

    #[test]
    fn empty_slug_project_is_reachable() {
        let mut state = AppState::at("/-modifier");
        assert_eq!(state.view(), View::ProjectNotFound(String::new()));
        state.projects.insert(
            String::new(),
            Project {
                name: "???".to_string(),
                collapsed_svg: "<svg/>".to_string(),
                expanded_svg: "<svg/>".to_string(),
            },
        );
        assert_eq!(state.view(), View::Modifier(String::new()));
    }

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("My Cool  Card!"), "my-cool-card");
        assert_eq!(slugify("--Hello__World--"), "hello-world");
        assert_eq!(slugify("v2.0 final"), "v2-0-final");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn svg_extension_is_case_insensitive() {
        assert_eq!(strip_svg_extension("Card.SVG"), "Card");
        assert_eq!(strip_svg_extension("card.svg.bak"), "card.svg.bak");
        assert_eq!(strip_svg_extension("svg"), "svg");
        assert_eq!(strip_svg_extension("ä.svg"), "ä");
    }

    #[test]
    fn missing_file_is_reported() {
        let upload = ProjectUpload {
            collapsed: Some(SvgFile::new("a.svg", "<svg/>")),
            expanded: None,
        };
        let err = upload.into_project().unwrap_err();
        assert_eq!(err, AnimatorError::MissingUpload { state: StateKind::Expanded });
        assert_eq!(err.to_string(), "Please select both Collapsed and Expanded SVG files.");
    }
}
