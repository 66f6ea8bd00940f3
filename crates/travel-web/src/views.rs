//! Page rendering via `minijinja`.
//!
//! The two pages ship inside the binary. Operators can restyle them
//! without recompiling by pointing [`ViewRenderer::from_dir`] at a
//! directory holding `index.html` and `new.html`. Template names end in
//! `.html`, so `minijinja` escapes every interpolated value.

use std::path::Path;

use minijinja::Environment;
use serde::Serialize;
use travel_types::{CountryCode, User, UserId};

use crate::error::WebError;

/// Template for the tracker page.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Template for the new-user form.
pub const NEW_USER_TEMPLATE: &str = "new.html";

/// Colour used when the current user is missing from the roster.
pub const DEFAULT_COLOR: &str = "teal";

/// Data for the tracker page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    /// Visited country codes of the current user.
    pub countries: Vec<CountryCode>,
    /// Number of visited countries.
    pub total: usize,
    /// Every profile, for the user switcher.
    pub users: Vec<User>,
    /// Current user's colour.
    pub color: String,
    /// Current user's id, to highlight the active tab.
    pub current_user_id: UserId,
    /// Visited city names of the current user.
    pub visited_cities: Vec<String>,
    /// Inline error message, when re-rendering after a failed submission.
    pub error: Option<String>,
    /// Raw value echoed back into the country field.
    pub country_input: Option<String>,
    /// Raw value echoed back into the city field.
    pub city_input: Option<String>,
}

/// Which tracker-page form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// `POST /add`.
    Country,
    /// `POST /add-city`.
    City,
}

/// Data for the new-user form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewUserView {
    /// Inline error message.
    pub error: Option<String>,
    /// Previously submitted name.
    pub name: Option<String>,
    /// Previously submitted colour.
    pub color: Option<String>,
}

/// Renders pages from a pre-loaded template environment.
#[derive(Debug)]
pub struct ViewRenderer {
    env: Environment<'static>,
}

impl ViewRenderer {
    /// Use the templates compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] if a built-in template fails to parse.
    pub fn embedded() -> Result<Self, WebError> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        env.add_template(NEW_USER_TEMPLATE, include_str!("../templates/new.html"))?;
        Ok(Self { env })
    }

    /// Load `index.html` and `new.html` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::TemplateFile`] if a file cannot be read, or
    /// [`WebError::Template`] if it fails to parse.
    pub fn from_dir(dir: &Path) -> Result<Self, WebError> {
        let mut env = Environment::new();
        for name in [INDEX_TEMPLATE, NEW_USER_TEMPLATE] {
            let path = dir.join(name);
            let source = std::fs::read_to_string(&path).map_err(|source| WebError::TemplateFile {
                path: path.display().to_string(),
                source,
            })?;
            env.add_template_owned(name, source)?;
        }
        tracing::info!(dir = %dir.display(), "Loaded page templates from disk");
        Ok(Self { env })
    }

    /// Render the tracker page.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] if rendering fails.
    pub fn render_index(&self, view: &IndexView) -> Result<String, WebError> {
        Ok(self.env.get_template(INDEX_TEMPLATE)?.render(view)?)
    }

    /// Render the new-user form.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] if rendering fails.
    pub fn render_new_user(&self, view: &NewUserView) -> Result<String, WebError> {
        Ok(self.env.get_template(NEW_USER_TEMPLATE)?.render(view)?)
    }
}
