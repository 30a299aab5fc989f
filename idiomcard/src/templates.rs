//! HTML pages of the workflow, rendered with minijinja.
//!
//! Templates are compiled into the binary. Names ending in `.html` are auto-escaped, so OCR
//! output and dictionary text can be passed straight through.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::errors::{Error, Result};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("upload.html", include_str!("../templates/upload.html")),
    ("scan.html", include_str!("../templates/scan.html")),
    ("select.html", include_str!("../templates/select.html")),
    ("results.html", include_str!("../templates/results.html")),
    ("card.html", include_str!("../templates/card.html")),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render the template `name` with `context`
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<Html<String>> {
        let html = self
            .env
            .get_template(name)
            .and_then(|template| template.render(context))
            .map_err(|e| Error::Other(anyhow::anyhow!("Failed to render {name}: {e:#}")))?;
        Ok(Html(html))
    }
}
