//! Directory listing renderer
//!
//! Turns the children of a directory into an HTML page. The template is
//! compiled once at startup and shared read-only by every request.

use crate::error::{Result, ServeError};
use minijinja::{context, Environment};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

const TEMPLATE_NAME: &str = "listing.html";
const TEMPLATE_SOURCE: &str = include_str!("../../templates/listing.html");

/// Characters escaped in listing links; `/` stays literal
const HREF_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// File name as enumerated
    pub name: String,
    /// Request path joined with `name`, used for linking only
    pub path: String,
}

impl DirectoryEntry {
    /// Entry for `name` listed under `requested_path`
    pub fn new(requested_path: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = format!("{}/{name}", requested_path.trim_end_matches('/'));
        Self { name, path }
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    href: String,
}

/// HTML renderer for directory listings
pub struct DirectoryLister {
    env: Environment<'static>,
}

impl DirectoryLister {
    pub fn new() -> std::result::Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
        Ok(Self { env })
    }

    /// Render the listing page for `requested_path`
    pub fn render(&self, requested_path: &str, entries: &[DirectoryEntry]) -> Result<String> {
        let views: Vec<EntryView<'_>> = entries
            .iter()
            .map(|entry| EntryView {
                name: &entry.name,
                href: utf8_percent_encode(&entry.path, HREF_SET).to_string(),
            })
            .collect();

        self.env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| {
                template.render(context! {
                    title => requested_path,
                    entries => views,
                })
            })
            .map_err(|e| ServeError::Render(e.to_string()))
    }
}

impl std::fmt::Debug for DirectoryLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryLister").finish_non_exhaustive()
    }
}
