//! Markdown prompt templates.
//!
//! - **Render**: literal `{{ name }}` substitution
//! - **Store**: locating template files in the configured directories

mod render;
mod store;

pub use render::{
    RenderMode, TemplateError, placeholders, render, render_with, unresolved, vars,
};
pub use store::{
    BUILTIN_META_PROMPT, DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_DIR, Template, TemplateSource,
    TemplateStore, load_file,
};
