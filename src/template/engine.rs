use handlebars::{no_escape, Handlebars, Template};
use thiserror::Error;
use tracing::warn;

use super::sanitize::sanitize_name;
use super::types::{FolderNameContext, ImageNameContext};

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}

const IMAGE_TEMPLATE: &str = "image";
const FOLDER_TEMPLATE: &str = "folder";

/// Placeholder for images whose name renders empty
pub const UNTITLED_IMAGE: &str = "image";

/// Compiled naming templates for image files and album folders
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Compile the image name and folder name templates
    pub fn new(name_template: &str, folder_template: &str) -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        handlebars.register_template_string(IMAGE_TEMPLATE, name_template)?;
        handlebars.register_template_string(FOLDER_TEMPLATE, folder_template)?;
        Ok(Self { handlebars })
    }

    /// Check that a template compiles without registering it
    pub fn validate(template: &str) -> Result<(), TemplateError> {
        Template::compile(template)?;
        Ok(())
    }

    /// Render the raw (unsanitized) image name
    pub fn render_image(&self, context: &ImageNameContext) -> Result<String, TemplateError> {
        self.handlebars
            .render(IMAGE_TEMPLATE, context)
            .map_err(TemplateError::from)
    }

    /// Render the raw (unsanitized) folder name
    pub fn render_folder(&self, context: &FolderNameContext) -> Result<String, TemplateError> {
        self.handlebars
            .render(FOLDER_TEMPLATE, context)
            .map_err(TemplateError::from)
    }

    /// File base name for an image. Falls back to the title when the
    /// template fails or renders empty.
    pub fn image_base_name(&self, context: &ImageNameContext) -> String {
        let rendered = match self.render_image(context) {
            Ok(name) => sanitize_name(&name),
            Err(e) => {
                warn!("Failed to render name for image {}: {}", context.id, e);
                String::new()
            }
        };
        if !rendered.is_empty() {
            return rendered;
        }

        let fallback = sanitize_name(&context.title);
        if fallback.is_empty() {
            UNTITLED_IMAGE.to_string()
        } else {
            fallback
        }
    }

    /// Folder name for a container. Falls back to the container name when the
    /// template fails or renders empty.
    pub fn folder_name(&self, context: &FolderNameContext) -> String {
        let rendered = match self.render_folder(context) {
            Ok(name) => sanitize_name(&name),
            Err(e) => {
                warn!("Failed to render folder name for {}: {}", context.name, e);
                String::new()
            }
        };
        if rendered.is_empty() {
            sanitize_name(&context.name)
        } else {
            rendered
        }
    }
}
