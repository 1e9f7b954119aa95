//! Renderer hand-off
//!
//! Checks that every required argument is present, reporting all missing names
//! at once, then passes the text to Handlebars.

use std::collections::HashMap;

use handlebars::Handlebars;
use tracing::{debug, info};

use crate::definition::{ArgumentSpec, PromptDefinition};
use crate::entry::PromptEntry;
use crate::error::PromptError;
use crate::format::PromptFormat;

/// Renders resolved prompt text with arguments
pub struct Renderer {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Apply defaults, validate required arguments, then render
    pub fn render(
        &self,
        template: &str,
        arguments: &[ArgumentSpec],
        values: &HashMap<String, String>,
    ) -> Result<String, PromptError> {
        debug!(arguments = arguments.len(), values = values.len(), "Renderer::render: called");
        let mut context = values.clone();
        for arg in arguments {
            if !context.contains_key(&arg.name)
                && let Some(default) = &arg.default
            {
                debug!(name = %arg.name, "Renderer::render: applying default");
                context.insert(arg.name.clone(), default.clone());
            }
        }

        let missing: Vec<String> = arguments
            .iter()
            .filter(|a| a.required && !context.contains_key(&a.name))
            .map(|a| a.name.clone())
            .collect();
        if !missing.is_empty() {
            debug!(?missing, "Renderer::render: missing required arguments");
            return Err(PromptError::MissingArguments { names: missing });
        }

        self.hbs
            .render_template(template, &context)
            .map_err(|e| PromptError::Render(e.to_string()))
    }

    /// Render a structured definition
    pub fn render_definition(
        &self,
        definition: &PromptDefinition,
        values: &HashMap<String, String>,
    ) -> Result<String, PromptError> {
        info!("Rendering prompt definition '{}'", definition.name);
        self.render(&definition.template, &definition.arguments, values)
    }

    /// Render any entry
    ///
    /// Structured entries are parsed as definitions. For other formats every
    /// `{{ placeholder }}` in the text is a required argument.
    pub fn render_entry(
        &self,
        name: &str,
        entry: &PromptEntry,
        values: &HashMap<String, String>,
    ) -> Result<String, PromptError> {
        debug!(%name, format = %entry.format(), "Renderer::render_entry: called");
        if entry.format() == PromptFormat::StructuredData {
            let definition = PromptDefinition::from_entry(name, entry)?;
            return self.render_definition(&definition, values);
        }

        let arguments: Vec<ArgumentSpec> = entry.variables().into_iter().map(ArgumentSpec::required).collect();
        self.render(entry.text(), &arguments, values)
    }
}
