//! Template store: named reference images loaded from a flat directory

use super::types::Template;
use crate::error::{NavError, NavResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// File extensions accepted as templates. Only lossless formats keep exact pixel values.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["png", "bmp"];

/// Named templates, keyed by the file stem they were saved under
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Arc<Template>>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from already-decoded templates
    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut library = Self::new();
        for template in templates {
            library.insert(template);
        }
        library
    }

    /// Scan a directory for template images and load them all
    ///
    /// Names are case-sensitive and equal to the file stem, so `Classic Arena.png`
    /// is looked up as `"Classic Arena"`. Subdirectories and other file types are
    /// ignored; an image that fails to decode aborts the load.
    pub fn load_dir(directory: impl AsRef<Path>) -> NavResult<Self> {
        let dir_path = directory.as_ref();
        let entries = std::fs::read_dir(dir_path).map_err(|source| NavError::TemplateDirectory {
            path: dir_path.to_path_buf(),
            source,
        })?;

        let mut library = Self::new();
        for entry in entries {
            let entry = entry.map_err(|source| NavError::TemplateDirectory {
                path: dir_path.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || !has_template_extension(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("⚠️ Skipping template with non UTF-8 name: {:?}", path);
                continue;
            };

            let image = image::open(&path).map_err(|source| NavError::TemplateLoad {
                path: path.clone(),
                source,
            })?;
            let template = Template::from_dynamic(name, &image);
            log::debug!(
                "📐 Loaded template '{}' ({}x{}) from {:?}",
                name,
                template.width(),
                template.height(),
                path
            );
            library.insert(template);
        }

        log::info!(
            "✅ Loaded {} templates from {:?}: {:?}",
            library.len(),
            dir_path,
            library.names()
        );
        Ok(library)
    }

    pub fn insert(&mut self, template: Template) {
        self.templates
            .insert(template.name.clone(), Arc::new(template));
    }

    /// Look up a template by logical name
    pub fn get(&self, name: &str) -> NavResult<Arc<Template>> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| NavError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Sorted template names, for consistent listing
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEMPLATE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
