use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use writekit_editor::{Document, WriteResult};

pub const DEFAULT_CONFIG_NAME: &str = "writekit.config.json";

/// WriteKit configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Font for body text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,

    /// Body text size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,

    /// Page setup; anything left out keeps the Write default
    pub page: PageConfig,

    /// Tab stops shared by every paragraph
    pub tabs: Vec<TabConfig>,
}

/// Measurements in twips (1440 to the inch)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub margin_left: Option<i32>,
    pub margin_top: Option<i32>,
    pub margin_right: Option<i32>,
    pub margin_bottom: Option<i32>,
    pub header_distance: Option<i32>,
    pub footer_distance: Option<i32>,
    pub first_page_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabConfig {
    pub position: i32,
    #[serde(default)]
    pub decimal: bool,
}

impl Config {
    /// Load config from `path`, or from the default name in `cwd`.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(cwd: &str, path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
                if !default_path.exists() {
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        tracing::debug!(path = %config_path.display(), "config loaded");
        Ok(config)
    }

    /// Apply to a document before any content is added
    pub fn apply(&self, doc: &mut Document) -> WriteResult<()> {
        if let Some(name) = &self.font_name {
            doc.char_font_name(name)?;
        }
        if let Some(size) = self.font_size {
            doc.char_font_size(size)?;
        }

        let page = &self.page;
        let setters: [(Option<i32>, fn(&mut Document, i32) -> WriteResult<()>); 9] = [
            (page.width, Document::doc_page_width),
            (page.height, Document::doc_page_height),
            (page.margin_left, Document::doc_margin_left),
            (page.margin_top, Document::doc_margin_top),
            (page.margin_right, Document::doc_margin_right),
            (page.margin_bottom, Document::doc_margin_bottom),
            (page.header_distance, Document::doc_distance_from_top),
            (page.footer_distance, Document::doc_distance_from_bottom),
            (page.first_page_number, Document::doc_number_from),
        ];
        for (value, set) in setters {
            if let Some(value) = value {
                set(doc, value)?;
            }
        }

        for tab in &self.tabs {
            doc.doc_tab_set(tab.position, tab.decimal)?;
        }
        Ok(())
    }
}
