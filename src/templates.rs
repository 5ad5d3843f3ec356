//! Clip templates.
//!
//! A template is Logseq text with `{{variable}}` placeholders. Six templates
//! ship with the crate; users can add their own by name through
//! [`Settings::templates`](crate::settings::Settings::templates). Lookup by
//! key always resolves a built-in first; a custom template sharing a
//! built-in's name only replaces it in the [`TemplateSet::all`] listing.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::logseq::format_date;
use crate::patterns::TEMPLATE_VAR;

/// Variables every template is expected to reference.
const REQUIRED_VARIABLES: &[&str] = &["title", "url"];

/// A shipped template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltIn {
    pub key: &'static str,
    pub name: &'static str,
    pub template: &'static str,
}

pub const BUILT_INS: &[BuiltIn] = &[
    BuiltIn {
        key: "article",
        name: "Article",
        template: "- **{{title}}**
  collapsed:: true
  type:: article
  url:: {{url}}
  date-clipped:: {{date}}
  tags:: {{tags}}
  - {{content}}",
    },
    BuiltIn {
        key: "video",
        name: "Video/YouTube",
        template: "- **{{title}}**
  collapsed:: true
  type:: video
  url:: {{url}}
  date-clipped:: {{date}}
  tags:: {{tags}}
  - ## Notes
    - {{content}}",
    },
    BuiltIn {
        key: "tweet",
        name: "Tweet/Social",
        template: "- **Tweet from {{author}}**
  type:: tweet
  url:: {{url}}
  date-clipped:: {{date}}
  - > {{content}}",
    },
    BuiltIn {
        key: "recipe",
        name: "Recipe",
        template: "- **{{title}}**
  collapsed:: true
  type:: recipe
  url:: {{url}}
  date-clipped:: {{date}}
  tags:: recipe, {{tags}}
  - ## Ingredients
    -
  - ## Instructions
    - {{content}}",
    },
    BuiltIn {
        key: "bookmark",
        name: "Simple Bookmark",
        template: "- [{{title}}]({{url}})
  date-clipped:: {{date}}
  tags:: {{tags}}",
    },
    BuiltIn {
        key: "quote",
        name: "Quote",
        template: "- > {{selection}}
  source:: [{{title}}]({{url}})
  date-clipped:: {{date}}",
    },
];

/// Look up a shipped template by key.
#[must_use]
pub fn built_in(key: &str) -> Option<&'static BuiltIn> {
    BUILT_INS.iter().find(|b| b.key == key)
}

/// Values substituted into a template. Missing fields fall back to defaults
/// when rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateData {
    pub title: Option<String>,
    pub url: Option<String>,
    /// Pre-formatted date; today in `yyyy-MM-dd` when absent.
    pub date: Option<String>,
    pub content: Option<String>,
    pub selection: Option<String>,
    pub author: Option<String>,
    pub tags: Option<String>,
}

impl TemplateData {
    fn value(&self, variable: &str, today: NaiveDate) -> Option<String> {
        let given = |field: &Option<String>| field.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        let value = match variable {
            "title" => given(&self.title).unwrap_or_else(|| "Untitled".to_string()),
            "url" => given(&self.url).unwrap_or_default(),
            "date" => given(&self.date).unwrap_or_else(|| format_date(today, "yyyy-MM-dd")),
            "content" => given(&self.content).unwrap_or_default(),
            "selection" => given(&self.selection)
                .or_else(|| given(&self.content))
                .unwrap_or_default(),
            "author" => given(&self.author).unwrap_or_else(|| "Unknown".to_string()),
            "tags" => given(&self.tags).unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }
}

/// Substitute variables using today's local date as the `{{date}}` default.
///
/// Unknown placeholders are left as they are.
///
/// ```
/// use logseq_clipper::templates::{render, TemplateData};
///
/// let data = TemplateData {
///     url: Some("https://example.com".into()),
///     ..TemplateData::default()
/// };
/// assert_eq!(render("[{{title}}]({{url}}) {{other}}", &data), "[Untitled](https://example.com) {{other}}");
/// ```
#[must_use]
pub fn render(template: &str, data: &TemplateData) -> String {
    render_on(template, data, Local::now().date_naive())
}

/// [`render`] with an explicit date for the `{{date}}` default.
#[must_use]
pub fn render_on(template: &str, data: &TemplateData, today: NaiveDate) -> String {
    TEMPLATE_VAR
        .replace_all(template, |caps: &regex::Captures<'_>| {
            data.value(&caps[1], today).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Warnings for a template missing a required variable. Templates are never
/// rejected.
#[must_use]
pub fn validate(template: &str) -> Vec<String> {
    REQUIRED_VARIABLES
        .iter()
        .filter(|v| !template.contains(&format!("{{{{{v}}}}}")))
        .map(|v| format!("Template is missing {{{{{v}}}}} variable"))
        .collect()
}

/// One entry of [`TemplateSet::all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEntry {
    pub name: String,
    pub template: String,
    pub is_built_in: bool,
}

/// Built-in templates overlaid with user templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    custom: BTreeMap<String, String>,
}

impl TemplateSet {
    #[must_use]
    pub fn new(custom: BTreeMap<String, String>) -> Self {
        Self { custom }
    }

    /// Template text for `key`; built-ins are checked first.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        built_in(key)
            .map(|b| b.template)
            .or_else(|| self.custom.get(key).map(String::as_str))
    }

    /// Every template by key. A custom template replaces a built-in of the
    /// same key in this listing.
    #[must_use]
    pub fn all(&self) -> BTreeMap<String, TemplateEntry> {
        let mut all: BTreeMap<String, TemplateEntry> = BUILT_INS
            .iter()
            .map(|b| {
                (
                    b.key.to_string(),
                    TemplateEntry {
                        name: b.name.to_string(),
                        template: b.template.to_string(),
                        is_built_in: true,
                    },
                )
            })
            .collect();
        for (key, template) in &self.custom {
            all.insert(
                key.clone(),
                TemplateEntry {
                    name: key.clone(),
                    template: template.clone(),
                    is_built_in: false,
                },
            );
        }
        all
    }
}
