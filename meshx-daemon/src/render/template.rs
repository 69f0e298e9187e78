//! Page templates
//!
//! The built-in layout is used unless `render.template` points at a file.
//! File templates are plain HTML with `{{name}}` placeholders.

use std::path::Path;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::page::PageData;
use crate::{DaemonError, Result};

/// Turns page data into the bytes written to disk
pub trait PageTemplate: Send + Sync {
    fn render(&self, page: &PageData) -> Vec<u8>;
}

impl<T: PageTemplate + ?Sized> PageTemplate for Box<T> {
    fn render(&self, page: &PageData) -> Vec<u8> {
        (**self).render(page)
    }
}

fn page_title(page: &PageData) -> String {
    if page.is_summary {
        format!("Latest block #{}", page.height)
    } else {
        format!("Block #{}", page.height)
    }
}

/// Built-in HTML layout
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTemplate;

impl PageTemplate for HtmlTemplate {
    fn render(&self, page: &PageData) -> Vec<u8> {
        let title = encode_text(&page_title(page)).into_owned();

        let mut nav = String::new();
        if !page.prev_hash.is_empty() {
            nav.push_str(&format!(
                "<a class=\"prev\" href=\"/block/id/{}\">&larr; {}</a>",
                encode_double_quoted_attribute(&page.prev_hash),
                encode_text(&page.prev_hash)
            ));
        }
        if !page.next_hash.is_empty() {
            nav.push_str(&format!(
                "<a class=\"next\" href=\"/block/id/{}\">{} &rarr;</a>",
                encode_double_quoted_attribute(&page.next_hash),
                encode_text(&page.next_hash)
            ));
        }
        if !page.is_summary {
            nav.push_str("<a class=\"latest\" href=\"/\">latest</a>");
        }

        let html = format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n\
             <h1>{title}</h1>\n\
             <nav>{nav}</nav>\n\
             <table class=\"header\">\
             <tr><td>Hash</td><td><a href=\"/block/id/{hash_attr}\">{hash}</a></td></tr>\
             <tr><td>Previous</td><td>{prev_hash}</td></tr>\
             <tr><td>Height</td><td>{height}</td></tr>\
             </table>\n\
             <section class=\"transactions\">{transactions}</section>\n\
             </body>\n\
             </html>\n",
            title = title,
            nav = nav,
            hash_attr = encode_double_quoted_attribute(&page.hash),
            hash = encode_text(&page.hash),
            prev_hash = encode_text(&page.prev_hash),
            height = page.height,
            transactions = page.transactions_html,
        );
        html.into_bytes()
    }
}

/// Placeholders a file template may use
const PLACEHOLDERS: &[&str] = &[
    "title",
    "hash",
    "prev_hash",
    "next_hash",
    "height",
    "transactions",
    "is_summary",
    "is_prev",
];

/// Operator-supplied HTML layout, read once at startup
#[derive(Debug, Clone)]
pub struct FileTemplate {
    source: String,
}

impl FileTemplate {
    /// Read a template file, rejecting unknown placeholders
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            DaemonError::Config(format!("Failed to read template {}: {}", path.display(), e))
        })?;
        Self::parse(source)
            .map_err(|e| DaemonError::Config(format!("Template {}: {}", path.display(), e)))
    }

    pub fn parse(source: String) -> std::result::Result<Self, String> {
        let mut rest = source.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| "unclosed {{".to_string())?;
            let name = after[..end].trim();
            if !PLACEHOLDERS.contains(&name) {
                return Err(format!("unknown placeholder {{{{{}}}}}", name));
            }
            rest = &after[end + 2..];
        }
        Ok(Self { source })
    }

    fn value(page: &PageData, name: &str) -> String {
        match name {
            "title" => encode_text(&page_title(page)).into_owned(),
            "hash" => encode_double_quoted_attribute(&page.hash).into_owned(),
            "prev_hash" => encode_double_quoted_attribute(&page.prev_hash).into_owned(),
            "next_hash" => encode_double_quoted_attribute(&page.next_hash).into_owned(),
            "height" => page.height.to_string(),
            // Already markup
            "transactions" => page.transactions_html.clone(),
            "is_summary" => page.is_summary.to_string(),
            "is_prev" => page.is_prev.to_string(),
            _ => String::new(),
        }
    }
}

impl PageTemplate for FileTemplate {
    fn render(&self, page: &PageData) -> Vec<u8> {
        // Single pass, so substituted values are never scanned for placeholders
        let mut out = String::with_capacity(self.source.len() + page.transactions_html.len());
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    out.push_str(&Self::value(page, after[..end].trim()));
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out.into_bytes()
    }
}
