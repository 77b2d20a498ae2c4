use std::path::{Path, PathBuf};

use super::{slugify, StorageError};
use crate::config::APP_NAME;
use crate::pipeline::generation::ArticleDocument;

const HIGHLIGHT_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.min.css";
const HIGHLIGHT_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";

/// Standalone HTML page for a finished article.
///
/// Titles are escaped; content fields are already sanitized markup and are
/// inserted verbatim so `language-*` classes reach the highlighter.
pub fn render_article_html(document: &ArticleDocument, generated_on: &str) -> String {
    let title = escape_html(&document.title);
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str(&format!("<link rel=\"stylesheet\" href=\"{HIGHLIGHT_CSS}\">\n"));
    html.push_str(
        "<style>\n\
         body { max-width: 48rem; margin: 2rem auto; padding: 0 1rem; font-family: sans-serif; line-height: 1.6; }\n\
         pre { overflow-x: auto; }\n\
         footer { margin-top: 3rem; color: #666; font-size: 0.85rem; }\n\
         </style>\n",
    );
    html.push_str("</head>\n<body>\n<article>\n");
    html.push_str(&format!("<h1>{title}</h1>\n"));

    html.push_str("<section class=\"introduction\">\n");
    html.push_str(&document.introduction);
    html.push_str("\n</section>\n");

    for section in &document.sections {
        html.push_str("<section>\n");
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(&section.title)));
        html.push_str(&section.content);
        html.push('\n');
        for subsection in &section.subsections {
            html.push_str(&format!("<h3>{}</h3>\n", escape_html(&subsection.title)));
            html.push_str(&subsection.content);
            html.push('\n');
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"conclusion\">\n<h2>Conclusion</h2>\n");
    html.push_str(&document.conclusion);
    html.push_str("\n</section>\n</article>\n");

    html.push_str(&format!(
        "<footer>Generated by {} on {}</footer>\n",
        APP_NAME,
        escape_html(generated_on)
    ));
    html.push_str(&format!("<script src=\"{HIGHLIGHT_JS}\"></script>\n"));
    html.push_str("<script>hljs.highlightAll();</script>\n");
    html.push_str("</body>\n</html>\n");

    html
}

/// Render and write `<slug>.html` into `dir`, stamped with today's date.
pub fn save_article_html(dir: &Path, document: &ArticleDocument) -> Result<PathBuf, StorageError> {
    let generated_on = chrono::Local::now().format("%Y-%m-%d").to_string();
    let html = render_article_html(document, &generated_on);

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.html", slugify(&document.title)));
    std::fs::write(&path, html)?;
    Ok(path)
}

/// Replaces: & < > " '
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
