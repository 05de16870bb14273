//! HTML fragments for the gallery, the latest panel and the page shell.

use crate::latest::LatestSlot;

/// Page shell with the site navigation fragment injected into the header.
pub fn base_template(title: &str, nav_fragment: Option<&str>, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - GOES</title>
    <style>{css}</style>
</head>
<body>
    <header>{nav}</header>
    <main class="container">
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        css = CSS,
        nav = nav_fragment.unwrap_or(""),
        content = content,
    )
}

/// Framed thumbnail for one image.
pub fn thumbnail(src: &str, datetime: Option<&str>) -> String {
    let title = datetime
        .map(|dt| format!(r#" title="{}""#, html_escape(dt)))
        .unwrap_or_default();
    format!(
        r#"<div class="col-sm-6"><center><img class="img-responsive" src="{}"{}></center></div>"#,
        html_escape(src),
        title
    )
}

/// Row wrapping two thumbnails.
pub fn gallery_row(left: &str, right: &str) -> String {
    format!(r#"<div class="row">{}{}</div>"#, left, right)
}

/// Search results section.
pub fn search_results(elements: &str, share_link: Option<&str>) -> String {
    let share = share_link
        .map(|link| {
            format!(
                r#"<p class="share"><a href="{0}">{0}</a></p>"#,
                html_escape(link)
            )
        })
        .unwrap_or_default();
    format!(
        r#"{}
        <div id="search-results">
{}
        </div>"#,
        share, elements
    )
}

/// Latest full-disk panel with one figure per slot.
pub fn latest_panel(slots: &[(&str, &LatestSlot)]) -> String {
    let mut figures = String::new();
    for (caption, slot) in slots {
        let img = match &slot.image_src {
            Some(src) => format!(r#"<img class="img-responsive" src="{}">"#, html_escape(src)),
            None => r#"<img class="img-responsive">"#.to_string(),
        };
        let updated = slot
            .updated_label
            .as_deref()
            .map(html_escape)
            .unwrap_or_default();
        figures.push_str(&format!(
            r#"
        <div class="col-sm-6">
            <figure>
                {}
                <figcaption>{} <span class="last-update">{}</span></figcaption>
            </figure>
        </div>"#,
            img,
            html_escape(caption),
            updated
        ));
    }
    format!(r#"<div class="row">{}</div>"#, figures)
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Minimal grid styles for standalone pages.
pub const CSS: &str = r#"
body { font-family: sans-serif; margin: 0; background: #111; color: #eee; }
header { padding: 0.5em 1em; background: #222; }
main.container { padding: 1em; }
.row { display: flex; flex-wrap: wrap; }
.col-sm-6 { flex: 0 0 50%; box-sizing: border-box; padding: 0.5em; }
.img-responsive { max-width: 100%; height: auto; }
.share a { color: #8cf; word-break: break-all; }
.last-update { color: #999; }
"#;
