//! Paired-thumbnail gallery layout for search results.
//!
//! Pairing is a pure function over the record list; [`render`] then turns
//! each gallery item into markup and appends it to a [`ResultsContainer`].

use url::Url;

use crate::models::ImageRecord;
use crate::templates;

/// Default prefix for relative asset paths.
pub const DEFAULT_ASSET_ROOT: &str = "/assets";

/// One top-level gallery element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryItem<'a> {
    /// Two thumbnails side by side.
    Row(&'a ImageRecord, &'a ImageRecord),
    /// Trailing thumbnail of an odd-length list, without a row wrapper.
    Single(&'a ImageRecord),
}

/// Group records two at a time, keeping order. An odd record at the end is
/// emitted on its own.
pub fn pair_records(records: &[ImageRecord]) -> Vec<GalleryItem<'_>> {
    let pairs = records.chunks_exact(2);
    let remainder = pairs.remainder();

    let mut items: Vec<GalleryItem<'_>> = pairs
        .map(|pair| GalleryItem::Row(&pair[0], &pair[1]))
        .collect();
    if let [last] = remainder {
        items.push(GalleryItem::Single(last));
    }
    items
}

/// Maps record paths to displayable image sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    root: String,
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_ROOT)
    }
}

impl AssetResolver {
    /// `root` may be a path (`/assets`) or a full URL (`https://host/assets`).
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Web URLs (`http`, `https` or scheme-relative `//host`) and paths
    /// already under the root pass through unchanged; anything else is
    /// joined under the root.
    pub fn resolve(&self, path: &str) -> String {
        if is_web_url(path) {
            return path.to_string();
        }
        if !self.root.is_empty() && path.starts_with(&format!("{}/", self.root)) {
            return path.to_string();
        }
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }
}

/// Only web schemes count; `goes16:fd.jpg` parses as a URL but is a file name.
fn is_web_url(path: &str) -> bool {
    path.starts_with("//")
        || Url::parse(path)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
}

/// Element list that search results are appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsContainer {
    elements: Vec<String>,
}

impl ResultsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, element: String) {
        self.elements.push(element);
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn to_html(&self) -> String {
        self.elements.join("\n")
    }
}

/// Append the gallery for `records` to `container`. Existing content is kept;
/// callers wanting replacement must clear first. Returns the number of
/// top-level elements appended.
pub fn render(
    container: &mut ResultsContainer,
    records: &[ImageRecord],
    assets: &AssetResolver,
) -> usize {
    let items = pair_records(records);
    let count = items.len();
    for item in items {
        let element = match item {
            GalleryItem::Row(left, right) => templates::gallery_row(
                &templates::thumbnail(&assets.resolve(&left.path), left.datetime.as_deref()),
                &templates::thumbnail(&assets.resolve(&right.path), right.datetime.as_deref()),
            ),
            GalleryItem::Single(record) => {
                templates::thumbnail(&assets.resolve(&record.path), record.datetime.as_deref())
            }
        };
        container.append(element);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<ImageRecord> {
        (0..n)
            .map(|i| ImageRecord::new(format!("img{i}.jpg")))
            .collect()
    }

    fn counts(items: &[GalleryItem<'_>]) -> (usize, usize) {
        let rows = items
            .iter()
            .filter(|i| matches!(i, GalleryItem::Row(..)))
            .count();
        (rows, items.len() - rows)
    }

    #[test]
    fn test_pair_counts() {
        for n in 0..12 {
            let recs = records(n);
            let items = pair_records(&recs);
            assert_eq!(items.len(), n.div_ceil(2), "n = {n}");
            let (rows, singles) = counts(&items);
            assert_eq!(rows, n / 2);
            assert_eq!(singles, n % 2);
        }
    }

    #[test]
    fn test_pair_keeps_order() {
        let recs = records(3);
        let items = pair_records(&recs);
        assert_eq!(
            items,
            vec![
                GalleryItem::Row(&recs[0], &recs[1]),
                GalleryItem::Single(&recs[2]),
            ]
        );
    }

    #[test]
    fn test_single_record_has_no_row() {
        let recs = records(1);
        assert_eq!(pair_records(&recs), vec![GalleryItem::Single(&recs[0])]);
    }

    #[test]
    fn test_render_empty_leaves_container() {
        let mut container = ResultsContainer::new();
        container.append("<p>previous</p>".to_string());
        let appended = render(&mut container, &[], &AssetResolver::default());
        assert_eq!(appended, 0);
        assert_eq!(container.elements(), &["<p>previous</p>".to_string()][..]);
    }

    #[test]
    fn test_render_five_records() {
        let mut container = ResultsContainer::new();
        render(&mut container, &records(5), &AssetResolver::default());
        assert_eq!(container.len(), 3);

        let rows = container
            .elements()
            .iter()
            .filter(|e| e.starts_with(r#"<div class="row">"#))
            .count();
        assert_eq!(rows, 2);
        assert!(container.elements()[2].starts_with(r#"<div class="col-sm-6">"#));
        assert!(container.elements()[2].contains(r#"src="/assets/img4.jpg""#));
    }

    #[test]
    fn test_render_appends() {
        let mut container = ResultsContainer::new();
        let assets = AssetResolver::default();
        render(&mut container, &records(2), &assets);
        render(&mut container, &records(2), &assets);
        assert_eq!(container.len(), 2);

        container.clear();
        assert!(container.is_empty());
    }

    #[test]
    fn test_resolve_relative_path() {
        let assets = AssetResolver::default();
        assert_eq!(assets.resolve("a.jpg"), "/assets/a.jpg");
        assert_eq!(assets.resolve("/2023/a.jpg"), "/assets/2023/a.jpg");
    }

    #[test]
    fn test_resolve_passes_through_urls_and_rooted_paths() {
        let assets = AssetResolver::new("/assets/");
        assert_eq!(assets.root(), "/assets");
        assert_eq!(
            assets.resolve("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(assets.resolve("/assets/a.jpg"), "/assets/a.jpg");
    }

    #[test]
    fn test_resolve_scheme_like_names_stay_relative() {
        let assets = AssetResolver::default();
        assert_eq!(assets.resolve("goes16:fd.jpg"), "/assets/goes16:fd.jpg");
        assert_eq!(assets.resolve("c:/a.jpg"), "/assets/c:/a.jpg");
        assert_eq!(
            assets.resolve("//cdn.example.com/a.jpg"),
            "//cdn.example.com/a.jpg"
        );
        assert_eq!(
            assets.resolve("http://cdn.example.com/a.jpg"),
            "http://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_resolve_under_url_root() {
        let assets = AssetResolver::new("https://goes.example.com/assets");
        assert_eq!(
            assets.resolve("fd/a.jpg"),
            "https://goes.example.com/assets/fd/a.jpg"
        );
    }
}
