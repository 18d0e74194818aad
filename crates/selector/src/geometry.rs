//! Geometry query - which links sit under the selection rectangle
//!
//! A plain linear scan over every hyperlink on each call. Nothing is cached
//! between calls: layout can change between two pointer moves.

use dom::{NodeId, PageDocument, Point, SelectionRect};
use url::Url;

/// A hyperlink under the selection, with its resolved target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Non-owning reference into the page
    pub element: NodeId,
    pub url: Url,
}

/// Links whose box strictly overlaps the rectangle spanned by `p1` and `p2`.
///
/// Corner order does not matter. Results follow document order. Links
/// without a rendered box or with a non-navigational `href` are skipped.
pub fn query_links_in_rect<P>(page: &P, p1: Point, p2: Point) -> Vec<LinkCandidate>
where
    P: PageDocument + ?Sized,
{
    let rect = SelectionRect::from_points(p1, p2);
    let base = page.base_url();

    page.query_candidates()
        .into_iter()
        .filter(|&element| {
            page.bounding_box(element)
                .map(|bounds| rect.overlaps(&bounds))
                .unwrap_or(false)
        })
        .filter_map(|element| {
            let url = resolve_href(base, page.href(element)?)?;
            Some(LinkCandidate { element, url })
        })
        .collect()
}

/// Resolve a raw `href` against the page location.
///
/// Empty values, in-page fragments and `javascript:` references yield
/// `None`, as do values that do not parse as a URL.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || is_script_reference(href) {
        return None;
    }

    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Unresolvable href {:?}: {}", href, e);
            None
        }
    }
}

fn is_script_reference(href: &str) -> bool {
    const SCHEME: &str = "javascript:";
    href.get(..SCHEME.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(SCHEME))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{Document, DomNode, DomRect};

    fn page() -> Document {
        Document::new("https://ex.com/x/y").unwrap()
    }

    fn urls(candidates: &[LinkCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn test_resolves_relative_href() {
        let mut doc = page();
        doc.add_link("/a/b", DomRect::new(10.0, 10.0, 50.0, 20.0)).unwrap();
        doc.add_link("c", DomRect::new(10.0, 40.0, 50.0, 20.0)).unwrap();

        let found = query_links_in_rect(&doc, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(urls(&found), vec!["https://ex.com/a/b", "https://ex.com/x/c"]);
    }

    #[test]
    fn test_excludes_fragment_and_script_links() {
        let mut doc = page();
        let inside = DomRect::new(10.0, 10.0, 20.0, 20.0);
        doc.add_link("#top", inside).unwrap();
        doc.add_link("javascript:void(0)", inside).unwrap();
        doc.add_link("  JavaScript:alert(1)", inside).unwrap();
        doc.add_link("", inside).unwrap();
        let kept = doc.add_link("https://other.org/page#frag", inside).unwrap();

        let found = query_links_in_rect(&doc, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element, kept);
        assert_eq!(found[0].url.as_str(), "https://other.org/page#frag");
    }

    #[test]
    fn test_strict_overlap_only() {
        let mut doc = page();
        let overlapping = doc.add_link("/in", DomRect::new(90.0, 90.0, 20.0, 20.0)).unwrap();
        doc.add_link("/edge-right", DomRect::new(100.0, 0.0, 20.0, 20.0)).unwrap();
        doc.add_link("/edge-bottom", DomRect::new(0.0, 100.0, 20.0, 20.0)).unwrap();
        doc.add_link("/far", DomRect::new(300.0, 300.0, 20.0, 20.0)).unwrap();

        let found = query_links_in_rect(&doc, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element, overlapping);
    }

    #[test]
    fn test_corner_order_irrelevant() {
        let mut doc = page();
        doc.add_link("/a", DomRect::new(20.0, 20.0, 10.0, 10.0)).unwrap();
        doc.add_link("/b", DomRect::new(60.0, 20.0, 10.0, 10.0)).unwrap();

        let forward = query_links_in_rect(&doc, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let backward = query_links_in_rect(&doc, Point::new(50.0, 50.0), Point::new(0.0, 0.0));
        let mixed = query_links_in_rect(&doc, Point::new(0.0, 50.0), Point::new(50.0, 0.0));
        assert_eq!(forward, backward);
        assert_eq!(forward, mixed);
        assert_eq!(urls(&forward), vec!["https://ex.com/a"]);
    }

    #[test]
    fn test_unrendered_links_and_area_elements() {
        let mut doc = page();
        let body = doc.body();
        doc.append(body, DomNode::element("a").with_attr("href", "/hidden"))
            .unwrap();
        let area = doc
            .append(
                body,
                DomNode::element("area")
                    .with_attr("href", "/map")
                    .with_box(DomRect::new(5.0, 5.0, 5.0, 5.0)),
            )
            .unwrap();

        let found = query_links_in_rect(&doc, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element, area);
    }

    #[test]
    fn test_requery_sees_layout_changes() {
        let mut doc = page();
        let link = doc.add_link("/moving", DomRect::new(10.0, 10.0, 10.0, 10.0)).unwrap();
        let (p1, p2) = (Point::new(0.0, 0.0), Point::new(50.0, 50.0));

        assert_eq!(query_links_in_rect(&doc, p1, p2).len(), 1);
        doc.set_bounding_box(link, Some(DomRect::new(200.0, 10.0, 10.0, 10.0)))
            .unwrap();
        assert!(query_links_in_rect(&doc, p1, p2).is_empty());
    }

    #[test]
    fn test_resolve_href_edge_cases() {
        let base = Url::parse("https://ex.com/x/y").unwrap();
        assert_eq!(resolve_href(&base, "   "), None);
        assert_eq!(resolve_href(&base, "#"), None);
        assert_eq!(resolve_href(&base, "jav"), Some(base.join("jav").unwrap()));
        assert_eq!(
            resolve_href(&base, "//cdn.ex.com/z").unwrap().as_str(),
            "https://cdn.ex.com/z"
        );
        assert_eq!(resolve_href(&base, "http://[::1"), None);
    }
}
