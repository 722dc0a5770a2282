//! Route computation.
//!
//! Page routes are slash-separated reference paths (`guide/setup`); heading
//! routes append a slug to their page route with a dot
//! (`guide/setup.first-steps`). A level 1 heading is the page title and
//! shares the page route. The nav root has the empty route, so headings
//! placed directly on it are routed by slug alone.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tagdoc_compiler::ContentNode;

use crate::nav::{NavNode, PageNode};
use crate::store::PageStore;

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_./]+").unwrap());

/// Lowercase a title and collapse every run of characters outside
/// `[A-Za-z0-9_./]` into a single hyphen.
///
/// # Examples
///
/// ```
/// use tagdoc_pages::slugify;
///
/// assert_eq!(slugify("Section One"), "section-one");
/// assert_eq!(slugify("v1.2 / API"), "v1.2-/-api");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    NON_SLUG.replace_all(&title.to_lowercase(), "-").into_owned()
}

fn heading_route(parent_route: &str, level: u8, title: &str) -> String {
    if level <= 1 {
        parent_route.to_owned()
    } else if parent_route.is_empty() {
        slugify(title)
    } else {
        format!("{parent_route}.{}", slugify(title))
    }
}

impl PageStore {
    /// Assign routes to the tree and write them back into the stored pages.
    ///
    /// The nav root is the empty route. Top-level pages (children of the
    /// nav root) are routed by reference; nested pages append `/reference`
    /// to their parent route. Every heading inside a routed page's content
    /// is updated too, so the tree and the page contents agree. Pages the
    /// tree never reaches keep their reference as route.
    pub fn resolve_routes(&mut self, tree: &mut PageNode) {
        let mut routed = HashSet::new();

        tree.route = String::new();
        self.apply_route(&tree.reference, "");
        routed.insert(tree.reference.clone());

        for child in &mut tree.children {
            match child {
                NavNode::Page(page) => self.route_page(page, None, &mut routed),
                NavNode::Heading(heading) => {
                    heading.route = heading_route("", heading.level, &heading.title);
                }
            }
        }

        let orphans: Vec<String> = self
            .pages
            .keys()
            .filter(|r| !routed.contains(*r))
            .cloned()
            .collect();
        for reference in orphans {
            tracing::debug!(reference = %reference, "Page not reachable from navigation");
            let route = reference.clone();
            self.apply_route(&reference, &route);
        }
    }

    fn route_page(&mut self, node: &mut PageNode, parent: Option<&str>, routed: &mut HashSet<String>) {
        node.route = match parent {
            Some(parent) => format!("{parent}/{}", node.reference),
            None => node.reference.clone(),
        };
        self.apply_route(&node.reference, &node.route);
        routed.insert(node.reference.clone());

        for child in &mut node.children {
            match child {
                NavNode::Page(page) => self.route_page(page, Some(&node.route), routed),
                NavNode::Heading(heading) => {
                    heading.route = heading_route(&node.route, heading.level, &heading.title);
                }
            }
        }
    }

    fn apply_route(&mut self, reference: &str, route: &str) {
        let Some(page) = self.pages.get_mut(reference) else {
            return;
        };

        page.route = route.to_owned();
        for node in &mut page.contents {
            if let ContentNode::Heading(heading) = node {
                heading.route = heading_route(route, heading.level, &heading.raw_value);
            }
        }
    }
}
