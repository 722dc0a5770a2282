//! Navigation tree.
//!
//! The tree mirrors the order in which `@page` and `@##`+ directives appear
//! in each page. Its root is the nav page; the root's children are the
//! top-level entries.

use serde::Serialize;
use tagdoc_compiler::ContentNode;

use crate::error::PageError;
use crate::store::PageStore;

/// Tree entry: a nested page or a sub-heading of the parent page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavNode {
    /// Page pulled in with `@page`.
    Page(PageNode),
    /// Heading of level 2 or deeper.
    Heading(NavHeading),
}

/// Page entry of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageNode {
    /// Page reference.
    pub reference: String,
    /// Route (the reference until routes are resolved).
    pub route: String,
    /// Depth in the tree (0 for the root).
    pub level: usize,
    /// Page title.
    pub title: String,
    /// Nested pages and headings, in source order.
    pub children: Vec<NavNode>,
}

/// Heading leaf of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavHeading {
    /// Route (empty until routes are resolved).
    pub route: String,
    /// Heading level (2-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
}

impl PageStore {
    /// Build the navigation subtree rooted at `root_reference`.
    ///
    /// `@page` tags become nested [`PageNode`]s at `depth + 1`; headings of
    /// level 2 and deeper become [`NavHeading`] leaves. The level 1 heading
    /// is the page title and is not repeated as a child.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::MissingPage`] if the root or any `@page` target is
    /// not stored, and [`PageError::CyclicPage`] if a page nests itself.
    pub fn build_tree(&self, root_reference: &str, depth: usize) -> Result<PageNode, PageError> {
        let mut ancestors = Vec::new();
        self.build_node(root_reference, depth, &mut ancestors)
    }

    fn build_node<'a>(
        &'a self,
        reference: &'a str,
        depth: usize,
        ancestors: &mut Vec<&'a str>,
    ) -> Result<PageNode, PageError> {
        if ancestors.contains(&reference) {
            return Err(PageError::CyclicPage {
                reference: reference.to_owned(),
            });
        }

        let page = self.pages.get(reference).ok_or_else(|| PageError::MissingPage {
            reference: reference.to_owned(),
        })?;

        ancestors.push(reference);

        let mut children = Vec::new();
        for node in &page.contents {
            match node {
                ContentNode::Tag(tag) if tag.tag_name == "page" => {
                    let child = self.build_node(tag.raw_value.trim(), depth + 1, ancestors)?;
                    children.push(NavNode::Page(child));
                }
                ContentNode::Heading(heading) if heading.level > 1 => {
                    children.push(NavNode::Heading(NavHeading {
                        route: String::new(),
                        level: heading.level,
                        title: heading.raw_value.clone(),
                    }));
                }
                _ => {}
            }
        }

        ancestors.pop();

        Ok(PageNode {
            reference: page.reference.clone(),
            route: page.reference.clone(),
            level: depth,
            title: page.title.clone(),
            children,
        })
    }
}
