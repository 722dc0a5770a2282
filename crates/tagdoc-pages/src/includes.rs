//! `@include` splicing.

use std::collections::HashMap;

use tagdoc_compiler::ContentNode;

use crate::error::PageError;
use crate::store::PageStore;

const INCLUDE_TAG: &str = "include";

impl PageStore {
    /// Replace every `@include <reference>` node with the content of the
    /// referenced page.
    ///
    /// The included nodes are spliced in place, with no wrapper. Includes are
    /// expanded transitively: an included page's own includes are resolved
    /// first. Must run before the navigation tree is built.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::MissingInclude`] if a target does not exist and
    /// [`PageError::CyclicInclude`] if a page includes itself.
    pub fn resolve_includes(&mut self) -> Result<(), PageError> {
        let mut expanded: HashMap<String, Vec<ContentNode>> = HashMap::new();
        let mut stack = Vec::new();

        let references: Vec<String> = self.pages.keys().cloned().collect();
        for reference in &references {
            self.expand(reference, reference, &mut expanded, &mut stack)?;
        }

        for (reference, contents) in expanded {
            if let Some(page) = self.pages.get_mut(&reference) {
                page.contents = contents;
            }
        }

        Ok(())
    }

    fn expand(
        &self,
        reference: &str,
        including: &str,
        expanded: &mut HashMap<String, Vec<ContentNode>>,
        stack: &mut Vec<String>,
    ) -> Result<(), PageError> {
        if expanded.contains_key(reference) {
            return Ok(());
        }
        if stack.iter().any(|r| r == reference) {
            return Err(PageError::CyclicInclude {
                reference: reference.to_owned(),
            });
        }

        let page = self
            .pages
            .get(reference)
            .ok_or_else(|| PageError::MissingInclude {
                page: including.to_owned(),
                reference: reference.to_owned(),
            })?;

        stack.push(reference.to_owned());

        let mut contents = Vec::with_capacity(page.contents.len());
        for node in &page.contents {
            let Some(tag) = node.tag_named(INCLUDE_TAG) else {
                contents.push(node.clone());
                continue;
            };

            let target = tag.raw_value.trim();
            self.expand(target, reference, expanded, stack)?;
            if let Some(included) = expanded.get(target) {
                contents.extend(included.iter().cloned());
            }
        }

        stack.pop();
        expanded.insert(reference.to_owned(), contents);
        Ok(())
    }
}
