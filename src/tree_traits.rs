use std::fmt;

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::arena::Tree;
use crate::config::RenderSettings;
use crate::node::NodeRef;

/// Conversion into a printable `termtree` rendering.
pub trait TreeRender {
    fn to_termtree(&self) -> TermTree<String> {
        self.to_termtree_with(&RenderSettings::default())
    }

    fn to_termtree_with(&self, settings: &RenderSettings) -> TermTree<String>;
}

impl<'a, T: fmt::Display> TreeRender for NodeRef<'a, T> {
    fn to_termtree_with(&self, settings: &RenderSettings) -> TermTree<String> {
        let leaves: Vec<_> = self
            .children()
            .map(|child| child.to_termtree_with(settings))
            .collect();

        TermTree::new(label(self, settings)).with_leaves(leaves)
    }
}

impl<T: fmt::Display> TreeRender for Tree<T> {
    #[instrument(level = "debug", skip_all, fields(nodes = self.len()))]
    fn to_termtree_with(&self, settings: &RenderSettings) -> TermTree<String> {
        self.root().to_termtree_with(settings)
    }
}

fn label<T: fmt::Display>(node: &NodeRef<'_, T>, settings: &RenderSettings) -> String {
    let text = match node.value() {
        Ok(value) => value.to_string(),
        Err(_) => settings.empty_label.clone(),
    };
    if settings.show_ids {
        format!("{} [{}]", text, node.id())
    } else {
        text
    }
}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_termtree())
    }
}
