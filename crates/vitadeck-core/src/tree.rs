use crate::node::{NodeId, Props};

/// What a reader sees of one committed node.
#[derive(Clone, Copy, Debug)]
pub enum NodeView<'a> {
    Element { id: NodeId, props: &'a Props },
    Text(&'a str),
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> Option<NodeId> {
        match self {
            NodeView::Element { id, .. } => Some(*id),
            NodeView::Text(_) => None,
        }
    }
}

/// Read-only traversal over a committed scene graph.
///
/// Both backends implement this so the draw-list compiler walks them the same
/// way, whether nodes are shared `Rc`s or arena slots.
pub trait SceneTree {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// Top-level children of the container, in paint order.
    fn roots(&self) -> impl Iterator<Item = Self::Node<'_>>;

    fn view<'a>(&'a self, node: Self::Node<'a>) -> Option<NodeView<'a>>;

    fn children<'a>(&'a self, node: Self::Node<'a>) -> impl Iterator<Item = Self::Node<'a>> + 'a;

    /// Concatenation of the raw text directly under `node`.
    fn text_content<'a>(&'a self, node: Self::Node<'a>) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            if let Some(NodeView::Text(s)) = self.view(child) {
                out.push_str(s);
            }
        }
        out
    }

    /// Number of element nodes reachable from the container.
    fn element_count(&self) -> usize {
        fn walk<'a, T: SceneTree + ?Sized>(tree: &'a T, node: T::Node<'a>) -> usize {
            let own = match tree.view(node) {
                Some(NodeView::Element { .. }) => 1,
                _ => 0,
            };
            own + tree.children(node).map(|c| walk(tree, c)).sum::<usize>()
        }
        self.roots().map(|n| walk(self, n)).sum()
    }
}
