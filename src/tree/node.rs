use serde::Serialize;

use super::{ComponentSymbol, Operator, Statement};

/// Handle of a node inside an [`Arena`](super::Arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Value held by a leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    Text(String),
    Statement(Box<Statement>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Leaf {
        entry: Entry,
        /// Property leaves linked to this leaf by suffix.
        private_links: Vec<NodeId>,
    },
    Combination {
        operator: Operator,
        left: NodeId,
        right: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    /// Set on the top node of a component occurrence; children resolve it by walking up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentSymbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_left: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_right: Vec<String>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            component: None,
            suffix: None,
            annotation: None,
            shared_left: Vec::new(),
            shared_right: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            NodeKind::Combination { operator, .. } => Some(operator),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Combination { left, right, .. } => Some((left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf {
                entry: Entry::Text(text),
                ..
            } => Some(text),
            _ => None,
        }
    }

    pub fn statement(&self) -> Option<&Statement> {
        match &self.kind {
            NodeKind::Leaf {
                entry: Entry::Statement(statement),
                ..
            } => Some(statement),
            _ => None,
        }
    }

    pub fn private_links(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf { private_links, .. } => private_links,
            NodeKind::Combination { .. } => &[],
        }
    }
}
