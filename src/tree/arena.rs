//! Arena holding every node of a decoded input.
//!
//! Children are owned through [`NodeId`] handles and the parent link is a plain index used for
//! upward walks (suffix and annotation inheritance, linkage resolution). Nodes detached by
//! [`Arena::remove`] stay allocated so that private links keep pointing at them.

use std::collections::HashSet;
use std::mem;
use std::ops::Index;

use serde::Serialize;
use tracing::{debug, trace};

use super::{ComponentSymbol, Entry, Node, NodeId, NodeKind, Operator, Statement};
use crate::config::SharedInheritance;
use crate::error::{TreeError, TreeResult};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Index<NodeId> for Arena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn leaf<S: Into<String>>(&mut self, text: S) -> NodeId {
        self.alloc(Node::new(NodeKind::Leaf {
            entry: Entry::Text(text.into()),
            private_links: Vec::new(),
        }))
    }

    pub fn nested(&mut self, statement: Statement) -> NodeId {
        self.alloc(Node::new(NodeKind::Leaf {
            entry: Entry::Statement(Box::new(statement)),
            private_links: Vec::new(),
        }))
    }

    /// Joins two trees under a new combination node.
    ///
    /// The new node carries the left tree's component (or the right one's if the left has
    /// none). Trees of different components cannot be combined.
    pub fn combine(
        &mut self,
        left: NodeId,
        right: NodeId,
        operator: Operator,
    ) -> TreeResult<NodeId> {
        let left_component = self.component(left);
        let right_component = self.component(right);
        if let (Some(l), Some(r)) = (left_component, right_component) {
            if l != r {
                return Err(TreeError::IncompatibleComponents {
                    left: l.to_string(),
                    right: r.to_string(),
                });
            }
        }

        let mut node = Node::new(NodeKind::Combination {
            operator,
            left,
            right,
        });
        node.component = left_component.or(right_component);
        let id = self.alloc(node);
        self.nodes[left.0].parent = Some(id);
        self.nodes[right.0].parent = Some(id);
        trace!("combined {:?} and {:?} with {} into {:?}", left, right, operator, id);
        Ok(id)
    }

    /// Like [`Arena::combine`], but an absent left side yields the right tree unchanged.
    pub fn combine_optional(
        &mut self,
        left: Option<NodeId>,
        right: NodeId,
        operator: Operator,
    ) -> TreeResult<NodeId> {
        match left {
            Some(left) => self.combine(left, right, operator),
            None => Ok(right),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self[id].is_leaf()
    }

    pub fn operator(&self, id: NodeId) -> Option<Operator> {
        self[id].operator()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self[id].text()
    }

    pub fn statement(&self, id: NodeId) -> Option<&Statement> {
        self[id].statement()
    }

    /// Takes the statement out of a nested leaf for in-place editing; pair with
    /// [`Arena::put_statement`].
    pub(crate) fn take_statement(&mut self, id: NodeId) -> Option<Statement> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Leaf {
                entry: Entry::Statement(statement),
                ..
            } => Some(mem::take(statement.as_mut())),
            _ => None,
        }
    }

    pub(crate) fn put_statement(&mut self, id: NodeId, statement: Statement) {
        if let NodeKind::Leaf { entry, .. } = &mut self.nodes[id.0].kind {
            *entry = Entry::Statement(Box::new(statement));
        }
    }

    pub(crate) fn add_private_link(&mut self, source: NodeId, target: NodeId) -> TreeResult<()> {
        match &mut self.nodes[source.0].kind {
            NodeKind::Leaf { private_links, .. } => {
                if !private_links.contains(&target) {
                    private_links.push(target);
                }
                Ok(())
            }
            NodeKind::Combination { .. } => Err(TreeError::NotALeaf(source)),
        }
    }

    /// Component of the node, inherited from the closest ancestor that declares one.
    pub fn component(&self, id: NodeId) -> Option<ComponentSymbol> {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(component) = self[node].component {
                return Some(component);
            }
            current = self[node].parent;
        }
        None
    }

    /// Suffix of the node, inherited from the enclosing combinations.
    pub fn suffix(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(suffix) = self[node].suffix.as_deref() {
                return Some(suffix);
            }
            current = self[node].parent;
        }
        None
    }

    /// Own annotations preceded by those of the ancestors, stopping at a `bAND` parent
    /// since separate component occurrences do not share annotations.
    pub fn annotations(&self, id: NodeId) -> Option<String> {
        let inherited = match self[id].parent {
            Some(parent) if self.operator(parent) != Some(Operator::SandBetween) => {
                self.annotations(parent)
            }
            _ => None,
        };
        match (inherited, self[id].annotation.as_deref()) {
            (Some(inherited), Some(own)) => Some(format!("{}{}", inherited, own)),
            (Some(inherited), None) => Some(inherited),
            (None, own) => own.map(str::to_string),
        }
    }

    pub fn shared_left(&self, id: NodeId, mode: SharedInheritance) -> Vec<String> {
        self.shared(id, mode, Side::Left)
    }

    pub fn shared_right(&self, id: NodeId, mode: SharedInheritance) -> Vec<String> {
        self.shared(id, mode, Side::Right)
    }

    fn own_shared(&self, id: NodeId, side: Side) -> &[String] {
        match side {
            Side::Left => &self[id].shared_left,
            Side::Right => &self[id].shared_right,
        }
    }

    /// Shared elements of all ancestors, outermost first.
    fn ancestors_shared(&self, id: NodeId, side: Side) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self[id].parent;
        while let Some(node) = current {
            chain.push(node);
            current = self[node].parent;
        }
        chain
            .iter()
            .rev()
            .flat_map(|node| self.own_shared(*node, side).iter().cloned())
            .collect()
    }

    fn shared(&self, id: NodeId, mode: SharedInheritance, side: Side) -> Vec<String> {
        let own = self.own_shared(id, side);
        match mode {
            SharedInheritance::Nothing => own.to_vec(),
            SharedInheritance::Override => {
                let inherited = self.ancestors_shared(id, side);
                if inherited.is_empty() {
                    own.to_vec()
                } else {
                    inherited
                }
            }
            SharedInheritance::Append => {
                let mut inherited = self.ancestors_shared(id, side);
                inherited.extend(own.iter().cloned());
                inherited
            }
            SharedInheritance::FromCombination => match self[id].parent {
                Some(parent) if self.is_leaf(id) => {
                    let mut out = self.own_shared(parent, side).to_vec();
                    out.extend(own.iter().cloned());
                    out
                }
                _ => own.to_vec(),
            },
        }
    }

    /// Leaf text framed by its effective shared elements.
    pub fn leaf_value(&self, id: NodeId, mode: SharedInheritance) -> String {
        let body = match &self[id].kind {
            NodeKind::Leaf {
                entry: Entry::Text(text),
                ..
            } => text.clone(),
            _ => self.stringify(id),
        };
        let mut parts = self.shared_left(id, mode);
        parts.push(body);
        parts.extend(self.shared_right(id, mode));
        parts.join(" ")
    }

    /// Leaves below `id`, left to right.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            match self[node].kind {
                NodeKind::Leaf { .. } => out.push(node),
                NodeKind::Combination { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    pub fn count_leaves(&self, id: NodeId) -> usize {
        self.leaves(id).len()
    }

    /// Number of combination levels; a single leaf has depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        match self[id].kind {
            NodeKind::Leaf { .. } => 0,
            NodeKind::Combination { left, right, .. } => {
                1 + self.depth(left).max(self.depth(right))
            }
        }
    }

    /// Number of distinct states the tree can take.
    pub fn state_complexity(&self, id: NodeId) -> usize {
        match &self[id].kind {
            NodeKind::Leaf {
                entry: Entry::Text(text),
                ..
            } => usize::from(!text.is_empty()),
            NodeKind::Leaf {
                entry: Entry::Statement(statement),
                ..
            } => statement.state_complexity(self),
            NodeKind::Combination {
                operator,
                left,
                right,
            } => {
                let l = self.state_complexity(*left);
                let r = self.state_complexity(*right);
                match operator {
                    Operator::Xor => l + r,
                    Operator::Or => l + r + 1,
                    _ => (l + r).saturating_sub(1),
                }
            }
        }
    }

    /// Leaf sequences of a tree.
    ///
    /// Explicit operators flatten both sides into one sequence. `wAND` always keeps the sides
    /// apart; `bAND` does so unless `aggregate` is set.
    pub fn leaf_sequences(&self, id: NodeId, aggregate: bool) -> Vec<Vec<NodeId>> {
        match self[id].kind {
            NodeKind::Leaf { .. } => vec![vec![id]],
            NodeKind::Combination {
                operator,
                left,
                right,
            } => {
                let mut left = self.leaf_sequences(left, aggregate);
                let right = self.leaf_sequences(right, aggregate);
                let separate = match operator {
                    Operator::SandWithin => true,
                    Operator::SandBetween => !aggregate,
                    _ => false,
                };
                if separate {
                    left.extend(right);
                    left
                } else {
                    let mut flat: Vec<NodeId> = left.into_iter().flatten().collect();
                    flat.extend(right.into_iter().flatten());
                    vec![flat]
                }
            }
        }
    }

    pub fn root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            current = parent;
        }
        current
    }

    /// Highest ancestor not joined to its sibling by a synthetic AND.
    pub fn below_synthetic_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            if self.operator(parent).is_some_and(|op| op.is_synthetic()) {
                break;
            }
            current = parent;
        }
        current
    }

    /// True if any ancestor joins sibling combinations of one component (`wAND`).
    pub fn has_within_linkage(&self, id: NodeId) -> bool {
        let mut current = self[id].parent;
        while let Some(parent) = current {
            if self.operator(parent) == Some(Operator::SandWithin) {
                return true;
            }
            current = self[parent].parent;
        }
        false
    }

    /// `id` followed by its ancestors, innermost first.
    fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let ancestors: HashSet<NodeId> = self.ancestry(a).into_iter().collect();
        self.ancestry(b)
            .into_iter()
            .find(|node| ancestors.contains(node))
    }

    /// Operator at the nearest common ancestor of two distinct nodes.
    pub fn find_linkage(&self, a: NodeId, b: NodeId) -> Option<Operator> {
        if a == b {
            return None;
        }
        self.common_ancestor(a, b)
            .and_then(|ancestor| self.operator(ancestor))
    }

    /// Operators on the path from `a` to `b`, ordered from `a`'s side to `b`'s side.
    pub fn linkage_path(&self, a: NodeId, b: NodeId) -> Option<Vec<Operator>> {
        if a == b {
            return None;
        }
        let ancestor = self.common_ancestor(a, b)?;
        let up: Vec<NodeId> = self.ancestry(a)[1..]
            .iter()
            .copied()
            .take_while(|node| *node != ancestor)
            .collect();
        let down: Vec<NodeId> = self.ancestry(b)[1..]
            .iter()
            .copied()
            .take_while(|node| *node != ancestor)
            .collect();

        let mut ops: Vec<Operator> = up.iter().filter_map(|n| self.operator(*n)).collect();
        ops.extend(self.operator(ancestor));
        ops.extend(down.iter().rev().filter_map(|n| self.operator(*n)));
        Some(ops)
    }

    /// Detaches `id` from its tree; its sibling takes the parent's place.
    ///
    /// Returns the root of the remaining tree, or `None` if `id` was a whole tree.
    pub fn remove(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let Some(parent) = self[id].parent else {
            debug!("removing root {:?}; tree is now empty", id);
            return Ok(None);
        };
        let (left, right) = self[parent]
            .children()
            .ok_or_else(|| TreeError::InvalidTree(format!("parent {:?} is a leaf", parent)))?;
        let sibling = if left == id { right } else { left };

        // Attributes declared on the dissolved parent move down to the sibling.
        let parent_node = self[parent].clone();
        let grandparent = parent_node.parent;
        {
            let sibling_node = self.node_mut(sibling);
            sibling_node.parent = grandparent;
            if sibling_node.component.is_none() {
                sibling_node.component = parent_node.component;
            }
            if sibling_node.suffix.is_none() {
                sibling_node.suffix = parent_node.suffix.clone();
            }
            if sibling_node.annotation.is_none() {
                sibling_node.annotation = parent_node.annotation.clone();
            }
        }
        if let Some(grandparent) = grandparent {
            if let NodeKind::Combination { left, right, .. } = &mut self.node_mut(grandparent).kind
            {
                if *left == parent {
                    *left = sibling;
                } else if *right == parent {
                    *right = sibling;
                }
            }
        }
        self.node_mut(id).parent = None;
        self.node_mut(parent).parent = None;
        Ok(Some(self.root(sibling)))
    }

    /// Puts `replacement` where `id` is, taking over its parent link.
    pub(crate) fn replace(&mut self, id: NodeId, replacement: NodeId) {
        let parent = self[id].parent;
        self.node_mut(replacement).parent = parent;
        if let Some(parent) = parent {
            if let NodeKind::Combination { left, right, .. } = &mut self.node_mut(parent).kind {
                if *left == id {
                    *left = replacement;
                } else if *right == id {
                    *right = replacement;
                }
            }
        }
        self.node_mut(id).parent = None;
    }

    /// Deep copy of a subtree, including nested statements.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut node = self[id].clone();
        node.parent = None;
        match node.kind {
            NodeKind::Leaf {
                entry: Entry::Statement(statement),
                private_links,
            } => {
                let copy = statement.deep_clone(self);
                node.kind = NodeKind::Leaf {
                    entry: Entry::Statement(Box::new(copy)),
                    private_links,
                };
                self.alloc(node)
            }
            NodeKind::Leaf { .. } => self.alloc(node),
            NodeKind::Combination {
                operator,
                left,
                right,
            } => {
                let left = self.clone_subtree(left);
                let right = self.clone_subtree(right);
                node.kind = NodeKind::Combination {
                    operator,
                    left,
                    right,
                };
                let copy = self.alloc(node);
                self.node_mut(left).parent = Some(copy);
                self.node_mut(right).parent = Some(copy);
                copy
            }
        }
    }

    /// Bracketed form, e.g. `(shared (left [AND] right))`.
    pub fn stringify(&self, id: NodeId) -> String {
        let node = &self[id];
        match &node.kind {
            NodeKind::Leaf {
                entry: Entry::Text(text),
                ..
            } => text.clone(),
            NodeKind::Leaf {
                entry: Entry::Statement(statement),
                ..
            } => format!("{{{}}}", statement.to_script(self)),
            NodeKind::Combination {
                operator,
                left,
                right,
            } => {
                let inner = format!(
                    "({} {} {})",
                    self.stringify(*left),
                    operator.token(),
                    self.stringify(*right)
                );
                frame_shared(inner, &node.shared_left, &node.shared_right)
            }
        }
    }

    /// Unbracketed form, e.g. `shared left AND right`.
    pub fn stringify_flat(&self, id: NodeId) -> String {
        let node = &self[id];
        match node.kind {
            NodeKind::Leaf { .. } => self.stringify(id),
            NodeKind::Combination {
                operator,
                left,
                right,
            } => {
                let mut parts = node.shared_left.clone();
                parts.push(self.stringify_flat(left));
                parts.push(operator.to_string());
                parts.push(self.stringify_flat(right));
                parts.extend(node.shared_right.iter().cloned());
                parts.join(" ")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn frame_shared(inner: String, left: &[String], right: &[String]) -> String {
    if left.is_empty() && right.is_empty() {
        return inner;
    }
    let mut parts: Vec<&str> = left.iter().map(String::as_str).collect();
    parts.push(&inner);
    parts.extend(right.iter().map(String::as_str));
    format!("({})", parts.join(" "))
}
