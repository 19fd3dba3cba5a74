use std::collections::{HashMap, VecDeque};

use crate::types::{Group, GroupId};

/// An id-indexed view of one or more nested group trees.
///
/// The backend returns community structures pre-nested through
/// [`Group::children`]. `GroupTree` flattens them into an arena keyed by group
/// id with explicit parent and child links, so lookups and traversals are
/// iterative and independent of tree depth.
///
/// Groups stored in the arena have their `children` emptied; the links live
/// in the index. Use [`GroupTree::into_nested`] to rebuild the nested form.
#[derive(Debug, Default)]
pub struct GroupTree {
    nodes: HashMap<GroupId, Node>,
    roots: Vec<GroupId>,
}

#[derive(Debug)]
struct Node {
    group: Group,
    parent: Option<GroupId>,
    children: Vec<GroupId>,
    depth: usize,
}

impl GroupTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the given trees. Root order and child order are preserved.
    ///
    /// A group id seen twice keeps its first occurrence; the later one and
    /// its subtree are dropped, so parent links always form a forest.
    pub fn from_roots(roots: impl IntoIterator<Item = Group>) -> Self {
        let mut tree = Self::new();
        let mut pending: Vec<(Group, Option<GroupId>, usize)> = Vec::new();

        for root in roots {
            tree.roots.push(root.id.clone());
            pending.push((root, None, 0));
        }
        // Pending is a stack; reverse once so roots are indexed in order.
        pending.reverse();

        while let Some((mut group, parent, depth)) = pending.pop() {
            if tree.nodes.contains_key(&group.id) {
                tree.unlink(parent.as_deref(), &group.id);
                continue;
            }
            let children = std::mem::take(&mut group.children);
            let child_ids: Vec<GroupId> = children.iter().map(|c| c.id.clone()).collect();
            let id = group.id.clone();

            for child in children.into_iter().rev() {
                pending.push((child, Some(id.clone()), depth + 1));
            }

            tree.nodes.insert(
                id,
                Node {
                    group,
                    parent,
                    children: child_ids,
                    depth,
                },
            );
        }

        tree
    }

    /// Drop the last mention of `id` from `parent`'s child list, or from the
    /// roots when there is no parent.
    fn unlink(&mut self, parent: Option<&str>, id: &str) {
        let list = match parent {
            Some(p) => match self.nodes.get_mut(p) {
                Some(node) => &mut node.children,
                None => return,
            },
            None => &mut self.roots,
        };
        if let Some(pos) = list.iter().rposition(|c| c == id) {
            list.remove(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the top-level groups, in input order.
    pub fn roots(&self) -> &[GroupId] {
        &self.roots
    }

    pub fn get(&self, id: &str) -> Option<&Group> {
        self.nodes.get(id).map(|n| &n.group)
    }

    pub fn parent(&self, id: &str) -> Option<&Group> {
        let parent = self.nodes.get(id)?.parent.as_deref()?;
        self.get(parent)
    }

    /// Direct children of `id`, in display order.
    pub fn children(&self, id: &str) -> Vec<&Group> {
        let Some(node) = self.nodes.get(id) else {
            return vec![];
        };
        node.children.iter().filter_map(|c| self.get(c)).collect()
    }

    /// Distance from the root; roots are at depth `0`.
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).map(|n| n.depth)
    }

    /// Depth of the deepest group, or `None` for an empty tree.
    pub fn max_depth(&self) -> Option<usize> {
        self.nodes.values().map(|n| n.depth).max()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<&Group> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(id).and_then(|n| n.parent.as_deref());
        while let Some(pid) = current {
            let Some(node) = self.nodes.get(pid) else {
                break;
            };
            out.push(&node.group);
            current = node.parent.as_deref();
        }
        out
    }

    /// All groups below `id`, breadth first, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<&Group> {
        let mut out = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            for child in &node.children {
                if let Some(c) = self.nodes.get(child.as_str()) {
                    out.push(&c.group);
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// Whether `candidate` lies strictly below `ancestor`.
    ///
    /// A group cannot be moved under one of its own descendants; callers use
    /// this to filter move targets before asking the server.
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        self.ancestors(candidate).iter().any(|g| g.id == ancestor)
    }

    /// Pre-order walk of every tree, in display order.
    pub fn iter_preorder(&self) -> Vec<&Group> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&str> = self.roots.iter().rev().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(&node.group);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Rebuild the nested representation, consuming the index.
    pub fn into_nested(mut self) -> Vec<Group> {
        // Post-order: attach each node's finished children before the node
        // itself is attached to its parent.
        let mut order: Vec<GroupId> = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<GroupId> = self.roots.clone();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().cloned());
            }
            order.push(id);
        }

        let mut built: HashMap<GroupId, Group> = HashMap::with_capacity(order.len());
        for id in order.into_iter().rev() {
            let Some(node) = self.nodes.remove(&id) else {
                continue;
            };
            let mut group = node.group;
            group.children = node
                .children
                .iter()
                .filter_map(|c| built.remove(c))
                .collect();
            built.insert(id, group);
        }

        self.roots
            .iter()
            .filter_map(|r| built.remove(r))
            .collect()
    }
}

/// Depth of a nested tree: `0` for a group without children.
pub fn nesting_depth(root: &Group) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(&Group, usize)> = vec![(root, 0)];
    while let Some((group, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        for child in &group.children {
            stack.push((child, depth + 1));
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupPrivacy;

    fn g(id: &str, children: Vec<Group>) -> Group {
        let mut group = Group::new(id, format!("group {id}"), GroupPrivacy::Open);
        group.children = children;
        group
    }

    //  a
    //  ├── b
    //  │   └── d
    //  └── c
    fn sample() -> Group {
        g("a", vec![g("b", vec![g("d", vec![])]), g("c", vec![])])
    }

    #[test]
    fn indexes_every_node() {
        let tree = GroupTree::from_roots(vec![sample()]);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.roots(), &["a".to_string()]);
        assert!(tree.get("d").unwrap().children.is_empty());
    }

    #[test]
    fn parent_children_depth() {
        let tree = GroupTree::from_roots(vec![sample()]);
        assert_eq!(tree.parent("d").map(|p| p.id.as_str()), Some("b"));
        assert!(tree.parent("a").is_none());
        let kids: Vec<_> = tree.children("a").iter().map(|c| c.id.clone()).collect();
        assert_eq!(kids, vec!["b", "c"]);
        assert_eq!(tree.depth("d"), Some(2));
        assert_eq!(tree.max_depth(), Some(2));
    }

    #[test]
    fn ancestors_and_descendants() {
        let tree = GroupTree::from_roots(vec![sample()]);
        let up: Vec<_> = tree.ancestors("d").iter().map(|x| x.id.clone()).collect();
        assert_eq!(up, vec!["b", "a"]);
        let down: Vec<_> = tree.descendants("a").iter().map(|x| x.id.clone()).collect();
        assert_eq!(down, vec!["b", "c", "d"]);
        assert!(tree.is_descendant("d", "a"));
        assert!(!tree.is_descendant("a", "d"));
        assert!(!tree.is_descendant("c", "b"));
    }

    #[test]
    fn preorder_follows_display_order() {
        let tree = GroupTree::from_roots(vec![sample(), g("e", vec![])]);
        let ids: Vec<_> = tree.iter_preorder().iter().map(|x| x.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b", "d", "c", "e"]);
    }

    #[test]
    fn into_nested_restores_input() {
        let original = vec![sample(), g("e", vec![])];
        let rebuilt = GroupTree::from_roots(original.clone()).into_nested();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn repeated_ids_keep_first_occurrence() {
        // a -> b -> a, plus a second root "a"
        let tree = GroupTree::from_roots(vec![
            g("a", vec![g("b", vec![g("a", vec![g("x", vec![])])])]),
            g("a", vec![]),
        ]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots(), &["a".to_string()]);
        assert!(tree.children("b").is_empty());
        assert!(tree.get("x").is_none());

        let up: Vec<_> = tree.ancestors("b").iter().map(|x| x.id.clone()).collect();
        assert_eq!(up, vec!["a"]);
        assert!(tree.ancestors("a").is_empty());
        assert_eq!(tree.descendants("a").len(), 1);
        assert_eq!(tree.iter_preorder().len(), 2);
    }

    #[test]
    fn self_child_is_dropped() {
        let tree = GroupTree::from_roots(vec![g("a", vec![g("a", vec![])])]);
        assert_eq!(tree.len(), 1);
        assert!(tree.children("a").is_empty());
        assert!(!tree.is_descendant("a", "a"));
    }

    #[test]
    fn deep_chain_is_iterative() {
        let mut node = g("leaf", vec![]);
        for i in 0..10_000 {
            node = g(&format!("n{i}"), vec![node]);
        }
        assert_eq!(nesting_depth(&node), 10_000);
        let tree = GroupTree::from_roots(vec![node]);
        assert_eq!(tree.max_depth(), Some(10_000));
        assert_eq!(tree.ancestors("leaf").len(), 10_000);
    }
}
