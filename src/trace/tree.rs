//! Trace trees rebuilt from dotted span paths.
//!
//! Records arrive in completion order: children before parents, siblings in
//! whatever order they finished. Insertion walks down from the root by path
//! prefix and creates placeholder nodes for ancestors that have not been
//! seen yet, so the final shape does not depend on arrival order.

use super::record::{OperationKind, OperationRecord, SpanPath};
use crate::utils::config::PLACEHOLDER_NAME;
use crate::utils::error::TreeError;
use indexmap::IndexMap;
use uuid::Uuid;

/// One span of a reconstructed trace
#[derive(Debug, Clone)]
pub struct TraceNode {
    pub path: SpanPath,

    /// `None` while this node is only a placeholder for a record not yet seen
    pub record: Option<OperationRecord>,

    /// Keyed by the trailing path segment; iteration follows creation order
    pub children: IndexMap<u32, TraceNode>,

    // Set by the finalizer
    pub inclusive_ms: Option<u64>,
    pub exclusive_ms: Option<u64>,
    pub operation_stack: Vec<String>,
}

impl TraceNode {
    fn placeholder(path: SpanPath) -> Self {
        Self {
            path,
            record: None,
            children: IndexMap::new(),
            inclusive_ms: None,
            exclusive_ms: None,
            operation_stack: Vec::new(),
        }
    }

    pub fn with_record(record: OperationRecord) -> Self {
        let mut node = Self::placeholder(record.path.clone());
        node.record = Some(record);
        node
    }

    pub fn name(&self) -> &str {
        self.record.as_ref().map_or(PLACEHOLDER_NAME, |r| r.name.as_str())
    }

    pub fn kind(&self) -> OperationKind {
        self.record.as_ref().map_or(OperationKind::Other, |r| r.kind)
    }

    pub fn is_placeholder(&self) -> bool {
        self.record.is_none()
    }

    /// Place `record` in this subtree according to its path
    ///
    /// A second record at an already-filled path replaces the first.
    ///
    /// # Errors
    /// * `TreeError::OutsideSubtree` - the record's path does not extend this node's path
    pub fn insert(&mut self, record: OperationRecord) -> Result<(), TreeError> {
        if !record.path.segments().starts_with(self.path.segments()) {
            return Err(TreeError::OutsideSubtree {
                path: record.path.to_string(),
                node: self.path.to_string(),
            });
        }

        let own_depth = self.path.depth();
        let target_depth = record.path.depth();

        if target_depth == own_depth {
            self.record = Some(record);
            return Ok(());
        }

        let next_id = record.path.segments()[own_depth];
        let child = self.child_mut(next_id);

        if target_depth == own_depth + 1 {
            child.record = Some(record);
            Ok(())
        } else {
            child.insert(record)
        }
    }

    fn child_mut(&mut self, segment: u32) -> &mut TraceNode {
        let path = &self.path;
        self.children
            .entry(segment)
            .or_insert_with(|| TraceNode::placeholder(path.child(segment)))
    }

    /// Depth-first, pre-order traversal yielding `(depth, node)`
    ///
    /// The node itself is at depth 0. Children are visited in creation order.
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: vec![(0, self)],
        }
    }
}

/// Iterator returned by [`TraceNode::iter`]
pub struct DepthFirst<'a> {
    stack: Vec<(usize, &'a TraceNode)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (usize, &'a TraceNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.values().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// A complete profile: the root span plus a generated trace id
#[derive(Debug, Clone)]
pub struct TraceTree {
    pub trace_id: String,
    pub thread_id: String,
    pub root: TraceNode,
    pub(crate) finalized: bool,
}

impl TraceTree {
    /// Start a tree from its root record, assigning a fresh trace id
    pub fn new(root: OperationRecord) -> Self {
        Self {
            trace_id: Uuid::new_v4().simple().to_string(),
            thread_id: root.thread_id.clone(),
            root: TraceNode::with_record(root),
            finalized: false,
        }
    }

    pub fn insert(&mut self, record: OperationRecord) -> Result<(), TreeError> {
        self.root.insert(record)
    }

    pub fn iter(&self) -> DepthFirst<'_> {
        self.root.iter()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Inclusive time of the whole trace, once finalized
    pub fn total_ms(&self) -> u64 {
        self.root.inclusive_ms.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(path: &str, name: &str) -> OperationRecord {
        OperationRecord::new(path.parse().unwrap(), OperationKind::FunctionCall, name, 0.1)
    }

    fn paths(tree: &TraceTree) -> Vec<(usize, String, String)> {
        tree.iter()
            .map(|(depth, node)| (depth, node.path.to_string(), node.name().to_string()))
            .collect()
    }

    #[test]
    fn test_insert_direct_children() {
        let mut tree = TraceTree::new(record("1", "root"));
        tree.insert(record("1.1", "a")).unwrap();
        tree.insert(record("1.2", "b")).unwrap();

        assert_eq!(
            paths(&tree),
            vec![
                (0, "1".to_string(), "root".to_string()),
                (1, "1.1".to_string(), "a".to_string()),
                (1, "1.2".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_deep_record_creates_placeholders() {
        let mut tree = TraceTree::new(record("1", "root"));
        tree.insert(record("1.3.2", "deep")).unwrap();

        let middle = &tree.root.children[&3];
        assert!(middle.is_placeholder());
        assert_eq!(middle.path.to_string(), "1.3");
        assert_eq!(middle.children[&2].name(), "deep");

        tree.insert(record("1.3", "middle")).unwrap();
        let middle = &tree.root.children[&3];
        assert_eq!(middle.name(), "middle");
        assert_eq!(middle.children.len(), 1);
    }

    #[test]
    fn test_children_keep_creation_order() {
        let mut tree = TraceTree::new(record("1", "root"));
        tree.insert(record("1.2", "second")).unwrap();
        tree.insert(record("1.1", "first")).unwrap();

        let names: Vec<&str> = tree.root.children.values().map(|c| c.name()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_duplicate_path_last_write_wins() {
        let mut tree = TraceTree::new(record("1", "root"));
        tree.insert(record("1.1", "old")).unwrap();
        tree.insert(record("1.1", "new")).unwrap();

        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[&1].name(), "new");
    }

    #[test]
    fn test_insert_outside_subtree() {
        let mut tree = TraceTree::new(record("1", "root"));
        let err = tree.insert(record("2.1", "stray")).unwrap_err();

        assert_eq!(
            err,
            TreeError::OutsideSubtree {
                path: "2.1".to_string(),
                node: "1".to_string(),
            }
        );
        assert_eq!(tree.iter().count(), 1);
    }

    #[test]
    fn test_trace_ids_are_unique() {
        let a = TraceTree::new(record("1", "root"));
        let b = TraceTree::new(record("1", "root"));

        assert_ne!(a.trace_id, b.trace_id);
        assert_eq!(a.trace_id.len(), 32);
    }
}
