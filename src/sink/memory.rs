use super::{Content, RenderSink};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Node {
    content: Content,
    parent: Option<String>,
    children: Vec<String>,
}

/// In-memory keyed tree.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    nodes: HashMap<String, Node>,
    roots: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Content> {
        self.nodes.get(key).map(|n| &n.content)
    }

    /// Child keys of `key`, in insertion order.
    pub fn children(&self, key: &str) -> &[String] {
        self.nodes
            .get(key)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Every live node, depth-first from the roots in insertion order.
    pub fn nodes(&self) -> Vec<(&str, &Content)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.walk(root, &mut out);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn walk<'a>(&'a self, key: &'a str, out: &mut Vec<(&'a str, &'a Content)>) {
        if let Some(node) = self.nodes.get(key) {
            out.push((key, &node.content));
            for child in &node.children {
                self.walk(child, out);
            }
        }
    }

    fn drop_descendants(&mut self, key: &str) {
        let children = match self.nodes.get_mut(key) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.drop_descendants(&child);
            self.nodes.remove(&child);
        }
    }
}

impl RenderSink for MemorySink {
    fn replace(&mut self, key: &str, content: Content) {
        self.drop_descendants(key);
        match self.nodes.get_mut(key) {
            Some(node) => node.content = content,
            None => {
                self.nodes.insert(
                    key.to_string(),
                    Node {
                        content,
                        parent: None,
                        children: Vec::new(),
                    },
                );
                self.roots.push(key.to_string());
            }
        }
    }

    fn append_child(&mut self, parent: &str, key: &str, content: Content) -> bool {
        if !self.nodes.contains_key(parent) || self.nodes.contains_key(key) {
            return false;
        }
        self.nodes.insert(
            key.to_string(),
            Node {
                content,
                parent: Some(parent.to_string()),
                children: Vec::new(),
            },
        );
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(key.to_string());
        }
        true
    }

    fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }
}

impl MemorySink {
    /// Parent key of a node, if it was appended as a child.
    pub fn parent(&self, key: &str) -> Option<&str> {
        self.nodes.get(key).and_then(|n| n.parent.as_deref())
    }
}
