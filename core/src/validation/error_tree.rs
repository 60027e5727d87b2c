//! # PROPERTY PATH ERROR TREE
//!
//! **PURPOSE**: Aggregates violation messages into a nested structure keyed by
//! property path segments.
//! **GUARANTEE**: Messages are only ever appended. Two insertions at the same
//! path land in the same leaf, in insertion order.
//!
//! Nodes live in a flat arena and refer to their children by index, so an
//! insertion walks the tree with plain indices instead of holding references
//! into it.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// `name[index]`: one or more word characters followed by a bracketed
/// decimal index. Anything else is a literal segment name.
static INDEXED_SEGMENT: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^(\w+)\[(\d+)\]$").expect("indexed segment pattern"));

type NodeId = usize;

const ROOT: NodeId = 0;

/// One step of a property path inside the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Name(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Splits a property path such as `address.lines[2]` into
/// `[(address, None), (lines, Some(2))]`.
pub fn parse_property_path(property_path: &str) -> Vec<(String, Option<usize>)> {
    property_path
        .split('.')
        .map(|item| {
            if let Some(captures) = INDEXED_SEGMENT.captures(item) {
                if let Ok(index) = captures[2].parse::<usize>() {
                    return (captures[1].to_string(), Some(index));
                }
            }
            (item.to_string(), None)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ErrorNode {
    children: IndexMap<Segment, NodeId>,
    messages: Vec<String>,
}

/// Nested mapping from property path to the messages reported there.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorTree {
    nodes: Vec<ErrorNode>,
}

impl ErrorTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![ErrorNode::default()],
        }
    }

    /// Appends `message` at `property_path`, creating intermediate nodes
    /// (and indexed slots for `name[i]` segments) as needed.
    pub fn insert(&mut self, property_path: &str, message: impl Into<String>) {
        let mut current = ROOT;
        for (name, index) in parse_property_path(property_path) {
            current = self.descend(current, Segment::Name(name));
            if let Some(index) = index {
                current = self.descend(current, Segment::Index(index));
            }
        }
        self.nodes[current].messages.push(message.into());
    }

    /// Appends `message` under a single top-level key, without interpreting
    /// dots or brackets in it.
    pub fn insert_flat(&mut self, key: &str, message: impl Into<String>) {
        let node = self.descend(ROOT, Segment::Name(key.to_string()));
        self.nodes[node].messages.push(message.into());
    }

    fn descend(&mut self, parent: NodeId, segment: Segment) -> NodeId {
        if let Some(&existing) = self.nodes[parent].children.get(&segment) {
            return existing;
        }
        let id = self.nodes.len();
        self.nodes.push(ErrorNode::default());
        self.nodes[parent].children.insert(segment, id);
        id
    }

    fn find(&self, segments: &[Segment]) -> Option<NodeId> {
        segments.iter().try_fold(ROOT, |node, segment| {
            self.nodes[node].children.get(segment).copied()
        })
    }

    /// Messages recorded exactly at `property_path`.
    pub fn messages(&self, property_path: &str) -> &[String] {
        let segments: Vec<Segment> = parse_property_path(property_path)
            .into_iter()
            .flat_map(|(name, index)| {
                std::iter::once(Segment::Name(name)).chain(index.map(Segment::Index))
            })
            .collect();
        self.at(&segments)
    }

    /// Messages recorded at an explicit segment path.
    pub fn at(&self, segments: &[Segment]) -> &[String] {
        match self.find(segments) {
            Some(node) => &self.nodes[node].messages,
            None => &[],
        }
    }

    /// Child segments directly below `segments`, in insertion order.
    pub fn children(&self, segments: &[Segment]) -> Vec<&Segment> {
        match self.find(segments) {
            Some(node) => self.nodes[node].children.keys().collect(),
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }

    /// Total number of messages across all leaves.
    pub fn message_count(&self) -> usize {
        self.nodes.iter().map(|node| node.messages.len()).sum()
    }

    pub fn to_json(&self) -> Value {
        self.render(ROOT)
    }

    fn render(&self, id: NodeId) -> Value {
        let node = &self.nodes[id];
        let messages = || node.messages.iter().cloned().map(Value::String);

        if node.children.is_empty() {
            return Value::Array(messages().collect());
        }

        let is_list = node.messages.is_empty()
            && node
                .children
                .keys()
                .enumerate()
                .all(|(position, segment)| *segment == Segment::Index(position));
        if is_list {
            return Value::Array(
                node.children
                    .values()
                    .map(|&child| self.render(child))
                    .collect(),
            );
        }

        let mut object = Map::new();
        let mut next_index = 0;
        for (segment, &child) in &node.children {
            if let Segment::Index(index) = segment {
                next_index = next_index.max(index.saturating_add(1));
            }
            object.insert(segment.to_string(), self.render(child));
        }
        // Messages sharing a node with children continue the integer keys,
        // wrapping to the first free one past `usize::MAX`.
        let mut key = next_index;
        for message in messages() {
            while object.contains_key(&key.to_string()) {
                key = key.wrapping_add(1);
            }
            object.insert(key.to_string(), message);
            key = key.wrapping_add(1);
        }
        Value::Object(object)
    }
}

impl Default for ErrorTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
