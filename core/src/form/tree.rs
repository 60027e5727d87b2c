use super::definition::{FormDefinition, FormField, FormFieldKind, DEFAULT_INVALID_MESSAGE};
use super::{FormError, FormHandle};
use crate::denormalizer::coerce;
use crate::errors::BindingError;
use crate::metadata::{FieldKind, TypeDescriptor};
use crate::types::RawPayload;
use crate::validation::{parse_property_path, ConstraintValidator};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const EXTRA_FIELDS_MESSAGE: &str = "This form should not contain extra fields.";

/// Index of a node in a form's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormNodeId(usize);

impl FormNodeId {
    pub const ROOT: FormNodeId = FormNodeId(0);
}

#[derive(Debug, Clone)]
enum NodeKind {
    Compound,
    Scalar(FieldKind),
}

#[derive(Debug, Clone)]
struct FormNode {
    name: String,
    parent: Option<FormNodeId>,
    children: Vec<FormNodeId>,
    kind: NodeKind,
    error_bubbling: bool,
    invalid_message: String,
    /// False once the submitted value could not be transformed.
    synchronized: bool,
    errors: Vec<String>,
}

impl FormNode {
    fn new(name: &str, parent: Option<FormNodeId>, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            kind,
            error_bubbling: false,
            invalid_message: DEFAULT_INVALID_MESSAGE.to_string(),
            synchronized: true,
            errors: Vec::new(),
        }
    }
}

/// **FORM INSTANCE**
///
/// Arena of nodes with parent back-references. The root is always node 0.
pub struct Form {
    nodes: Vec<FormNode>,
    data_class: String,
    data: Map<String, Value>,
    validator: Arc<dyn ConstraintValidator>,
    validation_groups: Vec<String>,
    allow_extra_fields: bool,
    submitted: bool,
}

impl Form {
    /// Builds an unsubmitted form whose data starts at the data class defaults.
    pub fn build(
        definition: &FormDefinition,
        data_class: &TypeDescriptor,
        validator: Arc<dyn ConstraintValidator>,
        validation_groups: Vec<String>,
        allow_extra_fields: bool,
    ) -> Self {
        let mut form = Self {
            nodes: vec![FormNode::new(&definition.name, None, NodeKind::Compound)],
            data_class: data_class.name.clone(),
            data: data_class.defaults(),
            validator,
            validation_groups,
            allow_extra_fields,
            submitted: false,
        };
        form.add_fields(FormNodeId::ROOT, &definition.fields);
        form
    }

    fn add_fields(&mut self, parent: FormNodeId, fields: &[FormField]) {
        for field in fields {
            let id = FormNodeId(self.nodes.len());
            let kind = match &field.kind {
                FormFieldKind::Scalar(kind) => NodeKind::Scalar(kind.clone()),
                FormFieldKind::Compound(_) => NodeKind::Compound,
            };
            let mut node = FormNode::new(&field.name, Some(parent), kind);
            node.error_bubbling = field.error_bubbling;
            if let Some(message) = &field.invalid_message {
                node.invalid_message = message.clone();
            }
            self.nodes.push(node);
            self.nodes[parent.0].children.push(id);

            if let FormFieldKind::Compound(children) = &field.kind {
                self.add_fields(id, children);
            }
        }
    }

    pub fn child(&self, parent: FormNodeId, name: &str) -> Option<FormNodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    pub fn parent(&self, node: FormNodeId) -> Option<FormNodeId> {
        self.nodes[node.0].parent
    }

    /// Names from the root's child down to `node`; empty for the root.
    pub fn path_from_root(&self, node: FormNodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            names.push(self.nodes[current.0].name.clone());
            current = parent;
        }
        names.reverse();
        names
    }

    /// Attaches `message` to `node`, or to the first ancestor reached by
    /// following `error_bubbling` upwards.
    pub fn add_error(&mut self, node: FormNodeId, message: impl Into<String>) {
        let mut target = node;
        while self.nodes[target.0].error_bubbling {
            match self.nodes[target.0].parent {
                Some(parent) => target = parent,
                None => break,
            }
        }
        self.nodes[target.0].errors.push(message.into());
    }

    fn submit_node(
        &mut self,
        node: FormNodeId,
        payload: &Map<String, Value>,
        data: &mut Map<String, Value>,
        clear_missing: bool,
    ) {
        let children = self.nodes[node.0].children.clone();
        for &child in &children {
            let name = self.nodes[child.0].name.clone();
            let raw = match payload.get(&name) {
                Some(raw) => raw,
                None => {
                    if clear_missing {
                        data.insert(name, Value::Null);
                    }
                    continue;
                }
            };

            let transformed = match (self.nodes[child.0].kind.clone(), raw) {
                (NodeKind::Scalar(kind), _) => coerce(&kind, raw, true).ok(),
                (NodeKind::Compound, Value::Object(fields)) => {
                    let mut nested = match data.get(&name) {
                        Some(Value::Object(existing)) => existing.clone(),
                        _ => Map::new(),
                    };
                    self.submit_node(child, fields, &mut nested, clear_missing);
                    Some(Value::Object(nested))
                }
                (NodeKind::Compound, Value::Null) => Some(Value::Null),
                (NodeKind::Compound, _) => None,
            };

            match transformed {
                Some(value) => {
                    data.insert(name, value);
                }
                None => {
                    self.nodes[child.0].synchronized = false;
                    let message = self.nodes[child.0].invalid_message.clone();
                    self.add_error(child, message);
                }
            }
        }

        if !self.allow_extra_fields {
            let has_extra = payload
                .keys()
                .any(|key| !children.iter().any(|c| self.nodes[c.0].name == *key));
            if has_extra {
                self.add_error(node, EXTRA_FIELDS_MESSAGE);
            }
        }
    }

    /// Deepest node matching the leading segments of `property_path`.
    fn map_violation(&self, property_path: &str) -> FormNodeId {
        let mut current = FormNodeId::ROOT;
        for (name, _) in parse_property_path(property_path) {
            match self.child(current, &name) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    fn collect_errors(&self, node: FormNodeId, recursive: bool, out: &mut Vec<FormError>) {
        let origin = self.path_from_root(node);
        for message in &self.nodes[node.0].errors {
            out.push(FormError {
                message: message.clone(),
                origin: origin.clone(),
            });
        }
        if recursive {
            for &child in &self.nodes[node.0].children {
                self.collect_errors(child, true, out);
            }
        }
    }
}

impl FormHandle for Form {
    fn name(&self) -> &str {
        &self.nodes[FormNodeId::ROOT.0].name
    }

    fn submit(&mut self, payload: &RawPayload, clear_missing: bool) -> Result<(), BindingError> {
        if self.submitted {
            log::warn!("form '{}' was already submitted", self.name());
            return Ok(());
        }

        let mut data = std::mem::take(&mut self.data);
        self.submit_node(FormNodeId::ROOT, payload, &mut data, clear_missing);
        self.data = data;
        self.submitted = true;

        let instance = Value::Object(self.data.clone());
        let violations = self
            .validator
            .validate(&self.data_class, &instance, &self.validation_groups)?;
        for violation in violations {
            let target = self.map_violation(&violation.property_path);
            // Values that failed to transform already carry their error.
            if self.nodes[target.0].synchronized {
                self.add_error(target, violation.message);
            }
        }
        Ok(())
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn is_valid(&self) -> bool {
        self.submitted && self.nodes.iter().all(|node| node.errors.is_empty())
    }

    fn data(&self) -> Value {
        Value::Object(self.data.clone())
    }

    fn errors(&self, recursive: bool) -> Vec<FormError> {
        let mut errors = Vec::new();
        self.collect_errors(FormNodeId::ROOT, recursive, &mut errors);
        errors
    }
}
