//! Encode engine: the mirror of [`crate::decode`], assembling an output tree.

use std::sync::Arc;

use kumiki::backend::Backend;
use kumiki::kind::{Class, Kind};
use kumiki::tree::Tree;
use kumiki::value::Value;
use tracing::trace;

use crate::error::{Cause, Error};
use crate::node::{Node, Schema};
use crate::reporter::Reporter;

pub(crate) struct EncodeEngine<'b, B: Backend> {
    backend: &'b B,
}

impl<'b, B: Backend> EncodeEngine<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        EncodeEngine { backend }
    }

    /// Encodes `value` against `node`; `Ok(None)` when the node emits nothing.
    pub fn encode_node(
        &self,
        node: &Node,
        value: Option<&Value>,
        rep: &mut Reporter,
    ) -> Result<Option<Tree>, Error> {
        rep.descend().map_err(|c| rep.encode_error(c))?;
        let result = self.encode_nested(node, value, rep);
        rep.ascend();
        result
    }

    fn encode_nested(
        &self,
        node: &Node,
        value: Option<&Value>,
        rep: &mut Reporter,
    ) -> Result<Option<Tree>, Error> {
        let value = match value {
            Some(value) => value,
            None if node.optional => return Ok(None),
            None => return Err(rep.encode_error(Cause::MissingField)),
        };
        if node.optional && node.default.as_ref() == Some(value) {
            trace!(key = ?node.key, "value equals default, omitted");
            return Ok(None);
        }

        let tree = if node.any {
            match value {
                Value::Bytes(raw) => Tree::Bytes(raw.clone()),
                other => return Err(rep.encode_error(Cause::NotRaw(other.type_name()))),
            }
        } else if let Some(branches) = &node.choice {
            self.encode_choice(branches, value, rep)?
        } else if let Some(target) = node.target().map_err(|c| rep.encode_error(c))? {
            self.encode_node(target, Some(value), rep)?
                .unwrap_or_else(Tree::empty)
        } else {
            self.encode_tagged(node, value, rep)?
        };

        match node.explicit {
            Some(n) => self
                .backend
                .encode_composite(n, false, Class::Context, tree)
                .map(Some)
                .map_err(|e| rep.encode_error(e)),
            None => Ok(Some(tree)),
        }
    }

    fn encode_tagged(&self, node: &Node, value: &Value, rep: &mut Reporter) -> Result<Tree, Error> {
        let (Some(kind), Some(tag)) = (node.kind, node.own_tag()) else {
            return Err(rep.encode_error(Cause::TagOmitted));
        };

        let (content, primitive) = if let Some(schema) = &node.contains {
            (self.encode_contained(schema, kind, value, rep)?, true)
        } else if let Some(children) = &node.children {
            (self.encode_children(children, value, rep)?, false)
        } else {
            match kind {
                Kind::Seq | Kind::Set => (Tree::empty(), false),
                Kind::SeqOf | Kind::SetOf => (self.encode_list(node, value, rep)?, false),
                _ => {
                    let content = self
                        .backend
                        .encode_primitive(kind, value, &node.args)
                        .map_err(|e| rep.encode_error(e))?;
                    (content, true)
                }
            }
        };

        let (Some(class), Some(number)) = (tag.class(), tag.number()) else {
            return Err(rep.encode_error(Cause::TagOmitted));
        };
        self.backend
            .encode_composite(number, primitive, class, content)
            .map_err(|e| rep.encode_error(e))
    }

    fn encode_children(
        &self,
        children: &[Arc<Node>],
        value: &Value,
        rep: &mut Reporter,
    ) -> Result<Tree, Error> {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            let encoded = match &child.key {
                // no payload to look up
                _ if child.kind == Some(Kind::Null) => {
                    self.encode_node(child, Some(&Value::Null), rep)?
                }
                // unkeyed aggregates read their fields from the same object
                None => self.encode_node(child, Some(value), rep)?,
                Some(key) => {
                    rep.enter_key(key.as_str());
                    let Value::Object(fields) = value else {
                        return Err(rep.encode_error(Cause::NotAnObject));
                    };
                    let encoded = self.encode_node(child, fields.get(key), rep);
                    rep.exit_key();
                    encoded?
                }
            };
            parts.extend(encoded);
        }
        Ok(Tree::concat(parts))
    }

    fn encode_list(&self, node: &Node, value: &Value, rep: &mut Reporter) -> Result<Tree, Error> {
        let Value::List(items) = value else {
            return Err(rep.encode_error(Cause::NotAList(value.type_name())));
        };
        let element = match &node.element {
            Some(schema) => schema.retag(None).map_err(|c| rep.encode_error(c))?,
            None => return Err(rep.encode_error(Cause::TagOmitted)),
        };
        let mut parts = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            rep.enter_key(i.to_string());
            let encoded = self.encode_node(&element, Some(item), rep);
            rep.exit_key();
            parts.extend(encoded?);
        }
        Ok(Tree::concat(parts))
    }

    fn encode_choice(
        &self,
        branches: &[(String, Arc<Node>)],
        value: &Value,
        rep: &mut Reporter,
    ) -> Result<Tree, Error> {
        let Value::Choice { branch, value } = value else {
            return Err(rep.encode_error(Cause::NotAChoice(value.type_name())));
        };
        let Some((_, node)) = branches.iter().find(|(name, _)| name == branch) else {
            return Err(rep.encode_error(Cause::UnknownChoice(branch.clone())));
        };
        Ok(self
            .encode_node(node, Some(value.as_ref()), rep)?
            .unwrap_or_else(Tree::empty))
    }

    /// Nested encoding carried as the payload of an octstr or bitstr.
    fn encode_contained(
        &self,
        schema: &Schema,
        kind: Kind,
        value: &Value,
        rep: &mut Reporter,
    ) -> Result<Tree, Error> {
        let root = schema.defined_root().map_err(|c| rep.encode_error(c))?;
        let nested = self
            .encode_node(root, Some(value), rep)?
            .unwrap_or_else(Tree::empty);
        Ok(match kind {
            // no unused bits in a whole-octet payload
            Kind::BitStr => Tree::concat(vec![Tree::Byte(0), nested]),
            _ => nested,
        })
    }
}
