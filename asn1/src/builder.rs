//! Fluent schema authoring.
//!
//! ```
//! use asn1::{Dsl, define};
//!
//! let model = define("Model", |s| {
//!     s.seq().obj([
//!         s.key("a").int(),
//!         s.key("b").bitstr(),
//!         s.key("c").int().optional(),
//!     ])
//! })
//! .unwrap();
//! assert_eq!("Model", model.name());
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use kumiki::backend::{Args, Names};
use kumiki::kind::Kind;
use kumiki::value::{Oid, Value};

use crate::error::SchemaError;
use crate::node::{Node, Schema};

/// A node under construction.
///
/// Builders are consumed by every call and returned again, so a chain like
/// `s.key("id").int().optional()` reads left to right. Authoring mistakes are
/// collected rather than raised and surface from [`crate::define`].
#[derive(Debug, Default)]
pub struct NodeBuilder {
    node: Node,
    errors: Vec<SchemaError>,
}

/// Entry point handed to schema bodies; every [`Dsl`] method starts a new node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope;

impl NodeBuilder {
    pub fn new() -> Self {
        NodeBuilder::default()
    }

    fn fail(mut self, err: SchemaError) -> Self {
        self.errors.push(err);
        self
    }

    fn set_kind(mut self, kind: Kind, args: Args) -> Self {
        if let Some(current) = self.node.kind {
            return self.fail(SchemaError::TagAlreadySet {
                current,
                requested: kind,
            });
        }
        self.node.kind = Some(kind);
        self.node.args = args;
        self
    }

    fn set_element(mut self, kind: Kind, element: &Schema) -> Self {
        self.node.element = Some(element.clone());
        self.set_kind(kind, Args::default())
    }

    /// Checks the node on its own and returns it with every collected error.
    pub(crate) fn finish(mut self) -> (Node, Vec<SchemaError>) {
        let node = &self.node;
        let mut errors = Vec::new();
        if node.kind.is_none() && !node.is_indirection() && !node.any {
            errors.push(SchemaError::TagOmitted);
        }
        if let (Some(kind), Some(_)) = (node.kind, &node.uses) {
            errors.push(SchemaError::UseWithTag(kind));
        }
        if node.contains.is_some() && !node.kind.is_some_and(|k| k.is_container()) {
            errors.push(SchemaError::ContainsOnNonString(
                node.kind.map_or("no tag".to_string(), |k| k.to_string()),
            ));
        }
        if let Some(kind) = node.kind.filter(Kind::is_list) {
            if node.element.is_none() {
                errors.push(SchemaError::MissingElement(kind));
            }
        }
        self.errors.extend(errors);
        (self.node, self.errors)
    }

    // Modifiers. These only exist on a builder, never on `Scope`.

    pub fn optional(mut self) -> Self {
        self.node.optional = true;
        self
    }

    /// Default value; implies `optional`.
    pub fn def(mut self, value: impl Into<Value>) -> Self {
        if self.node.default.is_some() {
            return self.fail(SchemaError::DefaultAlreadySet);
        }
        self.node.default = Some(value.into());
        self.node.optional = true;
        self
    }

    pub fn explicit(mut self, tag: u32) -> Self {
        if self.node.implicit.is_some() {
            return self.fail(SchemaError::ExplicitImplicitConflict);
        }
        if self.node.explicit.is_some() {
            return self.fail(SchemaError::ExplicitAlreadySet);
        }
        self.node.explicit = Some(tag);
        self
    }

    pub fn implicit(mut self, tag: u32) -> Self {
        if self.node.explicit.is_some() {
            return self.fail(SchemaError::ExplicitImplicitConflict);
        }
        if self.node.implicit.is_some() {
            return self.fail(SchemaError::ImplicitAlreadySet);
        }
        self.node.implicit = Some(tag);
        self
    }

    /// Children that decode into a fresh object, one field per child key.
    pub fn obj(mut self, children: impl IntoIterator<Item = NodeBuilder>) -> Self {
        self.node.obj = true;
        let mut this = self.children(children);
        let mut seen = BTreeSet::new();
        let mut errors = Vec::new();
        for child in this.node.children.iter().flatten() {
            match &child.key {
                None if child.kind == Some(Kind::Null) => {}
                None => errors.push(SchemaError::ChildWithoutKey),
                Some(key) if !seen.insert(key.clone()) => {
                    errors.push(SchemaError::DuplicateKey(key.clone()))
                }
                Some(_) => {}
            }
        }
        this.errors.extend(errors);
        this
    }

    /// Children whose keyed values land in the enclosing object.
    pub fn children(mut self, children: impl IntoIterator<Item = NodeBuilder>) -> Self {
        if self.node.children.is_some() {
            return self.fail(SchemaError::ChildrenAlreadySet);
        }
        let children = children
            .into_iter()
            .map(|child| {
                let (node, errors) = child.finish();
                self.errors.extend(errors);
                Arc::new(node)
            })
            .collect();
        self.node.children = Some(children);
        self
    }
}

impl Dsl for NodeBuilder {
    fn builder(self) -> NodeBuilder {
        self
    }
}

impl Dsl for Scope {
    fn builder(self) -> NodeBuilder {
        NodeBuilder::new()
    }
}

/// The authoring vocabulary, shared by [`Scope`] and [`NodeBuilder`].
pub trait Dsl: Sized {
    fn builder(self) -> NodeBuilder;

    fn key(self, key: impl Into<String>) -> NodeBuilder {
        let mut b = self.builder();
        if let Some(current) = &b.node.key {
            let current = current.clone();
            return b.fail(SchemaError::KeyAlreadySet(current));
        }
        b.node.key = Some(key.into());
        b
    }

    fn tag(self, kind: Kind) -> NodeBuilder {
        self.builder().set_kind(kind, Args::default())
    }

    fn seq(self) -> NodeBuilder {
        self.tag(Kind::Seq)
    }

    fn set(self) -> NodeBuilder {
        self.tag(Kind::Set)
    }

    fn seq_of(self, element: &Schema) -> NodeBuilder {
        self.builder().set_element(Kind::SeqOf, element)
    }

    fn set_of(self, element: &Schema) -> NodeBuilder {
        self.builder().set_element(Kind::SetOf, element)
    }

    fn objid(self) -> NodeBuilder {
        self.tag(Kind::ObjId)
    }

    /// OBJECT IDENTIFIER decoded to a name when listed in `names`.
    fn objid_named(self, names: Names<Oid>) -> NodeBuilder {
        self.builder().set_kind(Kind::ObjId, Args::with_oids(names))
    }

    fn objid_relative(self) -> NodeBuilder {
        let args = Args {
            relative: true,
            ..Default::default()
        };
        self.builder().set_kind(Kind::ObjId, args)
    }

    fn bool(self) -> NodeBuilder {
        self.tag(Kind::Bool)
    }

    fn gentime(self) -> NodeBuilder {
        self.tag(Kind::GenTime)
    }

    fn utctime(self) -> NodeBuilder {
        self.tag(Kind::UtcTime)
    }

    fn null(self) -> NodeBuilder {
        self.tag(Kind::Null)
    }

    fn enumerated(self, names: Names<i64>) -> NodeBuilder {
        self.builder().set_kind(Kind::Enum, Args::with_names(names))
    }

    fn int(self) -> NodeBuilder {
        self.tag(Kind::Int)
    }

    fn int_named(self, names: Names<i64>) -> NodeBuilder {
        self.builder().set_kind(Kind::Int, Args::with_names(names))
    }

    fn objdesc(self) -> NodeBuilder {
        self.tag(Kind::ObjDesc)
    }

    fn bitstr(self) -> NodeBuilder {
        self.tag(Kind::BitStr)
    }

    fn bmpstr(self) -> NodeBuilder {
        self.tag(Kind::BmpStr)
    }

    fn charstr(self) -> NodeBuilder {
        self.tag(Kind::CharStr)
    }

    fn genstr(self) -> NodeBuilder {
        self.tag(Kind::GenStr)
    }

    fn graphstr(self) -> NodeBuilder {
        self.tag(Kind::GraphStr)
    }

    fn ia5str(self) -> NodeBuilder {
        self.tag(Kind::Ia5Str)
    }

    fn iso646str(self) -> NodeBuilder {
        self.tag(Kind::Iso646Str)
    }

    fn numstr(self) -> NodeBuilder {
        self.tag(Kind::NumStr)
    }

    fn octstr(self) -> NodeBuilder {
        self.tag(Kind::OctStr)
    }

    fn printstr(self) -> NodeBuilder {
        self.tag(Kind::PrintStr)
    }

    fn t61str(self) -> NodeBuilder {
        self.tag(Kind::T61Str)
    }

    fn unistr(self) -> NodeBuilder {
        self.tag(Kind::UniStr)
    }

    fn utf8str(self) -> NodeBuilder {
        self.tag(Kind::Utf8Str)
    }

    fn videostr(self) -> NodeBuilder {
        self.tag(Kind::VideoStr)
    }

    /// Opaque capture of one complete element.
    fn any(self) -> NodeBuilder {
        let mut b = self.builder();
        b.node.any = true;
        b
    }

    /// Tagged union; branches are tried in the given order when decoding.
    fn choice<S, I>(self, branches: I) -> NodeBuilder
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, NodeBuilder)>,
    {
        let mut b = self.builder();
        if b.node.choice.is_some() {
            return b.fail(SchemaError::ChoiceAlreadySet);
        }
        let mut seen = BTreeSet::new();
        let mut nodes = Vec::new();
        for (name, branch) in branches {
            let name = name.into();
            if !seen.insert(name.clone()) {
                b.errors.push(SchemaError::DuplicateBranch(name.clone()));
            }
            let (node, errors) = branch.finish();
            b.errors.extend(errors);
            nodes.push((name, Arc::new(node)));
        }
        if nodes.is_empty() {
            b.errors.push(SchemaError::EmptyChoice);
        }
        b.node.choice = Some(nodes);
        b
    }

    /// Delegates to the root of another schema.
    fn uses(self, schema: &Schema) -> NodeBuilder {
        let mut b = self.builder();
        if b.node.uses.is_some() {
            return b.fail(SchemaError::UseAlreadySet);
        }
        b.node.uses = Some(schema.clone());
        b
    }

    /// Schema of the payload carried inside an octstr/bitstr.
    fn contains(self, schema: &Schema) -> NodeBuilder {
        let mut b = self.builder();
        if b.node.contains.is_some() {
            return b.fail(SchemaError::ContainsAlreadySet);
        }
        b.node.contains = Some(schema.clone());
        b
    }
}
