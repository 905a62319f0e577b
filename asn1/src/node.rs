//! Schema nodes and named schemas.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use kumiki::backend::Args;
use kumiki::kind::{Kind, TagSpec};
use kumiki::value::Value;

use crate::error::{Cause, SchemaError};

/// One position in a schema tree.
///
/// Nodes are immutable once their schema is defined. The only interior
/// mutability is the memoised target of a `use` reference.
#[derive(Default)]
pub struct Node {
    pub(crate) key: Option<String>,
    pub(crate) kind: Option<Kind>,
    pub(crate) args: Args,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) explicit: Option<u32>,
    pub(crate) implicit: Option<u32>,
    pub(crate) obj: bool,
    pub(crate) any: bool,
    pub(crate) children: Option<Vec<Arc<Node>>>,
    pub(crate) choice: Option<Vec<(String, Arc<Node>)>>,
    /// Element schema of `seqof`/`setof`.
    pub(crate) element: Option<Schema>,
    pub(crate) uses: Option<Schema>,
    pub(crate) contains: Option<Schema>,
    resolved: OnceLock<Arc<Node>>,
}

impl Node {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Tag whose presence decides an optional field without a trial decode.
    pub(crate) fn presence_tag(&self) -> Option<TagSpec> {
        if let Some(n) = self.explicit {
            return Some(TagSpec::Context(n));
        }
        if let Some(n) = self.implicit {
            return Some(TagSpec::Context(n));
        }
        self.kind.map(TagSpec::Universal)
    }

    /// Tag this node itself consumes or emits, after any explicit wrapper.
    pub(crate) fn own_tag(&self) -> Option<TagSpec> {
        match (self.implicit, self.kind) {
            (Some(n), _) => Some(TagSpec::Context(n)),
            (None, Some(kind)) => Some(TagSpec::Universal(kind)),
            (None, None) => None,
        }
    }

    /// Whether the node is a pure pass-through that owns no tag of its own.
    pub(crate) fn is_indirection(&self) -> bool {
        self.uses.is_some() || self.choice.is_some()
    }

    /// Target of a `use` reference, resolved once and memoised.
    ///
    /// When the referencing node carries an implicit tag different from the
    /// target's, a copy of the target root with the overridden tag is used.
    pub(crate) fn target(&self) -> Result<Option<&Arc<Node>>, Cause> {
        let Some(schema) = &self.uses else {
            return Ok(None);
        };
        if let Some(node) = self.resolved.get() {
            return Ok(Some(node));
        }
        let node = schema.retag(self.implicit)?;
        Ok(Some(self.resolved.get_or_init(|| node)))
    }

    /// Copy sharing children and branches, with a fresh resolution slot.
    fn with_implicit(&self, implicit: Option<u32>) -> Node {
        Node {
            key: self.key.clone(),
            kind: self.kind,
            args: self.args.clone(),
            optional: self.optional,
            default: self.default.clone(),
            explicit: self.explicit,
            implicit,
            obj: self.obj,
            any: self.any,
            children: self.children.clone(),
            choice: self.choice.clone(),
            element: self.element.clone(),
            uses: self.uses.clone(),
            contains: self.contains.clone(),
            resolved: OnceLock::new(),
        }
    }

    /// Resolves every `use` reachable in this tree whose target is already defined.
    pub(crate) fn finalize(&self) {
        if self.uses.as_ref().is_some_and(Schema::is_defined) {
            // target() only fails for undefined schemas
            let _ = self.target();
        }
        for child in self.children.iter().flatten() {
            child.finalize();
        }
        for (_, branch) in self.choice.iter().flatten() {
            branch.finalize();
        }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("explicit", &self.explicit)
            .field("implicit", &self.implicit)
            .field("obj", &self.obj)
            .field("any", &self.any)
            .field("children", &self.children)
            .field("choice", &self.choice)
            .field("element", &self.element.as_ref().map(Schema::name))
            .field("uses", &self.uses.as_ref().map(Schema::name))
            .field("contains", &self.contains.as_ref().map(Schema::name))
            .finish()
    }
}

/// A named, reusable schema.
///
/// Cloning is cheap and every clone refers to the same definition, which is
/// what lets a schema be referenced before its body is written.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

struct SchemaInner {
    name: String,
    root: OnceLock<Arc<Node>>,
}

impl Schema {
    /// Declares a schema without a body, for forward and self references.
    ///
    /// The body is supplied later with [`Schema::define_body`].
    pub fn declare(name: impl Into<String>) -> Self {
        Schema {
            inner: Arc::new(SchemaInner {
                name: name.into(),
                root: OnceLock::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_defined(&self) -> bool {
        self.inner.root.get().is_some()
    }

    pub fn root(&self) -> Option<&Arc<Node>> {
        self.inner.root.get()
    }

    pub(crate) fn set_root(&self, root: Arc<Node>) -> Result<&Arc<Node>, SchemaError> {
        self.inner
            .root
            .set(root)
            .map_err(|_| SchemaError::AlreadyDefined(self.name().to_string()))?;
        self.root()
            .ok_or_else(|| SchemaError::AlreadyDefined(self.name().to_string()))
    }

    pub(crate) fn defined_root(&self) -> Result<&Arc<Node>, Cause> {
        self.root()
            .ok_or_else(|| Cause::Undefined(self.name().to_string()))
    }

    /// Root node with its implicit tag replaced by `implicit`.
    pub(crate) fn retag(&self, implicit: Option<u32>) -> Result<Arc<Node>, Cause> {
        let root = self.defined_root()?;
        if root.implicit == implicit {
            Ok(root.clone())
        } else {
            Ok(Arc::new(root.with_implicit(implicit)))
        }
    }
}

impl Debug for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // roots may be cyclic through `use`, so only the name is printed
        f.debug_struct("Schema")
            .field("name", &self.inner.name)
            .field("defined", &self.is_defined())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kumiki::kind::{Kind, TagSpec};

    use super::{Node, Schema};
    use crate::error::Cause;

    fn int_root(implicit: Option<u32>) -> Arc<Node> {
        Arc::new(Node {
            kind: Some(Kind::Int),
            implicit,
            ..Default::default()
        })
    }

    #[test]
    fn test_target_memoised() {
        let target = Schema::declare("Target");
        target.set_root(int_root(None)).unwrap();
        let node = Node {
            uses: Some(target.clone()),
            ..Default::default()
        };
        let first = node.target().unwrap().unwrap().clone();
        let second = node.target().unwrap().unwrap().clone();
        assert!(Arc::ptr_eq(&first, &second));
        // no override, so the target root itself is shared
        assert!(Arc::ptr_eq(&first, target.root().unwrap()));
    }

    #[test]
    fn test_target_implicit_override() {
        let target = Schema::declare("Target");
        target.set_root(int_root(None)).unwrap();
        let node = Node {
            uses: Some(target.clone()),
            implicit: Some(3),
            ..Default::default()
        };
        let resolved = node.target().unwrap().unwrap();
        assert_eq!(Some(3), resolved.implicit);
        assert_eq!(Some(TagSpec::Context(3)), resolved.own_tag());
        assert_eq!(None, target.root().unwrap().implicit);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shareable_across_threads() {
        assert_send_sync::<Schema>();
        assert_send_sync::<Node>();
    }

    #[test]
    fn test_target_resolved_once_across_threads() {
        let target = Schema::declare("Target");
        let node = Node {
            uses: Some(target.clone()),
            implicit: Some(4),
            ..Default::default()
        };
        // referenced before the body exists, so nothing is memoised yet
        node.finalize();
        target.set_root(int_root(None)).unwrap();

        let resolved: Vec<Arc<Node>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| node.target().unwrap().unwrap().clone()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let first = &resolved[0];
        assert!(resolved.iter().all(|r| Arc::ptr_eq(first, r)));
        assert_eq!(Some(4), first.implicit);
    }

    #[test]
    fn test_target_undefined() {
        let node = Node {
            uses: Some(Schema::declare("Later")),
            ..Default::default()
        };
        assert!(matches!(node.target(), Err(Cause::Undefined(name)) if name == "Later"));
    }

    #[test]
    fn test_schema_defined_once() {
        let schema = Schema::declare("Once");
        assert!(schema.set_root(int_root(None)).is_ok());
        assert!(schema.set_root(int_root(None)).is_err());
    }

    #[test]
    fn test_presence_tag_order() {
        let node = Node {
            kind: Some(Kind::Int),
            explicit: Some(1),
            ..Default::default()
        };
        assert_eq!(Some(TagSpec::Context(1)), node.presence_tag());
        assert_eq!(Some(TagSpec::Universal(Kind::Int)), node.own_tag());

        let node = Node {
            kind: Some(Kind::Int),
            implicit: Some(2),
            ..Default::default()
        };
        assert_eq!(Some(TagSpec::Context(2)), node.presence_tag());
        assert_eq!(Some(TagSpec::Context(2)), node.own_tag());
    }
}
