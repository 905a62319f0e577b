//! Capability interface every wire format implements.
//!
//! The schema engines know nothing about identifier octets or length
//! encodings. They walk the schema and call into a [`Backend`] whenever a tag
//! has to be peeked, consumed or emitted, or a primitive converted.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::kind::{Class, Kind, TagSpec};
use crate::tree::Tree;
use crate::value::{Oid, Value};
use crate::window::Window;

pub trait Backend {
    /// Short format name used in diagnostics (`"der"`).
    fn name(&self) -> &'static str;

    /// Reports whether the next header in `window` matches `tag` without consuming it.
    ///
    /// An empty window is not an error; it simply holds no matching tag.
    fn peek_tag(&self, window: &Window<'_>, tag: TagSpec, allow_any: bool) -> Result<bool>;

    /// Consumes one header matching `tag` and returns its content as a sub-window.
    fn consume_tag<'a>(
        &self,
        window: &mut Window<'a>,
        tag: TagSpec,
        allow_any: bool,
    ) -> Result<Window<'a>>;

    fn decode_primitive(&self, kind: Kind, window: &mut Window<'_>, args: &Args) -> Result<Value>;

    /// Prepends a header for `tag`/`class` to already encoded content.
    fn encode_composite(&self, tag: u32, primitive: bool, class: Class, content: Tree)
    -> Result<Tree>;

    fn encode_primitive(&self, kind: Kind, value: &Value, args: &Args) -> Result<Tree>;
}

/// Auxiliary construction parameters of a primitive node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// Number to name mapping of an ENUMERATED or named INTEGER.
    pub names: Option<Names<i64>>,
    /// OID to name mapping of an OBJECT IDENTIFIER.
    pub oids: Option<Names<Oid>>,
    /// Relative OIDs carry no packed first arc pair.
    pub relative: bool,
}

impl Args {
    pub fn with_names(names: Names<i64>) -> Self {
        Args {
            names: Some(names),
            ..Default::default()
        }
    }

    pub fn with_oids(oids: Names<Oid>) -> Self {
        Args {
            oids: Some(oids),
            ..Default::default()
        }
    }
}

/// Bidirectional value/name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names<K: Ord> {
    by_value: BTreeMap<K, String>,
    by_name: BTreeMap<String, K>,
}

impl<K: Ord + Clone> Names<K> {
    pub fn new<S, I>(entries: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (K, S)>,
    {
        let mut by_value = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for (value, name) in entries {
            let name = name.into();
            by_name.insert(name.clone(), value.clone());
            by_value.insert(value, name);
        }
        Names { by_value, by_name }
    }

    pub fn name(&self, value: &K) -> Option<&str> {
        self.by_value.get(value).map(String::as_str)
    }

    pub fn value(&self, name: &str) -> Option<&K> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}
