//! Length-summing tree of encoder output.

/// Encoder output assembled bottom-up and flattened once at the end.
///
/// Composite nodes record the total length of their children when built, so
/// a parent can emit its length header without flattening first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Byte(u8),
    Bytes(Vec<u8>),
    Text(String),
    Node { children: Vec<Tree>, len: usize },
}

impl Tree {
    pub fn concat(children: Vec<Tree>) -> Self {
        let len = children.iter().map(Tree::len).sum();
        Tree::Node { children, len }
    }

    pub fn empty() -> Self {
        Tree::Node {
            children: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Tree::Byte(_) => 1,
            Tree::Bytes(b) => b.len(),
            Tree::Text(s) => s.len(),
            Tree::Node { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the tree depth-first, left to right.
    pub fn join(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        self.write_into(&mut out);
        out
    }

    pub fn write_into(&self, out: &mut Vec<u8>) {
        match self {
            Tree::Byte(b) => out.push(*b),
            Tree::Bytes(b) => out.extend_from_slice(b),
            Tree::Text(s) => out.extend_from_slice(s.as_bytes()),
            Tree::Node { children, .. } => {
                for child in children {
                    child.write_into(out);
                }
            }
        }
    }
}

impl From<u8> for Tree {
    fn from(value: u8) -> Self {
        Tree::Byte(value)
    }
}

impl From<Vec<u8>> for Tree {
    fn from(value: Vec<u8>) -> Self {
        Tree::Bytes(value)
    }
}

impl From<&[u8]> for Tree {
    fn from(value: &[u8]) -> Self {
        Tree::Bytes(value.to_vec())
    }
}

impl From<String> for Tree {
    fn from(value: String) -> Self {
        Tree::Text(value)
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(value: Vec<Tree>) -> Self {
        Tree::concat(value)
    }
}
