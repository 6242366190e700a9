use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global interner for node ids read off the DOM.
///
/// The same node reports its id on every resize, so interning keeps the
/// pending set keyed by a 4-byte `Copy` handle instead of a fresh `String`.
/// Interned ids are never freed: every id seen stays resident for the life
/// of the process.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Stable identifier of a node element (its `id` attribute by default).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Interpret a raw attribute value. Absent or empty values name no node.
    pub fn from_attribute(value: Option<&str>) -> Option<Self> {
        match value {
            Some(v) if !v.is_empty() => Some(Self::intern(v)),
            _ => None,
        }
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("node-a");
        let b = NodeId::intern("node-a");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "node-a");
        assert_eq!(a.to_string(), "node-a");
    }

    #[test]
    fn empty_attribute_names_no_node() {
        assert_eq!(NodeId::from_attribute(None), None);
        assert_eq!(NodeId::from_attribute(Some("")), None);
        assert_eq!(
            NodeId::from_attribute(Some("n1")),
            Some(NodeId::intern("n1"))
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = NodeId::intern("card");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""card""#);
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
