use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for group identifiers.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned SVG group identifier (the `id` attribute of a `<g>`).
/// Comparing and hashing touch only the 4-byte key, never the string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(Spur);

impl GroupId {
    /// Intern a string as a GroupId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        GroupId(INTERNER.get_or_intern(s))
    }

    /// Look up an identifier without interning it.
    /// Returns `None` if no group with this name was ever seen.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(GroupId)
    }

    /// Resolve back to the interned string, which lives as long as the
    /// process-wide interner.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(GroupId::intern(&s))
    }
}
