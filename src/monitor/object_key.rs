use std::fmt;

/// Unique identity of a watched remote object.
///
/// Equality is structural and no normalization is performed, so case or
/// whitespace differences name distinct objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    /// Namespace in which the object lives.
    pub namespace: String,
    /// Object name within the namespace.
    pub name: String,
}

impl ObjectKey {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Lookup key used against a watch source's store, `namespace/name`.
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
