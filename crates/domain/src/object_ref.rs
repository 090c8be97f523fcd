use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Namespace sentinel selecting every namespace in the cluster.
pub const NAMESPACE_ALL: &str = "";

/// Secret-name sentinel selecting every secret in a namespace.
///
/// `*` is not a legal object name, so it never collides with a real secret.
pub const SECRET_ALL: &str = "*";

/// Namespaced object identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    namespace: String,
    name: String,
}

impl ObjectRef {
    /// Creates a reference from namespace and name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns the object namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns the object name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl Display for ObjectRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}/{}", self.namespace, self.name)
    }
}

/// Selects mount secret references by namespace and name, honoring the
/// `NAMESPACE_ALL` and `SECRET_ALL` sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretSelector {
    namespace: String,
    name: String,
}

impl SecretSelector {
    /// Creates a selector. An all-namespaces selector implies `SECRET_ALL`
    /// regardless of `name`.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = if namespace == NAMESPACE_ALL {
            SECRET_ALL.to_owned()
        } else {
            name.into()
        };

        Self { namespace, name }
    }

    /// Selector matching every secret in every namespace.
    #[must_use]
    pub fn all() -> Self {
        Self::new(NAMESPACE_ALL, SECRET_ALL)
    }

    /// Selector matching every secret in one namespace.
    #[must_use]
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self::new(namespace, SECRET_ALL)
    }

    /// Returns the selected namespace, `NAMESPACE_ALL` for all.
    #[must_use]
    pub fn selected_namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns the selected name, `SECRET_ALL` for all.
    #[must_use]
    pub fn selected_name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether the selector spans all namespaces.
    #[must_use]
    pub fn is_all_namespaces(&self) -> bool {
        self.namespace == NAMESPACE_ALL
    }

    /// Returns whether a mount secret reference satisfies the selector.
    #[must_use]
    pub fn matches(&self, secret_ref: &ObjectRef) -> bool {
        if self.is_all_namespaces() {
            return true;
        }

        if secret_ref.namespace() != self.namespace {
            return false;
        }

        self.name == SECRET_ALL || secret_ref.name() == self.name
    }
}

#[cfg(test)]
mod tests {
    use super::{NAMESPACE_ALL, ObjectRef, SECRET_ALL, SecretSelector};

    #[test]
    fn all_namespaces_implies_all_secrets() {
        let selector = SecretSelector::new(NAMESPACE_ALL, "s2");
        assert_eq!(selector.selected_name(), SECRET_ALL);
        assert!(selector.matches(&ObjectRef::new("other", "anything")));
    }

    #[test]
    fn namespace_selector_ignores_name() {
        let selector = SecretSelector::namespace("default");
        assert!(selector.matches(&ObjectRef::new("default", "s2")));
        assert!(selector.matches(&ObjectRef::new("default", "s3")));
        assert!(!selector.matches(&ObjectRef::new("other", "s2")));
    }

    #[test]
    fn exact_selector_requires_both_parts() {
        let selector = SecretSelector::new("default", "s2");
        assert!(selector.matches(&ObjectRef::new("default", "s2")));
        assert!(!selector.matches(&ObjectRef::new("default", "s3")));
        assert!(!selector.matches(&ObjectRef::new("other", "s2")));
    }

    #[test]
    fn object_ref_displays_namespaced_name() {
        assert_eq!(ObjectRef::new("default", "s2").to_string(), "default/s2");
    }
}
