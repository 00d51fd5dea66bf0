use std::borrow::Borrow;
use std::fmt;

const SEPARATOR: char = '/';

/// Hierarchical node key such as `project/src/main.py`.
///
/// The group of a node is its containing path (every segment but the last);
/// ids without a separator belong to the root group `""`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn group(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(group, _)| group)
            .unwrap_or("")
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or(&self.0)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodePath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_is_containing_path() {
        let path = NodePath::new("repo/src/chained_colmap/app.py");
        assert_eq!(path.group(), "repo/src/chained_colmap");
        assert_eq!(path.name(), "app.py");
        assert_eq!(path.segments().count(), 4);
    }

    #[test]
    fn top_level_ids_share_the_root_group() {
        let path = NodePath::new("README.md");
        assert_eq!(path.group(), "");
        assert_eq!(path.name(), "README.md");
    }

    #[test]
    fn trailing_separator_leaves_empty_name() {
        let path = NodePath::new("repo/.git/");
        assert_eq!(path.group(), "repo/.git");
        assert_eq!(path.name(), "");
    }
}
