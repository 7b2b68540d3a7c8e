//! Cache keys and invalidation patterns.

use std::fmt;

/// Identity of a cached query result: operation name followed by its
/// stringified parameters.
///
/// Two keys are equal iff every element compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    /// Creates a key for a parameterless operation.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self(vec![operation.into()])
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with(mut self, param: impl ToString) -> Self {
        self.0.push(param.to_string());
        self
    }

    /// Returns the operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.0[0]
    }

    /// Returns the stringified parameters.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.0[1..]
    }

    /// Returns all elements, operation first.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

/// Prefix selecting every key whose leading elements match.
///
/// `["userPosts"]` selects the posts of every author;
/// `["coursesByCreator", "p"]` selects only the courses of `p`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern(Vec<String>);

impl KeyPattern {
    /// Selects every key of an operation.
    #[must_use]
    pub fn operation(operation: impl Into<String>) -> Self {
        Self(vec![operation.into()])
    }

    /// Narrows the pattern by one more parameter.
    #[must_use]
    pub fn with(mut self, param: impl ToString) -> Self {
        self.0.push(param.to_string());
        self
    }

    /// Checks whether `key` is selected.
    #[must_use]
    pub fn matches(&self, key: &CacheKey) -> bool {
        key.parts().starts_with(&self.0)
    }
}

impl From<CacheKey> for KeyPattern {
    fn from(key: CacheKey) -> Self {
        Self(key.0)
    }
}

impl From<&CacheKey> for KeyPattern {
    fn from(key: &CacheKey) -> Self {
        Self(key.0.clone())
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*", self.0.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality_is_elementwise() {
        assert_eq!(CacheKey::new("course").with("c1"), CacheKey::new("course").with("c1"));
        assert_ne!(CacheKey::new("course").with("c1"), CacheKey::new("course").with("c2"));
        assert_ne!(CacheKey::new("course"), CacheKey::new("course").with(""));
    }

    #[test]
    fn test_key_display() {
        let key = CacheKey::new("isEnrolled").with("u").with("c");
        assert_eq!(key.to_string(), "isEnrolled:u:c");
        assert_eq!(key.operation(), "isEnrolled");
        assert_eq!(key.params(), ["u".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_operation_pattern_matches_all_params() {
        let pattern = KeyPattern::operation("userPosts");
        assert!(pattern.matches(&CacheKey::new("userPosts").with("a")));
        assert!(pattern.matches(&CacheKey::new("userPosts").with("b")));
        assert!(!pattern.matches(&CacheKey::new("allPosts")));
    }

    #[test]
    fn test_narrow_pattern() {
        let pattern = KeyPattern::operation("coursesByCreator").with("p");
        assert!(pattern.matches(&CacheKey::new("coursesByCreator").with("p")));
        assert!(!pattern.matches(&CacheKey::new("coursesByCreator").with("q")));
        assert!(!pattern.matches(&CacheKey::new("coursesByCreator")));
    }

    #[test]
    fn test_exact_key_as_pattern() {
        let key = CacheKey::new("allCourses");
        assert!(KeyPattern::from(&key).matches(&key));
    }
}
