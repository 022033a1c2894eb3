use std::fmt;

/// Ordered list of class tokens backing an element's `class` attribute.
///
/// Tokens are kept in insertion order and duplicates are preserved when the
/// list is assigned from a string, mirroring what ends up in `className` when
/// class names are concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a whitespace separated class string
    pub fn parse(class_name: &str) -> Self {
        Self {
            tokens: class_name.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Replace every token with the ones in `class_name`
    pub fn set(&mut self, class_name: &str) {
        *self = Self::parse(class_name);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Append `token` unless it is already present
    pub fn add(&mut self, token: &str) {
        if !token.is_empty() && !self.contains(token) {
            self.tokens.push(token.to_string());
        }
    }

    /// Remove every occurrence of `token`, returning whether any was removed
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        before != self.tokens.len()
    }

    /// Remove only the first occurrence of `token`
    pub fn remove_first(&mut self, token: &str) -> bool {
        match self.tokens.iter().position(|t| t == token) {
            Some(idx) => {
                self.tokens.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialized `className` value (tokens joined by a single space)
    pub fn class_name(&self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

impl From<&str> for ClassList {
    fn from(class_name: &str) -> Self {
        Self::parse(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_collapses_whitespace() {
        let list = ClassList::parse("  toast\tshow   info ");
        assert_eq!(list.class_name(), "toast show info");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn add_skips_duplicates_and_empty() {
        let mut list = ClassList::parse("toast");
        list.add("show");
        list.add("show");
        list.add("");
        assert_eq!(list.class_name(), "toast show");
    }

    #[test]
    fn remove_first_keeps_later_duplicates() {
        let mut list = ClassList::parse("toast show show");
        assert!(list.remove_first("show"));
        assert_eq!(list.class_name(), "toast show");
        assert!(list.remove("show"));
        assert!(!list.contains("show"));
        assert!(!list.remove_first("show"));
    }

    #[test]
    fn tokens_are_matched_whole() {
        let mut list = ClassList::parse("toast show showcase");
        assert!(list.remove_first("show"));
        assert_eq!(list.class_name(), "toast showcase");
        assert!(!list.contains("show"));
    }
}
