use std::collections::BTreeSet;

/// Restricts which variable names an extraction records.
///
/// `Only` always filters, even when its set is empty; an empty set admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VariableFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl VariableFilter {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    /// `All` when `names` is `None`, otherwise `Only(names)`.
    pub fn from_optional<I, S>(names: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match names {
            Some(names) => Self::only(names),
            None => Self::All,
        }
    }

    pub fn admits(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(name),
        }
    }

    /// Lexicographically sorted variable ordering for graph construction, if filtering.
    pub fn ordering(&self) -> Option<Vec<String>> {
        match self {
            Self::All => None,
            Self::Only(names) => Some(names.iter().cloned().collect()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_admits_everything() {
        let filter = VariableFilter::All;
        assert!(filter.admits("anything"));
        assert_eq!(filter.ordering(), None);
        assert!(filter.is_all());
    }

    #[test]
    fn only_admits_members_and_sorts_ordering() {
        let filter = VariableFilter::only(["y", "a", "x"]);
        assert!(filter.admits("x"));
        assert!(!filter.admits("noise"));
        assert_eq!(
            filter.ordering(),
            Some(vec!["a".to_string(), "x".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn empty_only_admits_nothing() {
        let filter = VariableFilter::only(Vec::<String>::new());
        assert!(!filter.admits("x"));
        assert_eq!(filter.ordering(), Some(Vec::new()));
        assert!(!filter.is_all());
    }

    #[test]
    fn from_optional_distinguishes_absent_from_empty() {
        assert_eq!(VariableFilter::from_optional(None::<Vec<String>>), VariableFilter::All);
        assert_eq!(
            VariableFilter::from_optional(Some(Vec::<String>::new())),
            VariableFilter::Only(BTreeSet::new())
        );
    }
}
