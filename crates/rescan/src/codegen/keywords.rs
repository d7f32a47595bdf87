use std::str::FromStr;

use indexmap::IndexSet;

/// Reserved words the generated scanner tags as `Keyword`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keywords(IndexSet<String>);

impl Keywords {
    /// Split a keyword source string on `|`, `,` or whitespace.  Empty entries
    /// are dropped and duplicates keep their first position.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        s.split(|c: char| c == '|' || c == ',' || c.is_whitespace())
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, word: &str) -> bool { self.0.contains(word) }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }
}

impl FromStr for Keywords {
    type Err = std::convert::Infallible;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::parse(s)) }
}

impl<S: Into<String>> FromIterator<S> for Keywords {
    fn from_iter<I: IntoIterator<Item = S>>(it: I) -> Self {
        Self(it.into_iter().map(Into::into).collect())
    }
}
