// Title keyword filtering: inclusion first, then exclusion

/// Result of running a title through the keyword filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    Accepted,
    NoIncludeMatch,
    /// Carries the exclusion keyword that matched.
    Excluded(String),
}

#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl KeywordFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Case-sensitive substring matching, no tokenization.
    pub fn classify(&self, title: &str) -> FilterVerdict {
        if !self.include.iter().any(|kw| title.contains(kw.as_str())) {
            return FilterVerdict::NoIncludeMatch;
        }
        match self.exclude.iter().find(|kw| title.contains(kw.as_str())) {
            Some(kw) => FilterVerdict::Excluded(kw.clone()),
            None => FilterVerdict::Accepted,
        }
    }

    pub fn accept(&self, title: &str) -> bool {
        self.classify(title) == FilterVerdict::Accepted
    }
}

pub fn accept<S: AsRef<str>>(title: &str, include: &[S], exclude: &[S]) -> bool {
    include.iter().any(|kw| title.contains(kw.as_ref()))
        && !exclude.iter().any(|kw| title.contains(kw.as_ref()))
}
