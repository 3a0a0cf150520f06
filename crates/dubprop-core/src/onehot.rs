use std::collections::BTreeSet;

/// Learns the category vocabulary of one categorical column.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    /// Fits on the present values. Missing values do not become categories.
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let categories: BTreeSet<&str> = values.into_iter().flatten().collect();
        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// One indicator per category; all false for a missing or unseen value.
    pub fn transform(&self, value: Option<&str>) -> Vec<bool> {
        let hit = value.and_then(|v| self.categories.binary_search_by(|c| c.as_str().cmp(v)).ok());
        (0..self.categories.len()).map(|i| Some(i) == hit).collect()
    }

    pub fn into_block(self, name: impl Into<String>) -> OneHotBlock {
        OneHotBlock {
            name: name.into(),
            categories: self.categories,
        }
    }
}

/// A fitted block of indicator columns as it appears in the clean table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotBlock {
    pub name: String,
    pub categories: Vec<String>,
}

impl OneHotBlock {
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |category| format!("{}_{}", self.name, category))
    }

    /// Splits a `<block>_<category>` header; `None` if it belongs elsewhere.
    pub fn category_of<'h>(&self, header: &'h str) -> Option<&'h str> {
        header
            .strip_prefix(self.name.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
    }
}
