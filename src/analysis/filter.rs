use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Case, CaseTable, Column};

/// Accepted values per column. Columns combine with AND, values within a
/// column with OR. A column with no accepted values does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    accepted: BTreeMap<Column, BTreeSet<String>>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, column: Column, value: impl Into<String>) -> &mut Self {
        self.accepted.entry(column).or_default().insert(value.into());
        self
    }

    pub fn accept_all<I, V>(&mut self, column: Column, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let set = self.accepted.entry(column).or_default();
        set.extend(values.into_iter().map(Into::into));
        self
    }

    /// True when no column would filter anything.
    pub fn is_empty(&self) -> bool {
        self.accepted.values().all(BTreeSet::is_empty)
    }

    pub fn matches(&self, case: &Case) -> bool {
        self.accepted
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .all(|(column, values)| {
                case.value(column)
                    .is_some_and(|value| values.contains(&*value))
            })
    }
}

impl<V: Into<String>> FromIterator<(Column, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (Column, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (column, value) in iter {
            filters.accept(column, value);
        }
        filters
    }
}

pub fn filter(table: &CaseTable, filters: &Filters) -> CaseTable {
    if filters.is_empty() {
        return table.clone();
    }
    table.iter().filter(|case| filters.matches(case)).cloned().collect()
}

/// Sorted distinct values present in `column`, for building selection lists.
pub fn filter_options(table: &CaseTable, column: &Column) -> Vec<String> {
    table
        .iter()
        .filter_map(|case| case.value(column))
        .map(|value| value.into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
