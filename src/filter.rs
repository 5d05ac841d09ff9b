//! Category filtering.
//!
//! Computing the visible set is a pure function of the catalog and the active
//! filter; it is a stable filter, never a re-sort, so persisted items keep
//! their relative order across filter changes.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Category, ItemCatalog, ItemId};

/// The active category filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
}

impl Filter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(c) => c == category,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Category(c) => c.fmt(f),
        }
    }
}

#[derive(Debug)]
pub struct UnknownFilter(String);

impl fmt::Display for UnknownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown filter {:?}, expected all, electronics, clothing, keys, books or other",
            self.0
        )
    }
}

impl Error for UnknownFilter {}

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Filter::All);
        }
        for category in Category::ALL {
            if s.eq_ignore_ascii_case(category.name()) {
                return Ok(Filter::Category(category));
            }
        }
        Err(UnknownFilter(s.to_owned()))
    }
}

/// Computes the visible set for a filter, preserving catalog order.
///
/// An empty result is valid; the caller renders an explicit empty state.
pub fn compute_visible(catalog: &ItemCatalog, filter: Filter) -> Vec<ItemId> {
    catalog
        .items()
        .iter()
        .filter(|item| filter.matches(item.category))
        .map(|item| item.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::catalog::test_item;

    fn catalog() -> ItemCatalog {
        ItemCatalog::new(vec![
            test_item("a", Category::Electronics),
            test_item("b", Category::Keys),
            test_item("c", Category::Electronics),
        ])
        .unwrap()
    }

    #[test]
    fn all_preserves_catalog_order() {
        let visible = compute_visible(&catalog(), Filter::All);
        let ids: Vec<_> = visible.iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn category_filter_is_stable() {
        let visible = compute_visible(&catalog(), Filter::Category(Category::Electronics));
        let ids: Vec<_> = visible.iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn no_matches_is_empty_not_an_error() {
        let visible = compute_visible(&catalog(), Filter::Category(Category::Clothing));
        assert!(visible.is_empty());
    }

    #[test]
    fn parses_ui_labels() {
        assert_eq!("All".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!(
            "Electronics".parse::<Filter>().unwrap(),
            Filter::Category(Category::Electronics)
        );
        assert_eq!(
            "keys".parse::<Filter>().unwrap(),
            Filter::Category(Category::Keys)
        );
        assert!("wallets".parse::<Filter>().is_err());
    }

    proptest! {
        #[test]
        fn visible_set_matches_filter_and_order(
            cats in prop::collection::vec(0..Category::ALL.len(), 0..20),
            f in 0..=Category::ALL.len(),
        ) {
            let items = cats
                .iter()
                .enumerate()
                .map(|(i, &c)| test_item(&i.to_string(), Category::ALL[c]))
                .collect();
            let catalog = ItemCatalog::new(items).unwrap();
            let filter = if f == Category::ALL.len() {
                Filter::All
            } else {
                Filter::Category(Category::ALL[f])
            };

            let visible = compute_visible(&catalog, filter);

            // Only matching items are visible.
            for id in &visible {
                prop_assert!(filter.matches(catalog.get(id).unwrap().category));
            }

            // Visibility is a stable subsequence of catalog order.
            let mut all_ids = catalog.items().iter().map(|item| &item.id);
            for id in &visible {
                prop_assert!(all_ids.any(|other| other == id));
            }

            // Every matching item is visible.
            let matching = catalog
                .items()
                .iter()
                .filter(|item| filter.matches(item.category))
                .count();
            prop_assert_eq!(visible.len(), matching);
        }
    }
}
