//! The item catalog.
//!
//! Immutable backing store for the feed. Items are loaded once at startup from
//! a JSON document and never mutated afterwards; every other component refers
//! to them by [`ItemId`].

use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Context};
use serde::Deserialize;

/// Unique, stable identifier of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Keys,
    Books,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Clothing,
        Category::Keys,
        Category::Books,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Keys => "keys",
            Category::Books => "books",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Lost,
    Found,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Lost => "lost",
            Status::Found => "found",
        })
    }
}

/// A single reported item.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub category: Category,
    pub status: Status,
    pub location: String,
    /// Human-readable recency label, e.g. "2h ago".
    pub time_ago: String,
    pub image: String,
}

/// Immutable, ordered collection of items with lookup by id.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> anyhow::Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), idx).is_some() {
                bail!("duplicate item id: {}", item.id);
            }
        }
        Ok(Self { items, index })
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let items: Vec<Item> = serde_json::from_str(text).context("parsing item records")?;
        Self::new(items)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.index.get(id).map(|idx| &self.items[*idx])
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    /// Items in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_item(id: &str, category: Category) -> Item {
    Item {
        id: ItemId::from(id),
        title: format!("Item {id}"),
        category,
        status: Status::Lost,
        location: String::new(),
        time_ago: String::new(),
        image: String::new(),
    }
}
