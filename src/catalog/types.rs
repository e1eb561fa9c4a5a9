// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Catalog item and category types

use serde::{Deserialize, Serialize};

/// A demo site listed in a consultant's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Identifier, unique within a catalog
    pub id: String,
    /// Display title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Category reference, `None` means uncategorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl CatalogItem {
    /// Create an uncategorized item
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category_id: None,
        }
    }

    /// Attach a category reference
    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// A catalog segment ("Segmentos" on the catalog page)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Category chosen on the catalog page
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategorySelection {
    /// Every project, including uncategorized ones
    #[default]
    All,
    /// Only items referencing this category id
    Only(String),
}

impl CategorySelection {
    /// Build a selection from an optional category id
    pub fn from_option(category_id: Option<&str>) -> Self {
        match category_id {
            Some(id) => Self::Only(id.to_string()),
            None => Self::All,
        }
    }

    /// Whether `item` belongs to this selection
    pub fn admits(&self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => item.category_id.as_deref() == Some(id.as_str()),
        }
    }
}
