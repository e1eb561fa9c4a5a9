// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Category filtering and result intersection for the catalog page

use std::collections::HashSet;

use super::types::{CatalogItem, CategorySelection};

/// Candidate set for a search session: items admitted by `selection`, in
/// catalog order
pub fn filter_by_category(items: &[CatalogItem], selection: &CategorySelection) -> Vec<CatalogItem> {
    items
        .iter()
        .filter(|item| selection.admits(item))
        .cloned()
        .collect()
}

/// Items to render: candidates whose id is in `result_ids`, kept in
/// candidate order
pub fn visible_items<'a>(candidates: &'a [CatalogItem], result_ids: &[String]) -> Vec<&'a CatalogItem> {
    let wanted: HashSet<&str> = result_ids.iter().map(String::as_str).collect();
    candidates
        .iter()
        .filter(|item| wanted.contains(item.id.as_str()))
        .collect()
}
