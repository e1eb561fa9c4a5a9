// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Demo-site catalog model
//!
//! The catalog itself is owned by the persistence collaborator. This module
//! only carries the item shape the search subsystem reads and the pure
//! category filter that produces a search session's candidate set.

pub mod filter;
pub mod types;

pub use filter::{filter_by_category, visible_items};
pub use types::{CatalogItem, Category, CategorySelection};
