// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod catalog;
pub mod cpf;
pub mod leads;
pub mod search;

// Re-export main types
pub use catalog::{filter_by_category, visible_items, CatalogItem, Category, CategorySelection};
pub use leads::{Acquisition, AcquisitionRequest, AcquisitionStatus, LeadError, LeadFilter};
pub use search::{
    ControllerOptions, GeminiMatcher, LocalSubstringMatcher, MatchError, MatchOutcome,
    MatchProvider, MatchSource, SearchConfig, SearchController, SearchPhase, SearchState,
    SemanticMatcher, SmartSearchService,
};
