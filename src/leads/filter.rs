// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sales list filtering for the Manager console

use chrono::NaiveDate;

use super::types::{Acquisition, AcquisitionStatus};

/// Filters applied to the sales list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    /// Matches client name, CPF or site title
    pub query: String,
    /// `None` means every status
    pub status: Option<AcquisitionStatus>,
    /// UTC calendar date of the lead
    pub date: Option<NaiveDate>,
}

impl LeadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn status(mut self, status: AcquisitionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Whether `acquisition` passes every active filter
    pub fn matches(&self, acquisition: &Acquisition) -> bool {
        self.matches_query(acquisition)
            && self.status.map_or(true, |s| acquisition.status == s)
            && self
                .date
                .map_or(true, |d| acquisition.timestamp.date_naive() == d)
    }

    /// Stable filter of `acquisitions`
    pub fn apply<'a>(&self, acquisitions: &'a [Acquisition]) -> Vec<&'a Acquisition> {
        acquisitions.iter().filter(|a| self.matches(a)).collect()
    }

    fn matches_query(&self, acquisition: &Acquisition) -> bool {
        // CPF is compared raw, names and titles case-insensitively
        let needle = self.query.to_lowercase();
        acquisition.client_name.to_lowercase().contains(&needle)
            || acquisition.client_cpf.contains(&self.query)
            || acquisition.site_title.to_lowercase().contains(&needle)
    }
}
