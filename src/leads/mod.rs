// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sales leads ("acquisitions") submitted from the catalog page
//!
//! Storage and status updates belong to the persistence collaborator; this
//! module normalizes new requests and filters the Manager's sales list.

pub mod filter;
pub mod types;

pub use filter::LeadFilter;
pub use types::{Acquisition, AcquisitionRequest, AcquisitionStatus, LeadError};
