// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acquisition request and sales-pipeline types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::CatalogItem;
use crate::cpf;

/// Pipeline status of an acquisition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStatus {
    #[default]
    Pending,
    Processing,
    Completed,
}

impl AcquisitionStatus {
    /// Label shown in the Manager's sales list
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Aguardando",
            Self::Processing => "Em Produção",
            Self::Completed => "Finalizado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeadError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("CPF must have 11 digits")]
    InvalidCpf,
}

/// A client's request to acquire a demo site, as submitted from the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionRequest {
    pub site_id: String,
    pub site_title: String,
    pub consultant_id: String,
    pub client_name: String,
    /// Digits only
    pub client_phone: String,
    /// Digits only
    pub client_cpf: String,
}

impl AcquisitionRequest {
    /// Normalize and check a form submission
    ///
    /// Phone and CPF keep only their digits. The CPF check is the relaxed
    /// 11-digit one the public form uses; see [`cpf::validate`] for the
    /// strict check.
    pub fn new(
        site: &CatalogItem,
        consultant_id: &str,
        client_name: &str,
        client_phone: &str,
        client_cpf: &str,
    ) -> Result<Self, LeadError> {
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return Err(LeadError::MissingField("name"));
        }

        let client_phone = cpf::digits(client_phone);
        if client_phone.is_empty() {
            return Err(LeadError::MissingField("phone"));
        }

        let client_cpf = cpf::digits(client_cpf);
        if client_cpf.is_empty() {
            return Err(LeadError::MissingField("cpf"));
        }
        if !cpf::is_plausible(&client_cpf) {
            return Err(LeadError::InvalidCpf);
        }

        if consultant_id.trim().is_empty() {
            return Err(LeadError::MissingField("consultant"));
        }

        Ok(Self {
            site_id: site.id.clone(),
            site_title: site.title.clone(),
            consultant_id: consultant_id.trim().to_string(),
            client_name: client_name.to_string(),
            client_phone,
            client_cpf,
        })
    }
}

/// A stored lead in the sales pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acquisition {
    pub id: String,
    pub site_id: String,
    pub site_title: String,
    pub consultant_id: String,
    pub client_name: String,
    pub client_phone: String,
    pub client_cpf: String,
    #[serde(default)]
    pub status: AcquisitionStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl Acquisition {
    /// New pending lead from a request, with a fresh id
    pub fn from_request(request: AcquisitionRequest, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            site_id: request.site_id,
            site_title: request.site_title,
            consultant_id: request.consultant_id,
            client_name: request.client_name,
            client_phone: request.client_phone,
            client_cpf: request.client_cpf,
            status: AcquisitionStatus::Pending,
            timestamp,
            comment: None,
            attachment_url: None,
        }
    }
}
