// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CPF (Brazilian taxpayer id) normalization and check-digit validation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const CPF_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpfError {
    #[error("CPF must have 11 digits, got {0}")]
    WrongLength(usize),
    #[error("CPF with all digits equal is invalid")]
    RepeatedDigits,
    #[error("CPF check digits do not match")]
    BadCheckDigits,
}

/// A validated CPF, stored as 11 digits
///
/// Deserialization goes through [`validate`], so every `Cpf` holds exactly
/// 11 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `000.000.000-00`
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

impl TryFrom<String> for Cpf {
    type Error = CpfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Strip everything but ASCII digits
pub fn digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Relaxed check used on the public catalog form: 11 digits after stripping
pub fn is_plausible(input: &str) -> bool {
    digits(input).len() == CPF_LEN
}

/// Full validation, including both mod-11 check digits
pub fn validate(input: &str) -> Result<Cpf, CpfError> {
    let clean = digits(input);
    if clean.len() != CPF_LEN {
        return Err(CpfError::WrongLength(clean.len()));
    }

    let numbers: Vec<u32> = clean.bytes().map(|b| u32::from(b - b'0')).collect();
    if numbers.iter().all(|&n| n == numbers[0]) {
        return Err(CpfError::RepeatedDigits);
    }

    if check_digit(&numbers[..9]) != numbers[9] || check_digit(&numbers[..10]) != numbers[10] {
        return Err(CpfError::BadCheckDigits);
    }

    Ok(Cpf(clean))
}

/// Weights run from `len + 1` down to 2
fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, n)| n * (weight_start - i as u32))
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}
