// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Payroll and invoice lifecycles. Both start pending and end either paid
//! or voided.

use crate::{PlatformError, PlatformResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A status with a fixed table of allowed moves.
pub trait Lifecycle: Copy + Eq + fmt::Display + 'static {
    const ALL: &'static [Self];
    const TRANSITIONS: &'static [(Self, Self)];
    /// Used in error messages.
    const KIND: &'static str;

    fn as_str(&self) -> &'static str;

    fn allowed_next(self) -> Vec<Self> {
        Self::TRANSITIONS
            .iter()
            .filter(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .collect()
    }

    fn transition(self, next: Self) -> PlatformResult<Self> {
        if !Self::TRANSITIONS.contains(&(self, next)) {
            return Err(PlatformError::Validation(format!(
                "transition {self} -> {next} is not allowed"
            )));
        }
        Ok(next)
    }

    fn parse(raw: &str) -> PlatformResult<Self> {
        let wanted = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                PlatformError::Validation(format!("unknown {} status '{wanted}'", Self::KIND))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayrollStatus {
    #[default]
    #[serde(rename = "BORRADOR")]
    Draft,
    #[serde(rename = "PAGADA")]
    Paid,
    #[serde(rename = "ANULADA")]
    Voided,
}

impl Lifecycle for PayrollStatus {
    const ALL: &'static [Self] = &[Self::Draft, Self::Paid, Self::Voided];
    const TRANSITIONS: &'static [(Self, Self)] =
        &[(Self::Draft, Self::Paid), (Self::Draft, Self::Voided)];
    const KIND: &'static str = "payroll";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "BORRADOR",
            Self::Paid => "PAGADA",
            Self::Voided => "ANULADA",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[default]
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "PAGADA")]
    Paid,
    #[serde(rename = "ANULADA")]
    Voided,
}

impl Lifecycle for InvoiceStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Paid, Self::Voided];
    const TRANSITIONS: &'static [(Self, Self)] =
        &[(Self::Pending, Self::Paid), (Self::Pending, Self::Voided)];
    const KIND: &'static str = "invoice";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDIENTE",
            Self::Paid => "PAGADA",
            Self::Voided => "ANULADA",
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
