// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::status::{InvoiceStatus, PayrollStatus};
use crate::{PlatformError, PlatformResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Amounts are whole Colombian pesos.
pub type Cop = i64;

// ============================================
// CUPS catalog
// ============================================

/// Procedure code from the CUPS catalog with its tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupsCode {
    pub id: u64,
    pub code: String,
    pub description: String,
    pub category: Option<String>,
    pub tariff: Cop,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupsRequest {
    pub code: String,
    pub description: String,
    pub category: Option<String>,
    pub tariff: Cop,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSearchQuery {
    pub q: String,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

// ============================================
// Employees
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: u64,
    pub document_number: String,
    pub full_name: String,
    pub position: String,
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    pub base_salary: Cop,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub document_number: String,
    pub full_name: String,
    pub position: String,
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    pub base_salary: Cop,
}

// ============================================
// Payroll
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn validate(&self) -> PlatformResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(PlatformError::Validation(
                "period.month must be between 1 and 12".to_string(),
            ));
        }
        if !(2000..=2100).contains(&self.year) {
            return Err(PlatformError::Validation(
                "period.year is out of range".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// One earning or deduction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollItem {
    pub concept: String,
    pub amount: Cop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,
    pub period: Period,
    pub base_salary: Cop,
    pub earnings: Vec<PayrollItem>,
    /// Includes the statutory health and pension deductions.
    pub deductions: Vec<PayrollItem>,
    pub total_earnings: Cop,
    pub total_deductions: Cop,
    pub net_pay: Cop,
    #[serde(rename = "estado")]
    pub status: PayrollStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRequest {
    pub employee_id: u64,
    pub period: Period,
    #[serde(default)]
    pub earnings: Vec<PayrollItem>,
    #[serde(default)]
    pub deductions: Vec<PayrollItem>,
}

// ============================================
// Billing
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub cups_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Cop,
    pub subtotal: Cop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,
    pub invoice_number: String,
    pub patient_document: String,
    pub patient_name: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub total: Cop,
    #[serde(rename = "estado")]
    pub status: InvoiceStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineRequest {
    pub cups_code: String,
    pub quantity: u32,
    /// Defaults to the CUPS tariff.
    pub unit_price: Option<Cop>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub patient_document: String,
    pub patient_name: Option<String>,
    pub lines: Vec<InvoiceLineRequest>,
}

/// Query of `GET /api/facturas`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub patient_document: Option<String>,
    pub estado: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

/// Body of the `PATCH .../estado` routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(rename = "estado")]
    pub status: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_period() {
        let period = Period { year: 2024, month: 3 };
        assert!(period.validate().is_ok());
        assert_eq!(period.to_string(), "2024-03");
        assert!(Period { year: 2024, month: 13 }.validate().is_err());
        assert!(Period { year: 1999, month: 1 }.validate().is_err());
    }

    #[test]
    fn test_invoice_line_defaults_unit_price() {
        let line: InvoiceLineRequest =
            serde_json::from_str(r#"{"cupsCode":"890201","quantity":2}"#).expect("parse");
        assert_eq!(line.unit_price, None);
        assert_eq!(line.quantity, 2);
    }
}
