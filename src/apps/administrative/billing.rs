// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::cups::CupsService;
use super::status::{InvoiceStatus, Lifecycle};
use super::types::{Cop, Invoice, InvoiceLine, InvoiceRequest};
use crate::common::store::{no_conflicts, Table};
use crate::common::validate::{require_match, require_positive, DOCUMENT_NUMBER};
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub fn invoice_number(sequence: u64) -> String {
    format!("FAC-{sequence:06}")
}

pub struct BillingService {
    invoices: Arc<Table<Invoice>>,
    cups: Arc<CupsService>,
}

impl BillingService {
    pub fn new(invoices: Arc<Table<Invoice>>, cups: Arc<CupsService>) -> Self {
        Self { invoices, cups }
    }

    /// Price every line against the CUPS catalog and store the invoice as
    /// `PENDIENTE`.
    pub async fn create(&self, request: InvoiceRequest) -> PlatformResult<Invoice> {
        let patient_document = request.patient_document.trim().to_string();
        require_match("patientDocument", &patient_document, &DOCUMENT_NUMBER)?;
        if request.lines.is_empty() {
            return Err(PlatformError::Validation(
                "an invoice needs at least one line".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(request.lines.len());
        for line in request.lines {
            if line.quantity == 0 {
                return Err(PlatformError::Validation(
                    "lines.quantity must be positive".to_string(),
                ));
            }
            let cups = self.cups.require_active_code(&line.cups_code).await?;
            let unit_price = line.unit_price.unwrap_or(cups.tariff);
            require_positive("lines.unitPrice", unit_price)?;
            let subtotal = unit_price
                .checked_mul(Cop::from(line.quantity))
                .ok_or_else(|| PlatformError::Validation("line subtotal overflows".to_string()))?;
            lines.push(InvoiceLine {
                cups_code: cups.code,
                description: cups.description,
                quantity: line.quantity,
                unit_price,
                subtotal,
            });
        }
        let total = lines
            .iter()
            .try_fold(0_i64, |acc, line| acc.checked_add(line.subtotal))
            .ok_or_else(|| PlatformError::Validation("invoice total overflows".to_string()))?;

        let now = Utc::now();
        let invoice = self
            .invoices
            .insert(
                |id| Invoice {
                    id,
                    invoice_number: invoice_number(id),
                    patient_document,
                    patient_name: request.patient_name,
                    lines,
                    total,
                    status: InvoiceStatus::default(),
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                no_conflicts,
            )
            .await?;

        info!(
            "Issued invoice {} for {} COP",
            invoice.invoice_number, invoice.total
        );
        Ok(invoice)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<Invoice> {
        self.invoices.get(id).await
    }

    /// Newest first, optionally narrowed to a patient and a status.
    pub async fn list(
        &self,
        patient_document: Option<&str>,
        status: Option<&str>,
        query: PageQuery,
    ) -> PlatformResult<Page<Invoice>> {
        let status = status.map(InvoiceStatus::parse).transpose()?;
        let patient_document = patient_document.map(str::trim);
        let mut invoices = self
            .invoices
            .select(|i| {
                i.active
                    && patient_document.map_or(true, |d| i.patient_document == d)
                    && status.map_or(true, |s| i.status == s)
            })
            .await;
        invoices.reverse();
        Page::from_items(invoices, query)
    }

    pub async fn change_status(&self, id: u64, requested: &str) -> PlatformResult<Invoice> {
        let next = InvoiceStatus::parse(requested)?;
        let result = self
            .invoices
            .modify(id, |invoice| {
                invoice.status = invoice.status.transition(next)?;
                invoice.updated_at = Utc::now();
                Ok(())
            })
            .await;
        match &result {
            Ok(invoice) => info!("Invoice {} is now {}", invoice.invoice_number, invoice.status),
            Err(PlatformError::Validation(reason)) => {
                warn!("Rejected status change for invoice {}: {}", id, reason)
            }
            Err(_) => {}
        }
        result
    }
}
