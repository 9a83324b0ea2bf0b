// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::patients::require_active_patient;
use super::types::{ClinicalHistory, HistoryRequest, HistoryUpdate, Patient};
use crate::common::store::Table;
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// At most one active history per patient.
fn single_active_history(
    candidate: &ClinicalHistory,
    existing: &ClinicalHistory,
) -> PlatformResult<()> {
    if candidate.active && existing.active && candidate.patient_id == existing.patient_id {
        return Err(PlatformError::Conflict(format!(
            "patient {} already has an active clinical history",
            candidate.patient_id
        )));
    }
    Ok(())
}

pub struct HistoryService {
    histories: Arc<Table<ClinicalHistory>>,
    patients: Arc<Table<Patient>>,
}

impl HistoryService {
    pub fn new(histories: Arc<Table<ClinicalHistory>>, patients: Arc<Table<Patient>>) -> Self {
        Self {
            histories,
            patients,
        }
    }

    pub async fn create(&self, request: HistoryRequest) -> PlatformResult<ClinicalHistory> {
        let patient = require_active_patient(&self.patients, request.patient_id).await?;
        let sequence = self
            .histories
            .count(|h| h.patient_id == patient.id)
            .await
            + 1;
        let now = Utc::now();

        let history = self
            .histories
            .insert(
                |id| ClinicalHistory {
                    id,
                    patient_id: patient.id,
                    history_number: format!("HC-{}-{}", patient.document_number, sequence),
                    clinical_data: request.clinical_data,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                single_active_history,
            )
            .await?;

        info!(
            "Opened clinical history {} for patient {}",
            history.history_number, patient.id
        );
        Ok(history)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<ClinicalHistory> {
        self.histories.get(id).await
    }

    pub async fn get_active_for_patient(&self, patient_id: u64) -> PlatformResult<ClinicalHistory> {
        self.patients.get(patient_id).await?;
        self.histories
            .find(|h| h.patient_id == patient_id && h.active)
            .await
            .ok_or_else(|| {
                PlatformError::NotFound(format!(
                    "patient {patient_id} has no active clinical history"
                ))
            })
    }

    pub async fn list_active(&self, query: PageQuery) -> PlatformResult<Page<ClinicalHistory>> {
        let histories = self.histories.select(|h| h.active).await;
        Page::from_items(histories, query)
    }

    pub async fn update(&self, id: u64, request: HistoryUpdate) -> PlatformResult<ClinicalHistory> {
        self.histories
            .modify(id, |history| {
                if !history.active {
                    return Err(PlatformError::Validation(format!(
                        "Clinical history {id} is inactive"
                    )));
                }
                history.clinical_data = request.clinical_data;
                history.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    /// Soft delete. Frees the patient to open a new history.
    pub async fn deactivate(&self, id: u64) -> PlatformResult<ClinicalHistory> {
        let history = self
            .histories
            .modify(id, |history| {
                history.active = false;
                history.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        info!("Deactivated clinical history {}", id);
        Ok(history)
    }
}

pub(crate) async fn require_active_history(
    histories: &Table<ClinicalHistory>,
    id: u64,
) -> PlatformResult<ClinicalHistory> {
    let history = histories.get(id).await?;
    if !history.active {
        return Err(PlatformError::Validation(format!(
            "Clinical history {id} is inactive"
        )));
    }
    Ok(history)
}
