// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::types::{Patient, PatientRequest};
use crate::common::store::Table;
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Document numbers are unique across all patients, including inactive ones.
fn unique_document(candidate: &Patient, existing: &Patient) -> PlatformResult<()> {
    if candidate.document_number == existing.document_number {
        return Err(PlatformError::Conflict(format!(
            "a patient with document {} already exists",
            candidate.document_number
        )));
    }
    Ok(())
}

pub struct PatientService {
    patients: Arc<Table<Patient>>,
}

impl PatientService {
    pub fn new(patients: Arc<Table<Patient>>) -> Self {
        Self { patients }
    }

    pub async fn create(&self, request: PatientRequest) -> PlatformResult<Patient> {
        let now = Utc::now();
        request.validate(now.date_naive())?;

        let patient = self
            .patients
            .insert(
                |id| Patient {
                    id,
                    document_type: request.document_type,
                    document_number: request.document_number.trim().to_string(),
                    personal_info: request.personal_info,
                    contact_info: request.contact_info,
                    medical_info: request.medical_info,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                unique_document,
            )
            .await?;

        info!("Created patient {} ({})", patient.id, patient.document_number);
        Ok(patient)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<Patient> {
        self.patients.get(id).await
    }

    pub async fn get_by_document(&self, document_number: &str) -> PlatformResult<Patient> {
        let wanted = document_number.trim();
        self.patients
            .find(|p| p.document_number == wanted)
            .await
            .ok_or_else(|| {
                PlatformError::NotFound(format!("no patient with document {wanted}"))
            })
    }

    pub async fn list_active(&self, query: PageQuery) -> PlatformResult<Page<Patient>> {
        let patients = self.patients.select(|p| p.active).await;
        Page::from_items(patients, query)
    }

    /// Case-insensitive match on names or document number among active patients.
    pub async fn search(&self, text: &str, query: PageQuery) -> PlatformResult<Page<Patient>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(PlatformError::Validation("q is required".to_string()));
        }
        let patients = self
            .patients
            .select(|p| {
                p.active
                    && (p.full_name().to_lowercase().contains(&needle)
                        || p.document_number.to_lowercase().contains(&needle))
            })
            .await;
        Page::from_items(patients, query)
    }

    pub async fn update(&self, id: u64, request: PatientRequest) -> PlatformResult<Patient> {
        let now = Utc::now();
        request.validate(now.date_naive())?;

        self.patients
            .update(
                id,
                |patient| {
                    patient.document_type = request.document_type;
                    patient.document_number = request.document_number.trim().to_string();
                    patient.personal_info = request.personal_info;
                    patient.contact_info = request.contact_info;
                    patient.medical_info = request.medical_info;
                    patient.updated_at = now;
                    Ok(())
                },
                unique_document,
            )
            .await
    }

    /// Soft delete. The patient stays retrievable by id.
    pub async fn deactivate(&self, id: u64) -> PlatformResult<Patient> {
        let patient = self
            .patients
            .modify(id, |patient| {
                patient.active = false;
                patient.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        info!("Deactivated patient {}", id);
        Ok(patient)
    }

    /// The patient, provided it exists and is active.
    pub async fn require_active(&self, id: u64) -> PlatformResult<Patient> {
        require_active_patient(&self.patients, id).await
    }
}

pub(crate) async fn require_active_patient(
    patients: &Table<Patient>,
    id: u64,
) -> PlatformResult<Patient> {
    let patient = patients.get(id).await?;
    if !patient.active {
        return Err(PlatformError::Validation(format!("Patient {id} is inactive")));
    }
    Ok(patient)
}
