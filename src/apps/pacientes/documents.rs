// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::patients::require_active_patient;
use super::types::{ClinicalHistory, DocumentRequest, DocumentSummary, MedicalDocument, Patient};
use crate::common::store::{no_conflicts, Table};
use crate::common::validate::require_text;
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use fastcrypto::encoding::{Encoding, Hex};
use fastcrypto::hash::{HashFunction, Sha3_256};
use std::sync::Arc;
use tracing::info;

/// Largest accepted file, decoded.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Largest accepted upload request: the base64 of a full-size file plus
/// room for the other JSON fields.
pub const MAX_UPLOAD_BODY_BYTES: usize = (MAX_DOCUMENT_BYTES + 2) / 3 * 4 + 64 * 1024;

/// SHA3-256 of `bytes`, hex encoded.
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(bytes);
    Hex::encode(hasher.finalize())
}

pub struct DocumentService {
    documents: Arc<Table<MedicalDocument>>,
    patients: Arc<Table<Patient>>,
    histories: Arc<Table<ClinicalHistory>>,
}

impl DocumentService {
    pub fn new(
        documents: Arc<Table<MedicalDocument>>,
        patients: Arc<Table<Patient>>,
        histories: Arc<Table<ClinicalHistory>>,
    ) -> Self {
        Self {
            documents,
            patients,
            histories,
        }
    }

    pub async fn create(&self, request: DocumentRequest) -> PlatformResult<MedicalDocument> {
        require_text("title", &request.title)?;
        require_text("fileName", &request.file_name)?;
        require_text("mimeType", &request.mime_type)?;

        let bytes = STANDARD
            .decode(request.content.trim())
            .map_err(|e| PlatformError::Validation(format!("content is not valid base64: {e}")))?;
        if bytes.is_empty() {
            return Err(PlatformError::Validation("content is empty".to_string()));
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(PlatformError::Validation(format!(
                "content exceeds {MAX_DOCUMENT_BYTES} bytes"
            )));
        }

        let patient = require_active_patient(&self.patients, request.patient_id).await?;
        if let Some(history_id) = request.history_id {
            let history = self.histories.get(history_id).await?;
            if history.patient_id != patient.id {
                return Err(PlatformError::Validation(format!(
                    "Clinical history {history_id} does not belong to patient {}",
                    patient.id
                )));
            }
        }

        let checksum = compute_checksum(&bytes);
        let now = Utc::now();
        let document = self
            .documents
            .insert(
                |id| MedicalDocument {
                    id,
                    patient_id: patient.id,
                    history_id: request.history_id,
                    kind: request.kind,
                    title: request.title,
                    file_name: request.file_name,
                    mime_type: request.mime_type,
                    content: request.content.trim().to_string(),
                    size_bytes: bytes.len() as u64,
                    checksum,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                no_conflicts,
            )
            .await?;

        info!(
            "Stored document {} ({} bytes) for patient {}",
            document.id, document.size_bytes, patient.id
        );
        Ok(document)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<MedicalDocument> {
        self.documents.get(id).await
    }

    /// Decoded file bytes and their mime type.
    pub async fn content(&self, id: u64) -> PlatformResult<(String, Vec<u8>)> {
        let document = self.documents.get(id).await?;
        let bytes = STANDARD
            .decode(&document.content)
            .map_err(|e| PlatformError::Internal(format!("Stored document {id} is corrupt: {e}")))?;
        Ok((document.mime_type, bytes))
    }

    pub async fn list_for_patient(
        &self,
        patient_id: u64,
        query: PageQuery,
    ) -> PlatformResult<Page<DocumentSummary>> {
        self.patients.get(patient_id).await?;
        let documents = self
            .documents
            .select(|d| d.patient_id == patient_id && d.active)
            .await;
        Ok(Page::from_items(documents, query)?.map(DocumentSummary::from))
    }

    pub async fn deactivate(&self, id: u64) -> PlatformResult<MedicalDocument> {
        self.documents
            .modify(id, |document| {
                document.active = false;
                document.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    /// Hard delete.
    pub async fn purge(&self, id: u64) -> PlatformResult<()> {
        self.documents.remove(id).await?;
        info!("Purged document {}", id);
        Ok(())
    }
}
