// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::histories::require_active_history;
use super::types::{ClinicalHistory, Consultation, ConsultationRequest, ConsultationUpdate};
use crate::common::store::{no_conflicts, Table};
use crate::common::validate::require_text;
use crate::common::{Page, PageQuery};
use crate::PlatformResult;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct ConsultationService {
    consultations: Arc<Table<Consultation>>,
    histories: Arc<Table<ClinicalHistory>>,
}

impl ConsultationService {
    pub fn new(
        consultations: Arc<Table<Consultation>>,
        histories: Arc<Table<ClinicalHistory>>,
    ) -> Self {
        Self {
            consultations,
            histories,
        }
    }

    pub async fn create(&self, request: ConsultationRequest) -> PlatformResult<Consultation> {
        require_text("professional", &request.professional)?;
        require_text("reason", &request.reason)?;
        request.content.validate()?;
        let history = require_active_history(&self.histories, request.history_id).await?;

        let now = Utc::now();
        let consultation = self
            .consultations
            .insert(
                |id| Consultation {
                    id,
                    history_id: history.id,
                    consultation_date: request.consultation_date.unwrap_or(now),
                    professional: request.professional,
                    reason: request.reason,
                    content: request.content,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                no_conflicts,
            )
            .await?;

        info!(
            "Recorded consultation {} in history {}",
            consultation.id, history.history_number
        );
        Ok(consultation)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<Consultation> {
        self.consultations.get(id).await
    }

    /// Active consultations of a history, most recent first.
    pub async fn list_for_history(
        &self,
        history_id: u64,
        query: PageQuery,
    ) -> PlatformResult<Page<Consultation>> {
        self.histories.get(history_id).await?;
        let mut consultations = self
            .consultations
            .select(|c| c.history_id == history_id && c.active)
            .await;
        consultations.sort_by(|a, b| b.consultation_date.cmp(&a.consultation_date));
        Page::from_items(consultations, query)
    }

    pub async fn update(
        &self,
        id: u64,
        request: ConsultationUpdate,
    ) -> PlatformResult<Consultation> {
        require_text("professional", &request.professional)?;
        require_text("reason", &request.reason)?;
        request.content.validate()?;

        self.consultations
            .modify(id, |consultation| {
                consultation.professional = request.professional;
                consultation.reason = request.reason;
                consultation.content = request.content;
                consultation.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    pub async fn deactivate(&self, id: u64) -> PlatformResult<Consultation> {
        self.consultations
            .modify(id, |consultation| {
                consultation.active = false;
                consultation.updated_at = Utc::now();
                Ok(())
            })
            .await
    }
}
