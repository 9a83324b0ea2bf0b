// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::patients::require_active_patient;
use super::status::AppointmentStatus;
use super::types::{Appointment, AppointmentRequest, Patient, StatusChange};
use crate::common::store::{no_conflicts, Table};
use crate::common::validate::require_text;
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AppointmentService {
    appointments: Arc<Table<Appointment>>,
    patients: Arc<Table<Patient>>,
}

impl AppointmentService {
    pub fn new(appointments: Arc<Table<Appointment>>, patients: Arc<Table<Patient>>) -> Self {
        Self {
            appointments,
            patients,
        }
    }

    /// New appointments start as `PROGRAMADO`.
    pub async fn create(&self, request: AppointmentRequest) -> PlatformResult<Appointment> {
        require_text("professional", &request.professional)?;
        let patient = require_active_patient(&self.patients, request.patient_id).await?;

        let now = Utc::now();
        let appointment = self
            .appointments
            .insert(
                |id| Appointment {
                    id,
                    patient_id: patient.id,
                    professional: request.professional,
                    specialty: request.specialty,
                    scheduled_at: request.scheduled_at,
                    reason: request.reason,
                    status: AppointmentStatus::default(),
                    status_history: Vec::new(),
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                no_conflicts,
            )
            .await?;

        info!(
            "Scheduled appointment {} for patient {} at {}",
            appointment.id, patient.id, appointment.scheduled_at
        );
        Ok(appointment)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<Appointment> {
        self.appointments.get(id).await
    }

    /// Active appointments ordered by schedule, optionally narrowed to a
    /// patient and a status.
    pub async fn list(
        &self,
        patient_id: Option<u64>,
        status: Option<&str>,
        query: PageQuery,
    ) -> PlatformResult<Page<Appointment>> {
        let status = status.map(str::parse::<AppointmentStatus>).transpose()?;
        let mut appointments = self
            .appointments
            .select(|a| {
                a.active
                    && patient_id.map_or(true, |p| a.patient_id == p)
                    && status.map_or(true, |s| a.status == s)
            })
            .await;
        appointments.sort_by_key(|a| (a.scheduled_at, a.id));
        Page::from_items(appointments, query)
    }

    /// Move appointment `id` to `requested`. A disallowed move fails with a
    /// validation error and the stored appointment is left as it was.
    pub async fn change_status(&self, id: u64, requested: &str) -> PlatformResult<Appointment> {
        let next: AppointmentStatus = requested.parse()?;

        let result = self
            .appointments
            .modify(id, |appointment| {
                if !appointment.active {
                    return Err(PlatformError::Validation(format!(
                        "Appointment {id} is inactive"
                    )));
                }
                let current = appointment.status;
                appointment.status = current.transition(next)?;
                let now = Utc::now();
                appointment.status_history.push(StatusChange {
                    from: current,
                    to: next,
                    at: now,
                });
                appointment.updated_at = now;
                Ok(())
            })
            .await;

        match &result {
            Ok(appointment) => info!("Appointment {} is now {}", id, appointment.status),
            Err(PlatformError::Validation(reason)) => {
                warn!("Rejected status change for appointment {}: {}", id, reason)
            }
            Err(_) => {}
        }
        result
    }

    pub async fn allowed_transitions(
        &self,
        id: u64,
    ) -> PlatformResult<(AppointmentStatus, Vec<AppointmentStatus>)> {
        let appointment = self.appointments.get(id).await?;
        Ok((appointment.status, appointment.status.allowed_next()))
    }

    /// Soft delete. The appointment stays retrievable by id.
    pub async fn deactivate(&self, id: u64) -> PlatformResult<Appointment> {
        self.appointments
            .modify(id, |appointment| {
                appointment.active = false;
                appointment.updated_at = Utc::now();
                Ok(())
            })
            .await
    }
}
