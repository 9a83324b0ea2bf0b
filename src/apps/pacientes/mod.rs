// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Patient-facing clinical records: patients, clinical histories,
//! consultations, appointments and attached documents.

pub mod appointments;
pub mod consultations;
pub mod documents;
pub mod endpoints;
pub mod histories;
pub mod patients;
pub mod status;
pub mod types;

pub use appointments::AppointmentService;
pub use consultations::ConsultationService;
pub use documents::{compute_checksum, DocumentService, MAX_DOCUMENT_BYTES, MAX_UPLOAD_BODY_BYTES};
pub use endpoints::router;
pub use histories::HistoryService;
pub use patients::PatientService;
pub use status::AppointmentStatus;
pub use types::*;

use crate::common::store::Table;
use std::sync::Arc;

/// Shared state of the pacientes service. Services that reference the same
/// entity hold the same table.
#[derive(Clone)]
pub struct PacientesState {
    pub patients: Arc<PatientService>,
    pub histories: Arc<HistoryService>,
    pub consultations: Arc<ConsultationService>,
    pub appointments: Arc<AppointmentService>,
    pub documents: Arc<DocumentService>,
}

impl PacientesState {
    pub fn new() -> Self {
        let patients = Arc::new(Table::new("Patient"));
        let histories = Arc::new(Table::new("ClinicalHistory"));

        Self {
            patients: Arc::new(PatientService::new(patients.clone())),
            histories: Arc::new(HistoryService::new(histories.clone(), patients.clone())),
            consultations: Arc::new(ConsultationService::new(
                Arc::new(Table::new("Consultation")),
                histories.clone(),
            )),
            appointments: Arc::new(AppointmentService::new(
                Arc::new(Table::new("Appointment")),
                patients.clone(),
            )),
            documents: Arc::new(DocumentService::new(
                Arc::new(Table::new("MedicalDocument")),
                patients,
                histories,
            )),
        }
    }
}

impl Default for PacientesState {
    fn default() -> Self {
        Self::new()
    }
}
