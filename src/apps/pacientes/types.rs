// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::status::AppointmentStatus;
use crate::common::validate::{require_match, require_text, DOCUMENT_NUMBER, EMAIL};
use crate::{PlatformError, PlatformResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Patients
// ============================================

/// Colombian identity document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "CC")]
    CitizenshipCard,
    #[serde(rename = "TI")]
    IdentityCard,
    #[serde(rename = "CE")]
    ForeignerId,
    #[serde(rename = "PA")]
    Passport,
    #[serde(rename = "RC")]
    CivilRegistry,
    #[serde(rename = "MS")]
    MinorWithoutId,
    #[serde(rename = "AS")]
    AdultWithoutId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "I")]
    Indeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_names: String,
    pub last_names: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalInfo {
    /// Health insurer.
    pub eps: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: u64,
    pub document_type: DocumentType,
    pub document_number: String,
    pub personal_info: PersonalInfo,
    pub contact_info: ContactInfo,
    pub medical_info: MedicalInfo,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.personal_info.first_names, self.personal_info.last_names
        )
    }
}

/// Body of `POST /api/pacientes` and `PUT /api/pacientes/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    pub document_type: DocumentType,
    pub document_number: String,
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub medical_info: MedicalInfo,
}

impl PatientRequest {
    pub fn validate(&self, today: NaiveDate) -> PlatformResult<()> {
        require_match("documentNumber", &self.document_number, &DOCUMENT_NUMBER)?;
        require_text("personalInfo.firstNames", &self.personal_info.first_names)?;
        require_text("personalInfo.lastNames", &self.personal_info.last_names)?;
        if self.personal_info.birth_date > today {
            return Err(PlatformError::Validation(
                "personalInfo.birthDate cannot be in the future".to_string(),
            ));
        }
        if let Some(email) = &self.contact_info.email {
            require_match("contactInfo.email", email, &EMAIL)?;
        }
        Ok(())
    }
}

/// Query of `GET /api/pacientes/buscar`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

// ============================================
// Clinical histories
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicalData {
    pub personal_background: Option<String>,
    pub family_background: Option<String>,
    pub surgical_background: Option<String>,
    pub allergies: Vec<String>,
    pub habits: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalHistory {
    pub id: u64,
    pub patient_id: u64,
    pub history_number: String,
    pub clinical_data: ClinicalData,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub patient_id: u64,
    #[serde(default)]
    pub clinical_data: ClinicalData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryUpdate {
    pub clinical_data: ClinicalData,
}

// ============================================
// Consultations
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalSigns {
    pub systolic: Option<u16>,
    pub diastolic: Option<u16>,
    pub heart_rate: Option<u16>,
    pub respiratory_rate: Option<u16>,
    pub temperature: Option<f32>,
    pub oxygen_saturation: Option<u8>,
    pub weight_kg: Option<f32>,
    pub height_cm: Option<f32>,
}

impl VitalSigns {
    pub fn validate(&self) -> PlatformResult<()> {
        if let (Some(systolic), Some(diastolic)) = (self.systolic, self.diastolic) {
            if diastolic >= systolic {
                return Err(PlatformError::Validation(
                    "vitalSigns.diastolic must be lower than systolic".to_string(),
                ));
            }
        }
        if self.oxygen_saturation.is_some_and(|s| s > 100) {
            return Err(PlatformError::Validation(
                "vitalSigns.oxygenSaturation must be a percentage".to_string(),
            ));
        }
        if self.temperature.is_some_and(|t| !(25.0..=45.0).contains(&t)) {
            return Err(PlatformError::Validation(
                "vitalSigns.temperature is out of range".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosisKind {
    #[serde(rename = "PRINCIPAL")]
    Principal,
    #[serde(rename = "RELACIONADO")]
    Related,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// ICD-10 code.
    pub code: String,
    pub description: String,
    pub kind: DiagnosisKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultationContent {
    pub anamnesis: Option<String>,
    pub physical_exam: Option<String>,
    pub vital_signs: Option<VitalSigns>,
    pub diagnoses: Vec<Diagnosis>,
    pub plan: Option<String>,
}

impl ConsultationContent {
    pub fn validate(&self) -> PlatformResult<()> {
        if let Some(vital_signs) = &self.vital_signs {
            vital_signs.validate()?;
        }
        for diagnosis in &self.diagnoses {
            require_text("diagnoses.code", &diagnosis.code)?;
        }
        let principal = self
            .diagnoses
            .iter()
            .filter(|d| d.kind == DiagnosisKind::Principal)
            .count();
        if principal > 1 {
            return Err(PlatformError::Validation(
                "only one PRINCIPAL diagnosis is allowed".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: u64,
    pub history_id: u64,
    pub consultation_date: DateTime<Utc>,
    pub professional: String,
    pub reason: String,
    pub content: ConsultationContent,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub history_id: u64,
    /// Defaults to the time of creation.
    pub consultation_date: Option<DateTime<Utc>>,
    pub professional: String,
    pub reason: String,
    #[serde(default)]
    pub content: ConsultationContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationUpdate {
    pub professional: String,
    pub reason: String,
    #[serde(default)]
    pub content: ConsultationContent,
}

// ============================================
// Appointments
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: u64,
    pub patient_id: u64,
    pub professional: String,
    pub specialty: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub reason: Option<String>,
    /// Absent or unknown in stored payloads means scheduled.
    #[serde(
        default,
        rename = "estado",
        deserialize_with = "AppointmentStatus::deserialize_legacy"
    )]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub patient_id: u64,
    pub professional: String,
    pub specialty: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Body of `PATCH /api/citas/{id}/estado`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(rename = "estado")]
    pub status: String,
}

/// Query of `GET /api/citas`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    pub patient_id: Option<u64>,
    pub estado: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionsResponse {
    #[serde(rename = "estado")]
    pub current: AppointmentStatus,
    pub allowed: Vec<AppointmentStatus>,
}

// ============================================
// Documents
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "FORMULA")]
    Prescription,
    #[serde(rename = "ORDEN")]
    Order,
    #[serde(rename = "INCAPACIDAD")]
    SickLeave,
    #[serde(rename = "RESULTADO")]
    LabResult,
    #[serde(rename = "CONSENTIMIENTO")]
    Consent,
    #[serde(rename = "OTRO")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDocument {
    pub id: u64,
    pub patient_id: u64,
    pub history_id: Option<u64>,
    pub kind: DocumentKind,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    /// Base64 of the file bytes.
    pub content: String,
    pub size_bytes: u64,
    /// SHA3-256 of the decoded bytes, hex.
    pub checksum: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view without the file content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: u64,
    pub patient_id: u64,
    pub history_id: Option<u64>,
    pub kind: DocumentKind,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

impl From<MedicalDocument> for DocumentSummary {
    fn from(document: MedicalDocument) -> Self {
        Self {
            id: document.id,
            patient_id: document.patient_id,
            history_id: document.history_id,
            kind: document.kind,
            title: document.title,
            file_name: document.file_name,
            mime_type: document.mime_type,
            size_bytes: document.size_bytes,
            checksum: document.checksum,
            created_at: document.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub patient_id: u64,
    pub history_id: Option<u64>,
    pub kind: DocumentKind,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}
