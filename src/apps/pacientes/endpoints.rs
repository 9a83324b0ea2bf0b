// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::common::{created, health_routes, ok, ok_with_message, ApiResponse, Page, PageQuery};
use crate::common::{ValidJson, ValidPath, ValidQuery};
use crate::PlatformResult;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

type Reply<T> = PlatformResult<Json<ApiResponse<T>>>;
type Created<T> = PlatformResult<(StatusCode, Json<ApiResponse<T>>)>;

// ============================================
// Patients
// ============================================

pub async fn create_patient(
    State(state): State<PacientesState>,
    ValidJson(request): ValidJson<PatientRequest>,
) -> Created<Patient> {
    let patient = state.patients.create(request).await?;
    Ok(created(patient, "Patient created"))
}

pub async fn list_patients(
    State(state): State<PacientesState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<Patient>> {
    Ok(ok(state.patients.list_active(query).await?))
}

pub async fn search_patients(
    State(state): State<PacientesState>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> Reply<Page<Patient>> {
    let page = PageQuery {
        page: query.page,
        size: query.size,
    };
    Ok(ok(state.patients.search(&query.q, page).await?))
}

pub async fn get_patient(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<Patient> {
    Ok(ok(state.patients.get(id).await?))
}

pub async fn get_patient_by_document(
    State(state): State<PacientesState>,
    ValidPath(document_number): ValidPath<String>,
) -> Reply<Patient> {
    Ok(ok(state.patients.get_by_document(&document_number).await?))
}

pub async fn update_patient(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<PatientRequest>,
) -> Reply<Patient> {
    let patient = state.patients.update(id, request).await?;
    Ok(ok_with_message(patient, "Patient updated"))
}

pub async fn deactivate_patient(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.patients.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Clinical histories
// ============================================

pub async fn create_history(
    State(state): State<PacientesState>,
    ValidJson(request): ValidJson<HistoryRequest>,
) -> Created<ClinicalHistory> {
    let history = state.histories.create(request).await?;
    Ok(created(history, "Clinical history created"))
}

pub async fn list_histories(
    State(state): State<PacientesState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<ClinicalHistory>> {
    Ok(ok(state.histories.list_active(query).await?))
}

pub async fn get_history(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<ClinicalHistory> {
    Ok(ok(state.histories.get(id).await?))
}

pub async fn get_patient_history(
    State(state): State<PacientesState>,
    ValidPath(patient_id): ValidPath<u64>,
) -> Reply<ClinicalHistory> {
    Ok(ok(state.histories.get_active_for_patient(patient_id).await?))
}

pub async fn update_history(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<HistoryUpdate>,
) -> Reply<ClinicalHistory> {
    let history = state.histories.update(id, request).await?;
    Ok(ok_with_message(history, "Clinical history updated"))
}

pub async fn deactivate_history(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.histories.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Consultations
// ============================================

pub async fn create_consultation(
    State(state): State<PacientesState>,
    ValidJson(request): ValidJson<ConsultationRequest>,
) -> Created<Consultation> {
    let consultation = state.consultations.create(request).await?;
    Ok(created(consultation, "Consultation recorded"))
}

pub async fn get_consultation(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<Consultation> {
    Ok(ok(state.consultations.get(id).await?))
}

pub async fn list_history_consultations(
    State(state): State<PacientesState>,
    ValidPath(history_id): ValidPath<u64>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<Consultation>> {
    Ok(ok(state.consultations.list_for_history(history_id, query).await?))
}

pub async fn update_consultation(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<ConsultationUpdate>,
) -> Reply<Consultation> {
    let consultation = state.consultations.update(id, request).await?;
    Ok(ok_with_message(consultation, "Consultation updated"))
}

pub async fn deactivate_consultation(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.consultations.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Appointments
// ============================================

pub async fn create_appointment(
    State(state): State<PacientesState>,
    ValidJson(request): ValidJson<AppointmentRequest>,
) -> Created<Appointment> {
    let appointment = state.appointments.create(request).await?;
    Ok(created(appointment, "Appointment scheduled"))
}

pub async fn list_appointments(
    State(state): State<PacientesState>,
    ValidQuery(query): ValidQuery<AppointmentQuery>,
) -> Reply<Page<Appointment>> {
    let page = PageQuery {
        page: query.page,
        size: query.size,
    };
    let appointments = state
        .appointments
        .list(query.patient_id, query.estado.as_deref(), page)
        .await?;
    Ok(ok(appointments))
}

pub async fn get_appointment(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<Appointment> {
    Ok(ok(state.appointments.get(id).await?))
}

pub async fn change_appointment_status(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<StatusChangeRequest>,
) -> Reply<Appointment> {
    let appointment = state.appointments.change_status(id, &request.status).await?;
    Ok(ok_with_message(appointment, "Appointment status updated"))
}

pub async fn appointment_transitions(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<TransitionsResponse> {
    let (current, allowed) = state.appointments.allowed_transitions(id).await?;
    Ok(ok(TransitionsResponse { current, allowed }))
}

pub async fn deactivate_appointment(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.appointments.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Documents
// ============================================

pub async fn create_document(
    State(state): State<PacientesState>,
    ValidJson(request): ValidJson<DocumentRequest>,
) -> Created<DocumentSummary> {
    let document = state.documents.create(request).await?;
    Ok(created(document.into(), "Document stored"))
}

pub async fn get_document(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<MedicalDocument> {
    Ok(ok(state.documents.get(id).await?))
}

pub async fn download_document(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<impl IntoResponse> {
    let (mime_type, bytes) = state.documents.content(id).await?;
    Ok(([(header::CONTENT_TYPE, mime_type)], bytes))
}

pub async fn list_patient_documents(
    State(state): State<PacientesState>,
    ValidPath(patient_id): ValidPath<u64>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<DocumentSummary>> {
    Ok(ok(state.documents.list_for_patient(patient_id, query).await?))
}

pub async fn deactivate_document(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.documents.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge_document(
    State(state): State<PacientesState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.documents.purge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All pacientes routes plus `/health`.
pub fn router(state: PacientesState) -> Router {
    Router::new()
        .route("/api/pacientes", get(list_patients).post(create_patient))
        .route("/api/pacientes/buscar", get(search_patients))
        .route(
            "/api/pacientes/documento/:document_number",
            get(get_patient_by_document),
        )
        .route(
            "/api/pacientes/:id",
            get(get_patient)
                .put(update_patient)
                .delete(deactivate_patient),
        )
        .route("/api/historias", get(list_histories).post(create_history))
        .route("/api/historias/paciente/:patient_id", get(get_patient_history))
        .route(
            "/api/historias/:id",
            get(get_history)
                .put(update_history)
                .delete(deactivate_history),
        )
        .route("/api/consultas", post(create_consultation))
        .route(
            "/api/consultas/historia/:history_id",
            get(list_history_consultations),
        )
        .route(
            "/api/consultas/:id",
            get(get_consultation)
                .put(update_consultation)
                .delete(deactivate_consultation),
        )
        .route("/api/citas", get(list_appointments).post(create_appointment))
        .route(
            "/api/citas/:id",
            get(get_appointment).delete(deactivate_appointment),
        )
        .route("/api/citas/:id/estado", patch(change_appointment_status))
        .route("/api/citas/:id/transiciones", get(appointment_transitions))
        .route(
            "/api/documentos",
            post(create_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/api/documentos/paciente/:patient_id",
            get(list_patient_documents),
        )
        .route(
            "/api/documentos/:id",
            get(get_document).delete(deactivate_document),
        )
        .route("/api/documentos/:id/contenido", get(download_document))
        .route("/api/documentos/:id/purge", delete(purge_document))
        .with_state(state)
        .merge(health_routes("pacientes"))
}
