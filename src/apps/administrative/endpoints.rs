// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::common::{created, health_routes, ok, ok_with_message, ApiResponse, Page, PageQuery};
use crate::common::{ValidJson, ValidPath, ValidQuery};
use crate::PlatformResult;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

type Reply<T> = PlatformResult<Json<ApiResponse<T>>>;
type Created<T> = PlatformResult<(StatusCode, Json<ApiResponse<T>>)>;

// ============================================
// CUPS catalog
// ============================================

pub async fn create_cups(
    State(state): State<AdministrativeState>,
    ValidJson(request): ValidJson<CupsRequest>,
) -> Created<CupsCode> {
    Ok(created(state.cups.create(request).await?, "CUPS code registered"))
}

pub async fn list_cups(
    State(state): State<AdministrativeState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<CupsCode>> {
    Ok(ok(state.cups.list_active(query).await?))
}

pub async fn search_cups(
    State(state): State<AdministrativeState>,
    ValidQuery(query): ValidQuery<CatalogSearchQuery>,
) -> Reply<Page<CupsCode>> {
    let page = PageQuery {
        page: query.page,
        size: query.size,
    };
    Ok(ok(state.cups.search(&query.q, page).await?))
}

pub async fn get_cups(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<CupsCode> {
    Ok(ok(state.cups.get(id).await?))
}

pub async fn get_cups_by_code(
    State(state): State<AdministrativeState>,
    ValidPath(code): ValidPath<String>,
) -> Reply<CupsCode> {
    Ok(ok(state.cups.get_by_code(&code).await?))
}

pub async fn update_cups(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<CupsRequest>,
) -> Reply<CupsCode> {
    Ok(ok_with_message(state.cups.update(id, request).await?, "CUPS code updated"))
}

pub async fn deactivate_cups(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.cups.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Employees
// ============================================

pub async fn create_employee(
    State(state): State<AdministrativeState>,
    ValidJson(request): ValidJson<EmployeeRequest>,
) -> Created<Employee> {
    Ok(created(state.employees.create(request).await?, "Employee created"))
}

pub async fn list_employees(
    State(state): State<AdministrativeState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<Employee>> {
    Ok(ok(state.employees.list_active(query).await?))
}

pub async fn get_employee(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<Employee> {
    Ok(ok(state.employees.get(id).await?))
}

pub async fn update_employee(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<EmployeeRequest>,
) -> Reply<Employee> {
    Ok(ok_with_message(state.employees.update(id, request).await?, "Employee updated"))
}

pub async fn deactivate_employee(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    state.employees.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Payroll
// ============================================

pub async fn create_payroll(
    State(state): State<AdministrativeState>,
    ValidJson(request): ValidJson<PayrollRequest>,
) -> Created<Payroll> {
    Ok(created(state.payroll.create(request).await?, "Payroll settled"))
}

pub async fn get_payroll(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<Payroll> {
    Ok(ok(state.payroll.get(id).await?))
}

pub async fn list_employee_payrolls(
    State(state): State<AdministrativeState>,
    ValidPath(employee_id): ValidPath<u64>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<Payroll>> {
    Ok(ok(state.payroll.list_for_employee(employee_id, query).await?))
}

pub async fn change_payroll_status(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<StatusChangeRequest>,
) -> Reply<Payroll> {
    let payroll = state.payroll.change_status(id, &request.status).await?;
    Ok(ok_with_message(payroll, "Payroll status updated"))
}

// ============================================
// Billing
// ============================================

pub async fn create_invoice(
    State(state): State<AdministrativeState>,
    ValidJson(request): ValidJson<InvoiceRequest>,
) -> Created<Invoice> {
    Ok(created(state.billing.create(request).await?, "Invoice issued"))
}

pub async fn list_invoices(
    State(state): State<AdministrativeState>,
    ValidQuery(query): ValidQuery<InvoiceQuery>,
) -> Reply<Page<Invoice>> {
    let page = PageQuery {
        page: query.page,
        size: query.size,
    };
    let invoices = state
        .billing
        .list(query.patient_document.as_deref(), query.estado.as_deref(), page)
        .await?;
    Ok(ok(invoices))
}

pub async fn get_invoice(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
) -> Reply<Invoice> {
    Ok(ok(state.billing.get(id).await?))
}

pub async fn change_invoice_status(
    State(state): State<AdministrativeState>,
    ValidPath(id): ValidPath<u64>,
    ValidJson(request): ValidJson<StatusChangeRequest>,
) -> Reply<Invoice> {
    let invoice = state.billing.change_status(id, &request.status).await?;
    Ok(ok_with_message(invoice, "Invoice status updated"))
}

pub fn router(state: AdministrativeState) -> Router {
    Router::new()
        .route("/api/cups", get(list_cups).post(create_cups))
        .route("/api/cups/buscar", get(search_cups))
        .route("/api/cups/codigo/:code", get(get_cups_by_code))
        .route(
            "/api/cups/:id",
            get(get_cups).put(update_cups).delete(deactivate_cups),
        )
        .route("/api/empleados", get(list_employees).post(create_employee))
        .route(
            "/api/empleados/:id",
            get(get_employee)
                .put(update_employee)
                .delete(deactivate_employee),
        )
        .route("/api/nominas", post(create_payroll))
        .route(
            "/api/nominas/empleado/:employee_id",
            get(list_employee_payrolls),
        )
        .route("/api/nominas/:id", get(get_payroll))
        .route("/api/nominas/:id/estado", patch(change_payroll_status))
        .route("/api/facturas", get(list_invoices).post(create_invoice))
        .route("/api/facturas/:id", get(get_invoice))
        .route("/api/facturas/:id/estado", patch(change_invoice_status))
        .with_state(state)
        .merge(health_routes("administrative"))
}
