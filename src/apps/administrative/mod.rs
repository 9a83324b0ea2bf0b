// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Back-office records: the CUPS procedure catalog, employees, monthly
//! payroll and patient invoices.

pub mod billing;
pub mod cups;
pub mod employees;
pub mod endpoints;
pub mod payroll;
pub mod status;
pub mod types;

pub use billing::BillingService;
pub use cups::CupsService;
pub use employees::EmployeeService;
pub use endpoints::router;
pub use payroll::PayrollService;
pub use status::{InvoiceStatus, Lifecycle, PayrollStatus};
pub use types::*;

use crate::common::store::Table;
use std::sync::Arc;

#[derive(Clone)]
pub struct AdministrativeState {
    pub cups: Arc<CupsService>,
    pub employees: Arc<EmployeeService>,
    pub payroll: Arc<PayrollService>,
    pub billing: Arc<BillingService>,
}

impl AdministrativeState {
    pub fn new() -> Self {
        let employees = Arc::new(Table::new("Employee"));
        let cups = Arc::new(CupsService::new(Arc::new(Table::new("CupsCode"))));

        Self {
            employees: Arc::new(EmployeeService::new(employees.clone())),
            payroll: Arc::new(PayrollService::new(Arc::new(Table::new("Payroll")), employees)),
            billing: Arc::new(BillingService::new(Arc::new(Table::new("Invoice")), cups.clone())),
            cups,
        }
    }
}

impl Default for AdministrativeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::testing::send;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_catalog_and_invoice_over_http() {
        let app = router(AdministrativeState::new());

        let (status, _) = send(
            &app,
            "POST",
            "/api/cups",
            Some(json!({
                "code": "890201",
                "description": "Consulta medicina general",
                "tariff": 45000
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "GET", "/api/cups/codigo/890201", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tariff"], 45000);

        let (status, body) = send(
            &app,
            "POST",
            "/api/facturas",
            Some(json!({
                "patientDocument": "1020304050",
                "lines": [{ "cupsCode": "890201", "quantity": 2 }]
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["invoiceNumber"], "FAC-000001");
        assert_eq!(body["data"]["total"], 90000);
        assert_eq!(body["data"]["estado"], "PENDIENTE");

        let (status, body) = send(
            &app,
            "PATCH",
            "/api/facturas/1/estado",
            Some(json!({ "estado": "ANULADA" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["estado"], "ANULADA");

        let (status, _) = send(
            &app,
            "PATCH",
            "/api/facturas/1/estado",
            Some(json!({ "estado": "PAGADA" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payroll_over_http() {
        let app = router(AdministrativeState::new());
        let (status, body) = send(
            &app,
            "POST",
            "/api/empleados",
            Some(json!({
                "documentNumber": "43111222",
                "fullName": "Luisa Ortiz",
                "position": "Enfermera jefe",
                "hireDate": "2020-01-15",
                "baseSalary": 3000000
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let employee_id = body["data"]["id"].as_u64().expect("id");

        let payroll = json!({ "employeeId": employee_id, "period": { "year": 2024, "month": 5 } });
        let (status, body) = send(&app, "POST", "/api/nominas", Some(payroll.clone()), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["netPay"], 2760000);

        let (status, _) = send(&app, "POST", "/api/nominas", Some(payroll), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/nominas/empleado/{employee_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(body["data"]["totalElements"], 1);

        let (status, _) = send(&app, "GET", "/api/empleados/99", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payroll_overflowing_salary_is_400() {
        let app = router(AdministrativeState::new());
        let (status, body) = send(
            &app,
            "POST",
            "/api/empleados",
            Some(json!({
                "documentNumber": "43999000",
                "fullName": "Mario Ruiz",
                "position": "Director",
                "hireDate": "2019-06-01",
                "baseSalary": i64::MAX / 2
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let employee_id = body["data"]["id"].as_u64().expect("id");

        let (status, body) = send(
            &app,
            "POST",
            "/api/nominas",
            Some(json!({ "employeeId": employee_id, "period": { "year": 2024, "month": 5 } })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
