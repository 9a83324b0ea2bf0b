// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::types::{Employee, EmployeeRequest};
use crate::common::store::Table;
use crate::common::validate::{require_match, require_positive, require_text, DOCUMENT_NUMBER};
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

fn unique_document(candidate: &Employee, existing: &Employee) -> PlatformResult<()> {
    if candidate.document_number == existing.document_number {
        return Err(PlatformError::Conflict(format!(
            "an employee with document {} already exists",
            candidate.document_number
        )));
    }
    Ok(())
}

fn validate(request: &EmployeeRequest) -> PlatformResult<()> {
    require_match("documentNumber", request.document_number.trim(), &DOCUMENT_NUMBER)?;
    require_text("fullName", &request.full_name)?;
    require_text("position", &request.position)?;
    require_positive("baseSalary", request.base_salary)
}

pub struct EmployeeService {
    employees: Arc<Table<Employee>>,
}

impl EmployeeService {
    pub fn new(employees: Arc<Table<Employee>>) -> Self {
        Self { employees }
    }

    pub async fn create(&self, request: EmployeeRequest) -> PlatformResult<Employee> {
        validate(&request)?;
        let now = Utc::now();
        let employee = self
            .employees
            .insert(
                |id| Employee {
                    id,
                    document_number: request.document_number.trim().to_string(),
                    full_name: request.full_name,
                    position: request.position,
                    department: request.department,
                    hire_date: request.hire_date,
                    base_salary: request.base_salary,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                unique_document,
            )
            .await?;
        info!("Hired employee {} as {}", employee.id, employee.position);
        Ok(employee)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<Employee> {
        self.employees.get(id).await
    }

    pub async fn list_active(&self, query: PageQuery) -> PlatformResult<Page<Employee>> {
        let employees = self.employees.select(|e| e.active).await;
        Page::from_items(employees, query)
    }

    pub async fn update(&self, id: u64, request: EmployeeRequest) -> PlatformResult<Employee> {
        validate(&request)?;
        self.employees
            .update(
                id,
                |employee| {
                    employee.document_number = request.document_number.trim().to_string();
                    employee.full_name = request.full_name;
                    employee.position = request.position;
                    employee.department = request.department;
                    employee.hire_date = request.hire_date;
                    employee.base_salary = request.base_salary;
                    employee.updated_at = Utc::now();
                    Ok(())
                },
                unique_document,
            )
            .await
    }

    pub async fn deactivate(&self, id: u64) -> PlatformResult<Employee> {
        let employee = self
            .employees
            .modify(id, |employee| {
                employee.active = false;
                employee.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        info!("Deactivated employee {}", id);
        Ok(employee)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn employee_request(document: &str, base_salary: i64) -> EmployeeRequest {
        EmployeeRequest {
            document_number: document.to_string(),
            full_name: "Luisa Fernanda Ortiz".to_string(),
            position: "Auxiliar de enfermeria".to_string(),
            department: Some("Urgencias".to_string()),
            hire_date: NaiveDate::from_ymd_opt(2021, 8, 1).expect("date"),
            base_salary,
        }
    }

    #[tokio::test]
    async fn test_duplicate_document_rejected() {
        let service = EmployeeService::new(Arc::new(Table::new("Employee")));
        let first = service.create(employee_request("43111222", 2_000_000)).await.expect("create");
        assert!(matches!(
            service.create(employee_request("43111222", 1_500_000)).await,
            Err(PlatformError::Conflict(_))
        ));
        assert_eq!(service.get(first.id).await.expect("get"), first);
    }

    #[tokio::test]
    async fn test_salary_must_be_positive() {
        let service = EmployeeService::new(Arc::new(Table::new("Employee")));
        assert!(matches!(
            service.create(employee_request("43111222", 0)).await,
            Err(PlatformError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivated_employee_leaves_listing() {
        let service = EmployeeService::new(Arc::new(Table::new("Employee")));
        let employee = service
            .create(employee_request("43111222", 2_000_000))
            .await
            .expect("create");
        service.deactivate(employee.id).await.expect("deactivate");
        let page = service.list_active(PageQuery::default()).await.expect("list");
        assert_eq!(page.total_elements, 0);
        assert!(!service.get(employee.id).await.expect("get").active);
    }
}
