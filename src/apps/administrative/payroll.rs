// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Monthly payroll settlement.
//!
//! Net pay is the base salary plus earnings minus deductions, where the
//! deductions always carry the employee's statutory health and pension
//! contributions computed on the base salary.

use super::status::{Lifecycle, PayrollStatus};
use super::types::{Cop, Employee, Payroll, PayrollItem, PayrollRequest};
use crate::common::store::Table;
use crate::common::validate::{require_positive, require_text};
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub const HEALTH_CONTRIBUTION_PERCENT: Cop = 4;
pub const PENSION_CONTRIBUTION_PERCENT: Cop = 4;
pub const HEALTH_CONCEPT: &str = "SALUD";
pub const PENSION_CONCEPT: &str = "PENSION";

/// One live payroll per employee and period. Voided ones may be reissued.
fn unique_period(candidate: &Payroll, existing: &Payroll) -> PlatformResult<()> {
    if candidate.employee_id == existing.employee_id
        && candidate.period == existing.period
        && existing.status != PayrollStatus::Voided
    {
        return Err(PlatformError::Conflict(format!(
            "employee {} already has a payroll for {}",
            candidate.employee_id, candidate.period
        )));
    }
    Ok(())
}

fn validate_items(field: &str, items: &[PayrollItem]) -> PlatformResult<Cop> {
    let mut total: Cop = 0;
    for item in items {
        require_text(&format!("{field}.concept"), &item.concept)?;
        require_positive(&format!("{field}.amount"), item.amount)?;
        total = total
            .checked_add(item.amount)
            .ok_or_else(|| PlatformError::Validation(format!("{field} total overflows")))?;
    }
    Ok(total)
}

fn overflow(what: &str) -> PlatformError {
    PlatformError::Validation(format!("{what} overflows"))
}

fn contribution(base_salary: Cop, percent: Cop) -> PlatformResult<Cop> {
    base_salary
        .checked_mul(percent)
        .map(|amount| amount / 100)
        .ok_or_else(|| overflow("baseSalary contribution"))
}

/// Statutory deductions for `base_salary`.
pub fn statutory_deductions(base_salary: Cop) -> PlatformResult<Vec<PayrollItem>> {
    Ok(vec![
        PayrollItem {
            concept: HEALTH_CONCEPT.to_string(),
            amount: contribution(base_salary, HEALTH_CONTRIBUTION_PERCENT)?,
        },
        PayrollItem {
            concept: PENSION_CONCEPT.to_string(),
            amount: contribution(base_salary, PENSION_CONTRIBUTION_PERCENT)?,
        },
    ])
}

pub struct PayrollService {
    payrolls: Arc<Table<Payroll>>,
    employees: Arc<Table<Employee>>,
}

impl PayrollService {
    pub fn new(payrolls: Arc<Table<Payroll>>, employees: Arc<Table<Employee>>) -> Self {
        Self {
            payrolls,
            employees,
        }
    }

    pub async fn create(&self, request: PayrollRequest) -> PlatformResult<Payroll> {
        request.period.validate()?;
        let extra_earnings = validate_items("earnings", &request.earnings)?;
        validate_items("deductions", &request.deductions)?;

        let employee = self.employees.get(request.employee_id).await?;
        if !employee.active {
            return Err(PlatformError::Validation(format!(
                "Employee {} is inactive",
                employee.id
            )));
        }

        let mut deductions = statutory_deductions(employee.base_salary)?;
        deductions.extend(request.deductions);
        let total_deductions = deductions
            .iter()
            .try_fold(0_i64, |total, d| total.checked_add(d.amount))
            .ok_or_else(|| overflow("deductions total"))?;
        let total_earnings = employee
            .base_salary
            .checked_add(extra_earnings)
            .ok_or_else(|| overflow("earnings total"))?;
        let net_pay = total_earnings
            .checked_sub(total_deductions)
            .ok_or_else(|| overflow("net pay"))?;
        if net_pay < 0 {
            return Err(PlatformError::Validation(format!(
                "deductions ({total_deductions}) exceed earnings ({total_earnings})"
            )));
        }

        let now = Utc::now();
        let payroll = self
            .payrolls
            .insert(
                |id| Payroll {
                    id,
                    employee_id: employee.id,
                    period: request.period,
                    base_salary: employee.base_salary,
                    earnings: request.earnings,
                    deductions,
                    total_earnings,
                    total_deductions,
                    net_pay,
                    status: PayrollStatus::default(),
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                unique_period,
            )
            .await?;

        info!(
            "Settled payroll {} for employee {} period {}: net {} COP",
            payroll.id, employee.id, payroll.period, payroll.net_pay
        );
        Ok(payroll)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<Payroll> {
        self.payrolls.get(id).await
    }

    /// Payrolls of an employee, latest period first.
    pub async fn list_for_employee(
        &self,
        employee_id: u64,
        query: PageQuery,
    ) -> PlatformResult<Page<Payroll>> {
        self.employees.get(employee_id).await?;
        let mut payrolls = self
            .payrolls
            .select(|p| p.employee_id == employee_id && p.active)
            .await;
        payrolls.sort_by(|a, b| b.period.cmp(&a.period));
        Page::from_items(payrolls, query)
    }

    pub async fn change_status(&self, id: u64, requested: &str) -> PlatformResult<Payroll> {
        let next = PayrollStatus::parse(requested)?;
        let result = self
            .payrolls
            .modify(id, |payroll| {
                payroll.status = payroll.status.transition(next)?;
                payroll.updated_at = Utc::now();
                Ok(())
            })
            .await;
        if let Err(PlatformError::Validation(reason)) = &result {
            warn!("Rejected status change for payroll {}: {}", id, reason);
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::apps::administrative::employees::test::employee_request;
    use crate::apps::administrative::employees::EmployeeService;
    use crate::apps::administrative::types::Period;

    const MARCH: Period = Period {
        year: 2024,
        month: 3,
    };

    async fn setup(base_salary: Cop) -> (PayrollService, EmployeeService, Employee) {
        let employees = Arc::new(Table::new("Employee"));
        let employee_service = EmployeeService::new(employees.clone());
        let employee = employee_service
            .create(employee_request("43111222", base_salary))
            .await
            .expect("employee");
        let service = PayrollService::new(Arc::new(Table::new("Payroll")), employees);
        (service, employee_service, employee)
    }

    fn request(employee_id: u64, period: Period) -> PayrollRequest {
        PayrollRequest {
            employee_id,
            period,
            earnings: vec![PayrollItem {
                concept: "HORAS_EXTRA".to_string(),
                amount: 150_000,
            }],
            deductions: vec![],
        }
    }

    #[tokio::test]
    async fn test_net_pay_includes_statutory_deductions() {
        let (service, _, employee) = setup(2_000_000).await;
        let payroll = service.create(request(employee.id, MARCH)).await.expect("create");

        assert_eq!(payroll.base_salary, 2_000_000);
        assert_eq!(payroll.total_earnings, 2_150_000);
        assert_eq!(payroll.deductions.len(), 2);
        assert_eq!(payroll.deductions[0].concept, HEALTH_CONCEPT);
        assert_eq!(payroll.deductions[0].amount, 80_000);
        assert_eq!(payroll.total_deductions, 160_000);
        assert_eq!(payroll.net_pay, 1_990_000);
        assert_eq!(payroll.status, PayrollStatus::Draft);
    }

    #[tokio::test]
    async fn test_one_payroll_per_period_unless_voided() {
        let (service, _, employee) = setup(2_000_000).await;
        let first = service.create(request(employee.id, MARCH)).await.expect("first");
        assert!(matches!(
            service.create(request(employee.id, MARCH)).await,
            Err(PlatformError::Conflict(_))
        ));

        service.change_status(first.id, "ANULADA").await.expect("void");
        service.create(request(employee.id, MARCH)).await.expect("reissue");
        service
            .create(request(employee.id, Period { year: 2024, month: 4 }))
            .await
            .expect("april");

        let page = service
            .list_for_employee(employee.id, PageQuery::default())
            .await
            .expect("list");
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.content[0].period.month, 4);
    }

    #[tokio::test]
    async fn test_negative_net_pay_rejected() {
        let (service, _, employee) = setup(1_000_000).await;
        let mut loan = request(employee.id, MARCH);
        loan.deductions.push(PayrollItem {
            concept: "PRESTAMO".to_string(),
            amount: 5_000_000,
        });
        assert!(matches!(
            service.create(loan).await,
            Err(PlatformError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_paid_payroll_is_final() {
        let (service, _, employee) = setup(2_000_000).await;
        let payroll = service.create(request(employee.id, MARCH)).await.expect("create");
        service.change_status(payroll.id, "PAGADA").await.expect("pay");
        assert!(service.change_status(payroll.id, "ANULADA").await.is_err());
        assert_eq!(
            service.get(payroll.id).await.expect("get").status,
            PayrollStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_huge_salary_is_rejected_not_wrapped() {
        let (service, _, employee) = setup(Cop::MAX / 2).await;
        assert!(matches!(
            service.create(request(employee.id, MARCH)).await,
            Err(PlatformError::Validation(_))
        ));
        assert!(statutory_deductions(Cop::MAX / 2).is_err());
        assert_eq!(statutory_deductions(1_000_000).expect("deductions")[1].amount, 40_000);
    }

    #[tokio::test]
    async fn test_inactive_employee_rejected() {
        let (service, employees, employee) = setup(2_000_000).await;
        employees.deactivate(employee.id).await.expect("deactivate");
        assert!(matches!(
            service.create(request(employee.id, MARCH)).await,
            Err(PlatformError::Validation(_))
        ));
    }
}
