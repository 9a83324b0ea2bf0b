// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::types::{CupsCode, CupsRequest};
use crate::common::store::Table;
use crate::common::validate::{require_match, require_positive, require_text, CUPS_CODE};
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

fn unique_code(candidate: &CupsCode, existing: &CupsCode) -> PlatformResult<()> {
    if candidate.code == existing.code {
        return Err(PlatformError::Conflict(format!(
            "CUPS code {} already exists",
            candidate.code
        )));
    }
    Ok(())
}

fn normalize(request: &CupsRequest) -> PlatformResult<String> {
    let code = request.code.trim().to_uppercase();
    require_match("code", &code, &CUPS_CODE)?;
    require_text("description", &request.description)?;
    require_positive("tariff", request.tariff)?;
    Ok(code)
}

pub struct CupsService {
    codes: Arc<Table<CupsCode>>,
}

impl CupsService {
    pub fn new(codes: Arc<Table<CupsCode>>) -> Self {
        Self { codes }
    }

    pub async fn create(&self, request: CupsRequest) -> PlatformResult<CupsCode> {
        let code = normalize(&request)?;
        let now = Utc::now();
        let cups = self
            .codes
            .insert(
                |id| CupsCode {
                    id,
                    code,
                    description: request.description,
                    category: request.category,
                    tariff: request.tariff,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                unique_code,
            )
            .await?;
        info!("Registered CUPS {} at {} COP", cups.code, cups.tariff);
        Ok(cups)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<CupsCode> {
        self.codes.get(id).await
    }

    pub async fn get_by_code(&self, code: &str) -> PlatformResult<CupsCode> {
        let wanted = code.trim().to_uppercase();
        self.codes
            .find(|c| c.code == wanted)
            .await
            .ok_or_else(|| PlatformError::NotFound(format!("CUPS code {wanted} not found")))
    }

    /// The code, provided it exists and is billable.
    pub async fn require_active_code(&self, code: &str) -> PlatformResult<CupsCode> {
        let cups = self.get_by_code(code).await?;
        if !cups.active {
            return Err(PlatformError::Validation(format!(
                "CUPS code {} is inactive",
                cups.code
            )));
        }
        Ok(cups)
    }

    pub async fn list_active(&self, query: PageQuery) -> PlatformResult<Page<CupsCode>> {
        let codes = self.codes.select(|c| c.active).await;
        Page::from_items(codes, query)
    }

    /// Case-insensitive match on code or description.
    pub async fn search(&self, text: &str, query: PageQuery) -> PlatformResult<Page<CupsCode>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(PlatformError::Validation("q is required".to_string()));
        }
        let codes = self
            .codes
            .select(|c| {
                c.active
                    && (c.code.to_lowercase().contains(&needle)
                        || c.description.to_lowercase().contains(&needle))
            })
            .await;
        Page::from_items(codes, query)
    }

    pub async fn update(&self, id: u64, request: CupsRequest) -> PlatformResult<CupsCode> {
        let code = normalize(&request)?;
        self.codes
            .update(
                id,
                |cups| {
                    cups.code = code;
                    cups.description = request.description;
                    cups.category = request.category;
                    cups.tariff = request.tariff;
                    cups.updated_at = Utc::now();
                    Ok(())
                },
                unique_code,
            )
            .await
    }

    pub async fn deactivate(&self, id: u64) -> PlatformResult<CupsCode> {
        self.codes
            .modify(id, |cups| {
                cups.active = false;
                cups.updated_at = Utc::now();
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn cups_request(code: &str, tariff: i64) -> CupsRequest {
        CupsRequest {
            code: code.to_string(),
            description: "Consulta de primera vez por medicina general".to_string(),
            category: Some("Consultas".to_string()),
            tariff,
        }
    }

    fn service() -> CupsService {
        CupsService::new(Arc::new(Table::new("CupsCode")))
    }

    #[tokio::test]
    async fn test_codes_are_normalized_and_unique() {
        let service = service();
        let cups = service.create(cups_request("89020a", 45000)).await.expect("create");
        assert_eq!(cups.code, "89020A");

        let err = service.create(cups_request("89020A", 1)).await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict(_)));
        assert_eq!(service.get_by_code("89020a").await.expect("get").tariff, 45000);
    }

    #[tokio::test]
    async fn test_invalid_codes_rejected() {
        let service = service();
        assert!(service.create(cups_request("8902", 100)).await.is_err());
        assert!(service.create(cups_request("890201", 0)).await.is_err());
    }

    #[tokio::test]
    async fn test_inactive_code_is_not_billable() {
        let service = service();
        let cups = service.create(cups_request("890201", 45000)).await.expect("create");
        assert!(service.require_active_code("890201").await.is_ok());

        service.deactivate(cups.id).await.expect("deactivate");
        assert!(matches!(
            service.require_active_code("890201").await,
            Err(PlatformError::Validation(_))
        ));
        let page = service.search("general", PageQuery::default()).await.expect("search");
        assert!(page.content.is_empty());
    }
}
