// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::password::{self as hashing, MIN_PASSWORD_LEN};
use super::types::{RegisterRequest, Role, User, UserUpdate};
use crate::common::config::BootstrapAdmin;
use crate::common::store::Table;
use crate::common::validate::{require_match, require_text, EMAIL, USERNAME};
use crate::common::{Page, PageQuery};
use crate::{PlatformError, PlatformResult};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

fn unique_identity(candidate: &User, existing: &User) -> PlatformResult<()> {
    if candidate.username == existing.username {
        return Err(PlatformError::Conflict(format!(
            "username {} is taken",
            candidate.username
        )));
    }
    if candidate.email == existing.email {
        return Err(PlatformError::Conflict(format!(
            "email {} is already registered",
            candidate.email
        )));
    }
    Ok(())
}

fn check_password(password: &str) -> PlatformResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PlatformError::Validation(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn normalize_email(email: &str) -> PlatformResult<String> {
    let email = email.trim().to_lowercase();
    require_match("email", &email, &EMAIL)?;
    Ok(email)
}

pub struct UserService {
    users: Arc<Table<User>>,
}

impl UserService {
    pub fn new(users: Arc<Table<User>>) -> Self {
        Self { users }
    }

    /// Self-service registration. New accounts only get `USUARIO`.
    pub async fn register(&self, request: RegisterRequest) -> PlatformResult<User> {
        self.create(request, BTreeSet::from([Role::Usuario])).await
    }

    pub async fn create(
        &self,
        request: RegisterRequest,
        roles: BTreeSet<Role>,
    ) -> PlatformResult<User> {
        let username = request.username.trim().to_lowercase();
        require_match("username", &username, &USERNAME)?;
        let email = normalize_email(&request.email)?;
        require_text("fullName", &request.full_name)?;
        check_password(&request.password)?;

        let password_hash = hashing::hash(request.password).await?;
        let now = Utc::now();
        let user = self
            .users
            .insert(
                |id| User {
                    id,
                    username,
                    email,
                    full_name: request.full_name.trim().to_string(),
                    password_hash,
                    roles,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                unique_identity,
            )
            .await?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// The user behind `username`/`password`. Unknown users, wrong passwords
    /// and inactive accounts all fail as unauthorized.
    pub async fn authenticate(&self, username: &str, password: &str) -> PlatformResult<User> {
        let wanted = username.trim().to_lowercase();
        let invalid = || PlatformError::Unauthorized("Invalid username or password".to_string());

        let user = self
            .users
            .find(|u| u.username == wanted)
            .await
            .ok_or_else(invalid)?;
        let matches = hashing::verify(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            warn!("Failed login for {}", wanted);
            return Err(invalid());
        }
        if !user.active {
            return Err(PlatformError::Unauthorized("User is inactive".to_string()));
        }
        Ok(user)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<User> {
        self.users.get(id).await
    }

    pub async fn list(&self, query: PageQuery) -> PlatformResult<Page<User>> {
        Page::from_items(self.users.select(|_| true).await, query)
    }

    /// Apply `update`. Only an admin may touch roles or the active flag.
    pub async fn update(
        &self,
        id: u64,
        update: UserUpdate,
        by_admin: bool,
    ) -> PlatformResult<User> {
        if !by_admin && (update.roles.is_some() || update.active.is_some()) {
            return Err(PlatformError::Forbidden(
                "only an administrator can change roles or active".to_string(),
            ));
        }
        let email = update.email.as_deref().map(normalize_email).transpose()?;
        if let Some(full_name) = &update.full_name {
            require_text("fullName", full_name)?;
        }
        if let Some(roles) = &update.roles {
            if roles.is_empty() {
                return Err(PlatformError::Validation(
                    "a user needs at least one role".to_string(),
                ));
            }
        }
        let password_hash = match &update.password {
            Some(password) => {
                check_password(password)?;
                Some(hashing::hash(password.clone()).await?)
            }
            None => None,
        };

        self.users
            .update(
                id,
                |user| {
                    if let Some(email) = email {
                        user.email = email;
                    }
                    if let Some(full_name) = update.full_name {
                        user.full_name = full_name.trim().to_string();
                    }
                    if let Some(password_hash) = password_hash {
                        user.password_hash = password_hash;
                    }
                    if let Some(roles) = update.roles {
                        user.roles = roles;
                    }
                    if let Some(active) = update.active {
                        user.active = active;
                    }
                    user.updated_at = Utc::now();
                    Ok(())
                },
                unique_identity,
            )
            .await
    }

    pub async fn deactivate(&self, id: u64) -> PlatformResult<User> {
        let user = self
            .users
            .modify(id, |user| {
                user.active = false;
                user.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        info!("Deactivated user {}", user.username);
        Ok(user)
    }

    /// Create the configured administrator unless the username exists.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> PlatformResult<()> {
        let username = admin.username.trim().to_lowercase();
        if self.users.find(|u| u.username == username).await.is_some() {
            return Ok(());
        }
        let request = RegisterRequest {
            username: admin.username.clone(),
            email: admin.email.clone(),
            full_name: "Administrator".to_string(),
            password: admin.password.clone(),
        };
        self.create(request, BTreeSet::from([Role::Admin])).await?;
        info!("Bootstrapped administrator {}", username);
        Ok(())
    }
}
