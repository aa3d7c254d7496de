//! Link registry: creation, resolution and deactivation of short links.
//!
//! Uniqueness is checked before insert, but the storage unique constraint is
//! authoritative: two concurrent creations can both pass the pre-check, and
//! the loser sees `StorageError::Conflict` from the insert.

use std::sync::Arc;
use tracing::{debug, error, info};

use super::generator::{is_valid_custom_code, CodeGenerator};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{NewShortLink, ShortLink};
use crate::storage::{Storage, StorageError};

/// Upper bound on generated candidates tried for one creation
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

pub struct LinkRegistry {
    storage: Arc<dyn Storage>,
    generator: CodeGenerator,
}

impl LinkRegistry {
    pub fn new(storage: Arc<dyn Storage>, generator: CodeGenerator) -> Self {
        Self { storage, generator }
    }

    /// Create a short link for `original_url`, using `custom_code` when given.
    pub async fn create_short_link(
        &self,
        original_url: &str,
        custom_code: Option<&str>,
    ) -> ServiceResult<ShortLink> {
        match custom_code {
            Some(code) => self.create_custom(original_url, code).await,
            None => self.create_generated(original_url).await,
        }
    }

    async fn create_custom(&self, original_url: &str, code: &str) -> ServiceResult<ShortLink> {
        if !is_valid_custom_code(code) {
            return Err(ServiceError::Validation(
                "Custom code must be 3-20 characters and contain only letters, numbers, hyphens, and underscores"
                    .to_string(),
            ));
        }

        if self.exists(code).await? {
            return Err(ServiceError::Conflict(code.to_string()));
        }

        let link = NewShortLink {
            short_code: code.to_string(),
            original_url: original_url.to_string(),
            is_custom: true,
        };

        match self.storage.insert_link(&link).await {
            Ok(created) => {
                info!(short_code = %created.short_code, "created custom short link");
                Ok(created)
            }
            Err(StorageError::Conflict) => Err(ServiceError::Conflict(code.to_string())),
            Err(StorageError::Other(e)) => Err(ServiceError::storage("insert_link", e)),
        }
    }

    async fn create_generated(&self, original_url: &str) -> ServiceResult<ShortLink> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = self.generator.generate(original_url);

            if self.exists(&candidate).await? {
                debug!(attempt, candidate = %candidate, "generated code already taken");
                continue;
            }

            let link = NewShortLink {
                short_code: candidate,
                original_url: original_url.to_string(),
                is_custom: false,
            };

            match self.storage.insert_link(&link).await {
                Ok(created) => {
                    info!(short_code = %created.short_code, attempt, "created short link");
                    return Ok(created);
                }
                // Lost an insert race; counts as a used attempt
                Err(StorageError::Conflict) => {
                    debug!(attempt, candidate = %link.short_code, "generated code taken concurrently");
                }
                Err(StorageError::Other(e)) => return Err(ServiceError::storage("insert_link", e)),
            }
        }

        error!(
            attempts = MAX_GENERATION_ATTEMPTS,
            code_length = self.generator.length(),
            "every generated short code collided; check storage health or code space usage"
        );
        Err(ServiceError::Exhausted(MAX_GENERATION_ATTEMPTS))
    }

    async fn exists(&self, code: &str) -> ServiceResult<bool> {
        self.storage
            .find_by_code(code)
            .await
            .map(|row| row.is_some())
            .map_err(|e| ServiceError::storage("find_by_code", e))
    }

    /// Resolve an active code to its original URL.
    ///
    /// Inactive and missing codes both report `NotFound`, so a deactivated
    /// link never reveals its target.
    pub async fn resolve(&self, short_code: &str) -> ServiceResult<String> {
        let link = self
            .storage
            .find_by_code(short_code)
            .await
            .map_err(|e| ServiceError::storage("find_by_code", e))?;

        match link {
            Some(link) if link.is_active => Ok(link.original_url),
            _ => Err(ServiceError::NotFound),
        }
    }

    /// Look up the stored record whether or not it is active.
    pub async fn get(&self, short_code: &str) -> ServiceResult<ShortLink> {
        self.storage
            .find_by_code(short_code)
            .await
            .map_err(|e| ServiceError::storage("find_by_code", e))?
            .ok_or(ServiceError::NotFound)
    }

    /// Mark a code inactive. Returns `false` only when no row exists;
    /// deactivating an already inactive link still returns `true`.
    pub async fn deactivate(&self, short_code: &str) -> ServiceResult<bool> {
        let matched = self
            .storage
            .set_active(short_code, false)
            .await
            .map_err(|e| ServiceError::storage("set_active", e))?;

        if matched > 0 {
            info!(short_code = %short_code, "deactivated short link");
        }
        Ok(matched > 0)
    }
}
