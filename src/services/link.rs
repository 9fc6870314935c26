// src/services/link.rs - Lookup, update, redirect and admin operations
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use validator::Validate;

use crate::errors::AppError;
use crate::models::{Link, LinkPage, PaginationParams, UpdateLinkDto, UpdateOutcome};
use crate::repositories::LinkRepositoryTrait;
use crate::validations::validate_url;

type Result<T> = std::result::Result<T, AppError>;

#[async_trait]
pub trait LinkServiceTrait {
    async fn get(&self, key: &str) -> Result<Link>;
    async fn update(&self, dto: UpdateLinkDto) -> Result<UpdateOutcome>;
    async fn record_click(&self, key: &str) -> Result<Link>;
    async fn list(&self, params: &PaginationParams) -> Result<LinkPage>;
    async fn delete(&self, key: &str) -> Result<()>;
}

pub struct LinkService<T: LinkRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: LinkRepositoryTrait> LinkService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

fn required_key(key: &str) -> Result<&str> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::Validation("Missing link key".to_string()));
    }
    Ok(key)
}

fn not_found(key: &str) -> AppError {
    AppError::NotFound(format!("Link '{}' does not exist", key))
}

#[async_trait]
impl<T: LinkRepositoryTrait> LinkServiceTrait for LinkService<T> {
    async fn get(&self, key: &str) -> Result<Link> {
        let key = required_key(key)?;
        self.repository
            .find_by_key(key)
            .await?
            .ok_or_else(|| not_found(key))
    }

    async fn update(&self, dto: UpdateLinkDto) -> Result<UpdateOutcome> {
        let dto = dto.trimmed();
        dto.validate()?;
        validate_url(&dto.new_url).map_err(|e| {
            AppError::Validation(
                e.message
                    .map(|m| m.into_owned())
                    .unwrap_or_else(|| "Invalid URL".to_string()),
            )
        })?;

        let current = self
            .repository
            .find_by_key(&dto.key)
            .await?
            .ok_or_else(|| not_found(&dto.key))?;

        if let Some(owner) = self
            .repository
            .find_by_url_excluding(&dto.new_url, &dto.key)
            .await?
        {
            return Err(AppError::UrlTaken {
                existing_key: owner.key,
            });
        }

        if current.url == dto.new_url {
            debug!("Link '{}' already points at {}", dto.key, dto.new_url);
            return Ok(UpdateOutcome {
                key: dto.key,
                url: dto.new_url,
                changed: false,
            });
        }

        if self.repository.update_url(&dto.key, &dto.new_url).await? == 0 {
            // deleted between the lookup and the update
            return Err(not_found(&dto.key));
        }
        info!("Link '{}' now points at {}", dto.key, dto.new_url);

        Ok(UpdateOutcome {
            key: dto.key,
            url: dto.new_url,
            changed: true,
        })
    }

    async fn record_click(&self, key: &str) -> Result<Link> {
        let key = required_key(key)?;
        self.repository
            .increment_clicks(key)
            .await?
            .ok_or_else(|| not_found(key))
    }

    async fn list(&self, params: &PaginationParams) -> Result<LinkPage> {
        let (limit, offset) = (params.limit(), params.offset());
        let shortlinks = self.repository.find_all(limit, offset).await?;
        let total = self.repository.count().await?;

        Ok(LinkPage {
            shortlinks,
            total,
            page: params.page(),
            limit,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = required_key(key)?;
        if !self.repository.delete(key).await? {
            return Err(not_found(key));
        }
        info!("Deleted link '{}'", key);
        Ok(())
    }
}
