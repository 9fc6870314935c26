// src/services/link_allocator.rs - URL to key allocation
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::AllocatorConfig;
use crate::errors::AllocationError;
use crate::models::{Allocation, BatchItemResult, CreateLinkDto, NewLink};
use crate::repositories::LinkRepositoryTrait;
use crate::utils::id_generator::{KeyGenerator, RandomKeyGenerator};
use crate::validations::{is_reserved_key, validate_custom_key, validate_url, KEY_TOO_LONG};

type Result<T> = std::result::Result<T, AllocationError>;

/// Maps URLs to unique short keys.
///
/// Repeated requests for a URL already on file return its existing key.
/// Generated keys are reserved by inserting them and letting the store's
/// uniqueness constraint reject collisions, which are retried with a fresh
/// candidate up to `max_retries` times. No lock is held between the URL
/// lookup and the insert, so two first-time requests for the same URL that
/// race can both insert.
pub struct LinkAllocator<R, G = RandomKeyGenerator> {
    repository: Arc<R>,
    generator: G,
    config: AllocatorConfig,
}

impl<R, G> LinkAllocator<R, G>
where
    R: LinkRepositoryTrait,
    G: KeyGenerator,
{
    pub fn new(repository: Arc<R>, generator: G, config: AllocatorConfig) -> Self {
        Self {
            repository,
            generator,
            config,
        }
    }

    /// Allocates a key for `url`, using `custom_key` when one is given.
    ///
    /// A custom key that is blank after trimming counts as absent.
    pub async fn allocate(&self, url: &str, custom_key: Option<&str>) -> Result<Allocation> {
        let url = url.trim();
        let custom_key = custom_key.map(str::trim).filter(|k| !k.is_empty());

        self.validate(url, custom_key)?;

        if let Some(existing) = self.repository.find_by_url(url).await? {
            debug!("URL {} already mapped to '{}'", url, existing.key);
            return Ok(Allocation {
                key: existing.key,
                url: url.to_string(),
                existing: true,
            });
        }

        match custom_key {
            Some(key) => self.reserve_custom(url, key).await,
            None => self.reserve_generated(url).await,
        }
    }

    /// Runs every item through [`allocate`](Self::allocate) independently,
    /// keeping input order. Oversized batches are refused before any item is
    /// looked at.
    pub async fn allocate_batch(&self, items: Vec<CreateLinkDto>) -> Result<Vec<BatchItemResult>> {
        if items.len() > self.config.max_batch_size {
            return Err(AllocationError::BatchTooLarge {
                size: items.len(),
                max: self.config.max_batch_size,
            });
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let outcome = self.allocate(&item.url, item.key.as_deref()).await;
            results.push(match outcome {
                Ok(allocation) => BatchItemResult::Success(allocation),
                Err(err) => {
                    debug!("Batch item {:?} failed: {}", item.url, err);
                    BatchItemResult::Error {
                        error: err.tag(),
                        message: err.to_string(),
                        input: item,
                    }
                }
            });
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(
            "Batch allocation finished: {} of {} items succeeded",
            succeeded,
            results.len()
        );

        Ok(results)
    }

    fn validate(&self, url: &str, custom_key: Option<&str>) -> Result<()> {
        validate_url(url).map_err(|e| {
            AllocationError::InvalidUrl(
                e.message
                    .map(|m| m.into_owned())
                    .unwrap_or_else(|| url.to_string()),
            )
        })?;

        if let Some(key) = custom_key {
            let max = self.config.max_custom_key_length();
            validate_custom_key(key, max).map_err(|e| {
                if e.code == KEY_TOO_LONG {
                    AllocationError::KeyTooLong {
                        key: key.to_string(),
                        max,
                    }
                } else {
                    AllocationError::InvalidKeyFormat(key.to_string())
                }
            })?;
        }

        Ok(())
    }

    async fn reserve_custom(&self, url: &str, key: &str) -> Result<Allocation> {
        if is_reserved_key(key) || self.repository.find_by_key(key).await?.is_some() {
            return Err(AllocationError::KeyConflict(key.to_string()));
        }

        // Another request may claim the key between the lookup and the insert
        match self.repository.insert(&NewLink::new(key, url)).await {
            Ok(link) => {
                info!("Allocated custom key '{}' for {}", link.key, link.url);
                Ok(Allocation {
                    key: link.key,
                    url: link.url,
                    existing: false,
                })
            }
            Err(e) if e.is_unique_violation() => Err(AllocationError::KeyConflict(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn reserve_generated(&self, url: &str) -> Result<Allocation> {
        let attempts = self.config.max_retries;

        for attempt in 1..=attempts {
            let candidate = self.generator.generate();
            if is_reserved_key(&candidate) {
                warn!(
                    "Generated key '{}' names a route (attempt {}/{})",
                    candidate, attempt, attempts
                );
                continue;
            }

            match self.repository.insert(&NewLink::new(candidate.as_str(), url)).await {
                Ok(link) => {
                    info!(
                        "Allocated key '{}' for {} (attempt {})",
                        link.key, link.url, attempt
                    );
                    return Ok(Allocation {
                        key: link.key,
                        url: link.url,
                        existing: false,
                    });
                }
                Err(e) if e.is_unique_violation() => {
                    warn!(
                        "Generated key '{}' collided (attempt {}/{})",
                        candidate, attempt, attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AllocationError::KeyAllocationExhausted { attempts })
    }
}
