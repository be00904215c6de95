// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The lookup path for one editor session: cache in front of a source, then
//! the presenter.

use std::sync::Arc;

use tracing::instrument;

use crate::cache::{CacheStats, UsageLookupCache};
use crate::config::ResolvedConfig;
use crate::error::ConfigError;
use crate::presenter::{LensDescriptor, SummaryPresenter};
use crate::source::{create_source, UsageSource};
use crate::types::MetricsRecord;

/// Owns the cache (and through it the source and its HTTP client).
#[derive(Debug)]
pub struct UsageLens {
    cache: UsageLookupCache,
    presenter: SummaryPresenter,
}

impl UsageLens {
    pub fn new(cache: UsageLookupCache) -> Self {
        Self {
            cache,
            presenter: SummaryPresenter::new(),
        }
    }

    /// Wrap a source in a cache with the given TTL.
    pub fn with_source(source: Arc<dyn UsageSource>, ttl: std::time::Duration) -> Self {
        Self::new(UsageLookupCache::with_ttl(source, ttl))
    }

    /// Build the source a configuration selects.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = create_source(config)?;
        Ok(Self::with_source(source, config.cache_ttl))
    }

    /// Cached record for a signature.
    pub async fn lookup(&self, signature: &str) -> MetricsRecord {
        self.cache.get(signature).await
    }

    /// Cached record rendered as a lens.
    #[instrument(skip(self))]
    pub async fn describe(&self, signature: &str) -> LensDescriptor {
        let record = self.lookup(signature).await;
        self.presenter.describe(signature, &record)
    }

    pub fn presenter(&self) -> &SummaryPresenter {
        &self.presenter
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
