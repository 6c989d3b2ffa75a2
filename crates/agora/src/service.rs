//! The post service: read-side operations over the sorted collection store.
//!
//! The operations themselves live in sibling modules as further `impl`
//! blocks on [`PostService`]:
//!
//! - [`rank`](crate::rank) - single and batched position resolution
//! - [`materialize`](crate::materialize) - rendered post loading
//! - [`paginate`](crate::paginate) - privilege-gated listing pages
//! - [`redact`](crate::redact) - deleted-post masking

use std::sync::Arc;

use agora_core::{Direction, PostId, SetKey};
use agora_perms::PrivilegeService;
use agora_store::SortedStore;

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::hooks::{NoopFilter, PostsFilter};
use crate::parse::{ContentParser, PassthroughParser};
use crate::settings::{SettingsProvider, StaticSettings};
use crate::summary::{StoreSummarizer, Summarizer};

/// Read-side post operations.
///
/// Holds no per-request state; one instance serves concurrent callers.
pub struct PostService<S: SortedStore + 'static> {
    pub(crate) store: Arc<S>,
    pub(crate) settings: Arc<dyn SettingsProvider>,
    pub(crate) privileges: Arc<dyn PrivilegeService>,
    pub(crate) parser: Arc<dyn ContentParser>,
    pub(crate) filter: Arc<dyn PostsFilter>,
    pub(crate) summarizer: Arc<dyn Summarizer>,
    pub(crate) config: ServiceConfig,
}

impl<S: SortedStore + 'static> PostService<S> {
    /// Create a service over `store`.
    ///
    /// Remaining collaborators start at their defaults: oldest-first settings
    /// for everybody, passthrough parsing, a no-op filter hook and a
    /// summarizer reading from the same store.
    pub fn new(store: S, privileges: Arc<dyn PrivilegeService>, config: ServiceConfig) -> Self {
        Self::from_arc(Arc::new(store), privileges, config)
    }

    /// Create a service over a shared store.
    pub fn from_arc(
        store: Arc<S>,
        privileges: Arc<dyn PrivilegeService>,
        config: ServiceConfig,
    ) -> Self {
        let summarizer = Arc::new(StoreSummarizer::new(Arc::clone(&store)));
        Self {
            store,
            settings: Arc::new(StaticSettings::default()),
            privileges,
            parser: Arc::new(PassthroughParser),
            filter: Arc::new(NoopFilter),
            summarizer,
            config,
        }
    }

    pub fn with_settings(mut self, settings: Arc<dyn SettingsProvider>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ContentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn PostsFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Existence and Range Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a record exists for each post, positionally.
    pub async fn exists(&self, pids: &[PostId]) -> Result<Vec<bool>> {
        if pids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<SetKey> = pids.iter().map(|&pid| SetKey::post_object(pid)).collect();
        Ok(self.store.exists(&keys).await?)
    }

    /// Post ids at indices `start..=stop` of an ordering set.
    ///
    /// No privilege filtering is applied.
    pub async fn pids_from_set(
        &self,
        key: &SetKey,
        start: i64,
        stop: i64,
        direction: Direction,
    ) -> Result<Vec<PostId>> {
        Ok(self.store.range(key, start, stop, direction).await?)
    }

    /// Like [`pids_from_set`](Self::pids_from_set) with unparsed bounds.
    ///
    /// Bounds that are not integers yield an empty result without touching
    /// the store.
    pub async fn pids_from_set_raw(
        &self,
        key: &SetKey,
        start: &str,
        stop: &str,
        direction: Direction,
    ) -> Result<Vec<PostId>> {
        let (Ok(start), Ok(stop)) = (start.trim().parse::<i64>(), stop.trim().parse::<i64>())
        else {
            tracing::debug!(%key, start, stop, "ignoring range with invalid bounds");
            return Ok(Vec::new());
        };
        self.pids_from_set(key, start, stop, direction).await
    }
}
