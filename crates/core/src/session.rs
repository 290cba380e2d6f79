use tracing::info;

use crate::audit::{AuditSink, NoopAuditSink};
use crate::config::AppConfig;
use crate::domain::material::MaterialId;
use crate::domain::request::{RequestId, RequestItem, RequestPatch};
use crate::errors::DomainError;
use crate::store::catalog::CatalogStore;
use crate::store::requests::RequestStore;

/// Everything one UI session works against, built once at startup.
pub struct Session<S = NoopAuditSink> {
    pub config: AppConfig,
    pub requests: RequestStore<S>,
    pub catalog: CatalogStore,
}

impl Session<NoopAuditSink> {
    pub fn from_config(config: AppConfig) -> Self {
        Self::start(config, NoopAuditSink)
    }
}

impl<S> Session<S>
where
    S: AuditSink,
{
    pub fn start(config: AppConfig, sink: S) -> Self {
        let requests = RequestStore::with_sink(config.store_policy(), sink);
        let requests = if config.seed.enabled { requests.seeded() } else { requests };
        let catalog = CatalogStore::generate(
            config.catalog.items_per_subcategory,
            config.catalog.quick_search_limit,
        );

        info!(
            event_name = "system.session.started",
            correlation_id = %requests.session_id(),
            requests = requests.len(),
            materials = catalog.len(),
            draft_only_edits = config.workflow.draft_only_edits,
            "request session started"
        );

        Self { config, requests, catalog }
    }

    pub fn default_actor(&self) -> &str {
        &self.config.workflow.default_actor
    }

    /// Appends a catalog material as a new line item on the request.
    ///
    /// The material fields are copied; later catalog changes never reach the item.
    pub fn add_material(
        &mut self,
        request_id: &RequestId,
        material_id: &MaterialId,
        quantity: u32,
        actor: &str,
    ) -> Result<RequestItem, DomainError> {
        let checked = self
            .catalog
            .find(material_id)
            .ok_or_else(|| DomainError::MaterialNotFound { id: material_id.clone() })
            .and_then(|material| {
                self.requests
                    .get(request_id)
                    .map(|current| (material, current))
                    .ok_or_else(|| DomainError::NotFound { id: request_id.clone() })
            });
        let (material, current) = self.requests.audit_update(request_id, actor, checked)?;

        let item = RequestItem::from_material(material, quantity);
        let mut items = current.items.clone();
        items.push(item.clone());

        self.requests.update(
            request_id,
            RequestPatch { items: Some(items), ..RequestPatch::default() },
            actor,
        )?;
        Ok(item)
    }
}
