//! Compilation service implementation

use std::collections::HashMap;
use crate::database::DatabaseService;
use crate::models::compilation::{Compilation, CompilationDto, NewCompilationRequest, UpdateCompilationRequest};
use crate::models::event::EventShortDto;
use crate::services::event::EventService;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::PageRequest;
use crate::utils::logging::log_admin_action;

#[derive(Clone, Debug)]
pub struct CompilationService {
    db: DatabaseService,
    events: EventService,
}

impl CompilationService {
    pub fn new(db: DatabaseService, events: EventService) -> Self {
        Self { db, events }
    }

    pub async fn create(&self, request: NewCompilationRequest) -> Result<CompilationDto> {
        let compilation = self.db.compilations.create(request).await?;
        log_admin_action("create_compilation", Some(&compilation.id.to_string()), Some(&compilation.title));

        self.single(compilation).await
    }

    pub async fn update(&self, compilation_id: i64, request: UpdateCompilationRequest) -> Result<CompilationDto> {
        let compilation = self
            .db
            .compilations
            .update(compilation_id, request)
            .await?
            .ok_or_else(|| EventHubError::not_found("Compilation", compilation_id))?;
        log_admin_action("update_compilation", Some(&compilation_id.to_string()), None);

        self.single(compilation).await
    }

    pub async fn delete(&self, compilation_id: i64) -> Result<()> {
        if !self.db.compilations.delete(compilation_id).await? {
            return Err(EventHubError::not_found("Compilation", compilation_id));
        }

        log_admin_action("delete_compilation", Some(&compilation_id.to_string()), None);
        Ok(())
    }

    pub async fn list(&self, pinned: Option<bool>, page: PageRequest) -> Result<Vec<CompilationDto>> {
        let compilations = self.db.compilations.list(pinned, page).await?.into_items();
        self.with_events(compilations).await
    }

    pub async fn get(&self, compilation_id: i64) -> Result<CompilationDto> {
        let compilation = self
            .db
            .compilations
            .find_by_id(compilation_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Compilation", compilation_id))?;

        self.single(compilation).await
    }

    async fn single(&self, compilation: Compilation) -> Result<CompilationDto> {
        let id = compilation.id;
        self.with_events(vec![compilation])
            .await?
            .pop()
            .ok_or_else(|| EventHubError::not_found("Compilation", id))
    }

    /// Embed short event views, loading every referenced event once
    async fn with_events(&self, compilations: Vec<Compilation>) -> Result<Vec<CompilationDto>> {
        let ids: Vec<i64> = compilations.iter().map(|c| c.id).collect();
        let mut links = self.db.compilations.event_ids(&ids).await?;

        let mut event_ids: Vec<i64> = links.values().flatten().copied().collect();
        event_ids.sort_unstable();
        event_ids.dedup();

        let events = self.db.events.find_by_ids(&event_ids).await?;
        let by_id: HashMap<i64, EventShortDto> = self
            .events
            .short_views(events)
            .await
            .into_iter()
            .map(|dto| (dto.id, dto))
            .collect();

        Ok(compilations
            .into_iter()
            .map(|compilation| {
                let events = links
                    .remove(&compilation.id)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|id| by_id.get(&id).cloned())
                    .collect();
                CompilationDto::from_compilation(compilation, events)
            })
            .collect())
    }
}
