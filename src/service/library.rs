//! Logo library: create/list/delete, the append-only version trail, and
//! template publish/instantiate.

use chrono::Utc;

use crate::foundation::{
    core::{CategoryId, LogoId, Page, PageRequest, TemplateId, UserId, VersionId},
    error::{EmblemError, EmblemResult},
};
use crate::model::asset::{LogoVersion, Template};
use crate::model::dsl::LogoBuilder;
use crate::model::logo::{Layer, Logo};
use crate::model::patch::LogoPatch;
use crate::snapshot::codec::Snapshot;
use crate::store::logo::LogoStore;

/// Lifecycle surface for whole logos: ownership listings, version history,
/// and the template catalog.
pub struct LibraryService<'a, S> {
    store: &'a S,
}

impl<'a, S: LogoStore> LibraryService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and persist a new logo with its initial stack in one
    /// all-or-nothing write.
    #[tracing::instrument(skip_all)]
    pub fn create_logo(&self, builder: LogoBuilder) -> EmblemResult<(Logo, Vec<Layer>)> {
        let (logo, layers) = builder.build()?;
        self.store.insert_logo_with_layers(&logo, &layers)?;
        Ok((logo, layers))
    }

    pub fn list_logos(&self, owner_id: UserId, page: PageRequest) -> EmblemResult<Page<Logo>> {
        self.store.list_logos(owner_id, page)
    }

    pub fn update_logo(&self, id: LogoId, patch: &LogoPatch) -> EmblemResult<Logo> {
        self.store.update_logo(id, patch)
    }

    /// Delete a logo; its layers and version trail go with it.
    #[tracing::instrument(skip_all, fields(logo = %id))]
    pub fn delete_logo(&self, id: LogoId) -> EmblemResult<()> {
        self.store.delete_logo(id)
    }

    /// Append the logo's current state to its version trail.
    #[tracing::instrument(skip_all, fields(logo = %logo_id))]
    pub fn save_version(
        &self,
        logo_id: LogoId,
        note: Option<String>,
    ) -> EmblemResult<LogoVersion> {
        let logo = self.store.fetch_logo(logo_id)?;
        let layers = self.store.fetch_layers(logo_id)?;
        let snapshot = Snapshot::capture(&logo, &layers)?;
        let version = LogoVersion {
            id: VersionId::new(),
            logo_id,
            snapshot: snapshot.to_json()?,
            note,
            created_at: Utc::now(),
        };
        self.store.insert_version(&version)?;
        Ok(version)
    }

    pub fn list_versions(
        &self,
        logo_id: LogoId,
        page: PageRequest,
    ) -> EmblemResult<Page<LogoVersion>> {
        self.store.list_versions(logo_id, page)
    }

    /// Register a logo as a reusable template.
    #[tracing::instrument(skip_all, fields(logo = %base_logo_id))]
    pub fn publish_template(
        &self,
        base_logo_id: LogoId,
        title: impl Into<String>,
        description: Option<String>,
        category_id: Option<CategoryId>,
        preview_url: Option<String>,
    ) -> EmblemResult<Template> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(EmblemError::validation(
                "template.title",
                "title must not be empty",
            ));
        }
        let now = Utc::now();
        let template = Template {
            id: TemplateId::new(),
            title,
            description,
            category_id,
            preview_url,
            base_logo_id,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_template(&template)?;
        Ok(template)
    }

    /// Deep-copy a template's base logo for `owner_id`.
    ///
    /// Layers are copied with fresh identities; asset and font references
    /// stay shared with the source. The copy is a plain logo: not flagged
    /// as a template, no category, no thumbnail.
    #[tracing::instrument(skip_all, fields(template = %template_id, owner = %owner_id))]
    pub fn instantiate_template(
        &self,
        template_id: TemplateId,
        owner_id: UserId,
        title: impl Into<String>,
    ) -> EmblemResult<(Logo, Vec<Layer>)> {
        let template = self.store.fetch_template(template_id)?;
        let base = self.store.fetch_logo(template.base_logo_id)?;
        let base_layers = self.store.fetch_layers(template.base_logo_id)?;
        let snapshot = Snapshot::capture(&base, &base_layers)?;
        let (logo, layers) = snapshot.instantiate(owner_id, title)?;
        self.store.insert_logo_with_layers(&logo, &layers)?;
        Ok((logo, layers))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/library.rs"]
mod tests;
