//! Persistence seam for logos, layers, versions, and the shared catalogs,
//! plus the in-memory reference implementation used by tests and the CLI.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::foundation::{
    core::{
        AssetId, CategoryId, FontId, LayerId, LogoId, Page, PageRequest, TemplateId, UserId,
        VersionId,
    },
    error::{EmblemError, EmblemResult},
};
use crate::model::asset::{Asset, Category, Font, LogoVersion, Template};
use crate::model::logo::{Layer, Logo};
use crate::model::patch::{LayerPatch, LogoPatch};

/// Storage contract for everything a logo owns plus the shared catalogs.
///
/// `with_layer_stack` is the only way to change a stack's membership or
/// ordering: `op` gets exclusive access to a consistent copy of the logo's
/// layer list, and the copy commits only when `op` returns `Ok`. Mutations
/// of the same logo serialize behind the scope; different logos proceed
/// independently. The generic scope method keeps the trait `Sized`-bound,
/// so callers take `S: LogoStore` rather than `dyn LogoStore`.
pub trait LogoStore: Send + Sync {
    /// Insert a new logo with an empty layer stack.
    fn insert_logo(&self, logo: &Logo) -> EmblemResult<()>;

    /// Insert a logo together with its full stack in one all-or-nothing
    /// write; on any error nothing is stored.
    fn insert_logo_with_layers(&self, logo: &Logo, layers: &[Layer]) -> EmblemResult<()>;

    fn fetch_logo(&self, id: LogoId) -> EmblemResult<Logo>;

    /// Logos owned by `owner_id`, newest first.
    fn list_logos(&self, owner_id: UserId, page: PageRequest) -> EmblemResult<Page<Logo>>;

    /// Apply `patch` to the stored logo and return the updated record.
    fn update_logo(&self, id: LogoId, patch: &LogoPatch) -> EmblemResult<Logo>;

    /// Delete a logo together with its layers and version trail.
    fn delete_logo(&self, id: LogoId) -> EmblemResult<()>;

    /// All layers of `logo_id` ordered ascending by z, payload embedded.
    fn fetch_layers(&self, logo_id: LogoId) -> EmblemResult<Vec<Layer>>;

    fn fetch_layer(&self, id: LayerId) -> EmblemResult<Layer>;

    /// Apply `patch` to one layer and return the updated record. Ordering
    /// is untouched; patches carry no z.
    fn update_layer(&self, id: LayerId, patch: &LayerPatch) -> EmblemResult<Layer>;

    /// Run `op` with exclusive access to the logo's layer stack.
    ///
    /// `op` sees a consistent copy of the stack; its changes (edits, pushes,
    /// removals) commit atomically iff it returns `Ok`. An `Err` discards
    /// the copy and leaves the stored stack untouched.
    fn with_layer_stack<R>(
        &self,
        logo_id: LogoId,
        op: impl FnOnce(&mut Vec<Layer>) -> EmblemResult<R>,
    ) -> EmblemResult<R>;

    fn insert_version(&self, version: &LogoVersion) -> EmblemResult<()>;

    fn fetch_version(&self, id: VersionId) -> EmblemResult<LogoVersion>;

    /// Version trail of `logo_id`, newest first.
    fn list_versions(
        &self,
        logo_id: LogoId,
        page: PageRequest,
    ) -> EmblemResult<Page<LogoVersion>>;

    fn insert_asset(&self, asset: &Asset) -> EmblemResult<()>;

    fn fetch_asset(&self, id: AssetId) -> EmblemResult<Asset>;

    fn delete_asset(&self, id: AssetId) -> EmblemResult<()>;

    /// Register a font face; `(family, weight, style)` must be unique.
    fn insert_font(&self, font: &Font) -> EmblemResult<()>;

    fn fetch_font(&self, id: FontId) -> EmblemResult<Font>;

    /// Every registered font, ordered by family, weight, style.
    fn list_fonts(&self) -> EmblemResult<Vec<Font>>;

    fn insert_category(&self, category: &Category) -> EmblemResult<()>;

    fn fetch_category(&self, id: CategoryId) -> EmblemResult<Category>;

    /// Every category, ordered by name.
    fn list_categories(&self) -> EmblemResult<Vec<Category>>;

    fn insert_template(&self, template: &Template) -> EmblemResult<()>;

    fn fetch_template(&self, id: TemplateId) -> EmblemResult<Template>;

    /// Templates, optionally restricted to one category, newest first.
    fn list_templates(
        &self,
        category_id: Option<CategoryId>,
        page: PageRequest,
    ) -> EmblemResult<Page<Template>>;
}

#[derive(Default)]
struct Tables {
    logos: HashMap<LogoId, Logo>,
    stacks: HashMap<LogoId, Arc<Mutex<Vec<Layer>>>>,
    versions: HashMap<VersionId, LogoVersion>,
    /// Version ids per logo in insertion order; listings read it reversed.
    version_trail: HashMap<LogoId, Vec<VersionId>>,
    assets: HashMap<AssetId, Asset>,
    fonts: HashMap<FontId, Font>,
    categories: HashMap<CategoryId, Category>,
    templates: HashMap<TemplateId, Template>,
}

/// In-memory [`LogoStore`] with per-logo stack locks and copy-on-write
/// commits.
///
/// The registry mutex guards the table maps; each stack carries its own
/// mutex so edits of different logos do not contend. Lock order is always
/// registry before stack, and a stack holder never takes the registry, so
/// the two can never deadlock.
#[derive(Default)]
pub struct MemoryLogoStore {
    tables: Mutex<Tables>,
}

impl MemoryLogoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> EmblemResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("logo store registry lock poisoned").into())
    }

    fn lock_stack(stack: &Mutex<Vec<Layer>>) -> EmblemResult<MutexGuard<'_, Vec<Layer>>> {
        stack
            .lock()
            .map_err(|_| anyhow::anyhow!("layer stack lock poisoned").into())
    }

    fn stack(&self, logo_id: LogoId) -> EmblemResult<Arc<Mutex<Vec<Layer>>>> {
        let tables = self.tables()?;
        let stack = tables
            .stacks
            .get(&logo_id)
            .ok_or_else(|| EmblemError::not_found("logo", logo_id))?;
        Ok(Arc::clone(stack))
    }

    fn find_layer(&self, id: LayerId) -> EmblemResult<Layer> {
        let tables = self.tables()?;
        for stack in tables.stacks.values() {
            let layers = Self::lock_stack(stack)?;
            if let Some(layer) = layers.iter().find(|l| l.id == id) {
                return Ok(layer.clone());
            }
        }
        Err(EmblemError::not_found("layer", id))
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect();
    Page {
        items,
        total,
        offset: page.offset,
    }
}

impl LogoStore for MemoryLogoStore {
    fn insert_logo(&self, logo: &Logo) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.logos.contains_key(&logo.id) {
            return Err(EmblemError::conflict(format!(
                "logo {} already exists",
                logo.id
            )));
        }
        tables.logos.insert(logo.id, logo.clone());
        tables.stacks.insert(logo.id, Arc::new(Mutex::new(Vec::new())));
        Ok(())
    }

    fn insert_logo_with_layers(&self, logo: &Logo, layers: &[Layer]) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.logos.contains_key(&logo.id) {
            return Err(EmblemError::conflict(format!(
                "logo {} already exists",
                logo.id
            )));
        }
        for layer in layers {
            if layer.logo_id != logo.id {
                return Err(EmblemError::validation(
                    "layer.logo_id",
                    format!("layer {} does not belong to logo {}", layer.id, logo.id),
                ));
            }
        }
        tables.logos.insert(logo.id, logo.clone());
        tables
            .stacks
            .insert(logo.id, Arc::new(Mutex::new(layers.to_vec())));
        Ok(())
    }

    fn fetch_logo(&self, id: LogoId) -> EmblemResult<Logo> {
        let tables = self.tables()?;
        tables
            .logos
            .get(&id)
            .cloned()
            .ok_or_else(|| EmblemError::not_found("logo", id))
    }

    fn list_logos(&self, owner_id: UserId, page: PageRequest) -> EmblemResult<Page<Logo>> {
        let tables = self.tables()?;
        let mut items = tables
            .logos
            .values()
            .filter(|logo| logo.owner_id == owner_id)
            .cloned()
            .collect::<Vec<_>>();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(items, page))
    }

    fn update_logo(&self, id: LogoId, patch: &LogoPatch) -> EmblemResult<Logo> {
        let mut tables = self.tables()?;
        let logo = tables
            .logos
            .get_mut(&id)
            .ok_or_else(|| EmblemError::not_found("logo", id))?;
        patch.apply_to(logo)?;
        logo.updated_at = Utc::now();
        Ok(logo.clone())
    }

    fn delete_logo(&self, id: LogoId) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.logos.remove(&id).is_none() {
            return Err(EmblemError::not_found("logo", id));
        }
        tables.stacks.remove(&id);
        if let Some(trail) = tables.version_trail.remove(&id) {
            for version_id in trail {
                tables.versions.remove(&version_id);
            }
        }
        Ok(())
    }

    fn fetch_layers(&self, logo_id: LogoId) -> EmblemResult<Vec<Layer>> {
        let stack = self.stack(logo_id)?;
        let mut layers = Self::lock_stack(&stack)?.clone();
        layers.sort_by_key(|layer| layer.z_index);
        Ok(layers)
    }

    fn fetch_layer(&self, id: LayerId) -> EmblemResult<Layer> {
        self.find_layer(id)
    }

    fn update_layer(&self, id: LayerId, patch: &LayerPatch) -> EmblemResult<Layer> {
        let logo_id = self.find_layer(id)?.logo_id;
        self.with_layer_stack(logo_id, |layers| {
            let layer = layers
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or_else(|| EmblemError::not_found("layer", id))?;
            patch.apply_to(layer)?;
            layer.updated_at = Utc::now();
            Ok(layer.clone())
        })
    }

    fn with_layer_stack<R>(
        &self,
        logo_id: LogoId,
        op: impl FnOnce(&mut Vec<Layer>) -> EmblemResult<R>,
    ) -> EmblemResult<R> {
        let stack = self.stack(logo_id)?;

        let value = {
            let mut guard = Self::lock_stack(&stack)?;
            let mut working = guard.clone();
            let value = op(&mut working)?;
            *guard = working;
            value
        };

        // A concurrent delete may have unhooked the stack between the
        // registry lookup and the commit; the loser reports instead of
        // pretending the write landed.
        let tables = self.tables()?;
        if !tables.stacks.contains_key(&logo_id) {
            return Err(EmblemError::conflict(format!(
                "logo {logo_id} was deleted during a stack mutation"
            )));
        }
        Ok(value)
    }

    fn insert_version(&self, version: &LogoVersion) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if !tables.logos.contains_key(&version.logo_id) {
            return Err(EmblemError::not_found("logo", version.logo_id));
        }
        if tables.versions.contains_key(&version.id) {
            return Err(EmblemError::conflict(format!(
                "version {} already exists",
                version.id
            )));
        }
        tables.versions.insert(version.id, version.clone());
        tables
            .version_trail
            .entry(version.logo_id)
            .or_default()
            .push(version.id);
        Ok(())
    }

    fn fetch_version(&self, id: VersionId) -> EmblemResult<LogoVersion> {
        let tables = self.tables()?;
        tables
            .versions
            .get(&id)
            .cloned()
            .ok_or_else(|| EmblemError::not_found("version", id))
    }

    fn list_versions(
        &self,
        logo_id: LogoId,
        page: PageRequest,
    ) -> EmblemResult<Page<LogoVersion>> {
        let tables = self.tables()?;
        if !tables.logos.contains_key(&logo_id) {
            return Err(EmblemError::not_found("logo", logo_id));
        }
        let trail = tables
            .version_trail
            .get(&logo_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let items = trail
            .iter()
            .rev()
            .filter_map(|id| tables.versions.get(id))
            .cloned()
            .collect::<Vec<_>>();
        Ok(paginate(items, page))
    }

    fn insert_asset(&self, asset: &Asset) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.assets.contains_key(&asset.id) {
            return Err(EmblemError::conflict(format!(
                "asset {} already exists",
                asset.id
            )));
        }
        tables.assets.insert(asset.id, asset.clone());
        Ok(())
    }

    fn fetch_asset(&self, id: AssetId) -> EmblemResult<Asset> {
        let tables = self.tables()?;
        tables
            .assets
            .get(&id)
            .cloned()
            .ok_or_else(|| EmblemError::not_found("asset", id))
    }

    fn delete_asset(&self, id: AssetId) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.assets.remove(&id).is_none() {
            return Err(EmblemError::not_found("asset", id));
        }
        Ok(())
    }

    fn insert_font(&self, font: &Font) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.fonts.contains_key(&font.id) {
            return Err(EmblemError::conflict(format!(
                "font {} already exists",
                font.id
            )));
        }
        if tables
            .fonts
            .values()
            .any(|f| f.identity_key() == font.identity_key())
        {
            return Err(EmblemError::conflict(format!(
                "font '{}' weight {} ({:?}) is already registered",
                font.family, font.weight, font.style
            )));
        }
        tables.fonts.insert(font.id, font.clone());
        Ok(())
    }

    fn fetch_font(&self, id: FontId) -> EmblemResult<Font> {
        let tables = self.tables()?;
        tables
            .fonts
            .get(&id)
            .cloned()
            .ok_or_else(|| EmblemError::not_found("font", id))
    }

    fn list_fonts(&self) -> EmblemResult<Vec<Font>> {
        let tables = self.tables()?;
        let mut fonts = tables.fonts.values().cloned().collect::<Vec<_>>();
        fonts.sort_by_key(Font::identity_key);
        Ok(fonts)
    }

    fn insert_category(&self, category: &Category) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.categories.contains_key(&category.id) {
            return Err(EmblemError::conflict(format!(
                "category {} already exists",
                category.id
            )));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    fn fetch_category(&self, id: CategoryId) -> EmblemResult<Category> {
        let tables = self.tables()?;
        tables
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| EmblemError::not_found("category", id))
    }

    fn list_categories(&self) -> EmblemResult<Vec<Category>> {
        let tables = self.tables()?;
        let mut categories = tables.categories.values().cloned().collect::<Vec<_>>();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    fn insert_template(&self, template: &Template) -> EmblemResult<()> {
        let mut tables = self.tables()?;
        if tables.templates.contains_key(&template.id) {
            return Err(EmblemError::conflict(format!(
                "template {} already exists",
                template.id
            )));
        }
        if !tables.logos.contains_key(&template.base_logo_id) {
            return Err(EmblemError::not_found("logo", template.base_logo_id));
        }
        if let Some(category_id) = template.category_id
            && !tables.categories.contains_key(&category_id)
        {
            return Err(EmblemError::not_found("category", category_id));
        }
        tables.templates.insert(template.id, template.clone());
        Ok(())
    }

    fn fetch_template(&self, id: TemplateId) -> EmblemResult<Template> {
        let tables = self.tables()?;
        tables
            .templates
            .get(&id)
            .cloned()
            .ok_or_else(|| EmblemError::not_found("template", id))
    }

    fn list_templates(
        &self,
        category_id: Option<CategoryId>,
        page: PageRequest,
    ) -> EmblemResult<Page<Template>> {
        let tables = self.tables()?;
        let mut items = tables
            .templates
            .values()
            .filter(|t| category_id.is_none_or(|c| t.category_id == Some(c)))
            .cloned()
            .collect::<Vec<_>>();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(items, page))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/logo.rs"]
mod tests;
