//! Self-contained snapshot documents: one logo plus its full ordered layer
//! list, used for the append-only version trail and for template
//! instantiation.

use chrono::{DateTime, Utc};

use crate::foundation::{
    core::{Canvas, CategoryId, LayerId, LogoId, UserId},
    error::{EmblemError, EmblemResult},
};
use crate::model::logo::{Layer, Logo, validate_stack};
use crate::zorder::maintainer::{ensure_dense, painting_order};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A point-in-time copy of a logo and all its layers, ascending by z.
///
/// The document is self-contained for everything the logo owns; asset and
/// font references stay references, so an instantiated copy shares media
/// with its source.
pub struct Snapshot {
    /// Identity of the source logo at capture time.
    pub id: LogoId,
    pub title: String,
    pub canvas_w: u32,
    pub canvas_h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Full layer records, kind payload inline, ordered ascending by z.
    pub layers: Vec<Layer>,
}

impl Snapshot {
    /// Capture `logo` and its stack; layers are stored ascending by z
    /// regardless of input order. A stack that is not a dense permutation
    /// cannot be captured.
    pub fn capture(logo: &Logo, layers: &[Layer]) -> EmblemResult<Self> {
        ensure_dense(layers)?;
        let ordered = painting_order(layers)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        Ok(Self {
            id: logo.id,
            title: logo.title.clone(),
            canvas_w: logo.canvas.width,
            canvas_h: logo.canvas.height,
            dpi: logo.dpi,
            thumbnail_url: logo.thumbnail_url.clone(),
            category_id: logo.category_id,
            created_at: logo.created_at,
            updated_at: logo.updated_at,
            layers: ordered,
        })
    }

    /// Rebuild the document into a brand-new logo owned by `owner_id`.
    ///
    /// Every row gets a fresh identity and fresh timestamps; field values
    /// and z ordering carry over unchanged. The thumbnail and category are
    /// not carried -- they belong to the source, not the copy.
    pub fn instantiate(
        &self,
        owner_id: UserId,
        title: impl Into<String>,
    ) -> EmblemResult<(Logo, Vec<Layer>)> {
        let now = Utc::now();
        let logo = Logo {
            id: LogoId::new(),
            owner_id,
            title: title.into(),
            canvas: Canvas::new(self.canvas_w, self.canvas_h)?,
            dpi: self.dpi,
            thumbnail_url: None,
            is_template: false,
            category_id: None,
            created_at: now,
            updated_at: now,
        };

        let layers = self
            .layers
            .iter()
            .map(|layer| {
                let mut copy = layer.clone();
                copy.id = LayerId::new();
                copy.logo_id = logo.id;
                copy.created_at = now;
                copy.updated_at = now;
                copy
            })
            .collect::<Vec<_>>();

        validate_stack(&logo, &layers)?;
        Ok((logo, layers))
    }

    /// Document form stored in a version row.
    pub fn to_json(&self) -> EmblemResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| EmblemError::serde(e.to_string()))
    }

    /// Parse a stored document. Field-level validation happens on
    /// [`Snapshot::instantiate`], not here.
    pub fn from_json(value: serde_json::Value) -> EmblemResult<Self> {
        serde_json::from_value(value).map_err(|e| EmblemError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/codec.rs"]
mod tests;
