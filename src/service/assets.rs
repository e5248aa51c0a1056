//! Asset ingest and removal against the media collaborator.
//!
//! Upload failures commit nothing locally. Provider delete failures are
//! logged and the local record goes away regardless; local consistency wins
//! over a provider that may already have dropped the object.

use chrono::Utc;

use crate::foundation::{
    core::{AssetId, UserId},
    error::{EmblemError, EmblemResult},
};
use crate::model::asset::{Asset, AssetKind};
use crate::store::logo::LogoStore;
use crate::store::media::{
    DEFAULT_FOLDER, MediaStore, SignRequest, SignedUpload, UploadedMedia, hex_digest,
};

/// Ingest and removal of externally stored media.
pub struct AssetService<'a, S, M> {
    logos: &'a S,
    media: &'a M,
}

impl<'a, S: LogoStore, M: MediaStore> AssetService<'a, S, M> {
    pub fn new(logos: &'a S, media: &'a M) -> Self {
        Self { logos, media }
    }

    /// Upload `bytes` to the media backend and record the asset.
    ///
    /// The kind is detected from the content type unless the caller pins
    /// one. SVG payloads keep their markup inline so the renderer can embed
    /// and recolor them without another fetch. If the local record cannot
    /// be written after the upload succeeded, the upload is rolled back.
    #[tracing::instrument(skip_all, fields(name, content_type))]
    pub fn ingest(
        &self,
        bytes: &[u8],
        name: &str,
        content_type: &str,
        kind: Option<AssetKind>,
        created_by: Option<UserId>,
    ) -> EmblemResult<Asset> {
        // Reject unusable vector markup before anything leaves the process.
        if content_type == "image/svg+xml" && std::str::from_utf8(bytes).is_err() {
            return Err(EmblemError::validation(
                "asset.vector_svg",
                "vector markup is not valid UTF-8",
            ));
        }

        let uploaded = self
            .media
            .upload(bytes, name, content_type, DEFAULT_FOLDER)?;

        match self.record(bytes, name, content_type, kind, created_by, &uploaded) {
            Ok(asset) => Ok(asset),
            Err(err) => {
                // roll the orphaned upload back, best effort
                if let Err(media_err) = self.media.delete(&uploaded.provider_id) {
                    tracing::warn!(
                        provider_id = %uploaded.provider_id,
                        error = %media_err,
                        "failed to roll back an orphaned upload"
                    );
                }
                Err(err)
            }
        }
    }

    /// Build the asset row from an upload and store it.
    fn record(
        &self,
        bytes: &[u8],
        name: &str,
        content_type: &str,
        kind: Option<AssetKind>,
        created_by: Option<UserId>,
        uploaded: &UploadedMedia,
    ) -> EmblemResult<Asset> {
        let is_svg =
            content_type == "image/svg+xml" || uploaded.format.as_deref() == Some("svg");
        let kind = kind.unwrap_or(if is_svg {
            AssetKind::Vector
        } else {
            AssetKind::Raster
        });
        let vector_svg = if is_svg {
            let markup = String::from_utf8(bytes.to_vec()).map_err(|_| {
                EmblemError::validation("asset.vector_svg", "vector markup is not valid UTF-8")
            })?;
            Some(markup)
        } else {
            None
        };
        let has_alpha = matches!(uploaded.format.as_deref(), Some("png" | "svg"));

        let now = Utc::now();
        let asset = Asset {
            id: AssetId::new(),
            kind,
            name: name.to_string(),
            storage: self.media.backend().to_string(),
            url: uploaded.url.clone(),
            provider_id: Some(uploaded.provider_id.clone()),
            mime_type: content_type.to_string(),
            byte_size: Some(uploaded.byte_size),
            width: uploaded.width,
            height: uploaded.height,
            has_alpha: Some(has_alpha),
            dominant: None,
            palette: None,
            vector_svg,
            checksum_sha256: Some(hex_digest(bytes)),
            meta: serde_json::Value::Null,
            created_by,
            created_at: now,
            updated_at: now,
        };

        self.logos.insert_asset(&asset)?;
        Ok(asset)
    }

    /// Delete an asset record and its provider object.
    ///
    /// The provider delete is best-effort: a failure is logged at `warn`
    /// and the local record is removed anyway.
    #[tracing::instrument(skip_all, fields(asset = %asset_id))]
    pub fn delete(&self, asset_id: AssetId) -> EmblemResult<()> {
        let asset = self.logos.fetch_asset(asset_id)?;
        if let Some(provider_id) = &asset.provider_id
            && let Err(err) = self.media.delete(provider_id)
        {
            tracing::warn!(
                provider_id = %provider_id,
                error = %err,
                "failed to delete from the media provider; removing the local record anyway"
            );
        }
        self.logos.delete_asset(asset_id)
    }

    /// Sign parameters for a direct client-to-provider upload.
    pub fn sign_direct_upload(&self, request: &SignRequest) -> EmblemResult<SignedUpload> {
        self.media.sign_upload(request)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/assets.rs"]
mod tests;
