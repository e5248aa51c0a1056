#![forbid(unsafe_code)]

pub mod foundation;
pub mod model;
pub mod render;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod zorder;

pub use foundation::core::{
    AssetId, Canvas, CategoryId, Deadline, FontId, LayerId, LogoId, Page, PageRequest, Paint, Rgb,
    TemplateId, UserId, VersionId,
};
pub use foundation::error::{EmblemError, EmblemResult};
pub use model::asset::{
    Asset, AssetCatalog, AssetKind, Category, Font, FontStyle, LogoVersion, Template,
};
pub use model::dsl::{LayerBuilder, LogoBuilder};
pub use model::logo::{BlendMode, Layer, LayerPayload, Logo, validate_stack};
pub use model::patch::{LayerPatch, LogoPatch};
pub use render::compose::{RenderOptions, render_svg};
pub use render::fingerprint::{RenderFingerprint, render_fingerprint};
pub use render::raster::{RasterFormat, encode, rasterize};
pub use service::assets::AssetService;
pub use service::export::{ExportService, PngExport, ThumbnailExport};
pub use service::layers::LayerService;
pub use service::library::LibraryService;
pub use snapshot::codec::Snapshot;
pub use store::logo::{LogoStore, MemoryLogoStore};
pub use store::media::{
    MediaStore, MemoryMediaStore, SignRequest, SignedUpload, TransformOptions, UploadedMedia,
};
pub use zorder::maintainer::ZShift;
