use std::fmt;
use std::time::{Duration, Instant};

use crate::foundation::error::{EmblemError, EmblemResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Identity of a stored logo.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LogoId(pub uuid::Uuid);

/// Identity of a single layer within a logo.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub uuid::Uuid);

/// Identity of an externally stored media asset.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct AssetId(pub uuid::Uuid);

/// Identity of a registered font face.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FontId(pub uuid::Uuid);

/// Identity of a template/logo category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CategoryId(pub uuid::Uuid);

/// Identity of a reusable template.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TemplateId(pub uuid::Uuid);

/// Identity of an immutable logo version snapshot.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct VersionId(pub uuid::Uuid);

/// Identity of an owning user (opaque to this crate).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct UserId(pub uuid::Uuid);

impl LogoId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl LayerId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl AssetId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl FontId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl CategoryId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl TemplateId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl VersionId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl UserId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for LogoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pixel dimensions of a logo's drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Default square canvas for new logos.
    pub const DEFAULT: Canvas = Canvas {
        width: 1080,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> EmblemResult<Self> {
        if width == 0 || height == 0 {
            return Err(EmblemError::validation(
                "canvas",
                "width and height must be >= 1",
            ));
        }
        Ok(Self { width, height })
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 8-bit sRGB color, carried as `#rrggbb` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional, case-insensitive).
    pub fn parse(s: &str) -> EmblemResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EmblemError::validation(
                "color",
                format!("'{s}' is not a #rrggbb color"),
            ));
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        match (byte(0), byte(2), byte(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self { r, g, b }),
            _ => Err(EmblemError::validation(
                "color",
                format!("'{s}' is not a #rrggbb color"),
            )),
        }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Rgb {
    type Err = EmblemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A color plus its coverage alpha, the unit of fill/stroke/tint styling.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Paint {
    pub color: Rgb,
    /// Coverage in `[0, 1]`.
    pub alpha: f64,
}

impl Paint {
    pub fn new(color: Rgb, alpha: f64) -> Self {
        Self { color, alpha }
    }

    /// Fully opaque paint.
    pub fn solid(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }

    pub(crate) fn validate(&self, field: &str) -> EmblemResult<()> {
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(EmblemError::validation(
                format!("{field}.alpha"),
                "alpha must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Caller-supplied wall-clock budget, checked at phase boundaries only.
///
/// An expired deadline aborts work before any persistence side effect; a write
/// phase that has already begun is never interrupted.
#[derive(Clone, Copy, Debug, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No budget; checks always pass.
    pub const NONE: Deadline = Deadline(None);

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn within(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    /// Err([`EmblemError::Canceled`]) naming `phase` if the budget is spent.
    pub fn check(&self, phase: &'static str) -> EmblemResult<()> {
        match self.0 {
            Some(t) if Instant::now() >= t => Err(EmblemError::canceled(format!(
                "deadline expired before {phase}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Window into an ordered listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PageRequest {
    /// Items to skip from the front of the ordering.
    pub offset: usize,
    /// Maximum items to return.
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// First page of `limit` items.
    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }
}

/// One page of an ordered listing plus the total count.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
