//! Stable identity for a composed document, for caching and change checks.

use crate::foundation::error::{EmblemError, EmblemResult};
use crate::foundation::math::Fnv1a64;
use crate::model::logo::Layer;
use crate::zorder::maintainer::painting_order;

/// Seed of the second lane; the first runs from the FNV offset basis.
const LANE_B_SEED: u64 = 0x9ae1_6a3b_2f90_404f;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// 128-bit digest of everything that can change the emitted document.
///
/// Two FNV-1a lanes with distinct seeds run over the same byte stream.
/// Identity and bookkeeping fields (ids, names, timestamps, lock flag) are
/// excluded on purpose, so re-identified copies of the same visual state
/// (template instantiation, snapshot restore) share a fingerprint.
pub struct RenderFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl RenderFingerprint {
    /// 32-char lowercase hex form, suitable for cache keys and ETags.
    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

struct Lanes {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl Lanes {
    fn new() -> Self {
        Self {
            a: Fnv1a64::new_default(),
            b: Fnv1a64::new(LANE_B_SEED),
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.a.write_u8(v);
        self.b.write_u8(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.a.write_u64(v);
        self.b.write_u64(v);
    }

    fn write_f64(&mut self, v: f64) {
        self.a.write_f64(v);
        self.b.write_f64(v);
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.a.write_bytes(s.as_bytes());
        self.b.write_bytes(s.as_bytes());
    }

    fn write_json(&mut self, value: &serde_json::Value) {
        match value {
            serde_json::Value::Null => self.write_u8(0),
            serde_json::Value::Bool(b) => {
                self.write_u8(1);
                self.write_u8(u8::from(*b));
            }
            serde_json::Value::Number(n) => {
                self.write_u8(2);
                if let Some(i) = n.as_i64() {
                    self.write_u64(i as u64);
                } else {
                    self.write_f64(n.as_f64().unwrap_or(f64::NAN));
                }
            }
            serde_json::Value::String(s) => {
                self.write_u8(3);
                self.write_str(s);
            }
            serde_json::Value::Array(items) => {
                self.write_u8(4);
                self.write_u64(items.len() as u64);
                for item in items {
                    self.write_json(item);
                }
            }
            serde_json::Value::Object(map) => {
                self.write_u8(5);
                self.write_u64(map.len() as u64);
                // Sorted keys, independent of the map's iteration order.
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                for key in keys {
                    self.write_str(key);
                    self.write_json(&map[key]);
                }
            }
        }
    }

    fn finish(self) -> RenderFingerprint {
        RenderFingerprint {
            hi: self.a.finish(),
            lo: self.b.finish(),
        }
    }
}

/// Fingerprint a layer stack's renderable state at the given output size.
///
/// Feeds the target dimensions plus, for each visible layer in painting
/// order: its z rank, transform scalars, opacity, blend mode, shadow, and
/// the full kind-specific payload.
pub fn render_fingerprint(
    layers: &[Layer],
    width: u32,
    height: u32,
) -> EmblemResult<RenderFingerprint> {
    let mut lanes = Lanes::new();
    lanes.write_u64(u64::from(width));
    lanes.write_u64(u64::from(height));

    let ordered = painting_order(layers);
    lanes.write_u64(ordered.iter().filter(|l| l.is_visible).count() as u64);
    for layer in ordered {
        if !layer.is_visible {
            continue;
        }
        lanes.write_u64(u64::from(layer.z_index));
        for v in [
            layer.x_norm,
            layer.y_norm,
            layer.scale,
            layer.rotation_deg,
            layer.anchor_x,
            layer.anchor_y,
            layer.opacity,
        ] {
            lanes.write_f64(v);
        }
        let style = serde_json::to_value((layer.blend_mode, layer.shadow))
            .map_err(|e| EmblemError::serde(e.to_string()))?;
        lanes.write_json(&style);
        let payload = serde_json::to_value(&layer.payload)
            .map_err(|e| EmblemError::serde(e.to_string()))?;
        lanes.write_json(&payload);
    }
    Ok(lanes.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
