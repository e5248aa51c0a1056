//! Dense z-order maintenance for a logo's layer stack.
//!
//! The invariant: for a stack of `N` layers the set of `z_index` values is
//! exactly `{0, ..., N-1}`. Every mutation here preserves it, and every
//! mutation starts by checking it so that a raced or corrupted stack is
//! reported as a conflict instead of being silently "repaired".

use crate::foundation::{
    core::LayerId,
    error::{EmblemError, EmblemResult},
};
use crate::model::logo::Layer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// One z-index reassignment produced by a stack mutation.
///
/// Mutations return the full set of shifts they applied so callers can
/// persist exactly the touched rows (and bump their timestamps) without
/// diffing the stack.
pub struct ZShift {
    pub layer_id: LayerId,
    pub from: u32,
    pub to: u32,
}

/// Verify the stack's z-indices form a dense permutation of `[0, N)`.
///
/// A violation means concurrent writers raced or storage is corrupt; the
/// caller should re-read and retry rather than patch over it.
pub fn ensure_dense(layers: &[Layer]) -> EmblemResult<()> {
    let len = layers.len();
    let mut seen = vec![false; len];
    for layer in layers {
        let z = layer.z_index as usize;
        if z >= len {
            return Err(EmblemError::conflict(format!(
                "layer {} has z-index {z} outside dense range 0..{len}",
                layer.id
            )));
        }
        if seen[z] {
            return Err(EmblemError::conflict(format!(
                "duplicate z-index {z} in stack of {len}"
            )));
        }
        seen[z] = true;
    }
    Ok(())
}

/// Borrow the stack in painting order: ascending z, bottom first.
pub fn painting_order(layers: &[Layer]) -> Vec<&Layer> {
    let mut ordered: Vec<&Layer> = layers.iter().collect();
    ordered.sort_by_key(|layer| layer.z_index);
    ordered
}

/// The index a newly inserted layer takes: the current count, i.e. the top.
pub fn append_index(layers: &[Layer]) -> u32 {
    layers.len() as u32
}

/// Move one layer to `new_index`, shifting the layers in between by one.
///
/// Both shift ranges are computed against the pre-move snapshot:
/// - `new_index > old`: layers with `old < z <= new_index` move down one.
/// - `new_index < old`: layers with `new_index <= z < old` move up one.
/// - `new_index == old`: no-op, returns no shifts.
///
/// `new_index` must already lie in `[0, N)`; out-of-range targets are an
/// error, never clamped. Relative order of all unmoved layers is preserved.
#[tracing::instrument(skip(layers), fields(len = layers.len()))]
pub fn reorder(
    layers: &mut [Layer],
    layer_id: LayerId,
    new_index: u32,
) -> EmblemResult<Vec<ZShift>> {
    ensure_dense(layers)?;

    let old = layers
        .iter()
        .find(|layer| layer.id == layer_id)
        .map(|layer| layer.z_index)
        .ok_or_else(|| EmblemError::not_found("layer", layer_id))?;

    let len = layers.len();
    if new_index as usize >= len {
        return Err(EmblemError::out_of_range(new_index, len));
    }
    if new_index == old {
        return Ok(Vec::new());
    }

    // Each layer is visited once and its z read before it is written, so
    // every range test below sees the pre-move snapshot.
    let mut shifts = Vec::new();
    for layer in layers.iter_mut() {
        let z = layer.z_index;
        let to = if layer.id == layer_id {
            new_index
        } else if new_index > old && z > old && z <= new_index {
            z - 1
        } else if new_index < old && z >= new_index && z < old {
            z + 1
        } else {
            continue;
        };
        shifts.push(ZShift {
            layer_id: layer.id,
            from: z,
            to,
        });
        layer.z_index = to;
    }
    Ok(shifts)
}

/// Shift every layer above `removed_index` down one, closing the hole a
/// delete leaves. Returns the shifts applied.
pub fn close_gap(layers: &mut [Layer], removed_index: u32) -> Vec<ZShift> {
    let mut shifts = Vec::new();
    for layer in layers.iter_mut() {
        if layer.z_index > removed_index {
            let from = layer.z_index;
            layer.z_index = from - 1;
            shifts.push(ZShift {
                layer_id: layer.id,
                from,
                to: layer.z_index,
            });
        }
    }
    shifts
}

/// Remove one layer and close the gap it leaves.
///
/// Every layer above the removed index moves down one. Returns the removed
/// layer together with the shifts applied to the survivors.
#[tracing::instrument(skip(layers), fields(len = layers.len()))]
pub fn remove(layers: &mut Vec<Layer>, layer_id: LayerId) -> EmblemResult<(Layer, Vec<ZShift>)> {
    ensure_dense(layers)?;

    let position = layers
        .iter()
        .position(|layer| layer.id == layer_id)
        .ok_or_else(|| EmblemError::not_found("layer", layer_id))?;
    let removed = layers.remove(position);
    let shifts = close_gap(layers, removed.z_index);
    Ok((removed, shifts))
}

#[cfg(test)]
#[path = "../../tests/unit/zorder/maintainer.rs"]
mod tests;
