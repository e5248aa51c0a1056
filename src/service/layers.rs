//! Validated layer mutation: create, patch, delete, and atomic reorder.

use chrono::Utc;

use crate::foundation::{
    core::{LayerId, LogoId},
    error::EmblemResult,
};
use crate::model::dsl::LayerBuilder;
use crate::model::logo::Layer;
use crate::model::patch::LayerPatch;
use crate::store::logo::LogoStore;
use crate::zorder::maintainer::{self, ZShift};

/// Mutation surface for a logo's layer stack.
///
/// Every structural write runs inside the store's per-logo exclusivity
/// scope, so the dense z permutation survives concurrent callers.
pub struct LayerService<'a, S> {
    store: &'a S,
}

impl<'a, S: LogoStore> LayerService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and append a new layer at the top of the stack (z = N).
    #[tracing::instrument(skip_all, fields(logo = %logo_id))]
    pub fn add_layer(&self, logo_id: LogoId, builder: LayerBuilder) -> EmblemResult<Layer> {
        self.store.with_layer_stack(logo_id, |layers| {
            maintainer::ensure_dense(layers)?;
            let layer = builder.into_layer(logo_id, maintainer::append_index(layers));
            layer.validate()?;
            layers.push(layer.clone());
            Ok(layer)
        })
    }

    /// Patch a layer's fields; ordering is untouched. An empty patch reads
    /// the current record back without writing.
    #[tracing::instrument(skip_all, fields(layer = %layer_id))]
    pub fn update_layer(&self, layer_id: LayerId, patch: &LayerPatch) -> EmblemResult<Layer> {
        if patch.is_empty() {
            return self.store.fetch_layer(layer_id);
        }
        self.store.update_layer(layer_id, patch)
    }

    /// Delete a layer and close the z gap it leaves.
    ///
    /// Returns the shifts applied to the surviving layers.
    #[tracing::instrument(skip_all, fields(layer = %layer_id))]
    pub fn delete_layer(&self, layer_id: LayerId) -> EmblemResult<Vec<ZShift>> {
        let logo_id = self.store.fetch_layer(layer_id)?.logo_id;
        self.store.with_layer_stack(logo_id, |layers| {
            let (_, shifts) = maintainer::remove(layers, layer_id)?;
            touch_shifted(layers, &shifts);
            Ok(shifts)
        })
    }

    /// Move a layer to `new_index`, shifting the layers in between.
    ///
    /// Returns every applied shift, the moved layer included. Moving to the
    /// current index returns an empty list and writes nothing.
    #[tracing::instrument(skip_all, fields(layer = %layer_id, new_index))]
    pub fn reorder_layer(&self, layer_id: LayerId, new_index: u32) -> EmblemResult<Vec<ZShift>> {
        let logo_id = self.store.fetch_layer(layer_id)?.logo_id;
        self.store.with_layer_stack(logo_id, |layers| {
            let shifts = maintainer::reorder(layers, layer_id, new_index)?;
            touch_shifted(layers, &shifts);
            Ok(shifts)
        })
    }
}

/// Bump `updated_at` on every row a shift touched, mirroring what a row
/// update does in a backing database.
fn touch_shifted(layers: &mut [Layer], shifts: &[ZShift]) {
    if shifts.is_empty() {
        return;
    }
    let now = Utc::now();
    for shift in shifts {
        if let Some(layer) = layers.iter_mut().find(|l| l.id == shift.layer_id) {
            layer.updated_at = now;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/layers.rs"]
mod tests;
