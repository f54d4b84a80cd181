// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Which layers are on screen at a given time, in paint order.

use crate::models::layer::{Layer, LayerId};

/// Layers whose window contains `time`, sorted by ascending z-index.
///
/// The sort is stable, so layers sharing a z-index keep their collection
/// order. Later entries paint on top.
pub fn visible_layers(layers: &[Layer], time: f64) -> Vec<&Layer> {
    let mut visible: Vec<&Layer> = layers.iter().filter(|l| l.is_visible_at(time)).collect();
    visible.sort_by_key(|l| l.z_index);
    visible
}

/// Memoized render set keyed on the store's layers revision and the cursor.
#[derive(Debug, Default)]
pub struct VisibleSet {
    key: Option<(u64, u64)>,
    ids: Vec<LayerId>,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the visible layers in paint order, recomputed only when inputs change.
    pub fn resolve(&mut self, layers: &[Layer], revision: u64, time: f64) -> &[LayerId] {
        let key = (revision, time.to_bits());
        if self.key != Some(key) {
            self.ids = visible_layers(layers, time)
                .into_iter()
                .map(|l| l.id.clone())
                .collect();
            self.key = Some(key);
        }
        &self.ids
    }
}
