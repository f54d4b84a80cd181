// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: layers, project state and the store that mutates them.

pub mod layer;
pub mod placement;
pub mod project;
pub mod store;
