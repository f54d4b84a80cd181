// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timeline playback and layer synchronization.

pub mod clock;
pub mod gesture;
pub mod media_sync;
pub mod tracks;
pub mod visibility;
