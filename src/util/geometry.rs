// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides utilities for coordinate transformations between
//! pixel rectangles and normalized stage geometry, plus the stage sizing
//! rules for each aspect ratio.

use crate::models::layer::Geometry;
use crate::models::project::AspectRatio;

/// Width and height of the reference stage for 16:9.
pub const REFERENCE_WIDTH: f64 = 1920.0;
pub const REFERENCE_HEIGHT: f64 = 1080.0;

/// Share of the fitting scale the stage occupies inside its panel.
const FIT_MARGIN: f64 = 0.9;

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Convert normalized geometry to pixels inside a container of the given size.
pub fn relative_to_absolute(geometry: &Geometry, container_width: f64, container_height: f64) -> PixelRect {
    PixelRect {
        x: geometry.x * container_width,
        y: geometry.y * container_height,
        width: geometry.width * container_width,
        height: geometry.height * container_height,
    }
}

/// Convert a pixel rectangle (relative to the container origin) to normalized geometry.
pub fn absolute_to_relative(rect: &PixelRect, container_width: f64, container_height: f64) -> Geometry {
    Geometry {
        x: rect.x / container_width,
        y: rect.y / container_height,
        width: rect.width / container_width,
        height: rect.height / container_height,
    }
}

/// Width divided by height.
pub fn aspect_ratio_value(ratio: AspectRatio) -> f64 {
    match ratio {
        AspectRatio::Landscape16x9 => 16.0 / 9.0,
        AspectRatio::Portrait9x16 => 9.0 / 16.0,
        AspectRatio::Square => 1.0,
        AspectRatio::Portrait4x5 => 4.0 / 5.0,
    }
}

/// Stage size in reference pixels for the given ratio.
pub fn stage_size(ratio: AspectRatio) -> (f64, f64) {
    let aspect = aspect_ratio_value(ratio);
    if aspect > 1.77 {
        (REFERENCE_WIDTH, REFERENCE_WIDTH / aspect)
    } else {
        (REFERENCE_HEIGHT * aspect, REFERENCE_HEIGHT)
    }
}

/// Scale that fits the 16:9 reference frame into the available area, with margin.
pub fn fit_scale(available_width: f64, available_height: f64) -> f64 {
    let scale_x = available_width / REFERENCE_WIDTH;
    let scale_y = available_height / REFERENCE_HEIGHT;
    scale_x.min(scale_y) * FIT_MARGIN
}
