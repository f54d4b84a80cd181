// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Default placement for newly added layers.
//!
//! New layers start at (0.1, 0.1) and step diagonally away from any layer
//! already sitting at the candidate position. The search is bounded: after
//! ten attempts the last candidate is used even if it is occupied.

use super::layer::{Geometry, Layer, LayerOptions, LayerType};

const START: f64 = 0.1;
const STEP: f64 = 0.05;
const TOLERANCE: f64 = 0.01;
const MAX_ATTEMPTS: usize = 10;

/// Default normalized (width, height) for a new layer of the given kind.
pub fn default_size(layer_type: LayerType) -> (f64, f64) {
    match layer_type {
        LayerType::Text => (0.4, 0.15),
        LayerType::Image | LayerType::Video => (0.3, 0.3),
    }
}

/// Find a starting (x, y) that does not sit on top of an existing layer.
pub fn safe_position(layers: &[Layer], width: f64, height: f64) -> (f64, f64) {
    let mut x = START;
    let mut y = START;

    for _ in 0..MAX_ATTEMPTS {
        let occupied = layers.iter().any(|l| {
            (l.geometry.x - x).abs() < TOLERANCE && (l.geometry.y - y).abs() < TOLERANCE
        });
        if !occupied {
            break;
        }
        x += STEP;
        y += STEP;
        if x + width > 1.0 {
            x = START;
        }
        if y + height > 1.0 {
            y = START;
        }
    }

    (x, y)
}

/// Default geometry for a new layer of the given kind.
pub fn place(layers: &[Layer], layer_type: LayerType) -> Geometry {
    let (width, height) = default_size(layer_type);
    let (x, y) = safe_position(layers, width, height);
    Geometry {
        x,
        y,
        width,
        height,
    }
}

/// One above the highest existing z-index, or 1 for an empty project.
pub fn next_z_index(layers: &[Layer]) -> i64 {
    layers.iter().map(|l| l.z_index).max().unwrap_or(0) + 1
}

pub fn default_name(layer_type: LayerType, options: &LayerOptions) -> String {
    match layer_type {
        LayerType::Image => "Image Layer".to_string(),
        LayerType::Video => "Video Layer".to_string(),
        LayerType::Text => match options.text.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => "Text Layer".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::TimeRange;

    fn layer_at(x: f64, y: f64, z_index: i64) -> Layer {
        Layer {
            id: format!("{x}-{y}-{z_index}"),
            layer_type: LayerType::Image,
            name: "Image Layer".into(),
            z_index,
            timeline: TimeRange::new(0.0, 5.0),
            geometry: Geometry {
                x,
                y,
                width: 0.3,
                height: 0.3,
            },
            options: LayerOptions::image("a.png"),
        }
    }

    #[test]
    fn test_empty_project_places_at_start() {
        let (x, y) = safe_position(&[], 0.3, 0.3);
        assert_eq!((x, y), (0.1, 0.1));
    }

    #[test]
    fn test_occupied_start_shifts_once() {
        let layers = vec![layer_at(0.1, 0.1, 1)];
        let (x, y) = safe_position(&layers, 0.3, 0.3);
        assert!((x - 0.15).abs() < 1e-9);
        assert!((y - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_wraps_axis_that_would_overflow() {
        // Text width 0.4: the x axis wraps at 0.65, the y axis (0.15) keeps going.
        let mut layers = Vec::new();
        let mut placed = Vec::new();
        for _ in 0..12 {
            let g = place(&layers, LayerType::Text);
            placed.push((g.x, g.y));
            let mut l = layer_at(g.x, g.y, layers.len() as i64 + 1);
            l.geometry = g;
            layers.push(l);
        }
        assert!(placed.iter().all(|(x, _)| x + 0.4 <= 1.0 + 1e-9));
        assert!(placed.iter().all(|(_, y)| y + 0.15 <= 1.0 + 1e-9));
    }

    #[test]
    fn test_distinct_positions_within_attempt_budget() {
        let mut layers: Vec<Layer> = Vec::new();
        for i in 0..10 {
            let g = place(&layers, LayerType::Image);
            let mut l = layer_at(g.x, g.y, i + 1);
            l.geometry = g;
            layers.push(l);
        }
        for (i, a) in layers.iter().enumerate() {
            for b in &layers[i + 1..] {
                let same = (a.geometry.x - b.geometry.x).abs() < 1e-9
                    && (a.geometry.y - b.geometry.y).abs() < 1e-9;
                assert!(!same, "two layers share ({}, {})", a.geometry.x, a.geometry.y);
            }
        }
    }

    #[test]
    fn test_exhausted_search_accepts_last_candidate() {
        // Every diagonal slot the search can visit is taken.
        let mut layers = Vec::new();
        let mut x = 0.1;
        let mut y = 0.1;
        for i in 0..20 {
            layers.push(layer_at(x, y, i));
            x += 0.05;
            y += 0.05;
            if x + 0.3 > 1.0 {
                x = 0.1;
            }
            if y + 0.3 > 1.0 {
                y = 0.1;
            }
        }
        let (px, py) = safe_position(&layers, 0.3, 0.3);
        let collides = layers.iter().any(|l| {
            (l.geometry.x - px).abs() < 0.01 && (l.geometry.y - py).abs() < 0.01
        });
        assert!(collides);
    }

    #[test]
    fn test_next_z_index() {
        assert_eq!(next_z_index(&[]), 1);
        let layers = vec![layer_at(0.1, 0.1, 3), layer_at(0.2, 0.2, 7)];
        assert_eq!(next_z_index(&layers), 8);
    }

    #[test]
    fn test_default_names() {
        assert_eq!(default_name(LayerType::Video, &LayerOptions::default()), "Video Layer");
        let text = LayerOptions {
            text: Some("Hello".into()),
            ..Default::default()
        };
        assert_eq!(default_name(LayerType::Text, &text), "Hello");
        assert_eq!(default_name(LayerType::Text, &LayerOptions::default()), "Text Layer");
    }
}
