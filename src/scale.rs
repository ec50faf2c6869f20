// src/scale.rs

use crate::pivot::ValueRange;
use image::Rgb;
use palette::{LinSrgb, Srgb};

/// Where a value sits on a three-stop low/mid/high scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    Mid,
    High,
    /// Every value in the range is the same.
    Uniform,
}

const UNIFORM_GRAY: Rgb<u8> = Rgb([200, 200, 200]);

/// Maps values of a [`ValueRange`] to colours: low=red, mid=yellow, high=green.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    range: ValueRange,
}

impl ColorScale {
    pub fn new(range: ValueRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    /// Position of `value` in the range, clamped to `[0, 1]`; `None` for a
    /// uniform range.
    pub fn ratio(&self, value: f64) -> Option<f64> {
        if self.range.is_uniform() || !self.range.span().is_finite() {
            return None;
        }
        Some(((value - self.range.min) / self.range.span()).clamp(0.0, 1.0))
    }

    pub fn band(&self, value: f64) -> Band {
        match self.ratio(value) {
            None => Band::Uniform,
            Some(r) if r >= 0.66 => Band::High,
            Some(r) if r >= 0.33 => Band::Mid,
            Some(_) => Band::Low,
        }
    }

    pub fn color(&self, value: f64) -> Rgb<u8> {
        match self.ratio(value) {
            Some(r) => gradient(r as f32),
            None => UNIFORM_GRAY,
        }
    }
}

// Red -> yellow -> green, interpolated in linear light
fn gradient(t: f32) -> Rgb<u8> {
    let stops: [LinSrgb<f32>; 3] = [
        Srgb::new(0.937f32, 0.267f32, 0.267f32).into_linear(), // #ef4444
        Srgb::new(0.961f32, 0.620f32, 0.043f32).into_linear(), // #f59e0b
        Srgb::new(0.086f32, 0.639f32, 0.290f32).into_linear(), // #16a34a
    ];

    let scaled_pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
    let idx1 = scaled_pos.floor() as usize;
    let idx2 = (idx1 + 1).min(stops.len() - 1);
    let t = scaled_pos - idx1 as f32;

    let c1 = stops[idx1];
    let c2 = stops[idx2];
    let mixed = LinSrgb::new(
        c1.red + (c2.red - c1.red) * t,
        c1.green + (c2.green - c1.green) * t,
        c1.blue + (c2.blue - c1.blue) * t,
    );

    let (r, g, b) = Srgb::from_linear(mixed).into_components();
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
