/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! sRGB <-> CIE L*a*b* conversions
//!
//! Conversions go through CIE XYZ with a D65 reference white.
//! Device RGB is on the `0..=255` scale, L is in `0..=100` and a/b
//! are signed and unbounded. Nothing is clamped here, out of gamut
//! results are clamped when they are packed into a destination encoding.
#![allow(clippy::excessive_precision)]

use prism_core::options::LabExponent;

/// D65 reference white, scaled so that Y is 100
pub const D65_WHITE: [f32; 3] = [95.047, 100.000, 108.883];

/// Offset of the linear segment of the Lab companding curve
pub const LAB_OFFSET: f32 = 16.0 / 116.0;

/// Below this normalized XYZ value the Lab curve is linear
pub const LAB_EPSILON: f32 = 0.008856;

const LAB_SLOPE: f32 = 7.787;

const SRGB_DECODE_THRESHOLD: f32 = 0.04045;

const SRGB_ENCODE_THRESHOLD: f32 = 0.0031308;

const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505]
];

const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.2406, -1.5372, -0.4986],
    [-0.9689, 1.8758, 0.0415],
    [0.0557, -0.2040, 1.0570]
];

#[inline]
/// Linear transfer function for sRGB
pub fn srgb_to_linear(gamma: f32) -> f32 {
    if gamma > SRGB_DECODE_THRESHOLD {
        ((gamma + 0.055) / 1.055).powf(2.4)
    } else {
        gamma / 12.92
    }
}

#[inline]
/// Gamma transfer function for sRGB
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear > SRGB_ENCODE_THRESHOLD {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * linear
    }
}

#[inline]
/// Forward Lab companding of a white normalized XYZ component
pub fn lab_forward(value: f32, exponent: f32) -> f32 {
    if value > LAB_EPSILON {
        value.powf(exponent)
    } else {
        LAB_SLOPE * value + LAB_OFFSET
    }
}

#[inline]
/// Inverse of [`lab_forward`]
pub fn lab_inverse(value: f32) -> f32 {
    let cube = value * value * value;

    if cube > LAB_EPSILON {
        cube
    } else {
        (value - LAB_OFFSET) / LAB_SLOPE
    }
}

#[inline(always)]
fn mul_matrix(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2]
    ]
}

/// RGB <-> Lab converter
///
/// # Example
/// ```
/// use prism_core::options::LabExponent;
/// use prism_image::lab::LabTransform;
///
/// let transform = LabTransform::new(LabExponent::Exact);
/// let [l, a, b] = transform.rgb_to_lab([255.0, 255.0, 255.0]);
///
/// assert!((l - 100.0).abs() < 0.5);
/// assert!(a.abs() < 0.5 && b.abs() < 0.5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LabTransform {
    exponent: f32
}

impl LabTransform {
    pub fn new(exponent: LabExponent) -> LabTransform {
        LabTransform {
            exponent: exponent.value()
        }
    }

    /// The exponent used by the forward companding curve
    pub const fn exponent(&self) -> f32 {
        self.exponent
    }

    /// Convert a `0..=255` device RGB triple to Lab
    pub fn rgb_to_lab(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.normalized_rgb_to_lab(rgb.map(|x| x / 255.0))
    }

    /// Convert Lab to a `0..=255` device RGB triple
    ///
    /// The result is not clamped, Lab values outside the sRGB gamut
    /// give values outside `0..=255`.
    pub fn lab_to_rgb(&self, lab: [f32; 3]) -> [f32; 3] {
        self.lab_to_normalized_rgb(lab).map(|x| x * 255.0)
    }

    /// Convert RGB in the `0..=1` range to Lab
    pub fn normalized_rgb_to_lab(&self, rgb: [f32; 3]) -> [f32; 3] {
        let linear = rgb.map(|x| srgb_to_linear(x) * 100.0);
        let xyz = mul_matrix(&RGB_TO_XYZ, linear);

        let fx = lab_forward(xyz[0] / D65_WHITE[0], self.exponent);
        let fy = lab_forward(xyz[1] / D65_WHITE[1], self.exponent);
        let fz = lab_forward(xyz[2] / D65_WHITE[2], self.exponent);

        [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
    }

    /// Convert Lab to RGB in the `0..=1` range, unclamped
    pub fn lab_to_normalized_rgb(&self, lab: [f32; 3]) -> [f32; 3] {
        let [l, a, b] = lab;

        let fy = (l + 16.0) / 116.0;
        let fx = a / 500.0 + fy;
        let fz = fy - b / 200.0;

        let xyz = [
            lab_inverse(fx) * D65_WHITE[0] / 100.0,
            lab_inverse(fy) * D65_WHITE[1] / 100.0,
            lab_inverse(fz) * D65_WHITE[2] / 100.0
        ];

        mul_matrix(&XYZ_TO_RGB, xyz).map(linear_to_srgb)
    }
}

impl Default for LabTransform {
    fn default() -> Self {
        LabTransform::new(LabExponent::default())
    }
}

#[cfg(test)]
mod tests {
    use nanorand::{Rng, WyRand};
    use prism_core::options::LabExponent;

    use crate::lab::*;

    #[test]
    fn test_srgb_threshold() {
        assert_eq!(srgb_to_linear(0.0404), 0.0404_f32 / 12.92);
        assert_eq!(
            srgb_to_linear(0.0405),
            ((0.0405_f32 + 0.055) / 1.055).powf(2.4)
        );
    }

    #[test]
    fn test_srgb_encode_threshold() {
        assert_eq!(linear_to_srgb(0.0031), 12.92_f32 * 0.0031);
        assert_eq!(
            linear_to_srgb(0.0032),
            1.055 * 0.0032_f32.powf(1.0 / 2.4) - 0.055
        );
    }

    #[test]
    fn test_lab_threshold() {
        let exponent = LabExponent::Exact.value();

        assert_eq!(
            lab_forward(0.008855, exponent),
            7.787_f32 * 0.008855 + 16.0 / 116.0
        );
        assert_eq!(lab_forward(0.008857, exponent), 0.008857_f32.powf(exponent));
    }

    #[test]
    fn test_lab_inverse_linear_segment() {
        // 0.2 cubed is 0.008, below epsilon
        assert_eq!(lab_inverse(0.2), (0.2_f32 - LAB_OFFSET) / 7.787);
        assert_eq!(lab_inverse(0.5), 0.125);
    }

    #[test]
    fn test_black() {
        let transform = LabTransform::default();
        let [l, a, b] = transform.rgb_to_lab([0.0; 3]);

        assert!(l.abs() < 0.5, "{l}");
        assert!(a.abs() < 0.5, "{a}");
        assert!(b.abs() < 0.5, "{b}");
    }

    #[test]
    fn test_random_round_trip() {
        let transform = LabTransform::new(LabExponent::Exact);
        let mut rand = WyRand::new_seed(0x5eed);

        for _ in 0..100 {
            let rgb = [
                f32::from(rand.generate::<u8>()),
                f32::from(rand.generate::<u8>()),
                f32::from(rand.generate::<u8>())
            ];
            let back = transform.lab_to_rgb(transform.rgb_to_lab(rgb));

            for (a, b) in rgb.iter().zip(back.iter()) {
                assert!((a - b).abs() <= 1.0, "{rgb:?} became {back:?}");
            }
        }
    }

    #[test]
    fn test_out_of_gamut_is_unclamped() {
        let transform = LabTransform::default();
        let rgb = transform.lab_to_rgb([50.0, 300.0, 300.0]);

        assert!(rgb.iter().any(|x| *x > 255.0 || *x < 0.0), "{rgb:?}");
    }

    #[test]
    fn test_legacy_exponent_differs() {
        let exact = LabTransform::new(LabExponent::Exact);
        let legacy = LabTransform::new(LabExponent::Legacy);
        let rgb = [200.0, 100.0, 50.0];

        assert_ne!(exact.rgb_to_lab(rgb), legacy.rgb_to_lab(rgb));
    }
}
