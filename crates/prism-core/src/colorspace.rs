/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image Colorspace information and manipulation utilities.
//!
//! A colorspace here is the pixel layout, i.e the ordered
//! channel roles making up a pixel, plus the color model those channels live in.

use crate::bit_depth::BitDepth;
use crate::errors::ConfigError;

/// All possible image colorspaces
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ColorSpace {
    /// Grayscale colorspace
    Luma,
    /// Grayscale with alpha colorspace
    LumaA,
    /// Red, Green , Blue
    RGB,
    /// Red, Green, Blue, Alpha
    RGBA,
    /// Cyan , Magenta, Yellow, Black
    ///
    /// Stored inverted, the way Adobe applications write it,
    /// i.e a value of max means no ink.
    CMYK,
    /// CIE L*a*b*, D65 white point
    ///
    /// L is in `0..=100`, a and b are unbounded signed
    /// opponent axes. Only `f32` channels can store it.
    Lab,
    /// CIE L*a*b* with an alpha channel
    LabA,
    /// Multiple arbitrary image channels.
    ///
    /// Multi-band images are assumed to be n-channel device images with no alpha,
    /// they can only be converted to a multi-band layout of the same arity
    MultiBand(core::num::NonZeroU32),
    /// The colorspace is unknown
    Unknown
}

/// The class of color model a layout belongs to
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ColorModel {
    /// Channels map near-linearly to display primaries after gamma decoding
    DeviceLinear,
    /// Numeric distance approximates perceived color difference
    Perceptual
}

/// How one layout is converted into another
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConversionKind {
    /// The layouts are the same, only the encoding may change
    Identity,
    /// Same color model, a per-channel mapping suffices
    Direct,
    /// The color models differ and RGB <-> Lab must run
    Transform
}

impl ColorSpace {
    /// Number of color channels present for a certain colorspace
    ///
    /// E.g. RGB returns 3 since it contains R,G and B colors to make up a pixel
    pub const fn num_components(&self) -> usize {
        match self {
            Self::RGB | Self::Lab => 3,
            Self::RGBA | Self::CMYK | Self::LabA => 4,
            Self::Luma => 1,
            Self::LumaA => 2,
            Self::Unknown => 0,
            Self::MultiBand(n) => n.get() as usize
        }
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::RGBA | Self::LumaA | Self::LabA)
    }

    /// Returns the position of the alpha channel in a pixel
    ///
    /// If the colorspace doesn't have an alpha channel returns `None`
    pub const fn alpha_position(&self) -> Option<usize> {
        match self {
            ColorSpace::RGBA => Some(3),
            ColorSpace::LumaA => Some(1),
            ColorSpace::LabA => Some(3),
            _ => None
        }
    }

    /// The color model of this layout
    ///
    /// Returns `None` for [`ColorSpace::Unknown`]
    pub const fn model(&self) -> Option<ColorModel> {
        match self {
            Self::Lab | Self::LabA => Some(ColorModel::Perceptual),
            Self::Unknown => None,
            _ => Some(ColorModel::DeviceLinear)
        }
    }

    /// Return true if the layout can be turned into RGB
    /// with a per-pixel channel mapping
    pub const fn reaches_rgb(&self) -> bool {
        matches!(
            self,
            Self::Luma | Self::LumaA | Self::RGB | Self::RGBA | Self::CMYK
        )
    }

    /// The default layout of a device image with `count` channels
    ///
    /// # Example
    /// ```
    /// use prism_core::colorspace::ColorSpace;
    /// assert_eq!(ColorSpace::from_channel_count(3), Some(ColorSpace::RGB));
    /// assert_eq!(ColorSpace::from_channel_count(2), None);
    /// ```
    pub const fn from_channel_count(count: usize) -> Option<ColorSpace> {
        match count {
            1 => Some(Self::Luma),
            3 => Some(Self::RGB),
            4 => Some(Self::RGBA),
            _ => None
        }
    }

    /// Check that samples of `depth` can store this layout
    ///
    /// Perceptual layouts need `f32` samples, their values are not normalized.
    pub fn check_depth(&self, depth: BitDepth) -> Result<(), ConfigError> {
        if *self == Self::Unknown {
            return Err(ConfigError::UnsupportedLayoutPair(*self, *self));
        }
        if self.model() == Some(ColorModel::Perceptual) && depth != BitDepth::Float32 {
            return Err(ConfigError::PerceptualDepth(*self, depth));
        }
        Ok(())
    }
}

/// Decide how pixels in `from` are converted to `to`
///
/// # Returns
/// - `Identity` if both layouts are the same
/// - `Direct` if both share a color model and a per-channel mapping exists
/// - `Transform` between an RGB reachable device layout and Lab
///
/// # Errors
/// - Two perceptual layouts of differing arity
/// - Layouts with no mapping, e.g multi-band to RGB or anything involving `Unknown`
///
/// # Example
/// ```
/// use prism_core::colorspace::{conversion_kind, ColorSpace, ConversionKind};
/// assert_eq!(conversion_kind(ColorSpace::RGB, ColorSpace::RGBA), Ok(ConversionKind::Direct));
/// assert_eq!(conversion_kind(ColorSpace::RGB, ColorSpace::Lab), Ok(ConversionKind::Transform));
/// assert!(conversion_kind(ColorSpace::Lab, ColorSpace::LabA).is_err());
/// ```
pub fn conversion_kind(from: ColorSpace, to: ColorSpace) -> Result<ConversionKind, ConfigError> {
    let (from_model, to_model) = match (from.model(), to.model()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(ConfigError::UnsupportedLayoutPair(from, to))
    };

    if from == to {
        return Ok(ConversionKind::Identity);
    }

    match (from_model, to_model) {
        (ColorModel::Perceptual, ColorModel::Perceptual) => {
            // Lab and LabA are the only perceptual layouts, and they differ
            Err(ConfigError::PerceptualArityMismatch(from, to))
        }
        (ColorModel::DeviceLinear, ColorModel::DeviceLinear) => {
            if let (ColorSpace::MultiBand(_), _) | (_, ColorSpace::MultiBand(_)) = (from, to) {
                // same arity multi-band images compare equal above
                return Err(ConfigError::UnsupportedLayoutPair(from, to));
            }
            Ok(ConversionKind::Direct)
        }
        (ColorModel::DeviceLinear, ColorModel::Perceptual) if from.reaches_rgb() => {
            Ok(ConversionKind::Transform)
        }
        (ColorModel::Perceptual, ColorModel::DeviceLinear) if to.reaches_rgb() => {
            Ok(ConversionKind::Transform)
        }
        _ => Err(ConfigError::UnsupportedLayoutPair(from, to))
    }
}

/// Encapsulates all colorspaces supported by
/// the library
///
/// This explicitly leaves out multi-band images
pub static ALL_COLORSPACES: [ColorSpace; 7] = [
    ColorSpace::Luma,
    ColorSpace::LumaA,
    ColorSpace::RGB,
    ColorSpace::RGBA,
    ColorSpace::CMYK,
    ColorSpace::Lab,
    ColorSpace::LabA
];

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;

    use super::*;

    #[test]
    fn test_arity() {
        for colorspace in ALL_COLORSPACES {
            let alpha = colorspace.alpha_position();
            assert_eq!(alpha.is_some(), colorspace.has_alpha());
            if let Some(pos) = alpha {
                assert!(pos < colorspace.num_components());
            }
        }
    }

    #[test]
    fn test_identity_for_all() {
        for colorspace in ALL_COLORSPACES {
            assert_eq!(
                conversion_kind(colorspace, colorspace),
                Ok(ConversionKind::Identity)
            );
        }
    }

    #[test]
    fn test_device_pairs_are_direct() {
        for from in ALL_COLORSPACES {
            for to in ALL_COLORSPACES {
                if from == to || from.model() != to.model() {
                    continue;
                }
                if from.model() == Some(ColorModel::DeviceLinear) {
                    assert_eq!(conversion_kind(from, to), Ok(ConversionKind::Direct));
                }
            }
        }
    }

    #[test]
    fn test_perceptual_arity_mismatch() {
        assert_eq!(
            conversion_kind(ColorSpace::Lab, ColorSpace::LabA),
            Err(ConfigError::PerceptualArityMismatch(
                ColorSpace::Lab,
                ColorSpace::LabA
            ))
        );
        assert!(conversion_kind(ColorSpace::LabA, ColorSpace::Lab).is_err());
    }

    #[test]
    fn test_multiband() {
        let five = ColorSpace::MultiBand(NonZeroU32::new(5).unwrap());
        let six = ColorSpace::MultiBand(NonZeroU32::new(6).unwrap());

        assert_eq!(conversion_kind(five, five), Ok(ConversionKind::Identity));
        assert!(conversion_kind(five, six).is_err());
        assert!(conversion_kind(five, ColorSpace::RGB).is_err());
        assert!(conversion_kind(five, ColorSpace::Lab).is_err());
    }

    #[test]
    fn test_unknown_rejected() {
        assert!(conversion_kind(ColorSpace::Unknown, ColorSpace::Unknown).is_err());
        assert!(conversion_kind(ColorSpace::RGB, ColorSpace::Unknown).is_err());
    }

    #[test]
    fn test_lab_requires_float() {
        assert!(ColorSpace::Lab.check_depth(BitDepth::Float32).is_ok());
        assert!(ColorSpace::Lab.check_depth(BitDepth::Eight).is_err());
        assert!(ColorSpace::LabA.check_depth(BitDepth::Float16).is_err());
        assert!(ColorSpace::RGB.check_depth(BitDepth::Float16).is_ok());
    }
}
