/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Configuration errors
//!
//! These are raised when a conversion is set up, never while
//! samples are being converted.
use core::fmt::{Debug, Display, Formatter};

use crate::bit_depth::BitDepth;
use crate::colorspace::ColorSpace;

/// Errors raised when an encoding or layout combination cannot be converted
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum ConfigError {
    /// The bit depth has no pack/unpack entry in the registry
    UnsupportedDepth(BitDepth),
    /// No conversion exists between the two bit depths
    UnsupportedDepthPair(BitDepth, BitDepth),
    /// No conversion exists between the two layouts
    UnsupportedLayoutPair(ColorSpace, ColorSpace),
    /// Two perceptual layouts with a different number of channels
    PerceptualArityMismatch(ColorSpace, ColorSpace),
    /// A perceptual layout was paired with an encoding other than `f32`
    PerceptualDepth(ColorSpace, BitDepth)
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::UnsupportedDepth(depth) => {
                writeln!(f, "Bit depth {depth:?} has no registered channel conversion")
            }
            ConfigError::UnsupportedDepthPair(from, to) => {
                writeln!(f, "Unsupported channel conversion from {from:?} to {to:?}")
            }
            ConfigError::UnsupportedLayoutPair(from, to) => {
                writeln!(f, "Unsupported/unknown mapping from {from:?} to {to:?}")
            }
            ConfigError::PerceptualArityMismatch(from, to) => {
                writeln!(
                    f,
                    "Cannot map perceptual layout {from:?} ({} channels) to {to:?} ({} channels)",
                    from.num_components(),
                    to.num_components()
                )
            }
            ConfigError::PerceptualDepth(colorspace, depth) => {
                writeln!(
                    f,
                    "Colorspace {colorspace:?} requires Float32 channels but {depth:?} was requested"
                )
            }
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl core::error::Error for ConfigError {}
