/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image bit depth, information and manipulations
//!
//! The library associates every bit depth with a native representation,
//! the following mapping indicates the types and range
//!
//!|BitDepth          |native type        |range      |
//!|------------------|-------------------|-----------|
//!|BitDepth::Eight   | [`u8`]            |0   - 255  |
//!|BitDepth::Sixteen | [`u16`]           |0   - 65535|
//!|BitDepth::Float16 | [`half::f16`]     |0.0 - 1.0  |
//!|BitDepth::Float32 | [`f32`]           |0.0 - 1.0  |

/// The image bit depth.
///
/// This is the channel encoding, i.e how a single sample of a pixel
/// is stored.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
#[non_exhaustive]
pub enum BitDepth {
    /// Eight bit depth.
    ///
    /// Images with such bit depth use [`u8`] to store
    /// pixels and use the whole range from 0-255.
    Eight,
    /// Sixteen bit depth
    ///
    /// Images with such bit depths use [`u16`] to store values and use the whole range
    /// i.e 0-65535
    ///
    /// Data is stored and processed in native endian.
    Sixteen,
    /// Half precision floating point.
    ///
    /// Stored as [`half::f16`], nominal range is 0.0 to 1.0.
    /// Only 11 bits of mantissa are available, so conversions from
    /// sixteen bit integers are lossy.
    Float16,
    /// Single precision floating point
    ///
    /// Nominal range is 0.0 to 1.0, values outside it are kept as is
    /// until they are converted to an integer depth.
    Float32,
    /// Bit depth information is unknown
    #[default]
    Unknown
}

/// The underlying bit representation of the image
///
/// This represents the minimum rust type that
/// can be used to represent image data.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum BitType {
    U8,
    U16,
    F16,
    F32
}

impl BitType {
    /// Number of bytes a single sample of this type occupies
    pub const fn size_of(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::F32 => 4
        }
    }
}

impl BitDepth {
    /// Get the max value supported by the bit depth
    ///
    /// For floating point depths this is the nominal maximum, `1.0`
    ///
    /// # Example
    /// ```
    /// use prism_core::bit_depth::BitDepth;
    /// assert_eq!(BitDepth::Eight.max_value(), 255.0);
    /// assert_eq!(BitDepth::Float32.max_value(), 1.0);
    /// ```
    pub const fn max_value(self) -> f32 {
        match self {
            Self::Eight => 255.0,
            Self::Sixteen => 65535.0,
            Self::Float16 | Self::Float32 => 1.0,
            Self::Unknown => 0.0
        }
    }

    /// Return the rust type used to store samples of this depth
    ///
    /// Returns `None` for [`BitDepth::Unknown`]
    ///
    /// # Example
    ///
    /// ```
    /// use prism_core::bit_depth::{BitDepth, BitType};
    /// assert_eq!(BitDepth::Eight.bit_type(), Some(BitType::U8));
    /// assert_eq!(BitDepth::Unknown.bit_type(), None);
    /// ```
    pub const fn bit_type(self) -> Option<BitType> {
        match self {
            Self::Eight => Some(BitType::U8),
            Self::Sixteen => Some(BitType::U16),
            Self::Float16 => Some(BitType::F16),
            Self::Float32 => Some(BitType::F32),
            Self::Unknown => None
        }
    }

    /// Get the number of bytes needed to store a single sample of this depth
    ///
    /// Unknown depths take zero bytes
    ///
    /// ```
    /// use prism_core::bit_depth::BitDepth;
    /// assert_eq!(BitDepth::Sixteen.size_of(), 2);
    /// assert_eq!(BitDepth::Float32.size_of(), 4);
    /// ```
    pub const fn size_of(self) -> usize {
        match self.bit_type() {
            Some(ty) => ty.size_of(),
            None => 0
        }
    }
}

/// Sample formats a source may report for its raw data
///
/// Integer classes are read as unsigned full range samples,
/// signed and unsigned variants of the same width share a class.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum BitDepthClass {
    Int8,
    Int16,
    Half16,
    Int32,
    Int64,
    Float32,
    Float64
}

impl BitDepthClass {
    /// Width of one raw sample in bytes, as delivered by a source
    pub const fn raw_size(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 | Self::Half16 => 2,
            Self::Int32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 => 8
        }
    }

    /// The depth a buffer holding samples of this class uses
    ///
    /// - 8 bit integers stay 8 bit
    /// - half floats and 16 bit integers become 16 bit integers
    /// - everything wider becomes 32 bit floats
    pub const fn buffer_depth(self) -> BitDepth {
        match self {
            Self::Int8 => BitDepth::Eight,
            Self::Int16 | Self::Half16 => BitDepth::Sixteen,
            Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64 => BitDepth::Float32
        }
    }
}
