/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Channel sample conversions
//!
//! Every supported encoding knows how to `unpack` a sample into the
//! normalized `0.0..=1.0` domain and how to `pack` a normalized value back.
//! Converting between two encodings is then a single routine, unpack from the source
//! and pack into the destination, instead of one routine per pair of encodings.
//!
//! Two flavours exist
//!
//! - The [`Sample`] trait, for when the types are known at compile time.
//! - The [`ChannelRegistry`], a read-only table of pack/unpack functions keyed by
//!   [`BitType`], for when the encoding is only known at run time.
//!
//! Packing into integer encodings rounds to nearest (`value * max + 0.5`, truncated)
//! and clamps to the representable range, `NaN` packs to zero.
//! Packing into floats keeps the value as is.
use half::f16;

use crate::bit_depth::{BitDepth, BitType};
use crate::errors::ConfigError;

/// A channel sample type with a fixed encoding
pub trait Sample: Copy + Default + bytemuck::Pod + 'static {
    /// The bit depth this sample encodes
    const DEPTH: BitDepth;

    /// Map the sample to the normalized domain
    fn unpack(self) -> f32;

    /// Map a normalized value to this sample type
    fn pack(value: f32) -> Self;
}

impl Sample for u8 {
    const DEPTH: BitDepth = BitDepth::Eight;

    #[inline(always)]
    fn unpack(self) -> f32 {
        f32::from(self) / 255.0
    }

    #[inline(always)]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn pack(value: f32) -> Self {
        // `as` saturates and maps NaN to zero
        (value * 255.0 + 0.5).clamp(0.0, 255.0) as u8
    }
}

impl Sample for u16 {
    const DEPTH: BitDepth = BitDepth::Sixteen;

    #[inline(always)]
    fn unpack(self) -> f32 {
        f32::from(self) / 65535.0
    }

    #[inline(always)]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn pack(value: f32) -> Self {
        (value * 65535.0 + 0.5).clamp(0.0, 65535.0) as u16
    }
}

impl Sample for f16 {
    const DEPTH: BitDepth = BitDepth::Float16;

    #[inline(always)]
    fn unpack(self) -> f32 {
        self.to_f32()
    }

    #[inline(always)]
    fn pack(value: f32) -> Self {
        f16::from_f32(value)
    }
}

impl Sample for f32 {
    const DEPTH: BitDepth = BitDepth::Float32;

    #[inline(always)]
    fn unpack(self) -> f32 {
        self
    }

    #[inline(always)]
    fn pack(value: f32) -> Self {
        value
    }
}

/// Convert a single sample from one encoding to another
///
/// Converting a type to itself returns the input untouched.
///
/// # Example
/// ```
/// use prism_core::sample::convert;
///
/// let value: f32 = convert(255_u8);
/// assert_eq!(value, 1.0);
///
/// let back: u8 = convert(value);
/// assert_eq!(back, 255);
/// ```
#[inline]
pub fn convert<S: Sample, D: Sample>(value: S) -> D {
    if S::DEPTH == D::DEPTH {
        // same type, so same size
        return bytemuck::cast(value);
    }
    D::pack(value.unpack())
}

/// Convert a slice of samples from one encoding to another
///
/// Only `min(from.len(), to.len())` samples are converted
///
/// # Example
/// ```
/// use prism_core::sample::convert_slice;
///
/// let mut out = [0_u16; 2];
/// convert_slice(&[0_u8, 255], &mut out);
/// assert_eq!(out, [0, 65535]);
/// ```
pub fn convert_slice<S: Sample, D: Sample>(from: &[S], to: &mut [D]) {
    if S::DEPTH == D::DEPTH {
        let from: &[D] = bytemuck::cast_slice(from);
        let len = from.len().min(to.len());
        to[..len].copy_from_slice(&from[..len]);
        return;
    }
    for (src, dst) in from.iter().zip(to.iter_mut()) {
        *dst = D::pack(src.unpack());
    }
}

/// A single channel value tagged with its encoding
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChannelValue {
    U8(u8),
    U16(u16),
    F16(f16),
    F32(f32)
}

impl ChannelValue {
    /// The encoding of this value
    pub const fn depth(self) -> BitDepth {
        match self {
            Self::U8(_) => BitDepth::Eight,
            Self::U16(_) => BitDepth::Sixteen,
            Self::F16(_) => BitDepth::Float16,
            Self::F32(_) => BitDepth::Float32
        }
    }

    /// Map the value to the normalized domain
    pub fn normalized(self) -> f32 {
        match self {
            Self::U8(v) => v.unpack(),
            Self::U16(v) => v.unpack(),
            Self::F16(v) => v.unpack(),
            Self::F32(v) => v.unpack()
        }
    }

    /// Create a value of the given depth from a normalized value
    pub fn from_normalized(depth: BitDepth, value: f32) -> Result<ChannelValue, ConfigError> {
        match depth.bit_type() {
            Some(BitType::U8) => Ok(Self::U8(u8::pack(value))),
            Some(BitType::U16) => Ok(Self::U16(u16::pack(value))),
            Some(BitType::F16) => Ok(Self::F16(f16::pack(value))),
            Some(BitType::F32) => Ok(Self::F32(value)),
            _ => Err(ConfigError::UnsupportedDepth(depth))
        }
    }
}

/// Pack/unpack functions for one encoding
///
/// The functions work on native endian bytes of exactly
/// `size` length and do not require any alignment.
#[derive(Copy, Clone, Debug)]
pub struct ChannelEntry {
    pub bit_type: BitType,
    pub size:     usize,
    pub unpack:   fn(&[u8]) -> f32,
    pub pack:     fn(f32, &mut [u8])
}

fn unpack_bytes<T: Sample>(bytes: &[u8]) -> f32 {
    bytemuck::pod_read_unaligned::<T>(bytes).unpack()
}

fn pack_bytes<T: Sample>(value: f32, bytes: &mut [u8]) {
    bytes.copy_from_slice(bytemuck::bytes_of(&T::pack(value)));
}

const fn entry<T: Sample>(bit_type: BitType) -> ChannelEntry {
    ChannelEntry {
        bit_type,
        size: bit_type.size_of(),
        unpack: unpack_bytes::<T>,
        pack: pack_bytes::<T>
    }
}

/// Read-only table of every supported channel encoding
///
/// The table is built from constant data, so a process wide instance,
/// [`CHANNEL_REGISTRY`], can be shared freely between threads.
pub struct ChannelRegistry {
    entries: [ChannelEntry; 4]
}

/// The standard registry with `u8`, `u16`, `f16` and `f32` entries
pub static CHANNEL_REGISTRY: ChannelRegistry = ChannelRegistry::new();

impl ChannelRegistry {
    /// Create a registry containing every supported encoding
    pub const fn new() -> ChannelRegistry {
        ChannelRegistry {
            entries: [
                entry::<u8>(BitType::U8),
                entry::<u16>(BitType::U16),
                entry::<f16>(BitType::F16),
                entry::<f32>(BitType::F32)
            ]
        }
    }

    /// Look up the pack/unpack entry of a bit depth
    pub fn entry(&self, depth: BitDepth) -> Result<&ChannelEntry, ConfigError> {
        let bit_type = depth
            .bit_type()
            .ok_or(ConfigError::UnsupportedDepth(depth))?;

        self.entries
            .iter()
            .find(|x| x.bit_type == bit_type)
            .ok_or(ConfigError::UnsupportedDepth(depth))
    }

    /// Resolve a converter between two encodings
    ///
    /// This is where unsupported pairs are rejected, the returned
    /// converter cannot fail.
    pub fn converter(&self, from: BitDepth, to: BitDepth) -> Result<SampleConverter, ConfigError> {
        let (src, dst) = match (self.entry(from), self.entry(to)) {
            (Ok(src), Ok(dst)) => (*src, *dst),
            _ => return Err(ConfigError::UnsupportedDepthPair(from, to))
        };
        Ok(SampleConverter { from: src, to: dst })
    }

    /// Convert a single value to another encoding
    ///
    /// # Example
    /// ```
    /// use prism_core::bit_depth::BitDepth;
    /// use prism_core::sample::{ChannelValue, CHANNEL_REGISTRY};
    ///
    /// let value = CHANNEL_REGISTRY
    ///     .convert(ChannelValue::U8(255), BitDepth::Sixteen)
    ///     .unwrap();
    /// assert_eq!(value, ChannelValue::U16(65535));
    /// ```
    pub fn convert(&self, value: ChannelValue, to: BitDepth) -> Result<ChannelValue, ConfigError> {
        let from = value.depth();
        // validate the pair even for identity conversions
        self.converter(from, to)?;

        if from == to {
            return Ok(value);
        }
        ChannelValue::from_normalized(to, value.normalized())
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A resolved conversion between two encodings
#[derive(Copy, Clone, Debug)]
pub struct SampleConverter {
    from: ChannelEntry,
    to:   ChannelEntry
}

impl SampleConverter {
    pub fn is_identity(&self) -> bool {
        self.from.bit_type == self.to.bit_type
    }

    /// Read one sample from `bytes` as a normalized value
    #[inline]
    pub fn unpack(&self, bytes: &[u8]) -> f32 {
        (self.from.unpack)(bytes)
    }

    /// Write one normalized value into `bytes`
    #[inline]
    pub fn pack(&self, value: f32, bytes: &mut [u8]) {
        (self.to.pack)(value, bytes)
    }

    /// Convert native endian samples in `from` into `to`
    ///
    /// The number of samples converted is bounded by whichever slice
    /// runs out first.
    pub fn convert_bytes(&self, from: &[u8], to: &mut [u8]) {
        if self.is_identity() {
            let len = from.len().min(to.len());
            to[..len].copy_from_slice(&from[..len]);
            return;
        }
        for (src, dst) in from
            .chunks_exact(self.from.size)
            .zip(to.chunks_exact_mut(self.to.size))
        {
            self.pack(self.unpack(src), dst);
        }
    }
}

#[cfg(test)]
mod tests {
    use half::f16;

    use super::*;

    #[test]
    fn test_identity_u8() {
        for i in 0..=255_u8 {
            assert_eq!(convert::<u8, u8>(i), i);
        }
    }

    #[test]
    fn test_identity_u16() {
        for i in 0..=u16::MAX {
            assert_eq!(convert::<u16, u16>(i), i);
        }
    }

    #[test]
    fn test_identity_f16_bits() {
        // every finite half value survives an identity conversion bit for bit
        for bits in 0..=u16::MAX {
            let value = f16::from_bits(bits);
            if value.is_nan() {
                continue;
            }
            assert_eq!(convert::<f16, f16>(value).to_bits(), bits);
        }
    }

    #[test]
    fn test_identity_f32_out_of_range() {
        for value in [-3.5_f32, 0.0, 0.25, 1.0, 7.0, f32::MAX] {
            assert_eq!(convert::<f32, f32>(value).to_bits(), value.to_bits());
        }
    }

    #[test]
    fn test_u8_f32_round_trip_lossless() {
        for i in 0..=255_u8 {
            let float: f32 = convert(i);
            let back: u8 = convert(float);
            assert_eq!(back, i, "Round trip failed for {i}");
        }
    }

    #[test]
    fn test_u16_f16_round_trip_within_ulp() {
        for i in (0..=u16::MAX).step_by(7) {
            let half: f16 = convert(i);
            let back: u16 = convert(half);
            // one unit in the last place of the half value, scaled to 16 bits
            let tolerance = f32::from(i) / 2048.0 + 1.0;
            let diff = (f32::from(back) - f32::from(i)).abs();
            assert!(diff <= tolerance, "{i} became {back}");
        }
    }

    #[test]
    fn test_u16_f16_small_values_within_one() {
        for i in 0..2048_u16 {
            let half: f16 = convert(i);
            let back: u16 = convert(half);
            assert!(back.abs_diff(i) <= 1, "{i} became {back}");
        }
    }

    #[test]
    fn test_convert_slice_identity_copies_shorter() {
        let from = [f16::from_f32(0.25), f16::from_f32(-2.0), f16::ONE];
        let mut to = [f16::ZERO; 2];
        convert_slice(&from, &mut to);
        assert_eq!(to, [from[0], from[1]]);

        let mut to = [7_u16; 4];
        convert_slice(&[1_u16, 2], &mut to);
        assert_eq!(to, [1, 2, 7, 7]);
    }

    #[test]
    fn test_convert_slice_across_encodings() {
        let from: Vec<u8> = (0..=255).collect();
        let mut to = vec![0.0_f32; 256];
        convert_slice(&from, &mut to);

        for (i, value) in from.iter().zip(&to) {
            assert_eq!(*value, convert::<u8, f32>(*i));
        }

        let mut back = [0_u8; 3];
        convert_slice(&[1.5_f32, -1.0, 0.5], &mut back);
        assert_eq!(back, [255, 0, 128]);
    }

    #[test]
    fn test_integer_packing_clamps() {
        assert_eq!(u8::pack(1.7), 255);
        assert_eq!(u8::pack(-0.3), 0);
        assert_eq!(u8::pack(f32::NAN), 0);
        assert_eq!(u16::pack(2.0), u16::MAX);
        assert_eq!(u16::pack(-1.0), 0);
    }

    #[test]
    fn test_nearest_rounding() {
        // 0.5 / 255 lies exactly between 0 and 1
        assert_eq!(u8::pack(0.49 / 255.0), 0);
        assert_eq!(u8::pack(0.51 / 255.0), 1);
    }

    #[test]
    fn test_registry_rejects_unknown() {
        assert!(CHANNEL_REGISTRY
            .converter(BitDepth::Unknown, BitDepth::Eight)
            .is_err());
        assert!(CHANNEL_REGISTRY
            .converter(BitDepth::Float32, BitDepth::Unknown)
            .is_err());
        assert!(CHANNEL_REGISTRY
            .convert(ChannelValue::U8(3), BitDepth::Unknown)
            .is_err());
    }

    #[test]
    fn test_registry_matches_generic_path() {
        let conv = CHANNEL_REGISTRY
            .converter(BitDepth::Eight, BitDepth::Float32)
            .unwrap();
        let src: Vec<u8> = (0..=255).collect();
        let mut dst = vec![0_u8; 256 * 4];
        conv.convert_bytes(&src, &mut dst);

        for (i, chunk) in dst.chunks_exact(4).enumerate() {
            let value = f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            assert_eq!(value, convert::<u8, f32>(i as u8));
        }
    }

    #[test]
    fn test_registry_identity_returns_input() {
        let value = ChannelValue::F32(12.5);
        assert_eq!(
            CHANNEL_REGISTRY.convert(value, BitDepth::Float32).unwrap(),
            value
        );
        let value = ChannelValue::U16(4097);
        assert_eq!(
            CHANNEL_REGISTRY.convert(value, BitDepth::Sixteen).unwrap(),
            value
        );
    }

    #[test]
    fn test_half_widening() {
        let value = ChannelValue::F16(f16::from_f32(0.5));
        assert_eq!(
            CHANNEL_REGISTRY.convert(value, BitDepth::Sixteen).unwrap(),
            ChannelValue::U16(32768)
        );
    }
}
