/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoding raw samples from a source into a destination buffer
//!
//! The sample format of a source is only known at run time, the
//! [`FormatDispatcher`] looks it up in [`DISPATCH_TABLE`] to pick the
//! buffer format samples are read into, then converts that buffer into
//! the caller's destination.
//!
//! # Example
//! ```
//! use prism_core::bit_depth::{BitDepth, BitDepthClass};
//! use prism_core::colorspace::ColorSpace;
//! use prism_image::buffer::ImageBuffer;
//! use prism_image::dispatch::FormatDispatcher;
//! use prism_image::source::memory::{MemoryAdapter, MemoryImage};
//!
//! let image = MemoryImage::from_samples(BitDepthClass::Int8, 1, 2, 1, &[0_u8, 255]).unwrap();
//! let mut adapter = MemoryAdapter::new();
//! adapter.insert("gray.raw", image);
//!
//! let mut dst = ImageBuffer::new(2, 1, BitDepth::Eight, ColorSpace::RGB).unwrap();
//! FormatDispatcher::new()
//!     .decode_path(&adapter, "gray.raw", &mut dst)
//!     .unwrap();
//!
//! assert_eq!(dst.samples::<u8>().unwrap(), &[0, 0, 0, 255, 255, 255]);
//! ```
use std::path::Path;

use prism_core::bit_depth::{BitDepth, BitDepthClass};
use prism_core::colorspace::ColorSpace;
use prism_core::log::{trace, warn};
use prism_core::options::DecoderOptions;
use prism_core::sample::CHANNEL_REGISTRY;

use crate::buffer::{BufferFormat, ImageBuffer};
use crate::convert::PixelConverter;
use crate::errors::{ImageErrors, ImageFormatError};
use crate::source::{CloseGuard, FormatMetadata, ImageSource, SourceAdapter};

/// The buffer format samples of a given class and channel count are read into
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecodeStrategy {
    pub class:    BitDepthClass,
    pub channels: usize,
    pub format:   BufferFormat
}

impl DecodeStrategy {
    /// Return true if raw samples can be read straight into the buffer
    ///
    /// Otherwise they go through a staging area and are widened
    /// or narrowed into it
    pub const fn reads_in_place(&self) -> bool {
        self.class.raw_size() == self.format.depth.size_of()
    }
}

const fn strategy(class: BitDepthClass, channels: usize, colorspace: ColorSpace) -> DecodeStrategy {
    DecodeStrategy {
        class,
        channels,
        format: BufferFormat::new(class.buffer_depth(), colorspace)
    }
}

/// Every supported (sample class, channel count) pair
pub static DISPATCH_TABLE: [DecodeStrategy; 21] = [
    strategy(BitDepthClass::Int8, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Int8, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Int8, 4, ColorSpace::RGBA),
    strategy(BitDepthClass::Int16, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Int16, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Int16, 4, ColorSpace::RGBA),
    strategy(BitDepthClass::Half16, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Half16, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Half16, 4, ColorSpace::RGBA),
    strategy(BitDepthClass::Int32, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Int32, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Int32, 4, ColorSpace::RGBA),
    strategy(BitDepthClass::Int64, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Int64, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Int64, 4, ColorSpace::RGBA),
    strategy(BitDepthClass::Float32, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Float32, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Float32, 4, ColorSpace::RGBA),
    strategy(BitDepthClass::Float64, 1, ColorSpace::Luma),
    strategy(BitDepthClass::Float64, 3, ColorSpace::RGB),
    strategy(BitDepthClass::Float64, 4, ColorSpace::RGBA)
];

/// Look up the strategy for a sample class and channel count
///
/// # Errors
/// If no strategy exists, i.e the channel count is not 1, 3 or 4
///
/// # Example
/// ```
/// use prism_core::bit_depth::{BitDepth, BitDepthClass};
/// use prism_core::colorspace::ColorSpace;
/// use prism_image::dispatch::select_strategy;
///
/// let strategy = select_strategy(BitDepthClass::Half16, 4).unwrap();
/// assert_eq!(strategy.format.depth, BitDepth::Sixteen);
/// assert_eq!(strategy.format.colorspace, ColorSpace::RGBA);
///
/// assert!(select_strategy(BitDepthClass::Int8, 2).is_err());
/// ```
pub fn select_strategy(
    class: BitDepthClass, channels: usize
) -> Result<DecodeStrategy, ImageFormatError> {
    if let Some(found) = DISPATCH_TABLE
        .iter()
        .find(|x| x.class == class && x.channels == channels)
    {
        return Ok(*found);
    }
    if DISPATCH_TABLE.iter().any(|x| x.channels == channels) {
        Err(ImageFormatError::UnsupportedBitDepth(class))
    } else {
        Err(ImageFormatError::UnsupportedChannelCount(channels))
    }
}

/// Drives decoding of sources into caller owned buffers
#[derive(Copy, Clone, Debug, Default)]
pub struct FormatDispatcher {
    options: DecoderOptions
}

impl FormatDispatcher {
    /// Create a dispatcher with default options
    pub fn new() -> FormatDispatcher {
        FormatDispatcher::default()
    }

    /// Create a dispatcher with the specified options
    pub fn new_with_options(options: DecoderOptions) -> FormatDispatcher {
        FormatDispatcher { options }
    }

    pub const fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Open `path` through `adapter` and decode it into `dst`
    pub fn decode_path<A: SourceAdapter>(
        &self, adapter: &A, path: impl AsRef<Path>, dst: &mut ImageBuffer
    ) -> Result<(), ImageErrors> {
        let mut source = adapter.open(path.as_ref())?;
        self.decode_and_convert(&mut source, dst)
    }

    /// Read every sample of `source` and convert them into `dst`
    ///
    /// The source is closed when this returns, whether it succeeds or not.
    /// `dst` is only written to after the whole image has been read, on
    /// error it is left as it was.
    ///
    /// # Errors
    /// - [`ImageErrors::ImageFormat`]: unsupported channel count, or dimensions that
    ///   differ from `dst` or exceed the configured limits
    /// - [`ImageErrors::Configuration`]: the source's buffer format cannot be converted
    ///   to the format of `dst`
    /// - [`ImageErrors::Source`]: the source failed to read
    pub fn decode_and_convert<S: ImageSource + ?Sized>(
        &self, source: &mut S, dst: &mut ImageBuffer
    ) -> Result<(), ImageErrors> {
        let mut source = CloseGuard::new(source);
        let metadata = source.metadata();

        let strategy = select_strategy(metadata.bit_depth_class, metadata.channel_count)
            .inspect_err(|err| warn!("{}: {:?}", source.path().display(), err))?;

        trace!(
            "Decoding {:?} x {} channels from {} into {:?}",
            metadata.bit_depth_class,
            metadata.channel_count,
            source.path().display(),
            strategy.format
        );
        self.check_dimensions(&metadata, dst)?;

        let converter = PixelConverter::new(strategy.format, dst.format(), &self.options)?;

        trace!(
            "Allocating {}x{} {:?} temporary buffer",
            metadata.width,
            metadata.height,
            strategy.format
        );
        let mut temporary = ImageBuffer::new(
            dst.width(),
            dst.height(),
            strategy.format.depth,
            strategy.format.colorspace
        )?;

        read_samples(&mut *source, &metadata, &strategy, &mut temporary)?;

        converter.convert(&temporary, dst)
    }

    fn check_dimensions(
        &self, metadata: &FormatMetadata, dst: &ImageBuffer
    ) -> Result<(), ImageFormatError> {
        if metadata.width == 0 {
            return Err(ImageFormatError::ZeroDimension("width"));
        }
        if metadata.height == 0 {
            return Err(ImageFormatError::ZeroDimension("height"));
        }
        if metadata.width > self.options.max_width() {
            return Err(ImageFormatError::TooLargeDimensions(
                "width",
                self.options.max_width(),
                metadata.width
            ));
        }
        if metadata.height > self.options.max_height() {
            return Err(ImageFormatError::TooLargeDimensions(
                "height",
                self.options.max_height(),
                metadata.height
            ));
        }
        let found = (metadata.width, metadata.height);

        if found != dst.dimensions() {
            return Err(ImageFormatError::DimensionMismatch {
                expected: dst.dimensions(),
                found
            });
        }
        Ok(())
    }
}

/// Read the source's samples into `buffer`, whose format is `strategy.format`
fn read_samples<S: ImageSource + ?Sized>(
    source: &mut S, metadata: &FormatMetadata, strategy: &DecodeStrategy, buffer: &mut ImageBuffer
) -> Result<(), ImageErrors> {
    if strategy.reads_in_place() {
        let strides = buffer.strides();
        source.read_raw_plane(buffer.as_bytes_mut(), strides, true)?;
        return Ok(());
    }

    let strides = metadata.raw_strides();
    let mut staging = vec![0_u8; strides.plane];

    trace!(
        "Staging {} bytes of {:?} samples",
        strides.plane,
        metadata.bit_depth_class
    );
    source.read_raw_plane(&mut staging, strides, true)?;

    match metadata.bit_depth_class {
        BitDepthClass::Half16 => {
            CHANNEL_REGISTRY
                .converter(BitDepth::Float16, BitDepth::Sixteen)?
                .convert_bytes(&staging, buffer.as_bytes_mut());
        }
        BitDepthClass::Int32 => {
            let max = f64::from(u32::MAX);
            for (raw, out) in staging
                .chunks_exact(4)
                .zip(buffer.samples_mut::<f32>()?.iter_mut())
            {
                *out = (f64::from(bytemuck::pod_read_unaligned::<u32>(raw)) / max) as f32;
            }
        }
        BitDepthClass::Int64 => {
            let max = u64::MAX as f64;
            for (raw, out) in staging
                .chunks_exact(8)
                .zip(buffer.samples_mut::<f32>()?.iter_mut())
            {
                *out = (bytemuck::pod_read_unaligned::<u64>(raw) as f64 / max) as f32;
            }
        }
        BitDepthClass::Float64 => {
            for (raw, out) in staging
                .chunks_exact(8)
                .zip(buffer.samples_mut::<f32>()?.iter_mut())
            {
                *out = bytemuck::pod_read_unaligned::<f64>(raw) as f32;
            }
        }
        class => return Err(ImageFormatError::UnsupportedBitDepth(class).into())
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use prism_core::bit_depth::{BitDepth, BitDepthClass};
    use prism_core::colorspace::ColorSpace;

    use crate::dispatch::{select_strategy, DISPATCH_TABLE};
    use crate::errors::ImageFormatError;

    #[test]
    fn test_table_is_complete() {
        for class in [
            BitDepthClass::Int8,
            BitDepthClass::Int16,
            BitDepthClass::Half16,
            BitDepthClass::Int32,
            BitDepthClass::Int64,
            BitDepthClass::Float32,
            BitDepthClass::Float64
        ] {
            for (channels, colorspace) in [
                (1, ColorSpace::Luma),
                (3, ColorSpace::RGB),
                (4, ColorSpace::RGBA)
            ] {
                let strategy = select_strategy(class, channels).unwrap();
                assert_eq!(strategy.format.colorspace, colorspace);
                assert_eq!(strategy.format.depth, class.buffer_depth());
            }
        }
        assert_eq!(DISPATCH_TABLE.len(), 21);
    }

    #[test]
    fn test_in_place_reads() {
        assert!(select_strategy(BitDepthClass::Int8, 1).unwrap().reads_in_place());
        assert!(select_strategy(BitDepthClass::Int16, 3).unwrap().reads_in_place());
        assert!(select_strategy(BitDepthClass::Float32, 4).unwrap().reads_in_place());
        assert!(!select_strategy(BitDepthClass::Half16, 1).unwrap().reads_in_place());
        assert!(!select_strategy(BitDepthClass::Float64, 1).unwrap().reads_in_place());
    }

    #[test]
    fn test_unsupported_channel_counts() {
        for channels in [0, 2, 5, 6] {
            assert_eq!(
                select_strategy(BitDepthClass::Int8, channels),
                Err(ImageFormatError::UnsupportedChannelCount(channels))
            );
        }
    }

    #[test]
    fn test_wide_classes_use_float() {
        let strategy = select_strategy(BitDepthClass::Int64, 3).unwrap();
        assert_eq!(strategy.format.depth, BitDepth::Float32);
    }
}
