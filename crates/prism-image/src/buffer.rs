/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Interleaved image buffers
//!
//! An [`ImageBuffer`] is a 2D array of same-typed pixels, stored interleaved
//! (`RGBRGBRGB`) in native endian. The sample type is fixed at creation by the
//! buffer's [`BitDepth`] and the number of samples per pixel by its [`ColorSpace`].
use prism_core::bit_depth::BitDepth;
use prism_core::colorspace::ColorSpace;
use prism_core::sample::Sample;

use crate::errors::{ImageErrors, ImageFormatError};
use crate::storage::{BufferErrors, SampleStorage};

/// Byte distances between consecutive pixels, rows and planes
///
/// # Example
/// ```
/// use prism_image::buffer::Strides;
/// // 10x5 RGB image with 16 bit samples
/// let strides = Strides::new(3, 2, 10, 5);
/// assert_eq!(strides.pixel, 6);
/// assert_eq!(strides.row, 60);
/// assert_eq!(strides.plane, 300);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Strides {
    pub pixel: usize,
    pub row:   usize,
    pub plane: usize
}

impl Strides {
    /// Compute strides for a tightly packed interleaved plane
    pub const fn new(channels: usize, sample_size: usize, width: usize, height: usize) -> Strides {
        let pixel = channels * sample_size;
        let row = pixel * width;
        Strides {
            pixel,
            row,
            plane: row * height
        }
    }
}

/// The (encoding, layout) pair describing a buffer's pixels
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BufferFormat {
    pub depth:      BitDepth,
    pub colorspace: ColorSpace
}

impl BufferFormat {
    pub const fn new(depth: BitDepth, colorspace: ColorSpace) -> BufferFormat {
        BufferFormat { depth, colorspace }
    }

    /// Size of a single pixel in bytes
    pub const fn pixel_size(&self) -> usize {
        self.depth.size_of() * self.colorspace.num_components()
    }
}

/// An interleaved image buffer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageBuffer {
    storage:    SampleStorage,
    width:      usize,
    height:     usize,
    depth:      BitDepth,
    colorspace: ColorSpace
}

impl ImageBuffer {
    /// Create a zero filled buffer
    ///
    /// # Errors
    /// - If `depth` cannot store `colorspace`, e.g. Lab with 8 bit samples
    /// - If either dimension is zero
    /// - If the buffer size overflows
    ///
    /// # Example
    /// ```
    /// use prism_core::bit_depth::BitDepth;
    /// use prism_core::colorspace::ColorSpace;
    /// use prism_image::buffer::ImageBuffer;
    ///
    /// let buffer = ImageBuffer::new(4, 2, BitDepth::Sixteen, ColorSpace::RGBA).unwrap();
    /// assert_eq!(buffer.as_bytes().len(), 4 * 2 * 4 * 2);
    /// assert!(ImageBuffer::new(4, 2, BitDepth::Eight, ColorSpace::Lab).is_err());
    /// ```
    pub fn new(
        width: usize, height: usize, depth: BitDepth, colorspace: ColorSpace
    ) -> Result<ImageBuffer, ImageErrors> {
        colorspace.check_depth(depth)?;

        if width == 0 {
            return Err(ImageFormatError::ZeroDimension("width").into());
        }
        if height == 0 {
            return Err(ImageFormatError::ZeroDimension("height").into());
        }
        let count = width
            .checked_mul(height)
            .and_then(|x| x.checked_mul(colorspace.num_components()))
            .ok_or(BufferErrors::TooLarge(usize::MAX))?;

        let storage = SampleStorage::new_with_depth(count, depth)?;

        Ok(ImageBuffer {
            storage,
            width,
            height,
            depth,
            colorspace
        })
    }

    /// Create a buffer from interleaved samples
    ///
    /// The depth is taken from the sample type.
    ///
    /// # Errors
    /// Same as [`ImageBuffer::new`], and if `samples` doesn't hold exactly
    /// `width * height * components` values.
    pub fn from_samples<T: Sample>(
        width: usize, height: usize, colorspace: ColorSpace, samples: &[T]
    ) -> Result<ImageBuffer, ImageErrors> {
        let mut buffer = ImageBuffer::new(width, height, T::DEPTH, colorspace)?;
        let dst = buffer.samples_mut::<T>()?;

        if dst.len() != samples.len() {
            return Err(ImageFormatError::WrongLength {
                expected: dst.len(),
                found:    samples.len()
            }
            .into());
        }
        dst.copy_from_slice(samples);
        Ok(buffer)
    }

    /// Set every sample in the buffer to `value`
    pub fn fill<T: Sample>(&mut self, value: T) -> Result<(), BufferErrors> {
        self.storage.fill(value)
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Return the image dimensions as `(width, height)`
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub const fn depth(&self) -> BitDepth {
        self.depth
    }

    pub const fn colorspace(&self) -> ColorSpace {
        self.colorspace
    }

    pub const fn format(&self) -> BufferFormat {
        BufferFormat::new(self.depth, self.colorspace)
    }

    /// Byte strides of this buffer
    pub const fn strides(&self) -> Strides {
        Strides::new(
            self.colorspace.num_components(),
            self.depth.size_of(),
            self.width,
            self.height
        )
    }

    /// Samples of this buffer as their native type
    ///
    /// # Errors
    /// If `T` is not the type matching the buffer depth
    pub fn samples<T: Sample>(&self) -> Result<&[T], BufferErrors> {
        self.storage.reinterpret_as()
    }

    /// Mutable samples of this buffer
    pub fn samples_mut<T: Sample>(&mut self) -> Result<&mut [T], BufferErrors> {
        self.storage.reinterpret_as_mut()
    }

    /// Bytes making up the pixel at `(x, y)`
    ///
    /// Returns `None` if the coordinate is outside of the image
    pub fn pixel_bytes(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let strides = self.strides();
        let start = y * strides.row + x * strides.pixel;

        self.storage.as_bytes().get(start..start + strides.pixel)
    }

    /// Raw native endian bytes of the buffer
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_bytes()
    }

    /// Raw native endian bytes of the buffer, mutably
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.storage.as_bytes_mut()
    }
}

#[cfg(test)]
mod tests {
    use half::f16;
    use prism_core::bit_depth::BitDepth;
    use prism_core::colorspace::ColorSpace;

    use crate::buffer::{ImageBuffer, Strides};
    use crate::errors::ImageErrors;

    #[test]
    fn test_strides() {
        let buffer = ImageBuffer::new(10, 5, BitDepth::Sixteen, ColorSpace::RGB).unwrap();
        assert_eq!(buffer.strides(), Strides::new(3, 2, 10, 5));
        assert_eq!(buffer.strides().plane, buffer.as_bytes().len());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = ImageBuffer::new(0, 5, BitDepth::Eight, ColorSpace::Luma).unwrap_err();
        assert!(matches!(err, ImageErrors::ImageFormat(_)));
    }

    #[test]
    fn test_lab_needs_float() {
        let err = ImageBuffer::new(2, 2, BitDepth::Float16, ColorSpace::Lab).unwrap_err();
        assert!(matches!(err, ImageErrors::Configuration(_)));
        assert!(ImageBuffer::new(2, 2, BitDepth::Float32, ColorSpace::LabA).is_ok());
    }

    #[test]
    fn test_wrong_sample_type() {
        let buffer = ImageBuffer::new(2, 2, BitDepth::Float16, ColorSpace::RGB).unwrap();
        assert!(buffer.samples::<u16>().is_err());
        assert_eq!(buffer.samples::<f16>().unwrap().len(), 12);
    }

    #[test]
    fn test_pixel_bytes() {
        let samples: Vec<u8> = (0..24).collect();
        let buffer = ImageBuffer::from_samples(4, 2, ColorSpace::RGB, &samples).unwrap();

        assert_eq!(buffer.pixel_bytes(1, 1), Some(&[15_u8, 16, 17][..]));
        assert_eq!(buffer.pixel_bytes(4, 0), None);
    }

    #[test]
    fn test_from_samples_length_checked() {
        let samples = [0_u16; 5];
        assert!(ImageBuffer::from_samples(2, 1, ColorSpace::RGB, &samples).is_err());
    }
}
