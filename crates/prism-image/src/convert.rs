/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Whole buffer conversions between (encoding, layout) pairs
//!
//! A [`PixelConverter`] is built once for a source and destination format,
//! all configuration errors are raised there. Running it afterwards only fails
//! if it is handed buffers of other formats or dimensions.
//!
//! Three strategies exist, chosen at construction
//!
//! - The formats are equal, bytes are copied
//! - The layouts are equal, each sample goes through the channel registry
//! - The layouts differ, every pixel is unpacked to normalized floats, routed through
//!   RGBA (running the Lab transform when color models differ) and packed again
use prism_core::colorspace::{conversion_kind, ColorSpace, ConversionKind};
use prism_core::errors::ConfigError;
use prism_core::log::{trace, warn};
use prism_core::options::DecoderOptions;
use prism_core::sample::{ChannelEntry, SampleConverter, CHANNEL_REGISTRY};

use crate::buffer::{BufferFormat, ImageBuffer};
use crate::errors::{ImageErrors, ImageFormatError};
use crate::lab::LabTransform;


/// Rec.601 luma weights
const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

#[derive(Copy, Clone, Debug)]
enum Plan {
    Copy,
    Samples(SampleConverter),
    Pixels(PixelPlan)
}

#[derive(Copy, Clone, Debug)]
struct PixelPlan {
    src:       ChannelEntry,
    dst:       ChannelEntry,
    transform: LabTransform
}

/// A resolved conversion from one buffer format to another
#[derive(Copy, Clone, Debug)]
pub struct PixelConverter {
    from: BufferFormat,
    to:   BufferFormat,
    kind: ConversionKind,
    plan: Plan
}

impl PixelConverter {
    /// Resolve a conversion between two buffer formats
    ///
    /// # Errors
    /// - Either format pairs a perceptual layout with a non `f32` encoding
    /// - Either encoding is unknown
    /// - The layouts cannot be converted, see [`conversion_kind`]
    ///
    /// # Example
    /// ```
    /// use prism_core::bit_depth::BitDepth;
    /// use prism_core::colorspace::{ColorSpace, ConversionKind};
    /// use prism_core::options::DecoderOptions;
    /// use prism_image::buffer::BufferFormat;
    /// use prism_image::convert::PixelConverter;
    ///
    /// let from = BufferFormat::new(BitDepth::Eight, ColorSpace::RGB);
    /// let to = BufferFormat::new(BitDepth::Float32, ColorSpace::Lab);
    ///
    /// let converter = PixelConverter::new(from, to, &DecoderOptions::default()).unwrap();
    /// assert_eq!(converter.kind(), ConversionKind::Transform);
    /// ```
    pub fn new(
        from: BufferFormat, to: BufferFormat, options: &DecoderOptions
    ) -> Result<PixelConverter, ConfigError> {
        let resolved = Self::resolve(from, to, options);

        if let Err(err) = &resolved {
            warn!("Rejecting conversion from {:?} to {:?}: {:?}", from, to, err);
        }
        resolved
    }

    fn resolve(
        from: BufferFormat, to: BufferFormat, options: &DecoderOptions
    ) -> Result<PixelConverter, ConfigError> {
        from.colorspace.check_depth(from.depth)?;
        to.colorspace.check_depth(to.depth)?;

        let kind = conversion_kind(from.colorspace, to.colorspace)?;
        // resolving the sample converter validates both encodings
        let samples = CHANNEL_REGISTRY.converter(from.depth, to.depth)?;

        let plan = if kind == ConversionKind::Identity {
            if samples.is_identity() {
                Plan::Copy
            } else {
                Plan::Samples(samples)
            }
        } else {
            Plan::Pixels(PixelPlan {
                src:       *CHANNEL_REGISTRY.entry(from.depth)?,
                dst:       *CHANNEL_REGISTRY.entry(to.depth)?,
                transform: LabTransform::new(options.lab_exponent())
            })
        };

        trace!(
            "Conversion {:?}({:?}) -> {:?}({:?}) resolved as {:?}",
            from.colorspace,
            from.depth,
            to.colorspace,
            to.depth,
            kind
        );

        Ok(PixelConverter {
            from,
            to,
            kind,
            plan
        })
    }

    /// The format this converter reads
    pub const fn from_format(&self) -> BufferFormat {
        self.from
    }

    /// The format this converter writes
    pub const fn to_format(&self) -> BufferFormat {
        self.to
    }

    /// How the layouts are mapped
    pub const fn kind(&self) -> ConversionKind {
        self.kind
    }

    /// Convert every pixel of `src` into `dst`
    ///
    /// `dst` is only written to once both buffers have been validated
    ///
    /// # Errors
    /// - Buffers with a format other than what the converter was built for
    /// - Buffers with differing dimensions
    pub fn convert(&self, src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<(), ImageErrors> {
        if src.format() != self.from {
            return Err(ImageFormatError::UnexpectedFormat {
                expected: self.from,
                found:    src.format()
            }
            .into());
        }
        if dst.format() != self.to {
            return Err(ImageFormatError::UnexpectedFormat {
                expected: self.to,
                found:    dst.format()
            }
            .into());
        }
        if src.dimensions() != dst.dimensions() {
            return Err(ImageFormatError::DimensionMismatch {
                expected: dst.dimensions(),
                found:    src.dimensions()
            }
            .into());
        }

        match &self.plan {
            Plan::Copy => dst.as_bytes_mut().copy_from_slice(src.as_bytes()),
            Plan::Samples(converter) => converter.convert_bytes(src.as_bytes(), dst.as_bytes_mut()),
            Plan::Pixels(plan) => plan.run(
                self.from.colorspace,
                self.to.colorspace,
                src.as_bytes(),
                dst.as_bytes_mut()
            )
        }
        Ok(())
    }
}

impl PixelPlan {
    fn run(&self, from: ColorSpace, to: ColorSpace, src: &[u8], dst: &mut [u8]) {
        let in_components = from.num_components();
        let out_components = to.num_components();

        let src_pixel = in_components * self.src.size;
        let dst_pixel = out_components * self.dst.size;

        let mut pixel = [0.0_f32; 4];

        for (src_px, dst_px) in src
            .chunks_exact(src_pixel)
            .zip(dst.chunks_exact_mut(dst_pixel))
        {
            for (value, bytes) in pixel.iter_mut().zip(src_px.chunks_exact(self.src.size)) {
                *value = (self.src.unpack)(bytes);
            }

            let rgba = self.rgba_of(from, &pixel);
            let out = self.pixel_of(to, rgba);

            for (value, bytes) in out.iter().zip(dst_px.chunks_exact_mut(self.dst.size)) {
                (self.dst.pack)(*value, bytes);
            }
        }
    }

    /// Map a pixel in layout `from` to normalized RGBA
    fn rgba_of(&self, from: ColorSpace, px: &[f32; 4]) -> [f32; 4] {
        match from {
            ColorSpace::Luma => [px[0], px[0], px[0], 1.0],
            ColorSpace::LumaA => [px[0], px[0], px[0], px[1]],
            ColorSpace::RGB => [px[0], px[1], px[2], 1.0],
            ColorSpace::RGBA => *px,
            ColorSpace::CMYK => {
                // inverted storage, the product with k is the color
                let k = px[3];
                [px[0] * k, px[1] * k, px[2] * k, 1.0]
            }
            ColorSpace::Lab | ColorSpace::LabA => {
                let rgb = self
                    .transform
                    .lab_to_normalized_rgb([px[0], px[1], px[2]])
                    .map(clamp_unit);

                let alpha = if from.has_alpha() { px[3] } else { 1.0 };
                [rgb[0], rgb[1], rgb[2], alpha]
            }
            // rejected when the plan was built
            _ => *px
        }
    }

    /// Map normalized RGBA to a pixel in layout `to`
    fn pixel_of(&self, to: ColorSpace, rgba: [f32; 4]) -> [f32; 4] {
        let [r, g, b, a] = rgba;

        match to {
            ColorSpace::Luma => [luma(r, g, b), 0.0, 0.0, 0.0],
            ColorSpace::LumaA => [luma(r, g, b), a, 0.0, 0.0],
            ColorSpace::RGB => [r, g, b, 0.0],
            ColorSpace::RGBA => rgba,
            ColorSpace::CMYK => rgb_to_inverted_cmyk(r, g, b),
            ColorSpace::Lab | ColorSpace::LabA => {
                let [l, a_axis, b_axis] = self.transform.normalized_rgb_to_lab([r, g, b]);
                [l, a_axis, b_axis, a]
            }
            _ => rgba
        }
    }
}

#[inline(always)]
fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
}

#[inline(always)]
fn clamp_unit(value: f32) -> f32 {
    // NaN becomes zero, like integer packing
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Normalized RGB to CMYK stored inverted, i.e `1.0` means no ink
fn rgb_to_inverted_cmyk(r: f32, g: f32, b: f32) -> [f32; 4] {
    let c = 1.0 - r;
    let m = 1.0 - g;
    let y = 1.0 - b;

    let k = c.min(m).min(y);

    if k >= 1.0 {
        // pure black, all ink is in k
        return [1.0, 1.0, 1.0, 0.0];
    }
    let scale = 1.0 / (1.0 - k);

    [
        1.0 - (c - k) * scale,
        1.0 - (m - k) * scale,
        1.0 - (y - k) * scale,
        1.0 - k
    ]
}

/// Convert `src` into a new buffer of format `to`
///
/// # Example
/// ```
/// use prism_core::bit_depth::BitDepth;
/// use prism_core::colorspace::ColorSpace;
/// use prism_core::options::DecoderOptions;
/// use prism_image::buffer::{BufferFormat, ImageBuffer};
/// use prism_image::convert::convert_buffer;
///
/// let src = ImageBuffer::from_samples(1, 1, ColorSpace::RGB, &[255_u8, 0, 0]).unwrap();
/// let to = BufferFormat::new(BitDepth::Eight, ColorSpace::RGBA);
/// let dst = convert_buffer(&src, to, &DecoderOptions::default()).unwrap();
///
/// assert_eq!(dst.samples::<u8>().unwrap(), &[255, 0, 0, 255]);
/// ```
pub fn convert_buffer(
    src: &ImageBuffer, to: BufferFormat, options: &DecoderOptions
) -> Result<ImageBuffer, ImageErrors> {
    let converter = PixelConverter::new(src.format(), to, options)?;
    let mut dst = ImageBuffer::new(src.width(), src.height(), to.depth, to.colorspace)?;

    converter.convert(src, &mut dst)?;
    Ok(dst)
}
