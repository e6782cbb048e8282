//! Loading code images and saving vote maps via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. A code image on disk is
//! an 8-bit grayscale file whose pixel values are the orientation codes
//! themselves; color inputs are converted to luma first.

use crate::image::{ImageView, OwnedImage};
use crate::util::{GhMatchError, GhMatchResult};
use crate::vote::Accumulator;
use std::path::Path;

/// Creates a borrowed code view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> GhMatchResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned code image from a dynamic image.
pub fn codes_from_dynamic_image(img: &image::DynamicImage) -> GhMatchResult<OwnedImage<u8>> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an 8-bit code image from disk.
pub fn load_code_image<P: AsRef<Path>>(path: P) -> GhMatchResult<OwnedImage<u8>> {
    let img = image::open(path).map_err(|err| GhMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    codes_from_dynamic_image(&img)
}

/// Saves an accumulator as a min-max normalized 8-bit grayscale image.
pub fn save_accumulator_png<P: AsRef<Path>>(acc: &Accumulator, path: P) -> GhMatchResult<()> {
    let heat = acc.to_normalized_u8();
    let width = u32::try_from(heat.width()).map_err(|_| GhMatchError::InvalidDimensions {
        width: heat.width(),
        height: heat.height(),
    })?;
    let height = u32::try_from(heat.height()).map_err(|_| GhMatchError::InvalidDimensions {
        width: heat.width(),
        height: heat.height(),
    })?;
    let gray = image::GrayImage::from_raw(width, height, heat.data().to_vec()).ok_or(
        GhMatchError::BufferTooSmall {
            needed: heat.width() * heat.height(),
            got: heat.data().len(),
        },
    )?;
    gray.save(path).map_err(|err| GhMatchError::ImageIo {
        reason: err.to_string(),
    })
}
