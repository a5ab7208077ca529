// THEORY:
// The engine never owns pixels. An exposure is anything that can report its
// size and channel count and hand back a normalized `[0, 1]` value for one
// channel of one pixel. `ExposureImage` captures exactly that surface, and the
// `image` crate's `ImageBuffer` types satisfy it out of the box: integer
// subpixels are divided by their type's maximum, float subpixels are passed
// through unchanged.
//
// `ExposureStack` is the ordered, borrowed view over a set of exposures. The
// position of an image in the stack is its exposure index, which is also its
// position inside every sample tuple the engine produces.

use image::{ImageBuffer, Pixel, Primitive};
use std::ops::Deref;
use std::sync::Arc;

/// Read access to a single exposure.
pub trait ExposureImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn channels(&self) -> usize;
    /// Normalized value of `channel` at `(x, y)`. Callers keep the
    /// coordinate inside the image and the channel below `channels()`.
    fn value(&self, x: u32, y: u32, channel: usize) -> f32;

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

impl<P, C> ExposureImage for ImageBuffer<P, C>
where
    P: Pixel,
    P::Subpixel: Into<f32>,
    C: Deref<Target = [P::Subpixel]>,
{
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn channels(&self) -> usize {
        P::CHANNEL_COUNT as usize
    }

    fn value(&self, x: u32, y: u32, channel: usize) -> f32 {
        let max: f32 = <P::Subpixel as Primitive>::DEFAULT_MAX_VALUE.into();
        let raw: f32 = self.get_pixel(x, y).channels()[channel].into();
        raw / max
    }
}

impl<T: ExposureImage + ?Sized> ExposureImage for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn value(&self, x: u32, y: u32, channel: usize) -> f32 {
        (**self).value(x, y, channel)
    }
}

impl<T: ExposureImage + ?Sized> ExposureImage for Arc<T> {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn value(&self, x: u32, y: u32, channel: usize) -> f32 {
        (**self).value(x, y, channel)
    }
}

/// An ordered, borrowed sequence of exposures. Index = exposure index.
#[derive(Debug)]
pub struct ExposureStack<'a, I: ExposureImage + ?Sized> {
    exposures: Vec<&'a I>,
}

impl<I: ExposureImage + ?Sized> Clone for ExposureStack<'_, I> {
    fn clone(&self) -> Self {
        Self {
            exposures: self.exposures.clone(),
        }
    }
}

impl<'a, I: ExposureImage> ExposureStack<'a, I> {
    /// Borrows every image of a slice, keeping slice order.
    pub fn from_slice(images: &'a [I]) -> Self {
        Self {
            exposures: images.iter().collect(),
        }
    }
}

impl<'a, I: ExposureImage + ?Sized> ExposureStack<'a, I> {
    pub fn new(exposures: Vec<&'a I>) -> Self {
        Self { exposures }
    }

    pub fn len(&self) -> usize {
        self.exposures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exposures.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a I> {
        self.exposures.get(index).copied()
    }

    pub fn first(&self) -> Option<&'a I> {
        self.exposures.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a I> + '_ {
        self.exposures.iter().copied()
    }

    /// Channel count of the first exposure, 0 for an empty stack.
    pub fn channels(&self) -> usize {
        self.first().map_or(0, |img| img.channels())
    }

    /// Index and channel count of the first exposure that disagrees with the first image.
    pub fn channel_mismatch(&self) -> Option<(usize, usize)> {
        let expected = self.channels();
        self.iter()
            .enumerate()
            .find(|(_, img)| img.channels() != expected)
            .map(|(index, img)| (index, img.channels()))
    }

    /// Index and size of the first exposure whose size differs from the first image.
    pub fn resolution_mismatch(&self) -> Option<(usize, (u32, u32))> {
        let expected = self.first()?.dimensions();
        self.iter()
            .enumerate()
            .find(|(_, img)| img.dimensions() != expected)
            .map(|(index, img)| (index, img.dimensions()))
    }
}

impl<'a, I: ExposureImage + ?Sized> FromIterator<&'a I> for ExposureStack<'a, I> {
    fn from_iter<T: IntoIterator<Item = &'a I>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
