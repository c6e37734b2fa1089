//! Extract a small, perceptually diverse set of colors from an image and classify each by hue.
//!
//! # Examples
//!
//! ## Read an image file and get its dominant and accent colors.
//!
//! ```no_run
//! let image = image::open("some image").unwrap().into_rgb8();
//! let buffer = huecodex::PixelBuffer::from_rgb_image(&image);
//! let selection = huecodex::analyze(&buffer, &huecodex::Options::default());
//!
//! for color in &selection.dominants {
//!     println!("{} {} {:.1}%", color.hex(), color.key, color.percentage());
//! }
//! ```
//!
//! ## Look up meanings for the selected colors.
//!
//! ```
//! use huecodex::{Meaning, MeaningTable, Options, PixelBuffer};
//! use palette::Srgb;
//!
//! let meanings = [("red", Meaning { short: "passion".into(), ..Meaning::default() })]
//!     .into_iter()
//!     .collect::<MeaningTable>();
//!
//! let pixels = vec![Srgb::new(255, 0, 0); 100];
//! let buffer = PixelBuffer::new(10, 10, &pixels).unwrap();
//! let selection = huecodex::analyze(&buffer, &Options::default());
//!
//! assert_eq!(selection.summary(&meanings), "passion");
//! ```
//!
//! # Pipeline
//!
//! 1. The image is downscaled if either dimension is larger than [`Options::max_dimension`].
//! 2. The pixels are quantized into a palette of at most [`Options::palette_size`] colors
//!    (see [`quantize`]).
//! 3. Each palette color is classified into a [`HueBucket`] and a [`ColorKey`] (see [`classify`])
//!    and given a salience score (see [`score`]).
//! 4. The best color of each bucket competes for the dominant and accent slots (see [`select`]).
//!
//! Each step is also exposed on its own, so callers can time or inspect the intermediate results.
//!
//! The whole pipeline is deterministic: the same pixels and [`Options`] always give the same [`Selection`].

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

use image::RgbImage;
use palette::Srgb;
use std::fmt::{self, Display};

pub mod classify;
pub mod color;
pub mod meaning;
pub mod quantize;
pub mod score;
pub mod select;

pub use classify::{Classification, ColorKey, HueBucket, Thresholds};
pub use color::Hsv;
pub use meaning::{Meaning, MeaningLookup, MeaningTable};
pub use quantize::{PaletteEntry, UniqueColors};
pub use score::{ScoreWeights, ScoredColor};
pub use select::Selection;

/// Errors for invalid input to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The number of pixels does not match the given dimensions
	DimensionMismatch {
		/// Width of the buffer
		width: u32,
		/// Height of the buffer
		height: u32,
		/// Number of pixels provided
		len: usize,
	},
	/// The image has no pixels but a non-empty result was required
	EmptyImage,
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::DimensionMismatch { width, height, len } => {
				write!(f, "Expected {width}x{height} pixels but got {len}")
			},
			Error::EmptyImage => write!(f, "The image has no pixels"),
		}
	}
}

impl std::error::Error for Error {}

/// A row-major buffer of decoded sRGB pixels
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
	/// Width in pixels
	width: u32,
	/// Height in pixels
	height: u32,
	/// The pixels, row by row
	pixels: &'a [Srgb<u8>],
}

impl<'a> PixelBuffer<'a> {
	/// Create a buffer from `width * height` row-major pixels.
	///
	/// # Errors
	/// Returns [`Error::DimensionMismatch`] if `pixels` does not have exactly `width * height` elements.
	pub fn new(width: u32, height: u32, pixels: &'a [Srgb<u8>]) -> Result<Self, Error> {
		let expected = u64::from(width) * u64::from(height);
		if u64::try_from(pixels.len()).map_or(true, |len| len != expected) {
			Err(Error::DimensionMismatch { width, height, len: pixels.len() })
		} else {
			Ok(Self { width, height, pixels })
		}
	}

	/// Create a buffer that borrows the pixels of an [`RgbImage`]
	#[must_use]
	pub fn from_rgb_image(image: &'a RgbImage) -> Self {
		let (width, height) = image.dimensions();
		// an ImageBuffer always holds at least width * height pixels
		let len = width as usize * height as usize * 3;
		Self {
			width,
			height,
			pixels: palette::cast::from_component_slice(&image.as_raw()[..len]),
		}
	}

	/// The width and height of this buffer
	#[must_use]
	pub const fn dimensions(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	/// The pixels of this buffer in row-major order
	#[must_use]
	pub const fn pixels(&self) -> &'a [Srgb<u8>] {
		self.pixels
	}

	/// Whether this buffer has zero area
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}
}

/// Options for the whole pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
	/// The maximum number of palette colors to quantize the image into
	///
	/// Somewhere from 5 to 24 is reasonable.
	pub palette_size: u8,
	/// The maximum number of dominant colors
	pub n_dominant: usize,
	/// The maximum number of accent colors
	pub n_accent: usize,
	/// Images with a width or height above this are downscaled before quantization (`0` to disable)
	pub max_dimension: u32,
	/// The number of k-means iterations used to refine the median cut palette (`0` to disable)
	pub kmeans_iterations: u32,
	/// k-means stops early once the centroids move less than this in total (in 8-bit RGB units)
	pub convergence_threshold: f64,
	/// The seed for the random number generator used in k-means
	pub seed: u64,
	/// Classifier boundaries
	pub thresholds: Thresholds,
	/// Scoring constants
	pub weights: ScoreWeights,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			palette_size: 24,
			n_dominant: 3,
			n_accent: 2,
			max_dimension: 400,
			kmeans_iterations: 8,
			convergence_threshold: 0.5,
			seed: 0,
			thresholds: Thresholds::default(),
			weights: ScoreWeights::default(),
		}
	}
}

/// Count the unique colors in a slice of pixels, in parallel if the `threads` feature is enabled.
#[must_use]
pub fn unique_colors(pixels: &[Srgb<u8>]) -> UniqueColors {
	#[cfg(feature = "threads")]
	{
		UniqueColors::from_pixels_par(pixels)
	}
	#[cfg(not(feature = "threads"))]
	{
		UniqueColors::from_pixels(pixels)
	}
}

/// Downscale (if needed) and quantize a pixel buffer into a palette ordered by descending population.
///
/// An empty buffer gives an empty palette.
#[must_use]
pub fn palette_of(buffer: &PixelBuffer<'_>, options: &Options) -> Vec<PaletteEntry> {
	if buffer.is_empty() {
		return Vec::new();
	}

	let thumbnail = quantize::downscale(buffer, options.max_dimension);
	let pixels = thumbnail
		.as_ref()
		.map_or(buffer.pixels(), |image| palette::cast::from_component_slice(image.as_raw().as_slice()));

	quantize::quantize(
		&unique_colors(pixels),
		options.palette_size,
		options.kmeans_iterations,
		options.convergence_threshold,
		options.seed,
	)
}

/// Classify and score a palette using the thresholds and weights from `options`.
#[must_use]
pub fn score_palette(palette: &[PaletteEntry], options: &Options) -> Vec<ScoredColor> {
	score::score_palette(palette, &options.thresholds, &options.weights)
}

/// Run the full pipeline on a pixel buffer.
///
/// This never fails: an empty buffer gives an empty [`Selection`],
/// and small palettes give fewer colors than requested.
#[must_use]
pub fn analyze(buffer: &PixelBuffer<'_>, options: &Options) -> Selection {
	let palette = palette_of(buffer, options);
	let scored = score_palette(&palette, options);
	select::select(&scored, options.n_dominant, options.n_accent)
}

/// Run the full pipeline on a pixel buffer, reporting empty input as an error.
///
/// # Errors
/// Returns [`Error::EmptyImage`] if the buffer has zero area.
pub fn analyze_non_empty(buffer: &PixelBuffer<'_>, options: &Options) -> Result<Selection, Error> {
	if buffer.is_empty() {
		Err(Error::EmptyImage)
	} else {
		Ok(analyze(buffer, options))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dimension_mismatch() {
		let pixels = vec![Srgb::new(0, 0, 0); 10];
		assert_eq!(
			PixelBuffer::new(4, 3, &pixels).err(),
			Some(Error::DimensionMismatch { width: 4, height: 3, len: 10 })
		);
		assert!(PixelBuffer::new(5, 2, &pixels).is_ok());
	}

	#[test]
	fn zero_area_buffers_are_empty() {
		for (width, height) in [(0, 0), (0, 5), (5, 0)] {
			let buffer = PixelBuffer::new(width, height, &[]).expect("zero area");
			assert!(buffer.is_empty());
			assert!(analyze(&buffer, &Options::default()).is_empty());
			assert_eq!(analyze_non_empty(&buffer, &Options::default()), Err(Error::EmptyImage));
		}
	}

	#[test]
	fn rgb_image_buffer_matches_pixels() {
		let image = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 10, y as u8 * 20, 7]));
		let buffer = PixelBuffer::from_rgb_image(&image);

		assert_eq!(buffer.dimensions(), (3, 2));
		assert_eq!(buffer.pixels().len(), 6);
		assert_eq!(buffer.pixels()[4], Srgb::new(10, 20, 7));
	}

	#[test]
	fn downscaling_keeps_the_outcome() {
		let mut pixels = Vec::new();
		for y in 0..600u32 {
			for x in 0..900u32 {
				pixels.push(match (x < 450, y < 300) {
					(true, true) => Srgb::new(230, 20, 20),
					(false, true) => Srgb::new(20, 200, 40),
					(true, false) => Srgb::new(30, 40, 220),
					(false, false) => Srgb::new(240, 220, 30),
				});
			}
		}
		let buffer = PixelBuffer::new(900, 600, &pixels).expect("valid buffer");

		let options = Options { n_dominant: 4, ..Options::default() };
		let full = analyze(&buffer, &Options { max_dimension: 0, ..options });
		let small = analyze(&buffer, &options);

		let keys = |selection: &Selection| {
			let mut keys = selection.dominants.iter().map(|color| color.key).collect::<Vec<_>>();
			keys.sort();
			keys
		};

		assert_eq!(keys(&full), keys(&small));
	}
}
