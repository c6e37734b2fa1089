//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the selected colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Find the dominant and accent colors of an image and classify them by hue.
///
/// The image is quantized into a small palette, each palette color is scored by area, saturation,
/// brightness, and distinctiveness, and only the best color of each hue family is considered.
/// Meanings for each color can be provided with a JSON file.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// A JSON file mapping color names (e.g., "red", "turquoise", "grey") to their meanings
	///
	/// Each meaning is an object with optional "short", "long", and "chakra" strings.
	#[arg(short, long)]
	pub meanings: Option<PathBuf>,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The (maximum) number of palette colors to quantize the image into
	#[arg(short, default_value_t = 24, value_parser = clap::value_parser!(u8).range(1..))]
	pub k: u8,

	/// The (maximum) number of dominant colors to print
	#[arg(short, long, default_value_t = 3)]
	pub dominants: usize,

	/// The (maximum) number of accent colors to print
	#[arg(short, long, default_value_t = 2)]
	pub accents: usize,

	/// Images with a width or height above this are downscaled before quantization
	///
	/// Downscaling greatly reduces the running time for large images while barely changing the palette.
	/// Use 0 to always use the full image.
	#[arg(short = 'p', long, default_value_t = 400)]
	pub max_dimension: u32,

	/// The number of k-means iterations used to refine the palette
	///
	/// Use 0 to keep the median cut palette as is.
	#[arg(short = 'i', long, default_value_t = 8)]
	pub kmeans_iterations: u32,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// The hue in degrees where violet turns into pink
	#[arg(long, default_value_t = 320.0, value_parser = parse_valid_hue)]
	pub pink_start: f64,

	/// The minimum saturation for a hue above --pink-start to count as pink instead of violet
	#[arg(long, default_value_t = 0.25, value_parser = parse_valid_fraction)]
	pub pink_min_saturation: f64,

	/// The hue in degrees where blue turns into indigo
	#[arg(long, default_value_t = 250.0, value_parser = parse_valid_hue)]
	pub blue_indigo: f64,

	/// Colors brighter than this value (in [0.0, 1.0]) are treated like grey when scoring
	///
	/// The default of 1.0 only discounts colors that are too grey or too dark.
	/// A value like 0.95 also discounts near-white highlights.
	#[arg(long, default_value_t = 1.0, value_parser = parse_valid_fraction)]
	pub max_value: f64,

	/// The number of threads to use
	///
	/// A value of 0 indicates to automatically choose the number of threads.
	#[cfg(feature = "threads")]
	#[arg(short, long, default_value_t = 0)]
	pub threads: u8,

	/// Print additional information, such as the running time of each step
	#[arg(long)]
	pub verbose: bool,
}

impl Options {
	/// The library options corresponding to these arguments
	pub fn analysis_options(&self) -> huecodex::Options {
		let defaults = huecodex::Options::default();
		huecodex::Options {
			palette_size: self.k,
			n_dominant: self.dominants,
			n_accent: self.accents,
			max_dimension: self.max_dimension,
			kmeans_iterations: self.kmeans_iterations,
			seed: self.seed,
			thresholds: huecodex::Thresholds {
				violet_pink_hue: self.pink_start,
				pink_min_saturation: self.pink_min_saturation,
				blue_indigo_hue: self.blue_indigo,
				..defaults.thresholds
			},
			weights: huecodex::ScoreWeights {
				vivid_max_value: self.max_value,
				..defaults.weights
			},
			..defaults
		}
	}
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse a hue and ensure it is in `0.0..360.0`
fn parse_valid_hue(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..360.0)
}

/// Parse a saturation or value and ensure it is in `0.0..=1.0`
fn parse_valid_fraction(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..=1.0)
}
