//! Maps colors to a coarse [`HueBucket`] and a fine [`ColorKey`]
//!
//! Both classifications are total: every 8-bit sRGB color gets exactly one bucket and one key.
//!
//! # Decision order for keys
//!
//! The achromatic checks run before any hue test, since the hue of a grey pixel is meaningless.
//! With the [`Thresholds::default`] values:
//!
//! 1. value ≤ 0.06 → black
//! 2. saturation ≤ 0.12 and value ≥ 0.92 → white
//! 3. saturation ≤ 0.18 → grey
//! 4. hue in [10°, 45°) and value < 0.65 → brown
//! 5. hue in [150°, 185°) → turquoise
//! 6. hue in [275°, 320°) → violet,
//!    hue in [320°, 345°) → pink if saturation ≥ 0.25, otherwise violet
//! 7. red [345°, 15°), orange [15°, 45°), yellow [45°, 65°), green [65°, 150°),
//!    blue [185°, 250°), indigo [250°, 275°)
//!
//! # Buckets
//!
//! Black, white, and grey fall into [`HueBucket::Neutral`].
//! Everything else is placed by hue alone on the arcs
//! red [340°, 20°), orange [20°, 45°), yellow [45°, 65°), green [65°, 150°), cyan [150°, 185°),
//! blue [185°, 250°), indigo [250°, 275°), violet [275°, 320°), and pink [320°, 340°).

use crate::color::{rgb_to_hsv, Hsv};
use palette::Srgb;
use std::fmt::{self, Display};

/// A region of the color wheel used to keep selected colors perceptually distinct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HueBucket {
	/// Red
	Red,
	/// Orange
	Orange,
	/// Yellow
	Yellow,
	/// Green
	Green,
	/// Cyan
	Cyan,
	/// Blue
	Blue,
	/// Indigo
	Indigo,
	/// Violet
	Violet,
	/// Pink
	Pink,
	/// Black, white, and grey
	Neutral,
}

impl HueBucket {
	/// The lowercase name of this bucket
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Red => "red",
			Self::Orange => "orange",
			Self::Yellow => "yellow",
			Self::Green => "green",
			Self::Cyan => "cyan",
			Self::Blue => "blue",
			Self::Indigo => "indigo",
			Self::Violet => "violet",
			Self::Pink => "pink",
			Self::Neutral => "neutral",
		}
	}
}

impl Display for HueBucket {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A fine grained color category, used as the key for meaning lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColorKey {
	/// Black
	Black,
	/// White
	White,
	/// Grey
	Grey,
	/// Brown (dark orange)
	Brown,
	/// Turquoise
	Turquoise,
	/// Red
	Red,
	/// Orange
	Orange,
	/// Yellow
	Yellow,
	/// Green
	Green,
	/// Blue
	Blue,
	/// Indigo
	Indigo,
	/// Violet
	Violet,
	/// Pink / magenta
	Pink,
}

impl ColorKey {
	/// The lowercase name of this key, as used by a [`crate::MeaningLookup`]
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Black => "black",
			Self::White => "white",
			Self::Grey => "grey",
			Self::Brown => "brown",
			Self::Turquoise => "turquoise",
			Self::Red => "red",
			Self::Orange => "orange",
			Self::Yellow => "yellow",
			Self::Green => "green",
			Self::Blue => "blue",
			Self::Indigo => "indigo",
			Self::Violet => "violet",
			Self::Pink => "pink",
		}
	}

	/// Whether this is black, white, or grey
	#[must_use]
	pub const fn is_achromatic(self) -> bool {
		matches!(self, Self::Black | Self::White | Self::Grey)
	}
}

impl Display for ColorKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// The result of classifying a single color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
	/// The coarse hue bucket
	pub bucket: HueBucket,
	/// The fine category key
	pub key: ColorKey,
}

/// Boundaries used by the classifier
///
/// Hue boundaries are in degrees and each one is the inclusive start of the following arc.
/// Hand written variants of this classifier disagree on several of these values
/// (notably the blue/indigo edge and the violet/pink split), so all of them are configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
	/// Colors with a value at or below this are black
	pub black_max_value: f64,
	/// Colors with a saturation at or below this (and a high enough value) are white
	pub white_max_saturation: f64,
	/// Colors with a value at or above this (and a low enough saturation) are white
	pub white_min_value: f64,
	/// Colors with a saturation at or below this are grey
	pub grey_max_saturation: f64,
	/// Start of the brown hue range
	pub brown_min_hue: f64,
	/// End (exclusive) of the brown hue range
	pub brown_max_hue: f64,
	/// Colors in the brown hue range are brown only if their value is below this
	pub brown_max_value: f64,
	/// Key boundary between red and orange
	pub red_orange_hue: f64,
	/// Boundary between orange and yellow
	pub orange_yellow_hue: f64,
	/// Boundary between yellow and green
	pub yellow_green_hue: f64,
	/// Boundary between green and turquoise/cyan
	pub green_cyan_hue: f64,
	/// Boundary between turquoise/cyan and blue
	pub cyan_blue_hue: f64,
	/// Boundary between blue and indigo
	pub blue_indigo_hue: f64,
	/// Boundary between indigo and violet
	pub indigo_violet_hue: f64,
	/// Boundary between violet and pink
	pub violet_pink_hue: f64,
	/// Key boundary between pink/violet and red
	pub pink_red_hue: f64,
	/// Colors in the pink hue range with a saturation below this are keyed as violet
	pub pink_min_saturation: f64,
	/// Bucket boundary between red and orange
	pub bucket_red_orange_hue: f64,
	/// Bucket boundary between pink and red
	pub bucket_pink_red_hue: f64,
}

impl Default for Thresholds {
	fn default() -> Self {
		Self {
			black_max_value: 0.06,
			white_max_saturation: 0.12,
			white_min_value: 0.92,
			grey_max_saturation: 0.18,
			brown_min_hue: 10.0,
			brown_max_hue: 45.0,
			brown_max_value: 0.65,
			red_orange_hue: 15.0,
			orange_yellow_hue: 45.0,
			yellow_green_hue: 65.0,
			green_cyan_hue: 150.0,
			cyan_blue_hue: 185.0,
			blue_indigo_hue: 250.0,
			indigo_violet_hue: 275.0,
			violet_pink_hue: 320.0,
			pink_red_hue: 345.0,
			pink_min_saturation: 0.25,
			bucket_red_orange_hue: 20.0,
			bucket_pink_red_hue: 340.0,
		}
	}
}

impl Thresholds {
	/// Whether the color is black, white, or grey
	#[must_use]
	pub fn is_achromatic(&self, hsv: Hsv) -> bool {
		self.achromatic_key(hsv).is_some()
	}

	/// Returns the achromatic key for the color, if any
	fn achromatic_key(&self, Hsv { saturation, value, .. }: Hsv) -> Option<ColorKey> {
		if value <= self.black_max_value {
			Some(ColorKey::Black)
		} else if saturation <= self.white_max_saturation && value >= self.white_min_value {
			Some(ColorKey::White)
		} else if saturation <= self.grey_max_saturation {
			Some(ColorKey::Grey)
		} else {
			None
		}
	}

	/// Returns the fine key for the given color
	#[must_use]
	pub fn key(&self, hsv: Hsv) -> ColorKey {
		if let Some(key) = self.achromatic_key(hsv) {
			return key;
		}

		let Hsv { hue, saturation, value } = hsv;

		if (self.brown_min_hue..self.brown_max_hue).contains(&hue) && value < self.brown_max_value {
			ColorKey::Brown
		} else if hue >= self.pink_red_hue || hue < self.red_orange_hue {
			ColorKey::Red
		} else if hue < self.orange_yellow_hue {
			ColorKey::Orange
		} else if hue < self.yellow_green_hue {
			ColorKey::Yellow
		} else if hue < self.green_cyan_hue {
			ColorKey::Green
		} else if hue < self.cyan_blue_hue {
			ColorKey::Turquoise
		} else if hue < self.blue_indigo_hue {
			ColorKey::Blue
		} else if hue < self.indigo_violet_hue {
			ColorKey::Indigo
		} else if hue >= self.violet_pink_hue && saturation >= self.pink_min_saturation {
			ColorKey::Pink
		} else {
			ColorKey::Violet
		}
	}

	/// Returns the hue bucket for the given color
	#[must_use]
	pub fn bucket(&self, hsv: Hsv) -> HueBucket {
		if self.is_achromatic(hsv) {
			return HueBucket::Neutral;
		}

		let hue = hsv.hue;
		if hue >= self.bucket_pink_red_hue || hue < self.bucket_red_orange_hue {
			HueBucket::Red
		} else if hue < self.orange_yellow_hue {
			HueBucket::Orange
		} else if hue < self.yellow_green_hue {
			HueBucket::Yellow
		} else if hue < self.green_cyan_hue {
			HueBucket::Green
		} else if hue < self.cyan_blue_hue {
			HueBucket::Cyan
		} else if hue < self.blue_indigo_hue {
			HueBucket::Blue
		} else if hue < self.indigo_violet_hue {
			HueBucket::Indigo
		} else if hue < self.violet_pink_hue {
			HueBucket::Violet
		} else {
			HueBucket::Pink
		}
	}
}

/// Classify a color given in HSV.
#[must_use]
pub fn classify_hsv(hsv: Hsv, thresholds: &Thresholds) -> Classification {
	Classification {
		bucket: thresholds.bucket(hsv),
		key: thresholds.key(hsv),
	}
}

/// Classify an sRGB color.
#[must_use]
pub fn classify(color: Srgb<u8>, thresholds: &Thresholds) -> Classification {
	classify_hsv(rgb_to_hsv(color), thresholds)
}
