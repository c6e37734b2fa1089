//! Salience scores for palette entries
//!
//! A vivid color is scored with
//!
//! ```text
//! fraction^area_exponent
//!     * (saturation_baseline + saturation_weight * saturation)
//!     * (value_baseline + value_weight * value)
//!     * (distinctiveness_baseline + distinctiveness_weight * distinctiveness)
//! ```
//!
//! where distinctiveness is the mean RGB distance to every other palette color divided by [`MAX_DISTANCE`].
//! Colors that are not vivid (too grey, too dark, or too bright) only get `fraction * discount`,
//! which keeps backgrounds and shadows from crowding out the interesting colors.

use crate::{
	classify::{classify_hsv, ColorKey, HueBucket, Thresholds},
	color::{self, distance, rgb_to_hsv, Hsv, MAX_DISTANCE},
	meaning::{Meaning, MeaningLookup},
	PaletteEntry,
};
use palette::Srgb;

/// The constants used by the scoring formula
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreWeights {
	/// Exponent applied to the population fraction
	pub area_exponent: f64,
	/// Saturation factor baseline
	pub saturation_baseline: f64,
	/// Saturation factor weight
	pub saturation_weight: f64,
	/// Value factor baseline
	pub value_baseline: f64,
	/// Value factor weight
	pub value_weight: f64,
	/// Distinctiveness factor baseline
	pub distinctiveness_baseline: f64,
	/// Distinctiveness factor weight
	pub distinctiveness_weight: f64,
	/// Colors with a lower saturation are discounted
	pub vivid_min_saturation: f64,
	/// Colors with a lower value are discounted
	pub vivid_min_value: f64,
	/// Colors with a higher value are discounted
	pub vivid_max_value: f64,
	/// The factor applied to the population fraction of discounted colors
	pub discount: f64,
}

impl Default for ScoreWeights {
	fn default() -> Self {
		Self {
			area_exponent: 0.6,
			saturation_baseline: 0.4,
			saturation_weight: 0.6,
			value_baseline: 0.5,
			value_weight: 0.5,
			distinctiveness_baseline: 0.8,
			distinctiveness_weight: 0.2,
			vivid_min_saturation: 0.25,
			vivid_min_value: 0.2,
			vivid_max_value: 1.0,
			discount: 0.05,
		}
	}
}

impl ScoreWeights {
	/// Whether a color gets the full scoring formula instead of the discount
	#[must_use]
	pub fn is_vivid(&self, hsv: Hsv) -> bool {
		hsv.saturation >= self.vivid_min_saturation
			&& (self.vivid_min_value..=self.vivid_max_value).contains(&hsv.value)
	}

	/// Score a palette entry against the palette it came from.
	///
	/// The result is always `>= 0.0`.
	#[must_use]
	pub fn score(&self, entry: &PaletteEntry, palette: &[PaletteEntry]) -> f64 {
		self.score_hsv(entry, rgb_to_hsv(entry.color), palette)
	}

	/// Score a palette entry with an already computed [`Hsv`]
	pub(crate) fn score_hsv(&self, entry: &PaletteEntry, hsv: Hsv, palette: &[PaletteEntry]) -> f64 {
		let fraction = entry.fraction.max(0.0);

		if !self.is_vivid(hsv) {
			return fraction * self.discount;
		}

		let score = fraction.powf(self.area_exponent)
			* (self.saturation_baseline + self.saturation_weight * hsv.saturation)
			* (self.value_baseline + self.value_weight * hsv.value)
			* (self.distinctiveness_baseline + self.distinctiveness_weight * distinctiveness(entry, palette));

		score.max(0.0)
	}
}

/// The mean distance from an entry to every palette color that differs from it,
/// normalized by [`MAX_DISTANCE`] to the range `0.0..=1.0`.
///
/// Returns `1.0` if there are no other colors.
#[must_use]
pub fn distinctiveness(entry: &PaletteEntry, palette: &[PaletteEntry]) -> f64 {
	let (sum, n) = palette
		.iter()
		.filter(|other| other.color != entry.color)
		.fold((0.0, 0u32), |(sum, n), other| (sum + distance(entry.color, other.color), n + 1));

	if n == 0 {
		1.0
	} else {
		sum / f64::from(n) / MAX_DISTANCE
	}
}

/// A palette entry together with its classification and score
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredColor {
	/// The palette entry
	pub entry: PaletteEntry,
	/// The entry's color in HSV
	pub hsv: Hsv,
	/// The hue bucket
	pub bucket: HueBucket,
	/// The fine category key
	pub key: ColorKey,
	/// The salience score
	pub score: f64,
	/// Whether the score came from the full formula rather than the discount
	pub vivid: bool,
}

impl ScoredColor {
	/// The representative color
	#[must_use]
	pub fn color(&self) -> Srgb<u8> {
		self.entry.color
	}

	/// The color as a `#RRGGBB` hex string
	#[must_use]
	pub fn hex(&self) -> String {
		color::hex(self.entry.color)
	}

	/// The population fraction as a percentage
	#[must_use]
	pub fn percentage(&self) -> f64 {
		self.entry.percentage()
	}

	/// Look up the meaning for this color's fine key
	pub fn meaning<'a, L: MeaningLookup + ?Sized>(&self, lookup: &'a L) -> Option<&'a Meaning> {
		lookup.lookup(self.key.name())
	}
}

/// Classify and score every entry of a palette, keeping the palette order.
#[must_use]
pub fn score_palette(palette: &[PaletteEntry], thresholds: &Thresholds, weights: &ScoreWeights) -> Vec<ScoredColor> {
	palette
		.iter()
		.map(|entry| {
			let hsv = rgb_to_hsv(entry.color);
			let classification = classify_hsv(hsv, thresholds);
			ScoredColor {
				entry: *entry,
				hsv,
				bucket: classification.bucket,
				key: classification.key,
				score: weights.score_hsv(entry, hsv, palette),
				vivid: weights.is_vivid(hsv),
			}
		})
		.collect()
}
