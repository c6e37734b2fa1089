//! Picks dominant and accent colors from a scored palette
//!
//! Colors are first grouped by [`crate::HueBucket`] and only the best scoring color of each bucket is kept.
//! Otherwise, an image dominated by one hue family would fill every dominant slot with near identical colors.
//! The kept colors with the highest scores become the dominants.
//! The accents are the most vivid of the remaining colors.

use crate::{meaning::MeaningLookup, score::ScoredColor};

/// The final dominant and accent colors of an image
///
/// No two colors in a selection share a [`crate::HueBucket`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
	/// The highest scoring colors, by descending score
	pub dominants: Vec<ScoredColor>,
	/// Vivid colors not among the dominants, by descending saturation and then value
	pub accents: Vec<ScoredColor>,
}

impl Selection {
	/// Whether both the dominants and accents are empty
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.dominants.is_empty() && self.accents.is_empty()
	}

	/// Join the short meanings of the dominant colors with `" • "`.
	///
	/// Colors with no meaning or an empty short meaning are skipped.
	#[must_use]
	pub fn summary<L: MeaningLookup + ?Sized>(&self, lookup: &L) -> String {
		self.dominants
			.iter()
			.filter_map(|color| color.meaning(lookup))
			.map(|meaning| meaning.short.as_str())
			.filter(|short| !short.is_empty())
			.collect::<Vec<_>>()
			.join(" • ")
	}
}

/// The best scoring color of each bucket, in the order each bucket was first encountered.
///
/// Ties keep the earlier color.
#[must_use]
pub fn best_per_bucket(scored: &[ScoredColor]) -> Vec<ScoredColor> {
	let mut best: Vec<ScoredColor> = Vec::new();

	for color in scored {
		match best.iter_mut().find(|best| best.bucket == color.bucket) {
			Some(best) => {
				if color.score > best.score {
					*best = *color;
				}
			},
			None => best.push(*color),
		}
	}

	best
}

/// Select up to `n_dominant` dominant colors and up to `n_accent` accent colors.
///
/// Both lists are shorter if there are not enough distinct buckets,
/// and colors that were discounted for being grey, too dark, or too bright are never accents.
#[must_use]
pub fn select(scored: &[ScoredColor], n_dominant: usize, n_accent: usize) -> Selection {
	let mut dominants = best_per_bucket(scored);

	// stable, so equal scores keep the bucket order
	dominants.sort_by(|x, y| f64::total_cmp(&y.score, &x.score));

	let rest = dominants.split_off(usize::min(n_dominant, dominants.len()));

	let mut accents = rest.into_iter().filter(|color| color.vivid).collect::<Vec<_>>();
	accents.sort_by(|x, y| {
		f64::total_cmp(&y.hsv.saturation, &x.hsv.saturation)
			.then_with(|| f64::total_cmp(&y.hsv.value, &x.hsv.value))
	});
	accents.truncate(n_accent);

	Selection { dominants, accents }
}
