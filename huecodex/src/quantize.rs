//! Reduces a buffer of pixels to a small palette of representative colors
//!
//! The pixels are first deduplicated into [`UniqueColors`].
//! If there are at most `k` unique colors, then these form the palette as is.
//! Otherwise, median cut splits the unique colors into at most `k` boxes,
//! and the box averages are optionally refined with a few iterations of k-means.

use crate::PixelBuffer;
use image::{imageops::FilterType, RgbImage};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use std::{cmp::Reverse, collections::HashMap};

/// A representative color of an image and the share of the image's pixels it covers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteEntry {
	/// The representative color
	pub color: Srgb<u8>,
	/// The number of pixels assigned to this color
	pub count: u64,
	/// The fraction of all pixels assigned to this color, in `0.0..=1.0`
	pub fraction: f64,
}

impl PaletteEntry {
	/// The population fraction as a percentage
	#[must_use]
	pub fn percentage(&self) -> f64 {
		self.fraction * 100.0
	}
}

/// Deduplicated colors and their counts, in the order each color was first encountered
#[derive(Debug, Clone, Default)]
pub struct UniqueColors {
	/// Unique colors
	colors: Vec<Srgb<u8>>,
	/// The number of pixels for each color
	counts: Vec<u64>,
}

/// Packs a color into a `u32` for use as a hash key
fn pack(color: Srgb<u8>) -> u32 {
	color.into_u32::<palette::rgb::channels::Rgba>()
}

impl UniqueColors {
	/// Count the unique colors in a row-major slice of pixels.
	#[must_use]
	pub fn from_pixels(pixels: &[Srgb<u8>]) -> Self {
		let mut unique = Self::default();

		// Packed Srgb -> index
		let mut memo: HashMap<u32, usize> = HashMap::new();

		for &srgb in pixels {
			let index = *memo.entry(pack(srgb)).or_insert_with(|| {
				unique.colors.push(srgb);
				unique.counts.push(0);
				unique.colors.len() - 1
			});

			unique.counts[index] += 1;
		}

		unique
	}

	/// Count the unique colors in a row-major slice of pixels in parallel.
	///
	/// The result is identical to [`UniqueColors::from_pixels`].
	#[cfg(feature = "threads")]
	#[must_use]
	pub fn from_pixels_par(pixels: &[Srgb<u8>]) -> Self {
		use rayon::prelude::*;

		let chunk_size = usize::max(pixels.len() / rayon::current_num_threads(), 4096);
		let chunks = pixels
			.par_chunks(chunk_size)
			.map(Self::from_pixels)
			.collect::<Vec<_>>();

		// Merging in chunk order keeps the row-major first encounter order
		let mut unique = Self::default();
		let mut memo: HashMap<u32, usize> = HashMap::new();
		for chunk in chunks {
			for (srgb, n) in chunk.pairs() {
				let index = *memo.entry(pack(srgb)).or_insert_with(|| {
					unique.colors.push(srgb);
					unique.counts.push(0);
					unique.colors.len() - 1
				});

				unique.counts[index] += n;
			}
		}

		unique
	}

	/// The number of unique colors
	#[must_use]
	pub fn num_colors(&self) -> usize {
		self.colors.len()
	}

	/// The total number of pixels
	#[must_use]
	pub fn total(&self) -> u64 {
		self.counts.iter().sum()
	}

	/// The unique colors in first encounter order
	#[must_use]
	pub fn colors(&self) -> &[Srgb<u8>] {
		&self.colors
	}

	/// The number of pixels for each unique color
	#[must_use]
	pub fn counts(&self) -> &[u64] {
		&self.counts
	}

	/// Iterate over each color and its count
	fn pairs(&self) -> impl Iterator<Item = (Srgb<u8>, u64)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}
}

/// Returns the red, green, or blue component of a color
fn component(color: Srgb<u8>, i: usize) -> u8 {
	match i {
		0 => color.red,
		1 => color.green,
		_ => color.blue,
	}
}

/// Convert a color to floating point components
fn to_f64(color: Srgb<u8>) -> [f64; 3] {
	[f64::from(color.red), f64::from(color.green), f64::from(color.blue)]
}

/// Squared euclidean distance between two floating point colors
fn squared_distance(x: [f64; 3], y: [f64; 3]) -> f64 {
	let dr = x[0] - y[0];
	let dg = x[1] - y[1];
	let db = x[2] - y[2];
	dr * dr + dg * dg + db * db
}

/// A box around a range of colors in the median cut color order
#[derive(Debug, Clone, Copy)]
struct ColorBox {
	/// Start index into the color order
	start: usize,
	/// End index (exclusive) into the color order
	end: usize,
	/// Total count of all colors in this box
	population: u64,
	/// Minimum value of each component
	min: [u8; 3],
	/// Maximum value of each component
	max: [u8; 3],
}

impl ColorBox {
	/// Create a box that tightly fits around the colors in `order[start..end]`
	fn new(unique: &UniqueColors, order: &[usize], start: usize, end: usize) -> Self {
		let mut population = 0;
		let mut min = [u8::MAX; 3];
		let mut max = [0; 3];

		for &i in &order[start..end] {
			population += unique.counts[i];
			for c in 0..3 {
				let value = component(unique.colors[i], c);
				min[c] = min[c].min(value);
				max[c] = max[c].max(value);
			}
		}

		Self { start, end, population, min, max }
	}

	/// The volume of this box in RGB space
	fn volume(&self) -> u32 {
		(0..3)
			.map(|c| u32::from(self.max[c] - self.min[c]) + 1)
			.product()
	}

	/// Whether this box contains more than one color
	fn can_split(&self) -> bool {
		self.end - self.start > 1
	}

	/// The component with the largest range, preferring red, then green, then blue on ties
	fn longest_component(&self) -> usize {
		let lengths = [0, 1, 2].map(|c| self.max[c] - self.min[c]);
		let mut longest = 0;
		for c in 1..3 {
			if lengths[c] > lengths[longest] {
				longest = c;
			}
		}
		longest
	}

	/// Split this box in two at the population median of its longest component
	fn split(self, unique: &UniqueColors, order: &mut [usize]) -> (Self, Self) {
		debug_assert!(self.can_split());

		let c = self.longest_component();
		order[self.start..self.end].sort_by_key(|&i| component(unique.colors[i], c));

		// The first color to cross the midpoint starts the second box.
		// The first box always keeps at least one color.
		let midpoint = self.population / 2;
		let mut population = 0;
		let mut split = self.start + 1;
		for (offset, &i) in order[self.start..self.end].iter().enumerate() {
			population += unique.counts[i];
			if population >= midpoint {
				split = self.start + offset.max(1);
				break;
			}
		}

		(
			Self::new(unique, order, self.start, split),
			Self::new(unique, order, split, self.end),
		)
	}
}

/// Split the unique colors into at most `k` groups using median cut.
///
/// Returns the unique color indices for each group.
fn median_cut(unique: &UniqueColors, k: usize) -> Vec<Vec<usize>> {
	let n = unique.num_colors();
	let mut order = (0..n).collect::<Vec<_>>();
	let mut boxes = vec![ColorBox::new(unique, &order, 0, n)];

	while boxes.len() < k {
		// Split the box with the largest volume, taking the first one on ties
		let mut largest: Option<usize> = None;
		for (i, color_box) in boxes.iter().enumerate() {
			if color_box.can_split() && largest.map_or(true, |j| color_box.volume() > boxes[j].volume()) {
				largest = Some(i);
			}
		}

		let Some(i) = largest else {
			break;
		};

		let (left, right) = boxes[i].split(unique, &mut order);
		boxes[i] = left;
		boxes.push(right);
	}

	boxes
		.iter()
		.map(|color_box| order[color_box.start..color_box.end].to_vec())
		.collect()
}

/// Returns the index of the closest centroid, taking the lowest index on ties
fn nearest(color: [f64; 3], centroids: &[[f64; 3]]) -> usize {
	let mut min_dist = f64::INFINITY;
	let mut min_center = 0;
	for (i, &centroid) in centroids.iter().enumerate() {
		let dist = squared_distance(color, centroid);
		if dist < min_dist {
			min_dist = dist;
			min_center = i;
		}
	}
	min_center
}

/// For each unique color, find its closest centroid
#[cfg(not(feature = "threads"))]
fn update_assignments(unique: &UniqueColors, centroids: &[[f64; 3]], assignment: &mut [usize]) {
	for (center, &color) in assignment.iter_mut().zip(&unique.colors) {
		*center = nearest(to_f64(color), centroids);
	}
}

/// For each unique color, find its closest centroid
#[cfg(feature = "threads")]
fn update_assignments(unique: &UniqueColors, centroids: &[[f64; 3]], assignment: &mut [usize]) {
	use rayon::prelude::*;

	assignment
		.par_iter_mut()
		.zip(&unique.colors)
		.for_each(|(center, &color)| *center = nearest(to_f64(color), centroids));
}

/// Move each centroid to the mean of its assigned colors, returning the total distance moved.
///
/// Centroids with no assigned colors are moved to a randomly chosen unique color.
fn update_centroids(
	rng: &mut impl Rng,
	unique: &UniqueColors,
	assignment: &[usize],
	centroids: &mut [[f64; 3]],
) -> f64 {
	let k = centroids.len();
	let mut sums = vec![[0.0; 3]; k];
	let mut counts = vec![0u64; k];

	for ((color, n), &center) in unique.pairs().zip(assignment) {
		#[allow(clippy::cast_precision_loss)]
		let nf = n as f64;
		let color = to_f64(color);
		let sum = &mut sums[center];
		for c in 0..3 {
			sum[c] += nf * color[c];
		}
		counts[center] += n;
	}

	let mut total_delta = 0.0;
	for ((centroid, sum), &n) in centroids.iter_mut().zip(&sums).zip(&counts) {
		let new_centroid = if n == 0 {
			to_f64(unique.colors[rng.gen_range(0..unique.num_colors())])
		} else {
			#[allow(clippy::cast_precision_loss)]
			let n = n as f64;
			sum.map(|s| s / n)
		};

		total_delta += squared_distance(*centroid, new_centroid).sqrt();
		*centroid = new_centroid;
	}

	total_delta
}

/// Refine the groups from median cut using k-means.
///
/// Returns the final group index for each unique color.
fn kmeans(
	unique: &UniqueColors,
	groups: &[Vec<usize>],
	max_iter: u32,
	convergence_threshold: f64,
	seed: u64,
) -> Vec<usize> {
	let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed);

	let mut centroids = groups
		.iter()
		.map(|group| {
			let mut sum = [0.0; 3];
			let mut total = 0.0;
			for &i in group {
				#[allow(clippy::cast_precision_loss)]
				let n = unique.counts[i] as f64;
				let color = to_f64(unique.colors[i]);
				for c in 0..3 {
					sum[c] += n * color[c];
				}
				total += n;
			}
			sum.map(|s| s / total)
		})
		.collect::<Vec<_>>();

	let mut assignment = vec![0; unique.num_colors()];
	update_assignments(unique, &centroids, &mut assignment);

	for _ in 0..max_iter {
		let total_delta = update_centroids(&mut rng, unique, &assignment, &mut centroids);
		update_assignments(unique, &centroids, &mut assignment);
		if total_delta <= convergence_threshold {
			break;
		}
	}

	assignment
}

/// A group of unique colors being turned into a [`PaletteEntry`]
#[derive(Debug, Clone, Copy)]
struct Cluster {
	/// Weighted component sums
	sum: [f64; 3],
	/// Total number of pixels
	count: u64,
	/// The lowest first encounter index of any member color
	first: usize,
}

/// Build palette entries from a group assignment for each unique color
fn entries_from_assignment(unique: &UniqueColors, assignment: &[usize], k: usize) -> Vec<PaletteEntry> {
	let mut clusters = vec![Cluster { sum: [0.0; 3], count: 0, first: usize::MAX }; k];

	for (i, ((color, n), &group)) in unique.pairs().zip(assignment).enumerate() {
		let cluster = &mut clusters[group];
		#[allow(clippy::cast_precision_loss)]
		let nf = n as f64;
		let color = to_f64(color);
		for c in 0..3 {
			cluster.sum[c] += nf * color[c];
		}
		cluster.count += n;
		cluster.first = cluster.first.min(i);
	}

	// Clusters may round to the same color, so these are merged
	let mut merged: Vec<(Srgb<u8>, u64, usize)> = Vec::with_capacity(k);
	let mut memo: HashMap<u32, usize> = HashMap::new();

	for cluster in clusters.into_iter().filter(|cluster| cluster.count > 0) {
		#[allow(clippy::cast_precision_loss)]
		let n = cluster.count as f64;
		// averages of 8-bit values stay in 0.0..=255.0
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let [red, green, blue] = cluster.sum.map(|s| (s / n).round() as u8);
		let color = Srgb::new(red, green, blue);

		match memo.get(&pack(color)) {
			Some(&index) => {
				let entry = &mut merged[index];
				entry.1 += cluster.count;
				entry.2 = entry.2.min(cluster.first);
			},
			None => {
				memo.insert(pack(color), merged.len());
				merged.push((color, cluster.count, cluster.first));
			},
		}
	}

	finish(merged)
}

/// Sort by descending count, breaking ties by first encounter, and compute fractions
#[allow(clippy::cast_precision_loss)]
fn finish(mut entries: Vec<(Srgb<u8>, u64, usize)>) -> Vec<PaletteEntry> {
	entries.sort_by_key(|&(_, count, first)| (Reverse(count), first));

	let total = entries.iter().map(|&(_, count, _)| count).sum::<u64>();

	entries
		.into_iter()
		.map(|(color, count, _)| PaletteEntry {
			color,
			count,
			fraction: count as f64 / total as f64,
		})
		.collect()
}

/// Reduce unique colors to a palette of at most `k` colors ordered by descending population.
///
/// `max_iter` is the number of k-means iterations used to refine the median cut boxes
/// (`0` keeps the boxes as is), and `seed` seeds the random number generator
/// used to revive empty k-means clusters.
///
/// An empty palette is returned if there are no colors or `k` is `0`.
#[must_use]
pub fn quantize(
	unique: &UniqueColors,
	k: u8,
	max_iter: u32,
	convergence_threshold: f64,
	seed: u64,
) -> Vec<PaletteEntry> {
	let k = usize::from(k);

	if k == 0 || unique.num_colors() == 0 {
		Vec::new()
	} else if unique.num_colors() <= k {
		finish(
			unique
				.pairs()
				.enumerate()
				.map(|(i, (color, count))| (color, count, i))
				.collect(),
		)
	} else {
		let groups = median_cut(unique, k);

		let assignment = if max_iter == 0 {
			let mut assignment = vec![0; unique.num_colors()];
			for (group, members) in groups.iter().enumerate() {
				for &i in members {
					assignment[i] = group;
				}
			}
			assignment
		} else {
			kmeans(unique, &groups, max_iter, convergence_threshold, seed)
		};

		entries_from_assignment(unique, &assignment, groups.len())
	}
}

/// Proportionally shrink the buffer if either dimension is larger than `max_dimension`,
/// using a Lanczos filter.
///
/// Returns `None` if no resize is needed or `max_dimension` is `0`.
#[must_use]
pub fn downscale(buffer: &PixelBuffer<'_>, max_dimension: u32) -> Option<RgbImage> {
	let (width, height) = buffer.dimensions();
	let largest = width.max(height);

	if max_dimension == 0 || largest <= max_dimension || width == 0 || height == 0 {
		return None;
	}

	let scale = f64::from(max_dimension) / f64::from(largest);

	// multiplying by a positive factor < 1
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let (thumb_width, thumb_height) = (
		((f64::from(width) * scale) as u32).max(1),
		((f64::from(height) * scale) as u32).max(1),
	);

	let image = RgbImage::from_raw(
		width,
		height,
		palette::cast::into_component_slice(buffer.pixels()).to_vec(),
	)?;

	Some(image::imageops::resize(&image, thumb_width, thumb_height, FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	fn gradient(width: u8, height: u8) -> Vec<Srgb<u8>> {
		let mut pixels = Vec::new();
		for y in 0..height {
			for x in 0..width {
				pixels.push(Srgb::new(x.wrapping_mul(7), y.wrapping_mul(11), x ^ y));
			}
		}
		pixels
	}

	fn fraction_sum(palette: &[PaletteEntry]) -> f64 {
		palette.iter().map(|entry| entry.fraction).sum()
	}

	#[test]
	fn fractions_sum_to_one() {
		let unique = UniqueColors::from_pixels(&gradient(64, 48));
		for k in [1, 5, 8, 24] {
			for max_iter in [0, 8] {
				let palette = quantize(&unique, k, max_iter, 0.5, 0);
				assert!(!palette.is_empty());
				assert!(palette.len() <= usize::from(k));
				assert_relative_eq!(fraction_sum(&palette), 1.0, epsilon = 1e-6);
				assert_eq!(palette.iter().map(|entry| entry.count).sum::<u64>(), 64 * 48);
			}
		}
	}

	#[test]
	fn sorted_by_descending_fraction() {
		let unique = UniqueColors::from_pixels(&gradient(40, 40));
		let palette = quantize(&unique, 16, 8, 0.5, 0);
		for pair in palette.windows(2) {
			assert!(pair[0].count >= pair[1].count);
		}
	}

	#[test]
	fn exact_histogram_ties_keep_first_encounter() {
		let a = Srgb::new(10, 20, 30);
		let b = Srgb::new(200, 100, 0);
		let c = Srgb::new(0, 0, 255);
		let unique = UniqueColors::from_pixels(&[b, a, a, b, c]);

		let palette = quantize(&unique, 5, 8, 0.5, 0);
		let colors = palette.iter().map(|entry| entry.color).collect::<Vec<_>>();
		assert_eq!(colors, vec![b, a, c]);
		assert_relative_eq!(palette[0].fraction, 0.4);
		assert_relative_eq!(palette[2].fraction, 0.2);
	}

	#[test]
	fn unique_colors_keep_first_encounter_order() {
		let pixels = [Srgb::new(3, 3, 3), Srgb::new(1, 1, 1), Srgb::new(3, 3, 3), Srgb::new(2, 2, 2)];
		let unique = UniqueColors::from_pixels(&pixels);
		assert_eq!(unique.colors(), &[Srgb::new(3, 3, 3), Srgb::new(1, 1, 1), Srgb::new(2, 2, 2)]);
		assert_eq!(unique.counts(), &[2, 1, 1]);
		assert_eq!(unique.total(), 4);
	}

	#[test]
	#[cfg(feature = "threads")]
	fn parallel_unique_colors_match_serial() {
		let mut pixels = gradient(200, 200);
		pixels.extend(gradient(150, 100));

		let serial = UniqueColors::from_pixels(&pixels);
		let parallel = UniqueColors::from_pixels_par(&pixels);
		assert_eq!(serial.colors(), parallel.colors());
		assert_eq!(serial.counts(), parallel.counts());
	}

	#[test]
	fn same_seed_same_palette() {
		let unique = UniqueColors::from_pixels(&gradient(64, 64));
		assert_eq!(quantize(&unique, 12, 16, 0.0, 7), quantize(&unique, 12, 16, 0.0, 7));
	}

	#[test]
	fn median_cut_covers_every_color_once() {
		let unique = UniqueColors::from_pixels(&gradient(32, 32));
		let groups = median_cut(&unique, 10);
		assert_eq!(groups.len(), 10);

		let mut seen = groups.concat();
		seen.sort_unstable();
		assert_eq!(seen, (0..unique.num_colors()).collect::<Vec<_>>());
	}

	#[test]
	fn median_cut_stops_when_no_box_can_split() {
		let unique = UniqueColors::from_pixels(&[Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)]);
		assert_eq!(median_cut(&unique, 5).len(), 2);
	}

	#[test]
	fn empty_input() {
		let unique = UniqueColors::from_pixels(&[]);
		assert!(quantize(&unique, 8, 8, 0.5, 0).is_empty());
	}

	#[test]
	fn zero_k() {
		let unique = UniqueColors::from_pixels(&gradient(4, 4));
		assert!(quantize(&unique, 0, 8, 0.5, 0).is_empty());
	}

	#[test]
	fn downscale_caps_largest_dimension() {
		let pixels = vec![Srgb::new(10, 200, 30); 800 * 200];
		let buffer = PixelBuffer::new(800, 200, &pixels).expect("valid buffer");

		let thumb = downscale(&buffer, 400).expect("resized");
		assert_eq!(thumb.dimensions(), (400, 100));
		assert!(downscale(&buffer, 800).is_none());
		assert!(downscale(&buffer, 0).is_none());
	}

	#[test]
	fn downscale_keeps_flat_color() {
		let pixels = vec![Srgb::new(10, 200, 30); 500 * 500];
		let buffer = PixelBuffer::new(500, 500, &pixels).expect("valid buffer");

		let thumb = downscale(&buffer, 100).expect("resized");
		assert!(thumb.pixels().all(|pixel| pixel.0 == [10, 200, 30]));
	}
}
