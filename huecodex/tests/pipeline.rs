use approx::assert_relative_eq;
use huecodex::{analyze, palette_of, ColorKey, HueBucket, Options, PixelBuffer, Selection};
use palette::Srgb;

fn image(width: u32, height: u32, color: impl Fn(u32, u32) -> Srgb<u8>) -> Vec<Srgb<u8>> {
	let mut pixels = Vec::new();
	for y in 0..height {
		for x in 0..width {
			pixels.push(color(x, y));
		}
	}
	pixels
}

#[allow(clippy::cast_possible_truncation)]
fn noisy(width: u32, height: u32) -> Vec<Srgb<u8>> {
	image(width, height, |x, y| {
		let h = x.wrapping_mul(2654435761) ^ y.wrapping_mul(40503);
		Srgb::new((h >> 3) as u8, (x * 3 + y) as u8, (h >> 11) as u8)
	})
}

fn quadrants() -> Vec<Srgb<u8>> {
	image(10, 10, |x, y| match (x < 5, y < 5) {
		(true, true) => Srgb::new(255, 0, 0),
		(false, true) => Srgb::new(0, 255, 0),
		(true, false) => Srgb::new(0, 0, 255),
		(false, false) => Srgb::new(128, 128, 128),
	})
}

#[test]
fn pure_red() {
	let pixels = vec![Srgb::new(255, 0, 0); 100];
	let buffer = PixelBuffer::new(10, 10, &pixels).expect("valid buffer");
	let options = Options { palette_size: 5, ..Options::default() };

	let palette = palette_of(&buffer, &options);
	assert_eq!(palette.len(), 1);
	assert_relative_eq!(palette[0].fraction, 1.0);

	let selection = analyze(&buffer, &options);
	assert_eq!(selection.dominants.len(), 1);
	assert!(selection.accents.is_empty());

	let red = &selection.dominants[0];
	assert_eq!(red.bucket, HueBucket::Red);
	assert_eq!(red.key, ColorKey::Red);
	assert_eq!(red.hex(), "#FF0000");
	assert_relative_eq!(red.percentage(), 100.0);
	assert_relative_eq!(red.score, 1.0);
}

#[test]
fn quadrants_skip_grey_accent() {
	let pixels = quadrants();
	let buffer = PixelBuffer::new(10, 10, &pixels).expect("valid buffer");
	let options = Options { n_dominant: 3, n_accent: 1, ..Options::default() };

	let selection = analyze(&buffer, &options);

	let mut dominants = selection.dominants.iter().map(|color| color.bucket).collect::<Vec<_>>();
	dominants.sort();
	assert_eq!(dominants, vec![HueBucket::Red, HueBucket::Green, HueBucket::Blue]);
	assert!(selection.dominants.iter().all(|color| color.vivid));
	assert!(selection.accents.is_empty());
}

#[test]
fn quadrants_with_extra_hue_fill_accent() {
	let mut pixels = quadrants();
	// replace part of the grey quadrant with yellow
	for pixel in &mut pixels[95..] {
		*pixel = Srgb::new(255, 255, 0);
	}
	let buffer = PixelBuffer::new(10, 10, &pixels).expect("valid buffer");
	let options = Options { n_dominant: 3, n_accent: 1, ..Options::default() };

	let selection = analyze(&buffer, &options);

	assert_eq!(selection.accents.len(), 1);
	assert_eq!(selection.accents[0].bucket, HueBucket::Yellow);
}

#[test]
fn fractions_sum_to_one() {
	for (width, height) in [(1, 1), (7, 13), (64, 64), (500, 120)] {
		let pixels = noisy(width, height);
		let buffer = PixelBuffer::new(width, height, &pixels).expect("valid buffer");

		for palette_size in [5, 12, 24] {
			let palette = palette_of(&buffer, &Options { palette_size, ..Options::default() });
			assert!(palette.len() <= usize::from(palette_size));
			assert_relative_eq!(palette.iter().map(|entry| entry.fraction).sum::<f64>(), 1.0, epsilon = 1e-6);
			assert!(palette.iter().all(|entry| entry.fraction >= 0.0));
		}
	}
}

#[test]
fn repeated_runs_are_identical() {
	let pixels = noisy(320, 240);
	let buffer = PixelBuffer::new(320, 240, &pixels).expect("valid buffer");
	let options = Options { seed: 42, ..Options::default() };

	let first = analyze(&buffer, &options);
	let second = analyze(&buffer, &options);

	assert_eq!(first, second);
	assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

fn assert_disjoint(selection: &Selection) {
	for accent in &selection.accents {
		for dominant in &selection.dominants {
			assert_ne!(accent.bucket, dominant.bucket);
			assert_ne!(accent.color(), dominant.color());
		}
	}
}

#[test]
fn stripes_fill_every_slot() {
	let stripes = [
		Srgb::new(230, 30, 30),
		Srgb::new(250, 150, 20),
		Srgb::new(240, 230, 40),
		Srgb::new(40, 200, 60),
		Srgb::new(40, 60, 220),
		Srgb::new(160, 40, 210),
	];
	let pixels = image(60, 10, |x, _| stripes[(x / 10) as usize]);
	let buffer = PixelBuffer::new(60, 10, &pixels).expect("valid buffer");

	let selection = analyze(&buffer, &Options::default());

	assert_eq!(selection.dominants.len(), 3);
	assert_eq!(selection.accents.len(), 2);
	assert_disjoint(&selection);
}

#[test]
fn selections_are_disjoint() {
	for seed in 0..4 {
		let pixels = noisy(97, 61);
		let buffer = PixelBuffer::new(97, 61, &pixels).expect("valid buffer");
		let selection = analyze(&buffer, &Options { seed, n_accent: 4, ..Options::default() });

		assert!(selection.dominants.len() <= 3);
		assert!(selection.accents.len() <= 4);
		assert_disjoint(&selection);
	}
}

#[test]
fn empty_image() {
	let buffer = PixelBuffer::new(0, 0, &[]).expect("valid buffer");
	assert!(palette_of(&buffer, &Options::default()).is_empty());
	assert!(analyze(&buffer, &Options::default()).is_empty());
}
