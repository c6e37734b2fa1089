//! Conversions from sRGB to HSV and distances between sRGB colors

use palette::Srgb;

/// The largest possible euclidean distance between two 8-bit sRGB colors, i.e. `sqrt(3 * 255^2)`
pub const MAX_DISTANCE: f64 = 441.672_955_930_063_7;

/// A color in the HSV color space
///
/// Unlike [`palette::Hsv`], this is computed directly from the 8-bit channels of an [`Srgb`] color,
/// so pixels lying exactly on a hue boundary (like `(128, 112, 64)` at 45°) stay exactly on it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsv {
	/// Hue angle in degrees in the range `0.0..360.0`
	///
	/// This is `0.0` for any achromatic color.
	pub hue: f64,
	/// Saturation in the range `0.0..=1.0`
	pub saturation: f64,
	/// Value (brightness) in the range `0.0..=1.0`
	pub value: f64,
}

impl From<Srgb<u8>> for Hsv {
	fn from(color: Srgb<u8>) -> Self {
		rgb_to_hsv(color)
	}
}

/// Convert an 8-bit sRGB color to HSV.
#[must_use]
pub fn rgb_to_hsv(color: Srgb<u8>) -> Hsv {
	let (r, g, b) = (i32::from(color.red), i32::from(color.green), i32::from(color.blue));
	let max = r.max(g).max(b);
	let min = r.min(g).min(b);
	let delta = max - min;

	let value = f64::from(max) / 255.0;

	if delta == 0 {
		return Hsv { hue: 0.0, saturation: 0.0, value };
	}

	let saturation = f64::from(delta) / f64::from(max);

	// (sector offset, numerator) with both in units of delta
	let (offset, numerator) = if max == r {
		(0, g - b)
	} else if max == g {
		(2, b - r)
	} else {
		(4, r - g)
	};

	let mut hue = 60.0 * (f64::from(offset) + f64::from(numerator) / f64::from(delta));
	if hue < 0.0 {
		hue += 360.0;
	}
	if hue >= 360.0 {
		hue -= 360.0;
	}

	Hsv { hue, saturation, value }
}

/// Format a color as an uppercase, zero padded `#RRGGBB` hex string.
#[must_use]
pub fn hex(color: Srgb<u8>) -> String {
	format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Euclidean distance between two colors in 8-bit sRGB space
#[must_use]
pub fn distance(x: Srgb<u8>, y: Srgb<u8>) -> f64 {
	let dr = f64::from(x.red) - f64::from(y.red);
	let dg = f64::from(x.green) - f64::from(y.green);
	let db = f64::from(x.blue) - f64::from(y.blue);
	(dr * dr + dg * dg + db * db).sqrt()
}
