//! Color values and the two color sources the palette builder draws from:
//! a distinct-color generator for categories and named sequential gradients
//! for numeric attributes.

use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Parses `#rrggbb` (leading `#` optional).
	pub fn from_hex(hex: &str) -> Option<Self> {
		let hex = hex.trim().trim_start_matches('#');
		if hex.len() != 6 || !hex.is_ascii() {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
		Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
	}

	pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
	}

	/// HSL → RGB with `h` in degrees and `s`, `l` in `[0, 1]`.
	pub fn from_hsl(h: f64, s: f64, l: f64) -> Rgb {
		let h = h.rem_euclid(360.0) / 60.0;
		let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
		let x = c * (1.0 - (h % 2.0 - 1.0).abs());
		let (r, g, b) = match h as u32 {
			0 => (c, x, 0.0),
			1 => (x, c, 0.0),
			2 => (0.0, c, x),
			3 => (0.0, x, c),
			4 => (x, 0.0, c),
			_ => (c, 0.0, x),
		};
		let m = l - c / 2.0;
		let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
		Rgb::new(to_u8(r), to_u8(g), to_u8(b))
	}

	pub fn css_rgba(self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum PaletteError {
	#[error("unknown sequential palette `{0}`")]
	UnknownGradient(String),
	#[error("requested {requested} colors but the generator produced {produced}")]
	Shortfall { requested: usize, produced: usize },
	#[error("a gradient needs at least one stop")]
	NoStops,
}

/// Produces `count` visually distinct colors.
pub trait DistinctColors {
	fn generate(&self, count: usize) -> Result<Vec<Rgb>, PaletteError>;
}

/// Looks up a named sequential palette and samples it into `count` stops,
/// ordered from the low end of the domain to the high end.
pub trait GradientSource {
	fn stops(&self, name: &str, count: usize) -> Result<Vec<Rgb>, PaletteError>;
}

const GOLDEN_ANGLE: f64 = 137.507_764;

/// Walks the hue wheel by the golden angle, cycling through a few
/// saturation/lightness bands so large category counts stay separable.
#[derive(Clone, Debug)]
pub struct HueWheel {
	pub start_hue: f64,
	pub bands: Vec<(f64, f64)>,
}

impl Default for HueWheel {
	fn default() -> Self {
		Self {
			start_hue: 20.0,
			bands: vec![(0.65, 0.55), (0.55, 0.40), (0.75, 0.70)],
		}
	}
}

impl DistinctColors for HueWheel {
	fn generate(&self, count: usize) -> Result<Vec<Rgb>, PaletteError> {
		if self.bands.is_empty() {
			return Err(PaletteError::Shortfall {
				requested: count,
				produced: 0,
			});
		}
		Ok((0..count)
			.map(|i| {
				let (s, l) = self.bands[i % self.bands.len()];
				Rgb::from_hsl(self.start_hue + i as f64 * GOLDEN_ANGLE, s, l)
			})
			.collect())
	}
}

/// Anchor colors for the bundled sequential palettes, low → high.
const GRADIENTS: &[(&str, &[&str])] = &[
	(
		"viridis",
		&[
			"#440154", "#482878", "#3e4989", "#31688e", "#26828e",
			"#1f9e89", "#35b779", "#6ece58", "#b5de2b", "#fde725",
		],
	),
	(
		"magma",
		&[
			"#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f",
			"#cd4071", "#f1605d", "#fd9668", "#feca8d", "#fcfdbf",
		],
	),
	(
		"plasma",
		&[
			"#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786",
			"#d8576b", "#ed7953", "#fb9f3a", "#fdca26", "#f0f921",
		],
	),
	(
		"inferno",
		&[
			"#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60",
			"#cf4446", "#ed6925", "#fb9b06", "#f7d13d", "#fcffa4",
		],
	),
	("blues", &["#f7fbff", "#c6dbef", "#6baed6", "#2171b5", "#08306b"]),
	("greens", &["#f7fcf5", "#c7e9c0", "#74c476", "#238b45", "#00441b"]),
	("reds", &["#fff5f0", "#fcbba1", "#fb6a4a", "#cb181d", "#67000d"]),
	("oranges", &["#fff5eb", "#fdd0a2", "#fd8d3c", "#d94801", "#7f2704"]),
	("purples", &["#fcfbfd", "#dadaeb", "#9e9ac8", "#6a51a3", "#3f007d"]),
	("greys", &["#ffffff", "#d9d9d9", "#969696", "#525252", "#000000"]),
];

/// The bundled named gradients, linearly interpolated between anchors.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinGradients;

impl BuiltinGradients {
	pub fn names() -> impl Iterator<Item = &'static str> {
		GRADIENTS.iter().map(|(name, _)| *name)
	}
}

impl GradientSource for BuiltinGradients {
	fn stops(&self, name: &str, count: usize) -> Result<Vec<Rgb>, PaletteError> {
		if count == 0 {
			return Err(PaletteError::NoStops);
		}
		let anchors: Vec<Rgb> = GRADIENTS
			.iter()
			.find(|(n, _)| n.eq_ignore_ascii_case(name))
			.ok_or_else(|| PaletteError::UnknownGradient(name.to_string()))?
			.1
			.iter()
			.filter_map(|hex| Rgb::from_hex(hex))
			.collect();
		if anchors.is_empty() {
			return Err(PaletteError::NoStops);
		}
		if count == 1 || anchors.len() == 1 {
			return Ok(vec![anchors[anchors.len() / 2]; count]);
		}

		let segments = (anchors.len() - 1) as f64;
		Ok((0..count)
			.map(|i| {
				let pos = i as f64 / (count - 1) as f64 * segments;
				let seg = (pos.floor() as usize).min(anchors.len() - 2);
				anchors[seg].lerp(anchors[seg + 1], pos - seg as f64)
			})
			.collect())
	}
}
