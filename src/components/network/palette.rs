use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use rand::Rng;
use rand::seq::SliceRandom;

use super::classify::parse_numeric;
use super::color::{DistinctColors, GradientSource, Rgb};
use super::scale::{ScaleParams, ScaleType};
use super::types::{GraphData, NodeIdx};

/// A categorical value. `Missing` sorts after every real value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommunityValue {
	Value(String),
	Missing,
}

impl CommunityValue {
	pub fn of(raw: Option<&str>) -> Self {
		match raw {
			Some(v) => CommunityValue::Value(v.to_string()),
			None => CommunityValue::Missing,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			CommunityValue::Value(v) => Some(v),
			CommunityValue::Missing => None,
		}
	}

	pub fn is_missing(&self) -> bool {
		matches!(self, CommunityValue::Missing)
	}
}

impl fmt::Display for CommunityValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CommunityValue::Value(v) => f.write_str(v),
			CommunityValue::Missing => f.write_str("(missing)"),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoricalPalette {
	communities: Vec<CommunityValue>,
	colors: BTreeMap<CommunityValue, Rgb>,
	counts: BTreeMap<CommunityValue, usize>,
	node_values: Vec<CommunityValue>,
	neutral: Rgb,
}

impl CategoricalPalette {
	/// Distinct values, lexically sorted, `Missing` last.
	pub fn communities(&self) -> &[CommunityValue] {
		&self.communities
	}

	pub fn color_of(&self, value: &CommunityValue) -> Rgb {
		self.colors.get(value).copied().unwrap_or(self.neutral)
	}

	pub fn count_of(&self, value: &CommunityValue) -> usize {
		self.counts.get(value).copied().unwrap_or(0)
	}

	pub fn node_value(&self, idx: NodeIdx) -> Option<&CommunityValue> {
		self.node_values.get(idx)
	}

	pub fn node_color(&self, idx: NodeIdx) -> Rgb {
		self.node_value(idx)
			.map(|v| self.color_of(v))
			.unwrap_or(self.neutral)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumericPalette {
	pub min: f64,
	pub max: f64,
	pub scale: ScaleType,
	pub reversed: bool,
	stops: Vec<Rgb>,
	node_stops: Vec<Option<usize>>,
	neutral: Rgb,
}

impl NumericPalette {
	/// Gradient stops in display order (already reversed when requested).
	pub fn stops(&self) -> &[Rgb] {
		&self.stops
	}

	pub fn stop_of(&self, idx: NodeIdx) -> Option<usize> {
		self.node_stops.get(idx).copied().flatten()
	}

	pub fn node_color(&self, idx: NodeIdx) -> Rgb {
		self.stop_of(idx)
			.and_then(|s| self.stops.get(s).copied())
			.unwrap_or(self.neutral)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Palette {
	Categorical(CategoricalPalette),
	Numeric(NumericPalette),
}

impl Palette {
	pub fn node_color(&self, idx: NodeIdx) -> Rgb {
		match self {
			Palette::Categorical(p) => p.node_color(idx),
			Palette::Numeric(p) => p.node_color(idx),
		}
	}

	pub fn as_categorical(&self) -> Option<&CategoricalPalette> {
		match self {
			Palette::Categorical(p) => Some(p),
			Palette::Numeric(_) => None,
		}
	}
}

/// Gradient settings for numeric coloring.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericOptions {
	pub gradient: String,
	pub reversed: bool,
	pub scale: ScaleType,
	pub params: ScaleParams,
	pub steps: usize,
}

/// Index of the gradient stop for a normalized value.
pub fn stop_index(t: f64, steps: usize) -> usize {
	if steps == 0 {
		return 0;
	}
	let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
	((t * (steps - 1) as f64).floor() as usize).min(steps - 1)
}

/// Assigns colors to the distinct values of `key`.
///
/// Value order is deterministic. Which color lands on which value comes from
/// shuffling the generated colors with `rng`. `Missing` always maps to
/// `neutral`, as does any value the generator failed to cover.
pub fn build_categorical<R: Rng + ?Sized>(
	graph: &GraphData,
	key: &str,
	neutral: Rgb,
	generator: &dyn DistinctColors,
	rng: &mut R,
) -> CategoricalPalette {
	let node_values: Vec<CommunityValue> = graph
		.nodes()
		.iter()
		.map(|n| CommunityValue::of(n.attribute(key)))
		.collect();

	let mut counts = BTreeMap::new();
	for value in &node_values {
		*counts.entry(value.clone()).or_insert(0) += 1;
	}
	let communities: Vec<CommunityValue> = counts.keys().cloned().collect();
	let present: Vec<&CommunityValue> = communities.iter().filter(|v| !v.is_missing()).collect();

	let mut generated = match generator.generate(present.len()) {
		Ok(colors) => {
			if colors.len() < present.len() {
				warn!(
					"color generator produced {} of {} colors for `{key}`",
					colors.len(),
					present.len()
				);
			}
			colors
		}
		Err(e) => {
			warn!("color generator failed for `{key}`: {e}");
			Vec::new()
		}
	};
	generated.shuffle(rng);

	let mut colors: BTreeMap<CommunityValue, Rgb> = present
		.iter()
		.enumerate()
		.map(|(i, v)| ((*v).clone(), generated.get(i).copied().unwrap_or(neutral)))
		.collect();
	colors.insert(CommunityValue::Missing, neutral);

	CategoricalPalette {
		communities,
		colors,
		counts,
		node_values,
		neutral,
	}
}

/// Maps every node's `key` value through the active scale onto a gradient.
pub fn build_numeric(
	graph: &GraphData,
	key: &str,
	options: &NumericOptions,
	neutral: Rgb,
	gradients: &dyn GradientSource,
) -> NumericPalette {
	let values: Vec<Option<f64>> = graph
		.nodes()
		.iter()
		.map(|n| n.attribute(key).and_then(parse_numeric))
		.collect();
	let (min, max) = values
		.iter()
		.flatten()
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
	let (min, max) = if min > max { (0.0, 0.0) } else { (min, max) };

	let mut stops = match gradients.stops(&options.gradient, options.steps) {
		Ok(stops) => stops,
		Err(e) => {
			warn!("gradient `{}` unavailable: {e}", options.gradient);
			Vec::new()
		}
	};
	if options.reversed {
		stops.reverse();
	}

	let node_stops = if stops.is_empty() {
		vec![None; values.len()]
	} else {
		let scale = options.scale.build(min, max, options.params);
		let degenerate = min == max;
		values
			.iter()
			.map(|v| {
				v.map(|v| {
					let t = if degenerate { 0.5 } else { scale.normalize(v) };
					stop_index(t, stops.len())
				})
			})
			.collect()
	};

	NumericPalette {
		min,
		max,
		scale: options.scale,
		reversed: options.reversed,
		stops,
		node_stops,
		neutral,
	}
}

/// Legend row for one categorical value.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub value: CommunityValue,
	pub color: Rgb,
	pub count: usize,
	pub visible: bool,
	pub highlighted: bool,
}

/// What an external legend widget needs to draw the active coloring.
#[derive(Clone, Debug, PartialEq)]
pub enum Legend {
	Categorical(Vec<LegendEntry>),
	Gradient {
		stops: Vec<Rgb>,
		min: f64,
		max: f64,
		scale: ScaleType,
		reversed: bool,
	},
}
