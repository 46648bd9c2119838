//! Monotonic numeric → `[0, 1]` transforms used to index gradient stops.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Maps a value from a fixed domain onto `[0, 1]`. Implementations clamp
/// their output and never return NaN for finite input.
pub trait ScaleTransform {
	fn normalize(&self, value: f64) -> f64;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
	#[default]
	Linear,
	Log,
	Sqrt,
	Pow,
}

/// Tuning knobs shared by the scale constructors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleParams {
	pub exponent: f64,
	pub log_epsilon: f64,
}

impl Default for ScaleParams {
	fn default() -> Self {
		Self {
			exponent: 2.0,
			log_epsilon: 1e-6,
		}
	}
}

impl ScaleType {
	pub const ALL: [ScaleType; 4] =
		[ScaleType::Linear, ScaleType::Log, ScaleType::Sqrt, ScaleType::Pow];

	pub fn build(self, min: f64, max: f64, params: ScaleParams) -> Box<dyn ScaleTransform> {
		match self {
			ScaleType::Linear => Box::new(LinearScale::new(min, max)),
			ScaleType::Log => Box::new(LogScale::new(min, max, params.log_epsilon)),
			ScaleType::Sqrt => Box::new(PowScale::new(min, max, 0.5)),
			ScaleType::Pow => Box::new(PowScale::new(min, max, params.exponent)),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			ScaleType::Linear => "linear",
			ScaleType::Log => "log",
			ScaleType::Sqrt => "sqrt",
			ScaleType::Pow => "pow",
		}
	}
}

impl fmt::Display for ScaleType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ScaleType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"linear" => Ok(ScaleType::Linear),
			"log" => Ok(ScaleType::Log),
			"sqrt" => Ok(ScaleType::Sqrt),
			"pow" | "power" => Ok(ScaleType::Pow),
			other => Err(format!("unknown scale type `{other}`")),
		}
	}
}

fn unit_interval(numerator: f64, span: f64) -> f64 {
	if span <= 0.0 || !span.is_finite() {
		return 0.5;
	}
	let t = numerator / span;
	if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) }
}

#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
	min: f64,
	max: f64,
}

impl LinearScale {
	pub fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}
}

impl ScaleTransform for LinearScale {
	fn normalize(&self, value: f64) -> f64 {
		unit_interval(value - self.min, self.max - self.min)
	}
}

/// Natural-log scale. Non-positive bounds and values are lifted to `epsilon`.
#[derive(Clone, Copy, Debug)]
pub struct LogScale {
	lo: f64,
	hi: f64,
	epsilon: f64,
}

impl LogScale {
	pub fn new(min: f64, max: f64, epsilon: f64) -> Self {
		let epsilon = if epsilon > 0.0 { epsilon } else { f64::MIN_POSITIVE };
		let lo = if min > 0.0 { min } else { epsilon };
		Self {
			lo,
			hi: max.max(lo),
			epsilon,
		}
	}
}

impl ScaleTransform for LogScale {
	fn normalize(&self, value: f64) -> f64 {
		let v = value.max(self.epsilon);
		unit_interval(v.ln() - self.lo.ln(), self.hi.ln() - self.lo.ln())
	}
}

/// Sign-preserving power scale; `exponent = 0.5` is the square-root scale.
#[derive(Clone, Copy, Debug)]
pub struct PowScale {
	min: f64,
	max: f64,
	exponent: f64,
}

impl PowScale {
	pub fn new(min: f64, max: f64, exponent: f64) -> Self {
		Self { min, max, exponent }
	}

	fn apply(&self, v: f64) -> f64 {
		v.signum() * v.abs().powf(self.exponent)
	}
}

impl ScaleTransform for PowScale {
	fn normalize(&self, value: f64) -> f64 {
		let lo = self.apply(self.min);
		unit_interval(self.apply(value) - lo, self.apply(self.max) - lo)
	}
}
