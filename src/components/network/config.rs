use serde::Deserialize;

use super::color::Rgb;
use super::edges::EdgeMode;
use super::scale::{ScaleParams, ScaleType};

/// Engine settings. Every field has a default, so partial JSON works.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Number of gradient stops fetched for numeric coloring.
	pub gradient_steps: usize,
	/// Hex color for missing values and any palette fallback.
	pub neutral_color: String,
	/// Reserved attribute fed by the metadata rows' `cluster` column.
	pub cluster_attribute: String,
	/// Initial coloring attribute; defaults to the cluster attribute.
	pub color_key: Option<String>,
	pub gradient: String,
	pub reversed: bool,
	pub scale: ScaleType,
	pub power_exponent: f64,
	pub log_epsilon: f64,
	/// Seeds the categorical color shuffle and the coordinate fallback.
	pub seed: u64,
	pub edge_mode: EdgeMode,
	pub dynamic_edges: bool,
	pub cluster_labels: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			gradient_steps: 100,
			neutral_color: "#999999".to_string(),
			cluster_attribute: "cluster".to_string(),
			color_key: None,
			gradient: "viridis".to_string(),
			reversed: false,
			scale: ScaleType::Linear,
			power_exponent: 2.0,
			log_epsilon: 1e-6,
			seed: 0x5eed,
			edge_mode: EdgeMode::None,
			dynamic_edges: true,
			cluster_labels: false,
		}
	}
}

impl EngineConfig {
	pub const FALLBACK_NEUTRAL: Rgb = Rgb::new(0x99, 0x99, 0x99);

	pub fn neutral(&self) -> Rgb {
		Rgb::from_hex(&self.neutral_color).unwrap_or(Self::FALLBACK_NEUTRAL)
	}

	pub fn scale_params(&self) -> ScaleParams {
		ScaleParams {
			exponent: self.power_exponent,
			log_epsilon: self.log_epsilon,
		}
	}

	pub fn initial_color_key(&self) -> &str {
		self.color_key.as_deref().unwrap_or(&self.cluster_attribute)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config: EngineConfig =
			serde_json::from_str(r#"{"scale": "log", "edge_mode": "all", "seed": 9}"#).unwrap();
		assert_eq!(config.scale, ScaleType::Log);
		assert_eq!(config.edge_mode, EdgeMode::All);
		assert_eq!(config.seed, 9);
		assert_eq!(config.gradient_steps, 100);
		assert_eq!(config.initial_color_key(), "cluster");
	}

	#[test]
	fn bad_neutral_color_falls_back() {
		let config = EngineConfig {
			neutral_color: "grey".into(),
			..Default::default()
		};
		assert_eq!(config.neutral(), EngineConfig::FALLBACK_NEUTRAL);
		assert_eq!(EngineConfig::default().neutral(), Rgb::new(0x99, 0x99, 0x99));
	}
}
