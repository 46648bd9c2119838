use std::collections::BTreeSet;

use super::palette::CommunityValue;
use super::types::NodeIdx;

/// Visible / emphasized flags per categorical value, plus single-node
/// selection and hover.
///
/// Visibility and emphasis are independent of each other. Turning a group's
/// emphasis on or off drops the selected node; hover is left alone.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	universe: Vec<CommunityValue>,
	visible: BTreeSet<CommunityValue>,
	highlighted: BTreeSet<CommunityValue>,
	selected: Option<NodeIdx>,
	hovered: Option<NodeIdx>,
}

impl HighlightState {
	/// Starts over for a fresh community list: everything visible, nothing
	/// emphasized.
	pub fn reset_groups(&mut self, communities: &[CommunityValue]) {
		self.universe = communities.to_vec();
		self.visible = communities.iter().cloned().collect();
		self.highlighted.clear();
	}

	pub fn clear_nodes(&mut self) {
		self.selected = None;
		self.hovered = None;
	}

	pub fn communities(&self) -> &[CommunityValue] {
		&self.universe
	}

	pub fn is_visible(&self, value: &CommunityValue) -> bool {
		self.visible.contains(value)
	}

	pub fn is_highlighted(&self, value: &CommunityValue) -> bool {
		self.highlighted.contains(value)
	}

	pub fn highlighted(&self) -> &BTreeSet<CommunityValue> {
		&self.highlighted
	}

	pub fn has_highlight(&self) -> bool {
		!self.highlighted.is_empty()
	}

	pub fn visible_count(&self) -> usize {
		self.visible.len()
	}

	/// Flips one value's visibility. Values outside the community list are
	/// ignored. Returns the new visibility.
	pub fn toggle_visible(&mut self, value: &CommunityValue) -> bool {
		if !self.universe.contains(value) {
			return false;
		}
		if !self.visible.remove(value) {
			self.visible.insert(value.clone());
			return true;
		}
		false
	}

	/// Shows everything unless everything is already shown, in which case
	/// hides everything.
	pub fn toggle_all_visible(&mut self) {
		if self.visible.len() < self.universe.len() {
			self.visible = self.universe.iter().cloned().collect();
		} else {
			self.visible.clear();
		}
	}

	/// Flips one value's emphasis and clears the node selection. Returns the
	/// new emphasis.
	pub fn toggle_highlight(&mut self, value: &CommunityValue) -> bool {
		self.selected = None;
		if !self.universe.contains(value) {
			return false;
		}
		if !self.highlighted.remove(value) {
			self.highlighted.insert(value.clone());
			return true;
		}
		false
	}

	pub fn selected(&self) -> Option<NodeIdx> {
		self.selected
	}

	pub fn hovered(&self) -> Option<NodeIdx> {
		self.hovered
	}

	pub fn select(&mut self, node: Option<NodeIdx>) {
		self.selected = node;
	}

	pub fn hover(&mut self, node: Option<NodeIdx>) {
		self.hovered = node;
	}

	/// The node driving neighborhood display: selection wins over hover.
	pub fn focus(&self) -> Option<NodeIdx> {
		self.selected.or(self.hovered)
	}
}
