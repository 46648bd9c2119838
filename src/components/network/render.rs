use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::adapter::Projector;
use super::engine::{Emphasis, NetworkEngine, NodeDisplay};
use super::state::CanvasState;

const BACKGROUND: &str = "#1a1a2e";

fn emphasis_alpha(emphasis: Emphasis) -> f64 {
	match emphasis {
		Emphasis::Focus | Emphasis::Neighbor | Emphasis::Group => 1.0,
		Emphasis::Normal => 0.9,
		Emphasis::Dimmed => 0.2,
	}
}

pub fn render(engine: &NetworkEngine<CanvasState>, ctx: &CanvasRenderingContext2d) {
	let state = engine.renderer();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_edges(engine, ctx);
	draw_nodes(engine, ctx);
	draw_cluster_labels(engine, ctx);
}

fn draw_edges(engine: &NetworkEngine<CanvasState>, ctx: &CanvasRenderingContext2d) {
	let state = engine.renderer();
	for &(_, src, tgt, weight) in &state.edges {
		let (Some(a), Some(b)) = (engine.node_display(src), engine.node_display(tgt)) else {
			continue;
		};
		if a.hidden || b.hidden {
			continue;
		}
		let (n1, n2) = (&state.nodes[src], &state.nodes[tgt]);
		let (x1, y1) = state.graph_to_viewport(n1.x, n1.y);
		let (x2, y2) = state.graph_to_viewport(n2.x, n2.y);

		let alpha = 0.15 + 0.45 * emphasis_alpha(a.emphasis).min(emphasis_alpha(b.emphasis));
		ctx.set_stroke_style_str(&a.color.css_rgba(alpha));
		ctx.set_line_width(weight.clamp(0.5, 4.0));
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_node(ctx: &CanvasRenderingContext2d, x: f64, y: f64, display: &NodeDisplay<'_>) {
	let radius = match display.emphasis {
		Emphasis::Focus => display.size * 1.6,
		Emphasis::Neighbor | Emphasis::Group => display.size * 1.2,
		_ => display.size,
	};
	ctx.set_global_alpha(emphasis_alpha(display.emphasis));
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&display.color.to_string());
	ctx.fill();
	ctx.set_global_alpha(1.0);

	if display.emphasis == Emphasis::Focus {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 2.0, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
		ctx.set_line_width(1.5);
		ctx.stroke();
	}

	if display.force_label {
		ctx.set_fill_style_str("white");
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text(display.label, x + radius + 3.0, y + 3.0);
	}
}

fn draw_nodes(engine: &NetworkEngine<CanvasState>, ctx: &CanvasRenderingContext2d) {
	let state = engine.renderer();
	let mut raised = Vec::new();

	for (idx, node) in state.nodes.iter().enumerate() {
		let Some(display) = engine.node_display(idx) else {
			continue;
		};
		if display.hidden {
			continue;
		}
		let (x, y) = state.graph_to_viewport(node.x, node.y);
		// Emphasized nodes go on top.
		if matches!(display.emphasis, Emphasis::Focus | Emphasis::Neighbor | Emphasis::Group) {
			raised.push((x, y, display));
			continue;
		}
		draw_node(ctx, x, y, &display);
	}

	for (x, y, display) in &raised {
		draw_node(ctx, *x, *y, display);
	}
}

fn draw_cluster_labels(engine: &NetworkEngine<CanvasState>, ctx: &CanvasRenderingContext2d) {
	if !engine.cluster_labels_enabled() {
		return;
	}
	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	for projected in engine.cluster_labels() {
		ctx.set_fill_style_str(&projected.label.color.css_rgba(0.9));
		let _ = ctx.fill_text(&projected.label.name, projected.x, projected.y);
	}
	ctx.set_text_align("start");
}
