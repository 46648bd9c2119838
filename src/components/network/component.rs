use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::EngineConfig;
use super::edges::EdgeMode;
use super::engine::{GroupAction, NetworkEngine};
use super::palette::Legend;
use super::render;
use super::scale::ScaleType;
use super::state::CanvasState;
use super::types::{EdgeRow, MetadataRow};

type SharedEngine = Rc<RefCell<Option<NetworkEngine<CanvasState>>>>;

/// Pixels the pointer may travel between press and release and still count
/// as a click.
const CLICK_SLOP: f64 = 3.0;

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn event_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn NetworkCanvas(
	#[prop(into)] edges: Signal<Vec<EdgeRow>>,
	#[prop(into)] metadata: Signal<Vec<MetadataRow>>,
	#[prop(into)] color_key: Signal<String>,
	#[prop(into)] edge_mode: Signal<EdgeMode>,
	#[prop(into)] dynamic_edges: Signal<bool>,
	#[prop(into)] gradient: Signal<String>,
	#[prop(into)] reversed: Signal<bool>,
	#[prop(into)] scale: Signal<ScaleType>,
	#[prop(into)] seed: Signal<u64>,
	#[prop(into)] cluster_labels: Signal<bool>,
	#[prop(into)] selected: Signal<Option<String>>,
	#[prop(into)] group_action: Signal<Option<GroupAction>>,
	#[prop(into)] zoom_target: Signal<Option<String>>,
	#[prop(optional)] legend: Option<WriteSignal<Option<Legend>>>,
	#[prop(default = EngineConfig::default())] config: EngineConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: SharedEngine = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let publish_legend = move |engine: &NetworkEngine<CanvasState>| {
		if let Some(sink) = legend {
			sink.set(engine.legend());
		}
	};

	let (engine_init, animate_init, resize_cb_init) =
		(engine.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let (edge_rows, metadata_rows) = (edges.get(), metadata.get());
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		if engine_init.borrow().is_none() {
			let Some(window) = web_sys::window() else {
				return;
			};
			let (w, h) = if fullscreen {
				viewport_size(&window).unwrap_or((800.0, 600.0))
			} else {
				(
					width.unwrap_or_else(|| {
						canvas
							.parent_element()
							.map(|p| p.client_width() as f64)
							.unwrap_or(800.0)
					}),
					height.unwrap_or_else(|| {
						canvas
							.parent_element()
							.map(|p| p.client_height() as f64)
							.unwrap_or(600.0)
					}),
				)
			};
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let Some(ctx) = canvas
				.get_context("2d")
				.ok()
				.flatten()
				.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
			else {
				warn!("canvas has no 2d context");
				return;
			};

			let mut config = config.clone();
			config.color_key = Some(color_key.get_untracked());
			config.edge_mode = edge_mode.get_untracked();
			config.dynamic_edges = dynamic_edges.get_untracked();
			config.gradient = gradient.get_untracked();
			config.reversed = reversed.get_untracked();
			config.scale = scale.get_untracked();
			config.seed = seed.get_untracked();
			config.cluster_labels = cluster_labels.get_untracked();
			*engine_init.borrow_mut() = Some(NetworkEngine::new(CanvasState::new(w, h), config));

			if fullscreen {
				let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport_size) else {
						return;
					};
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Some(ref mut e) = *engine_resize.borrow_mut() {
						e.renderer_mut().resize(nw, nh);
					}
				}));
				if let Some(ref cb) = *resize_cb_init.borrow() {
					let _ = window
						.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}

			let (engine_anim, animate_inner) = (engine_init.clone(), animate_init.clone());
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				if let Some(ref mut e) = *engine_anim.borrow_mut() {
					// Clicks from the previous turn land here, outside event dispatch.
					e.run_deferred();
					e.renderer_mut().tick(0.016);
					render::render(e, &ctx);
				}
				if let (Some(cb), Some(win)) =
					(animate_inner.borrow().as_ref(), web_sys::window())
				{
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}

		if let Some(ref mut e) = *engine_init.borrow_mut() {
			e.load(&edge_rows, &metadata_rows);
			e.select_node(selected.get_untracked().as_deref());
			publish_legend(e);
		}
	});

	let engine_key = engine.clone();
	Effect::new(move |_| {
		let key = color_key.get();
		if let Some(ref mut e) = *engine_key.borrow_mut() {
			e.set_color_key(&key);
			publish_legend(e);
		}
	});

	let engine_mode = engine.clone();
	Effect::new(move |_| {
		let mode = edge_mode.get();
		if let Some(ref mut e) = *engine_mode.borrow_mut() {
			e.set_edge_mode(mode);
		}
	});

	let engine_dynamic = engine.clone();
	Effect::new(move |_| {
		let enabled = dynamic_edges.get();
		if let Some(ref mut e) = *engine_dynamic.borrow_mut() {
			e.set_dynamic_edges(enabled);
		}
	});

	let engine_gradient = engine.clone();
	Effect::new(move |_| {
		let name = gradient.get();
		if let Some(ref mut e) = *engine_gradient.borrow_mut() {
			e.set_gradient(&name);
			publish_legend(e);
		}
	});

	let engine_reversed = engine.clone();
	Effect::new(move |_| {
		let flag = reversed.get();
		if let Some(ref mut e) = *engine_reversed.borrow_mut() {
			e.set_reversed(flag);
			publish_legend(e);
		}
	});

	let engine_scale = engine.clone();
	Effect::new(move |_| {
		let scale = scale.get();
		if let Some(ref mut e) = *engine_scale.borrow_mut() {
			e.set_scale(scale);
			publish_legend(e);
		}
	});

	let engine_seed = engine.clone();
	Effect::new(move |_| {
		let seed = seed.get();
		if let Some(ref mut e) = *engine_seed.borrow_mut() {
			e.reseed(seed);
			publish_legend(e);
		}
	});

	let engine_labels = engine.clone();
	Effect::new(move |_| {
		let enabled = cluster_labels.get();
		if let Some(ref mut e) = *engine_labels.borrow_mut() {
			e.set_cluster_labels(enabled);
		}
	});

	// External selection lands immediately; canvas clicks go through the
	// deferred queue instead.
	let engine_selected = engine.clone();
	Effect::new(move |_| {
		let id = selected.get();
		if let Some(ref mut e) = *engine_selected.borrow_mut() {
			if !e.select_node(id.as_deref()) {
				warn!("selected node {id:?} not in graph");
			}
		}
	});

	let engine_groups = engine.clone();
	Effect::new(move |_| {
		let Some(action) = group_action.get() else {
			return;
		};
		if let Some(ref mut e) = *engine_groups.borrow_mut() {
			e.apply_group_action(&action);
			publish_legend(e);
		}
	});

	let engine_zoom = engine.clone();
	Effect::new(move |_| {
		let Some(id) = zoom_target.get() else {
			return;
		};
		if let Some(ref mut e) = *engine_zoom.borrow_mut() {
			e.zoom_to(&id);
		}
	});

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = event_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_md.borrow_mut() {
			let s = e.renderer_mut();
			s.pan.active = true;
			s.pan.moved = false;
			s.pan.start_x = x;
			s.pan.start_y = y;
			s.pan.transform_start_x = s.transform.x;
			s.pan.transform_start_y = s.transform.y;
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = event_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_mm.borrow_mut() {
			if e.renderer().pan.active {
				let s = e.renderer_mut();
				let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
				if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
					s.pan.moved = true;
				}
				s.transform.x = s.pan.transform_start_x + dx;
				s.transform.y = s.pan.transform_start_y + dy;
				s.dirty = true;
			} else {
				let hit = e
					.renderer()
					.node_at_position(x, y, |idx| e.node_display(idx).is_some_and(|d| d.hidden));
				e.hover_node(hit);
			}
		}
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let position = event_position(canvas_ref, &ev);
		if let Some(ref mut e) = *engine_mu.borrow_mut() {
			let was_click = e.renderer().pan.active && !e.renderer().pan.moved;
			e.renderer_mut().pan.active = false;
			if let (true, Some((x, y))) = (was_click, position) {
				let hit = e
					.renderer()
					.node_at_position(x, y, |idx| e.node_display(idx).is_some_and(|d| d.hidden));
				e.click_node(hit);
			}
		}
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut e) = *engine_ml.borrow_mut() {
			e.renderer_mut().pan.active = false;
			e.hover_node(None);
		}
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = event_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			e.renderer_mut().zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
