use leptos::prelude::*;

use crate::components::network::color::BuiltinGradients;
use crate::components::network::{
	EdgeMode, EdgeRow, EngineConfig, GroupAction, Legend, MetadataRow, NetworkCanvas, ScaleType,
};

const COLOR_KEYS: &[&str] = &["cluster", "group", "score"];

/// Generate sample rows: a random tree with four clusters laid out on a ring.
fn generate_sample_rows(n: usize) -> (Vec<EdgeRow>, Vec<MetadataRow>) {
	let metadata = (0..n)
		.map(|i| {
			let cluster = i % 4;
			let angle = cluster as f64 * std::f64::consts::FRAC_PI_2;
			let spread = rand_simple(i * 7) * 2.5;
			let jitter = rand_simple(i * 13) * std::f64::consts::TAU;
			let row = MetadataRow::new(i.to_string())
				.with_position(
					format!("{:.3}", 5.0 * angle.cos() + spread * jitter.cos()),
					format!("{:.3}", 5.0 * angle.sin() + spread * jitter.sin()),
				)
				.with_cluster(format!("cluster {cluster}"))
				.with_attribute("score", format!("{:.2}", rand_simple(i) * 100.0));
			// Leave a few nodes without a group to exercise the missing bucket.
			if i % 17 == 5 {
				row
			} else {
				row.with_attribute("group", format!("g{}", (i * 7) % 6))
			}
		})
		.collect();

	let edges = (1..n)
		.map(|i| {
			let target = (rand_simple(i) * (i as f64)) as usize;
			EdgeRow::new(i.to_string(), target.to_string())
		})
		.collect();

	(edges, metadata)
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn legend_entries(
	legend: RwSignal<Option<Legend>>,
	group_action: RwSignal<Option<GroupAction>>,
) -> impl IntoView {
	move || match legend.get() {
		Some(Legend::Categorical(entries)) => entries
			.into_iter()
			.map(|entry| {
				let (show, emphasize) = (entry.value.clone(), entry.value.clone());
				let class = match (entry.visible, entry.highlighted) {
					(true, true) => "legend-entry highlighted",
					(true, false) => "legend-entry",
					(false, _) => "legend-entry hidden",
				};
				view! {
					<li class=class>
						<span class="swatch" style=format!("background: {};", entry.color) />
						<button on:click=move |_| {
							group_action.set(Some(GroupAction::ToggleVisible(show.clone())))
						}>{entry.value.to_string()}</button>
						<button on:click=move |_| {
							group_action.set(Some(GroupAction::ToggleHighlight(emphasize.clone())))
						}>"★"</button>
						<span class="count">{entry.count}</span>
					</li>
				}
			})
			.collect_view()
			.into_any(),
		Some(Legend::Gradient { stops, min, max, scale, .. }) => {
			let css = stops
				.iter()
				.step_by((stops.len() / 10).max(1))
				.map(ToString::to_string)
				.collect::<Vec<_>>()
				.join(", ");
			view! {
				<li class="legend-gradient">
					<span
						class="ramp"
						style=format!("background: linear-gradient(to right, {css});")
					/>
					<span>{format!("{min:.2} to {max:.2} ({scale})")}</span>
				</li>
			}
			.into_any()
		}
		None => view! { <li>"loading"</li> }.into_any(),
	}
}

/// Item after `current` in `items`, wrapping around; the first item when
/// `current` is not listed.
fn cycle<T: PartialEq + Copy>(items: &[T], current: T) -> T {
	let next = items
		.iter()
		.position(|item| *item == current)
		.map_or(0, |i| (i + 1) % items.len());
	items[next]
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (edge_rows, metadata_rows) = generate_sample_rows(160);
	let edges = Signal::derive(move || edge_rows.clone());
	let metadata = Signal::derive(move || metadata_rows.clone());
	let defaults = EngineConfig::default();
	let gradient_names: Vec<&'static str> = BuiltinGradients::names().collect();

	let color_key = RwSignal::new(COLOR_KEYS[0].to_string());
	let edge_mode = RwSignal::new(defaults.edge_mode);
	let dynamic_edges = RwSignal::new(defaults.dynamic_edges);
	let gradient = RwSignal::new(defaults.gradient.clone());
	let reversed = RwSignal::new(defaults.reversed);
	let scale = RwSignal::new(defaults.scale);
	let seed = RwSignal::new(defaults.seed);
	let cluster_labels = RwSignal::new(true);
	let selected = RwSignal::new(None::<String>);
	let group_action = RwSignal::new(None::<GroupAction>);
	let zoom_target = RwSignal::new(None::<String>);
	let legend = RwSignal::new(None::<Legend>);

	let key_buttons = COLOR_KEYS
		.iter()
		.map(|key| {
			view! {
				<button
					class:active=move || color_key.get() == *key
					on:click=move |_| color_key.set(key.to_string())
				>
					{*key}
				</button>
			}
		})
		.collect_view();

	let next_gradient = move |_: leptos::ev::MouseEvent| {
		let current = gradient.get();
		gradient.set(cycle(&gradient_names, current.as_str()).to_string());
	};

	let edge_label = move || match (edge_mode.get(), dynamic_edges.get()) {
		(EdgeMode::All, _) => "edges: all",
		(EdgeMode::None, true) => "edges: selection",
		(EdgeMode::None, false) => "edges: off",
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<NetworkCanvas
					edges=edges
					metadata=metadata
					color_key=color_key
					edge_mode=edge_mode
					dynamic_edges=dynamic_edges
					gradient=gradient
					reversed=reversed
					scale=scale
					seed=seed
					cluster_labels=cluster_labels
					selected=selected
					group_action=group_action
					zoom_target=zoom_target
					legend=legend.write_only()
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Attribute Network"</h1>
					<p class="subtitle">
						"Click a node to show its edges. Scroll to zoom. Drag background to pan."
					</p>
					<div class="controls">
						{key_buttons}
						<button on:click=move |_| {
							edge_mode.update(|m| *m = cycle(&[EdgeMode::None, EdgeMode::All], *m))
						}>{edge_label}</button>
						<button on:click=move |_| dynamic_edges.update(|d| *d = !*d)>
							"toggle dynamic edges"
						</button>
						<button on:click=move |_| {
							group_action.set(Some(GroupAction::ToggleAllVisible))
						}>"show / hide all"</button>
						<button on:click=move |_| cluster_labels.update(|l| *l = !*l)>
							"cluster labels"
						</button>
					</div>
					<div class="controls">
						<button on:click=next_gradient>{move || gradient.get()}</button>
						<button on:click=move |_| reversed.update(|r| *r = !*r)>
							{move || if reversed.get() { "reversed" } else { "forward" }}
						</button>
						<button on:click=move |_| scale.update(|s| *s = cycle(&ScaleType::ALL, *s))>
							{move || format!("scale: {}", scale.get())}
						</button>
						<button on:click=move |_| seed.update(|s| *s = s.wrapping_add(1))>
							"reshuffle colors"
						</button>
					</div>
					<div class="controls">
						<button on:click=move |_| {
							selected.set(Some("0".to_string()));
							zoom_target.set(Some("0".to_string()));
						}>"find root"</button>
						<button on:click=move |_| selected.set(None)>"clear selection"</button>
					</div>
					<ul class="legend">{legend_entries(legend, group_action)}</ul>
				</div>
			</div>
		</ErrorBoundary>
	}
}
