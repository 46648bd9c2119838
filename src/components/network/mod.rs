//! Attribute-driven node coloring and selective edge materialization for an
//! interactive network view, plus the canvas component that renders it.

pub mod adapter;
pub mod classify;
pub mod color;
mod component;
pub mod config;
pub mod edges;
pub mod engine;
pub mod highlight;
pub mod overlay;
pub mod palette;
mod render;
pub mod scale;
pub mod state;
pub mod types;

pub use adapter::{Projector, RenderAdapter};
pub use classify::AttributeClass;
pub use color::Rgb;
pub use component::NetworkCanvas;
pub use config::EngineConfig;
pub use edges::EdgeMode;
pub use engine::{Emphasis, GroupAction, NetworkEngine, NodeDisplay};
pub use palette::{CommunityValue, Legend, LegendEntry};
pub use scale::ScaleType;
pub use types::{EdgeRow, MetadataRow};
