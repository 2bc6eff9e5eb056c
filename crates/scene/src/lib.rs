pub mod controller;
pub mod graph;
pub mod hitdetector;
pub mod item;
pub mod renderer;
pub mod view;

pub use controller::SceneController;
pub use graph::{LayerOffset, SceneGraph};
pub use hitdetector::HitDetector;
pub use item::*;
pub use renderer::{Painter, PainterRenderer, StrokeStyle, Transform2D};
pub use view::View;
