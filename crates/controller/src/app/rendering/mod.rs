mod compose;
mod renderer;
mod surface;
mod text;

pub use compose::compose_frame;
pub use renderer::Renderer;
pub use surface::{ImageRegion, Rgba, Surface};
pub use text::{draw_text, draw_text_fitted, text_width_px, GLYPH_ADVANCE, LINE_ADVANCE};
