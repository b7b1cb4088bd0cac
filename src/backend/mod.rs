//! Rendering backends consuming [`RenderCommand`](crate::command::RenderCommand)
//! lists.

pub mod svg;
