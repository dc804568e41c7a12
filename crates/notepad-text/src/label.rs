//! Renderable text label.
//!
//! A label owns a string and a vertex/index buffer pair. Changing the text
//! marks it dirty; the next [`Label::prepare_frame`] lays the text out again
//! and replaces the buffer contents.

use crate::error::{FontError, FontResult};
use crate::system::{FontHandle, FontSystem};
use notepad_core::math::Mat4;
use notepad_core::profiling::profile_function;
use notepad_render::Vertex2D;
use notepad_test_utils::{
    BufferDescriptor, BufferHandle, BufferKind, DrawParams, RenderContext,
};
use std::sync::Arc;

const INDEX_SIZE: u32 = std::mem::size_of::<u32>() as u32;

pub struct Label {
    context: Arc<dyn RenderContext>,
    font: FontHandle,
    text: String,
    is_dirty: bool,
    quad_count: u32,
    max_quad_count: u32,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
}

impl Label {
    /// Create a label drawing `text` with `font`.
    ///
    /// The label takes over one reference on `font`, given back by
    /// [`destroy`](Self::destroy). If creation fails the reference stays
    /// with the caller.
    pub fn new(fonts: &mut FontSystem, font: FontHandle, text: &str) -> FontResult<Self> {
        if fonts.variant(font).is_none() {
            return Err(FontError::InvalidHandle(font));
        }
        let context = Arc::clone(fonts.render_context());

        let vertex_buffer = context.create_buffer(&BufferDescriptor {
            label: Some("label_vertices"),
            element_size: Vertex2D::STRIDE,
            kind: BufferKind::Vertex,
        })?;
        let index_buffer = match context.create_buffer(&BufferDescriptor {
            label: Some("label_indices"),
            element_size: INDEX_SIZE,
            kind: BufferKind::Index,
        }) {
            Ok(buffer) => buffer,
            Err(err) => {
                context.destroy_buffer(vertex_buffer);
                return Err(err.into());
            }
        };

        // Dropped on error, which frees both buffers
        let label = Self {
            context,
            font,
            text: text.to_string(),
            is_dirty: !text.is_empty(),
            quad_count: 0,
            max_quad_count: 0,
            vertex_buffer,
            index_buffer,
        };

        if !text.is_empty() {
            fonts.verify_atlas(font, text)?;
        }
        Ok(label)
    }

    /// Replace the text.
    ///
    /// Identical text is ignored. Anything else marks the label dirty and
    /// grows the atlas to cover the new codepoints.
    pub fn set_text(&mut self, fonts: &mut FontSystem, text: &str) -> FontResult<()> {
        if self.text == text {
            return Ok(());
        }

        self.text.clear();
        self.text.push_str(text);
        self.is_dirty = true;

        if !text.is_empty() {
            if let Err(err) = fonts.verify_atlas(self.font, text) {
                tracing::error!("Failed to verify font atlas for label text: {}", err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Regenerate geometry if the label is dirty.
    ///
    /// Returns true when new geometry was uploaded. A failure is logged and
    /// leaves the label clean with nothing to draw, so a bad string is not
    /// retried every frame.
    pub fn prepare_frame(&mut self, fonts: &FontSystem) -> bool {
        if !self.is_dirty {
            return false;
        }
        profile_function!();
        self.is_dirty = false;

        match self.regenerate(fonts) {
            Ok(quad_count) => {
                self.quad_count = quad_count;
                self.max_quad_count = self.max_quad_count.max(quad_count);
                true
            }
            Err(err) => {
                tracing::error!("Error regenerating label geometry: {}", err);
                self.quad_count = 0;
                false
            }
        }
    }

    fn regenerate(&self, fonts: &FontSystem) -> FontResult<u32> {
        let mesh = fonts.layout(self.font, &self.text)?;

        self.context.upload_buffer(
            self.vertex_buffer,
            mesh.vertices.len() as u32,
            bytemuck::cast_slice(&mesh.vertices),
        )?;
        self.context.upload_buffer(
            self.index_buffer,
            mesh.indices.len() as u32,
            bytemuck::cast_slice(&mesh.indices),
        )?;

        Ok(mesh.quad_count)
    }

    /// Queue a draw of the current geometry with the font's atlas.
    pub fn render(&self, fonts: &FontSystem, transform: Mat4) -> FontResult<()> {
        if self.quad_count == 0 {
            return Ok(());
        }
        let variant = fonts
            .variant(self.font)
            .ok_or(FontError::InvalidHandle(self.font))?;

        self.context.bind_buffer(self.vertex_buffer)?;
        self.context.bind_buffer(self.index_buffer)?;
        let params = DrawParams::new(variant.atlas()).with_transform(transform.to_cols_array_2d());
        self.context.draw_indexed(self.index_buffer, &params)?;
        Ok(())
    }

    /// Free the buffers and give the font reference back.
    pub fn destroy(self, fonts: &mut FontSystem) {
        if let Err(err) = fonts.release(self.font) {
            tracing::warn!("Failed to release label font: {}", err);
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> FontHandle {
        self.font
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn quad_count(&self) -> u32 {
        self.quad_count
    }

    /// Largest quad count uploaded so far.
    pub fn max_quad_count(&self) -> u32 {
        self.max_quad_count
    }

    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }
}

impl Drop for Label {
    fn drop(&mut self) {
        self.context.destroy_buffer(self.vertex_buffer);
        self.context.destroy_buffer(self.index_buffer);
    }
}

impl std::fmt::Debug for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Label")
            .field("font", &self.font)
            .field("text", &self.text)
            .field("is_dirty", &self.is_dirty)
            .field("quad_count", &self.quad_count)
            .finish()
    }
}
