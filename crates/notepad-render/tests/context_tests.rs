//! Graphics context and wgpu renderer tests.
//!
//! Anything touching a device is ignored by default:
//! `cargo test -p notepad-render --test context_tests -- --ignored`

use notepad_render::{
    BufferDescriptor, BufferKind, DrawParams, GraphicsContext, GraphicsError, RenderContext,
    RenderError, TextureDescriptor, Vertex2D, WHITE, WgpuRenderContext, screen_projection,
};
use std::sync::Arc;

fn quad_vertices() -> Vec<Vertex2D> {
    vec![
        Vertex2D::new([0.0, 0.0], [0.0, 0.0], WHITE),
        Vertex2D::new([8.0, 8.0], [1.0, 1.0], WHITE),
        Vertex2D::new([0.0, 8.0], [0.0, 1.0], WHITE),
        Vertex2D::new([8.0, 0.0], [1.0, 0.0], WHITE),
    ]
}

#[test]
fn test_graphics_error_display() {
    let err = GraphicsError::NoAdapter("none".to_string());
    assert!(err.to_string().contains("adapter"));
}

#[test]
#[ignore] // Requires GPU
fn test_context_arc_cloning() {
    if let Ok(ctx) = GraphicsContext::new_owned_sync() {
        let ctx2 = ctx.clone();
        assert_eq!(Arc::strong_count(&ctx), 2);
        assert!(ctx2.max_texture_dimension_2d() >= 1024);
    }
}

#[test]
#[ignore] // Requires GPU
fn test_texture_upload_validation() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        return;
    };
    let renderer = WgpuRenderContext::new(ctx, wgpu::TextureFormat::Rgba8UnormSrgb);

    let texture = renderer
        .create_texture(&TextureDescriptor {
            label: Some("test_atlas"),
            width: 64,
            height: 64,
            channels: 4,
        })
        .unwrap();

    assert!(renderer.upload_texture_pixels(texture, &[255u8; 64 * 64 * 4]).is_ok());
    assert!(matches!(
        renderer.upload_texture_pixels(texture, &[0u8; 10]),
        Err(RenderError::UploadSizeMismatch { .. })
    ));

    renderer.destroy_texture(texture);
    assert_eq!(
        renderer.upload_texture_pixels(texture, &[255u8; 64 * 64 * 4]),
        Err(RenderError::InvalidTexture(texture))
    );
}

#[test]
#[ignore] // Requires GPU
fn test_draw_is_queued_and_replayed() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        return;
    };
    let format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let renderer = WgpuRenderContext::new(ctx.clone(), format);

    let texture = renderer
        .create_texture(&TextureDescriptor {
            label: None,
            width: 4,
            height: 4,
            channels: 4,
        })
        .unwrap();
    renderer.upload_texture_pixels(texture, &[255u8; 64]).unwrap();

    let vertices = renderer
        .create_buffer(&BufferDescriptor {
            label: Some("test_vertices"),
            element_size: Vertex2D::STRIDE,
            kind: BufferKind::Vertex,
        })
        .unwrap();
    let indices = renderer
        .create_buffer(&BufferDescriptor {
            label: Some("test_indices"),
            element_size: 4,
            kind: BufferKind::Index,
        })
        .unwrap();

    let quad = quad_vertices();
    renderer
        .upload_buffer(vertices, 4, bytemuck::cast_slice(&quad))
        .unwrap();
    renderer
        .upload_buffer(indices, 6, bytemuck::cast_slice(&[2u32, 1, 0, 3, 0, 1]))
        .unwrap();
    renderer.bind_buffer(vertices).unwrap();
    renderer.bind_buffer(indices).unwrap();

    let params = DrawParams::new(texture)
        .with_transform(screen_projection(32.0, 32.0).to_cols_array_2d());
    renderer.draw_indexed(indices, &params).unwrap();
    assert_eq!(renderer.pending_draw_count(), 1);

    let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test_target"),
        size: wgpu::Extent3d {
            width: 32,
            height: 32,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("test_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        renderer.render(&mut pass);
    }
    ctx.queue.submit(Some(encoder.finish()));

    assert_eq!(renderer.pending_draw_count(), 0);
}
