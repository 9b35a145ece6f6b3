//! Shared plumbing for full-screen render passes.

/// Uniform interface for full-screen passes.
pub trait ScreenPass {
    /// Encode a draw of this pass into `output`.
    fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView);
}

/// Clear `output` and draw one full-screen triangle with `pipeline`.
pub(crate) fn draw_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    output: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: Option<&wgpu::BindGroup>,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: output,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        ..Default::default()
    });
    // Without a bind group the clear is all this pass does.
    let Some(bind_group) = bind_group else {
        return;
    };
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
