use crate::mesh::CubeMesh;
use crate::program::ShaderProgram;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Draws the lit cube into a colour target with its own depth buffer.
pub struct CubeRenderer {
    program: ShaderProgram,
    mesh: CubeMesh,
    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,
}

impl CubeRenderer {
    pub fn new(device: &wgpu::Device, program: ShaderProgram, width: u32, height: u32) -> Self {
        let mesh = CubeMesh::new(device);
        tracing::debug!("cube mesh uploaded with {} indices", mesh.index_count());
        Self {
            program,
            mesh,
            depth_texture: Self::create_depth_texture(device, width, height),
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// The program, for uniform writes before the next [`CubeRenderer::render`].
    pub fn program_mut(&mut self) -> &mut ShaderProgram {
        &mut self.program
    }

    /// Render one frame: upload uniforms, clear, draw the cube.
    pub fn render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) {
        self.program.upload(queue);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            self.program.use_program(&mut pass);
            self.mesh.draw(&mut pass);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
