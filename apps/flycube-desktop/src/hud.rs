use crate::clock::FrameClock;
use egui::Context as EguiContext;
use flycube_camera::PerspectiveCamera;
use winit::event::WindowEvent;
use winit::window::Window;

/// egui overlay showing the camera pose and frame timing.
pub struct Hud {
    ctx: EguiContext,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl Hud {
    pub fn new(window: &Window, device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let ctx = EguiContext::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);
        Self {
            ctx,
            winit_state,
            renderer,
            visible: true,
        }
    }

    /// Feed a window event to egui. Returns `true` if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Draw the overlay on top of `view`. Pending egui input is drained even
    /// when hidden.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        camera: &PerspectiveCamera,
        clock: &FrameClock,
    ) {
        let raw_input = self.winit_state.take_egui_input(window);
        if !self.visible {
            return;
        }

        let full_output = self.ctx.run(raw_input, |ctx| draw_camera_panel(ctx, camera, clock));
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("hud_encoder"),
        });
        self.renderer
            .update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("hud_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

fn draw_camera_panel(ctx: &EguiContext, camera: &PerspectiveCamera, clock: &FrameClock) {
    egui::Window::new("Camera")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            let p = camera.view_position();
            let f = camera.front();
            ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
            ui.label(format!("Front: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
            ui.label(format!(
                "Yaw: {:.1}°  Pitch: {:.1}°",
                camera.yaw(),
                camera.pitch()
            ));
            ui.label(format!("Zoom: {:.1}°", camera.zoom()));
            ui.separator();
            let avg = clock.average().as_secs_f64() * 1000.0;
            ui.label(format!(
                "Frame: {avg:.2} ms (min {:.2}, max {:.2})",
                clock.min().as_secs_f64() * 1000.0,
                clock.max().as_secs_f64() * 1000.0
            ));
            ui.separator();
            ui.small("WASD: Move | E/Q: Up/Down | Mouse: Look | Wheel: Zoom | F1: HUD | Esc: Quit");
        });
}
