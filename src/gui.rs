use glam::Vec2;
use winit::event::{ElementState, MouseButton};

/// Debug overlay drawn with egui on top of the constellation
pub struct EguiIntegration {
    ctx: egui::Context,
    pub visible: bool,
    raw_input: egui::RawInput,

    renderer: egui_wgpu::Renderer,
    screen_size: [u32; 2],
    clipped_shapes: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
}

/// What the overlay shows each frame
pub struct OverlayStats {
    pub framerate: f32,
    pub particles: usize,
    pub frames: u64,
    pub pointer: Option<Vec2>,
}

#[derive(Default)]
pub struct OverlayActions {
    pub paused: Option<bool>,
    pub reseed: bool,
}

impl EguiIntegration {
    pub fn new(device: &wgpu::Device, swapchain_format: wgpu::TextureFormat) -> Self {
        let renderer = egui_wgpu::Renderer::new(device, swapchain_format, None, 1);

        Self {
            ctx: egui::Context::default(),
            visible: false,
            raw_input: egui::RawInput::default(),

            renderer,
            screen_size: [0, 0],
            clipped_shapes: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_size = [width, height];
        self.raw_input.screen_rect = Some(egui::Rect::from_min_size(
            Default::default(),
            egui::Vec2::new(width as f32, height as f32),
        ));
    }

    /// Lays out the overlay and reports what the user toggled
    pub fn run(&mut self, stats: &OverlayStats, paused: bool) -> OverlayActions {
        let mut actions = OverlayActions::default();
        let raw_input = std::mem::take(&mut self.raw_input);
        self.ctx.begin_frame(raw_input);

        if self.visible {
            egui::Window::new("Constellation")
                .default_width(160.0)
                .show(&self.ctx, |ui| {
                    ui.label(format!("FPS {:.1}", stats.framerate));
                    ui.label(format!("Particles {}", stats.particles));
                    ui.label(format!("Frames {}", stats.frames));
                    match stats.pointer {
                        Some(p) => ui.label(format!("Pointer\nx: {:.0}\ny: {:.0}", p.x, p.y)),
                        None => ui.label("Pointer inactive"),
                    };

                    ui.separator();
                    let mut checked = paused;
                    if ui.checkbox(&mut checked, "Paused [Space]").changed() {
                        actions.paused = Some(checked);
                    }
                    actions.reseed = ui.button("Reseed").clicked();
                });
        }

        let output = self.ctx.end_frame();
        self.clipped_shapes = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta = output.textures_delta;

        actions
    }

    /// Uploads the overlay tessellated by `run`. Texture deltas always go
    /// through, vertex buffers only while something is on screen.
    pub fn pre_render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        delta_time: f32,
    ) {
        self.raw_input.predicted_dt = delta_time;

        for (id, delta) in self.textures_delta.set.drain(..) {
            self.renderer.update_texture(device, queue, id, &delta);
        }
        for id in self.textures_delta.free.drain(..) {
            self.renderer.free_texture(&id);
        }

        if self.clipped_shapes.is_empty() {
            return;
        }
        let screen = self.screen();
        self.renderer
            .update_buffers(device, queue, encoder, &self.clipped_shapes, &screen);
    }

    pub fn render<'a>(&'a mut self, rpass: &mut wgpu::RenderPass<'a>) {
        if self.clipped_shapes.is_empty() {
            return;
        }
        let screen = self.screen();
        self.renderer.render(rpass, &self.clipped_shapes, &screen);
    }

    fn screen(&self) -> egui_wgpu::ScreenDescriptor {
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: self.screen_size,
            pixels_per_point: self.ctx.pixels_per_point(),
        }
    }

    pub fn mouse_event(&mut self, position: Vec2, state: ElementState, button: MouseButton) {
        if let Some(event) = overlay_click(position, state, button) {
            self.raw_input.events.push(event);
        }
    }

    pub fn mouse_motion(&mut self, position: Vec2) {
        self.raw_input
            .events
            .push(egui::Event::PointerMoved(to_pos(position)));
    }
}

/// Only the primary button drives the overlay widgets
fn overlay_click(
    position: Vec2,
    state: ElementState,
    button: MouseButton,
) -> Option<egui::Event> {
    (button == MouseButton::Left).then(|| egui::Event::PointerButton {
        pos: to_pos(position),
        button: egui::PointerButton::Primary,
        pressed: state.is_pressed(),
        modifiers: egui::Modifiers::default(),
    })
}

fn to_pos(position: Vec2) -> egui::Pos2 {
    egui::Pos2::new(position.x, position.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_button_becomes_a_primary_click() {
        let at = Vec2::new(12.0, 34.0);

        assert_eq!(
            overlay_click(at, ElementState::Pressed, MouseButton::Left),
            Some(egui::Event::PointerButton {
                pos: egui::Pos2::new(12.0, 34.0),
                button: egui::PointerButton::Primary,
                pressed: true,
                modifiers: egui::Modifiers::default(),
            })
        );
        assert!(matches!(
            overlay_click(at, ElementState::Released, MouseButton::Left),
            Some(egui::Event::PointerButton { pressed: false, .. })
        ));
    }

    #[test]
    fn other_buttons_are_ignored() {
        for button in [
            MouseButton::Right,
            MouseButton::Middle,
            MouseButton::Back,
            MouseButton::Forward,
            MouseButton::Other(7),
        ] {
            assert_eq!(overlay_click(Vec2::ZERO, ElementState::Pressed, button), None);
        }
    }
}
