mod cli;
mod color;
mod connections;
mod driver;
mod field;
mod framepace;
mod gpu;
mod gui;
mod input;
mod particle;
mod physics;
mod render;
mod surface;

use std::sync::Arc;

use clap::Parser;
use driver::{AnimationDriver, DriverState};
use framepace::{DisplayScheduler, Framepacer};
use glam::Vec2;
use gpu::GpuContext;
use gui::{EguiIntegration, OverlayStats};
use input::{InputAdapter, PointerCapability};
use log::{error, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use surface::DrawList;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::render::RenderModule;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();

    let rng = match args.seed {
        Some(seed) => {
            info!("Seeding particles with {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let input = InputAdapter::new(PointerCapability::detect(args.pointer));
    let driver = AnimationDriver::new(
        args.driver_settings(),
        input.pointer(),
        DisplayScheduler::default(),
        rng,
    );

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gpu: None,
        gfx: None,
        args,

        driver,
        input,
        draw_list: DrawList::new(),
        framepace: Framepacer::new(),
        mouse_position: Vec2::ZERO,
    };

    event_loop.run_app(&mut app_state)?;
    Ok(())
}

struct GfxState {
    window: Arc<Window>,
    egui: EguiIntegration,
    render_module: RenderModule,
}

struct AppState {
    tokio_rt: tokio::runtime::Runtime,
    gpu: Option<GpuContext>,
    gfx: Option<GfxState>,
    args: cli::Args,

    driver: AnimationDriver<DisplayScheduler, StdRng>,
    input: InputAdapter,
    draw_list: DrawList,
    framepace: Framepacer,
    mouse_position: Vec2,
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let mut attributes = Window::default_attributes().with_title("Constellation");
        if self.args.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(event_loop.create_window(attributes)?);
        let window_size = window.inner_size();

        let gpu = self.tokio_rt.block_on(GpuContext::new(window.clone()))?;

        let render_module = RenderModule::new(&gpu.device, gpu.format(), self.args.background);
        render_module.update_size(&gpu.queue, window_size.width, window_size.height);

        let mut egui = EguiIntegration::new(&gpu.device, gpu.format());
        egui.resize(window_size.width, window_size.height);

        self.driver.scheduler_mut().attach(window.clone());
        self.gfx = Some(GfxState {
            window,
            egui,
            render_module,
        });
        self.gpu = Some(gpu);

        self.resize(window_size.width, window_size.height);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(gpu), Some(gfx)) = (&mut self.gpu, &mut self.gfx) else {
            return;
        };

        if gpu.resize(width, height) {
            gfx.render_module.update_size(&gpu.queue, width, height);
            gfx.egui.resize(width, height);
        }

        let bounds = self.input.resized(width, height);
        self.driver.resize(bounds.x, bounds.y);
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.driver.stop();
        } else {
            self.driver.start();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(gfx)) = (&mut self.gpu, &mut self.gfx) else {
            return;
        };

        self.framepace.begin_frame();

        // Only a due frame advances the simulation, other redraws repaint
        // the last one under the overlay
        if let Some(handle) = self.driver.scheduler_mut().take_due() {
            self.driver.tick(handle, &mut self.draw_list);
        }

        let stats = OverlayStats {
            framerate: self.framepace.framerate(),
            particles: self.driver.field().len(),
            frames: self.driver.frames(),
            pointer: self
                .input
                .pointer()
                .is_active()
                .then(|| self.driver.pointer()),
        };
        let paused = self.driver.state() == DriverState::Idle;
        let actions = gfx.egui.run(&stats, paused);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure_surface();
                gfx.window.request_redraw();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Out of memory while acquiring a frame");
                event_loop.exit();
                return;
            }
            Err(err) => {
                warn!("Dropped a frame: {err}");
                return;
            }
        };

        gfx.render_module
            .prepare(&gpu.device, &gpu.queue, &self.draw_list);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        gfx.egui.pre_render(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            self.framepace.frametime(),
        );

        // Render
        {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            let mut rpass = gfx.render_module.begin_pass(&mut encoder, &view);
            gfx.egui.render(&mut rpass);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        // A paused driver schedules nothing, so repaint the fresh field here
        if actions.reseed {
            self.driver.reseed();
            if self.driver.state() == DriverState::Idle {
                self.driver.draw(&mut self.draw_list);
                gfx.window.request_redraw();
            }
        }
        if let Some(paused) = actions.paused {
            self.set_paused(paused);
        }

        self.framepace.end_frame(self.args.framerate);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            error!("Failed to set up graphics: {err:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gfx) = &mut self.gfx else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.driver.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }

                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Space) => {
                        let paused = self.driver.state() == DriverState::Idle;
                        self.set_paused(!paused);
                    }
                    PhysicalKey::Code(KeyCode::F1) => {
                        gfx.egui.visible = !gfx.egui.visible;
                        gfx.window.request_redraw();
                    }
                    PhysicalKey::Code(KeyCode::F11) => {
                        if gfx.window.fullscreen().is_none() {
                            gfx.window
                                .set_fullscreen(Some(Fullscreen::Borderless(None)));
                        } else {
                            gfx.window.set_fullscreen(None);
                        }
                    }
                    PhysicalKey::Code(KeyCode::Escape) => {
                        self.driver.stop();
                        event_loop.exit();
                    }
                    _ => (),
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                gfx.egui.mouse_event(self.mouse_position, state, button);
                if gfx.egui.visible {
                    gfx.window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.pointer_moved(position.x, position.y);

                let position = Vec2::new(position.x as f32, position.y as f32);
                gfx.egui.mouse_motion(position);
                self.mouse_position = position;
                if gfx.egui.visible {
                    gfx.window.request_redraw();
                }
            }

            _ => (),
        }
    }
}
