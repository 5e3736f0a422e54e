mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use deskscene_assets::{MaterialRegistry, TextureRegistry, resolve_base};
use deskscene_common::ProjectionMode;
use deskscene_input::{HeldKeys, Key};
use deskscene_render::{DeskScene, ShaderBridge};
use deskscene_render_wgpu::{GpuTextureId, WgpuBackend};
use deskscene_view::ViewController;
use egui::Context as EguiContext;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "deskscene-desktop", about = "Interactive desk scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Texture directory, skipping the search for one
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn key_for(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Scene, registries and input state. Independent of the window.
struct SceneState {
    view: ViewController,
    keys: HeldKeys,
    textures: TextureRegistry<GpuTextureId>,
    materials: MaterialRegistry,
    asset_base: PathBuf,
    show_hud: bool,
    started: Instant,
    last_draws: usize,
}

impl SceneState {
    fn new(settings: &Settings, asset_base: PathBuf) -> Self {
        Self {
            view: ViewController::new(&settings.view),
            keys: HeldKeys::new(),
            textures: TextureRegistry::new(),
            materials: MaterialRegistry::desk_presets(),
            asset_base,
            show_hud: true,
            started: Instant::now(),
            last_draws: 0,
        }
    }

    fn draw_hud(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let camera = self.view.camera();
        let position = camera.position();
        let mode = match self.view.mode() {
            ProjectionMode::Perspective => "perspective",
            ProjectionMode::Orthographic => "orthographic",
        };

        egui::Window::new("Desk Scene")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Projection: {mode}"));
                ui.label(format!(
                    "Camera: ({:.2}, {:.2}, {:.2})",
                    position.x, position.y, position.z
                ));
                ui.label(format!(
                    "Yaw {:.1}  Pitch {:.1}  FOV {:.0}",
                    camera.yaw(),
                    camera.pitch(),
                    camera.zoom()
                ));
                ui.label(format!("Speed: {:.1}", camera.speed()));
                ui.separator();
                ui.label(format!(
                    "Textures: {} from {}",
                    self.textures.len(),
                    self.asset_base.display()
                ));
                ui.label(format!("Draws: {}", self.last_draws));
                ui.separator();
                ui.small("WASD/QE: Move | Mouse: Look | Scroll: Speed");
                ui.small("P: Perspective | O: Orthographic | F1: HUD | Esc: Quit");
            });
    }
}

struct GpuApp {
    settings: Settings,
    state: SceneState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    backend: Option<WgpuBackend>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    /// Fatal setup failure, reported after the event loop stops.
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(settings: Settings, asset_base: PathBuf) -> Self {
        Self {
            state: SceneState::new(&settings, asset_base),
            settings,
            window: None,
            surface: None,
            config: None,
            backend: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            error: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let view = &self.settings.view;
        let attrs = Window::default_attributes()
            .with_title(self.settings.window_title.clone())
            .with_inner_size(PhysicalSize::new(view.window_width, view.window_height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("deskscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.view.resize(config.width, config.height);

        let (width, height) = (config.width, config.height);
        let mut backend = WgpuBackend::new(device, queue, surface_format, width, height);
        DeskScene::load_meshes(&mut backend);
        let state = &mut self.state;
        let loaded = DeskScene::load_textures(&mut state.textures, &mut backend, &state.asset_base);
        tracing::info!(
            "{loaded} of {} scene textures loaded",
            deskscene_render::scene::SCENE_TEXTURES.len()
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(backend.device(), surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.config = Some(config);
        self.backend = Some(backend);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if code == KeyCode::F1 && pressed {
            self.state.show_hud = !self.state.show_hud;
            return;
        }
        if let Some(key) = key_for(code) {
            self.state.keys.set(key, pressed);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(surface), Some(backend), Some(config)) =
            (&self.surface, &mut self.backend, &mut self.config)
        else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        config.width = width;
        config.height = height;
        surface.configure(backend.device(), config);
        backend.resize(width, height);
        self.state.view.resize(width, height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.state.started.elapsed().as_secs_f64();
        let frame = self.state.view.prepare_frame(now, &self.state.keys);
        if self.state.view.exit_requested() {
            event_loop.exit();
            return;
        }

        let (
            Some(window),
            Some(surface),
            Some(config),
            Some(backend),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &self.window,
            &self.surface,
            &self.config,
            &mut self.backend,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(backend.device(), config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        {
            let mut bridge =
                ShaderBridge::new(backend, &self.state.textures, &self.state.materials);
            bridge.apply_view(&frame);
            DeskScene::render(&mut bridge);
        }
        self.state.last_draws = backend.end_frame(&view);

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_hud(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let (device, queue) = (backend.device(), backend.queue());
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => {
                self.state.keys.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.handle_key(code, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state
                    .view
                    .on_cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 40.0) as f32,
                };
                self.state.view.on_scroll(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(backend) = &mut self.backend {
            self.state.textures.clear(backend);
        }
        tracing::info!("deskscene-desktop shutting down");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("deskscene-desktop starting");

    let settings = Settings::load(cli.config.as_deref())?;
    let asset_base = match cli.assets {
        Some(dir) => dir,
        None => resolve_base(&settings.assets),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(settings, asset_base);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
