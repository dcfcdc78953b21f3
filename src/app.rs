use std::iter;
use std::path::Path;

use eframe::egui::{self, ClippedPrimitive};
use rand::thread_rng;
use thiserror::Error;
use wgpu::{
    Backends, Color, CommandEncoder, CommandEncoderDescriptor, CompositeAlphaMode, Device,
    DeviceDescriptor, Dx12Compiler, Features, Instance, InstanceDescriptor, Limits, LoadOp,
    Operations, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RequestAdapterOptions, Surface, SurfaceConfiguration, SurfaceError,
    TextureUsages, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::camera::Camera;
use crate::glint::builder;
use crate::glint::scene::Scene;
use crate::glint::uniforms::MarshalError;
use crate::glint::{Glint, ShaderError};
use crate::settings::{RenderSettings, SamplingMode};

/// Sphere count the "Randomize" command asks for.
pub const RANDOM_SCENE_SIZE: usize = 12;

const SHADER_PATH: &str = "shaders/raytrace.wgsl";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// Discrete scene mutations issued from the control panel. Collected
/// during the UI pass and applied before the frame is marshalled.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SceneCommand {
    Reset,
    Randomize,
    Clear,
    AddObject,
}

pub struct Application {
    surface: Surface,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub window: Window,

    egui_state: egui_winit::State,
    egui_context: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    egui_screen: egui_wgpu::renderer::ScreenDescriptor,

    glint: Glint,
    pub scene: Scene,
    pub camera: Camera,
    pub settings: RenderSettings,
}

impl Application {
    pub async fn new(
        window: Window,
        event_loop: &EventLoop<()>,
        settings: RenderSettings,
    ) -> Result<Self, ShaderError> {
        let size = window.inner_size();

        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            dx12_shader_compiler: Dx12Compiler::default(),
        });

        // The window outlives the surface; it is dropped together with
        // the application.
        let surface = unsafe { instance.create_surface(&window) }.unwrap();

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    features: Features::empty(),
                    limits: Limits::default(),
                    label: Some("Glint GPU"),
                },
                None,
            )
            .await
            .unwrap();

        let capabilities = surface.get_capabilities(&adapter);
        let surface_format = capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(capabilities.formats[0]);
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let egui_state = egui_winit::State::new(event_loop);
        let egui_context = egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1);
        let egui_screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: egui_context.pixels_per_point(),
        };

        // A broken or missing program is fatal: everything past this point
        // renders through it.
        let glint = Glint::new(&device, &queue, surface_format, Path::new(SHADER_PATH))?;

        let scene = builder::default_scene();
        let camera = Camera::new(45.0, size);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            egui_state,
            egui_context,
            egui_renderer,
            egui_screen,
            glint,
            scene,
            camera,
            settings,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.camera.resize(new_size);

        self.egui_screen.pixels_per_point = self.egui_context.pixels_per_point();
        self.egui_screen.size_in_pixels = [self.config.width, self.config.height];
    }

    /// Returns true when the event was handled here (UI or camera) and
    /// needs no further dispatch.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        let egui_response = self.egui_state.on_event(&self.egui_context, event);
        if egui_response.consumed {
            return true;
        }

        if let WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state: ElementState::Pressed,
                    virtual_keycode: Some(VirtualKeyCode::T),
                    ..
                },
            ..
        } = event
        {
            let visible = self.settings.toolbar_visible();
            self.settings.set_toolbar_visible(!visible);
            return true;
        }

        self.camera.input(event)
    }

    pub fn render(&mut self) -> Result<(), FrameError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        {
            // UI runs first so every pending command and settings change
            // lands before the marshaller reads the scene.
            let primitives = self.update_egui(&mut encoder);

            self.glint
                .prepare(&self.queue, &self.scene, &self.camera, &self.settings)?;

            let [r, g, b] = self.settings.background();
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            self.glint.render(&mut render_pass);
            self.egui_renderer
                .render(&mut render_pass, &primitives, &self.egui_screen)
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn update_egui(&mut self, encoder: &mut CommandEncoder) -> Vec<ClippedPrimitive> {
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let context = self.egui_context.clone();

        let scene = &mut self.scene;
        let settings = &mut self.settings;
        let mut command = None;

        let egui_output = context.run(egui_input, |ctx| {
            if !settings.toolbar_visible() {
                return;
            }

            egui::SidePanel::right("Controls")
                .resizable(true)
                .default_width(180.0)
                .show(ctx, |ui| {
                    ui.heading("Scene");
                    if ui.button("Reset").clicked() {
                        command = Some(SceneCommand::Reset);
                    }
                    if ui.button("Randomize").clicked() {
                        command = Some(SceneCommand::Randomize);
                    }
                    if ui.button("Clear objects").clicked() {
                        command = Some(SceneCommand::Clear);
                    }
                    if ui.button("Add random object").clicked() {
                        command = Some(SceneCommand::AddObject);
                    }
                    ui.label(format!(
                        "{} spheres, {} lights",
                        scene.spheres().len(),
                        scene.lights().len()
                    ));

                    ui.separator();
                    ui.heading("Rendering");

                    let mut iterations = settings.iteration_limit();
                    ui.add(egui::Slider::new(&mut iterations, 1..=32).text("Ray depth"));
                    settings.set_iteration_limit(iterations);

                    let mut samples = settings.sample_count();
                    ui.add(egui::Slider::new(&mut samples, 1..=64).text("Samples"));
                    settings.set_sample_count(samples);

                    let mut mode = settings.sampling_mode();
                    egui::ComboBox::from_label("Sampling")
                        .selected_text(mode.label())
                        .show_ui(ui, |ui| {
                            for option in [SamplingMode::Random, SamplingMode::MultiJittered] {
                                ui.selectable_value(&mut mode, option, option.label());
                            }
                        });
                    settings.set_sampling_mode(mode);

                    let mut transparency = settings.transparency_enabled();
                    ui.checkbox(&mut transparency, "Transparency");
                    settings.set_transparency_enabled(transparency);

                    let mut background = settings.background();
                    ui.horizontal(|ui| {
                        ui.label("Background");
                        ui.color_edit_button_rgb(&mut background);
                    });
                    settings.set_background(background);
                });
        });

        match command {
            Some(SceneCommand::Reset) => *scene = builder::default_scene(),
            Some(SceneCommand::Randomize) => {
                *scene = builder::random_scene(RANDOM_SCENE_SIZE, &mut thread_rng())
            }
            Some(SceneCommand::Clear) => scene.clear(),
            Some(SceneCommand::AddObject) => builder::add_random_object(scene, &mut thread_rng()),
            None => {}
        }

        self.egui_state.handle_platform_output(
            &self.window,
            &self.egui_context,
            egui_output.platform_output,
        );
        let primitives = self.egui_context.tessellate(egui_output.shapes);
        for (id, delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }
        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &primitives,
            &self.egui_screen,
        );

        primitives
    }
}
