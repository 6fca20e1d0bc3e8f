use anyhow::{Context, Result};
use clap::Parser;
use crossplanes_assets::{TextureLoad, TextureLoader};
use crossplanes_common::{SurfaceSize, TextureId};
use crossplanes_input::{ControlInput, PointerButton};
use crossplanes_render_wgpu::WgpuRenderer;
use crossplanes_scene::SceneConfig;
use crossplanes_viewer::{Viewer, ViewerEvent};
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels of trackpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Parser)]
#[command(
    name = "crossplanes-desktop",
    about = "Two crossed transparent planes, redrawn only when something changes"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML). Built-in defaults when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Initial window width in physical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Draw each plane as one mesh instead of two halves
    #[arg(long)]
    no_split: bool,
}

/// Events delivered to the event loop from other threads.
#[derive(Debug)]
enum AppEvent {
    TextureLoaded(TextureLoad),
}

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    viewer: Viewer<WgpuRenderer>,
    /// Last cursor position; winit button events carry none.
    cursor: Vec2,
}

struct App {
    config: SceneConfig,
    initial_size: PhysicalSize<u32>,
    proxy: EventLoopProxy<AppEvent>,
    loader: TextureLoader,
    running: Option<Running>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(
        config: SceneConfig,
        initial_size: PhysicalSize<u32>,
        proxy: EventLoopProxy<AppEvent>,
    ) -> Self {
        Self {
            config,
            initial_size,
            proxy,
            loader: TextureLoader::new(),
            running: None,
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Crossed planes")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let size = window.inner_size();
        let target = pollster::block_on(WgpuRenderer::new(
            window.clone(),
            SurfaceSize::new(size.width, size.height),
        ))
        .context("initialize GPU")?;

        let mut viewer = Viewer::new(&self.config, target);
        self.load_textures(&viewer);

        // The first frame goes out before any texture arrives.
        if let Err(e) = viewer.start() {
            tracing::warn!("startup frame failed: {e}");
            viewer.target_mut().reconfigure();
            viewer.request_frame(&|| window.request_redraw());
        }

        self.running = Some(Running {
            window,
            viewer,
            cursor: Vec2::ZERO,
        });
        Ok(())
    }

    fn load_textures(&self, viewer: &Viewer<WgpuRenderer>) {
        for (index, source) in viewer.scene().textures().iter().enumerate() {
            let proxy = self.proxy.clone();
            let result = self.loader.load(TextureId(index), source.path.clone(), move |load| {
                if proxy.send_event(AppEvent::TextureLoaded(load)).is_err() {
                    tracing::debug!("event loop closed before texture arrived");
                }
            });
            if let Err(e) = result {
                tracing::warn!(path = %source.path.display(), "texture load not started: {e}");
            }
        }
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Positive means "scroll towards the user", matching DOM `deltaY`.
fn wheel_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(pos) => (-pos.y / PIXELS_PER_LINE) as f32,
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            tracing::error!("failed to start: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(Running {
            window,
            viewer,
            cursor,
        }) = &mut self.running
        else {
            return;
        };
        let host = || window.request_redraw();

        let viewer_event = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                viewer
                    .target_mut()
                    .set_layout_size(SurfaceSize::new(size.width, size.height));
                ViewerEvent::Resized
            }
            WindowEvent::CursorMoved { position, .. } => {
                *cursor = Vec2::new(position.x as f32, position.y as f32);
                ViewerEvent::Input(ControlInput::PointerMove { position: *cursor })
            }
            WindowEvent::CursorLeft { .. } => ViewerEvent::Input(ControlInput::PointerLeave),
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = pointer_button(button) else {
                    return;
                };
                ViewerEvent::Input(match state {
                    ElementState::Pressed => ControlInput::PointerDown {
                        button,
                        position: *cursor,
                    },
                    ElementState::Released => ControlInput::PointerUp { button },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => ViewerEvent::Input(ControlInput::Wheel {
                delta_y: wheel_delta(delta),
            }),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::KeyR => ViewerEvent::ResetView,
                KeyCode::Escape => {
                    event_loop.exit();
                    return;
                }
                _ => return,
            },
            WindowEvent::RedrawRequested => {
                // Requested frames clear the pending flag first; anything
                // else is the system asking for the contents again.
                let result = match viewer.on_frame() {
                    Some(result) => result,
                    None => viewer.redraw(),
                };
                match result {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        tracing::warn!("surface lost or outdated, reconfiguring");
                        viewer.target_mut().reconfigure();
                        viewer.request_frame(&host);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory");
                        event_loop.exit();
                    }
                    Err(e) => tracing::warn!("surface error: {e}"),
                }
                return;
            }
            _ => return,
        };

        viewer.handle(viewer_event, &host);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        let Some(Running { window, viewer, .. }) = &mut self.running else {
            return;
        };
        let host = || window.request_redraw();

        match event {
            AppEvent::TextureLoaded(TextureLoad { id, path, result }) => match result {
                Ok(image) => {
                    viewer.handle(ViewerEvent::TextureLoaded { id, image }, &host);
                }
                Err(e) => {
                    tracing::warn!(
                        texture = id.0,
                        path = %path.display(),
                        "texture failed to load: {e}"
                    );
                }
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("crossplanes-desktop starting");

    let mut config = match &cli.scene {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if cli.no_split {
        config.split_planes = false;
    }

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    // Nothing animates; the loop sleeps until an event arrives.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(
        config,
        PhysicalSize::new(cli.width, cli.height),
        event_loop.create_proxy(),
    );
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn wheel_towards_user_zooms_out() {
        assert_eq!(wheel_delta(MouseScrollDelta::LineDelta(0.0, -1.0)), 1.0);
        assert_eq!(wheel_delta(MouseScrollDelta::LineDelta(0.0, 2.0)), -2.0);
        assert_eq!(
            wheel_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -80.0))),
            2.0
        );
    }

    #[test]
    fn only_three_buttons_drive_the_controls() {
        assert_eq!(pointer_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(pointer_button(MouseButton::Right), Some(PointerButton::Secondary));
        assert_eq!(pointer_button(MouseButton::Back), None);
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::parse_from(["crossplanes-desktop", "--no-split", "--width", "640"]);
        assert!(cli.no_split);
        assert_eq!(cli.width, 640);
        assert_eq!(cli.height, 720);
        assert!(cli.scene.is_none());
    }
}
