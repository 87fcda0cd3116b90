use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    assets::AssetManager,
    input::InputState,
    math::Vec2,
    render::{FontHandle, Renderer, TextureHandle},
};

/// Window and presentation settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    /// Logical window width.
    pub width: u32,
    /// Logical window height.
    pub height: u32,
    pub vsync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Space Prototype".into(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Owns the event loop and drives a [`Game`] once per frame.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Blocks until the window closes, Escape is pressed, or an error
    /// surfaces from the game. Errors from `init`, `update` and `draw` are
    /// returned here after the loop shuts down.
    pub fn run<G: Game>(self, game: G) -> Result<()> {
        let event_loop = EventLoop::new()?;
        let mut runner = Runner {
            config: self.config,
            game,
            ctx: None,
            last_tick: Instant::now(),
            failure: None,
        };
        event_loop.run_app(&mut runner)?;

        match runner.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Runner<G> {
    config: EngineConfig,
    game: G,
    ctx: Option<EngineContext<'static>>,
    last_tick: Instant,
    failure: Option<anyhow::Error>,
}

impl<G: Game> Runner<G> {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = event_loop.create_window(attributes)?;
        // Lives until the process exits; the surface borrows it.
        let window: &'static Window = Box::leak(Box::new(window));

        let ctx = self.ctx.insert(EngineContext::new(window, self.config.vsync)?);
        self.game.init(ctx)?;
        log::info!(
            "window \"{}\" open at {}x{}",
            self.config.title,
            self.config.width,
            self.config.height
        );
        self.last_tick = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, stage: &str, err: anyhow::Error) {
        log::error!("{stage} failed: {err:?}");
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl<G: Game> ApplicationHandler for Runner<G> {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        if let Some(ctx) = &mut self.ctx {
            ctx.input.begin_frame();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, "startup", err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        ctx.record_input(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } if is_escape(&event) => event_loop.exit(),
            WindowEvent::Resized(size) => ctx.renderer.resize(size),
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.game.draw(ctx) {
                    self.fail(event_loop, "draw", err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        let now = Instant::now();
        ctx.delta_time = now - self.last_tick;
        self.last_tick = now;

        if let Err(err) = self.game.update(ctx) {
            self.fail(event_loop, "update", err);
            return;
        }
        ctx.window.request_redraw();
    }
}

fn is_escape(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
}

/// Per-frame access to timing, input, drawing and asset loading.
pub struct EngineContext<'window> {
    window: &'window Window,
    delta_time: Duration,
    input: InputState,
    renderer: Renderer<'window>,
    assets: AssetManager,
}

impl<'window> EngineContext<'window> {
    fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let renderer = Renderer::new(window, vsync).context("renderer setup failed")?;
        Ok(Self {
            window,
            delta_time: Duration::ZERO,
            input: InputState::new(),
            renderer,
            assets: AssetManager::new(),
        })
    }

    fn record_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.input.handle_key(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_button(*button, *state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_moved(position.x, position.y)
            }
            WindowEvent::MouseWheel { delta, .. } => self.input.handle_mouse_wheel(*delta),
            _ => {}
        }
    }

    /// Wall time since the previous update.
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn renderer(&mut self) -> &mut Renderer<'window> {
        &mut self.renderer
    }

    /// Drawable surface size in physical pixels.
    pub fn screen_size(&self) -> Vec2 {
        let (w, h) = self.renderer.surface_size();
        Vec2::new(w as f32, h as f32)
    }

    /// Cached by path; a second call for the same file returns the same handle.
    pub fn load_texture(&mut self, path: &str) -> Result<TextureHandle> {
        self.assets.load_texture(&mut self.renderer, path)
    }

    pub fn load_font(&mut self, path: &str) -> Result<FontHandle> {
        self.assets.load_font(&mut self.renderer, path)
    }
}

/// Lifecycle hooks the engine calls on the game.
pub trait Game {
    /// Runs once, after the window and renderer exist.
    fn init(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;

    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;
}
