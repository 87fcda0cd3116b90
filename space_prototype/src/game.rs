use anyhow::Result;
use space_engine::{
    Camera2D, EngineContext, FontHandle, Frame, Game, Rect, Renderer, SpriteSheet, TextureHandle,
    Vec2,
};

use crate::asteroids::AsteroidSystem;
use crate::background::{draw_map_bounds, Background};
use crate::beam::{Beam, BeamTextures};
use crate::config::{CameraConfig, GameConfig};
use crate::planet::{Planet, PLANET_FRAME_SIZE};
use crate::player::{Player, PlayerInput, PlayerSprites};

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const HUD_COLOR: [f32; 4] = [245.0 / 255.0, 245.0 / 255.0, 245.0 / 255.0, 1.0];

/// Help text: line, top edge in pixels, font size.
const HUD_LINES: [(&str, f32, f32); 4] = [
    ("WASD or arrows to move", 20.0, 20.0),
    ("Hold RMB to boost", 44.0, 18.0),
    ("Mouse wheel to zoom", 66.0, 18.0),
    ("Map boundary shown in blue", 88.0, 18.0),
];
const HUD_LEFT: f32 = 20.0;

/// Zoom after `wheel` notches, kept inside the configured limits.
/// Inverted limits resolve to `max_zoom` instead of panicking.
pub fn apply_zoom(zoom: f32, wheel: f32, config: &CameraConfig) -> f32 {
    (zoom + wheel * config.zoom_step)
        .max(config.min_zoom)
        .min(config.max_zoom)
}

/// The whole scene: a ship on a bounded map, an asteroid field around it and
/// a beam that mines the nearest rock.
pub struct SpacePrototype {
    config: GameConfig,
    map: Rect,
    camera: Camera2D,
    player: Player,
    planet: Planet,
    asteroids: AsteroidSystem,
    beam: Beam,
    beam_textures: Option<BeamTextures>,
    background: Option<Background>,
    font: Option<FontHandle>,
}

impl SpacePrototype {
    pub fn new(config: GameConfig) -> Self {
        let map = Rect::new(0.0, 0.0, config.map.width, config.map.height);
        let player = Player::new(map.center(), &config.player);
        let camera = Camera2D::centered(
            player.position,
            config.window.width as f32,
            config.window.height as f32,
        );

        Self {
            planet: Planet::for_map(Vec2::new(map.width, map.height)),
            asteroids: AsteroidSystem::new(Vec::new(), &config.asteroids),
            beam: Beam::new(),
            beam_textures: None,
            background: None,
            font: None,
            map,
            camera,
            player,
            config,
        }
    }

    fn draw_hud(&self, renderer: &mut Renderer, frame: &mut Frame) -> Result<()> {
        let Some(font) = self.font else {
            return Ok(());
        };
        let screen = Camera2D::screen();
        for (line, top, size) in HUD_LINES {
            renderer.draw_text(
                frame,
                line,
                font,
                size,
                Vec2::new(HUD_LEFT, top),
                HUD_COLOR,
                &screen,
            )?;
        }
        Ok(())
    }
}

/// Missing art is not fatal; whatever depends on it is simply not drawn.
fn try_texture(ctx: &mut EngineContext<'_>, path: &str) -> Option<(TextureHandle, (u32, u32))> {
    match ctx.load_texture(path) {
        Ok(handle) => {
            let size = ctx.renderer().texture_size(handle)?;
            Some((handle, size))
        }
        Err(err) => {
            log::warn!("could not load texture {path}: {err:#}");
            None
        }
    }
}

impl Game for SpacePrototype {
    fn init(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let paths = self.config.assets.clone();

        self.background = try_texture(ctx, &paths.background)
            .map(|(texture, size)| Background::new(texture, size));

        self.beam_textures = match (
            try_texture(ctx, &paths.beam_body),
            try_texture(ctx, &paths.beam_head),
        ) {
            (Some((body, body_size)), Some((head, head_size))) => Some(BeamTextures {
                body,
                body_size,
                head,
                head_size,
            }),
            _ => None,
        };

        let ship = try_texture(ctx, &paths.ship_body);
        let idle = try_texture(ctx, &paths.engine_idle);
        let boost = try_texture(ctx, &paths.engine_boost);
        if let (Some((body, body_size)), Some(idle), Some(boost)) = (ship, idle, boost) {
            self.player.set_sprites(PlayerSprites::new(
                body,
                body_size,
                SpriteSheet::auto(idle.0, idle.1),
                SpriteSheet::auto(boost.0, boost.1),
            ));
        }

        if let Some((texture, size)) = try_texture(ctx, &paths.planet) {
            self.planet.set_sheet(SpriteSheet::grid(
                texture,
                size,
                PLANET_FRAME_SIZE,
                PLANET_FRAME_SIZE,
            ));
        }

        self.font = match ctx.load_font(&paths.font) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("could not load font {}: {err:#}; text is disabled", paths.font);
                None
            }
        };

        self.asteroids =
            AsteroidSystem::load(&paths.asteroid_dir, ctx.renderer(), &self.config.asteroids);
        if self.asteroids.assets().is_empty() {
            log::warn!("no asteroid art in {}, the field stays empty", paths.asteroid_dir);
        }

        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let dt = ctx.delta_time().as_secs_f32();
        let screen = ctx.screen_size();
        self.camera.offset = screen * 0.5;

        let input = PlayerInput::read(ctx.input(), &self.camera);
        self.player.update(dt, &input, self.map);
        self.planet.update(dt);
        self.asteroids.update(dt, screen, self.player.position);
        self.camera.target = self.player.position;

        self.beam
            .update(dt, self.player.position, &mut self.asteroids, &self.config.beam);

        let wheel = ctx.input().wheel_delta();
        if wheel != 0.0 {
            self.camera.zoom = apply_zoom(self.camera.zoom, wheel, &self.config.camera);
        }

        Ok(())
    }

    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let screen = ctx.screen_size();
        let renderer = ctx.renderer();
        let mut frame = renderer.begin_frame(CLEAR_COLOR)?;
        let camera = self.camera;

        if let Some(background) = &self.background {
            background.draw(renderer, &mut frame, &camera, screen)?;
        }
        draw_map_bounds(renderer, &mut frame, &camera, self.map)?;
        if let Some(textures) = &self.beam_textures {
            self.beam.draw(
                renderer,
                &mut frame,
                &camera,
                textures,
                self.player.position,
                self.player.nose_offset(),
                &self.config.beam,
            )?;
        }
        self.planet.draw(renderer, &mut frame, &camera)?;
        self.asteroids.draw(renderer, &mut frame, &camera, self.font)?;
        self.player.draw(renderer, &mut frame, &camera)?;
        self.draw_hud(renderer, &mut frame)?;

        renderer.end_frame(frame)
    }
}
