//! Canvas 2D renderer
//!
//! Pure consumer of the world: reads state every frame, never mutates it.
//! All HUD text lives in the DOM; this module only draws the play field.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::settings::Settings;
use crate::sim::{EffectKind, GamePhase, HostileKind, World};

const BACKGROUND: &str = "#0b0e14";
const CHROME_LINE: &str = "#1f2633";
const PLAYER_FILL: &str = "#4cc9f0";
const HOSTILE_FILL: &str = "#e63946";
const BOSS_FILL: &str = "#b5179e";
const SHIELD_STROKE: &str = "#72efdd";
const SHOT_FILL: &str = "#ffd166";
const ENEMY_SHOT_FILL: &str = "#ff6d00";
const PICKUP_FILL: &str = "#80ed99";
const OVERLAY_FILL: &str = "rgba(5, 8, 12, 0.72)";
const OVERLAY_TEXT: &str = "#e8ecf1";

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: canvas.width() as f32,
            height: canvas.height() as f32,
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Draw one frame of the world
    pub fn render(&self, world: &World, settings: &Settings) {
        let ctx = &self.ctx;

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);

        // Separator under the HUD chrome band
        ctx.set_stroke_style_str(CHROME_LINE);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(0.0, world.bounds.top_inset as f64);
        ctx.line_to(self.width as f64, world.bounds.top_inset as f64);
        ctx.stroke();

        for pickup in &world.pickups {
            // Blink during the last two seconds of life
            if pickup.ttl_ms < 2_000.0 && (pickup.ttl_ms / 150.0) as u32 % 2 == 0 {
                continue;
            }
            self.fill_circle(pickup.pos.x, pickup.pos.y, pickup.radius, PICKUP_FILL);
        }

        for hostile in &world.hostiles {
            match hostile.kind {
                HostileKind::Normal => {
                    self.fill_circle(hostile.pos.x, hostile.pos.y, hostile.radius, HOSTILE_FILL);
                }
                HostileKind::Boss {
                    shield_layers,
                    shield_hp,
                    shield_layer_hp,
                    ..
                } => {
                    self.fill_circle(hostile.pos.x, hostile.pos.y, hostile.radius, BOSS_FILL);
                    // One ring per live shield layer; the outermost fades as
                    // its pool drains
                    for layer in 0..shield_layers {
                        let r = hostile.radius + 6.0 + 5.0 * layer as f32;
                        let alpha = if layer + 1 == shield_layers && shield_layer_hp > 0.0 {
                            0.25 + 0.75 * (shield_hp / shield_layer_hp).clamp(0.0, 1.0)
                        } else {
                            1.0
                        };
                        ctx.set_global_alpha(alpha as f64);
                        self.stroke_circle(hostile.pos.x, hostile.pos.y, r, SHIELD_STROKE);
                        ctx.set_global_alpha(1.0);
                    }
                }
            }
        }

        for shot in &world.shots {
            self.fill_circle(shot.pos.x, shot.pos.y, shot.radius, SHOT_FILL);
        }
        for shot in &world.enemy_shots {
            self.fill_circle(shot.pos.x, shot.pos.y, shot.radius, ENEMY_SHOT_FILL);
        }

        self.fill_circle(
            world.player.pos.x,
            world.player.pos.y,
            world.player.radius,
            PLAYER_FILL,
        );

        if !settings.reduced_flash {
            self.draw_effects(world);
        }

        if world.level.in_transition() {
            self.center_text(&format!("LEVEL {}", world.level.level + 1), 28.0);
        }

        match world.phase {
            GamePhase::Paused => self.overlay("PAUSED"),
            GamePhase::GameOver => self.overlay("GAME OVER"),
            GamePhase::Running => {}
        }
    }

    fn draw_effects(&self, world: &World) {
        let ctx = &self.ctx;
        for effect in &world.effects {
            let (color, max_ttl, radius) = match effect.kind {
                EffectKind::Kill => (HOSTILE_FILL, 400.0, 18.0),
                EffectKind::BossKill => (BOSS_FILL, 900.0, 50.0),
                EffectKind::Evade => (CHROME_LINE, 400.0, 14.0),
                EffectKind::Heal => (PICKUP_FILL, 400.0, 16.0),
                EffectKind::PlayerHit => (ENEMY_SHOT_FILL, 300.0, 20.0),
            };
            // Expanding, fading ring
            let t = 1.0 - (effect.ttl_ms / max_ttl).clamp(0.0, 1.0);
            ctx.set_global_alpha((1.0 - t) as f64);
            self.stroke_circle(effect.pos.x, effect.pos.y, radius * (0.4 + 0.6 * t), color);
            ctx.set_global_alpha(1.0);
        }
    }

    fn overlay(&self, title: &str) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(OVERLAY_FILL);
        ctx.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
        self.center_text(title, 40.0);
    }

    fn center_text(&self, text: &str, size: f32) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(OVERLAY_TEXT);
        ctx.set_font(&format!("{size}px monospace"));
        ctx.set_text_align("center");
        let _ = ctx.fill_text(text, (self.width / 2.0) as f64, (self.height / 2.0) as f64);
    }

    fn fill_circle(&self, x: f32, y: f32, radius: f32, color: &str) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU);
        ctx.fill();
    }

    fn stroke_circle(&self, x: f32, y: f32, radius: f32, color: &str) {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        let _ = ctx.arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU);
        ctx.stroke();
    }
}
