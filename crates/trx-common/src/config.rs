// config.rs — typed view of the rendering options

use crate::cvar::{CvarContext, CVAR_ARCHIVE};

pub const DEFAULT_DRAW_DISTANCE: i32 = 20;
pub const MIN_DRAW_DISTANCE: i32 = 10;
pub const MAX_DRAW_DISTANCE: i32 = 50;

pub const DEFAULT_FOV: i32 = 80;
pub const MIN_FOV: i32 = 10;
pub const MAX_FOV: i32 = 140;

const MIN_UI_SCALE: f32 = 0.5;
const MAX_UI_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// 32-vertex shadow ring instead of the 8-vertex octagon.
    pub enable_round_shadow: bool,
    /// Far clip distance in sectors (`WALL_L` units).
    pub draw_distance: i32,
    /// Horizontal field of view in degrees.
    pub fov: i32,
    pub ui_text_scale: f32,
    pub ui_bar_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_round_shadow: false,
            draw_distance: DEFAULT_DRAW_DISTANCE,
            fov: DEFAULT_FOV,
            ui_text_scale: 1.0,
            ui_bar_scale: 1.0,
        }
    }
}

impl Config {
    /// Create the backing cvars with their defaults.
    pub fn register(cvars: &mut CvarContext) {
        cvars.get("r_round_shadow", Some("0"), CVAR_ARCHIVE);
        cvars.get("r_draw_distance", Some("20"), CVAR_ARCHIVE);
        cvars.get("r_fov", Some("80"), CVAR_ARCHIVE);
        cvars.get("ui_text_scale", Some("1"), CVAR_ARCHIVE);
        cvars.get("ui_bar_scale", Some("1"), CVAR_ARCHIVE);
    }

    pub fn from_cvars(cvars: &CvarContext) -> Self {
        let defaults = Self::default();
        let int_or = |name: &str, default: i32| match cvars.find_var(name) {
            Some(var) => var.value as i32,
            None => default,
        };
        let scale_or = |name: &str, default: f32| match cvars.find_var(name) {
            Some(var) => var.value.clamp(MIN_UI_SCALE, MAX_UI_SCALE),
            None => default,
        };

        Self {
            enable_round_shadow: int_or("r_round_shadow", 0) != 0,
            draw_distance: int_or("r_draw_distance", defaults.draw_distance)
                .clamp(MIN_DRAW_DISTANCE, MAX_DRAW_DISTANCE),
            fov: int_or("r_fov", defaults.fov).clamp(MIN_FOV, MAX_FOV),
            ui_text_scale: scale_or("ui_text_scale", defaults.ui_text_scale),
            ui_bar_scale: scale_or("ui_bar_scale", defaults.ui_bar_scale),
        }
    }
}
