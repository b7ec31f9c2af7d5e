use crate::Cell;
use crate::state::GameState;

use anyhow::Result;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba(pub f32, pub f32, pub f32, pub f32);

pub const SNAKE_COLOR: Rgba = Rgba(0.0, 1.0, 0.0, 1.0);
pub const FRUIT_COLOR: Rgba = Rgba(1.0, 0.0, 0.0, 1.0);
pub const BACKGROUND_COLOR: Rgba = Rgba(0.05, 0.05, 0.1, 1.0);

pub const SNAKE_SCALE: f32 = 1.0;
pub const FRUIT_SCALE: f32 = 0.8;

/// Anything that can put a colored square on a grid cell.
pub trait Canvas {
    fn begin_frame(&mut self);
    fn draw_square(&mut self, cell: Cell, scale: f32, color: Rgba);
    fn set_status(&mut self, text: &str);
    fn present(&mut self) -> Result<()>;
}

impl Rgba {
    /// 8-bit channels blended over the background by alpha.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let Rgba(r, g, b, a) = self;
        let Rgba(br, bg, bb, _) = BACKGROUND_COLOR;
        let mix = |c: f32, back: f32| {
            let v = c * a + back * (1.0 - a);
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        (mix(r, br), mix(g, bg), mix(b, bb))
    }
}

pub fn draw_state<C: Canvas + ?Sized>(canvas: &mut C, state: &GameState) -> Result<()> {
    canvas.begin_frame();

    for seg in state.snake().body() {
        canvas.draw_square(*seg, SNAKE_SCALE, SNAKE_COLOR);
    }

    let len = state.snake().len();
    if state.is_game_over() {
        canvas.set_status(&format!("Game over! Length: {}  (R to restart, Esc to quit)", len));
    } else {
        canvas.draw_square(state.fruit(), FRUIT_SCALE, FRUIT_COLOR);
        canvas.set_status(&format!("Length: {}", len));
    }

    canvas.present()
}
