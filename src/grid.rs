use crate::state::Position;

/// Round `value` to the nearest multiple of `grid`.
///
/// Halves round away from zero (`10.0` on a 20 grid becomes `20.0`). A
/// non-positive grid leaves the value untouched.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

pub fn snap_position_to_grid(position: Position, grid: f32) -> Position {
    Position::new(snap_to_grid(position.x, grid), snap_to_grid(position.y, grid))
}

/// SVG path commands for the canvas background grid.
///
/// `spacing` is in canvas units; the lines are emitted in screen pixels after
/// applying `zoom` and the pan offset. Nothing is drawn once the lines would
/// be closer than 4px apart.
pub fn background_grid_commands(
    width: f32,
    height: f32,
    zoom: f32,
    pan: Position,
    spacing: f32,
) -> String {
    let step = spacing * zoom;
    if step < 4.0 {
        return String::new();
    }

    let mut commands = Vec::new();

    let mut x = pan.x.rem_euclid(step);
    while x < width + step {
        commands.push(format!("M {x} 0 L {x} {height}"));
        x += step;
    }

    let mut y = pan.y.rem_euclid(step);
    while y < height + step {
        commands.push(format!("M 0 {y} L {width} {y}"));
        y += step;
    }

    commands.join(" ")
}
