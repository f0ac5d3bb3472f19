//! Built-in sandbox commands

use std::cell::RefCell;
use std::rc::Rc;

use funhouse_shared::{Grid, Material};

use super::state::MAX_BRUSH_SIZE;
use crate::command::{Command, SessionRequest};

/// Paint a filled circle of diameter `brush_size` centred on `(x, y)`.
///
/// Cells outside the grid, or whose coordinates overflow `i32`, are skipped.
pub fn stamp(grid: &mut dyn Grid, x: i32, y: i32, brush_size: i32, material: Material) {
    let half = brush_size.clamp(0, MAX_BRUSH_SIZE) / 2;
    for dy in -half..=half {
        let Some(cy) = y.checked_add(dy) else {
            continue;
        };
        for dx in -half..=half {
            let Some(cx) = x.checked_add(dx) else {
                continue;
            };
            if dx * dx + dy * dy <= half * half && grid.in_bounds(cx, cy) {
                grid.set_pixel(cx, cy, material);
            }
        }
    }
}

/// Select the material used by subsequent draws.
///
/// Clones share one history of replaced materials, so undo reverts the most
/// recent execution of this command (or any clone of it) not yet undone.
pub fn select_material(material: Material) -> Command {
    let history = Rc::new(RefCell::new(Vec::new()));
    let saved = history.clone();
    Command::new("SelectMaterial", move |ctx| {
        saved.borrow_mut().push(ctx.state().selected_material);
        ctx.state_mut().selected_material = material;
        tracing::info!(%material, "Material selected");
    })
    .with_undo(move |ctx| {
        if let Some(material) = history.borrow_mut().pop() {
            ctx.state_mut().selected_material = material;
        }
    })
}

pub fn clear_world() -> Command {
    Command::new("ClearWorld", |ctx| {
        if let Some(grid) = ctx.grid() {
            grid.clear();
        }
    })
}

/// One brush stamp at grid cell `(x, y)`. Erasing paints air.
pub fn draw(x: i32, y: i32, brush_size: i32, material: Material, erasing: bool) -> Command {
    let (name, material) = if erasing {
        ("MouseErase", Material::Air)
    } else {
        ("MouseDraw", material)
    };
    Command::new(name, move |ctx| {
        if let Some(grid) = ctx.grid() {
            stamp(grid, x, y, brush_size, material);
        }
    })
}

pub fn toggle_recording() -> Command {
    Command::new("ToggleRecording", |ctx| {
        ctx.request(SessionRequest::ToggleRecording)
    })
    .non_replayable()
}

pub fn toggle_playback() -> Command {
    Command::new("TogglePlayback", |ctx| {
        ctx.request(SessionRequest::TogglePlayback)
    })
    .non_replayable()
}

/// Every cell between two grid points, inclusive, along Bresenham's line
pub fn line_cells(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = (to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut cells = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        cells.push((x, y));
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use funhouse_shared::VecGrid;

    use super::*;
    use crate::command::CommandContext;
    use crate::sandbox::SandboxState;

    #[test]
    fn test_stamp_circle() {
        let mut grid = VecGrid::new(20, 20);
        stamp(&mut grid, 10, 10, 5, Material::Stone);
        // radius 2: 13 cells
        assert_eq!(grid.count(Material::Stone), 13);
        assert_eq!(grid.get_pixel(10, 8), Material::Stone);
        assert_eq!(grid.get_pixel(12, 12), Material::Air);
    }

    #[test]
    fn test_stamp_clips_at_edges() {
        let mut grid = VecGrid::new(4, 4);
        stamp(&mut grid, 0, 0, 3, Material::Sand);
        assert_eq!(grid.count(Material::Sand), 3);
    }

    #[test]
    fn test_brush_size_one_is_single_cell() {
        let mut grid = VecGrid::new(4, 4);
        stamp(&mut grid, 2, 2, 1, Material::Water);
        assert_eq!(grid.count(Material::Water), 1);
    }

    #[test]
    fn test_stamp_at_coordinate_extremes() {
        let mut grid = VecGrid::new(4, 4);
        for (x, y) in [
            (i32::MAX, 0),
            (0, i32::MAX),
            (i32::MIN, 0),
            (0, i32::MIN),
            (i32::MAX, i32::MIN),
        ] {
            stamp(&mut grid, x, y, 5, Material::Sand);
        }
        assert_eq!(grid.count(Material::Sand), 0);
    }

    #[test]
    fn test_stamp_oversized_brush_is_clamped() {
        let mut grid = VecGrid::new(4, 4);
        stamp(&mut grid, 1, 1, i32::MAX, Material::Stone);
        assert_eq!(grid.count(Material::Stone), 16);
    }

    #[test]
    fn test_select_material_undo_with_replayed_clone() {
        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(None, &mut state);
        let original = select_material(Material::Water);
        let replayed = original.clone();

        original.execute(&mut ctx);
        ctx.state_mut().selected_material = Material::Stone;
        replayed.execute(&mut ctx);
        assert_eq!(ctx.state().selected_material, Material::Water);

        replayed.undo(&mut ctx);
        assert_eq!(ctx.state().selected_material, Material::Stone);
        original.undo(&mut ctx);
        assert_eq!(ctx.state().selected_material, Material::Sand);

        // nothing left to revert
        original.undo(&mut ctx);
        assert_eq!(ctx.state().selected_material, Material::Sand);
    }

    #[test]
    fn test_select_material_undo() {
        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(None, &mut state);
        let cmd = select_material(Material::Water);

        cmd.execute(&mut ctx);
        assert_eq!(ctx.state().selected_material, Material::Water);
        cmd.undo(&mut ctx);
        assert_eq!(ctx.state().selected_material, Material::Sand);
    }

    #[test]
    fn test_erase_paints_air() {
        let mut grid = VecGrid::new(8, 8);
        stamp(&mut grid, 4, 4, 3, Material::Sand);

        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(Some(&mut grid as &mut dyn Grid), &mut state);
        let cmd = draw(4, 4, 3, Material::Sand, true);
        assert_eq!(cmd.name(), "MouseErase");
        cmd.execute(&mut ctx);
        drop(ctx);
        assert_eq!(grid.count(Material::Sand), 0);
    }

    #[test]
    fn test_toggles_are_not_replayable() {
        assert!(!toggle_recording().is_replayable());
        assert!(!toggle_playback().is_replayable());
        assert!(clear_world().is_replayable());
    }

    #[test]
    fn test_line_cells() {
        assert_eq!(line_cells((0, 0), (0, 0)), [(0, 0)]);
        assert_eq!(line_cells((0, 0), (3, 0)), [(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(line_cells((2, 2), (0, 0)), [(2, 2), (1, 1), (0, 0)]);

        let cells = line_cells((0, 0), (5, 2));
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(5, 2)));
        assert_eq!(cells.len(), 6);
    }
}
