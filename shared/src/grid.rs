//! Grid interface consumed by commands

use crate::Material;

/// The simulation grid as seen by the command pipeline.
///
/// Commands only ever write cells, read cells, clear, and query the
/// dimensions. Out-of-bounds coordinates must be ignored by `set_pixel` and
/// read as [`Material::Air`] by `get_pixel`.
pub trait Grid {
    fn set_pixel(&mut self, x: i32, y: i32, material: Material);
    fn get_pixel(&self, x: i32, y: i32) -> Material;
    fn clear(&mut self);
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width() && y >= 0 && y < self.height()
    }
}

/// Row-major in-memory grid with no simulation rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecGrid {
    width: i32,
    height: i32,
    cells: Vec<Material>,
}

impl VecGrid {
    /// Create an all-air grid. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Material::Air; (width as usize) * (height as usize)],
        }
    }

    /// Number of cells holding `material`
    pub fn count(&self, material: Material) -> usize {
        self.cells.iter().filter(|&&m| m == material).count()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| (y as usize) * (self.width as usize) + x as usize)
    }
}

impl Grid for VecGrid {
    fn set_pixel(&mut self, x: i32, y: i32, material: Material) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = material;
        }
    }

    fn get_pixel(&self, x: i32, y: i32) -> Material {
        self.index(x, y)
            .map(|i| self.cells[i])
            .unwrap_or(Material::Air)
    }

    fn clear(&mut self) {
        self.cells.fill(Material::Air);
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }
}
