//! Flow-line generator.
//!
//! Draws seed points from a shuffled permutation of finest-level grid cells,
//! grows each line forward and backward from its seed with fixed-step RK4,
//! and claims occupancy cells as it goes so later lines keep their distance.
//!
//! The generator owns its grid and seed cursor. Successive calls to
//! [`FlowLineGenerator::generate_line`] share that state: every accepted
//! point narrows the room left for the next line.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::config::FlowConfig;
use crate::density::Density;
use crate::error::HatchError;
use crate::field_source::VectorField;
use crate::grid::OccupancyGrid;
use crate::prng::{shuffle, Xorshift64};
use crate::vector::Vector;

/// An ordered polyline and its accumulated length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLine {
    points: Vec<Vector>,
    length: f64,
}

impl FlowLine {
    fn single(seed: Vector) -> Self {
        Self {
            points: vec![seed],
            length: 0.0,
        }
    }

    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vector> {
        self.points
    }

    /// Length accumulated while the line grew.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// No seed was left to draw.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// At most one point: nothing worth drawing.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() <= 1
    }

    /// Sum of distances between consecutive points, recomputed.
    pub fn polyline_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// One classic RK4 step of size `h` from `p`.
///
/// Returns the displacement `h/6·k1 + h/3·k2 + h/3·k3 + h/6·k4`, or `None` if
/// the field is absent at any of the four evaluation points.
pub fn rk4_step<F>(field: &F, p: &Vector, h: f64) -> Option<Vector>
where
    F: VectorField + ?Sized,
{
    let k1 = field.sample(p)?;
    rk4_from_slope(field, p, &k1, h)
}

fn rk4_from_slope<F>(field: &F, p: &Vector, k1: &Vector, h: f64) -> Option<Vector>
where
    F: VectorField + ?Sized,
{
    let k2 = field.sample(&p.add(&k1.multiply(h * 0.5)))?;
    let k3 = field.sample(&p.add(&k2.multiply(h * 0.5)))?;
    let k4 = field.sample(&p.add(&k3.multiply(h)))?;
    Some(
        k1.multiply(h / 6.0)
            .add(&k2.multiply(h / 3.0))
            .add(&k3.multiply(h / 3.0))
            .add(&k4.multiply(h / 6.0)),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Live end of a growing line.
struct Cursor {
    point: Vector,
    /// Cell indices of `point` at every level; `None` at the seed, which is
    /// never marked.
    cells: Option<Vec<usize>>,
}

impl Cursor {
    fn at(seed: &Vector) -> Self {
        Self {
            point: seed.clone(),
            cells: None,
        }
    }
}

/// Space-filling flow-line generator. See the module docs.
///
/// `Send` but not `Sync`: a generator can be moved to another thread, and
/// every call needs `&mut self`, so it is never shared between threads.
pub struct FlowLineGenerator {
    config: FlowConfig,
    field: Box<dyn VectorField>,
    density: Density,
    grid: OccupancyGrid,
    rng: Xorshift64,
    order: Vec<u32>,
    next_ix: usize,
}

impl FlowLineGenerator {
    /// Builds a generator, seeding its PRNG from `config.seed`.
    ///
    /// Fails fast on any invalid configuration value.
    pub fn new(
        config: FlowConfig,
        field: Box<dyn VectorField>,
        density: Density,
    ) -> Result<Self, HatchError> {
        let rng = Xorshift64::new(config.seed);
        Self::with_rng(config, field, density, rng)
    }

    /// Builds a generator drawing randomness from `rng`.
    pub fn with_rng(
        config: FlowConfig,
        field: Box<dyn VectorField>,
        density: Density,
        mut rng: Xorshift64,
    ) -> Result<Self, HatchError> {
        config.validate()?;
        let grid = OccupancyGrid::new(
            config.width,
            config.height,
            config.min_cell_size,
            config.max_cell_size,
            config.level_count,
            config.cell_scale,
        )?;
        let seeds = grid.finest_cell_count();
        let seed_cap = u32::try_from(seeds).map_err(|_| HatchError::InvalidDimensions)?;
        let mut order: Vec<u32> = (0..seed_cap).collect();
        shuffle(&mut order, &mut rng);

        debug!(
            "flow generator: {}x{} domain, {} level(s), {} seed cells, density {:?}",
            config.width,
            config.height,
            grid.level_count(),
            seeds,
            density
        );
        for (i, level) in grid.levels().iter().enumerate() {
            debug!(
                "  level {i}: size {:.3}, {}x{} cells of {:.3}x{:.3}",
                level.cell_size, level.nx, level.ny, level.cell_w, level.cell_h
            );
        }

        Ok(Self {
            config,
            field,
            density,
            grid,
            rng,
            order,
            next_ix: 0,
        })
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Seed cells not yet drawn.
    pub fn remaining_seeds(&self) -> usize {
        self.order.len() - self.next_ix
    }

    /// Every seed cell has been drawn; no further lines can start.
    pub fn is_exhausted(&self) -> bool {
        self.next_ix == self.order.len()
    }

    /// Draws the next seed whose finest-level cell is free.
    ///
    /// Each permutation entry is consumed at most once per generator, so
    /// this returns `None` forever after the permutation runs out.
    pub fn next_seed(&mut self) -> Option<Vector> {
        let finest = *self.grid.level(0);
        while let Some(&ix) = self.order.get(self.next_ix) {
            self.next_ix += 1;
            let ix = ix as usize;
            let (col, row) = (ix % finest.nx, ix / finest.nx);
            let x = ((col as f64 + self.rng.next_f64()) * finest.cell_w).floor();
            let y = ((row as f64 + self.rng.next_f64()) * finest.cell_h).floor();
            if !self.grid.is_occupied(x, y, 0) {
                return Some(Vector::new(x, y));
            }
        }
        None
    }

    /// Draws a seed and grows a line from it.
    ///
    /// Returns an empty line once seeds are exhausted, and a single-point
    /// line when the seed falls where the field is absent or its cell is
    /// already taken.
    pub fn generate_line(&mut self) -> FlowLine {
        match self.next_seed() {
            Some(seed) => self.trace_from(seed),
            None => {
                debug!("seed permutation exhausted");
                FlowLine::default()
            }
        }
    }

    /// Grows a line from an explicit seed, sharing occupancy with every other
    /// line from this generator.
    pub fn trace_from(&mut self, seed: Vector) -> FlowLine {
        if self.field.sample(&seed).is_none() {
            return FlowLine::single(seed);
        }
        let seed_level = self.density.level(&seed, self.grid.level_count());
        if self.grid.is_occupied(seed.x(), seed.y(), seed_level) {
            return FlowLine::single(seed);
        }

        let mut points = VecDeque::from([seed.clone()]);
        let mut length = 0.0;
        let mut cursors = [
            (Direction::Forward, Some(Cursor::at(&seed))),
            (Direction::Backward, Some(Cursor::at(&seed))),
        ];
        let mut iterations = 0usize;

        'grow: while cursors.iter().any(|(_, c)| c.is_some()) {
            if self.config.max_steps > 0 && iterations >= self.config.max_steps {
                debug!("line from {seed:?} hit the {} step cap", self.config.max_steps);
                break;
            }
            iterations += 1;

            for (direction, slot) in cursors.iter_mut() {
                let Some(cursor) = slot.as_ref() else {
                    continue;
                };
                let Some(next) = self.step(cursor, *direction) else {
                    *slot = None;
                    continue;
                };
                let step_length = cursor.point.distance(&next.point);
                if self.config.is_length_bounded() && length + step_length > self.config.max_length
                {
                    break 'grow;
                }
                self.grid.mark_occupied(next.point.x(), next.point.y());
                length += step_length;
                match direction {
                    Direction::Forward => points.push_back(next.point.clone()),
                    Direction::Backward => points.push_front(next.point.clone()),
                }
                *slot = Some(next);
            }
        }

        let line = FlowLine {
            points: points.into(),
            length,
        };
        trace!(
            "line from {seed:?}: {} points, length {:.3}",
            line.len(),
            line.length
        );
        line
    }

    /// Attempts one integration step from `cursor`. `None` kills the cursor.
    fn step(&self, cursor: &Cursor, direction: Direction) -> Option<Cursor> {
        let slope = self.field.sample(&cursor.point)?;
        if slope.length() == 0.0 {
            return None;
        }
        let delta = rk4_from_slope(
            self.field.as_ref(),
            &cursor.point,
            &slope,
            self.config.step_size,
        )?;
        let point = match direction {
            Direction::Forward => cursor.point.add(&delta),
            Direction::Backward => cursor.point.subtract(&delta),
        };
        let (x, y) = (point.x(), point.y());
        if !(x >= 0.0 && x < self.config.width && y >= 0.0 && y < self.config.height) {
            return None;
        }

        let level = self.density.level(&point, self.grid.level_count());
        let cells = self.grid.level_indices(x, y);
        if let Some(prev) = &cursor.cells {
            // Staying inside the cell this end already holds is always fine.
            if prev[level] != cells[level] && self.grid.is_occupied(x, y, level) {
                return None;
            }
        }
        Some(Cursor {
            point,
            cells: Some(cells),
        })
    }
}

impl Iterator for FlowLineGenerator {
    type Item = FlowLine;

    /// Yields lines, degenerate ones included, until seeds run out.
    fn next(&mut self) -> Option<FlowLine> {
        let line = self.generate_line();
        (!line.is_empty()).then_some(line)
    }
}
