//! Random self-avoiding walks on a square grid.
//!
//! A walk starts on a uniformly random cell and repeatedly steps to a uniformly
//! random unvisited neighbour. A walk that dead-ends before reaching the target
//! length is thrown away and a new one starts from a fresh random cell. The
//! number of attempts is bounded; exhausting it is an error.

use pathmem_types::{Grid, GridCell, Path, PathError};
use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom};
use thiserror::Error;

pub const DEFAULT_ATTEMPT_BUDGET: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathGenerationError {
    #[error("path length must be at least one cell")]
    EmptyPath,
    #[error("grid has no cells")]
    EmptyGrid,
    #[error("a {path_length}-cell path cannot fit in {cells} cells")]
    PathTooLong { path_length: usize, cells: usize },
    #[error("no {path_length}-cell path found in {attempts} attempts")]
    Exhausted { path_length: usize, attempts: u32 },
    #[error(transparent)]
    Invalid(#[from] PathError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathGenerator {
    attempt_budget: u32,
}

impl Default for PathGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPT_BUDGET)
    }
}

impl PathGenerator {
    /// A budget of zero is treated as one attempt.
    #[must_use]
    pub fn new(attempt_budget: u32) -> Self {
        Self {
            attempt_budget: attempt_budget.max(1),
        }
    }

    #[must_use]
    pub fn attempt_budget(&self) -> u32 {
        self.attempt_budget
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        path_length: usize,
        grid: Grid,
        rng: &mut R,
    ) -> Result<Path, PathGenerationError> {
        if path_length == 0 {
            return Err(PathGenerationError::EmptyPath);
        }
        let cells = grid.cell_count();
        if cells == 0 {
            return Err(PathGenerationError::EmptyGrid);
        }
        if path_length > cells {
            return Err(PathGenerationError::PathTooLong { path_length, cells });
        }

        for attempt in 1..=self.attempt_budget {
            if let Some(walk) = random_walk(path_length, grid, rng) {
                if attempt > 1 {
                    tracing::debug!(attempt, path_length, grid = grid.size(), "Path found after retries");
                }
                return Ok(Path::new(walk, grid)?);
            }
        }

        tracing::warn!(
            attempts = self.attempt_budget,
            path_length,
            grid = grid.size(),
            "Path generation exhausted its attempt budget"
        );
        Err(PathGenerationError::Exhausted {
            path_length,
            attempts: self.attempt_budget,
        })
    }
}

/// One walk attempt. `None` means it dead-ended.
fn random_walk<R: Rng + ?Sized>(
    path_length: usize,
    grid: Grid,
    rng: &mut R,
) -> Option<Vec<GridCell>> {
    let mut visited = vec![false; grid.cell_count()];
    let mut walk = Vec::with_capacity(path_length);

    let mut current = grid.cells().choose(rng)?;
    visited[current.index()] = true;
    walk.push(current);

    while walk.len() < path_length {
        let open: Vec<GridCell> = grid
            .neighbors(current)
            .into_iter()
            .filter(|cell| !visited[cell.index()])
            .collect();
        current = *open.choose(rng)?;
        visited[current.index()] = true;
        walk.push(current);
    }

    Some(walk)
}
