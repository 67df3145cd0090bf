//! Row scheduling for the per-block loops.
//!
//! Work is expressed as "fill output row `y` of all four bands". Every row
//! is a disjoint mutable chunk, so parallel workers never share a write
//! target and need no locks. Each call returns only after all rows are
//! written, which is the barrier between decomposition levels.

use hw_core::Error;
use rayon::ThreadPool;
use rayon::prelude::*;

/// How the per-block loop of a transform is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Sequential,
    /// Rows are distributed over `workers` threads. `0` uses rayon's global
    /// pool (one thread per logical CPU).
    Parallel { workers: usize },
}

#[derive(Debug)]
pub(crate) enum Executor {
    Sequential,
    Global,
    Pool(ThreadPool),
}

impl Executor {
    pub(crate) fn new(execution: Execution) -> Result<Self, Error> {
        match execution {
            Execution::Sequential => Ok(Self::Sequential),
            Execution::Parallel { workers: 0 } => Ok(Self::Global),
            Execution::Parallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("haar-worker-{i}"))
                    .build()
                    .map_err(|e| Error::WorkerPool(e.to_string()))?;
                ldebug!("built haar worker pool with {} threads", workers);
                Ok(Self::Pool(pool))
            }
        }
    }

    /// Calls `body(y, [a, h, v, d])` once per output row, where each slice is
    /// row `y` of the corresponding band.
    pub(crate) fn for_each_band_row<F>(&self, bands: [&mut [u8]; 4], row_len: usize, body: F)
    where
        F: Fn(usize, [&mut [u8]; 4]) + Sync,
    {
        if row_len == 0 {
            return;
        }

        match self {
            Self::Sequential => {
                let [a, h, v, d] = bands;
                a.chunks_mut(row_len)
                    .zip(h.chunks_mut(row_len))
                    .zip(v.chunks_mut(row_len))
                    .zip(d.chunks_mut(row_len))
                    .enumerate()
                    .for_each(|(y, (((a, h), v), d))| body(y, [a, h, v, d]));
            }
            Self::Global => par_band_rows(bands, row_len, &body),
            Self::Pool(pool) => pool.install(|| par_band_rows(bands, row_len, &body)),
        }
    }
}

fn par_band_rows<F>(bands: [&mut [u8]; 4], row_len: usize, body: &F)
where
    F: Fn(usize, [&mut [u8]; 4]) + Sync,
{
    let [a, h, v, d] = bands;
    a.par_chunks_mut(row_len)
        .zip(h.par_chunks_mut(row_len))
        .zip(v.par_chunks_mut(row_len))
        .zip(d.par_chunks_mut(row_len))
        .enumerate()
        .for_each(|(y, (((a, h), v), d))| body(y, [a, h, v, d]));
}

#[cfg(test)]
mod tests {
    use super::{Execution, Executor};

    fn stamp_rows(executor: &Executor) -> Vec<Vec<u8>> {
        let mut bands = vec![vec![0u8; 12]; 4];
        let [a, h, v, d] = bands.as_mut_slice() else {
            unreachable!("four bands");
        };
        let rows = [a.as_mut_slice(), h.as_mut_slice(), v.as_mut_slice(), d.as_mut_slice()];
        executor.for_each_band_row(rows, 3, |y, rows| {
            for (band_idx, row) in rows.into_iter().enumerate() {
                for (x, px) in row.iter_mut().enumerate() {
                    *px = (band_idx * 100 + y * 10 + x) as u8;
                }
            }
        });
        bands
    }

    #[test]
    fn every_row_visited_once_in_all_modes() {
        let sequential = stamp_rows(&Executor::new(Execution::Sequential).expect("sequential"));
        let pooled =
            stamp_rows(&Executor::new(Execution::Parallel { workers: 3 }).expect("pool of three"));
        let global =
            stamp_rows(&Executor::new(Execution::Parallel { workers: 0 }).expect("global pool"));

        assert_eq!(
            sequential[2],
            vec![200, 201, 202, 210, 211, 212, 220, 221, 222, 230, 231, 232]
        );
        assert_eq!(sequential, pooled);
        assert_eq!(sequential, global);
    }

    #[test]
    fn empty_rows_are_a_no_op() {
        let executor = Executor::new(Execution::Parallel { workers: 2 }).expect("pool");
        let mut empty = [[0u8; 0]; 4];
        let [a, h, v, d] = &mut empty;
        let rows = [a.as_mut_slice(), h.as_mut_slice(), v.as_mut_slice(), d.as_mut_slice()];
        executor.for_each_band_row(rows, 0, |_, _| {
            panic!("no rows to visit");
        });
    }
}
