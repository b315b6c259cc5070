//! Time grid construction and validation.

use crate::{Float, error::Error};

/// Fixed-step grid `start, start + step, ...` strictly below `stop`.
///
/// Contains `ceil((stop - start) / step)` points, so `arange(0.0, 40.0, 0.1)`
/// has 400 entries ending at 39.9. Returns an empty grid when
/// `stop <= start`.
pub fn arange(start: Float, stop: Float, step: Float) -> Result<Vec<Float>, Error> {
    if !(step.is_finite() && step > 0.0) {
        return Err(Error::InvalidStepSize(step));
    }
    if !start.is_finite() {
        return Err(Error::NonFiniteTimeGrid { index: 0, value: start });
    }
    if !stop.is_finite() {
        return Err(Error::NonFiniteTimeGrid { index: 1, value: stop });
    }
    if stop <= start {
        return Ok(Vec::new());
    }
    let n = ((stop - start) / step).ceil() as usize;
    Ok((0..n).map(|i| start + i as Float * step).collect())
}

/// `num` evenly spaced points from `start` to `stop`, both included.
pub fn linspace(start: Float, stop: Float, num: usize) -> Vec<Float> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as Float;
            let mut grid: Vec<Float> = (0..num).map(|i| start + i as Float * step).collect();
            grid[num - 1] = stop;
            grid
        }
    }
}

/// Checks that `time` is non-empty, finite and strictly increasing.
pub fn validate(time: &[Float]) -> Result<(), Error> {
    let Some(&first) = time.first() else {
        return Err(Error::EmptyTimeGrid);
    };
    if !first.is_finite() {
        return Err(Error::NonFiniteTimeGrid { index: 0, value: first });
    }
    for (i, w) in time.windows(2).enumerate() {
        let (prev, next) = (w[0], w[1]);
        if !next.is_finite() {
            return Err(Error::NonFiniteTimeGrid { index: i + 1, value: next });
        }
        if next <= prev {
            return Err(Error::NonMonotonicTimeGrid { index: i + 1, prev, next });
        }
    }
    Ok(())
}
