//! Not-a-knot cubic spline with constant extension outside the data.

use crate::error::{Result, ThinFilmError};

#[derive(Debug, Clone, Copy)]
struct Knot {
    x: f64,
    y: f64,
    /// Coefficients of d, d² and d³ with d = x - knot.x
    cf: [f64; 3],
}

impl Knot {
    #[inline]
    fn value(&self, x: f64) -> f64 {
        let d = x - self.x;
        ((self.cf[2] * d + self.cf[1]) * d + self.cf[0]) * d + self.y
    }
}

/// A fitted cubic spline.
///
/// The knot list ends with a sentinel at `x = +∞` carrying the last y value,
/// so any x at or beyond the last real knot evaluates to that value.
#[derive(Debug, Clone)]
pub struct Spline {
    knots: Vec<Knot>,
}

impl Spline {
    /// Fit a not-a-knot cubic spline through `(x, y)`.
    ///
    /// Unsorted input is sorted jointly by x. Fails with fewer than three
    /// points or if two points share an x value.
    ///
    /// # Arguments
    /// * `x` - Abscissas
    /// * `y` - Ordinates, same length as `x`
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Spline> {
        if x.len() != y.len() {
            return Err(ThinFilmError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        let npt = x.len();
        if npt < 3 {
            return Err(ThinFilmError::TooFewPoints { found: npt });
        }

        let mut knots: Vec<Knot> = x
            .iter()
            .zip(y)
            .map(|(&x, &y)| Knot { x, y, cf: [0.0; 3] })
            .collect();
        if knots.windows(2).any(|w| !(w[0].x < w[1].x)) {
            knots.sort_by(|a, b| a.x.total_cmp(&b.x));
            if knots.windows(2).any(|w| !(w[0].x < w[1].x)) {
                return Err(ThinFilmError::NonUniqueAbscissas);
            }
        }

        if npt == 3 {
            fit_parabola(&mut knots);
        } else {
            fit_not_a_knot(&mut knots);
        }

        let last = knots[npt - 1];
        knots.push(Knot {
            x: f64::INFINITY,
            y: last.y,
            cf: [0.0; 3],
        });
        Ok(Spline { knots })
    }

    /// Number of real (non-sentinel) knots.
    pub fn len(&self) -> usize {
        self.knots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Range of x covered by the data.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0].x, self.knots[self.len() - 1].x)
    }

    /// Evaluate the spline at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let first = &self.knots[0];
        if !(x > first.x) {
            return first.y;
        }
        let idx = self.knots.partition_point(|k| k.x <= x) - 1;
        if idx + 1 >= self.len() {
            return self.knots[idx].y;
        }
        self.knots[idx].value(x)
    }

    /// Evaluate at many points. Sorted input reuses the interval search.
    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        let mut cursor = self.cursor();
        xs.iter().map(|&x| cursor.eval(x)).collect()
    }

    /// A cursor for sweeps with non-decreasing x.
    pub fn cursor(&self) -> SplineCursor<'_> {
        SplineCursor {
            spline: self,
            idx: 0,
        }
    }
}

/// Remembers the last interval so a monotone sweep walks forward instead
/// of searching again. Moving backwards restarts from the first knot.
pub struct SplineCursor<'a> {
    spline: &'a Spline,
    idx: usize,
}

impl SplineCursor<'_> {
    pub fn eval(&mut self, x: f64) -> f64 {
        let knots = &self.spline.knots;
        if !(x > knots[0].x) {
            self.idx = 0;
            return knots[0].y;
        }
        if x < knots[self.idx].x {
            self.idx = 0;
        }
        while self.idx + 1 < knots.len() && knots[self.idx + 1].x <= x {
            self.idx += 1;
        }
        if self.idx + 1 >= self.spline.len() {
            return knots[self.idx].y;
        }
        knots[self.idx].value(x)
    }
}

/// Three points: the not-a-knot conditions collapse to the interpolating
/// parabola through all of them.
fn fit_parabola(knots: &mut [Knot]) {
    let (x0, x1, x2) = (knots[0].x, knots[1].x, knots[2].x);
    let s1 = (knots[1].y - knots[0].y) / (x1 - x0);
    let s2 = (knots[2].y - knots[1].y) / (x2 - x1);
    let a = (s2 - s1) / (x2 - x0);
    knots[0].cf = [s1 - a * (x1 - x0), a, 0.0];
    knots[1].cf = [s1 + a * (x1 - x0), a, 0.0];
    knots[2].cf = [0.0; 3];
}

/// Solve the tridiagonal system for the knot slopes under not-a-knot end
/// conditions, then convert slopes to per-interval cubic coefficients.
///
/// During the solve `cf[1]` holds the interval width h and `cf[2]` the
/// secant slope ending at each knot; `cf[0]` accumulates the slopes.
fn fit_not_a_knot(spl: &mut [Knot]) {
    let npt = spl.len();

    for i in 1..npt {
        let h = spl[i].x - spl[i - 1].x;
        spl[i].cf = [0.0, h, (spl[i].y - spl[i - 1].y) / h];
    }

    spl[0].cf[2] = spl[2].cf[1];
    spl[0].cf[1] = spl[1].cf[1] + spl[2].cf[1];
    spl[0].cf[0] = ((spl[1].cf[1] + 2.0 * spl[0].cf[1]) * spl[1].cf[2] * spl[2].cf[1]
        + spl[1].cf[1] * spl[1].cf[1] * spl[2].cf[2])
        / spl[0].cf[1];

    let tm1 = spl[npt - 1].cf[1];
    let tm2 = spl[npt - 1].cf[2];

    // Forward elimination
    for i in 1..npt - 2 {
        let t1 = -spl[i + 1].cf[1] / spl[i - 1].cf[2];
        spl[i].cf[0] = t1 * spl[i - 1].cf[0]
            + 3.0 * (spl[i].cf[1] * spl[i + 1].cf[2] + spl[i + 1].cf[1] * spl[i].cf[2]);
        spl[i].cf[2] = t1 * spl[i - 1].cf[1] + 2.0 * (spl[i].cf[1] + spl[i + 1].cf[1]);
    }

    let m = npt - 2;
    let t1 = -tm1 / spl[m - 1].cf[2];
    spl[m].cf[0] = t1 * spl[m - 1].cf[0] + 3.0 * (spl[m].cf[1] * tm2 + tm1 * spl[m].cf[2]);
    spl[m].cf[2] = t1 * spl[m - 1].cf[1] + 2.0 * (spl[m].cf[1] + tm1);

    // Not-a-knot row at the far end gives the slope at the last knot
    let t1 = spl[m].cf[1] + tm1;
    let mut tm0 = ((tm1 + 2.0 * t1) * tm2 * spl[m].cf[1]
        + tm1 * tm1 * (spl[m].y - spl[m - 1].y) / spl[m].cf[1])
        / t1;
    let t1 = -t1 / spl[m].cf[2];
    let pivot = t1 * spl[m].cf[1] + spl[m].cf[1];
    tm0 = (t1 * spl[m].cf[0] + tm0) / pivot;
    spl[m].cf[0] = (spl[m].cf[0] - spl[m].cf[1] * tm0) / spl[m].cf[2];

    // Back substitution
    for i in (0..m).rev() {
        spl[i].cf[0] = (spl[i].cf[0] - spl[i].cf[1] * spl[i + 1].cf[0]) / spl[i].cf[2];
    }

    // Slopes to coefficients; cf[1] of interval i still holds its width
    for i in 1..npt - 1 {
        let h = spl[i].cf[1];
        let secant = (spl[i].y - spl[i - 1].y) / h;
        let curv = spl[i - 1].cf[0] + spl[i].cf[0] - 2.0 * secant;
        spl[i - 1].cf[1] = (secant - spl[i - 1].cf[0] - curv) / h;
        spl[i - 1].cf[2] = curv / h / h;
    }

    let secant = (spl[m + 1].y - spl[m].y) / tm1;
    let curv = spl[m].cf[0] + tm0 - 2.0 * secant;
    spl[m].cf[1] = (secant - spl[m].cf[0] - curv) / tm1;
    spl[m].cf[2] = curv / tm1 / tm1;

    spl[npt - 1].cf = [0.0; 3];
}
