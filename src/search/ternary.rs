// ---------------------------------------------------------------------------
// Ternary search over a bounded scalar interval
// ---------------------------------------------------------------------------

/// Minimize `f` on `[left, right]` by repeated trisection.
///
/// `f` must be unimodal on the bracket. That cannot be checked at runtime: a
/// function with several minima still converges, just not necessarily to the
/// global one. The bracket shrinks to 2/3 of its width every iteration and the
/// midpoint of the final bracket is returned once it is narrower than
/// `tolerance`.
///
/// A reversed bracket is swapped. A tolerance that is not positive (or finer
/// than the floating-point spacing around the bracket) is raised to the
/// smallest width the bracket can still resolve, so the loop always ends.
pub fn minimize<F>(mut f: F, left: f64, right: f64, tolerance: f64) -> f64
where
    F: FnMut(f64) -> f64,
{
    let (mut lo, mut hi) = if left <= right { (left, right) } else { (right, left) };

    let resolvable = 64.0 * f64::EPSILON * lo.abs().max(hi.abs()).max(1.0);
    let tolerance = if tolerance.is_finite() { tolerance.max(resolvable) } else { resolvable };

    while hi - lo > tolerance {
        let third = (hi - lo) / 3.0;
        let m1 = lo + third;
        let m2 = hi - third;
        if f(m1) < f(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
    }

    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_parabola_vertex() {
        let x = minimize(|x| (x - 7.0).powi(2), 0.0, 20.0, 0.01);
        assert!((x - 7.0).abs() < 0.01, "expected ~7, got {}", x);
    }

    #[test]
    fn reversed_bracket_is_accepted() {
        let x = minimize(|x| (x + 3.0).powi(2), 10.0, -10.0, 1e-6);
        assert!((x + 3.0).abs() < 1e-6);
    }

    #[test]
    fn monotonic_function_converges_to_edge() {
        let x = minimize(|x| x, 2.0, 5.0, 1e-3);
        assert!((x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn zero_tolerance_still_terminates() {
        let x = minimize(|x| (x - 1.5).abs(), 0.0, 4.0, 0.0);
        assert!((x - 1.5).abs() < 1e-9);
    }

    #[test]
    fn bracket_shrinks_by_two_thirds() {
        // Width 27 down to below 1 takes ceil(log(27) / log(1.5)) = 9 rounds,
        // two evaluations each.
        let mut evaluations = 0;
        minimize(
            |x| {
                evaluations += 1;
                x * x
            },
            -13.5,
            13.5,
            1.0,
        );
        assert_eq!(evaluations, 18);
    }
}
