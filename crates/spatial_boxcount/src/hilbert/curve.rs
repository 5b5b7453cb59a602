//! Hilbert curve conversions between 1D distances and 2D coordinates.
//!
//! `n` is the side length of the square and must be a power of two.

/// Rotate/flip a quadrant appropriately for the Hilbert curve transformation.
#[inline(always)]
fn rot(n: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            *x = n - 1 - *x;
            *y = n - 1 - *y;
        }
        std::mem::swap(x, y);
    }
}

/// Convert (x, y) coordinates to distance along the Hilbert curve.
#[inline]
pub fn xy2d(n: u64, mut x: u64, mut y: u64) -> u64 {
    debug_assert!(n.is_power_of_two(), "n must be a power of two");
    debug_assert!(x < n && y < n);
    let mut d = 0u64;
    let mut s = n / 2;

    while s > 0 {
        let rx = u64::from((x & s) > 0);
        let ry = u64::from((y & s) > 0);
        d += s * s * ((3 * rx) ^ ry);
        // Coordinates are reduced modulo s before rotating within the sub-square.
        x &= s - 1;
        y &= s - 1;
        rot(s, &mut x, &mut y, rx, ry);
        s /= 2;
    }

    d
}

/// Convert distance along the Hilbert curve to (x, y) coordinates.
#[inline]
pub fn d2xy(n: u64, d: u64) -> (u64, u64) {
    debug_assert!(n.is_power_of_two(), "n must be a power of two");
    debug_assert!(d < n.saturating_mul(n));
    let mut x = 0u64;
    let mut y = 0u64;
    let mut s = 1u64;
    let mut t = d;

    while s < n {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);

        rot(s, &mut x, &mut y, rx, ry);

        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }

    (x, y)
}

/// Smallest order `p` with `4^p >= len`.
pub fn order_for_len(len: usize) -> u32 {
    let mut p = 0u32;
    while (1u128 << (2 * p)) < len as u128 {
        p += 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_small_square() {
        let n = 4;
        for x in 0..n {
            for y in 0..n {
                let d = xy2d(n, x, y);
                assert_eq!(d2xy(n, d), (x, y), "roundtrip failed for ({x}, {y})");
            }
        }
    }

    #[test]
    fn full_roundtrip_larger() {
        let n = 64;
        for d in 0..(n * n) {
            let (x, y) = d2xy(n, d);
            assert_eq!(xy2d(n, x, y), d, "roundtrip d->xy->d failed for d={d}");
        }
    }

    #[test]
    fn consecutive_distances_are_adjacent() {
        let n = 32;
        let mut prev = d2xy(n, 0);
        for d in 1..(n * n) {
            let cur = d2xy(n, d);
            let dist = prev.0.abs_diff(cur.0) + prev.1.abs_diff(cur.1);
            assert_eq!(dist, 1, "jump between d={} and d={d}", d - 1);
            prev = cur;
        }
    }

    #[test]
    fn order_one_visits_quadrants_in_u_shape() {
        let path: Vec<_> = (0..4).map(|d| d2xy(2, d)).collect();
        assert_eq!(path, vec![(0, 0), (0, 1), (1, 1), (1, 0)]);
    }

    #[test]
    fn order_for_len_is_minimal() {
        assert_eq!(order_for_len(0), 0);
        assert_eq!(order_for_len(1), 0);
        assert_eq!(order_for_len(2), 1);
        assert_eq!(order_for_len(10), 2);
        assert_eq!(order_for_len(16), 2);
        assert_eq!(order_for_len(17), 3);
    }
}
