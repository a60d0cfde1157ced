//! Vector math helpers.

use nalgebra::Point3;

/// Euclidean distance between two points.
///
/// Computed axis by axis as `sqrt(dx² + dy² + dz²)`. Non-finite inputs
/// propagate into the result.
///
/// # Example
///
/// ```
/// use vertsnap::math::magnitude;
/// use nalgebra::Point3;
///
/// let d = magnitude(&Point3::new(0.0, 0.0, 0.0), &Point3::new(3.0, 4.0, 0.0));
/// assert!((d - 5.0).abs() < 1e-12);
/// ```
#[inline]
pub fn magnitude(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;

    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Closest point on triangle `abc` to `p`.
///
/// Voronoi-region walk from Ericson, "Real-Time Collision Detection" (5.1.5).
#[allow(clippy::many_single_char_names)]
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    // Inside the face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_zero_for_same_point() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, -2.0, 3.25),
            Point3::new(-1e6, 1e-6, 42.0),
        ];
        for p in &points {
            assert_eq!(magnitude(p, p), 0.0);
        }
    }

    #[test]
    fn test_magnitude_symmetric() {
        let a = Point3::new(0.3, 0.3, 0.5);
        let b = Point3::new(-7.0, 2.0, 11.0);
        assert_eq!(magnitude(&a, &b), magnitude(&b, &a));
    }

    #[test]
    fn test_magnitude_matches_nalgebra() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 15.0);
        assert!((magnitude(&a, &b) - (b - a).norm()).abs() < 1e-12);
        assert!((magnitude(&a, &b) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_closest_point_on_triangle_regions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        // Face interior
        let p = closest_point_on_triangle(&Point3::new(0.25, 0.25, 1.0), &a, &b, &c);
        assert!((p - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-12);

        // Vertex region of a
        let p = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &a, &b, &c);
        assert!((p - a).norm() < 1e-12);

        // Edge region of bc
        let p = closest_point_on_triangle(&Point3::new(1.0, 1.0, 0.0), &a, &b, &c);
        assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);

        // Edge region of ab
        let p = closest_point_on_triangle(&Point3::new(0.5, -2.0, 0.0), &a, &b, &c);
        assert!((p - Point3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_magnitude_propagates_nan() {
        let a = Point3::new(f64::NAN, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        assert!(magnitude(&a, &b).is_nan());
    }
}
