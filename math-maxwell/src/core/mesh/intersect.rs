//! Triangle intersection and distance queries

use super::aabb::Aabb;
use super::surface::TriangleMesh;
use crate::core::vector::{Vec3, add, cross, distance, dot, scale, sub};

/// Möller–Trumbore test of the closed segment `p0 → p1` against a triangle
///
/// Segments parallel to the triangle plane are reported as not intersecting.
pub fn segment_intersects_triangle(p0: &Vec3, p1: &Vec3, tri: &[Vec3; 3]) -> bool {
    let dir = sub(p1, p0);
    let e1 = sub(&tri[1], &tri[0]);
    let e2 = sub(&tri[2], &tri[0]);
    let h = cross(&dir, &e2);
    let a = dot(&e1, &h);
    let scale_ref = dot(&e1, &e1).max(dot(&e2, &e2)) * dot(&dir, &dir).sqrt();
    if a.abs() <= 1e-12 * scale_ref {
        return false;
    }
    let f = 1.0 / a;
    let s = sub(p0, &tri[0]);
    let u = f * dot(&s, &h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = cross(&s, &e1);
    let v = f * dot(&dir, &q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    let t = f * dot(&e2, &q);
    (0.0..=1.0).contains(&t)
}

/// True when the two triangles cross each other
pub fn triangles_intersect(a: &[Vec3; 3], b: &[Vec3; 3]) -> bool {
    (0..3).any(|i| segment_intersects_triangle(&a[i], &a[(i + 1) % 3], b))
        || (0..3).any(|i| segment_intersects_triangle(&b[i], &b[(i + 1) % 3], a))
}

/// Closest point of a triangle to `p` (Ericson, Real-Time Collision Detection 5.1.5)
pub fn closest_point_on_triangle(p: &Vec3, tri: &[Vec3; 3]) -> Vec3 {
    let [a, b, c] = tri;
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ap = sub(p, a);
    let d1 = dot(&ab, &ap);
    let d2 = dot(&ac, &ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = sub(p, b);
    let d3 = dot(&ab, &bp);
    let d4 = dot(&ac, &bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return add(a, &scale(v, &ab));
    }

    let cp = sub(p, c);
    let d5 = dot(&ab, &cp);
    let d6 = dot(&ac, &cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return add(a, &scale(w, &ac));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return add(b, &scale(w, &sub(c, b)));
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    add(a, &add(&scale(v, &ab), &scale(w, &ac)))
}

/// Distance from `p` to a triangle
pub fn point_triangle_distance(p: &Vec3, tri: &[Vec3; 3]) -> f64 {
    distance(p, &closest_point_on_triangle(p, tri))
}

impl TriangleMesh {
    /// Distance from `p` to the closest point of the surface
    pub fn distance_to(&self, p: &Vec3) -> f64 {
        (0..self.num_triangles())
            .map(|t| point_triangle_distance(p, &self.corners(t)))
            .fold(f64::INFINITY, f64::min)
    }

    /// First pair of non-adjacent triangles that intersect, if any
    ///
    /// Triangles sharing a vertex are not tested against each other.
    /// Candidate pairs come from a sweep along x over the triangle boxes.
    pub fn find_self_intersection(&self) -> Option<[usize; 2]> {
        let n = self.num_triangles();
        let slack = 1e-12 * self.bounds().diagonal();
        let boxes: Vec<Aabb> = (0..n)
            .map(|t| Aabb::from_points(&self.corners(t)).inflated(slack))
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| boxes[a].min[0].total_cmp(&boxes[b].min[0]));

        for (pos, &i) in order.iter().enumerate() {
            let tri_i = self.triangle(i);
            for &j in &order[pos + 1..] {
                if boxes[j].min[0] > boxes[i].max[0] {
                    break;
                }
                if !boxes[i].overlaps(&boxes[j]) {
                    continue;
                }
                let tri_j = self.triangle(j);
                if tri_i.iter().any(|v| tri_j.contains(v)) {
                    continue;
                }
                if triangles_intersect(&self.corners(i), &self.corners(j)) {
                    return Some([i.min(j), i.max(j)]);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRI: [Vec3; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    #[test]
    fn test_segment_through_triangle() {
        assert!(segment_intersects_triangle(
            &[0.2, 0.2, -1.0],
            &[0.2, 0.2, 1.0],
            &TRI
        ));
        // Misses: outside the triangle
        assert!(!segment_intersects_triangle(
            &[0.8, 0.8, -1.0],
            &[0.8, 0.8, 1.0],
            &TRI
        ));
        // Misses: segment stops short of the plane
        assert!(!segment_intersects_triangle(
            &[0.2, 0.2, 0.5],
            &[0.2, 0.2, 1.0],
            &TRI
        ));
    }

    #[test]
    fn test_closest_point_regions() {
        // Face region
        assert_relative_eq!(point_triangle_distance(&[0.2, 0.2, 0.7], &TRI), 0.7);
        // Vertex region
        assert_relative_eq!(
            point_triangle_distance(&[-1.0, -1.0, 0.0], &TRI),
            2.0_f64.sqrt()
        );
        // Edge region
        assert_relative_eq!(point_triangle_distance(&[0.5, -2.0, 0.0], &TRI), 2.0);
        // Hypotenuse
        assert_relative_eq!(
            point_triangle_distance(&[1.0, 1.0, 0.0], &TRI),
            0.5_f64.sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_crossing_triangles() {
        let vertical = [[0.25, 0.25, -0.5], [0.25, 0.25, 0.5], [2.0, 2.0, 0.0]];
        assert!(triangles_intersect(&TRI, &vertical));
        let lifted = TRI.map(|v| [v[0], v[1], v[2] + 1.0]);
        assert!(!triangles_intersect(&TRI, &lifted));
    }
}
