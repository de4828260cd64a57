//! Roof outline extraction from a binary mask.
//!
//! Every foreground pixel edge that faces background becomes a directed unit
//! segment with the foreground on its right-hand side. Chaining those segments
//! end-to-start yields closed loops: outer boundaries run clockwise on screen
//! (positive signed area with y pointing down), hole boundaries run
//! counter-clockwise (negative signed area).

use std::collections::HashMap;

use serde::Serialize;

use crate::raster::BinaryMask;

/// A pixel-corner point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A directed boundary segment between two pixel corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    fn direction(&self) -> (i64, i64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }
}

/// A closed polygon. The last point connects back to the first and is not
/// repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Shoelace area with sign: positive for outer boundaries, negative for holes.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Perimeter in pixels, including the closing edge.
    pub fn perimeter(&self) -> f64 {
        perimeter(&self.points)
    }

    pub fn is_outer(&self) -> bool {
        self.signed_area() > 0.0
    }
}

/// Collect the directed boundary segments of every foreground region.
pub fn boundary_segments(mask: &BinaryMask) -> Vec<Segment> {
    let mut segments = Vec::new();

    for y in 0..mask.height() as i64 {
        for x in 0..mask.width() as i64 {
            if !mask.is_foreground(x, y) {
                continue;
            }

            // Pixel corners
            let tl = Point::new(x, y);
            let tr = Point::new(x + 1, y);
            let br = Point::new(x + 1, y + 1);
            let bl = Point::new(x, y + 1);

            if !mask.is_foreground(x, y - 1) {
                segments.push(Segment { start: tl, end: tr });
            }
            if !mask.is_foreground(x + 1, y) {
                segments.push(Segment { start: tr, end: br });
            }
            if !mask.is_foreground(x, y + 1) {
                segments.push(Segment { start: br, end: bl });
            }
            if !mask.is_foreground(x - 1, y) {
                segments.push(Segment { start: bl, end: tl });
            }
        }
    }

    segments
}

/// Turn preference when leaving a corner: left (on screen) first, then
/// straight, then right. Turning left at a pinch corner keeps diagonally
/// touching pixels on one boundary (8-connected foreground).
fn turn_rank(incoming: (i64, i64), outgoing: (i64, i64)) -> u8 {
    let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
    match cross.signum() {
        -1 => 0,
        0 => 1,
        _ => 2,
    }
}

/// Connect directed boundary segments into closed loops.
///
/// Each segment is followed by the outgoing segment at its end corner with the
/// best [`turn_rank`]. At ordinary corners there is exactly one candidate; at
/// pinch corners there are two and the ranking pairs them one-to-one, so the
/// successor relation is a permutation and every segment lands on exactly one
/// loop.
pub fn connect_segments(segments: &[Segment]) -> Vec<Contour> {
    if segments.is_empty() {
        return vec![];
    }

    let mut by_start: HashMap<Point, Vec<usize>> = HashMap::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        by_start.entry(seg.start).or_default().push(i);
    }

    let successor = |idx: usize| -> Option<usize> {
        let seg = &segments[idx];
        let incoming = seg.direction();
        by_start.get(&seg.end).and_then(|candidates| {
            candidates
                .iter()
                .copied()
                .min_by_key(|&c| turn_rank(incoming, segments[c].direction()))
        })
    };

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }

        let mut points = Vec::new();
        let mut current = start_idx;
        loop {
            used[current] = true;
            points.push(segments[current].start);

            match successor(current) {
                Some(next) if next == start_idx => break,
                Some(next) if !used[next] => current = next,
                _ => {
                    tracing::warn!(
                        start = ?segments[start_idx].start,
                        "Boundary walk did not close, dropping partial loop"
                    );
                    points.clear();
                    break;
                }
            }
        }

        if points.len() >= 4 {
            contours.push(Contour::new(simplify(points)));
        }
    }

    contours
}

/// Drop points that lie on a straight run between their neighbours.
pub fn simplify(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let cross = (cur.x - prev.x) * (next.y - cur.y) - (cur.y - prev.y) * (next.x - cur.x);
            cross != 0
        })
        .map(|i| points[i])
        .collect()
}

/// Extract every closed boundary (outer and hole) from a mask.
pub fn find_contours(mask: &BinaryMask) -> Vec<Contour> {
    let segments = boundary_segments(mask);
    let contours = connect_segments(&segments);

    tracing::debug!(
        num_segments = segments.len(),
        num_contours = contours.len(),
        total_points = contours.iter().map(|c| c.points.len()).sum::<usize>(),
        "Extracted boundary contours"
    );

    contours
}

/// Extract only the outer boundaries (holes are discarded).
pub fn find_outer_contours(mask: &BinaryMask) -> Vec<Contour> {
    find_contours(mask)
        .into_iter()
        .filter(Contour::is_outer)
        .collect()
}

/// Signed shoelace area of a closed polygon.
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice as f64 / 2.0
}

/// Sum of Euclidean distances between consecutive points, closing the loop.
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> BinaryMask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let data = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        BinaryMask::from_vec(width, height, data).unwrap()
    }

    #[test]
    fn test_single_pixel() {
        let mask = mask_from_rows(&["...", ".#.", "..."]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        assert_eq!(contours[0].signed_area(), 1.0);
        assert_eq!(contours[0].perimeter(), 4.0);
    }

    #[test]
    fn test_rectangle_corners_only() {
        let mask = mask_from_rows(&["......", ".####.", ".####.", "......"]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert_eq!(c.points.len(), 4);
        assert_eq!(c.area(), 8.0);
        assert_eq!(c.perimeter(), 12.0);
        assert!(c.is_outer());
    }

    #[test]
    fn test_hole_is_negative() {
        let mask = mask_from_rows(&["###", "#.#", "###"]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
        let outer: Vec<_> = contours.iter().filter(|c| c.is_outer()).collect();
        let holes: Vec<_> = contours.iter().filter(|c| !c.is_outer()).collect();
        assert_eq!(outer.len(), 1);
        assert_eq!(holes.len(), 1);
        assert_eq!(outer[0].area(), 9.0);
        assert_eq!(holes[0].signed_area(), -1.0);
    }

    #[test]
    fn test_diagonal_pixels_join() {
        let mask = mask_from_rows(&["#.", ".#"]);
        let outer = find_outer_contours(&mask);
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].area(), 2.0);
        assert_eq!(outer[0].perimeter(), 8.0);
    }

    #[test]
    fn test_empty_mask() {
        let mask = mask_from_rows(&["....", "...."]);
        assert!(find_contours(&mask).is_empty());
    }

    #[test]
    fn test_full_mask_follows_raster_border() {
        let mask = mask_from_rows(&["###", "###"]);
        let contours = find_outer_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 6.0);
        assert_eq!(contours[0].perimeter(), 10.0);
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let pts = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
            Point::new(0, 1),
        ];
        let simplified = simplify(pts);
        assert_eq!(
            simplified,
            vec![
                Point::new(0, 0),
                Point::new(2, 0),
                Point::new(2, 2),
                Point::new(0, 2)
            ]
        );
    }

    #[test]
    fn test_turn_rank() {
        // heading down on screen, east is a left turn
        assert_eq!(turn_rank((0, 1), (1, 0)), 0);
        assert_eq!(turn_rank((0, 1), (0, 1)), 1);
        assert_eq!(turn_rank((0, 1), (-1, 0)), 2);
    }
}
