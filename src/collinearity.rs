use core::str::FromStr;

use crate::{
    error::Error,
    geometry::{Family, Pattern, Point},
};

/// Which straight lines count when measuring collinearity.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub enum Collinearity {
    /// Any line in the plane.
    Plane,
    /// Only lines parallel to one of the family's native axes.
    Lattice,
}

/// `true` if `a` and `b` lie on a common line through the origin.
#[inline]
fn are_parallel(a: Point, b: Point) -> bool {
    let [a0, a1, a2] = a.0.map(i64::from);
    let [b0, b1, b2] = b.0.map(i64::from);

    a1 * b2 == a2 * b1 && a2 * b0 == a0 * b2 && a0 * b1 == a1 * b0
}

impl Collinearity {
    pub const ALL: [Collinearity; 2] = [Collinearity::Plane, Collinearity::Lattice];

    /// The name used in storage paths and bucket headers.
    pub fn name(&self) -> &'static str {
        match self {
            Collinearity::Plane => "plane",
            Collinearity::Lattice => "lattice",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Collinearity::Plane => "Plane",
            Collinearity::Lattice => "Lattice",
        }
    }

    /// The largest number of cells of `pattern` on one line through `point`,
    /// `point` included.
    ///
    /// `point` is expected to be part of `pattern`. A lone cell counts as 1.
    pub fn max_collinear_through(&self, family: Family, pattern: &Pattern, point: Point) -> usize {
        match self {
            Collinearity::Plane => {
                // (direction, amount of other cells along it)
                let mut lines: Vec<(Point, usize)> = Vec::new();

                for v in pattern.iter().filter(|p| **p != point).map(|p| p.sub(point)) {
                    match lines.iter_mut().find(|(d, _)| are_parallel(*d, v)) {
                        Some((_, count)) => *count += 1,
                        None => lines.push((v, 1)),
                    }
                }

                lines.iter().map(|(_, count)| *count).max().unwrap_or(0) + 1
            }
            Collinearity::Lattice => (0..family.dimensions())
                .map(|d| pattern.iter().filter(|p| p.0[d] == point.0[d]).count())
                .max()
                .unwrap_or(0)
                .max(1),
        }
    }

    /// The collinearity of the whole shape.
    pub fn max_collinear(&self, family: Family, pattern: &Pattern) -> usize {
        pattern
            .iter()
            .map(|p| self.max_collinear_through(family, pattern, *p))
            .max()
            .unwrap_or(0)
    }
}

impl core::fmt::Display for Collinearity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Collinearity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('P') => Ok(Collinearity::Plane),
            Some('L') => Ok(Collinearity::Lattice),
            _ => Err(Error::InvalidIdentifier(format!("unknown collinearity {s:?}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn square(cells: &[(i32, i32)]) -> Pattern {
        cells.iter().map(|(r, c)| Point::new(*r, *c, 0)).collect()
    }

    #[test]
    pub fn single_cell() {
        let p = Pattern::origin();
        for c in Collinearity::ALL {
            assert_eq!(c.max_collinear_through(Family::Square, &p, Point::default()), 1);
            assert_eq!(c.max_collinear_through(Family::Hexagon, &p, Point::default()), 1);
        }
    }

    #[test]
    pub fn diagonals_only_count_in_the_plane() {
        // A staircase: three cells on one diagonal.
        let p = square(&[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]);
        let corner = Point::new(2, 2, 0);

        assert_eq!(
            Collinearity::Plane.max_collinear_through(Family::Square, &p, corner),
            3
        );
        assert_eq!(
            Collinearity::Lattice.max_collinear_through(Family::Square, &p, corner),
            2
        );
    }

    #[test]
    pub fn knight_move_lines() {
        // (0,0), (1,2) and (2,4) are collinear but not along any axis.
        let p = square(&[(0, 0), (0, 1), (0, 2), (1, 2), (1, 3), (1, 4), (2, 4)]);
        let through = Point::new(2, 4, 0);

        assert_eq!(
            Collinearity::Plane.max_collinear_through(Family::Square, &p, through),
            3
        );
        assert_eq!(Collinearity::Plane.max_collinear(Family::Square, &p), 3);
        assert_eq!(Collinearity::Lattice.max_collinear(Family::Square, &p), 3);
    }

    #[test]
    pub fn opposite_directions_share_a_line() {
        let p = square(&[(0, 0), (0, 1), (0, 2), (1, 1)]);
        let middle = Point::new(0, 1, 0);
        assert_eq!(
            Collinearity::Plane.max_collinear_through(Family::Square, &p, middle),
            3
        );
    }

    #[test]
    pub fn hexagon_axes() {
        // Three cells along the first axis plus one off it.
        let p: Pattern = [(0, 0), (1, 0), (2, 0), (1, 1)]
            .iter()
            .map(|(a, b)| Point::new(*a, *b, -a - b))
            .collect();

        let end = Point::new(2, 0, -2);
        assert_eq!(
            Collinearity::Lattice.max_collinear_through(Family::Hexagon, &p, end),
            3
        );
        assert_eq!(
            Collinearity::Plane.max_collinear_through(Family::Hexagon, &p, end),
            3
        );

        // (1,1,-2) is off every axis through the origin.
        let origin = Point::default();
        assert_eq!(
            Collinearity::Lattice.max_collinear_through(Family::Hexagon, &p, origin),
            3
        );
        assert_eq!(
            Collinearity::Plane.max_collinear_through(Family::Hexagon, &p, origin),
            3
        );
    }

    #[test]
    pub fn growth_bound() {
        // Adding one cell never raises the collinearity by more than one.
        let base = square(&[(0, 0), (0, 1), (1, 1), (2, 1), (2, 2)]);
        for c in Collinearity::ALL {
            let before = c.max_collinear(Family::Square, &base);
            for p in base.iter() {
                for v in Family::Square.vectors() {
                    let n = p.add(*v);
                    if base.contains(&n) {
                        continue;
                    }
                    let grown = base.with(n);
                    assert!(c.max_collinear_through(Family::Square, &grown, n) <= before + 1);
                    assert!(c.max_collinear(Family::Square, &grown) <= before + 1);
                }
            }
        }
    }

    #[test]
    pub fn from_str() {
        assert_eq!("plane".parse::<Collinearity>().unwrap(), Collinearity::Plane);
        assert_eq!("L".parse::<Collinearity>().unwrap(), Collinearity::Lattice);
        assert!("x".parse::<Collinearity>().is_err());
    }
}
