//! Grid geometry for the two supported lattice families.
//!
//! Every family-specific constant and transformation lives here, dispatched
//! with a `match` on [`Family`].

use core::str::FromStr;

use crate::error::Error;

/// A cell centre in the native coordinates of a [`Family`].
///
/// Square cells use `(row, column, 0)`. Hexagonal cells use cube
/// coordinates, whose three components always sum to zero.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Default)]
pub struct Point(pub [i32; 3]);

impl Point {
    pub const fn new(a: i32, b: i32, c: i32) -> Self {
        Self([a, b, c])
    }

    pub fn add(self, other: Point) -> Point {
        let [a, b, c] = self.0;
        let [x, y, z] = other.0;
        Point([a + x, b + y, c + z])
    }

    pub fn sub(self, other: Point) -> Point {
        let [a, b, c] = self.0;
        let [x, y, z] = other.0;
        Point([a - x, b - y, c - z])
    }

    pub fn scale(self, s: i32) -> Point {
        let [a, b, c] = self.0;
        Point([a * s, b * s, c * s])
    }
}

const SQUARE_VECTORS: [Point; 4] = [
    Point::new(0, 1, 0),
    Point::new(-1, 0, 0),
    Point::new(0, -1, 0),
    Point::new(1, 0, 0),
];

const HEXAGON_VECTORS: [Point; 6] = [
    Point::new(1, 0, -1),
    Point::new(1, -1, 0),
    Point::new(0, -1, 1),
    Point::new(-1, 0, 1),
    Point::new(-1, 1, 0),
    Point::new(0, 1, -1),
];

/// The lattice a shape lives on.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub enum Family {
    Square,
    Hexagon,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::Square, Family::Hexagon];

    /// The name used in storage paths and bucket headers.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Square => "square",
            Family::Hexagon => "hexagon",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Family::Square => "Square Polyominoes",
            Family::Hexagon => "Hexagon Polyominoes",
        }
    }

    /// Number of meaningful components in a [`Point`].
    pub fn dimensions(&self) -> usize {
        match self {
            Family::Square => 2,
            Family::Hexagon => 3,
        }
    }

    /// The unit vectors to the neighbours of a cell.
    pub fn vectors(&self) -> &'static [Point] {
        match self {
            Family::Square => &SQUARE_VECTORS,
            Family::Hexagon => &HEXAGON_VECTORS,
        }
    }

    /// Order of the rotation group. Reflections double it.
    pub fn symmetry(&self) -> usize {
        match self {
            Family::Square => 4,
            Family::Hexagon => 6,
        }
    }

    /// Rotate `p` one step anticlockwise about the origin.
    pub fn rotate(&self, p: Point) -> Point {
        let [a, b, c] = p.0;
        match self {
            Family::Square => Point::new(-b, a, 0),
            Family::Hexagon => Point::new(-c, -a, -b),
        }
    }

    /// Reflect `p` in the vertical line through the origin.
    pub fn flip(&self, p: Point) -> Point {
        let [a, b, c] = p.0;
        match self {
            Family::Square => Point::new(-a, b, 0),
            Family::Hexagon => Point::new(c, b, a),
        }
    }

    /// Translate `points` so that they sit at the canonical offset, moving
    /// `marked` by the same vector.
    ///
    /// For the square family the minimal row and column become zero. For the
    /// hexagonal family the pattern is first shifted along the second
    /// adjacency vector until the minimal second component is zero, then
    /// along the fourth until the minimal first component is zero.
    ///
    /// `points` must not be empty.
    pub fn normalize(&self, points: &mut [Point], marked: Point) -> Point {
        let min_of = |points: &[Point], d: usize| {
            points.iter().map(|p| p.0[d]).min().unwrap_or(0)
        };

        let v = match self {
            Family::Square => Point::new(-min_of(points, 0), -min_of(points, 1), 0),
            Family::Hexagon => {
                let v1 = HEXAGON_VECTORS[1].scale(min_of(points, 1));
                let min_a = points.iter().map(|p| p.add(v1).0[0]).min().unwrap_or(0);
                let v2 = HEXAGON_VECTORS[3].scale(min_a);
                v1.add(v2)
            }
        };

        points.iter_mut().for_each(|p| *p = p.add(v));
        marked.add(v)
    }

    /// Map a native point to its `(row, column)` layout position.
    ///
    /// Hexagons use doubled coordinates, so horizontally adjacent cells are
    /// two columns apart.
    pub fn to_layout(&self, p: Point) -> (i32, i32) {
        let [a, b, c] = p.0;
        match self {
            Family::Square => (a, b),
            Family::Hexagon => (b, a - c),
        }
    }

    /// Inverse of [`Family::to_layout`].
    ///
    /// Returns `None` for positions no cell maps to: hexagonal columns must
    /// have the same parity as their row.
    pub fn from_layout(&self, row: i32, col: i32) -> Option<Point> {
        match self {
            Family::Square => Some(Point::new(row, col, 0)),
            Family::Hexagon if (col - row) % 2 != 0 => None,
            Family::Hexagon => Some(Point::new((col - row) / 2, row, (-col - row) / 2)),
        }
    }

    /// Format the meaningful components of `p`, comma separated.
    pub fn format_point(&self, p: Point) -> String {
        p.0[..self.dimensions()]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a point formatted by [`Family::format_point`].
    pub fn parse_point(&self, s: &str) -> Result<Point, Error> {
        let mut out = [0i32; 3];
        let mut count = 0;
        for part in s.split(',') {
            if count == self.dimensions() {
                count += 1;
                break;
            }
            out[count] = part
                .trim()
                .parse()
                .map_err(|_| Error::InvalidIdentifier(format!("bad point component in {s:?}")))?;
            count += 1;
        }

        if count != self.dimensions() {
            return Err(Error::InvalidIdentifier(format!(
                "expected {} components in point {s:?}",
                self.dimensions()
            )));
        }

        Ok(Point(out))
    }
}

impl core::fmt::Display for Family {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Family {
    type Err = Error;

    /// Accepts any name starting with `s` or `h`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('S') => Ok(Family::Square),
            Some('H') => Ok(Family::Hexagon),
            _ => Err(Error::InvalidIdentifier(format!("unknown shape family {s:?}"))),
        }
    }
}

/// One concrete placement of a shape: a set of unique cells.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Pattern {
    points: Vec<Point>,
}

impl Pattern {
    /// Create a pattern from `points`, dropping duplicates.
    pub fn new(mut points: Vec<Point>) -> Self {
        points.sort_unstable();
        points.dedup();
        Self { points }
    }

    /// The single cell at the origin.
    pub fn origin() -> Self {
        Self {
            points: vec![Point::default()],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.points.contains(p)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter()
    }

    /// A copy of `self` with `p` added.
    pub fn with(&self, p: Point) -> Self {
        let mut points = Vec::with_capacity(self.points.len() + 1);
        points.extend_from_slice(&self.points);
        points.push(p);
        Self::new(points)
    }

    /// A copy of `self` with `p` removed.
    pub fn without(&self, p: &Point) -> Self {
        Self {
            points: self.points.iter().filter(|v| *v != p).copied().collect(),
        }
    }

    /// Whether every cell can be reached from every other through
    /// neighbours in `family`.
    pub fn is_connected(&self, family: Family) -> bool {
        let Some(first) = self.points.first() else {
            return false;
        };

        let mut seen = vec![*first];
        let mut todo = vec![*first];
        while let Some(p) = todo.pop() {
            for v in family.vectors() {
                let n = p.add(*v);
                if self.contains(&n) && !seen.contains(&n) {
                    seen.push(n);
                    todo.push(n);
                }
            }
        }

        seen.len() == self.points.len()
    }
}

impl From<Vec<Point>> for Pattern {
    fn from(value: Vec<Point>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<Point> for Pattern {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
