//! Canonical identifiers for free shapes.
//!
//! A shape is identified by the maximal layout encoding over all of its
//! rotations and reflections, each placed at the canonical offset.

use core::str::FromStr;

use crate::{
    error::{Error, Result},
    geometry::{Family, Pattern, Point},
};

/// Separator between rows of a serialized [`ShapeId`].
pub const ENCODING_SEPARATOR: char = '-';

/// Bitmask of the occupied layout columns of one row.
pub type LayoutRow = u128;

/// The canonical identifier of a free shape: one [`LayoutRow`] per occupied
/// layout row, topmost first.
///
/// Ordering is lexicographic over the rows, which is the order used to pick
/// the canonical orientation.
#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord)]
pub struct ShapeId(Vec<LayoutRow>);

impl ShapeId {
    /// The identifier of a single cell.
    pub fn single() -> Self {
        Self(vec![1])
    }

    pub fn rows(&self) -> &[LayoutRow] {
        &self.0
    }

    /// The amount of cells in the shape.
    pub fn cells(&self) -> usize {
        self.0.iter().map(|r| r.count_ones() as usize).sum()
    }
}

impl core::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut rows = self.0.iter();
        if let Some(first) = rows.next() {
            write!(f, "{first}")?;
        }
        for row in rows {
            write!(f, "{ENCODING_SEPARATOR}{row}")?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidIdentifier("empty identifier".to_string()));
        }

        let rows = s
            .split(ENCODING_SEPARATOR)
            .map(|row| match row.parse::<LayoutRow>() {
                Ok(0) => Err(Error::InvalidIdentifier(format!("empty row in {s:?}"))),
                Ok(v) => Ok(v),
                Err(_) => Err(Error::InvalidIdentifier(format!("bad row {row:?} in {s:?}"))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self(rows))
    }
}

/// Encode `points` by their layout positions.
///
/// Rows run from the minimal to the maximal occupied layout row. Layout
/// columns are used as bit indices directly, so they must lie in
/// `0..LayoutRow::BITS`.
pub fn encode(family: Family, points: &[Point]) -> Result<ShapeId> {
    let layout: Vec<(i32, i32)> = points.iter().map(|p| family.to_layout(*p)).collect();

    let (min_r, max_r) = match (
        layout.iter().map(|(r, _)| *r).min(),
        layout.iter().map(|(r, _)| *r).max(),
    ) {
        (Some(min), Some(max)) => (min, max),
        _ => return Err(Error::InvalidPattern("cannot encode an empty pattern".to_string())),
    };

    let mut rows = vec![0 as LayoutRow; (max_r - min_r + 1) as usize];

    for (r, c) in layout {
        if c < 0 || c >= LayoutRow::BITS as i32 {
            return Err(Error::InvalidPattern(format!(
                "layout column {c} does not fit in a row of {} bits",
                LayoutRow::BITS
            )));
        }
        rows[(r - min_r) as usize] |= (1 as LayoutRow) << c;
    }

    Ok(ShapeId(rows))
}

/// Decode `id` back into the cells of its canonical orientation.
///
/// Fails with [`Error::InvalidIdentifier`] if a set bit is not a layout
/// position of `family`.
pub fn decode(family: Family, id: &ShapeId) -> Result<Pattern> {
    let mut points = Vec::with_capacity(id.cells());

    for (r, row) in id.0.iter().enumerate() {
        let mut row = *row;
        let mut c = 0;
        while row != 0 {
            if row & 1 == 1 {
                let point = family.from_layout(r as i32, c).ok_or_else(|| {
                    Error::InvalidIdentifier(format!(
                        "{id} has a cell at row {r}, column {c}, which is not a {family} cell"
                    ))
                })?;
                points.push(point);
            }
            row >>= 1;
            c += 1;
        }
    }

    Ok(Pattern::new(points))
}

/// An iterator over all rotations and reflections of a pattern, each
/// translated to the canonical offset and paired with the image of a
/// marked point.
///
/// All rotations of the pattern are produced first, followed by all
/// rotations of its reflection.
pub struct Symmetries<'a> {
    family: Family,
    original: &'a [Point],
    original_marked: Point,
    current: Vec<Point>,
    marked: Point,
    produced: usize,
}

impl<'a> Symmetries<'a> {
    pub fn new(family: Family, points: &'a [Point], marked: Point) -> Self {
        Self {
            family,
            original: points,
            original_marked: marked,
            current: points.to_vec(),
            marked,
            produced: 0,
        }
    }
}

impl Iterator for Symmetries<'_> {
    type Item = (Vec<Point>, Point);

    fn next(&mut self) -> Option<Self::Item> {
        let family = self.family;
        let rotations = family.symmetry();

        if self.produced == 2 * rotations {
            return None;
        }

        if self.produced == rotations {
            self.current = self.original.iter().map(|p| family.flip(*p)).collect();
            self.marked = family.flip(self.original_marked);
        }

        self.marked = family.normalize(&mut self.current, self.marked);
        let out = (self.current.clone(), self.marked);

        self.current.iter_mut().for_each(|p| *p = family.rotate(*p));
        self.marked = family.rotate(self.marked);
        self.produced += 1;

        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = 2 * self.family.symmetry() - self.produced;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Symmetries<'_> {}

/// The canonical orientation of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canonical {
    pub id: ShapeId,
    /// Where the marked point lands in the canonical orientation.
    pub marked: Point,
    pub pattern: Pattern,
}

/// Find the canonical orientation of `pattern`, tracking where `marked`
/// ends up.
///
/// The first image with the maximal encoding wins.
pub fn canonicalize(family: Family, pattern: &Pattern, marked: Point) -> Result<Canonical> {
    if pattern.is_empty() {
        return Err(Error::InvalidPattern("pattern is empty".to_string()));
    }

    if !pattern.contains(&marked) {
        return Err(Error::InvalidPattern(format!(
            "marked point {} is not part of the pattern",
            family.format_point(marked)
        )));
    }

    let mut best: Option<Canonical> = None;

    for (points, marked) in Symmetries::new(family, pattern.points(), marked) {
        let id = encode(family, &points)?;

        match &best {
            Some(b) if b.id >= id => {}
            _ => {
                best = Some(Canonical {
                    id,
                    marked,
                    pattern: Pattern::new(points),
                })
            }
        }
    }

    best.ok_or_else(|| Error::InvalidPattern("no symmetries produced".to_string()))
}

/// The canonical identifier of `pattern`.
pub fn canonical_id(family: Family, pattern: &Pattern) -> Result<ShapeId> {
    let marked = pattern
        .points()
        .first()
        .copied()
        .ok_or_else(|| Error::InvalidPattern("pattern is empty".to_string()))?;

    canonicalize(family, pattern, marked).map(|c| c.id)
}
