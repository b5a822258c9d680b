//! Text art of a shape on its layout grid.

use hashbrown::HashSet;

use crate::{
    canonical::{decode, ShapeId},
    error::Result,
    geometry::Family,
};

/// Draw the canonical orientation of `id`, one line per layout row, with
/// `pixel` at occupied cells.
///
/// Hexagonal shapes use doubled coordinates, so neighbouring cells in a row
/// are two columns apart.
pub fn draw(family: Family, id: &ShapeId, pixel: char) -> Result<String> {
    let cells: HashSet<(i32, i32)> = decode(family, id)?
        .iter()
        .map(|p| family.to_layout(*p))
        .collect();

    let rows = cells.iter().map(|(r, _)| *r);
    let cols = cells.iter().map(|(_, c)| *c);

    let (Some(min_r), Some(max_r), Some(min_c), Some(max_c)) =
        (rows.clone().min(), rows.max(), cols.clone().min(), cols.max())
    else {
        return Ok(String::new());
    };

    let art = (min_r..=max_r)
        .map(|r| {
            let line: String = (min_c..=max_c)
                .map(|c| if cells.contains(&(r, c)) { pixel } else { ' ' })
                .collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(art)
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(s: &str) -> ShapeId {
        s.parse().unwrap()
    }

    fn draw(family: Family, id: &ShapeId, pixel: char) -> String {
        super::draw(family, id, pixel).unwrap()
    }

    #[test]
    pub fn square_shapes() {
        assert_eq!(draw(Family::Square, &id("1"), '#'), "#");
        assert_eq!(draw(Family::Square, &id("7"), '#'), "###");
        assert_eq!(draw(Family::Square, &id("3-2"), '#'), "##\n #");
        assert_eq!(draw(Family::Square, &id("1-1-3"), '@'), "@\n@\n@@");
    }

    #[test]
    pub fn hexagon_rows_are_doubled() {
        assert_eq!(draw(Family::Hexagon, &id("5"), '@'), "@ @");
        assert_eq!(draw(Family::Hexagon, &id("21"), '@'), "@ @ @");
    }

    #[test]
    pub fn misplaced_hexagon_cells_are_rejected() {
        assert!(super::draw(Family::Hexagon, &id("2"), '@').is_err());
        assert!(super::draw(Family::Hexagon, &id("3"), '@').is_err());
        assert_eq!(draw(Family::Square, &id("3"), '@'), "@@");
    }

    #[test]
    pub fn every_cell_is_drawn() {
        let id = id("6-3-1");
        let art = draw(Family::Square, &id, '#');
        assert_eq!(art.chars().filter(|c| *c == '#').count(), id.cells());
        assert!(art.lines().all(|l| !l.ends_with(' ')));
    }
}
