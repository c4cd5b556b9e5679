use tilenav_core::Direction;
use tilenav_core::Direction::*;

/// Successor directions explored from a jump point, given the direction of
/// travel that reached it. `None` (the start cell) explores all eight.
///
/// Cardinal travel keeps going straight and tries both forward diagonals,
/// which is where a wall beside the run forces a turn. Diagonal travel keeps
/// going, tries its two cardinal components, and turns 90° either way for
/// the neighbours a wall behind the diagonal can force.
pub fn pruned(travel: Option<Direction>) -> &'static [Direction] {
    const NORTH: [Direction; 3] = [North, NorthEast, NorthWest];
    const EAST: [Direction; 3] = [East, SouthEast, NorthEast];
    const SOUTH: [Direction; 3] = [South, SouthWest, SouthEast];
    const WEST: [Direction; 3] = [West, NorthWest, SouthWest];
    const NORTH_EAST: [Direction; 5] = [NorthEast, East, North, SouthEast, NorthWest];
    const SOUTH_EAST: [Direction; 5] = [SouthEast, South, East, SouthWest, NorthEast];
    const SOUTH_WEST: [Direction; 5] = [SouthWest, West, South, NorthWest, SouthEast];
    const NORTH_WEST: [Direction; 5] = [NorthWest, North, West, NorthEast, SouthWest];

    match travel {
        None => &Direction::ALL,
        Some(North) => &NORTH,
        Some(East) => &EAST,
        Some(South) => &SOUTH,
        Some(West) => &WEST,
        Some(NorthEast) => &NORTH_EAST,
        Some(SouthEast) => &SOUTH_EAST,
        Some(SouthWest) => &SOUTH_WEST,
        Some(NorthWest) => &NORTH_WEST,
    }
}
