//! Cardinal directions and cell helpers shared by the grid games

use std::collections::{HashSet, VecDeque};

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Cardinal direction (screen coordinates: y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Fixed scan order used by ghosts looking for an open neighbour
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// Unit step for this direction
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Dir::Up => IVec2::NEG_Y,
            Dir::Down => IVec2::Y,
            Dir::Left => IVec2::NEG_X,
            Dir::Right => IVec2::X,
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Direction actually taken when controls may be flipped
    #[inline]
    pub fn resolve(self, flipped: bool) -> Dir {
        if flipped { self.opposite() } else { self }
    }
}

/// Clamp a cell into the inclusive box `[min, max]`
#[inline]
pub fn clamp_cell(pos: IVec2, min: IVec2, max: IVec2) -> IVec2 {
    pos.clamp(min, max)
}

/// First step of a shortest path from `from` over `open` cells to the
/// nearest cell matching `goal`. `None` if no goal is reachable.
pub fn first_step(from: IVec2, open: impl Fn(IVec2) -> bool, goal: impl Fn(IVec2) -> bool) -> Option<Dir> {
    let mut seen = HashSet::from([from]);
    let mut queue = VecDeque::from([(from, None::<Dir>)]);
    while let Some((pos, first)) = queue.pop_front() {
        if pos != from && goal(pos) {
            return first;
        }
        for dir in Dir::ALL {
            let next = pos + dir.offset();
            if open(next) && seen.insert(next) {
                queue.push_back((next, first.or(Some(dir))));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_cancel() {
        for dir in Dir::ALL {
            assert_eq!(dir.offset() + dir.opposite().offset(), IVec2::ZERO);
            assert_eq!(dir.resolve(true), dir.opposite());
            assert_eq!(dir.resolve(false), dir);
        }
    }

    #[test]
    fn test_clamp_cell() {
        let max = IVec2::splat(19);
        assert_eq!(clamp_cell(IVec2::new(-1, 20), IVec2::ZERO, max), IVec2::new(0, 19));
        assert_eq!(clamp_cell(IVec2::new(4, 5), IVec2::ZERO, max), IVec2::new(4, 5));
    }

    #[test]
    fn test_first_step_detours_around_blocked_cells() {
        let max = IVec2::splat(9);
        let blocked = [IVec2::new(3, 2), IVec2::new(3, 3), IVec2::new(3, 4)];
        let open = |p: IVec2| clamp_cell(p, IVec2::ZERO, max) == p && !blocked.contains(&p);
        let goal = IVec2::new(4, 3);

        // Straight right is blocked, so the first move has to go around
        let dir = first_step(IVec2::new(2, 3), open, |p| p == goal);
        assert!(matches!(dir, Some(Dir::Up) | Some(Dir::Down)), "got {:?}", dir);

        // The start cell itself never counts as the goal
        assert_eq!(first_step(goal, open, |p| p == goal), None);
        assert_eq!(first_step(IVec2::ZERO, |_| false, |_| true), None);
    }
}
