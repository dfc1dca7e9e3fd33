//! Executant Handles
//!
//! Parent links, behavior hosts, anchor targets and collider rivals all name
//! executants by `AntId`, never by reference. An id pairs an arena slot with
//! the slot's generation. `Stage::destroy` frees the slot and bumps the
//! generation, so a popped balloon's id keeps failing lookups even after a
//! new balloon moves into the same slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to an executant in a `Stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AntId {
    index: u32,
    generation: u32,
}

impl AntId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// How many executants held the slot before this one.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for AntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ant#{}", self.index)?;
        if self.generation > 0 {
            write!(f, "v{}", self.generation)?;
        }
        Ok(())
    }
}

/// Slot bookkeeping behind `Stage`: which slots are taken, by which
/// generation, and which are free to hand to the next `spawn`.
#[derive(Debug, Default)]
pub struct AntAllocator {
    generations: Vec<u32>,
    /// Slots of destroyed executants, most recent last
    vacant: Vec<u32>,
    alive: u32,
}

impl AntAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the most recently vacated slot, or opens a new one.
    pub fn allocate(&mut self) -> AntId {
        self.alive += 1;
        match self.vacant.pop() {
            Some(index) => AntId::new(index, self.generations[index as usize]),
            None => {
                self.generations.push(0);
                AntId::new(self.generations.len() as u32 - 1, 0)
            }
        }
    }

    /// Vacates the slot of a live id. False for a stale one, so destroying
    /// twice is harmless.
    pub fn free(&mut self, id: AntId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.generations[id.index as usize] += 1;
        self.vacant.push(id.index);
        self.alive -= 1;
        true
    }

    pub fn is_alive(&self, id: AntId) -> bool {
        self.generations.get(id.index as usize) == Some(&id.generation)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Executant, Stage};
    use crate::error::Error;
    use crate::geom::Point;

    #[test]
    fn test_respawn_reuses_slot_of_destroyed() {
        let mut stage = Stage::new();
        let root = stage.root();
        let popped = stage.add_child(root, Executant::new().at(Point::new(1.0, 1.0)), None).unwrap();
        stage.destroy(popped).unwrap();

        let fresh = stage.add_child(root, Executant::new().at(Point::new(9.0, 9.0)), None).unwrap();
        assert_eq!(fresh.index(), popped.index());
        assert_eq!(fresh.generation(), popped.generation() + 1);

        // the old id never reaches the newcomer
        assert!(matches!(stage.get(popped), Err(Error::StaleAnt(id)) if id == popped));
        assert_eq!(stage.get(fresh).unwrap().position, Point::new(9.0, 9.0));
        assert_eq!(stage.get(root).unwrap().childs().len(), 1);
    }

    #[test]
    fn test_root_holds_first_slot() {
        let mut stage = Stage::new();
        let root = stage.root();
        assert_eq!((root.index(), root.generation()), (0, 0));

        // destroying the root empties it but keeps its id valid
        stage.destroy(root).unwrap();
        assert!(stage.contains(root));
        assert_eq!(stage.len(), 1);
    }

    #[test]
    fn test_stale_free_is_ignored() {
        let mut ants = AntAllocator::new();
        let a = ants.allocate();
        let b = ants.allocate();
        assert!(ants.free(a));
        assert!(!ants.free(a));
        assert_eq!(ants.alive_count(), 1);

        // vacated slots go out most recent first
        assert!(ants.free(b));
        assert_eq!(ants.allocate().index(), b.index());
        assert_eq!(ants.allocate().index(), a.index());
    }

    #[test]
    fn test_display() {
        assert_eq!(AntId::new(3, 0).to_string(), "ant#3");
        assert_eq!(AntId::new(3, 2).to_string(), "ant#3v2");
    }
}
