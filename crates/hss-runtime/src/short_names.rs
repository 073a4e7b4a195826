//! Short-name table: small integer handles for strings.
//!
//! Handles are allocated from the lowest free hole first, otherwise from the
//! high-water mark. Releasing the highest live handle lowers the mark
//! instead of leaving a hole.

use hashbrown::HashMap;

/// Handle into a [`ShortNames`] table.
pub type Handle = u16;

#[derive(Debug, Default)]
pub struct ShortNames {
    names: HashMap<Handle, String>,
    /// Sorted, disjoint, half-open ranges of free handles below `max`.
    holes: Vec<(Handle, Handle)>,
    max: Handle,
}

impl ShortNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, s: &str) -> Handle {
        let handle = self.new_handle();
        self.names.insert(handle, s.to_string());
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&str> {
        self.names.get(&handle).map(String::as_str)
    }

    /// Release `handle`. Unknown handles are ignored.
    pub fn dispose(&mut self, handle: Handle) {
        if self.names.remove(&handle).is_some() {
            self.release(handle);
        }
    }

    pub fn reset(&mut self) {
        self.names.clear();
        self.holes.clear();
        self.max = 0;
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn new_handle(&mut self) -> Handle {
        match self.holes.first_mut() {
            Some(hole) => {
                let handle = hole.0;
                hole.0 += 1;
                if hole.0 == hole.1 {
                    self.holes.remove(0);
                }
                handle
            }
            None => {
                let handle = self.max;
                self.max = self.max.wrapping_add(1);
                handle
            }
        }
    }

    fn release(&mut self, handle: Handle) {
        if handle.wrapping_add(1) == self.max {
            self.max = handle;
            return;
        }

        let adjacent = self
            .holes
            .iter()
            .position(|&(lo, hi)| hi == handle || lo.checked_sub(1) == Some(handle));
        match adjacent {
            Some(i) => {
                let hole = &mut self.holes[i];
                if hole.1 == handle {
                    hole.1 += 1;
                } else {
                    hole.0 = handle;
                }
            }
            None => {
                let at = self.holes.partition_point(|&(lo, _)| lo < handle);
                self.holes.insert(at, (handle, handle + 1));
                return;
            }
        }

        self.coalesce();
    }

    fn coalesce(&mut self) {
        let mut merged: Vec<(Handle, Handle)> = Vec::with_capacity(self.holes.len());
        for &(lo, hi) in &self.holes {
            match merged.last_mut() {
                Some(prev) if prev.1 >= lo => prev.1 = prev.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        self.holes = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_hole_first() {
        let mut names = ShortNames::new();
        for i in 0..5 {
            assert_eq!(names.assign(&format!("name{}", i)), i);
        }
        names.dispose(1);
        assert_eq!(names.get(1), None);
        assert_eq!(names.assign("sixth"), 1);
        assert_eq!(names.get(1), Some("sixth"));
    }

    #[test]
    fn test_dispose_highest_shrinks() {
        let mut names = ShortNames::new();
        names.assign("a");
        let b = names.assign("b");
        names.dispose(b);
        assert!(names.holes.is_empty());
        assert_eq!(names.assign("c"), b);
    }

    #[test]
    fn test_holes_coalesce() {
        let mut names = ShortNames::new();
        for i in 0..8 {
            names.assign(&i.to_string());
        }
        names.dispose(1);
        names.dispose(3);
        names.dispose(5);
        assert_eq!(names.holes, vec![(1, 2), (3, 4), (5, 6)]);
        names.dispose(4);
        assert_eq!(names.holes, vec![(1, 2), (3, 6)]);
        names.dispose(2);
        assert_eq!(names.holes, vec![(1, 6)]);
    }

    #[test]
    fn test_reuse_sequence() {
        let words = ["ala bala", "ala b2la", "ala b3la", "ala b4la", "ala b5la", "ala b6la", "ala b7la"];
        let mut names = ShortNames::new();
        let handles: Vec<Handle> = words.iter().map(|w| names.assign(w)).collect();
        assert_eq!(handles, vec![0, 1, 2, 3, 4, 5, 6]);

        names.dispose(1);
        assert_eq!(names.assign(words[1]), 1);

        names.dispose(1);
        names.dispose(3);
        names.dispose(2);
        assert_eq!(names.get(0), Some("ala bala"));
        assert_eq!(names.get(6), Some("ala b7la"));

        assert_eq!(names.assign(words[1]), 1);
        assert_eq!(names.assign(words[2]), 2);
        assert_eq!(names.assign(words[3]), 3);
        let extra = names.assign(words[0]);
        assert_eq!(extra, 7);
        names.dispose(extra);

        names.dispose(6);
        assert_eq!(names.get(6), None);
        assert_eq!(names.assign(words[6]), 6);

        names.reset();
        assert_eq!(names.get(0), None);
        assert!(names.is_empty());
    }

    #[test]
    fn test_dispose_unknown_is_ignored() {
        let mut names = ShortNames::new();
        names.assign("x");
        names.dispose(42);
        assert_eq!(names.len(), 1);
        assert_eq!(names.assign("y"), 1);
    }
}
