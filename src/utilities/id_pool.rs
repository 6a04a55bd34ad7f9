/// Manages a pool of identifier values. Grabbing an id from the pool picks a number that has been
/// picked and returned before, or if none of those are available, the minimum value greater
/// than any existing id.
#[derive(Debug, Clone, Default)]
pub struct IdPool {
    next_index: i32,
    available_ids: Vec<i32>,
}

impl IdPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the highest value which any index claimed thus far could possibly have.
    /// -1 if nothing has ever been claimed.
    #[inline(always)]
    pub fn highest_possibly_claimed_id(&self) -> i32 {
        self.next_index - 1
    }

    /// Gets the number of previously returned ids waiting in the pool.
    #[inline(always)]
    pub fn available_id_count(&self) -> usize {
        self.available_ids.len()
    }

    /// Takes an id from the pool.
    #[inline(always)]
    pub fn take(&mut self) -> i32 {
        match self.available_ids.pop() {
            Some(id) => id,
            None => {
                let id = self.next_index;
                self.next_index += 1;
                id
            }
        }
    }

    /// Returns an id to the pool.
    #[inline(always)]
    pub fn return_id(&mut self, id: i32) {
        debug_assert!(
            id >= 0 && id < self.next_index,
            "Returned ids must have been taken from this pool."
        );
        self.available_ids.push(id);
    }

    /// Resets the pool.
    pub fn clear(&mut self) {
        self.next_index = 0;
        self.available_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_ids_are_reused_before_new_ones() {
        let mut pool = IdPool::new();
        assert_eq!(pool.highest_possibly_claimed_id(), -1);
        assert_eq!(pool.take(), 0);
        assert_eq!(pool.take(), 1);
        assert_eq!(pool.take(), 2);
        pool.return_id(1);
        assert_eq!(pool.available_id_count(), 1);
        assert_eq!(pool.take(), 1);
        assert_eq!(pool.take(), 3);
        assert_eq!(pool.highest_possibly_claimed_id(), 3);
        pool.clear();
        assert_eq!(pool.take(), 0);
    }
}
