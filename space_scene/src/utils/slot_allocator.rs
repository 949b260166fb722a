/// Allocates and recycles small `u32` ids.
///
/// The `Scene` hands these out as provider ids. Freed ids are reused LIFO,
/// and freeing an id that is not live is rejected rather than corrupting
/// the free list.
///
/// ```ignore
/// let mut ids = SlotAllocator::new();
/// let a = ids.alloc();    // 0
/// let b = ids.alloc();    // 1
/// ids.free(a);            // true
/// ids.free(a);            // false (already free)
/// let c = ids.alloc();    // 0 (recycled)
/// ```
pub struct SlotAllocator {
    free_list: Vec<u32>,
    live: Vec<bool>,
    len: u32,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self { free_list: Vec::new(), live: Vec::new(), len: 0 }
    }

    pub fn alloc(&mut self) -> u32 {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None => {
                self.live.push(false);
                (self.live.len() - 1) as u32
            }
        };
        self.live[id as usize] = true;
        self.len += 1;
        id
    }

    /// Return `id` to the pool. `false` if it was not allocated.
    pub fn free(&mut self, id: u32) -> bool {
        match self.live.get_mut(id as usize) {
            Some(live) if *live => {
                *live = false;
                self.len -= 1;
                self.free_list.push(id);
                true
            }
            _ => false,
        }
    }

    pub fn is_allocated(&self, id: u32) -> bool {
        self.live.get(id as usize).copied().unwrap_or(false)
    }

    /// Highest id ever allocated + 1.
    pub fn high_water_mark(&self) -> u32 {
        self.live.len() as u32
    }

    /// Number of live ids
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
