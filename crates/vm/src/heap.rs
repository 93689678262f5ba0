//! Object table: the VM's heap of string objects.
//!
//! Values refer to objects by index. A sweep compacts the table, so it
//! returns a relocation map that the caller must apply to every live index.

/// Outcome of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcStats {
    /// Objects that survived.
    pub live: usize,
    /// Objects that were freed.
    pub freed: usize,
}

/// Growable table of string objects with a parallel mark bit per entry.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: Vec<String>,
    marks: Vec<bool>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding an independent copy of every pool entry, in order.
    pub fn from_pool(pool: &[String]) -> Self {
        Self {
            objects: pool.to_vec(),
            marks: vec![false; pool.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append an object and return its index.
    pub fn alloc(&mut self, text: String) -> usize {
        self.objects.push(text);
        self.marks.push(false);
        self.objects.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.objects.get(index).map(String::as_str)
    }

    /// Mark an object live. Out-of-range indices are ignored.
    pub(crate) fn mark(&mut self, index: usize) {
        if let Some(mark) = self.marks.get_mut(index) {
            *mark = true;
        }
    }

    /// Free every unmarked object and compact the survivors, clearing their
    /// marks. Entry `i` of the returned map is the new index of old object
    /// `i`, or `None` if it was freed.
    pub(crate) fn sweep(&mut self) -> (Vec<Option<usize>>, GcStats) {
        let mut relocation = Vec::with_capacity(self.objects.len());
        let mut survivors = Vec::new();
        for (object, marked) in self.objects.drain(..).zip(self.marks.drain(..)) {
            if marked {
                relocation.push(Some(survivors.len()));
                survivors.push(object);
            } else {
                relocation.push(None);
            }
        }
        let stats = GcStats {
            live: survivors.len(),
            freed: relocation.len() - survivors.len(),
        };
        self.marks = vec![false; survivors.len()];
        self.objects = survivors;
        (relocation, stats)
    }
}
