//! Chained hash table mapping names to variable and function slots.

use lsharp_common::DeclaredType;

/// Default bucket count used by the generator.
pub const SYMBOL_TABLE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// One named binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Variable slot or function index, depending on `kind`.
    pub index: u32,
    /// Declared type. `Unknown` for functions and untyped assignments.
    pub declared: DeclaredType,
}

/// `h = h * 31 + byte` over the name, in wrapping `u32` arithmetic.
pub fn hash(name: &str) -> u32 {
    name.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Fixed bucket count; chains grow without bound. Newer entries shadow
/// older ones with the same name.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    buckets: Vec<Vec<Symbol>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(SYMBOL_TABLE_CAPACITY)
    }
}

impl SymbolTable {
    /// Create a table with `capacity` buckets. Zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); capacity.max(1)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of entries, shadowed ones included.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Bucket a name hashes to.
    pub fn bucket_of(&self, name: &str) -> usize {
        hash(name) as usize % self.buckets.len()
    }

    /// Insert an entry with an unknown declared type.
    pub fn insert(&mut self, name: &str, kind: SymbolKind, index: u32) {
        self.insert_typed(name, kind, index, DeclaredType::Unknown);
    }

    pub fn insert_typed(
        &mut self,
        name: &str,
        kind: SymbolKind,
        index: u32,
        declared: DeclaredType,
    ) {
        let bucket = self.bucket_of(name);
        self.buckets[bucket].push(Symbol {
            name: name.to_string(),
            kind,
            index,
            declared,
        });
    }

    /// The most recently inserted entry for `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.buckets[self.bucket_of(name)]
            .iter()
            .rev()
            .find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash(""), 0);
        assert_eq!(hash("a"), 97);
        assert_eq!(hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn hash_wraps_on_long_names() {
        let long = "z".repeat(64);
        // Must not panic in debug builds.
        let _ = hash(&long);
    }

    #[test]
    fn bucket_is_hash_mod_capacity() {
        let table = SymbolTable::new(100);
        assert_eq!(table.bucket_of("ab"), (97 * 31 + 98) % 100);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut table = SymbolTable::new(0);
        assert_eq!(table.capacity(), 1);
        table.insert("x", SymbolKind::Variable, 0);
        table.insert("y", SymbolKind::Variable, 1);
        assert_eq!(table.lookup("x").map(|s| s.index), Some(0));
        assert_eq!(table.lookup("y").map(|s| s.index), Some(1));
    }

    #[test]
    fn lookup_missing() {
        let table = SymbolTable::default();
        assert!(table.is_empty());
        assert_eq!(table.lookup("nope"), None);
    }

    #[test]
    fn newest_entry_shadows() {
        let mut table = SymbolTable::default();
        table.insert_typed("x", SymbolKind::Variable, 0, DeclaredType::Number);
        table.insert("x", SymbolKind::Variable, 3);
        let found = table.lookup("x").unwrap();
        assert_eq!(found.index, 3);
        assert_eq!(found.declared, DeclaredType::Unknown);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn colliding_names_stay_distinct() {
        let mut table = SymbolTable::new(1);
        table.insert("f", SymbolKind::Function, 0);
        table.insert("g", SymbolKind::Variable, 0);
        assert_eq!(table.lookup("f").unwrap().kind, SymbolKind::Function);
        assert_eq!(table.lookup("g").unwrap().kind, SymbolKind::Variable);
    }
}
