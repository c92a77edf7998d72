use std::collections::HashMap;

/// Number of addressable memory cells available to variables.
pub const MEMORY_SIZE: usize = 240;

/// Memory mapped numeric display.
pub const DISPLAY_ADDRESS: u8 = 250;

/// Variable name to memory address, allocated bump-style from 0.
///
/// Entries are never updated or removed, so insertion order, allocation order
/// and address order are all the same thing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolTable {
    addresses: HashMap<String, u8>,
    names: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.addresses.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addresses.contains_key(name)
    }

    /// The address the next declaration would get, or `None` once memory is full.
    pub fn next_address(&self) -> Option<u8> {
        if self.names.len() < MEMORY_SIZE {
            Some(self.names.len() as u8)
        } else {
            None
        }
    }

    /// Assigns the next free address to `name`. Returns `None` if the name is
    /// taken or memory is exhausted; nothing is allocated in either case.
    pub fn allocate(&mut self, name: &str) -> Option<u8> {
        if self.contains(name) {
            return None;
        }
        let address = self.next_address()?;
        self.addresses.insert(name.to_string(), address);
        self.names.push(name.to_string());
        Some(address)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(address, name)| (name.as_str(), address as u8))
    }
}
