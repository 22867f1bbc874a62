//! VId-keyed state and input bundles exchanged with the outer runtime.
//!
//! When a module migrates between backends, the runtime captures its
//! register/RAM contents as a [`State`] and its current input values as an
//! [`Input`], both keyed by the host-allocated [`VId`] space so the bundles
//! survive AST re-lowering.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tempo_common::Bits;

/// An opaque variable ID allocated by the host.
///
/// VIds are dense small integers; the kernel indexes its read bindings by
/// raw VId and otherwise treats them as opaque keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct VId(u32);

impl VId {
    /// Creates a VId from a raw `u32`.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the raw value widened for slice indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A snapshot of a module's stateful storage, keyed by VId.
///
/// Each entry holds the full element array of one state variable. VIds
/// missing from a snapshot are skipped on restore, so partially overlapping
/// state sets remain compatible across backend swaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    entries: HashMap<VId, Vec<Bits>>,
}

impl State {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) the array value for a VId.
    pub fn insert(&mut self, vid: VId, value: Vec<Bits>) {
        self.entries.insert(vid, value);
    }

    /// Returns the array value for a VId, if present.
    pub fn get(&self, vid: VId) -> Option<&[Bits]> {
        self.entries.get(&vid).map(Vec::as_slice)
    }

    /// The number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A bundle of input values, keyed by VId.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Input {
    entries: HashMap<VId, Bits>,
}

impl Input {
    /// Creates an empty input bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) the value for a VId.
    pub fn insert(&mut self, vid: VId, value: Bits) {
        self.entries.insert(vid, value);
    }

    /// Returns the value for a VId, if present.
    pub fn get(&self, vid: VId) -> Option<&Bits> {
        self.entries.get(&vid)
    }

    /// The number of entries in the bundle.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bundle holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vid_roundtrip() {
        let v = VId::from_raw(7);
        assert_eq!(v.as_raw(), 7);
        assert_eq!(v.index(), 7);
    }

    #[test]
    fn state_insert_get() {
        let mut s = State::new();
        assert!(s.is_empty());
        s.insert(VId::from_raw(0), vec![Bits::from_u64(3, 4)]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(VId::from_raw(0)).unwrap()[0].to_u64(), 3);
        assert!(s.get(VId::from_raw(1)).is_none());
    }

    #[test]
    fn input_insert_get() {
        let mut i = Input::new();
        i.insert(VId::from_raw(2), Bits::from_bool(true));
        assert!(i.get(VId::from_raw(2)).unwrap().to_bool());
        assert!(i.get(VId::from_raw(3)).is_none());
    }

    #[test]
    fn state_serde_roundtrip() {
        let mut s = State::new();
        s.insert(VId::from_raw(1), vec![Bits::from_u64(0xAB, 8)]);
        let json = serde_json::to_string(&s).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get(VId::from_raw(1)).unwrap()[0].to_u64(), 0xAB);
    }
}
