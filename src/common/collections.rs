//! Hash collections keyed with a faster, non-cryptographic hasher. Grid pages
//! hold at most a few dozen items, so hashing cost dominates bucket quality.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
