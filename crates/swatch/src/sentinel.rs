//! Sentinel colors.
//!
//! Before compiling, every exposed theme variable is replaced by a unique
//! pseudo-random color. The compiler carries that color through to its output,
//! where it is found again and swapped back for the variable.

use std::collections::{HashMap, HashSet};

use rand::Rng;

/// The canonical primary theme variable.
pub const PRIMARY_VARIABLE: &str = "@primary-color";

/// Fixed sentinel for [`PRIMARY_VARIABLE`].
pub const PRIMARY_SENTINEL: &str = "#123456";

/// Values never issued as sentinels: they collide with common literals.
const RESERVED: &[&str] = &["#000000", "#ffffff", PRIMARY_SENTINEL];

/// Issues unique 24-bit sentinel colors.
#[derive(Debug)]
pub struct SentinelAllocator<R> {
    rng: R,
    issued: HashSet<String>,
}

impl<R: Rng> SentinelAllocator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    /// A fresh `#rrggbb` never issued before and never reserved.
    pub fn next_color(&mut self) -> String {
        loop {
            let color = format!("#{:06x}", self.rng.gen_range(0..=0xff_ffffu32));
            if !RESERVED.contains(&color.as_str()) && self.issued.insert(color.clone()) {
                return color;
            }
        }
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

/// Bijection between theme variables and their sentinels, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentinelMap {
    entries: Vec<(String, String)>,
    by_sentinel: HashMap<String, String>,
}

impl SentinelMap {
    /// Assigns a sentinel to every variable. [`PRIMARY_VARIABLE`] always gets
    /// [`PRIMARY_SENTINEL`].
    pub fn assign<R: Rng>(variables: &[String], allocator: &mut SentinelAllocator<R>) -> Self {
        let mut map = Self::default();
        for variable in variables {
            if map.get(variable).is_some() {
                continue;
            }
            let sentinel = if variable == PRIMARY_VARIABLE {
                PRIMARY_SENTINEL.to_string()
            } else {
                allocator.next_color()
            };
            map.by_sentinel.insert(sentinel.clone(), variable.clone());
            map.entries.push((variable.clone(), sentinel));
        }
        map
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, sentinel)| sentinel.as_str())
    }

    pub fn variable_for(&self, sentinel: &str) -> Option<&str> {
        self.by_sentinel.get(sentinel).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(v, s)| (v.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `@name: sentinel;` lines overriding every variable.
    pub fn declarations(&self) -> String {
        self.entries
            .iter()
            .map(|(variable, sentinel)| format!("{}: {};\n", variable, sentinel))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn allocator(seed: u64) -> SentinelAllocator<StdRng> {
        SentinelAllocator::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_primary_gets_reserved_sentinel() {
        let vars = vec!["@link-color".to_string(), PRIMARY_VARIABLE.to_string()];
        let map = SentinelMap::assign(&vars, &mut allocator(1));
        assert_eq!(map.get(PRIMARY_VARIABLE), Some(PRIMARY_SENTINEL));
        assert_ne!(map.get("@link-color"), Some(PRIMARY_SENTINEL));
        assert_eq!(map.variable_for(PRIMARY_SENTINEL), Some(PRIMARY_VARIABLE));
    }

    #[test]
    fn test_sentinels_are_well_formed() {
        let mut alloc = allocator(7);
        for _ in 0..200 {
            let color = alloc.next_color();
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
        assert_eq!(alloc.issued(), 200);
    }

    #[test]
    fn test_declarations_keep_selection_order() {
        let vars = vec![PRIMARY_VARIABLE.to_string(), "@text-color".to_string()];
        let map = SentinelMap::assign(&vars, &mut allocator(3));
        let text = map.declarations();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "@primary-color: #123456;");
        assert!(lines[1].starts_with("@text-color: #"));
    }

    #[test]
    fn test_duplicate_variables_assigned_once() {
        let vars = vec!["@a".to_string(), "@a".to_string()];
        let map = SentinelMap::assign(&vars, &mut allocator(9));
        assert_eq!(map.len(), 1);
    }
}
