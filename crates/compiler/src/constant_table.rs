//! Interns numeric literals into the constant segment (§4.3).
//!
//! Ints and floats are kept in separate maps even when numerically
//! equal, so `1` and `1.0` always land at distinct addresses in distinct
//! segments -- floats are keyed by bit pattern since `f64` isn't `Eq`.

use std::collections::HashMap;

use patito_core::{ConstantValue, Type};

use crate::error::SemanticError;
use crate::memory_map::MemoryMap;

#[derive(Default)]
pub struct ConstantTable {
    ints: HashMap<i64, i64>,
    floats: HashMap<u64, i64>,
    pub values: HashMap<i64, ConstantValue>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_int(&mut self, value: i64, memory_map: &mut MemoryMap, line: usize) -> Result<i64, SemanticError> {
        if let Some(&addr) = self.ints.get(&value) {
            return Ok(addr);
        }
        let addr = memory_map.assign_constant(Type::Int, line)?;
        self.ints.insert(value, addr);
        self.values.insert(addr, ConstantValue::Int(value));
        Ok(addr)
    }

    pub fn add_float(&mut self, value: f64, memory_map: &mut MemoryMap, line: usize) -> Result<i64, SemanticError> {
        let key = value.to_bits();
        if let Some(&addr) = self.floats.get(&key) {
            return Ok(addr);
        }
        let addr = memory_map.assign_constant(Type::Float, line)?;
        self.floats.insert(key, addr);
        self.values.insert(addr, ConstantValue::Float(value));
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent_on_value() {
        let mut mm = MemoryMap::new();
        let mut ct = ConstantTable::new();
        let a = ct.add_int(7, &mut mm, 1).unwrap();
        let b = ct.add_int(7, &mut mm, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn int_and_float_of_same_numeric_value_get_distinct_addresses() {
        let mut mm = MemoryMap::new();
        let mut ct = ConstantTable::new();
        let i = ct.add_int(1, &mut mm, 1).unwrap();
        let f = ct.add_float(1.0, &mut mm, 1).unwrap();
        assert_ne!(i, f);
        assert!(i < 8000); // const int segment
        assert!(f >= 8000); // const float segment
    }

    #[test]
    fn distinct_values_get_distinct_addresses() {
        let mut mm = MemoryMap::new();
        let mut ct = ConstantTable::new();
        let a = ct.add_int(1, &mut mm, 1).unwrap();
        let b = ct.add_int(2, &mut mm, 1).unwrap();
        assert_ne!(a, b);
    }
}
