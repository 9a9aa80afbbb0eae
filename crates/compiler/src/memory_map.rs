//! Compile-time virtual address allocation (§4.2). Distinct from
//! `patito_vm`'s runtime `Memory`: this only ever hands out addresses, it
//! never stores values.

use patito_core::{Resources, Type, CONST_FLOAT_BASE, CONST_INT_BASE, GLOBAL_FLOAT_BASE, GLOBAL_INT_BASE, LOCAL_FLOAT_BASE, LOCAL_INT_BASE, SEGMENT_SIZE, TEMP_FLOAT_BASE, TEMP_INT_BASE};

use crate::error::SemanticError;

#[derive(Debug, Clone, Copy, Default)]
struct SavedCounters {
    local_int: i64,
    local_float: i64,
    temp_int: i64,
    temp_float: i64,
}

pub struct MemoryMap {
    global_int: i64,
    global_float: i64,
    local_int: i64,
    local_float: i64,
    temp_int: i64,
    temp_float: i64,
    const_int: i64,
    const_float: i64,
    saved: Vec<SavedCounters>,
    /// Cells available per segment before `bump` reports exhaustion.
    /// Normally `SEGMENT_SIZE`; a `CompilerConfig` can shrink it so tests
    /// can reach the overflow path without allocating 1000 addresses.
    segment_size: i64,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::with_segment_size(SEGMENT_SIZE)
    }

    pub fn with_segment_size(segment_size: i64) -> Self {
        MemoryMap {
            global_int: 0,
            global_float: 0,
            local_int: 0,
            local_float: 0,
            temp_int: 0,
            temp_float: 0,
            const_int: 0,
            const_float: 0,
            saved: Vec::new(),
            segment_size,
        }
    }

    pub fn assign_global(&mut self, ty: Type, line: usize) -> Result<i64, SemanticError> {
        let segment_size = self.segment_size;
        match ty {
            Type::Int => Self::bump(&mut self.global_int, GLOBAL_INT_BASE, segment_size, "global int", line),
            Type::Float => Self::bump(&mut self.global_float, GLOBAL_FLOAT_BASE, segment_size, "global float", line),
            other => Err(SemanticError::new(line, format!("unsupported type '{other}' for global variable"))),
        }
    }

    pub fn assign_local(&mut self, ty: Type, line: usize) -> Result<i64, SemanticError> {
        let segment_size = self.segment_size;
        match ty {
            Type::Int => Self::bump(&mut self.local_int, LOCAL_INT_BASE, segment_size, "local int", line),
            Type::Float => Self::bump(&mut self.local_float, LOCAL_FLOAT_BASE, segment_size, "local float", line),
            other => Err(SemanticError::new(line, format!("unsupported type '{other}' for local variable"))),
        }
    }

    pub fn assign_temp(&mut self, ty: Type, line: usize) -> Result<i64, SemanticError> {
        let segment_size = self.segment_size;
        match ty {
            Type::Int => Self::bump(&mut self.temp_int, TEMP_INT_BASE, segment_size, "temp int", line),
            Type::Float => Self::bump(&mut self.temp_float, TEMP_FLOAT_BASE, segment_size, "temp float", line),
            other => Err(SemanticError::new(line, format!("unsupported type '{other}' for temporary"))),
        }
    }

    pub fn assign_constant(&mut self, ty: Type, line: usize) -> Result<i64, SemanticError> {
        let segment_size = self.segment_size;
        match ty {
            Type::Int => Self::bump(&mut self.const_int, CONST_INT_BASE, segment_size, "const int", line),
            Type::Float => Self::bump(&mut self.const_float, CONST_FLOAT_BASE, segment_size, "const float", line),
            other => Err(SemanticError::new(line, format!("unsupported type '{other}' for constant"))),
        }
    }

    fn bump(counter: &mut i64, base: i64, segment_size: i64, segment: &str, line: usize) -> Result<i64, SemanticError> {
        if *counter >= segment_size {
            return Err(SemanticError::new(line, format!("{segment} memory pool exhausted")));
        }
        let addr = base + *counter;
        *counter += 1;
        Ok(addr)
    }

    /// Save and reset local/temp counters on entering a function body.
    pub fn enter_function(&mut self) {
        self.saved.push(SavedCounters {
            local_int: self.local_int,
            local_float: self.local_float,
            temp_int: self.temp_int,
            temp_float: self.temp_float,
        });
        self.local_int = 0;
        self.local_float = 0;
        self.temp_int = 0;
        self.temp_float = 0;
    }

    /// Restore the caller's local/temp counters.
    pub fn exit_function(&mut self) {
        if let Some(saved) = self.saved.pop() {
            self.local_int = saved.local_int;
            self.local_float = saved.local_float;
            self.temp_int = saved.temp_int;
            self.temp_float = saved.temp_float;
        }
    }

    /// How many local/temp cells the current function scope has consumed
    /// so far -- captured once a function body is fully emitted.
    pub fn current_resources(&self, params_int: usize, params_float: usize) -> Resources {
        Resources {
            local_int: self.local_int as usize,
            local_float: self.local_float as usize,
            temp_int: self.temp_int as usize,
            temp_float: self.temp_float as usize,
            params_int,
            params_float,
        }
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_are_monotone_and_disjoint() {
        let mut mm = MemoryMap::new();
        assert_eq!(mm.assign_global(Type::Int, 1).unwrap(), 1000);
        assert_eq!(mm.assign_global(Type::Int, 1).unwrap(), 1001);
        assert_eq!(mm.assign_global(Type::Float, 1).unwrap(), 2000);
        assert_eq!(mm.assign_local(Type::Int, 1).unwrap(), 3000);
        assert_eq!(mm.assign_temp(Type::Float, 1).unwrap(), 6000);
        assert_eq!(mm.assign_constant(Type::Int, 1).unwrap(), 7000);
    }

    #[test]
    fn enter_exit_function_restores_counters() {
        let mut mm = MemoryMap::new();
        mm.assign_local(Type::Int, 1).unwrap();
        mm.enter_function();
        assert_eq!(mm.assign_local(Type::Int, 1).unwrap(), 3000);
        let resources = mm.current_resources(0, 0);
        assert_eq!(resources.local_int, 1);
        mm.exit_function();
        assert_eq!(mm.assign_local(Type::Int, 1).unwrap(), 3001);
    }

    #[test]
    fn exhausting_a_pool_is_a_semantic_error() {
        let mut mm = MemoryMap::new();
        for _ in 0..1000 {
            mm.assign_global(Type::Int, 1).unwrap();
        }
        assert!(mm.assign_global(Type::Int, 1).is_err());
    }
}
