//! Segmented execution memory.
//!
//! Per §9's design notes, this trades the reference implementation's
//! sparse address-keyed maps for dense, fixed-size vectors: one pair per
//! live segment, sized up front. Globals and constants are sized to a
//! full segment once at load time; locals and temps are resized per
//! activation record from the callee's declared [`Resources`], so deep
//! recursion never pays for unused cells in frames below the active one.

use std::collections::HashMap;

use patito_core::{ConstantValue, Resources, Segment, Type, SEGMENT_SIZE};

use crate::error::RuntimeError;
use crate::value::Value;

/// One function's local/temp cells, live only while its activation is on
/// top of the call stack.
#[derive(Debug, Clone)]
struct Frame {
    local_int: Vec<Value>,
    local_float: Vec<Value>,
    temp_int: Vec<Value>,
    temp_float: Vec<Value>,
}

impl Frame {
    fn sized_for(resources: &Resources) -> Self {
        Frame {
            local_int: vec![Value::Unset; resources.local_int],
            local_float: vec![Value::Unset; resources.local_float],
            temp_int: vec![Value::Unset; resources.temp_int],
            temp_float: vec![Value::Unset; resources.temp_float],
        }
    }

    /// The frame `main` runs in: no declared resources until the
    /// descriptor reports its own local/temp counts, so it starts empty
    /// and the caller (the VM) must use `main`'s own `Resources` instead.
    fn empty() -> Self {
        Frame {
            local_int: Vec::new(),
            local_float: Vec::new(),
            temp_int: Vec::new(),
            temp_float: Vec::new(),
        }
    }
}

/// A saved caller context, restored when the callee returns.
#[derive(Debug, Clone)]
struct ActivationRecord {
    frame: Frame,
    return_ip: usize,
}

/// All live VM memory: globals, constants, the active frame, and the
/// stack of suspended caller frames.
pub struct Memory {
    global_int: Vec<Value>,
    global_float: Vec<Value>,
    const_int: Vec<Value>,
    const_float: Vec<Value>,
    current: Frame,
    call_stack: Vec<ActivationRecord>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            global_int: vec![Value::Unset; SEGMENT_SIZE as usize],
            global_float: vec![Value::Unset; SEGMENT_SIZE as usize],
            const_int: vec![Value::Unset; SEGMENT_SIZE as usize],
            const_float: vec![Value::Unset; SEGMENT_SIZE as usize],
            current: Frame::empty(),
            call_stack: Vec::new(),
        }
    }

    /// Size `main`'s own (global-scope) local/temp storage. `main` is
    /// compiled and resourced exactly like any other function descriptor.
    pub fn install_main_frame(&mut self, resources: &Resources) {
        self.current = Frame::sized_for(resources);
    }

    pub fn load_constants(&mut self, constants: &HashMap<i64, ConstantValue>) -> Result<(), RuntimeError> {
        for (&addr, &value) in constants {
            match Segment::of_address(addr) {
                Some(Segment::ConstInt) => {
                    self.const_int[(addr - Segment::ConstInt.base()) as usize] = Value::from(value);
                }
                Some(Segment::ConstFloat) => {
                    self.const_float[(addr - Segment::ConstFloat.base()) as usize] = Value::from(value);
                }
                _ => return Err(RuntimeError::BadAddress { ip: 0, address: addr }),
            }
        }
        Ok(())
    }

    pub fn get(&self, ip: usize, addr: i64) -> Result<Value, RuntimeError> {
        let seg = Segment::of_address(addr).ok_or(RuntimeError::BadAddress { ip, address: addr })?;
        let expected = seg.value_type();
        let raw = match seg {
            Segment::GlobalInt => self.global_int[(addr - seg.base()) as usize],
            Segment::GlobalFloat => self.global_float[(addr - seg.base()) as usize],
            Segment::LocalInt => *self
                .current
                .local_int
                .get((addr - seg.base()) as usize)
                .ok_or(RuntimeError::BadAddress { ip, address: addr })?,
            Segment::LocalFloat => *self
                .current
                .local_float
                .get((addr - seg.base()) as usize)
                .ok_or(RuntimeError::BadAddress { ip, address: addr })?,
            Segment::TempInt => *self
                .current
                .temp_int
                .get((addr - seg.base()) as usize)
                .ok_or(RuntimeError::BadAddress { ip, address: addr })?,
            Segment::TempFloat => *self
                .current
                .temp_float
                .get((addr - seg.base()) as usize)
                .ok_or(RuntimeError::BadAddress { ip, address: addr })?,
            Segment::ConstInt => {
                let cell = self.const_int[(addr - seg.base()) as usize];
                if cell == Value::Unset {
                    return Err(RuntimeError::UndefinedConstant { ip, address: addr });
                }
                cell
            }
            Segment::ConstFloat => {
                let cell = self.const_float[(addr - seg.base()) as usize];
                if cell == Value::Unset {
                    return Err(RuntimeError::UndefinedConstant { ip, address: addr });
                }
                cell
            }
        };
        Ok(raw.read(expected))
    }

    pub fn set(&mut self, ip: usize, addr: i64, value: Value) -> Result<(), RuntimeError> {
        let seg = Segment::of_address(addr).ok_or(RuntimeError::BadAddress { ip, address: addr })?;
        match seg {
            Segment::GlobalInt => self.global_int[(addr - seg.base()) as usize] = value,
            Segment::GlobalFloat => self.global_float[(addr - seg.base()) as usize] = value,
            Segment::LocalInt => {
                let idx = (addr - seg.base()) as usize;
                *self.current.local_int.get_mut(idx).ok_or(RuntimeError::BadAddress { ip, address: addr })? = value;
            }
            Segment::LocalFloat => {
                let idx = (addr - seg.base()) as usize;
                *self.current.local_float.get_mut(idx).ok_or(RuntimeError::BadAddress { ip, address: addr })? = value;
            }
            Segment::TempInt => {
                let idx = (addr - seg.base()) as usize;
                *self.current.temp_int.get_mut(idx).ok_or(RuntimeError::BadAddress { ip, address: addr })? = value;
            }
            Segment::TempFloat => {
                let idx = (addr - seg.base()) as usize;
                *self.current.temp_float.get_mut(idx).ok_or(RuntimeError::BadAddress { ip, address: addr })? = value;
            }
            Segment::ConstInt | Segment::ConstFloat => {
                return Err(RuntimeError::WriteToConstant { ip, address: addr });
            }
        }
        Ok(())
    }

    /// `GOSUB`: suspend the current frame, install a fresh one sized for
    /// the callee, and remember where execution should resume.
    pub fn push_call(&mut self, resources: &Resources, return_ip: usize) {
        let callee = Frame::sized_for(resources);
        let caller = std::mem::replace(&mut self.current, callee);
        self.call_stack.push(ActivationRecord { frame: caller, return_ip });
    }

    /// `RETURN`/`ENDFUNC`: restore the caller's frame, yielding the IP to
    /// resume at.
    pub fn pop_call(&mut self, ip: usize) -> Result<usize, RuntimeError> {
        let record = self.call_stack.pop().ok_or(RuntimeError::EmptyCallStack { ip })?;
        self.current = record.frame;
        Ok(record.return_ip)
    }

    /// Write `value` into one of the callee's just-installed local slots,
    /// by zero-based index within its type's local segment. Used when
    /// staging `PARAM` values during `GOSUB`.
    pub fn set_local_by_index(&mut self, ty: Type, index: usize, value: Value) {
        match ty {
            Type::Float => self.current.local_float[index] = value,
            _ => self.current.local_int[index] = value,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_global_reads_as_zero() {
        let mem = Memory::new();
        assert_eq!(mem.get(0, 1000).unwrap(), Value::Int(0));
        assert_eq!(mem.get(0, 2000).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn writing_a_constant_segment_is_an_error() {
        let mut mem = Memory::new();
        let err = mem.set(0, 7000, Value::Int(1)).unwrap_err();
        assert!(matches!(err, RuntimeError::WriteToConstant { .. }));
    }

    #[test]
    fn call_push_pop_restores_caller_locals() {
        let mut mem = Memory::new();
        mem.set(0, 3000, Value::Int(99)).unwrap();

        let callee_resources = Resources { local_int: 2, ..Default::default() };
        mem.push_call(&callee_resources, 42);
        assert_eq!(mem.get(0, 3000).unwrap(), Value::Int(0));
        mem.set(0, 3000, Value::Int(1)).unwrap();

        let return_ip = mem.pop_call(0).unwrap();
        assert_eq!(return_ip, 42);
        assert_eq!(mem.get(0, 3000).unwrap(), Value::Int(99));
    }

    #[test]
    fn pop_call_on_empty_stack_errors() {
        let mut mem = Memory::new();
        assert!(matches!(mem.pop_call(5), Err(RuntimeError::EmptyCallStack { ip: 5 })));
    }

    #[test]
    fn reading_unloaded_constant_is_an_error() {
        let mem = Memory::new();
        assert!(matches!(
            mem.get(0, 7000),
            Err(RuntimeError::UndefinedConstant { address: 7000, .. })
        ));
    }
}
