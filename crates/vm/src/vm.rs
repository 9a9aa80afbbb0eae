//! The quadruple interpreter.
//!
//! Executes an [`ObjectProgram`] quadruple-by-quadruple against a
//! [`Memory`], starting at instruction 0 (the `GOTO main` quadruple every
//! compiled program begins with) and running until `END` or a fatal
//! [`RuntimeError`].

use patito_core::{ObjectProgram, Op, QuadArg, Quadruple, Resources, Type};
use tracing::{debug, trace};

use crate::error::RuntimeError;
use crate::memory::Memory;
use crate::value::Value;

/// Interprets a single object program. Borrows the program rather than
/// owning it: multiple runs of the same program can share one
/// `ObjectProgram` without recompiling or re-parsing.
pub struct VirtualMachine<'p> {
    program: &'p ObjectProgram,
    memory: Memory,
    ip: usize,
    running: bool,
    /// Values staged by `PARAM` between `ERA` and `GOSUB`, tagged with
    /// their zero-based parameter index.
    staged_params: Vec<(usize, Value)>,
    output: Vec<String>,
}

impl<'p> VirtualMachine<'p> {
    pub fn new(program: &'p ObjectProgram) -> Result<Self, RuntimeError> {
        let mut memory = Memory::new();
        memory.load_constants(&program.constants)?;

        let main_resources: Resources = program
            .functions
            .get("main")
            .map(|desc| desc.resources)
            .unwrap_or_default();
        memory.install_main_frame(&main_resources);

        Ok(VirtualMachine {
            program,
            memory,
            ip: 0,
            running: true,
            staged_params: Vec::new(),
            output: Vec::new(),
        })
    }

    /// Run to completion (or to the first fatal error), returning every
    /// string a `PRINT` instruction emitted, in order.
    pub fn run(&mut self) -> Result<Vec<String>, RuntimeError> {
        let program = self.program;
        self.ip = 0;
        self.running = true;
        self.output.clear();

        while self.running {
            let quad = program
                .quadruples
                .get(self.ip)
                .ok_or(RuntimeError::RanOffEnd)?;
            trace!(ip = self.ip, op = %quad.op(), "executing quadruple");
            self.ip = self.step(self.ip, quad)?;
        }

        debug!(lines = self.output.len(), "program halted");
        Ok(std::mem::take(&mut self.output))
    }

    fn step(&mut self, ip: usize, quad: &Quadruple) -> Result<usize, RuntimeError> {
        let mut next_ip = ip + 1;

        match quad.op() {
            Op::Plus | Op::Minus | Op::Mul | Op::Div => {
                let a1 = require_num(ip, quad.arg1())?;
                let a2 = require_num(ip, quad.arg2())?;
                let result_addr = require_num(ip, quad.result())?;
                let v1 = self.memory.get(ip, a1)?;
                let v2 = self.memory.get(ip, a2)?;
                let result = apply_arith(ip, quad.op(), v1, v2)?;
                self.memory.set(ip, result_addr, result)?;
            }

            Op::Gt | Op::Lt | Op::Neq => {
                let a1 = require_num(ip, quad.arg1())?;
                let a2 = require_num(ip, quad.arg2())?;
                let result_addr = require_num(ip, quad.result())?;
                let v1 = self.memory.get(ip, a1)?;
                let v2 = self.memory.get(ip, a2)?;
                let truth = apply_relational(quad.op(), v1, v2);
                self.memory.set(ip, result_addr, Value::Int(truth as i64))?;
            }

            Op::Assign => {
                let a1 = require_num(ip, quad.arg1())?;
                let result_addr = require_num(ip, quad.result())?;
                let v = self.memory.get(ip, a1)?;
                self.memory.set(ip, result_addr, v)?;
            }

            Op::Goto => {
                next_ip = require_num(ip, quad.result())? as usize;
            }

            Op::GotoF => {
                let a1 = require_num(ip, quad.arg1())?;
                let target = require_num(ip, quad.result())? as usize;
                let v = self.memory.get(ip, a1)?;
                if is_falsy(v) {
                    next_ip = target;
                }
            }

            Op::Print => {
                let text = match quad.arg1() {
                    QuadArg::Name(s) => s.clone(),
                    QuadArg::Num(addr) => self.memory.get(ip, *addr)?.to_string(),
                    QuadArg::None => String::new(),
                };
                print!("{text}");
                use std::io::Write;
                let _ = std::io::stdout().flush();
                self.output.push(text);
            }

            Op::Era => {
                self.staged_params.clear();
            }

            Op::Param => {
                let a1 = require_num(ip, quad.arg1())?;
                let index = require_num(ip, quad.result())? as usize;
                let v = self.memory.get(ip, a1)?;
                self.staged_params.push((index, v));
            }

            Op::Gosub => {
                let name = require_name(ip, quad.arg1())?;
                let target = require_num(ip, quad.result())? as usize;
                let desc = self
                    .program
                    .functions
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnknownFunction { ip, name: name.to_string() })?;

                self.memory.push_call(&desc.resources, ip + 1);

                let mut staged = std::mem::take(&mut self.staged_params);
                staged.sort_by_key(|(idx, _)| *idx);
                let mut int_offset = 0usize;
                let mut float_offset = 0usize;
                for (slot, (_, value)) in staged.into_iter().enumerate() {
                    if let Some(param) = desc.params.get(slot) {
                        match param.ty {
                            Type::Float => {
                                self.memory.set_local_by_index(Type::Float, float_offset, value);
                                float_offset += 1;
                            }
                            _ => {
                                self.memory.set_local_by_index(Type::Int, int_offset, value);
                                int_offset += 1;
                            }
                        }
                    }
                }

                next_ip = target;
            }

            Op::Return => {
                let a1 = require_num(ip, quad.arg1())?;
                let v = self.memory.get(ip, a1)?;
                let return_ip = self.memory.pop_call(ip)?;
                if let Some(result_addr) = quad.result().as_num() {
                    self.memory.set(ip, result_addr, v)?;
                }
                next_ip = return_ip;
            }

            Op::EndFunc => {
                next_ip = self.memory.pop_call(ip)?;
            }

            Op::End => {
                self.running = false;
            }
        }

        Ok(next_ip)
    }
}

fn require_num(ip: usize, arg: &QuadArg) -> Result<i64, RuntimeError> {
    arg.as_num().ok_or(RuntimeError::BadAddress { ip, address: -1 })
}

fn require_name<'a>(ip: usize, arg: &'a QuadArg) -> Result<&'a str, RuntimeError> {
    arg.as_name().ok_or_else(|| RuntimeError::UnknownFunction { ip, name: String::new() })
}

fn is_falsy(v: Value) -> bool {
    match v {
        Value::Int(0) => true,
        Value::Float(f) => f == 0.0,
        Value::Unset => true,
        _ => false,
    }
}

fn apply_relational(op: Op, v1: Value, v2: Value) -> bool {
    let both_int = v1.is_integral() && v2.is_integral();
    let cmp = if both_int {
        match (v1, v2) {
            (Value::Int(a), Value::Int(b)) => a.cmp(&b),
            _ => (v1.as_f64()).partial_cmp(&v2.as_f64()).unwrap_or(std::cmp::Ordering::Equal),
        }
    } else {
        v1.as_f64().partial_cmp(&v2.as_f64()).unwrap_or(std::cmp::Ordering::Equal)
    };
    match op {
        Op::Gt => cmp == std::cmp::Ordering::Greater,
        Op::Lt => cmp == std::cmp::Ordering::Less,
        Op::Neq => cmp != std::cmp::Ordering::Equal,
        _ => unreachable!("apply_relational called with non-relational op"),
    }
}

/// Floor division matching the spec's "floor, don't truncate" rule for
/// integer `/`, unlike Rust's default truncating `i64::div`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn apply_arith(ip: usize, op: Op, v1: Value, v2: Value) -> Result<Value, RuntimeError> {
    let both_int = matches!(v1, Value::Int(_) | Value::Unset) && matches!(v2, Value::Int(_) | Value::Unset);

    match op {
        Op::Div => {
            if both_int {
                let (a, b) = (as_i64(v1), as_i64(v2));
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero { ip });
                }
                Ok(Value::Int(floor_div(a, b)))
            } else {
                let b = v2.as_f64();
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero { ip });
                }
                Ok(Value::Float(v1.as_f64() / b))
            }
        }
        Op::Plus if both_int => Ok(Value::Int(as_i64(v1) + as_i64(v2))),
        Op::Minus if both_int => Ok(Value::Int(as_i64(v1) - as_i64(v2))),
        Op::Mul if both_int => Ok(Value::Int(as_i64(v1) * as_i64(v2))),
        Op::Plus => Ok(Value::Float(v1.as_f64() + v2.as_f64())),
        Op::Minus => Ok(Value::Float(v1.as_f64() - v2.as_f64())),
        Op::Mul => Ok(Value::Float(v1.as_f64() * v2.as_f64())),
        _ => unreachable!("apply_arith called with non-arithmetic op"),
    }
}

fn as_i64(v: Value) -> i64 {
    match v {
        Value::Int(i) => i,
        Value::Unset => 0,
        Value::Float(f) => f as i64,
    }
}
