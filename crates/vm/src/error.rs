//! Runtime (VM) errors. All are fatal: the VM halts and hands the error
//! back to its caller rather than retrying or recovering.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Division where the divisor evaluated to zero.
    DivisionByZero { ip: usize },
    /// A write was attempted against a constant-segment address.
    WriteToConstant { ip: usize, address: i64 },
    /// A constant address was read but no value was ever loaded for it.
    UndefinedConstant { ip: usize, address: i64 },
    /// An address fell outside all eight segments.
    BadAddress { ip: usize, address: i64 },
    /// `RETURN`/`ENDFUNC` executed with no matching activation record.
    EmptyCallStack { ip: usize },
    /// A `GOSUB`/`ERA`/`PARAM` referenced a function the object program
    /// never described.
    UnknownFunction { ip: usize, name: String },
    /// The instruction pointer fell off the end of the quadruple tape
    /// without an `END` (malformed object program).
    RanOffEnd,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::DivisionByZero { ip } => {
                write!(f, "runtime error at quad {ip}: division by zero")
            }
            RuntimeError::WriteToConstant { ip, address } => {
                write!(f, "runtime error at quad {ip}: write to constant address {address}")
            }
            RuntimeError::UndefinedConstant { ip, address } => {
                write!(f, "runtime error at quad {ip}: constant {address} not found")
            }
            RuntimeError::BadAddress { ip, address } => {
                write!(f, "runtime error at quad {ip}: address {address} out of range")
            }
            RuntimeError::EmptyCallStack { ip } => {
                write!(f, "runtime error at quad {ip}: return with empty call stack")
            }
            RuntimeError::UnknownFunction { ip, name } => {
                write!(f, "runtime error at quad {ip}: unknown function '{name}'")
            }
            RuntimeError::RanOffEnd => {
                write!(f, "runtime error: instruction pointer ran past the last quadruple without END")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
