//! Shared wire-format types for the Patito compiler and virtual machine.
//!
//! This crate owns the definitions that must agree between `patito-compiler`
//! and `patito-vm`: the primitive [`Type`]s, the segmented virtual address
//! space, the quadruple instruction encoding, and the [`ObjectProgram`]
//! that the compiler emits and the VM consumes. Neither side depends on
//! the other; both depend on this.

pub mod error;
pub mod io;
pub mod program;
pub mod types;

pub use error::ObjectIoError;
pub use program::{
    ConstantValue, FunctionDescriptor, ObjectProgram, Op, Param, QuadArg, Quadruple, Resources,
};
pub use types::{
    type_of_address, Segment, Type, CONST_FLOAT_BASE, CONST_INT_BASE, GLOBAL_FLOAT_BASE,
    GLOBAL_INT_BASE, LOCAL_FLOAT_BASE, LOCAL_INT_BASE, SEGMENT_SIZE, TEMP_FLOAT_BASE,
    TEMP_INT_BASE,
};
