//! Primitive types and the segmented virtual address space.
//!
//! Everything here is pure data: no compiler state, no VM state. Both
//! `patito-compiler` and `patito-vm` depend on this crate so that the two
//! sides of the object program agree on what an address or a type means
//! without either one importing the other.

use serde::{Deserialize, Serialize};

/// A Patito value type.
///
/// `Void` only ever appears as a function return type. `String` only ever
/// appears as a `print` literal -- it is never the type of an expression,
/// a variable, or a stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Float,
    Void,
    String,
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Void => "void",
            Type::String => "string",
        };
        write!(f, "{s}")
    }
}

/// One of the eight fixed 1000-cell address ranges.
///
/// Segment membership and primitive type are both recoverable from the
/// numeric address alone; the VM leans on this to avoid carrying type tags
/// alongside every address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    GlobalInt,
    GlobalFloat,
    LocalInt,
    LocalFloat,
    TempInt,
    TempFloat,
    ConstInt,
    ConstFloat,
}

/// Width of every segment, in cells.
pub const SEGMENT_SIZE: i64 = 1000;

pub const GLOBAL_INT_BASE: i64 = 1000;
pub const GLOBAL_FLOAT_BASE: i64 = 2000;
pub const LOCAL_INT_BASE: i64 = 3000;
pub const LOCAL_FLOAT_BASE: i64 = 4000;
pub const TEMP_INT_BASE: i64 = 5000;
pub const TEMP_FLOAT_BASE: i64 = 6000;
pub const CONST_INT_BASE: i64 = 7000;
pub const CONST_FLOAT_BASE: i64 = 8000;

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::GlobalInt,
        Segment::GlobalFloat,
        Segment::LocalInt,
        Segment::LocalFloat,
        Segment::TempInt,
        Segment::TempFloat,
        Segment::ConstInt,
        Segment::ConstFloat,
    ];

    /// First address of this segment's range.
    pub const fn base(self) -> i64 {
        match self {
            Segment::GlobalInt => GLOBAL_INT_BASE,
            Segment::GlobalFloat => GLOBAL_FLOAT_BASE,
            Segment::LocalInt => LOCAL_INT_BASE,
            Segment::LocalFloat => LOCAL_FLOAT_BASE,
            Segment::TempInt => TEMP_INT_BASE,
            Segment::TempFloat => TEMP_FLOAT_BASE,
            Segment::ConstInt => CONST_INT_BASE,
            Segment::ConstFloat => CONST_FLOAT_BASE,
        }
    }

    /// Scalar type stored in this segment (always `int` or `float`).
    pub const fn value_type(self) -> Type {
        match self {
            Segment::GlobalInt
            | Segment::LocalInt
            | Segment::TempInt
            | Segment::ConstInt => Type::Int,
            Segment::GlobalFloat
            | Segment::LocalFloat
            | Segment::TempFloat
            | Segment::ConstFloat => Type::Float,
        }
    }

    pub const fn is_global(self) -> bool {
        matches!(self, Segment::GlobalInt | Segment::GlobalFloat)
    }

    pub const fn is_const(self) -> bool {
        matches!(self, Segment::ConstInt | Segment::ConstFloat)
    }

    /// Recover the segment a virtual address belongs to.
    ///
    /// Returns `None` for addresses outside `[1000, 9000)`.
    pub fn of_address(addr: i64) -> Option<Segment> {
        for seg in Segment::ALL {
            let base = seg.base();
            if addr >= base && addr < base + SEGMENT_SIZE {
                return Some(seg);
            }
        }
        None
    }
}

/// The data type stored at a virtual address, derived purely from its
/// numeric value. Panics are never appropriate here -- callers that might
/// see an out-of-range address should use [`Segment::of_address`] instead.
pub fn type_of_address(addr: i64) -> Option<Type> {
    Segment::of_address(addr).map(Segment::value_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_ranges_are_disjoint_and_cover_the_address_space() {
        let mut seen = std::collections::HashSet::new();
        for seg in Segment::ALL {
            let base = seg.base();
            assert!(seen.insert(base), "duplicate base {base}");
        }
    }

    #[test]
    fn of_address_matches_spec_table() {
        assert_eq!(Segment::of_address(1000), Some(Segment::GlobalInt));
        assert_eq!(Segment::of_address(1999), Some(Segment::GlobalInt));
        assert_eq!(Segment::of_address(2000), Some(Segment::GlobalFloat));
        assert_eq!(Segment::of_address(3000), Some(Segment::LocalInt));
        assert_eq!(Segment::of_address(4000), Some(Segment::LocalFloat));
        assert_eq!(Segment::of_address(5000), Some(Segment::TempInt));
        assert_eq!(Segment::of_address(6000), Some(Segment::TempFloat));
        assert_eq!(Segment::of_address(7000), Some(Segment::ConstInt));
        assert_eq!(Segment::of_address(8000), Some(Segment::ConstFloat));
        assert_eq!(Segment::of_address(8999), Some(Segment::ConstFloat));
        assert_eq!(Segment::of_address(9000), None);
        assert_eq!(Segment::of_address(999), None);
    }

    #[test]
    fn value_type_alternates_int_float_per_segment_pair() {
        assert_eq!(Segment::GlobalInt.value_type(), Type::Int);
        assert_eq!(Segment::GlobalFloat.value_type(), Type::Float);
        assert_eq!(Segment::LocalInt.value_type(), Type::Int);
        assert_eq!(Segment::LocalFloat.value_type(), Type::Float);
    }

    #[test]
    fn type_of_address_is_none_out_of_range() {
        assert_eq!(type_of_address(42), None);
        assert_eq!(type_of_address(9000), None);
    }
}
