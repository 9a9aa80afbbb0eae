//! The object program: the serializable result of compilation and the
//! sole input the virtual machine needs to run it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// The fixed quadruple opcode alphabet (§3).
///
/// `Assign` serializes as the bare `"="` to match the object file format
/// documented in the spec; every other variant serializes as its shouting
/// mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "PLUS")]
    Plus,
    #[serde(rename = "MINUS")]
    Minus,
    #[serde(rename = "MUL")]
    Mul,
    #[serde(rename = "DIV")]
    Div,
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "NEQ")]
    Neq,
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "GOTO")]
    Goto,
    #[serde(rename = "GOTOF")]
    GotoF,
    #[serde(rename = "ERA")]
    Era,
    #[serde(rename = "PARAM")]
    Param,
    #[serde(rename = "GOSUB")]
    Gosub,
    #[serde(rename = "RETURN")]
    Return,
    #[serde(rename = "ENDFUNC")]
    EndFunc,
    #[serde(rename = "END")]
    End,
    #[serde(rename = "PRINT")]
    Print,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Op::Plus => "PLUS",
            Op::Minus => "MINUS",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Gt => "GT",
            Op::Lt => "LT",
            Op::Neq => "NEQ",
            Op::Assign => "=",
            Op::Goto => "GOTO",
            Op::GotoF => "GOTOF",
            Op::Era => "ERA",
            Op::Param => "PARAM",
            Op::Gosub => "GOSUB",
            Op::Return => "RETURN",
            Op::EndFunc => "ENDFUNC",
            Op::End => "END",
            Op::Print => "PRINT",
        };
        write!(f, "{s}")
    }
}

/// One quadruple field: a virtual address, an instruction index, a
/// function/immediate-string, or absent (⊥).
///
/// Serializes untagged so the wire format matches `int | string | null`
/// exactly as specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuadArg {
    /// A virtual address or a quadruple index (both are plain integers).
    Num(i64),
    /// A function name or an immediate string (e.g. a `print` literal).
    Name(String),
    /// ⊥ -- field not used by this opcode.
    None,
}

impl QuadArg {
    pub fn as_num(&self) -> Option<i64> {
        match self {
            QuadArg::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            QuadArg::Name(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, QuadArg::None)
    }
}

impl From<i64> for QuadArg {
    fn from(n: i64) -> Self {
        QuadArg::Num(n)
    }
}

impl From<String> for QuadArg {
    fn from(s: String) -> Self {
        QuadArg::Name(s)
    }
}

impl From<&str> for QuadArg {
    fn from(s: &str) -> Self {
        QuadArg::Name(s.to_string())
    }
}

impl<T: Into<QuadArg>> From<Option<T>> for QuadArg {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => QuadArg::None,
        }
    }
}

/// A four-address instruction: `(op, arg1, arg2, result)`.
///
/// Serialized as a plain JSON array of four elements, matching §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quadruple(pub Op, pub QuadArg, pub QuadArg, pub QuadArg);

impl Quadruple {
    pub fn new(op: Op, arg1: impl Into<QuadArg>, arg2: impl Into<QuadArg>, result: impl Into<QuadArg>) -> Self {
        Quadruple(op, arg1.into(), arg2.into(), result.into())
    }

    pub fn op(&self) -> Op {
        self.0
    }
    pub fn arg1(&self) -> &QuadArg {
        &self.1
    }
    pub fn arg2(&self) -> &QuadArg {
        &self.2
    }
    pub fn result(&self) -> &QuadArg {
        &self.3
    }
}

/// A numeric constant, canonicalized by value *and* type: `1` (int) and
/// `1.0` (float) are distinct constants living in distinct segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Int(i64),
    Float(f64),
}

/// A single declared parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// Per-function memory consumption, used by the VM to size activation
/// records without hashing on every cell access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    pub local_int: usize,
    pub local_float: usize,
    pub temp_int: usize,
    pub temp_float: usize,
    pub params_int: usize,
    pub params_float: usize,
}

/// Everything the VM needs to know about a function to call it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub return_type: Type,
    pub quad_start: i64,
    pub return_address: Option<i64>,
    pub params: Vec<Param>,
    pub resources: Resources,
}

/// The complete output of compilation: quadruples, interned constants,
/// and function descriptors. This is the only artifact the VM consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectProgram {
    pub program_name: String,
    pub quadruples: Vec<Quadruple>,
    /// Keyed by virtual address. `serde_json` serializes integer map keys
    /// as decimal strings and parses them back on load, which is exactly
    /// the wire format §6 specifies.
    pub constants: HashMap<i64, ConstantValue>,
    pub functions: HashMap<String, FunctionDescriptor>,
}

impl ObjectProgram {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_serializes_to_spec_mnemonics() {
        assert_eq!(serde_json::to_string(&Op::Plus).unwrap(), "\"PLUS\"");
        assert_eq!(serde_json::to_string(&Op::Assign).unwrap(), "\"=\"");
        assert_eq!(serde_json::to_string(&Op::GotoF).unwrap(), "\"GOTOF\"");
    }

    #[test]
    fn quadruple_round_trips_through_json_as_an_array() {
        let q = Quadruple::new(Op::Plus, 5000i64, 5001i64, 5002i64);
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, r#"["PLUS",5000,5001,5002]"#);
        let back: Quadruple = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn quad_arg_none_serializes_to_null() {
        let q = Quadruple::new(Op::Goto, QuadArg::None, QuadArg::None, 3i64);
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, r#"["GOTO",null,null,3]"#);
    }

    #[test]
    fn constant_keys_round_trip_as_decimal_strings() {
        let mut prog = ObjectProgram {
            program_name: "P".to_string(),
            ..Default::default()
        };
        prog.constants.insert(7000, ConstantValue::Int(14));
        let json = serde_json::to_string(&prog).unwrap();
        assert!(json.contains("\"7000\":14"));
        let back = ObjectProgram::from_json(&json).unwrap();
        assert_eq!(back.constants.get(&7000), Some(&ConstantValue::Int(14)));
    }

    #[test]
    fn int_and_float_constants_stay_distinct() {
        let a = ConstantValue::Int(1);
        let b = ConstantValue::Float(1.0);
        assert_ne!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
