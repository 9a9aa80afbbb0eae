//! Function signatures, entry points and resource counts (§4.5).
//!
//! The program itself is registered under its own name as a void,
//! no-params pseudo-function: this reserves the name against collision
//! and gives the VM a `Resources` record to size `main`'s own activation
//! record from, the same way every other function is sized.

use std::collections::HashMap;

use patito_core::{Resources, Type};

use crate::error::SemanticError;

#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub return_type: Type,
    pub params: Vec<(String, Type)>,
    pub return_address: Option<i64>,
    pub quad_start: Option<i64>,
    pub resources: Resources,
}

pub struct FunctionDirectory {
    functions: HashMap<String, FunctionEntry>,
}

impl FunctionDirectory {
    pub fn new() -> Self {
        FunctionDirectory { functions: HashMap::new() }
    }

    pub fn add_function(&mut self, name: &str, return_type: Type, line: usize) -> Result<(), SemanticError> {
        if self.functions.contains_key(name) {
            return Err(SemanticError::new(line, format!("function '{name}' already declared")));
        }
        self.functions.insert(
            name.to_string(),
            FunctionEntry {
                return_type,
                params: Vec::new(),
                return_address: None,
                quad_start: None,
                resources: Resources::default(),
            },
        );
        Ok(())
    }

    pub fn add_param(&mut self, func: &str, param_name: &str, ty: Type, line: usize) -> Result<(), SemanticError> {
        let entry = self.functions.get_mut(func).expect("function registered before its params");
        if entry.params.iter().any(|(n, _)| n == param_name) {
            return Err(SemanticError::new(line, format!("duplicate parameter '{param_name}' in function '{func}'")));
        }
        entry.params.push((param_name.to_string(), ty));
        Ok(())
    }

    pub fn set_return_address(&mut self, func: &str, addr: i64) {
        self.functions.get_mut(func).expect("function registered").return_address = Some(addr);
    }

    pub fn set_quad_start(&mut self, func: &str, index: i64) {
        self.functions.get_mut(func).expect("function registered").quad_start = Some(index);
    }

    pub fn set_resources(&mut self, func: &str, resources: Resources) {
        self.functions.get_mut(func).expect("function registered").resources = resources;
    }

    pub fn exists(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FunctionEntry)> {
        self.functions.iter()
    }
}

impl Default for FunctionDirectory {
    fn default() -> Self {
        Self::new()
    }
}
