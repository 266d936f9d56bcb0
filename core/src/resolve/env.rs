//! Flat, append-only symbol tables.
//!
//! There is exactly one namespace for variables: blocks and function bodies do not
//! open scopes, so every `let` anywhere in a program claims a new global slot.
//! Names may repeat; lookups always resolve to the first entry recorded for a name.

use std::fmt;

use rustc_hash::FxHashMap;

/// A declared variable and the global slot it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    pub name: String,
    pub slot: u32,
}

/// A compiled function keyed by `(name, arity)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncEntry {
    pub name: String,
    pub arity: u32,
    /// Absolute offset of the first instruction of the body.
    pub addr: u32,
}

/// A table reached its configured capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFull {
    Variables(usize),
    Strings(usize),
    Functions(usize),
}

impl fmt::Display for TableFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFull::Variables(limit) => write!(f, "too many variables (limit {})", limit),
            TableFull::Strings(limit) => write!(f, "too many strings (limit {})", limit),
            TableFull::Functions(limit) => write!(f, "too many functions (limit {})", limit),
        }
    }
}

impl std::error::Error for TableFull {}

#[derive(Debug, Clone)]
pub struct Environment {
    vars: Vec<VarEntry>,
    // name -> index of the first entry with that name
    first_var: FxHashMap<String, usize>,
    funcs: Vec<FuncEntry>,
    first_func: FxHashMap<String, FxHashMap<u32, usize>>,
    strings: Vec<Vec<u8>>,
    max_vars: usize,
    max_strings: usize,
    max_functions: usize,
}

impl Environment {
    pub fn new(max_vars: usize, max_strings: usize, max_functions: usize) -> Self {
        Self {
            vars: Vec::new(),
            first_var: FxHashMap::default(),
            funcs: Vec::new(),
            first_func: FxHashMap::default(),
            strings: Vec::new(),
            max_vars,
            max_strings,
            max_functions,
        }
    }

    /// Declare a variable, always allocating a fresh slot even if the name exists.
    pub fn add_var(&mut self, name: &str) -> Result<u32, TableFull> {
        if self.vars.len() >= self.max_vars {
            return Err(TableFull::Variables(self.max_vars));
        }
        let slot = self.vars.len() as u32;
        self.first_var.entry(name.to_string()).or_insert(self.vars.len());
        self.vars.push(VarEntry {
            name: name.to_string(),
            slot,
        });
        Ok(slot)
    }

    /// Slot of the first variable declared under `name`.
    pub fn find_var(&self, name: &str) -> Option<u32> {
        self.first_var.get(name).map(|&idx| self.vars[idx].slot)
    }

    pub fn add_func(&mut self, name: &str, arity: u32, addr: u32) -> Result<(), TableFull> {
        if self.funcs.len() >= self.max_functions {
            return Err(TableFull::Functions(self.max_functions));
        }
        self.first_func
            .entry(name.to_string())
            .or_default()
            .entry(arity)
            .or_insert(self.funcs.len());
        self.funcs.push(FuncEntry {
            name: name.to_string(),
            arity,
            addr,
        });
        Ok(())
    }

    /// Entry address of the function registered as `(name, arity)`.
    pub fn find_func(&self, name: &str, arity: u32) -> Option<u32> {
        let idx = self.first_func.get(name)?.get(&arity)?;
        Some(self.funcs[*idx].addr)
    }

    /// Append a literal to the pool. Repeated contents are not merged.
    pub fn add_string(&mut self, bytes: Vec<u8>) -> Result<u32, TableFull> {
        if self.strings.len() >= self.max_strings {
            return Err(TableFull::Strings(self.max_strings));
        }
        self.strings.push(bytes);
        Ok((self.strings.len() - 1) as u32)
    }

    pub fn vars(&self) -> &[VarEntry] {
        &self.vars
    }

    pub fn funcs(&self) -> &[FuncEntry] {
        &self.funcs
    }

    pub fn strings(&self) -> &[Vec<u8>] {
        &self.strings
    }

    pub fn into_strings(self) -> Vec<Vec<u8>> {
        self.strings
    }
}
