//! Method set and dispatch table

use std::collections::HashMap;

macro_rules! builtin_names {
    ($($fn_name:ident => $method:literal),* $(,)?) => {
        &[$($method),*]
    };
}

/// Methods every facade exposes regardless of backend support
pub const BUILTIN_METHODS: &[&str] = for_each_builtin_method!(builtin_names);

/// Ordered, de-duplicated list of method names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    names: Vec<String>,
}

impl Default for MethodSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MethodSet {
    /// Create a set with the built-in methods
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.union(BUILTIN_METHODS.iter().copied());
        set
    }

    /// Create an empty set
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Add names that are not already present, keeping their order
    pub fn union<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !self.contains(name) {
                self.names.push(name.to_string());
            }
        }
    }

    /// Check if a method is in the set
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterate over method names in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Copy names out
    pub fn to_vec(&self) -> Vec<String> {
        self.names.clone()
    }
}

/// How a method call is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Forward to the backend method of the same name, else the default level
    Delegate,
    /// Start a timer (`start`, `time`)
    TimerStart,
    /// Stop a timer and return the elapsed milliseconds (`stop`)
    TimerStop,
    /// Stop a timer and log the duration at `debug` (`timeEnd`)
    TimeEnd,
}

impl Dispatch {
    /// Classify a method name
    pub fn for_method(name: &str) -> Self {
        match name {
            "start" | "time" => Dispatch::TimerStart,
            "stop" => Dispatch::TimerStop,
            "timeEnd" => Dispatch::TimeEnd,
            _ => Dispatch::Delegate,
        }
    }
}

/// Dispatch entries built once from a resolved method set
#[derive(Debug, Clone)]
pub struct DispatchTable {
    methods: MethodSet,
    entries: HashMap<String, Dispatch>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::build(MethodSet::builtin())
    }
}

impl DispatchTable {
    /// Build the table for a method set
    pub fn build(methods: MethodSet) -> Self {
        let entries = methods
            .iter()
            .map(|name| (name.to_string(), Dispatch::for_method(name)))
            .collect();
        Self { methods, entries }
    }

    /// Look up the dispatch entry for a method
    pub fn lookup(&self, name: &str) -> Option<Dispatch> {
        self.entries.get(name).copied()
    }

    /// The method set the table was built from
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }
}
