//! The fixed registry of read-only shell variables reachable through `$NAME`.

use std::fmt;

/// Identifier of a shell variable. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Version,
    Host,
    Path,
    Home,
    Pwd,
    Logname,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Version,
        Variable::Host,
        Variable::Path,
        Variable::Home,
        Variable::Pwd,
        Variable::Logname,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variable::Version => "VERSION",
            Variable::Host => "HOST",
            Variable::Path => "PATH",
            Variable::Home => "HOME",
            Variable::Pwd => "PWD",
            Variable::Logname => "LOGNAME",
        }
    }

    /// Exact, case-sensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "VERSION" => Some(Variable::Version),
            "HOST" => Some(Variable::Host),
            "PATH" => Some(Variable::Path),
            "HOME" => Some(Variable::Home),
            "PWD" => Some(Variable::Pwd),
            "LOGNAME" => Some(Variable::Logname),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of every [`Variable`], one slot per identifier.
///
/// `VERSION` is known at compile time; the other slots are filled in once
/// when the session starts and `PWD` is refreshed after each `cd`.
#[derive(Debug, Clone)]
pub struct Variables {
    values: [Option<String>; Variable::ALL.len()],
}

impl Variables {
    pub fn new() -> Self {
        let mut vars = Self {
            values: Default::default(),
        };
        vars.set(Variable::Version, crate::VERSION);
        vars
    }

    pub fn get(&self, var: Variable) -> Option<&str> {
        self.values[var.slot()].as_deref()
    }

    /// Value of the variable called `name`, if it exists and is set.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        Variable::from_name(name).and_then(|var| self.get(var))
    }

    pub(crate) fn set(&mut self, var: Variable, value: impl Into<String>) {
        self.values[var.slot()] = Some(value.into());
    }
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_lookup() {
        for var in Variable::ALL {
            assert_eq!(Variable::from_name(var.name()), Some(var));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive_and_exact() {
        assert_eq!(Variable::from_name("home"), None);
        assert_eq!(Variable::from_name("HOMES"), None);
        assert_eq!(Variable::from_name("HOM"), None);
        assert_eq!(Variable::from_name(""), None);
    }

    #[test]
    fn test_only_version_is_set_initially() {
        let vars = Variables::new();
        assert_eq!(vars.get(Variable::Version), Some(crate::VERSION));
        assert_eq!(vars.lookup("HOME"), None);
        assert_eq!(vars.lookup("PWD"), None);
    }

    #[test]
    fn test_set_overwrites_single_slot() {
        let mut vars = Variables::new();
        vars.set(Variable::Pwd, "/tmp");
        vars.set(Variable::Pwd, "/var");
        assert_eq!(vars.lookup("PWD"), Some("/var"));
        assert_eq!(vars.lookup("HOME"), None);
    }
}
