//! Turning tokens into something the interpreter can run.

use crate::lexer::Token;
use crate::vars::Variables;
use log::trace;

/// What a line asks the interpreter to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The line started with `$NAME`. Holds the value, if the variable is set.
    PrintVariable(Option<String>),
    /// Run a command; element 0 is the command name.
    Command(Vec<String>),
}

/// Resolve a token sequence against the variable registry.
///
/// Arguments after the first that start with `$` are replaced with the value
/// of the named variable, or with an empty argument when it is unknown or
/// unset. Returns `None` for an empty token sequence.
pub fn construct_invocation(tokens: &[Token<'_>], vars: &Variables) -> Option<Invocation> {
    let (first, rest) = tokens.split_first()?;

    let name = first.text();
    if let Some(var) = name.strip_prefix('$') {
        return Some(Invocation::PrintVariable(vars.lookup(var).map(str::to_owned)));
    }

    let mut argv = Vec::with_capacity(tokens.len());
    argv.push(name.into_owned());
    for token in rest {
        let text = token.text();
        match text.strip_prefix('$') {
            Some(var) => {
                let value = vars.lookup(var).unwrap_or_default();
                trace!("substituted ${var} -> {value:?}");
                argv.push(value.to_owned());
            }
            None => argv.push(text.into_owned()),
        }
    }
    Some(Invocation::Command(argv))
}
