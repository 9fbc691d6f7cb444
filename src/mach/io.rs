use super::Val;
use std::rc::Rc;

/// Command argument group with its values evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub keyword: Option<Rc<str>>,
    pub args: Vec<Val>,
}

/// ## Host capability
///
/// Everything a running program can do to the outside world. Only `print`
/// must be provided; the rest default to an empty line, no value, and
/// no-ops.

pub trait Io {
    fn print(&mut self, text: &str);

    fn input(&mut self, _prompt: Option<&str>) -> String {
        String::new()
    }

    /// Value of a host function. `None` when the name is not known.
    fn func(&mut self, _name: &str, _args: &[Val]) -> Option<Val> {
        None
    }

    fn call(&mut self, _name: &str, _args: &[Val]) {}

    fn cmd(&mut self, _name: &str, _parts: &[Part]) {}
}

impl<T: Io + ?Sized> Io for &mut T {
    fn print(&mut self, text: &str) {
        (**self).print(text)
    }
    fn input(&mut self, prompt: Option<&str>) -> String {
        (**self).input(prompt)
    }
    fn func(&mut self, name: &str, args: &[Val]) -> Option<Val> {
        (**self).func(name, args)
    }
    fn call(&mut self, name: &str, args: &[Val]) {
        (**self).call(name, args)
    }
    fn cmd(&mut self, name: &str, parts: &[Part]) {
        (**self).cmd(name, parts)
    }
}
