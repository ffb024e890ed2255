//! S-expression rendering of formulas.
//!
//! With a registry, atoms print by name: proposition `x` of slot 1 is
//! `x.1` and term equality on `y` is `(EQ y)`. Without one (or for ids the
//! registry does not know) atoms print by raw id as `p3.1` and `(EQ t2)`.
//!
//! # Example
//!
//! ```
//! use hyperwatch_foundation::{ValueKind, VarRegistry};
//! use hyperwatch_language::{Formula, render_with_registry};
//!
//! let mut registry = VarRegistry::new();
//! let x = registry.add_term("x", ValueKind::Scalar).unwrap();
//!
//! let f = Formula::once_past(Formula::term_eq(x));
//! assert_eq!(render_with_registry(&f, &registry), "(F- (EQ x))");
//! ```

use std::fmt::Write;

use hyperwatch_foundation::VarRegistry;

use crate::formula::Formula;

/// Renders a formula using raw ids.
#[must_use]
pub fn render(formula: &Formula) -> String {
    let mut out = String::new();
    write_formula(&mut out, formula, None);
    out
}

/// Renders a formula using the names declared in `registry`.
#[must_use]
pub fn render_with_registry(formula: &Formula, registry: &VarRegistry) -> String {
    let mut out = String::new();
    write_formula(&mut out, formula, Some(registry));
    out
}

// Writing into a String cannot fail.
fn write_formula(out: &mut String, formula: &Formula, registry: Option<&VarRegistry>) {
    match formula {
        Formula::Prop { id, slot } => match registry.and_then(|r| r.prop_name(*id)) {
            Some(name) => {
                let _ = write!(out, "{name}.{slot}");
            }
            None => {
                let _ = write!(out, "p{}.{slot}", id.index());
            }
        },
        Formula::TermEq(id) => match registry.and_then(|r| r.term_name(*id)) {
            Some(name) => {
                let _ = write!(out, "(EQ {name})");
            }
            None => {
                let _ = write!(out, "(EQ t{})", id.index());
            }
        },
        _ => {
            out.push('(');
            out.push_str(formula.operator());
            for child in formula.children() {
                out.push(' ');
                write_formula(out, child, registry);
            }
            out.push(')');
        }
    }
}
