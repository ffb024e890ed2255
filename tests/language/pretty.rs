//! Integration tests for s-expression rendering

use hyperwatch_foundation::{PropId, ValueKind, VarId, VarRegistry};
use hyperwatch_language::{Formula, render, render_with_registry};

#[test]
fn raw_ids() {
    assert_eq!(render(&Formula::prop(PropId::new(3), 1)), "p3.1");
    assert_eq!(render(&Formula::term_eq(VarId::new(2))), "(EQ t2)");
}

#[test]
fn operators_wrap_their_operands() {
    let x = PropId::new(0);
    let f = Formula::always_future(Formula::implies(
        Formula::prop(x, 0),
        Formula::prop(x, 1),
    ));
    assert_eq!(render(&f), "(G+ (IMPLIES p0.0 p0.1))");

    let g = Formula::not(Formula::next_future(Formula::or(
        Formula::prop(x, 0),
        Formula::next_past(Formula::term_eq(VarId::new(1))),
    )));
    assert_eq!(render(&g), "(NOT (X+ (OR p0.0 (X- (EQ t1)))))");
}

#[test]
fn registry_names() {
    let mut registry = VarRegistry::new();
    let x = registry.add_prop("x");
    let y = registry.add_term("y", ValueKind::Vector).unwrap();

    let f = Formula::always_future(Formula::implies(
        Formula::prop(x, 0),
        Formula::and(Formula::prop(x, 1), Formula::term_eq(y)),
    ));
    assert_eq!(
        render_with_registry(&f, &registry),
        "(G+ (IMPLIES x.0 (AND x.1 (EQ y))))"
    );
}

#[test]
fn unknown_ids_fall_back_to_raw() {
    let mut registry = VarRegistry::new();
    registry.add_prop("x");

    let f = Formula::and(
        Formula::prop(PropId::new(0), 0),
        Formula::prop(PropId::new(5), 2),
    );
    assert_eq!(render_with_registry(&f, &registry), "(AND x.0 p5.2)");
}

#[test]
fn display_matches_render() {
    let f = Formula::once_past(Formula::term_eq(VarId::new(0)));
    assert_eq!(f.to_string(), render(&f));
    assert_eq!(f.to_string(), "(F- (EQ t0))");
}
