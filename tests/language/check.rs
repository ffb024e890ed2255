//! Integration tests for scope checks

use hyperwatch_foundation::{PropId, Value, ValueKind, VarId, VarRegistry};
use hyperwatch_language::{Formula, Scope, Signature};
use hyperwatch_storage::TraceStore;

fn registry() -> VarRegistry {
    let mut registry = VarRegistry::new();
    registry.add_prop("req");
    registry.add_term("x", ValueKind::Scalar).unwrap();
    registry
}

// =============================================================================
// Slots
// =============================================================================

#[test]
fn slots_must_be_bound() {
    let f = Formula::prop(PropId::new(0), 2);
    assert!(Scope::new(3).check(&f).is_ok());

    let err = Scope::new(2).check(&f).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("slot 2"));
}

#[test]
fn error_names_the_offending_atom() {
    let f = Formula::always_future(Formula::and(
        Formula::prop(PropId::new(0), 0),
        Formula::prop(PropId::new(1), 4),
    ));
    let err = Scope::new(2).check(&f).unwrap_err();
    let context = err.context.expect("atom frame");
    assert_eq!(context.stack, vec!["p1.4".to_string()]);
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn ids_must_be_declared_in_the_registry() {
    let registry = registry();
    let scope = Scope::new(2).with_registry(&registry);

    assert!(scope.check(&Formula::prop(PropId::new(0), 1)).is_ok());
    assert!(scope.check(&Formula::term_eq(VarId::new(0))).is_ok());

    let err = scope.check(&Formula::prop(PropId::new(1), 0)).unwrap_err();
    assert!(err.to_string().contains("not declared in registry"));
    assert!(scope
        .check(&Formula::term_eq(VarId::new(1)))
        .unwrap_err()
        .is_configuration());
}

#[test]
fn ids_must_exist_in_every_trace() {
    let wide = TraceStore::new(2, 1);
    let narrow = TraceStore::new(1, 1);
    let scope = Scope::new(2).with_trace(0, &wide).with_trace(1, &narrow);

    assert!(scope.check(&Formula::prop(PropId::new(0), 0)).is_ok());
    let err = scope.check(&Formula::prop(PropId::new(1), 0)).unwrap_err();
    assert!(err.to_string().contains("trace slot 1"));
}

#[test]
fn compared_terms_must_agree_in_kind() {
    let mut a = TraceStore::new(0, 1);
    a.update_term(VarId::new(0), 0, Value::from(1)).unwrap();
    let mut b = TraceStore::new(0, 1);
    b.update_term(VarId::new(0), 0, Value::from(vec![1])).unwrap();
    let unwritten = TraceStore::new(0, 1);

    let eq = Formula::term_eq(VarId::new(0));
    assert!(Scope::new(2)
        .with_trace(0, &a)
        .with_trace(1, &unwritten)
        .check(&eq)
        .is_ok());

    let err = Scope::new(2)
        .with_trace(0, &a)
        .with_trace(1, &b)
        .check(&eq)
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("conflicting kinds"));
}

#[test]
fn registry_kind_conflicts_with_trace_kind() {
    let registry = registry();
    let mut trace = TraceStore::new(1, 1);
    trace
        .update_term(VarId::new(0), 0, Value::from(vec![2, 3]))
        .unwrap();

    let err = Scope::new(1)
        .with_registry(&registry)
        .with_trace(0, &trace)
        .check(&Formula::term_eq(VarId::new(0)))
        .unwrap_err();
    assert!(err.to_string().contains("scalar in registry"));
}

// =============================================================================
// Custom Signatures
// =============================================================================

struct OnlyProps(usize);

impl Signature for OnlyProps {
    fn has_prop(&self, id: PropId) -> bool {
        (id.index() as usize) < self.0
    }

    fn has_term(&self, _id: VarId) -> bool {
        false
    }

    fn term_kind(&self, _id: VarId) -> Option<ValueKind> {
        None
    }
}

#[test]
fn custom_sources_take_part_in_checks() {
    let source = OnlyProps(1);
    let scope = Scope::new(1).with_source("netlist", &source);
    assert_eq!(scope.arity(), 1);

    assert!(scope.check(&Formula::prop(PropId::new(0), 0)).is_ok());
    let err = scope.check(&Formula::term_eq(VarId::new(0))).unwrap_err();
    assert!(err.to_string().contains("not declared in netlist"));
}
