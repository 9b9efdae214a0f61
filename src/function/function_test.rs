use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::function::{
    Function, FunctionBody, InputParameter, OutputParameter, Signature, Type,
};

struct NameTag(&'static str);

struct Counted {
    drops: Arc<AtomicUsize>,
}

impl FunctionBody for NameTag {
    fn identifier() -> &'static str {
        "Name Tag"
    }
}

impl FunctionBody for Counted {
    fn identifier() -> &'static str {
        "Counted"
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

struct Width(u32);

fn unary_signature() -> Signature {
    let int = Type::new("Integer").with_extension(Width(32)).into_shared();
    let text = Type::new("Text").into_shared();
    Signature::new(
        vec![InputParameter::new("a", int)],
        vec![OutputParameter::new("out", text)],
    )
}

#[test]
fn bodies_are_keyed_by_kind() {
    let function = Function::new("f", unary_signature());
    assert!(!function.has_body::<NameTag>());
    assert!(function.body::<NameTag>().is_none());

    function.add_body(NameTag("first"));
    assert!(function.has_body::<NameTag>());
    assert!(!function.has_body::<Counted>());
    assert_eq!(function.body::<NameTag>().map(|tag| tag.0), Some("first"));
    assert_eq!(function.body_names(), vec!["Name Tag"]);
}

#[test]
#[should_panic(expected = "a Name Tag is already attached")]
fn duplicate_body_kind_panics() {
    let function = Function::new("f", unary_signature());
    function.add_body(NameTag("first"));
    function.add_body(NameTag("second"));
}

#[test]
fn try_add_hands_back_duplicate_kind() {
    let function = Function::new("f", unary_signature());
    assert!(function.try_add_body(NameTag("first")).is_ok());

    let rejected = function.try_add_body(NameTag("second"));
    assert_eq!(rejected.err().map(|tag| tag.0), Some("second"));
    assert_eq!(function.body::<NameTag>().map(|tag| tag.0), Some("first"));
    assert_eq!(function.body_names(), vec!["Name Tag"]);
}

#[test]
fn bodies_are_dropped_with_their_function() {
    let drops = Arc::new(AtomicUsize::new(0));
    let function = Function::new("f", unary_signature()).into_shared();
    function.add_body(Counted {
        drops: Arc::clone(&drops),
    });

    let alias = function.clone();
    drop(function);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(alias);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn signature_extensions_follow_slot_order() {
    let signature = unary_signature();
    let inputs: Vec<Option<u32>> = signature
        .input_extensions::<Width>()
        .into_iter()
        .map(|width| width.map(|w| w.0))
        .collect();
    assert_eq!(inputs, vec![Some(32)]);
    assert!(signature.output_extensions::<Width>()[0].is_none());
    assert_eq!(signature.to_string(), "(a: Integer) -> (out: Text)");
}
