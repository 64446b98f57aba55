use super::{Signature, SignatureBuf};

#[test]
fn basic_types_validate() {
    assert!(Signature::new(b"y").is_ok());
    assert!(Signature::new(b"yvs").is_ok());
    assert!(Signature::new(b"").is_ok());
}

#[test]
fn rejects_unknown_type_code() {
    assert!(Signature::new(b"z").is_err());
}

#[test]
fn rejects_unbalanced_struct() {
    assert!(Signature::new(b"(a)").is_err());
    assert!(Signature::new(b"(i").is_err());
    assert!(Signature::new(b"i)").is_err());
}

#[test]
fn rejects_array_with_no_element_type() {
    assert!(Signature::new(b"a").is_err());
}

#[test]
fn dict_entry_must_be_inside_array_with_basic_key() {
    assert!(Signature::new(b"a{sv}").is_ok());
    assert!(Signature::new(b"{sv}").is_err());
    assert!(Signature::new(b"a{(i)v}").is_err());
    assert!(Signature::new(b"a{s}").is_err());
    assert!(Signature::new(b"a{sss}").is_err());
}

#[test]
fn split_yields_top_level_complete_types() {
    let sig = Signature::new(b"yvs").unwrap();
    let parts: Vec<_> = sig.split().map(Signature::as_str).collect();
    assert_eq!(parts, ["y", "v", "s"]);

    let sig = Signature::new(b"(yv)s").unwrap();
    let parts: Vec<_> = sig.split().map(Signature::as_str).collect();
    assert_eq!(parts, ["(yv)", "s"]);

    // The classic bug: splitting character by character would mis-parse
    // this as "(", "a", "(", "i", "i", ")", ")".
    let sig = Signature::new(b"(a(ii))").unwrap();
    let parts: Vec<_> = sig.split().map(Signature::as_str).collect();
    assert_eq!(parts, ["(a(ii))"]);
}

#[test]
fn alignment_of_matches_the_wire_table() {
    assert_eq!(Signature::new(b"y").unwrap().alignment_of(), 1);
    assert_eq!(Signature::new(b"n").unwrap().alignment_of(), 2);
    assert_eq!(Signature::new(b"i").unwrap().alignment_of(), 4);
    assert_eq!(Signature::new(b"u").unwrap().alignment_of(), 4);
    assert_eq!(Signature::new(b"x").unwrap().alignment_of(), 8);
    assert_eq!(Signature::new(b"d").unwrap().alignment_of(), 8);
    assert_eq!(Signature::new(b"s").unwrap().alignment_of(), 4);
    assert_eq!(Signature::new(b"g").unwrap().alignment_of(), 1);
    assert_eq!(Signature::new(b"a{sv}").unwrap().alignment_of(), 4);
    assert_eq!(Signature::new(b"(yv)").unwrap().alignment_of(), 8);
    assert_eq!(Signature::new(b"v").unwrap().alignment_of(), 1);
}

#[test]
fn array_element_and_struct_fields() {
    let sig = Signature::new(b"aai").unwrap();
    assert_eq!(sig.array_element().as_str(), "ai");

    let sig = Signature::new(b"(yv)").unwrap();
    assert_eq!(sig.struct_fields().as_str(), "yv");

    let sig = Signature::new(b"a{sv}").unwrap();
    let element = sig.array_element();
    let (key, value) = element.dict_entry_fields();
    assert_eq!(key.as_str(), "s");
    assert_eq!(value.as_str(), "v");
}

#[test]
fn signature_longer_than_255_bytes_is_rejected() {
    let long: Vec<u8> = std::iter::repeat(b'y').take(256).collect();
    assert!(Signature::new(&long).is_err());
}

#[test]
fn owned_signature_derefs_to_borrowed() {
    let owned = SignatureBuf::new(b"a(yv)".to_vec()).unwrap();
    assert_eq!(owned.as_str(), "a(yv)");
    assert_eq!(*owned, *Signature::new(b"a(yv)").unwrap());
}
