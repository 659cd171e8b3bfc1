// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-module scenarios: TypeCode graphs driving Any marshaling.

use super::*;
use crate::cdr::{CdrInputStream, CdrOutputStream, InputStream, OutputStream};
use std::sync::Arc;
use std::thread;

fn prim(kind: TCKind) -> TypeCode {
    TypeCode::primitive(kind).expect("primitive")
}

fn tree_type() -> TypeCode {
    TypeCode::struct_tc(
        "IDL:demo/Tree:1.0",
        "Tree",
        vec![
            StructMember::new("label", TypeCode::string(0)),
            StructMember::new(
                "children",
                TypeCode::sequence(0, TypeCode::recursive("IDL:demo/Tree:1.0")),
            ),
        ],
    )
}

fn leaf(label: &str) -> Value {
    Value::Struct(vec![Value::String(label.into()), Value::Sequence(vec![])])
}

#[test]
fn test_full_workflow() {
    // 1. Build a type at run time
    let reading = TypeCode::struct_tc(
        "IDL:demo/Reading:1.0",
        "Reading",
        vec![
            StructMember::new("id", prim(TCKind::Short)),
            StructMember::new("location", TypeCode::string(0)),
            StructMember::new("samples", TypeCode::sequence(0, prim(TCKind::Long))),
        ],
    );

    // 2. Insert a value
    let payload = Value::Struct(vec![
        Value::Short(42),
        Value::String("Building A".into()),
        Value::Sequence(vec![Value::Long(1), Value::Long(-2), Value::Long(3)]),
    ]);
    let any = Any::with_value(reading.clone(), payload.clone()).expect("insert");

    // 3. Marshal
    let mut out = CdrOutputStream::new();
    any.write_value(&mut out).expect("write");
    let bytes = out.into_bytes();
    assert!(!bytes.is_empty());

    // 4. Unmarshal against the same type
    let mut decoded = Any::new();
    decoded
        .read_value(&mut CdrInputStream::new(&bytes), reading)
        .expect("read");
    assert_eq!(decoded.value().expect("value"), &payload);
    assert!(decoded.equal(&any));
}

#[test]
fn test_recursive_value_round_trip() {
    let tree = tree_type();
    let value = Value::Struct(vec![
        Value::String("root".into()),
        Value::Sequence(vec![
            leaf("a"),
            Value::Struct(vec![
                Value::String("b".into()),
                Value::Sequence(vec![leaf("b1")]),
            ]),
        ]),
    ]);
    let any = Any::with_value(tree.clone(), value).expect("insert");

    let mut out = CdrOutputStream::new();
    out.write_any(&any).expect("write any");
    let bytes = out.into_bytes();

    let mut input = CdrInputStream::new(&bytes);
    let decoded = input.read_any().expect("read any");
    assert_eq!(input.remaining(), 0);
    assert!(decoded.type_code().equal(&tree));
    assert_eq!(decoded, any);
}

#[test]
fn test_typecode_as_value() {
    let tree = tree_type();
    let mut any = Any::new();
    any.insert_typecode(tree.clone());

    let mut out = CdrOutputStream::new();
    any.write_value(&mut out).expect("write");
    let bytes = out.into_bytes();

    let mut decoded = Any::new();
    decoded
        .read_value(&mut CdrInputStream::new(&bytes), prim(TCKind::TypeCode))
        .expect("read");
    let tc = decoded.extract_typecode().expect("extract");
    assert!(tc.equal(&tree));
    assert!(tc.equivalent(&tree.compact_form()));
}

#[test]
fn test_object_reference_round_trip() {
    let obj = ObjectRef::new(
        "IDL:demo/Echo:1.0",
        vec![TaggedProfile {
            tag: 0,
            data: vec![1, 2, 3, 4, 5],
        }],
    );
    let mut any = Any::new();
    any.insert_object(obj.clone());

    let mut out = CdrOutputStream::new();
    any.write_value(&mut out).expect("write");
    let bytes = out.into_bytes();

    let mut decoded = Any::new();
    decoded
        .read_value(&mut CdrInputStream::new(&bytes), any.type_code())
        .expect("read");
    assert_eq!(decoded.extract_object().expect("extract"), obj);
}

#[test]
fn test_exception_and_enum_members() {
    let color = TypeCode::enum_tc("IDL:demo/Color:1.0", "Color", ["RED", "GREEN", "BLUE"]);
    let failure = TypeCode::exception_tc(
        "IDL:demo/Failure:1.0",
        "Failure",
        vec![
            StructMember::new("code", prim(TCKind::ULong)),
            StructMember::new("color", color),
        ],
    );
    let value = Value::Struct(vec![Value::ULong(7), Value::Enum(2)]);
    let any = Any::with_value(failure.clone(), value.clone()).expect("insert");

    let mut out = CdrOutputStream::new();
    any.write_value(&mut out).expect("write");
    let bytes = out.into_bytes();
    assert_eq!(bytes, vec![7, 0, 0, 0, 2, 0, 0, 0]);

    let mut decoded = Any::new();
    decoded
        .read_value(&mut CdrInputStream::new(&bytes), failure)
        .expect("read");
    assert_eq!(decoded.value().expect("value"), &value);
}

#[test]
fn test_typecodes_shared_across_threads() {
    let tree = Arc::new(tree_type());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                let mut any = Any::new();
                any.insert((*tree).clone(), leaf(&format!("t{}", i)))
                    .expect("insert");
                let long = TypeCode::primitive(TCKind::Long).expect("primitive");
                assert!(tree.equal(&tree_type()));
                long
            })
        })
        .collect();

    let longs: Vec<TypeCode> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();
    for tc in &longs {
        assert!(std::ptr::eq(tc.as_ptr(), longs[0].as_ptr()));
    }
}
