//! Exercises `ClassFile::parse` against hand-assembled class file bytes
//! rather than checked-in compiled fixtures, so the test suite carries no
//! binary blobs.

use slimjre_classfile::{BaseType, ClassFile, ConstValue, ElementValue, FieldType, ReturnType};

mod builder;
use builder::ClassFileBuilder;

#[test]
fn parse_simple_classfile() {
    let mut builder = ClassFileBuilder::new("com/example/Simple", Some("java/lang/Object"));
    builder.field(0, "f", "I");
    builder.method(0, "m", "()V");
    let bytes = builder.build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Simple");
    assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
    assert!(class.signature.is_none());
    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.fields[0].name, "f");
    assert_eq!(class.fields[0].descriptor, "I");

    let field_type = slimjre_classfile::parse_field_descriptor(&class.fields[0].descriptor).unwrap();
    assert_eq!(field_type, FieldType::Base(BaseType::Int));

    let method = class.methods.iter().find(|m| m.name == "m").unwrap();
    let method_descriptor = slimjre_classfile::parse_method_descriptor(&method.descriptor).unwrap();
    assert_eq!(method_descriptor.params.len(), 0);
    assert_eq!(method_descriptor.return_type, ReturnType::Void);
}

#[test]
fn parse_generic_signature_attribute_is_kept_raw() {
    let mut builder = ClassFileBuilder::new("com/example/Generic", Some("java/lang/Object"));
    builder.class_signature("<T:Ljava/lang/Number;>Ljava/lang/Object;");
    builder.field_with_signature(0, "value", "Ljava/lang/Object;", "TT;");
    builder.method_with_signature(0, "id", "(Ljava/lang/Object;)Ljava/lang/Object;", "<U:Ljava/lang/Object;>(TU;)TU;");
    let bytes = builder.build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Generic");
    assert_eq!(class.signature.as_deref(), Some("<T:Ljava/lang/Number;>Ljava/lang/Object;"));

    let field = &class.fields[0];
    assert_eq!(field.name, "value");
    assert_eq!(field.signature.as_deref(), Some("TT;"));

    let method = class.methods.iter().find(|m| m.name == "id").unwrap();
    assert_eq!(method.signature.as_deref(), Some("<U:Ljava/lang/Object;>(TU;)TU;"));
}

#[test]
fn parse_runtime_visible_annotations() {
    let mut builder = ClassFileBuilder::new("com/example/Annotated", Some("java/lang/Object"));
    builder.visible_annotation(
        "Lcom/example/Ann;",
        vec![
            ("value", ElementValue::Const(ConstValue::String("hello".into()))),
            (
                "nums",
                ElementValue::Array(vec![
                    ElementValue::Const(ConstValue::Int(1)),
                    ElementValue::Const(ConstValue::Int(2)),
                ]),
            ),
        ],
    );
    let bytes = builder.build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Annotated");
    assert_eq!(class.runtime_visible_annotations.len(), 1);
    assert!(class.runtime_invisible_annotations.is_empty());

    let ann = &class.runtime_visible_annotations[0];
    assert_eq!(ann.type_descriptor, "Lcom/example/Ann;");
    assert_eq!(ann.type_internal_name.as_deref(), Some("com/example/Ann"));
    assert_eq!(ann.elements.len(), 2);

    let mut elems = ann
        .elements
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect::<std::collections::HashMap<_, _>>();
    assert_eq!(
        elems.remove("value").unwrap(),
        &ElementValue::Const(ConstValue::String("hello".into()))
    );
    assert_eq!(
        elems.remove("nums").unwrap(),
        &ElementValue::Array(vec![
            ElementValue::Const(ConstValue::Int(1)),
            ElementValue::Const(ConstValue::Int(2)),
        ])
    );
}

#[test]
fn parse_runtime_invisible_annotations() {
    let mut builder = ClassFileBuilder::new("com/example/InvisibleAnnotated", Some("java/lang/Object"));
    builder.invisible_annotation(
        "Lcom/example/Ann;",
        vec![("value", ElementValue::Const(ConstValue::String("hello".into())))],
    );
    let bytes = builder.build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/InvisibleAnnotated");
    assert!(class.runtime_visible_annotations.is_empty());
    assert_eq!(class.runtime_invisible_annotations.len(), 1);

    let ann = &class.runtime_invisible_annotations[0];
    assert_eq!(ann.type_descriptor, "Lcom/example/Ann;");
    assert_eq!(ann.type_internal_name.as_deref(), Some("com/example/Ann"));
    assert_eq!(
        ann.elements,
        vec![("value".to_string(), ElementValue::Const(ConstValue::String("hello".into())))]
    );
}

#[test]
fn parse_inner_classes_attribute() {
    let mut builder = ClassFileBuilder::new("com/example/Outer", Some("java/lang/Object"));
    builder.inner_class("com/example/Outer$Inner", Some("com/example/Outer"), Some("Inner"), 0x0001);
    let bytes = builder.build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Outer");
    assert_eq!(class.inner_classes.len(), 1);
    let inner = &class.inner_classes[0];
    assert_eq!(inner.inner_class, "com/example/Outer$Inner");
    assert_eq!(inner.outer_class.as_deref(), Some("com/example/Outer"));
    assert_eq!(inner.inner_name.as_deref(), Some("Inner"));
    assert_eq!(inner.access_flags, 0x0001);
}
