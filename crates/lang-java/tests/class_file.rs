mod common;

use classdex_java::ClassFileParser;
use classdex_plugin::{ArtifactParser, MemberKind, ParseError};
use common::{ACC_PRIVATE, ACC_PUBLIC, ClassFileBuilder};

#[test]
fn test_reads_hierarchy_and_tags() {
    let bytes = ClassFileBuilder::class("com.acme.OrderService")
        .extends("com.acme.BaseService")
        .implements("com.acme.Service")
        .implements("java.io.Serializable")
        .tagged("com.acme.Component")
        .build();

    let desc = ClassFileParser::new().parse(&bytes).unwrap();
    assert_eq!(desc.name, "com.acme.OrderService");
    assert_eq!(desc.super_name.as_deref(), Some("com.acme.BaseService"));
    assert_eq!(desc.interfaces, vec!["com.acme.Service", "java.io.Serializable"]);
    assert_eq!(desc.annotations, vec!["com.acme.Component"]);
    assert!(!desc.is_interface);
    assert!(!desc.is_annotation);
}

#[test]
fn test_root_type_has_no_super() {
    let bytes = ClassFileBuilder::class("java.lang.Object").no_super().build();
    let desc = ClassFileParser::new().parse(&bytes).unwrap();
    assert_eq!(desc.super_name, None);
}

#[test]
fn test_annotation_type_flags() {
    let bytes = ClassFileBuilder::annotation("com.acme.Audited")
        .tagged("java.lang.annotation.Inherited")
        .build();

    let desc = ClassFileParser::new().parse(&bytes).unwrap();
    assert!(desc.is_interface);
    assert!(desc.is_annotation);
    assert!(desc.is_inherited_tag());
    assert_eq!(desc.interfaces, vec!["java.lang.annotation.Annotation"]);
}

#[test]
fn test_reads_members() {
    let bytes = ClassFileBuilder::class("com.acme.Repo")
        .field(ACC_PRIVATE, "source", "Ljavax/sql/DataSource;", &["com.acme.Inject"])
        .field(ACC_PUBLIC, "matrix", "[[I", &[])
        .method(
            ACC_PUBLIC,
            "find",
            "(JLjava/lang/String;)Lcom/acme/Order;",
            &["com.acme.Cached"],
        )
        .method(ACC_PRIVATE, "reset", "()V", &[])
        .build();

    let desc = ClassFileParser::new().parse(&bytes).unwrap();

    assert_eq!(desc.fields.len(), 2);
    let source = &desc.fields[0];
    assert_eq!(source.owner, "com.acme.Repo");
    assert_eq!(source.name, "source");
    assert_eq!(source.kind, MemberKind::Field);
    assert_eq!(source.return_type.as_deref(), Some("javax.sql.DataSource"));
    assert_eq!(source.annotations, vec!["com.acme.Inject"]);
    assert!(!source.is_public);
    assert_eq!(desc.fields[1].return_type.as_deref(), Some("int[][]"));
    assert!(desc.fields[1].is_public);

    assert_eq!(desc.methods.len(), 2);
    let find = &desc.methods[0];
    assert_eq!(find.kind, MemberKind::Method);
    assert_eq!(find.parameter_types, vec!["long", "java.lang.String"]);
    assert_eq!(find.return_type.as_deref(), Some("com.acme.Order"));
    assert_eq!(find.annotations, vec!["com.acme.Cached"]);
    assert!(find.is_public);

    let reset = &desc.methods[1];
    assert!(reset.parameter_types.is_empty());
    assert_eq!(reset.return_type.as_deref(), Some("void"));
    assert!(!reset.is_public);
}

#[test]
fn test_truncated_class_is_malformed() {
    let bytes = ClassFileBuilder::class("com.acme.Broken").build();
    let err = ClassFileParser::new()
        .parse(&bytes[..bytes.len() / 2])
        .unwrap_err();
    assert!(matches!(err, ParseError::Malformed(_)));
}
