use data_api_client::prelude::*;

#[test]
fn identifiers() {
    assert_eq!(ident("users").unwrap(), "users");
    assert_eq!(ident("user").unwrap(), "\"user\"");
    assert_eq!(ident("table\"name").unwrap(), "\"table\"\"name\"");
    assert_eq!(ident("\"already\"").unwrap(), "\"\"\"already\"\"\"");
    assert!(matches!(ident(None::<&str>), Err(DataApiError::IdentifierError(_))));
}

#[test]
fn literals() {
    assert_eq!(literal(ParamValue::Null), "NULL");
    assert_eq!(literal("it's"), "'it''s'");
    assert_eq!(literal("a\\b"), "E'a\\\\b'");
    assert_eq!(literal(vec![ParamValue::from("a"), ParamValue::Null]), "('a', NULL)");
    assert_eq!(literal(Vec::<ParamValue>::new()), "()");
}

#[test]
fn building_sql_by_hand() {
    let sql = format_sql(
        "SELECT %I FROM %I WHERE status IN %L",
        &[
            ParamValue::from("order"),
            ParamValue::from("sales"),
            ParamValue::List(vec!["open".into(), "o'k".into()]),
        ],
    )
    .unwrap();
    assert_eq!(sql, "SELECT \"order\" FROM sales WHERE status IN ('open', 'o''k')");
}
