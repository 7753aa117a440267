use pg_shim::prelude::*;

#[test]
fn identifier_slots_compose_into_quoted_sql() {
    let query = compose(
        "SELECT DISTINCT {tile} FROM {index}",
        &[
            ("tile", TemplateArg::ident("col")),
            ("index", TemplateArg::ident(("myschema", "mytable"))),
        ],
    )
    .unwrap();

    assert_eq!(
        query.sql(),
        r#"SELECT DISTINCT "col" FROM "myschema"."mytable""#
    );
    assert!(query.params().is_empty());
}

#[test]
fn value_slots_bind_as_parameters_never_text() {
    let query = compose(
        "SELECT * FROM {t} WHERE name = {name} AND age > {age}",
        &[
            ("t", TemplateArg::ident("users")),
            (
                "name",
                TemplateArg::value(SqlValue::Text("O'Brien; DROP TABLE users".into())),
            ),
            ("age", TemplateArg::value(SqlValue::Int(30))),
        ],
    )
    .unwrap();

    // The hostile text never appears in the SQL; it rides in the params.
    assert_eq!(
        query.sql(),
        r#"SELECT * FROM "users" WHERE name = $1 AND age > $2"#
    );
    assert_eq!(
        query.params(),
        &[
            SqlValue::Text("O'Brien; DROP TABLE users".into()),
            SqlValue::Int(30),
        ]
    );
}

#[test]
fn hostile_identifier_is_neutralized_by_quoting() {
    let query = compose(
        "SELECT {c} FROM t",
        &[("c", TemplateArg::ident(r#"a"; DROP TABLE t; --"#))],
    )
    .unwrap();

    assert_eq!(query.sql(), r#"SELECT "a""; DROP TABLE t; --" FROM t"#);
}

#[test]
fn missing_key_fails_without_any_database_work() {
    let err = compose(
        "SELECT DISTINCT {tile} FROM {index}",
        &[("tile", TemplateArg::ident("col"))],
    )
    .unwrap_err();

    match err {
        PgShimError::TemplateMismatch { missing, unused } => {
            assert_eq!(missing, vec!["index".to_string()]);
            assert!(unused.is_empty());
        }
        other => panic!("expected TemplateMismatch, got {other:?}"),
    }
}

#[test]
fn extra_key_is_reported_as_unused() {
    let err = compose(
        "SELECT {a}",
        &[
            ("a", TemplateArg::ident("x")),
            ("stray", TemplateArg::value(SqlValue::Int(1))),
        ],
    )
    .unwrap_err();

    match err {
        PgShimError::TemplateMismatch { missing, unused } => {
            assert!(missing.is_empty());
            assert_eq!(unused, vec!["stray".to_string()]);
        }
        other => panic!("expected TemplateMismatch, got {other:?}"),
    }
}

#[test]
fn repeated_placeholder_keeps_one_parameter() {
    let query = compose(
        "SELECT * FROM t WHERE a = {v} OR b = {v}",
        &[("v", TemplateArg::value(SqlValue::Text("x".into())))],
    )
    .unwrap();

    assert_eq!(query.sql(), "SELECT * FROM t WHERE a = $1 OR b = $1");
    assert_eq!(query.params().len(), 1);
}

#[test]
fn composed_query_displays_its_sql() {
    let query = compose("SELECT {c} FROM t", &[("c", TemplateArg::ident("col"))]).unwrap();
    assert_eq!(query.to_string(), r#"SELECT "col" FROM t"#);
}
