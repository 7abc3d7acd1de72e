use anyhow::Result;
use hashin::access::{DataType, Value};
use hashin::catalog::CatalogError;
use hashin::config::{EngineConfig, OptimizerConfig};
use hashin::engine::{Engine, ExecutionResult};
use hashin::executor::{ColumnInfo, ErrorHandlerFn};
use hashin::expression::{
    evaluate_expression, Expression, ExpressionError, HashInList, InList, MembershipIndex, Subquery,
};
use hashin::optimizer::{ApplyHashIn, OptimizerError, OptimizerRule};
use hashin::planner::PlanNode;
use hashin::sql::ast::{
    self, ColumnConstraint, ColumnDefinition, CreateTableStatement, IndexDefinition,
};
use std::sync::{Arc, Mutex};

fn int(v: i32) -> Expression {
    Expression::literal(Value::Int32(v))
}

fn null() -> Expression {
    Expression::literal(Value::Null)
}

fn x() -> Expression {
    Expression::column_with_name(0, "x", DataType::Int32)
}

fn y() -> Expression {
    Expression::column_with_name(1, "y", DataType::Int32)
}

/// Evaluate `left IN right` both by scanning and through the hash index
fn evaluate_both(left: Expression, right: Expression, row: &[Value]) -> Result<(Value, Value)> {
    let baseline = Expression::InList(InList::new(left.clone(), right.clone()));
    let hashed = Expression::HashInList(HashInList::try_new(left, right)?);
    Ok((
        evaluate_expression(&baseline, row)?,
        evaluate_expression(&hashed, row)?,
    ))
}

fn column_x(values: &[Value]) -> PlanNode {
    PlanNode::values(
        vec![ColumnInfo::new("x", DataType::Int32)],
        values
            .iter()
            .map(|v| vec![Expression::literal(v.clone())])
            .collect(),
    )
}

fn rows(result: ExecutionResult) -> Vec<Vec<Value>> {
    match result {
        ExecutionResult::Rows { rows, .. } => rows,
        ExecutionResult::TableCreated(name) => panic!("unexpected CREATE TABLE {}", name),
    }
}

#[test]
fn test_match_is_true() -> Result<()> {
    let (baseline, hashed) =
        evaluate_both(x(), Expression::tuple(vec![int(1), int(2), int(3)]), &[Value::Int32(2)])?;
    assert_eq!(baseline, Value::Boolean(true));
    assert_eq!(hashed, Value::Boolean(true));
    Ok(())
}

#[test]
fn test_miss_without_null_candidate_is_false() -> Result<()> {
    let (baseline, hashed) =
        evaluate_both(x(), Expression::tuple(vec![int(1), int(2), int(3)]), &[Value::Int32(9)])?;
    assert_eq!(baseline, Value::Boolean(false));
    assert_eq!(hashed, Value::Boolean(false));
    Ok(())
}

#[test]
fn test_miss_with_null_candidate_is_unknown() -> Result<()> {
    let candidates = Expression::tuple(vec![int(1), int(2), null()]);
    let (baseline, hashed) = evaluate_both(x(), candidates.clone(), &[Value::Int32(5)])?;
    assert_eq!(baseline, Value::Null);
    assert_eq!(hashed, Value::Null);

    // A match still wins over the NULL candidate
    let (baseline, hashed) = evaluate_both(x(), candidates, &[Value::Int32(2)])?;
    assert_eq!(baseline, Value::Boolean(true));
    assert_eq!(hashed, Value::Boolean(true));
    Ok(())
}

#[test]
fn test_subquery_left_stays_scanning() -> Result<()> {
    let subquery = Expression::Subquery(Subquery::new(
        "SELECT max(x) FROM t",
        DataType::Int32,
        vec![Value::Int32(2)],
    ));
    let plan = PlanNode::filter(
        column_x(&[Value::Int32(1)]),
        Expression::in_list(subquery, vec![int(1), int(2)]),
    );

    let engine = Engine::default();
    let optimized = engine.optimize(plan.clone())?;
    assert_eq!(optimized.rules_applied, 0);
    assert!(!optimized.plan.explain(0).contains("HASH IN"));

    // The subquery yields 2, so every row passes
    assert_eq!(rows(engine.execute(plan)?), vec![vec![Value::Int32(1)]]);
    Ok(())
}

#[test]
fn test_row_value_membership() -> Result<()> {
    let left = Expression::tuple(vec![x(), y()]);
    let candidates = Expression::tuple(vec![
        Expression::tuple(vec![int(1), int(2)]),
        Expression::tuple(vec![int(3), int(4)]),
    ]);

    let (baseline, hashed) =
        evaluate_both(left.clone(), candidates.clone(), &[Value::Int32(3), Value::Int32(4)])?;
    assert_eq!(baseline, Value::Boolean(true));
    assert_eq!(hashed, Value::Boolean(true));

    let (baseline, hashed) =
        evaluate_both(left.clone(), candidates, &[Value::Int32(4), Value::Int32(3)])?;
    assert_eq!(baseline, Value::Boolean(false));
    assert_eq!(hashed, Value::Boolean(false));

    // A candidate with the wrong number of columns is rejected
    let bad = Expression::tuple(vec![Expression::tuple(vec![int(1), int(2), int(3)])]);
    assert!(matches!(
        HashInList::try_new(left.clone(), bad.clone()),
        Err(ExpressionError::ArityMismatch { expected: 2, actual: 3, .. })
    ));
    let baseline = Expression::InList(InList::new(left, bad));
    assert!(matches!(
        evaluate_expression(&baseline, &[Value::Int32(1), Value::Int32(2)]),
        Err(ExpressionError::ArityMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_non_literal_candidate_keeps_scan() -> Result<()> {
    let candidates = vec![int(1), Expression::column_with_name(0, "x", DataType::Int32)];
    assert!(MembershipIndex::build(&Expression::tuple(candidates.clone()), &DataType::Int32).is_err());

    let plan = PlanNode::filter(
        column_x(&[Value::Int32(1), Value::Int32(7)]),
        Expression::in_list(x(), candidates),
    );
    let result = ApplyHashIn::new().apply(plan.clone())?;
    assert!(!result.changed);

    // x IN (1, x) holds for every non-NULL x
    let found = rows(Engine::default().execute(plan)?);
    assert_eq!(found, vec![vec![Value::Int32(1)], vec![Value::Int32(7)]]);
    Ok(())
}

#[test]
fn test_mixed_integer_widths_match() -> Result<()> {
    let left = Expression::column_with_name(0, "x", DataType::Int64);
    let candidates = Expression::tuple(vec![
        Expression::literal(Value::Int16(5)),
        Expression::literal(Value::Int32(6)),
    ]);
    let (baseline, hashed) = evaluate_both(left, candidates, &[Value::Int64(5)])?;
    assert_eq!(baseline, Value::Boolean(true));
    assert_eq!(hashed, Value::Boolean(true));
    Ok(())
}

#[test]
fn test_not_in_through_engine() -> Result<()> {
    let data = [Value::Int32(1), Value::Int32(2), Value::Null, Value::Int32(4)];

    for enable_hash_in in [true, false] {
        let engine = Engine::new(EngineConfig {
            optimizer: OptimizerConfig::default().with_hash_in(enable_hash_in),
        });

        let plan = PlanNode::filter(column_x(&data), Expression::not_in(x(), vec![int(2), int(3)]));
        assert_eq!(
            rows(engine.execute(plan)?),
            vec![vec![Value::Int32(1)], vec![Value::Int32(4)]]
        );

        // NOT IN with a NULL candidate never holds
        let plan = PlanNode::filter(column_x(&data), Expression::not_in(x(), vec![int(2), null()]));
        assert!(rows(engine.execute(plan)?).is_empty());
    }
    Ok(())
}

#[test]
fn test_rewrite_is_idempotent() -> Result<()> {
    let plan = PlanNode::projection(
        PlanNode::filter(
            column_x(&[Value::Int32(1)]),
            Expression::or(
                Expression::in_list(x(), vec![int(1), int(2)]),
                Expression::not_in(x(), vec![int(3)]),
            ),
        ),
        vec![(x(), "x".to_string())],
    );

    let rule = ApplyHashIn::new();
    let once = rule.apply(plan)?;
    let twice = rule.apply(once.plan.clone())?;
    assert!(once.changed);
    assert!(!twice.changed);
    assert_eq!(once.plan.explain(0), twice.plan.explain(0));
    Ok(())
}

#[test]
fn test_projection_reports_null_membership() -> Result<()> {
    let plan = PlanNode::projection(
        column_x(&[Value::Int32(1), Value::Int32(5), Value::Null]),
        vec![(
            Expression::in_list(x(), vec![int(1), null()]),
            "hit".to_string(),
        )],
    );
    let result = Engine::default().execute(plan)?;

    let ExecutionResult::Rows { schema, rows } = result else {
        panic!("expected rows");
    };
    assert_eq!(schema, vec![ColumnInfo::new("hit", DataType::Boolean)]);
    assert_eq!(
        rows,
        vec![vec![Value::Boolean(true)], vec![Value::Null], vec![Value::Null]]
    );
    Ok(())
}

#[test]
fn test_error_handler_skips_failed_rows() -> Result<()> {
    let failing = Expression::Subquery(Subquery::new(
        "SELECT x FROM t",
        DataType::Int32,
        vec![Value::Int32(1), Value::Int32(2)],
    ));
    let values = PlanNode::values(
        vec![ColumnInfo::new("x", DataType::Int32)],
        vec![vec![int(1)], vec![failing], vec![int(2)], vec![int(3)]],
    );

    let errors = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&errors);
    let handler = ErrorHandlerFn::new(move |err| {
        if let Ok(mut errors) = recorder.lock() {
            errors.push(format!("{:#}", err));
        }
    });

    let plan = PlanNode::error_handler(
        PlanNode::filter(values, Expression::in_list(x(), vec![int(1), int(2)])),
        handler,
    );
    let found = rows(Engine::default().execute(plan)?);
    assert_eq!(found, vec![vec![Value::Int32(1)], vec![Value::Int32(2)]]);

    let errors = errors.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Failed to evaluate row 1"));
    Ok(())
}

#[test]
fn test_create_table_validation() -> Result<()> {
    let engine = Engine::default();

    let users = CreateTableStatement::new(
        "users",
        vec![
            ColumnDefinition::new("id", ast::DataType::BigInt)
                .with_constraint(ColumnConstraint::PrimaryKey)
                .with_constraint(ColumnConstraint::AutoIncrement),
            ColumnDefinition::new("email", ast::DataType::Varchar(Some(255))),
        ],
    )
    .with_index(IndexDefinition::new("idx_email", vec!["EMAIL".into()]));
    assert_eq!(
        engine.execute(PlanNode::CreateTable(users.clone()))?,
        ExecutionResult::TableCreated("users".to_string())
    );

    let err = engine.execute(PlanNode::CreateTable(users)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CatalogError>(),
        Some(&CatalogError::TableExists("users".to_string()))
    );

    let bad_index = CreateTableStatement::new(
        "orders",
        vec![ColumnDefinition::new("id", ast::DataType::Int)],
    )
    .with_index(IndexDefinition::new("idx_total", vec!["total".into()]));
    let err = engine.execute(PlanNode::CreateTable(bad_index)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Key column 'total' doesn't exist in table (index idx_total)"
    );

    let with_default = CreateTableStatement::new(
        "orders",
        vec![ColumnDefinition::new("id", ast::DataType::Int)
            .with_constraint(ColumnConstraint::PrimaryKey)
            .with_constraint(ColumnConstraint::AutoIncrement)
            .with_default(Value::Int32(0))],
    );
    let err = engine.execute(PlanNode::CreateTable(with_default)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<OptimizerError>(),
        Some(OptimizerError::InvalidAutoIncrement { column, .. }) if column == "id"
    ));

    let names: Vec<_> = engine
        .catalog()
        .list_tables()
        .iter()
        .map(|t| t.table_name.clone())
        .collect();
    assert_eq!(names, vec!["users"]);
    Ok(())
}

#[test]
fn test_config_controls_rewrite() -> Result<()> {
    let config = EngineConfig::from_json_str(r#"{ "optimizer": { "enable_hash_in": false } }"#)?;
    let engine = Engine::new(config);
    let plan = PlanNode::filter(column_x(&[Value::Int32(1)]), Expression::in_list(x(), vec![int(1)]));

    let optimized = engine.optimize(plan)?;
    assert_eq!(optimized.plan.explain(0), "Filter: (x IN (1))\n  Values: 1 rows (x)");
    Ok(())
}
