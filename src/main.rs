//! hashin - evaluate an IN filter over a column of values
//!
//! Candidates and probe values are literals; `NULL` is accepted anywhere and
//! a `::type` suffix (for example `5::int16`) overrides the column type of a
//! single literal.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use hashin::access::{DataType, Value};
use hashin::config::EngineConfig;
use hashin::engine::{Engine, ExecutionResult};
use hashin::executor::ColumnInfo;
use hashin::expression::Expression;
use hashin::planner::PlanNode;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Candidate list of the IN predicate, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    candidates: Vec<String>,

    /// Values of the probed column, one row each, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    values: Vec<String>,

    /// Type of the probed column
    #[arg(short = 't', long, value_enum, default_value = "int32")]
    column_type: ColumnType,

    /// Use NOT IN instead of IN
    #[arg(short, long)]
    negate: bool,

    /// Keep the scanning IN predicate
    #[arg(long)]
    no_hash_in: bool,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum ColumnType {
    Boolean,
    Int16,
    Int32,
    Int64,
    Float64,
    Varchar,
}

impl From<ColumnType> for DataType {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Int16 => DataType::Int16,
            ColumnType::Int32 => DataType::Int32,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Varchar => DataType::Varchar,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if args.no_hash_in {
        config.optimizer.enable_hash_in = false;
    }
    info!("Engine configuration: {:?}", config);

    let column_type = args.column_type;
    let rows = args
        .values
        .iter()
        .map(|text| parse_literal(text, column_type).map(|v| vec![Expression::literal(v)]))
        .collect::<Result<Vec<_>>>()?;
    let candidates = args
        .candidates
        .iter()
        .map(|text| parse_literal(text, column_type).map(Expression::literal))
        .collect::<Result<Vec<_>>>()?;

    let x = Expression::column_with_name(0, "x", column_type.into());
    let predicate = if args.negate {
        Expression::not_in(x, candidates)
    } else {
        Expression::in_list(x, candidates)
    };
    let plan = PlanNode::filter(
        PlanNode::values(vec![ColumnInfo::new("x", column_type.into())], rows),
        predicate,
    );

    let engine = Engine::new(config);
    println!("{}", engine.optimize(plan.clone())?.plan.explain(0));

    match engine.execute(plan)? {
        ExecutionResult::Rows { schema, rows } => {
            let header: Vec<_> = schema.iter().map(|c| c.name.as_str()).collect();
            println!("{}", header.join(" | "));
            for row in &rows {
                let cells: Vec<_> = row.iter().map(Value::to_string).collect();
                println!("{}", cells.join(" | "));
            }
            println!("({} rows)", rows.len());
        }
        ExecutionResult::TableCreated(name) => println!("CREATE TABLE {}", name),
    }

    Ok(())
}

/// Parse a command line literal, honoring `NULL` and a `::type` suffix.
fn parse_literal(text: &str, column_type: ColumnType) -> Result<Value> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }

    let (body, ty) = text
        .rsplit_once("::")
        .and_then(|(body, suffix)| Some((body, ColumnType::from_str(suffix, true).ok()?)))
        .unwrap_or((text, column_type));

    let invalid = || format!("Invalid {:?} literal '{}'", ty, body);
    Ok(match ty {
        ColumnType::Boolean => match body.to_ascii_lowercase().as_str() {
            "true" | "t" => Value::Boolean(true),
            "false" | "f" => Value::Boolean(false),
            _ => bail!(invalid()),
        },
        ColumnType::Int16 => Value::Int16(body.parse().with_context(invalid)?),
        ColumnType::Int32 => Value::Int32(body.parse().with_context(invalid)?),
        ColumnType::Int64 => Value::Int64(body.parse().with_context(invalid)?),
        ColumnType::Float64 => Value::Float64(body.parse().with_context(invalid)?),
        ColumnType::Varchar => Value::String(body.to_string()),
    })
}
