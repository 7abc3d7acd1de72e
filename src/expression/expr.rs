//! Expression AST definitions.

use crate::access::{DataType, Value};
use crate::expression::canonical::MembershipIndex;
use crate::expression::hash_in_list::{is_hashable_operand, HashInList};
use crate::expression::in_list::{BinaryOperands, InList};
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::{ExpressionError, ExpressionResult};
use std::fmt;

/// Column reference in an expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Column index in the row (0-based)
    pub index: usize,
    /// Optional column name for debugging/display
    pub name: Option<String>,
    /// Declared type of the referenced column
    pub data_type: DataType,
}

impl ColumnRef {
    pub fn new(index: usize, data_type: DataType) -> Self {
        Self {
            index,
            name: None,
            data_type,
        }
    }

    pub fn with_name(index: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            index,
            name: Some(name.into()),
            data_type,
        }
    }
}

/// Literal value in an expression, known without evaluating any row
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub data_type: DataType,
}

impl Literal {
    /// Create a literal whose type is the type of `value`
    pub fn new(value: Value) -> Self {
        let data_type = value.data_type();
        Self { value, data_type }
    }

    /// Create a literal with an explicit type, e.g. a NULL of a known column type
    pub fn typed(value: Value, data_type: DataType) -> Self {
        Self { value, data_type }
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn bool(val: bool) -> Self {
        Self::new(Value::Boolean(val))
    }

    pub fn int32(val: i32) -> Self {
        Self::new(Value::Int32(val))
    }

    pub fn int64(val: i64) -> Self {
        Self::new(Value::Int64(val))
    }

    pub fn string(val: impl Into<String>) -> Self {
        Self::new(Value::String(val.into()))
    }
}

/// Uncorrelated scalar subquery whose result has already been materialized
/// by the planner. It is never literal-reducible from the optimizer's point
/// of view.
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    pub query: String,
    pub data_type: DataType,
    pub result: Vec<Value>,
}

impl Subquery {
    pub fn new(query: impl Into<String>, data_type: DataType, result: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            data_type,
            result,
        }
    }

    pub fn evaluate(&self) -> ExpressionResult<Value> {
        match self.result.as_slice() {
            [] => Ok(Value::Null),
            [value] => Ok(value.clone()),
            rows => Err(ExpressionError::SubqueryCardinality {
                query: self.query.clone(),
                rows: rows.len(),
            }),
        }
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal constant value
    Literal(Literal),

    /// Column reference
    ColumnRef(ColumnRef),

    /// Row value; also the candidate list of an IN predicate
    Tuple(Vec<Expression>),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Scalar function call
    FunctionCall { name: String, args: Vec<Expression> },

    /// Scalar subquery
    Subquery(Subquery),

    /// Membership test evaluated by scanning the candidates
    InList(InList),

    /// Membership test evaluated by probing a prebuilt index
    HashInList(HashInList),
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expression::Literal(Literal::new(value))
    }

    /// Create a column reference expression
    pub fn column(index: usize, data_type: DataType) -> Self {
        Expression::ColumnRef(ColumnRef::new(index, data_type))
    }

    /// Create a column reference with name
    pub fn column_with_name(index: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Expression::ColumnRef(ColumnRef::with_name(index, name, data_type))
    }

    /// Create a row value expression
    pub fn tuple(elements: Vec<Expression>) -> Self {
        Expression::Tuple(elements)
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a unary operation expression
    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create an AND expression
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::And, left, right)
    }

    /// Create an OR expression
    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Or, left, right)
    }

    /// Create a NOT expression
    pub fn not_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    /// Create an equality expression
    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    /// Create a not-equal expression
    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ne, left, right)
    }

    /// Create a less-than expression
    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    /// Create a greater-than expression
    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    /// Create an IS NULL expression
    pub fn is_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNull, operand)
    }

    /// Create an IS NOT NULL expression
    pub fn is_not_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNotNull, operand)
    }

    /// Create a function call expression
    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Create `left IN (candidates...)`
    pub fn in_list(left: Expression, candidates: Vec<Expression>) -> Self {
        Expression::InList(InList::new(left, Expression::Tuple(candidates)))
    }

    /// Create `left NOT IN (candidates...)`
    pub fn not_in(left: Expression, candidates: Vec<Expression>) -> Self {
        Self::not_expr(Self::in_list(left, candidates))
    }

    /// Declared type of the value this expression produces
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(lit) => lit.data_type.clone(),
            Expression::ColumnRef(col) => col.data_type.clone(),
            Expression::Tuple(elements) => {
                DataType::Tuple(elements.iter().map(|e| e.data_type()).collect())
            }
            Expression::FunctionCall { name, args } => function_type(name, args),
            Expression::Subquery(subquery) => subquery.data_type.clone(),
            Expression::BinaryOp { .. }
            | Expression::UnaryOp { .. }
            | Expression::InList(_)
            | Expression::HashInList(_) => DataType::Boolean,
        }
    }

    /// Direct sub-expressions, in order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::ColumnRef(_) | Expression::Subquery(_) => vec![],
            Expression::Tuple(elements) => elements.iter().collect(),
            Expression::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::UnaryOp { operand, .. } => vec![operand.as_ref()],
            Expression::FunctionCall { args, .. } => args.iter().collect(),
            Expression::InList(in_list) => vec![in_list.left(), in_list.right()],
            Expression::HashInList(hash_in) => vec![hash_in.left(), hash_in.right()],
        }
    }

    /// Rebuild this node with new children.
    ///
    /// A hashed membership test whose operands change gets a fresh index. It
    /// degrades to a scanning `InList` if the new left operand cannot be
    /// hashed or the new candidates cannot be indexed.
    pub fn with_children(&self, children: Vec<Expression>) -> ExpressionResult<Expression> {
        let expected = self.children().len();
        let actual = children.len();
        let count_error = || ExpressionError::InvalidChildrenCount {
            node: self.to_string(),
            expected,
            actual,
        };
        if actual != expected {
            return Err(count_error());
        }

        let mut children = children.into_iter();
        let mut next = || children.next().ok_or_else(count_error);

        Ok(match self {
            Expression::Literal(_) | Expression::ColumnRef(_) | Expression::Subquery(_) => {
                self.clone()
            }
            Expression::Tuple(elements) => Expression::Tuple(
                (0..elements.len())
                    .map(|_| next())
                    .collect::<ExpressionResult<Vec<_>>>()?,
            ),
            Expression::BinaryOp { op, .. } => Expression::binary_op(*op, next()?, next()?),
            Expression::UnaryOp { op, .. } => Expression::unary_op(*op, next()?),
            Expression::FunctionCall { name, args } => Expression::FunctionCall {
                name: name.clone(),
                args: (0..args.len())
                    .map(|_| next())
                    .collect::<ExpressionResult<Vec<_>>>()?,
            },
            Expression::InList(_) => Expression::InList(InList::new(next()?, next()?)),
            Expression::HashInList(_) => {
                let in_list = InList::new(next()?, next()?);
                if !is_hashable_operand(in_list.left()) {
                    return Ok(Expression::InList(in_list));
                }
                match MembershipIndex::build(in_list.right(), &in_list.left().data_type()) {
                    Ok(index) => Expression::HashInList(HashInList::new(in_list, index)),
                    Err(_) => Expression::InList(in_list),
                }
            }
        })
    }

    /// Rewrite the tree bottom-up: children first, then `f` on the node itself.
    ///
    /// Nodes whose children come back unchanged are not rebuilt.
    pub fn transform_up<F>(self, f: &mut F) -> ExpressionResult<Expression>
    where
        F: FnMut(Expression) -> ExpressionResult<Expression>,
    {
        let rebuilt = {
            let children = self.children();
            if children.is_empty() {
                None
            } else {
                let mut new_children = Vec::with_capacity(children.len());
                for child in &children {
                    new_children.push((*child).clone().transform_up(f)?);
                }
                let changed = new_children
                    .iter()
                    .zip(children.iter())
                    .any(|(new, old)| new != *old);
                changed.then_some(new_children)
            }
        };

        let node = match rebuilt {
            Some(children) => self.with_children(children)?,
            None => self,
        };
        f(node)
    }
}

fn function_type(name: &str, args: &[Expression]) -> DataType {
    match name.to_ascii_lowercase().as_str() {
        "lower" | "upper" => DataType::Varchar,
        "abs" => args.first().map(|a| a.data_type()).unwrap_or(DataType::Null),
        "coalesce" => args
            .iter()
            .map(|a| a.data_type())
            .find(|t| !t.is_null())
            .unwrap_or(DataType::Null),
        _ => DataType::Null,
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(lit) => write!(f, "{}", lit.value),
            Expression::ColumnRef(col) => match &col.name {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "#{}", col.index),
            },
            Expression::Tuple(elements) => {
                write!(f, "(")?;
                write_list(f, elements)?;
                write!(f, ")")
            }
            Expression::BinaryOp { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expression::UnaryOp { op, operand } => match op {
                UnaryOperator::Not => write!(f, "(NOT {})", operand),
                UnaryOperator::IsNull | UnaryOperator::IsNotNull => {
                    write!(f, "({} {})", operand, op.as_str())
                }
            },
            Expression::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expression::Subquery(subquery) => write!(f, "({})", subquery.query),
            Expression::InList(in_list) => write!(f, "{}", in_list),
            Expression::HashInList(hash_in) => write!(f, "{}", hash_in),
        }
    }
}
