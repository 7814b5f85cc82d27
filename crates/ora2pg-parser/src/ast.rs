//! The Oracle SQL AST. Deliberately scoped to what the rewriter families
//! need: `SELECT` expressions (arithmetic, string, date, conditional,
//! pseudo-column) over a `FROM`/`WHERE` shape, plus the routine bodies the
//! boundary scanner carves out. Node identity (`NodeId`) is the key the
//! type inference visitor's cache (`ora2pg-typeinfer`) is built against; a
//! node exists only for the lifetime of one transpilation call.

use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Default)]
pub struct NodeIdGen(u32);

impl NodeIdGen {
    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.0);
        self.0 += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(SmolStr),
    Decimal(SmolStr),
    String(SmolStr),
    Null,
    Date(SmolStr),
    Timestamp(SmolStr),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Concat,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Like,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Column { qualifier: Option<SmolStr>, name: SmolStr },
    Literal(Literal),
    Rownum,
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, expr: Box<Expr> },
    FunctionCall { name: SmolStr, args: Vec<Expr> },
    Case {
        operand: Option<Box<Expr>>,
        whens: Vec<(Expr, Expr)>,
        else_branch: Option<Box<Expr>>,
    },
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// Best-effort textual form used by heuristic fallbacks when type
    /// inference can't determine an operand's category from metadata
    /// alone.
    pub fn approx_text(&self) -> String {
        match &self.kind {
            ExprKind::Column { qualifier, name } => match qualifier {
                Some(q) => format!("{q}.{name}"),
                None => name.to_string(),
            },
            ExprKind::Literal(Literal::Integer(s) | Literal::Decimal(s)) => s.to_string(),
            ExprKind::Literal(Literal::String(s)) => format!("'{s}'"),
            ExprKind::Literal(Literal::Null) => "NULL".to_string(),
            ExprKind::Literal(Literal::Date(s)) => format!("DATE '{s}'"),
            ExprKind::Literal(Literal::Timestamp(s)) => format!("TIMESTAMP '{s}'"),
            ExprKind::Literal(Literal::Bool(b)) => b.to_string().to_uppercase(),
            ExprKind::Rownum => "ROWNUM".to_string(),
            ExprKind::FunctionCall { name, .. } => format!("{name}(...)"),
            ExprKind::Binary { left, right, .. } => format!("{} ? {}", left.approx_text(), right.approx_text()),
            ExprKind::Unary { expr, .. } => expr.approx_text(),
            ExprKind::Case { .. } => "CASE".to_string(),
            ExprKind::Paren(inner) => inner.approx_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    pub schema: Option<SmolStr>,
    pub name: SmolStr,
    pub alias: Option<SmolStr>,
    pub is_dual: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: Vec<FromItem>,
    pub where_clause: Option<Expr>,
}

impl SelectStmt {
    /// The FROM-list table the unqualified column `name` resolves against
    /// first, per declaration order.
    pub fn first_from(&self) -> Option<&FromItem> {
        self.from.first()
    }
}

