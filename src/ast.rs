use crate::lexer::Token;
use crate::value::Value;

/// Expression nodes. Each composite node owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: Value,
    },
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Grouping {
        expr: Box<Expr>,
    },
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Print {
        keyword: Token,
        expr: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block {
        statements: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
}

/// One handler per expression variant.
///
/// Traversals (evaluation, printing) implement this trait instead of adding
/// methods to `Expr`; `Expr::accept` does the dispatch.
pub trait ExprVisitor {
    type Output;

    fn visit_literal(&mut self, value: &Value) -> Self::Output;
    fn visit_variable(&mut self, name: &Token) -> Self::Output;
    fn visit_assign(&mut self, name: &Token, value: &Expr) -> Self::Output;
    fn visit_unary(&mut self, operator: &Token, operand: &Expr) -> Self::Output;
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Self::Output;
    fn visit_grouping(&mut self, expr: &Expr) -> Self::Output;
}

/// One handler per statement variant.
pub trait StmtVisitor {
    type Output;

    fn visit_expression_stmt(&mut self, expr: &Expr) -> Self::Output;
    fn visit_print_stmt(&mut self, keyword: &Token, expr: &Expr) -> Self::Output;
    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> Self::Output;
    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> Self::Output;
    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Self::Output;
}

impl Expr {
    pub fn accept<V: ExprVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Literal { value } => visitor.visit_literal(value),
            Expr::Variable { name } => visitor.visit_variable(name),
            Expr::Assign { name, value } => visitor.visit_assign(name, value),
            Expr::Unary { operator, operand } => visitor.visit_unary(operator, operand),
            Expr::Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary(left, operator, right),
            Expr::Grouping { expr } => visitor.visit_grouping(expr),
        }
    }
}

impl Stmt {
    pub fn accept<V: StmtVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Stmt::Expression { expr } => visitor.visit_expression_stmt(expr),
            Stmt::Print { keyword, expr } => visitor.visit_print_stmt(keyword, expr),
            Stmt::Var { name, initializer } => visitor.visit_var_stmt(name, initializer.as_ref()),
            Stmt::Block { statements } => visitor.visit_block_stmt(statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => visitor.visit_if_stmt(condition, then_branch, else_branch.as_deref()),
        }
    }
}
