use crate::ast::{Expr, ExprVisitor, Stmt, StmtVisitor};
use crate::lexer::Token;
use crate::value::Value;

/// Renders syntax trees in a parenthesised prefix form, e.g. `(+ 1 (* 2 3))`.
#[derive(Debug, Default)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut out = format!("({}", name);
        for expr in exprs {
            out.push(' ');
            out.push_str(&expr.accept(self));
        }
        out.push(')');
        out
    }
}

impl ExprVisitor for AstPrinter {
    type Output = String;

    fn visit_literal(&mut self, value: &Value) -> String {
        match value {
            Value::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }

    fn visit_variable(&mut self, name: &Token) -> String {
        name.lexeme.clone()
    }

    fn visit_assign(&mut self, name: &Token, value: &Expr) -> String {
        format!("(= {} {})", name.lexeme, value.accept(self))
    }

    fn visit_unary(&mut self, operator: &Token, operand: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[operand])
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[left, right])
    }

    fn visit_grouping(&mut self, expr: &Expr) -> String {
        self.parenthesize("group", &[expr])
    }
}

impl StmtVisitor for AstPrinter {
    type Output = String;

    fn visit_expression_stmt(&mut self, expr: &Expr) -> String {
        self.parenthesize(";", &[expr])
    }

    fn visit_print_stmt(&mut self, _keyword: &Token, expr: &Expr) -> String {
        self.parenthesize("print", &[expr])
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> String {
        match initializer {
            Some(expr) => format!("(var {} {})", name.lexeme, expr.accept(self)),
            None => format!("(var {})", name.lexeme),
        }
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> String {
        let mut out = String::from("(block");
        for stmt in statements {
            out.push(' ');
            out.push_str(&stmt.accept(self));
        }
        out.push(')');
        out
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> String {
        let mut out = format!(
            "(if {} {}",
            condition.accept(self),
            then_branch.accept(self)
        );
        if let Some(else_branch) = else_branch {
            out.push(' ');
            out.push_str(&else_branch.accept(self));
        }
        out.push(')');
        out
    }
}
