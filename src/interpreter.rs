use crate::ast::{Expr, ExprVisitor, Stmt, StmtVisitor};
use crate::environment::Environment;
use crate::error::LevError;
use crate::lexer::{Token, TokenType};
use crate::value::Value;
use std::io::{self, Write};
use tracing::{debug, instrument, trace};

type EvalResult = Result<Value, LevError>;
type ExecResult = Result<(), LevError>;

/// Tree-walking interpreter. Printed values go to `output`.
pub struct Interpreter<W: Write = io::Stdout> {
    environment: Environment,
    output: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(output: W) -> Self {
        Self {
            environment: Environment::new(),
            output,
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Run statements in order, stopping at the first runtime error.
    #[instrument(level = "debug", skip_all, fields(count = statements.len()))]
    pub fn interpret(&mut self, statements: &[Stmt]) -> ExecResult {
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                debug!(line = error.line(), "runtime error, halting");
                return Err(error);
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Runs `statements` in a fresh child scope. The enclosing scope is
    /// restored whether or not the body fails.
    fn execute_block(&mut self, statements: &[Stmt]) -> ExecResult {
        self.environment.push_scope();

        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));

        self.environment.pop_scope();
        result
    }
}

fn number_operand(operator: &Token, operand: &Value) -> Result<f64, LevError> {
    match operand {
        Value::Number(n) => Ok(*n),
        _ => Err(LevError::runtime_error(operator, "Operand must be a number.")),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64), LevError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(LevError::runtime_error(operator, "Operand must be a number.")),
    }
}

impl<W: Write> ExprVisitor for Interpreter<W> {
    type Output = EvalResult;

    fn visit_literal(&mut self, value: &Value) -> EvalResult {
        Ok(value.clone())
    }

    fn visit_variable(&mut self, name: &Token) -> EvalResult {
        self.environment.get(name)
    }

    fn visit_assign(&mut self, name: &Token, value: &Expr) -> EvalResult {
        let value = self.evaluate(value)?;
        self.environment.assign(name, value.clone())?;
        Ok(value)
    }

    fn visit_unary(&mut self, operator: &Token, operand: &Expr) -> EvalResult {
        let operand = self.evaluate(operand)?;

        match operator.token_type {
            TokenType::Bang => Ok(Value::Bool(!operand.is_truthy())),
            TokenType::Minus => Ok(Value::Number(-number_operand(operator, &operand)?)),
            _ => Err(LevError::runtime_error(
                operator,
                format!("Unknown unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> EvalResult {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        let value = match operator.token_type {
            TokenType::EqualEqual => Value::Bool(left == right),
            TokenType::BangEqual => Value::Bool(left != right),
            TokenType::Plus => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Value::Number(l + r),
                (Value::String(l), Value::String(r)) => Value::String(l + &r),
                _ => {
                    return Err(LevError::runtime_error(
                        operator,
                        "Operands must be strings or numbers.",
                    ))
                }
            },
            TokenType::Minus => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Number(l - r)
            }
            TokenType::Star => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Number(l * r)
            }
            TokenType::Slash => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Number(l / r)
            }
            TokenType::Greater => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Bool(l > r)
            }
            TokenType::GreaterEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Bool(l >= r)
            }
            TokenType::Less => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Bool(l < r)
            }
            TokenType::LessEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Value::Bool(l <= r)
            }
            _ => {
                return Err(LevError::runtime_error(
                    operator,
                    format!("Unknown binary operator '{}'.", operator.lexeme),
                ))
            }
        };

        Ok(value)
    }

    fn visit_grouping(&mut self, expr: &Expr) -> EvalResult {
        self.evaluate(expr)
    }
}

impl<W: Write> StmtVisitor for Interpreter<W> {
    type Output = ExecResult;

    fn visit_expression_stmt(&mut self, expr: &Expr) -> ExecResult {
        self.evaluate(expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, keyword: &Token, expr: &Expr) -> ExecResult {
        let value = self.evaluate(expr)?;
        writeln!(self.output, "{}", value).map_err(|e| {
            LevError::runtime_error(keyword, format!("Failed to write output: {}", e))
        })
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> ExecResult {
        let value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };
        self.environment.define(&name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> ExecResult {
        trace!(depth = self.environment.depth(), "enter block");
        self.execute_block(statements)
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> ExecResult {
        if self.evaluate(condition)?.is_truthy() {
            self.execute(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }
}
