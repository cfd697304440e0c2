use crate::ast::{Expr, Stmt};
use crate::error::{Diagnostics, LevError, Span};
use crate::lexer::{Literal, Token, TokenType};
use crate::value::Value;
use tracing::{debug, trace};

/// Depth budget for one declaration. Each grouping, unary operator, block,
/// `if` or assignment spends `NESTING_COST`; each operator folded into a
/// binary chain spends 1, because the tree it builds grows one level deeper.
const MAX_DEPTH: usize = 1024;
const NESTING_COST: usize = 8;

/// Recursive-descent parser, one method per grammar rule.
///
/// Syntax errors are collected rather than returned: a failed declaration is
/// recorded, the parser resynchronises at the next statement boundary and
/// carries on, so one run reports every syntax error it can find.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    errors: Vec<LevError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (line, end) = tokens.last().map_or((1, 0), |t| (t.line, t.span.end));
            tokens.push(Token::new(
                TokenType::Eof,
                String::new(),
                None,
                line,
                Span::new(end.saturating_sub(1), end),
            ));
        }

        Self {
            tokens,
            current: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parse complete"
        );
        for error in self.errors {
            diagnostics.report(error);
        }
        statements
    }

    /// Parses one declaration, containing any error it raises.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_types(&[TokenType::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, LevError> {
        let name = self
            .consume(TokenType::Identifier, "Expect variable name.")?
            .clone();

        let initializer = if self.match_types(&[TokenType::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume_with_help(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
            "Variable declarations end with ';': var name = value;",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt, LevError> {
        if self.match_types(&[TokenType::Print]) {
            self.print_statement()
        } else if self.match_types(&[TokenType::LeftBrace]) {
            Ok(Stmt::Block {
                statements: self.nested(Self::block)?,
            })
        } else if self.match_types(&[TokenType::If]) {
            self.nested(Self::if_statement)
        } else {
            self.expression_statement()
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, LevError> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume_with_help(
            TokenType::RightBrace,
            "Expect '}' after block.",
            "Block statements must be closed with '}' after the opening '{'.",
        )?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> Result<Stmt, LevError> {
        self.consume_with_help(
            TokenType::LeftParen,
            "Expect '(' after 'if'.",
            "If statements require parentheses around the condition: if (condition) statement",
        )?;
        let condition = self.expression()?;
        self.consume_with_help(
            TokenType::RightParen,
            "Expect ')' after if condition.",
            "If conditions must be enclosed in parentheses: if (condition) statement",
        )?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_types(&[TokenType::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt, LevError> {
        let keyword = self.previous().clone();
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { keyword, expr })
    }

    fn expression_statement(&mut self) -> Result<Stmt, LevError> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    fn expression(&mut self) -> Result<Expr, LevError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, LevError> {
        let expr = self.equality()?;

        if self.match_types(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = self.nested(Self::assignment)?;

            if let Expr::Variable { name } = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }

            // Reported, but the statement still parses.
            self.errors.push(LevError::parse_error_with_help(
                &equals,
                "Invalid assignment target.",
                "Only variables can be assigned to, e.g. 'x = 10;'",
            ));
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, LevError> {
        self.left_associative(
            &[TokenType::BangEqual, TokenType::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr, LevError> {
        self.left_associative(
            &[
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Less,
                TokenType::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Expr, LevError> {
        self.left_associative(&[TokenType::Minus, TokenType::Plus], Self::factor)
    }

    fn factor(&mut self) -> Result<Expr, LevError> {
        self.left_associative(&[TokenType::Slash, TokenType::Star], Self::unary)
    }

    /// `operand (op operand)*`, folding to the left.
    fn left_associative(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> Result<Expr, LevError>,
    ) -> Result<Expr, LevError> {
        let entry_depth = self.depth;
        let result = self.fold_left(operators, operand);
        self.depth = entry_depth;
        result
    }

    fn fold_left(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> Result<Expr, LevError>,
    ) -> Result<Expr, LevError> {
        let mut expr = operand(self)?;

        while self.match_types(operators) {
            let operator = self.previous().clone();
            self.descend(1)?;
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, LevError> {
        if self.match_types(&[TokenType::Bang, TokenType::Minus]) {
            let operator = self.previous().clone();
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, LevError> {
        if self.match_types(&[TokenType::False]) {
            return Ok(Expr::Literal {
                value: Value::Bool(false),
            });
        }
        if self.match_types(&[TokenType::True]) {
            return Ok(Expr::Literal {
                value: Value::Bool(true),
            });
        }
        if self.match_types(&[TokenType::Nil]) {
            return Ok(Expr::Literal { value: Value::Nil });
        }
        if self.match_types(&[TokenType::Number, TokenType::String]) {
            let value = match &self.previous().literal {
                Some(Literal::Number(n)) => Value::Number(*n),
                Some(Literal::String(s)) => Value::String(s.clone()),
                None => Value::Nil,
            };
            return Ok(Expr::Literal { value });
        }
        if self.match_types(&[TokenType::Identifier]) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }
        if self.match_types(&[TokenType::LeftParen]) {
            let expr = self.nested(Self::expression)?;
            self.consume_with_help(
                TokenType::RightParen,
                "Expect ')' after expression.",
                "Every '(' needs a matching ')'.",
            )?;
            return Ok(Expr::Grouping {
                expr: Box::new(expr),
            });
        }

        Err(LevError::parse_error(self.peek(), "Expect expression."))
    }

    /// Run a recursive rule one nesting level deeper, refusing input nested
    /// past the depth budget instead of exhausting the stack.
    fn nested<T>(&mut self, rule: fn(&mut Self) -> Result<T, LevError>) -> Result<T, LevError> {
        self.descend(NESTING_COST)?;
        let result = rule(self);
        self.depth -= NESTING_COST;
        result
    }

    fn descend(&mut self, cost: usize) -> Result<(), LevError> {
        if self.depth + cost > MAX_DEPTH {
            return Err(LevError::parse_error(self.peek(), "Too much nesting."));
        }
        self.depth += cost;
        Ok(())
    }

    /// Discard tokens until a statement boundary: just past a `;`, or before
    /// a keyword that starts a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::Semicolon {
                break;
            }

            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => break,
                _ => {
                    self.advance();
                }
            }
        }

        trace!(position = self.current, "synchronized");
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(*token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, LevError> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(LevError::parse_error(self.peek(), message))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: &str,
    ) -> Result<&Token, LevError> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(LevError::parse_error_with_help(self.peek(), message, help))
        }
    }
}
