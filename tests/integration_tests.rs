// Integration Tests for the Lev Parser
//
// Table-driven robustness suites: each case is scanned and parsed and the
// outcome compared against the expectation. Panics count as crashes.

use lev::ast::Stmt;
use lev::error::{Diagnostics, LevError};
use lev::lexer::Lexer;
use lev::parser::Parser;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    let result = std::panic::catch_unwind(|| parse_input(&test.input));

    match result {
        Ok(parse_result) => match (parse_result, test.should_succeed) {
            (Ok(_), true) => TestResult::Pass,
            (Ok(_), false) => {
                TestResult::Fail("Expected parsing to fail, but it succeeded".to_string())
            }
            (Err(errors), false) => match &test.expected_error_contains {
                Some(expected) => {
                    if errors.iter().any(|e| e.to_string().contains(expected)) {
                        TestResult::Pass
                    } else {
                        TestResult::Fail(format!(
                            "Errors {:?} don't contain expected text '{}'",
                            errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                            expected
                        ))
                    }
                }
                None => TestResult::Pass,
            },
            (Err(errors), true) => TestResult::Fail(format!(
                "Expected parsing to succeed, but got errors: {:?}",
                errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
            )),
        },
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

/// Scan and parse input, returning every reported error on failure
fn parse_input(input: &str) -> Result<Vec<Stmt>, Vec<LevError>> {
    let mut diagnostics = Diagnostics::new();
    let tokens = Lexer::new(input).scan_tokens(&mut diagnostics);
    let statements = Parser::new(tokens).parse(&mut diagnostics);
    if diagnostics.is_empty() {
        Ok(statements)
    } else {
        Err(diagnostics.errors().to_vec())
    }
}

/// Test case builder for convenience
impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_malformed_expressions_tests() -> TestSuite {
    let mut suite = TestSuite::new("Malformed Expressions");

    // === PARENTHESES TESTS ===

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2;",
        "[line 1] Error at ';': Expect ')' after expression.",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_nested",
        "((1 + 2);",
        "Expect ')' after expression.",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2);",
        "[line 1] Error at ')': Expect ';' after expression.",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses",
        "();",
        "Error at ')': Expect expression.",
    ));

    // === BRACE TESTS ===

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_brace",
        "{ var x = 1;",
        "Error at end: Expect '}' after block.",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_brace",
        "var x = 1; }",
        "Error at '}': Expect expression.",
    ));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    suite.add_test(TestCase::should_succeed("empty_input", ""));
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \n\t  "));
    suite.add_test(TestCase::should_succeed("only_comment", "// nothing to see"));

    suite.add_test(TestCase::should_fail_with_message(
        "unexpected_eof_after_operator",
        "1 +",
        "Error at end: Expect expression.",
    ));
    suite.add_test(TestCase::should_fail("unexpected_eof_in_expression", "1 + ("));

    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100) + ";";
    suite.add_test(TestCase::should_succeed("deeply_nested_parens", &deep_parens));

    suite.add_test(TestCase::should_fail_with_message(
        "error_line_is_tracked",
        "var a = 1;\n\nprint a\n",
        "[line 4] Error at end: Expect ';' after value.",
    ));

    suite
}

fn create_operator_tests() -> TestSuite {
    let mut suite = TestSuite::new("Operator Tests");

    suite.add_test(TestCase::should_fail("missing_left_operand", "+ 1;"));
    suite.add_test(TestCase::should_fail("missing_right_operand", "1 +;"));
    suite.add_test(TestCase::should_fail("double_plus", "1 ++ 2;"));
    // Unary minus nests: 1 - (-2)
    suite.add_test(TestCase::should_succeed("double_minus", "1 -- 2;"));
    suite.add_test(TestCase::should_succeed("mixed_operators", "1 +- 2;"));
    suite.add_test(TestCase::should_succeed("double_bang", "!!true;"));

    suite.add_test(TestCase::should_succeed("comparison_equal", "1 == 2;"));
    suite.add_test(TestCase::should_succeed("comparison_not_equal", "1 != 2;"));
    suite.add_test(TestCase::should_succeed("comparison_less_equal", "1 <= 2;"));
    suite.add_test(TestCase::should_succeed("comparison_greater_equal", "1 >= 2;"));

    suite
}

fn create_statement_tests() -> TestSuite {
    let mut suite = TestSuite::new("Statement Tests");

    suite.add_test(TestCase::should_succeed("print", "print 1;"));
    suite.add_test(TestCase::should_fail_with_message(
        "print_missing_semicolon",
        "print 1",
        "Expect ';' after value.",
    ));
    suite.add_test(TestCase::should_succeed("var_without_initializer", "var x;"));
    suite.add_test(TestCase::should_fail_with_message(
        "var_missing_name",
        "var 1 = 2;",
        "Error at '1': Expect variable name.",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "var_keyword_as_name",
        "var print = 2;",
        "Error at 'print': Expect variable name.",
    ));
    suite.add_test(TestCase::should_succeed("nested_blocks", "{ { var a; } { } }"));

    suite.add_test(TestCase::should_succeed("valid_if", "if (true) print 1;"));
    suite.add_test(TestCase::should_succeed(
        "if_else_blocks",
        "if (x) { print 1; } else { print 2; }",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_missing_paren",
        "if true) print 1;",
        "Error at 'true': Expect '(' after 'if'.",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_missing_closing_paren",
        "if (true print 1;",
        "Error at 'print': Expect ')' after if condition.",
    ));
    suite.add_test(TestCase::should_fail("if_missing_body", "if (true)"));
    suite.add_test(TestCase::should_fail(
        "var_declaration_is_not_a_branch",
        "if (true) var x = 1;",
    ));

    suite
}

fn create_literal_tests() -> TestSuite {
    let mut suite = TestSuite::new("Literal Tests");

    suite.add_test(TestCase::should_succeed("integer_literal", "42;"));
    suite.add_test(TestCase::should_succeed("double_literal", "3.14;"));
    suite.add_test(TestCase::should_succeed("string_literal", "\"hello\";"));
    suite.add_test(TestCase::should_succeed("boolean_true", "true;"));
    suite.add_test(TestCase::should_succeed("nil_literal", "nil;"));

    // '.' without a following digit is its own token
    suite.add_test(TestCase::should_fail("trailing_dot", "42.;"));
    suite.add_test(TestCase::should_fail("leading_dot", ".42;"));

    suite.add_test(TestCase::should_fail_with_message(
        "unterminated_string",
        "\"hello",
        "Unterminated string.",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unexpected_character",
        "var a = 1 # 2;",
        "[line 1] Error: Unexpected character.",
    ));

    suite
}

fn create_assignment_tests() -> TestSuite {
    let mut suite = TestSuite::new("Assignment Tests");

    suite.add_test(TestCase::should_succeed("simple_assignment", "x = 1;"));
    suite.add_test(TestCase::should_succeed("chained_assignment", "x = y = 1 + 2;"));
    suite.add_test(TestCase::should_fail("missing_value", "x =;"));
    suite.add_test(TestCase::should_fail_with_message(
        "invalid_target",
        "1 = x;",
        "Error at '=': Invalid assignment target.",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "grouped_target",
        "(x) = 1;",
        "Invalid assignment target.",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "binary_target",
        "a + b = c;",
        "Invalid assignment target.",
    ));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    let suites = vec![
        create_malformed_expressions_tests(),
        create_edge_case_tests(),
        create_operator_tests(),
        create_statement_tests(),
        create_literal_tests(),
        create_assignment_tests(),
    ];

    let mut failing_suites = Vec::new();
    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            failing_suites.push(results.suite_name);
        }
    }

    assert!(
        failing_suites.is_empty(),
        "suites with failures: {:?}",
        failing_suites
    );
}

#[test]
fn recovery_reports_every_bad_statement() {
    let errors = parse_input("print 1\nvar = 2;\nprint 3;\n1 = 2;").unwrap_err();
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "[line 2] Error at 'var': Expect ';' after value.",
            "[line 4] Error at '=': Invalid assignment target.",
        ]
    );
}
