use crate::{lexer, parser, type_checker, util::tree, Error};

/// Sample programs, all of which compile.
pub const DEMOS: &[&str] = &[
    include_str!("../../demos/minimal.oop"),
    include_str!("../../demos/animals.oop"),
    include_str!("../../demos/counter.oop"),
    include_str!("../../demos/shapes.oop"),
    include_str!("../../demos/list.oop"),
];

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserExp(&'static str),
    ParserStmt(&'static str),
    CheckerProgram(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

/// Runs the stages a test needs, returning the printed tree and the error
/// messages. Stages stop at the first error, in which case the tree is empty.
#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    match print_tree(test) {
        Ok(tree) => (tree, vec![]),
        Err(error) => (String::new(), vec![error.to_string()]),
    }
}

fn print_tree(test: Test) -> Result<String, Error> {
    let tree = match test {
        Test::ParserProgram(input) => {
            let program = parser::parse(&lexer::tokenize(input)?)?;
            tree::print_program_string(&program)
        }
        Test::ParserExp(input) => {
            let exp = parser::parse_exp(&lexer::tokenize(input)?)?;
            tree::print_exp_string(&exp)
        }
        Test::ParserStmt(input) => {
            let stmt = parser::parse_stmt(&lexer::tokenize(input)?)?;
            tree::print_stmt_string(&stmt)
        }
        Test::CheckerProgram(input) => {
            let program = parser::parse(&lexer::tokenize(input)?)?;
            let program = type_checker::typecheck(&program)?;
            tree::print_program_string(&program)
        }
    };
    Ok(tree)
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_tree: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_tree, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, exp), $source:expr) => {
        crate::util::test_utils::Test::ParserExp($source)
    };
    (@@get_test(parser, stmt), $source:expr) => {
        crate::util::test_utils::Test::ParserStmt($source)
    };
    (@@get_test(checker, program), $source:expr) => {
        crate::util::test_utils::Test::CheckerProgram($source)
    };
}
pub(crate) use tree_tests;
