use std::fmt;

use crate::{
    ast::{ClassDef, ClassName, Exp, MethodDef, MethodName, Op, Program, Stmt, Type, Untyped, Vardec, Variable},
    token::Token,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// A parsed item along with the position of the first token after it.
pub type ParseResult<T> = Result<(T, usize)>;

/// Parses a whole program. Every token must be consumed.
pub fn parse(tokens: &[Token]) -> Result<Program<Untyped>> {
    let program = parse_all(tokens, Parser::parse_program)?;
    tracing::debug!(classes = program.classes.len(), "parsed program");
    Ok(program)
}

/// Parses a single expression. Every token must be consumed.
pub fn parse_exp(tokens: &[Token]) -> Result<Exp<Untyped>> {
    parse_all(tokens, Parser::parse_exp)
}

/// Parses a single statement. Every token must be consumed.
pub fn parse_stmt(tokens: &[Token]) -> Result<Stmt<Untyped>> {
    parse_all(tokens, Parser::parse_stmt)
}

fn parse_all<'tok, T>(
    tokens: &'tok [Token],
    f: impl FnOnce(&Parser<'tok>, usize) -> ParseResult<T>,
) -> Result<T> {
    let p = Parser { tokens };
    let (parsed, end) = f(&p, 0)?;
    match p.peek(end) {
        None => Ok(parsed),
        Some(actual) => Err(Error::TrailingTokens {
            actual: actual.clone(),
            at: end,
        }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected {expected}, but got `{actual}` at token {at}")]
    Unexpected {
        expected: Expected,
        actual: Token,
        at: usize,
    },
    #[error("expected {expected}, but reached the end of input")]
    UnexpectedEnd { expected: Expected, at: usize },
    #[error("unexpected `{actual}` at token {at} after a complete program")]
    TrailingTokens { actual: Token, at: usize },
}

impl Error {
    /// Position of the token where parsing failed.
    pub fn at(&self) -> usize {
        match self {
            Error::Unexpected { at, .. }
            | Error::UnexpectedEnd { at, .. }
            | Error::TrailingTokens { at, .. } => *at,
        }
    }

    /// Picks the error of the alternative that got further into the input.
    /// On ties the later alternative wins.
    fn furthest(self, other: Error) -> Error {
        if other.at() >= self.at() {
            other
        } else {
            self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expected {
    Token(Token),
    Identifier,
    Type,
    Expression,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(token) => write!(f, "`{token}`"),
            Expected::Identifier => f.write_str("an identifier"),
            Expected::Type => f.write_str("a type"),
            Expected::Expression => f.write_str("an expression"),
        }
    }
}

struct Parser<'tok> {
    tokens: &'tok [Token],
}

impl Parser<'_> {
    fn parse_program(&self, pos: usize) -> ParseResult<Program<Untyped>> {
        let mut classes = Vec::new();
        let mut pos = pos;
        // No statement starts with `class`, so the keyword commits to a class.
        while self.is(pos, &Token::Class) {
            let (class, next) = self.parse_class(pos)?;
            classes.push(class);
            pos = next;
        }
        let (entry_point, pos) = self.parse_stmt(pos)?;
        Ok((
            Program {
                classes,
                entry_point,
            },
            pos,
        ))
    }

    fn parse_class(&self, pos: usize) -> ParseResult<ClassDef<Untyped>> {
        // Header
        let pos = self.consume(pos, Token::Class)?;
        let (name, pos) = self.parse_class_name(pos)?;
        let pos = self.consume(pos, Token::Extends)?;
        let (extends, pos) = self.parse_class_name(pos)?;
        let mut pos = self.consume(pos, Token::LBrace)?;

        // Instance variables
        let mut instance_vars = Vec::new();
        while self.peek(pos).is_some_and(|t| *t != Token::Constructor) {
            let (vardec, next) = self.parse_vardec(pos)?;
            instance_vars.push(vardec);
            pos = self.consume(next, Token::Semicolon)?;
        }

        // Constructor
        let pos = self.consume(pos, Token::Constructor)?;
        let pos = self.consume(pos, Token::LParen)?;
        let (constructor_params, pos) = self.parse_list(pos, Token::RParen, Parser::parse_vardec)?;
        let pos = self.consume(pos, Token::RParen)?;
        let pos = self.consume(pos, Token::LBrace)?;
        let pos = self.consume(pos, Token::Super)?;
        let pos = self.consume(pos, Token::LParen)?;
        let (super_args, pos) = self.parse_list(pos, Token::RParen, Parser::parse_exp)?;
        let pos = self.consume(pos, Token::RParen)?;
        let pos = self.consume(pos, Token::Semicolon)?;
        let (constructor_body, pos) = self.parse_stmts(pos)?;
        let mut pos = self.consume(pos, Token::RBrace)?;

        // Methods
        let mut methods = Vec::new();
        while self.peek(pos).is_some_and(|t| *t != Token::RBrace) {
            let (method, next) = self.parse_method_def(pos)?;
            methods.push(method);
            pos = next;
        }
        let pos = self.consume(pos, Token::RBrace)?;

        let class = ClassDef {
            name,
            extends,
            instance_vars,
            constructor_params,
            super_args,
            constructor_body,
            methods,
        };
        Ok((class, pos))
    }

    fn parse_method_def(&self, pos: usize) -> ParseResult<MethodDef<Untyped>> {
        let (return_ty, pos) = self.parse_type(pos)?;
        let (name, pos) = self.parse_method_name(pos)?;
        let pos = self.consume(pos, Token::LParen)?;
        let (params, pos) = self.parse_list(pos, Token::RParen, Parser::parse_vardec)?;
        let pos = self.consume(pos, Token::RParen)?;
        let (body, pos) = self.parse_stmt(pos)?;
        let method = MethodDef {
            return_ty,
            name,
            params,
            body,
        };
        Ok((method, pos))
    }

    fn parse_vardec(&self, pos: usize) -> ParseResult<Vardec> {
        let (ty, pos) = self.parse_type(pos)?;
        let (name, pos) = self.parse_variable(pos)?;
        Ok((Vardec { ty, name }, pos))
    }

    fn parse_type(&self, pos: usize) -> ParseResult<Type> {
        let ty = match self.peek(pos) {
            Some(Token::Int) => Type::Int,
            Some(Token::Bool) => Type::Bool,
            Some(Token::Void) => Type::Void,
            Some(Token::Identifier(name)) => Type::Class(ClassName::new(name)),
            _ => return Err(self.unexpected(pos, Expected::Type)),
        };
        Ok((ty, pos + 1))
    }

    /// Parses the statements of a block, up to (but not including) the
    /// closing brace.
    fn parse_stmts(&self, pos: usize) -> ParseResult<Vec<Stmt<Untyped>>> {
        let mut stmts = Vec::new();
        let mut pos = pos;
        while self.peek(pos).is_some_and(|t| *t != Token::RBrace) {
            let (stmt, next) = self.parse_stmt(pos)?;
            stmts.push(stmt);
            pos = next;
        }
        Ok((stmts, pos))
    }

    fn parse_stmt(&self, pos: usize) -> ParseResult<Stmt<Untyped>> {
        match self.peek(pos) {
            Some(Token::If) => {
                let (guard, pos) = self.parse_guard(pos + 1)?;
                let (then_arm, pos) = self.parse_stmt(pos)?;
                let pos = self.consume(pos, Token::Else)?;
                let (else_arm, pos) = self.parse_stmt(pos)?;
                let stmt = Stmt::If {
                    guard,
                    then_arm: Box::new(then_arm),
                    else_arm: Box::new(else_arm),
                };
                Ok((stmt, pos))
            }
            Some(Token::While) => {
                let (guard, pos) = self.parse_guard(pos + 1)?;
                let (body, pos) = self.parse_stmt(pos)?;
                let stmt = Stmt::While {
                    guard,
                    body: Box::new(body),
                };
                Ok((stmt, pos))
            }
            Some(Token::Return) if self.is(pos + 1, &Token::Semicolon) => {
                Ok((Stmt::ReturnVoid, pos + 2))
            }
            Some(Token::Return) => {
                let (exp, pos) = self.parse_exp(pos + 1)?;
                let pos = self.consume(pos, Token::Semicolon)?;
                Ok((Stmt::ReturnValue(exp), pos))
            }
            Some(Token::Println) => {
                let (exp, pos) = self.parse_guard(pos + 1)?;
                let pos = self.consume(pos, Token::Semicolon)?;
                Ok((Stmt::Println(exp), pos))
            }
            Some(Token::LBrace) => {
                let (body, pos) = self.parse_stmts(pos + 1)?;
                let pos = self.consume(pos, Token::RBrace)?;
                Ok((Stmt::Block(body), pos))
            }
            // These three forms may all start with an identifier; only a full
            // parse up to the semicolon tells them apart. The order matters.
            _ => self
                .parse_var_init(pos)
                .or_else(|e| self.parse_exp_stmt(pos).map_err(|e2| e.furthest(e2)))
                .or_else(|e| self.parse_assign(pos).map_err(|e3| e.furthest(e3))),
        }
    }

    /// Parses `( exp )`, as used by `if`, `while` and `println`.
    fn parse_guard(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        let pos = self.consume(pos, Token::LParen)?;
        let (exp, pos) = self.parse_exp(pos)?;
        let pos = self.consume(pos, Token::RParen)?;
        Ok((exp, pos))
    }

    fn parse_var_init(&self, pos: usize) -> ParseResult<Stmt<Untyped>> {
        let (vardec, pos) = self.parse_vardec(pos)?;
        let pos = self.consume(pos, Token::Assign)?;
        let (value, pos) = self.parse_exp(pos)?;
        let pos = self.consume(pos, Token::Semicolon)?;
        Ok((Stmt::VarInit { vardec, value }, pos))
    }

    fn parse_exp_stmt(&self, pos: usize) -> ParseResult<Stmt<Untyped>> {
        let (exp, pos) = self.parse_exp(pos)?;
        let pos = self.consume(pos, Token::Semicolon)?;
        Ok((Stmt::Exp(exp), pos))
    }

    fn parse_assign(&self, pos: usize) -> ParseResult<Stmt<Untyped>> {
        let (target, pos) = self.parse_variable(pos)?;
        let pos = self.consume(pos, Token::Assign)?;
        let (value, pos) = self.parse_exp(pos)?;
        let pos = self.consume(pos, Token::Semicolon)?;
        Ok((Stmt::Assign { target, value }, pos))
    }

    fn parse_exp(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        self.parse_equals(pos)
    }

    fn parse_equals(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        self.parse_left_assoc(pos, &Token::Eq, Op::Equals, Parser::parse_less_than)
    }

    fn parse_less_than(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        self.parse_left_assoc(pos, &Token::Less, Op::LessThan, Parser::parse_additive)
    }

    fn parse_additive(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        self.parse_left_assoc(pos, &Token::Plus, Op::Plus, Parser::parse_dot)
    }

    /// Parses `operand (operator operand)*`, folding to the left.
    fn parse_left_assoc(
        &self,
        pos: usize,
        operator: &Token,
        op: Op,
        parse_operand: impl Fn(&Self, usize) -> ParseResult<Exp<Untyped>>,
    ) -> ParseResult<Exp<Untyped>> {
        let (mut lhs, mut pos) = parse_operand(self, pos)?;
        while self.is(pos, operator) {
            let (rhs, next) = parse_operand(self, pos + 1)?;
            lhs = Exp::binary(lhs, op, rhs);
            pos = next;
        }
        Ok((lhs, pos))
    }

    /// Parses a primary expression followed by any number of method calls.
    fn parse_dot(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        let (mut exp, mut pos) = self.parse_primary(pos)?;
        while self.is(pos, &Token::Dot) {
            let (method, next) = self.parse_method_name(pos + 1)?;
            let (args, next) = self.parse_args(next)?;
            exp = Exp::MethodCall {
                target: Box::new(exp),
                method,
                args,
                info: (),
            };
            pos = next;
        }
        Ok((exp, pos))
    }

    fn parse_primary(&self, pos: usize) -> ParseResult<Exp<Untyped>> {
        let exp = match self.peek(pos) {
            Some(Token::Integer(value)) => Exp::IntLiteral(*value),
            Some(Token::True) => Exp::BoolLiteral(true),
            Some(Token::False) => Exp::BoolLiteral(false),
            Some(Token::Identifier(name)) => Exp::Variable(Variable::new(name)),
            Some(Token::This) => Exp::This,
            Some(Token::LParen) => {
                let (nested, pos) = self.parse_exp(pos + 1)?;
                let pos = self.consume(pos, Token::RParen)?;
                return Ok((nested, pos));
            }
            Some(Token::New) => {
                let (class, pos) = self.parse_class_name(pos + 1)?;
                let (args, pos) = self.parse_args(pos)?;
                return Ok((Exp::New { class, args }, pos));
            }
            _ => return Err(self.unexpected(pos, Expected::Expression)),
        };
        Ok((exp, pos + 1))
    }

    /// Parses `( [exp (, exp)*] )`.
    fn parse_args(&self, pos: usize) -> ParseResult<Vec<Exp<Untyped>>> {
        let pos = self.consume(pos, Token::LParen)?;
        let (args, pos) = self.parse_list(pos, Token::RParen, Parser::parse_exp)?;
        let pos = self.consume(pos, Token::RParen)?;
        Ok((args, pos))
    }

    /// Parses a possibly empty `item (, item)*` list followed by `end_delim`.
    /// Does **NOT** consume the end delimiter.
    fn parse_list<T>(
        &self,
        pos: usize,
        end_delim: Token,
        parse_item: impl Fn(&Self, usize) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        if self.is(pos, &end_delim) {
            return Ok((items, pos));
        }
        let (first, mut pos) = parse_item(self, pos)?;
        items.push(first);
        while self.is(pos, &Token::Comma) {
            let (item, next) = parse_item(self, pos + 1)?;
            items.push(item);
            pos = next;
        }
        Ok((items, pos))
    }

    fn parse_class_name(&self, pos: usize) -> ParseResult<ClassName> {
        self.parse_ident(pos).map(|(name, pos)| (ClassName::from(name), pos))
    }

    fn parse_method_name(&self, pos: usize) -> ParseResult<MethodName> {
        self.parse_ident(pos).map(|(name, pos)| (MethodName::from(name), pos))
    }

    fn parse_variable(&self, pos: usize) -> ParseResult<Variable> {
        self.parse_ident(pos).map(|(name, pos)| (Variable::from(name), pos))
    }

    fn parse_ident(&self, pos: usize) -> ParseResult<Box<str>> {
        match self.peek(pos) {
            Some(Token::Identifier(name)) => Ok((name.clone(), pos + 1)),
            _ => Err(self.unexpected(pos, Expected::Identifier)),
        }
    }
}

impl Parser<'_> {
    /// Returns the token at the given position, if any.
    fn peek(&self, pos: usize) -> Option<&Token> {
        self.tokens.get(pos)
    }

    /// Checks whether the token at the given position matches the given one.
    fn is(&self, pos: usize, expect: &Token) -> bool {
        self.peek(pos) == Some(expect)
    }

    /// Returns the position after `expect` if it is the token at `pos`.
    fn consume(&self, pos: usize, expect: Token) -> Result<usize> {
        if self.is(pos, &expect) {
            Ok(pos + 1)
        } else {
            Err(self.unexpected(pos, Expected::Token(expect)))
        }
    }

    fn unexpected(&self, pos: usize, expected: Expected) -> Error {
        match self.peek(pos) {
            Some(actual) => Error::Unexpected {
                expected,
                actual: actual.clone(),
                at: pos,
            },
            None => Error::UnexpectedEnd { expected, at: pos },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer::tokenize, util::test_utils::tree_tests};

    fn exp(src: &str) -> Exp<Untyped> {
        parse_exp(&tokenize(src).unwrap()).expect("failed to parse")
    }

    fn int(value: i64) -> Exp<Untyped> {
        Exp::IntLiteral(value)
    }

    #[test]
    fn test_plus_is_left_associative() {
        let expected = Exp::binary(Exp::binary(int(1), Op::Plus, int(2)), Op::Plus, int(3));
        assert_eq!(exp("1 + 2 + 3"), expected);
    }

    #[test]
    fn test_less_than_is_left_associative() {
        let expected = Exp::binary(
            Exp::binary(int(1), Op::LessThan, int(2)),
            Op::LessThan,
            int(3),
        );
        assert_eq!(exp("1 < 2 < 3"), expected);
    }

    #[test]
    fn test_equals_is_left_associative() {
        let expected = Exp::binary(Exp::binary(int(1), Op::Equals, int(2)), Op::Equals, int(3));
        assert_eq!(exp("1 == 2 == 3"), expected);
    }

    #[test]
    fn test_mixed_precedence() {
        let lhs = Exp::binary(
            Exp::binary(int(1), Op::Plus, int(2)),
            Op::LessThan,
            Exp::binary(int(3), Op::Plus, int(4)),
        );
        let expected = Exp::binary(lhs, Op::Equals, Exp::BoolLiteral(false));
        assert_eq!(exp("1 + 2 < 3 + 4 == false"), expected);
    }

    #[test]
    fn test_parens_override_associativity() {
        let expected = Exp::binary(int(1), Op::Plus, Exp::binary(int(2), Op::Plus, int(3)));
        assert_eq!(exp("1 + (2 + 3)"), expected);
    }

    #[test]
    fn test_chained_calls() {
        let foo = Exp::call(Exp::variable("x"), "foo", vec![int(1), int(2)]);
        let expected = Exp::call(foo, "bar", vec![int(3), int(4)]);
        assert_eq!(exp("x.foo(1, 2).bar(3, 4)"), expected);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let tokens = tokenize(crate::util::test_utils::DEMOS[0]).unwrap();
        assert_eq!(parse(&tokens).unwrap(), parse(&tokens).unwrap());
    }

    #[test]
    fn test_statement_alternatives_order() {
        let stmt = |src: &str| parse_stmt(&tokenize(src).unwrap()).unwrap();

        // `Foo x = ...` can only be a declaration.
        assert_eq!(
            stmt("Foo x = new Foo();"),
            Stmt::VarInit {
                vardec: Vardec::new(Type::class("Foo"), "x"),
                value: Exp::New {
                    class: ClassName::new("Foo"),
                    args: vec![],
                },
            }
        );
        // `x.m();` fails as a declaration and succeeds as an expression.
        assert_eq!(
            stmt("x.m();"),
            Stmt::Exp(Exp::call(Exp::variable("x"), "m", vec![]))
        );
        // `x;` is an expression statement before it is anything else.
        assert_eq!(stmt("x;"), Stmt::Exp(Exp::variable("x")));
        // `x = 1;` fails as both a declaration and an expression.
        assert_eq!(
            stmt("x = 1;"),
            Stmt::Assign {
                target: Variable::new("x"),
                value: int(1),
            }
        );
    }

    #[test]
    fn test_errors() {
        let err = |src: &str| parse(&tokenize(src).unwrap()).unwrap_err();

        // All three identifier-led alternatives fail at once; the last one wins.
        assert_eq!(
            err(""),
            Error::UnexpectedEnd {
                expected: Expected::Identifier,
                at: 0
            }
        );
        assert_eq!(
            err("println(1); println(2);"),
            Error::TrailingTokens {
                actual: Token::Println,
                at: 5
            }
        );
        // The assignment alternative gets the furthest.
        assert_eq!(
            err("x = ;").to_string(),
            "expected an expression, but got `;` at token 2"
        );
        assert_eq!(
            err("if (true) println(1);").to_string(),
            "expected `else`, but reached the end of input"
        );
        assert_eq!(
            err("class A extends Object { constructor() { println(1); } } 1;").to_string(),
            "expected `super`, but got `println` at token 9"
        );
        assert_eq!(
            err("class A extends Object { int x constructor() { super(); } } 1;").to_string(),
            "expected `;`, but got `constructor` at token 7"
        );
        assert_eq!(
            err("x.foo(1,);").to_string(),
            "expected an expression, but got `)` at token 6"
        );
    }

    tree_tests!(
        use parser;

        fn test_literals() {
            let exp = "1 + true == false";
            let tree_ok = "
                binary ==
                  binary +
                    int 1
                    bool true
                  bool false
            ";
        }

        fn test_this_and_variables() {
            let exp = "this.add(x, y)";
            let tree_ok = "
                call add
                  receiver
                    this
                  arguments
                    var x
                    var y
            ";
        }

        fn test_new() {
            let exp = "new Point(1, 2 + 3).norm()";
            let tree_ok = "
                call norm
                  receiver
                    new Point
                      int 1
                      binary +
                        int 2
                        int 3
            ";
        }

        fn test_call_binds_tighter_than_plus() {
            let exp = "a.f() + b.g()";
            let tree_ok = "
                binary +
                  call f
                    receiver
                      var a
                  call g
                    receiver
                      var b
            ";
        }

        fn test_if_else() {
            let stmt = "if (x < 1) { return 1; } else return;";
            let tree_ok = "
                if
                  binary <
                    var x
                    int 1
                  block
                    return
                      int 1
                  return
            ";
        }

        fn test_while() {
            let stmt = "while (i < 10) i = i + 1;";
            let tree_ok = "
                while
                  binary <
                    var i
                    int 10
                  assign i
                    binary +
                      var i
                      int 1
            ";
        }

        fn test_block_with_shadowing() {
            let stmt = "{ int x = 1; bool x = true; println(x); }";
            let tree_ok = "
                block
                  let int x
                    int 1
                  let bool x
                    bool true
                  println
                    var x
            ";
        }

        fn test_empty_block() {
            let stmt = "{}";
            let tree_ok = "block";
        }

        fn test_class() {
            let program = "
                class Animal extends Object {
                    int legs;
                    bool tame;
                    constructor(int legs) {
                        super();
                        this.init();
                    }
                    int legs() { return legs; }
                    void pet(Animal other, int times) {}
                }
                class Dog extends Animal {
                    constructor() { super(4); }
                }
                println(new Dog().legs());
            ";
            let tree_ok = "
                class Animal extends Object
                  field int legs
                  field bool tame
                  constructor(int legs)
                    super
                    exp
                      call init
                        receiver
                          this
                  method int legs()
                    block
                      return
                        var legs
                  method void pet(Animal other, int times)
                    block
                class Dog extends Animal
                  constructor()
                    super
                      int 4
                entry
                  println
                    call legs
                      receiver
                        new Dog
            ";
        }

        fn test_program_without_classes() {
            let program = "{ int x = 1; }";
            let tree_ok = "
                entry
                  block
                    let int x
                      int 1
            ";
        }

        fn test_error_missing_entry_point() {
            let program = "class A extends Object { constructor() { super(); } }";
            let expected_errors = &["expected an identifier, but reached the end of input"];
        }

        fn test_error_trailing_tokens() {
            let program = "println(1); }";
            let expected_errors = &["unexpected `}` at token 5 after a complete program"];
        }

        fn test_error_tokenizer() {
            let program = "println(1 - 2);";
            let expected_errors = &["unexpected character '-' at byte 10"];
        }
    );
}
