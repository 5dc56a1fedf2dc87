// program   ::= classdef* stmt
// classdef  ::= class CLASS extends CLASS '{'
//                 (vardec ';')*
//                 constructor '(' [vardec (',' vardec)*] ')' '{'
//                   super '(' [exp (',' exp)*] ')' ';'
//                   stmt*
//                 '}'
//                 methoddef*
//               '}'
// methoddef ::= type ID '(' [vardec (',' vardec)*] ')' stmt
// vardec    ::= type ID
// type      ::= int | bool | void | CLASS
// stmt      ::= if '(' exp ')' stmt else stmt
//             | while '(' exp ')' stmt
//             | return exp ';'
//             | return ';'
//             | println '(' exp ')' ';'
//             | '{' stmt* '}'
//             | vardec '=' exp ';'
//             | exp ';'
//             | ID '=' exp ';'
// exp       ::= exp '==' exp
//             | exp '<' exp
//             | exp '+' exp
//             | exp '.' ID '(' [exp (',' exp)*] ')'
//             | INT | true | false | ID | this
//             | '(' exp ')'
//             | new CLASS '(' [exp (',' exp)*] ')'

// Precedence
//
// .
// +
// <
// ==

use std::fmt;

/// Selects the annotations carried by a tree.
///
/// The parser produces [`Untyped`] trees; the type checker turns them into
/// [`Typed`] ones, in which every method call knows the static class of its
/// receiver.
pub trait Info: fmt::Debug + Clone + PartialEq {
    type Call: fmt::Debug + Clone + PartialEq;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Untyped;

impl Info for Untyped {
    type Call = ();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typed;

impl Info for Typed {
    /// The resolved class of the call's receiver.
    type Call = ClassName;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program<I: Info> {
    pub classes: Vec<ClassDef<I>>,
    /// Executed outside of any class.
    pub entry_point: Stmt<I>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef<I: Info> {
    pub name: ClassName,
    pub extends: ClassName,
    pub instance_vars: Vec<Vardec>,
    pub constructor_params: Vec<Vardec>,
    /// Arguments of the mandatory `super(...)` call.
    pub super_args: Vec<Exp<I>>,
    pub constructor_body: Vec<Stmt<I>>,
    pub methods: Vec<MethodDef<I>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef<I: Info> {
    pub return_ty: Type,
    pub name: MethodName,
    pub params: Vec<Vardec>,
    pub body: Stmt<I>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vardec {
    pub ty: Type,
    pub name: Variable,
}

impl Vardec {
    pub fn new(ty: Type, name: &str) -> Vardec {
        Vardec {
            ty,
            name: Variable::new(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<I: Info> {
    Exp(Exp<I>),
    VarInit {
        vardec: Vardec,
        value: Exp<I>,
    },
    Assign {
        target: Variable,
        value: Exp<I>,
    },
    If {
        guard: Exp<I>,
        then_arm: Box<Stmt<I>>,
        /// There is no single-armed `if`.
        else_arm: Box<Stmt<I>>,
    },
    While {
        guard: Exp<I>,
        body: Box<Stmt<I>>,
    },
    ReturnValue(Exp<I>),
    ReturnVoid,
    Println(Exp<I>),
    Block(Vec<Stmt<I>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Exp<I: Info> {
    IntLiteral(i64),
    BoolLiteral(bool),
    Variable(Variable),
    This,
    Binary {
        lhs: Box<Exp<I>>,
        op: Op,
        rhs: Box<Exp<I>>,
    },
    MethodCall {
        target: Box<Exp<I>>,
        method: MethodName,
        args: Vec<Exp<I>>,
        info: I::Call,
    },
    New {
        class: ClassName,
        args: Vec<Exp<I>>,
    },
}

impl<I: Info> Exp<I> {
    pub fn binary(lhs: Exp<I>, op: Op, rhs: Exp<I>) -> Exp<I> {
        Exp::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn variable(name: &str) -> Exp<I> {
        Exp::Variable(Variable::new(name))
    }
}

impl Exp<Untyped> {
    pub fn call(target: Exp<Untyped>, method: &str, args: Vec<Exp<Untyped>>) -> Exp<Untyped> {
        Exp::MethodCall {
            target: Box::new(target),
            method: MethodName::new(method),
            args,
            info: (),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    LessThan,
    Equals,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Plus => "+",
            Op::LessThan => "<",
            Op::Equals => "==",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Void,
    Class(ClassName),
}

impl Type {
    pub fn class(name: &str) -> Type {
        Type::Class(ClassName::new(name))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::Void => f.write_str("void"),
            Type::Class(name) => name.fmt(f),
        }
    }
}

macro_rules! name_types {
    ($($(#[$meta:meta])* $name:ident;)*) => {$(
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Box<str>);

        impl $name {
            pub fn new(name: &str) -> $name {
                $name(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<Box<str>> for $name {
            fn from(value: Box<str>) -> Self {
                $name(value)
            }
        }
    )*};
}

name_types! {
    ClassName;
    MethodName;
    /// A local variable, parameter or instance variable name.
    Variable;
}

impl ClassName {
    /// Name of the implicit root class.
    pub const OBJECT: &'static str = "Object";

    pub fn object() -> ClassName {
        ClassName::new(ClassName::OBJECT)
    }

    pub fn is_object(&self) -> bool {
        self.as_str() == ClassName::OBJECT
    }
}
