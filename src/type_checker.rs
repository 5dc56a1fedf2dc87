use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::{
    ast::{
        ClassDef, ClassName, Exp, MethodDef, MethodName, Op, Program, Stmt, Type, Typed, Untyped,
        Variable, Vardec,
    },
    types::{self, ClassTable},
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Checks the program, returning a copy of it in which every method call is
/// annotated with the static class of its receiver.
///
/// Stops at the first violation.
pub fn typecheck(program: &Program<Untyped>) -> Result<Program<Typed>> {
    let table = ClassTable::new(&program.classes)?;
    let methods = table
        .classes()
        .map(|class| (&class.name, table.method_map(&class.name)))
        .collect();
    let checker = Checker { table, methods };
    let typed = checker.check_program(program)?;
    tracing::debug!(classes = typed.classes.len(), "type checked program");
    Ok(typed)
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Hierarchy(#[from] types::Error),
    #[error("undefined class {0}")]
    UndefinedClass(ClassName),
    #[error("undefined variable {0}")]
    UndefinedVariable(Variable),
    #[error("class {class} has no method {method}")]
    UndefinedMethod { class: ClassName, method: MethodName },
    #[error("cannot call method {method} on a value of type {ty}")]
    NotAnObject { method: MethodName, ty: Type },
    #[error("{callee} expects {expected} argument(s), but got {actual}")]
    ArityMismatch {
        callee: Callee,
        expected: usize,
        actual: usize,
    },
    #[error("argument {position} of {callee} must be {expected}, but got {actual}")]
    ArgumentMismatch {
        callee: Callee,
        position: usize,
        expected: Type,
        actual: Type,
    },
    #[error("expected type {expected}, but got {actual}")]
    Mismatch { expected: Type, actual: Type },
    #[error("operator {op} requires int operands, but got {lhs} and {rhs}")]
    OperandMismatch { op: Op, lhs: Type, rhs: Type },
    #[error("condition must be bool, but got {0}")]
    NonBoolGuard(Type),
    #[error("`this` used outside of a class")]
    ThisOutsideClass,
    #[error("`return` used outside of a method or constructor")]
    ReturnOutsideMethod,
    #[error("`return;` in a context returning {0}")]
    MissingReturnValue(Type),
    #[error("instance variable {name} is declared more than once in class {class}")]
    DuplicateInstanceVar { class: ClassName, name: Variable },
    #[error("parameter {0} is declared more than once")]
    DuplicateParam(Variable),
    #[error("class {class} defines method {method} more than once")]
    DuplicateMethod { class: ClassName, method: MethodName },
}

/// Something that takes an argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callee {
    Method { class: ClassName, method: MethodName },
    Constructor(ClassName),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Method { class, method } => write!(f, "method {class}.{method}"),
            Callee::Constructor(class) => write!(f, "constructor of {class}"),
        }
    }
}

/// Maps the variables in scope to their types.
///
/// Never mutated in place: every extension produces a new environment, so the
/// scope which was extended stays intact.
#[derive(Clone, Debug, Default)]
struct Env {
    vars: HashMap<Variable, Type>,
}

impl Env {
    /// Returns a new environment in which `name` is bound to `ty`. An existing
    /// binding of the same name is replaced.
    fn with(&self, name: &Variable, ty: &Type) -> Env {
        let mut vars = self.vars.clone();
        vars.insert(name.clone(), ty.clone());
        Env { vars }
    }

    fn with_all<'a>(&self, vardecs: impl IntoIterator<Item = &'a Vardec>) -> Env {
        let mut vars = self.vars.clone();
        vars.extend(vardecs.into_iter().map(|v| (v.name.clone(), v.ty.clone())));
        Env { vars }
    }

    fn lookup(&self, name: &Variable) -> Result<&Type> {
        self.vars
            .get(name)
            .ok_or_else(|| Error::UndefinedVariable(name.clone()))
    }
}

/// What surrounds the code being checked.
#[derive(Clone, Copy)]
struct Context<'a> {
    /// The class of `this`. `None` in the entry point.
    class: Option<&'a ClassName>,
    /// `None` in the entry point, where `return` is illegal.
    return_ty: Option<&'a Type>,
}

/// Methods of a class, inherited ones included.
type MethodMap<'p> = HashMap<&'p MethodName, &'p MethodDef<Untyped>>;

struct Checker<'p> {
    table: ClassTable<'p, Untyped>,
    methods: HashMap<&'p ClassName, MethodMap<'p>>,
}

impl Checker<'_> {
    fn check_program(&self, program: &Program<Untyped>) -> Result<Program<Typed>> {
        let classes = program
            .classes
            .iter()
            .map(|class| self.check_class(class))
            .collect::<Result<_>>()?;

        let entry = Context {
            class: None,
            return_ty: None,
        };
        let (entry_point, _) = self.check_stmt(&Env::default(), &program.entry_point, entry)?;

        Ok(Program {
            classes,
            entry_point,
        })
    }

    fn check_class(&self, class: &ClassDef<Untyped>) -> Result<ClassDef<Typed>> {
        tracing::trace!(class = %class.name, "checking class");
        let fields = self.instance_env(class)?;

        let mut method_names = HashSet::with_capacity(class.methods.len());
        for method in &class.methods {
            if !method_names.insert(&method.name) {
                return Err(Error::DuplicateMethod {
                    class: class.name.clone(),
                    method: method.name.clone(),
                });
            }
        }

        // Constructor
        let void = Type::Void;
        let ctx = Context {
            class: Some(&class.name),
            return_ty: Some(&void),
        };
        self.check_params(&class.constructor_params)?;
        let env = fields.with_all(&class.constructor_params);
        let super_args = self.check_args(
            &env,
            ctx,
            &class.super_args,
            self.constructor_params(&class.extends),
            Callee::Constructor(class.extends.clone()),
        )?;
        let (constructor_body, _) = self.check_stmts(&env, &class.constructor_body, ctx)?;

        let methods = class
            .methods
            .iter()
            .map(|method| self.check_method(&fields, &class.name, method))
            .collect::<Result<_>>()?;

        Ok(ClassDef {
            name: class.name.clone(),
            extends: class.extends.clone(),
            instance_vars: class.instance_vars.clone(),
            constructor_params: class.constructor_params.clone(),
            super_args,
            constructor_body,
            methods,
        })
    }

    /// Builds the environment with every instance variable visible in
    /// `class`. Ancestors come first, so redeclaring an inherited instance
    /// variable is reported as a duplicate.
    fn instance_env(&self, class: &ClassDef<Untyped>) -> Result<Env> {
        let mut vars = HashMap::new();
        for def in self.table.lineage(&class.name) {
            for var in &def.instance_vars {
                self.check_defined(&var.ty)?;
                if vars.insert(var.name.clone(), var.ty.clone()).is_some() {
                    return Err(Error::DuplicateInstanceVar {
                        class: class.name.clone(),
                        name: var.name.clone(),
                    });
                }
            }
        }
        Ok(Env { vars })
    }

    fn check_method(
        &self,
        fields: &Env,
        class: &ClassName,
        method: &MethodDef<Untyped>,
    ) -> Result<MethodDef<Typed>> {
        tracing::trace!(%class, method = %method.name, "checking method");
        self.check_defined(&method.return_ty)?;
        self.check_params(&method.params)?;

        let ctx = Context {
            class: Some(class),
            return_ty: Some(&method.return_ty),
        };
        let env = fields.with_all(&method.params);
        let (body, _) = self.check_stmt(&env, &method.body, ctx)?;

        Ok(MethodDef {
            return_ty: method.return_ty.clone(),
            name: method.name.clone(),
            params: method.params.clone(),
            body,
        })
    }

    /// Parameter names must be unique and their types must exist.
    fn check_params(&self, params: &[Vardec]) -> Result<()> {
        let mut seen = HashSet::with_capacity(params.len());
        for param in params {
            self.check_defined(&param.ty)?;
            if !seen.insert(&param.name) {
                return Err(Error::DuplicateParam(param.name.clone()));
            }
        }
        Ok(())
    }

    fn check_defined(&self, ty: &Type) -> Result<()> {
        match ty {
            Type::Class(name) if !self.table.is_defined(ty) => {
                Err(Error::UndefinedClass(name.clone()))
            }
            _ => Ok(()),
        }
    }

    fn constructor_params(&self, class: &ClassName) -> &[Vardec] {
        // The implicit root takes no arguments.
        self.table
            .get(class)
            .map_or(&[][..], |def| def.constructor_params.as_slice())
    }

    /// Checks a statement sequence, threading the environment through it.
    fn check_stmts(
        &self,
        env: &Env,
        stmts: &[Stmt<Untyped>],
        ctx: Context<'_>,
    ) -> Result<(Vec<Stmt<Typed>>, Env)> {
        let mut env = env.clone();
        let mut checked = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let (stmt, next) = self.check_stmt(&env, stmt, ctx)?;
            checked.push(stmt);
            env = next;
        }
        Ok((checked, env))
    }

    /// Returns the checked statement and the environment for the statements
    /// that follow it.
    fn check_stmt(
        &self,
        env: &Env,
        stmt: &Stmt<Untyped>,
        ctx: Context<'_>,
    ) -> Result<(Stmt<Typed>, Env)> {
        let stmt = match stmt {
            Stmt::Exp(exp) => {
                let (exp, _) = self.check_exp(env, exp, ctx)?;
                Stmt::Exp(exp)
            }
            Stmt::VarInit { vardec, value } => {
                self.check_defined(&vardec.ty)?;
                let value = self.check_exp_against(env, value, ctx, &vardec.ty)?;
                let next = env.with(&vardec.name, &vardec.ty);
                let stmt = Stmt::VarInit {
                    vardec: vardec.clone(),
                    value,
                };
                return Ok((stmt, next));
            }
            Stmt::Assign { target, value } => {
                let expected = env.lookup(target)?;
                let value = self.check_exp_against(env, value, ctx, expected)?;
                Stmt::Assign {
                    target: target.clone(),
                    value,
                }
            }
            Stmt::If {
                guard,
                then_arm,
                else_arm,
            } => Stmt::If {
                guard: self.check_guard(env, guard, ctx)?,
                then_arm: Box::new(self.check_stmt(env, then_arm, ctx)?.0),
                else_arm: Box::new(self.check_stmt(env, else_arm, ctx)?.0),
            },
            Stmt::While { guard, body } => Stmt::While {
                guard: self.check_guard(env, guard, ctx)?,
                body: Box::new(self.check_stmt(env, body, ctx)?.0),
            },
            Stmt::ReturnValue(exp) => {
                let return_ty = ctx.return_ty.ok_or(Error::ReturnOutsideMethod)?;
                Stmt::ReturnValue(self.check_exp_against(env, exp, ctx, return_ty)?)
            }
            Stmt::ReturnVoid => match ctx.return_ty {
                None => return Err(Error::ReturnOutsideMethod),
                Some(Type::Void) => Stmt::ReturnVoid,
                Some(other) => return Err(Error::MissingReturnValue(other.clone())),
            },
            Stmt::Println(exp) => Stmt::Println(self.check_exp(env, exp, ctx)?.0),
            Stmt::Block(stmts) => Stmt::Block(self.check_stmts(env, stmts, ctx)?.0),
        };
        Ok((stmt, env.clone()))
    }

    fn check_guard(&self, env: &Env, guard: &Exp<Untyped>, ctx: Context<'_>) -> Result<Exp<Typed>> {
        match self.check_exp(env, guard, ctx)? {
            (guard, Type::Bool) => Ok(guard),
            (_, other) => Err(Error::NonBoolGuard(other)),
        }
    }

    /// Checks `exp` and requires its type to be compatible with `expected`.
    fn check_exp_against(
        &self,
        env: &Env,
        exp: &Exp<Untyped>,
        ctx: Context<'_>,
        expected: &Type,
    ) -> Result<Exp<Typed>> {
        let (exp, actual) = self.check_exp(env, exp, ctx)?;
        if self.table.is_subtype_of(&actual, expected) {
            Ok(exp)
        } else {
            Err(Error::Mismatch {
                expected: expected.clone(),
                actual,
            })
        }
    }

    fn check_exp(
        &self,
        env: &Env,
        exp: &Exp<Untyped>,
        ctx: Context<'_>,
    ) -> Result<(Exp<Typed>, Type)> {
        let checked = match exp {
            Exp::IntLiteral(value) => (Exp::IntLiteral(*value), Type::Int),
            Exp::BoolLiteral(value) => (Exp::BoolLiteral(*value), Type::Bool),
            Exp::Variable(name) => (Exp::Variable(name.clone()), env.lookup(name)?.clone()),
            Exp::This => {
                let class = ctx.class.ok_or(Error::ThisOutsideClass)?;
                (Exp::This, Type::Class(class.clone()))
            }
            Exp::Binary { lhs, op, rhs } => {
                let (lhs, lhs_ty) = self.check_exp(env, lhs, ctx)?;
                let (rhs, rhs_ty) = self.check_exp(env, rhs, ctx)?;
                if lhs_ty != Type::Int || rhs_ty != Type::Int {
                    return Err(Error::OperandMismatch {
                        op: *op,
                        lhs: lhs_ty,
                        rhs: rhs_ty,
                    });
                }
                let ty = match op {
                    Op::Plus => Type::Int,
                    Op::LessThan | Op::Equals => Type::Bool,
                };
                (Exp::binary(lhs, *op, rhs), ty)
            }
            Exp::MethodCall {
                target,
                method,
                args,
                info: (),
            } => {
                let (target, target_ty) = self.check_exp(env, target, ctx)?;
                let class = match target_ty {
                    Type::Class(class) => class,
                    ty => {
                        return Err(Error::NotAnObject {
                            method: method.clone(),
                            ty,
                        })
                    }
                };
                let def = self
                    .methods
                    .get(&class)
                    .and_then(|methods| methods.get(method))
                    .copied()
                    .ok_or_else(|| Error::UndefinedMethod {
                        class: class.clone(),
                        method: method.clone(),
                    })?;
                let callee = Callee::Method {
                    class: class.clone(),
                    method: method.clone(),
                };
                let args = self.check_args(env, ctx, args, &def.params, callee)?;
                let call = Exp::MethodCall {
                    target: Box::new(target),
                    method: method.clone(),
                    args,
                    info: class,
                };
                (call, def.return_ty.clone())
            }
            Exp::New { class, args } => {
                if !self.table.contains(class) {
                    return Err(Error::UndefinedClass(class.clone()));
                }
                let params = self.constructor_params(class);
                let callee = Callee::Constructor(class.clone());
                let args = self.check_args(env, ctx, args, params, callee)?;
                let new = Exp::New {
                    class: class.clone(),
                    args,
                };
                (new, Type::Class(class.clone()))
            }
        };
        Ok(checked)
    }

    /// Checks the arguments of a call against the parameters they are bound
    /// to, in order.
    fn check_args(
        &self,
        env: &Env,
        ctx: Context<'_>,
        args: &[Exp<Untyped>],
        params: &[Vardec],
        callee: Callee,
    ) -> Result<Vec<Exp<Typed>>> {
        if args.len() != params.len() {
            return Err(Error::ArityMismatch {
                callee,
                expected: params.len(),
                actual: args.len(),
            });
        }
        let mut checked = Vec::with_capacity(args.len());
        for (position, (arg, param)) in args.iter().zip(params).enumerate() {
            let (arg, actual) = self.check_exp(env, arg, ctx)?;
            if !self.table.is_subtype_of(&actual, &param.ty) {
                return Err(Error::ArgumentMismatch {
                    callee,
                    position: position + 1,
                    expected: param.ty.clone(),
                    actual,
                });
            }
            checked.push(arg);
        }
        Ok(checked)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer::tokenize, parser::parse, util::test_utils::tree_tests};

    fn check(src: &str) -> Result<Program<Typed>> {
        typecheck(&parse(&tokenize(src).expect("failed to tokenize")).expect("failed to parse"))
    }

    const ANIMALS: &str = "
        class Animal extends Object {
            int legs;
            constructor(int legs) { super(); }
            int legs() { return legs; }
            Animal me() { return this; }
        }
        class Dog extends Animal {
            constructor() { super(4); }
            bool barks() { return true; }
        }
    ";

    fn with_animals(entry: &str) -> String {
        format!("{ANIMALS} {entry}")
    }

    #[test]
    fn test_demos_check() {
        for demo in crate::util::test_utils::DEMOS {
            assert!(check(demo).is_ok());
        }
    }

    #[test]
    fn test_cyclic_inheritance() {
        let src = "
            class A extends B { constructor() { super(); } }
            class B extends A { constructor() { super(); } }
            println(1);
        ";
        assert_eq!(
            check(src).unwrap_err(),
            Error::Hierarchy(types::Error::InheritanceCycle(ClassName::new("A")))
        );
    }

    #[test]
    fn test_subclass_is_assignable_to_superclass() {
        assert!(check(&with_animals("Animal a = new Dog();")).is_ok());
        assert!(check(&with_animals("Object o = new Dog();")).is_ok());
        assert!(check(&with_animals("println(new Animal(2).me().legs());")).is_ok());
        assert_eq!(
            check(&with_animals("Dog d = new Animal(2);")).unwrap_err(),
            Error::Mismatch {
                expected: Type::class("Dog"),
                actual: Type::class("Animal"),
            }
        );
    }

    #[test]
    fn test_subclass_is_passable_as_superclass() {
        let src = "
            class Box extends Object {
                Animal item;
                constructor(Animal item) { super(); }
                Animal get() { return item; }
            }
            { Box b = new Box(new Dog()); println(b.get().legs()); }
        ";
        assert!(check(&with_animals(src)).is_ok());

        let src = "
            class Kennel extends Object {
                constructor(Dog dog) { super(); }
            }
            Kennel k = new Kennel(new Animal(3));
        ";
        assert_eq!(
            check(&with_animals(src)).unwrap_err(),
            Error::ArgumentMismatch {
                callee: Callee::Constructor(ClassName::new("Kennel")),
                position: 1,
                expected: Type::class("Dog"),
                actual: Type::class("Animal"),
            }
        );
    }

    #[test]
    fn test_calls() {
        let err = |entry: &str| check(&with_animals(entry)).unwrap_err().to_string();

        assert_eq!(err("new Animal(1).barks();"), "class Animal has no method barks");
        assert_eq!(err("new Object().legs();"), "class Object has no method legs");
        assert_eq!(
            err("println(1.legs());"),
            "cannot call method legs on a value of type int"
        );
        assert_eq!(
            err("new Dog().legs(1);"),
            "method Dog.legs expects 0 argument(s), but got 1"
        );
        assert_eq!(
            err("new Animal(true);"),
            "argument 1 of constructor of Animal must be int, but got bool"
        );
        assert_eq!(err("new Cat();"), "undefined class Cat");
        assert!(check(&with_animals("println(new Dog().barks());")).is_ok());
    }

    #[test]
    fn test_super_args_match_parent_constructor() {
        let src = "
            class Puppy extends Dog {
                constructor() { super(1); }
            }
            println(1);
        ";
        assert_eq!(
            check(&with_animals(src)).unwrap_err().to_string(),
            "constructor of Dog expects 0 argument(s), but got 1"
        );
    }

    #[test]
    fn test_entry_point_context() {
        assert_eq!(check("println(this);").unwrap_err(), Error::ThisOutsideClass);
        assert_eq!(check("return 1;").unwrap_err(), Error::ReturnOutsideMethod);
        assert_eq!(check("return;").unwrap_err(), Error::ReturnOutsideMethod);
    }

    #[test]
    fn test_returns() {
        let class = |body: &str| {
            format!(
                "class A extends Object {{
                    constructor() {{ super(); }}
                    {body}
                }}
                println(0);"
            )
        };

        assert!(check(&class("void f() { return; }")).is_ok());
        assert!(check(&class("int f() { if (true) return 1; else return 2; }")).is_ok());
        assert_eq!(
            check(&class("int f() { return; }")).unwrap_err(),
            Error::MissingReturnValue(Type::Int)
        );
        assert_eq!(
            check(&class("void f() { return 1; }")).unwrap_err(),
            Error::Mismatch {
                expected: Type::Void,
                actual: Type::Int,
            }
        );
        assert_eq!(
            check(&class("bool f() { return 1; }")).unwrap_err(),
            Error::Mismatch {
                expected: Type::Bool,
                actual: Type::Int,
            }
        );

        // Constructors return nothing.
        let src = "
            class A extends Object {
                constructor() { super(); return; }
            }
            println(0);
        ";
        assert!(check(src).is_ok());
        let src = "
            class A extends Object {
                constructor() { super(); return 1; }
            }
            println(0);
        ";
        assert!(check(src).is_err());
    }

    #[test]
    fn test_duplicates() {
        let err = |src: &str| check(src).unwrap_err().to_string();

        assert_eq!(
            err("
                class A extends Object { int x; constructor() { super(); } }
                class B extends A { bool x; constructor() { super(); } }
                println(0);
            "),
            "instance variable x is declared more than once in class B"
        );
        assert_eq!(
            err("
                class A extends Object { int x; int x; constructor() { super(); } }
                println(0);
            "),
            "instance variable x is declared more than once in class A"
        );
        assert_eq!(
            err("
                class A extends Object { constructor(int a, bool a) { super(); } }
                println(0);
            "),
            "parameter a is declared more than once"
        );
        assert_eq!(
            err("
                class A extends Object {
                    constructor() { super(); }
                    int f(int a, int a) { return a; }
                }
                println(0);
            "),
            "parameter a is declared more than once"
        );
        assert_eq!(
            err("
                class A extends Object {
                    constructor() { super(); }
                    int f() { return 1; }
                    bool f() { return true; }
                }
                println(0);
            "),
            "class A defines method f more than once"
        );
        assert_eq!(
            err("
                class A extends Object { constructor() { super(); } }
                class A extends Object { constructor() { super(); } }
                println(0);
            "),
            "class A is defined more than once"
        );
    }

    #[test]
    fn test_overrides_need_no_matching_signature() {
        let src = "
            class A extends Object {
                constructor() { super(); }
                int f() { return 1; }
            }
            class B extends A {
                constructor() { super(); }
                bool f(int x) { return true; }
            }
            println(new B().f(1));
        ";
        assert!(check(src).is_ok());
    }

    #[test]
    fn test_statements() {
        let err = |src: &str| check(src).unwrap_err().to_string();

        assert_eq!(
            err("if (1) println(1); else println(2);"),
            "condition must be bool, but got int"
        );
        assert_eq!(err("while (0 + 1) {}"), "condition must be bool, but got int");
        assert_eq!(err("{ int x = true; }"), "expected type int, but got bool");
        assert_eq!(err("{ int x = 1; x = false; }"), "expected type int, but got bool");
        assert_eq!(err("y = 1;"), "undefined variable y");
        assert_eq!(
            err("println(true + 1);"),
            "operator + requires int operands, but got bool and int"
        );
        assert_eq!(
            err("println(true == true);"),
            "operator == requires int operands, but got bool and bool"
        );
        assert_eq!(err("{ Cat c = 1; }"), "undefined class Cat");
        // The declaration is only visible after it.
        assert_eq!(err("{ int x = x; }"), "undefined variable x");
        // Declarations do not escape their block.
        assert_eq!(err("{ { int x = 1; } println(x); }"), "undefined variable x");

        assert!(check("{ int x = 1; bool x = true; println(x); }").is_ok());
        assert!(check("{ int x = 1; x = x + 1; println(x < 2 == 1 < 2); }").is_err());
        assert!(check("{ int x = 1; x = x + 1; println(x < 2); }").is_ok());
    }

    #[test]
    fn test_instance_variables_and_parameters() {
        let src = "
            class Counter extends Object {
                int count;
                constructor(int start) {
                    super();
                    count = start;
                }
                int bump(int by) {
                    count = count + by;
                    return count;
                }
            }
            println(new Counter(1).bump(2));
        ";
        assert!(check(src).is_ok());

        // Inherited instance variables are visible in subclasses.
        let src = "
            class Sub extends Animal {
                constructor() { super(2); legs = 3; }
            }
            println(new Sub().legs());
        ";
        assert!(check(&with_animals(src)).is_ok());
    }

    tree_tests!(
        use checker;

        fn test_calls_are_annotated_with_the_receiver_class() {
            let program = "
                class A extends Object {
                    constructor() { super(); }
                    A me() { return this; }
                }
                class B extends A {
                    constructor() { super(); }
                }
                println(new B().me().me());
            ";
            let tree_ok = "
                class A extends Object
                  constructor()
                    super
                  method A me()
                    block
                      return
                        this
                class B extends A
                  constructor()
                    super
                entry
                  println
                    call me %: A
                      receiver
                        call me %: B
                          receiver
                            new B
            ";
        }

        fn test_checker_reports_first_error() {
            let program = "{ println(x); println(this); }";
            let expected_errors = &["undefined variable x"];
        }
    );
}
