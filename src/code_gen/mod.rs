use std::{
    collections::HashSet,
    fmt::{self, Write},
    format_args as f,
};

use crate::{
    ast::{ClassDef, ClassName, Exp, MethodDef, Program, Stmt, Typed, Variable, Vardec},
    types::{self, ClassTable},
};

pub mod vtable;


use vtable::VTables;

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

const INDENT: &str = "  ";

/// Object construction and dynamic dispatch helpers, plus the constructor of
/// the implicit root class.
const RUNTIME: &str = "\
function makeObject(vtable, constructor, ...params) {
  let self = {};
  self.vtable = vtable;
  constructor(self, ...params);
  return self;
}
function doCall(self, index, ...params) {
  return self.vtable[index](self, ...params);
}
function Object_constructor(self) {}
";

type Result<T, E = Error> = std::result::Result<T, E>;

/// Translates a checked program into JavaScript.
pub fn generate_code(program: &Program<Typed>) -> Result<String> {
    let table = ClassTable::new(&program.classes)?;
    let vtables = VTables::build(&table);
    let code = CodeGen::with_capacity(&vtables).gen(&table, program)?;
    tracing::debug!(bytes = code.len(), "generated code");
    Ok(code)
}

/// Only reachable for programs which did not go through the type checker.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Hierarchy(#[from] types::Error),
    #[error("no vtable for class {0}")]
    MissingVTable(ClassName),
    #[error("method {method} has no slot in the vtable of class {class}")]
    MissingSlot { class: ClassName, method: Box<str> },
}

/// Names bound in the target function being generated. Any other name refers
/// to an instance variable of the receiver.
///
/// Extended functionally: generating a declaration yields a new set for the
/// statements that follow it.
#[derive(Clone, Debug, Default)]
struct Locals(HashSet<Variable>);

impl Locals {
    fn of(params: &[Vardec]) -> Locals {
        Locals(params.iter().map(|param| param.name.clone()).collect())
    }

    fn with(&self, name: &Variable) -> Locals {
        let mut locals = self.0.clone();
        locals.insert(name.clone());
        Locals(locals)
    }

    fn contains(&self, name: &Variable) -> bool {
        self.0.contains(name)
    }
}

pub struct CodeGen<'v> {
    code: String,
    indent: usize,
    vtables: &'v VTables,
}

impl CodeGen<'_> {
    pub fn with_capacity(vtables: &VTables) -> CodeGen<'_> {
        CodeGen {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            indent: 0,
            vtables,
        }
    }

    pub fn gen(mut self, table: &ClassTable<'_, Typed>, program: &Program<Typed>) -> Result<String> {
        self.gen_program(table, program)?;

        Ok(self.code)
    }

    fn gen_program(&mut self, table: &ClassTable<'_, Typed>, program: &Program<Typed>) -> Result<()> {
        self.emit(f!("{RUNTIME}"));

        let object = ClassName::object();
        self.gen_vtable(&object)?;
        for class in table.classes() {
            self.gen_vtable(&class.name)?;
        }

        for class in table.classes() {
            tracing::trace!(class = %class.name, "generating class");
            self.gen_constructor(class)?;
            for method in &class.methods {
                self.gen_method(&class.name, method)?;
            }
        }

        self.gen_stmt(&Locals::default(), &program.entry_point)?;
        Ok(())
    }

    fn gen_vtable(&mut self, class: &ClassName) -> Result<()> {
        let vtable = self
            .vtables
            .get(class)
            .ok_or_else(|| Error::MissingVTable(class.clone()))?;
        let entries = vtable.entries().collect::<Vec<_>>().join(", ");
        self.out(f!("let vtable_{class} = [{entries}];"));
        Ok(())
    }

    fn gen_constructor(&mut self, class: &ClassDef<Typed>) -> Result<()> {
        let name = Mangled(&class.name, "constructor");
        let params = Params(&class.constructor_params);
        self.out(f!("function {name}({params}) {{"));

        let locals = Locals::of(&class.constructor_params);
        self.indented(|this| {
            this.start_line();
            this.emit(f!("{}(self", Mangled(&class.extends, "constructor")));
            for arg in &class.super_args {
                this.emit(f!(", "));
                this.gen_exp(&locals, arg)?;
            }
            this.emit(f!(");\n"));
            if class.constructor_body.is_empty() {
                return Ok(());
            }
            this.nested(|this| this.gen_stmts(&locals, &class.constructor_body))
        })?;

        self.out(f!("}}"));
        Ok(())
    }

    fn gen_method(&mut self, class: &ClassName, method: &MethodDef<Typed>) -> Result<()> {
        let name = Mangled(class, method.name.as_str());
        let params = Params(&method.params);
        self.out(f!("function {name}({params}) {{"));

        let locals = Locals::of(&method.params);
        // A declaration directly in the function scope would clash with a
        // parameter of the same name.
        self.indented(|this| this.nested(|this| this.gen_body(&locals, &method.body)))?;

        self.out(f!("}}"));
        Ok(())
    }

    /// Generates the contents of a braced target block. The braces of a block
    /// statement are not repeated.
    fn gen_body(&mut self, locals: &Locals, body: &Stmt<Typed>) -> Result<()> {
        match body {
            Stmt::Block(stmts) => self.gen_stmts(locals, stmts),
            other => self.gen_stmt(locals, other).map(drop),
        }
    }

    /// Generates a statement sequence. Every statement after the first one
    /// opens a new nested block, so that a redeclared name never clashes with
    /// an earlier binding of the same scope.
    fn gen_stmts(&mut self, locals: &Locals, stmts: &[Stmt<Typed>]) -> Result<()> {
        let mut locals = locals.clone();
        let mut depth = 0;
        for (idx, stmt) in stmts.iter().enumerate() {
            if idx > 0 {
                self.out(f!("{{"));
                self.indent += 1;
                depth += 1;
            }
            locals = self.gen_stmt(&locals, stmt)?;
        }
        for _ in 0..depth {
            self.indent -= 1;
            self.out(f!("}}"));
        }
        Ok(())
    }

    /// Returns the locals visible to the statements after this one.
    fn gen_stmt(&mut self, locals: &Locals, stmt: &Stmt<Typed>) -> Result<Locals> {
        match stmt {
            Stmt::Exp(exp) => {
                self.start_line();
                self.gen_exp(locals, exp)?;
                self.emit(f!(";\n"));
            }
            Stmt::VarInit { vardec, value } => {
                self.start_line();
                self.emit(f!("let {} = ", vardec.name));
                self.gen_exp(locals, value)?;
                self.emit(f!(";\n"));
                return Ok(locals.with(&vardec.name));
            }
            Stmt::Assign { target, value } => {
                self.start_line();
                self.gen_variable(locals, target);
                self.emit(f!(" = "));
                self.gen_exp(locals, value)?;
                self.emit(f!(";\n"));
            }
            Stmt::If {
                guard,
                then_arm,
                else_arm,
            } => {
                self.start_line();
                self.emit(f!("if ("));
                self.gen_exp(locals, guard)?;
                self.emit(f!(") {{\n"));
                self.indented(|this| this.gen_body(locals, then_arm))?;
                self.out(f!("}} else {{"));
                self.indented(|this| this.gen_body(locals, else_arm))?;
                self.out(f!("}}"));
            }
            Stmt::While { guard, body } => {
                self.start_line();
                self.emit(f!("while ("));
                self.gen_exp(locals, guard)?;
                self.emit(f!(") {{\n"));
                self.indented(|this| this.gen_body(locals, body))?;
                self.out(f!("}}"));
            }
            Stmt::ReturnValue(exp) => {
                self.start_line();
                self.emit(f!("return "));
                self.gen_exp(locals, exp)?;
                self.emit(f!(";\n"));
            }
            Stmt::ReturnVoid => {
                self.out(f!("return;"));
            }
            Stmt::Println(exp) => {
                self.start_line();
                self.emit(f!("console.log("));
                self.gen_exp(locals, exp)?;
                self.emit(f!(");\n"));
            }
            Stmt::Block(stmts) => {
                self.out(f!("{{"));
                self.indented(|this| this.gen_stmts(locals, stmts))?;
                self.out(f!("}}"));
            }
        }
        Ok(locals.clone())
    }

    fn gen_exp(&mut self, locals: &Locals, exp: &Exp<Typed>) -> Result<()> {
        match exp {
            Exp::IntLiteral(value) => self.emit(f!("{value}")),
            Exp::BoolLiteral(value) => self.emit(f!("{value}")),
            Exp::Variable(name) => self.gen_variable(locals, name),
            Exp::This => self.emit(f!("self")),
            Exp::Binary { lhs, op, rhs } => {
                self.emit(f!("("));
                self.gen_exp(locals, lhs)?;
                self.emit(f!(" {op} "));
                self.gen_exp(locals, rhs)?;
                self.emit(f!(")"));
            }
            Exp::MethodCall {
                target,
                method,
                args,
                info: class,
            } => {
                let slot = self
                    .vtables
                    .get(class)
                    .ok_or_else(|| Error::MissingVTable(class.clone()))?
                    .slot(method)
                    .ok_or_else(|| Error::MissingSlot {
                        class: class.clone(),
                        method: method.as_str().into(),
                    })?;
                self.emit(f!("doCall("));
                self.gen_exp(locals, target)?;
                self.emit(f!(", {slot}"));
                self.gen_args(locals, args)?;
                self.emit(f!(")"));
            }
            Exp::New { class, args } => {
                let constructor = Mangled(class, "constructor");
                self.emit(f!("makeObject(vtable_{class}, {constructor}"));
                self.gen_args(locals, args)?;
                self.emit(f!(")"));
            }
        }
        Ok(())
    }

    /// Generates `, arg` for each argument.
    fn gen_args(&mut self, locals: &Locals, args: &[Exp<Typed>]) -> Result<()> {
        for arg in args {
            self.emit(f!(", "));
            self.gen_exp(locals, arg)?;
        }
        Ok(())
    }

    fn gen_variable(&mut self, locals: &Locals, name: &Variable) {
        if locals.contains(name) {
            self.emit(f!("{name}"));
        } else {
            self.emit(f!("self.{name}"));
        }
    }
}

// Utility functions.
impl CodeGen<'_> {
    fn emit(&mut self, f: fmt::Arguments<'_>) {
        // Writing into a `String` never fails.
        _ = self.code.write_fmt(f);
    }

    /// Emits the indentation of a new line.
    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.code.push_str(INDENT);
        }
    }

    /// Emits an indented line.
    fn out(&mut self, f: fmt::Arguments<'_>) {
        self.start_line();
        self.emit(f);
        self.code.push('\n');
    }

    /// Runs `f` inside a new target block.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.out(f!("{{"));
        let res = self.indented(f);
        self.out(f!("}}"));
        res
    }

    /// Runs `f` one indentation level deeper.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent += 1;
        let res = f(self);
        self.indent -= 1;
        res
    }
}

/// The target function name of a class member: `Class_member`.
#[derive(Copy, Clone)]
struct Mangled<'a>(&'a ClassName, &'a str);

impl fmt::Display for Mangled<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.0, self.1)
    }
}

/// A parameter list, receiver first.
struct Params<'a>(&'a [Vardec]);

impl fmt::Display for Params<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("self")?;
        for param in self.0 {
            write!(f, ", {}", param.name)?;
        }
        Ok(())
    }
}
