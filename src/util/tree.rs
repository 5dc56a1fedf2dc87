use std::fmt::{self, Write};

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

pub fn print_program_string<I: InfoWriter>(program: &Program<I>) -> String {
    let mut buf = String::with_capacity(1024);
    // Writing into a `String` never fails.
    _ = print_program(&mut buf, program);
    buf
}

pub fn print_stmt_string<I: InfoWriter>(stmt: &Stmt<I>) -> String {
    let mut buf = String::with_capacity(512);
    _ = print_stmt(&mut buf, 0, stmt);
    buf
}

pub fn print_exp_string<I: InfoWriter>(exp: &Exp<I>) -> String {
    let mut buf = String::with_capacity(512);
    _ = print_exp(&mut buf, 0, exp);
    buf
}

pub fn print_program<I: InfoWriter>(w: &mut impl Write, program: &Program<I>) -> fmt::Result {
    for class in &program.classes {
        print_class(w, 0, class)?;
    }
    writeln!(w, "entry")?;
    print_stmt(w, 1, &program.entry_point)
}

fn print_class<I: InfoWriter>(w: &mut impl Write, i: usize, class: &ClassDef<I>) -> fmt::Result {
    sp(w, i)?;
    writeln!(w, "class {} extends {}", class.name, class.extends)?;

    for var in &class.instance_vars {
        sp(w, i + 1)?;
        writeln!(w, "field {} {}", var.ty, var.name)?;
    }

    sp(w, i + 1)?;
    write!(w, "constructor(")?;
    print_params(w, &class.constructor_params)?;
    writeln!(w, ")")?;
    sp(w, i + 2)?;
    writeln!(w, "super")?;
    for arg in &class.super_args {
        print_exp(w, i + 3, arg)?;
    }
    for stmt in &class.constructor_body {
        print_stmt(w, i + 2, stmt)?;
    }

    for method in &class.methods {
        sp(w, i + 1)?;
        write!(w, "method {} {}(", method.return_ty, method.name)?;
        print_params(w, &method.params)?;
        writeln!(w, ")")?;
        print_stmt(w, i + 2, &method.body)?;
    }
    Ok(())
}

fn print_params(w: &mut impl Write, params: &[Vardec]) -> fmt::Result {
    for (idx, param) in params.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{} {}", param.ty, param.name)?;
    }
    Ok(())
}

pub fn print_stmt<I: InfoWriter>(w: &mut impl Write, i: usize, stmt: &Stmt<I>) -> fmt::Result {
    sp(w, i)?;
    match stmt {
        Stmt::Exp(exp) => {
            writeln!(w, "exp")?;
            print_exp(w, i + 1, exp)?;
        }
        Stmt::VarInit { vardec, value } => {
            writeln!(w, "let {} {}", vardec.ty, vardec.name)?;
            print_exp(w, i + 1, value)?;
        }
        Stmt::Assign { target, value } => {
            writeln!(w, "assign {target}")?;
            print_exp(w, i + 1, value)?;
        }
        Stmt::If {
            guard,
            then_arm,
            else_arm,
        } => {
            writeln!(w, "if")?;
            print_exp(w, i + 1, guard)?;
            print_stmt(w, i + 1, then_arm)?;
            print_stmt(w, i + 1, else_arm)?;
        }
        Stmt::While { guard, body } => {
            writeln!(w, "while")?;
            print_exp(w, i + 1, guard)?;
            print_stmt(w, i + 1, body)?;
        }
        Stmt::ReturnValue(exp) => {
            writeln!(w, "return")?;
            print_exp(w, i + 1, exp)?;
        }
        Stmt::ReturnVoid => {
            writeln!(w, "return")?;
        }
        Stmt::Println(exp) => {
            writeln!(w, "println")?;
            print_exp(w, i + 1, exp)?;
        }
        Stmt::Block(body) => {
            writeln!(w, "block")?;
            for item in body {
                print_stmt(w, i + 1, item)?;
            }
        }
    }
    Ok(())
}

pub fn print_exp<I: InfoWriter>(w: &mut impl Write, i: usize, exp: &Exp<I>) -> fmt::Result {
    sp(w, i)?;
    match exp {
        Exp::IntLiteral(value) => {
            writeln!(w, "int {value}")?;
        }
        Exp::BoolLiteral(value) => {
            writeln!(w, "bool {value}")?;
        }
        Exp::Variable(name) => {
            writeln!(w, "var {name}")?;
        }
        Exp::This => {
            writeln!(w, "this")?;
        }
        Exp::Binary { lhs, op, rhs } => {
            writeln!(w, "binary {}", op.symbol())?;
            print_exp(w, i + 1, lhs)?;
            print_exp(w, i + 1, rhs)?;
        }
        Exp::MethodCall {
            target,
            method,
            args,
            info,
        } => {
            let info = I::write_call(info); // receiver class, for typed trees
            writeln!(w, "call {method}{info}")?;

            sp(w, i + 1)?;
            writeln!(w, "receiver")?;
            print_exp(w, i + 2, target)?;

            if !args.is_empty() {
                sp(w, i + 1)?;
                writeln!(w, "arguments")?;
                for arg in args {
                    print_exp(w, i + 2, arg)?;
                }
            }
        }
        Exp::New { class, args } => {
            writeln!(w, "new {class}")?;
            for arg in args {
                print_exp(w, i + 1, arg)?;
            }
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> fmt::Result {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub trait InfoWriter: Info {
    fn write_call(info: &Self::Call) -> impl fmt::Display + '_;
}

impl InfoWriter for Untyped {
    fn write_call(_: &()) -> impl fmt::Display + '_ {
        ""
    }
}

impl InfoWriter for Typed {
    fn write_call(class: &ClassName) -> impl fmt::Display + '_ {
        struct Resolved<'a>(&'a ClassName);

        impl fmt::Display for Resolved<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, " %: {}", self.0)
            }
        }

        Resolved(class)
    }
}
