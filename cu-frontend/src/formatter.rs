//! Source printer
//!
//! Turns a module (parsed or decorated) back into source text that parses
//! to the same tree. Parentheses are only emitted where the precedence
//! table needs them. In a decorated tree, inferred declarations and
//! signatures are printed with their resolved types, which makes the
//! checker's work visible.

use crate::ast::*;
use crate::parser::precedence::{binary_level, POSTFIX_LEVEL, PREFIX_LEVEL};
use crate::types::ValueType;

const INDENT: &str = "    ";

/// Tighter than any operator
const PRIMARY_LEVEL: u8 = POSTFIX_LEVEL + 1;

pub fn format_module(module: &Module) -> String {
    let mut printer = Printer::default();
    for stmt in &module.body {
        printer.statement(stmt);
    }
    printer.out
}

pub fn format_expression(expr: &Expression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expr, 0);
    out
}

fn level_of(expr: &Expression) -> u8 {
    match &expr.kind {
        ExpressionKind::Binary { op, .. } => binary_level(*op),
        ExpressionKind::Unary { op, .. } if op.is_postfix() => POSTFIX_LEVEL,
        ExpressionKind::Unary { .. } | ExpressionKind::Cast { .. } => PREFIX_LEVEL,
        ExpressionKind::Call { .. } | ExpressionKind::Index { .. } | ExpressionKind::Member { .. } => POSTFIX_LEVEL,
        _ => PRIMARY_LEVEL,
    }
}

/// Print `expr`, parenthesized if it binds looser than `min_level`
fn write_expression(out: &mut String, expr: &Expression, min_level: u8) {
    let parenthesize = level_of(expr) < min_level;
    if parenthesize {
        out.push('(');
    }

    match &expr.kind {
        ExpressionKind::IntLiteral(value) => out.push_str(&value.to_string()),
        ExpressionKind::FloatLiteral(value) => out.push_str(&format!("{:?}", value)),
        ExpressionKind::CharLiteral(value) => {
            out.push('\'');
            push_escaped(out, char::from(*value), '\'');
            out.push('\'');
        }
        ExpressionKind::StringLiteral(text) => {
            out.push('"');
            for c in text.chars() {
                push_escaped(out, c, '"');
            }
            out.push('"');
        }
        ExpressionKind::Null => out.push_str("NULL"),
        ExpressionKind::Name(name) => out.push_str(name),

        ExpressionKind::ArrayLiteral(items) => {
            out.push('[');
            write_list(out, items);
            out.push(']');
        }

        ExpressionKind::Binary { op, left, right } => {
            let level = binary_level(*op);
            write_expression(out, left, level);
            out.push_str(&format!(" {} ", op));
            write_expression(out, right, level + 1);
        }

        ExpressionKind::Unary { op, operand } if op.is_postfix() => {
            write_expression(out, operand, POSTFIX_LEVEL);
            out.push_str(&op.to_string());
        }

        ExpressionKind::Unary { op, operand } => {
            let mut inner = String::new();
            write_expression(&mut inner, operand, PREFIX_LEVEL);
            let spelled = op.to_string();
            out.push_str(&spelled);
            // `- -x` must not run together into `--x`
            if spelled.ends_with(['+', '-']) && inner.starts_with(['+', '-']) {
                out.push(' ');
            }
            out.push_str(&inner);
        }

        ExpressionKind::Call { function, arguments } => {
            write_expression(out, function, POSTFIX_LEVEL);
            out.push('(');
            write_list(out, arguments);
            out.push(')');
        }

        ExpressionKind::Index { object, index } => {
            write_expression(out, object, POSTFIX_LEVEL);
            out.push('[');
            write_expression(out, index, 0);
            out.push(']');
        }

        ExpressionKind::Member {
            object,
            member,
            is_pointer,
        } => {
            write_expression(out, object, POSTFIX_LEVEL);
            out.push_str(if *is_pointer { "->" } else { "." });
            out.push_str(member);
        }

        ExpressionKind::Cast { target, operand } => {
            out.push_str(&format!("<{}> ", target));
            write_expression(out, operand, PREFIX_LEVEL);
        }

        ExpressionKind::Sizeof(target) => out.push_str(&format!("sizeof({})", target)),
    }

    if parenthesize {
        out.push(')');
    }
}

fn write_list(out: &mut String, items: &[Expression]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expression(out, item, 0);
    }
}

fn push_escaped(out: &mut String, c: char, quote: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\0' => out.push_str("\\0"),
        '\\' => out.push_str("\\\\"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c => out.push(c),
    }
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, body: &[Statement]) {
        self.depth += 1;
        if body.is_empty() {
            self.line("pass");
        }
        for stmt in body {
            self.statement(stmt);
        }
        self.depth -= 1;
    }

    fn statement(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Expression(expr) => self.line(&format_expression(expr)),

            StatementKind::VarDecl(decl) => {
                let mut text = decl.name.clone();
                match (&decl.declared_type, &decl.value_type) {
                    (Some(declared), _) => text.push_str(&format!(": {}", declared)),
                    (None, Some(inferred)) => text.push_str(&format!(": {}", inferred)),
                    (None, None) => {}
                }
                if let Some(init) = &decl.init {
                    text.push_str(" = ");
                    text.push_str(&format_expression(init));
                }
                self.line(&text);
            }

            StatementKind::Assign { target, value } => {
                self.line(&format!("{} = {}", format_expression(target), format_expression(value)))
            }

            StatementKind::FunctionDecl(decl) => {
                self.line(&signature(&decl.name, &decl.params, &decl.returns, &decl.signature))
            }

            StatementKind::FunctionDef(def) => {
                let header = signature(&def.name, &def.params, &def.returns, &def.signature);
                self.line(&format!("{}:", header));
                self.block(&def.body);
            }

            StatementKind::Return(None) => self.line("return"),
            StatementKind::Return(Some(value)) => self.line(&format!("return {}", format_expression(value))),

            StatementKind::If {
                condition,
                body,
                orelse,
            } => {
                self.line(&format!("if {}:", format_expression(condition)));
                self.block(body);
                self.else_chain(orelse);
            }

            StatementKind::While {
                condition,
                body,
                orelse,
            } => {
                self.line(&format!("while {}:", format_expression(condition)));
                self.block(body);
                if !orelse.is_empty() {
                    self.line("else:");
                    self.block(orelse);
                }
            }

            StatementKind::DoWhile { body, condition } => {
                self.line("do:");
                self.block(body);
                self.line(&format!("while {}", format_expression(condition)));
            }

            StatementKind::Switch {
                subject,
                cases,
                default,
            } => {
                self.line(&format!("switch {}:", format_expression(subject)));
                self.depth += 1;
                for case in cases {
                    let mut values = String::new();
                    write_list(&mut values, &case.values);
                    self.line(&format!("case {}:", values));
                    self.block(&case.body);
                }
                if let Some(default) = default {
                    self.line("else:");
                    self.block(default);
                }
                self.depth -= 1;
            }

            StatementKind::Break => self.line("break"),
            StatementKind::Pass => self.line("pass"),

            StatementKind::Struct { name, fields } if fields.is_empty() => {
                self.line(&format!("struct {}: pass", name))
            }
            StatementKind::Struct { name, fields } => {
                self.line(&format!("struct {}:", name));
                self.depth += 1;
                for field in fields {
                    self.line(&format!("{}: {}", field.name, field.field_type));
                }
                self.depth -= 1;
            }

            StatementKind::Enum { name, members } => self.line(&format!("enum {} {{{}}}", name, members.join(", "))),
            StatementKind::Typedef { target, name } => self.line(&format!("typedef {} {}", target, name)),
            StatementKind::Define { name, value: None } => self.line(&format!("define {}", name)),
            StatementKind::Define {
                name,
                value: Some(value),
            } => self.line(&format!("define {} {}", name, format_expression(value))),
            StatementKind::Include(path) => {
                let mut quoted = String::from("include \"");
                for c in path.chars() {
                    push_escaped(&mut quoted, c, '"');
                }
                quoted.push('"');
                self.line(&quoted);
            }
            StatementKind::Ifndef(name) => self.line(&format!("ifndef {}", name)),
            StatementKind::Endif => self.line("endif"),
        }
    }

    /// `elif` for a lone nested `if`, `else:` for anything else
    fn else_chain(&mut self, orelse: &[Statement]) {
        match orelse {
            [] => {}
            [Statement {
                kind:
                    StatementKind::If {
                        condition,
                        body,
                        orelse,
                    },
                ..
            }] => {
                self.line(&format!("elif {}:", format_expression(condition)));
                self.block(body);
                self.else_chain(orelse);
            }
            _ => {
                self.line("else:");
                self.block(orelse);
            }
        }
    }
}

/// `def name(params) -> T`, filling in resolved types where the source
/// left them out
fn signature(name: &str, params: &[Parameter], returns: &Option<TypeExpr>, resolved: &Option<ValueType>) -> String {
    let params = params
        .iter()
        .map(|param| match (&param.kind, &param.value_type) {
            (ParameterKind::Vararg, _) => "...".to_string(),
            (
                ParameterKind::Named {
                    name,
                    declared_type: Some(declared),
                },
                _,
            ) => format!("{}: {}", name, declared),
            (
                ParameterKind::Named {
                    name,
                    declared_type: None,
                },
                Some(inferred),
            ) => format!("{}: {}", name, inferred),
            (ParameterKind::Named { name, .. }, None) => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let returns = match (returns, resolved) {
        (Some(declared), _) => format!(" -> {}", declared),
        (None, Some(ValueType::Callable { returns, .. })) => format!(" -> {}", returns),
        _ => String::new(),
    };
    format!("def {}({}){}", name, params, returns)
}
