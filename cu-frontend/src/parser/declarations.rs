//! Function, struct, enum, typedef and directive parsing

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use cu_common::{CompilerError, SourceLocation, SourceSpan};

/// Name of the program entry point, whose signature is normalized
pub const ENTRY_POINT: &str = "main";

impl Parser {
    /// `def name(params) [-> T]` followed by either a block or end of line
    pub(crate) fn parse_function(&mut self) -> Result<StatementKind, CompilerError> {
        let (name, name_span) = self.expect_identifier("function declaration")?;

        self.expect(TokenType::LeftParen, "parameter list")?;
        let mut params = Vec::new();
        if !self.check(&TokenType::RightParen)? {
            loop {
                params.push(self.parse_parameter()?);
                if !self.match_token(&TokenType::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "parameter list")?;

        let mut returns = if self.match_token(&TokenType::Arrow)? {
            Some(self.parse_type_expr()?)
        } else {
            None
        };

        if name == ENTRY_POINT {
            normalize_entry_point(&mut params, &mut returns, &name_span)?;
        }

        if !self.check(&TokenType::Colon)? {
            self.end_simple_statement("function declaration")?;
            return Ok(StatementKind::FunctionDecl(FunctionDecl {
                name,
                params,
                returns,
                signature: None,
            }));
        }

        let body = self.parse_block("function body")?;
        Ok(StatementKind::FunctionDef(FunctionDef {
            name,
            params,
            returns,
            body,
            signature: None,
        }))
    }

    fn parse_parameter(&mut self) -> Result<Parameter, CompilerError> {
        let start = self.current_location()?;
        if self.match_token(&TokenType::Ellipsis)? {
            return Ok(Parameter::vararg(self.span_from(start)));
        }

        let (name, _) = self.expect_identifier("parameter list")?;
        let declared_type = if self.match_token(&TokenType::Colon)? {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        Ok(Parameter::named(&name, declared_type, self.span_from(start)))
    }

    /// `struct Name:` then a block of `field: T` lines (or `pass`)
    pub(crate) fn parse_struct(&mut self) -> Result<StatementKind, CompilerError> {
        let (name, _) = self.expect_identifier("struct definition")?;
        self.expect(TokenType::Colon, "struct definition")?;

        let mut fields = Vec::new();
        if !self.match_token(&TokenType::Newline)? {
            self.expect(TokenType::Pass, "struct definition")?;
            self.end_simple_statement("struct definition")?;
            return Ok(StatementKind::Struct { name, fields });
        }

        self.expect(TokenType::Indent, "struct definition")?;
        while !self.check(&TokenType::Dedent)? && !self.check(&TokenType::EndOfFile)? {
            if self.match_token(&TokenType::Pass)? {
                self.end_simple_statement("struct definition")?;
                continue;
            }
            let start = self.current_location()?;
            let (field_name, _) = self.expect_identifier("struct field")?;
            self.expect(TokenType::Colon, "struct field")?;
            let field_type = self.parse_type_expr()?;
            self.end_simple_statement("struct field")?;

            if fields.iter().any(|field: &Field| field.name == field_name) {
                return Err(ParseError::InvalidDeclaration {
                    message: format!("duplicate field '{}' in struct '{}'", field_name, name),
                    location: start,
                }
                .into());
            }
            fields.push(Field {
                name: field_name,
                field_type,
                span: self.span_from(start),
            });
        }
        self.expect(TokenType::Dedent, "struct definition")?;

        Ok(StatementKind::Struct { name, fields })
    }

    /// `enum Name {A, B, C}`
    pub(crate) fn parse_enum(&mut self) -> Result<StatementKind, CompilerError> {
        let (name, _) = self.expect_identifier("enum definition")?;
        self.expect(TokenType::LeftBrace, "enum definition")?;

        let mut members = Vec::new();
        while !self.check(&TokenType::RightBrace)? {
            let (member, span) = self.expect_identifier("enum definition")?;
            if members.contains(&member) {
                return Err(ParseError::InvalidDeclaration {
                    message: format!("duplicate member '{}' in enum '{}'", member, name),
                    location: span.start,
                }
                .into());
            }
            members.push(member);
            if !self.match_token(&TokenType::Comma)? {
                break;
            }
        }
        self.expect(TokenType::RightBrace, "enum definition")?;
        self.end_simple_statement("enum definition")?;

        Ok(StatementKind::Enum { name, members })
    }

    /// `typedef <type> <name>`
    pub(crate) fn parse_typedef(&mut self) -> Result<StatementKind, CompilerError> {
        let target = self.parse_type_expr()?;
        let (name, _) = self.expect_identifier("typedef")?;
        self.end_simple_statement("typedef")?;
        Ok(StatementKind::Typedef { target, name })
    }

    /// `define NAME [value]`
    pub(crate) fn parse_define(&mut self) -> Result<StatementKind, CompilerError> {
        let (name, _) = self.expect_identifier("define")?;
        let value = match self.peek_type()? {
            TokenType::Newline | TokenType::Dedent | TokenType::EndOfFile => None,
            _ => Some(self.parse_expression()?),
        };
        self.end_simple_statement("define")?;
        Ok(StatementKind::Define { name, value })
    }

    /// `include "path"`
    pub(crate) fn parse_include(&mut self) -> Result<StatementKind, CompilerError> {
        let token = self.advance()?;
        let TokenType::StringLiteral(path) = token.token_type else {
            return Err(ParseError::UnexpectedToken {
                expected: "quoted path after include".to_string(),
                found: token,
            }
            .into());
        };
        self.end_simple_statement("include")?;
        Ok(StatementKind::Include(path))
    }
}

fn named_type(name: &str, span: &SourceSpan) -> TypeExpr {
    TypeExpr::name(name, span.clone())
}

/// `int` and `char[][]`, the only accepted parameter types of the entry point
fn entry_point_params(span: &SourceSpan) -> [(&'static str, TypeExpr); 2] {
    let argv = TypeExpr::pointer(TypeExpr::pointer(named_type("char", span)));
    [("argc", named_type("int", span)), ("argv", argv)]
}

fn entry_point_error(message: String, location: &SourceLocation) -> CompilerError {
    ParseError::InvalidDeclaration {
        message,
        location: location.clone(),
    }
    .into()
}

/// The entry point takes no arguments or exactly `(int, char[][])`, and
/// returns `int`. Missing annotations are filled in.
fn normalize_entry_point(
    params: &mut Vec<Parameter>,
    returns: &mut Option<TypeExpr>,
    span: &SourceSpan,
) -> Result<(), CompilerError> {
    let expected = entry_point_params(span);

    match params.len() {
        0 => {
            *params = expected
                .into_iter()
                .map(|(name, ty)| Parameter::named(name, Some(ty), span.clone()))
                .collect();
        }
        2 => {
            for (param, (_, expected_type)) in params.iter_mut().zip(expected) {
                let ParameterKind::Named { name, declared_type } = &mut param.kind else {
                    return Err(entry_point_error(
                        "program entry point cannot be variadic".to_string(),
                        &param.span.start,
                    ));
                };
                match declared_type {
                    Some(ty) if !ty.same_shape(&expected_type) => {
                        return Err(entry_point_error(
                            format!(
                                "program entry point parameter '{}' must have type {}, found {}",
                                name, expected_type, ty
                            ),
                            &param.span.start,
                        ));
                    }
                    Some(_) => {}
                    None => *declared_type = Some(expected_type),
                }
            }
        }
        _ => {
            return Err(entry_point_error(
                "program entry point expects either 0 or 2 arguments".to_string(),
                &span.start,
            ))
        }
    }

    match returns {
        Some(ty) if !ty.same_shape(&named_type("int", span)) => Err(entry_point_error(
            format!("program entry point must return int, found {}", ty),
            &ty.span.start,
        )),
        Some(_) => Ok(()),
        None => {
            *returns = Some(named_type("int", span));
            Ok(())
        }
    }
}
