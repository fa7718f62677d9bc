//! Type expression parsing
//!
//! A type is a base followed by any number of suffixes. Each suffix wraps
//! everything to its left, so `int[3][]` is a pointer to an array of three
//! ints and `int[][3]` is an array of three int pointers.

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use cu_common::CompilerError;

impl Parser {
    /// Parse a complete type expression (vararg not allowed)
    pub fn parse_type_expr(&mut self) -> Result<TypeExpr, CompilerError> {
        let ty = self.parse_type_or_vararg()?;
        if ty.is_vararg() {
            return Err(ParseError::InvalidType {
                message: "'...' is only allowed in parameter lists".to_string(),
                location: ty.span.start,
            }
            .into());
        }
        Ok(ty)
    }

    /// Like [`Parser::parse_type_expr`], but also accepts a bare `...`
    pub(crate) fn parse_type_or_vararg(&mut self) -> Result<TypeExpr, CompilerError> {
        let start = self.current_location()?;

        if self.match_token(&TokenType::Ellipsis)? {
            return Ok(TypeExpr::new(TypeExprKind::Vararg, self.span_from(start)));
        }

        let mut ty = self.parse_type_base()?;
        while self.check(&TokenType::LeftBracket)? {
            self.advance()?;
            if self.match_token(&TokenType::RightBracket)? {
                ty = TypeExpr::new(TypeExprKind::Pointer(Box::new(ty)), self.span_from(start.clone()));
                continue;
            }
            let size = self.parse_expression()?;
            self.expect(TokenType::RightBracket, "array type")?;
            ty = TypeExpr::new(
                TypeExprKind::Array {
                    element: Box::new(ty),
                    size: Box::new(size),
                },
                self.span_from(start.clone()),
            );
        }
        Ok(ty)
    }

    fn parse_type_base(&mut self) -> Result<TypeExpr, CompilerError> {
        let start = self.current_location()?;
        let token = self.advance()?;

        match token.token_type {
            TokenType::Identifier(name) => Ok(TypeExpr::new(TypeExprKind::Name(name), token.span)),

            // `{T}` groups a type so suffixes apply to all of it
            TokenType::LeftBrace => {
                let inner = self.parse_type_expr()?;
                self.expect(TokenType::RightBrace, "grouped type")?;
                Ok(inner)
            }

            TokenType::LeftParen => {
                let params = self.parse_type_list()?;
                self.expect(TokenType::RightParen, "callable type")?;
                self.expect(TokenType::Arrow, "callable type")?;
                let returns = self.parse_type_expr()?;
                Ok(TypeExpr::new(
                    TypeExprKind::Callable {
                        params,
                        returns: Box::new(returns),
                    },
                    self.span_from(start),
                ))
            }

            _ => Err(ParseError::UnexpectedToken {
                expected: "type".to_string(),
                found: token,
            }
            .into()),
        }
    }

    /// Parameter types of a callable type, up to the closing `)`
    fn parse_type_list(&mut self) -> Result<Vec<TypeExpr>, CompilerError> {
        let mut params = Vec::new();
        if self.check(&TokenType::RightParen)? {
            return Ok(params);
        }
        loop {
            params.push(self.parse_type_or_vararg()?);
            if !self.match_token(&TokenType::Comma)? {
                return Ok(params);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> TypeExpr {
        Parser::from_source(input, "<test>").parse_type_expr().unwrap()
    }

    #[test]
    fn test_suffixes_wrap_left_to_right() {
        let ty = parse("int[3][]");
        let TypeExprKind::Pointer(inner) = &ty.kind else {
            panic!("expected pointer, got {:?}", ty.kind);
        };
        assert!(matches!(inner.kind, TypeExprKind::Array { .. }));

        let ty = parse("int[][3]");
        let TypeExprKind::Array { element, size } = &ty.kind else {
            panic!("expected array, got {:?}", ty.kind);
        };
        assert!(matches!(element.kind, TypeExprKind::Pointer(_)));
        assert_eq!(size.kind, ExpressionKind::IntLiteral(3));
    }

    #[test]
    fn test_callable_return_takes_suffixes() {
        let ty = parse("(int) -> int[10]");
        let TypeExprKind::Callable { params, returns } = &ty.kind else {
            panic!("expected callable");
        };
        assert_eq!(params.len(), 1);
        assert!(matches!(returns.kind, TypeExprKind::Array { .. }));
    }

    #[test]
    fn test_grouped_callable_pointer() {
        let ty = parse("{(int, ...) -> void}[]");
        let TypeExprKind::Pointer(inner) = &ty.kind else {
            panic!("expected pointer");
        };
        let TypeExprKind::Callable { params, .. } = &inner.kind else {
            panic!("expected callable");
        };
        assert!(params[1].is_vararg());
        assert_eq!(ty.to_string(), "{(int, ...) -> void}[]");
    }

    #[test]
    fn test_symbolic_array_size() {
        assert_eq!(parse("char[N + 1]").to_string(), "char[N + 1]");
    }

    #[test]
    fn test_vararg_rejected_outside_parameters() {
        let err = Parser::from_source("...", "<test>").parse_type_expr().unwrap_err();
        assert_eq!(err.message(), "'...' is only allowed in parameter lists");
    }

    #[test]
    fn test_same_shape_ignores_positions() {
        assert!(parse("char[][]").same_shape(&parse("char [ ] [ ]")));
        assert!(!parse("char[]").same_shape(&parse("char[2]")));
    }
}
