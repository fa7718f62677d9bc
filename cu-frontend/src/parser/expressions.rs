//! Expression parsing by precedence climbing

use super::precedence::{self, Associativity, POSTFIX_LEVEL, PREFIX_LEVEL};
use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::{ParseError, Parser};
use cu_common::CompilerError;

impl Parser {
    pub fn parse_expression(&mut self) -> Result<Expression, CompilerError> {
        self.parse_precedence(0)
    }

    /// Parse an expression whose operators all bind tighter than `min_level`
    fn parse_precedence(&mut self, min_level: u8) -> Result<Expression, CompilerError> {
        let mut left = self.parse_prefix()?;

        loop {
            let token_type = self.peek_type()?;

            if precedence::is_postfix_operator(&token_type) {
                if POSTFIX_LEVEL <= min_level {
                    break;
                }
                left = self.parse_postfix(left)?;
                continue;
            }

            let Some((op, level, associativity)) = precedence::binary_operator(&token_type) else {
                break;
            };
            if level <= min_level {
                break;
            }
            self.advance()?;

            let next_min = match associativity {
                Associativity::Left => level,
                Associativity::Right => level - 1,
            };
            let right = self.parse_precedence(next_min)?;
            let span = left.span.extend(&right.span);
            left = Expression::new(
                self.node_id_gen.next(),
                ExpressionKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, CompilerError> {
        let start = self.current_location()?;
        let token_type = self.peek_type()?;

        if token_type == TokenType::Less {
            self.advance()?;
            let target = self.parse_type_expr()?;
            self.expect(TokenType::Greater, "cast")?;
            let operand = self.parse_precedence(PREFIX_LEVEL)?;
            return Ok(Expression::new(
                self.node_id_gen.next(),
                ExpressionKind::Cast {
                    target,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }

        if let Some(op) = precedence::prefix_operator(&token_type) {
            self.advance()?;
            let operand = self.parse_precedence(PREFIX_LEVEL)?;
            return Ok(Expression::new(
                self.node_id_gen.next(),
                ExpressionKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, CompilerError> {
        let token = self.advance()?;
        let start = token.span.start.clone();

        let kind = match token.token_type {
            TokenType::IntLiteral(value) => ExpressionKind::IntLiteral(value),
            TokenType::FloatLiteral(value) => ExpressionKind::FloatLiteral(value),
            TokenType::CharLiteral(value) => ExpressionKind::CharLiteral(value),
            TokenType::StringLiteral(value) => ExpressionKind::StringLiteral(value),
            TokenType::Null => ExpressionKind::Null,
            TokenType::Identifier(name) => ExpressionKind::Name(name),

            TokenType::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenType::RightParen, "parenthesized expression")?;
                return Ok(inner);
            }

            TokenType::LeftBracket => {
                let elements = self.parse_expression_list(TokenType::RightBracket)?;
                self.expect(TokenType::RightBracket, "array literal")?;
                ExpressionKind::ArrayLiteral(elements)
            }

            TokenType::Sizeof => {
                self.expect(TokenType::LeftParen, "sizeof")?;
                let target = self.parse_type_expr()?;
                self.expect(TokenType::RightParen, "sizeof")?;
                ExpressionKind::Sizeof(target)
            }

            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: token,
                }
                .into())
            }
        };

        Ok(Expression::new(self.node_id_gen.next(), kind, self.span_from(start)))
    }

    /// Comma separated expressions up to (not including) `closing`
    pub(crate) fn parse_expression_list(&mut self, closing: TokenType) -> Result<Vec<Expression>, CompilerError> {
        let mut items = Vec::new();
        if self.check(&closing)? {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if !self.match_token(&TokenType::Comma)? || self.check(&closing)? {
                return Ok(items);
            }
        }
    }

    fn parse_postfix(&mut self, object: Expression) -> Result<Expression, CompilerError> {
        let start = object.span.start.clone();
        let token = self.advance()?;

        let kind = match token.token_type {
            TokenType::PlusPlus | TokenType::MinusMinus => ExpressionKind::Unary {
                op: if token.token_type == TokenType::PlusPlus {
                    UnaryOp::PostIncrement
                } else {
                    UnaryOp::PostDecrement
                },
                operand: Box::new(object),
            },

            TokenType::LeftParen => {
                let arguments = self.parse_expression_list(TokenType::RightParen)?;
                self.expect(TokenType::RightParen, "call arguments")?;
                ExpressionKind::Call {
                    function: Box::new(object),
                    arguments,
                }
            }

            TokenType::LeftBracket => {
                let index = self.parse_expression()?;
                self.expect(TokenType::RightBracket, "index")?;
                ExpressionKind::Index {
                    object: Box::new(object),
                    index: Box::new(index),
                }
            }

            TokenType::Dot | TokenType::Arrow => {
                let is_pointer = token.token_type == TokenType::Arrow;
                let (member, _) = self.expect_identifier("member access")?;
                ExpressionKind::Member {
                    object: Box::new(object),
                    member,
                    is_pointer,
                }
            }

            _ => {
                return Err(ParseError::InvalidExpression {
                    message: format!("'{}' is not a postfix operator", token.token_type),
                    location: token.span.start,
                }
                .into())
            }
        };

        Ok(Expression::new(self.node_id_gen.next(), kind, self.span_from(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Expression {
        Parser::from_source(input, "<test>").parse_expression().unwrap()
    }

    /// Fully parenthesized rendering, so tree shape is easy to assert on
    fn shape(expr: &Expression) -> String {
        match &expr.kind {
            ExpressionKind::IntLiteral(n) => n.to_string(),
            ExpressionKind::FloatLiteral(n) => format!("{n:?}"),
            ExpressionKind::CharLiteral(c) => format!("'{}'", *c as char),
            ExpressionKind::StringLiteral(s) => format!("{s:?}"),
            ExpressionKind::Null => "NULL".to_string(),
            ExpressionKind::Name(name) => name.clone(),
            ExpressionKind::ArrayLiteral(items) => {
                format!("[{}]", items.iter().map(shape).collect::<Vec<_>>().join(", "))
            }
            ExpressionKind::Binary { op, left, right } => {
                format!("({} {} {})", shape(left), op, shape(right))
            }
            ExpressionKind::Unary { op, operand } if op.is_postfix() => {
                format!("({}{})", shape(operand), op)
            }
            ExpressionKind::Unary { op, operand } => format!("({}{})", op, shape(operand)),
            ExpressionKind::Call { function, arguments } => format!(
                "{}({})",
                shape(function),
                arguments.iter().map(shape).collect::<Vec<_>>().join(", ")
            ),
            ExpressionKind::Index { object, index } => format!("{}[{}]", shape(object), shape(index)),
            ExpressionKind::Member { object, member, is_pointer } => {
                format!("({}{}{})", shape(object), if *is_pointer { "->" } else { "." }, member)
            }
            ExpressionKind::Cast { target, operand } => format!("(<{}> {})", target, shape(operand)),
            ExpressionKind::Sizeof(target) => format!("sizeof({})", target),
        }
    }

    #[test]
    fn test_relational_is_left_associative() {
        assert_eq!(shape(&parse("7 > 6 > 5")), "((7 > 6) > 5)");
    }

    #[test]
    fn test_indexing_binds_tighter_than_addition() {
        assert_eq!(shape(&parse("x + x[1]")), "(x + x[1])");
    }

    #[test]
    fn test_cast_binds_tighter_than_division() {
        assert_eq!(shape(&parse("<float> 2 / 4")), "((<float> 2) / 4)");
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(shape(&parse("1 + 2 * 3 - 4")), "((1 + (2 * 3)) - 4)");
        assert_eq!(shape(&parse("a or b and c")), "(a or (b and c))");
        assert_eq!(shape(&parse("a | b ^ c & d")), "(a | (b ^ (c & d)))");
        assert_eq!(shape(&parse("a == b < c << 1")), "(a == (b < (c << 1)))");
        assert_eq!(shape(&parse("(1 + 2) * 3")), "((1 + 2) * 3)");
    }

    #[test]
    fn test_prefix_and_postfix_tiers() {
        assert_eq!(shape(&parse("++x->a")), "(++(x->a))");
        assert_eq!(shape(&parse("-x[0]")), "(-x[0])");
        assert_eq!(shape(&parse("*p++")), "(*(p++))");
        assert_eq!(shape(&parse("&node.next")), "(&(node.next))");
        assert_eq!(shape(&parse("not a == b")), "((not a) == b)");
        assert_eq!(shape(&parse("- -x")), "(-(-x))");
    }

    #[test]
    fn test_indexing_nests_inside_out() {
        let expr = parse("arr[1][2][3]");
        assert_eq!(shape(&expr), "arr[1][2][3]");
        let ExpressionKind::Index { object, index } = &expr.kind else {
            panic!("expected index");
        };
        assert_eq!(index.kind, ExpressionKind::IntLiteral(3));
        assert!(matches!(object.kind, ExpressionKind::Index { .. }));
    }

    #[test]
    fn test_calls_and_literals() {
        assert_eq!(shape(&parse("f(1, \"a\", 'c', 2.5)")), "f(1, \"a\", 'c', 2.5)");
        assert_eq!(shape(&parse("g()")), "g()");
        assert_eq!(shape(&parse("[[1, 2], [3, 4]]")), "[[1, 2], [3, 4]]");
        assert_eq!(shape(&parse("sizeof(int[])")), "sizeof(int[])");
        assert_eq!(shape(&parse("<int[]> NULL")), "(<int[]> NULL)");
    }

    #[test]
    fn test_multiline_call_arguments() {
        assert_eq!(shape(&parse("f(1,\n      2)")), "f(1, 2)");
    }

    #[test]
    fn test_spans_cover_whole_expression() {
        let expr = parse("a + bb");
        assert_eq!((expr.span.start.column, expr.span.end.column), (1, 7));
    }

    #[test]
    fn test_missing_operand() {
        let err = Parser::from_source("1 +", "<test>").parse_expression().unwrap_err();
        assert_eq!(err.message(), "Expected expression, found EOF");
    }
}
