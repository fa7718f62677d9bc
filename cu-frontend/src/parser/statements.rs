//! Statement and block parsing
//!
//! A block is either `:` NEWLINE INDENT statements DEDENT, or `:` followed
//! by a single statement on the same line. Simple statements end at a
//! NEWLINE, or just before the DEDENT/EOF that closes the enclosing block.

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use cu_common::CompilerError;

impl Parser {
    pub fn parse_statement(&mut self) -> Result<Statement, CompilerError> {
        let start = self.current_location()?;

        let kind = match self.peek_type()? {
            TokenType::If => {
                self.advance()?;
                self.parse_if_statement()?
            }
            TokenType::While => {
                self.advance()?;
                self.parse_while_statement()?
            }
            TokenType::Do => {
                self.advance()?;
                self.parse_do_while_statement()?
            }
            TokenType::Switch => {
                self.advance()?;
                self.parse_switch_statement()?
            }
            TokenType::Return => {
                self.advance()?;
                let value = if self.at_statement_end()? {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.end_simple_statement("return statement")?;
                StatementKind::Return(value)
            }
            TokenType::Break => {
                self.advance()?;
                self.end_simple_statement("break statement")?;
                StatementKind::Break
            }
            TokenType::Pass => {
                self.advance()?;
                self.end_simple_statement("pass statement")?;
                StatementKind::Pass
            }
            TokenType::Def => {
                self.advance()?;
                self.parse_function()?
            }
            TokenType::Struct => {
                self.advance()?;
                self.parse_struct()?
            }
            TokenType::Enum => {
                self.advance()?;
                self.parse_enum()?
            }
            TokenType::Typedef => {
                self.advance()?;
                self.parse_typedef()?
            }
            TokenType::Define => {
                self.advance()?;
                self.parse_define()?
            }
            TokenType::Include => {
                self.advance()?;
                self.parse_include()?
            }
            TokenType::Ifndef => {
                self.advance()?;
                let (name, _) = self.expect_identifier("ifndef")?;
                self.end_simple_statement("ifndef")?;
                StatementKind::Ifndef(name)
            }
            TokenType::Endif => {
                self.advance()?;
                self.end_simple_statement("endif")?;
                StatementKind::Endif
            }
            TokenType::Identifier(_) if self.peek_nth(1)?.token_type == TokenType::Colon => {
                self.parse_var_decl()?
            }
            _ => self.parse_expression_or_assignment()?,
        };

        Ok(Statement::new(self.node_id_gen.next(), kind, self.span_from(start)))
    }

    /// Whether the current token terminates a simple statement
    fn at_statement_end(&mut self) -> Result<bool, CompilerError> {
        Ok(matches!(
            self.peek_type()?,
            TokenType::Newline | TokenType::Dedent | TokenType::EndOfFile
        ))
    }

    /// Consume the NEWLINE ending a simple statement. A DEDENT or EOF also
    /// ends it but is left for the enclosing block.
    pub(crate) fn end_simple_statement(&mut self, context: &str) -> Result<(), CompilerError> {
        match self.peek_type()? {
            TokenType::Newline => {
                self.advance()?;
                Ok(())
            }
            TokenType::Dedent | TokenType::EndOfFile => Ok(()),
            _ => {
                let found = self.advance()?;
                Err(ParseError::UnexpectedToken {
                    expected: format!("end of line after {}", context),
                    found,
                }
                .into())
            }
        }
    }

    /// `:` followed by an indented block or a single same-line statement
    pub(crate) fn parse_block(&mut self, context: &str) -> Result<Vec<Statement>, CompilerError> {
        self.expect(TokenType::Colon, context)?;

        if !self.match_token(&TokenType::Newline)? {
            return Ok(vec![self.parse_statement()?]);
        }

        self.expect(TokenType::Indent, context)?;
        let mut body = Vec::new();
        while !self.check(&TokenType::Dedent)? && !self.check(&TokenType::EndOfFile)? {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenType::Dedent, context)?;
        Ok(body)
    }

    fn parse_if_statement(&mut self) -> Result<StatementKind, CompilerError> {
        let condition = self.parse_expression()?;
        let body = self.parse_block("if statement")?;

        let orelse = match self.peek_type()? {
            TokenType::Elif => {
                let start = self.current_location()?;
                self.advance()?;
                let kind = self.parse_if_statement()?;
                vec![Statement::new(self.node_id_gen.next(), kind, self.span_from(start))]
            }
            TokenType::Else => {
                self.advance()?;
                self.parse_block("else clause")?
            }
            _ => Vec::new(),
        };

        Ok(StatementKind::If {
            condition,
            body,
            orelse,
        })
    }

    fn parse_while_statement(&mut self) -> Result<StatementKind, CompilerError> {
        let condition = self.parse_expression()?;
        let body = self.parse_block("while statement")?;
        let orelse = if self.match_token(&TokenType::Else)? {
            self.parse_block("while-else clause")?
        } else {
            Vec::new()
        };

        Ok(StatementKind::While {
            condition,
            body,
            orelse,
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<StatementKind, CompilerError> {
        let body = self.parse_block("do statement")?;
        self.expect(TokenType::While, "do statement")?;
        let condition = self.parse_expression()?;
        self.end_simple_statement("do statement")?;
        Ok(StatementKind::DoWhile { body, condition })
    }

    fn parse_switch_statement(&mut self) -> Result<StatementKind, CompilerError> {
        let subject = self.parse_expression()?;
        self.expect(TokenType::Colon, "switch statement")?;
        self.expect(TokenType::Newline, "switch statement")?;
        self.expect(TokenType::Indent, "switch statement")?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            let token = self.peek()?.clone();
            match token.token_type {
                TokenType::Case => {
                    self.advance()?;
                    let mut values = vec![self.parse_expression()?];
                    while self.match_token(&TokenType::Comma)? {
                        values.push(self.parse_expression()?);
                    }
                    let body = self.parse_block("case clause")?;
                    cases.push(SwitchCase {
                        values,
                        body,
                        span: self.span_from(token.span.start),
                    });
                }
                TokenType::Else => {
                    self.advance()?;
                    if default.is_some() {
                        return Err(ParseError::InvalidDeclaration {
                            message: "switch has more than one default clause".to_string(),
                            location: token.span.start,
                        }
                        .into());
                    }
                    default = Some(self.parse_block("default clause")?);
                }
                TokenType::Dedent => {
                    self.advance()?;
                    break;
                }
                _ => {
                    let found = self.advance()?;
                    return Err(ParseError::UnexpectedToken {
                        expected: "'case' or 'else' in switch statement".to_string(),
                        found,
                    }
                    .into());
                }
            }
        }

        Ok(StatementKind::Switch {
            subject,
            cases,
            default,
        })
    }

    /// `name: T [= init]`
    fn parse_var_decl(&mut self) -> Result<StatementKind, CompilerError> {
        let (name, _) = self.expect_identifier("declaration")?;
        self.expect(TokenType::Colon, "declaration")?;
        let declared_type = self.parse_type_expr()?;
        let init = if self.match_token(&TokenType::Equal)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.end_simple_statement("declaration")?;

        Ok(StatementKind::VarDecl(VarDecl {
            name,
            declared_type: Some(declared_type),
            init,
            value_type: None,
        }))
    }

    fn parse_expression_or_assignment(&mut self) -> Result<StatementKind, CompilerError> {
        let expr = self.parse_expression()?;

        if !self.check(&TokenType::Equal)? {
            self.end_simple_statement("expression")?;
            return Ok(StatementKind::Expression(expr));
        }

        if !expr.is_lvalue() {
            return Err(ParseError::InvalidExpression {
                message: "cannot assign to this expression".to_string(),
                location: expr.span.start,
            }
            .into());
        }
        self.advance()?;
        let value = self.parse_expression()?;
        self.end_simple_statement("assignment")?;

        Ok(StatementKind::Assign { target: expr, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Module {
        Parser::from_source(input, "<test>").parse_module().unwrap()
    }

    fn parse_err(input: &str) -> String {
        Parser::from_source(input, "<test>")
            .parse_module()
            .unwrap_err()
            .message()
            .to_string()
    }

    #[test]
    fn test_declaration_and_assignment() {
        let module = parse("x: int = 3\ny = x\n");
        assert_eq!(module.body.len(), 2);

        let StatementKind::VarDecl(decl) = &module.body[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(decl.name, "x");
        assert_eq!(decl.declared_type.as_ref().map(|t| t.to_string()), Some("int".to_string()));
        assert!(decl.init.is_some());

        assert!(matches!(module.body[1].kind, StatementKind::Assign { .. }));
    }

    #[test]
    fn test_elif_chain_nests_in_orelse() {
        let module = parse(indoc! {"
            if a:
                x = 1
            elif b:
                x = 2
            else:
                x = 3
        "});
        let StatementKind::If { orelse, .. } = &module.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(orelse.len(), 1);
        let StatementKind::If { orelse: inner, .. } = &orelse[0].kind else {
            panic!("expected nested if");
        };
        assert_eq!(inner.len(), 1);
        assert!(matches!(inner[0].kind, StatementKind::Assign { .. }));
    }

    #[test]
    fn test_loops() {
        let module = parse(indoc! {"
            while i < 10:
                i++
            else:
                pass
            do:
                i--
            while i > 0
        "});
        let StatementKind::While { body, orelse, .. } = &module.body[0].kind else {
            panic!("expected while");
        };
        assert_eq!((body.len(), orelse.len()), (1, 1));
        assert!(matches!(module.body[1].kind, StatementKind::DoWhile { .. }));
    }

    #[test]
    fn test_switch_cases_and_default() {
        let module = parse(indoc! {"
            switch day:
                case 1, 2:
                    x = 1
                    break
                case 3:
                    pass
                else:
                    x = 0
            y = 2
        "});
        assert_eq!(module.body.len(), 2);
        let StatementKind::Switch { cases, default, .. } = &module.body[0].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].values.len(), 2);
        assert_eq!(cases[0].body.len(), 2);
        assert_eq!(default.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_single_line_blocks() {
        let module = parse("if x: return 1\nreturn\n");
        let StatementKind::If { body, .. } = &module.body[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(body[0].kind, StatementKind::Return(Some(_))));
        assert!(matches!(module.body[1].kind, StatementKind::Return(None)));
    }

    #[test]
    fn test_nested_blocks_close_at_eof() {
        let module = parse("while a:\n    if b:\n        break");
        let StatementKind::While { body, .. } = &module.body[0].kind else {
            panic!("expected while");
        };
        let StatementKind::If { body: inner, .. } = &body[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(inner[0].kind, StatementKind::Break));
    }

    #[test]
    fn test_assignment_is_not_an_expression() {
        assert_eq!(parse_err("f(x = 1)\n"), "Expected ')' in call arguments, found =");
        assert_eq!(parse_err("1 = x\n"), "cannot assign to this expression");
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        assert_eq!(parse_err("x = 1 2\n"), "Expected end of line after assignment, found 2");
    }

    #[test]
    fn test_switch_requires_cases() {
        assert_eq!(
            parse_err("switch x:\n    x = 1\n"),
            "Expected 'case' or 'else' in switch statement, found x"
        );
    }
}
