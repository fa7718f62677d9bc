//! Statement checking

use super::constants;
use super::errors::SemanticError;
use super::expressions::origin_of;
use super::{Binding, Checker};
use crate::ast::*;
use crate::types::{can_implicit_assign, ValueType};
use cu_common::{CompilerError, SourceLocation};

impl Checker {
    pub(crate) fn check_statement(&mut self, stmt: Statement) -> Result<Statement, CompilerError> {
        let Statement { node_id, kind, span } = stmt;
        let location = span.start.clone();

        let kind = match kind {
            StatementKind::Expression(expr) => StatementKind::Expression(self.check_expression(expr)?),

            StatementKind::VarDecl(decl) => StatementKind::VarDecl(self.check_var_decl(decl, &location)?),

            StatementKind::Assign { target, value } => self.check_assign(target, value)?,

            StatementKind::FunctionDecl(decl) => {
                StatementKind::FunctionDecl(self.check_function_decl(decl, &location)?)
            }

            StatementKind::FunctionDef(def) => StatementKind::FunctionDef(self.check_function_def(def, &location)?),

            StatementKind::Return(value) => StatementKind::Return(self.check_return(value, &location)?),

            StatementKind::If {
                condition,
                body,
                orelse,
            } => {
                let condition = self.check_condition(condition, "if statement")?;
                let body = self.check_block(body)?;
                let orelse = self.check_block(orelse)?;
                StatementKind::If {
                    condition,
                    body,
                    orelse,
                }
            }

            StatementKind::While {
                condition,
                body,
                orelse,
            } => {
                let condition = self.check_condition(condition, "while loop")?;
                let body = self.check_breakable(body)?;
                let orelse = self.check_block(orelse)?;
                StatementKind::While {
                    condition,
                    body,
                    orelse,
                }
            }

            StatementKind::DoWhile { body, condition } => {
                let body = self.check_breakable(body)?;
                let condition = self.check_condition(condition, "do-while loop")?;
                StatementKind::DoWhile { body, condition }
            }

            StatementKind::Switch {
                subject,
                cases,
                default,
            } => self.check_switch(subject, cases, default)?,

            StatementKind::Break => {
                if self.breakable_depth == 0 {
                    return Err(SemanticError::Misplaced {
                        statement: "break".to_string(),
                        place: "inside a loop or switch".to_string(),
                        location,
                    }
                    .into());
                }
                StatementKind::Break
            }

            StatementKind::Pass => StatementKind::Pass,

            StatementKind::Struct { name, fields } => {
                self.check_struct(&name, &fields, &location)?;
                StatementKind::Struct { name, fields }
            }

            StatementKind::Enum { name, members } => {
                self.check_enum(&name, &members, &location)?;
                StatementKind::Enum { name, members }
            }

            StatementKind::Typedef { target, name } => {
                self.check_typedef(&target, &name, &location)?;
                StatementKind::Typedef { target, name }
            }

            StatementKind::Define { name, value } => self.check_define(name, value, &location)?,

            StatementKind::Include(path) => {
                if !self.at_top_level() {
                    return Err(SemanticError::Misplaced {
                        statement: "include".to_string(),
                        place: "at the top level".to_string(),
                        location,
                    }
                    .into());
                }
                self.check_include(&path, &location)?;
                StatementKind::Include(path)
            }

            kind @ (StatementKind::Ifndef(_) | StatementKind::Endif) => kind,
        };

        Ok(Statement::new(node_id, kind, span))
    }

    /// Bind `name` in the current scope, rejecting a conflicting type
    pub(crate) fn declare(&mut self, name: &str, value_type: ValueType, location: &SourceLocation) -> Result<(), CompilerError> {
        match self.env.current_mut().bind(name, value_type.clone()) {
            Binding::New | Binding::Repeated => Ok(()),
            Binding::Conflict(previous) => Err(SemanticError::Redeclaration {
                name: name.to_string(),
                previous,
                found: value_type,
                location: location.clone(),
            }
            .into()),
        }
    }

    fn check_var_decl(&mut self, decl: VarDecl, location: &SourceLocation) -> Result<VarDecl, CompilerError> {
        let VarDecl {
            name,
            declared_type,
            init,
            ..
        } = decl;

        let value_type = match &declared_type {
            Some(type_expr) => self.resolve_type(type_expr)?,
            None => {
                return Err(SemanticError::CannotInfer {
                    name,
                    found: ValueType::void(),
                    location: location.clone(),
                }
                .into())
            }
        };
        if value_type.is_void() {
            return Err(SemanticError::CannotInfer {
                name,
                found: value_type,
                location: location.clone(),
            }
            .into());
        }

        let init = match init {
            Some(init) => {
                let origin = origin_of(&init);
                let (init, init_type) = self.check_typed(init)?;
                if !can_implicit_assign(&value_type, &init_type, origin) {
                    return Err(SemanticError::TypeMismatch {
                        context: format!("initialization of '{}'", name),
                        expected: value_type,
                        found: init_type,
                        location: init.span.start.clone(),
                    }
                    .into());
                }
                Some(init)
            }
            None => None,
        };

        self.declare(&name, value_type.clone(), location)?;
        Ok(VarDecl {
            name,
            declared_type,
            init,
            value_type: Some(value_type),
        })
    }

    /// Assignment to a declared target, or the implicit declaration of a
    /// new name by its first assignment
    fn check_assign(&mut self, target: Expression, value: Expression) -> Result<StatementKind, CompilerError> {
        let origin = origin_of(&value);

        if let ExpressionKind::Name(name) = &target.kind {
            let Some(target_type) = self.lookup_variable(name)? else {
                return self.declare_implicitly(name.clone(), value, &target.span.start);
            };

            if target_type.is_array() || target_type.is_callable() {
                return Err(SemanticError::NotAssignable {
                    what: format!("'{}' of type {}", name, target_type),
                    location: target.span.start.clone(),
                }
                .into());
            }
            let (value, value_type) = self.check_typed(value)?;
            if !target_type.assignment_equal(&value_type) {
                return Err(SemanticError::TypeMismatch {
                    context: format!("assignment to '{}'", name),
                    expected: target_type,
                    found: value_type,
                    location: value.span.start.clone(),
                }
                .into());
            }
            let target = target.typed(target_type);
            return Ok(StatementKind::Assign { target, value });
        }

        let (target, target_type) = self.check_typed(target)?;
        if target_type.is_array() || target_type.is_callable() {
            return Err(SemanticError::NotAssignable {
                what: format!("a value of type {}", target_type),
                location: target.span.start.clone(),
            }
            .into());
        }
        let (value, value_type) = self.check_typed(value)?;
        if !can_implicit_assign(&target_type, &value_type, origin) {
            return Err(SemanticError::TypeMismatch {
                context: "assignment".to_string(),
                expected: target_type,
                found: value_type,
                location: value.span.start.clone(),
            }
            .into());
        }
        Ok(StatementKind::Assign { target, value })
    }

    fn declare_implicitly(
        &mut self,
        name: String,
        value: Expression,
        location: &SourceLocation,
    ) -> Result<StatementKind, CompilerError> {
        let (value, value_type) = self.check_typed(value)?;
        if value_type.is_null() || value_type.is_void() || value_type.is_vararg() {
            return Err(SemanticError::CannotInfer {
                name,
                found: value_type,
                location: location.clone(),
            }
            .into());
        }

        log::debug!("implicit declaration of '{}' as {} at {}", name, value_type, location);
        self.declare(&name, value_type.clone(), location)?;
        Ok(StatementKind::VarDecl(VarDecl {
            name,
            declared_type: None,
            init: Some(value),
            value_type: Some(value_type),
        }))
    }

    fn check_condition(&mut self, condition: Expression, context: &str) -> Result<Expression, CompilerError> {
        let (condition, condition_type) = self.check_typed(condition)?;
        if !condition_type.is_truthy() {
            return Err(SemanticError::NotTestable {
                context: context.to_string(),
                found: condition_type,
                location: condition.span.start.clone(),
            }
            .into());
        }
        Ok(condition)
    }

    /// A body that `break` may leave
    fn check_breakable(&mut self, body: Vec<Statement>) -> Result<Vec<Statement>, CompilerError> {
        self.breakable_depth += 1;
        let result = self.check_block(body);
        self.breakable_depth -= 1;
        result
    }

    fn check_switch(
        &mut self,
        subject: Expression,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Statement>>,
    ) -> Result<StatementKind, CompilerError> {
        let (subject, subject_type) = self.check_typed(subject)?;
        if !(subject_type.is_integral() || subject_type.is_enum()) {
            return Err(SemanticError::InvalidOperand {
                operator: "switch".to_string(),
                found: subject_type,
                location: subject.span.start.clone(),
            }
            .into());
        }

        let mut checked_cases = Vec::with_capacity(cases.len());
        for case in cases {
            let mut case_type: Option<ValueType> = None;
            let mut values = Vec::with_capacity(case.values.len());
            for value in case.values {
                let (value, value_type) = self.check_typed(value)?;
                let location = value.span.start.clone();
                match &case_type {
                    Some(expected) if *expected != value_type => {
                        return Err(SemanticError::TypeMismatch {
                            context: "case label".to_string(),
                            expected: expected.clone(),
                            found: value_type,
                            location,
                        }
                        .into())
                    }
                    Some(_) => {}
                    None => {
                        if !can_implicit_assign(&subject_type, &value_type, origin_of(&value)) {
                            return Err(SemanticError::TypeMismatch {
                                context: "case label".to_string(),
                                expected: subject_type.clone(),
                                found: value_type,
                                location,
                            }
                            .into());
                        }
                        case_type = Some(value_type);
                    }
                }
                values.push(value);
            }
            let body = self.check_breakable(case.body)?;
            checked_cases.push(SwitchCase {
                values,
                body,
                span: case.span,
            });
        }

        let default = default.map(|body| self.check_breakable(body)).transpose()?;

        Ok(StatementKind::Switch {
            subject,
            cases: checked_cases,
            default,
        })
    }

    fn check_struct(&mut self, name: &str, fields: &[Field], location: &SourceLocation) -> Result<(), CompilerError> {
        let opaque = ValueType::Struct {
            name: name.to_string(),
            members: Vec::new(),
        };
        self.env
            .current_mut()
            .types
            .add_type(name, opaque.clone())
            .map_err(|err| SemanticError::type_rule(err, location))?;

        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let field_type = self.resolve_type(&field.field_type)?;
            if field_type.is_void() || holds_by_value(&field_type, &opaque) {
                let detail = if field_type.is_void() {
                    format!("field '{}' cannot have type void", field.name)
                } else {
                    "cannot contain itself".to_string()
                };
                return Err(SemanticError::InvalidStruct {
                    name: name.to_string(),
                    detail,
                    location: field.span.start.clone(),
                }
                .into());
            }
            members.push((field.name.clone(), field_type));
        }

        self.env.current_mut().types.complete_type(
            name,
            ValueType::Struct {
                name: name.to_string(),
                members,
            },
        );
        Ok(())
    }

    /// The enum becomes a scalar type; members are constants of that type
    fn check_enum(&mut self, name: &str, members: &[String], location: &SourceLocation) -> Result<(), CompilerError> {
        let enum_type = ValueType::scalar(name);
        self.env
            .current_mut()
            .types
            .add_type(name, enum_type.clone())
            .map_err(|err| SemanticError::type_rule(err, location))?;

        for (value, member) in members.iter().enumerate() {
            self.declare(member, enum_type.clone(), location)?;
            self.env.current_mut().constants.insert(member.clone(), value as i64);
        }
        Ok(())
    }

    /// A bare name target is stored as an alias so the chain stays
    /// visible; anything else is resolved first.
    fn check_typedef(&mut self, target: &TypeExpr, name: &str, location: &SourceLocation) -> Result<(), CompilerError> {
        if let TypeExprKind::Name(target_name) = &target.kind {
            if !self.env.current().types.type_exists(target_name) {
                self.load_builtin_type(target_name)?;
            }
            if self.env.current().types.type_exists(target_name) {
                return self
                    .env
                    .current_mut()
                    .types
                    .bind_alias(name, target_name)
                    .map_err(|err| SemanticError::type_rule(err, location).into());
            }
        }

        let resolved = self.resolve_type(target)?;
        self.env
            .current_mut()
            .types
            .bind_typedef(name, resolved)
            .map_err(|err| SemanticError::type_rule(err, location).into())
    }

    fn check_define(
        &mut self,
        name: String,
        value: Option<Expression>,
        location: &SourceLocation,
    ) -> Result<StatementKind, CompilerError> {
        let Some(value) = value else {
            self.env.current_mut().macros.insert(name.clone());
            return Ok(StatementKind::Define { name, value: None });
        };

        let (value, value_type) = self.check_typed(value)?;
        self.declare(&name, value_type, location)?;
        let scope = self.env.current_mut();
        match constants::fold(&value, &scope.constants) {
            Some(constant) => {
                scope.constants.insert(name.clone(), constant);
            }
            None => {
                scope.constants.remove(&name);
            }
        }
        Ok(StatementKind::Define {
            name,
            value: Some(value),
        })
    }
}

/// Whether a value of `field_type` stores `target` inline. Arrays store
/// their elements inline; pointers do not.
fn holds_by_value(field_type: &ValueType, target: &ValueType) -> bool {
    match field_type {
        ValueType::Array { element, .. } => holds_by_value(element, target),
        ValueType::Struct { .. } => field_type == target,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::StatementKind;
    use crate::semantic::tests::check;
    use crate::types::ValueType;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn error(source: &str) -> String {
        check(source).unwrap_err().message().to_string()
    }

    #[test]
    fn test_implicit_declaration_is_spelled_out() {
        let unit = check("greeting = \"hello\"\n").unwrap();
        let StatementKind::VarDecl(decl) = &unit.module.body[0].kind else {
            panic!("expected declaration, got {:?}", unit.module.body[0].kind);
        };
        assert_eq!(decl.name, "greeting");
        assert!(decl.declared_type.is_none());
        assert_eq!(decl.value_type, Some(ValueType::array_of(ValueType::char(), 6)));
    }

    #[test]
    fn test_reassignment_must_match_exactly() {
        let unit = check("x = 1\nx = 2\n").unwrap();
        assert!(matches!(unit.module.body[1].kind, StatementKind::Assign { .. }));
        assert_eq!(
            error("x = 1\nx = 'c'\n"),
            "Type mismatch in assignment to 'x': expected int, found char"
        );
        assert_eq!(
            error("p: char[]\np = NULL\nq: int[] = p\n"),
            "Type mismatch in initialization of 'q': expected int[], found char[]"
        );
        assert!(check("p: int[]\np = NULL\nv: void[] = p\np = v\n").is_ok());
    }

    #[test]
    fn test_implicit_declaration_pulls_in_builtin_header() {
        let unit = check(indoc! {"
            def main():
                p = malloc(sizeof(int))
                q = malloc(4)
                free(p)
                return 0
        "})
        .unwrap();
        assert_eq!(unit.headers, vec!["stdlib.h"]);

        let StatementKind::FunctionDef(def) = &unit.module.body[0].kind else {
            panic!("expected definition");
        };
        for (stmt, name) in def.body.iter().zip(["p", "q"]) {
            let StatementKind::VarDecl(decl) = &stmt.kind else {
                panic!("expected declaration, got {:?}", stmt.kind);
            };
            assert_eq!(decl.name, name);
            assert_eq!(decl.value_type, Some(ValueType::pointer_to(ValueType::void())));
        }
    }

    #[test]
    fn test_uninferrable_values() {
        assert_eq!(
            error("p = NULL\n"),
            "Cannot infer the type of 'p' from a value of type NULL"
        );
        assert_eq!(
            error("def f() -> void\nx = f()\n"),
            "Cannot infer the type of 'x' from a value of type void"
        );
    }

    #[test]
    fn test_redeclaration() {
        assert!(check("x: int\nx: int\n").is_ok());
        assert_eq!(
            error("x: int\nx: char\n"),
            "'x' redeclared as char, previously declared as int"
        );
        assert!(check("x: int\ndef f():\n    x: char = 'a'\n").is_ok());
        assert_eq!(
            error("x: int\nif x:\n    x: char = 'a'\n"),
            "'x' redeclared as char, previously declared as int"
        );
    }

    #[test]
    fn test_conditions_must_be_testable() {
        let source = indoc! {"
            struct P:
                x: int
            p: P
            while p:
                pass
        "};
        assert_eq!(
            error(source),
            "Condition of while loop has type P, which cannot be tested"
        );
    }

    #[test]
    fn test_break_placement() {
        assert!(check("while 1:\n    if 1:\n        break\n").is_ok());
        assert_eq!(error("break\n"), "'break' is only allowed inside a loop or switch");
    }

    #[test]
    fn test_switch_labels() {
        let source = indoc! {"
            enum color {RED, GREEN}
            c = RED
            switch c:
                case RED, GREEN:
                    break
                else:
                    pass
        "};
        assert!(check(source).is_ok());
        assert_eq!(
            error("x = 1\nswitch x:\n    case 1, 'a':\n        pass\n"),
            "Type mismatch in case label: expected int, found char"
        );
        assert_eq!(
            error("x = 1.5\nswitch x:\n    case 1:\n        pass\n"),
            "Invalid operand of type float for 'switch'"
        );
    }

    #[test]
    fn test_structs() {
        let unit = check(indoc! {"
            struct Node:
                value: int
                next: Node[]
        "})
        .unwrap();
        let node = unit.globals.types.exhaust_typedef("Node").unwrap();
        assert_eq!(node.member("value"), Some(&ValueType::int()));

        assert_eq!(
            error("struct Loop:\n    inner: Loop\n"),
            "Struct 'Loop' cannot contain itself"
        );
        assert_eq!(
            error("struct Loop:\n    inner: Loop[3]\n"),
            "Struct 'Loop' cannot contain itself"
        );
        assert_eq!(
            error("struct Loop:\n    value: int\n    inner: Loop[2][3]\n"),
            "Struct 'Loop' cannot contain itself"
        );
        let unit = check("struct Ring:\n    window: Ring[3][]\n").unwrap();
        let ring = unit.globals.types.exhaust_typedef("Ring").unwrap();
        assert_eq!(
            ring.member("window").map(ToString::to_string),
            Some("Ring[3][]".to_string())
        );
        assert_eq!(
            error("struct A: pass\nstruct A: pass\n"),
            "Type 'A' is already defined"
        );
    }

    #[test]
    fn test_enums_and_defines() {
        let unit = check(indoc! {"
            enum days {MON, TUE, WED}
            define SIZE 4
            define GUARD
            buf: int[SIZE + WED]
        "})
        .unwrap();
        assert_eq!(unit.globals.lookup("TUE"), Some(&ValueType::scalar("days")));
        assert_eq!(unit.globals.constants.get("SIZE"), Some(&4));
        assert!(unit.globals.macros.contains("GUARD"));
        assert_eq!(
            unit.globals.lookup("buf"),
            Some(&ValueType::array_of(ValueType::int(), 6))
        );
    }

    #[test]
    fn test_typedef_chains() {
        let unit = check("typedef int number\ntypedef number count\nn: count = 3\n").unwrap();
        assert_eq!(unit.globals.lookup("n"), Some(&ValueType::int()));
        assert_eq!(
            error("typedef int A\ntypedef A A\n"),
            "Typedef cycle: A -> A"
        );
        assert_eq!(
            error("typedef int A\ntypedef char A\n"),
            "Cannot rebind existing type 'A' with typedef"
        );
    }
}
