//! Tokenizer and parser tests over whole programs

use cu_frontend::ast::{ExpressionKind, StatementKind, TypeExprKind};
use cu_frontend::{format_module, Frontend, TokenType};
use indoc::indoc;
use pretty_assertions::assert_eq;

const LINKED_LIST: &str = indoc! {"
    include \"stdio.h\"
    include \"stdlib.h\"
    struct Node:
        value: int
        next: Node[]
    struct List:
        head: Node[]
        length: size_t
    def new_list() -> List[]:
        l: List[] = malloc(sizeof(List))
        l->head = NULL
        l->length = 0
        return l
    def list_append(l: List[], value: int) -> void:
        node: Node[] = malloc(sizeof(Node))
        node->value = value
        node->next = l->head
        l->head = node
        l->length++
    def list_pop(l: List[]) -> int:
        if l->head == NULL:
            return -1
        node = l->head
        value = node->value
        l->head = node->next
        l->length--
        free(node)
        return value
    def main(argc: int, argv: char[][]) -> int:
        l = new_list()
        i = 0
        while i < 10:
            list_append(l, i * i)
            i++
        while l->length:
            printf(\"%d\\n\", list_pop(l))
        return 0
"};

fn token_types(source: &str) -> Vec<TokenType> {
    Frontend::tokenize_source(source, "<test>")
        .unwrap()
        .into_iter()
        .map(|token| token.token_type)
        .collect()
}

#[test]
fn test_indents_and_dedents_balance() {
    for source in [LINKED_LIST, "def f():\n    if x:\n        while y:\n            pass"] {
        let types = token_types(source);
        let indents = types.iter().filter(|t| **t == TokenType::Indent).count();
        let dedents = types.iter().filter(|t| **t == TokenType::Dedent).count();
        assert_eq!(indents, dedents);
        assert_eq!(types.last(), Some(&TokenType::EndOfFile));
        assert_eq!(types.iter().filter(|t| **t == TokenType::EndOfFile).count(), 1);
    }
}

#[test]
fn test_dedent_follows_newline() {
    let types = token_types("if a:\n    b\nc\n");
    let dedent = types.iter().position(|t| *t == TokenType::Dedent).unwrap();
    assert_eq!(types[dedent - 1], TokenType::Newline);
}

#[test]
fn test_indentation_errors() {
    let err = Frontend::tokenize_source("if a:\n        b\n    c\n", "<test>").unwrap_err();
    assert_eq!(err.message(), "inconsistent indentation");
    assert_eq!(err.location().map(|l| l.line), Some(3));

    let err = Frontend::tokenize_source("a\n    b\n", "<test>").unwrap_err();
    assert_eq!(err.message(), "indentation increase but not in new block");

    let err = Frontend::parse_source("if a:\nb\n", "<test>").unwrap_err();
    assert_eq!(err.message(), "expected an indented block");
}

#[test]
fn test_program_round_trips_through_the_formatter() {
    let module = Frontend::parse_source(LINKED_LIST, "ll.cu").unwrap();
    let printed = format_module(&module);
    assert_eq!(printed, LINKED_LIST);

    let reparsed = Frontend::parse_source(&printed, "ll.cu").unwrap();
    assert_eq!(format_module(&reparsed), printed);
}

#[test]
fn test_module_shape() {
    let module = Frontend::parse_source(LINKED_LIST, "ll.cu").unwrap();
    assert_eq!(module.filename, "ll.cu");

    let names: Vec<String> = module
        .body
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StatementKind::Include(path) => Some(format!("include {}", path)),
            StatementKind::Struct { name, fields } => Some(format!("struct {} ({})", name, fields.len())),
            StatementKind::FunctionDef(def) => Some(format!("def {} ({})", def.name, def.params.len())),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "include stdio.h",
            "include stdlib.h",
            "struct Node (2)",
            "struct List (2)",
            "def new_list (0)",
            "def list_append (2)",
            "def list_pop (1)",
            "def main (2)",
        ]
    );
}

#[test]
fn test_suffixes_distribute_left_to_right() {
    let module = Frontend::parse_source("a: int[3][]\nb: int[][3]\n", "<test>").unwrap();
    let shapes: Vec<String> = module
        .body
        .iter()
        .map(|stmt| match &stmt.kind {
            StatementKind::VarDecl(decl) => match &decl.declared_type.as_ref().unwrap().kind {
                TypeExprKind::Pointer(inner) => format!("pointer to {}", inner),
                TypeExprKind::Array { element, .. } => format!("array of {}", element),
                other => format!("{:?}", other),
            },
            other => panic!("expected declaration, got {:?}", other),
        })
        .collect();
    assert_eq!(shapes, vec!["pointer to int[3]", "array of int[]"]);
}

#[test]
fn test_precedence_in_statements() {
    let module = Frontend::parse_source("x = 7 > 6 > 5\ny = <float> 2 / 4\n", "<test>").unwrap();

    let StatementKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected assignment");
    };
    let ExpressionKind::Binary { left, .. } = &value.kind else {
        panic!("expected comparison");
    };
    assert!(matches!(left.kind, ExpressionKind::Binary { .. }));

    let StatementKind::Assign { value, .. } = &module.body[1].kind else {
        panic!("expected assignment");
    };
    let ExpressionKind::Binary { left, .. } = &value.kind else {
        panic!("expected division");
    };
    assert!(matches!(left.kind, ExpressionKind::Cast { .. }));
}

#[test]
fn test_errors_carry_locations() {
    let err = Frontend::parse_source("def f(:\n    pass\n", "bad.cu").unwrap_err();
    let location = err.location().unwrap();
    assert_eq!((location.line, location.column), (1, 7));
    assert_eq!(location.filename, "bad.cu");
}
