//! Builtin headers
//!
//! A small slice of the C library, written in cu surface syntax. A header
//! is parsed and checked the first time one of its names is looked up and
//! fails to resolve; the header name is then recorded on the checked unit.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub struct BuiltinHeader {
    pub name: &'static str,
    pub source: &'static str,
    /// Functions and variables the header declares
    pub variables: &'static [&'static str],
    /// Types the header declares
    pub types: &'static [&'static str],
}

pub static HEADERS: &[BuiltinHeader] = &[
    BuiltinHeader {
        name: "stdio.h",
        source: r#"ifndef _STDIO_H
define _STDIO_H

struct FILE: pass

stdin: FILE[]
stdout: FILE[]
stderr: FILE[]

def printf(format: char[], ...) -> int
def fprintf(stream: FILE[], format: char[], ...) -> int
def fscanf(stream: FILE[], format: char[], ...) -> int
def fputs(text: char[], stream: FILE[]) -> int
def puts(text: char[]) -> int
def putchar(c: int) -> int
def getchar() -> int

endif
"#,
        variables: &[
            "stdin", "stdout", "stderr", "printf", "fprintf", "fscanf", "fputs", "puts", "putchar",
            "getchar",
        ],
        types: &["FILE"],
    },
    BuiltinHeader {
        name: "stdlib.h",
        source: r#"ifndef _STDLIB_H
define _STDLIB_H

typedef uint size_t

def malloc(size: size_t) -> void[]
def calloc(count: size_t, size: size_t) -> void[]
def realloc(ptr: void[], size: size_t) -> void[]
def free(ptr: void[]) -> void
def exit(status: int) -> void
def atoi(text: char[]) -> int
def abs(n: int) -> int

endif
"#,
        variables: &["malloc", "calloc", "realloc", "free", "exit", "atoi", "abs"],
        types: &["size_t"],
    },
    BuiltinHeader {
        name: "assert.h",
        source: r#"ifndef _ASSERT_H
define _ASSERT_H

def assert(expr: int) -> void

endif
"#,
        variables: &["assert"],
        types: &[],
    },
    BuiltinHeader {
        name: "string.h",
        source: r#"ifndef _STRING_H
define _STRING_H

include "stdlib.h"

def strlen(text: char[]) -> size_t
def strcpy(dest: char[], src: char[]) -> char[]
def strncpy(dest: char[], src: char[], n: size_t) -> char[]
def strcmp(a: char[], b: char[]) -> int
def memcpy(dest: void[], src: void[], n: size_t) -> void[]
def memset(dest: void[], c: int, n: size_t) -> void[]

endif
"#,
        variables: &["strlen", "strcpy", "strncpy", "strcmp", "memcpy", "memset"],
        types: &[],
    },
];

static VARIABLE_HEADERS: Lazy<HashMap<&'static str, &'static BuiltinHeader>> = Lazy::new(|| {
    HEADERS
        .iter()
        .flat_map(|header| header.variables.iter().map(move |name| (*name, header)))
        .collect()
});

static TYPE_HEADERS: Lazy<HashMap<&'static str, &'static BuiltinHeader>> = Lazy::new(|| {
    HEADERS
        .iter()
        .flat_map(|header| header.types.iter().map(move |name| (*name, header)))
        .collect()
});

pub fn header(name: &str) -> Option<&'static BuiltinHeader> {
    HEADERS.iter().find(|header| header.name == name)
}

/// Header declaring the function or variable `name`
pub fn header_for_variable(name: &str) -> Option<&'static BuiltinHeader> {
    VARIABLE_HEADERS.get(name).copied()
}

/// Header declaring the type `name`
pub fn header_for_type(name: &str) -> Option<&'static BuiltinHeader> {
    TYPE_HEADERS.get(name).copied()
}
