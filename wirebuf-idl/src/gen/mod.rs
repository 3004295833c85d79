//! Code generators.
//!
//! Both generators walk the resolved [`Syntax`](crate::ast::Syntax) and
//! write source that encodes every field exactly as the `wirebuf` structural
//! codec would: fields in declaration order, arrays as a varint count
//! followed by the elements, nested messages inline.
pub(crate) mod js;
pub(crate) mod rust;

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// `user_id` and `userId` both become `UserId`.
pub(crate) fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// `userId` becomes `user_id`. Runs of capitals stay together: `ID` is `id`.
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Make `name` usable as a Rust identifier.
pub(crate) fn rust_ident(name: String) -> String {
    match name.as_str() {
        "self" | "Self" | "super" | "crate" | "" => format!("{name}_"),
        n if n.starts_with(|c: char| c.is_ascii_digit()) => format!("_{name}"),
        n if RUST_KEYWORDS.contains(&n) => format!("r#{name}"),
        _ => name,
    }
}

pub(crate) fn type_ident(name: &str) -> String {
    rust_ident(pascal_case(name))
}

pub(crate) fn field_ident(name: &str) -> String {
    rust_ident(snake_case(name))
}
