//! Locates routine signatures and bodies inside a package body's source
//! text without fully parsing PL/SQL control flow. Needed because a
//! package body is one blob of text holding many `FUNCTION`/`PROCEDURE`
//! members, each of which has to be sliced out, individually transpiled,
//! and (if transpilation fails) replaced with a stub that still lets the
//! rest of the package compile.
//!
//! The scanner tracks `BEGIN`/`END` nesting depth so a member's body ends
//! at the `END` that closes its own `BEGIN`, not at the first `END` seen
//! (which might close a nested `IF`/`LOOP`/`CASE`). It never parses
//! expressions; it only counts keywords and balances parentheses and
//! string/quoted-identifier literals.

use smol_str::SmolStr;

use crate::lexer::{lex, strip_comments};
use crate::token::{Keyword, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Function,
    Procedure,
    Member,
    Static,
    Map,
    Order,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineSpan {
    pub name: SmolStr,
    pub kind: RoutineKind,
    pub signature_start: usize,
    pub signature_end: usize,
    pub body_start: usize,
    pub body_end: usize,
    /// True when no `BEGIN ... END` body was found before the next member
    /// or the closing `END;` of the package — a forward declaration in the
    /// package spec, or a member the scanner couldn't resolve. Forward
    /// declarations are discarded rather than stubbed: they carry no body
    /// to translate and the real definition in the package body supplies
    /// the implementation.
    pub is_forward_declaration: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TopLevel,
    AfterKeyword,
    InSignature,
    InParen,
    InBody,
}

/// Scans `source` (an entire package body, or a single standalone
/// function/procedure) for member routines. `source` should be the
/// original text, not pre-stripped — comments are stripped internally so
/// reported spans still index into the caller's original string.
pub fn scan_routines(source: &str) -> Vec<RoutineSpan> {
    let cleaned = strip_comments(source);
    let tokens = match lex(&cleaned) {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };

    let mut spans = Vec::new();
    let mut state = State::TopLevel;
    let mut paren_depth: i32 = 0;
    let mut begin_depth: i32 = 0;
    let mut pending_kind: Option<RoutineKind> = None;
    let mut pending_name: Option<SmolStr> = None;
    let mut sig_start = 0usize;
    let mut sig_end = 0usize;
    let mut body_start = 0usize;

    let mut i = 0usize;
    while i < tokens.len() {
        let tok = &tokens[i];
        match state {
            State::TopLevel => match &tok.kind {
                TokenKind::Keyword(Keyword::Function) => {
                    pending_kind = Some(RoutineKind::Function);
                    sig_start = tok.span.start;
                    state = State::AfterKeyword;
                }
                TokenKind::Keyword(Keyword::Procedure) => {
                    pending_kind = Some(RoutineKind::Procedure);
                    sig_start = tok.span.start;
                    state = State::AfterKeyword;
                }
                _ => {}
            },
            State::AfterKeyword => {
                if let TokenKind::Ident(name) | TokenKind::QuotedIdent(name) = &tok.kind {
                    pending_name = Some(name.clone());
                    state = State::InSignature;
                } else {
                    // Malformed; abandon this attempt.
                    state = State::TopLevel;
                    pending_kind = None;
                }
            }
            State::InSignature => match &tok.kind {
                TokenKind::LParen => {
                    paren_depth = 1;
                    state = State::InParen;
                }
                TokenKind::Semicolon => {
                    // Forward declaration: no body follows.
                    if let (Some(kind), Some(name)) = (pending_kind.take(), pending_name.take()) {
                        spans.push(RoutineSpan {
                            name,
                            kind,
                            signature_start: sig_start,
                            signature_end: tok.span.end,
                            body_start: tok.span.end,
                            body_end: tok.span.end,
                            is_forward_declaration: true,
                        });
                    }
                    state = State::TopLevel;
                }
                TokenKind::Keyword(Keyword::Is) | TokenKind::Keyword(Keyword::As) => {
                    sig_end = tok.span.end;
                    body_start = tokens.get(i + 1).map(|next| next.span.start).unwrap_or(sig_end);
                    state = State::InBody;
                }
                _ => {}
            },
            State::InParen => match &tok.kind {
                TokenKind::LParen => paren_depth += 1,
                TokenKind::RParen => {
                    paren_depth -= 1;
                    if paren_depth == 0 {
                        state = State::InSignature;
                    }
                }
                _ => {}
            },
            State::InBody => match &tok.kind {
                TokenKind::Keyword(Keyword::Begin) => begin_depth += 1,
                TokenKind::Keyword(Keyword::Case) => begin_depth += 1,
                TokenKind::Keyword(Keyword::If) => begin_depth += 1,
                TokenKind::Keyword(Keyword::Loop) => begin_depth += 1,
                TokenKind::Keyword(Keyword::End) => {
                    begin_depth -= 1;
                    // `END IF`/`END LOOP`/`END CASE` close a nested block rather than
                    // opening a new statement, and `END foo;` names the block it
                    // closes; either way the suffix sits directly against `END`
                    // with no semicolon between, so it's safe to fold in here
                    // regardless of whether this `END` is the routine's own.
                    let mut end_pos = tok.span.end;
                    let mut j = i + 1;
                    if let Some(next) = tokens.get(j) {
                        if matches!(
                            &next.kind,
                            TokenKind::Keyword(Keyword::If)
                                | TokenKind::Keyword(Keyword::Loop)
                                | TokenKind::Keyword(Keyword::Case)
                                | TokenKind::Ident(_)
                                | TokenKind::QuotedIdent(_)
                        ) {
                            end_pos = next.span.end;
                            j += 1;
                        }
                    }
                    if let Some(next) = tokens.get(j) {
                        if matches!(&next.kind, TokenKind::Semicolon) {
                            end_pos = next.span.end;
                            j += 1;
                        }
                    }
                    i = j - 1;
                    if begin_depth <= 0 {
                        if let (Some(kind), Some(name)) = (pending_kind.take(), pending_name.take()) {
                            spans.push(RoutineSpan {
                                name,
                                kind,
                                signature_start: sig_start,
                                signature_end: sig_end,
                                body_start,
                                body_end: end_pos,
                                is_forward_declaration: false,
                            });
                        }
                        state = State::TopLevel;
                        begin_depth = 0;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    spans
}

/// Synthesizes a stub for one located member by replacing its body span
/// with a minimal, syntactically valid body, carrying the original
/// signature (up to and including the `IS`/`AS` keyword) through unchanged.
/// Functions, constructors, and the other function-shaped member kinds get
/// `RETURN NULL;`; procedures get a bare `RETURN;`.
///
/// `source` must be the same original text `span` was produced from — the
/// span's byte offsets index into it directly. Forward declarations have no
/// body span to replace and are not meaningful input here.
pub fn stub_source(source: &str, span: &RoutineSpan) -> String {
    let head = &source[span.signature_start..span.signature_end];
    let body = match span.kind {
        RoutineKind::Procedure => "BEGIN RETURN; END;",
        RoutineKind::Function | RoutineKind::Member | RoutineKind::Static | RoutineKind::Map | RoutineKind::Order | RoutineKind::Constructor => {
            "BEGIN RETURN NULL; END;"
        }
    };
    format!("{head} {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_function() {
        let src = "FUNCTION f(x NUMBER) RETURN NUMBER IS BEGIN RETURN x + 1; END f;";
        let spans = scan_routines(src);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "f");
        assert_eq!(spans[0].kind, RoutineKind::Function);
        assert!(!spans[0].is_forward_declaration);
        assert_eq!(&src[spans[0].body_start..spans[0].body_end], "BEGIN RETURN x + 1; END f;");
    }

    #[test]
    fn forward_declaration_has_no_body() {
        let src = "FUNCTION f(x NUMBER) RETURN NUMBER;";
        let spans = scan_routines(src);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_forward_declaration);
        assert_eq!(spans[0].body_start, spans[0].body_end);
    }

    #[test]
    fn nested_begin_end_does_not_truncate_body() {
        let src = "PROCEDURE p IS BEGIN IF 1 = 1 THEN BEGIN NULL; END; END IF; END p;";
        let spans = scan_routines(src);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].body_end > spans[0].body_start);
        assert!(src[spans[0].body_start..spans[0].body_end].ends_with("END p;"));
    }

    #[test]
    fn loop_inside_body_does_not_truncate() {
        let src = "PROCEDURE p IS BEGIN FOR i IN 1 .. 10 LOOP NULL; END LOOP; END p;";
        let spans = scan_routines(src);
        assert_eq!(spans.len(), 1);
        assert!(src[spans[0].body_start..spans[0].body_end].ends_with("END p;"));
    }

    #[test]
    fn finds_two_members_in_sequence() {
        let src = "FUNCTION a RETURN NUMBER IS BEGIN RETURN 1; END a; \
                   PROCEDURE b IS BEGIN NULL; END b;";
        let spans = scan_routines(src);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].name, "a");
        assert_eq!(spans[1].name, "b");
    }

    #[test]
    fn function_stub_replaces_body_with_return_null() {
        let src = "FUNCTION f(x NUMBER) RETURN NUMBER IS BEGIN RETURN x + 1; END f;";
        let spans = scan_routines(src);
        assert_eq!(stub_source(src, &spans[0]), "FUNCTION f(x NUMBER) RETURN NUMBER IS BEGIN RETURN NULL; END;");
    }

    #[test]
    fn procedure_stub_replaces_body_with_bare_return() {
        let src = "PROCEDURE p IS BEGIN IF 1 = 1 THEN BEGIN NULL; END; END IF; END p;";
        let spans = scan_routines(src);
        assert_eq!(stub_source(src, &spans[0]), "PROCEDURE p IS BEGIN RETURN; END;");
    }
}
