//! Recursive-descent parser for Marn
//!
//! Syntax:
//! ```text
//! : word-name ( inputs -- outputs )
//!   term1 term2 ... ;
//!
//! match:
//!   case: Constructor ( bindings ) body ;
//!   case: Constructor body loop;
//!
//! dip: body ;
//!
//! [ literals ]
//!
//! type: params Name : fields Constructor | Constructor ;
//! alias: params Name : type words ;
//! ```
//!
//! The parser pulls one token at a time from a [`TokenSource`] and never
//! stops on a problem. Each error is recorded in the caller's [`Diagnostics`]
//! and parsing resumes at the nearest `;` or at the next token that can start
//! a top-level item. A definition cut short by a new definition or by end of
//! input is kept with whatever was parsed, and only the innermost open block
//! is reported as unterminated.

use crate::ast::{
    Ast, CaseArm, Comment, DipBlock, Literal, LiteralNode, MatchBlock, NameNode, NumberedWord,
    StackEffect, Term, TypeAlias, TypeConstructor, TypeDefinition, WordDefinition,
};
use crate::config::FrontendConfig;
use crate::diagnostics::{Construct, Diagnostics, ErrorKind};
use crate::lexer::TokenSource;
use crate::token::{Position, Token, TokenKind};
use tracing::{debug, trace};

/// How a block stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEnd {
    /// Closed by its `;`
    Closed,
    /// A `case:` arm closed by `loop;`
    Looped,
    /// A `case:` arrived first; the enclosing `match:` takes it from here
    Interrupted,
    /// A top-level start token or end of input arrived first
    Abandoned,
}

/// Which construct a term sequence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Word,
    Arm,
    Dip,
}

/// The `params Name :` part of `type:` and `alias:`
struct Header {
    params: Vec<NameNode>,
    name: Option<NameNode>,
    /// Set when the header did not reach its `:`
    end: Option<BlockEnd>,
}

pub struct Parser<'e, S: TokenSource> {
    tokens: S,
    errors: &'e mut Diagnostics,
    lookahead: Option<Token>,
    config: FrontendConfig,
    /// Open `match:` / `dip:` blocks
    depth: usize,
}

impl<'e, S: TokenSource> Parser<'e, S> {
    pub fn new(tokens: S, errors: &'e mut Diagnostics) -> Self {
        Self::with_config(tokens, errors, FrontendConfig::default())
    }

    pub fn with_config(tokens: S, errors: &'e mut Diagnostics, config: FrontendConfig) -> Self {
        Parser {
            tokens,
            errors,
            lookahead: None,
            config,
            depth: 0,
        }
    }

    /// Parse the whole token sequence into one aggregate
    pub fn parse(mut self) -> Ast {
        debug!(
            max_nesting_depth = self.config.max_nesting_depth,
            "parse started"
        );
        let mut ast = Ast::new();

        loop {
            let token = self.advance();
            trace!(kind = ?token.kind, at = %token.position, "top-level token");
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Comment(text) => ast.push_comment(Comment {
                    text: text.clone(),
                    position: token.position,
                }),
                TokenKind::Colon => {
                    if let Some(word) = self.parse_word_def(token.position) {
                        ast.add_word(word, self.errors);
                    }
                }
                TokenKind::Type => {
                    if let Some(def) = self.parse_type_def(token.position) {
                        ast.add_type(def, self.errors);
                    }
                }
                TokenKind::Alias => {
                    if let Some(alias) = self.parse_alias(token.position) {
                        ast.add_alias(alias, self.errors);
                    }
                }
                _ => {
                    self.error(
                        ErrorKind::UnexpectedToken {
                            found: token.to_string(),
                            context: "at top level".to_string(),
                        },
                        token.position,
                    );
                    self.recover_top_level();
                }
            }
        }

        debug!(
            words = ast.words().len(),
            types = ast.types().len(),
            aliases = ast.aliases().len(),
            errors = self.errors.error_count(),
            "parse finished"
        );
        ast
    }

    /// Skip to the next token that can start a top-level item
    fn recover_top_level(&mut self) {
        let mut skipped = 0usize;
        while !self.at_top_level_start() {
            self.advance();
            skipped += 1;
        }
        if skipped > 0 {
            let at = self.peek().position;
            debug!(skipped, %at, "resynchronised at top level");
        }
    }

    fn at_top_level_start(&mut self) -> bool {
        let kind = &self.peek().kind;
        kind.starts_top_level() || matches!(kind, TokenKind::Comment(_))
    }

    /// `: name ( effect ) body ;` with the `:` already consumed
    fn parse_word_def(&mut self, position: Position) -> Option<WordDefinition> {
        let name = self.expect_name(":");
        if name.is_none() && self.pending_end() == Some(BlockEnd::Abandoned) {
            return None;
        }
        let construct = Construct::Definition(label(&name));

        let mut effect = None;
        if self.check(&TokenKind::OpenParen) {
            let open = self.advance();
            let (parsed, end) = self.parse_stack_effect(open.position);
            effect = Some(parsed);
            if end == BlockEnd::Abandoned {
                return name.map(|name| WordDefinition {
                    name,
                    effect,
                    body: Vec::new(),
                    position,
                });
            }
        }

        let (body, _) = self.parse_body(BodyKind::Word, &construct);
        name.map(|name| WordDefinition {
            name,
            effect,
            body,
            position,
        })
    }

    /// `( inputs -- outputs )` with the `(` already consumed
    ///
    /// Inputs are bare names. Outputs are words or literals, kept as terms.
    fn parse_stack_effect(&mut self, open: Position) -> (StackEffect, BlockEnd) {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut separated = false;

        let end = loop {
            let Token {
                kind,
                text,
                position,
            } = self.advance();
            match kind {
                TokenKind::DoubleDash if !separated => separated = true,
                TokenKind::CloseParen => {
                    if !separated {
                        self.error(ErrorKind::MissingEffectSeparator, open);
                    }
                    break BlockEnd::Closed;
                }
                TokenKind::Word if !separated => inputs.push(NameNode::new(text, position)),
                TokenKind::Word => outputs.push(Term::WordCall(NameNode::new(text, position))),
                TokenKind::Numbered { keyword, count } if separated => {
                    outputs.push(Term::Numbered(NumberedWord {
                        keyword,
                        count,
                        position,
                    }))
                }
                TokenKind::OpenBracket if separated => {
                    let (list, end) = self.parse_list(position);
                    outputs.push(Term::Literal(list));
                    if end == BlockEnd::Abandoned {
                        break end;
                    }
                }
                TokenKind::Comment(_) => {}
                TokenKind::Semicolon => {
                    self.error(ErrorKind::Unterminated(Construct::StackEffect), position);
                    self.unread(Token::new(TokenKind::Semicolon, text, position));
                    break BlockEnd::Closed;
                }
                stop @ (TokenKind::Colon | TokenKind::Type | TokenKind::Alias | TokenKind::Eof) => {
                    self.error(ErrorKind::Unterminated(Construct::StackEffect), position);
                    self.unread(Token::new(stop, text, position));
                    break BlockEnd::Abandoned;
                }
                other => match literal_value(other) {
                    Some(value) if separated => {
                        outputs.push(Term::Literal(LiteralNode { value, position }))
                    }
                    _ => self.error(
                        ErrorKind::UnexpectedToken {
                            found: quoted(&text),
                            context: "in stack effect".to_string(),
                        },
                        position,
                    ),
                },
            }
        };

        (
            StackEffect {
                inputs,
                outputs,
                position: open,
            },
            end,
        )
    }

    /// Terms up to the closing `;`
    fn parse_body(&mut self, within: BodyKind, construct: &Construct) -> (Vec<Term>, BlockEnd) {
        let mut body = Vec::new();
        // Consecutive stray arms in a word body are reported once
        let mut stray_arms = false;

        loop {
            let after_stray = std::mem::take(&mut stray_arms);
            let Token {
                kind,
                text,
                position,
            } = self.advance();
            match kind {
                TokenKind::Semicolon => return (body, BlockEnd::Closed),
                TokenKind::Loop if within == BodyKind::Arm => return (body, BlockEnd::Looped),
                TokenKind::Loop => {
                    self.error(ErrorKind::LoopOutsideArm, position);
                    return (body, BlockEnd::Closed);
                }
                TokenKind::Word | TokenKind::DoubleDash | TokenKind::Bar => {
                    body.push(Term::WordCall(NameNode::new(text, position)))
                }
                TokenKind::Numbered { keyword, count } => {
                    body.push(Term::Numbered(NumberedWord {
                        keyword,
                        count,
                        position,
                    }))
                }
                TokenKind::OpenBracket => {
                    let (list, end) = self.parse_list(position);
                    body.push(Term::Literal(list));
                    match end {
                        BlockEnd::Closed => {}
                        BlockEnd::Interrupted if within == BodyKind::Word => stray_arms = true,
                        _ => return (body, end),
                    }
                }
                TokenKind::Comment(comment) => {
                    if self.config.keep_body_comments {
                        body.push(Term::Comment(Comment {
                            text: comment,
                            position,
                        }));
                    }
                }
                TokenKind::Match => {
                    let (block, end) = self.parse_match(position);
                    body.extend(block);
                    if end == BlockEnd::Abandoned {
                        return (body, end);
                    }
                }
                TokenKind::Dip => {
                    let (block, end) = self.parse_dip(position);
                    body.extend(block);
                    match end {
                        BlockEnd::Closed => {}
                        BlockEnd::Interrupted if within == BodyKind::Word => stray_arms = true,
                        _ => return (body, end),
                    }
                }
                TokenKind::Case if within == BodyKind::Word => {
                    if !after_stray {
                        self.error(ErrorKind::CaseOutsideMatch, position);
                    }
                    let (_, end) = self.parse_case_arm(position);
                    if end == BlockEnd::Abandoned {
                        return (body, end);
                    }
                    stray_arms = true;
                }
                TokenKind::Case => {
                    self.error(ErrorKind::Unterminated(construct.clone()), position);
                    self.unread(Token::new(TokenKind::Case, text, position));
                    return (body, BlockEnd::Interrupted);
                }
                TokenKind::OpenParen | TokenKind::CloseParen | TokenKind::CloseBracket => {
                    self.error(
                        ErrorKind::UnexpectedToken {
                            found: quoted(&text),
                            context: format!("in {}", construct),
                        },
                        position,
                    )
                }
                stop @ (TokenKind::Colon | TokenKind::Type | TokenKind::Alias | TokenKind::Eof) => {
                    self.error(ErrorKind::Unterminated(construct.clone()), position);
                    self.unread(Token::new(stop, text, position));
                    return (body, BlockEnd::Abandoned);
                }
                literal @ (TokenKind::Integer(_)
                | TokenKind::Nat(_)
                | TokenKind::Float(_)
                | TokenKind::Rational { .. }
                | TokenKind::Bool(_)
                | TokenKind::Str(_)) => {
                    body.extend(
                        literal_value(literal)
                            .map(|value| Term::Literal(LiteralNode { value, position })),
                    );
                }
            }
        }
    }

    /// `match:` followed by its `case:` arms, with the `match:` consumed
    ///
    /// The block ends at the first token after an arm that is not `case:`;
    /// that token is left for the enclosing body. Comments between arms are
    /// dropped.
    fn parse_match(&mut self, position: Position) -> (Option<Term>, BlockEnd) {
        if !self.enter(position) {
            return (None, self.skip_arms());
        }

        let mut arms = Vec::new();
        let mut saw_case = false;
        let mut end = BlockEnd::Closed;
        loop {
            self.skip_comments();
            if !self.check(&TokenKind::Case) {
                break;
            }
            let case = self.advance();
            saw_case = true;
            let (arm, arm_end) = self.parse_case_arm(case.position);
            arms.extend(arm);
            if arm_end == BlockEnd::Abandoned {
                end = arm_end;
                break;
            }
        }
        self.leave();

        if !saw_case {
            self.error(ErrorKind::EmptyMatch, position);
            return (None, end);
        }
        (Some(Term::Match(MatchBlock { arms, position })), end)
    }

    /// `Constructor ( bindings ) body ;` after a `case:`
    fn parse_case_arm(&mut self, position: Position) -> (Option<CaseArm>, BlockEnd) {
        let constructor = self.expect_name("case:");
        if constructor.is_none()
            && let Some(end) = self.pending_end()
        {
            return (None, end);
        }

        let mut bindings = Vec::new();
        if self.check(&TokenKind::OpenParen) {
            self.advance();
            let end = self.parse_bindings(&mut bindings);
            if end != BlockEnd::Closed {
                let arm = constructor.map(|constructor| CaseArm {
                    constructor,
                    bindings,
                    body: Vec::new(),
                    loops: false,
                    position,
                });
                return (arm, end);
            }
        }

        let (body, end) = self.parse_body(BodyKind::Arm, &Construct::CaseArm);
        let loops = end == BlockEnd::Looped;
        let arm = constructor.map(|constructor| CaseArm {
            constructor,
            bindings,
            body,
            loops,
            position,
        });
        (arm, if loops { BlockEnd::Closed } else { end })
    }

    /// Bound names up to `)`, with the `(` consumed
    fn parse_bindings(&mut self, bindings: &mut Vec<NameNode>) -> BlockEnd {
        loop {
            let Token {
                kind,
                text,
                position,
            } = self.advance();
            match kind {
                TokenKind::Word => bindings.push(NameNode::new(text, position)),
                TokenKind::CloseParen => return BlockEnd::Closed,
                TokenKind::Comment(_) => {}
                // The `;` most likely closes the arm
                close @ (TokenKind::Semicolon | TokenKind::Loop) => {
                    self.error(ErrorKind::Unterminated(Construct::Bindings), position);
                    self.unread(Token::new(close, text, position));
                    return BlockEnd::Closed;
                }
                TokenKind::Case => {
                    self.error(ErrorKind::Unterminated(Construct::Bindings), position);
                    self.unread(Token::new(TokenKind::Case, text, position));
                    return BlockEnd::Interrupted;
                }
                stop @ (TokenKind::Colon | TokenKind::Type | TokenKind::Alias | TokenKind::Eof) => {
                    self.error(ErrorKind::Unterminated(Construct::Bindings), position);
                    self.unread(Token::new(stop, text, position));
                    return BlockEnd::Abandoned;
                }
                _ => self.error(
                    ErrorKind::UnexpectedToken {
                        found: quoted(&text),
                        context: "in pattern bindings".to_string(),
                    },
                    position,
                ),
            }
        }
    }

    /// `dip: body ;` with the `dip:` consumed
    fn parse_dip(&mut self, position: Position) -> (Option<Term>, BlockEnd) {
        if !self.enter(position) {
            return (None, self.skip_block(Construct::Dip));
        }
        let (body, end) = self.parse_body(BodyKind::Dip, &Construct::Dip);
        self.leave();
        (Some(Term::Dip(DipBlock { body, position })), end)
    }

    /// `[ literals ]` with the `[` consumed
    ///
    /// Nested lists are collected on an explicit stack rather than by
    /// recursion, but still count against the nesting limit. A list cut short
    /// keeps the elements read so far.
    fn parse_list(&mut self, position: Position) -> (LiteralNode, BlockEnd) {
        let limit = self.config.max_nesting_depth;
        let mut open: Vec<(Position, Vec<LiteralNode>)> = vec![(position, Vec::new())];

        let end = loop {
            let token = self.advance();
            if ends_list(&token.kind) {
                break self.cut_list(token);
            }
            let Token {
                kind,
                text,
                position: at,
            } = token;
            match kind {
                TokenKind::OpenBracket if self.depth + open.len() >= limit => {
                    let depth = self.depth + open.len();
                    debug!(depth, %at, "nesting limit reached, skipping list");
                    self.error(ErrorKind::NestingTooDeep(limit), at);
                    if let Some(end) = self.skip_list() {
                        break end;
                    }
                }
                TokenKind::OpenBracket => open.push((at, Vec::new())),
                TokenKind::CloseBracket => {
                    let (start, items) = open.pop().unwrap_or((position, Vec::new()));
                    let list = LiteralNode {
                        value: Literal::List(items),
                        position: start,
                    };
                    match open.last_mut() {
                        Some((_, parent)) => parent.push(list),
                        None => return (list, BlockEnd::Closed),
                    }
                }
                TokenKind::Comment(_) => {}
                other => match (literal_value(other), open.last_mut()) {
                    (Some(value), Some((_, items))) => items.push(LiteralNode {
                        value,
                        position: at,
                    }),
                    _ => self.error(
                        ErrorKind::UnexpectedToken {
                            found: quoted(&text),
                            context: "in list literal".to_string(),
                        },
                        at,
                    ),
                },
            }
        };

        (fold_lists(open, position), end)
    }

    /// End an open list at a token that belongs to an enclosing construct
    fn cut_list(&mut self, token: Token) -> BlockEnd {
        self.error(ErrorKind::Unterminated(Construct::List), token.position);
        let end = match token.kind {
            TokenKind::Case => BlockEnd::Interrupted,
            ref kind if kind.starts_top_level() => BlockEnd::Abandoned,
            _ => BlockEnd::Closed,
        };
        self.unread(token);
        end
    }

    /// Skip a list nested too deeply, through its matching `]`
    ///
    /// Returns how the enclosing construct ends when a terminator arrives
    /// first.
    fn skip_list(&mut self) -> Option<BlockEnd> {
        let mut open = 1usize;
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::OpenBracket => open += 1,
                TokenKind::CloseBracket => {
                    open -= 1;
                    if open == 0 {
                        return None;
                    }
                }
                _ if ends_list(&token.kind) => return Some(self.cut_list(token)),
                _ => {}
            }
        }
    }

    /// Open a nested block, refusing past the configured depth
    fn enter(&mut self, position: Position) -> bool {
        let limit = self.config.max_nesting_depth;
        if self.depth >= limit {
            debug!(depth = self.depth, %position, "nesting limit reached, skipping block");
            self.error(ErrorKind::NestingTooDeep(limit), position);
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Skip the arms of a `match:` that is nested too deeply
    fn skip_arms(&mut self) -> BlockEnd {
        loop {
            self.skip_comments();
            if !self.check(&TokenKind::Case) {
                return BlockEnd::Closed;
            }
            self.advance();
            if self.skip_block(Construct::CaseArm) == BlockEnd::Abandoned {
                return BlockEnd::Abandoned;
            }
        }
    }

    /// Skip to the `;` closing an already opened block by counting, without
    /// recursing into nested blocks
    fn skip_block(&mut self, construct: Construct) -> BlockEnd {
        let mut open = 1usize;
        let mut skipped = 0usize;
        let end = loop {
            let Token {
                kind,
                text,
                position,
            } = self.advance();
            match kind {
                TokenKind::Dip | TokenKind::Case => open += 1,
                TokenKind::Semicolon | TokenKind::Loop => {
                    open -= 1;
                    if open == 0 {
                        break BlockEnd::Closed;
                    }
                }
                stop if stop.starts_top_level() => {
                    self.error(ErrorKind::Unterminated(construct), position);
                    self.unread(Token::new(stop, text, position));
                    break BlockEnd::Abandoned;
                }
                _ => {}
            }
            skipped += 1;
        };
        trace!(skipped, "skipped nested block");
        end
    }

    /// `type: params Name : constructors ;` with `type:` consumed
    fn parse_type_def(&mut self, position: Position) -> Option<TypeDefinition> {
        let header = self.parse_header("type:", Construct::TypeDefinition);
        let type_name = label(&header.name);
        let constructors = match header.end {
            Some(_) => Vec::new(),
            None => self.parse_constructors(&type_name),
        };
        Some(TypeDefinition {
            name: header.name?,
            params: header.params,
            constructors,
            position,
        })
    }

    /// Constructor declarations up to `;`
    ///
    /// Each declaration is written postfix: field type words first, the
    /// constructor name last. `|` separates declarations.
    fn parse_constructors(&mut self, type_name: &str) -> Vec<TypeConstructor> {
        let mut constructors = Vec::new();
        let mut fields = Vec::new();
        let mut after_bar = false;

        loop {
            let Token {
                kind,
                text,
                position,
            } = self.advance();
            match kind {
                TokenKind::Word | TokenKind::Numbered { .. } => {
                    fields.push(NameNode::new(text, position))
                }
                TokenKind::Comment(_) => {}
                TokenKind::Bar => {
                    self.finish_constructor(&mut fields, type_name, position, &mut constructors);
                    after_bar = true;
                }
                TokenKind::Semicolon => {
                    // `type: Void : ;` declares no constructors at all
                    if after_bar || !fields.is_empty() {
                        self.finish_constructor(
                            &mut fields,
                            type_name,
                            position,
                            &mut constructors,
                        );
                    }
                    return constructors;
                }
                stop if stop.starts_top_level() => {
                    self.error(
                        ErrorKind::Unterminated(Construct::TypeDefinition(type_name.to_string())),
                        position,
                    );
                    self.unread(Token::new(stop, text, position));
                    if !fields.is_empty() {
                        self.finish_constructor(
                            &mut fields,
                            type_name,
                            position,
                            &mut constructors,
                        );
                    }
                    return constructors;
                }
                _ => self.error(
                    ErrorKind::UnexpectedToken {
                        found: quoted(&text),
                        context: format!("in type definition `{}`", type_name),
                    },
                    position,
                ),
            }
        }
    }

    fn finish_constructor(
        &mut self,
        fields: &mut Vec<NameNode>,
        type_name: &str,
        position: Position,
        constructors: &mut Vec<TypeConstructor>,
    ) {
        match fields.pop() {
            Some(name) => constructors.push(TypeConstructor {
                name,
                fields: std::mem::take(fields),
                type_name: type_name.to_string(),
            }),
            None => self.error(ErrorKind::EmptyConstructor(type_name.to_string()), position),
        }
    }

    /// `alias: params Name : type words ;` with `alias:` consumed
    fn parse_alias(&mut self, position: Position) -> Option<TypeAlias> {
        let header = self.parse_header("alias:", Construct::Alias);
        let alias_name = label(&header.name);
        let target = match header.end {
            Some(_) => Vec::new(),
            None => self.parse_alias_target(&alias_name),
        };
        Some(TypeAlias {
            name: header.name?,
            params: header.params,
            target,
            position,
        })
    }

    fn parse_alias_target(&mut self, alias_name: &str) -> Vec<NameNode> {
        let mut target = Vec::new();
        loop {
            let Token {
                kind,
                text,
                position,
            } = self.advance();
            match kind {
                TokenKind::Word | TokenKind::Numbered { .. } => {
                    target.push(NameNode::new(text, position))
                }
                TokenKind::Comment(_) => {}
                TokenKind::Semicolon => return target,
                stop if stop.starts_top_level() => {
                    self.error(
                        ErrorKind::Unterminated(Construct::Alias(alias_name.to_string())),
                        position,
                    );
                    self.unread(Token::new(stop, text, position));
                    return target;
                }
                _ => self.error(
                    ErrorKind::UnexpectedToken {
                        found: quoted(&text),
                        context: format!("in alias `{}`", alias_name),
                    },
                    position,
                ),
            }
        }
    }

    /// Words up to `:`; the last one is the name, the rest are parameters
    fn parse_header(&mut self, keyword: &str, construct: fn(String) -> Construct) -> Header {
        let mut words: Vec<NameNode> = Vec::new();
        loop {
            let token = self.advance();
            let end = match &token.kind {
                TokenKind::Word | TokenKind::Numbered { .. } => {
                    words.push(NameNode::new(token.text, token.position));
                    continue;
                }
                TokenKind::Comment(_) => continue,
                TokenKind::Colon => None,
                TokenKind::Semicolon if !words.is_empty() => {
                    let named = construct(label(&words.last().cloned()));
                    self.error(ErrorKind::MissingColon(named.to_string()), token.position);
                    Some(BlockEnd::Closed)
                }
                TokenKind::Semicolon => Some(BlockEnd::Closed),
                kind if kind.starts_top_level() => {
                    if !words.is_empty() {
                        let named = construct(label(&words.last().cloned()));
                        self.error(ErrorKind::Unterminated(named), token.position);
                    }
                    Some(BlockEnd::Abandoned)
                }
                _ => {
                    self.error(
                        ErrorKind::UnexpectedToken {
                            found: token.to_string(),
                            context: format!("in `{}` header", keyword),
                        },
                        token.position,
                    );
                    continue;
                }
            };

            let name = words.pop();
            if name.is_none() {
                self.error(
                    ErrorKind::ExpectedName {
                        after: keyword.to_string(),
                        found: token.to_string(),
                    },
                    token.position,
                );
            }
            if end == Some(BlockEnd::Abandoned) {
                self.unread(token);
            }
            return Header {
                params: words,
                name,
                end,
            };
        }
    }

    /// Consume a name, or record what was found instead and leave it
    fn expect_name(&mut self, after: &str) -> Option<NameNode> {
        if self.check(&TokenKind::Word) {
            let token = self.advance();
            return Some(NameNode::new(token.text, token.position));
        }
        let token = self.peek();
        let (found, position) = (token.to_string(), token.position);
        self.error(
            ErrorKind::ExpectedName {
                after: after.to_string(),
                found,
            },
            position,
        );
        None
    }

    /// How the current block ends if the next token cannot continue it
    fn pending_end(&mut self) -> Option<BlockEnd> {
        match self.peek().kind {
            TokenKind::Case => Some(BlockEnd::Interrupted),
            ref kind if kind.starts_top_level() => Some(BlockEnd::Abandoned),
            _ => None,
        }
    }

    fn skip_comments(&mut self) {
        while matches!(self.peek().kind, TokenKind::Comment(_)) {
            self.advance();
        }
    }

    fn peek(&mut self) -> &Token {
        let Parser {
            tokens,
            errors,
            lookahead,
            ..
        } = self;
        lookahead.get_or_insert_with(|| tokens.next_token(errors))
    }

    fn check(&mut self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn advance(&mut self) -> Token {
        match self.lookahead.take() {
            Some(token) => token,
            None => self.tokens.next_token(self.errors),
        }
    }

    /// Push back the token just taken by `advance`
    fn unread(&mut self, token: Token) {
        debug_assert!(self.lookahead.is_none());
        self.lookahead = Some(token);
    }

    fn error(&mut self, kind: ErrorKind, position: Position) {
        self.errors.error(kind, position);
    }
}

/// Name text for messages; empty when the name is missing
fn label(name: &Option<NameNode>) -> String {
    name.as_ref().map(|n| n.name.clone()).unwrap_or_default()
}

/// Tokens that close whatever encloses a list
fn ends_list(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Semicolon | TokenKind::Loop | TokenKind::Case)
        || kind.starts_top_level()
}

/// Close every list still open, innermost first, into the outermost one
fn fold_lists(mut open: Vec<(Position, Vec<LiteralNode>)>, position: Position) -> LiteralNode {
    let mut inner: Option<LiteralNode> = None;
    while let Some((start, mut items)) = open.pop() {
        items.extend(inner.take());
        inner = Some(LiteralNode {
            value: Literal::List(items),
            position: start,
        });
    }
    inner.unwrap_or(LiteralNode {
        value: Literal::List(Vec::new()),
        position,
    })
}

fn quoted(text: &str) -> String {
    format!("`{}`", text)
}

fn literal_value(kind: TokenKind) -> Option<Literal> {
    let value = match kind {
        TokenKind::Integer(n) => Literal::Integer(n),
        TokenKind::Nat(n) => Literal::Nat(n),
        TokenKind::Float(x) => Literal::Float(x),
        TokenKind::Rational {
            numerator,
            denominator,
        } => Literal::Rational {
            numerator,
            denominator,
        },
        TokenKind::Bool(b) => Literal::Bool(b),
        TokenKind::Str(s) => Literal::Str(s),
        _ => return None,
    };
    Some(value)
}
