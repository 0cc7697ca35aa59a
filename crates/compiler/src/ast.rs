//! Abstract Syntax Tree for Marn
//!
//! The tree is strictly owned: a definition owns its body, blocks own their
//! nested terms, a type owns its constructors. Every symbol reference is a
//! [`NameNode`] holding only text and position; binding names to definitions
//! is left to later stages.
//!
//! The [`Ast`] aggregate keys definitions by name and remembers the source
//! order of top-level items in `sequential`.

use crate::diagnostics::{Diagnostics, ErrorKind};
use crate::token::{NumberedKeyword, Position};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Unresolved reference to a word, type or constructor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameNode {
    pub name: String,
    pub position: Position,
}

impl NameNode {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        NameNode {
            name: name.into(),
            position,
        }
    }
}

impl fmt::Display for NameNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Integer(i64),
    /// Written with an explicit `+`
    Nat(u64),
    Float(f64),
    Rational { numerator: i64, denominator: u64 },
    Bool(bool),
    Str(String),
    /// `[ literals ]`, possibly nested
    List(Vec<LiteralNode>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Nat(n) => write!(f, "+{}", n),
            // Display never uses exponent form; the `.0` keeps it a decimal
            Literal::Float(x) => {
                let text = x.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
            Literal::Rational {
                numerator,
                denominator,
            } => write!(f, "{}/{}", numerator, denominator),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Str(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    match ch {
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        '\u{8}' => f.write_str("\\b")?,
                        '\u{7}' => f.write_str("\\a")?,
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
            Literal::List(items) => {
                f.write_str("[")?;
                for item in items {
                    write!(f, " {}", item.value)?;
                }
                f.write_str(" ]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralNode {
    pub value: Literal,
    pub position: Position,
}

/// A `\` comment, top-level or inside a body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub text: String,
    pub position: Position,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            f.write_str("\\")
        } else {
            write!(f, "\\ {}", self.text)
        }
    }
}

/// Stack effect declaration: `( inputs -- outputs )`
///
/// Inputs are slot names. Outputs are kept as raw terms (words or literals)
/// since they may be arbitrary expressions such as `f(n)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackEffect {
    pub inputs: Vec<NameNode>,
    pub outputs: Vec<Term>,
    /// Position of the opening `(`
    pub position: Position,
}

impl fmt::Display for StackEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for input in &self.inputs {
            write!(f, " {}", input)?;
        }
        f.write_str(" --")?;
        for output in &self.outputs {
            write!(f, " {}", output)?;
        }
        f.write_str(" )")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Term {
    /// Call of a word, primitive or constructor, resolved later
    WordCall(NameNode),
    Literal(LiteralNode),
    Match(MatchBlock),
    Dip(DipBlock),
    /// `2Tuple`, `3pack`, ...
    Numbered(NumberedWord),
    Comment(Comment),
}

impl Term {
    pub fn position(&self) -> Position {
        match self {
            Term::WordCall(name) => name.position,
            Term::Literal(lit) => lit.position,
            Term::Match(block) => block.position,
            Term::Dip(block) => block.position,
            Term::Numbered(word) => word.position,
            Term::Comment(comment) => comment.position,
        }
    }

    /// Name of the called word, if this is a word call
    pub fn word_name(&self) -> Option<&str> {
        match self {
            Term::WordCall(name) => Some(&name.name),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::WordCall(name) => write!(f, "{}", name),
            Term::Literal(lit) => write!(f, "{}", lit.value),
            Term::Match(block) => write!(f, "{}", block),
            Term::Dip(block) => write!(f, "{}", block),
            Term::Numbered(word) => write!(f, "{}", word),
            Term::Comment(comment) => write!(f, "{}", comment),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberedWord {
    pub keyword: NumberedKeyword,
    pub count: u64,
    pub position: Position,
}

impl fmt::Display for NumberedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.keyword)
    }
}

/// Write a body as space-separated terms, breaking the line after comments
fn write_body(f: &mut fmt::Formatter<'_>, body: &[Term]) -> fmt::Result {
    for term in body {
        write!(f, " {}", term)?;
        if matches!(term, Term::Comment(_)) {
            writeln!(f)?;
        }
    }
    Ok(())
}

/// `match:` block; the scrutinee is the top of the stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBlock {
    pub arms: Vec<CaseArm>,
    pub position: Position,
}

impl fmt::Display for MatchBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("match:")?;
        for arm in &self.arms {
            write!(f, " {}", arm)?;
        }
        Ok(())
    }
}

/// `case: Constructor ( bindings ) body ;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseArm {
    pub constructor: NameNode,
    /// Bound variable names in pattern order
    pub bindings: Vec<NameNode>,
    pub body: Vec<Term>,
    /// Closed by `loop;`: the enclosing match runs again after this arm
    pub loops: bool,
    pub position: Position,
}

impl CaseArm {
    /// Pattern arity
    pub fn arity(&self) -> usize {
        self.bindings.len()
    }
}

impl fmt::Display for CaseArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case: {}", self.constructor)?;
        if !self.bindings.is_empty() {
            f.write_str(" (")?;
            for binding in &self.bindings {
                write!(f, " {}", binding)?;
            }
            f.write_str(" )")?;
        }
        write_body(f, &self.body)?;
        f.write_str(if self.loops { " loop;" } else { " ;" })
    }
}

/// `dip: body ;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DipBlock {
    pub body: Vec<Term>,
    pub position: Position,
}

impl fmt::Display for DipBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dip:")?;
        write_body(f, &self.body)?;
        f.write_str(" ;")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordDefinition {
    pub name: NameNode,
    /// Optional stack effect declaration
    /// Example: ( n -- f(n) )
    pub effect: Option<StackEffect>,
    pub body: Vec<Term>,
    /// Position of the defining `:`
    pub position: Position,
}

impl fmt::Display for WordDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ": {}", self.name)?;
        if let Some(effect) = &self.effect {
            write!(f, " {}", effect)?;
        }
        write_body(f, &self.body)?;
        f.write_str(" ;")
    }
}

/// A constructor declared by a `type:` definition
///
/// Written postfix in source: field types first, constructor name last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeConstructor {
    pub name: NameNode,
    /// Field type words in declaration order; empty for nullary constructors
    pub fields: Vec<NameNode>,
    /// Name of the owning type
    pub type_name: String,
}

impl fmt::Display for TypeConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            write!(f, "{} ", field)?;
        }
        write!(f, "{}", self.name)
    }
}

/// `type: params Name : constructors ;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub name: NameNode,
    pub params: Vec<NameNode>,
    pub constructors: Vec<TypeConstructor>,
    pub position: Position,
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("type:")?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        write!(f, " {} :", self.name)?;
        for (i, constructor) in self.constructors.iter().enumerate() {
            if i > 0 {
                f.write_str(" |")?;
            }
            write!(f, " {}", constructor)?;
        }
        f.write_str(" ;")
    }
}

/// `alias: params Name : type words ;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAlias {
    pub name: NameNode,
    pub params: Vec<NameNode>,
    /// The aliased type expression, postfix
    pub target: Vec<NameNode>,
    pub position: Position,
}

impl fmt::Display for TypeAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("alias:")?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        write!(f, " {} :", self.name)?;
        for word in &self.target {
            write!(f, " {}", word)?;
        }
        f.write_str(" ;")
    }
}

/// Entry of the source-ordered item list
///
/// Definitions are referred to by name; their nodes live in the aggregate's
/// mappings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    Word(String),
    Type(String),
    Alias(String),
    Comment(Comment),
}

/// A top-level item resolved against the aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Definition<'a> {
    Word(&'a WordDefinition),
    Type(&'a TypeDefinition),
    Alias(&'a TypeAlias),
    Comment(&'a Comment),
}

impl fmt::Display for Definition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Word(word) => write!(f, "{}", word),
            Definition::Type(def) => write!(f, "{}", def),
            Definition::Alias(alias) => write!(f, "{}", alias),
            Definition::Comment(comment) => write!(f, "{}", comment),
        }
    }
}

/// Something callable from a body: a word or a constructor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Callable<'a> {
    Word(&'a WordDefinition),
    Constructor(&'a TypeConstructor),
}

impl Callable<'_> {
    pub fn position(&self) -> Position {
        match self {
            Callable::Word(word) => word.name.position,
            Callable::Constructor(constructor) => constructor.name.position,
        }
    }
}

/// Something usable in a type expression: a type or an alias
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeLike<'a> {
    Type(&'a TypeDefinition),
    Alias(&'a TypeAlias),
}

impl TypeLike<'_> {
    pub fn position(&self) -> Position {
        match self {
            TypeLike::Type(def) => def.name.position,
            TypeLike::Alias(alias) => alias.name.position,
        }
    }
}

/// Where a constructor lives inside `types`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorRef {
    pub type_name: String,
    pub index: usize,
}

/// The parse result: definitions keyed by name plus source order
///
/// Words and constructors share one namespace, types and aliases another.
/// Only the first definition of a name is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ast {
    words: BTreeMap<String, WordDefinition>,
    types: BTreeMap<String, TypeDefinition>,
    aliases: BTreeMap<String, TypeAlias>,
    constructors: BTreeMap<String, ConstructorRef>,
    sequential: Vec<Item>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> &BTreeMap<String, WordDefinition> {
        &self.words
    }

    pub fn types(&self) -> &BTreeMap<String, TypeDefinition> {
        &self.types
    }

    pub fn aliases(&self) -> &BTreeMap<String, TypeAlias> {
        &self.aliases
    }

    pub fn constructors(&self) -> &BTreeMap<String, ConstructorRef> {
        &self.constructors
    }

    /// Top-level definitions and comments in source order
    pub fn sequential(&self) -> &[Item] {
        &self.sequential
    }

    pub fn word(&self, name: &str) -> Option<&WordDefinition> {
        self.words.get(name)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn alias(&self, name: &str) -> Option<&TypeAlias> {
        self.aliases.get(name)
    }

    pub fn constructor(&self, name: &str) -> Option<&TypeConstructor> {
        let location = self.constructors.get(name)?;
        self.types
            .get(&location.type_name)?
            .constructors
            .get(location.index)
    }

    /// Look up a word, falling back to constructors
    pub fn callable(&self, name: &str) -> Option<Callable<'_>> {
        self.word(name)
            .map(Callable::Word)
            .or_else(|| self.constructor(name).map(Callable::Constructor))
    }

    /// Look up a type, falling back to aliases
    pub fn type_like(&self, name: &str) -> Option<TypeLike<'_>> {
        self.type_def(name)
            .map(TypeLike::Type)
            .or_else(|| self.alias(name).map(TypeLike::Alias))
    }

    /// Resolve `sequential` against the mappings
    pub fn items(&self) -> impl Iterator<Item = Definition<'_>> + '_ {
        self.sequential.iter().filter_map(|item| match item {
            Item::Word(name) => self.word(name).map(Definition::Word),
            Item::Type(name) => self.type_def(name).map(Definition::Type),
            Item::Alias(name) => self.alias(name).map(Definition::Alias),
            Item::Comment(comment) => Some(Definition::Comment(comment)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sequential.is_empty()
    }

    pub(crate) fn push_comment(&mut self, comment: Comment) {
        self.sequential.push(Item::Comment(comment));
    }

    /// Register a word. A clash with a word or constructor is recorded and
    /// the new definition dropped.
    pub(crate) fn add_word(&mut self, word: WordDefinition, errors: &mut Diagnostics) -> bool {
        if let Some(original) = self.callable(&word.name.name) {
            duplicate(&word.name, original.position(), errors);
            return false;
        }
        self.sequential.push(Item::Word(word.name.name.clone()));
        self.words.insert(word.name.name.clone(), word);
        true
    }

    /// Register a type and its constructors. A constructor that clashes is
    /// reported and left unregistered; the type itself is still kept.
    pub(crate) fn add_type(&mut self, def: TypeDefinition, errors: &mut Diagnostics) -> bool {
        if let Some(original) = self.type_like(&def.name.name) {
            duplicate(&def.name, original.position(), errors);
            return false;
        }

        let type_name = def.name.name.clone();
        for (index, constructor) in def.constructors.iter().enumerate() {
            let clash = self
                .callable(&constructor.name.name)
                .map(|c| c.position())
                .or_else(|| {
                    // Two constructors of this same type
                    def.constructors[..index]
                        .iter()
                        .find(|earlier| earlier.name.name == constructor.name.name)
                        .map(|earlier| earlier.name.position)
                });
            match clash {
                Some(original) => duplicate(&constructor.name, original, errors),
                None => {
                    self.constructors.insert(
                        constructor.name.name.clone(),
                        ConstructorRef {
                            type_name: type_name.clone(),
                            index,
                        },
                    );
                }
            }
        }

        self.sequential.push(Item::Type(type_name.clone()));
        self.types.insert(type_name, def);
        true
    }

    pub(crate) fn add_alias(&mut self, alias: TypeAlias, errors: &mut Diagnostics) -> bool {
        if let Some(original) = self.type_like(&alias.name.name) {
            duplicate(&alias.name, original.position(), errors);
            return false;
        }
        self.sequential.push(Item::Alias(alias.name.name.clone()));
        self.aliases.insert(alias.name.name.clone(), alias);
        true
    }
}

fn duplicate(name: &NameNode, original: Position, errors: &mut Diagnostics) {
    debug!(name = %name.name, at = %name.position, %original, "duplicate definition dropped");
    errors.error(
        ErrorKind::Duplicate {
            name: name.name.clone(),
            original,
        },
        name.position,
    );
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.items() {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(offset: usize) -> Position {
        Position::new(0, offset, offset)
    }

    fn word(name: &str, at: usize, body: Vec<Term>) -> WordDefinition {
        WordDefinition {
            name: NameNode::new(name, pos(at + 2)),
            effect: None,
            body,
            position: pos(at),
        }
    }

    fn nat_type(at: usize) -> TypeDefinition {
        let ctor = |name: &str, fields: Vec<NameNode>, offset| TypeConstructor {
            name: NameNode::new(name, pos(offset)),
            fields,
            type_name: "Nat".to_string(),
        };
        TypeDefinition {
            name: NameNode::new("Nat", pos(at + 6)),
            params: vec![],
            constructors: vec![
                ctor("Succ", vec![NameNode::new("Nat", pos(at + 12))], at + 16),
                ctor("Zero", vec![], at + 23),
            ],
            position: pos(at),
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let mut ast = Ast::new();
        let mut errors = Diagnostics::new();
        let call = Term::WordCall(NameNode::new("dup", pos(5)));

        assert!(ast.add_word(word("f", 0, vec![call.clone()]), &mut errors));
        assert!(!ast.add_word(word("f", 10, vec![]), &mut errors));

        assert_eq!(ast.word("f").map(|w| w.body.len()), Some(1));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.as_slice()[0].kind,
            ErrorKind::Duplicate {
                name: "f".to_string(),
                original: pos(2)
            }
        );
        assert_eq!(ast.sequential(), [Item::Word("f".to_string())]);
    }

    #[test]
    fn test_constructors_share_word_namespace() {
        let mut ast = Ast::new();
        let mut errors = Diagnostics::new();

        assert!(ast.add_type(nat_type(0), &mut errors));
        assert!(errors.is_empty());
        assert_eq!(ast.constructor("Zero").map(|c| c.type_name.as_str()), Some("Nat"));
        assert!(matches!(ast.callable("Succ"), Some(Callable::Constructor(_))));

        // A word named like a constructor is a duplicate
        assert!(!ast.add_word(word("Zero", 40, vec![]), &mut errors));
        assert_eq!(errors.len(), 1);

        // A type clashing with an alias is a duplicate too
        let alias = TypeAlias {
            name: NameNode::new("Count", pos(60)),
            params: vec![],
            target: vec![NameNode::new("Nat", pos(68))],
            position: pos(53),
        };
        assert!(ast.add_alias(alias, &mut errors));
        let mut clash = nat_type(80);
        clash.name = NameNode::new("Count", pos(86));
        clash.constructors.clear();
        assert!(!ast.add_type(clash, &mut errors));
        assert_eq!(errors.len(), 2);
        assert!(matches!(ast.type_like("Count"), Some(TypeLike::Alias(_))));
    }

    #[test]
    fn test_clashing_constructor_is_not_registered() {
        let mut ast = Ast::new();
        let mut errors = Diagnostics::new();
        ast.add_word(word("Zero", 0, vec![]), &mut errors);

        assert!(ast.add_type(nat_type(20), &mut errors));
        assert_eq!(errors.len(), 1);
        assert!(matches!(ast.callable("Zero"), Some(Callable::Word(_))));
        assert!(ast.constructor("Succ").is_some());
        assert_eq!(ast.type_def("Nat").map(|t| t.constructors.len()), Some(2));
    }

    #[test]
    fn test_items_follow_source_order() {
        let mut ast = Ast::new();
        let mut errors = Diagnostics::new();
        ast.push_comment(Comment {
            text: "numbers".to_string(),
            position: pos(0),
        });
        ast.add_type(nat_type(10), &mut errors);
        ast.add_word(word("one", 50, vec![]), &mut errors);

        let rendered: Vec<String> = ast.items().map(|d| d.to_string()).collect();
        assert_eq!(
            rendered,
            ["\\ numbers", "type: Nat : Nat Succ | Zero ;", ": one ;"]
        );
    }

    #[test]
    fn test_render_nested_terms() {
        let name = |n: &str| NameNode::new(n, pos(0));
        let arm = CaseArm {
            constructor: name("Cons"),
            bindings: vec![name("head"), name("tail")],
            body: vec![Term::Dip(DipBlock {
                body: vec![Term::WordCall(name("swap"))],
                position: pos(0),
            })],
            loops: false,
            position: pos(0),
        };
        let def = WordDefinition {
            name: name("walk"),
            effect: Some(StackEffect {
                inputs: vec![name("xs")],
                outputs: vec![],
                position: pos(0),
            }),
            body: vec![
                Term::Literal(LiteralNode {
                    value: Literal::Str("a\"b\n".to_string()),
                    position: pos(0),
                }),
                Term::Literal(LiteralNode {
                    value: Literal::Float(2.0),
                    position: pos(0),
                }),
                Term::Match(MatchBlock {
                    arms: vec![arm],
                    position: pos(0),
                }),
            ],
            position: pos(0),
        };
        assert_eq!(
            def.to_string(),
            r#": walk ( xs -- ) "a\"b\n" 2.0 match: case: Cons ( head tail ) dip: swap ; ; ;"#
        );
    }

    fn literal(value: Literal) -> LiteralNode {
        LiteralNode {
            value,
            position: pos(0),
        }
    }

    #[test]
    fn test_render_floats_without_exponent() {
        let rendered: Vec<String> = [1e20, 2.5e-7, 3.0, -0.5]
            .into_iter()
            .map(|x| Literal::Float(x).to_string())
            .collect();
        assert_eq!(
            rendered,
            ["100000000000000000000.0", "0.00000025", "3.0", "-0.5"]
        );
        for text in &rendered {
            let mut errors = crate::Diagnostics::new();
            let token = crate::tokenize(text.chars(), &mut errors).next();
            assert!(matches!(
                token.map(|t| t.kind),
                Some(crate::TokenKind::Float(_))
            ));
            assert!(errors.is_empty());
        }
    }

    #[test]
    fn test_render_lists_naturals_and_loops() {
        let list = Literal::List(vec![
            literal(Literal::Nat(1)),
            literal(Literal::List(vec![literal(Literal::Bool(true))])),
            literal(Literal::List(Vec::new())),
        ]);
        assert_eq!(list.to_string(), "[ +1 [ true ] [ ] ]");

        let arm = CaseArm {
            constructor: NameNode::new("Cons", pos(0)),
            bindings: Vec::new(),
            body: vec![Term::Numbered(NumberedWord {
                keyword: NumberedKeyword::Unpack,
                count: 2,
                position: pos(0),
            })],
            loops: true,
            position: pos(0),
        };
        assert_eq!(arm.to_string(), "case: Cons 2unpack loop;");
    }
}
