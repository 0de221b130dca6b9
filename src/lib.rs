//! lang_ll is a grammar driven runtime to tokenize and parse languages or structured text
//! into a parse tree with an LL(k) recursive descent strategy.
//!
//! # Overview
//! A parser produced by a generator tool is usually split into two parts.
//! The generated part is a thin description of the language grammar,
//! while the heavy lifting is performed by a runtime library which is shared by every generated parser.
//! This crate is such a runtime.
//! A client (a generator back end, or a hand written program) declares the token patterns and
//! production rules of its language as a [Grammar] object.
//! The grammar is then validated and analyzed once, and afterwards any number of [Parser] instances
//! can consume input streams and produce [ParseNode] trees from it.
//!
//! # Design
//!
//! The runtime consists of four cooperating pieces.
//! A regular expression engine ([regexp]) compiles the token patterns into instruction programs and
//! performs longest prefix matching with greedy, reluctant and possessive quantifier modes.
//! A [Tokenizer] slides a buffered window over the input reader and repeatedly selects the longest
//! matching pattern, breaking ties by pattern insertion order.
//! The grammar analysis computes first and follow sets as bounded token sequences and derives a
//! lookahead table which makes every parsing decision deterministic, or reports the ambiguity
//! while the grammar is being prepared.
//! Finally the recursive descent driver in [Parser] consumes the token stream, builds the parse
//! tree bottom up and reports the tree construction events to an [IAnalyzer] implementation so
//! that callers can fold or rewrite the tree while it is being built.
//!
//! # Example
//!
//! The following program implements a small summation language.
//! ```
//! use lang_ll::{Grammar, Parser, ProductionPattern, ProductionPatternAlternative, TokenPattern};
//!
//! const NUMBER: usize = 1;
//! const PLUS: usize = 2;
//! const SPACE: usize = 3;
//! const SUM: usize = 10;
//! const SUM_TAIL: usize = 11;
//!
//! let mut grammar = Grammar::new();
//! grammar
//!     .add_token_pattern(TokenPattern::regexp(NUMBER, "NUMBER", "[0-9]+"))
//!     .unwrap();
//! grammar
//!     .add_token_pattern(TokenPattern::literal(PLUS, "PLUS", "+"))
//!     .unwrap();
//! let mut space = TokenPattern::regexp(SPACE, "SPACE", "[ \t\n\r]+");
//! space.set_ignore();
//! grammar.add_token_pattern(space).unwrap();
//!
//! // sum : NUMBER sum_tail* ;
//! let mut sum = ProductionPattern::new(SUM, "sum");
//! let mut alternative = ProductionPatternAlternative::new();
//! alternative.add_token(NUMBER, 1, Some(1));
//! alternative.add_production(SUM_TAIL, 0, None);
//! sum.add_alternative(alternative).unwrap();
//! grammar.add_production_pattern(sum).unwrap();
//!
//! // sum_tail : PLUS NUMBER ;
//! let mut sum_tail = ProductionPattern::new(SUM_TAIL, "sum_tail");
//! let mut alternative = ProductionPatternAlternative::new();
//! alternative.add_token(PLUS, 1, Some(1));
//! alternative.add_token(NUMBER, 1, Some(1));
//! sum_tail.add_alternative(alternative).unwrap();
//! grammar.add_production_pattern(sum_tail).unwrap();
//!
//! grammar.prepare().unwrap();
//!
//! let mut parser = Parser::new(&grammar, "12 + 7 + 5".as_bytes()).unwrap();
//! let tree = parser.parse().unwrap();
//! assert!(parser.errors().is_empty());
//! assert_eq!(tree.name(), Some("sum"));
//! assert_eq!(tree.children().len(), 3);
//! ```
//!
//! # License
//! [lang_ll](crate) is provided under the MIT license.

mod analysis;
mod error;
pub mod examples;
mod field_tree;
mod grammar;
mod lookahead;
mod parse_tree;
mod parsing;
mod production;
pub mod regexp;
mod token_list;
mod token_pattern;
mod tokenization;
mod util;

use crate::regexp::RegExp;
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::io::Read;

pub use util::{Log, Position};

/// Token id of the end of input sentinel emitted by the [Tokenizer].
///
/// Every pattern added to a grammar or tokenizer must use a non zero id.
pub const EOF_TOKEN: usize = 0;

/// Upper bound for the character length of a single token image.
///
/// An image which would grow past this bound raises
/// [TokenTooLarge](ParseErrorKind::TokenTooLarge) instead of buffering the whole input.
pub const MAX_TOKEN_LENGTH: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The matching strategy of a [TokenPattern].
pub enum PatternKind {
    /// The pattern source is matched verbatim, or case folded in a case insensitive tokenizer.
    Literal,
    /// The pattern source is compiled by the [regexp] engine.
    Regexp,
}

#[derive(Debug, Clone)]
/// A declaration of one token of the language, matched by a literal string or by a regular expression.
pub struct TokenPattern {
    id: usize,
    name: String,
    kind: PatternKind,
    source: String,
    ignore: bool,
    error: bool,
    error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A piece of input matched by a [TokenPattern], carrying its image and 1-based position.
pub struct Token {
    pub id: usize,
    pub image: String,
    pub line: usize,
    pub column: usize,
    index: Option<usize>,
    previous: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
/// The doubly linked bookkeeping of every emitted token, kept when token list mode is enabled.
///
/// Tokens are stored in a vector and linked through indices, so that `previous` and `next`
/// navigation stays O(1) without cyclic ownership.
pub struct TokenList {
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether a [ProductionPatternElement] refers to a token or to another production.
pub enum ElementKind {
    Token,
    Production,
}

#[derive(Debug)]
/// One symbol of an alternative together with its repetition bounds.
///
/// `max` of [None] denotes an unbounded repetition.
pub struct ProductionPatternElement {
    kind: ElementKind,
    id: usize,
    min: usize,
    max: Option<usize>,
    repeat_lookahead: OnceCell<LookaheadSet>,
}

#[derive(Debug, Default)]
/// An ordered sequence of elements forming one right hand side of a production.
pub struct ProductionPatternAlternative {
    elements: Vec<ProductionPatternElement>,
    lookahead: OnceCell<LookaheadSet>,
}

#[derive(Debug)]
/// A named production rule consisting of one or more alternatives.
///
/// The recursion and emptiness flags are computed while the grammar is prepared
/// and are frozen afterwards.
pub struct ProductionPattern {
    id: usize,
    name: String,
    alternatives: Vec<ProductionPatternAlternative>,
    left_recursive: OnceCell<bool>,
    right_recursive: OnceCell<bool>,
    matching_empty: OnceCell<bool>,
    default_alternative: OnceCell<Option<usize>>,
    follow: OnceCell<LookaheadSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// A set of token id sequences of bounded length, predicting one parsing decision.
pub struct LookaheadSet {
    sequences: BTreeSet<Vec<usize>>,
}

#[derive(Debug, Default)]
/// The declarative model of a language: token patterns plus production patterns.
///
/// A grammar is mutable while patterns are being added and becomes frozen once
/// [prepare](Grammar::prepare) has succeeded.
/// A prepared grammar holds the computed lookahead tables and may be shared between
/// threads, each thread driving its own [Parser].
pub struct Grammar {
    case_insensitive: bool,
    token_patterns: Vec<TokenPattern>,
    production_patterns: Vec<ProductionPattern>,
    token_ids: HashMap<usize, usize>,
    production_ids: HashMap<usize, usize>,
    lookahead_depth: OnceCell<usize>,
    prepared: OnceCell<()>,
}

#[derive(Debug)]
/// An error detected while a [Grammar] is being prepared.
pub enum GrammarError {
    /// A production can derive itself without consuming a token.
    LeftRecursion { production: String },
    /// A production has no alternative at all.
    EmptyProduction { production: String },
    /// Two alternatives of the same production have identical element sequences.
    DuplicateAlternative { production: String, alternative: usize },
    /// Two alternatives of the same production share a lookahead prefix at the maximum depth.
    AmbiguousAlternatives {
        production: String,
        first: usize,
        second: usize,
        prefix: Vec<String>,
    },
    /// Repeating and leaving an element cannot be told apart at the maximum lookahead depth.
    AmbiguousRepetition {
        production: String,
        alternative: usize,
        element: usize,
        prefix: Vec<String>,
    },
    /// The repetition bounds of an element are contradictory.
    InvalidRepetition {
        production: String,
        min: usize,
        max: usize,
    },
    /// An element refers to a token id which is not part of the grammar.
    UnknownTokenReference { production: String, token_id: usize },
    /// An element refers to a production id which is not part of the grammar.
    UnknownProductionReference {
        production: String,
        production_id: usize,
    },
    /// A token pattern failed validation, e.g. its regular expression does not compile.
    InvalidTokenPattern { pattern: String, message: String },
    /// The grammar holds no production to start parsing from.
    MissingStartProduction,
}

#[derive(Debug)]
/// The reason of a [ParseError].
pub enum ParseErrorKind {
    /// No pattern matched any prefix of the remaining input.
    UnexpectedChar { character: char },
    /// The upcoming token is not predicted by any parsing decision.
    UnexpectedToken { found: String, expected: Vec<String> },
    /// The input ended while one of the expected tokens was still required.
    UnexpectedEof { expected: Vec<String> },
    /// An error flagged pattern matched; the tokenizer has advanced past the image.
    InvalidToken {
        image: String,
        message: Option<String>,
    },
    /// A single token image grew past [MAX_TOKEN_LENGTH].
    TokenTooLarge { limit: usize },
    /// A tree analyzer rejected a node.
    Analysis { message: String },
    /// The underlying reader failed; the source error is kept untranslated.
    Io(std::io::Error),
}

#[derive(Debug)]
/// An error raised while input is being tokenized or parsed, located by line and column.
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug)]
struct FieldTree<T> {
    token: Option<T>,
    children: Vec<(char, FieldTree<T>)>,
}

enum PatternMatcher {
    Literal(Vec<char>),
    Regexp(RegExp),
}

struct CompiledTokenPattern {
    id: usize,
    name: String,
    ignore: bool,
    error: bool,
    error_message: Option<String>,
    matcher: PatternMatcher,
}

/// The lexical analyzer: a pattern table sliding over a buffered input reader.
///
/// At every position the tokenizer picks the longest matching pattern,
/// breaking ties in favor of the pattern that was added first.
/// Ignored images are skipped, error flagged images are reported after the
/// stream has advanced past them, and the end of input is reported as the
/// [EOF_TOKEN] sentinel on every further call.
pub struct Tokenizer<R> {
    patterns: Vec<CompiledTokenPattern>,
    literal_tree: FieldTree<usize>,
    case_insensitive: bool,
    source: util::SourceBuffer<R>,
    use_token_list: bool,
    token_list: TokenList,
    started: bool,
    log: OnceCell<Log<&'static str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A node of the parse tree: either a consumed [Token] or a completed production.
pub enum ParseNode {
    Token(Token),
    Production(ProductionNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An inner parse tree node carrying the production id and name and the ordered children.
pub struct ProductionNode {
    pub id: usize,
    pub name: String,
    pub children: Vec<ParseNode>,
}

/// An observer of the parse tree construction.
///
/// The driver calls [enter](IAnalyzer::enter) when a node is created,
/// [child](IAnalyzer::child) when a completed child is attached to its parent and
/// [exit](IAnalyzer::exit) when a node is finalized.
/// Every method has an identity default, so an implementation overrides only
/// the events it cares about.
/// Returning an [Err] surfaces as an [Analysis](ParseErrorKind::Analysis) parse error.
pub trait IAnalyzer {
    /// Called when a node has been created, before any child is attached.
    fn enter(&mut self, _node: &ParseNode) -> Result<(), String> {
        Ok(())
    }

    /// Called when a node is finalized.
    /// The returned node replaces the original one; [None] drops the node.
    fn exit(&mut self, node: ParseNode) -> Result<Option<ParseNode>, String> {
        Ok(Some(node))
    }

    /// Called to attach a completed child to its parent.
    fn child(&mut self, parent: &mut ProductionNode, child: ParseNode) -> Result<(), String> {
        parent.add_child(child);
        Ok(())
    }
}

/// The recursive descent driver.
///
/// A parser borrows a prepared [Grammar], owns the [Tokenizer] for one input stream
/// and keeps a peek buffer of up to `k` upcoming tokens, where `k` is the lookahead
/// depth chosen while the grammar was prepared.
/// Recoverable syntax errors are accumulated and parsing continues after skipping
/// to a follow token, so a single [parse](Parser::parse) call can report several errors.
pub struct Parser<'grammar, R> {
    grammar: &'grammar Grammar,
    tokenizer: Tokenizer<R>,
    peek_buffer: VecDeque<Token>,
    consumed: usize,
    errors: Vec<ParseError>,
    analyzer: Option<Box<dyn IAnalyzer>>,
    log: OnceCell<Log<&'static str>>,
}

impl<'grammar, R: Read> Parser<'grammar, R> {
    /// Create a parser for the given grammar and input reader.
    ///
    /// The grammar is prepared first when this has not happened yet;
    /// preparation failures are returned as the accumulated error list.
    pub fn new(grammar: &'grammar Grammar, reader: R) -> Result<Self, Vec<GrammarError>> {
        grammar.prepare()?;
        if grammar.start_production().is_none() {
            return Err(vec![GrammarError::MissingStartProduction]);
        }
        Ok(Self {
            grammar,
            tokenizer: Tokenizer::from_grammar(grammar, reader),
            peek_buffer: VecDeque::new(),
            consumed: 0,
            errors: Vec::new(),
            analyzer: None,
            log: OnceCell::new(),
        })
    }

    /// Install a tree analyzer which observes and rewrites the parse tree during construction.
    pub fn set_analyzer(&mut self, analyzer: Box<dyn IAnalyzer>) {
        self.analyzer = Some(analyzer);
    }

    /// Syntax errors which were recovered from during the last [parse](Parser::parse) call.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Set a log label to debug the parsing decisions based on the level of [Log].
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }
}
