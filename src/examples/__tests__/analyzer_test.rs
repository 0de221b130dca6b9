use crate::examples::arithmetic::{
    arithmetic_grammar, CLOSE, EXPRESSION, FACTOR, OPEN, TERM,
};
use crate::{IAnalyzer, ParseErrorKind, ParseNode, Parser, ProductionNode};
use std::cell::RefCell;
use std::rc::Rc;

/// Folds the arithmetic tree into a single number token while it is being built.
struct Calculator;

impl Calculator {
    fn fold(children: &[ParseNode]) -> Result<ParseNode, String> {
        let mut value = Self::number(&children[0])?;
        for tail in &children[1..] {
            let operator = tail.children()[0]
                .image()
                .ok_or_else(|| "operator token expected".to_string())?;
            let operand = Self::number(&tail.children()[1])?;
            value = match operator {
                "+" => value + operand,
                "-" => value - operand,
                "*" => value * operand,
                "/" => value / operand,
                operator => return Err(format!("unsupported operator '{}'", operator)),
            };
        }
        let mut token = match &children[0] {
            ParseNode::Token(token) => token.clone(),
            node => return Err(format!("number token expected, found {:?}", node.name())),
        };
        token.image = value.to_string();
        Ok(ParseNode::Token(token))
    }

    fn number(node: &ParseNode) -> Result<i64, String> {
        let image = node.image().ok_or_else(|| "number expected".to_string())?;
        image
            .parse()
            .map_err(|_| format!("'{}' is not a number", image))
    }
}

impl IAnalyzer for Calculator {
    fn exit(&mut self, node: ParseNode) -> Result<Option<ParseNode>, String> {
        let production = match node {
            ParseNode::Production(production) => production,
            token => return Ok(Some(token)),
        };
        match production.id {
            // factor : NUMBER | OPEN expression CLOSE ; both reduce to one token.
            FACTOR => match production.children.len() {
                1 => Ok(Some(production.children[0].clone())),
                3 => Ok(Some(production.children[1].clone())),
                _ => Err("factor should hold one value".to_string()),
            },
            EXPRESSION | TERM => Self::fold(&production.children).map(Some),
            _ => Ok(Some(ParseNode::Production(production))),
        }
    }
}

#[test]
fn folding_analyzer_test() {
    let grammar = arithmetic_grammar();
    let mut parser = Parser::new(&grammar, "2 * (3 + 4) - 5".as_bytes()).unwrap();
    parser.set_analyzer(Box::new(Calculator));
    let tree = parser.parse().unwrap();
    assert!(parser.errors().is_empty());
    assert_eq!(tree.image(), Some("9"));
}

/// Drops the parenthesis tokens while children are attached.
struct ParenthesisFilter;

impl IAnalyzer for ParenthesisFilter {
    fn child(&mut self, parent: &mut ProductionNode, child: ParseNode) -> Result<(), String> {
        if let Some(token) = child.token() {
            if token.id == OPEN || token.id == CLOSE {
                return Ok(());
            }
        }
        parent.add_child(child);
        Ok(())
    }
}

#[test]
fn filtering_analyzer_test() {
    let grammar = arithmetic_grammar();
    let mut parser = Parser::new(&grammar, "(1) + 2".as_bytes()).unwrap();
    parser.set_analyzer(Box::new(ParenthesisFilter));
    let tree = parser.parse().unwrap();
    let parentheses = tree.list_nodes(&|node| {
        node.token()
            .map_or(false, |token| token.id == OPEN || token.id == CLOSE)
    });
    assert!(parentheses.is_empty());
    assert_eq!(tree.concat_images(), "1+2");
}

/// Counts the construction events it observes.
struct EventCounter {
    enters: Rc<RefCell<usize>>,
    exits: Rc<RefCell<usize>>,
}

impl IAnalyzer for EventCounter {
    fn enter(&mut self, _node: &ParseNode) -> Result<(), String> {
        *self.enters.borrow_mut() += 1;
        Ok(())
    }

    fn exit(&mut self, node: ParseNode) -> Result<Option<ParseNode>, String> {
        *self.exits.borrow_mut() += 1;
        Ok(Some(node))
    }
}

#[test]
fn event_symmetry_test() {
    let grammar = arithmetic_grammar();
    let mut parser = Parser::new(&grammar, "1 + 2".as_bytes()).unwrap();
    let enters = Rc::new(RefCell::new(0));
    let exits = Rc::new(RefCell::new(0));
    parser.set_analyzer(Box::new(EventCounter {
        enters: enters.clone(),
        exits: exits.clone(),
    }));
    parser.parse().unwrap();
    // expression, two terms, two factors, one tail and three tokens.
    assert_eq!(*enters.borrow(), 9);
    assert_eq!(*enters.borrow(), *exits.borrow());
}

/// Refuses every factor node.
struct FactorRejector;

impl IAnalyzer for FactorRejector {
    fn exit(&mut self, node: ParseNode) -> Result<Option<ParseNode>, String> {
        if node.id() == FACTOR && node.token().is_none() {
            Err("factors are refused".to_string())
        } else {
            Ok(Some(node))
        }
    }
}

#[test]
fn analysis_error_test() {
    let grammar = arithmetic_grammar();
    let mut parser = Parser::new(&grammar, "1 + 2".as_bytes()).unwrap();
    parser.set_analyzer(Box::new(FactorRejector));
    let tree = parser.parse().unwrap();
    // The refused nodes are dropped and the failures are recorded.
    assert_eq!(parser.errors().len(), 2);
    assert!(parser
        .errors()
        .iter()
        .all(|error| matches!(error.kind, ParseErrorKind::Analysis { .. })));
    assert!(!tree.contains("factor"));
}

/// Discards the root node itself.
struct RootDropper;

impl IAnalyzer for RootDropper {
    fn exit(&mut self, node: ParseNode) -> Result<Option<ParseNode>, String> {
        if node.id() == EXPRESSION && node.token().is_none() {
            Ok(None)
        } else {
            Ok(Some(node))
        }
    }
}

#[test]
fn dropped_root_test() {
    let grammar = arithmetic_grammar();
    let mut parser = Parser::new(&grammar, "1".as_bytes()).unwrap();
    parser.set_analyzer(Box::new(RootDropper));
    match parser.parse() {
        Ok(tree) => panic!("the dropped root should fail the parse, got {:?}", tree),
        Err(err) => assert!(matches!(err.kind, ParseErrorKind::Analysis { .. })),
    }
}
