use crate::{ParseNode, Position, ProductionNode, Token};
use ptree::TreeItem;
use std::borrow::Cow;

impl ProductionNode {
    pub(crate) fn new(id: usize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: ParseNode) {
        self.children.push(child);
    }
}

impl ParseNode {
    /// The production name, or [None] for a token node.
    pub fn name(&self) -> Option<&str> {
        match self {
            ParseNode::Token(_) => None,
            ParseNode::Production(node) => Some(&node.name),
        }
    }

    /// The token id or production id of the node.
    pub fn id(&self) -> usize {
        match self {
            ParseNode::Token(token) => token.id,
            ParseNode::Production(node) => node.id,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseNode::Token(token) => Some(token),
            ParseNode::Production(_) => None,
        }
    }

    /// The matched image of a token node.
    pub fn image(&self) -> Option<&str> {
        self.token().map(|token| token.image.as_str())
    }

    pub fn children(&self) -> &[ParseNode] {
        match self {
            ParseNode::Token(_) => &[],
            ParseNode::Production(node) => &node.children,
        }
    }

    /// Position of the first token beneath the node.
    pub fn start_position(&self) -> Option<Position> {
        match self {
            ParseNode::Token(token) => Some(Position::new(token.line, token.column)),
            ParseNode::Production(node) => {
                node.children.iter().find_map(|child| child.start_position())
            }
        }
    }

    /// Find the first node carrying the given production name,
    /// searching through all nested children.
    pub fn find_node(&self, name: &str) -> Option<&ParseNode> {
        if self.name() == Some(name) {
            Some(self)
        } else {
            self.children().iter().find_map(|child| child.find_node(name))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_node(name).is_some()
    }

    /// Collect every node the predicate accepts, in depth first order.
    pub fn list_nodes<'this, F: Fn(&ParseNode) -> bool>(
        &'this self,
        predicate: &F,
    ) -> Vec<&'this ParseNode> {
        let mut nodes = Vec::new();
        self.walk(&mut nodes, &|node, list| {
            if predicate(node) {
                list.push(node);
            }
        });
        nodes
    }

    /// Concatenation of every token image beneath the node.
    pub fn concat_images(&self) -> String {
        let mut images = String::new();
        self.walk(&mut images, &|node, buffer| {
            if let Some(image) = node.image() {
                buffer.push_str(image);
            }
        });
        images
    }

    fn walk<'this, TR, TF: Fn(&'this Self, &mut TR)>(&'this self, result: &mut TR, visit: &TF) {
        visit(self, result);
        self.children()
            .iter()
            .for_each(|child| child.walk(result, visit));
    }

    /// Print the tree to standard output.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl TreeItem for ParseNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            ParseNode::Token(token) => write!(
                f,
                "{:?} # {}:{}",
                token.image, token.line, token.column
            ),
            ParseNode::Production(node) => write!(f, "{}", node.name),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(self.children())
    }
}
