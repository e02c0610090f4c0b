//! Newick reader producing a [Tree].
//!
//! Supports any number of children per node, optional labels on every node
//! (plain or single-quoted), optional `:length` suffixes and `[...]`
//! comments. Only the first tree of the input is read.

use super::{NodeIndex, Tree};
use crate::utils::compression::open_reader;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Bytes ending a plain label or a branch length.
const DELIMITERS: &[u8] = b"(),:;[";

#[derive(Debug, Error)]
pub enum NewickError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open tree stream: {0}")]
    Compression(#[from] niffler::Error),

    #[error("Newick input contains no tree")]
    Empty,

    #[error("Invalid newick string at position {position}: {message}")]
    Invalid { position: usize, message: String },
}

/// Reads the first tree of a (possibly compressed) Newick file.
pub fn read_newick<P: AsRef<Path>>(path: P) -> Result<Tree, NewickError> {
    let mut text = String::new();
    open_reader(path.as_ref())?.read_to_string(&mut text)?;
    parse_newick(&text)
}

/// Parses the first tree of a Newick string.
pub fn parse_newick(input: &str) -> Result<Tree, NewickError> {
    NewickParser::new(input).parse()
}

struct NewickParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> NewickParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            position: 0,
        }
    }

    /// Builds the tree top-down. `open` holds the internal nodes whose
    /// closing `)` has not been read yet.
    fn parse(mut self) -> Result<Tree, NewickError> {
        self.skip_comment_and_whitespace()?;
        if self.peek().is_none() {
            return Err(NewickError::Empty);
        }

        let mut tree = Tree::new();
        let mut open: Vec<NodeIndex> = Vec::new();
        let mut current = tree.root_index();

        loop {
            // At the start of the subtree rooted at `current`
            self.skip_comment_and_whitespace()?;
            if self.consume_if(b'(') {
                open.push(current);
                current = tree.add_child(current);
                continue;
            }
            self.parse_node_suffix(&mut tree, current)?;

            // `current` is complete; move to a sibling or close the parent
            loop {
                self.skip_comment_and_whitespace()?;
                match self.peek() {
                    Some(b',') => {
                        let parent = *open
                            .last()
                            .ok_or_else(|| self.invalid("',' outside of parentheses"))?;
                        self.position += 1;
                        current = tree.add_child(parent);
                        break;
                    }
                    Some(b')') => {
                        current = open.pop().ok_or_else(|| self.invalid("unbalanced ')'"))?;
                        self.position += 1;
                        self.parse_node_suffix(&mut tree, current)?;
                    }
                    Some(b';') | None if open.is_empty() => return Ok(tree),
                    Some(b';') | None => {
                        return Err(self.invalid(format!(
                            "{} unclosed '(' before end of tree",
                            open.len()
                        )))
                    }
                    Some(other) => {
                        return Err(self.invalid(format!(
                            "unexpected character {:?}",
                            char::from(other)
                        )))
                    }
                }
            }
        }
    }

    /// Parses `[label][:length]` following a leaf start or a closing `)`.
    fn parse_node_suffix(&mut self, tree: &mut Tree, index: NodeIndex) -> Result<(), NewickError> {
        self.skip_comment_and_whitespace()?;
        if let Some(label) = self.parse_label()? {
            tree.set_label(index, label);
        }

        self.skip_comment_and_whitespace()?;
        if self.consume_if(b':') {
            self.skip_comment_and_whitespace()?;
            let start = self.position;
            let token = self.take_until_delimiter();
            let length = token.parse::<f64>().map_err(|_| NewickError::Invalid {
                position: start,
                message: format!("invalid branch length {:?}", token),
            })?;
            tree.set_edge_length(index, length);
        }
        Ok(())
    }

    fn parse_label(&mut self) -> Result<Option<String>, NewickError> {
        if self.consume_if(b'\'') {
            return self.parse_quoted_label().map(Some);
        }
        let token = self.take_until_delimiter();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    /// Reads a single-quoted label; `''` stands for one quote.
    fn parse_quoted_label(&mut self) -> Result<String, NewickError> {
        let start = self.position;
        let mut label = String::new();
        loop {
            let rest = &self.input[self.position..];
            let Some(offset) = rest.find('\'') else {
                return Err(NewickError::Invalid {
                    position: start,
                    message: "unclosed quoted label".to_string(),
                });
            };
            label.push_str(&rest[..offset]);
            self.position += offset + 1;
            if self.consume_if(b'\'') {
                label.push('\'');
            } else {
                return Ok(label);
            }
        }
    }

    fn take_until_delimiter(&mut self) -> &'a str {
        let start = self.position;
        while let Some(byte) = self.peek() {
            if DELIMITERS.contains(&byte) || byte.is_ascii_whitespace() {
                break;
            }
            self.position += 1;
        }
        &self.input[start..self.position]
    }

    fn skip_comment_and_whitespace(&mut self) -> Result<(), NewickError> {
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.position += 1;
            }
            if !self.peek_is(b'[') {
                return Ok(());
            }
            let start = self.position;
            match self.bytes[start..].iter().position(|&b| b == b']') {
                Some(offset) => self.position = start + offset + 1,
                None => {
                    return Err(NewickError::Invalid {
                        position: start,
                        message: "unclosed comment".to_string(),
                    })
                }
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_is(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    fn consume_if(&mut self, byte: u8) -> bool {
        if self.peek_is(byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn invalid(&self, message: impl Into<String>) -> NewickError {
        NewickError::Invalid {
            position: self.position,
            message: message.into(),
        }
    }
}
