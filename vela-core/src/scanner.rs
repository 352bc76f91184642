//! Scanner - tolerant cursor scanning of configuration text
//!
//! Splits raw text into top-level declaration blocks and flattens each
//! block body into a property map. The scanner is an explicit cursor
//! over the input rather than a grammar: malformed input degrades to a
//! partial result (fewer blocks, fewer properties), never an error.

use crate::config::{Block, BlockKind, Configuration, PropertyMap, RawValue};

/// Parse configuration text into a model: block scan, then a property
/// scan over every block body.
pub fn parse(input: &str) -> Configuration {
    let mut blocks = scan_blocks(input);
    for block in &mut blocks {
        block.properties = scan_properties(&block.body);
    }
    tracing::debug!(blocks = blocks.len(), "scanned configuration");
    Configuration::new(blocks)
}

/// Split raw text into top-level blocks in source order.
///
/// A declaration is `kind ["label"] ["label"] {`, where the body spans
/// to the matching close brace. Braces inside quoted strings or line
/// comments do not count. A block whose closing brace never arrives
/// runs to end of text. Unknown block kinds (`terraform`, `locals`,
/// `module`, ...) are skipped whole.
pub fn scan_blocks(input: &str) -> Vec<Block> {
    let mut cur = Cursor::new(input);
    let mut blocks = Vec::new();

    while !cur.at_end() {
        cur.skip_trivia();
        if cur.at_end() {
            break;
        }

        let word = cur.read_identifier();
        if word.is_empty() {
            cur.bump();
            continue;
        }
        let kind = BlockKind::from_keyword(word);

        let mut labels: Vec<String> = Vec::new();
        cur.skip_trivia();
        while labels.len() < 2 {
            match cur.peek() {
                Some(q @ (b'"' | b'\'')) => {
                    cur.bump();
                    labels.push(cur.read_quoted(q).to_string());
                    cur.skip_trivia();
                }
                _ => break,
            }
        }

        match (kind, cur.peek()) {
            (Some(kind), Some(b'{')) => {
                cur.bump();
                let body = cur.read_braced_body().to_string();
                let mut labels = labels.into_iter();
                let type_label = labels.next();
                let name_label = labels.next();
                blocks.push(Block::new(kind, body).with_labels(type_label, name_label));
            }
            (None, Some(b'{')) => {
                cur.bump();
                cur.read_braced_body();
            }
            _ => {
                // not a declaration after all; resume on the next line
                cur.skip_line();
            }
        }
    }

    blocks
}

/// Scan one block body into a flat property map.
///
/// Values are classified by their first character: quoted string, list
/// literal (kept verbatim with its brackets), map literal (verbatim
/// with its braces), or a bare token read to end of line. Nested
/// sub-blocks are skipped whole and contribute nothing to the map.
/// Duplicate attribute names are last-write-wins.
pub fn scan_properties(body: &str) -> PropertyMap {
    let mut cur = Cursor::new(body);
    let mut properties = PropertyMap::new();

    loop {
        cur.skip_trivia();
        if cur.at_end() {
            break;
        }

        let key = cur.read_identifier();
        if key.is_empty() {
            cur.bump();
            continue;
        }
        cur.skip_trivia();

        if cur.peek() == Some(b'=') {
            cur.bump();
            cur.skip_trivia();
            let value = match cur.peek() {
                Some(q @ (b'"' | b'\'')) => {
                    cur.bump();
                    RawValue::Str(cur.read_quoted(q).to_string())
                }
                Some(b'[') => {
                    cur.bump();
                    RawValue::List(format!("[{}]", cur.read_delimited(b'[', b']')))
                }
                Some(b'{') => {
                    cur.bump();
                    RawValue::Map(format!("{{{}}}", cur.read_delimited(b'{', b'}')))
                }
                _ => RawValue::Bare(cur.read_bare_token().to_string()),
            };
            properties.insert(key.to_string(), value);
        } else {
            // possibly a (labeled) nested sub-block header
            while let Some(q @ (b'"' | b'\'')) = cur.peek() {
                cur.bump();
                cur.read_quoted(q);
                cur.skip_trivia();
            }
            if cur.peek() == Some(b'{') {
                cur.bump();
                cur.read_braced_body();
            } else {
                cur.bump();
            }
        }
    }

    properties
}

/// Byte cursor over the input text. Slices are only taken at ASCII
/// delimiter positions, so multi-byte characters pass through intact.
struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    /// Advance past one character, however many bytes it takes.
    fn bump(&mut self) {
        if let Some(&b) = self.bytes.get(self.pos) {
            let width = if b < 0x80 {
                1
            } else if b >= 0xF0 {
                4
            } else if b >= 0xE0 {
                3
            } else {
                2
            };
            self.pos = (self.pos + width).min(self.bytes.len());
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    /// Skip whitespace and line comments (`#` and `//`).
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'#') => self.skip_line(),
                Some(b'/') if self.peek_second() == Some(b'/') => self.skip_line(),
                _ => break,
            }
        }
    }

    /// Read an identifier: alphanumerics, underscore, hyphen.
    fn read_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.text[start..self.pos]
    }

    /// Read up to the matching unescaped closing quote (which is
    /// consumed) and return the inner text verbatim. A backslash
    /// consumes the following character without terminating the string.
    fn read_quoted(&mut self, quote: u8) -> &'a str {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                b if b == quote => {
                    let inner = &self.text[start..self.pos];
                    self.pos += 1;
                    return inner;
                }
                _ => self.pos += 1,
            }
        }
        &self.text[start..]
    }

    /// Skip a quoted span whose opening quote was already consumed.
    fn skip_quoted(&mut self, quote: u8) {
        self.read_quoted(quote);
    }

    /// Read until the matching `close` at depth zero, tracking nested
    /// `open`/`close` pairs and skipping quoted substrings so a closer
    /// inside a string does not terminate early. The closer is
    /// consumed; the returned span excludes both delimiters.
    fn read_delimited(&mut self, open: u8, close: u8) -> &'a str {
        let start = self.pos;
        let mut depth = 0usize;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == close {
                if depth == 0 {
                    let inner = &self.text[start..self.pos];
                    self.pos += 1;
                    return inner;
                }
                depth -= 1;
                self.pos += 1;
            } else if b == open {
                depth += 1;
                self.pos += 1;
            } else if b == b'"' || b == b'\'' {
                self.pos += 1;
                self.skip_quoted(b);
            } else {
                self.pos += 1;
            }
        }
        &self.text[start..]
    }

    /// Read a block body whose opening brace was already consumed:
    /// string- and comment-aware brace counting. Unterminated bodies
    /// run to end of text.
    fn read_braced_body(&mut self) -> &'a str {
        let start = self.pos;
        let mut depth = 1usize;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                q @ (b'"' | b'\'') => {
                    self.pos += 1;
                    self.skip_quoted(q);
                }
                b'#' => self.skip_line(),
                b'/' if self.peek_second() == Some(b'/') => self.skip_line(),
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let body = &self.text[start..self.pos];
                        self.pos += 1;
                        return body;
                    }
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        &self.text[start..]
    }

    /// Read a bare token up to end of line or a comment marker, with
    /// trailing separators trimmed.
    fn read_bare_token(&mut self) -> &'a str {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\n' || b == b'\r' || b == b'#' {
                break;
            }
            if b == b'/' && self.peek_second() == Some(b'/') {
                break;
            }
            self.pos += 1;
        }
        self.text[start..self.pos].trim_end_matches([',', ' ', '\t'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scan_resource_block() {
        let input = r#"
            resource "aws_instance" "web" {
                ami           = "ami-0c55b159cbfafe1f0"
                instance_type = "t2.micro"
            }
        "#;

        let config = parse(input);
        assert_eq!(config.blocks.len(), 1);

        let block = &config.blocks[0];
        assert_eq!(block.kind, BlockKind::Resource);
        assert_eq!(block.type_label.as_deref(), Some("aws_instance"));
        assert_eq!(block.name_label.as_deref(), Some("web"));
        assert_eq!(
            block.property("instance_type"),
            Some(&RawValue::Str("t2.micro".into()))
        );
    }

    #[test]
    fn scan_all_block_kinds() {
        let input = r#"
            provider "azurerm" {
                features {}
            }

            variable "location" {
                default = "East US"
            }

            resource "azurerm_virtual_machine" "vm" {
                vm_size  = "Standard_D2s_v3"
                location = var.location
            }

            output "vm_id" {
                value = azurerm_virtual_machine.vm.id
            }
        "#;

        let config = parse(input);
        assert_eq!(config.blocks.len(), 4);
        assert_eq!(config.providers().count(), 1);
        assert_eq!(config.variables().count(), 1);
        assert_eq!(config.resources().count(), 1);
        assert_eq!(config.outputs().count(), 1);
    }

    #[test]
    fn braces_inside_strings_do_not_split_blocks() {
        // brace-balance: two declarations in, exactly two blocks out
        let input = r##"
            resource "aws_instance" "a" {
                user_data = "#!/bin/bash\necho {hello} > /tmp/x"
            }

            resource "aws_instance" "b" {
                instance_type = "t2.micro"
            }
        "##;

        let blocks = scan_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name_label.as_deref(), Some("a"));
        assert_eq!(blocks[1].name_label.as_deref(), Some("b"));
    }

    #[test]
    fn unterminated_block_runs_to_end_of_text() {
        let input = r#"
            resource "aws_instance" "broken" {
                instance_type = "t2.micro"
        "#;

        let config = parse(input);
        assert_eq!(config.blocks.len(), 1);
        assert_eq!(
            config.blocks[0].property("instance_type"),
            Some(&RawValue::Str("t2.micro".into()))
        );
    }

    #[test]
    fn unknown_top_level_blocks_are_skipped() {
        let input = r#"
            terraform {
                required_providers {
                    aws = {
                        source = "hashicorp/aws"
                    }
                }
            }

            resource "aws_s3_bucket" "logs" {
                bucket = "app-logs"
            }
        "#;

        let config = parse(input);
        assert_eq!(config.blocks.len(), 1);
        assert_eq!(config.blocks[0].type_label.as_deref(), Some("aws_s3_bucket"));
    }

    #[test]
    fn list_with_embedded_comma_string_stays_whole() {
        let input = r#"
            resource "aws_instance" "web" {
                tags = ["a", "b, c"]
            }
        "#;

        let config = parse(input);
        assert_eq!(
            config.blocks[0].property("tags"),
            Some(&RawValue::List(r#"["a", "b, c"]"#.into()))
        );
    }

    #[test]
    fn list_with_embedded_bracket_string_stays_whole() {
        let body = r#" names = ["x]y", "z"] "#;
        let props = scan_properties(body);
        assert_eq!(
            props.get("names"),
            Some(&RawValue::List(r#"["x]y", "z"]"#.into()))
        );
    }

    #[test]
    fn nested_lists_and_maps() {
        let body = r#"
            routes = [
                { destination = "0.0.0.0/0", gateway = "igw" },
                { destination = "10.0.0.0/8", gateway = "local" }
            ]
            tags = { Name = "main", Env = "prod" }
        "#;

        let props = scan_properties(body);
        assert!(matches!(props.get("routes"), Some(RawValue::List(s)) if s.contains("10.0.0.0/8")));
        assert!(matches!(props.get("tags"), Some(RawValue::Map(s)) if s.contains("Env")));
    }

    #[test]
    fn nested_sub_blocks_are_invisible() {
        let body = r#"
            name = "web-sg"
            ingress {
                from_port = 80
                to_port   = 80
            }
            dynamic "egress" {
                for_each = var.rules
            }
            vpc_id = "vpc-123"
        "#;

        let props = scan_properties(body);
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("name"), Some(&RawValue::Str("web-sg".into())));
        assert_eq!(props.get("vpc_id"), Some(&RawValue::Str("vpc-123".into())));
        assert!(props.get("from_port").is_none());
        assert!(props.get("for_each").is_none());
    }

    #[test]
    fn bare_tokens_and_comments() {
        let body = r#"
            # leading comment
            count    = 3            # trailing comment
            monitor  = true         // other comment style
            location = azurerm_resource_group.main.location
        "#;

        let props = scan_properties(body);
        assert_eq!(props.get("count"), Some(&RawValue::Bare("3".into())));
        assert_eq!(props.get("monitor"), Some(&RawValue::Bare("true".into())));
        assert_eq!(
            props.get("location"),
            Some(&RawValue::Bare("azurerm_resource_group.main.location".into()))
        );
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let body = r#" motd = "say \"hi\" { and wave }" "#;
        let props = scan_properties(body);
        assert_eq!(
            props.get("motd"),
            Some(&RawValue::Str(r#"say \"hi\" { and wave }"#.into()))
        );
    }

    #[test]
    fn single_quoted_strings() {
        let body = " name = 'single' ";
        let props = scan_properties(body);
        assert_eq!(props.get("name"), Some(&RawValue::Str("single".into())));
    }

    #[test]
    fn duplicate_attribute_last_write_wins() {
        let body = r#"
            size = "t2.micro"
            size = "t2.small"
        "#;

        let props = scan_properties(body);
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("size"), Some(&RawValue::Str("t2.small".into())));
    }

    #[test]
    fn trailing_comma_trimmed_from_bare_token() {
        let body = "threshold = 42,\n";
        let props = scan_properties(body);
        assert_eq!(props.get("threshold"), Some(&RawValue::Bare("42".into())));
    }

    #[test]
    fn empty_and_garbage_input() {
        assert!(parse("").is_empty());
        assert!(parse("}} random noise {{").is_empty());
        assert!(scan_properties("=== ??? }{").is_empty());
    }

    #[test]
    fn resource_with_one_label_is_tolerated() {
        let input = r#"resource "aws_instance" { instance_type = "t2.micro" }"#;
        let config = parse(input);
        assert_eq!(config.blocks.len(), 1);
        assert_eq!(config.blocks[0].type_label.as_deref(), Some("aws_instance"));
        assert!(config.blocks[0].name_label.is_none());
    }

    #[test]
    fn round_trip_through_reconstruction() {
        let input = r#"
            provider "aws" {
                region = "us-east-1"
            }

            resource "aws_instance" "web" {
                instance_type = "t2.micro"
            }
        "#;

        let rebuilt = parse(input).to_source();
        let reparsed = parse(&rebuilt);
        assert_eq!(reparsed.blocks.len(), 2);
        assert_eq!(
            reparsed.blocks[1].property("instance_type"),
            Some(&RawValue::Str("t2.micro".into()))
        );
    }
}
