//! Turns a raw message into the token list the filter works on.
//!
//! Only the body contributes tokens. Leaf parts are visited depth first and
//! their text is concatenated without separators before tokenizing.

use crate::tokenize::tokenize;
use crate::{Config, Error, Result};
use lazy_regex::bytes_regex;
use mail_parser::decoders::base64::base64_decode;
use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use mail_parser::{Encoding, Message, MessageParser, MessagePart, MimeHeaders, PartType};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Decoded text of one leaf part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub content_type: String,
    pub html: bool,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    max_depth: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Normalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    pub fn normalize(&self, raw: &[u8]) -> Result<Vec<String>> {
        self.normalize_named("<input>", raw)
    }

    pub fn normalize_file(&self, path: &Path) -> Result<Vec<String>> {
        let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
        self.normalize_named(&path.display().to_string(), &raw)
    }

    fn normalize_named(&self, name: &str, raw: &[u8]) -> Result<Vec<String>> {
        let text = self.message_text_named(name, raw)?;
        let tokens = tokenize(&text);
        debug!(message = name, tokens = tokens.len(), "normalized");
        Ok(tokens)
    }

    /// Flattened body text of `raw`, before markup stripping.
    pub fn message_text(&self, raw: &[u8]) -> Result<String> {
        self.message_text_named("<input>", raw)
    }

    fn message_text_named(&self, name: &str, raw: &[u8]) -> Result<String> {
        Ok(self
            .leaves_named(name, raw)?
            .into_iter()
            .map(|leaf| leaf.text)
            .collect())
    }

    /// Leaf parts of `raw` in depth-first order.
    pub fn leaves(&self, raw: &[u8]) -> Result<Vec<Leaf>> {
        self.leaves_named("<input>", raw)
    }

    fn leaves_named(&self, name: &str, raw: &[u8]) -> Result<Vec<Leaf>> {
        // no header block: the whole input is the body, an empty file included
        if !bytes_regex!(r"\A(?:From |[\x21-\x39\x3B-\x7E]*:|[\t ]|\r?\n)").is_match(raw) {
            return Ok(vec![Leaf {
                content_type: "text/plain".to_string(),
                html: false,
                text: latin1(raw),
            }]);
        }
        let msg = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| Error::MessageParse {
                name: name.to_string(),
            })?;
        let mut leaves = Vec::new();
        self.collect_leaves(&msg, 0, 0, &mut leaves);
        Ok(leaves)
    }

    fn collect_leaves(
        &self,
        msg: &Message<'_>,
        part_id: usize,
        depth: usize,
        out: &mut Vec<Leaf>,
    ) {
        if depth > self.max_depth {
            warn!(depth, "message nesting too deep, skipping part");
            return;
        }
        let Some(part) = msg.parts.get(part_id) else {
            return;
        };
        let text = match &part.body {
            PartType::Multipart(children) => {
                for child in children {
                    self.collect_leaves(msg, *child as usize, depth + 1, out);
                }
                return;
            }
            PartType::Message(nested) => {
                self.collect_leaves(nested, 0, depth + 1, out);
                return;
            }
            PartType::Text(text) | PartType::Html(text) => {
                if text.is_empty() {
                    raw_payload(msg, part)
                } else {
                    text_payload(msg, part).unwrap_or_else(|| text.to_string())
                }
            }
            PartType::Binary(bytes) | PartType::InlineBinary(bytes) => {
                if bytes.is_empty() {
                    raw_payload(msg, part)
                } else {
                    latin1(bytes)
                }
            }
        };
        let content_type = part
            .content_type()
            .map(|c| format!("{}/{}", c.ctype(), c.subtype().unwrap_or("")))
            .unwrap_or_else(|| "text/plain".to_string());
        out.push(Leaf {
            content_type,
            html: matches!(part.body, PartType::Html(_)),
            text,
        });
    }
}

fn raw_body<'a>(msg: &'a Message<'_>, part: &MessagePart<'_>) -> Option<&'a [u8]> {
    let start = part.raw_body_offset() as usize;
    let end = part.raw_end_offset() as usize;
    msg.raw_message().get(start..end)
}

/// The undecoded body of a part, still transfer-encoded.
fn raw_payload(msg: &Message<'_>, part: &MessagePart<'_>) -> String {
    raw_body(msg, part).map(latin1).unwrap_or_default()
}

/// Transfer-decoded body read as ISO-8859-1, ignoring any declared charset.
fn text_payload(msg: &Message<'_>, part: &MessagePart<'_>) -> Option<String> {
    let raw = raw_body(msg, part)?;
    let decoded = match part.encoding {
        Encoding::Base64 => base64_decode(raw)?,
        Encoding::QuotedPrintable => quoted_printable_decode(raw)?,
        Encoding::None => return Some(latin1(raw)),
    };
    Some(latin1(&decoded)).filter(|text| !text.is_empty())
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
const MULTIPART: &[u8] = b"From: sender@example.com\r\n\
Subject: parts\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/alternative; boundary=\"XX\"\r\n\
\r\n\
preamble is ignored\r\n\
--XX\r\n\
Content-Type: text/plain\r\n\
\r\n\
alpha bravo charlie\r\n\
--XX\r\n\
Content-Type: text/html\r\n\
\r\n\
<p> delta echo</p>\r\n\
--XX--\r\n";

#[cfg(test)]
const NESTED: &[u8] = b"From: sender@example.com\r\n\
Subject: forward\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"OUTER\"\r\n\
\r\n\
--OUTER\r\n\
Content-Type: text/plain\r\n\
\r\n\
outer text\r\n\
--OUTER\r\n\
Content-Type: message/rfc822\r\n\
\r\n\
From: other@example.com\r\n\
Subject: inner\r\n\
Content-Type: text/plain\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
aW5uZXIgd29yZHMgaGVyZQ==\r\n\
--OUTER--\r\n";

#[test]
fn test_single_part() {
    let raw = b"From: a@example.com\r\nSubject: Hello World\r\n\r\nBuy CHEAP viagra now\r\n";
    let tokens = Normalizer::default().normalize(raw).unwrap();
    assert_eq!(tokens, ["buy", "cheap", "viagra", "now"]);
}

#[test]
fn test_multipart_depth_first() {
    let tokens = Normalizer::default().normalize(MULTIPART).unwrap();
    assert_eq!(tokens, ["alpha", "bravo", "charlie", "delta", "echo"]);
}

#[test]
fn test_transfer_decoding() {
    let raw = b"Subject: b64\r\n\
Content-Type: text/plain\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
c2VjcmV0IG9mZmVyIGluc2lkZQ==\r\n";
    let tokens = Normalizer::default().normalize(raw).unwrap();
    assert_eq!(tokens, ["secret", "offer", "inside"]);
}

#[test]
fn test_binary_part_is_latin1() {
    let raw = b"Subject: attachment\r\n\
Content-Type: application/octet-stream\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
Y2Fm6SBsYXR0ZQ==\r\n";
    let tokens = Normalizer::default().normalize(raw).unwrap();
    assert_eq!(tokens, ["caf\u{e9}", "latte"]);
}

#[test]
fn test_embedded_message() {
    let tokens = Normalizer::default().normalize(NESTED).unwrap();
    assert!(tokens.contains(&"outer".to_string()));
    assert!(tokens.contains(&"words".to_string()));
    assert!(tokens.contains(&"here".to_string()));
}

#[test]
fn test_depth_limit() {
    let normalizer = Normalizer::new(&Config::builder().max_depth(1).build());
    let tokens = normalizer.normalize(NESTED).unwrap();
    assert!(tokens.contains(&"outer".to_string()));
    assert!(!tokens.contains(&"words".to_string()));
}

#[test]
fn test_headers_do_not_contribute() {
    let raw = b"Subject: unsubscribe lottery winner\r\n\r\n<html><body></body></html>\r\n";
    let tokens = Normalizer::default().normalize(raw).unwrap();
    assert!(tokens.is_empty());
}

#[test]
fn test_untagged_8bit_body() {
    let tokens = Normalizer::default()
        .normalize(b"Subject: x\r\n\r\ncaf\xe9 cr\xe8me\r\n")
        .unwrap();
    assert_eq!(tokens, ["caf\u{e9}", "cr\u{e8}me"]);
}

#[test]
fn test_quoted_printable_without_charset() {
    let raw = b"Subject: qp\r\n\
Content-Type: text/plain\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
caf=E9 cr=E8me\r\n";
    let tokens = Normalizer::default().normalize(raw).unwrap();
    assert_eq!(tokens, ["caf\u{e9}", "cr\u{e8}me"]);
}

#[test]
fn test_declared_charset_is_ignored() {
    let raw = b"Subject: utf8\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
na\xc3\xafve\r\n";
    let text = Normalizer::default().message_text(raw).unwrap();
    assert!(text.contains("na\u{c3}\u{af}ve"), "{text:?}");
}

#[test]
fn test_empty_input() {
    assert!(Normalizer::default().normalize(b"").unwrap().is_empty());
}

#[test]
fn test_input_without_headers() {
    let tokens = Normalizer::default().normalize(b"hello world there").unwrap();
    assert_eq!(tokens, ["hello", "world", "there"]);
}

#[test]
fn test_undecodable_text_falls_back_to_raw() {
    let raw = b"Subject: broken\r\n\
Content-Type: text/plain\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
!!!! garbage words\r\n";
    let tokens = Normalizer::default().normalize(raw).unwrap();
    assert_eq!(tokens, ["garbage", "words"]);
}

#[cfg(test)]
const BROKEN_PARTS: &[u8] = b"From: sender@example.com\r\n\
Subject: broken parts\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"YY\"\r\n\
\r\n\
--YY\r\n\
Content-Type: text/plain\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
!!!! garbage words\r\n\
--YY\r\n\
Content-Type: application/octet-stream\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
!!!! binary junk\r\n\
--YY\r\n\
Content-Type: message/rfc822\r\n\
\r\n\
Subject: inner\r\n\
Content-Type: text/plain\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
!!!! nested leftovers\r\n\
--YY--\r\n";

#[test]
fn test_undecodable_parts_fall_back_to_raw() {
    let leaves = Normalizer::default().leaves(BROKEN_PARTS).unwrap();
    assert_eq!(leaves.len(), 3);
    assert_eq!(leaves[1].content_type, "application/octet-stream");
    assert_eq!(tokenize(&leaves[0].text), ["garbage", "words"]);
    assert_eq!(tokenize(&leaves[1].text), ["binary", "junk"]);
    assert_eq!(tokenize(&leaves[2].text), ["nested", "leftovers"]);
}

#[test]
fn test_leaves_mark_html() {
    let leaves = Normalizer::default().leaves(MULTIPART).unwrap();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].content_type, "text/plain");
    assert!(!leaves[0].html);
    assert!(leaves[1].html);
}
