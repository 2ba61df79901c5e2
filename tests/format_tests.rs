//! Exact on-disk layout of written files, and reading of hand-written ones.

use roffio::tokenizer::{RoffTokenizer, TokenKind};
use roffio::{from_slice, roff, to_vec, Array, Endianness, FileMode, Format, Value};
use std::io::Cursor;

const VERSION_TAG_BINARY: &[u8] = b"tag\0version\0int\0major\0\x02\0\0\0int\0minor\0\0\0\0\0endtag\0";

fn header_binary() -> Vec<u8> {
    let mut bytes = b"roff-bin\0#ROFF file#\0#Creator: roffio, version ".to_vec();
    bytes.extend_from_slice(env!("CARGO_PKG_VERSION").as_bytes());
    bytes.extend_from_slice(b"#\0");
    bytes
}

/// Returns the bytes after the `filedata` tag, whose date varies.
fn after_filedata(bytes: &[u8]) -> &[u8] {
    let at = bytes
        .windows(VERSION_TAG_BINARY.len())
        .position(|window| window == VERSION_TAG_BINARY)
        .unwrap();
    &bytes[at..]
}

#[test]
fn test_binary_header_and_filedata() {
    let bytes = to_vec(&roff! {}, Format::Binary).unwrap();
    let header = header_binary();
    assert!(bytes.starts_with(&header));
    let rest = &bytes[header.len()..];
    assert!(rest.starts_with(
        b"tag\0filedata\0int\0byteswaptest\0\x01\0\0\0char\0creationDate\0"
    ));
}

#[test]
fn test_binary_layout() {
    let data = roff! {
        "t" => {
            "b" => true,
            "y" => 7u8,
            "i" => -2,
            "f" => 1.0f32,
            "d" => 2.0,
            "s" => "ab",
            "bytes" => vec![1u8, 2],
            "names" => vec!["p", "q"],
        },
    };
    let bytes = to_vec(&data, Format::Binary).unwrap();
    let expected: &[u8] = b"tag\0version\0int\0major\0\x02\0\0\0int\0minor\0\0\0\0\0endtag\0\
        tag\0t\0\
        bool\0b\0\x01\
        byte\0y\0\x07\
        int\0i\0\xfe\xff\xff\xff\
        float\0f\0\0\0\x80\x3f\
        double\0d\0\0\0\0\0\0\0\0\x40\
        char\0s\0ab\0\
        array\0byte\0bytes\0\x02\0\0\0\x01\x02\
        array\0char\0names\0\x02\0\0\0p\0q\0\
        endtag\0\
        tag\0eof\0endtag\0";
    assert_eq!(after_filedata(&bytes), expected);
}

#[test]
fn test_binary_big_endian_layout() {
    let options = roffio::WriteOptions::new().with_endianness(Endianness::Big);
    let bytes = roffio::to_vec_with_options(&roff! { "t" => { "i" => 1 } }, &options).unwrap();
    let header = header_binary();
    let rest = &bytes[header.len()..];
    assert!(rest.starts_with(b"tag\0filedata\0int\0byteswaptest\0\0\0\0\x01"));
    assert!(bytes.ends_with(b"tag\0t\0int\0i\0\0\0\0\x01endtag\0tag\0eof\0endtag\0"));
}

#[test]
fn test_ascii_layout() {
    let data = roff! {
        "t" => {
            "b" => false,
            "y" => 7u8,
            "i" => -2,
            "f" => 0.5f32,
            "s" => "a b",
            "ints" => vec![1, 2],
        },
    };
    let text = String::from_utf8(to_vec(&data, Format::Ascii).unwrap()).unwrap();
    let expected_start = format!(
        "roff-asc\n#ROFF file#\n#Creator: roffio, version {}#\ntag filedata\nint byteswaptest 1\nchar creationDate \"",
        env!("CARGO_PKG_VERSION")
    );
    assert!(text.starts_with(&expected_start));
    assert!(text.ends_with(
        "\"\nendtag\n\
         tag version\nint major 2\nint minor 0\nendtag\n\
         tag t\n\
         bool b 0\n\
         byte y 7\n\
         int i -2\n\
         float f 0.5\n\
         char s \"a b\"\n\
         array int ints 2\n1\n2\n\
         endtag\n\
         tag eof\nendtag\n"
    ));
}

#[test]
fn test_binary_comments() {
    let bytes = b"roff-bin\0#c#\0tag\0#c#\0t\0#c#\0int\0#c#\0x\0\x05\0\0\0#c#\0endtag\0#c#\0";
    let data = from_slice(bytes).unwrap();
    assert_eq!(data.get_tag("t").unwrap().get_value("x"), Some(&Value::Int(5)));
}

#[test]
fn test_ascii_comments_and_whitespace() {
    let text = b"roff-asc#header#\n\ttag #c# t\n\n  array #c# double a 2 #c# 1.0e0\r\n-2E+1 endtag #end#  ";
    let data = from_slice(text).unwrap();
    assert_eq!(
        data.get_tag("t").unwrap().get_value("a"),
        Some(&Value::Array(Array::Double(vec![1.0, -20.0])))
    );
}

#[test]
fn test_ascii_name_may_contain_hash() {
    let data = from_slice(b"roff-asc tag a#b int x#1 1 endtag").unwrap();
    assert_eq!(data.get_tag("a#b").unwrap().get_value("x#1"), Some(&Value::Int(1)));
}

#[test]
fn test_ascii_string_has_no_escapes() {
    let data = from_slice(b"roff-asc tag t char s \"a\\nb\" endtag").unwrap();
    assert_eq!(
        data.get_tag("t").unwrap().get_value("s"),
        Some(&Value::from("a\\nb"))
    );
}

#[test]
fn test_binary_token_stream() {
    let bytes = b"roff-bin\0tag\0t\0array\0int\0a\0\x02\0\0\0\x01\0\0\0\x02\0\0\0endtag\0";
    let tokens = RoffTokenizer::new(Cursor::new(bytes.to_vec()), FileMode::Binary, Endianness::Little)
        .unwrap()
        .collect::<roffio::Result<Vec<_>>>()
        .unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::RoffBin,
            TokenKind::Tag,
            TokenKind::Name,
            TokenKind::Array,
            TokenKind::Int,
            TokenKind::Name,
            TokenKind::BinaryNumericValue,
            TokenKind::ArrayBlob,
            TokenKind::EndTag,
        ]
    );
    let blob = tokens[7];
    assert_eq!((blob.start, blob.end), (31, 39));
}

#[test]
fn test_truncated_blob() {
    let bytes = b"roff-bin\0tag\0t\0array\0int\0a\0\x03\0\0\0\x01\0\0\0endtag\0";
    assert!(from_slice(bytes).is_err());
}
