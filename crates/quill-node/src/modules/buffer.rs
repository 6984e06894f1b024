// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `buffer` module implementation
//!
//! Buffers are represented as [`Value::Bytes`].

use crate::error::{NodeError, Result};
use crate::namespace::Namespace;
use crate::value::Value;
use base64::Engine as _;
use base64::prelude::{BASE64_STANDARD, BASE64_STANDARD_NO_PAD};
use quill_macros::exports;
use std::sync::Arc;

/// `buffer.constants.MAX_LENGTH` on 64-bit platforms
pub const K_MAX_LENGTH: f64 = 4_294_967_296.0;

/// `buffer.constants.MAX_STRING_LENGTH`
pub const K_STRING_MAX_LENGTH: f64 = 536_870_888.0;

/// Create the buffer module exports
pub fn create_module() -> Namespace {
    exports! {
        "Buffer" => Value::function("Buffer", buffer),
        "atob" => Value::function("atob", |args| Ok(Value::String(atob(string_arg(args, 0)?)?))),
        "btoa" => Value::function("btoa", |args| Ok(Value::String(btoa(string_arg(args, 0)?)?))),
        "isUtf8" => Value::function("isUtf8", |args| {
            Ok(Value::Boolean(std::str::from_utf8(bytes_arg(args, 0)?).is_ok()))
        }),
        "isAscii" => Value::function("isAscii", |args| Ok(Value::Boolean(bytes_arg(args, 0)?.is_ascii()))),
        "transcode" => Value::function("transcode", transcode),
        "kMaxLength" => K_MAX_LENGTH,
        "kStringMaxLength" => K_STRING_MAX_LENGTH,
        "constants" => exports! {
            "MAX_LENGTH" => K_MAX_LENGTH,
            "MAX_STRING_LENGTH" => K_STRING_MAX_LENGTH,
        },
    }
}

/// `Buffer(size)` / `Buffer(string, encoding?)` / `Buffer(buffer)`
fn buffer(args: &[Value]) -> Result<Value> {
    let data = match args.first() {
        Some(Value::Number(size)) => {
            if !(0.0..=K_MAX_LENGTH).contains(size) || size.fract() != 0.0 {
                return Err(NodeError::type_error(format!(
                    "The argument 'size' is invalid. Received {}",
                    size
                )));
            }
            vec![0; *size as usize]
        }
        Some(Value::String(s)) => {
            let encoding = args.get(1).and_then(Value::as_str).unwrap_or("utf8");
            encode(s, encoding)?
        }
        Some(Value::Bytes(bytes)) => bytes.to_vec(),
        other => {
            return Err(NodeError::type_error(format!(
                "The first argument must be of type string or an instance of Buffer. Received {}",
                other.map(Value::type_of).unwrap_or("undefined")
            )));
        }
    };
    Ok(Value::Bytes(Arc::from(data)))
}

/// `buffer.transcode(source, fromEnc, toEnc)`
fn transcode(args: &[Value]) -> Result<Value> {
    let source = bytes_arg(args, 0)?;
    let from = args.get(1).and_then(Value::as_str).unwrap_or("utf8");
    let to = args.get(2).and_then(Value::as_str).unwrap_or("utf8");
    let text = decode(source, from)?;
    Ok(Value::Bytes(Arc::from(encode(&text, to)?)))
}

/// Encode a string into bytes with a Node.js encoding name
pub fn encode(s: &str, encoding: &str) -> Result<Vec<u8>> {
    let data = match encoding.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => s.as_bytes().to_vec(),
        "ascii" => s.chars().map(|c| (c as u32 & 0x7f) as u8).collect(),
        "latin1" | "binary" => s.chars().map(|c| c as u32 as u8).collect(),
        // Node.js stops at the first invalid character instead of throwing
        "base64" => {
            let trimmed: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            BASE64_STANDARD
                .decode(&trimmed)
                .or_else(|_| BASE64_STANDARD_NO_PAD.decode(trimmed.trim_end_matches('=')))
                .unwrap_or_default()
        }
        "hex" => {
            let digits: String = s.chars().take_while(char::is_ascii_hexdigit).collect();
            hex::decode(&digits[..digits.len() - digits.len() % 2]).unwrap_or_default()
        }
        other => return Err(NodeError::type_error(format!("Unknown encoding: {}", other))),
    };
    Ok(data)
}

/// Decode bytes into a string with a Node.js encoding name
pub fn decode(data: &[u8], encoding: &str) -> Result<String> {
    let text = match encoding.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => String::from_utf8_lossy(data).to_string(),
        "ascii" => data.iter().map(|&b| (b & 0x7f) as char).collect(),
        "latin1" | "binary" => data.iter().map(|&b| b as char).collect(),
        "base64" => BASE64_STANDARD.encode(data),
        "hex" => hex::encode(data),
        other => return Err(NodeError::type_error(format!("Unknown encoding: {}", other))),
    };
    Ok(text)
}

/// `atob(data)` - decode base64 into a latin1 string
pub fn atob(data: &str) -> Result<String> {
    let trimmed: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(&trimmed)
        .or_else(|_| BASE64_STANDARD_NO_PAD.decode(trimmed.trim_end_matches('=')))
        .map_err(|_| NodeError::type_error("Invalid character"))?;
    decode(&bytes, "latin1")
}

/// `btoa(data)` - encode a latin1 string as base64
pub fn btoa(data: &str) -> Result<String> {
    if data.chars().any(|c| c as u32 > 0xff) {
        return Err(NodeError::type_error("Invalid character"));
    }
    Ok(BASE64_STANDARD.encode(encode(data, "latin1")?))
}

fn string_arg(args: &[Value], index: usize) -> Result<&str> {
    args.get(index).and_then(Value::as_str).ok_or_else(|| {
        NodeError::type_error(format!("Argument {} must be of type string", index))
    })
}

fn bytes_arg(args: &[Value], index: usize) -> Result<&[u8]> {
    match args.get(index) {
        Some(Value::Bytes(bytes)) => Ok(&bytes[..]),
        _ => Err(NodeError::type_error(format!(
            "Argument {} must be an instance of Buffer or Uint8Array",
            index
        ))),
    }
}
