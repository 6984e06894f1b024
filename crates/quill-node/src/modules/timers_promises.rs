// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `timers/promises` module
//!
//! The host is synchronous, so every timer settles immediately with the
//! supplied `value`.

use crate::error::{NodeError, Result};
use crate::namespace::Namespace;
use crate::value::Value;
use quill_macros::exports;

/// Create the timers/promises module exports
pub fn create_module() -> Namespace {
    exports! {
        "setTimeout" => Value::function("setTimeout", |args| settle(args, 1)),
        "setImmediate" => Value::function("setImmediate", |args| settle(args, 0)),
        "setInterval" => Value::function("setInterval", |_| {
            Err(NodeError::type_error("setInterval async iterators are not supported by this host"))
        }),
        "scheduler" => exports! {
            "wait" => Value::function("wait", |args| {
                validate_delay(args.first())?;
                Ok(Value::Undefined)
            }),
            "yield" => Value::function("yield", |_| Ok(Value::Undefined)),
        },
    }
}

/// Resolve with the argument at `value_index`, after validating the delay
fn settle(args: &[Value], value_index: usize) -> Result<Value> {
    if value_index > 0 {
        validate_delay(args.first())?;
    }
    Ok(args.get(value_index).cloned().unwrap_or_default())
}

fn validate_delay(delay: Option<&Value>) -> Result<()> {
    match delay {
        None | Some(Value::Undefined) | Some(Value::Number(_)) => Ok(()),
        Some(other) => Err(NodeError::type_error(format!(
            "The \"delay\" argument must be of type number. Received {}",
            other.type_of()
        ))),
    }
}
