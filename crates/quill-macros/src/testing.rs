// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assertions for registry and namespace tests.
//!
//! Failures print the error's display text and the namespace ids involved,
//! which is what a failing `require()` test needs to be read.

/// Unwrap an `Ok`, panicking with the error's display text.
///
/// ```ignore
/// use quill_macros::assert_ok;
///
/// let timers = assert_ok!(require.call("node:timers"));
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr $(,)?) => {
        match $expr {
            Ok(value) => value,
            Err(err) => panic!("`{}` failed: {}", stringify!($expr), err),
        }
    };
}

/// Unwrap an `Err`, panicking with the unexpected value.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr $(,)?) => {
        match $expr {
            Ok(value) => panic!("`{}` should have failed, got {:?}", stringify!($expr), value),
            Err(err) => err,
        }
    };
}

/// Assert that a `quill_node::Result` failed with the given `NodeError`
/// variant and return the error.
///
/// ```ignore
/// use quill_macros::assert_node_error;
///
/// let err = assert_node_error!(require.call("node:nope"), ModuleNotFound);
/// assert_eq!(err.code(), "MODULE_NOT_FOUND");
/// ```
#[macro_export]
macro_rules! assert_node_error {
    ($expr:expr, $variant:ident $(,)?) => {
        match $expr {
            Err(err @ ::quill_node::NodeError::$variant { .. }) => err,
            Err(other) => panic!(
                "`{}` failed with {} ({}), expected NodeError::{}",
                stringify!($expr),
                other,
                other.code(),
                stringify!($variant)
            ),
            Ok(value) => panic!(
                "`{}` succeeded with {:?}, expected NodeError::{}",
                stringify!($expr),
                value,
                stringify!($variant)
            ),
        }
    };
}

/// Assert that two namespace handles refer to the same object (`===`).
///
/// ```ignore
/// use quill_macros::assert_same;
/// use quill_node::Namespace;
///
/// let a = Namespace::new();
/// let b = a.clone();
/// assert_same!(a, b);
/// ```
#[macro_export]
macro_rules! assert_same {
    ($left:expr, $right:expr $(,)?) => {
        if !::quill_node::Namespace::ptr_eq(&$left, &$right) {
            panic!(
                "`{}` and `{}` are different objects\n  left: {:?}\n  right: {:?}",
                stringify!($left),
                stringify!($right),
                $left,
                $right
            );
        }
    };
}

/// Assert that two namespace handles refer to different objects.
#[macro_export]
macro_rules! assert_distinct {
    ($left:expr, $right:expr $(,)?) => {
        if ::quill_node::Namespace::ptr_eq(&$left, &$right) {
            panic!(
                "`{}` and `{}` are the same object ({:#x})",
                stringify!($left),
                stringify!($right),
                $left.id()
            );
        }
    };
}
