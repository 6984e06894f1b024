// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript object literal macros.

/// Create a namespace object literal.
///
/// Keys are string literals; values are anything convertible into
/// `quill_node::Value`. Insertion order follows the literal.
///
/// # Example
///
/// ```ignore
/// use quill_macros::exports;
///
/// let ns = exports! {
///     "name" => "Alice",
///     "age" => 30.0,
/// };
///
/// assert!(ns.has("name"));
/// assert_eq!(ns.len(), 2);
/// ```
#[macro_export]
macro_rules! exports {
    () => {
        ::quill_node::Namespace::new()
    };
    ($($key:literal => $value:expr),+ $(,)?) => {
        ::quill_node::Namespace::from_entries([
            $(($key, ::quill_node::Value::from($value))),+
        ])
    };
}
