// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `path` module implementation (POSIX flavour)

use crate::error::{NodeError, Result};
use crate::namespace::Namespace;
use crate::value::Value;
use quill_macros::exports;

/// Create the path module exports
pub fn create_module() -> Namespace {
    exports! {
        "sep" => "/",
        "delimiter" => ":",
        "basename" => Value::function("basename", |args| {
            let ext = args.get(1).and_then(Value::as_str);
            Ok(basename(path_arg(args, 0)?, ext).into())
        }),
        "dirname" => Value::function("dirname", |args| Ok(dirname(path_arg(args, 0)?).into())),
        "extname" => Value::function("extname", |args| Ok(extname(path_arg(args, 0)?).into())),
        "isAbsolute" => Value::function("isAbsolute", |args| Ok(is_absolute(path_arg(args, 0)?).into())),
        "join" => Value::function("join", |args| {
            let parts = (0..args.len())
                .map(|i| path_arg(args, i))
                .collect::<Result<Vec<_>>>()?;
            Ok(join(&parts).into())
        }),
        "normalize" => Value::function("normalize", |args| Ok(normalize(path_arg(args, 0)?).into())),
    }
}

fn path_arg(args: &[Value], index: usize) -> Result<&str> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.as_str()),
        other => Err(NodeError::type_error(format!(
            "The \"path\" argument must be of type string. Received {}",
            other.map(Value::type_of).unwrap_or("undefined")
        ))),
    }
}

/// path.basename(path, ext?)
pub fn basename(path: &str, ext: Option<&str>) -> String {
    let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");

    match ext {
        Some(ext) if name != ext && name.ends_with(ext) => name[..name.len() - ext.len()].to_string(),
        _ => name.to_string(),
    }
}

/// path.dirname(path)
pub fn dirname(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => match trimmed[..idx].trim_end_matches('/') {
            "" => "/".to_string(),
            parent => parent.to_string(),
        },
        None => ".".to_string(),
    }
}

/// path.extname(path)
pub fn extname(path: &str) -> String {
    let name = basename(path, None);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        _ if name == ".." => String::new(),
        Some(idx) => name[idx..].to_string(),
    }
}

/// path.isAbsolute(path)
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// path.join(...paths)
pub fn join(paths: &[&str]) -> String {
    let joined = paths
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    normalize(&joined)
}

/// path.normalize(path)
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let is_absolute = is_absolute(path);
    let trailing = path.ends_with('/');
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                if !components.is_empty() && components.last() != Some(&"..") {
                    components.pop();
                } else if !is_absolute {
                    components.push("..");
                }
            }
            c => components.push(c),
        }
    }

    let mut result = components.join("/");
    if is_absolute {
        result.insert(0, '/');
    }
    if result.is_empty() {
        return ".".to_string();
    }
    if trailing && result != "/" {
        result.push('/');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/foo/bar/baz.html", None), "baz.html");
        assert_eq!(basename("/foo/bar/baz.html", Some(".html")), "baz");
        assert_eq!(basename("/foo/bar/", None), "bar");
        assert_eq!(basename(".html", Some(".html")), ".html");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/foo/bar/baz"), "/foo/bar");
        assert_eq!(dirname("/foo/bar/"), "/foo");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname("foo"), ".");
        assert_eq!(dirname("/"), "/");
    }

    #[test]
    fn test_extname() {
        assert_eq!(extname("index.html"), ".html");
        assert_eq!(extname("index.coffee.md"), ".md");
        assert_eq!(extname("index."), ".");
        assert_eq!(extname("index"), "");
        assert_eq!(extname(".index"), "");
        assert_eq!(extname(".."), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/foo/bar//baz/asdf/quux/.."), "/foo/bar/baz/asdf");
        assert_eq!(normalize("a/../.."), "..");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("a/b/"), "a/b/");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["/foo", "bar", "baz/asdf", "quux", ".."]), "/foo/bar/baz/asdf");
        assert_eq!(join(&["a", "/b"]), "a/b");
        assert_eq!(join(&["", ""]), ".");
    }

    #[test]
    fn test_exports_reject_non_strings() {
        let ns = create_module();
        let dirname = ns.get("dirname").unwrap();
        let err = dirname.as_function().unwrap().call(&[Value::Null]).unwrap_err();
        assert!(matches!(err, NodeError::TypeError(_)));
    }
}
