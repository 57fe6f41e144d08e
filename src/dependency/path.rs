//! Module specifiers between generated files.
//!
//! File paths handed to the [`PathManager`] are relative to the output root
//! and use `/` separators, e.g. `com/example/Foo.ts`.

pub const DEFAULT_IMPORT_EXTENSION: &str = ".js";

const SOURCE_EXTENSION: &str = ".ts";

#[derive(Debug, Clone)]
pub struct PathManager {
    extension: String,
    alias_root: Option<String>,
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORT_EXTENSION, None)
    }
}

impl PathManager {
    pub fn new(extension: impl Into<String>, alias_root: Option<String>) -> Self {
        Self {
            extension: extension.into(),
            alias_root: alias_root.map(|root| root.trim_end_matches('/').to_string()),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Relative specifier from the file `from` to `target`.
    ///
    /// `target` may be given with or without the `.ts` suffix; the import
    /// extension is appended when missing and the result always starts with
    /// `.`.
    pub fn create_relative_path(&self, target: &str, from: &str) -> String {
        let target = self.with_extension(target);
        let from_dir: Vec<&str> = from
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .split_last()
            .map(|(_, dir)| dir.to_vec())
            .unwrap_or_default();
        let target_parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

        let common = from_dir
            .iter()
            .zip(&target_parts)
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
        parts.extend(&target_parts[common..]);
        let relative = parts.join("/");

        if relative.starts_with('.') {
            relative
        } else {
            format!("./{relative}")
        }
    }

    /// Specifier from the file `from` to the generated file `target`: through
    /// the alias root when one is configured, relative otherwise.
    pub fn module_path(&self, target: &str, from: &str) -> String {
        if self.alias_root.is_some() {
            self.create_bare_module_path(target, true)
        } else {
            self.create_relative_path(target, from)
        }
    }

    /// Specifier for a package import. Package names are returned unchanged;
    /// a file path gets the import extension and the alias root.
    pub fn create_bare_module_path(&self, path: &str, is_file: bool) -> String {
        if !is_file {
            return path.to_string();
        }
        let path = self.with_extension(path);
        match &self.alias_root {
            Some(root) => format!("{}/{}", root, path.trim_start_matches('/')),
            None => path,
        }
    }

    fn with_extension(&self, path: &str) -> String {
        let stem = path.strip_suffix(SOURCE_EXTENSION).unwrap_or(path);
        if self.extension.is_empty() || stem.ends_with(&self.extension) {
            stem.to_string()
        } else {
            format!("{}{}", stem, self.extension)
        }
    }
}

/// `com.example.Foo` -> `com/example/Foo`
pub fn entity_path(qualified_name: &str) -> String {
    qualified_name.replace('.', "/")
}

/// Generated file holding the entity `qualified_name`.
pub fn entity_file(qualified_name: &str) -> String {
    format!("{}{}", entity_path(qualified_name), SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_between_siblings() {
        let paths = PathManager::default();
        assert_eq!(
            paths.create_relative_path("Sibling.ts", "FooEndpoint.ts"),
            "./Sibling.js"
        );
        assert_eq!(
            paths.create_relative_path("com/example/Bar", "com/example/Foo.ts"),
            "./Bar.js"
        );
    }

    #[test]
    fn test_relative_path_across_directories() {
        let paths = PathManager::default();
        assert_eq!(
            paths.create_relative_path("com/example/Foo.ts", "FooEndpoint.ts"),
            "./com/example/Foo.js"
        );
        assert_eq!(
            paths.create_relative_path("com/other/Baz", "com/example/Foo.ts"),
            "../other/Baz.js"
        );
        assert_eq!(
            paths.create_relative_path("connect-client.default.ts", "com/example/Foo.ts"),
            "../../connect-client.default.js"
        );
    }

    #[test]
    fn test_empty_extension() {
        let paths = PathManager::new("", None);
        assert_eq!(paths.create_relative_path("Bar.ts", "Foo.ts"), "./Bar");
    }

    #[test]
    fn test_bare_module_path() {
        let paths = PathManager::new(".js", Some("Frontend/generated/".into()));
        assert_eq!(
            paths.create_bare_module_path("@vaadin/hilla-frontend", false),
            "@vaadin/hilla-frontend"
        );
        assert_eq!(
            paths.create_bare_module_path("com/example/Foo", true),
            "Frontend/generated/com/example/Foo.js"
        );
    }

    #[test]
    fn test_module_path_prefers_alias_root() {
        let relative = PathManager::default();
        assert_eq!(
            relative.module_path("com/example/Foo.ts", "com/example/Bar.ts"),
            "./Foo.js"
        );

        let aliased = PathManager::new(".js", Some("Frontend/generated".into()));
        assert_eq!(
            aliased.module_path("com/example/Foo.ts", "com/example/Bar.ts"),
            "Frontend/generated/com/example/Foo.js"
        );
    }

    #[test]
    fn test_entity_path() {
        assert_eq!(entity_path("com.example.Foo"), "com/example/Foo");
        assert_eq!(entity_file("Foo"), "Foo.ts");
    }
}
