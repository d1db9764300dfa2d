//! # Identifier Resolver
//!
//! Turns [`GoIdent`]s into text that is valid inside the Go file being emitted.
//!
//! * Idents of the file's own package render bare (`Greeter`).
//! * Foreign idents render qualified (`zap.Logger`). The qualifier is an import alias
//!   allocated on first use from the package name; when that alias is already taken by
//!   another import path or by an identifier the generated code declares, a numeric
//!   suffix is appended (`v1`, `v11`, `v12`, ...).
//!
//! A resolver is owned by exactly one generated file and dropped with it, so bindings never
//! leak between artifacts.
use crate::{
    error::GenerateError,
    goident::{GoIdent, GoImportPath},
    naming::{GO_KEYWORDS, GO_PREDECLARED},
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Identifiers declared or used as locals by the emitted Go code.
pub const GENERATED_LOCALS: &[&str] = &[
    "address",
    "client",
    "ctx",
    "err",
    "httpClient",
    "logger",
    "p",
    "provider",
    "response",
    "s",
];

#[derive(Debug, Clone)]
struct Binding {
    alias: String,
    package_name: String,
}

#[derive(Debug, Clone)]
pub struct ImportResolver {
    local: GoImportPath,
    bindings: HashMap<GoImportPath, Binding>,
    used: HashSet<String>,
}

impl ImportResolver {
    /// Creates a resolver for a file of the package at `local`.
    ///
    /// `reserved` are package-level identifiers the file declares (type names, functions),
    /// on top of Go keywords, predeclared identifiers and [`GENERATED_LOCALS`].
    pub fn new<'a>(local: GoImportPath, reserved: impl IntoIterator<Item = &'a str>) -> Self {
        let mut used = builtin_names();
        used.extend(reserved.into_iter().map(str::to_string));

        Self {
            local,
            bindings: HashMap::new(),
            used,
        }
    }

    /// Returns the textual reference to `ident` valid in this file.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - `Name` for local idents, `alias.Name` otherwise. The same ident always
    ///   yields the same text.
    /// * `Err(GenerateError::ResolutionConflict)` - If the ident's import path was already bound
    ///   under a different package name.
    pub fn reference(&mut self, ident: &GoIdent) -> Result<String, GenerateError> {
        if ident.package.import_path == self.local {
            return Ok(ident.name.clone());
        }
        let alias = self.bind(&ident.package.import_path, &ident.package.name)?;
        Ok(format!("{alias}.{}", ident.name))
    }

    fn bind(
        &mut self,
        import_path: &GoImportPath,
        package_name: &str,
    ) -> Result<String, GenerateError> {
        if let Some(binding) = self.bindings.get(import_path) {
            if binding.package_name != package_name {
                return Err(GenerateError::ResolutionConflict {
                    import_path: import_path.to_string(),
                    bound: binding.package_name.clone(),
                    requested: package_name.to_string(),
                });
            }
            return Ok(binding.alias.clone());
        }

        let mut alias = package_name.to_string();
        let mut suffix = 1;
        while self.used.contains(&alias) {
            alias = format!("{package_name}{suffix}");
            suffix += 1;
        }

        self.used.insert(alias.clone());
        self.bindings.insert(
            import_path.clone(),
            Binding {
                alias: alias.clone(),
                package_name: package_name.to_string(),
            },
        );
        Ok(alias)
    }

    /// Aliases bound so far. Local variables must not shadow them.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.bindings.values().map(|b| b.alias.as_str())
    }

    /// `(alias, import path)` pairs sorted by import path, ready for the import block.
    pub fn imports(&self) -> Vec<(String, GoImportPath)> {
        self.bindings
            .iter()
            .map(|(path, binding)| (path.clone(), binding.alias.clone()))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .map(|(path, alias)| (alias, path))
            .collect()
    }
}

/// Collision-free local identifiers within one function signature.
#[derive(Debug, Clone)]
pub struct NameScope {
    used: HashSet<String>,
}

impl NameScope {
    /// A scope excluding keywords, predeclared identifiers, generated locals and `reserved`.
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        let mut used = builtin_names();
        used.extend(reserved.into_iter().map(str::to_string));
        Self { used }
    }

    /// A scope that also excludes every import alias bound in `resolver`.
    pub fn for_signature(resolver: &ImportResolver) -> Self {
        Self::new(resolver.aliases())
    }

    /// Claims `name`, appending `_` until it is unused.
    pub fn claim(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        while self.used.contains(&candidate) {
            candidate.push('_');
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

fn builtin_names() -> HashSet<String> {
    GO_KEYWORDS
        .iter()
        .chain(GO_PREDECLARED)
        .chain(GENERATED_LOCALS)
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goident::GoPackage;
    use proptest::prelude::*;

    fn resolver() -> ImportResolver {
        ImportResolver::new(GoImportPath::new("example.com/local"), ["greeter"])
    }

    #[test]
    fn test_local_idents_render_bare() {
        let mut resolver = resolver();
        let ident = GoPackage::from_import_path("example.com/local").ident("Greeter");
        assert_eq!(resolver.reference(&ident).unwrap(), "Greeter");
        assert!(resolver.imports().is_empty());
    }

    #[test]
    fn test_same_package_name_from_two_paths_gets_distinct_aliases() {
        let mut resolver = resolver();
        let first = GoPackage::from_import_path("example.com/foo/v1").ident("Options");
        let second = GoPackage::from_import_path("example.com/bar/v1").ident("Options");

        let first_ref = resolver.reference(&first).unwrap();
        let second_ref = resolver.reference(&second).unwrap();

        assert_eq!(first_ref, "v1.Options");
        assert_eq!(second_ref, "v11.Options");
        assert_eq!(resolver.reference(&first).unwrap(), first_ref);
        assert_eq!(
            resolver.imports(),
            vec![
                ("v11".to_string(), GoImportPath::new("example.com/bar/v1")),
                ("v1".to_string(), GoImportPath::new("example.com/foo/v1")),
            ]
        );
    }

    #[test]
    fn test_reserved_names_are_never_aliases() {
        let mut resolver = resolver();
        let string = GoPackage::from_import_path("example.com/string").ident("Builder");
        let greeter = GoPackage::from_import_path("example.com/greeter").ident("Greeter");
        let ctx = GoPackage::from_import_path("example.com/ctx").ident("Value");

        assert_eq!(resolver.reference(&string).unwrap(), "string1.Builder");
        assert_eq!(resolver.reference(&greeter).unwrap(), "greeter1.Greeter");
        assert_eq!(resolver.reference(&ctx).unwrap(), "ctx1.Value");
    }

    #[test]
    fn test_conflicting_package_names_for_one_path() {
        let mut resolver = resolver();
        let path = GoImportPath::new("example.com/foo");
        resolver
            .reference(&GoPackage::new(path.clone(), "foo").ident("A"))
            .unwrap();

        let err = resolver
            .reference(&GoPackage::new(path, "foopb").ident("B"))
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::ResolutionConflict { ref bound, ref requested, .. }
                if bound == "foo" && requested == "foopb"
        ));
    }

    #[test]
    fn test_name_scope_avoids_aliases_and_duplicates() {
        let mut resolver = resolver();
        resolver
            .reference(&GoPackage::from_import_path("example.com/a").ident("Req"))
            .unwrap();

        let mut scope = NameScope::for_signature(&resolver);
        assert_eq!(scope.claim("a"), "a_");
        assert_eq!(scope.claim("name"), "name");
        assert_eq!(scope.claim("name"), "name_");
        assert_eq!(scope.claim("err"), "err_");
        assert_eq!(scope.claim("type"), "type_");
    }

    proptest! {
        #[test]
        fn prop_references_are_idempotent_and_unambiguous(
            paths in proptest::collection::vec("[a-c]{1,2}/[a-c]{1,2}", 1..12)
        ) {
            let mut resolver = resolver();
            let mut rendered: HashMap<String, String> = HashMap::new();

            for path in &paths {
                let ident = GoPackage::from_import_path(path).ident("Options");
                let text = resolver.reference(&ident).unwrap();
                prop_assert_eq!(&resolver.reference(&ident).unwrap(), &text);

                if let Some(previous) = rendered.insert(text.clone(), path.clone()) {
                    prop_assert_eq!(&previous, path, "'{}' rendered for two paths", text);
                }
            }
        }
    }
}
