//! Resolve names during matching and inlining.

use std::collections::BTreeSet;

use thiserror::Error;

use stencil_syntax::*;

/// How an external class should be written where it is used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassReference {
    pub expr: Expr,

    /// An import that the reference needs, if any.
    pub import: Option<Path>,
}

/// An external class that can't be referred to in the current context.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("can't resolve class `{0}`")]
pub struct Unresolved(pub Path);

/// Name and type lookup services for the program being matched.
pub trait Resolver {
    /// Do a name in a template and a name in a target
    /// refer to the same declared entity?
    fn same_entity(&self, template: &Symbol, target: &Symbol) -> bool {
        template == target
    }

    /// Does `expr` refer to the external class `path`?
    fn denotes_class(&self, expr: &Expr, path: &Path) -> bool;

    /// Find a way to refer to the external class `path`.
    fn class_reference(&self, path: &Path) -> Result<ClassReference, Unresolved>;

    /// A view that can be used and discarded without
    /// affecting this one.
    fn nested(&self) -> Box<dyn Resolver + '_>;
}

/// What to do with a class reference that isn't imported.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImportPolicy {
    /// Refuse to refer to it.
    ImportedOnly,

    /// Spell out its full name.
    FullyQualify,

    /// Use its simple name and ask for an import.
    #[default]
    AddImport,
}

/// A resolver that knows only the classes imported into a
/// compilation unit.
#[derive(Clone, Debug, Default)]
pub struct Imports {
    imported: BTreeSet<Path>,
    policy: ImportPolicy,
}

impl Imports {
    pub fn new(policy: ImportPolicy) -> Self {
        Self {
            imported: BTreeSet::new(),
            policy,
        }
    }

    pub fn with_import(mut self, path: impl Into<Path>) -> Self {
        self.import(path.into());
        self
    }

    pub fn import(&mut self, path: Path) {
        self.imported.insert(path);
    }

    pub fn is_imported(&self, path: &Path) -> bool {
        self.imported.contains(path)
    }

    pub fn policy(&self) -> ImportPolicy {
        self.policy
    }

    /// Does some other imported class have the same simple name?
    fn shadowed(&self, path: &Path) -> bool {
        self.imported
            .iter()
            .any(|p| p != path && p.simple_name() == path.simple_name())
    }
}

/// `a.b.C` as a chain of field accesses.
pub fn qualified(path: &Path) -> Option<Expr> {
    let (first, rest) = path.segments().split_first()?;
    Some(rest.iter().fold(Expr::Name(first.clone()), |e, s| {
        Expr::field(e, s.clone())
    }))
}

fn simple(path: &Path) -> Option<Expr> {
    path.simple_name().cloned().map(Expr::Name)
}

impl Resolver for Imports {
    fn denotes_class(&self, expr: &Expr, path: &Path) -> bool {
        Some(expr) == qualified(path).as_ref()
            || (self.is_imported(path) && Some(expr) == simple(path).as_ref())
    }

    fn class_reference(&self, path: &Path) -> Result<ClassReference, Unresolved> {
        let unresolved = || Unresolved(path.clone());
        let expr = if self.is_imported(path) {
            simple(path)
        } else {
            match self.policy {
                ImportPolicy::ImportedOnly => None,
                ImportPolicy::FullyQualify => qualified(path),
                ImportPolicy::AddImport if self.shadowed(path) => qualified(path),
                ImportPolicy::AddImport => {
                    let expr = simple(path).ok_or_else(unresolved)?;
                    return Ok(ClassReference {
                        expr,
                        import: Some(path.clone()),
                    });
                }
            }
        };
        Ok(ClassReference {
            expr: expr.ok_or_else(unresolved)?,
            import: None,
        })
    }

    fn nested(&self) -> Box<dyn Resolver + '_> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn objects() -> Path {
        Path::from("java.util.Objects")
    }

    #[test]
    fn denotes() {
        let qualified = Expr::field(Expr::field(name!(java), "util"), "Objects");
        let imports = Imports::default();
        assert!(imports.denotes_class(&qualified, &objects()));
        assert!(!imports.denotes_class(&name!(Objects), &objects()));

        let imports = imports.with_import("java.util.Objects");
        assert!(imports.denotes_class(&qualified, &objects()));
        assert!(imports.denotes_class(&name!(Objects), &objects()));
        assert!(!imports.denotes_class(&name!(Arrays), &objects()));
    }

    #[test]
    fn policies() {
        let simple = ClassReference {
            expr: name!(Objects),
            import: None,
        };
        let imported = Imports::new(ImportPolicy::ImportedOnly).with_import("java.util.Objects");
        assert_eq!(imported.class_reference(&objects()), Ok(simple.clone()));

        assert_eq!(
            Imports::new(ImportPolicy::ImportedOnly).class_reference(&objects()),
            Err(Unresolved(objects()))
        );
        assert_eq!(
            Imports::new(ImportPolicy::FullyQualify)
                .class_reference(&objects())
                .map(|r| r.expr.to_string()),
            Ok(String::from("java.util.Objects"))
        );
        assert_eq!(
            Imports::new(ImportPolicy::AddImport).class_reference(&objects()),
            Ok(ClassReference {
                import: Some(objects()),
                ..simple
            })
        );
        assert_eq!(
            Imports::new(ImportPolicy::AddImport)
                .with_import("com.example.Objects")
                .class_reference(&objects())
                .map(|r| (r.expr.to_string(), r.import)),
            Ok((String::from("java.util.Objects"), None)),
            "shadowed by another import"
        );
    }

    #[test]
    fn nested() {
        let imports = Imports::new(ImportPolicy::ImportedOnly).with_import("java.util.Objects");
        let nested = imports.nested();
        assert!(nested.class_reference(&objects()).is_ok());
        assert!(nested.same_entity(&sym!(x), &sym!(x)));
        assert!(!nested.same_entity(&sym!(x), &sym!(y)));
    }
}
