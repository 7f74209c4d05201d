//! Rewrite and search whole trees.

use std::thread;

use stencil_engine::*;
use stencil_macro::stencil;
use stencil_syntax::*;

fn objects_equals() -> anyhow::Result<RewriteRule> {
    Ok(RewriteRule::new(
        &[
            stencil!(#a == null ? #b == null : #a.equals(#b)),
            stencil!(#a == null ? #b == null : #b.equals(#a)),
        ],
        &stencil!(@{java.util.Objects}.equals(#a, #b)),
    )?)
}

#[test]
fn rewrite_with_imports() -> anyhow::Result<()> {
    let rule = objects_equals()?;
    let options = MatchOptions::new();

    let target = parse_tree("p == null ? q == null : q.equals(p)")?;
    let rewrite = rule
        .rewrite(&target, &Imports::default(), &options)?
        .expect("a rewrite");
    assert_eq!(rewrite.tree.to_string(), "Objects.equals(p, q)");
    assert_eq!(rewrite.bindings.to_string(), "{#a = p, #b = q}");
    assert_eq!(
        rewrite.imports.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        ["java.util.Objects"]
    );

    let qualified = Imports::new(ImportPolicy::FullyQualify);
    let rewrite = rule.rewrite(&target, &qualified, &options)?.expect("a rewrite");
    assert_eq!(rewrite.tree.to_string(), "java.util.Objects.equals(p, q)");
    assert!(rewrite.imports.is_empty());

    let strict = Imports::new(ImportPolicy::ImportedOnly);
    assert_eq!(rule.rewrite(&target, &strict, &options)?, None);
    Ok(())
}

#[test]
fn rewrite_parenthesizes() -> anyhow::Result<()> {
    let rule = RewriteRule::parse(&["twice(#a)"], "#a * 2")?;
    let target = parse_tree("twice(x + 1)")?;
    let rewrite = rule
        .rewrite(&target, &Imports::default(), &MatchOptions::new())?
        .expect("a rewrite");
    assert_eq!(rewrite.tree.to_string(), "(x + 1) * 2");
    Ok(())
}

#[test]
fn search_and_rewrite() -> anyhow::Result<()> {
    let template = Template::new(&stencil!(#xs.size() == 0))?;
    let rule = RewriteRule::parse(&["#xs.size() == 0"], "#xs.isEmpty()")?;
    let root = parse_tree(
        "{ if (names.size() == 0) return; while (queue.size() == 0) wait(); }",
    )?;
    let imports = Imports::default();
    let options = MatchOptions::new();

    let found = search(&template, &root, &imports, &options)?;
    assert_eq!(found.len(), 2);
    let mut rewritten = Vec::new();
    for f in &found {
        let rewrite = rule
            .rewrite(&f.subtree.to_tree(), &imports, &options)?
            .expect("a rewrite");
        rewritten.push(rewrite.tree.to_string());
    }
    assert_eq!(rewritten, ["names.isEmpty()", "queue.isEmpty()"]);
    Ok(())
}

#[test]
fn cancel_from_another_thread() -> anyhow::Result<()> {
    let template = Template::new(&stencil!(#x))?;
    let root = parse_tree("f(g(1), h(2))")?;
    let cancellation = Cancellation::new();
    let options = MatchOptions::new().with_cancellation(cancellation.clone());
    let imports = Imports::default();
    assert_eq!(search(&template, &root, &imports, &options)?.len(), 5);

    let remote = cancellation.clone();
    thread::spawn(move || remote.cancel())
        .join()
        .expect("no panic");
    assert!(cancellation.is_cancelled());
    assert_eq!(search(&template, &root, &imports, &options), Err(Error::Cancelled));
    assert_eq!(
        template.unify(&root, &imports, &options),
        Err(Error::Cancelled)
    );
    assert_eq!(
        objects_equals()?.rewrite(&root, &imports, &options),
        Err(Error::Cancelled)
    );
    Ok(())
}
