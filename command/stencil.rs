//! Rewrite a program fragment from the command line:
//! read a statement or expression, find every match of a
//! template in it, and print each one rewritten.

use std::env;
use std::fs::read_to_string;
use std::io::{stdin, Read};

use anyhow::{bail, Context as _, Result};
use atty::Stream;

use stencil_engine::{search, Imports, MatchOptions, RewriteRule, Trace};
use stencil_syntax::{parse_tree, Tree};

const USAGE: &str = "usage: stencil [--trace] BEFORE AFTER [FILE]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let trace = if args.first().is_some_and(|a| a == "--trace") {
        args.remove(0);
        Trace::all()
    } else {
        Trace::none()
    };
    let (before, after, filename) = match &args[..] {
        [before, after] => (before, after, None),
        [before, after, filename] => (before, after, Some(filename.as_str())),
        _ => bail!(USAGE),
    };
    let rule = RewriteRule::parse(&[before.as_str()], after)
        .with_context(|| format!("Compiling `{before}` => `{after}`"))?;

    if filename.is_none() && atty::is(Stream::Stdin) && atty::is(Stream::Stdout) {
        println!("Please enter a statement or expression, terminated with Ctrl-D.");
    }
    let input = read_file(filename)?;
    let root = parse_fragment(&input, filename)?;
    let imports = Imports::default();
    let options = MatchOptions::new().with_trace(trace);
    for template in rule.before() {
        for found in search(template, &root, &imports, &options)? {
            let subtree = found.subtree.to_tree();
            if let Some(rewrite) = rule.rewrite(&subtree, &imports, &options)? {
                println!("{subtree} => {}", rewrite.tree);
                for import in &rewrite.imports {
                    println!("    import {import};");
                }
            }
        }
    }
    Ok(())
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: Option<&str>) -> Result<String> {
    match filename {
        None | Some("-") => {
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        Some(filename) => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}

/// Parse a fragment read by [`read_file`].
fn parse_fragment(input: &str, filename: Option<&str>) -> Result<Tree> {
    parse_tree(input).with_context(|| match filename {
        None | Some("-") => String::from("Parsing stdin"),
        Some(filename) => format!("Parsing {filename}"),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_errors_name_their_source() {
        let e = parse_fragment("f(", Some("Main.java")).expect_err("incomplete");
        assert_eq!(e.to_string(), "Parsing Main.java");
        let e = parse_fragment("a ` b", None).expect_err("unlexable");
        assert_eq!(e.to_string(), "Parsing stdin");
        assert!(parse_fragment("f(x);\n", Some("-")).is_ok());
    }
}
