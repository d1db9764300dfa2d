//! # Source Emitter
//!
//! A [`GoFile`] accumulates the ordered lines of one generated Go file together with the
//! [`ImportResolver`] scoped to it. [`GoFile::finish`] renders the header, package clause and
//! import block in front of the body and yields an immutable [`EmittedArtifact`].
//!
//! Lines are pushed unindented. Rendering indents them with tabs according to their
//! brace and parenthesis balance, collapses runs of blank lines and drops trailing ones,
//! the same layout `gofmt` would produce for this code (minus column alignment).
use crate::{
    error::GenerateError,
    goident::{GoIdent, GoPackage},
    resolver::ImportResolver,
};
use prost_types::compiler::code_generator_response;

pub const GENERATED_BY: &str = "protoc-gen-go-apiclienttwirp";

/// A named generated file and its complete content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedArtifact {
    pub name: String,
    pub content: String,
}

impl From<EmittedArtifact> for code_generator_response::File {
    fn from(artifact: EmittedArtifact) -> Self {
        code_generator_response::File {
            name: Some(artifact.name),
            content: Some(artifact.content),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub struct GoFile {
    name: String,
    package: GoPackage,
    source: Option<String>,
    resolver: ImportResolver,
    lines: Vec<String>,
}

impl GoFile {
    /// Starts the file `name` belonging to `package`.
    ///
    /// # Arguments
    ///
    /// * `source` - The proto file the content was generated from, if there is exactly one.
    /// * `declared` - Package-level identifiers the file's package declares; imports never take
    ///   these as aliases.
    pub fn new<'a>(
        name: String,
        package: GoPackage,
        source: Option<String>,
        declared: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut reserved = vec![package.name.clone()];
        reserved.extend(declared.into_iter().map(str::to_string));
        let resolver = ImportResolver::new(
            package.import_path.clone(),
            reserved.iter().map(String::as_str),
        );

        Self {
            name,
            package,
            source,
            resolver,
            lines: vec![],
        }
    }

    pub fn resolver(&mut self) -> &mut ImportResolver {
        &mut self.resolver
    }

    /// Shorthand for [`ImportResolver::reference`].
    pub fn ident(&mut self, ident: &GoIdent) -> Result<String, GenerateError> {
        self.resolver.reference(ident)
    }

    /// Appends one line of Go source.
    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn finish(self) -> EmittedArtifact {
        let mut out = String::new();

        out.push_str(&format!("// Code generated by {GENERATED_BY}. DO NOT EDIT.\n"));
        if let Some(source) = &self.source {
            out.push_str(&format!("// source: {source}\n"));
        }
        out.push('\n');
        out.push_str(&format!("package {}\n", self.package.name));

        let imports = self.resolver.imports();
        if !imports.is_empty() {
            out.push_str("\nimport (\n");
            for (alias, path) in imports {
                out.push_str(&format!("\t{alias} \"{path}\"\n"));
            }
            out.push_str(")\n");
        }

        let body = render_body(&self.lines);
        if !body.is_empty() {
            out.push('\n');
            out.push_str(&body);
        }

        EmittedArtifact {
            name: self.name,
            content: out,
        }
    }
}

fn render_body(lines: &[String]) -> String {
    let mut out = String::new();
    let mut depth: usize = 0;
    let mut previous_blank = true;

    for line in lines {
        let line = line.trim();

        if line.is_empty() {
            if !previous_blank {
                out.push('\n');
            }
            previous_blank = true;
            continue;
        }
        previous_blank = false;

        if line.starts_with("//") {
            push_indented(&mut out, depth, line);
            continue;
        }

        let leading_closes = line.chars().take_while(|c| matches!(c, '}' | ')')).count();
        push_indented(&mut out, depth.saturating_sub(leading_closes), line);

        let (opens, closes) = line.chars().fold((0, 0), |(o, c), ch| match ch {
            '{' | '(' => (o + 1, c),
            '}' | ')' => (o, c + 1),
            _ => (o, c),
        });
        depth = (depth + opens).saturating_sub(closes);
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn push_indented(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push_str(line);
    out.push('\n');
}
