//! Text helpers shared by the generators.

use super::{GenerateError, GeneratedArtifact};
use crate::core::naming::output_variable;
use crate::core::resolved::{EnvMap, EnvValue, ResolvedResource};

/// How placeholder interpolation is spelled in generated TypeScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    /// `pulumi.interpolate` tagged templates
    Pulumi,
    /// Plain template literals inside a CDKTF stack
    Cdktf,
}

/// Double-quoted TypeScript string literal.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `["a", "b"]`
pub(crate) fn string_array(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn template(text: &str, dialect: Dialect) -> String {
    let body = text.replace('`', "\\`");
    match dialect {
        Dialect::Pulumi => format!("pulumi.interpolate`{}`", body),
        Dialect::Cdktf => format!("`{}`", body),
    }
}

/// TypeScript expression for a resolved env value.
pub(crate) fn ts_value(value: &EnvValue, dialect: Dialect) -> String {
    match value {
        EnvValue::Literal(s) => quote(s),
        EnvValue::Interpolation(s) => template(s, dialect),
        EnvValue::Expression(e) => e.clone(),
        EnvValue::SecretKeyRef { name, key } => quote(&format!("{}/{}", name, key)),
    }
}

/// TypeScript expression for `value` followed by a literal suffix.
pub(crate) fn ts_value_with_suffix(value: &EnvValue, suffix: &str, dialect: Dialect) -> String {
    match value {
        EnvValue::Literal(s) => quote(&format!("{}{}", s, suffix)),
        EnvValue::Interpolation(s) => template(&format!("{}{}", s, suffix), dialect),
        EnvValue::Expression(e) => template(&format!("${{{}}}{}", e, suffix), dialect),
        EnvValue::SecretKeyRef { .. } => ts_value(value, dialect),
    }
}

/// `key: value,`
pub(crate) fn field(key: &str, value: impl AsRef<str>) -> String {
    format!("{}: {},", key, value.as_ref())
}

/// Object literal with one field per line. Nested multi-line values are
/// re-indented.
pub(crate) fn object(fields: &[String]) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let body: Vec<String> = fields
        .iter()
        .map(|f| format!("  {}", f.replace('\n', "\n  ")))
        .collect();
    format!("{{\n{}\n}}", body.join("\n"))
}

/// Array literal with one element per line.
pub(crate) fn array(items: &[String]) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    let body: Vec<String> = items
        .iter()
        .map(|i| format!("  {},", i.replace('\n', "\n  ")))
        .collect();
    format!("[\n{}\n]", body.join("\n"))
}

/// `{ "KEY": value }`, the shape function env maps take.
pub(crate) fn env_object(env: &EnvMap, dialect: Dialect) -> String {
    let fields: Vec<String> = env
        .iter()
        .map(|(k, v)| field(&quote(k), ts_value(v, dialect)))
        .collect();
    object(&fields)
}

/// `[{ name: "KEY", value: ... }]`, the shape container env lists take.
pub(crate) fn env_list(env: &EnvMap, dialect: Dialect) -> String {
    let items: Vec<String> = env
        .iter()
        .map(|(k, v)| format!("{{ name: {}, value: {} }}", quote(k), ts_value(v, dialect)))
        .collect();
    array(&items)
}

/// Collects declarations and named outputs for one node.
pub(crate) struct Program {
    dialect: Dialect,
    imports: Vec<String>,
    lines: Vec<String>,
    outputs: Vec<String>,
}

impl Program {
    pub(crate) fn new(dialect: Dialect, imports: &[&str]) -> Self {
        Self {
            dialect,
            imports: imports.iter().map(|s| s.to_string()).collect(),
            lines: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub(crate) fn import(&mut self, line: &str) {
        if !self.imports.iter().any(|i| i == line) {
            self.imports.push(line.to_string());
        }
    }

    pub(crate) fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn construct(&self, class: &str, logical: &str, fields: &[String]) -> String {
        match self.dialect {
            Dialect::Pulumi => format!("new {}({}, {})", class, quote(logical), object(fields)),
            Dialect::Cdktf => format!("new {}(this, {}, {})", class, quote(logical), object(fields)),
        }
    }

    /// `const ident = new Class(...)`
    pub(crate) fn declare(&mut self, ident: &str, class: &str, logical: &str, fields: &[String]) {
        let expr = self.construct(class, logical, fields);
        self.lines.push(format!("const {} = {};", ident, expr));
    }

    /// `new Class(...)` with no binding.
    pub(crate) fn attach(&mut self, class: &str, logical: &str, fields: &[String]) {
        let expr = self.construct(class, logical, fields);
        self.lines.push(format!("{};", expr));
    }

    /// Bind and export `{name}{Field}` so later nodes can interpolate it.
    pub(crate) fn output(&mut self, name: &str, field: &str, expr: &str) {
        let var = output_variable(name, field);
        match self.dialect {
            Dialect::Pulumi => self.lines.push(format!("export const {} = {};", var, expr)),
            Dialect::Cdktf => {
                self.import("import { TerraformOutput } from \"cdktf\";");
                self.lines.push(format!("const {} = {};", var, expr));
                self.lines.push(format!(
                    "new TerraformOutput(this, {}, {{ value: {} }});",
                    quote(&var),
                    var
                ));
            }
        }
        self.outputs.push(var);
    }

    pub(crate) fn finish(self) -> GeneratedArtifact {
        GeneratedArtifact {
            imports: self.imports,
            code: self.lines.join("\n"),
            outputs: self.outputs,
        }
    }
}

/// Error for a node whose config variant does not fit its generator.
pub(crate) fn mismatch(resource: &ResolvedResource, expected: &'static str) -> GenerateError {
    GenerateError::ConfigMismatch {
        id: resource.id.clone(),
        type_tag: resource.resource_type.clone(),
        expected,
        found: resource.config.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }

    #[test]
    fn test_ts_value_dialects() {
        let v = EnvValue::Interpolation("${api_keySecretId}".to_string());
        assert_eq!(ts_value(&v, Dialect::Pulumi), "pulumi.interpolate`${api_keySecretId}`");
        assert_eq!(ts_value(&v, Dialect::Cdktf), "`${api_keySecretId}`");
        let e = EnvValue::Expression("api_service.uri".to_string());
        assert_eq!(ts_value(&e, Dialect::Cdktf), "api_service.uri");
        assert_eq!(ts_value(&EnvValue::Literal("x".into()), Dialect::Pulumi), "\"x\"");
    }

    #[test]
    fn test_suffix() {
        let v = EnvValue::Interpolation("${apiUrl}".to_string());
        assert_eq!(
            ts_value_with_suffix(&v, "/tick", Dialect::Pulumi),
            "pulumi.interpolate`${apiUrl}/tick`"
        );
        let e = EnvValue::Expression("api_service.uri".to_string());
        assert_eq!(
            ts_value_with_suffix(&e, "/", Dialect::Cdktf),
            "`${api_service.uri}/`"
        );
    }

    #[test]
    fn test_env_object() {
        let mut env = EnvMap::new();
        env.insert("B".to_string(), EnvValue::Literal("2".to_string()));
        env.insert("A".to_string(), EnvValue::Expression("x.uri".to_string()));
        let out = env_object(&env, Dialect::Cdktf);
        assert_eq!(out, "{\n  \"B\": \"2\",\n  \"A\": x.uri,\n}");
        assert_eq!(env_object(&EnvMap::new(), Dialect::Cdktf), "{}");
        assert_eq!(
            env_list(&env, Dialect::Cdktf),
            "[\n  { name: \"B\", value: \"2\" },\n  { name: \"A\", value: x.uri },\n]"
        );
    }

    #[test]
    fn test_nested_objects_reindent() {
        let inner = object(&[field("enabled", "true")]);
        let outer = object(&[field("versioning", inner)]);
        assert_eq!(outer, "{\n  versioning: {\n    enabled: true,\n  },\n}");
    }

    #[test]
    fn test_declare_per_dialect() {
        let mut p = Program::new(Dialect::Pulumi, &[]);
        p.declare("files_bucket", "gcp.storage.Bucket", "files", &[field("name", quote("files"))]);
        let mut c = Program::new(Dialect::Cdktf, &[]);
        c.attach("StorageBucket", "files", &[]);
        assert_eq!(
            p.finish().code,
            "const files_bucket = new gcp.storage.Bucket(\"files\", {\n  name: \"files\",\n});"
        );
        assert_eq!(c.finish().code, "new StorageBucket(this, \"files\", {});");
    }

    #[test]
    fn test_program_outputs() {
        let mut p = Program::new(Dialect::Pulumi, &["import * as gcp from \"@pulumi/gcp\";"]);
        p.import("import * as gcp from \"@pulumi/gcp\";");
        p.line("const b = 1;");
        p.output("my-files", "name", "b");
        let a = p.finish();
        assert_eq!(a.imports.len(), 1);
        assert_eq!(a.outputs, vec!["my_filesName"]);
        assert!(a.code.ends_with("export const my_filesName = b;"));
    }
}
