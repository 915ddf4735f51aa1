//! Python language extractor
//!
//! Extracts functions, classes, imports, module-level bindings and
//! string-literal statements from Python source files using tree-sitter.

use crate::model::{
    ClassRecord, CodeModel, CommentRecord, FunctionRecord, ImportRecord, ImportedName, Language,
    VariableRecord, UNNAMED,
};
use super::framework::{ExtractContext, LanguageExtractor};
use super::text::{clean_docstring, first_statement, line_of, named_children_skipping_comments, python_string_value};
use tree_sitter::Node;

/// Python language extractor
#[derive(Debug, Default)]
pub struct PythonExtractor;

impl PythonExtractor {
    /// Create a new Python extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract function definition
    fn extract_function(&self, node: Node, ctx: &ExtractContext<'_>) -> FunctionRecord {
        let name = ctx.field_text(node, "name").unwrap_or_default();
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.parameter_names(p, ctx))
            .unwrap_or_default();

        FunctionRecord::new(name, parameters, line_of(node))
            .with_return_type(ctx.field_text(node, "return_type"))
            .with_docstring(self.extract_docstring(node, ctx))
    }

    /// Parameter names in declaration order; separators are skipped
    fn parameter_names(&self, params: Node, ctx: &ExtractContext<'_>) -> Vec<String> {
        named_children_skipping_comments(params)
            .into_iter()
            .filter_map(|param| match param.kind() {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" | "tuple_pattern" => {
                    Some(ctx.text(param).to_string())
                }
                "default_parameter" | "typed_default_parameter" => ctx.field_text(param, "name"),
                // name is the first named child, the annotation sits in `type`
                "typed_parameter" => param.named_child(0).map(|n| ctx.text(n).to_string()),
                _ => None,
            })
            .collect()
    }

    /// Extract class definition
    fn extract_class(&self, node: Node, ctx: &ExtractContext<'_>) -> ClassRecord {
        let name = ctx
            .field_text(node, "name")
            .unwrap_or_else(|| UNNAMED.to_string());

        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| {
                named_children_skipping_comments(args)
                    .into_iter()
                    .filter(|arg| arg.kind() != "keyword_argument")
                    .map(|arg| ctx.text(arg).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let methods = node
            .child_by_field_name("body")
            .map(|body| {
                named_children_skipping_comments(body)
                    .into_iter()
                    .filter_map(|member| self.method_definition(member))
                    .map(|def| self.extract_function(def, ctx))
                    .collect()
            })
            .unwrap_or_default();

        ClassRecord {
            name,
            bases,
            docstring: self.extract_docstring(node, ctx),
            methods,
            line: line_of(node),
        }
    }

    /// The function node behind a class body member, if it is one
    fn method_definition<'t>(&self, member: Node<'t>) -> Option<Node<'t>> {
        match member.kind() {
            "function_definition" => Some(member),
            "decorated_definition" => member
                .child_by_field_name("definition")
                .filter(|def| def.kind() == "function_definition"),
            _ => None,
        }
    }

    /// Extract docstring from the first statement of a definition's body
    fn extract_docstring(&self, node: Node, ctx: &ExtractContext<'_>) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let first_stmt = first_statement(body)?;
        if first_stmt.kind() != "expression_statement" {
            return None;
        }
        let raw = self.string_statement(first_stmt, ctx)?;
        Some(clean_docstring(&raw))
    }

    /// Value of an expression statement that is only a string literal
    fn string_statement(&self, stmt: Node, ctx: &ExtractContext<'_>) -> Option<String> {
        let children = named_children_skipping_comments(stmt);
        let [expr] = children.as_slice() else {
            return None;
        };
        let source = ctx.tree.source();
        match expr.kind() {
            "string" => Some(python_string_value(*expr, source)),
            "concatenated_string" => Some(
                named_children_skipping_comments(*expr)
                    .into_iter()
                    .filter(|part| part.kind() == "string")
                    .map(|part| python_string_value(part, source))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// `import a.b as c, d` - one record per imported name
    fn extract_import(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let (module, alias) = self.aliased(name, ctx);
            model.push_import(ImportRecord {
                module,
                names: Vec::new(),
                alias,
                line: line_of(node),
            });
        }
    }

    /// `from m import x as y, z` - one record pairing the module with its names
    fn extract_from_import(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        let module = if node.kind() == "future_import_statement" {
            "__future__".to_string()
        } else {
            ctx.field_text(node, "module_name").unwrap_or_default()
        };

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "wildcard_import" {
                names.push(ImportedName::new("*", None));
            }
        }
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (name, alias) = self.aliased(name, ctx);
            names.push(ImportedName::new(name, alias));
        }

        model.push_import(ImportRecord {
            module,
            names,
            alias: None,
            line: line_of(node),
        });
    }

    /// Split an `aliased_import` into name and alias
    fn aliased(&self, node: Node, ctx: &ExtractContext<'_>) -> (String, Option<String>) {
        if node.kind() == "aliased_import" {
            (
                ctx.field_text(node, "name").unwrap_or_default(),
                ctx.field_text(node, "alias"),
            )
        } else {
            (ctx.text(node).to_string(), None)
        }
    }

    fn extract_expression_statement(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        if let Some(text) = self.string_statement(node, ctx) {
            model.push_comment(CommentRecord {
                text,
                line: line_of(node),
            });
            return;
        }

        let at_module_level = node.parent().is_some_and(|p| p.kind() == "module");
        if !at_module_level {
            return;
        }
        if let Some(assignment) = first_statement(node).filter(|n| n.kind() == "assignment") {
            self.extract_assignment(assignment, ctx, model);
        }
    }

    /// `a = b = value` binds every identifier target to the innermost value
    fn extract_assignment(&self, assignment: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        let mut targets = Vec::new();
        let mut current = assignment;
        let value = loop {
            targets.push((current.child_by_field_name("left"), ctx.field_text(current, "type")));
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                right => break right,
            }
        };

        // annotation-only statements bind nothing
        let Some(value) = value else {
            return;
        };
        let snapshot = ctx.snapshot(value);

        for (left, annotation) in targets {
            let Some(left) = left.filter(|l| l.kind() == "identifier") else {
                continue;
            };
            model.push_variable(VariableRecord {
                name: ctx.text(left).to_string(),
                value: Some(snapshot.clone()),
                annotation,
                line: line_of(left),
            });
        }
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extensions(&self) -> &[&str] {
        &["py", "pyi"]
    }

    fn visit(&self, node: Node<'_>, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        match node.kind() {
            "function_definition" => model.push_function(self.extract_function(node, ctx)),
            "class_definition" => model.push_class(self.extract_class(node, ctx)),
            "import_statement" => self.extract_import(node, ctx, model),
            "import_from_statement" | "future_import_statement" => {
                self.extract_from_import(node, ctx, model)
            }
            "expression_statement" => self.extract_expression_statement(node, ctx, model),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ExtractOptions, ExtractionEngine};

    fn extract(source: &str) -> CodeModel {
        let engine = ExtractionEngine::new(ExtractOptions::default()).expect("engine");
        engine
            .extract_source("test.py", Language::Python, source)
            .expect("Failed to parse")
    }

    #[test]
    fn test_simple_function() {
        let model = extract("def f(a, b): pass\n");

        assert_eq!(model.functions().len(), 1);
        let f = &model.functions()[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.parameters, vec!["a", "b"]);
        assert_eq!(f.return_type, None);
        assert_eq!(f.docstring, None);
        assert_eq!(f.line, 1);
    }

    #[test]
    fn test_parameter_kinds_and_return_type() {
        let source = r#"
def g(self, x: int, y=2, *args, z: str = "", **kw) -> bool:
    return True

def h(a, /, b, *, c):
    pass
"#;
        let model = extract(source);
        let g = &model.functions()[0];
        assert_eq!(g.parameters, vec!["self", "x", "y", "*args", "z", "**kw"]);
        assert_eq!(g.return_type.as_deref(), Some("bool"));

        let h = &model.functions()[1];
        assert_eq!(h.parameters, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_docstrings_are_cleaned() {
        let source = r#"
def hello(name: str) -> str:
    """Say hello to someone.

    Returns a greeting.
    """
    return f"Hello, {name}!"
"#;
        let model = extract(source);
        assert_eq!(
            model.functions()[0].docstring.as_deref(),
            Some("Say hello to someone.\n\nReturns a greeting.")
        );
    }

    #[test]
    fn test_docstring_with_non_breaking_space_indent() {
        let source = "def f():\n    \"\"\"Doc.\n  two\n \u{00a0}nbsp\n    \"\"\"\n    return 1\n";
        let model = extract(source);
        assert_eq!(model.functions()[0].docstring.as_deref(), Some("Doc.\ntwo\nnbsp"));
    }

    #[test]
    fn test_nested_functions_are_independent_records() {
        let source = r#"
def outer():
    def inner(x):
        return x
    return inner

async def fetch(url):
    pass
"#;
        let model = extract(source);
        assert_eq!(model.function_names(), vec!["outer", "inner", "fetch"]);
    }

    #[test]
    fn test_class_methods_are_direct_function_children() {
        let source = r#"
class Outer(Base, metaclass=Meta):
    """Outer doc."""
    label = "x"

    def first(self):
        pass

    class Inner:
        def hidden(self):
            pass

    @property
    def second(self):
        return 1
"#;
        let model = extract(source);
        let classes = model.classes();
        assert_eq!(classes.len(), 2);

        let outer = &classes[0];
        assert_eq!(outer.name, "Outer");
        assert_eq!(outer.bases, vec!["Base"]);
        assert_eq!(outer.docstring.as_deref(), Some("Outer doc."));
        let methods: Vec<&str> = outer.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["first", "second"]);

        let inner = &classes[1];
        assert_eq!(inner.name, "Inner");
        assert_eq!(inner.methods.len(), 1);

        assert_eq!(model.function_names(), vec!["first", "hidden", "second"]);
    }

    #[test]
    fn test_imports_keep_order_and_duplicates() {
        let model = extract("import a; import b\nimport a\n");
        assert_eq!(model.import_modules(), vec!["a", "b", "a"]);
        assert!(model.imports().iter().all(|i| i.names.is_empty()));
    }

    #[test]
    fn test_import_forms() {
        let source = r#"
import os.path as osp, sys
from ..pkg import x as y, z
from m import *
from __future__ import annotations
"#;
        let model = extract(source);
        let imports = model.imports();
        assert_eq!(imports.len(), 5);

        assert_eq!(imports[0].module, "os.path");
        assert_eq!(imports[0].alias.as_deref(), Some("osp"));
        assert_eq!(imports[1].module, "sys");

        assert_eq!(imports[2].module, "..pkg");
        assert_eq!(
            imports[2].names,
            vec![
                ImportedName::new("x", Some("y".to_string())),
                ImportedName::new("z", None),
            ]
        );

        assert_eq!(imports[3].module, "m");
        assert_eq!(imports[3].names, vec![ImportedName::new("*", None)]);

        assert_eq!(imports[4].module, "__future__");
        assert_eq!(imports[4].names[0].name, "annotations");
    }

    #[test]
    fn test_module_level_variables_only() {
        let source = r#"
x = 1
a = b = [1, 2]
obj.attr = 3
items[0] = 4
p, q = 1, 2
n: int = 5
count += 1
declared: str

def f():
    inner = 1
"#;
        let model = extract(source);
        let vars: Vec<(&str, Option<&str>)> = model
            .variables()
            .iter()
            .map(|v| (v.name.as_str(), v.value.as_deref()))
            .collect();
        assert_eq!(
            vars,
            vec![
                ("x", Some("1")),
                ("a", Some("[1, 2]")),
                ("b", Some("[1, 2]")),
                ("n", Some("5")),
            ]
        );
        assert_eq!(model.variables()[3].annotation.as_deref(), Some("int"));
    }

    #[test]
    fn test_string_statements_become_comments() {
        let source = r#"
"""Module docstring."""

def f():
    """Function docstring."""
    return 1

"standalone" "note"
value = "not a comment"
"#;
        let model = extract(source);
        let texts: Vec<&str> = model.comments().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Module docstring.", "Function docstring.", "standalonenote"]);
        assert_eq!(model.comments()[0].line, 2);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = r#"
import json
from os import path

CONFIG = {"debug": True}

class Service:
    def run(self, job):
        return job

def main(argv):
    """Entry."""
    Service().run(argv)
"#;
        let first = extract(source);
        let second = extract(source);
        assert_eq!(first, second);
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }
}
