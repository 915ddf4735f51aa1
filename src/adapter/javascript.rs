//! JavaScript language extractor
//!
//! Extracts functions (declarations, expressions, arrows, methods), classes,
//! ES module imports, `require` calls and top-level bindings from JavaScript
//! source files.

use crate::model::{
    ClassRecord, CodeModel, FunctionRecord, ImportRecord, ImportedName, Language, VariableRecord,
    UNNAMED,
};
use super::framework::{ExtractContext, LanguageExtractor};
use super::text::{clean_jsdoc, first_statement, js_string_value, line_of, named_children_skipping_comments};
use tree_sitter::Node;

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "function",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Wrappers looked through when searching for a leading doc comment
const DOC_ANCHORS: &[&str] = &[
    "export_statement",
    "variable_declarator",
    "lexical_declaration",
    "variable_declaration",
];

/// JavaScript language extractor
#[derive(Debug, Default)]
pub struct JavaScriptExtractor;

impl JavaScriptExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Any function-like node; anonymous ones get the sentinel name
    fn extract_function(&self, node: Node, ctx: &ExtractContext<'_>) -> FunctionRecord {
        let name = ctx.field_text(node, "name").unwrap_or_default();
        FunctionRecord::new(name, self.parameter_names(node, ctx), line_of(node))
            .with_docstring(self.leading_jsdoc(node, ctx))
    }

    fn parameter_names(&self, node: Node, ctx: &ExtractContext<'_>) -> Vec<String> {
        // `x => x * 2`
        if let Some(single) = node.child_by_field_name("parameter") {
            return vec![ctx.text(single).to_string()];
        }
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };

        named_children_skipping_comments(params)
            .into_iter()
            .filter_map(|param| match param.kind() {
                "identifier" | "rest_pattern" | "object_pattern" | "array_pattern" => {
                    Some(ctx.text(param).to_string())
                }
                "assignment_pattern" => ctx.field_text(param, "left"),
                _ => None,
            })
            .collect()
    }

    /// `/** ... */` comment directly before the declaration
    fn leading_jsdoc(&self, node: Node, ctx: &ExtractContext<'_>) -> Option<String> {
        let mut anchor = node;
        while let Some(parent) = anchor.parent() {
            if !DOC_ANCHORS.contains(&parent.kind()) {
                break;
            }
            anchor = parent;
        }

        let prev = anchor.prev_sibling()?;
        if prev.kind() != "comment" {
            return None;
        }
        clean_jsdoc(ctx.text(prev))
    }

    fn extract_class(&self, node: Node, ctx: &ExtractContext<'_>) -> ClassRecord {
        let name = ctx
            .field_text(node, "name")
            .unwrap_or_else(|| UNNAMED.to_string());

        let mut cursor = node.walk();
        let bases = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "class_heritage")
            .filter_map(|heritage| heritage.named_child(0))
            .map(|base| ctx.text(base).to_string())
            .collect();

        let methods = node
            .child_by_field_name("body")
            .map(|body| {
                named_children_skipping_comments(body)
                    .into_iter()
                    .filter(|member| member.kind() == "method_definition")
                    .map(|method| self.extract_function(method, ctx))
                    .collect()
            })
            .unwrap_or_default();

        ClassRecord {
            name,
            bases,
            docstring: self.leading_jsdoc(node, ctx),
            methods,
            line: line_of(node),
        }
    }

    /// `import def, { a as b } from "m"`, `import * as ns from "m"`, `import "m"`.
    /// The default binding is listed by its local name.
    fn extract_import(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let module = js_string_value(source, ctx.tree.source());

        let mut names = Vec::new();
        let mut cursor = node.walk();
        let clauses: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "import_clause")
            .collect();

        for clause in clauses {
            for binding in named_children_skipping_comments(clause) {
                match binding.kind() {
                    "identifier" => {
                        names.push(ImportedName::new(ctx.text(binding), None));
                    }
                    "namespace_import" => {
                        let alias = binding.named_child(0).map(|id| ctx.text(id).to_string());
                        names.push(ImportedName::new("*", alias));
                    }
                    "named_imports" => {
                        for specifier in named_children_skipping_comments(binding) {
                            if specifier.kind() != "import_specifier" {
                                continue;
                            }
                            let name = specifier
                                .child_by_field_name("name")
                                .map(|n| self.export_name(n, ctx))
                                .unwrap_or_default();
                            names.push(ImportedName::new(name, ctx.field_text(specifier, "alias")));
                        }
                    }
                    _ => {}
                }
            }
        }

        model.push_import(ImportRecord {
            module,
            names,
            alias: None,
            line: line_of(node),
        });
    }

    /// Export names may be identifiers or string literals
    fn export_name(&self, node: Node, ctx: &ExtractContext<'_>) -> String {
        if node.kind() == "string" {
            js_string_value(node, ctx.tree.source())
        } else {
            ctx.text(node).to_string()
        }
    }

    /// `require("m")` with a plain string argument
    fn extract_require(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        let is_require = node
            .child_by_field_name("function")
            .is_some_and(|callee| callee.kind() == "identifier" && ctx.text(callee) == "require");
        if !is_require {
            return;
        }
        let Some(args) = node.child_by_field_name("arguments") else {
            return;
        };
        let args = named_children_skipping_comments(args);
        let [arg] = args.as_slice() else {
            return;
        };
        if arg.kind() != "string" {
            return;
        }

        let alias = node
            .parent()
            .filter(|p| p.kind() == "variable_declarator")
            .and_then(|p| p.child_by_field_name("name"))
            .filter(|n| n.kind() == "identifier")
            .map(|n| ctx.text(n).to_string());

        model.push_import(ImportRecord {
            module: js_string_value(*arg, ctx.tree.source()),
            names: Vec::new(),
            alias,
            line: line_of(node),
        });
    }

    /// Directly in the program, or in a top-level `export`
    fn is_top_level(&self, node: Node) -> bool {
        match node.parent() {
            Some(parent) if parent.kind() == "program" => true,
            Some(parent) if parent.kind() == "export_statement" => {
                parent.parent().is_some_and(|p| p.kind() == "program")
            }
            _ => false,
        }
    }

    /// `const a = 1, b;` - destructuring declarators are skipped
    fn extract_declaration(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        if !self.is_top_level(node) {
            return;
        }
        for declarator in named_children_skipping_comments(node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
            else {
                continue;
            };
            model.push_variable(VariableRecord {
                name: ctx.text(name).to_string(),
                value: declarator.child_by_field_name("value").map(|v| ctx.snapshot(v)),
                annotation: None,
                line: line_of(declarator),
            });
        }
    }

    /// Top-level `name = value;`
    fn extract_assignment(&self, node: Node, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        if !node.parent().is_some_and(|p| p.kind() == "program") {
            return;
        }
        let Some(assignment) = first_statement(node).filter(|n| n.kind() == "assignment_expression") else {
            return;
        };
        let Some(left) = assignment
            .child_by_field_name("left")
            .filter(|l| l.kind() == "identifier")
        else {
            return;
        };
        model.push_variable(VariableRecord {
            name: ctx.text(left).to_string(),
            value: assignment.child_by_field_name("right").map(|v| ctx.snapshot(v)),
            annotation: None,
            line: line_of(node),
        });
    }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn file_extensions(&self) -> &[&str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn visit(&self, node: Node<'_>, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
        // keywords share their kind names with some node kinds ("function", "class")
        if !node.is_named() {
            return;
        }
        match node.kind() {
            kind if FUNCTION_KINDS.contains(&kind) => model.push_function(self.extract_function(node, ctx)),
            "class_declaration" | "class" => model.push_class(self.extract_class(node, ctx)),
            "import_statement" => self.extract_import(node, ctx, model),
            "call_expression" => self.extract_require(node, ctx, model),
            "lexical_declaration" | "variable_declaration" => self.extract_declaration(node, ctx, model),
            "expression_statement" => self.extract_assignment(node, ctx, model),
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
            .extract_source("app.js", Language::JavaScript, source)
            .expect("Failed to parse")
    }

    #[test]
    fn test_arrow_functions_use_sentinel_name() {
        let source = r#"
const add = (a, b) => a + b;
const noop = () => {};
const square = x => x * x;
"#;
        let model = extract(source);
        let fns = model.functions();
        assert_eq!(fns.len(), 3);
        assert!(fns.iter().all(|f| f.name == UNNAMED));
        assert_eq!(fns[0].parameters, vec!["a", "b"]);
        assert!(fns[1].parameters.is_empty());
        assert_eq!(fns[2].parameters, vec!["x"]);
        assert!(fns.iter().all(|f| f.return_type.is_none()));
    }

    #[test]
    fn test_function_declaration_with_jsdoc() {
        let source = r#"
/**
 * Greets someone.
 */
export function greet(name, greeting = "hi", { loud }, ...rest) {
    console.log(greeting + " " + name);
}

// plain comment
function helper() {}
"#;
        let model = extract(source);
        let greet = &model.functions()[0];
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.parameters, vec!["name", "greeting", "{ loud }", "...rest"]);
        assert_eq!(greet.docstring.as_deref(), Some("Greets someone."));

        let helper = &model.functions()[1];
        assert_eq!(helper.name, "helper");
        assert!(helper.docstring.is_none());
    }

    #[test]
    fn test_function_expressions() {
        let source = r#"
setTimeout(function () {}, 10);
const named = function inner(a) { return a; };
function* gen() { yield 1; }
"#;
        let model = extract(source);
        assert_eq!(model.function_names(), vec![UNNAMED, "inner", "gen"]);
    }

    #[test]
    fn test_class_methods_are_direct_children() {
        let source = r#"
/** A dog. */
class Dog extends Animal {
    name = "rex";

    constructor(name) {
        super(name);
    }

    bark(times) {
        return "woof".repeat(times);
    }

    static helper = () => 1;
}
"#;
        let model = extract(source);
        let classes = model.classes();
        assert_eq!(classes.len(), 1);

        let dog = &classes[0];
        assert_eq!(dog.name, "Dog");
        assert_eq!(dog.bases, vec!["Animal"]);
        assert_eq!(dog.docstring.as_deref(), Some("A dog."));
        let methods: Vec<&str> = dog.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "bark"]);
        assert_eq!(dog.methods[1].parameters, vec!["times"]);

        assert_eq!(model.function_names(), vec!["constructor", "bark", UNNAMED]);
    }

    #[test]
    fn test_imports_in_declaration_order() {
        let source = r#"
import React, { useState as useS, useEffect } from "react";
import * as path from "path";
import "./side.css";
const fs = require("fs");
import React2 from "react";
"#;
        let model = extract(source);
        assert_eq!(
            model.import_modules(),
            vec!["react", "path", "./side.css", "fs", "react"]
        );

        let react = &model.imports()[0];
        assert_eq!(
            react.names,
            vec![
                ImportedName::new("React", None),
                ImportedName::new("useState", Some("useS".to_string())),
                ImportedName::new("useEffect", None),
            ]
        );
        assert_eq!(
            model.imports()[1].names,
            vec![ImportedName::new("*", Some("path".to_string()))]
        );
        assert!(model.imports()[2].names.is_empty());
        assert_eq!(model.imports()[3].alias.as_deref(), Some("fs"));
    }

    #[test]
    fn test_top_level_variables() {
        let source = r#"
let x = 1, y;
var w = "s";
export const e = 2;
counter = 5;
const { a, b } = obj;
window.title = "t";
function f() { const inner = 1; }
for (var i = 0; i < 3; i++) {}
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
                ("y", None),
                ("w", Some("\"s\"")),
                ("e", Some("2")),
                ("counter", Some("5")),
            ]
        );
    }

    #[test]
    fn test_document_has_no_comments_section() {
        let model = extract("\"use strict\";\nconst a = 1;\n");
        let json = serde_json::to_value(&model).unwrap();
        assert!(json.get("comments").is_none());
        assert!(json.get("classes").is_some());
        assert_eq!(json["language"], "javascript");
        assert_eq!(json["file"], "app.js");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = r#"
import { a } from "./a.js";
export class Store { get(key) { return this.map[key]; } }
export default (x) => x;
"#;
        assert_eq!(extract(source), extract(source));
    }
}
