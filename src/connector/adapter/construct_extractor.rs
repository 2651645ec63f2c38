use async_trait::async_trait;
use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::application::ExtractorService;
use crate::domain::{
    ConstructKind, ContentKind, DomainError, ExtractedConstruct, ExtractedImport, Extraction,
    ImportType,
};

/// Constructs below this trimmed length are noise, not logical units.
const MIN_CONSTRUCT_CHARS: usize = 10;

/// Section names fall back to a truncated first line.
const MAX_SECTION_NAME_CHARS: usize = 50;

/// Extracts logical constructs and import references from file content.
///
/// Structured source (Python) is parsed with tree-sitter and walked at
/// declaration granularity: module-level functions and classes, plus
/// class-body methods. Inner functions are part of their enclosing
/// construct's text, never emitted separately. Prose (Markdown) is
/// chunked into heading-to-heading sections of the same record shape.
pub struct ConstructExtractor {
    supported_kinds: Vec<ContentKind>,
}

impl ConstructExtractor {
    pub fn new() -> Self {
        Self {
            supported_kinds: vec![ContentKind::Python, ContentKind::Markdown],
        }
    }

    fn extract_python(&self, content: &str, file_path: &str) -> Result<Extraction, DomainError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| DomainError::internal(format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| DomainError::parse(format!("Failed to parse {}", file_path)))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(DomainError::parse(format!(
                "{} contains syntax errors",
                file_path
            )));
        }

        let mut extraction = Extraction::default();

        for i in 0..root.named_child_count() {
            let Some(child) = root.named_child(i as u32) else {
                continue;
            };
            let definition = unwrap_decorated(child);

            match definition.kind() {
                "function_definition" => {
                    push_construct(
                        &mut extraction.constructs,
                        ConstructKind::Function,
                        child,
                        definition,
                        content,
                    );
                }
                "class_definition" => {
                    push_construct(
                        &mut extraction.constructs,
                        ConstructKind::Class,
                        child,
                        definition,
                        content,
                    );
                    self.extract_methods(definition, content, &mut extraction);
                }
                _ => {}
            }
        }

        collect_imports(root, content, &mut extraction.imports);

        debug!(
            "Extracted {} constructs and {} imports from {}",
            extraction.constructs.len(),
            extraction.imports.len(),
            file_path
        );

        Ok(extraction)
    }

    /// Class-body methods are emitted as their own constructs. Traversal
    /// stops there: a def nested inside a method body stays inside its
    /// method's text.
    fn extract_methods(&self, class_node: Node, content: &str, extraction: &mut Extraction) {
        let Some(body) = class_node.child_by_field_name("body") else {
            return;
        };

        for i in 0..body.named_child_count() {
            let Some(child) = body.named_child(i as u32) else {
                continue;
            };
            let definition = unwrap_decorated(child);
            if definition.kind() == "function_definition" {
                push_construct(
                    &mut extraction.constructs,
                    ConstructKind::Function,
                    child,
                    definition,
                    content,
                );
            }
        }
    }

    fn extract_markdown(&self, content: &str) -> Extraction {
        let mut extraction = Extraction::default();
        let lines: Vec<&str> = content.lines().collect();

        let mut section_start: usize = 0;
        let mut in_fence = false;

        for (idx, line) in lines.iter().enumerate() {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if !in_fence && is_atx_heading(line) && idx > section_start {
                push_section(&mut extraction.constructs, &lines, section_start, idx - 1);
                section_start = idx;
            }
        }
        if !lines.is_empty() {
            push_section(&mut extraction.constructs, &lines, section_start, lines.len() - 1);
        }

        extraction
    }
}

impl Default for ConstructExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractorService for ConstructExtractor {
    async fn extract(
        &self,
        content: &str,
        file_path: &str,
        kind: ContentKind,
    ) -> Result<Extraction, DomainError> {
        match kind {
            ContentKind::Python => self.extract_python(content, file_path),
            ContentKind::Markdown => Ok(self.extract_markdown(content)),
            ContentKind::Unknown => Err(DomainError::parse(format!(
                "Unrecognized content kind for {}",
                file_path
            ))),
        }
    }

    fn supported_kinds(&self) -> Vec<ContentKind> {
        self.supported_kinds.clone()
    }
}

/// A decorated definition wraps the real def; spans and code keep the
/// decorators, names come from the inner definition.
fn unwrap_decorated(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        if let Some(definition) = node.child_by_field_name("definition") {
            return definition;
        }
    }
    node
}

fn push_construct(
    constructs: &mut Vec<ExtractedConstruct>,
    kind: ConstructKind,
    span_node: Node,
    definition: Node,
    content: &str,
) {
    let code = &content[span_node.byte_range()];
    if code.trim().len() < MIN_CONSTRUCT_CHARS {
        return;
    }

    let name = definition
        .child_by_field_name("name")
        .map(|n| content[n.byte_range()].to_string())
        .unwrap_or_else(|| "unnamed".to_string());

    constructs.push(ExtractedConstruct {
        kind,
        name,
        line_start: span_node.start_position().row as u32 + 1,
        line_end: span_node.end_position().row as u32 + 1,
        code: code.to_string(),
    });
}

/// Walk the whole tree for import statements; unlike constructs, an
/// import is a reference wherever it appears.
fn collect_imports(node: Node, content: &str, imports: &mut Vec<ExtractedImport>) {
    match node.kind() {
        "import_statement" => {
            for i in 0..node.named_child_count() {
                let Some(child) = node.named_child(i as u32) else {
                    continue;
                };
                match child.kind() {
                    "dotted_name" => imports.push(ExtractedImport {
                        module_name: content[child.byte_range()].to_string(),
                        import_type: ImportType::Direct,
                    }),
                    "aliased_import" => {
                        if let Some(name) = child.child_by_field_name("name") {
                            imports.push(ExtractedImport {
                                module_name: content[name.byte_range()].to_string(),
                                import_type: ImportType::Direct,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .filter(|n| n.kind() == "dotted_name")
                .map(|n| content[n.byte_range()].to_string());

            // Relative imports (`from . import x`) carry no resolvable
            // module name and are skipped.
            if let Some(module) = module {
                let module_node_id = node
                    .child_by_field_name("module_name")
                    .map(|n| n.id());

                for i in 0..node.named_child_count() {
                    let Some(child) = node.named_child(i as u32) else {
                        continue;
                    };
                    if Some(child.id()) == module_node_id {
                        continue;
                    }
                    let member = match child.kind() {
                        "dotted_name" | "identifier" => {
                            Some(content[child.byte_range()].to_string())
                        }
                        "aliased_import" => child
                            .child_by_field_name("name")
                            .map(|n| content[n.byte_range()].to_string()),
                        _ => None,
                    };
                    if let Some(member) = member {
                        imports.push(ExtractedImport {
                            module_name: format!("{}.{}", module, member),
                            import_type: ImportType::FromImport,
                        });
                    }
                }
            }
        }
        _ => {}
    }

    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i as u32) {
            collect_imports(child, content, imports);
        }
    }
}

/// ATX heading: one to six `#` followed by a space (or nothing).
fn is_atx_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return false;
    }
    matches!(trimmed.chars().nth(hashes), None | Some(' '))
}

fn push_section(
    constructs: &mut Vec<ExtractedConstruct>,
    lines: &[&str],
    start: usize,
    end: usize,
) {
    let code = lines[start..=end].join("\n");
    if code.trim().len() < MIN_CONSTRUCT_CHARS {
        return;
    }

    let name = if is_atx_heading(lines[start]) {
        lines[start].trim_start().trim_start_matches('#').trim().to_string()
    } else {
        // Preamble before the first heading: name it by its first
        // non-empty line, truncated.
        lines[start..=end]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("section")
            .chars()
            .take(MAX_SECTION_NAME_CHARS)
            .collect()
    };

    constructs.push(ExtractedConstruct {
        kind: ConstructKind::Section,
        name,
        line_start: start as u32 + 1,
        line_end: end as u32 + 1,
        code,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn extract_py(content: &str) -> Extraction {
        ConstructExtractor::new()
            .extract(content, "test.py", ContentKind::Python)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_top_level_functions_and_classes() {
        let content = r#"
def standalone(a, b):
    return a + b

class Calculator:
    def add(self, a, b):
        return a + b

    def subtract(self, a, b):
        return a - b
"#;
        let extraction = extract_py(content).await;

        let names: Vec<&str> = extraction
            .constructs
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["standalone", "Calculator", "add", "subtract"]);

        let calculator = &extraction.constructs[1];
        assert_eq!(calculator.kind, ConstructKind::Class);
        assert!(calculator.code.contains("def subtract"));
    }

    #[tokio::test]
    async fn test_inner_functions_stay_inside_their_parent() {
        let content = r#"
def outer():
    def inner():
        return 1
    return inner
"#;
        let extraction = extract_py(content).await;

        assert_eq!(extraction.constructs.len(), 1);
        assert_eq!(extraction.constructs[0].name, "outer");
        assert!(extraction.constructs[0].code.contains("def inner"));
    }

    #[tokio::test]
    async fn test_decorated_function_keeps_decorator_span() {
        let content = r#"
@lru_cache(maxsize=None)
def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
"#;
        let extraction = extract_py(content).await;

        assert_eq!(extraction.constructs.len(), 1);
        let construct = &extraction.constructs[0];
        assert_eq!(construct.name, "fib");
        assert_eq!(construct.line_start, 2);
        assert!(construct.code.starts_with("@lru_cache"));
    }

    #[tokio::test]
    async fn test_line_numbers_are_one_based_inclusive() {
        let content = "import os\n\n\ndef f():\n    return os.getcwd()\n";
        let extraction = extract_py(content).await;

        assert_eq!(extraction.constructs.len(), 1);
        assert_eq!(extraction.constructs[0].line_start, 4);
        assert_eq!(extraction.constructs[0].line_end, 5);
    }

    #[tokio::test]
    async fn test_direct_and_aliased_imports() {
        let content = "import os\nimport os.path as osp\nimport sys, json\n";
        let extraction = extract_py(content).await;

        let modules: Vec<(&str, ImportType)> = extraction
            .imports
            .iter()
            .map(|i| (i.module_name.as_str(), i.import_type))
            .collect();
        assert_eq!(
            modules,
            vec![
                ("os", ImportType::Direct),
                ("os.path", ImportType::Direct),
                ("sys", ImportType::Direct),
                ("json", ImportType::Direct),
            ]
        );
    }

    #[tokio::test]
    async fn test_from_imports_record_qualified_members() {
        let content = "from collections import OrderedDict, defaultdict\nfrom json import dumps as to_json\n";
        let extraction = extract_py(content).await;

        let modules: Vec<(&str, ImportType)> = extraction
            .imports
            .iter()
            .map(|i| (i.module_name.as_str(), i.import_type))
            .collect();
        assert_eq!(
            modules,
            vec![
                ("collections.OrderedDict", ImportType::FromImport),
                ("collections.defaultdict", ImportType::FromImport),
                ("json.dumps", ImportType::FromImport),
            ]
        );
    }

    #[tokio::test]
    async fn test_imports_inside_functions_are_found() {
        let content = r#"
def lazy():
    import importlib
    return importlib
"#;
        let extraction = extract_py(content).await;

        assert_eq!(extraction.imports.len(), 1);
        assert_eq!(extraction.imports[0].module_name, "importlib");
    }

    #[tokio::test]
    async fn test_malformed_python_is_a_parse_failure() {
        let err = ConstructExtractor::new()
            .extract("def broken(:\n    pass\n", "broken.py", ContentKind::Python)
            .await
            .unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[tokio::test]
    async fn test_markdown_sections_span_heading_to_heading() {
        let content = "intro text before any heading\n\n# Install\npip install embd\n\n## Usage\nrun it\nwith args\n";
        let extraction = ConstructExtractor::new()
            .extract(content, "README.md", ContentKind::Markdown)
            .await
            .unwrap();

        let sections: Vec<(&str, u32, u32)> = extraction
            .constructs
            .iter()
            .map(|c| (c.name.as_str(), c.line_start, c.line_end))
            .collect();
        assert_eq!(
            sections,
            vec![
                ("intro text before any heading", 1, 2),
                ("Install", 3, 5),
                ("Usage", 6, 8),
            ]
        );
        for construct in &extraction.constructs {
            assert_eq!(construct.kind, ConstructKind::Section);
        }
    }

    #[tokio::test]
    async fn test_markdown_heading_inside_fence_does_not_split() {
        let content = "# Only\nsome text\n```sh\n# not a heading\necho hi\n```\nmore text\n";
        let extraction = ConstructExtractor::new()
            .extract(content, "README.md", ContentKind::Markdown)
            .await
            .unwrap();

        assert_eq!(extraction.constructs.len(), 1);
        assert_eq!(extraction.constructs[0].name, "Only");
        assert_eq!(extraction.constructs[0].line_end, 7);
    }

    #[tokio::test]
    async fn test_fixture_module_extracts_expected_constructs() {
        let content = std::fs::read_to_string("tests/fixtures/sample_python.py")
            .expect("failed to read sample_python.py");

        let extraction = ConstructExtractor::new()
            .extract(&content, "sample_python.py", ContentKind::Python)
            .await
            .unwrap();

        let names: Vec<&str> = extraction
            .constructs
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "read_settings",
                "SettingsCache",
                "__init__",
                "get",
                "clear",
                "main"
            ]
        );

        let class_count = extraction
            .constructs
            .iter()
            .filter(|c| c.kind == ConstructKind::Class)
            .count();
        assert_eq!(class_count, 1);

        let modules: Vec<&str> = extraction
            .imports
            .iter()
            .map(|i| i.module_name.as_str())
            .collect();
        assert_eq!(modules, vec!["os", "sys", "pathlib.Path"]);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected() {
        let err = ConstructExtractor::new()
            .extract("data", "file.bin", ContentKind::Unknown)
            .await
            .unwrap_err();
        assert!(err.is_parse_failure());
    }
}
