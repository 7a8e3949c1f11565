//! GoContractExtractor - lock contracts from annotated Go sources
//!
//! Walks the top-level declarations of a tree-sitter-go syntax tree:
//! - `function_declaration` / `method_declaration`: doc comment block → FunctionContract,
//!   registered even when empty so the declaration owns its own key
//! - `type_declaration` (struct fields): doc + trailing comments → `<Type>.<field>` guard
//! - `var_declaration`: declaration doc + spec doc + trailing comments → `<var>` guard
//!
//! A doc comment is the contiguous run of comment lines ending on the line
//! directly above the declaration. A trailing comment starts on the line the
//! declaration ends on. Malformed annotations are logged and dropped.

use std::path::Path;

use tree_sitter::{Node as TSNode, Parser};

use crate::errors::{LockcheckError, Result};
use crate::features::lock_contracts::domain::{
    AnnotationKind, ContractRegistryBuilder, DataInvariant, FunctionContract, Requirement,
};
use crate::features::lock_contracts::infrastructure::annotation_parser::{parse_comment, Annotation};
use crate::shared::models::Span;

/// Span of a tree-sitter node (1-based lines)
trait SpanExt {
    fn to_span(&self) -> Span;
}

impl SpanExt for TSNode<'_> {
    fn to_span(&self) -> Span {
        Span::new(
            self.start_position().row as u32 + 1,
            self.start_position().column as u32,
            self.end_position().row as u32 + 1,
            self.end_position().column as u32,
        )
    }
}

/// Per-file counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Function and method declarations registered
    pub functions: usize,
    /// Declarations carrying at least one annotation
    pub contracted: usize,
    pub data_invariants: usize,
    pub skipped_annotations: usize,
}

/// Extraction state for one file
struct FileContext<'s> {
    file_path: &'s str,
    source: &'s str,
    stats: ExtractionStats,
}

impl<'s> FileContext<'s> {
    fn node_text(&self, node: &TSNode) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// Parse the given comment nodes, logging and dropping malformed lines
    fn annotations(&mut self, comments: &[TSNode]) -> Vec<(Annotation, Span)> {
        let mut found = Vec::new();
        for comment in comments {
            for parsed in parse_comment(self.node_text(comment)) {
                match parsed {
                    Ok(annotation) => found.push((annotation, comment.to_span())),
                    Err(e) => {
                        self.stats.skipped_annotations += 1;
                        tracing::warn!(
                            file = self.file_path,
                            line = comment.start_position().row + 1,
                            "{}",
                            e
                        );
                    }
                }
            }
        }
        found
    }
}

/// tree-sitter based Go front-end
pub struct GoContractExtractor;

impl GoContractExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read and extract one `.go` file
    pub fn extract_file(
        &self,
        path: impl AsRef<Path>,
        builder: &mut ContractRegistryBuilder,
    ) -> Result<ExtractionStats> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        self.extract_source(&path.to_string_lossy(), &source, builder)
    }

    /// Extract every annotation of `source` into `builder`
    pub fn extract_source(
        &self,
        file_path: &str,
        source: &str,
        builder: &mut ContractRegistryBuilder,
    ) -> Result<ExtractionStats> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::language())
            .map_err(|e| LockcheckError::parse_error(format!("Failed to set language: {}", e)))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| LockcheckError::parse_error(format!("Failed to parse {}", file_path)))?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::warn!(file = file_path, "syntax errors present, extracting what parsed");
        }

        let mut ctx = FileContext {
            file_path,
            source,
            stats: ExtractionStats::default(),
        };

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "function_declaration" => self.extract_function(&mut ctx, &node, None, builder),
                "method_declaration" => {
                    let receiver = receiver_type_text(&ctx, &node);
                    self.extract_function(&mut ctx, &node, receiver, builder)
                }
                "type_declaration" => self.extract_type_decl(&mut ctx, &node, builder),
                "var_declaration" => self.extract_var_decl(&mut ctx, &node, builder),
                _ => {}
            }
        }

        tracing::debug!(
            file = file_path,
            functions = ctx.stats.functions,
            contracted = ctx.stats.contracted,
            data = ctx.stats.data_invariants,
            "extracted lock contracts"
        );
        Ok(ctx.stats)
    }

    fn extract_function(
        &self,
        ctx: &mut FileContext,
        node: &TSNode,
        receiver: Option<&str>,
        builder: &mut ContractRegistryBuilder,
    ) {
        let Some(name) = node.child_by_field_name("name").map(|n| ctx.node_text(&n)) else {
            return;
        };

        let mut requirements = Vec::new();
        for (annotation, span) in ctx.annotations(&leading_comments(node)) {
            if !annotation.kind.is_function_kind() {
                ctx.stats.skipped_annotations += 1;
                tracing::warn!(
                    file = ctx.file_path,
                    line = span.start_line,
                    "unexpected annotation {} on function {}",
                    annotation.kind,
                    name
                );
                continue;
            }
            requirements.extend(
                annotation
                    .params
                    .into_iter()
                    .map(|target| Requirement::new(annotation.kind, target)),
            );
        }

        if !requirements.is_empty() {
            ctx.stats.contracted += 1;
        }
        let contract = FunctionContract::new(requirements)
            .with_location(Some(ctx.file_path.to_string()), node.to_span());
        builder.add_function(name, receiver, contract);
        ctx.stats.functions += 1;
    }

    fn extract_type_decl(&self, ctx: &mut FileContext, node: &TSNode, builder: &mut ContractRegistryBuilder) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if spec.kind() != "type_spec" {
                continue;
            }
            let Some(type_name) = spec.child_by_field_name("name").map(|n| ctx.node_text(&n)) else {
                continue;
            };
            let Some(body) = spec
                .child_by_field_name("type")
                .filter(|t| t.kind() == "struct_type")
            else {
                continue;
            };

            let mut body_cursor = body.walk();
            let Some(fields) = body
                .named_children(&mut body_cursor)
                .find(|c| c.kind() == "field_declaration_list")
            else {
                continue;
            };

            let mut field_cursor = fields.walk();
            for field in fields.named_children(&mut field_cursor) {
                if field.kind() != "field_declaration" {
                    continue;
                }
                let mut name_cursor = field.walk();
                let names: Vec<&str> = field
                    .children_by_field_name("name", &mut name_cursor)
                    .map(|n| ctx.node_text(&n))
                    .collect();
                let mut comments = leading_comments(&field);
                comments.extend(trailing_comments(&field));
                self.register_data(ctx, &comments, &names, Some(type_name), field.to_span(), builder);
            }
        }
    }

    fn extract_var_decl(&self, ctx: &mut FileContext, node: &TSNode, builder: &mut ContractRegistryBuilder) {
        let decl_doc = leading_comments(node);
        for spec in var_specs(node) {
            let mut name_cursor = spec.walk();
            let names: Vec<&str> = spec
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| ctx.node_text(&n))
                .collect();
            let mut comments = decl_doc.clone();
            comments.extend(leading_comments(&spec));
            comments.extend(trailing_comments(&spec));
            self.register_data(ctx, &comments, &names, None, node.to_span(), builder);
        }
    }

    fn register_data(
        &self,
        ctx: &mut FileContext,
        comments: &[TSNode],
        names: &[&str],
        owner: Option<&str>,
        span: Span,
        builder: &mut ContractRegistryBuilder,
    ) {
        for (annotation, ann_span) in ctx.annotations(comments) {
            if annotation.kind != AnnotationKind::GuardedBy {
                ctx.stats.skipped_annotations += 1;
                tracing::warn!(
                    file = ctx.file_path,
                    line = ann_span.start_line,
                    "unexpected annotation {} on data declaration",
                    annotation.kind
                );
                continue;
            }
            for name in names {
                let key = match owner {
                    Some(owner) => format!("{}.{}", owner, name),
                    None => name.to_string(),
                };
                // A guard lists one mutex; with several params the last wins.
                for mutex in &annotation.params {
                    let mut invariant = DataInvariant::new(mutex.clone());
                    invariant.span = span;
                    invariant.file_path = Some(ctx.file_path.to_string());
                    builder.add_data_invariant(key.clone(), invariant);
                }
                if !annotation.params.is_empty() {
                    ctx.stats.data_invariants += 1;
                }
            }
        }
    }
}

impl Default for GoContractExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver type text of a method, e.g. `*Account`
fn receiver_type_text<'s>(ctx: &FileContext<'s>, node: &TSNode) -> Option<&'s str> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    param.child_by_field_name("type").map(|t| ctx.node_text(&t))
}

/// `var_spec` nodes of a `var` declaration, grouped or not
fn var_specs<'t>(node: &TSNode<'t>) -> Vec<TSNode<'t>> {
    let mut specs = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "var_spec" => specs.push(child),
            "var_spec_list" => {
                let mut inner = child.walk();
                specs.extend(child.named_children(&mut inner).filter(|c| c.kind() == "var_spec"));
            }
            _ => {}
        }
    }
    specs
}

/// Whether `comment` trails code that ends on the same line
fn is_trailing(comment: &TSNode) -> bool {
    let row = comment.start_position().row;
    let mut prev = comment.prev_sibling();
    while let Some(p) = prev {
        if p.end_position().row != row {
            return false;
        }
        if p.is_named() && p.kind() != "comment" {
            return true;
        }
        prev = p.prev_sibling();
    }
    false
}

/// Contiguous comment block ending on the line above `node`
fn leading_comments<'t>(node: &TSNode<'t>) -> Vec<TSNode<'t>> {
    let mut comments = Vec::new();
    let mut next_row = node.start_position().row;
    let mut prev = node.prev_sibling();
    while let Some(p) = prev {
        if p.kind() == "comment" {
            if p.end_position().row + 1 != next_row || is_trailing(&p) {
                break;
            }
            comments.push(p);
            next_row = p.start_position().row;
        } else if p.is_named() {
            break;
        }
        prev = p.prev_sibling();
    }
    comments.reverse();
    comments
}

/// Comments starting on the line `node` ends on
///
/// Climbs to the parent when `node` is its last child, so the trailing
/// comment of `var x int // ...` is found for the inner `var_spec`.
fn trailing_comments<'t>(node: &TSNode<'t>) -> Vec<TSNode<'t>> {
    let row = node.end_position().row;
    let mut comments = Vec::new();
    let mut anchor = *node;
    loop {
        let mut next = anchor.next_sibling();
        if next.is_none() {
            match anchor.parent() {
                Some(parent) if parent.end_position().row == row && parent.kind() != "source_file" => {
                    anchor = parent;
                    continue;
                }
                _ => break,
            }
        }
        while let Some(n) = next {
            if n.start_position().row != row {
                break;
            }
            if n.kind() == "comment" {
                comments.push(n);
            } else if n.is_named() {
                break;
            }
            next = n.next_sibling();
        }
        break;
    }
    comments
}
