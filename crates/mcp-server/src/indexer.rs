//! Minimal indexer: walks a source tree, chunks files, and populates storage
//!
//! Chunking and symbol extraction here are intentionally simple (one chunk
//! per file, symbols found by a crude top-level declaration scan) since the
//! indexing algorithm itself is out of scope; what matters is that the
//! embedding pipeline and storage are driven the way a fuller indexer would
//! drive them.

use gocontext_core::project::Project;
use gocontext_core::search::{FileInfo, SymbolInfo, SymbolKind};
use gocontext_embeddings::EmbeddingProvider;
use gocontext_storage::{Chunk, FileRecord, StorageWriter, SymbolRecord};
use ignore::WalkBuilder;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Source file extension this indexer understands. The target project this
/// was written for is a Go codebase.
const SOURCE_EXTENSION: &str = "go";

pub struct IndexOutcome {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub symbols_extracted: usize,
    pub chunks_created: usize,
    pub duration_ms: u64,
    pub errors: Vec<String>,
}

pub fn contains_source_file(root: &Path) -> bool {
    WalkBuilder::new(root)
        .hidden(false)
        .build()
        .filter_map(|e| e.ok())
        .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION))
}

fn is_test_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.ends_with("_test"))
        .unwrap_or(false)
}

fn is_vendor_path(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "vendor")
}

/// A crude top-level declaration scan, good enough to populate symbol rows
/// without a real parser.
fn extract_symbols(content: &str) -> Vec<SymbolInfo> {
    let mut symbols = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("func ") {
            if let Some(name) = rest.split(['(', ' ']).find(|s| !s.is_empty()) {
                symbols.push(SymbolInfo {
                    name: name.trim_end_matches('(').to_string(),
                    kind: SymbolKind::Function,
                    signature: Some(trimmed.to_string()),
                });
            }
        } else if let Some(rest) = trimmed.strip_prefix("type ") {
            if let Some(name) = rest.split_whitespace().next() {
                let kind = if rest.contains("interface") {
                    SymbolKind::Interface
                } else if rest.contains("struct") {
                    SymbolKind::Struct
                } else {
                    SymbolKind::Type
                };
                symbols.push(SymbolInfo { name: name.to_string(), kind, signature: Some(trimmed.to_string()) });
            }
        }
    }
    symbols
}

pub async fn index_codebase(
    root: &Path,
    project_id: &str,
    include_tests: bool,
    include_vendor: bool,
    embedder: &Arc<dyn EmbeddingProvider>,
    storage: &Arc<dyn StorageWriter>,
) -> IndexOutcome {
    let start = Instant::now();
    let mut outcome = IndexOutcome {
        files_indexed: 0,
        files_skipped: 0,
        files_failed: 0,
        symbols_extracted: 0,
        chunks_created: 0,
        duration_ms: 0,
        errors: Vec::new(),
    };

    let mut total_errors = 0usize;

    for entry in WalkBuilder::new(root).hidden(false).build().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }
        if !include_tests && is_test_file(path) {
            outcome.files_skipped += 1;
            continue;
        }
        if !include_vendor && is_vendor_path(path) {
            outcome.files_skipped += 1;
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                outcome.files_failed += 1;
                total_errors += 1;
                if outcome.errors.len() < 5 {
                    outcome.errors.push(format!("{}: {e}", path.display()));
                }
                continue;
            }
        };
        if content.trim().is_empty() {
            outcome.files_skipped += 1;
            continue;
        }

        let rel_path = path.strip_prefix(root).unwrap_or(path).to_string_lossy().to_string();
        let file_id = format!("{project_id}:{rel_path}");

        let symbols = extract_symbols(&content);
        let line_count = content.lines().count().max(1);

        if let Err(e) = storage
            .upsert_file(
                project_id,
                &FileRecord {
                    id: file_id.clone(),
                    info: FileInfo { path: rel_path.clone(), package: None, start_line: 1, end_line: line_count },
                },
            )
            .await
        {
            outcome.files_failed += 1;
            total_errors += 1;
            if outcome.errors.len() < 5 {
                outcome.errors.push(format!("{rel_path}: {e}"));
            }
            continue;
        }

        for (i, symbol) in symbols.iter().enumerate() {
            let symbol_id = format!("{file_id}#{i}");
            if storage
                .upsert_symbol(project_id, &SymbolRecord { id: symbol_id, info: symbol.clone() })
                .await
                .is_ok()
            {
                outcome.symbols_extracted += 1;
            }
        }

        let embedding = match embedder.generate_embedding(&content).await {
            Ok(e) => e,
            Err(e) => {
                outcome.files_failed += 1;
                total_errors += 1;
                if outcome.errors.len() < 5 {
                    outcome.errors.push(format!("{rel_path}: embedding failed: {e}"));
                }
                continue;
            }
        };

        let chunk = Chunk {
            id: format!("{file_id}:0"),
            project_id: project_id.to_string(),
            file_id,
            content,
            context: String::new(),
            symbol_id: None,
        };
        match storage.upsert_chunk(&chunk, embedding.vector).await {
            Ok(()) => {
                outcome.chunks_created += 1;
                outcome.files_indexed += 1;
            }
            Err(e) => {
                outcome.files_failed += 1;
                total_errors += 1;
                if outcome.errors.len() < 5 {
                    outcome.errors.push(format!("{rel_path}: {e}"));
                }
            }
        }
    }

    if total_errors > 5 {
        warn!(total_errors, "indexing errors truncated to first 5");
    }

    let project = Project { id: project_id.to_string(), path: root.to_string_lossy().to_string(), name: root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default() };
    let _ = storage.upsert_project(&project).await;

    outcome.duration_ms = start.elapsed().as_millis() as u64;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_and_type_declarations() {
        let content = "package main\n\nfunc Handler() {}\n\ntype Widget struct {}\n\ntype Greeter interface {}\n";
        let symbols = extract_symbols(content);
        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols[0].name, "Handler");
        assert_eq!(symbols[0].kind, SymbolKind::Function);
        assert_eq!(symbols[1].kind, SymbolKind::Struct);
        assert_eq!(symbols[2].kind, SymbolKind::Interface);
    }

    #[test]
    fn test_file_detection_matches_go_convention() {
        assert!(is_test_file(Path::new("/repo/handler_test.go")));
        assert!(!is_test_file(Path::new("/repo/handler.go")));
    }

    #[test]
    fn vendor_path_detection() {
        assert!(is_vendor_path(Path::new("/repo/vendor/pkg/file.go")));
        assert!(!is_vendor_path(Path::new("/repo/pkg/file.go")));
    }
}
