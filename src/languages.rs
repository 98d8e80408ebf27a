use crate::error::QueryError;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Rust,
    TypeScript,
    Tsx,
}

/// Detect language from file extension
pub fn detect_language(path: &Path) -> Result<Language, QueryError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| QueryError::NoExtension(path.display().to_string()))?;

    match extension {
        "rs" => Ok(Language::Rust),
        "ts" => Ok(Language::TypeScript),
        "tsx" => Ok(Language::Tsx),
        _ => Err(QueryError::UnsupportedExtension(extension.to_string())),
    }
}

/// Check if a file can be lowered into declarations
pub fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| matches!(ext, "rs" | "ts" | "tsx"))
        .unwrap_or(false)
}

pub fn ts_language(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}
