//! Investment knowledge corpus
//!
//! A plain-text file with markdown-like sections listing known products.
//! The retrieval role receives it verbatim; semantic search over it is an
//! external concern.

use std::fs;
use std::io;
use std::path::Path;

/// Corpus written when no knowledge file exists yet
pub const DEFAULT_KNOWLEDGE_BASE: &str = "\
# Basic Investment Knowledge

## ETFs
- VTI (Vanguard Total Stock Market): Broad US stock market exposure, medium risk
- BND (Vanguard Total Bond): US bond market exposure, low risk
- VXUS (Vanguard Total International Stock): International stock exposure, medium-high risk

## Robo-Advisors
- Betterment: Automated investing with tax optimization, adjustable risk
- Wealthfront: Automated investing with financial planning tools, adjustable risk
";

/// Load the knowledge corpus, bootstrapping the default one if absent
pub fn load_or_bootstrap(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "knowledge base missing, writing default corpus");
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_KNOWLEDGE_BASE)?;
            Ok(DEFAULT_KNOWLEDGE_BASE.to_string())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("investment_knowledge.txt");

        let corpus = load_or_bootstrap(&path).unwrap();
        assert!(corpus.contains("VTI"));
        assert!(path.exists());
    }

    #[test]
    fn test_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.txt");
        fs::write(&path, "## My Products\n- ABCD: test fund").unwrap();

        let corpus = load_or_bootstrap(&path).unwrap();
        assert!(corpus.contains("ABCD"));
        assert!(!corpus.contains("VTI"));
    }
}
