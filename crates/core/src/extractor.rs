use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;

/// Seam for document text extraction. PDF is handled in-crate; other
/// formats (docx) come from whatever implementation the caller plugs in.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::Extraction(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::Extraction(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(text);
            }
        }

        if pages.is_empty() {
            return Err(IngestError::Extraction(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::{LopdfExtractor, TextExtractor};
    use crate::error::IngestError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn unreadable_pdf_is_an_extraction_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        let result = LopdfExtractor.extract_text(&path);
        assert!(matches!(result, Err(IngestError::Extraction(_))));
        Ok(())
    }
}
