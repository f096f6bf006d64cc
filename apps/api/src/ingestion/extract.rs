//! PDF text extraction for uploaded resumes.

use crate::errors::AppError;

/// Extracts plain text from an uploaded PDF.
pub fn extract_resume_text(bytes: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        AppError::UnprocessableEntity(format!("could not extract text from PDF: {e}"))
    })?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "PDF contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}
