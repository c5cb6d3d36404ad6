use std::path::Path;

use pdffiller::PdfForm;

use crate::exit_codes::{ERROR_ENCOUNTERED, ERROR_GENERAL};

/// Open a PDF form with user-friendly error messages.
///
/// Returns `Err(1)` if the file is missing and `Err(6)` if it cannot be
/// parsed or its field tree is corrupt.
pub fn open_form(file: &Path, password: Option<&str>) -> Result<PdfForm, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(ERROR_GENERAL);
    }

    let result = match password {
        Some(pw) => PdfForm::open_file_with_password(file, pw, None),
        None => PdfForm::open_file(file, None),
    };
    result.map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        ERROR_ENCOUNTERED
    })
}
