//! Per-format text extraction.
//!
//! Each supported format delegates entirely to a format library; this module
//! only concatenates what the library yields. Two contract points matter to
//! callers:
//!
//! * An **unsupported extension** is an error ([`GuardError::UnsupportedFormat`])
//!   with no partial output — the upload handler rejects these before any
//!   parsing happens.
//! * A supported file with **no extractable text** is `Ok("")`, never an
//!   error. "Nothing to analyze" is a valid pipeline input; the analysis
//!   stage handles it.
//!
//! No OCR, no structure extraction, no encoding negotiation beyond library
//! defaults.

use crate::error::GuardError;
use calamine::{open_workbook_auto, DataType, Reader};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Extract the concatenated textual content of `path`.
///
/// `declared_extension` is the extension from the *uploaded* file name (no
/// leading dot, any case); dispatch trusts it rather than sniffing content,
/// matching the upload allow-list check.
pub fn extract_text(path: &Path, declared_extension: &str) -> Result<String, GuardError> {
    let text = match declared_extension.to_ascii_lowercase().as_str() {
        "pdf" => extract_pdf(path)?,
        "xlsx" | "xls" => extract_workbook(path)?,
        "docx" => extract_docx(path)?,
        "csv" => extract_csv(path)?,
        other => {
            return Err(GuardError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    debug!(
        chars = text.len(),
        path = %path.display(),
        "extracted document text"
    );

    if text.trim().is_empty() {
        warn!(path = %path.display(), "no text extracted from file");
        return Ok(String::new());
    }
    Ok(text)
}

/// PDF: whole-document extraction; pages without text contribute nothing.
fn extract_pdf(path: &Path) -> Result<String, GuardError> {
    pdf_extract::extract_text(path).map_err(|e| GuardError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Spreadsheets: per sheet in sheet order, per row in row order, the
/// space-joined string form of non-empty cells; rows joined with newlines.
fn extract_workbook(path: &Path) -> Result<String, GuardError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| GuardError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut lines = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = match workbook.worksheet_range(&sheet_name) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return Err(GuardError::ExtractionFailed {
                    path: path.to_path_buf(),
                    detail: format!("sheet '{sheet_name}': {e}"),
                })
            }
            None => continue,
        };
        for row in range.rows() {
            let cells: Vec<String> = row.iter().filter_map(cell_to_string).collect();
            lines.push(cells.join(" "));
        }
    }
    Ok(lines.join("\n"))
}

fn cell_to_string(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::String(s) if s.trim().is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// DOCX: paragraph texts in document order, joined with newlines.
///
/// A .docx is a ZIP archive whose body text lives in `word/document.xml`;
/// paragraph boundaries are `<w:p>` elements and runs of text are `<w:t>`.
fn extract_docx(path: &Path) -> Result<String, GuardError> {
    let fail = |detail: String| GuardError::ExtractionFailed {
        path: path.to_path_buf(),
        detail,
    };

    let file = std::fs::File::open(path).map_err(|e| fail(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| fail(format!("word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| fail(e.to_string()))?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Start(e)) if e.name().as_ref() == b"w:t" => {
                in_text_run = true;
            }
            Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(t)) if in_text_run => {
                current.push_str(&t.unescape().map_err(|e| fail(e.to_string()))?);
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(fail(e.to_string())),
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}

/// CSV: parse as a table and render its plain tabular string form —
/// header line first, then one space-joined line per record.
fn extract_csv(path: &Path) -> Result<String, GuardError> {
    let fail = |detail: String| GuardError::ExtractionFailed {
        path: path.to_path_buf(),
        detail,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| fail(e.to_string()))?;

    let mut lines = Vec::new();
    if let Ok(headers) = reader.headers() {
        if !headers.is_empty() {
            lines.push(headers.iter().collect::<Vec<_>>().join(" "));
        }
    }
    for record in reader.records() {
        let record = record.map_err(|e| fail(e.to_string()))?;
        lines.push(record.iter().collect::<Vec<_>>().join(" "));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents)
            .unwrap();
        path
    }

    #[test]
    fn csv_content_survives_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "payments.csv",
            b"memo,amount\nurgent payment wire transfer immediate,50000\n",
        );
        let text = extract_text(&path, "csv").unwrap();
        assert!(text.contains("memo amount"));
        assert!(text.contains("urgent payment wire transfer immediate 50000"));
    }

    #[test]
    fn empty_csv_yields_empty_string_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", b"");
        assert_eq!(extract_text(&path, "csv").unwrap(), "");
    }

    #[test]
    fn whitespace_only_content_is_normalised_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blank.csv", b"   \n");
        assert_eq!(extract_text(&path, "csv").unwrap(), "");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.txt", b"plain text");
        let err = extract_text(&path, "txt").unwrap_err();
        assert!(matches!(
            err,
            GuardError::UnsupportedFormat { ref extension } if extension == "txt"
        ));
    }

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "upper.CSV", b"a,b\n1,2\n");
        assert!(extract_text(&path, "CSV").unwrap().contains("1 2"));
    }

    #[test]
    fn docx_paragraphs_join_with_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0"?><w:document xmlns:w="x"><w:body>
                <w:p><w:r><w:t>First paragraph</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second &amp; final</w:t></w:r></w:p>
                </w:body></w:document>"#,
            )
            .unwrap();
        writer.finish().unwrap();

        let text = extract_text(&path, "docx").unwrap();
        assert!(text.contains("First paragraph"));
        assert!(text.contains("Second & final"));
        let first = text.find("First paragraph").unwrap();
        let second = text.find("Second").unwrap();
        assert!(first < second, "document order must be preserved");
    }

    #[test]
    fn corrupt_docx_is_extraction_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.docx", b"this is not a zip archive");
        let err = extract_text(&path, "docx").unwrap_err();
        assert!(matches!(err, GuardError::ExtractionFailed { .. }));
    }
}
