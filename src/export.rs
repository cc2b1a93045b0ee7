//! Plain-text and PDF persistence of rendered timetables.

use crate::error::ExportError;
use log::{debug, info};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const TIMETABLE_FILE: &str = "timetable.txt";
pub const TIMETABLE_PDF: &str = "timetable.pdf";

// Landscape A4 so a full grid row fits in a monospaced font.
const PAGE_WIDTH: Mm = Mm(297.0);
const PAGE_HEIGHT: Mm = Mm(210.0);
const MARGIN: f32 = 10.0;
const FONT_SIZE: f32 = 7.0;
const LINE_HEIGHT: f32 = 4.0;

/// What `save_timetable` writes for a rendered grid.
pub fn timetable_file_contents(timetable_text: &str) -> String {
    format!(
        "Timetable:\n\n{timetable_text}\n\nTeacher Schedules:\n\n\
         Teacher schedules are not included in this file."
    )
}

/// Writes `timetable.txt` under `dir`, returning the path written.
pub fn save_timetable(dir: &Path, timetable_text: &str) -> Result<PathBuf, ExportError> {
    write(
        dir.join(TIMETABLE_FILE),
        timetable_file_contents(timetable_text).as_bytes(),
    )
}

pub fn load_timetable(dir: &Path) -> Result<String, ExportError> {
    read(dir.join(TIMETABLE_FILE))
}

/// Renders the saved `timetable.txt` into `timetable.pdf`, one text line per
/// PDF line, starting a new page when the current one is full.
pub fn save_timetable_pdf(dir: &Path) -> Result<PathBuf, ExportError> {
    let text = load_timetable(dir)?;
    let path = dir.join(TIMETABLE_PDF);

    let (doc, first_page, first_layer) =
        PdfDocument::new("Timetable", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ExportError::Pdf {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let lines_per_page = ((PAGE_HEIGHT.0 - 2.0 * MARGIN) / LINE_HEIGHT) as usize;
    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    for (i, line) in text.lines().enumerate() {
        let row = i % lines_per_page;
        if i > 0 && row == 0 {
            let (page, page_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
        }
        let y = PAGE_HEIGHT.0 - MARGIN - LINE_HEIGHT * (row as f32 + 1.0);
        layer.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
    }

    let bytes = doc.save_to_bytes().map_err(|e| ExportError::Pdf {
        path: path.clone(),
        message: e.to_string(),
    })?;
    write(path, &bytes)
}

/// Writes `<teacher>_schedule.txt` under `dir`.
pub fn save_teacher_schedule(
    dir: &Path,
    teacher: &str,
    schedule_text: &str,
) -> Result<PathBuf, ExportError> {
    write(teacher_schedule_path(dir, teacher)?, schedule_text.as_bytes())
}

pub fn load_teacher_schedule(dir: &Path, teacher: &str) -> Result<String, ExportError> {
    read(teacher_schedule_path(dir, teacher)?)
}

pub fn teacher_schedule_path(dir: &Path, teacher: &str) -> Result<PathBuf, ExportError> {
    if teacher.trim().is_empty()
        || teacher.contains(['/', '\\'])
        || teacher.contains("..")
    {
        return Err(ExportError::InvalidName(teacher.to_string()));
    }
    Ok(dir.join(format!("{teacher}_schedule.txt")))
}

fn write(path: PathBuf, contents: &[u8]) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    match fs::write(&path, contents) {
        Ok(()) => {
            info!("Wrote {} bytes to {}", contents.len(), path.display());
            Ok(path)
        }
        Err(source) => Err(ExportError::Io { path, source }),
    }
}

fn read(path: PathBuf) -> Result<String, ExportError> {
    debug!("Reading {}", path.display());
    fs::read_to_string(&path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ExportError::NotFound(path.clone()),
        _ => ExportError::Io {
            path: path.clone(),
            source,
        },
    })
}
