//! XLSX reader
//!
//! Reads an XLSX package back into the core workbook model. Only the
//! parts the export pipeline round-trips are parsed: sheet names, cell
//! values (shared and inline strings, numbers, booleans), cell styles,
//! row heights, column widths and pane freezes.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use sheetport_core::{CellAddress, CellValue, Style, Workbook, Worksheet};

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            if let Some(path) = sheet_paths.get(r_id) {
                let sheet_idx = workbook.add_worksheet_with_name(name)?;
                Self::read_worksheet(
                    &mut archive,
                    path,
                    workbook.worksheet_mut(sheet_idx).unwrap(),
                    &shared_strings,
                    &cell_styles,
                )?;
            }
        }

        // Ensure at least one sheet exists
        if workbook.is_empty() {
            workbook.add_worksheet_with_name("Sheet1")?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table (missing part = no shared strings)
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(Vec::new()),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();

        let mut strings = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_text = true,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_text => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"t" => in_text = false,
                    b"si" => {
                        in_si = false;
                        strings.push(std::mem::take(&mut current));
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read cellXfs styles (missing part = default styles only)
    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        match archive.by_name("xl/styles.xml") {
            Ok(f) => read_styles_xml(f),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Sheet names and relationship ids, in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = attr.unescape_value().ok().map(|s| s.to_string()),
                            b"r:id" => r_id = attr.unescape_value().ok().map(|s| s.to_string()),
                            _ => {}
                        }
                    }
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Relationship id -> worksheet part path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();
        let mut paths = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        // Targets are relative to xl/
                        let path = if target.starts_with('/') {
                            target.trim_start_matches('/').to_string()
                        } else {
                            format!("xl/{target}")
                        };
                        paths.insert(id, path);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        Ok(paths)
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        // Current cell state
        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_cell_style: Option<u32> = None;
        let mut current_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_text = false;

        loop {
            let event = xml_reader.read_event_into(&mut buf);
            match event {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let empty = matches!(event, Ok(Event::Empty(_)));
                    match e.name().as_ref() {
                        b"sheetFormatPr" => {
                            if let Some(w) = Self::attr(e, b"defaultColWidth")
                                .and_then(|v| v.parse::<f64>().ok())
                            {
                                worksheet.set_default_column_width(w);
                            }
                        }
                        b"col" => {
                            let min = Self::attr(e, b"min").and_then(|v| v.parse::<u32>().ok());
                            let max = Self::attr(e, b"max").and_then(|v| v.parse::<u32>().ok());
                            let width =
                                Self::attr(e, b"width").and_then(|v| v.parse::<f64>().ok());
                            if let (Some(min), Some(max), Some(width)) = (min, max, width) {
                                for col in min..=max {
                                    worksheet.set_column_width((col - 1) as u16, width);
                                }
                            }
                        }
                        b"pane" => {
                            let frozen = Self::attr(e, b"state").as_deref() == Some("frozen");
                            if frozen {
                                if let Some(rows) = Self::attr(e, b"ySplit")
                                    .and_then(|v| v.parse::<u32>().ok())
                                {
                                    worksheet.freeze_rows(rows);
                                }
                            }
                        }
                        b"row" => {
                            let row_num =
                                Self::attr(e, b"r").and_then(|v| v.parse::<u32>().ok());
                            let ht = Self::attr(e, b"ht").and_then(|v| v.parse::<f64>().ok());
                            let custom = Self::attr(e, b"customHeight")
                                .map_or(false, |v| v == "1" || v == "true");
                            if let (Some(r), Some(h), true) = (row_num, ht, custom) {
                                worksheet.set_row_height(r - 1, h);
                            }
                        }
                        b"c" => {
                            current_cell_ref = Self::attr(e, b"r");
                            current_cell_type = Self::attr(e, b"t");
                            current_cell_style =
                                Self::attr(e, b"s").and_then(|v| v.parse::<u32>().ok());
                            current_value = None;
                            if empty {
                                // Style-only cell with no value
                                Self::store_cell(
                                    worksheet,
                                    current_cell_ref.take(),
                                    current_cell_type.take(),
                                    current_cell_style.take(),
                                    None,
                                    shared_strings,
                                    cell_styles,
                                )?;
                            } else {
                                in_cell = true;
                            }
                        }
                        b"v" if in_cell => in_value = true,
                        b"t" if in_cell => in_inline_text = true,
                        _ => {}
                    }
                }
                Ok(Event::Text(ref e)) if in_value || in_inline_text => {
                    let text = e.unescape()?;
                    match current_value.as_mut() {
                        Some(v) => v.push_str(&text),
                        None => current_value = Some(text.to_string()),
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        in_cell = false;
                        Self::store_cell(
                            worksheet,
                            current_cell_ref.take(),
                            current_cell_type.take(),
                            current_cell_style.take(),
                            current_value.take(),
                            shared_strings,
                            cell_styles,
                        )?;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Decode one parsed `<c>` element into the worksheet
    fn store_cell(
        worksheet: &mut Worksheet,
        cell_ref: Option<String>,
        cell_type: Option<String>,
        style_idx: Option<u32>,
        raw_value: Option<String>,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let Some(cell_ref) = cell_ref else {
            return Ok(());
        };
        let addr = CellAddress::parse(&cell_ref)?;

        let value = match (cell_type.as_deref(), raw_value) {
            (Some("s"), Some(raw)) => {
                let idx: usize = raw.parse().map_err(|_| {
                    XlsxError::InvalidFormat(format!("bad shared string index: {raw}"))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::InvalidFormat(format!("shared string {idx} out of range"))
                })?;
                CellValue::String(s.clone())
            }
            (Some("inlineStr"), Some(raw)) | (Some("str"), Some(raw)) => CellValue::String(raw),
            (Some("b"), Some(raw)) => CellValue::Boolean(raw == "1" || raw == "true"),
            (_, Some(raw)) => {
                let n = raw.parse::<f64>().map_err(|_| {
                    XlsxError::InvalidFormat(format!("bad numeric cell value: {raw}"))
                })?;
                CellValue::Number(n)
            }
            (_, None) => CellValue::Empty,
        };

        // Re-pool the style on the target worksheet
        let style_index = match style_idx {
            Some(s) if s > 0 => match cell_styles.get(s as usize) {
                Some(style) => worksheet.add_style(style.clone()),
                None => {
                    log::warn!("cell {cell_ref} references unknown style {s}");
                    0
                }
            },
            _ => 0,
        };

        if value.is_empty() && style_index == 0 {
            return Ok(());
        }

        worksheet.set_cell_at(addr.row, addr.col, value, style_index)?;
        Ok(())
    }

    fn attr(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
        e.attributes()
            .flatten()
            .find(|a| a.key.as_ref() == key)
            .and_then(|a| a.unescape_value().ok())
            .map(|v| v.to_string())
    }
}
