//! Workbook-wide style table for styles.xml
//!
//! Cells carry per-worksheet style indices; the XLSX format wants one
//! global cellXfs table. [`XlsxStyleTable`] deduplicates every style used
//! anywhere in the workbook into that global table and remembers the
//! per-sheet mapping so the worksheet writer can emit `s=` attributes.

use std::collections::HashMap;
use std::io::Read;

use quick_xml::events::Event;
use quick_xml::Reader;
use sheetport_core::{
    Alignment, BorderStyle, FontStyle, NumberFormat, Style, VerticalAlignment, Workbook,
};

use crate::error::XlsxResult;

pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index.
    styles: Vec<Style>,
    /// Per-worksheet mapping: local worksheet style index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles: Vec<Style> = Vec::new();
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();

        // Index 0 is always the default style
        let default = Style::default();
        styles.push(default.clone());
        style_to_xf.insert(default, 0);

        let mut sheet_maps: Vec<HashMap<u32, u32>> = Vec::with_capacity(workbook.sheet_count());

        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_row, _col, cell) in sheet.iter_cells() {
                let local_idx = cell.style_index;
                if local_idx == 0 || map.contains_key(&local_idx) {
                    continue;
                }

                let style = sheet
                    .style_by_index(local_idx)
                    .cloned()
                    .unwrap_or_default();

                let xf_id = match style_to_xf.get(&style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        style_to_xf.insert(style, id);
                        id
                    }
                };

                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        // Component tables: fonts and borders deduplicated, fills fixed.
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        let mut fonts: Vec<FontStyle> = Vec::new();
        let default_font = FontStyle::default();
        fonts.push(default_font.clone());
        font_ids.insert(default_font, 0);

        let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
        let mut borders: Vec<BorderStyle> = Vec::new();
        let default_border = BorderStyle::default();
        borders.push(default_border);
        border_ids.insert(default_border, 0);

        let mut resolved: Vec<(u32, u32, u16)> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = match font_ids.get(&style.font) {
                Some(&id) => id,
                None => {
                    let id = fonts.len() as u32;
                    fonts.push(style.font.clone());
                    font_ids.insert(style.font.clone(), id);
                    id
                }
            };

            let border_id = match border_ids.get(&style.border) {
                Some(&id) => id,
                None => {
                    let id = borders.len() as u32;
                    borders.push(style.border);
                    border_ids.insert(style.border, id);
                    id
                }
            };

            resolved.push((font_id, border_id, style.number_format.id()));
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        // Fonts
        xml.push_str(&format!("\n    <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n    </fonts>");

        // Fills: the format requires none and gray125 first
        xml.push_str(
            r#"
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>"#,
        );

        // Borders
        xml.push_str(&format!("\n    <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n    </borders>");

        xml.push_str(
            r#"
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>"#,
        );

        // cellXfs: one entry per deduplicated style
        xml.push_str(&format!("\n    <cellXfs count=\"{}\">", self.styles.len()));
        for (style, &(font_id, border_id, num_fmt_id)) in self.styles.iter().zip(&resolved) {
            xml.push_str(&write_xf(style, font_id, border_id, num_fmt_id));
        }
        xml.push_str("\n    </cellXfs>");

        xml.push_str(
            r#"
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#,
        );

        xml
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("\n        <font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("\n        <border><left/><right/><top/>");
    match border.bottom {
        Some(line) => s.push_str(&format!(
            "<bottom style=\"{}\"><color auto=\"1\"/></bottom>",
            line.as_str()
        )),
        None => s.push_str("<bottom/>"),
    }
    s.push_str("<diagonal/></border>");
    s
}

fn write_xf(style: &Style, font_id: u32, border_id: u32, num_fmt_id: u16) -> String {
    let mut s = format!(
        "\n        <xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"0\" borderId=\"{}\" xfId=\"0\"",
        num_fmt_id, font_id, border_id
    );
    if font_id != 0 {
        s.push_str(" applyFont=\"1\"");
    }
    if border_id != 0 {
        s.push_str(" applyBorder=\"1\"");
    }
    if num_fmt_id != 0 {
        s.push_str(" applyNumberFormat=\"1\"");
    }
    if !style.alignment.is_default() {
        s.push_str(" applyAlignment=\"1\">");
        s.push_str(&write_alignment(&style.alignment));
        s.push_str("</xf>");
    } else {
        s.push_str("/>");
    }
    s
}

fn write_alignment(al: &Alignment) -> String {
    let mut s = String::from("<alignment");
    match al.vertical {
        VerticalAlignment::Top => s.push_str(" vertical=\"top\""),
        VerticalAlignment::Center => s.push_str(" vertical=\"center\""),
        VerticalAlignment::Bottom => {}
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// === styles.xml parsing (reader side) ===

/// Styles parsed back from styles.xml: one [`Style`] per cellXfs entry.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(std::io::BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut borders: Vec<BorderStyle> = Vec::new();
    let mut cell_styles: Vec<Style> = Vec::new();

    let mut in_fonts = false;
    let mut in_borders = false;
    let mut in_cell_xfs = false;
    let mut current_font: Option<FontStyle> = None;
    let mut current_border: Option<BorderStyle> = None;
    let mut current_xf: Option<Style> = None;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let empty = matches!(event, Ok(Event::Empty(_)));
                match e.name().as_ref() {
                    b"fonts" => in_fonts = true,
                    b"borders" => in_borders = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"font" if in_fonts => {
                        if empty {
                            fonts.push(FontStyle::default());
                        } else {
                            current_font = Some(FontStyle::default());
                        }
                    }
                    b"b" => {
                        if let Some(font) = current_font.as_mut() {
                            font.bold = true;
                        }
                    }
                    b"i" => {
                        if let Some(font) = current_font.as_mut() {
                            font.italic = true;
                        }
                    }
                    b"sz" => {
                        if let Some(font) = current_font.as_mut() {
                            if let Some(size) =
                                attr_value(e, b"val").and_then(|v| v.parse::<f64>().ok())
                            {
                                font.size = size;
                            }
                        }
                    }
                    b"name" => {
                        if let Some(font) = current_font.as_mut() {
                            if let Some(val) = attr_value(e, b"val") {
                                font.name = val;
                            }
                        }
                    }
                    b"border" if in_borders => {
                        if empty {
                            borders.push(BorderStyle::default());
                        } else {
                            current_border = Some(BorderStyle::default());
                        }
                    }
                    b"bottom" => {
                        if let Some(border) = current_border.as_mut() {
                            border.bottom =
                                attr_value(e, b"style").as_deref().and_then(str_to_border_style);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        let style = parse_xf(e, &fonts, &borders);
                        if empty {
                            cell_styles.push(style);
                        } else {
                            current_xf = Some(style);
                        }
                    }
                    b"alignment" => {
                        if let Some(style) = current_xf.as_mut() {
                            if let Some(v) = attr_value(e, b"vertical") {
                                style.alignment.vertical = match v.as_str() {
                                    "top" => VerticalAlignment::Top,
                                    "center" => VerticalAlignment::Center,
                                    _ => VerticalAlignment::Bottom,
                                };
                            }
                            if let Some(w) = attr_value(e, b"wrapText") {
                                style.alignment.wrap_text = w == "1" || w == "true";
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = false,
                b"borders" => in_borders = false,
                b"cellXfs" => in_cell_xfs = false,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
                    }
                }
                b"border" => {
                    if let Some(border) = current_border.take() {
                        borders.push(border);
                    }
                }
                b"xf" if in_cell_xfs => {
                    if let Some(style) = current_xf.take() {
                        cell_styles.push(style);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(cell_styles)
}

fn parse_xf(
    e: &quick_xml::events::BytesStart<'_>,
    fonts: &[FontStyle],
    borders: &[BorderStyle],
) -> Style {
    let mut style = Style::default();

    if let Some(font) = attr_value(e, b"fontId")
        .and_then(|v| v.parse::<usize>().ok())
        .and_then(|id| fonts.get(id))
    {
        style.font = font.clone();
    }
    if let Some(border) = attr_value(e, b"borderId")
        .and_then(|v| v.parse::<usize>().ok())
        .and_then(|id| borders.get(id))
    {
        style.border = *border;
    }
    if let Some(num_fmt_id) = attr_value(e, b"numFmtId").and_then(|v| v.parse::<u16>().ok()) {
        if num_fmt_id != 0 {
            style.number_format = NumberFormat::Builtin(num_fmt_id);
        }
    }

    style
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.to_string())
}

fn str_to_border_style(s: &str) -> Option<sheetport_core::BorderLineStyle> {
    use sheetport_core::BorderLineStyle;
    match s {
        "thin" => Some(BorderLineStyle::Thin),
        "medium" => Some(BorderLineStyle::Medium),
        "thick" => Some(BorderLineStyle::Thick),
        _ => None,
    }
}
