//! XLSX writer: builds a minimal SpreadsheetML package from scratch

use super::SheetData;
use crate::error::Result;
use crate::reader::CellValue;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Write sheets, in order, to a new XLSX file
pub fn write_xlsx(path: &Path, sheets: &[SheetData]) -> Result<()> {
    let file = File::create(path)?;
    let mut zip_writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    zip_writer.start_file("[Content_Types].xml", options)?;
    zip_writer.write_all(&content_types_xml(sheets.len())?)?;

    zip_writer.start_file("_rels/.rels", options)?;
    zip_writer.write_all(&root_rels_xml()?)?;

    zip_writer.start_file("xl/workbook.xml", options)?;
    zip_writer.write_all(&workbook_xml(sheets)?)?;

    zip_writer.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip_writer.write_all(&workbook_rels_xml(sheets.len())?)?;

    for (i, sheet) in sheets.iter().enumerate() {
        zip_writer.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip_writer.write_all(&worksheet_xml(sheet)?)?;
    }

    zip_writer.finish()?;
    Ok(())
}

fn xml_part<F>(build: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut XmlWriter) -> Result<()>,
{
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    build(&mut writer)?;
    Ok(writer.into_inner().into_inner())
}

fn start(writer: &mut XmlWriter, element: BytesStart) -> Result<()> {
    writer.write_event(Event::Start(element))?;
    Ok(())
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn empty(writer: &mut XmlWriter, element: BytesStart) -> Result<()> {
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn text(writer: &mut XmlWriter, content: &str) -> Result<()> {
    writer.write_event(Event::Text(BytesText::new(content)))?;
    Ok(())
}

fn content_types_xml(sheet_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        start(w, BytesStart::new("Types").with_attributes([("xmlns", CONTENT_TYPES_NS)]))?;
        empty(
            w,
            BytesStart::new("Default").with_attributes([
                ("Extension", "rels"),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-package.relationships+xml",
                ),
            ]),
        )?;
        empty(
            w,
            BytesStart::new("Default")
                .with_attributes([("Extension", "xml"), ("ContentType", "application/xml")]),
        )?;
        empty(
            w,
            BytesStart::new("Override").with_attributes([
                ("PartName", "/xl/workbook.xml"),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                ),
            ]),
        )?;
        for i in 1..=sheet_count {
            let part = format!("/xl/worksheets/sheet{}.xml", i);
            empty(
                w,
                BytesStart::new("Override").with_attributes([
                    ("PartName", part.as_str()),
                    (
                        "ContentType",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                    ),
                ]),
            )?;
        }
        end(w, "Types")
    })
}

fn root_rels_xml() -> Result<Vec<u8>> {
    xml_part(|w| {
        start(w, BytesStart::new("Relationships").with_attributes([("xmlns", PACKAGE_REL_NS)]))?;
        empty(
            w,
            BytesStart::new("Relationship").with_attributes([
                ("Id", "rId1"),
                (
                    "Type",
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
                ),
                ("Target", "xl/workbook.xml"),
            ]),
        )?;
        end(w, "Relationships")
    })
}

fn workbook_xml(sheets: &[SheetData]) -> Result<Vec<u8>> {
    xml_part(|w| {
        start(
            w,
            BytesStart::new("workbook").with_attributes([("xmlns", MAIN_NS), ("xmlns:r", REL_NS)]),
        )?;
        start(w, BytesStart::new("sheets"))?;
        for (i, sheet) in sheets.iter().enumerate() {
            let sheet_id = (i + 1).to_string();
            let rel_id = format!("rId{}", i + 1);
            empty(
                w,
                BytesStart::new("sheet").with_attributes([
                    ("name", sheet.name.as_str()),
                    ("sheetId", sheet_id.as_str()),
                    ("r:id", rel_id.as_str()),
                ]),
            )?;
        }
        end(w, "sheets")?;
        end(w, "workbook")
    })
}

fn workbook_rels_xml(sheet_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        start(w, BytesStart::new("Relationships").with_attributes([("xmlns", PACKAGE_REL_NS)]))?;
        for i in 1..=sheet_count {
            let rel_id = format!("rId{}", i);
            let target = format!("worksheets/sheet{}.xml", i);
            empty(
                w,
                BytesStart::new("Relationship").with_attributes([
                    ("Id", rel_id.as_str()),
                    (
                        "Type",
                        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
                    ),
                    ("Target", target.as_str()),
                ]),
            )?;
        }
        end(w, "Relationships")
    })
}

fn worksheet_xml(sheet: &SheetData) -> Result<Vec<u8>> {
    xml_part(|w| {
        start(w, BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)]))?;
        start(w, BytesStart::new("sheetData"))?;

        let header: Vec<CellValue> = sheet.headers.iter().map(|h| CellValue::from(h.as_str())).collect();
        write_row(w, 0, &header)?;
        for (i, row) in sheet.rows.iter().enumerate() {
            write_row(w, i as u32 + 1, row)?;
        }

        end(w, "sheetData")?;
        end(w, "worksheet")
    })
}

fn write_row(w: &mut XmlWriter, row: u32, cells: &[CellValue]) -> Result<()> {
    let row_number = (row + 1).to_string();
    start(w, BytesStart::new("row").with_attributes([("r", row_number.as_str())]))?;

    for (col, cell) in cells.iter().enumerate() {
        let reference = cell_reference(row, col as u32);
        match cell {
            CellValue::Empty => {}
            // NaN and infinities have no SpreadsheetML representation
            CellValue::Number(n) if !n.is_finite() => {}
            CellValue::Number(n) => {
                start(w, BytesStart::new("c").with_attributes([("r", reference.as_str())]))?;
                start(w, BytesStart::new("v"))?;
                text(w, &n.to_string())?;
                end(w, "v")?;
                end(w, "c")?;
            }
            CellValue::Boolean(b) => {
                start(
                    w,
                    BytesStart::new("c").with_attributes([("r", reference.as_str()), ("t", "b")]),
                )?;
                start(w, BytesStart::new("v"))?;
                text(w, if *b { "1" } else { "0" })?;
                end(w, "v")?;
                end(w, "c")?;
            }
            CellValue::Text(s) | CellValue::Error(s) => {
                start(
                    w,
                    BytesStart::new("c")
                        .with_attributes([("r", reference.as_str()), ("t", "inlineStr")]),
                )?;
                start(w, BytesStart::new("is"))?;
                let mut t = BytesStart::new("t");
                if s.trim() != s {
                    t.push_attribute(("xml:space", "preserve"));
                }
                start(w, t)?;
                text(w, s)?;
                end(w, "t")?;
                end(w, "is")?;
                end(w, "c")?;
            }
        }
    }

    end(w, "row")
}

/// Excel-style reference for 0-based coordinates (0, 0 -> "A1")
fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Convert column number to letter (0 -> A, 1 -> B, etc.)
fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}
