use calamine::{Reader, open_workbook_auto};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use stockcraft_core::{MaterialNo, Session, Status, StockConfig, StockError, read_report};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

// Helper to create a single-sheet XLSX with inline string cells
fn create_mock_xlsx(path: &Path, sheet: &str, rows: &[Vec<Cell>]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#
            .as_bytes(),
    )?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            sheet
        )
        .as_bytes(),
    )?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#.as_bytes())?;

    let mut sheet_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        sheet_xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                Cell::Text(s) => sheet_xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference, s
                )),
                Cell::Number(n) => {
                    sheet_xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n))
                }
                Cell::Blank => {}
            }
        }
        sheet_xml.push_str("</row>");
    }
    sheet_xml.push_str("</sheetData></worksheet>");

    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(sheet_xml.as_bytes())?;

    zip.finish()?;
    Ok(())
}

fn item_row(id: Cell, description: Cell, boxes: f64, pieces: f64, per_box: f64) -> Vec<Cell> {
    vec![
        id,
        description,
        Cell::Number(boxes),
        Cell::Number(pieces),
        Cell::Number(per_box),
    ]
}

fn create_inventory(path: &Path) -> anyhow::Result<()> {
    use Cell::*;
    create_mock_xlsx(
        path,
        "Inventory",
        &[
            vec![
                Text("Material No"),
                Text("Material Description"),
                Text("Stock in CBB"),
                Text("Stock in PKT"),
                Text("Alt UOM1 Num"),
            ],
            item_row(Number(9000579.0), Text("MARIE BISCUIT 75GM"), 4.0, 4.0, 24.0),
            item_row(Text("9000741.0"), Text("GLUCOSE BISCUIT 100GM"), 8.0, 0.0, 25.0),
            vec![Blank, Blank, Blank, Blank, Blank],
            item_row(Number(9000579.0), Text("MARIE DUPLICATE"), 1.0, 1.0, 1.0),
            item_row(Number(9001048.0), Blank, 2.0, 0.0, 16.0),
            item_row(Number(9001100.0), Text("CREAM CRACKERS 200GM"), 2.0, 0.0, 16.0),
        ],
    )
}

fn id(s: &str) -> MaterialNo {
    MaterialNo::parse(s).unwrap()
}

#[test]
fn test_open_cleans_inventory_workbook() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.xlsx");
    create_inventory(&input_path)?;

    let session = Session::open(&input_path, StockConfig::default())?;

    let ids: Vec<_> = session.items().iter().map(|i| i.material_no.as_str()).collect();
    assert_eq!(ids, vec!["9000579", "9000741", "9001100"]);
    assert_eq!(session.items()[0].row, 2);

    let warning_rows: Vec<_> = session.warnings().iter().map(|w| w.row).collect();
    assert_eq!(warning_rows, vec![Some(5), Some(6)]);
    assert_eq!(session.clean_report().duplicates_skipped, 1);

    Ok(())
}

#[test]
fn test_calculate_and_export_xlsx() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.xlsx");
    let output_path = dir.path().join("stock_analysis.xlsx");
    create_inventory(&input_path)?;

    let mut session = Session::open(&input_path, StockConfig::default())?;
    session.set_target(&id("9000579"), 0, 150)?;
    session.set_target(&id("9000741"), 0, 100)?;

    let report = session.calculate()?;
    assert_eq!(report.rows.len(), 2);
    // 9001100 has no target
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.summary.shortage_products, 1);
    assert_eq!(report.summary.excess_products, 1);

    session.export(&report, &output_path)?;

    let records = read_report(&output_path)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].material_no, id("9000579"));
    assert_eq!(records[0].description, "MARIE BISCUIT 75GM");
    assert_eq!(
        (records[0].delta_boxes, records[0].delta_pieces, records[0].delta_total),
        (-4, 146, 50)
    );
    assert_eq!(records[0].status, Status::Shortage);
    assert_eq!(records[1].delta_total, -100);
    assert_eq!(records[1].status, Status::Excess);

    let mut workbook = open_workbook_auto(&output_path)?;
    assert_eq!(workbook.sheet_names(), vec!["Stock Analysis", "Summary"]);
    let summary = workbook.worksheet_range("Summary")?;
    let cell = |row: u32, col: u32| summary.get_value((row, col)).map(|d| d.to_string());
    assert_eq!(cell(0, 0).as_deref(), Some("Metric"));
    assert_eq!(cell(1, 0).as_deref(), Some("Total Products"));
    assert_eq!(cell(1, 1).as_deref(), Some("2"));
    assert_eq!(cell(4, 0).as_deref(), Some("Balanced Products"));
    assert_eq!(cell(4, 1).as_deref(), Some("0"));

    Ok(())
}

#[test]
fn test_csv_inventory_with_toml_targets() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.csv");
    let targets_path = dir.path().join("targets.toml");
    let output_path = dir.path().join("results.csv");

    std::fs::write(
        &input_path,
        " Material No ,Material Description,Stock in CBB,Stock in PKT,Alt UOM1 Num\n\
         9000579,MARIE BISCUIT 75GM,4,4,24\n\
         9000741,GLUCOSE BISCUIT 100GM,8,0,25\n",
    )?;
    std::fs::write(
        &targets_path,
        "[targets.\"9000579\"]\npieces = 100\n\n[targets.\"9000741\"]\nboxes = 8\n",
    )?;

    let mut session = Session::open(&input_path, StockConfig::default())?;
    let warnings = session.load_targets(&targets_path)?;
    assert!(warnings.is_empty());

    let report = session.calculate()?;
    assert_eq!(report.rows[0].status, Status::Balanced);
    assert_eq!(report.rows[1].status, Status::Balanced);
    assert_eq!(report.summary.balanced_products, 2);

    session.export(&report, &output_path)?;
    let content = std::fs::read_to_string(&output_path)?;
    assert!(content.starts_with("Material No,Material Description,Stock in CBB"));
    assert!(content.contains("9000579,MARIE BISCUIT 75GM,4,4,24,0,100,100,100,-4,96,0,Balanced,0 boxes,0 pieces,0"));

    let records = read_report(&output_path)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].material_no, id("9000741"));

    Ok(())
}

#[test]
fn test_largest_quantities_round_trip_exactly() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.csv");

    std::fs::write(
        &input_path,
        "Material No,Material Description,Stock in CBB,Stock in PKT,Alt UOM1 Num\n\
         9000579,MARIE BISCUIT 75GM,0,9007199254740991,1\n\
         9000741,GLUCOSE BISCUIT 100GM,0,9007199254740993,1\n",
    )?;

    let mut session = Session::open(&input_path, StockConfig::default())?;
    // Above 2^53 - 1 is not a valid whole number
    assert_eq!(session.items()[1].stock_pieces, None);

    session.set_target(&id("9000579"), 0, 0)?;
    session.set_target(&id("9000741"), 0, 0)?;
    let report = session.calculate()?;
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].delta_total, -9_007_199_254_740_991);
    assert_eq!(report.warnings.len(), 1);

    for output_path in [dir.path().join("results.xlsx"), dir.path().join("results.csv")] {
        session.export(&report, &output_path)?;
        let records = read_report(&output_path)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].delta_pieces, -9_007_199_254_740_991);
        assert_eq!(records[0].delta_total, -9_007_199_254_740_991);
        assert_eq!(records[0].status, Status::Excess);
    }

    Ok(())
}

#[test]
fn test_template_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.xlsx");
    let template_path = dir.path().join("targets.csv");
    create_inventory(&input_path)?;

    let mut session = Session::open(&input_path, StockConfig::default())?;
    session.set_target(&id("9000579"), 1, 150)?;
    session.write_template(&template_path)?;

    let mut reopened = Session::open(&input_path, StockConfig::default())?;
    let warnings = reopened.load_targets(&template_path)?;
    assert!(warnings.is_empty());
    assert_eq!(reopened.targets().len(), 3);

    let marie = reopened.targets().get(&id("9000579")).unwrap();
    assert_eq!((marie.boxes, marie.pieces), (1, 150));
    let cream = reopened.targets().get(&id("9001100")).unwrap();
    assert_eq!((cream.boxes, cream.pieces), (0, 0));

    Ok(())
}

#[test]
fn test_export_without_rows_reads_back_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.xlsx");
    let output_path = dir.path().join("results.csv");
    create_inventory(&input_path)?;

    let session = Session::open(&input_path, StockConfig::default())?;
    let report = session.calculate()?;
    assert!(report.is_empty());
    assert_eq!(report.warnings.len(), 3);

    session.export(&report, &output_path)?;
    assert!(read_report(&output_path)?.is_empty());

    Ok(())
}

#[test]
fn test_open_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("inventory.xlsx");
    create_inventory(&input_path)?;

    let config = StockConfig {
        sheet: Some("Stock".to_string()),
        ..StockConfig::default()
    };
    assert!(matches!(
        Session::open(&input_path, config),
        Err(StockError::SheetNotFound(name)) if name == "Stock"
    ));

    let csv_path = dir.path().join("partial.csv");
    std::fs::write(&csv_path, "Material No,Stock in CBB\n9000579,4\n")?;
    match Session::open(&csv_path, StockConfig::default()) {
        Err(StockError::MissingColumns(columns)) => assert_eq!(
            columns,
            vec!["Material Description", "Stock in PKT", "Alt UOM1 Num"]
        ),
        other => panic!("expected missing columns, got {:?}", other.map(|_| ())),
    }

    Ok(())
}
