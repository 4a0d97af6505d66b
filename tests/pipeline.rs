use network_dashboard::data::loader::read_sheet;
use network_dashboard::export::{encode_xlsx, DEFAULT_PLOTLY_CDN};
use network_dashboard::{
    group_sum, parse_bytes, render, AggregationError, ChartKind, DashboardError,
    DashboardOptions, FileFormat, FilterColumn, FilterSpec, FilteredView, GroupBy, GroupOrder,
    InvalidGroupingError, PieBasis,
};
use rust_xlsxwriter::{Workbook, Worksheet};

const HEADERS: [&str; 6] = ["Name", "AP_Type", "IP_Address", "Switch IP", "Status", "Total_AP"];

fn upload(rows: &[[&str; 6]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    for (c, h) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, c as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (c, value) in row.iter().enumerate() {
            let c = c as u16;
            if c == 5 {
                match value.parse::<f64>() {
                    Ok(n) => worksheet.write_number(r, c, n).unwrap(),
                    Err(_) => worksheet.write_string(r, c, *value).unwrap(),
                };
            } else {
                worksheet.write_string(r, c, *value).unwrap();
            }
        }
    }
    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer().unwrap()
}

fn campus() -> Vec<u8> {
    upload(&[
        ["Library", "Indoor", "10.0.0.10", "172.16.0.1", "Online", "4"],
        ["Finance", "Outdoor", "10.1.0.10", "172.16.1.1", "Offline", "2"],
        ["Library", "Mesh", "10.0.0.11", "172.16.0.1", "Online", "7"],
        ["Admin", "Indoor", "10.2.0.10", "172.16.2.1", "Maintenance", "1"],
        ["Finance", "Indoor", "10.1.0.11", "172.16.1.1", "Online", "3"],
    ])
}

#[test]
fn upload_to_downloads() {
    let ds = parse_bytes(&campus(), FileFormat::Workbook).unwrap();
    let options = DashboardOptions::default();
    let view = render(&ds, &FilterSpec::all_selected(&ds), GroupBy::Name, &options).unwrap();

    assert_eq!(view.filtered.len(), 5);
    assert_eq!(view.grouped.keys(), ["Library", "Finance", "Admin"]);
    assert_eq!(view.grouped.totals(), [11.0, 5.0, 1.0]);
    assert_eq!(view.charts.get(ChartKind::Donut).hole, Some(0.3));

    let artifacts = view.downloads(&options).unwrap();
    assert_eq!(artifacts.len(), 5);
    for html in &artifacts[1..] {
        let text = std::str::from_utf8(&html.bytes).unwrap();
        assert!(text.contains(&format!(r#"<script src="{DEFAULT_PLOTLY_CDN}""#)));
        assert!(text.contains("Plotly.newPlot"));
    }
}

#[test]
fn single_narrowed_filter_is_a_no_op() {
    let ds = parse_bytes(&campus(), FileFormat::Workbook).unwrap();
    for col in FilterColumn::ALL {
        let mut spec = FilterSpec::all_selected(&ds);
        let first = ds.options(col)[0].clone();
        spec.select(col, [first]);
        let view = FilteredView::new(&ds, &spec);
        assert_eq!(view.len(), ds.len(), "narrowing {col} alone");
    }
}

#[test]
fn grouped_totals_are_conserved() {
    let ds = parse_bytes(&campus(), FileFormat::Workbook).unwrap();
    for group_by in GroupBy::ALL {
        let table = group_sum(&ds, group_by, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.grand_total(), 17.0, "grouping by {group_by}");
    }
}

#[test]
fn grouped_table_round_trip() {
    let ds = parse_bytes(&campus(), FileFormat::Workbook).unwrap();
    let table = group_sum(&ds, GroupBy::SwitchIp, GroupOrder::FirstSeen).unwrap();
    let sheet = read_sheet(&encode_xlsx(&table).unwrap()).unwrap();

    assert_eq!(sheet.headers, ["Switch IP", "Total_AP"]);
    assert_eq!(sheet.rows.len(), table.len());
    for (row, group) in sheet.rows.iter().zip(&table.rows) {
        assert_eq!(row[0].to_text(), group.key);
        assert_eq!(row[1].as_total(0), Ok(group.total));
    }
}

#[test]
fn invalid_grouping_and_bad_totals() {
    let ds = parse_bytes(&campus(), FileFormat::Workbook).unwrap();
    assert_eq!(
        "Foo".parse::<GroupBy>(),
        Err(InvalidGroupingError::Unknown("Foo".into()))
    );

    let bad = parse_bytes(
        &upload(&[["Library", "Indoor", "10.0.0.10", "172.16.0.1", "Online", "N/A"]]),
        FileFormat::Workbook,
    )
    .unwrap();
    let result = render(
        &bad,
        &FilterSpec::all_selected(&bad),
        GroupBy::Status,
        &DashboardOptions::default(),
    );
    assert!(matches!(
        result,
        Err(DashboardError::Aggregation(AggregationError::NonNumeric { row: 2, .. }))
    ));

    // The per-row pie sees the same amounts as the grouped table.
    let options = DashboardOptions {
        pie_basis: PieBasis::RawRows,
        ..DashboardOptions::default()
    };
    let view = render(&ds, &FilterSpec::all_selected(&ds), GroupBy::Status, &options).unwrap();
    assert_eq!(view.charts.pie.labels.len(), ds.len());
    assert_eq!(view.charts.pie.values.iter().sum::<f64>(), 17.0);
}
