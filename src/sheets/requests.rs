//! Builders for Sheets `batchUpdate` requests.
//!
//! Every function here is pure: it turns the report's shape and the style
//! configuration into request objects, and the caller decides when to send
//! them. Row and column arguments count cells; `data_rows` excludes the
//! header row.

use anyhow::Result;
use serde_json::{Value, json};
use std::collections::BTreeSet;

use crate::sheets::color::{Color, hex_to_color, hsl_to_rgb};
use crate::sheets::range::{ColumnKey, GridRange};
use crate::sheets::style::{ColumnStyle, HeaderStyle, PlanetStyle, StyleConfig};

/// Base text colour, #434343.
pub const BASE_TEXT: Color = Color {
    red: 67.0 / 255.0,
    green: 67.0 / 255.0,
    blue: 67.0 / 255.0,
};
/// Alternate row background, #F6F8F9.
pub const STRIPE: Color = Color {
    red: 246.0 / 255.0,
    green: 248.0 / 255.0,
    blue: 249.0 / 255.0,
};
/// Text colour of the sparse dropdown column, #646464.
pub const DROPDOWN_TEXT: Color = Color {
    red: 100.0 / 255.0,
    green: 100.0 / 255.0,
    blue: 100.0 / 255.0,
};

/// Column indices left of which a group separator is drawn.
pub const GROUP_EDGES: [usize; 6] = [5, 10, 12, 15, 18, 21];

/// Column holding the broad topic label.
pub const CATEGORY_COLUMN: usize = 2;
/// Column holding the medium topic label, empty for broad topics.
pub const SUBCATEGORY_COLUMN: usize = 3;

/// Sets the grid size to exactly fit the report.
pub fn resize_request(sheet_id: i64, rows: usize, cols: usize) -> Value {
    json!({
        "updateSheetProperties": {
            "properties": {
                "sheetId": sheet_id,
                "gridProperties": {"rowCount": rows.max(1), "columnCount": cols.max(1)},
            },
            "fields": "gridProperties(rowCount,columnCount)",
        }
    })
}

/// Clears the filter, formatting, borders and `existing_rules` conditional
/// format rules, then applies the base font and colours.
pub fn reset_requests(sheet_id: i64, rows: usize, cols: usize, existing_rules: usize) -> Vec<Value> {
    let range = GridRange::new(sheet_id, 0..rows.max(1), 0..cols.max(1));
    let none = json!({"style": "NONE"});

    let mut requests = vec![
        json!({"clearBasicFilter": {"sheetId": sheet_id}}),
        json!({
            "repeatCell": {
                "range": range,
                "cell": {"userEnteredFormat": {
                    "textFormat": {
                        "fontFamily": "Roboto",
                        "fontSize": 10,
                        "foregroundColor": BASE_TEXT,
                        "bold": false,
                        "italic": false,
                    },
                    "horizontalAlignment": "LEFT",
                    "verticalAlignment": "MIDDLE",
                    "backgroundColor": Color::WHITE,
                    "wrapStrategy": "OVERFLOW_CELL",
                }},
                "fields": "userEnteredFormat",
            }
        }),
        json!({
            "updateBorders": {
                "range": range,
                "top": none,
                "bottom": none,
                "left": none,
                "right": none,
                "innerHorizontal": none,
                "innerVertical": none,
            }
        }),
    ];

    // Each deletion shifts the remaining rules down, so index 0 every time.
    requests.extend(
        (0..existing_rules)
            .map(|_| json!({"deleteConditionalFormatRule": {"sheetId": sheet_id, "index": 0}})),
    );
    requests
}

/// Vertical centring of data rows and a light stripe on every other row.
pub fn base_design_requests(sheet_id: i64, data_rows: usize, cols: usize) -> Vec<Value> {
    let total_rows = data_rows + 1;
    let mut requests = vec![json!({
        "repeatCell": {
            "range": GridRange::new(sheet_id, 1..total_rows, 0..cols),
            "cell": {"userEnteredFormat": {"verticalAlignment": "MIDDLE"}},
            "fields": "userEnteredFormat.verticalAlignment",
        }
    })];

    for row in (2..total_rows).step_by(2) {
        requests.push(json!({
            "repeatCell": {
                "range": GridRange::new(sheet_id, row..row + 1, 0..cols),
                "cell": {"userEnteredFormat": {"backgroundColor": STRIPE}},
                "fields": "userEnteredFormat.backgroundColor",
            }
        }));
    }
    requests
}

/// Header colours and font, frozen first row and header row height.
pub fn header_requests(sheet_id: i64, cols: usize, style: &HeaderStyle) -> Result<Vec<Value>> {
    let background = hex_to_color(&style.background_color)?;
    let text = hex_to_color(&style.text_color)?;

    Ok(vec![
        json!({
            "repeatCell": {
                "range": GridRange::new(sheet_id, 0..1, 0..cols),
                "cell": {"userEnteredFormat": {
                    "backgroundColor": background,
                    "textFormat": {
                        "bold": style.bold,
                        "foregroundColor": text,
                        "fontSize": style.font_size,
                    },
                    "horizontalAlignment": "CENTER",
                    "verticalAlignment": "MIDDLE",
                }},
                "fields": "userEnteredFormat(backgroundColor,textFormat,horizontalAlignment,verticalAlignment)",
            }
        }),
        json!({
            "updateSheetProperties": {
                "properties": {"sheetId": sheet_id, "gridProperties": {"frozenRowCount": 1}},
                "fields": "gridProperties.frozenRowCount",
            }
        }),
        json!({
            "updateDimensionProperties": {
                "range": {"sheetId": sheet_id, "dimension": "ROWS", "startIndex": 0, "endIndex": 1},
                "properties": {"pixelSize": style.height_px},
                "fields": "pixelSize",
            }
        }),
    ])
}

/// Basic filter over the header and data rows.
pub fn filter_request(sheet_id: i64, data_rows: usize, cols: usize) -> Value {
    json!({
        "setBasicFilter": {
            "filter": {"range": GridRange::new(sheet_id, 0..data_rows + 1, 0..cols)}
        }
    })
}

/// Wraps text in every header cell.
pub fn wrap_header_request(sheet_id: i64, cols: usize) -> Value {
    json!({
        "repeatCell": {
            "range": GridRange::new(sheet_id, 0..1, 0..cols),
            "cell": {"userEnteredFormat": {"wrapStrategy": "WRAP"}},
            "fields": "userEnteredFormat.wrapStrategy",
        }
    })
}

/// Outer border and column-group lines.
///
/// Inner lines are always cleared first; with `has_planet` off nothing else
/// is drawn.
pub fn planet_requests(
    sheet_id: i64,
    data_rows: usize,
    cols: usize,
    style: &PlanetStyle,
) -> Result<Vec<Value>> {
    let total_rows = data_rows + 1;
    let mut requests = vec![json!({
        "updateBorders": {
            "range": GridRange::new(sheet_id, 0..total_rows, 0..cols),
            "innerHorizontal": {"style": "NONE"},
            "innerVertical": {"style": "NONE"},
        }
    })];

    if !style.has_planet {
        return Ok(requests);
    }

    let color = hex_to_color(&style.planet_color)?;
    let solid = json!({"style": "SOLID", "width": 2, "color": color});
    let row0 = style.start_row.saturating_sub(1);
    let col0 = style.start_col.saturating_sub(1);

    requests.push(json!({
        "updateBorders": {
            "range": GridRange::new(sheet_id, row0..row0 + total_rows, col0..col0 + cols),
            "top": solid,
            "bottom": solid,
            "left": solid,
            "right": solid,
        }
    }));

    for edge in GROUP_EDGES {
        requests.push(json!({
            "updateBorders": {
                "range": GridRange::column(sheet_id, edge, 0..total_rows),
                "left": solid,
            }
        }));
    }

    Ok(requests)
}

/// Treats blank cells and stringified nulls as empty.
fn is_blank(value: &str) -> bool {
    matches!(value.trim(), "" | "None" | "nan")
}

/// Sorted, de-duplicated non-blank values.
pub fn distinct_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !is_blank(v))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn one_of_list(values: &[String]) -> Value {
    let values: Vec<Value> = values.iter().map(|v| json!({"userEnteredValue": v})).collect();
    json!({
        "condition": {"type": "ONE_OF_LIST", "values": values},
        "showCustomUi": true,
        "strict": true,
    })
}

/// Dropdown over a whole column plus one pastel colour per value.
///
/// Value `i` of `n` gets hue `i / n`; the background is very light and the
/// bold text a darker tone of the same hue.
pub fn category_dropdown_requests(
    sheet_id: i64,
    col: usize,
    values: &[&str],
) -> Vec<Value> {
    let categories = distinct_values(values.iter().copied());
    if categories.is_empty() {
        return Vec::new();
    }

    let range = GridRange::column(sheet_id, col, 1..values.len() + 1);
    let mut requests = vec![json!({
        "setDataValidation": {"range": range, "rule": one_of_list(&categories)}
    })];

    let n = categories.len() as f64;
    let (s, l) = (0.38, 0.94);
    for (i, category) in categories.iter().enumerate() {
        let hue = i as f64 / n;
        let background = hsl_to_rgb(hue, s, l);
        let text = hsl_to_rgb(hue, (s + 0.25_f64).min(1.0), (l - 0.65_f64).max(0.0));
        requests.push(json!({
            "addConditionalFormatRule": {
                "rule": {
                    "ranges": [range],
                    "booleanRule": {
                        "condition": {"type": "TEXT_EQ", "values": [{"userEnteredValue": category}]},
                        "format": {
                            "backgroundColor": background,
                            "textFormat": {"foregroundColor": text, "bold": true},
                        },
                    },
                },
                "index": 0,
            }
        }));
    }
    requests
}

/// Contiguous runs of non-blank values as half-open sheet row ranges.
///
/// `values[0]` sits on sheet row index 1, below the header.
pub fn non_blank_blocks(values: &[&str]) -> Vec<std::ops::Range<usize>> {
    let mut blocks: Vec<std::ops::Range<usize>> = Vec::new();
    for (i, value) in values.iter().enumerate() {
        if is_blank(value) {
            continue;
        }
        let row = i + 1;
        match blocks.last_mut() {
            Some(block) if block.end == row => block.end = row + 1,
            _ => blocks.push(row..row + 1),
        }
    }
    blocks
}

/// Dropdown and grey bold text on the non-blank cells of a sparsely filled column.
pub fn sparse_dropdown_requests(sheet_id: i64, col: usize, values: &[&str]) -> Vec<Value> {
    let categories = distinct_values(values.iter().copied());
    let blocks = non_blank_blocks(values);
    if categories.is_empty() || blocks.is_empty() {
        return Vec::new();
    }

    let rule = one_of_list(&categories);
    let mut requests = Vec::with_capacity(blocks.len() * 2);
    for block in blocks {
        let range = GridRange::column(sheet_id, col, block);
        requests.push(json!({
            "setDataValidation": {"range": range, "rule": rule}
        }));
        requests.push(json!({
            "repeatCell": {
                "range": range,
                "cell": {"userEnteredFormat": {
                    "textFormat": {"foregroundColor": DROPDOWN_TEXT, "bold": true}
                }},
                "fields": "userEnteredFormat.textFormat",
            }
        }));
    }
    requests
}

fn number_format(kind: &str) -> Value {
    match kind.to_ascii_uppercase().as_str() {
        "PERCENT" => json!({"type": "PERCENT", "pattern": "0.00%"}),
        "NUMBER" => json!({"type": "NUMBER", "pattern": "0.00"}),
        "CURRENCY" => json!({"type": "CURRENCY", "pattern": "¥#,##0.00"}),
        other => json!({"type": other}),
    }
}

/// Font, alignment, wrapping, number format and optional width for one column.
pub fn column_style_requests(
    sheet_id: i64,
    col: usize,
    data_rows: usize,
    style: &ColumnStyle,
) -> Result<Vec<Value>> {
    let start_row = if style.exclude_header { 1 } else { 0 };
    let foreground = hex_to_color(&style.foreground_color)?;
    let wrap = style.wrap.strategy()?;

    let mut format = json!({
        "textFormat": {
            "fontFamily": style.font_family,
            "fontSize": style.font_size,
            "bold": style.bold,
            "italic": style.italic,
            "foregroundColor": foreground,
        },
        "horizontalAlignment": style.horizontal.to_ascii_uppercase(),
        "verticalAlignment": style.vertical.to_ascii_uppercase(),
        "wrapStrategy": wrap,
    });
    let mut fields = vec![
        "userEnteredFormat.textFormat",
        "userEnteredFormat.horizontalAlignment",
        "userEnteredFormat.verticalAlignment",
        "userEnteredFormat.wrapStrategy",
    ];
    if let Some(kind) = style.number_format.as_deref().filter(|k| !k.is_empty()) {
        format["numberFormat"] = number_format(kind);
        fields.push("userEnteredFormat.numberFormat");
    }

    let mut requests = vec![json!({
        "repeatCell": {
            "range": GridRange::column(sheet_id, col, start_row..data_rows + 1),
            "cell": {"userEnteredFormat": format},
            "fields": fields.join(","),
        }
    })];

    if let Some(width) = style.column_width.filter(|w| *w > 0) {
        requests.push(json!({
            "updateDimensionProperties": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "COLUMNS",
                    "startIndex": col,
                    "endIndex": col + 1,
                },
                "properties": {"pixelSize": width},
                "fields": "pixelSize",
            }
        }));
    }
    Ok(requests)
}

/// The full styling pass for a report written at `A1`.
///
/// `rows` holds the written cell values without the header. An empty report
/// only gets the reset.
pub fn style_requests(
    sheet_id: i64,
    headers: &[&str],
    rows: &[Vec<Value>],
    style: &StyleConfig,
    existing_rules: usize,
) -> Result<Vec<Value>> {
    let cols = headers.len();
    let data_rows = rows.len();

    let mut requests = reset_requests(sheet_id, data_rows + 1, cols, existing_rules);
    if rows.is_empty() {
        return Ok(requests);
    }

    requests.extend(base_design_requests(sheet_id, data_rows, cols));
    requests.extend(header_requests(sheet_id, cols, &style.header)?);
    requests.push(filter_request(sheet_id, data_rows, cols));
    requests.push(wrap_header_request(sheet_id, cols));
    requests.extend(planet_requests(sheet_id, data_rows, cols, &style.planet)?);

    let column_text = |col: usize| -> Vec<&str> {
        rows.iter()
            .map(|r| r.get(col).and_then(Value::as_str).unwrap_or(""))
            .collect()
    };
    if cols > CATEGORY_COLUMN {
        requests.extend(category_dropdown_requests(
            sheet_id,
            CATEGORY_COLUMN,
            &column_text(CATEGORY_COLUMN),
        ));
    }
    if cols > SUBCATEGORY_COLUMN {
        requests.extend(sparse_dropdown_requests(
            sheet_id,
            SUBCATEGORY_COLUMN,
            &column_text(SUBCATEGORY_COLUMN),
        ));
    }

    for (key, column_style) in &style.columns {
        let col = ColumnKey::from(key.as_str()).resolve(headers)?;
        requests.extend(column_style_requests(sheet_id, col, data_rows, column_style)?);
    }

    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::style::Wrap;

    fn kind(request: &Value) -> &str {
        request
            .as_object()
            .and_then(|o| o.keys().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    #[test]
    fn test_reset_deletes_every_existing_rule() {
        let requests = reset_requests(3, 5, 28, 2);
        assert_eq!(requests.len(), 5);
        assert_eq!(kind(&requests[0]), "clearBasicFilter");
        assert_eq!(requests[4]["deleteConditionalFormatRule"]["index"], 0);
        assert_eq!(requests[1]["repeatCell"]["range"]["endColumnIndex"], 28);
    }

    #[test]
    fn test_base_design_stripes_even_rows() {
        let requests = base_design_requests(0, 5, 4);
        // middle alignment + rows 2 and 4
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1]["repeatCell"]["range"]["startRowIndex"], 2);
        assert_eq!(requests[2]["repeatCell"]["range"]["startRowIndex"], 4);
    }

    #[test]
    fn test_header_requests_freeze_and_height() {
        let requests = header_requests(9, 28, &HeaderStyle::default()).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[1]["updateSheetProperties"]["properties"]["gridProperties"]["frozenRowCount"],
            1
        );
        assert_eq!(requests[2]["updateDimensionProperties"]["properties"]["pixelSize"], 40);
        assert_eq!(
            requests[0]["repeatCell"]["cell"]["userEnteredFormat"]["backgroundColor"]["red"],
            0x35 as f64 / 255.0
        );
    }

    #[test]
    fn test_header_rejects_bad_color() {
        let style = HeaderStyle {
            text_color: "white".to_string(),
            ..Default::default()
        };
        assert!(header_requests(0, 3, &style).is_err());
    }

    #[test]
    fn test_planet_disabled_only_clears() {
        let style = PlanetStyle {
            has_planet: false,
            ..Default::default()
        };
        let requests = planet_requests(0, 4, 28, &style).unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]["updateBorders"]["top"].is_null());
    }

    #[test]
    fn test_planet_draws_outline_and_groups() {
        let requests = planet_requests(0, 4, 28, &PlanetStyle::default()).unwrap();
        assert_eq!(requests.len(), 2 + GROUP_EDGES.len());
        let outline = &requests[1]["updateBorders"];
        assert_eq!(outline["range"]["endRowIndex"], 5);
        assert_eq!(outline["top"]["width"], 2);
        assert_eq!(requests[2]["updateBorders"]["range"]["startColumnIndex"], 5);
        assert_eq!(requests[7]["updateBorders"]["range"]["startColumnIndex"], 21);
    }

    #[test]
    fn test_distinct_values_drop_blanks() {
        let values = distinct_values(["b", "a", "", "nan", "None", " b ", "a"]);
        assert_eq!(values, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_category_dropdown() {
        let requests = category_dropdown_requests(1, 2, &["Health", "Energy", "Health"]);
        // validation + one rule per category
        assert_eq!(requests.len(), 3);
        let values = &requests[0]["setDataValidation"]["rule"]["condition"]["values"];
        assert_eq!(values[0]["userEnteredValue"], "Energy");
        assert_eq!(values[1]["userEnteredValue"], "Health");
        assert_eq!(requests[0]["setDataValidation"]["range"]["endRowIndex"], 4);
        assert_eq!(
            requests[1]["addConditionalFormatRule"]["rule"]["booleanRule"]["format"]["textFormat"]["bold"],
            true
        );
    }

    #[test]
    fn test_category_dropdown_empty_column() {
        assert!(category_dropdown_requests(1, 2, &["", "nan"]).is_empty());
    }

    #[test]
    fn test_non_blank_blocks() {
        let blocks = non_blank_blocks(&["", "Sleep", "Diet", "", "Solar", "None"]);
        assert_eq!(blocks, vec![2..4, 5..6]);
        assert!(non_blank_blocks(&["", ""]).is_empty());
    }

    #[test]
    fn test_sparse_dropdown_one_pair_per_block() {
        let requests = sparse_dropdown_requests(0, 3, &["", "Sleep", "Diet", "", "Solar"]);
        assert_eq!(requests.len(), 4);
        assert_eq!(kind(&requests[0]), "setDataValidation");
        assert_eq!(kind(&requests[1]), "repeatCell");
        assert_eq!(requests[2]["setDataValidation"]["range"]["startRowIndex"], 5);
    }

    #[test]
    fn test_column_style_number_format_and_width() {
        let style = ColumnStyle {
            number_format: Some("percent".to_string()),
            column_width: Some(120),
            wrap: Wrap::Flag(true),
            ..Default::default()
        };
        let requests = column_style_requests(0, 6, 10, &style).unwrap();
        assert_eq!(requests.len(), 2);

        let repeat = &requests[0]["repeatCell"];
        assert_eq!(repeat["range"]["startRowIndex"], 1);
        assert_eq!(repeat["range"]["endRowIndex"], 11);
        assert_eq!(repeat["cell"]["userEnteredFormat"]["numberFormat"]["pattern"], "0.00%");
        assert_eq!(repeat["cell"]["userEnteredFormat"]["wrapStrategy"], "WRAP");
        assert!(repeat["fields"].as_str().unwrap().ends_with("numberFormat"));
        assert_eq!(requests[1]["updateDimensionProperties"]["properties"]["pixelSize"], 120);
    }

    #[test]
    fn test_column_style_plain() {
        let requests = column_style_requests(0, 0, 3, &ColumnStyle::default()).unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]["repeatCell"]["cell"]["userEnteredFormat"]["numberFormat"].is_null());
    }

    #[test]
    fn test_style_requests_empty_report_only_resets() {
        let requests = style_requests(0, &["a", "b"], &[], &StyleConfig::default(), 1).unwrap();
        assert_eq!(requests.len(), 4);
    }

    #[test]
    fn test_style_requests_unknown_column_key() {
        let mut style = StyleConfig::default();
        style
            .columns
            .insert("No Such Column!".to_string(), ColumnStyle::default());
        let rows = vec![vec![json!("1"), json!("t1"), json!("Health"), json!("")]];
        let result = style_requests(0, &["depth", "topic_id", "broad", "medium"], &rows, &style, 0);
        assert!(result.is_err());
    }
}
