//! `.pdf` encoder: a titled, gridded table laid out on A4 pages.
//!
//! Text uses the standard Helvetica faces, so no font is embedded and the
//! output only depends on the report content.

use chrono::NaiveDate;
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};

use crate::{EngineError, ResultEngine};

use super::{Cells, Report};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 30;

const COLUMN_WIDTHS: [i64; 4] = [94, 230, 86, 94];
const AMOUNT_COLUMN: usize = 3;
const ROW_HEIGHT: i64 = 18;
const FONT_SIZE: i64 = 10;
const CELL_PADDING: i64 = 6;
const TEXT_RISE: i64 = 6;

const TITLE_SIZE: i64 = 18;
const TITLE_BLOCK: i64 = 36;
const TITLE_SPACER: i64 = 14;

const ELLIPSIS: &str = "...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    /// Advance width of `c` in 1/1000 em.
    fn advance(self, c: char) -> i64 {
        let table = match self {
            Self::Regular => &HELVETICA_WIDTHS,
            Self::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match c as u32 {
            code @ 0x20..=0x7e => table[(code - 0x20) as usize],
            _ => 556,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowStyle {
    Header,
    /// Data row; `true` for the first, third, ... row.
    Band(bool),
    Total,
}

impl RowStyle {
    fn font(self) -> Font {
        match self {
            Self::Band(_) => Font::Regular,
            Self::Header | Self::Total => Font::Bold,
        }
    }
}

/// Style of body row `index`; the row after the last data row is the total.
fn body_style(index: usize, data_rows: usize) -> RowStyle {
    if index == data_rows {
        RowStyle::Total
    } else {
        RowStyle::Band(index % 2 == 0)
    }
}

pub(super) fn render(report: &Report) -> ResultEngine<Vec<u8>> {
    let render_error = |err: lopdf::Error| EngineError::Render(err.to_string());

    let header = report.headers();
    let body: Vec<(RowStyle, Cells)> = report
        .rows()
        .into_iter()
        .enumerate()
        .map(|(index, cells)| (body_style(index, report.lines.len()), cells))
        .collect();

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let title = report.title();
    let mut kids: Vec<Object> = Vec::new();
    for (page_index, rows) in paginate(&body).into_iter().enumerate() {
        let first_page = page_index == 0;
        let content = Content {
            operations: page_operations(first_page.then_some(title.as_str()), &header, rows),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(render_error)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0i64.into(),
        0i64.into(),
        PAGE_WIDTH.into(),
        PAGE_HEIGHT.into(),
    ];
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(&title)),
        "CreationDate" => Object::string_literal(pdf_date(report.generated_on)),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|err| EngineError::Render(err.to_string()))?;
    Ok(buffer)
}

fn table_top(first_page: bool) -> i64 {
    if first_page {
        PAGE_HEIGHT - MARGIN - TITLE_BLOCK - TITLE_SPACER
    } else {
        PAGE_HEIGHT - MARGIN
    }
}

/// Body rows that fit below the repeated header on a page.
fn rows_per_page(first_page: bool) -> usize {
    ((table_top(first_page) - MARGIN) / ROW_HEIGHT - 1) as usize
}

fn paginate(body: &[(RowStyle, Cells)]) -> Vec<&[(RowStyle, Cells)]> {
    let mut pages = Vec::new();
    let mut rest = body;
    let mut first_page = true;
    loop {
        let take = rows_per_page(first_page).min(rest.len());
        let (page, tail) = rest.split_at(take);
        pages.push(page);
        rest = tail;
        first_page = false;
        if rest.is_empty() {
            break;
        }
    }
    pages
}

fn table_left() -> i64 {
    let table_width: i64 = COLUMN_WIDTHS.iter().sum();
    MARGIN + (PAGE_WIDTH - 2 * MARGIN - table_width) / 2
}

fn page_operations(
    title: Option<&str>,
    header: &Cells,
    body: &[(RowStyle, Cells)],
) -> Vec<Operation> {
    let mut ops = Vec::new();

    if let Some(title) = title {
        let x = (PAGE_WIDTH - text_width(title, Font::Bold, TITLE_SIZE)) / 2;
        let y = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
        push_text(&mut ops, Font::Bold, TITLE_SIZE, x, y, title);
    }

    let top = table_top(title.is_some());
    let rows = std::iter::once((RowStyle::Header, header))
        .chain(body.iter().map(|(style, cells)| (*style, cells)));

    let mut grid = Vec::new();
    for (index, (style, cells)) in rows.enumerate() {
        let bottom = top - (index as i64 + 1) * ROW_HEIGHT;
        draw_row(&mut ops, style, cells, bottom);
        let mut x = table_left();
        for width in COLUMN_WIDTHS {
            grid.push(Operation::new(
                "re",
                vec![x.into(), bottom.into(), width.into(), ROW_HEIGHT.into()],
            ));
            x += width;
        }
    }

    ops.push(Operation::new("w", vec![Object::Real(0.5)]));
    ops.push(Operation::new("G", vec![Object::Real(0.5)]));
    ops.extend(grid);
    ops.push(Operation::new("S", vec![]));
    ops
}

fn draw_row(ops: &mut Vec<Operation>, style: RowStyle, cells: &Cells, bottom: i64) {
    let left = table_left();
    let table_width: i64 = COLUMN_WIDTHS.iter().sum();

    if let Some(fill) = row_fill(style) {
        ops.push(fill);
        ops.push(Operation::new(
            "re",
            vec![left.into(), bottom.into(), table_width.into(), ROW_HEIGHT.into()],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    ops.push(Operation::new("g", vec![0i64.into()]));
    let font = style.font();
    let mut cell_left = left;
    for (col, (text, width)) in cells.iter().zip(COLUMN_WIDTHS).enumerate() {
        let text = fit(text, font, width - 2 * CELL_PADDING);
        if !text.is_empty() {
            let x = if col == AMOUNT_COLUMN && style != RowStyle::Header {
                cell_left + width - CELL_PADDING - text_width(&text, font, FONT_SIZE)
            } else {
                cell_left + CELL_PADDING
            };
            push_text(ops, font, FONT_SIZE, x, bottom + TEXT_RISE, &text);
        }
        cell_left += width;
    }
}

/// Header rows are light grey; data rows alternate whitesmoke and beige; the
/// total row is left unshaded.
fn row_fill(style: RowStyle) -> Option<Operation> {
    let operands = match style {
        RowStyle::Header => vec![Object::Real(0.827), Object::Real(0.827), Object::Real(0.827)],
        RowStyle::Band(true) => vec![Object::Real(0.961), Object::Real(0.961), Object::Real(0.961)],
        RowStyle::Band(false) => vec![
            Object::Real(0.961),
            Object::Real(0.961),
            Object::Real(0.863),
        ],
        RowStyle::Total => return None,
    };
    Some(Operation::new("rg", operands))
}

fn push_text(ops: &mut Vec<Operation>, font: Font, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.resource().into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(encode_text(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Rendered width in points, rounded to the nearest point.
fn text_width(text: &str, font: Font, size: i64) -> i64 {
    let units: i64 = text.chars().map(|c| font.advance(c)).sum();
    (units * size + 500) / 1000
}

/// Shorten `text` with an ellipsis until it fits `max_width` points.
fn fit(text: &str, font: Font, max_width: i64) -> String {
    if text_width(text, font, FONT_SIZE) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + ELLIPSIS;
        if text_width(&candidate, font, FONT_SIZE) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// WinAnsi bytes; characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7e | 0xa0..=0xff) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn pdf_date(date: NaiveDate) -> String {
    format!("D:{}000000Z", date.format("%Y%m%d"))
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [i64; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [i64; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn body(n: usize) -> Vec<(RowStyle, Cells)> {
        (0..n)
            .map(|i| (RowStyle::Band(i % 2 == 0), Default::default()))
            .collect()
    }

    #[test]
    fn small_tables_fit_one_page() {
        assert_eq!(paginate(&body(3)).len(), 1);
        assert_eq!(paginate(&body(0)).len(), 1);
    }

    #[test]
    fn long_tables_continue_on_new_pages() {
        let first = rows_per_page(true);
        let next = rows_per_page(false);
        assert!(next > first);

        let rows = body(first + next + 1);
        let pages = paginate(&rows);
        let sizes: Vec<usize> = pages.iter().map(|p| p.len()).collect();
        assert_eq!(sizes, [first, next, 1]);
    }

    #[test]
    fn amounts_measure_with_digit_widths() {
        // Five digits and a dot at 10pt: (5 * 556 + 278) * 10 / 1000.
        assert_eq!(text_width("700.00", Font::Regular, 10), 31);
        assert_eq!(text_width("1234.50", Font::Regular, 10), 36);
    }

    #[test]
    fn long_descriptions_are_ellipsized() {
        let long = "x".repeat(200);
        let fitted = fit(&long, Font::Regular, 100);
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(text_width(&fitted, Font::Regular, FONT_SIZE) <= 100);
        assert_eq!(fit("Rent", Font::Regular, 100), "Rent");
    }

    fn cells(values: [&str; 4]) -> Cells {
        values.map(String::from)
    }

    fn drawn(style: RowStyle, values: [&str; 4]) -> Vec<Operation> {
        let mut ops = Vec::new();
        draw_row(&mut ops, style, &cells(values), 100);
        ops
    }

    fn operands<'a>(ops: &'a [Operation], operator: &str) -> Vec<&'a [Object]> {
        ops.iter()
            .filter(|op| op.operator == operator)
            .map(|op| op.operands.as_slice())
            .collect()
    }

    fn fonts(ops: &[Operation]) -> Vec<Vec<u8>> {
        operands(ops, "Tf")
            .into_iter()
            .map(|operands| match &operands[0] {
                Object::Name(name) => name.clone(),
                other => panic!("unexpected font operand {other:?}"),
            })
            .collect()
    }

    fn texts(ops: &[Operation]) -> Vec<Vec<u8>> {
        operands(ops, "Tj")
            .into_iter()
            .map(|operands| match &operands[0] {
                Object::String(text, _) => text.clone(),
                other => panic!("unexpected text operand {other:?}"),
            })
            .collect()
    }

    fn x_positions(ops: &[Operation]) -> Vec<i64> {
        operands(ops, "Td")
            .into_iter()
            .map(|operands| match operands[0] {
                Object::Integer(x) => x,
                ref other => panic!("unexpected position {other:?}"),
            })
            .collect()
    }

    #[test]
    fn data_rows_alternate_and_total_closes_the_table() {
        let styles: Vec<RowStyle> = (0..4).map(|index| body_style(index, 3)).collect();
        assert_eq!(
            styles,
            [
                RowStyle::Band(true),
                RowStyle::Band(false),
                RowStyle::Band(true),
                RowStyle::Total,
            ]
        );
        assert_eq!(body_style(0, 0), RowStyle::Total);
    }

    #[test]
    fn only_header_and_data_rows_are_shaded() {
        assert!(row_fill(RowStyle::Total).is_none());

        let fill = |style| format!("{:?}", row_fill(style).unwrap().operands);
        assert_ne!(fill(RowStyle::Band(true)), fill(RowStyle::Band(false)));
        assert_ne!(fill(RowStyle::Header), fill(RowStyle::Band(true)));
        assert_ne!(fill(RowStyle::Header), fill(RowStyle::Band(false)));

        let total = drawn(RowStyle::Total, ["", "", "Total", "700.00"]);
        assert!(operands(&total, "rg").is_empty());
        assert!(operands(&total, "f").is_empty());
        let band = drawn(RowStyle::Band(false), ["05-Jan-2025", "Rent", "cash", "500.00"]);
        assert_eq!(operands(&band, "rg").len(), 1);
        assert_eq!(operands(&band, "f").len(), 1);
    }

    #[test]
    fn header_and_total_are_bold() {
        let header = drawn(RowStyle::Header, ["Date", "Description", "Mode", "Amount (INR)"]);
        assert_eq!(fonts(&header), vec![b"F2".to_vec(); 4]);

        // Blank cells are skipped, leaving the label and the amount.
        let total = drawn(RowStyle::Total, ["", "", "Total", "700.00"]);
        assert_eq!(fonts(&total), vec![b"F2".to_vec(); 2]);

        let band = drawn(RowStyle::Band(true), ["05-Jan-2025", "Rent", "cash", "500.00"]);
        assert_eq!(fonts(&band), vec![b"F1".to_vec(); 4]);
    }

    #[test]
    fn amounts_are_right_aligned_except_in_header() {
        let amount_left: i64 = table_left() + COLUMN_WIDTHS[..AMOUNT_COLUMN].iter().sum::<i64>();
        let amount_right = amount_left + COLUMN_WIDTHS[AMOUNT_COLUMN];

        for (style, amount) in [
            (RowStyle::Band(true), "500.00"),
            (RowStyle::Band(false), "12345.50"),
            (RowStyle::Total, "12845.50"),
        ] {
            let font = style.font();
            let ops = drawn(style, ["", "", "x", amount]);
            let x = *x_positions(&ops).last().unwrap();
            assert_eq!(
                x + text_width(amount, font, FONT_SIZE),
                amount_right - CELL_PADDING
            );
        }

        let header = drawn(RowStyle::Header, ["Date", "Description", "Mode", "Amount (INR)"]);
        assert_eq!(
            *x_positions(&header).last().unwrap(),
            amount_left + CELL_PADDING
        );
    }

    #[test]
    fn every_page_starts_with_the_header() {
        let header = cells(["Date", "Description", "Mode", "Amount (INR)"]);
        let rows = vec![(RowStyle::Band(true), cells(["05-Jan-2025", "Rent", "cash", "500.00"]))];

        let first = page_operations(Some("Expenses Report"), &header, &rows);
        let first_texts = texts(&first);
        assert_eq!(first_texts[0], b"Expenses Report".to_vec());
        assert_eq!(first_texts[1], b"Date".to_vec());

        let next = page_operations(None, &header, &rows);
        let next_texts = texts(&next);
        assert_eq!(next_texts[0], b"Date".to_vec());
        assert_eq!(next_texts[4], b"05-Jan-2025".to_vec());
        assert_eq!(fonts(&next)[0], b"F2".to_vec());
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(encode_text("Amount (₹)"), b"Amount (?)".to_vec());
        assert_eq!(encode_text("café"), vec![b'c', b'a', b'f', 0xe9]);
    }
}
