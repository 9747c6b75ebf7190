// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Export formats for an already-filtered record set.
//!
//! The delimited-text column order and header text are relied on by whatever
//! reads the exported files; do not reorder them.

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::aggregate::group_by_category;
use crate::engine::filter::FilterCriteria;
use crate::errors::{TrackerError, TrackerResult};
use crate::models::{Currency, ExpenseRecord};
use crate::utils::{fmt_display_date, fmt_money, pretty_table};

pub const CSV_HEADERS: [&str; 4] = ["Date", "Category", "Description", "Amount"];
pub const TOTAL_LABEL: &str = "Total Expenses";
pub const COUNT_LABEL: &str = "Number of Transactions";

pub fn csv_file_name(today: NaiveDate) -> String {
    format!("expenses_{}.csv", today.format("%Y-%m-%d"))
}

pub fn report_file_name(today: NaiveDate, ext: &str) -> String {
    format!("expense_report_{}.{}", today.format("%Y-%m-%d"), ext)
}

fn total_of(records: &[ExpenseRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.amount))
}

fn writer_builder() -> WriterBuilder {
    let mut b = WriterBuilder::new();
    // Every cell quoted so descriptions are always wrapped; inner quotes doubled.
    b.quote_style(QuoteStyle::Always);
    b
}

fn finish(w: csv::Writer<Vec<u8>>) -> TrackerResult<Vec<u8>> {
    w.into_inner()
        .map_err(|e| TrackerError::Store(format!("export write failed: {}", e)))
}

/// Rows, a blank line, then the total and count rows.
pub fn to_delimited_text(records: &[ExpenseRecord], ccy: Currency) -> TrackerResult<String> {
    if records.is_empty() {
        return Err(TrackerError::EmptyExport);
    }

    let mut w = writer_builder().from_writer(Vec::new());
    w.write_record(CSV_HEADERS)?;
    for r in records {
        w.write_record([
            r.date.format("%Y-%m-%d").to_string(),
            r.category.clone(),
            r.description.clone(),
            fmt_money(&r.amount, ccy),
        ])?;
    }
    let mut out = finish(w)?;
    out.push(b'\n');

    let total = fmt_money(&total_of(records), ccy);
    let count = records.len().to_string();
    let mut w = writer_builder().from_writer(out);
    w.write_record([TOTAL_LABEL, "", "", total.as_str()])?;
    w.write_record([COUNT_LABEL, "", "", count.as_str()])?;
    let out = finish(w)?;

    String::from_utf8(out).map_err(|e| TrackerError::Store(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleBlock {
    pub title: String,
    pub generated_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleBlock {
    pub user: String,
    pub currency: Currency,
    pub category: String,
    pub period: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBlock {
    pub headers: Vec<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBlock {
    pub total: String,
    pub count: usize,
    pub by_category: Vec<(String, String)>,
}

/// Printable report, split into independently laid-out blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseReport {
    pub title: TitleBlock,
    pub subtitle: SubtitleBlock,
    pub table: TableBlock,
    pub summary: SummaryBlock,
}

pub struct ReportContext<'a> {
    pub user: &'a str,
    pub currency: Currency,
    pub criteria: &'a FilterCriteria,
    pub today: NaiveDate,
}

pub fn to_report(records: &[ExpenseRecord], ctx: &ReportContext<'_>) -> TrackerResult<ExpenseReport> {
    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) else {
        return Err(TrackerError::EmptyExport);
    };
    let ccy = ctx.currency;

    let rows = records
        .iter()
        .map(|r| ReportRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            category: r.category.clone(),
            description: r.description.clone(),
            amount: fmt_money(&r.amount, ccy),
        })
        .collect();

    let by_category = group_by_category(records)
        .into_iter()
        .map(|(c, amt)| (c, fmt_money(&amt, ccy)))
        .collect();

    Ok(ExpenseReport {
        title: TitleBlock {
            title: "Expense Report".to_string(),
            generated_on: ctx.today,
        },
        subtitle: SubtitleBlock {
            user: ctx.user.to_string(),
            currency: ccy,
            category: ctx.criteria.category_label().to_string(),
            period: ctx.criteria.period.to_string(),
            first_date: first,
            last_date: last,
        },
        table: TableBlock {
            headers: CSV_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        },
        summary: SummaryBlock {
            total: fmt_money(&total_of(records), ccy),
            count: records.len(),
            by_category,
        },
    })
}

/// Plain-text pages: title and subtitle on page one, table rows split across
/// pages with a repeated header, summary after the last row.
pub fn render_text(report: &ExpenseReport, rows_per_page: usize) -> String {
    let per_page = rows_per_page.max(1);
    let chunks: Vec<&[ReportRow]> = report.table.rows.chunks(per_page).collect();
    let pages = chunks.len().max(1);
    let headers: Vec<&str> = report.table.headers.iter().map(String::as_str).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "{}\nGenerated on {}\n\n",
        report.title.title,
        fmt_display_date(&report.title.generated_on)
    ));
    let s = &report.subtitle;
    out.push_str(&format!(
        "{} · {} · category: {} · period: {}\n{} – {}\n\n",
        s.user,
        s.currency,
        s.category,
        s.period,
        fmt_display_date(&s.first_date),
        fmt_display_date(&s.last_date)
    ));

    for (i, chunk) in chunks.iter().enumerate() {
        let rows = chunk
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        out.push_str(&pretty_table(&headers, rows).to_string());
        out.push('\n');
        if i + 1 < pages {
            out.push_str(&format!("Page {} of {}\n\x0c\n", i + 1, pages));
        }
    }

    out.push_str("\nSummary\n");
    let mut rows: Vec<Vec<String>> = report
        .summary
        .by_category
        .iter()
        .map(|(c, amt)| vec![c.clone(), amt.clone()])
        .collect();
    rows.push(vec![TOTAL_LABEL.to_string(), report.summary.total.clone()]);
    rows.push(vec![COUNT_LABEL.to_string(), report.summary.count.to_string()]);
    out.push_str(&pretty_table(&["Category", "Total"], rows).to_string());
    out.push_str(&format!("\nPage {} of {}\n", pages, pages));
    out
}
