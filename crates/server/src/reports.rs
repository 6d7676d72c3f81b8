//! Report resolution and document exports.
//!
//! Both exports re-query the full filtered set per request and stream it
//! row-by-row into an output buffer. The CSV opens with a UTF-8 BOM and
//! quote-prefixes contact numbers so spreadsheet software keeps the
//! leading zero.

use api_types::report::{
    ReportParams, ReportResponse, ReportRowView, SignatoriesView, StatusTotalsView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use engine::{ReportData, ReportFilter, ReportRow, Role, StatusTotals, format_minor, users};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::{ServerError, applications::map_status, applications::map_status_in, server::ServerState};

const CSV_HEADER: [&str; 9] = [
    "Application ID",
    "Applicant Name",
    "Program Type",
    "Status",
    "Amount Released",
    "Date Submitted",
    "Date Approved",
    "Contact Number",
    "Barangay",
];

fn report_filter(params: &ReportParams) -> ReportFilter {
    ReportFilter {
        status: params.status.map(map_status_in),
        program: params.program.clone(),
        barangay: params.barangay.clone(),
        submitted_from: params.start_date,
        submitted_to: params.end_date,
    }
}

fn totals_view(totals: StatusTotals) -> StatusTotalsView {
    StatusTotalsView {
        total: totals.total,
        pending: totals.pending,
        approved: totals.approved,
        rejected: totals.rejected,
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::Staff => "Staff",
        Role::Applicant => "Applicant",
    }
}

pub async fn report(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportResponse>, ServerError> {
    let data = state
        .engine
        .report_data(&user, &report_filter(&params))
        .await?;

    let rows = data
        .rows
        .iter()
        .map(|row| ReportRowView {
            id: row.id,
            applicant_name: row.applicant_name.clone(),
            program: row.program.clone(),
            status: map_status(row.status),
            amount_minor: row.amount_minor,
            submitted_date: row.submitted_date,
            approved_date: row.approved_date,
            contact_number: row.contact_number.clone(),
            barangay: row.barangay.clone(),
        })
        .collect();

    Ok(Json(ReportResponse {
        rows,
        filtered_totals: totals_view(data.filtered_totals),
        global_totals: totals_view(data.global_totals),
        signatories: SignatoriesView {
            mayor: data.signatories.mayor,
            cswdo_head: data.signatories.cswdo_head,
            social_worker: data.signatories.social_worker,
        },
    }))
}

fn amount_cell(amount_minor: Option<i64>) -> String {
    amount_minor
        .map(format_minor)
        .unwrap_or_else(|| "N/A".to_string())
}

fn csv_record(row: &ReportRow) -> [String; 9] {
    [
        row.id.to_string(),
        row.applicant_name.clone(),
        row.program.clone(),
        row.status.display().to_string(),
        amount_cell(row.amount_minor),
        row.submitted_date.to_string(),
        row.approved_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        // Leading apostrophe keeps spreadsheets from eating the zero.
        format!("'{}", row.contact_number),
        row.barangay.clone(),
    ]
}

pub(crate) fn render_csv(data: &ReportData) -> Result<Vec<u8>, ServerError> {
    // UTF-8 BOM so Excel detects the encoding.
    let mut buffer: Vec<u8> = vec![0xEF, 0xBB, 0xBF];
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer
            .write_record(CSV_HEADER)
            .map_err(|err| ServerError::Internal(format!("csv header: {err}")))?;
        for row in &data.rows {
            writer
                .write_record(csv_record(row))
                .map_err(|err| ServerError::Internal(format!("csv row {}: {err}", row.id)))?;
        }
        writer
            .flush()
            .map_err(|err| ServerError::Internal(format!("csv flush: {err}")))?;
    }
    Ok(buffer)
}

pub async fn export_csv(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state
        .engine
        .report_data(&user, &report_filter(&params))
        .await?;
    let body = render_csv(&data)?;

    let filename = format!(
        "{}_Report_{}.csv",
        role_label(user.role()?),
        Utc::now().date_naive()
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 6.0;

struct PdfWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: printpdf::PdfLayerReference,
    cursor_mm: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, ServerError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| ServerError::Internal(format!("pdf font: {err}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| ServerError::Internal(format!("pdf font: {err}")))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            cursor_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        if self.cursor_mm < MARGIN_MM + LINE_HEIGHT_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_mm), font);
        self.cursor_mm -= LINE_HEIGHT_MM;
    }

    fn blank(&mut self) {
        self.cursor_mm -= LINE_HEIGHT_MM / 2.0;
    }

    fn finish(self) -> Result<Vec<u8>, ServerError> {
        self.doc
            .save_to_bytes()
            .map_err(|err| ServerError::Internal(format!("pdf save: {err}")))
    }
}

pub(crate) fn render_pdf(data: &ReportData, role: Role) -> Result<Vec<u8>, ServerError> {
    let today = Utc::now().date_naive();
    let title = format!("Assista {} Report", role_label(role));
    let mut pdf = PdfWriter::new(&title)?;

    pdf.line(&title, 16.0, true);
    pdf.line(&format!("Generated on {today}"), 10.0, false);
    pdf.blank();

    // Summary block prints the office-wide totals, not the filtered view.
    let totals = data.global_totals;
    pdf.line("Summary", 12.0, true);
    pdf.line(&format!("Total applications: {}", totals.total), 10.0, false);
    pdf.line(&format!("Pending: {}", totals.pending), 10.0, false);
    pdf.line(&format!("Approved: {}", totals.approved), 10.0, false);
    pdf.line(&format!("Rejected: {}", totals.rejected), 10.0, false);
    pdf.blank();

    pdf.line("Applications", 12.0, true);
    for row in &data.rows {
        pdf.line(
            &format!(
                "#{} {} | {} | {} | {} | submitted {} | approved {}",
                row.id,
                row.applicant_name,
                row.program,
                row.status.display(),
                amount_cell(row.amount_minor),
                row.submitted_date,
                row.approved_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            9.0,
            false,
        );
    }
    pdf.blank();

    pdf.line("Prepared by:", 10.0, false);
    pdf.line(&data.signatories.social_worker, 10.0, true);
    pdf.line("Noted by:", 10.0, false);
    pdf.line(&data.signatories.cswdo_head, 10.0, true);
    pdf.line("Approved by:", 10.0, false);
    pdf.line(&data.signatories.mayor, 10.0, true);

    pdf.finish()
}

pub async fn export_pdf(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state
        .engine
        .report_data(&user, &report_filter(&params))
        .await?;
    let role = user.role()?;
    let body = render_pdf(&data, role)?;

    let filename = format!(
        "{}_Report_{}.pdf",
        role_label(role),
        Utc::now().date_naive()
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}
