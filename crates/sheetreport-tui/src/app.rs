use chrono::{Local, NaiveDate};
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use rust_decimal::Decimal;
use sheetreport_core::{
    printout, AiReport, AppState, Category, Completion, GenerationStatus, GenerationTicket,
    NewSalesRecord, ReportClient, ReportError, SaleStatus,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Form,
    Table,
    Report,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Form => FocusPane::Table,
            FocusPane::Table => FocusPane::Report,
            FocusPane::Report => FocusPane::Form,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusPane::Form => FocusPane::Report,
            FocusPane::Table => FocusPane::Form,
            FocusPane::Report => FocusPane::Table,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Product,
    Category,
    Units,
    Revenue,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Date,
        FormField::Product,
        FormField::Category,
        FormField::Units,
        FormField::Revenue,
        FormField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Date => "Date",
            FormField::Product => "Product",
            FormField::Category => "Category",
            FormField::Units => "Units",
            FormField::Revenue => "Revenue ($)",
            FormField::Status => "Status",
        }
    }

    /// Category and Status are picked from a fixed list instead of typed
    pub fn is_choice(&self) -> bool {
        matches!(self, FormField::Category | FormField::Status)
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Entry form contents, kept as text until submitted
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub date: String,
    pub product: String,
    pub category: Category,
    pub units: String,
    pub revenue: String,
    pub status: SaleStatus,
    pub field: FormField,
    pub cursor: usize, // char position in the focused text field
}

impl EntryForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            product: String::new(),
            category: Category::Services,
            units: "1".to_string(),
            revenue: "0".to_string(),
            status: SaleStatus::Completed,
            field: FormField::Date,
            cursor: 0,
        }
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Date => self.date.clone(),
            FormField::Product => self.product.clone(),
            FormField::Category => self.category.as_str().to_string(),
            FormField::Units => self.units.clone(),
            FormField::Revenue => self.revenue.clone(),
            FormField::Status => self.status.as_str().to_string(),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Date => Some(&mut self.date),
            FormField::Product => Some(&mut self.product),
            FormField::Units => Some(&mut self.units),
            FormField::Revenue => Some(&mut self.revenue),
            FormField::Category | FormField::Status => None,
        }
    }

    pub fn focus(&mut self, field: FormField) {
        self.field = field;
        self.cursor = self.value(field).chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor;
        if let Some(text) = self.text_mut() {
            let byte_pos = char_to_byte_index(text, cursor);
            text.insert(byte_pos, c);
            self.cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor - 1;
        if let Some(text) = self.text_mut() {
            let byte_pos = char_to_byte_index(text, cursor);
            text.remove(byte_pos);
            self.cursor = cursor;
        }
    }

    pub fn delete(&mut self) {
        let cursor = self.cursor;
        if let Some(text) = self.text_mut() {
            if cursor < text.chars().count() {
                let byte_pos = char_to_byte_index(text, cursor);
                text.remove(byte_pos);
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let len = self.value(self.field).chars().count();
        self.cursor = (self.cursor + 1).min(len);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.value(self.field).chars().count();
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        match (self.field, forward) {
            (FormField::Category, true) => self.category = self.category.next(),
            (FormField::Category, false) => self.category = self.category.prev(),
            (FormField::Status, true) => self.status = self.status.next(),
            (FormField::Status, false) => self.status = self.status.prev(),
            _ => {}
        }
    }

    pub fn parse(&self) -> Result<NewSalesRecord, String> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Date must be YYYY-MM-DD".to_string())?;
        let units: u32 = self
            .units
            .trim()
            .parse()
            .map_err(|_| "Units must be a whole number".to_string())?;
        let revenue: Decimal = self
            .revenue
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .map_err(|_| "Revenue must be a number".to_string())?;

        let record = NewSalesRecord {
            date,
            product: self.product.trim().to_string(),
            category: self.category,
            units,
            revenue,
            status: self.status,
        };
        record.validate().map_err(|e| e.to_string())?;
        Ok(record)
    }

    /// Clear per-entry fields; date, category and status carry over to the next entry
    pub fn reset_after_submit(&mut self) {
        self.product.clear();
        self.units = "1".to_string();
        self.revenue = "0".to_string();
        self.focus(FormField::Product);
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub input_mode: InputMode,

    // Data sheet, report and generation status
    pub state: AppState,
    pub client: ReportClient,
    pub output_dir: PathBuf,

    // Presentation state
    pub form: EntryForm,
    pub table_state: TableState,
    pub report_scroll: u16,
    pub notice: Option<Notice>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub table_area: Option<Rect>,
    pub report_area: Option<Rect>,

    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        state: AppState,
        client: ReportClient,
        output_dir: PathBuf,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let mut table_state = TableState::default();
        if !state.records().is_empty() {
            table_state.select(Some(0));
        }

        let mut form = EntryForm::new(Local::now().date_naive());
        form.focus(FormField::Product);

        Self {
            should_quit: false,
            focus: FocusPane::Form,
            input_mode: InputMode::Normal,

            state,
            client,
            output_dir,

            form,
            table_state,
            report_scroll: 0,
            notice: None,

            animation_frame: 0,

            table_area: None,
            report_area: None,

            events,
        }
    }

    pub fn set_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
        });
    }

    pub fn submit_form(&mut self) {
        match self.form.parse() {
            Ok(record) => {
                let product = self.state.add_record(record).product.clone();
                self.form.reset_after_submit();
                self.report_scroll = 0;
                self.table_state.select(Some(self.state.records().len() - 1));
                self.set_notice(NoticeKind::Info, format!("Added \"{}\"", product));
            }
            Err(message) => self.set_notice(NoticeKind::Warning, message),
        }
    }

    pub fn selected_record_id(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|i| self.state.records().get(i))
            .map(|r| r.id.clone())
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_record_id() else {
            return;
        };
        if let Some(removed) = self.state.remove_record(&id) {
            self.set_notice(NoticeKind::Info, format!("Deleted \"{}\"", removed.product));
        }
        self.report_scroll = 0;

        let len = self.state.records().len();
        if len == 0 {
            self.table_state.select(None);
        } else if let Some(i) = self.table_state.selected() {
            self.table_state.select(Some(i.min(len - 1)));
        }
    }

    pub fn table_nav_down(&mut self) {
        let len = self.state.records().len();
        if len > 0 {
            let i = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn table_nav_up(&mut self) {
        if !self.state.records().is_empty() {
            let i = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn table_first(&mut self) {
        if !self.state.records().is_empty() {
            self.table_state.select(Some(0));
        }
    }

    pub fn table_last(&mut self) {
        let len = self.state.records().len();
        if len > 0 {
            self.table_state.select(Some(len - 1));
        }
    }

    /// Start a report request in the background; the result arrives as `AppEvent::ReportFinished`
    pub fn request_report(&mut self) {
        let ticket = match self.state.begin_generation() {
            Ok(ticket) => ticket,
            Err(err) => {
                self.set_notice(NoticeKind::Warning, err.to_string());
                return;
            }
        };

        self.notice = None;
        self.report_scroll = 0;
        self.animation_frame = 0;

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.generate(ticket.records()).await;
            // Receiver is gone only when the app is shutting down
            let _ = events.send(AppEvent::ReportFinished { ticket, result });
        });
    }

    pub fn finish_report(&mut self, ticket: GenerationTicket, result: Result<AiReport, ReportError>) {
        match self.state.complete_generation(ticket, result) {
            Completion::Applied(GenerationStatus::Success) => {
                self.set_notice(NoticeKind::Info, "Report ready. Press 'p' to print it.");
            }
            Completion::Applied(_) => {
                self.set_notice(
                    NoticeKind::Error,
                    "Error generating report. Please check your API key and try again.",
                );
            }
            Completion::Stale => {}
        }
    }

    pub fn print_report(&mut self, printed_on: NaiveDate) {
        let Some(report) = self.state.report() else {
            self.set_notice(NoticeKind::Warning, "Generate a report before printing.");
            return;
        };

        match printout::write_printable(&self.output_dir, report, self.state.records(), printed_on) {
            Ok(path) => {
                self.set_notice(NoticeKind::Info, format!("Report written to {}", path.display()));
            }
            Err(err) => {
                error!(error = %err, "failed to write printable report");
                self.set_notice(NoticeKind::Error, format!("Could not print report: {}", err));
            }
        }
    }

    pub fn scroll_report_down(&mut self) {
        self.report_scroll = self.report_scroll.saturating_add(1);
    }

    pub fn scroll_report_up(&mut self) {
        self.report_scroll = self.report_scroll.saturating_sub(1);
    }

    pub fn tick_animation(&mut self) {
        if self.state.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn quit(&mut self) {
        info!("quitting");
        self.should_quit = true;
    }
}
