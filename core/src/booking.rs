//! Booking a session at a salon.
//!
//! Submission is one request/response step: [`BookingDesk::book`] validates the
//! request against the salon and either confirms it or reports every invalid
//! field at once. [`BookingDialog`] models the dialog that drives it, with an
//! explicit pending state instead of a timer.

use crate::catalog::Catalog;
use crate::model::SalonRecord;
use crate::text::is_valid_email;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use time::macros::format_description;
use time::{Date, Month};

/// Hourly slots offered in the booking dialog.
pub const AVAILABLE_TIMES: [&str; 11] = [
    "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00", "20:00",
];

const MIN_NAME_CHARS: usize = 2;
const MIN_PHONE_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Online,
    Cash,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub salon_id: String,
    pub service: Option<u32>,
    pub specialist: Option<u32>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingField {
    Service,
    Specialist,
    Date,
    Time,
    Name,
    Phone,
    Email,
    AgreeToTerms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: BookingField,
    pub message: String,
}

impl FieldError {
    fn new(field: BookingField, message: &str) -> Self {
        Self { field, message: message.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("salon {0} not found")]
    UnknownSalon(String),
    #[error("booking form has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldError>),
}

impl BookingError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            BookingError::Invalid(errors) => errors,
            BookingError::UnknownSalon(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub reference: String,
    pub salon_id: String,
    pub salon_name: String,
    pub service_name: String,
    pub specialist_name: String,
    pub price: u32,
    pub discount_price: u32,
    pub date: String,
    pub time: String,
    pub payment_method: PaymentMethod,
    pub summary: String,
}

/// Outcome of a submission as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed { booking: BookingConfirmation },
    Failed { error: String, fields: Vec<FieldError> },
}

impl From<Result<BookingConfirmation, BookingError>> for BookingStatus {
    fn from(outcome: Result<BookingConfirmation, BookingError>) -> Self {
        match outcome {
            Ok(booking) => BookingStatus::Confirmed { booking },
            Err(err) => BookingStatus::Failed { error: err.to_string(), fields: err.field_errors().to_vec() },
        }
    }
}

const GENITIVE_MONTHS: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня",
    "июля", "августа", "сентября", "октября", "ноября", "декабря",
];

struct DayMonth(Date);

impl fmt::Display for DayMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = GENITIVE_MONTHS[self.0.month() as usize - 1];
        write!(f, "{} {}", self.0.day(), month)
    }
}

pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Same day one calendar month later, clamped to the end of a shorter month.
pub fn one_month_after(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        m => (date.year(), m.next()),
    };
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

/// Check `request` against `salon`. Every failing field is reported.
pub fn validate(salon: &SalonRecord, request: &BookingRequest, today: Date) -> Result<(), BookingError> {
    let mut errors = Vec::new();

    match request.service {
        None => errors.push(FieldError::new(BookingField::Service, "Пожалуйста, выберите услугу")),
        Some(id) if salon.service(id).is_none() => {
            errors.push(FieldError::new(BookingField::Service, "Выбранная услуга недоступна в этом салоне"))
        }
        Some(_) => {}
    }
    match request.specialist {
        None => errors.push(FieldError::new(BookingField::Specialist, "Пожалуйста, выберите специалиста")),
        Some(id) if salon.specialist(id).is_none() => {
            errors.push(FieldError::new(BookingField::Specialist, "Выбранный специалист не работает в этом салоне"))
        }
        Some(_) => {}
    }
    match request.date.as_deref().filter(|d| !d.trim().is_empty()) {
        None => errors.push(FieldError::new(BookingField::Date, "Пожалуйста, выберите дату")),
        Some(raw) => match parse_date(raw) {
            None => errors.push(FieldError::new(BookingField::Date, "Некорректная дата")),
            Some(date) if date < today || date > one_month_after(today) => {
                errors.push(FieldError::new(BookingField::Date, "Дата недоступна для записи"))
            }
            Some(_) => {}
        },
    }
    match request.time.as_deref().filter(|t| !t.is_empty()) {
        None => errors.push(FieldError::new(BookingField::Time, "Пожалуйста, выберите время")),
        Some(t) if !AVAILABLE_TIMES.contains(&t) => {
            errors.push(FieldError::new(BookingField::Time, "Выбранное время недоступно"))
        }
        Some(_) => {}
    }
    // lengths count the raw input, surrounding whitespace included
    if request.name.chars().count() < MIN_NAME_CHARS {
        errors.push(FieldError::new(BookingField::Name, "Имя должно содержать не менее 2 символов"));
    }
    if request.phone.chars().count() < MIN_PHONE_CHARS {
        errors.push(FieldError::new(BookingField::Phone, "Пожалуйста, введите корректный номер телефона"));
    }
    if !is_valid_email(&request.email) {
        errors.push(FieldError::new(BookingField::Email, "Пожалуйста, введите корректный email"));
    }
    if !request.agree_to_terms {
        errors.push(FieldError::new(BookingField::AgreeToTerms, "Необходимо согласиться с условиями"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BookingError::Invalid(errors))
    }
}

/// Hands out booking references and confirms valid requests.
#[derive(Debug)]
pub struct BookingDesk {
    next: AtomicU64,
}

impl Default for BookingDesk {
    fn default() -> Self {
        Self { next: AtomicU64::new(1) }
    }
}

impl BookingDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&self, catalog: &Catalog, request: &BookingRequest, today: Date) -> Result<BookingConfirmation, BookingError> {
        let salon = catalog
            .get(&request.salon_id)
            .ok_or_else(|| BookingError::UnknownSalon(request.salon_id.clone()))?;
        validate(salon, request, today)?;

        // validate() guarantees these are present
        let (Some(service), Some(specialist), Some(date), Some(time)) = (
            request.service.and_then(|id| salon.service(id)),
            request.specialist.and_then(|id| salon.specialist(id)),
            request.date.as_deref().and_then(parse_date),
            request.time.clone(),
        ) else {
            return Err(BookingError::Invalid(Vec::new()));
        };

        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        let reference = format!("BK-{}-{:06}", salon.id, seq);
        let summary = format!("Вы забронировали {} на {} в {}", service.name, DayMonth(date), time);
        tracing::info!(%reference, salon = %salon.id, service = service.id, %date, %time, "booking confirmed");

        Ok(BookingConfirmation {
            reference,
            salon_id: salon.id.clone(),
            salon_name: salon.name.clone(),
            service_name: service.name.clone(),
            specialist_name: specialist.name.clone(),
            price: service.price,
            discount_price: service.discount_price,
            date: date.to_string(),
            time,
            payment_method: request.payment_method,
            summary,
        })
    }
}

/// State of the booking dialog, owned by whatever renders it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDialog {
    open: bool,
    status: Option<BookingStatus>,
    pub default_service: Option<u32>,
    pub default_specialist: Option<u32>,
}

impl BookingDialog {
    pub fn new(default_service: Option<u32>, default_specialist: Option<u32>) -> Self {
        Self { default_service, default_specialist, ..Self::default() }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn status(&self) -> Option<&BookingStatus> {
        self.status.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, Some(BookingStatus::Pending))
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Blank request for `salon_id` with the dialog's preselected service and specialist.
    pub fn draft(&self, salon_id: &str) -> BookingRequest {
        BookingRequest {
            salon_id: salon_id.to_string(),
            service: self.default_service,
            specialist: self.default_specialist,
            ..BookingRequest::default()
        }
    }

    /// Mark the form as submitted. Refused while closed or already pending.
    pub fn submit(&mut self) -> bool {
        if !self.open || self.is_pending() {
            return false;
        }
        self.status = Some(BookingStatus::Pending);
        true
    }

    pub fn resolve(&mut self, outcome: Result<BookingConfirmation, BookingError>) {
        if self.is_pending() {
            self.status = Some(outcome.into());
        }
    }

    /// Close and reset. Ignored while a submission is pending.
    pub fn close(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.open = false;
        self.status = None;
        true
    }
}
