//! Parsing and validation of the JSON bodies sent to create or edit a transaction.

use serde::Deserialize;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{
    Error,
    auth::non_blank,
    json_body::{RequiredFields, number_or_string, require},
    transaction::{NewTransaction, TransactionUpdate},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const LOCAL_DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

/// The fields a client may send for an income or expense.
///
/// Every field is optional at this stage: creating requires all but the
/// description, editing applies only the fields that are present.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    title: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    amount: Option<f64>,
    category: Option<String>,
    date: Option<String>,
    description: Option<String>,
}

/// Parse a calendar date from `YYYY-MM-DD`, an RFC 3339 date-time or a
/// date-time without an offset. Only the date part of a date-time is kept.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` is in none of those formats.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let text = text.trim();

    Date::parse(text, DATE_FORMAT)
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339).map(|date_time| date_time.date()))
        .or_else(|_| {
            PrimitiveDateTime::parse(text, LOCAL_DATE_TIME_FORMAT).map(|date_time| date_time.date())
        })
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Check that `amount` is a finite, non-negative number.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] otherwise.
pub fn check_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

impl TransactionRequest {
    /// Validate a request to create a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the title, amount, category or date is missing or invalid.
    pub fn into_new_transaction(self) -> Result<NewTransaction, Error> {
        let title = non_blank(self.title);
        let category = non_blank(self.category);
        let date = non_blank(self.date);

        let (title, amount, category, date) = (
            ("title", title),
            ("amount", self.amount),
            ("category", category),
            ("date", date),
        )
            .required()?;

        Ok(NewTransaction {
            title,
            amount: check_amount(amount)?,
            category,
            date: parse_date(&date)?,
            description: self
                .description
                .map(|description| description.trim().to_owned())
                .unwrap_or_default(),
        })
    }

    /// Validate a request to edit a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a provided field is blank or invalid.
    pub fn into_update(self) -> Result<TransactionUpdate, Error> {
        let title = self.title.map(|title| non_blank(Some(title)));
        let category = self.category.map(|category| non_blank(Some(category)));

        require(&[
            ("title", !matches!(title, Some(None))),
            ("category", !matches!(category, Some(None))),
        ])?;

        Ok(TransactionUpdate {
            title: title.flatten(),
            amount: self.amount.map(check_amount).transpose()?,
            category: category.flatten(),
            date: self.date.as_deref().map(parse_date).transpose()?,
            description: self
                .description
                .map(|description| description.trim().to_owned()),
        })
    }
}

#[cfg(test)]
mod request_tests {
    use serde_json::json;
    use time::macros::date;

    use crate::Error;

    use super::{TransactionRequest, check_amount, parse_date};

    fn request(value: serde_json::Value) -> TransactionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(parse_date("2025-03-14"), Ok(date!(2025 - 03 - 14)));
        assert_eq!(
            parse_date("2025-03-14T23:30:00+13:00"),
            Ok(date!(2025 - 03 - 14))
        );
        assert_eq!(parse_date("2025-03-14T08:00:00Z"), Ok(date!(2025 - 03 - 14)));
        assert_eq!(
            parse_date("2025-03-14T08:00:00.000"),
            Ok(date!(2025 - 03 - 14))
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert_eq!(
            parse_date("14/03/2025"),
            Err(Error::InvalidDate("14/03/2025".to_owned()))
        );
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        assert_eq!(check_amount(0.0), Ok(0.0));
        assert_eq!(check_amount(-1.0), Err(Error::InvalidAmount(-1.0)));
        assert!(check_amount(f64::INFINITY).is_err());
        assert!(check_amount(f64::NAN).is_err());
    }

    #[test]
    fn new_transaction_requires_fields() {
        let result = request(json!({"title": "Lunch", "amount": 5})).into_new_transaction();

        assert_eq!(result, Err(Error::MissingFields(vec!["category", "date"])));
    }

    #[test]
    fn new_transaction_defaults_description() {
        let transaction = request(json!({
            "title": "Lunch",
            "amount": "12.50",
            "category": "Food",
            "date": "2025-03-14",
        }))
        .into_new_transaction()
        .unwrap();

        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.description, "");
        assert_eq!(transaction.date, date!(2025 - 03 - 14));
    }

    #[test]
    fn update_keeps_absent_fields_unset() {
        let update = request(json!({"amount": 7})).into_update().unwrap();

        assert_eq!(update.amount, Some(7.0));
        assert_eq!(update.title, None);
        assert_eq!(update.category, None);
        assert_eq!(update.date, None);
        assert_eq!(update.description, None);
    }

    #[test]
    fn update_rejects_blank_title() {
        assert_eq!(
            request(json!({"title": " "})).into_update(),
            Err(Error::MissingFields(vec!["title"]))
        );
    }
}
