use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;
use validator::{Validate, ValidationError};

use crate::models::cafe::NewCafe;

const REQUIRED: &str = "This field is required.";

/// Raw key/value pairs submitted by the form on `/`. Every field defaults so a
/// partial submission still binds and can be reported back field by field.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct CafeForm {
    #[validate(length(max = 250, message = "Field cannot be longer than 250 characters."))]
    pub name: String,
    #[validate(
        custom(function = "http_url"),
        length(max = 500, message = "Field cannot be longer than 500 characters.")
    )]
    pub map_url: String,
    #[validate(
        custom(function = "http_url"),
        length(max = 500, message = "Field cannot be longer than 500 characters.")
    )]
    pub img_url: String,
    #[validate(length(max = 250, message = "Field cannot be longer than 250 characters."))]
    pub location: String,
    pub seats: String,
    pub has_toilet: Option<String>,
    pub has_wifi: Option<String>,
    pub has_sockets: Option<String>,
    pub can_take_calls: Option<String>,
    #[validate(length(max = 250, message = "Field cannot be longer than 250 characters."))]
    pub coffee_price: Option<String>,
    pub csrf_token: String,
}

impl CafeForm {
    fn required_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", self.name.as_str()),
            ("map_url", self.map_url.as_str()),
            ("img_url", self.img_url.as_str()),
            ("location", self.location.as_str()),
            ("seats", self.seats.as_str()),
        ]
    }
}

/// An absolute `http`/`https` URL whose host has at least one dot.
fn http_url(value: &str) -> Result<(), ValidationError> {
    let valid = Url::parse(value).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https")
            && url.host_str().is_some_and(|host| host.contains('.'))
    });
    if valid {
        return Ok(());
    }

    let mut error = ValidationError::new("url");
    error.message = Some("Must be a valid URL".into());
    Err(error)
}

/// A checkbox counts as ticked unless it was left out or sent as `""`/`"false"`.
pub fn is_checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some(v) if !v.is_empty() && v != "false")
}

/// Error messages keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, PartialEq)]
pub enum FormOutcome {
    Valid(NewCafe),
    Invalid(FieldErrors),
}

impl FormOutcome {
    /// Attaches an error that was detected outside field validation, turning a
    /// valid outcome into an invalid one.
    pub fn with_error(self, field: &str, message: impl Into<String>) -> Self {
        let mut errors = match self {
            FormOutcome::Valid(_) => FieldErrors::default(),
            FormOutcome::Invalid(errors) => errors,
        };
        errors.add(field, message);
        FormOutcome::Invalid(errors)
    }
}

/// Binds a submitted form into a [`NewCafe`]. A blank required field reports
/// only "required"; its other constraints are skipped.
pub fn validate_cafe_form(form: &CafeForm) -> FormOutcome {
    let mut errors = FieldErrors::default();

    for (field, value) in form.required_fields() {
        if value.trim().is_empty() {
            errors.add(field, REQUIRED);
        }
    }

    if let Err(failures) = form.validate() {
        for (field, field_failures) in failures.field_errors() {
            let field = field.to_string();
            if errors.contains(&field) {
                continue;
            }
            for failure in field_failures.iter() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                errors.add(field.clone(), message);
            }
        }
    }

    if !errors.is_empty() {
        return FormOutcome::Invalid(errors);
    }

    FormOutcome::Valid(NewCafe {
        name: form.name.clone(),
        map_url: form.map_url.clone(),
        img_url: form.img_url.clone(),
        location: form.location.clone(),
        seats: form.seats.clone(),
        has_toilet: is_checked(&form.has_toilet),
        has_wifi: is_checked(&form.has_wifi),
        has_sockets: is_checked(&form.has_sockets),
        can_take_calls: is_checked(&form.can_take_calls),
        coffee_price: form.coffee_price.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> CafeForm {
        CafeForm {
            name: "Cafe X".into(),
            map_url: "https://maps.example/x".into(),
            img_url: "https://img.example/x.png".into(),
            location: "Town".into(),
            seats: "10-20".into(),
            has_toilet: Some("y".into()),
            has_wifi: Some("y".into()),
            has_sockets: None,
            can_take_calls: Some("false".into()),
            coffee_price: Some("£2.40".into()),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn valid_form_binds_every_field() {
        let cafe = match validate_cafe_form(&filled_form()) {
            FormOutcome::Valid(cafe) => cafe,
            FormOutcome::Invalid(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert_eq!(cafe.name, "Cafe X");
        assert_eq!(cafe.map_url, "https://maps.example/x");
        assert_eq!(cafe.seats, "10-20");
        assert!(cafe.has_toilet);
        assert!(cafe.has_wifi);
        assert!(!cafe.has_sockets);
        assert!(!cafe.can_take_calls);
        assert_eq!(cafe.coffee_price.as_deref(), Some("£2.40"));
    }

    #[test]
    fn blank_required_fields_report_only_required() {
        let form = CafeForm {
            name: "   ".into(),
            map_url: String::new(),
            ..filled_form()
        };

        let FormOutcome::Invalid(errors) = validate_cafe_form(&form) else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("name"), [REQUIRED]);
        assert_eq!(errors.get("map_url"), [REQUIRED]);
        assert!(errors.get("img_url").is_empty());
    }

    #[test]
    fn rejects_malformed_urls() {
        let form = CafeForm {
            img_url: "not a url".into(),
            ..filled_form()
        };

        let FormOutcome::Invalid(errors) = validate_cafe_form(&form) else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("img_url"), ["Must be a valid URL"]);
    }

    #[test]
    fn urls_need_a_web_scheme_and_dotted_host() {
        for bad in [
            "javascript:alert(1)",
            "foo:bar",
            "ftp://files.example/x",
            "http://localhost/x",
            "mailto:someone@example.com",
        ] {
            let form = CafeForm {
                map_url: bad.into(),
                img_url: bad.into(),
                ..filled_form()
            };
            let FormOutcome::Invalid(errors) = validate_cafe_form(&form) else {
                panic!("{bad} was accepted");
            };
            assert_eq!(errors.get("map_url"), ["Must be a valid URL"], "{bad}");
            assert_eq!(errors.get("img_url"), ["Must be a valid URL"], "{bad}");
        }

        let form = CafeForm {
            map_url: "http://maps.example.co.uk/x?q=1".into(),
            ..filled_form()
        };
        assert!(matches!(validate_cafe_form(&form), FormOutcome::Valid(_)));
    }

    #[test]
    fn enforces_max_lengths() {
        let form = CafeForm {
            name: "n".repeat(251),
            coffee_price: Some("9".repeat(251)),
            ..filled_form()
        };

        let FormOutcome::Invalid(errors) = validate_cafe_form(&form) else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("name"), ["Field cannot be longer than 250 characters."]);
        assert!(errors.contains("coffee_price"));
        assert!(!errors.contains("location"));
    }

    #[test]
    fn coffee_price_is_optional() {
        let form = CafeForm {
            coffee_price: None,
            ..filled_form()
        };
        match validate_cafe_form(&form) {
            FormOutcome::Valid(cafe) => assert_eq!(cafe.coffee_price, None),
            FormOutcome::Invalid(errors) => panic!("unexpected errors: {errors:?}"),
        }

        let form = CafeForm {
            coffee_price: Some(String::new()),
            ..filled_form()
        };
        match validate_cafe_form(&form) {
            FormOutcome::Valid(cafe) => assert_eq!(cafe.coffee_price.as_deref(), Some("")),
            FormOutcome::Invalid(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    #[test]
    fn seats_has_no_length_limit() {
        let form = CafeForm {
            seats: "5".repeat(400),
            ..filled_form()
        };
        assert!(matches!(validate_cafe_form(&form), FormOutcome::Valid(_)));
    }

    #[test]
    fn with_error_invalidates_a_valid_outcome() {
        let outcome = validate_cafe_form(&filled_form()).with_error("csrf_token", "bad");

        let FormOutcome::Invalid(errors) = outcome else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("csrf_token"), ["bad"]);
    }

    #[test]
    fn checkbox_values() {
        assert!(is_checked(&Some("y".into())));
        assert!(is_checked(&Some("on".into())));
        assert!(!is_checked(&Some("false".into())));
        assert!(!is_checked(&Some(String::new())));
        assert!(!is_checked(&None));
    }
}
