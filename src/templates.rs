//! The HTML page that carries the cafe submission form.

use askama::Template;

use crate::models::form::{is_checked, CafeForm, FieldErrors};

/// One input of the form, text box or checkbox.
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub errors: Vec<String>,
    pub autofocus: bool,
    pub checkbox: bool,
    pub checked: bool,
}

impl FieldView {
    fn text(name: &'static str, label: &'static str, value: &str, errors: &FieldErrors) -> Self {
        Self {
            name,
            label,
            value: value.to_string(),
            errors: errors.get(name).to_vec(),
            autofocus: false,
            checkbox: false,
            checked: false,
        }
    }

    fn checkbox(name: &'static str, label: &'static str, value: &Option<String>) -> Self {
        Self {
            name,
            label,
            value: String::new(),
            errors: Vec::new(),
            autofocus: false,
            checkbox: true,
            checked: is_checked(value),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub csrf_token: String,
    pub csrf_errors: Vec<String>,
    pub fields: Vec<FieldView>,
}

impl IndexTemplate {
    /// Home page. Carries the submitted values and their errors when an
    /// `/add` submission does not validate.
    pub fn new(form: &CafeForm, errors: &FieldErrors, csrf_token: &str) -> Self {
        let mut name = FieldView::text("name", "Cafe Name", &form.name, errors);
        name.autofocus = true;

        let fields = vec![
            name,
            FieldView::text("map_url", "Map URL", &form.map_url, errors),
            FieldView::text("img_url", "Image URL", &form.img_url, errors),
            FieldView::text("location", "Location", &form.location, errors),
            FieldView::text("seats", "Number of Seats", &form.seats, errors),
            FieldView::checkbox("has_toilet", "Has Toilet", &form.has_toilet),
            FieldView::checkbox("has_wifi", "Has Wi-Fi", &form.has_wifi),
            FieldView::checkbox("has_sockets", "Has Sockets", &form.has_sockets),
            FieldView::checkbox("can_take_calls", "Can Take Calls", &form.can_take_calls),
            FieldView::text(
                "coffee_price",
                "Coffee Price",
                form.coffee_price.as_deref().unwrap_or(""),
                errors,
            ),
        ];

        Self {
            csrf_token: csrf_token.to_string(),
            csrf_errors: errors.get("csrf_token").to_vec(),
            fields,
        }
    }
}
