//! Editable form state for the dashboard views.
//!
//! Each form tracks its field values plus which field has focus; the key
//! handler types into the focused field and Tab cycles focus.

/// Login form: phone + password.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
    pub focus: usize,
}

impl LoginForm {
    pub const FIELDS: usize = 2;

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.phone,
            _ => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }
}

/// Driver search form. Coordinates are kept as text until submit so partial
/// input never fights the user.
#[derive(Debug, Default)]
pub struct SearchForm {
    pub query: String,
    pub lat: String,
    pub lng: String,
    pub start_ts: String,
    pub end_ts: String,
    pub radius: String,
    pub focus: usize,
}

impl SearchForm {
    pub const FIELDS: usize = 6;
    pub const LABELS: [&'static str; Self::FIELDS] =
        ["Address/area", "Latitude", "Longitude", "Start", "End", "Radius (m)"];

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.query,
            1 => &mut self.lat,
            2 => &mut self.lng,
            3 => &mut self.start_ts,
            4 => &mut self.end_ts,
            _ => &mut self.radius,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.query,
            1 => &self.lat,
            2 => &self.lng,
            3 => &self.start_ts,
            4 => &self.end_ts,
            _ => &self.radius,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }
}

/// Nearby search form (saved-location search).
#[derive(Debug, Default)]
pub struct NearbyForm {
    pub start_ts: String,
    pub end_ts: String,
    pub radius: String,
    pub focus: usize,
}

impl NearbyForm {
    pub const FIELDS: usize = 3;
    pub const LABELS: [&'static str; Self::FIELDS] = ["Start", "End", "Radius (m)"];

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.start_ts,
            1 => &mut self.end_ts,
            _ => &mut self.radius,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.start_ts,
            1 => &self.end_ts,
            _ => &self.radius,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }
}

/// Provider space-creation form.
#[derive(Debug, Default)]
pub struct SpaceForm {
    pub title: String,
    pub capacity: String,
    pub place_query: String,
    pub address: String,
    pub focus: usize,
}

impl SpaceForm {
    pub const FIELDS: usize = 4;
    pub const LABELS: [&'static str; Self::FIELDS] =
        ["Title", "Capacity", "Place query", "Address"];

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.title,
            1 => &mut self.capacity,
            2 => &mut self.place_query,
            _ => &mut self.address,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.title,
            1 => &self.capacity,
            2 => &self.place_query,
            _ => &self.address,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }

    pub fn reset(&mut self) {
        *self = Self {
            capacity: "1".into(),
            ..Self::default()
        };
    }
}

/// Provider availability form.
#[derive(Debug, Default)]
pub struct AvailabilityForm {
    pub start_ts: String,
    pub end_ts: String,
    pub rate: String,
    pub focus: usize,
}

impl AvailabilityForm {
    pub const FIELDS: usize = 3;
    pub const LABELS: [&'static str; Self::FIELDS] = ["Start", "End", "Price/hour"];

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.start_ts,
            1 => &mut self.end_ts,
            _ => &mut self.rate,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.start_ts,
            1 => &self.end_ts,
            _ => &self.rate,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_through_all_fields() {
        let mut form = SearchForm::default();
        for _ in 0..SearchForm::FIELDS {
            form.next_field();
        }
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn focused_mut_targets_the_focused_field() {
        let mut form = LoginForm::default();
        form.focused_mut().push_str("017");
        assert_eq!(form.phone, "017");
        form.next_field();
        form.focused_mut().push_str("secret");
        assert_eq!(form.password, "secret");
    }

    #[test]
    fn space_form_reset_restores_default_capacity() {
        let mut form = SpaceForm {
            title: "Garage".into(),
            capacity: "4".into(),
            ..Default::default()
        };
        form.reset();
        assert!(form.title.is_empty());
        assert_eq!(form.capacity, "1");
    }
}
