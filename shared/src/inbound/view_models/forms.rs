//! Form snapshots and their validation rules.

use std::sync::OnceLock;

use regex::Regex;

use super::state::FormSnapshot;
use crate::domain::{DogBreed, DogDto, Location};

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN_LEN: usize = 6;
/// Lightest dog weight accepted, in kilograms.
pub const DOG_WEIGHT_MIN_KG: f64 = 1.0;
/// Heaviest dog weight accepted, in kilograms.
pub const DOG_WEIGHT_MAX_KG: f64 = 200.0;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Return whether `email` looks like a deliverable address.
///
/// # Examples
/// ```
/// use pupfiesta::inbound::view_models::is_valid_email;
///
/// assert!(is_valid_email("dana@example.com"));
/// assert!(!is_valid_email("dana@example"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Raw dog fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DogFields {
    /// Dog name.
    pub name: String,
    /// Selected breed; `None` saves as [`DogBreed::Mixed`].
    pub breed: Option<DogBreed>,
    /// Weight in kilograms, unparsed.
    pub weight: String,
    /// Photo URL.
    pub img_url: String,
    /// Gets along with other dogs.
    pub is_friendly: bool,
    /// Male dog.
    pub is_male: bool,
    /// Neutered or spayed.
    pub is_neutered: bool,
}

impl DogFields {
    /// Prefill the fields from a stored dog.
    pub fn from_dog(dog: &DogDto) -> Self {
        Self {
            name: dog.name.clone(),
            breed: Some(dog.breed),
            weight: format_weight(dog.weight),
            img_url: dog.img_url.clone(),
            is_friendly: dog.is_friendly,
            is_male: dog.is_male,
            is_neutered: dog.is_neutered,
        }
    }

    /// Validation errors for a complete dog profile.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Dog name is required".to_owned());
        }
        if let Err(message) = parse_weight(&self.weight) {
            errors.push(message);
        }
        errors
    }

    /// Build an unsaved dog; an unparseable weight becomes `0`.
    pub fn to_dog(&self) -> DogDto {
        DogDto {
            name: self.name.trim().to_owned(),
            breed: self.breed.unwrap_or_default(),
            weight: parse_weight(&self.weight).unwrap_or_default(),
            img_url: self.img_url.trim().to_owned(),
            is_friendly: self.is_friendly,
            is_male: self.is_male,
            is_neutered: self.is_neutered,
            ..DogDto::default()
        }
    }
}

fn parse_weight(raw: &str) -> Result<f64, String> {
    let weight: f64 = raw
        .trim()
        .parse()
        .map_err(|_| "Weight must be a number".to_owned())?;
    if !(DOG_WEIGHT_MIN_KG..=DOG_WEIGHT_MAX_KG).contains(&weight) {
        return Err(format!(
            "Weight must be between {DOG_WEIGHT_MIN_KG} and {DOG_WEIGHT_MAX_KG} kg"
        ));
    }
    Ok(weight)
}

fn format_weight(weight: f64) -> String {
    if weight > 0.0 {
        weight.to_string()
    } else {
        String::new()
    }
}

/// Sign-up and login form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFormData {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Owner display name.
    pub name: String,
    /// The first dog, registered with the account.
    pub dog: DogFields,
    /// Errors from the last rejected submit.
    pub errors: Vec<String>,
}

impl UserFormData {
    /// Validation for registration. The dog weight is checked only when given.
    pub fn validate_sign_up(&self) -> Vec<String> {
        let mut errors = self.credential_errors();
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.push(format!(
                "Password must be at least {PASSWORD_MIN_LEN} characters"
            ));
        }
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_owned());
        }
        if self.dog.name.trim().is_empty() {
            errors.push("Dog name is required".to_owned());
        }
        if !self.dog.weight.trim().is_empty() {
            errors.extend(parse_weight(&self.dog.weight).err());
        }
        errors
    }

    /// Validation for login.
    pub fn validate_login(&self) -> Vec<String> {
        let mut errors = self.credential_errors();
        if self.password.trim().is_empty() {
            errors.push("Password is required".to_owned());
        }
        errors
    }

    fn credential_errors(&self) -> Vec<String> {
        if self.email.trim().is_empty() {
            vec!["Email is required".to_owned()]
        } else if !is_valid_email(&self.email) {
            vec!["Email address is invalid".to_owned()]
        } else {
            Vec::new()
        }
    }
}

impl FormSnapshot for UserFormData {
    fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }
}

/// Add or edit dog form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DogFormData {
    /// Editable fields.
    pub fields: DogFields,
    /// Dog being edited; `None` when adding.
    pub editing: Option<DogDto>,
    /// Errors from the last rejected submit.
    pub errors: Vec<String>,
}

impl DogFormData {
    /// Dog to persist: the edited dog with the form applied, or a new dog.
    pub fn to_dog(&self) -> DogDto {
        let draft = self.fields.to_dog();
        match &self.editing {
            Some(existing) => DogDto {
                id: existing.id.clone(),
                owner_id: existing.owner_id.clone(),
                ..draft
            },
            None => draft,
        }
    }

    /// Return whether saving should create a new dog.
    pub fn is_new(&self) -> bool {
        self.editing.is_none()
    }
}

impl FormSnapshot for DogFormData {
    fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }
}

/// Dog park search form.
#[derive(Debug, Clone, PartialEq)]
pub struct GardenSearchForm {
    /// Search centre; required.
    pub center: Option<Location>,
    /// Search radius in metres.
    pub radius_meters: f64,
    /// Language code for Places results.
    pub language: String,
    /// Errors from the last rejected submit.
    pub errors: Vec<String>,
}

impl Default for GardenSearchForm {
    fn default() -> Self {
        Self {
            center: None,
            radius_meters: 5_000.0,
            language: "en".to_owned(),
            errors: Vec::new(),
        }
    }
}

impl GardenSearchForm {
    /// Validation shared by both garden searches.
    pub fn validate(&self, max_radius_meters: f64) -> Vec<String> {
        let mut errors = Vec::new();
        match self.center {
            None => errors.push("Search centre is required".to_owned()),
            Some(center) if !center.is_valid() => {
                errors.push("Search centre is not a valid position".to_owned());
            }
            Some(_) => {}
        }
        if !(self.radius_meters.is_finite()
            && self.radius_meters > 0.0
            && self.radius_meters <= max_radius_meters)
        {
            errors.push(format!(
                "Radius must be greater than 0 and at most {max_radius_meters} metres"
            ));
        }
        errors
    }
}

impl FormSnapshot for GardenSearchForm {
    fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }
}
