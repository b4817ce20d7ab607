use poem_openapi::{payload::Json, types::MaybeUndefined, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::model::user_profile::{UserProfile, UserProfileWithOwner};

use super::common::{
    BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
};

const MAX_POSITIVE_INTEGER: i64 = i32::MAX as i64;

#[derive(Object, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DetailUserProfile {
    pub id: String,
    /// User name of the owner.
    pub user: String,
    pub biography: String,
    pub age: Option<i32>,
    pub phone: String,
    pub address: String,
    pub education: String,
    pub pets_count: i32,
}

impl From<UserProfileWithOwner> for DetailUserProfile {
    fn from(value: UserProfileWithOwner) -> Self {
        let profile = value.profile;
        Self {
            id: profile.id.to_string(),
            user: value.owner_name,
            biography: profile.biography,
            age: profile.age,
            phone: profile.phone,
            address: profile.address,
            education: profile.education,
            pets_count: profile.pets_count,
        }
    }
}

/// Body of a create request. The owner is never read from the body.
#[derive(Object, Deserialize, Validate, Debug, Default)]
pub struct UserProfileCreateRequest {
    pub biography: Option<String>,
    #[validate(range(
        min = 0,
        max = MAX_POSITIVE_INTEGER,
        message = "Ensure this value is a positive integer."
    ))]
    pub age: Option<i64>,
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(
        max = 100,
        message = "Ensure this field has no more than 100 characters."
    ))]
    pub education: Option<String>,
    #[validate(range(
        min = 0,
        max = MAX_POSITIVE_INTEGER,
        message = "Ensure this value is a positive integer."
    ))]
    pub pets_count: Option<i64>,
}

impl UserProfileCreateRequest {
    /// Fills a blank profile; missing fields keep the column defaults.
    /// Call only after a successful `validate()`.
    pub fn into_user_profile(self, mut user_profile: UserProfile) -> UserProfile {
        if let Some(val) = self.biography {
            user_profile.biography = val;
        }
        user_profile.age = self.age.map(|x| x as i32);
        if let Some(val) = self.phone {
            user_profile.phone = val;
        }
        if let Some(val) = self.address {
            user_profile.address = val;
        }
        if let Some(val) = self.education {
            user_profile.education = val;
        }
        if let Some(val) = self.pets_count {
            user_profile.pets_count = val as i32;
        }
        user_profile
    }
}

fn validate_age(age: &MaybeUndefined<i64>) -> Result<(), ValidationError> {
    match age.value() {
        Some(val) if !(0..=MAX_POSITIVE_INTEGER).contains(val) => {
            let mut err = ValidationError::new("range");
            err.message = Some("Ensure this value is a positive integer.".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Body of an update request (PUT or PATCH). Absent fields are left untouched,
/// `age: null` clears the age.
#[derive(Object, Validate, Debug, Default)]
pub struct UserProfileUpdateRequest {
    pub biography: Option<String>,
    #[validate(custom(function = "validate_age"))]
    pub age: MaybeUndefined<i64>,
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(
        max = 100,
        message = "Ensure this field has no more than 100 characters."
    ))]
    pub education: Option<String>,
    #[validate(range(
        min = 0,
        max = MAX_POSITIVE_INTEGER,
        message = "Ensure this value is a positive integer."
    ))]
    pub pets_count: Option<i64>,
}

impl UserProfileUpdateRequest {
    /// Merges the provided fields into `user_profile`.
    /// Call only after a successful `validate()`.
    pub fn apply(self, user_profile: &mut UserProfile) {
        if let Some(val) = self.biography {
            user_profile.biography = val;
        }
        match self.age {
            MaybeUndefined::Undefined => {}
            MaybeUndefined::Null => user_profile.age = None,
            MaybeUndefined::Value(val) => user_profile.age = Some(val as i32),
        }
        if let Some(val) = self.phone {
            user_profile.phone = val;
        }
        if let Some(val) = self.address {
            user_profile.address = val;
        }
        if let Some(val) = self.education {
            user_profile.education = val;
        }
        if let Some(val) = self.pets_count {
            user_profile.pets_count = val as i32;
        }
    }
}

#[derive(ApiResponse)]
pub enum UserProfileListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<DetailUserProfile>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum UserProfileDetailResponses {
    #[oai(status = 200)]
    Ok(Json<DetailUserProfile>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum UserProfileCreateResponses {
    #[oai(status = 201)]
    Created(Json<DetailUserProfile>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum UserProfileUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<DetailUserProfile>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum UserProfileDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
