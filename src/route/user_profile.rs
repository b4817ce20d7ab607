use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::security::{get_user_from_token, BearerAuthorization},
    model::user_profile::UserProfile,
    repository::user_profile::{
        create_user_profile, delete_user_profile, get_all_user_profile, get_user_profile_by_id,
        get_user_profile_by_user_id, update_user_profile,
    },
    schema::{
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        user_profile::{
            DetailUserProfile, UserProfileCreateRequest, UserProfileCreateResponses,
            UserProfileDeleteResponses, UserProfileDetailResponses, UserProfileListResponses,
            UserProfileUpdateRequest, UserProfileUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiUserProfileTags {
    UserProfile,
}

const PROFILE_EXISTS: &str = "user profile for this user already exists";

fn not_found(id: &str) -> NotFoundResponse {
    NotFoundResponse {
        message: format!("user profile with id = {} not found", id),
    }
}

/// True when `err` carries a database unique-constraint violation.
pub(super) fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|x| x.as_database_error())
        .is_some_and(|x| x.is_unique_violation())
}

pub struct ApiUserProfile;

#[OpenApi]
impl ApiUserProfile {
    #[oai(
        path = "/user-profile",
        method = "get",
        tag = "ApiUserProfileTags::UserProfile"
    )]
    async fn list_user_profile_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserProfileListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "list_user_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return UserProfileListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "list_user_profile_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut *redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "list_user_profile_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return UserProfileListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let data = match get_all_user_profile(&mut tx).await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "list_user_profile_api",
                        "get_all_user_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };

        UserProfileListResponses::Ok(Json(
            data.into_iter().map(DetailUserProfile::from).collect(),
        ))
    }

    #[oai(
        path = "/user-profile/:id",
        method = "get",
        tag = "ApiUserProfileTags::UserProfile"
    )]
    async fn get_detail_user_profile_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserProfileDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "get_detail_user_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "get_detail_user_profile_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut *redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "get_detail_user_profile_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return UserProfileDetailResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        // get user profile on db
        let parsed_id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => return UserProfileDetailResponses::NotFound(Json(not_found(&id))),
        };
        let data = match get_user_profile_by_id(&mut tx, &parsed_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "get_detail_user_profile_api",
                        "get_user_profile_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match data {
            Some(val) => UserProfileDetailResponses::Ok(Json(DetailUserProfile::from(val))),
            None => UserProfileDetailResponses::NotFound(Json(not_found(&id))),
        }
    }

    #[oai(
        path = "/user-profile",
        method = "post",
        tag = "ApiUserProfileTags::UserProfile"
    )]
    async fn create_user_profile_api(
        &self,
        auth: BearerAuthorization,
        Json(json): Json<UserProfileCreateRequest>,
        state: Data<&Arc<AppState>>,
    ) -> UserProfileCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "create_user_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return UserProfileCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "create_user_profile_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let request_user =
            match get_user_from_token(&mut tx, &mut *redis_conn, auth.0.token).await {
                Ok(val) => val,
                Err(err) => {
                    return UserProfileCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user_profile",
                            "create_user_profile_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let request_user = match request_user {
            Some(val) => val,
            None => {
                return UserProfileCreateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
        };

        // validate payload
        if let Err(err) = json.validate() {
            return UserProfileCreateResponses::BadRequest(Json(BadRequestResponse::from(err)));
        }

        // one profile per user
        match get_user_profile_by_user_id(&mut tx, &request_user.id).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                return UserProfileCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    PROFILE_EXISTS,
                )))
            }
            Err(err) => {
                return UserProfileCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "create_user_profile_api",
                        "get_user_profile_by_user_id",
                        &err.to_string(),
                    ),
                ))
            }
        }

        // owner always comes from the token
        let user_profile: UserProfile = json.into_user_profile(UserProfile::new(request_user.id));
        if let Err(err) = create_user_profile(&mut tx, &user_profile).await {
            // a concurrent create won the unique user_id constraint
            if is_unique_violation(&err) {
                return UserProfileCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    PROFILE_EXISTS,
                )));
            }
            return UserProfileCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user_profile",
                    "create_user_profile_api",
                    "create_user_profile",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return UserProfileCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user_profile",
                    "create_user_profile_api",
                    "commit to database",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            user_profile_id = %user_profile.id,
            user_id = %request_user.id,
            "user profile created"
        );

        UserProfileCreateResponses::Created(Json(DetailUserProfile {
            id: user_profile.id.to_string(),
            user: request_user.user_name,
            biography: user_profile.biography,
            age: user_profile.age,
            phone: user_profile.phone,
            address: user_profile.address,
            education: user_profile.education,
            pets_count: user_profile.pets_count,
        }))
    }

    #[oai(
        path = "/user-profile/:id",
        method = "put",
        tag = "ApiUserProfileTags::UserProfile"
    )]
    async fn update_user_profile_api(
        &self,
        Path(id): Path<String>,
        auth: BearerAuthorization,
        Json(json): Json<UserProfileUpdateRequest>,
        state: Data<&Arc<AppState>>,
    ) -> UserProfileUpdateResponses {
        self.save_user_profile(id, json, &state, auth, "update_user_profile_api")
            .await
    }

    #[oai(
        path = "/user-profile/:id",
        method = "patch",
        tag = "ApiUserProfileTags::UserProfile"
    )]
    async fn partial_update_user_profile_api(
        &self,
        Path(id): Path<String>,
        auth: BearerAuthorization,
        Json(json): Json<UserProfileUpdateRequest>,
        state: Data<&Arc<AppState>>,
    ) -> UserProfileUpdateResponses {
        self.save_user_profile(id, json, &state, auth, "partial_update_user_profile_api")
            .await
    }

    #[oai(
        path = "/user-profile/:id",
        method = "delete",
        tag = "ApiUserProfileTags::UserProfile"
    )]
    async fn delete_user_profile_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserProfileDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "delete_user_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "delete_user_profile_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let request_user =
            match get_user_from_token(&mut tx, &mut *redis_conn, auth.0.token).await {
                Ok(val) => val,
                Err(err) => {
                    return UserProfileDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user_profile",
                            "delete_user_profile_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let request_user = match request_user {
            Some(val) => val,
            None => {
                return UserProfileDeleteResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
        };

        // get user profile on db
        let parsed_id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => return UserProfileDeleteResponses::NotFound(Json(not_found(&id))),
        };
        let data = match get_user_profile_by_id(&mut tx, &parsed_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        "delete_user_profile_api",
                        "get_user_profile_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let user_profile = match data {
            Some(val) => val.profile,
            None => return UserProfileDeleteResponses::NotFound(Json(not_found(&id))),
        };

        // TODO: decide whether only the owner may delete; any authenticated user can today.
        if let Err(err) = delete_user_profile(&mut tx, &user_profile).await {
            return UserProfileDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user_profile",
                    "delete_user_profile_api",
                    "delete_user_profile",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return UserProfileDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user_profile",
                    "delete_user_profile_api",
                    "commit to database",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            user_profile_id = %user_profile.id,
            deleted_by = %request_user.id,
            "user profile deleted"
        );
        UserProfileDeleteResponses::NoContent
    }
}

impl ApiUserProfile {
    /// Shared body of PUT and PATCH: every field is optional, so both merge the
    /// provided fields into the stored profile.
    async fn save_user_profile(
        &self,
        id: String,
        json: UserProfileUpdateRequest,
        state: &Data<&Arc<AppState>>,
        auth: BearerAuthorization,
        function: &str,
    ) -> UserProfileUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        function,
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return UserProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        function,
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let request_user =
            match get_user_from_token(&mut tx, &mut *redis_conn, auth.0.token).await {
                Ok(val) => val,
                Err(err) => {
                    return UserProfileUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user_profile",
                            function,
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let request_user = match request_user {
            Some(val) => val,
            None => {
                return UserProfileUpdateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
        };

        // get user profile on db
        let parsed_id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => return UserProfileUpdateResponses::NotFound(Json(not_found(&id))),
        };
        let data = match get_user_profile_by_id(&mut tx, &parsed_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user_profile",
                        function,
                        "get_user_profile_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut data = match data {
            Some(val) => val,
            None => return UserProfileUpdateResponses::NotFound(Json(not_found(&id))),
        };

        // validate payload
        if let Err(err) = json.validate() {
            return UserProfileUpdateResponses::BadRequest(Json(BadRequestResponse::from(err)));
        }

        // TODO: decide whether only the owner may update; any authenticated user can today.
        json.apply(&mut data.profile);
        if let Err(err) = update_user_profile(&mut tx, &data.profile).await {
            return UserProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user_profile",
                    function,
                    "update_user_profile",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return UserProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user_profile",
                    function,
                    "commit to database",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            user_profile_id = %data.profile.id,
            updated_by = %request_user.id,
            "user profile updated"
        );

        UserProfileUpdateResponses::Ok(Json(DetailUserProfile::from(data)))
    }
}
