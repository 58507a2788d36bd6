// Actix-Web test fixture - a user API with path, query and body arguments
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserList(Vec<User>);

impl Deref for UserList {
    type Target = Vec<User>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

// List users, optionally filtered by name
#[actix_web::get("/users")]
async fn get_users(name: web::Query<Option<String>>) -> web::Json<UserList> {
    web::Json(UserList(Vec::new()))
}

#[actix_web::get("/users/{id}")]
async fn get_user(id: web::Path<u64>) -> Result<web::Json<User>, actix_web::Error> {
    let id = id.into_inner();
    Ok(web::Json(User {
        id: id as u32,
        name: "Test".to_string(),
        email: "test@example.com".to_string(),
    }))
}

#[actix_web::post("/users")]
async fn create_user(payload: web::Json<CreateUserRequest>) -> impl Responder {
    HttpResponse::Created().json(User {
        id: 1,
        name: payload.name.clone(),
        email: payload.email.clone(),
    })
}

#[actix_web::route("/users/{id}", method = "PUT", method = "PATCH")]
async fn update_user(
    path: web::Path<u32>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let _ = (path.into_inner(), payload.into_inner());
    Ok(HttpResponse::Ok().finish())
}

#[actix_web::delete("/users/{id}")]
async fn delete_user(path: web::Path<u32>) -> Result<(), actix_web::Error> {
    let _ = path.into_inner();
    Ok(())
}

#[actix_web::get("/users/{id}/name")]
async fn user_name(path: web::Path<u32>) -> String {
    format!("user {}", path.into_inner())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(user_name);
}
