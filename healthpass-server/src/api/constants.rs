//! GET /constants: code tables for clients

use serde_json::{Value, json};
use shared::constants::{health_code_map, permission_type_map, sex_map, user_identity_map};
use shared::response::ApiResponse;

pub async fn get_constants() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "user_identity": user_identity_map(),
        "sex": sex_map(),
        "permission_type": permission_type_map(),
        "health_code": health_code_map(),
    }))
}
