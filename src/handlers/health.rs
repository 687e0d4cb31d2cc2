use crate::models::HealthResponse;
use actix_web::HttpResponse;

/// Health check endpoint
pub async fn health() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "Twitter sign-in service is running".to_string(),
    };
    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_health() {
        let response = health().await;
        assert!(response.status().is_success());

        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
    }
}
