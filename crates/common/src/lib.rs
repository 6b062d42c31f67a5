pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn status_body_serializes_success() {
        let body = serde_json::to_value(types::StatusBody::success()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "success"}));
    }
}
