use serde::Serialize;

/// Response envelope shared by every JSON endpoint:
/// `{"status": ..., "data": [...], "message": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub data: Vec<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            status: "success",
            data,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let body = ApiResponse::success(vec![42], "done");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"][0], 42);
        assert_eq!(json["message"], "done");
    }
}
